//! Replay a catalog's index definitions into a deployment

use crate::index::{Catalog, Namespace, NormalizedIndex};
use crate::source::IndexSink;

/// Outcome counters for one replay
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub created: usize,
    pub failed: usize,
}

/// Indexes a replay would create, in catalog order (identity indexes excluded)
pub fn restore_plan(catalog: &Catalog) -> Vec<(Namespace, &NormalizedIndex)> {
    catalog
        .namespaces()
        .flat_map(|(ns, indexes)| {
            indexes
                .iter()
                .filter(|ix| !ix.is_identity())
                .map(move |ix| (ns.clone(), ix))
        })
        .collect()
}

/// Create every planned index through `sink`
///
/// A failing index is logged and counted; the replay carries on.
pub fn restore_catalog<K: IndexSink + ?Sized>(catalog: &Catalog, sink: &K) -> RestoreReport {
    let mut report = RestoreReport::default();
    for (ns, index) in restore_plan(catalog) {
        match sink.create_index(&ns, &index.definition) {
            Ok(()) => {
                log::info!("{}: created {} {}", ns, index.name(), index.key_string);
                report.created += 1;
            }
            Err(e) => {
                log::error!("{}: failed to create {}: {}", ns, index.name(), e);
                report.failed += 1;
            }
        }
    }
    report
}
