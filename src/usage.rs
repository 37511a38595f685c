//! Usage aggregation: attribute per-host `$indexStats` counters to normalized indexes

use crate::index::{IndexUsage, Namespace, NormalizedIndex, UsageRecord};

/// Append every usage record to the index with the same name and accumulate `total_ops`
///
/// Records are matched by index name, which is unique within a collection.
/// One entry is kept per record, so a sharded deployment yields one entry per
/// reporting router/host. Records naming an index that is not in `indexes`
/// (the catalog and live metrics can briefly disagree) are dropped; the
/// number dropped is returned.
pub fn aggregate_usage(
    indexes: &mut [NormalizedIndex],
    records: Vec<UsageRecord>,
    ns: &Namespace,
) -> usize {
    let mut dropped = 0;
    for record in records {
        match indexes.iter_mut().find(|ix| ix.definition.name == record.name) {
            Some(index) => {
                index.total_ops += record.accesses.ops;
                index.usage.push(IndexUsage {
                    host: record.host,
                    ops: record.accesses.ops,
                    since: record.accesses.since,
                });
            }
            None => {
                log::debug!("{}: usage for unknown index {:?} dropped", ns, record.name);
                dropped += 1;
            }
        }
    }
    dropped
}
