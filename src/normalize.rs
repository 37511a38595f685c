//! Index record normalization: canonical key string, field list, and direction-insensitive effective key

use crate::error::{Error, Result};
use crate::index::{IndexDefinition, Namespace, NormalizedIndex};

/// Convert a raw index definition into a comparable [`NormalizedIndex`]
///
/// Only `fields`, `key_string` and `effective_key` are derived here; flags,
/// counters and usage start empty. A definition without key fields is
/// rejected with [`Error::MalformedIndex`].
pub fn normalize(definition: IndexDefinition, ns: &Namespace) -> Result<NormalizedIndex> {
    if definition.key.is_empty() {
        return Err(Error::MalformedIndex {
            namespace: ns.to_string(),
            name: definition.name,
        });
    }

    let mut fields = Vec::with_capacity(definition.key.len());
    let mut pairs = Vec::with_capacity(definition.key.len());
    for (field, value) in definition.key.iter() {
        fields.push(field.to_string());
        pairs.push(format!("{}: {}", field, value));
    }
    let body = pairs.join(", ");
    let key_string = format!("{{ {} }}", body);
    let effective_key = effective_key(&body);

    Ok(NormalizedIndex {
        definition,
        fields,
        key_string,
        effective_key,
        is_shard_key: false,
        is_dupped: false,
        total_ops: 0,
        usage: Vec::new(),
    })
}

/// Brace-less key body with every descending marker rewritten to ascending
fn effective_key(body: &str) -> String {
    body.replace(": -1", ": 1")
}
