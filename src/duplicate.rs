//! Redundant index detection
//!
//! Index A is redundant when another index B in the same collection can serve
//! every query A serves:
//!
//! - neither is the identity index nor the shard key,
//! - their key strings differ,
//! - they share the leading field,
//! - B has at least as many fields as A,
//! - every non-leading field of A appears among B's non-leading fields, in any order.
//!
//! Indexes are evaluated in ascending effective-key order in a single forward
//! pass. An index already flagged is no longer a valid B, so two equivalent
//! indexes never absolve each other and exactly one of them survives.

use crate::index::NormalizedIndex;

/// Sort `indexes` by effective key (stable) and flag redundant entries in place
///
/// Returns the number of indexes flagged.
pub fn detect_duplicates(indexes: &mut [NormalizedIndex]) -> usize {
    sort_by_effective_key(indexes);

    let mut flagged = 0;
    for i in 0..indexes.len() {
        if !is_candidate(&indexes[i]) {
            continue;
        }
        let covered = indexes.iter().any(|b| is_covered_by(&indexes[i], b));
        if covered {
            indexes[i].is_dupped = true;
            flagged += 1;
        }
    }
    flagged
}

/// Stable ascending sort by effective key; equal keys keep their listing order
pub fn sort_by_effective_key(indexes: &mut [NormalizedIndex]) {
    indexes.sort_by(|a, b| a.effective_key.cmp(&b.effective_key));
}

/// Identity and shard-key indexes take no part in duplicate detection
fn is_candidate(index: &NormalizedIndex) -> bool {
    !index.is_identity() && !index.is_shard_key
}

fn is_covered_by(a: &NormalizedIndex, b: &NormalizedIndex) -> bool {
    if !is_candidate(b) || b.is_dupped || a.key_string == b.key_string {
        return false;
    }
    let (Some(a_lead), Some(b_lead)) = (a.fields.first(), b.fields.first()) else {
        return false;
    };
    if a_lead != b_lead || b.fields.len() < a.fields.len() {
        return false;
    }
    let b_rest = &b.fields[1..];
    a.fields[1..].iter().all(|field| b_rest.contains(field))
}
