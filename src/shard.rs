//! Shard-key classification

use crate::index::{Namespace, NormalizedIndex};
use crate::source::IndexSource;

/// Mark `index` as a shard key when the deployment declares its exact key pattern for `ns`
///
/// One point lookup per index. A missing shard configuration (unsharded
/// deployment, unsharded collection) simply leaves the flag unset.
pub fn classify_shard_key<S: IndexSource + ?Sized>(
    index: &mut NormalizedIndex,
    ns: &Namespace,
    source: &S,
) {
    index.is_shard_key = source.is_shard_key(ns, &index.definition.key);
    if index.is_shard_key {
        log::debug!("{} {} is the shard key", ns, index.key_string);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{IndexDefinition, KeyPattern};
    use crate::normalize::normalize;
    use crate::source::FixtureSource;

    fn index(key: KeyPattern) -> NormalizedIndex {
        normalize(IndexDefinition::new("idx", key), &Namespace::new("shop", "orders")).unwrap()
    }

    #[test]
    fn test_exact_match_only() {
        let ns = Namespace::new("shop", "orders");
        let mut source = FixtureSource::new("test");
        source.add_shard_key(&ns, KeyPattern::new().with("c", 1));

        let mut exact = index(KeyPattern::new().with("c", 1));
        classify_shard_key(&mut exact, &ns, &source);
        assert!(exact.is_shard_key);

        let mut prefix = index(KeyPattern::new().with("c", 1).with("d", 1));
        classify_shard_key(&mut prefix, &ns, &source);
        assert!(!prefix.is_shard_key);

        let mut reversed = index(KeyPattern::new().with("c", -1));
        classify_shard_key(&mut reversed, &ns, &source);
        assert!(!reversed.is_shard_key);
    }

    #[test]
    fn test_unsharded_namespace() {
        let source = FixtureSource::new("test");
        let ns = Namespace::new("shop", "orders");
        let mut idx = index(KeyPattern::new().with("c", 1));
        classify_shard_key(&mut idx, &ns, &source);
        assert!(!idx.is_shard_key);
    }
}
