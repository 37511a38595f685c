//! Catalog data model: raw index definitions, usage records, normalized index entries, and the
//! database → collection → index tree they are organized in

use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use crate::constants;
use crate::format::format_number;

/// A database-name/collection-name pair identifying a collection
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Namespace {
    pub db: String,
    pub collection: String,
}

impl Namespace {
    pub fn new(db: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            db: db.into(),
            collection: collection.into(),
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.db, self.collection)
    }
}

/// Value attached to one field of a key pattern
///
/// Directions are numeric (`1`, `-1`); special index types are strings
/// (`"text"`, `"hashed"`, `"2dsphere"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyValue::Int(n) => write!(f, "{}", n),
            // f64 Display already prints integral values without a fraction
            KeyValue::Float(v) => write!(f, "{}", v),
            KeyValue::Text(s) => f.write_str(s),
        }
    }
}

impl KeyValue {
    /// Same value as the server compares it: `1` and `1.0` are equal
    pub fn same_value(&self, other: &KeyValue) -> bool {
        match (self, other) {
            (KeyValue::Text(a), KeyValue::Text(b)) => a == b,
            (KeyValue::Text(_), _) | (_, KeyValue::Text(_)) => false,
            (a, b) => a.as_f64() == b.as_f64(),
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            KeyValue::Int(n) => Some(*n as f64),
            KeyValue::Float(v) => Some(*v),
            KeyValue::Text(_) => None,
        }
    }
}

impl From<i64> for KeyValue {
    fn from(n: i64) -> Self {
        KeyValue::Int(n)
    }
}

impl From<i32> for KeyValue {
    fn from(n: i32) -> Self {
        KeyValue::Int(n as i64)
    }
}

impl From<f64> for KeyValue {
    fn from(v: f64) -> Self {
        KeyValue::Float(v)
    }
}

impl From<&str> for KeyValue {
    fn from(s: &str) -> Self {
        KeyValue::Text(s.to_string())
    }
}

/// Ordered list of (field, value) pairs defining an index's structure
///
/// Serialized as a JSON object; field order is preserved in both directions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyPattern(Vec<(String, KeyValue)>);

impl KeyPattern {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a field (builder style)
    pub fn with(mut self, field: impl Into<String>, value: impl Into<KeyValue>) -> Self {
        self.0.push((field.into(), value.into()));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &KeyValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Same fields in the same order with numerically equal values
    pub fn matches(&self, other: &KeyPattern) -> bool {
        self.0.len() == other.0.len()
            && self
                .0
                .iter()
                .zip(&other.0)
                .all(|((fa, va), (fb, vb))| fa == fb && va.same_value(vb))
    }
}

impl FromIterator<(String, KeyValue)> for KeyPattern {
    fn from_iter<I: IntoIterator<Item = (String, KeyValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for KeyPattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (field, value) in &self.0 {
            map.serialize_entry(field, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for KeyPattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct KeyPatternVisitor;

        impl<'de> Visitor<'de> for KeyPatternVisitor {
            type Value = KeyPattern;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an index key pattern object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<KeyPattern, A::Error> {
                let mut pairs = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((field, value)) = access.next_entry::<String, KeyValue>()? {
                    pairs.push((field, value));
                }
                Ok(KeyPattern(pairs))
            }
        }

        deserializer.deserialize_map(KeyPatternVisitor)
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Seconds stored as an integer or, when created from the shell, as a double
fn deserialize_seconds<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seconds {
        Int(i64),
        Float(f64),
    }

    Ok(Option::<Seconds>::deserialize(deserializer)?.map(|seconds| match seconds {
        Seconds::Int(n) => n,
        Seconds::Float(v) => v as i64,
    }))
}

/// Raw index definition as reported by `listIndexes`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDefinition {
    pub name: String,
    pub key: KeyPattern,
    #[serde(rename = "v", default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i32>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub unique: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub sparse: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub background: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_filter_expression: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collation: Option<serde_json::Value>,
    #[serde(
        default,
        deserialize_with = "deserialize_seconds",
        skip_serializing_if = "Option::is_none"
    )]
    pub expire_after_seconds: Option<i64>,
}

impl IndexDefinition {
    /// Definition with only a name and key pattern set
    pub fn new(name: impl Into<String>, key: KeyPattern) -> Self {
        Self {
            name: name.into(),
            key,
            version: None,
            unique: false,
            sparse: false,
            background: false,
            partial_filter_expression: None,
            collation: None,
            expire_after_seconds: None,
        }
    }
}

/// Operation counter as reported by `$indexStats`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Accesses {
    pub ops: u64,
    pub since: DateTime<Utc>,
}

/// One raw usage-stat record: index `name` served `accesses.ops` operations on `host`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub name: String,
    pub host: String,
    pub accesses: Accesses,
}

/// Usage attributed to an index from one reporting host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexUsage {
    pub host: String,
    pub ops: u64,
    pub since: DateTime<Utc>,
}

/// Classification used for rendering, in precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexClass {
    Identity,
    ShardKey,
    Duplicate,
    Unused,
    Active,
}

/// An index definition together with its derived comparison keys and flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedIndex {
    pub definition: IndexDefinition,
    /// Field names in key order, directions stripped
    pub fields: Vec<String>,
    /// Display form of the key pattern, e.g. `{ a: 1, b: -1 }`
    pub key_string: String,
    /// Direction-insensitive sort/grouping key, e.g. `a: 1, b: 1`
    pub effective_key: String,
    pub is_shard_key: bool,
    pub is_dupped: bool,
    pub total_ops: u64,
    pub usage: Vec<IndexUsage>,
}

impl NormalizedIndex {
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn is_identity(&self) -> bool {
        self.key_string == constants::IDENTITY_KEY
    }

    pub fn is_unused(&self) -> bool {
        self.total_ops == 0
    }

    pub fn classification(&self) -> IndexClass {
        if self.is_identity() {
            IndexClass::Identity
        } else if self.is_shard_key {
            IndexClass::ShardKey
        } else if self.is_dupped {
            IndexClass::Duplicate
        } else if self.is_unused() {
            IndexClass::Unused
        } else {
            IndexClass::Active
        }
    }
}

/// Collection name → indexes sorted by effective key
pub type CollectionIndexes = BTreeMap<String, Vec<NormalizedIndex>>;

/// Database name → collection indexes
///
/// Ordered maps keep iteration, rendering and serialization deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    databases: BTreeMap<String, CollectionIndexes>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, db: impl Into<String>, collections: CollectionIndexes) {
        self.databases.insert(db.into(), collections);
    }

    pub fn get(&self, db: &str) -> Option<&CollectionIndexes> {
        self.databases.get(db)
    }

    pub fn indexes(&self, ns: &Namespace) -> Option<&[NormalizedIndex]> {
        self.databases
            .get(&ns.db)
            .and_then(|c| c.get(&ns.collection))
            .map(|v| v.as_slice())
    }

    pub fn databases(&self) -> impl Iterator<Item = (&String, &CollectionIndexes)> {
        self.databases.iter()
    }

    /// Every namespace with its indexes, databases then collections in name order
    pub fn namespaces(&self) -> impl Iterator<Item = (Namespace, &[NormalizedIndex])> {
        self.databases.iter().flat_map(|(db, collections)| {
            collections
                .iter()
                .map(move |(coll, list)| (Namespace::new(db.as_str(), coll.as_str()), list.as_slice()))
        })
    }

    pub fn index_count(&self) -> usize {
        self.namespaces().map(|(_, list)| list.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.databases.is_empty()
    }

    pub fn summary(&self) -> CatalogSummary {
        let mut summary = CatalogSummary {
            databases: self.databases.len(),
            ..CatalogSummary::default()
        };
        for (_, list) in self.namespaces() {
            summary.collections += 1;
            for index in list {
                summary.indexes += 1;
                summary.total_ops += index.total_ops;
                match index.classification() {
                    IndexClass::ShardKey => summary.shard_keys += 1,
                    IndexClass::Duplicate => summary.duplicates += 1,
                    IndexClass::Unused => summary.unused += 1,
                    IndexClass::Identity | IndexClass::Active => {}
                }
            }
        }
        summary
    }
}

/// Aggregate counts over a catalog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogSummary {
    pub databases: usize,
    pub collections: usize,
    pub indexes: usize,
    pub duplicates: usize,
    pub unused: usize,
    pub shard_keys: usize,
    pub total_ops: u64,
}

impl fmt::Display for CatalogSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} databases, {} collections, {} indexes ({} duplicate, {} unused, {} shard keys), {} ops",
            format_number(self.databases),
            format_number(self.collections),
            format_number(self.indexes),
            format_number(self.duplicates),
            format_number(self.unused),
            format_number(self.shard_keys),
            format_number(self.total_ops),
        )
    }
}
