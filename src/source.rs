//! Deployment collaborators: the read interface the catalog builder scans through, the write
//! interface restores replay into, and an in-memory/JSON fixture deployment

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::constants;
use crate::error::{Error, Result};
use crate::index::{IndexDefinition, KeyPattern, Namespace, UsageRecord};

/// Catalog entry returned by `listCollections`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionInfo {
    pub name: String,
    /// `"collection"`, `"view"`, `"timeseries"`; absent on old servers
    pub kind: Option<String>,
}

impl CollectionInfo {
    /// Regular, user-owned collection (not a view, not `system.*`)
    pub fn is_user_collection(&self) -> bool {
        if self.name.starts_with(constants::SYSTEM_COLLECTION_PREFIX) {
            return false;
        }
        match &self.kind {
            Some(kind) => kind == constants::COLLECTION_TYPE,
            None => true,
        }
    }
}

/// Read access to a deployment's index catalog and usage counters
///
/// Calls are made one at a time, in a deterministic order; implementations
/// own their transport timeouts.
pub trait IndexSource {
    /// Host the data is read from (used for snapshot naming)
    fn source_host(&self) -> String;

    fn list_databases(&self) -> Result<Vec<String>>;

    fn list_collections(&self, db: &str) -> Result<Vec<CollectionInfo>>;

    fn list_indexes(&self, ns: &Namespace) -> Result<Vec<IndexDefinition>>;

    fn index_usage_stats(&self, ns: &Namespace) -> Result<Vec<UsageRecord>>;

    /// Exact key-pattern match against the shard configuration; never fails
    fn is_shard_key(&self, ns: &Namespace, key: &KeyPattern) -> bool;
}

/// First `host[:port]` of a `mongodb://` / `mongodb+srv://` connection string, credentials stripped
pub fn host_from_uri(uri: &str) -> String {
    let rest = uri.split_once("://").map_or(uri, |(_, rest)| rest);
    let rest = rest.rsplit_once('@').map_or(rest, |(_, rest)| rest);
    let hosts = rest.split(['/', '?']).next().unwrap_or(rest);
    hosts.split(',').next().unwrap_or(hosts).to_string()
}

/// Write access used when replaying a snapshot into a deployment
pub trait IndexSink {
    fn create_index(&self, ns: &Namespace, definition: &IndexDefinition) -> Result<()>;
}

/// One collection in a fixture deployment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixtureCollection {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub indexes: Vec<IndexDefinition>,
    #[serde(default)]
    pub usage: Vec<UsageRecord>,
}

/// Deployment described entirely in memory, loadable from a JSON file
///
/// ```json
/// {
///   "host": "db1:27017",
///   "databases": { "shop": { "orders": { "type": "collection", "indexes": [], "usage": [] } } },
///   "shardKeys": { "shop.orders": { "region": 1 } }
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureSource {
    pub host: String,
    #[serde(default)]
    pub databases: BTreeMap<String, BTreeMap<String, FixtureCollection>>,
    #[serde(default)]
    pub shard_keys: BTreeMap<String, KeyPattern>,
}

impl FixtureSource {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// Load a fixture deployment from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        sonic_rs::from_reader(BufReader::new(file)).map_err(|e| {
            Error::enumeration(path.display().to_string(), format!("invalid fixture: {}", e))
        })
    }

    pub fn add_collection(&mut self, ns: &Namespace, indexes: Vec<IndexDefinition>) -> &mut Self {
        let coll = self.collection_mut(ns);
        coll.kind = Some(constants::COLLECTION_TYPE.to_string());
        coll.indexes = indexes;
        self
    }

    pub fn add_view(&mut self, ns: &Namespace) -> &mut Self {
        self.collection_mut(ns).kind = Some("view".to_string());
        self
    }

    pub fn add_usage(&mut self, ns: &Namespace, record: UsageRecord) -> &mut Self {
        self.collection_mut(ns).usage.push(record);
        self
    }

    pub fn add_shard_key(&mut self, ns: &Namespace, key: KeyPattern) -> &mut Self {
        self.shard_keys.insert(ns.to_string(), key);
        self
    }

    fn collection_mut(&mut self, ns: &Namespace) -> &mut FixtureCollection {
        self.databases
            .entry(ns.db.clone())
            .or_default()
            .entry(ns.collection.clone())
            .or_default()
    }

    fn collection(&self, ns: &Namespace) -> Result<&FixtureCollection> {
        self.databases
            .get(&ns.db)
            .and_then(|colls| colls.get(&ns.collection))
            .ok_or_else(|| Error::enumeration(ns.to_string(), "namespace not found"))
    }
}

impl IndexSource for FixtureSource {
    fn source_host(&self) -> String {
        self.host.clone()
    }

    fn list_databases(&self) -> Result<Vec<String>> {
        Ok(self.databases.keys().cloned().collect())
    }

    fn list_collections(&self, db: &str) -> Result<Vec<CollectionInfo>> {
        let colls = self
            .databases
            .get(db)
            .ok_or_else(|| Error::enumeration(db, "database not found"))?;
        Ok(colls
            .iter()
            .map(|(name, coll)| CollectionInfo {
                name: name.clone(),
                kind: coll.kind.clone(),
            })
            .collect())
    }

    fn list_indexes(&self, ns: &Namespace) -> Result<Vec<IndexDefinition>> {
        Ok(self.collection(ns)?.indexes.clone())
    }

    fn index_usage_stats(&self, ns: &Namespace) -> Result<Vec<UsageRecord>> {
        Ok(self.collection(ns)?.usage.clone())
    }

    fn is_shard_key(&self, ns: &Namespace, key: &KeyPattern) -> bool {
        self.shard_keys
            .get(&ns.to_string())
            .is_some_and(|shard_key| shard_key.matches(key))
    }
}
