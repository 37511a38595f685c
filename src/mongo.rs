//! Live deployment access over the synchronous MongoDB driver

use chrono::{DateTime, Utc};
use mongodb::bson::{doc, Bson, Document};
use mongodb::error::ErrorKind;
use mongodb::results::CollectionType;
use mongodb::sync::Client;

use crate::error::{Error, Result};
use crate::index::{Accesses, IndexDefinition, KeyPattern, KeyValue, Namespace, UsageRecord};
use crate::source::{host_from_uri, CollectionInfo, IndexSink, IndexSource};

pub struct MongoSource {
    client: Client,
    host: String,
}

impl MongoSource {
    /// Connect and verify the deployment answers a ping
    pub fn connect(uri: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri).map_err(|e| Error::Connection(e.to_string()))?;
        client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .map_err(|e| Error::Connection(e.to_string()))?;
        Ok(Self {
            client,
            host: host_from_uri(uri),
        })
    }
}

impl IndexSource for MongoSource {
    fn source_host(&self) -> String {
        self.host.clone()
    }

    fn list_databases(&self) -> Result<Vec<String>> {
        self.client
            .list_database_names(None, None)
            .map_err(|e| driver_error("databases", e))
    }

    fn list_collections(&self, db: &str) -> Result<Vec<CollectionInfo>> {
        let cursor = self
            .client
            .database(db)
            .list_collections(None, None)
            .map_err(|e| driver_error(db, e))?;

        let mut collections = Vec::new();
        for spec in cursor {
            let spec = match spec {
                Ok(spec) => spec,
                Err(e) => {
                    let e = driver_error(db, e);
                    if e.is_fatal() {
                        return Err(e);
                    }
                    log::debug!("{}: undecodable collection entry: {}", db, e);
                    continue;
                }
            };
            let kind = match spec.collection_type {
                CollectionType::Collection => "collection",
                CollectionType::View => "view",
                _ => "other",
            };
            collections.push(CollectionInfo {
                name: spec.name,
                kind: Some(kind.to_string()),
            });
        }
        Ok(collections)
    }

    fn list_indexes(&self, ns: &Namespace) -> Result<Vec<IndexDefinition>> {
        let reply = self
            .client
            .database(&ns.db)
            .run_command(doc! { "listIndexes": ns.collection.as_str() }, None)
            .map_err(|e| driver_error(ns.to_string(), e))?;
        // a collection holds at most 64 indexes, well under one batch
        let batch = reply
            .get_document("cursor")
            .and_then(|cursor| cursor.get_array("firstBatch"))
            .map_err(|e| Error::enumeration(ns.to_string(), e))?;

        let mut definitions = Vec::with_capacity(batch.len());
        for item in batch {
            let Bson::Document(raw) = item else { continue };
            let json = Bson::Document(raw.clone()).into_relaxed_extjson();
            match serde_json::from_value::<IndexDefinition>(json) {
                Ok(definition) => definitions.push(definition),
                Err(e) => log::warn!("{}: undecodable index definition: {}", ns, e),
            }
        }
        Ok(definitions)
    }

    fn index_usage_stats(&self, ns: &Namespace) -> Result<Vec<UsageRecord>> {
        let cursor = self
            .client
            .database(&ns.db)
            .collection::<Document>(&ns.collection)
            .aggregate(vec![doc! { "$indexStats": {} }], None)
            .map_err(|e| driver_error(ns.to_string(), e))?;

        let mut records = Vec::new();
        for result in cursor {
            let stat = result.map_err(|e| driver_error(ns.to_string(), e))?;
            match usage_record(&stat) {
                Some(record) => records.push(record),
                None => log::debug!("{}: skipping unexpected $indexStats entry {}", ns, stat),
            }
        }
        Ok(records)
    }

    fn is_shard_key(&self, ns: &Namespace, key: &KeyPattern) -> bool {
        let key: Document = key
            .iter()
            .map(|(field, value)| (field.to_string(), key_value_bson(value)))
            .collect();
        let filter = doc! { "_id": ns.to_string(), "key": key };
        match self
            .client
            .database("config")
            .collection::<Document>("collections")
            .find_one(filter, None)
        {
            Ok(found) => found.is_some(),
            Err(e) => {
                log::debug!("{}: shard key lookup failed: {}", ns, e);
                false
            }
        }
    }
}

impl IndexSink for MongoSource {
    fn create_index(&self, ns: &Namespace, definition: &IndexDefinition) -> Result<()> {
        let json = serde_json::to_value(definition).map_err(|e| Error::enumeration(ns.to_string(), e))?;
        let index = match Bson::try_from(json) {
            Ok(Bson::Document(index)) => index,
            Ok(other) => {
                return Err(Error::enumeration(
                    ns.to_string(),
                    format!("index definition is not a document: {}", other),
                ))
            }
            Err(e) => return Err(Error::enumeration(ns.to_string(), e)),
        };
        self.client
            .database(&ns.db)
            .run_command(
                doc! { "createIndexes": ns.collection.as_str(), "indexes": [index] },
                None,
            )
            .map_err(|e| driver_error(ns.to_string(), e))?;
        Ok(())
    }
}

/// Losing the server ends the run; anything else only fails `scope`
fn driver_error(scope: impl Into<String>, e: mongodb::error::Error) -> Error {
    match e.kind.as_ref() {
        ErrorKind::ServerSelection { .. }
        | ErrorKind::Io(_)
        | ErrorKind::Authentication { .. }
        | ErrorKind::ConnectionPoolCleared { .. } => Error::Connection(e.to_string()),
        _ => Error::enumeration(scope, e),
    }
}

fn key_value_bson(value: &KeyValue) -> Bson {
    match value {
        KeyValue::Int(n) => match i32::try_from(*n) {
            Ok(small) => Bson::Int32(small),
            Err(_) => Bson::Int64(*n),
        },
        KeyValue::Float(v) => Bson::Double(*v),
        KeyValue::Text(s) => Bson::String(s.clone()),
    }
}

/// `{ name, host, accesses: { ops, since } }` from one `$indexStats` document
fn usage_record(stat: &Document) -> Option<UsageRecord> {
    let name = stat.get_str("name").ok()?;
    let host = stat.get_str("host").ok()?;
    let accesses = stat.get_document("accesses").ok()?;
    let ops = match accesses.get("ops")? {
        Bson::Int64(n) => u64::try_from(*n).ok()?,
        Bson::Int32(n) => u64::try_from(*n).ok()?,
        Bson::Double(v) if *v >= 0.0 => *v as u64,
        _ => return None,
    };
    let since = accesses.get_datetime("since").ok()?;
    let since = DateTime::<Utc>::from_timestamp_millis(since.timestamp_millis())?;

    Some(UsageRecord {
        name: name.to_string(),
        host: host.to_string(),
        accesses: Accesses { ops, since },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_record_from_index_stats() {
        let stat = doc! {
            "name": "a_1",
            "key": { "a": 1 },
            "host": "shard01:27018",
            "accesses": { "ops": 42_i64, "since": mongodb::bson::DateTime::from_millis(1_704_067_200_000) },
        };
        let record = usage_record(&stat).unwrap();
        assert_eq!(record.name, "a_1");
        assert_eq!(record.host, "shard01:27018");
        assert_eq!(record.accesses.ops, 42);
        assert_eq!(record.accesses.since.timestamp(), 1_704_067_200);
    }

    #[test]
    fn test_list_indexes_entry_decodes() {
        let entry = doc! {
            "v": 2,
            "key": { "ts": 1, "region": -1 },
            "name": "ts_1_region_-1",
            "expireAfterSeconds": 3600.0,
            "partialFilterExpression": { "archived": false },
        };
        let json = Bson::Document(entry).into_relaxed_extjson();
        let definition: IndexDefinition = serde_json::from_value(json).unwrap();

        assert_eq!(definition.name, "ts_1_region_-1");
        assert_eq!(definition.version, Some(2));
        assert_eq!(definition.key, KeyPattern::new().with("ts", 1).with("region", -1));
        assert_eq!(definition.expire_after_seconds, Some(3600));
        assert!(definition.partial_filter_expression.is_some());
    }

    #[test]
    fn test_driver_error_classification() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        let lost = driver_error("shop.orders", mongodb::error::Error::from(io));
        assert!(matches!(lost, Error::Connection(_)));
        assert!(lost.is_fatal());

        let decode = mongodb::bson::from_bson::<i32>(Bson::String("x".into())).unwrap_err();
        let failed = driver_error("shop.orders", mongodb::error::Error::from(decode));
        assert!(matches!(failed, Error::Enumeration { ref scope, .. } if scope == "shop.orders"));
        assert!(!failed.is_fatal());
    }

    #[test]
    fn test_usage_record_missing_fields() {
        assert!(usage_record(&doc! { "name": "a_1" }).is_none());
    }

    #[test]
    fn test_key_value_bson() {
        assert_eq!(key_value_bson(&KeyValue::Int(-1)), Bson::Int32(-1));
        assert_eq!(key_value_bson(&KeyValue::Text("hashed".into())), Bson::String("hashed".into()));
    }
}
