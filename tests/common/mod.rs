#![allow(dead_code)]

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;

use indexlens::{Accesses, FixtureSource, IndexDefinition, KeyPattern, Namespace, UsageRecord};

pub const HOST: &str = "db1:27017";

pub fn setup_temp_dir() -> Result<TempDir> {
    tempfile::tempdir().map_err(anyhow::Error::from)
}

pub fn since() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

pub fn key(fields: &[(&str, i64)]) -> KeyPattern {
    fields
        .iter()
        .fold(KeyPattern::new(), |key, (field, dir)| key.with(*field, *dir))
}

pub fn def(name: &str, fields: &[(&str, i64)]) -> IndexDefinition {
    IndexDefinition::new(name, key(fields))
}

pub fn id_index() -> IndexDefinition {
    def("_id_", &[("_id", 1)])
}

pub fn usage(name: &str, host: &str, ops: u64) -> UsageRecord {
    UsageRecord {
        name: name.to_string(),
        host: host.to_string(),
        accesses: Accesses { ops, since: since() },
    }
}

pub fn orders() -> Namespace {
    Namespace::new("shop", "orders")
}

/// shop.orders with an identity index, an unused `{a: 1}` covered by the
/// active `{a: 1, b: 1}`, and `{c: 1}` as the shard key
pub fn scenario() -> FixtureSource {
    let ns = orders();
    let mut source = FixtureSource::new(HOST);
    source
        .add_collection(
            &ns,
            vec![
                id_index(),
                def("a_1", &[("a", 1)]),
                def("a_1_b_1", &[("a", 1), ("b", 1)]),
                def("c_1", &[("c", 1)]),
            ],
        )
        .add_usage(&ns, usage("_id_", "H1", 0))
        .add_usage(&ns, usage("a_1", "H1", 0))
        .add_usage(&ns, usage("a_1_b_1", "H1", 5))
        .add_usage(&ns, usage("c_1", "H1", 0))
        .add_shard_key(&ns, key(&[("c", 1)]));
    source
}

/// Two user databases, a system database, a view and a system collection
pub fn multi_database() -> FixtureSource {
    let mut source = scenario();
    source
        .add_collection(&Namespace::new("admin", "system.users"), vec![id_index()])
        .add_collection(&Namespace::new("crm", "contacts"), vec![id_index(), def("email_1", &[("email", 1)])])
        .add_collection(&Namespace::new("crm", "system.profile"), vec![id_index()])
        .add_view(&Namespace::new("crm", "active_contacts"))
        .add_usage(&Namespace::new("crm", "contacts"), usage("email_1", "H2", 12));
    source
}
