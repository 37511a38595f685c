mod common;

use anyhow::Result;
use indexlens::{
    BuildOptions, CatalogBuilder, CollectionInfo, Error, FixtureSource, IndexClass, IndexDefinition, IndexSource,
    KeyPattern, Namespace, OptionsBuilder, RenderOptions, Renderer, UsageRecord,
};

/// Fixture deployment with injectable failures
#[derive(Default)]
struct FlakySource {
    inner: FixtureSource,
    fail_list_databases: bool,
    fail_collections_of: Option<&'static str>,
    fail_indexes_of: Option<Namespace>,
    disconnect_at: Option<Namespace>,
}

impl FlakySource {
    fn new(inner: FixtureSource) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }
}

fn enumeration(scope: impl Into<String>) -> Error {
    Error::Enumeration {
        scope: scope.into(),
        reason: "injected".to_string(),
    }
}

impl IndexSource for FlakySource {
    fn source_host(&self) -> String {
        self.inner.source_host()
    }

    fn list_databases(&self) -> indexlens::Result<Vec<String>> {
        if self.fail_list_databases {
            return Err(enumeration("databases"));
        }
        self.inner.list_databases()
    }

    fn list_collections(&self, db: &str) -> indexlens::Result<Vec<CollectionInfo>> {
        if self.fail_collections_of == Some(db) {
            return Err(enumeration(db));
        }
        self.inner.list_collections(db)
    }

    fn list_indexes(&self, ns: &Namespace) -> indexlens::Result<Vec<IndexDefinition>> {
        if self.disconnect_at.as_ref() == Some(ns) {
            return Err(Error::Connection("connection reset".to_string()));
        }
        if self.fail_indexes_of.as_ref() == Some(ns) {
            return Err(enumeration(ns.to_string()));
        }
        self.inner.list_indexes(ns)
    }

    fn index_usage_stats(&self, ns: &Namespace) -> indexlens::Result<Vec<UsageRecord>> {
        self.inner.index_usage_stats(ns)
    }

    fn is_shard_key(&self, ns: &Namespace, key: &KeyPattern) -> bool {
        self.inner.is_shard_key(ns, key)
    }
}

fn plain_renderer() -> Renderer {
    Renderer::new(RenderOptions {
        no_color: true,
        show_usage: true,
    })
}

#[test]
fn test_scenario_classification() -> Result<()> {
    let source = common::scenario();
    let report = CatalogBuilder::new(&source, BuildOptions::default()).build()?;
    assert!(report.aborted.is_none());

    let list = report.catalog.indexes(&common::orders()).expect("shop.orders scanned");
    let keys: Vec<&str> = list.iter().map(|ix| ix.key_string.as_str()).collect();
    assert_eq!(keys, vec!["{ _id: 1 }", "{ a: 1 }", "{ a: 1, b: 1 }", "{ c: 1 }"]);

    let classes: Vec<IndexClass> = list.iter().map(|ix| ix.classification()).collect();
    assert_eq!(
        classes,
        vec![IndexClass::Identity, IndexClass::Duplicate, IndexClass::Active, IndexClass::ShardKey]
    );
    assert_eq!(list[2].total_ops, 5);
    assert_eq!(list[2].usage.len(), 1);
    assert_eq!(list[2].usage[0].host, "H1");
    assert_eq!(report.stats.duplicates, 1);
    Ok(())
}

#[test]
fn test_scenario_report_text() -> Result<()> {
    let source = common::scenario();
    let report = CatalogBuilder::new(&source, BuildOptions::default()).build()?;
    let text = Renderer::new(RenderOptions {
        no_color: true,
        show_usage: false,
    })
    .render(&report.catalog);

    assert_eq!(
        text,
        "\nshop.orders:\n  { _id: 1 }\nx { a: 1 }\n  { a: 1, b: 1 }\n* { c: 1 }\n\n"
    );
    Ok(())
}

#[test]
fn test_usage_lines_rendered_per_host() -> Result<()> {
    let mut source = common::scenario();
    source.add_usage(&common::orders(), common::usage("a_1_b_1", "H2", 7));
    let report = CatalogBuilder::new(&source, BuildOptions::default()).build()?;

    let text = plain_renderer().render(&report.catalog);
    assert!(text.contains(
        "  { a: 1, b: 1 }\n\thost: H1, ops: 5, since: 2024-01-01T00:00:00Z\n\thost: H2, ops: 7, since: 2024-01-01T00:00:00Z\n"
    ));
    let list = report.catalog.indexes(&common::orders()).unwrap();
    assert_eq!(list[2].total_ops, 12);
    Ok(())
}

#[test]
fn test_render_is_deterministic() -> Result<()> {
    let source = common::multi_database();
    let first = CatalogBuilder::new(&source, BuildOptions::default()).build()?;
    let second = CatalogBuilder::new(&source, BuildOptions::default()).build()?;
    assert_eq!(first.catalog, second.catalog);

    let renderer = plain_renderer();
    assert_eq!(renderer.render(&first.catalog), renderer.render(&second.catalog));
    Ok(())
}

#[test]
fn test_system_scopes_skipped() -> Result<()> {
    let source = common::multi_database();
    let report = CatalogBuilder::new(&source, BuildOptions::default()).build()?;

    let namespaces: Vec<String> = report.catalog.namespaces().map(|(ns, _)| ns.to_string()).collect();
    assert_eq!(namespaces, vec!["crm.contacts", "shop.orders"]);
    assert_eq!(report.stats.databases, 2);
    assert_eq!(report.stats.collections, 2);
    Ok(())
}

#[test]
fn test_database_scope_limits_scan() -> Result<()> {
    let source = common::multi_database();
    let options = OptionsBuilder::new().database("crm").build();
    let report = CatalogBuilder::new(&source, options).build()?;

    let namespaces: Vec<String> = report.catalog.namespaces().map(|(ns, _)| ns.to_string()).collect();
    assert_eq!(namespaces, vec!["crm.contacts"]);
    Ok(())
}

#[test]
fn test_empty_deployment() -> Result<()> {
    let source = FixtureSource::new(common::HOST);
    let report = CatalogBuilder::new(&source, BuildOptions::default()).build()?;
    assert!(report.catalog.is_empty());
    assert!(report.aborted.is_none());
    assert_eq!(plain_renderer().render(&report.catalog), "");
    Ok(())
}

#[test]
fn test_collection_without_indexes() -> Result<()> {
    let mut source = FixtureSource::new(common::HOST);
    source.add_collection(&Namespace::new("shop", "empty"), Vec::new());
    let report = CatalogBuilder::new(&source, BuildOptions::default()).build()?;

    assert_eq!(report.catalog.indexes(&Namespace::new("shop", "empty")), Some(&[][..]));
    assert_eq!(plain_renderer().render(&report.catalog), "\nshop.empty:\n\n");
    Ok(())
}

#[test]
fn test_unknown_usage_record_dropped() -> Result<()> {
    let mut source = common::scenario();
    source.add_usage(&common::orders(), common::usage("dropped_meanwhile", "H1", 99));
    let report = CatalogBuilder::new(&source, BuildOptions::default()).build()?;

    assert_eq!(report.stats.dropped_usage_records, 1);
    let total: u64 = report
        .catalog
        .indexes(&common::orders())
        .unwrap()
        .iter()
        .map(|ix| ix.total_ops)
        .sum();
    assert_eq!(total, 5);
    Ok(())
}

#[test]
fn test_collection_failure_skips_collection() -> Result<()> {
    let mut source = FlakySource::new(common::multi_database());
    source.fail_indexes_of = Some(Namespace::new("crm", "contacts"));
    let report = CatalogBuilder::new(&source, BuildOptions::default()).build()?;

    assert!(report.aborted.is_none());
    assert_eq!(report.stats.skipped_collections, 1);
    assert!(report.catalog.indexes(&Namespace::new("crm", "contacts")).is_none());
    assert!(report.catalog.indexes(&common::orders()).is_some());
    Ok(())
}

#[test]
fn test_collection_listing_failure_stops_scan() -> Result<()> {
    let mut inner = common::multi_database();
    inner.add_collection(&Namespace::new("zoo", "animals"), vec![common::id_index()]);
    let mut source = FlakySource::new(inner);
    source.fail_collections_of = Some("shop");

    let report = CatalogBuilder::new(&source, BuildOptions::default()).build()?;

    // crm completed before shop failed; zoo was never reached
    let dbs: Vec<&String> = report.catalog.databases().map(|(name, _)| name).collect();
    assert_eq!(dbs, vec!["crm"]);
    assert!(matches!(report.aborted, Some(Error::Enumeration { ref scope, .. }) if scope == "shop"));
    Ok(())
}

#[test]
fn test_database_listing_failure_is_error() {
    let mut source = FlakySource::new(common::multi_database());
    source.fail_list_databases = true;
    let result = CatalogBuilder::new(&source, BuildOptions::default()).build();
    assert!(matches!(result, Err(Error::Enumeration { .. })));
}

#[test]
fn test_connection_loss_is_fatal() {
    let mut source = FlakySource::new(common::multi_database());
    source.disconnect_at = Some(common::orders());
    let result = CatalogBuilder::new(&source, BuildOptions::default()).build();
    assert!(matches!(result, Err(Error::Connection(_))));
}

#[test]
fn test_summary_counts() -> Result<()> {
    let source = common::multi_database();
    let report = CatalogBuilder::new(&source, BuildOptions::default()).build()?;
    let summary = report.catalog.summary();

    assert_eq!(summary.databases, 2);
    assert_eq!(summary.collections, 2);
    assert_eq!(summary.indexes, 6);
    assert_eq!(summary.duplicates, 1);
    assert_eq!(summary.shard_keys, 1);
    // crm.contacts _id_ has no usage record and counts as identity, not unused
    assert_eq!(summary.unused, 0);
    assert_eq!(summary.total_ops, 17);
    Ok(())
}

#[test]
fn test_fixture_file_round_trip() -> Result<()> {
    let dir = common::setup_temp_dir()?;
    let path = dir.path().join("deployment.json");
    std::fs::write(&path, serde_json::to_vec_pretty(&common::scenario())?)?;

    let loaded = FixtureSource::load(&path)?;
    assert_eq!(loaded.source_host(), common::HOST);
    assert!(loaded.is_shard_key(&common::orders(), &common::key(&[("c", 1)])));

    let from_file = CatalogBuilder::new(&loaded, BuildOptions::default()).build()?;
    let from_memory = CatalogBuilder::new(&common::scenario(), BuildOptions::default()).build()?;
    assert_eq!(from_file.catalog, from_memory.catalog);
    Ok(())
}
