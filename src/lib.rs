//! Index catalog analysis for document database deployments
//!
//! Inventories every collection's indexes, flags shard keys and redundant
//! indexes, attributes per-host usage counters, and renders the result as a
//! text report or a compressed snapshot.
//!
//! ```no_run
//! use indexlens::{CatalogBuilder, FixtureSource, OptionsBuilder, RenderOptions, Renderer};
//!
//! # fn main() -> indexlens::Result<()> {
//! let source = FixtureSource::load("deployment.json")?;
//! let options = OptionsBuilder::new().database("shop").build();
//! let report = CatalogBuilder::new(&source, options).build()?;
//! print!("{}", Renderer::new(RenderOptions::default()).render(&report.catalog));
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod constants;
pub mod duplicate;
pub mod error;
pub mod format;
pub mod index;
#[cfg(feature = "mongodb")]
pub mod mongo;
pub mod normalize;
pub mod options;
pub mod render;
pub mod restore;
pub mod shard;
pub mod snapshot;
pub mod source;
pub mod usage;

pub use builder::{CatalogBuilder, ScanReport, ScanStats};
pub use error::{Error, Result};
pub use index::{
    Accesses, Catalog, CatalogSummary, CollectionIndexes, IndexClass, IndexDefinition, IndexUsage, KeyPattern,
    KeyValue, Namespace, NormalizedIndex, UsageRecord,
};
#[cfg(feature = "mongodb")]
pub use mongo::MongoSource;
pub use options::{BuildOptions, OptionsBuilder, RenderOptions};
pub use render::Renderer;
pub use restore::{restore_catalog, restore_plan, RestoreReport};
pub use snapshot::{Snapshot, SnapshotHeader};
pub use source::{CollectionInfo, FixtureSource, IndexSink, IndexSource};
