//! Catalog builder: walks databases and collections in name order and runs each collection's
//! indexes through normalization, shard-key classification, usage aggregation and duplicate detection

use std::fmt;
use std::time::Instant;

use crate::constants;
use crate::duplicate::detect_duplicates;
use crate::error::{Error, Result};
use crate::format::format_std_duration_auto;
use crate::index::{Catalog, CollectionIndexes, Namespace, NormalizedIndex};
use crate::normalize::normalize;
use crate::options::BuildOptions;
use crate::shard::classify_shard_key;
use crate::source::IndexSource;
use crate::usage::aggregate_usage;

/// Counters collected during one build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub databases: usize,
    pub collections: usize,
    pub skipped_collections: usize,
    pub malformed_indexes: usize,
    pub dropped_usage_records: usize,
    pub duplicates: usize,
}

impl fmt::Display for ScanStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} databases, {} collections ({} skipped), {} malformed indexes, {} dropped usage records, {} duplicates",
            self.databases,
            self.collections,
            self.skipped_collections,
            self.malformed_indexes,
            self.dropped_usage_records,
            self.duplicates
        )
    }
}

/// Result of a build that got past database enumeration
#[derive(Debug)]
pub struct ScanReport {
    /// Databases completed before any abort
    pub catalog: Catalog,
    pub stats: ScanStats,
    /// Collection-listing failure that stopped the scan, if any
    pub aborted: Option<Error>,
}

/// Builds a fresh [`Catalog`] from an [`IndexSource`]
pub struct CatalogBuilder<'a, S: IndexSource + ?Sized> {
    source: &'a S,
    options: BuildOptions,
}

impl<'a, S: IndexSource + ?Sized> CatalogBuilder<'a, S> {
    pub fn new(source: &'a S, options: BuildOptions) -> Self {
        Self { source, options }
    }

    pub fn build(&self) -> Result<ScanReport> {
        self.build_with_progress(None::<fn(&Namespace)>)
    }

    /// Build the catalog, invoking `progress_cb` before each collection is scanned
    ///
    /// Failing to list databases (or losing the connection) is returned as an
    /// error. Failing to list one database's collections stops the scan; the
    /// databases completed so far are kept and the error is reported in
    /// [`ScanReport::aborted`]. Failures inside a single collection skip that
    /// collection, and malformed index definitions are left out.
    pub fn build_with_progress<F>(&self, progress_cb: Option<F>) -> Result<ScanReport>
    where
        F: Fn(&Namespace),
    {
        let start = Instant::now();
        let mut catalog = Catalog::new();
        let mut stats = ScanStats::default();
        let mut aborted = None;

        for db in self.databases()? {
            if self.options.verbose {
                log::info!("checking {}", db);
            }
            match self.scan_database(&db, &mut stats, progress_cb.as_ref()) {
                Ok(collections) => {
                    stats.databases += 1;
                    catalog.insert(db, collections);
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    log::error!("Aborting scan at database {}: {}", db, e);
                    aborted = Some(e);
                    break;
                }
            }
        }

        if stats.databases == 0 && aborted.is_none() {
            log::warn!("No database is available");
        }
        log::info!(
            "Catalog built in {}: {}",
            format_std_duration_auto(start.elapsed()),
            stats
        );

        Ok(ScanReport {
            catalog,
            stats,
            aborted,
        })
    }

    /// Databases to scan, in name order
    fn databases(&self) -> Result<Vec<String>> {
        if let Some(db) = &self.options.database {
            return Ok(vec![db.clone()]);
        }

        let mut names: Vec<String> = self
            .source
            .list_databases()?
            .into_iter()
            .filter(|name| {
                let system = constants::is_system_database(name);
                if system {
                    log::debug!("skip {}", name);
                }
                !system
            })
            .collect();
        names.sort();
        Ok(names)
    }

    fn scan_database<F>(
        &self,
        db: &str,
        stats: &mut ScanStats,
        progress_cb: Option<&F>,
    ) -> Result<CollectionIndexes>
    where
        F: Fn(&Namespace),
    {
        let mut names: Vec<String> = self
            .source
            .list_collections(db)?
            .into_iter()
            .filter(|info| {
                let keep = info.is_user_collection();
                if !keep {
                    log::debug!("skip {}.{}", db, info.name);
                }
                keep
            })
            .map(|info| info.name)
            .collect();
        names.sort();

        let mut collections = CollectionIndexes::new();
        for name in names {
            let ns = Namespace::new(db, name.as_str());
            if let Some(cb) = progress_cb {
                cb(&ns);
            }
            match self.scan_collection(&ns, stats) {
                Ok(indexes) => {
                    stats.collections += 1;
                    collections.insert(name, indexes);
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    log::warn!("Skipping {}: {}", ns, e);
                    stats.skipped_collections += 1;
                }
            }
        }
        Ok(collections)
    }

    fn scan_collection(&self, ns: &Namespace, stats: &mut ScanStats) -> Result<Vec<NormalizedIndex>> {
        let records = self.source.index_usage_stats(ns)?;
        let definitions = self.source.list_indexes(ns)?;

        let mut indexes = Vec::with_capacity(definitions.len());
        for definition in definitions {
            match normalize(definition, ns) {
                Ok(mut index) => {
                    classify_shard_key(&mut index, ns, self.source);
                    if self.options.verbose {
                        log::debug!("{} {}", ns, index.key_string);
                    }
                    indexes.push(index);
                }
                Err(e) => {
                    log::warn!("{}", e);
                    stats.malformed_indexes += 1;
                }
            }
        }

        stats.dropped_usage_records += aggregate_usage(&mut indexes, records, ns);
        // leaves the list sorted by effective key
        stats.duplicates += detect_duplicates(&mut indexes);
        Ok(indexes)
    }
}
