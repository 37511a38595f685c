// Scan command - build the index catalog of a deployment
use anyhow::{bail, Context, Result};
use clap::{Args, ValueHint};
use indexlens::constants;
use indexlens::{CatalogBuilder, FixtureSource, IndexSource, Namespace, OptionsBuilder, ScanReport, Snapshot};
use std::path::PathBuf;

use super::progress::ScanProgress;
use super::utils::{self, GlobalArgs};

#[derive(Args)]
#[command(
    about = "Inventory indexes, flag duplicates and unused ones",
    long_about = "Scan every user database and collection of a deployment and print one\n\
                  block per namespace, one line per index:\n\n  \
                    (two spaces)  identity index or index in use\n  \
                    *  shard key\n  \
                    x  redundant: another index with the same leading field covers it\n  \
                    ?  never used since the server started\n\n\
                  Per-host usage lines follow each index. System databases (admin,\n\
                  config, local), system.* collections and views are skipped.",
    after_help = "Examples:\n  \
        # Scan a live deployment\n  \
        indexlens scan --uri mongodb://localhost:27017\n\n  \
        # One database only, save a snapshot under ./out\n  \
        indexlens scan --uri mongodb://localhost:27017 --db shop --save\n\n  \
        # Analyze a deployment described in a JSON file\n  \
        indexlens scan --fixture deployment.json --summary"
)]
pub struct ScanCommand {
    /// Connection string of the deployment
    #[arg(long, env = "MONGODB_URI", hide_env_values = true)]
    pub uri: Option<String>,

    /// Read the deployment from a JSON fixture file instead of a server
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub fixture: Option<PathBuf>,

    /// Only scan this database
    #[arg(short = 'd', long = "db")]
    pub database: Option<String>,

    /// Save a snapshot of the catalog
    #[arg(long)]
    pub save: bool,

    /// Directory snapshots are saved in
    #[arg(long, default_value = constants::DEFAULT_OUTPUT_DIR, value_hint = ValueHint::DirPath)]
    pub out_dir: PathBuf,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Append a one-line summary
    #[arg(long)]
    pub summary: bool,

    /// Omit per-host usage lines
    #[arg(long)]
    pub no_usage: bool,
}

pub fn run(cmd: ScanCommand, global: GlobalArgs) -> Result<()> {
    let options = OptionsBuilder::new()
        .maybe_database(cmd.database.clone())
        .verbose(global.verbose)
        .build();
    let source = open_source(&cmd)?;

    let progress = ScanProgress::new(global.quiet);
    let result = CatalogBuilder::new(source.as_ref(), options.clone())
        .build_with_progress(Some(|ns: &Namespace| progress.tick(ns.to_string())));
    progress.finish();
    let ScanReport { catalog, aborted, .. } = result.context("Failed to build index catalog")?;

    let report = utils::render_report(&catalog, global, cmd.output.is_some(), cmd.no_usage, cmd.summary);
    utils::write_output(&report, cmd.output.as_deref())?;

    if cmd.save {
        let snapshot = Snapshot::new(catalog, &source.source_host(), &options.scope())?;
        let path = snapshot
            .save_to_dir(&cmd.out_dir)
            .with_context(|| format!("Failed to save snapshot under {}", cmd.out_dir.display()))?;
        eprintln!("Index stats written to {}", utils::display_path(&path).display());
    }

    if let Some(e) = aborted {
        return Err(anyhow::Error::new(e).context("Scan stopped before all databases were processed"));
    }
    Ok(())
}

fn open_source(cmd: &ScanCommand) -> Result<Box<dyn IndexSource>> {
    if let Some(path) = &cmd.fixture {
        let source = FixtureSource::load(path)
            .with_context(|| format!("Failed to load fixture: {}", path.display()))?;
        return Ok(Box::new(source));
    }
    match &cmd.uri {
        Some(uri) => connect(uri),
        None => bail!("No deployment given: pass --uri (or set MONGODB_URI) or --fixture"),
    }
}

#[cfg(feature = "mongodb")]
fn connect(uri: &str) -> Result<Box<dyn IndexSource>> {
    let source = indexlens::MongoSource::connect(uri).context("Failed to connect")?;
    Ok(Box::new(source))
}

#[cfg(not(feature = "mongodb"))]
fn connect(_uri: &str) -> Result<Box<dyn IndexSource>> {
    bail!("Built without the `mongodb` feature; use --fixture or rebuild with --features mongodb")
}
