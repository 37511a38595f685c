// Restore command - recreate a snapshot's indexes on a deployment
use anyhow::{bail, Context, Result};
use clap::{Args, ValueHint};
use indexlens::{restore_catalog, restore_plan, IndexSink, Snapshot};
use std::path::PathBuf;

use super::utils::GlobalArgs;

#[derive(Args)]
#[command(
    about = "Recreate a snapshot's indexes on a deployment",
    long_about = "Replay every index definition recorded in a snapshot (name, key and\n\
                  options) with createIndexes. The identity index is skipped; a failing\n\
                  index is reported and the replay continues.",
    after_help = "Examples:\n  \
        # List what would be created\n  \
        indexlens restore out/db1_27017-index.json.zst --dry-run\n\n  \
        # Create the indexes on a staging deployment\n  \
        indexlens restore out/db1_27017-index.json.zst --uri mongodb://staging:27017"
)]
pub struct RestoreCommand {
    /// Snapshot file (*-index.json.zst)
    #[arg(value_hint = ValueHint::FilePath)]
    pub file: PathBuf,

    /// Connection string of the target deployment
    #[arg(long, env = "MONGODB_URI", hide_env_values = true)]
    pub uri: Option<String>,

    /// Only print the indexes that would be created
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(cmd: RestoreCommand, global: GlobalArgs) -> Result<()> {
    let snapshot = Snapshot::load(&cmd.file)
        .with_context(|| format!("Failed to load snapshot: {}", cmd.file.display()))?;

    if cmd.dry_run {
        for (ns, index) in restore_plan(&snapshot.catalog) {
            println!("{}\t{}\t{}", ns, index.name(), index.key_string);
        }
        return Ok(());
    }

    let Some(uri) = cmd.uri.as_deref() else {
        bail!("No target given: pass --uri (or set MONGODB_URI), or use --dry-run");
    };
    let sink = connect(uri)?;
    let report = restore_catalog(&snapshot.catalog, sink.as_ref());

    if !global.quiet {
        eprintln!("{} indexes created, {} failed", report.created, report.failed);
    }
    if report.failed > 0 {
        bail!("{} indexes could not be created", report.failed);
    }
    Ok(())
}

#[cfg(feature = "mongodb")]
fn connect(uri: &str) -> Result<Box<dyn IndexSink>> {
    let sink = indexlens::MongoSource::connect(uri).context("Failed to connect")?;
    Ok(Box::new(sink))
}

#[cfg(not(feature = "mongodb"))]
fn connect(_uri: &str) -> Result<Box<dyn IndexSink>> {
    bail!("Built without the `mongodb` feature; rebuild with --features mongodb")
}
