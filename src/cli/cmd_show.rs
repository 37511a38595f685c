// Show command - render a saved snapshot without touching any deployment
use anyhow::{Context, Result};
use clap::{Args, ValueHint};
use indexlens::Snapshot;
use std::path::PathBuf;

use super::utils::{self, GlobalArgs};

#[derive(Args)]
#[command(
    about = "Render a saved snapshot",
    long_about = "Load a snapshot written by 'scan --save' and print its report exactly as\n\
                  recorded: duplicate and shard-key flags are not recomputed.",
    after_help = "Examples:\n  \
        # Print the report\n  \
        indexlens show out/db1_27017-index.json.zst\n\n  \
        # Header and catalog as JSON\n  \
        indexlens show out/db1_27017-index.json.zst --json"
)]
pub struct ShowCommand {
    /// Snapshot file (*-index.json.zst)
    #[arg(value_hint = ValueHint::FilePath)]
    pub file: PathBuf,

    /// Print header and catalog as JSON
    #[arg(long)]
    pub json: bool,

    /// Write the output to a file instead of stdout
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Append a one-line summary
    #[arg(long)]
    pub summary: bool,

    /// Omit per-host usage lines
    #[arg(long)]
    pub no_usage: bool,
}

pub fn run(cmd: ShowCommand, global: GlobalArgs) -> Result<()> {
    let snapshot = Snapshot::load(&cmd.file)
        .with_context(|| format!("Failed to load snapshot: {}", cmd.file.display()))?;

    if cmd.json {
        let mut json = snapshot.to_json_pretty()?;
        json.push('\n');
        return utils::write_output(&json, cmd.output.as_deref());
    }

    if !global.quiet {
        let header = &snapshot.header;
        eprintln!(
            "{} | source {} | scope {} | {} | {} indexes",
            header.created_by,
            header.source_host,
            header.scope,
            indexlens::format::format_timestamp(&header.created_at),
            header.index_count
        );
    }

    let report = utils::render_report(&snapshot.catalog, global, cmd.output.is_some(), cmd.no_usage, cmd.summary);
    utils::write_output(&report, cmd.output.as_deref())
}
