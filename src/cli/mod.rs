use anyhow::Result;
use clap::{Parser, Subcommand};

// CLI Commands (cmd_ prefix)
mod cmd_restore;
mod cmd_scan;
mod cmd_show;

// Helper modules (no cmd_ prefix)
mod logger;
mod progress;
mod utils;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Format custom help template with grouped commands
fn format_help_template() -> &'static str {
    concat!(
        "{about-with-newline}\n\n",
        "{usage-heading}\n  {usage}\n\n",
        "Options:\n{options}\n\n",
        "Analysis:\n",
        "  scan      Inventory indexes, flag duplicates and unused ones\n",
        "  show      Render a saved snapshot\n",
        "\n",
        "Maintenance:\n",
        "  restore   Recreate a snapshot's indexes on a deployment\n",
        "\n",
        "See 'indexlens <COMMAND> --help' for more information on a specific command.\n"
    )
}

#[derive(Parser)]
#[command(bin_name = "indexlens")]
#[command(version = VERSION)]
#[command(about = concat!("indexlens v", env!("CARGO_PKG_VERSION"), " - Index Catalog Analyzer"))]
#[command(long_about = concat!(
    "indexlens v", env!("CARGO_PKG_VERSION"), " - Index Catalog Analyzer\n\n",
    "Lists every index of a document database deployment, marks shard keys,\n",
    "redundant (prefix-covered) indexes and indexes that never served an\n",
    "operation, and shows per-host usage counters for each."
))]
#[command(propagate_version = true)]
#[command(help_template = format_help_template())]
pub struct Cli {
    /// Suppress progress output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Enable verbose output
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Disable colored output (markers are kept)
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Scan(cmd_scan::ScanCommand),
    Show(cmd_show::ShowCommand),
    Restore(cmd_restore::RestoreCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logger based on verbosity flags
    logger::init_logger(cli.verbose, cli.quiet);

    let global = utils::GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        no_color: cli.no_color,
    };

    match cli.command {
        Commands::Scan(cmd) => cmd_scan::run(cmd, global)?,
        Commands::Show(cmd) => cmd_show::run(cmd, global)?,
        Commands::Restore(cmd) => cmd_restore::run(cmd, global)?,
    }

    Ok(())
}
