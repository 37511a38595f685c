// Shared utility functions for CLI commands

use anyhow::{Context, Result};
use indexlens::{Catalog, RenderOptions, Renderer};
use std::path::{Path, PathBuf};

/// Flags every subcommand receives
#[derive(Debug, Clone, Copy)]
pub struct GlobalArgs {
    pub quiet: bool,
    pub verbose: bool,
    pub no_color: bool,
}

/// Render the catalog report, with an optional summary footer
///
/// Colors are dropped when the report goes to a file.
pub fn render_report(catalog: &Catalog, global: GlobalArgs, to_file: bool, hide_usage: bool, summary: bool) -> String {
    let renderer = Renderer::new(RenderOptions {
        no_color: global.no_color || to_file,
        show_usage: !hide_usage,
    });
    let mut report = renderer.render(catalog);
    if summary {
        report.push_str(&catalog.summary().to_string());
        report.push('\n');
    }
    report
}

/// Write `text` to `output`, or stdout when none is given
pub fn write_output(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, text).with_context(|| format!("Failed to write report: {}", path.display()))?;
            eprintln!("Report written to {}", display_path(path).display());
        }
        None => print!("{}", text),
    }
    Ok(())
}

/// Display path resolving "." to absolute path
pub fn display_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
