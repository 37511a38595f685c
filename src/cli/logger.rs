// Logging utilities for CLI
use std::io::Write;

/// Initialize logger for CLI
pub fn init_logger(verbose: bool, quiet: bool) {
    // RUST_LOG overrides the flags entirely
    if std::env::var("RUST_LOG").is_ok() {
        return env_logger::init();
    }

    let default_level = if quiet {
        log::LevelFilter::Error
    } else if verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };

    let mut builder = env_logger::Builder::new();

    builder.filter_level(default_level).format(|buf, record| {
        // For verbose/debug output, include level prefix
        if record.level() >= log::Level::Debug {
            writeln!(buf, "[{}] {}", record.level(), record.args())
        } else {
            writeln!(buf, "{}", record.args())
        }
    });

    // Debug logs only from our own crate, never from the driver
    if verbose {
        builder.filter_module("indexlens", log::LevelFilter::Debug);
        builder.filter_module("mongodb", log::LevelFilter::Warn);
    }

    builder.init();
}
