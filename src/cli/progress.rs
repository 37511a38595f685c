use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown on stderr while namespaces are scanned
pub struct ScanProgress {
    pb: Option<ProgressBar>,
}

impl ScanProgress {
    /// Hidden when `quiet`, so scripted runs keep stderr clean
    pub fn new(quiet: bool) -> Self {
        if quiet {
            return Self { pb: None };
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {pos} collections | {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        Self { pb: Some(pb) }
    }

    pub fn tick<S: Into<String>>(&self, msg: S) {
        if let Some(pb) = &self.pb {
            pb.inc(1);
            pb.set_message(msg.into());
        }
    }

    pub fn finish(&self) {
        if let Some(pb) = &self.pb {
            pb.finish_and_clear();
        }
    }
}
