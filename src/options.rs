/// Configuration for one catalog build
///
/// Passed to the builder by value; the builder never mutates it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Restrict the scan to one database (system databases included if named)
    pub database: Option<String>,
    /// Log every namespace and index as it is processed
    pub verbose: bool,
}

impl BuildOptions {
    /// Human-readable scan scope stored in snapshot headers
    pub fn scope(&self) -> String {
        self.database.clone().unwrap_or_else(|| "*".to_string())
    }
}

/// Rendering switches for the text report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Drop ANSI styling; markers are kept
    pub no_color: bool,
    /// Print one sub-line per usage entry
    pub show_usage: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            no_color: false,
            show_usage: true,
        }
    }
}

/// Builder for BuildOptions
pub struct OptionsBuilder {
    options: BuildOptions,
}

impl OptionsBuilder {
    pub fn new() -> Self {
        Self {
            options: BuildOptions::default(),
        }
    }

    pub fn database<S: Into<String>>(mut self, db: S) -> Self {
        self.options.database = Some(db.into());
        self
    }

    pub fn maybe_database(mut self, db: Option<String>) -> Self {
        self.options.database = db;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.options.verbose = verbose;
        self
    }

    pub fn build(self) -> BuildOptions {
        self.options
    }
}

impl Default for OptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
