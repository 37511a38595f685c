//! Text report rendering
//!
//! One block per namespace, one line per index prefixed with its class marker:
//!
//! ```text
//! shop.orders:
//!   { _id: 1 }
//! * { region: 1 }
//! x { a: 1 }
//! ? { b: 1 }
//!   { a: 1, b: 1 }
//! 	host: db1:27017, ops: 5, since: 2024-01-01T00:00:00Z
//! ```

use std::fmt::Write;

use crate::format::format_timestamp;
use crate::index::{Catalog, IndexClass, Namespace, NormalizedIndex};
use crate::options::RenderOptions;

// ANSI color codes for terminal output
const RESET: &str = "\x1b[0m";
const RED: &str = "\x1b[31;1m";
const BLUE: &str = "\x1b[34;1m";

/// Renders catalogs as deterministic text
#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer {
    options: RenderOptions,
}

impl Renderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render every namespace in database, then collection, name order
    pub fn render(&self, catalog: &Catalog) -> String {
        let mut out = String::new();
        for (ns, indexes) in catalog.namespaces() {
            out.push_str(&self.render_namespace(&ns, indexes));
        }
        out
    }

    pub fn render_namespace(&self, ns: &Namespace, indexes: &[NormalizedIndex]) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "\n{}:", ns);
        for index in indexes {
            out.push_str(&self.render_index(index));
        }
        out.push('\n');
        out
    }

    fn render_index(&self, index: &NormalizedIndex) -> String {
        let (marker, color) = match index.classification() {
            IndexClass::Identity => (" ", Some(RESET)),
            IndexClass::ShardKey => ("*", Some(RESET)),
            IndexClass::Duplicate => ("x", Some(RED)),
            IndexClass::Unused => ("?", Some(BLUE)),
            IndexClass::Active => (" ", None),
        };

        let mut line = match color {
            Some(code) if !self.options.no_color => {
                format!("{}{} {}{}", code, marker, index.key_string, RESET)
            }
            _ => format!("{} {}", marker, index.key_string),
        };

        if self.options.show_usage {
            for usage in &index.usage {
                let _ = write!(
                    line,
                    "\n\thost: {}, ops: {}, since: {}",
                    usage.host,
                    usage.ops,
                    format_timestamp(&usage.since)
                );
            }
        }
        line.push('\n');
        line
    }
}
