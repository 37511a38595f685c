//! Global constants and helpers for binary identification, catalog filtering rules, and snapshot file naming
use std::path::{Path, PathBuf};

/// Binary name used in snapshot metadata
pub const BINARY_NAME: &str = "indexlens";

/// Package version from Cargo.toml (set at compile time)
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the created_by string for snapshot headers
pub fn created_by() -> String {
    format!("{}/{}", BINARY_NAME, VERSION)
}

// ============================================================================
// Catalog Constants
// ============================================================================

/// Key string of the identity index every collection carries
pub const IDENTITY_KEY: &str = "{ _id: 1 }";

/// Databases excluded from a full-deployment scan
pub const SYSTEM_DATABASES: [&str; 3] = ["admin", "config", "local"];

/// Collection name prefix for internal collections
pub const SYSTEM_COLLECTION_PREFIX: &str = "system.";

/// Collection type reported for regular collections (views report "view")
pub const COLLECTION_TYPE: &str = "collection";

/// Returns true for databases skipped during enumeration
pub fn is_system_database(name: &str) -> bool {
    SYSTEM_DATABASES.contains(&name)
}

// ============================================================================
// Snapshot Constants
// ============================================================================

/// Snapshot format identifier stored in the header
pub const SNAPSHOT_FORMAT: &str = "indexlens-v1";

/// Suffix every snapshot filename carries
pub const SNAPSHOT_SUFFIX: &str = "-index.json.zst";

/// Default directory for saved snapshots
pub const DEFAULT_OUTPUT_DIR: &str = "out";

/// Zstd compression level (1 = fast, 3 = balanced, 19 = maximum)
pub const ZSTD_COMPRESSION_LEVEL: i32 = 3;

/// Skippable frame magic number for the snapshot header
pub const SKIPPABLE_MAGIC_HEADER: u32 = 0x184D2A50;

/// Upper bound on a decoded header frame
pub const MAX_HEADER_SIZE: usize = 1024 * 1024;

/// Returns the canonical snapshot filename for a source host
///
/// Colons are replaced so `host:port` stays a valid filename everywhere.
pub fn snapshot_filename(source_host: &str) -> String {
    format!("{}{}", source_host.replace(':', "_"), SNAPSHOT_SUFFIX)
}

/// Resolves a snapshot path relative to the provided directory
pub fn snapshot_path(dir: impl AsRef<Path>, source_host: &str) -> PathBuf {
    dir.as_ref().join(snapshot_filename(source_host))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_by() {
        let cb = created_by();
        assert!(cb.starts_with("indexlens/"));
    }

    #[test]
    fn test_system_databases() {
        assert!(is_system_database("admin"));
        assert!(is_system_database("config"));
        assert!(is_system_database("local"));
        assert!(!is_system_database("shop"));
        assert!(!is_system_database("Admin"));
    }

    #[test]
    fn test_snapshot_filename() {
        assert_eq!(
            snapshot_filename("db1.example.com:27017"),
            "db1.example.com_27017-index.json.zst"
        );
        assert_eq!(snapshot_filename("localhost"), "localhost-index.json.zst");
    }

    #[test]
    fn test_snapshot_path() {
        let path = snapshot_path(Path::new("/tmp/out"), "h:1");
        assert_eq!(path, Path::new("/tmp/out/h_1-index.json.zst"));
    }
}
