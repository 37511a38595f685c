//! Snapshot file format: a persisted catalog plus a small header
//!
//! Format:
//! - Skippable frame with the JSON header (magic 0x184D2A50)
//! - One zstd frame with the JSON catalog
//!
//! The header carries the SHA-256 of the uncompressed catalog JSON, verified
//! on load. A loaded snapshot is kept verbatim (no flag recomputation), so
//! encoding it again yields the same bytes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use crate::constants;
use crate::error::{Error, Result};
use crate::index::Catalog;

/// Metadata stored in the skippable frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    /// Format version
    pub format: String,

    /// Creator version (e.g., "indexlens/0.1.0")
    pub created_by: String,

    /// Host the catalog was read from
    pub source_host: String,

    /// Database the scan was restricted to, `*` for all
    pub scope: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// SHA-256 of the uncompressed catalog JSON
    pub content_hash: String,

    /// Number of indexes in the catalog
    pub index_count: usize,
}

/// A catalog together with its header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub header: SnapshotHeader,
    pub catalog: Catalog,
}

impl Snapshot {
    /// Wrap a freshly built catalog
    pub fn new(catalog: Catalog, source_host: &str, scope: &str) -> Result<Self> {
        let payload = encode_catalog(&catalog)?;
        let header = SnapshotHeader {
            format: constants::SNAPSHOT_FORMAT.to_string(),
            created_by: constants::created_by(),
            source_host: source_host.to_string(),
            scope: scope.to_string(),
            created_at: Utc::now(),
            content_hash: sha256_hex(&payload),
            index_count: catalog.index_count(),
        };
        Ok(Self { header, catalog })
    }

    /// Encode the snapshot
    ///
    /// The written hash and index count are taken from the current catalog,
    /// so edits made after [`Snapshot::new`] still produce a loadable file.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let payload = encode_catalog(&self.catalog)?;
        let header = SnapshotHeader {
            content_hash: sha256_hex(&payload),
            index_count: self.catalog.index_count(),
            ..self.header.clone()
        };
        let header = serde_json::to_vec(&header).map_err(codec)?;

        let mut buf = Vec::with_capacity(header.len() + payload.len() / 4 + 16);
        write_skippable_frame(&mut buf, constants::SKIPPABLE_MAGIC_HEADER, &header)?;
        let compressed = zstd::encode_all(payload.as_slice(), constants::ZSTD_COMPRESSION_LEVEL)?;
        buf.extend_from_slice(&compressed);
        Ok(buf)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(data);
        let (magic, header_bytes) = read_skippable_frame(&mut cursor)?;
        if magic != constants::SKIPPABLE_MAGIC_HEADER {
            return Err(Error::SnapshotCodec(format!(
                "unexpected magic: 0x{:08X} (expected 0x{:08X})",
                magic,
                constants::SKIPPABLE_MAGIC_HEADER
            )));
        }

        let header: SnapshotHeader = serde_json::from_slice(&header_bytes).map_err(codec)?;
        if header.format != constants::SNAPSHOT_FORMAT {
            return Err(Error::SnapshotCodec(format!(
                "unsupported snapshot format {:?}",
                header.format
            )));
        }

        let offset = cursor.position() as usize;
        let payload = zstd::decode_all(&data[offset..])
            .map_err(|e| Error::SnapshotCodec(format!("catalog frame: {}", e)))?;

        let actual = sha256_hex(&payload);
        if actual != header.content_hash {
            return Err(Error::SnapshotCodec(format!(
                "content hash mismatch: expected {}, got {}",
                header.content_hash, actual
            )));
        }

        let catalog: Catalog = serde_json::from_slice(&payload).map_err(codec)?;
        Ok(Self { header, catalog })
    }

    /// Load a snapshot file; the name must end with the snapshot suffix
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let is_snapshot = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(constants::SNAPSHOT_SUFFIX));
        if !is_snapshot {
            return Err(Error::UnsupportedFile(path.to_path_buf()));
        }
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Save to `path` atomically
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let data = self.to_bytes()?;
        let temp_path = path.with_extension("zst.tmp");

        std::fs::write(&temp_path, &data)?;
        std::fs::rename(&temp_path, path)?;
        Ok(())
    }

    /// Save under `dir` with the canonical filename for the source host
    pub fn save_to_dir<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = constants::snapshot_path(dir, &self.header.source_host);
        self.save(&path)?;
        Ok(path)
    }

    /// Header and catalog as pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(codec)
    }
}

fn codec(e: impl std::fmt::Display) -> Error {
    Error::SnapshotCodec(e.to_string())
}

fn encode_catalog(catalog: &Catalog) -> Result<Vec<u8>> {
    serde_json::to_vec(catalog).map_err(codec)
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Write a zstd skippable frame
pub fn write_skippable_frame<W: Write>(writer: &mut W, magic: u32, data: &[u8]) -> Result<usize> {
    let frame_size = u32::try_from(data.len())
        .map_err(|_| Error::SnapshotCodec(format!("frame too large: {} bytes", data.len())))?;

    // magic and size are little-endian
    writer.write_all(&magic.to_le_bytes())?;
    writer.write_all(&frame_size.to_le_bytes())?;
    writer.write_all(data)?;

    Ok(8 + data.len())
}

/// Read a zstd skippable frame
pub fn read_skippable_frame<R: Read>(reader: &mut R) -> Result<(u32, Vec<u8>)> {
    let mut magic_buf = [0u8; 4];
    reader
        .read_exact(&mut magic_buf)
        .map_err(|e| Error::SnapshotCodec(format!("truncated frame magic: {}", e)))?;
    let magic = u32::from_le_bytes(magic_buf);

    // skippable frames use 0x184D2A50 - 0x184D2A5F
    if !(0x184D2A50..=0x184D2A5F).contains(&magic) {
        return Err(Error::SnapshotCodec(format!(
            "not a skippable frame: magic=0x{:08X}",
            magic
        )));
    }

    let mut size_buf = [0u8; 4];
    reader
        .read_exact(&mut size_buf)
        .map_err(|e| Error::SnapshotCodec(format!("truncated frame size: {}", e)))?;
    let frame_size = u32::from_le_bytes(size_buf) as usize;
    if frame_size > constants::MAX_HEADER_SIZE {
        return Err(Error::SnapshotCodec(format!(
            "frame size {} exceeds limit {}",
            frame_size,
            constants::MAX_HEADER_SIZE
        )));
    }

    let mut data = vec![0u8; frame_size];
    reader
        .read_exact(&mut data)
        .map_err(|e| Error::SnapshotCodec(format!("truncated frame body: {}", e)))?;

    Ok((magic, data))
}
