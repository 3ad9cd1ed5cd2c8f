//! Flat-file persistence sinks
//!
//! Two sinks share the same append contract: read what the file already
//! holds, deduplicate incoming draws by draw id, merge, sort newest-first,
//! and rewrite the whole file atomically. A crash mid-write never leaves a
//! half-written file at the canonical path; the temp file is simply orphaned.

mod csv_sink;
mod json_sink;

pub use csv_sink::CsvSink;
pub use json_sink::JsonSink;

use crate::records::{DrawRecord, SessionMetadata};
use crate::StorageError;
use std::path::Path;

/// A persistence target for draw records
pub trait Sink {
    /// Appends records, deduplicating against what the file already holds
    ///
    /// Re-appending records whose draw ids are already present changes
    /// nothing. Returns the number of newly persisted records.
    fn append(&self, draws: &[DrawRecord], metadata: &SessionMetadata)
        -> Result<usize, StorageError>;
}

/// Writes `bytes` to `path` atomically via a temp file and rename
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    let tmp = path.with_extension("tmp");

    std::fs::write(&tmp, bytes).map_err(|source| StorageError::Io {
        path: tmp.display().to_string(),
        source,
    })?;

    std::fs::rename(&tmp, path).map_err(|source| {
        // Leave no temp file behind on a failed rename
        let _ = std::fs::remove_file(&tmp);
        StorageError::Io {
            path: path.display().to_string(),
            source,
        }
    })
}

/// Creates the parent directory of `path` if it does not exist yet
pub(crate) fn ensure_parent_dir(path: &Path) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }
    }
    Ok(())
}

/// Sorts records newest-first, the display order both sinks persist
pub(crate) fn sort_newest_first(draws: &mut [DrawRecord]) {
    draws.sort_by(|a, b| b.date().cmp(&a.date()));
}
