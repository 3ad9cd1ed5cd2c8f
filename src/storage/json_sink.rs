//! JSON results document sink
//!
//! The file is a single `{metadata, draws}` document. Appends rewrite the
//! whole document: merged draws sorted newest-first, metadata refreshed with
//! the new total and scrape timestamp.

use crate::records::{DrawRecord, SessionMetadata, SessionResult};
use crate::storage::{ensure_parent_dir, sort_newest_first, write_atomic, Sink};
use crate::StorageError;
use chrono::Utc;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Append-with-dedup JSON sink
pub struct JsonSink {
    path: PathBuf,
}

impl JsonSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the existing document, or starts a fresh one from `metadata`
    fn load_or_create(&self, metadata: &SessionMetadata) -> Result<SessionResult, StorageError> {
        if !self.path.exists() {
            return Ok(SessionResult {
                metadata: metadata.clone(),
                draws: Vec::new(),
            });
        }

        let content =
            std::fs::read_to_string(&self.path).map_err(|source| StorageError::Io {
                path: self.path.display().to_string(),
                source,
            })?;

        serde_json::from_str(&content).map_err(|e| StorageError::Corrupt {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })
    }
}

impl Sink for JsonSink {
    fn append(
        &self,
        draws: &[DrawRecord],
        metadata: &SessionMetadata,
    ) -> Result<usize, StorageError> {
        let mut document = self.load_or_create(metadata)?;

        let known: HashSet<i64> = document.draws.iter().map(|d| d.draw_id()).collect();
        let fresh: Vec<DrawRecord> = draws
            .iter()
            .filter(|d| !known.contains(&d.draw_id()))
            .cloned()
            .collect();

        if fresh.is_empty() && self.path.exists() {
            tracing::info!(path = %self.path.display(), "no new draws to append");
            return Ok(0);
        }

        let appended = fresh.len();
        document.draws.extend(fresh);
        sort_newest_first(&mut document.draws);

        document.metadata.total_draws = document.draws.len();
        document.metadata.scrape_date = Utc::now();

        let json =
            serde_json::to_vec_pretty(&document).map_err(|source| StorageError::Json {
                path: self.path.display().to_string(),
                source,
            })?;

        ensure_parent_dir(&self.path)?;
        write_atomic(&self.path, &json)?;

        tracing::info!(
            path = %self.path.display(),
            appended,
            total = document.metadata.total_draws,
            "JSON document written"
        );

        Ok(appended)
    }
}
