//! CSV results sink
//!
//! Each draw flattens into fixed numbered columns: the 7 winning numbers,
//! the bonus, and the optional jackpot/winners fields (empty when absent).
//! Companion sub-game sets do not survive the flattening; the JSON sink is
//! the lossless format.

use crate::records::{DrawRecord, SessionMetadata};
use crate::storage::{ensure_parent_dir, sort_newest_first, write_atomic, Sink};
use crate::StorageError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// One flattened CSV row
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    draw_date: NaiveDate,
    draw_id: i64,
    num_1: u8,
    num_2: u8,
    num_3: u8,
    num_4: u8,
    num_5: u8,
    num_6: u8,
    num_7: u8,
    bonus: u8,
    jackpot: Option<f64>,
    winners: Option<u32>,
}

impl CsvRow {
    fn from_record(record: &DrawRecord) -> Self {
        let n = record.winning_numbers();
        Self {
            draw_date: record.date(),
            draw_id: record.draw_id(),
            num_1: n[0],
            num_2: n[1],
            num_3: n[2],
            num_4: n[3],
            num_5: n[4],
            num_6: n[5],
            num_7: n[6],
            bonus: record.bonus_number(),
            jackpot: record.jackpot_amount(),
            winners: record.winner_count(),
        }
    }

    /// Rebuilds a validated record; a hand-edited file that breaks an
    /// invariant surfaces as a corrupt-file error, not a bad record
    fn into_record(self, path: &Path) -> Result<DrawRecord, StorageError> {
        let numbers = vec![
            self.num_1, self.num_2, self.num_3, self.num_4, self.num_5, self.num_6, self.num_7,
        ];

        let mut record = DrawRecord::new(self.draw_date, numbers, self.bonus)
            .map_err(|e| StorageError::Corrupt {
                path: path.display().to_string(),
                message: e.to_string(),
            })?
            .with_draw_id(self.draw_id);

        if let Some(amount) = self.jackpot {
            record = record.with_jackpot(amount).map_err(|e| StorageError::Corrupt {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        }
        if let Some(count) = self.winners {
            record = record.with_winner_count(count);
        }

        Ok(record)
    }
}

/// Append-with-dedup CSV sink
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads all records from the existing file, or none if absent
    fn load_existing(&self) -> Result<Vec<DrawRecord>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader =
            csv::Reader::from_path(&self.path).map_err(|source| StorageError::Csv {
                path: self.path.display().to_string(),
                source,
            })?;

        let mut records = Vec::new();
        for row in reader.deserialize::<CsvRow>() {
            let row = row.map_err(|source| StorageError::Csv {
                path: self.path.display().to_string(),
                source,
            })?;
            records.push(row.into_record(&self.path)?);
        }

        Ok(records)
    }
}

impl Sink for CsvSink {
    fn append(
        &self,
        draws: &[DrawRecord],
        _metadata: &SessionMetadata,
    ) -> Result<usize, StorageError> {
        let mut records = self.load_existing()?;

        let known: HashSet<i64> = records.iter().map(|d| d.draw_id()).collect();
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
        records.extend(fresh);
        sort_newest_first(&mut records);

        let mut writer = csv::Writer::from_writer(Vec::new());
        for record in &records {
            writer
                .serialize(CsvRow::from_record(record))
                .map_err(|source| StorageError::Csv {
                    path: self.path.display().to_string(),
                    source,
                })?;
        }

        let bytes = writer.into_inner().map_err(|e| StorageError::Corrupt {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;

        ensure_parent_dir(&self.path)?;
        write_atomic(&self.path, &bytes)?;

        tracing::info!(
            path = %self.path.display(),
            appended,
            total = records.len(),
            "CSV file written"
        );

        Ok(appended)
    }
}
