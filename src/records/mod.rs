//! Validated value objects for draws and scrape sessions
//!
//! A [`DrawRecord`] can only come into existence through its validating
//! constructor; the extractor yields "no record" instead of a partially
//! populated one. Deserialization routes through the same checks via
//! `#[serde(try_from)]`, so a hand-edited output file cannot smuggle an
//! invalid record back in.

use crate::RecordError;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Lowest valid ball number
pub const NUMBER_MIN: u8 = 1;

/// Highest valid ball number
pub const NUMBER_MAX: u8 = 50;

/// A main draw carries exactly this many winning numbers
pub const WINNING_COUNT: usize = 7;

/// A single validated lottery draw
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDrawRecord")]
pub struct DrawRecord {
    date: NaiveDate,
    draw_id: i64,
    winning_numbers: Vec<u8>,
    bonus_number: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    jackpot_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    winner_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    secondary_draws: Option<Vec<Vec<u8>>>,
}

/// Wire shape of a draw record, used to re-validate on deserialization
#[derive(Debug, Deserialize)]
struct RawDrawRecord {
    date: NaiveDate,
    draw_id: i64,
    winning_numbers: Vec<u8>,
    bonus_number: u8,
    #[serde(default)]
    jackpot_amount: Option<f64>,
    #[serde(default)]
    winner_count: Option<u32>,
    #[serde(default)]
    secondary_draws: Option<Vec<Vec<u8>>>,
}

impl TryFrom<RawDrawRecord> for DrawRecord {
    type Error = RecordError;

    fn try_from(raw: RawDrawRecord) -> Result<Self, Self::Error> {
        let mut record = DrawRecord::new(raw.date, raw.winning_numbers, raw.bonus_number)?
            .with_draw_id(raw.draw_id);
        if let Some(amount) = raw.jackpot_amount {
            record = record.with_jackpot(amount)?;
        }
        record.winner_count = raw.winner_count;
        record.secondary_draws = raw.secondary_draws;
        Ok(record)
    }
}

impl DrawRecord {
    /// Constructs a validated draw record
    ///
    /// Winning numbers are normalized to ascending order (a display
    /// convention, not a semantic one). The draw id is synthesized from the
    /// date via [`synthesize_draw_id`].
    ///
    /// # Arguments
    ///
    /// * `date` - The draw date, as requested of the session driver
    /// * `winning_numbers` - Exactly 7 distinct numbers in [1, 50]
    /// * `bonus_number` - The bonus ball, in [1, 50]; may coincide with a
    ///   winning number
    ///
    /// # Returns
    ///
    /// * `Ok(DrawRecord)` - All invariants hold
    /// * `Err(RecordError)` - The first violated invariant
    pub fn new(
        date: NaiveDate,
        mut winning_numbers: Vec<u8>,
        bonus_number: u8,
    ) -> Result<Self, RecordError> {
        if winning_numbers.len() != WINNING_COUNT {
            return Err(RecordError::WinningCount {
                expected: WINNING_COUNT,
                actual: winning_numbers.len(),
            });
        }

        winning_numbers.sort_unstable();

        for &number in &winning_numbers {
            if !(NUMBER_MIN..=NUMBER_MAX).contains(&number) {
                return Err(RecordError::WinningRange(number));
            }
        }

        for pair in winning_numbers.windows(2) {
            if pair[0] == pair[1] {
                return Err(RecordError::DuplicateNumber(pair[0]));
            }
        }

        if !(NUMBER_MIN..=NUMBER_MAX).contains(&bonus_number) {
            return Err(RecordError::BonusRange(bonus_number));
        }

        Ok(Self {
            date,
            draw_id: synthesize_draw_id(date),
            winning_numbers,
            bonus_number,
            jackpot_amount: None,
            winner_count: None,
            secondary_draws: None,
        })
    }

    /// Restores a persisted draw id in place of the synthesized one
    pub(crate) fn with_draw_id(mut self, draw_id: i64) -> Self {
        self.draw_id = draw_id;
        self
    }

    /// Attaches a jackpot amount; rejects negative values
    pub fn with_jackpot(mut self, amount: f64) -> Result<Self, RecordError> {
        if amount < 0.0 {
            return Err(RecordError::NegativeJackpot(amount));
        }
        self.jackpot_amount = Some(amount);
        Ok(self)
    }

    /// Attaches a jackpot winner count
    pub fn with_winner_count(mut self, count: u32) -> Self {
        self.winner_count = Some(count);
        self
    }

    /// Attaches companion sub-game number sets (best-effort data)
    pub fn with_secondary_draws(mut self, draws: Vec<Vec<u8>>) -> Self {
        self.secondary_draws = Some(draws);
        self
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn draw_id(&self) -> i64 {
        self.draw_id
    }

    /// Winning numbers in ascending order
    pub fn winning_numbers(&self) -> &[u8] {
        &self.winning_numbers
    }

    pub fn bonus_number(&self) -> u8 {
        self.bonus_number
    }

    pub fn jackpot_amount(&self) -> Option<f64> {
        self.jackpot_amount
    }

    pub fn winner_count(&self) -> Option<u32> {
        self.winner_count
    }

    pub fn secondary_draws(&self) -> Option<&[Vec<u8>]> {
        self.secondary_draws.as_deref()
    }
}

/// Derives a deterministic draw id from the draw date
///
/// The source page exposes no stable draw identifier, so the id is the
/// midnight-UTC Unix timestamp of the draw date. Known accuracy gap: these
/// ids are synthetic and will diverge if the upstream site later exposes a
/// genuine identifier.
pub fn synthesize_draw_id(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

/// Metadata about one scrape session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMetadata {
    /// When the scrape was performed
    pub scrape_date: DateTime<Utc>,

    /// Total number of draws in the accompanying record list
    pub total_draws: usize,

    /// Start of the requested date range
    pub date_range_start: NaiveDate,

    /// End of the requested date range
    pub date_range_end: NaiveDate,

    /// Non-fatal errors accumulated during the session
    #[serde(default)]
    pub errors: Vec<String>,
}

impl SessionMetadata {
    /// Creates metadata for a session covering `[start, end]`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            scrape_date: Utc::now(),
            total_draws: 0,
            date_range_start: start,
            date_range_end: end,
            errors: Vec::new(),
        }
    }

    /// Records a non-fatal error message
    pub fn record_error(&mut self, message: String) {
        self.errors.push(message);
    }
}

/// Complete result of a scrape session; the unit the JSON sink persists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    pub metadata: SessionMetadata,
    pub draws: Vec<DrawRecord>,
}
