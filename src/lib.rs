//! Lotto-Harvest: a historical lottery draw scraper
//!
//! This crate retrieves past Lotto Max draw results from the operator's public
//! results page, normalizes them into validated records, and persists them to
//! JSON and CSV files. The page renders results through JavaScript and exposes
//! no URL-addressable date parameter, so historical draws are reached by
//! driving its calendar widget through a WebDriver session.

pub mod config;
pub mod driver;
pub mod extract;
pub mod records;
pub mod schedule;
pub mod storage;

use thiserror::Error;

/// Main error type for Lotto-Harvest operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("WebDriver error: {0}")]
    WebDriver(#[from] thirtyfour::error::WebDriverError),

    #[error("Failed to load {url} after {attempts} attempts: {last_error}")]
    PageLoad {
        url: String,
        attempts: u32,
        last_error: String,
    },

    #[error("Record error: {0}")]
    Record(#[from] RecordError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Unable to parse date '{0}' with any known format")]
    DateParse(String),

    #[error("Invalid date range: {0}")]
    DateRange(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Per-date navigation failures.
///
/// These are recoverable: the date loop logs them, records zero draws for the
/// date, and moves on. Only session setup and initial page load are fatal.
#[derive(Debug, Error)]
pub enum NavError {
    #[error("calendar step {phase} timed out after {timeout_secs}s (locator {locator})")]
    StepTimeout {
        phase: driver::PickerPhase,
        locator: String,
        timeout_secs: u64,
    },

    #[error("submit control not resolvable by any locator strategy")]
    SubmitUnresolvable,

    #[error("results region did not appear within {timeout_secs}s")]
    ResultsRegionMissing { timeout_secs: u64 },

    #[error("webdriver failure during navigation: {0}")]
    WebDriver(#[from] thirtyfour::error::WebDriverError),
}

/// Record validation errors
///
/// A `DrawRecord` that would violate a domain invariant is never constructed;
/// these errors name the invariant that failed.
#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("expected {expected} winning numbers, got {actual}")]
    WinningCount { expected: usize, actual: usize },

    #[error("winning number {0} is outside the valid range 1-50")]
    WinningRange(u8),

    #[error("duplicate winning number {0}")]
    DuplicateNumber(u8),

    #[error("bonus number {0} is outside the valid range 1-50")]
    BonusRange(u8),

    #[error("jackpot amount {0} is negative")]
    NegativeJackpot(f64),
}

/// Sink persistence errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error for {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("CSV error for {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("existing file {path} is not a valid results document: {message}")]
    Corrupt { path: String, message: String },
}

/// Result type alias for Lotto-Harvest operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for per-date navigation operations
pub type NavResult<T> = std::result::Result<T, NavError>;

// Re-export commonly used types
pub use config::Config;
pub use records::{DrawRecord, SessionMetadata, SessionResult};
pub use schedule::{generate_draw_dates, generate_year_dates};
