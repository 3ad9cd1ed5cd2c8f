use serde::Deserialize;

/// Main configuration structure for Lotto-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub scraper: ScraperConfig,
    pub browser: BrowserConfig,
    pub output: OutputConfig,
}

/// Scrape-target configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScraperConfig {
    /// The past-results page to scrape
    #[serde(rename = "target-url")]
    pub target_url: String,

    /// Range spec used when no date selection flags are given.
    ///
    /// One of `last_7_days`, `last_30_days`, `last_90_days`, `year_to_date`,
    /// or an explicit `YYYY-MM-DD:YYYY-MM-DD` range.
    #[serde(rename = "date-range", default = "default_date_range")]
    pub date_range: String,
}

/// Browser session configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    /// WebDriver endpoint (a running chromedriver)
    #[serde(rename = "webdriver-url")]
    pub webdriver_url: String,

    /// Run the browser without a visible window
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Explicit browser binary location, if not on the default path
    #[serde(rename = "binary-path", default)]
    pub binary_path: Option<String>,

    /// Maximum time for the initial page navigation (seconds)
    #[serde(rename = "page-load-timeout-secs", default = "default_page_load_timeout")]
    pub page_load_timeout_secs: u64,

    /// Default bounded wait for an element to appear/become clickable (seconds)
    #[serde(
        rename = "element-wait-timeout-secs",
        default = "default_element_wait_timeout"
    )]
    pub element_wait_timeout_secs: u64,

    /// Attempts for the initial page load and for generic element clicks
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay for the exponential retry backoff (milliseconds)
    #[serde(rename = "retry-base-delay-ms", default = "default_retry_base_delay")]
    pub retry_base_delay_ms: u64,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Which sink(s) to write
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// Path of the JSON results document
    #[serde(rename = "json-path")]
    pub json_path: String,

    /// Path of the CSV results file
    #[serde(rename = "csv-path")]
    pub csv_path: String,
}

/// Supported sink formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Csv,
    Both,
}

impl OutputFormat {
    /// Returns true if the JSON sink should be written
    pub fn includes_json(&self) -> bool {
        matches!(self, Self::Json | Self::Both)
    }

    /// Returns true if the CSV sink should be written
    pub fn includes_csv(&self) -> bool {
        matches!(self, Self::Csv | Self::Both)
    }
}

fn default_format() -> OutputFormat {
    OutputFormat::Both
}

fn default_date_range() -> String {
    "last_30_days".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_page_load_timeout() -> u64 {
    30
}

fn default_element_wait_timeout() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_base_delay() -> u64 {
    2000
}
