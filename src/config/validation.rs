use crate::config::types::{BrowserConfig, Config, OutputConfig, ScraperConfig};
use crate::ConfigError;
use chrono::NaiveDate;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_scraper_config(&config.scraper)?;
    validate_browser_config(&config.browser)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates scrape-target configuration
fn validate_scraper_config(config: &ScraperConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.target_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid target-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "target-url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    validate_range_spec(&config.date_range)?;

    Ok(())
}

/// Validates browser session configuration
fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    Url::parse(&config.webdriver_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid webdriver-url: {}", e)))?;

    if config.page_load_timeout_secs < 1 || config.page_load_timeout_secs > 300 {
        return Err(ConfigError::Validation(format!(
            "page-load-timeout-secs must be between 1 and 300, got {}",
            config.page_load_timeout_secs
        )));
    }

    if config.element_wait_timeout_secs < 1 || config.element_wait_timeout_secs > 120 {
        return Err(ConfigError::Validation(format!(
            "element-wait-timeout-secs must be between 1 and 120, got {}",
            config.element_wait_timeout_secs
        )));
    }

    if config.max_retries < 1 || config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max-retries must be between 1 and 10, got {}",
            config.max_retries
        )));
    }

    if config.retry_base_delay_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "retry-base-delay-ms must be >= 100ms, got {}ms",
            config.retry_base_delay_ms
        )));
    }

    if let Some(path) = &config.binary_path {
        if path.is_empty() {
            return Err(ConfigError::Validation(
                "binary-path cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.json_path.is_empty() {
        return Err(ConfigError::Validation(
            "json-path cannot be empty".to_string(),
        ));
    }

    if config.csv_path.is_empty() {
        return Err(ConfigError::Validation(
            "csv-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates a date-range spec string
///
/// Accepts the named ranges understood by `schedule::resolve_range`, or an
/// explicit `YYYY-MM-DD:YYYY-MM-DD` pair with start <= end.
fn validate_range_spec(spec: &str) -> Result<(), ConfigError> {
    const NAMED: [&str; 4] = [
        "last_7_days",
        "last_30_days",
        "last_90_days",
        "year_to_date",
    ];

    if NAMED.contains(&spec) {
        return Ok(());
    }

    if let Some((start_str, end_str)) = spec.split_once(':') {
        let start = NaiveDate::parse_from_str(start_str.trim(), "%Y-%m-%d").map_err(|_| {
            ConfigError::Validation(format!("Invalid range start '{}'", start_str.trim()))
        })?;
        let end = NaiveDate::parse_from_str(end_str.trim(), "%Y-%m-%d").map_err(|_| {
            ConfigError::Validation(format!("Invalid range end '{}'", end_str.trim()))
        })?;

        if start > end {
            return Err(ConfigError::Validation(format!(
                "Range start {} is after range end {}",
                start, end
            )));
        }

        return Ok(());
    }

    Err(ConfigError::Validation(format!(
        "Unrecognized date-range spec '{}'",
        spec
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::OutputFormat;

    fn base_config() -> Config {
        Config {
            scraper: ScraperConfig {
                target_url: "https://example.com/lottery/past-results.html".to_string(),
                date_range: "last_30_days".to_string(),
            },
            browser: BrowserConfig {
                webdriver_url: "http://localhost:9515".to_string(),
                headless: true,
                binary_path: None,
                page_load_timeout_secs: 30,
                element_wait_timeout_secs: 10,
                max_retries: 3,
                retry_base_delay_ms: 2000,
            },
            output: OutputConfig {
                format: OutputFormat::Both,
                json_path: "./data/draws.json".to_string(),
                csv_path: "./data/draws.csv".to_string(),
            },
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate(&base_config()).is_ok());
    }

    #[test]
    fn test_invalid_target_url() {
        let mut config = base_config();
        config.scraper.target_url = "not a url".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_non_http_target_url() {
        let mut config = base_config();
        config.scraper.target_url = "ftp://example.com/results".to_string();
        assert!(matches!(
            validate(&config).unwrap_err(),
            ConfigError::Validation(_)
        ));
    }

    #[test]
    fn test_zero_retries_rejected() {
        let mut config = base_config();
        config.browser.max_retries = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_output_path_rejected() {
        let mut config = base_config();
        config.output.json_path = String::new();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_range_spec() {
        assert!(validate_range_spec("last_7_days").is_ok());
        assert!(validate_range_spec("year_to_date").is_ok());
        assert!(validate_range_spec("2025-01-01:2025-01-31").is_ok());

        assert!(validate_range_spec("last_fortnight").is_err());
        assert!(validate_range_spec("2025-01-31:2025-01-01").is_err());
        assert!(validate_range_spec("2025-01-01:bogus").is_err());
    }
}
