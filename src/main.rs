//! Lotto-Harvest main entry point
//!
//! Command-line interface for scraping historical Lotto Max draw results
//! from the operator's past-results page into JSON/CSV files.

use chrono::{Local, NaiveDate};
use clap::Parser;
use lotto_harvest::config::{load_config_with_hash, Config, OutputFormat};
use lotto_harvest::driver::run_scrape;
use lotto_harvest::records::{SessionMetadata, SessionResult};
use lotto_harvest::schedule::{generate_draw_dates, generate_year_dates, resolve_range};
use lotto_harvest::storage::{CsvSink, JsonSink, Sink};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Lotto-Harvest: historical lottery draw scraper
///
/// Drives the results page's calendar widget through a WebDriver session to
/// collect past draws, then appends them to flat-file outputs with
/// deduplication.
#[derive(Parser, Debug)]
#[command(name = "lotto-harvest")]
#[command(version = "1.0.0")]
#[command(about = "Scrape historical Lotto Max draw results", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Scrape a single draw date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE", conflicts_with_all = ["date_range", "year"])]
    draw_date: Option<String>,

    /// Scrape a date range (YYYY-MM-DD:YYYY-MM-DD)
    #[arg(long, value_name = "RANGE", conflicts_with_all = ["draw_date", "year"])]
    date_range: Option<String>,

    /// Scrape every draw from a specific year
    #[arg(long, conflicts_with_all = ["draw_date", "date_range"])]
    year: Option<i32>,

    /// Override the configured output format
    #[arg(long, value_parser = ["json", "csv", "both"])]
    format: Option<String>,

    /// Run the browser with a visible window
    #[arg(long)]
    no_headless: bool,

    /// Validate config and show which dates would be scraped, without scraping
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

/// What a run should visit: an explicit date plan, or the page as-is
enum Targets {
    /// Navigate the calendar to each date in order
    Dates(Vec<NaiveDate>),
    /// No date iteration; extract whatever the page currently shows
    CurrentPage,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, _config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // CLI overrides
    if cli.no_headless {
        config.browser.headless = false;
    }
    if let Some(format) = cli.format.as_deref() {
        config.output.format = match format {
            "json" => OutputFormat::Json,
            "csv" => OutputFormat::Csv,
            _ => OutputFormat::Both,
        };
    }

    let today = Local::now().date_naive();
    let (targets, range_start, range_end) = resolve_targets(&cli, &config, today)?;

    if cli.dry_run {
        handle_dry_run(&config, &targets, range_start, range_end);
        return Ok(());
    }

    if let Targets::Dates(dates) = &targets {
        if dates.is_empty() {
            println!(
                "No draw dates (Tuesday/Friday) fall inside {} to {}; nothing to scrape.",
                range_start, range_end
            );
            return Ok(());
        }
        tracing::info!("Planned {} draw dates", dates.len());
    }

    // Run the scrape session
    let metadata = SessionMetadata::new(range_start, range_end);
    let result = match &targets {
        Targets::Dates(dates) => run_scrape(&config, dates, metadata).await?,
        Targets::CurrentPage => run_scrape(&config, &[], metadata).await?,
    };

    print_summary(&result);

    // Write output files
    write_outputs(&config, &result)?;

    tracing::info!("Scrape completed successfully");
    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("lotto_harvest=info,warn"),
            1 => EnvFilter::new("lotto_harvest=debug,info"),
            2 => EnvFilter::new("lotto_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Resolves the CLI's date selection into targets plus range bounds
fn resolve_targets(
    cli: &Cli,
    config: &Config,
    today: NaiveDate,
) -> Result<(Targets, NaiveDate, NaiveDate), Box<dyn std::error::Error>> {
    if let Some(date_str) = &cli.draw_date {
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
            .map_err(|e| format!("invalid --draw-date '{}': {}", date_str, e))?;
        // Non-draw weekdays are excluded here, never attempted downstream
        let dates = generate_draw_dates(date, date);
        return Ok((Targets::Dates(dates), date, date));
    }

    if let Some(range) = &cli.date_range {
        let (start, end) = resolve_range(range, today)?;
        return Ok((Targets::Dates(generate_draw_dates(start, end)), start, end));
    }

    if let Some(year) = cli.year {
        let dates = generate_year_dates(year);
        let (start, end) = match (dates.first(), dates.last()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => return Err(format!("year {} contains no draw dates", year).into()),
        };
        return Ok((Targets::Dates(dates), start, end));
    }

    // Default: no date iteration, use the configured range spec for metadata
    let (start, end) = resolve_range(&config.scraper.date_range, today)?;
    Ok((Targets::CurrentPage, start, end))
}

/// Handles the --dry-run mode: validates config and shows the scrape plan
fn handle_dry_run(config: &Config, targets: &Targets, start: NaiveDate, end: NaiveDate) {
    println!("=== Lotto-Harvest Dry Run ===\n");

    println!("Target:");
    println!("  URL: {}", config.scraper.target_url);
    println!("  Date range: {} to {}", start, end);

    println!("\nBrowser:");
    println!("  WebDriver endpoint: {}", config.browser.webdriver_url);
    println!("  Headless: {}", config.browser.headless);
    println!(
        "  Timeouts: page load {}s, element wait {}s",
        config.browser.page_load_timeout_secs, config.browser.element_wait_timeout_secs
    );
    println!(
        "  Retries: {} attempts, {}ms base backoff",
        config.browser.max_retries, config.browser.retry_base_delay_ms
    );

    println!("\nOutput:");
    println!("  JSON: {}", config.output.json_path);
    println!("  CSV: {}", config.output.csv_path);

    match targets {
        Targets::Dates(dates) => {
            println!("\nDraw dates ({}):", dates.len());
            for date in dates.iter().take(10) {
                println!("  - {}", date);
            }
            if dates.len() > 10 {
                println!("  ... and {} more", dates.len() - 10);
            }
        }
        Targets::CurrentPage => {
            println!("\nNo date selection given; would scrape the page as-is.");
        }
    }

    println!("\n✓ Configuration is valid");
}

/// Prints a short summary of the collected draws
fn print_summary(result: &SessionResult) {
    println!(
        "\nCollected {} draw(s) for {} to {}",
        result.draws.len(),
        result.metadata.date_range_start,
        result.metadata.date_range_end
    );

    for draw in result.draws.iter().take(10) {
        let numbers = draw
            .winning_numbers()
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "  {}  [{}]  bonus {}",
            draw.date(),
            numbers,
            draw.bonus_number()
        );
    }
    if result.draws.len() > 10 {
        println!("  ... and {} more", result.draws.len() - 10);
    }

    if !result.metadata.errors.is_empty() {
        println!(
            "{} date(s) failed; see log output for details",
            result.metadata.errors.len()
        );
    }
}

/// Appends the session's draws to the configured sinks
fn write_outputs(
    config: &Config,
    result: &SessionResult,
) -> Result<(), Box<dyn std::error::Error>> {
    if config.output.format.includes_json() {
        let sink = JsonSink::new(&config.output.json_path);
        let appended = sink.append(&result.draws, &result.metadata)?;
        println!(
            "✓ JSON: {} ({} new draw(s))",
            config.output.json_path, appended
        );
    }

    if config.output.format.includes_csv() {
        let sink = CsvSink::new(&config.output.csv_path);
        let appended = sink.append(&result.draws, &result.metadata)?;
        println!(
            "✓ CSV: {} ({} new draw(s))",
            config.output.csv_path, appended
        );
    }

    Ok(())
}
