//! Interactive session driver
//!
//! This module owns the browser session for a scrape run and sequences the
//! per-date work: load the results page once, then for each requested draw
//! date run the calendar navigation protocol and hand the rendered page to
//! the extractor. Strictly sequential: one session, one date at a time. The
//! remote calendar widget is stateful per session, so concurrent navigation
//! would corrupt it.

mod calendar;
mod locators;
mod session;

pub use calendar::{
    day_cell_id, header_id, month_cell_id, select_draw_date, year_cell_id, PickerPhase,
    CALENDAR_EPOCH_YEAR,
};
pub use locators::{load_more_locators, results_region_locators, submit_locators};
pub use session::Session;

use crate::config::Config;
use crate::extract::extract_draws;
use crate::records::{DrawRecord, SessionMetadata, SessionResult};
use crate::{NavResult, Result};
use chrono::{NaiveDate, Utc};
use std::time::Duration;

/// Politeness throttle between date iterations; not a correctness delay
const INTER_DATE_DELAY: Duration = Duration::from_millis(500);

/// Wait for the results region on a fresh page load
const INITIAL_REGION_TIMEOUT: Duration = Duration::from_secs(20);

/// Wait for the results region after a calendar navigation
const PER_DATE_REGION_TIMEOUT: Duration = Duration::from_secs(10);

/// Safety limit on pagination-button clicks in current-page mode
const MAX_LOAD_MORE_CLICKS: u32 = 50;

/// Safety limit on infinite-scroll iterations in current-page mode
const MAX_LOAD_MORE_SCROLLS: u32 = 50;

/// Pause between infinite-scroll iterations
const SCROLL_PAUSE: Duration = Duration::from_secs(2);

/// Runs a complete scrape session over the given draw dates
///
/// An empty date list means "scrape whatever the page currently shows",
/// without driving the calendar.
///
/// The browser session is acquired here and released on every exit path:
/// normal completion, fatal errors, and Ctrl-C interruption (which abandons
/// the remaining dates but keeps everything already collected).
///
/// # Arguments
///
/// * `config` - Run configuration
/// * `dates` - Draw dates to visit, in order
/// * `metadata` - Session metadata to carry through and finalize
///
/// # Returns
///
/// * `Ok(SessionResult)` - Collected records plus finalized metadata
/// * `Err(ScrapeError)` - A fatal failure (session setup or initial load)
pub async fn run_scrape(
    config: &Config,
    dates: &[NaiveDate],
    metadata: SessionMetadata,
) -> Result<SessionResult> {
    let session = Session::connect(&config.browser).await?;

    let outcome = drive(&session, config, dates, metadata).await;

    // Release the browser regardless of how the drive ended
    if let Err(e) = session.quit().await {
        tracing::warn!(error = %e, "failed to shut down browser session");
    }

    outcome
}

/// The drive loop proper; separated so `run_scrape` can guarantee cleanup
async fn drive(
    session: &Session,
    config: &Config,
    dates: &[NaiveDate],
    mut metadata: SessionMetadata,
) -> Result<SessionResult> {
    session.load_page(&config.scraper.target_url).await?;
    session.scroll_to_results().await;

    let mut draws: Vec<DrawRecord> = Vec::new();

    if dates.is_empty() {
        // No date iteration requested: surface everything the page will give
        // us without the calendar, then extract as it stands
        session.wait_for_results_region(INITIAL_REGION_TIMEOUT).await;

        let clicks = session.load_more_results(MAX_LOAD_MORE_CLICKS).await;
        if clicks == 0 {
            // No pagination button; the page may load on scroll instead
            if let Err(e) = session
                .scroll_to_load_more(SCROLL_PAUSE, MAX_LOAD_MORE_SCROLLS)
                .await
            {
                tracing::debug!(error = %e, "infinite scroll probe failed");
            }
        }

        let html = session.page_source().await?;
        let page_draws = extract_draws(&html, None, None);
        tracing::info!(count = page_draws.len(), "extracted current page");
        draws.extend(page_draws);
    } else {
        let interrupt = tokio::signal::ctrl_c();
        tokio::pin!(interrupt);

        let total = dates.len();
        for (index, &date) in dates.iter().enumerate() {
            tokio::select! {
                _ = &mut interrupt => {
                    tracing::warn!(
                        completed = index,
                        total,
                        "interrupted; abandoning remaining dates"
                    );
                    metadata.record_error(format!(
                        "interrupted after {} of {} dates",
                        index, total
                    ));
                    break;
                }
                result = scrape_one_date(session, date) => match result {
                    Ok(date_draws) => {
                        tracing::info!(
                            date = %date,
                            progress = %format!("{}/{}", index + 1, total),
                            count = date_draws.len(),
                            "date scraped"
                        );
                        draws.extend(date_draws);
                    }
                    Err(e) => {
                        // Recoverable: zero records for this date, keep going
                        tracing::warn!(
                            date = %date,
                            progress = %format!("{}/{}", index + 1, total),
                            error = %e,
                            "date navigation failed, skipping"
                        );
                        metadata.record_error(format!("{}: {}", date, e));
                    }
                }
            }

            tokio::time::sleep(INTER_DATE_DELAY).await;
        }
    }

    metadata.total_draws = draws.len();
    metadata.scrape_date = Utc::now();

    Ok(SessionResult { metadata, draws })
}

/// One navigate-and-extract cycle for a single draw date
async fn scrape_one_date(session: &Session, date: NaiveDate) -> NavResult<Vec<DrawRecord>> {
    select_draw_date(session, date).await?;

    session.wait_for_results_region(PER_DATE_REGION_TIMEOUT).await;

    let html = session.page_source().await?;
    Ok(extract_draws(&html, Some(date), Some(date)))
}
