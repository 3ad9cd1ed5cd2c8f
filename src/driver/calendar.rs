//! Calendar-widget navigation protocol
//!
//! The results page exposes no URL-addressable date parameter; a historical
//! draw is reached by driving the page's datepicker through a fixed click
//! sequence. The sequence is modeled as an explicit state machine so each
//! transition has a name, its own bounded wait, and a clear failure mode.
//!
//! Protocol quirks that must be preserved:
//!
//! * The month/year header is one control activated twice: the first click
//!   opens the month grid, the second opens the year grid.
//! * Grid cells are addressed by synthesized ids. The year grid is zero-based
//!   from [`CALENDAR_EPOCH_YEAR`]; month and day grids are 1-indexed.
//! * After the day click, keyboard/hover focus must be cleared before the
//!   submit click, otherwise a hover overlay intercepts it.
//! * The submit click goes through script, not the UI; and completion is
//!   detected by waiting for a pre-captured results element to go stale.

use crate::driver::locators::submit_locators;
use crate::driver::session::Session;
use crate::{NavError, NavResult};
use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::time::Duration;
use thirtyfour::prelude::*;

/// Year assumed to occupy cell 0 of the year grid.
///
/// This is a hardcoded assumption about the remote widget's layout. If the
/// site shifts its epoch, year cell ids silently resolve to the wrong year;
/// there is no way to detect that from here. Keep the assumption in this one
/// constant.
pub const CALENDAR_EPOCH_YEAR: i32 = 2024;

/// Shared id suffix of every datepicker control on the results page
const PICKER_SUFFIX: &str = "winning-numbers-calendar-picker-startDate";

/// Button that opens the datepicker
const PICKER_BUTTON_CSS: &str = ".datepicker-button.bootstrap3.btn.bootstrap.olg-web";

/// Timeout for the picker-open click
const PICKER_OPEN_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for each grid-navigation click
const GRID_STEP_TIMEOUT: Duration = Duration::from_secs(5);

/// Per-strategy timeout while resolving the submit control
const SUBMIT_STRATEGY_TIMEOUT: Duration = Duration::from_secs(3);

/// How long to wait for the results region to be replaced after submit
const STALENESS_TIMEOUT: Duration = Duration::from_secs(15);

/// Fixed fallback delay when staleness was never observed
const STALENESS_FALLBACK_DELAY: Duration = Duration::from_secs(3);

/// Settle delay after rendering-heavy steps (calendar animations)
const SETTLE_DELAY: Duration = Duration::from_secs(1);

/// States of the per-date navigation protocol, in protocol order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerPhase {
    Idle,
    PageLoaded,
    PickerOpening,
    MonthSelectorOpen,
    YearSelectorOpen,
    YearSelected,
    MonthSelected,
    DaySelected,
    Submitting,
    ContentRefreshed,
}

impl fmt::Display for PickerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::PageLoaded => "page-loaded",
            Self::PickerOpening => "picker-opening",
            Self::MonthSelectorOpen => "month-selector-open",
            Self::YearSelectorOpen => "year-selector-open",
            Self::YearSelected => "year-selected",
            Self::MonthSelected => "month-selected",
            Self::DaySelected => "day-selected",
            Self::Submitting => "submitting",
            Self::ContentRefreshed => "content-refreshed",
        };
        f.write_str(name)
    }
}

/// Id of the month/year header control (the two-click disclosure)
pub fn header_id() -> String {
    format!("datepicker-month-{}", PICKER_SUFFIX)
}

/// Id of a year-grid cell, zero-based from the epoch year
pub fn year_cell_id(year: i32) -> String {
    format!("cell{}-{}", year - CALENDAR_EPOCH_YEAR, PICKER_SUFFIX)
}

/// Id of a month-grid cell (1 = January)
pub fn month_cell_id(month: u32) -> String {
    format!("cell{}-{}", month, PICKER_SUFFIX)
}

/// Id of a day-grid cell (1-indexed day of month)
pub fn day_cell_id(day: u32) -> String {
    format!("cell{}-{}", day, PICKER_SUFFIX)
}

/// Drives the calendar widget to display results for `date`
///
/// Runs the full protocol: open picker, two-click disclosure to the year
/// grid, year/month/day selection, focus clear, script-level submit, and the
/// staleness wait for the asynchronous content replacement. Any step timing
/// out aborts this date only; the caller logs and continues with the next.
pub async fn select_draw_date(session: &Session, date: NaiveDate) -> NavResult<()> {
    tracing::info!(date = %date, "navigating calendar to draw date");

    session.wait_for_document_ready().await?;

    // Open the datepicker
    click_step(
        session,
        PickerPhase::PickerOpening,
        By::Css(PICKER_BUTTON_CSS),
        PICKER_OPEN_TIMEOUT,
        Duration::from_secs(2),
    )
    .await?;

    // Two-click disclosure: same header control, month grid then year grid
    click_step(
        session,
        PickerPhase::MonthSelectorOpen,
        By::Id(header_id()),
        GRID_STEP_TIMEOUT,
        SETTLE_DELAY,
    )
    .await?;

    click_step(
        session,
        PickerPhase::YearSelectorOpen,
        By::Id(header_id()),
        GRID_STEP_TIMEOUT,
        SETTLE_DELAY,
    )
    .await?;

    // Year, month, day grid cells
    click_step(
        session,
        PickerPhase::YearSelected,
        By::Id(year_cell_id(date.year())),
        GRID_STEP_TIMEOUT,
        SETTLE_DELAY,
    )
    .await?;

    click_step(
        session,
        PickerPhase::MonthSelected,
        By::Id(month_cell_id(date.month())),
        GRID_STEP_TIMEOUT,
        SETTLE_DELAY,
    )
    .await?;

    click_step(
        session,
        PickerPhase::DaySelected,
        By::Id(day_cell_id(date.day())),
        GRID_STEP_TIMEOUT,
        Duration::ZERO,
    )
    .await?;

    // Clear focus so the calendar's hover overlay cannot intercept the
    // submit click, then let the close animation finish.
    session.blur_active_element().await?;
    tokio::time::sleep(Duration::from_secs(2)).await;

    submit(session, date).await?;

    tracing::info!(date = %date, phase = %PickerPhase::ContentRefreshed, "calendar navigation complete");
    Ok(())
}

/// One named protocol transition: wait for the control, click it, settle
async fn click_step(
    session: &Session,
    phase: PickerPhase,
    locator: By,
    timeout: Duration,
    settle: Duration,
) -> NavResult<()> {
    session
        .click_element(locator.clone(), timeout)
        .await
        .map_err(|_| NavError::StepTimeout {
            phase,
            locator: format!("{:?}", locator),
            timeout_secs: timeout.as_secs(),
        })?;

    tracing::debug!(phase = %phase, locator = ?locator, "calendar step complete");

    if !settle.is_zero() {
        tokio::time::sleep(settle).await;
    }

    Ok(())
}

/// Resolves and activates the submit control, then waits for the results
/// region to be replaced
///
/// A probe element inside the results region is captured *before* the click;
/// its staleness afterwards is the only reliable signal that the page
/// swapped the region's content. A standard UI click is not used for the
/// submit itself: overlapping layers make it fail intermittently, so the
/// click is dispatched from script.
async fn submit(session: &Session, date: NaiveDate) -> NavResult<()> {
    let probe = session.capture_results_probe().await;
    if probe.is_none() {
        tracing::warn!("could not capture results probe before submit");
    }

    for locator in submit_locators() {
        let button = match session
            .wait_for_clickable(locator.clone(), SUBMIT_STRATEGY_TIMEOUT)
            .await
        {
            Ok(button) => button,
            Err(_) => {
                tracing::debug!(locator = ?locator, "submit strategy did not resolve");
                continue;
            }
        };

        // Center the control first; overlapping layers sit at the viewport
        // edges.
        if let Err(e) = button.scroll_into_view().await {
            tracing::debug!(error = %e, "submit scroll failed");
        }
        tokio::time::sleep(Duration::from_millis(500)).await;

        session.script_click(&button).await?;
        tracing::info!(date = %date, phase = %PickerPhase::Submitting, locator = ?locator, "calendar submitted");

        match &probe {
            Some(element) => {
                match element
                    .wait_until()
                    .wait(STALENESS_TIMEOUT, Duration::from_millis(500))
                    .stale()
                    .await
                {
                    Ok(()) => {
                        tracing::debug!("results region replacement detected");
                        tokio::time::sleep(Duration::from_secs(2)).await;
                    }
                    Err(_) => {
                        tracing::warn!(
                            timeout_secs = STALENESS_TIMEOUT.as_secs(),
                            "results region never went stale, proceeding anyway"
                        );
                        tokio::time::sleep(STALENESS_FALLBACK_DELAY).await;
                    }
                }
            }
            None => {
                // No probe to watch; fall back to a flat delay
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
        }

        return Ok(());
    }

    Err(NavError::SubmitUnresolvable)
}
