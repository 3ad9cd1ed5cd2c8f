//! WebDriver session wrapper
//!
//! Owns the live browser handle and exposes the bounded-wait primitives the
//! navigation protocol is built from. Every wait here is a poll loop with an
//! explicit timeout; nothing blocks indefinitely.

use crate::config::BrowserConfig;
use crate::driver::locators::{load_more_locators, results_anchor_ids, results_region_locators};
use crate::{Result, ScrapeError};
use std::time::Duration;
use thirtyfour::prelude::*;
use tokio::time::sleep;

/// Poll interval for element queries and waiters
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Upper bound on a single retry backoff step
const MAX_BACKOFF: Duration = Duration::from_secs(10);

/// Delay after clicking a pagination control, to let content load
const LOAD_MORE_SETTLE: Duration = Duration::from_secs(2);

/// A live browser session against the results page
///
/// The handle is owned exclusively; [`Session::quit`] consumes it, which is
/// the only way the underlying browser is released.
pub struct Session {
    driver: WebDriver,
    element_timeout: Duration,
    max_retries: u32,
    retry_base_delay: Duration,
}

impl Session {
    /// Establishes a browser session against the configured WebDriver endpoint
    ///
    /// Failure here is fatal for the whole run; there is nothing to scrape
    /// without a browser.
    pub async fn connect(config: &BrowserConfig) -> Result<Self> {
        tracing::info!(endpoint = %config.webdriver_url, headless = config.headless, "starting browser session");

        let mut caps = DesiredCapabilities::chrome();
        if config.headless {
            caps.set_headless()?;
        }

        // Required in containerized environments
        caps.set_no_sandbox()?;
        caps.set_disable_gpu()?;
        caps.set_disable_dev_shm_usage()?;

        // Consistent rendering across machines
        caps.add_arg("--window-size=1920,1080")?;
        caps.add_arg("--disable-extensions")?;

        if let Some(path) = &config.binary_path {
            caps.set_binary(path)?;
        }

        let driver = WebDriver::new(&config.webdriver_url, caps).await?;
        driver
            .set_page_load_timeout(Duration::from_secs(config.page_load_timeout_secs))
            .await?;

        Ok(Self {
            driver,
            element_timeout: Duration::from_secs(config.element_wait_timeout_secs),
            max_retries: config.max_retries,
            retry_base_delay: Duration::from_millis(config.retry_base_delay_ms),
        })
    }

    /// Loads a page, retrying transient failures with exponential backoff
    ///
    /// Attempts are bounded by the configured retry count; the backoff doubles
    /// per attempt and is capped. Exhausting the attempts is fatal.
    pub async fn load_page(&self, url: &str) -> Result<()> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.driver.goto(url).await {
                Ok(()) => {
                    tracing::info!(url, attempt, "page loaded");
                    return Ok(());
                }
                Err(e) if attempt < self.max_retries => {
                    let backoff =
                        (self.retry_base_delay * 2u32.saturating_pow(attempt - 1)).min(MAX_BACKOFF);
                    tracing::warn!(url, attempt, error = %e, backoff_ms = backoff.as_millis() as u64, "page load failed, retrying");
                    sleep(backoff).await;
                }
                Err(e) => {
                    return Err(ScrapeError::PageLoad {
                        url: url.to_string(),
                        attempts: attempt,
                        last_error: e.to_string(),
                    });
                }
            }
        }
    }

    /// Waits for an element to be present and clickable
    pub async fn wait_for_clickable(&self, locator: By, timeout: Duration) -> WebDriverResult<WebElement> {
        let element = self
            .driver
            .query(locator)
            .wait(timeout, POLL_INTERVAL)
            .first()
            .await?;

        element
            .wait_until()
            .wait(timeout, POLL_INTERVAL)
            .clickable()
            .await?;

        Ok(element)
    }

    /// Clicks an element, retrying stale-element and transient failures
    ///
    /// Each attempt waits up to `timeout` for the element to be clickable.
    pub async fn click_element(&self, locator: By, timeout: Duration) -> WebDriverResult<()> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let outcome = match self.wait_for_clickable(locator.clone(), timeout).await {
                Ok(element) => element.click().await,
                Err(e) => Err(e),
            };

            match outcome {
                Ok(()) => return Ok(()),
                Err(e) if attempt < self.max_retries => {
                    tracing::warn!(locator = ?locator, attempt, error = %e, "click failed, retrying");
                    sleep(self.retry_base_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Clicks an element from script, bypassing the UI event path
    ///
    /// Used where overlapping layers make a trusted UI click unreliable.
    pub async fn script_click(&self, element: &WebElement) -> WebDriverResult<()> {
        self.driver
            .execute("arguments[0].click();", vec![element.to_json()?])
            .await?;
        Ok(())
    }

    /// Clears interactive focus from whatever element currently holds it
    pub async fn blur_active_element(&self) -> WebDriverResult<()> {
        self.driver
            .execute("document.activeElement.blur();", vec![])
            .await?;
        Ok(())
    }

    /// Polls until `document.readyState` reports complete
    ///
    /// Best-effort: a page stuck loading subresources is still worth trying,
    /// so a timeout logs and proceeds instead of failing the date.
    pub async fn wait_for_document_ready(&self) -> WebDriverResult<()> {
        let deadline = tokio::time::Instant::now() + self.element_timeout;
        loop {
            let ret = self
                .driver
                .execute("return document.readyState;", vec![])
                .await?;
            if ret.json().as_str() == Some("complete") {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                tracing::warn!("document never reached readyState complete");
                return Ok(());
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    /// Captures a handle inside the results region, for staleness tracking
    ///
    /// The handle is taken *before* a submit; when the page asynchronously
    /// replaces the region, this element detaches from the document and
    /// staleness on it becomes the completion signal.
    pub async fn capture_results_probe(&self) -> Option<WebElement> {
        let region = self.driver.find(By::ClassName("play-content")).await.ok()?;
        match region.find(By::Css(".ball-list, div, p")).await {
            Ok(child) => Some(child),
            // No child to track; the region itself still works as a probe
            Err(_) => Some(region),
        }
    }

    /// Returns the current rendered page source
    pub async fn page_source(&self) -> WebDriverResult<String> {
        self.driver.source().await
    }

    /// Scrolls the results section into view, best-effort
    ///
    /// Tries each known anchor id; absence of all of them is fine.
    pub async fn scroll_to_results(&self) {
        for &anchor_id in results_anchor_ids() {
            match self.driver.find(By::Id(anchor_id)).await {
                Ok(element) => {
                    if let Err(e) = element.scroll_into_view().await {
                        tracing::debug!(anchor = anchor_id, error = %e, "scroll failed");
                    } else {
                        tracing::debug!(anchor = anchor_id, "scrolled to results");
                        sleep(Duration::from_secs(1)).await;
                    }
                    return;
                }
                Err(_) => continue,
            }
        }
        tracing::debug!("no results anchor found");
    }

    /// Waits for any known results container to appear
    ///
    /// Candidate selectors are tried in order, each with the full timeout;
    /// returns true as soon as one resolves.
    pub async fn wait_for_results_region(&self, timeout: Duration) -> bool {
        for locator in results_region_locators() {
            let found = self
                .driver
                .query(locator.clone())
                .wait(timeout, POLL_INTERVAL)
                .first()
                .await;

            if found.is_ok() {
                tracing::debug!(locator = ?locator, "results region present");
                // Give the container a moment to fill
                sleep(Duration::from_secs(2)).await;
                return true;
            }
        }

        tracing::warn!(timeout_secs = timeout.as_secs(), "results region never appeared");
        false
    }

    /// Repeatedly clicks a "load more" style control until it disappears
    ///
    /// Bounded by `max_clicks` as a safety limit. Returns the click count.
    pub async fn load_more_results(&self, max_clicks: u32) -> u32 {
        let mut clicks = 0;

        while clicks < max_clicks {
            let mut clicked = false;

            for locator in load_more_locators() {
                let Ok(button) = self.driver.find(locator.clone()).await else {
                    continue;
                };

                let usable = button.is_displayed().await.unwrap_or(false)
                    && button.is_enabled().await.unwrap_or(false);
                if !usable {
                    continue;
                }

                if let Err(e) = button.scroll_into_view().await {
                    tracing::debug!(error = %e, "pagination scroll failed");
                }
                sleep(Duration::from_millis(500)).await;

                if button.click().await.is_ok() {
                    clicks += 1;
                    clicked = true;
                    tracing::debug!(clicks, "clicked load-more control");
                    sleep(LOAD_MORE_SETTLE).await;
                    break;
                }
            }

            if !clicked {
                break;
            }
        }

        tracing::info!(clicks, "pagination exhausted");
        clicks
    }

    /// Scrolls to the bottom repeatedly to trigger infinite-scroll loading
    ///
    /// Stops when a scroll produces no document-height change, or at the
    /// `max_scrolls` safety limit. Returns the scroll count.
    pub async fn scroll_to_load_more(
        &self,
        pause: Duration,
        max_scrolls: u32,
    ) -> WebDriverResult<u32> {
        let mut last_height: f64 = self
            .driver
            .execute("return document.body.scrollHeight;", vec![])
            .await?
            .convert()?;

        let mut scrolls = 0;
        while scrolls < max_scrolls {
            self.driver
                .execute("window.scrollTo(0, document.body.scrollHeight);", vec![])
                .await?;
            scrolls += 1;
            sleep(pause).await;

            let new_height: f64 = self
                .driver
                .execute("return document.body.scrollHeight;", vec![])
                .await?
                .convert()?;

            if (new_height - last_height).abs() < f64::EPSILON {
                tracing::debug!(scrolls, "no further content loaded");
                break;
            }
            last_height = new_height;
        }

        Ok(scrolls)
    }

    /// Shuts down the browser session
    ///
    /// Consumes the session; callers hold no handle afterwards.
    pub async fn quit(self) -> Result<()> {
        tracing::info!("closing browser session");
        self.driver.quit().await?;
        Ok(())
    }
}
