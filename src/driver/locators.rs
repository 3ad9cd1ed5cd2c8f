//! Selector fallback chains for the remote page's controls
//!
//! The page's structure shifts without notice, so every lookup that matters
//! is an ordered list of locator strategies tried in sequence: a stable id
//! first, then progressively less specific fallbacks. Keeping the chains as
//! data makes the "try A, then B, then C" policy easy to extend when the
//! page changes again.

use thirtyfour::By;

/// Submit control for the calendar picker, most specific first
pub fn submit_locators() -> Vec<By> {
    vec![
        By::Id("winning-numbers-calendar-picker-submit"),
        By::Css("#winning-numbers-calendar-picker-submit"),
        By::ClassName("winning-numbers-calendar-picker-submit"),
        By::XPath("//button[@id='winning-numbers-calendar-picker-submit']"),
        By::XPath("//button[contains(text(), 'Apply')]"),
        By::XPath("//button[contains(text(), 'Submit')]"),
    ]
}

/// Candidate containers that signal the results region has rendered
pub fn results_region_locators() -> Vec<By> {
    vec![
        By::ClassName("ball-list"),
        By::ClassName("lotto-balls"),
        By::ClassName("past-results"),
        By::ClassName("results-table"),
        By::Tag("table"),
    ]
}

/// "Load more" style pagination controls
pub fn load_more_locators() -> Vec<By> {
    vec![
        By::ClassName("load-more"),
        By::ClassName("show-more"),
        By::Css("button[class*='load-more']"),
        By::Css("button[class*='show-more']"),
        By::Css("a[class*='load-more']"),
        By::XPath("//button[contains(text(), 'Load More')]"),
        By::XPath("//button[contains(text(), 'Show More')]"),
        By::XPath("//a[contains(text(), 'Load More')]"),
    ]
}

/// Anchor element ids used to scroll the results section into view
pub fn results_anchor_ids() -> &'static [&'static str] {
    &["pastResultsHeader", "past-results", "results"]
}
