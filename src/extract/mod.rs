//! HTML extraction of draw records from the rendered results page
//!
//! The page has no documented structure, so extraction leans on two things:
//! a required *combination* of class markers to find the primary game's ball
//! lists (a single marker would also match the companion sub-game's number
//! displays), and per-field soft failure so a missing jackpot label never
//! costs us an otherwise valid draw.

use crate::records::{DrawRecord, WINNING_COUNT};
use crate::{Result, ScrapeError};
use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};

/// Primary game ball-list containers. Both classes are required; `ball-list`
/// alone also matches the companion sub-game's displays.
const PRIMARY_CONTAINER: &str = "ul.ball-list.lotto-max";

/// Companion sub-game (MaxMillions) ball-list containers
const SECONDARY_CONTAINER: &str = "ul.ball-list.maxmillions";

/// Individual number leaves inside a container
const BALL_LEAF: &str = "li.ball";

/// Class marking the bonus-number leaf
const SPECIAL_MARKER: &str = "special";

/// Jackpot label candidates, most specific first
const JACKPOT_SELECTORS: [&str; 2] = [".jackpot-value", ".jackpot"];

/// Winner-count label candidates, most specific first
const WINNER_SELECTORS: [&str; 2] = [".winners-count", ".winners"];

/// Draw-date label candidates, used only when no driver-requested date is
/// available (plain current-page scrapes)
const DATE_SELECTORS: [&str; 2] = [".draw-date", ".date"];

/// Date formats seen on the page, tried in order
const DATE_FORMATS: [&str; 5] = ["%B %d, %Y", "%b %d, %Y", "%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y"];

/// Extracts zero or more validated draw records from rendered page HTML
///
/// # Arguments
///
/// * `html` - Snapshot of the rendered page
/// * `requested_date` - The date the session driver navigated to, if any.
///   When present it is trusted as the record date; the page's own date
///   labels use inconsistent formats. When absent, the date is parsed from
///   the label nearest each container.
/// * `target_date` - Strict filter: records with any other date are
///   discarded. When the filter eliminates everything, the caller sees zero
///   records and a diagnostic lists the dates that were found.
///
/// # Returns
///
/// Valid records only. A container with the wrong number of parseable leaves
/// yields nothing (logged, never raised).
pub fn extract_draws(
    html: &str,
    requested_date: Option<NaiveDate>,
    target_date: Option<NaiveDate>,
) -> Vec<DrawRecord> {
    let document = Html::parse_document(html);

    let Ok(container_sel) = Selector::parse(PRIMARY_CONTAINER) else {
        tracing::error!(selector = PRIMARY_CONTAINER, "invalid container selector");
        return Vec::new();
    };

    let mut records = Vec::new();
    for container in document.select(&container_sel) {
        if let Some(record) = parse_container(container, requested_date) {
            records.push(record);
        }
    }

    // Companion sub-game sets are best-effort extras; they only attach
    // unambiguously when the page shows a single primary draw.
    if records.len() == 1 {
        let secondary = extract_secondary_sets(&document);
        if !secondary.is_empty() {
            let record = records.remove(0);
            records.push(record.with_secondary_draws(secondary));
        }
    }

    if let Some(target) = target_date {
        let found: Vec<NaiveDate> = records.iter().map(|r| r.date()).collect();
        records.retain(|r| r.date() == target);
        if records.is_empty() && !found.is_empty() {
            tracing::warn!(
                target = %target,
                found = ?found,
                "extracted draws do not match the requested date; discarding all"
            );
        }
    }

    records
}

/// Parses one ball-list container into a record, or nothing
///
/// Leaves flagged with the special marker feed the bonus number; everything
/// else contributes winning numbers in document order. Exactly 7 winning
/// numbers and exactly 1 bonus are required.
fn parse_container(container: ElementRef, requested_date: Option<NaiveDate>) -> Option<DrawRecord> {
    let Ok(ball_sel) = Selector::parse(BALL_LEAF) else {
        return None;
    };

    let mut winning = Vec::new();
    let mut bonus = Vec::new();

    for leaf in container.select(&ball_sel) {
        let text = leaf.text().collect::<String>();
        let text = text.trim();

        let number = match text.parse::<u8>() {
            Ok(n) => n,
            Err(_) => {
                tracing::debug!(text, "skipping non-numeric ball leaf");
                continue;
            }
        };

        if leaf.value().classes().any(|c| c == SPECIAL_MARKER) {
            bonus.push(number);
        } else {
            winning.push(number);
        }
    }

    if winning.len() != WINNING_COUNT || bonus.len() != 1 {
        tracing::warn!(
            winning_count = winning.len(),
            bonus_count = bonus.len(),
            "dropping incomplete ball list"
        );
        return None;
    }

    let date = match requested_date {
        Some(date) => date,
        None => match find_container_date(container) {
            Some(date) => date,
            None => {
                tracing::warn!("dropping ball list with no parseable date label");
                return None;
            }
        },
    };

    let record = match DrawRecord::new(date, winning, bonus[0]) {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!(date = %date, error = %e, "dropping invalid draw");
            return None;
        }
    };

    Some(enrich_record(record, container))
}

/// Attaches jackpot and winner-count fields when their labels parse.
/// Parse failure leaves the field absent; it never invalidates the record.
fn enrich_record(record: DrawRecord, container: ElementRef) -> DrawRecord {
    let mut record = record;

    if let Some(text) = find_label_text(container, &JACKPOT_SELECTORS) {
        match parse_currency(&text) {
            Some(amount) => match record.clone().with_jackpot(amount) {
                Ok(enriched) => record = enriched,
                Err(e) => tracing::warn!(error = %e, "ignoring jackpot field"),
            },
            None => tracing::debug!(text, "jackpot label did not parse"),
        }
    }

    if let Some(text) = find_label_text(container, &WINNER_SELECTORS) {
        match text.trim().parse::<u32>() {
            Ok(count) => record = record.with_winner_count(count),
            Err(_) => tracing::debug!(text, "winner-count label did not parse"),
        }
    }

    record
}

/// Collects companion sub-game number sets that match the 7-number shape
fn extract_secondary_sets(document: &Html) -> Vec<Vec<u8>> {
    let (Ok(container_sel), Ok(ball_sel)) = (
        Selector::parse(SECONDARY_CONTAINER),
        Selector::parse(BALL_LEAF),
    ) else {
        return Vec::new();
    };

    let mut sets = Vec::new();
    for container in document.select(&container_sel) {
        let mut numbers = Vec::new();
        for leaf in container.select(&ball_sel) {
            let text = leaf.text().collect::<String>();
            if let Ok(n) = text.trim().parse::<u8>() {
                numbers.push(n);
            }
        }
        if numbers.len() == WINNING_COUNT {
            numbers.sort_unstable();
            sets.push(numbers);
        } else {
            tracing::debug!(count = numbers.len(), "skipping malformed sub-game set");
        }
    }

    sets
}

/// Finds the date label nearest a container and parses it
fn find_container_date(container: ElementRef) -> Option<NaiveDate> {
    let text = find_label_text(container, &DATE_SELECTORS)?;
    parse_display_date(text.trim()).ok()
}

/// Searches the container's enclosing element for the first matching label
///
/// Labels (date, jackpot, winners) sit alongside the ball list inside the
/// same draw card, not inside the list itself.
fn find_label_text(container: ElementRef, selectors: &[&str]) -> Option<String> {
    let scope = container
        .parent()
        .and_then(ElementRef::wrap)
        .unwrap_or(container);

    for raw in selectors {
        let Ok(sel) = Selector::parse(raw) else {
            continue;
        };
        if let Some(element) = scope.select(&sel).next() {
            let text = element.text().collect::<String>();
            let text = text.trim().to_string();
            if !text.is_empty() {
                return Some(text);
            }
        }
    }

    None
}

/// Parses a page date label, trying each known format in order
///
/// Exhausting the format list is a hard parse error for the field.
pub fn parse_display_date(s: &str) -> Result<NaiveDate> {
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Ok(date);
        }
    }
    Err(ScrapeError::DateParse(s.to_string()))
}

/// Normalizes and parses a currency string like "$70,000,000"
///
/// The currency symbol, grouping separators, and whitespace are stripped
/// before the numeric parse. Returns None when nothing numeric remains.
pub fn parse_currency(s: &str) -> Option<f64> {
    let cleaned: String = s
        .chars()
        .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
        .collect();

    match cleaned.parse::<f64>() {
        Ok(value) if value >= 0.0 => Some(value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn friday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 3).unwrap()
    }

    fn draw_card(balls: &str) -> String {
        format!(
            r#"<html><body><div class="play-content"><div class="draw-card">
            <span class="draw-date">January 03, 2025</span>
            <ul class="ball-list lotto-max">{}</ul>
            <span class="jackpot-value">$70,000,000</span>
            <span class="winners-count">1</span>
            </div></div></body></html>"#,
            balls
        )
    }

    const FULL_BALLS: &str = r#"
        <li class="ball">41</li>
        <li class="ball">7</li>
        <li class="ball">22</li>
        <li class="ball">1</li>
        <li class="ball">35</li>
        <li class="ball">50</li>
        <li class="ball">13</li>
        <li class="ball special">9</li>"#;

    #[test]
    fn test_extracts_one_sorted_record() {
        let html = draw_card(FULL_BALLS);
        let records = extract_draws(&html, Some(friday()), Some(friday()));

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.date(), friday());
        assert_eq!(record.winning_numbers(), &[1, 7, 13, 22, 35, 41, 50]);
        assert_eq!(record.bonus_number(), 9);
    }

    #[test]
    fn test_soft_fields_extracted() {
        let html = draw_card(FULL_BALLS);
        let records = extract_draws(&html, Some(friday()), None);

        assert_eq!(records[0].jackpot_amount(), Some(70_000_000.0));
        assert_eq!(records[0].winner_count(), Some(1));
    }

    #[test]
    fn test_six_leaves_yield_nothing() {
        let html = draw_card(
            r#"
            <li class="ball">1</li>
            <li class="ball">2</li>
            <li class="ball">3</li>
            <li class="ball">4</li>
            <li class="ball">5</li>
            <li class="ball">6</li>
            <li class="ball special">9</li>"#,
        );
        assert!(extract_draws(&html, Some(friday()), None).is_empty());
    }

    #[test]
    fn test_missing_special_leaf_yields_nothing() {
        let html = draw_card(
            r#"
            <li class="ball">1</li>
            <li class="ball">2</li>
            <li class="ball">3</li>
            <li class="ball">4</li>
            <li class="ball">5</li>
            <li class="ball">6</li>
            <li class="ball">7</li>"#,
        );
        assert!(extract_draws(&html, Some(friday()), None).is_empty());
    }

    #[test]
    fn test_single_marker_containers_ignored() {
        // ball-list without the game marker must not match
        let html = r#"<html><body>
            <ul class="ball-list">
            <li class="ball">1</li><li class="ball">2</li><li class="ball">3</li>
            <li class="ball">4</li><li class="ball">5</li><li class="ball">6</li>
            <li class="ball">7</li><li class="ball special">9</li>
            </ul></body></html>"#;
        assert!(extract_draws(html, Some(friday()), None).is_empty());
    }

    #[test]
    fn test_strict_target_filter_discards_mismatches() {
        let html = draw_card(FULL_BALLS);
        let other_day = NaiveDate::from_ymd_opt(2025, 1, 7).unwrap();

        // Page-label date (Jan 3) does not match the Jan 7 filter
        let records = extract_draws(&html, None, Some(other_day));
        assert!(records.is_empty());
    }

    #[test]
    fn test_page_label_date_used_without_requested_date() {
        let html = draw_card(FULL_BALLS);
        let records = extract_draws(&html, None, None);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date(), friday());
    }

    #[test]
    fn test_secondary_sets_attach_to_single_record() {
        let html = format!(
            r#"<html><body><div class="draw-card">
            <ul class="ball-list lotto-max">{}</ul>
            <ul class="ball-list maxmillions">
            <li class="ball">2</li><li class="ball">4</li><li class="ball">6</li>
            <li class="ball">8</li><li class="ball">10</li><li class="ball">12</li>
            <li class="ball">14</li>
            </ul>
            </div></body></html>"#,
            FULL_BALLS
        );

        let records = extract_draws(&html, Some(friday()), None);
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].secondary_draws(),
            Some(&[vec![2, 4, 6, 8, 10, 12, 14]][..])
        );
    }

    #[test]
    fn test_parse_currency() {
        assert_eq!(parse_currency("$70,000,000"), Some(70_000_000.0));
        assert_eq!(parse_currency(" 70 000 "), Some(70_000.0));
        assert_eq!(parse_currency("$1,234.56"), Some(1234.56));
        assert_eq!(parse_currency("TBD"), None);
        assert_eq!(parse_currency(""), None);
    }

    #[test]
    fn test_parse_display_date_formats() {
        let expected = friday();
        assert_eq!(parse_display_date("January 03, 2025").unwrap(), expected);
        assert_eq!(parse_display_date("Jan 03, 2025").unwrap(), expected);
        assert_eq!(parse_display_date("2025-01-03").unwrap(), expected);
        assert_eq!(parse_display_date("01/03/2025").unwrap(), expected);

        assert!(parse_display_date("3rd of January").is_err());
    }
}
