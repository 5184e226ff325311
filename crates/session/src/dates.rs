//! Date-token scanning for short messages.
//!
//! A short message like "15.03" or "na 22/04" is often the whole answer to
//! "which day?". The scanner finds the first date-like token and attempts a
//! structured parse; tokens that fail parsing are kept as raw mentions so
//! retrieval can still use them textually.

use chrono::{Datelike, NaiveDate, Utc};
use frontdesk_core::DateMention;
use regex::Regex;

/// Matches `15.03`, `15/03`, `15-03`, optionally with a 2- or 4-digit year.
const DATE_TOKEN_PATTERN: &str = r"\b(\d{1,2})[./-](\d{1,2})(?:[./-](\d{2,4}))?\b";

/// Matches clock times like `18:30` or `9:00`.
const TIME_TOKEN_PATTERN: &str = r"\b([01]?\d|2[0-3]):([0-5]\d)\b";

/// Compiled date- and time-token scanner. Create once, reuse per message.
#[derive(Debug, Clone)]
pub struct DateScanner {
    pattern: Regex,
    time_pattern: Regex,
}

impl DateScanner {
    pub fn new() -> Self {
        Self {
            // Both patterns are const literals; compilation cannot fail.
            pattern: Regex::new(DATE_TOKEN_PATTERN).expect("date token pattern is valid"),
            time_pattern: Regex::new(TIME_TOKEN_PATTERN).expect("time token pattern is valid"),
        }
    }

    /// Find the first date-like token in the message, if any.
    pub fn scan(&self, message: &str) -> Option<DateMention> {
        let caps = self.pattern.captures(message)?;
        let raw = caps.get(0)?.as_str().to_string();

        let day: u32 = caps.get(1)?.as_str().parse().ok()?;
        let month: u32 = caps.get(2)?.as_str().parse().ok()?;
        let year = match caps.get(3) {
            Some(y) => {
                let y: i32 = y.as_str().parse().ok()?;
                if y < 100 { y + 2000 } else { y }
            }
            None => Utc::now().year(),
        };

        // Day-first is the domain convention; an impossible calendar date
        // degrades to a raw mention rather than being dropped.
        let parsed = NaiveDate::from_ymd_opt(year, month, day);
        Some(DateMention { raw, parsed })
    }

    /// Find the first clock-time token in the message, if any.
    pub fn scan_time(&self, message: &str) -> Option<String> {
        self.time_pattern
            .find(message)
            .map(|m| m.as_str().to_string())
    }
}

impl Default for DateScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_month_token_parses() {
        let scanner = DateScanner::new();
        let mention = scanner.scan("15.03").unwrap();
        assert_eq!(mention.raw, "15.03");
        let date = mention.parsed.unwrap();
        assert_eq!(date.day(), 15);
        assert_eq!(date.month(), 3);
    }

    #[test]
    fn full_date_with_year_parses() {
        let scanner = DateScanner::new();
        let mention = scanner.scan("22/04/2026").unwrap();
        assert_eq!(mention.parsed, NaiveDate::from_ymd_opt(2026, 4, 22));
    }

    #[test]
    fn two_digit_year_expands() {
        let scanner = DateScanner::new();
        let mention = scanner.scan("1-12-26").unwrap();
        assert_eq!(mention.parsed, NaiveDate::from_ymd_opt(2026, 12, 1));
    }

    #[test]
    fn impossible_date_kept_as_raw_mention() {
        let scanner = DateScanner::new();
        let mention = scanner.scan("31.02").unwrap();
        assert_eq!(mention.raw, "31.02");
        assert!(mention.parsed.is_none());
    }

    #[test]
    fn token_inside_sentence_found() {
        let scanner = DateScanner::new();
        let mention = scanner.scan("może 15.03 wieczorem").unwrap();
        assert_eq!(mention.raw, "15.03");
    }

    #[test]
    fn no_token_no_mention() {
        let scanner = DateScanner::new();
        assert!(scanner.scan("what about the steps").is_none());
    }

    #[test]
    fn clock_time_found() {
        let scanner = DateScanner::new();
        assert_eq!(scanner.scan_time("może o 18:30?").as_deref(), Some("18:30"));
        assert_eq!(scanner.scan_time("9:00 rano").as_deref(), Some("9:00"));
    }

    #[test]
    fn date_token_is_not_a_time() {
        let scanner = DateScanner::new();
        assert!(scanner.scan_time("15.03").is_none());
        assert!(scanner.scan("18:30").is_none());
    }
}
