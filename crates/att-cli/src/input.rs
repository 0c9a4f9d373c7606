//! Parsing of operator-entered timestamps and dates.
//!
//! The ledger only accepts typed values; everything textual is resolved here.
//! The current time is passed in rather than read, so a fallback to "now" is
//! a visible part of the result and tests do not depend on the wall clock.

use std::sync::LazyLock;

use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};
use regex::Regex;
use thiserror::Error;

use crate::Config;

/// Pre-compiled regex for relative time parsing.
static RELATIVE_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\s*(minute|min|hour|h)s?\s+ago$").expect("relative time regex is valid")
});

/// Relative offsets beyond a day cannot produce a same-day check-out anyway.
const MAX_RELATIVE_MINUTES: i64 = 24 * 60;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("invalid timestamp '{input}', expected {format} (e.g. 2024-01-10 09:00), 'now' or 'N minutes ago'")]
    InvalidTimestamp { input: String, format: String },

    #[error("relative time too large: {input} (at most 24 hours)")]
    RelativeTooLarge { input: String },

    #[error("invalid date '{input}', expected {format} (e.g. 2024-01-10)")]
    InvalidDate { input: String, format: String },
}

/// A resolved timestamp together with how it was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampInput {
    /// Entered in the configured format.
    Parsed(NaiveDateTime),
    /// Empty input or the word `now`.
    Now(NaiveDateTime),
    /// `N minutes ago` / `N hours ago`.
    Relative(NaiveDateTime),
    /// The input could not be parsed and the current time was substituted.
    DefaultedToNow(NaiveDateTime),
}

impl TimestampInput {
    pub const fn value(self) -> NaiveDateTime {
        match self {
            Self::Parsed(at) | Self::Now(at) | Self::Relative(at) | Self::DefaultedToNow(at) => at,
        }
    }

    /// True when the operator's input was discarded.
    pub const fn is_fallback(self) -> bool {
        matches!(self, Self::DefaultedToNow(_))
    }
}

/// Resolves a check-in/check-out timestamp.
///
/// Supports:
/// - the configured format: "2024-01-10 09:00"
/// - "now" or an empty line
/// - relative: "15 minutes ago", "2 hours ago"
///
/// Anything else falls back to `now` when `config.default_to_now` is set.
pub fn parse_timestamp(
    input: &str,
    now: NaiveDateTime,
    config: &Config,
) -> Result<TimestampInput, InputError> {
    let now = truncate_to_minute(now);
    let input = input.trim();

    if input.is_empty() || input.eq_ignore_ascii_case("now") {
        return Ok(TimestampInput::Now(now));
    }

    if let Ok(at) = NaiveDateTime::parse_from_str(input, &config.timestamp_format) {
        return Ok(TimestampInput::Parsed(truncate_to_minute(at)));
    }

    if let Some(caps) = RELATIVE_TIME_RE.captures(&input.to_ascii_lowercase()) {
        let n: i64 = caps[1].parse().unwrap_or(i64::MAX);
        let minutes = match &caps[2] {
            "hour" | "h" => n.saturating_mul(60),
            _ => n,
        };
        if minutes > MAX_RELATIVE_MINUTES {
            return Err(InputError::RelativeTooLarge {
                input: input.to_string(),
            });
        }
        return Ok(TimestampInput::Relative(now - Duration::minutes(minutes)));
    }

    if config.default_to_now {
        return Ok(TimestampInput::DefaultedToNow(now));
    }

    Err(InputError::InvalidTimestamp {
        input: input.to_string(),
        format: config.timestamp_format.clone(),
    })
}

/// Parses a report bound in the configured date format.
pub fn parse_date(input: &str, config: &Config) -> Result<NaiveDate, InputError> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, &config.date_format).map_err(|_| InputError::InvalidDate {
        input: input.to_string(),
        format: config.date_format.clone(),
    })
}

fn truncate_to_minute(at: NaiveDateTime) -> NaiveDateTime {
    at.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(at)
}
