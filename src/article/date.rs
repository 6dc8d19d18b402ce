//! Posting date parsing
//!
//! News servers are inconsistent about `Date:` formatting. We try a short,
//! ordered list of layouts and take the first that parses.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeDelta, Utc};
use thiserror::Error;

/// None of the accepted layouts matched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unparseable posting date {input:?}: {source}")]
pub struct DateError {
    pub input: String,
    pub source: chrono::ParseError,
}

enum Zone {
    /// `-0700`, parsed by chrono
    Numeric,
    /// `MST`, `GMT`, ... looked up in [`named_zone_offset`]
    Named,
}

struct DateLayout {
    format: &'static str,
    zone: Zone,
}

/// Tried in order, after any leading weekday is dropped; the error reported
/// is the last layout's.
const POSTING_DATE_LAYOUTS: [DateLayout; 2] = [
    DateLayout {
        format: "%d %b %Y %H:%M:%S %z",
        zone: Zone::Numeric,
    },
    DateLayout {
        format: "%d %b %Y %H:%M:%S",
        zone: Zone::Named,
    },
];

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

impl DateLayout {
    fn parse(&self, input: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
        match self.zone {
            Zone::Numeric => DateTime::parse_from_str(input, self.format),
            Zone::Named => {
                let named = input
                    .rsplit_once(' ')
                    .filter(|(_, zone)| zone.chars().all(|c| c.is_ascii_alphabetic()));
                match named {
                    Some((stamp, zone)) => {
                        let local = NaiveDateTime::parse_from_str(stamp, self.format)?;
                        let offset = named_zone_offset(zone);
                        let utc = local - TimeDelta::seconds(i64::from(offset.local_minus_utc()));
                        Ok(DateTime::from_naive_utc_and_offset(utc, offset))
                    }
                    // No zone at all: read as UTC
                    None => NaiveDateTime::parse_from_str(input, self.format)
                        .map(|local| local.and_utc().fixed_offset()),
                }
            }
        }
    }
}

/// RFC 5322 zone names. Anything else is treated as UTC.
fn named_zone_offset(zone: &str) -> FixedOffset {
    let hours = match zone.to_ascii_uppercase().as_str() {
        "EDT" => -4,
        "EST" | "CDT" => -5,
        "CST" | "MDT" => -6,
        "MST" | "PDT" => -7,
        "PST" => -8,
        _ => 0,
    };
    FixedOffset::east_opt(hours * 3600).unwrap_or_else(|| Utc.fix())
}

/// Drops a trailing comment such as `(UTC)` or `(PST)`
fn strip_comment(raw: &str) -> &str {
    match raw.rfind(" (") {
        Some(i) if raw.ends_with(')') => raw[..i].trim_end(),
        _ => raw,
    }
}

/// Drops a leading `Mon, `. The name must be a weekday but need not agree
/// with the date, since plenty of posting software gets it wrong.
fn strip_weekday(raw: &str) -> &str {
    match raw.split_once(',') {
        Some((day, rest)) if WEEKDAYS.iter().any(|w| w.eq_ignore_ascii_case(day.trim())) => {
            rest.trim_start()
        }
        _ => raw,
    }
}

/// Parses an article's posting date
pub fn parse_posting_date(raw: &str) -> Result<DateTime<FixedOffset>, DateError> {
    let input = strip_weekday(strip_comment(raw.trim()));

    POSTING_DATE_LAYOUTS[1..]
        .iter()
        .fold(POSTING_DATE_LAYOUTS[0].parse(input), |result, layout| {
            result.or_else(|_| layout.parse(input))
        })
        .map_err(|source| DateError {
            input: raw.to_string(),
            source,
        })
}
