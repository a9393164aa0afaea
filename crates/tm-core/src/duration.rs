//! Human-readable duration parsing and clock formatting.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// A full unit-form duration such as `1h30m`, `90s` or `250ms`.
static UNIT_FORM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d+(?:ms|h|m|s))+$").unwrap());

/// One `<number><unit>` component of a unit-form duration.
static UNIT_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)(ms|h|m|s)").unwrap());

/// Clock-form duration: `MM:SS` or `HH:MM:SS`.
static CLOCK_FORM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+):(\d{1,2})(?::(\d{1,2}))?$").unwrap());

/// Quick countdown presets offered by the timer input.
pub const QUICK_PRESETS: [(&str, u64); 4] = [
    ("1m", 60_000),
    ("3m", 180_000),
    ("5m", 300_000),
    ("10m", 600_000),
];

/// Errors from [`parse_duration`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseDurationError {
    #[error("duration cannot be empty")]
    Empty,

    #[error("invalid duration: {input}. Use e.g. '90s', '5m', '1h30m' or '01:30:00'")]
    Malformed { input: String },

    #[error("duration too large: {input}")]
    Overflow { input: String },
}

/// Parses a duration into milliseconds.
///
/// Supports:
/// - Unit form: "250ms", "90s", "5m", "1h30m", "1h 30m 15s"
/// - Clock form: "05:00" (MM:SS), "01:30:00" (HH:MM:SS)
/// - Bare integers, read as seconds: "90"
///
/// Range checks against the countdown limit are left to the engine.
pub fn parse_duration(input: &str) -> Result<u64, ParseDurationError> {
    let compact: String = input
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();

    if compact.is_empty() {
        return Err(ParseDurationError::Empty);
    }

    let overflow = || ParseDurationError::Overflow {
        input: input.to_string(),
    };
    let malformed = || ParseDurationError::Malformed {
        input: input.to_string(),
    };

    if compact.bytes().all(|b| b.is_ascii_digit()) {
        let secs: u64 = compact.parse().map_err(|_| overflow())?;
        return secs.checked_mul(1000).ok_or_else(overflow);
    }

    if let Some(caps) = CLOCK_FORM_RE.captures(&compact) {
        let first: u64 = caps[1].parse().map_err(|_| overflow())?;
        let second: u64 = caps[2].parse().map_err(|_| malformed())?;
        let (hours, minutes, seconds) = match caps.get(3) {
            Some(third) => {
                let third: u64 = third.as_str().parse().map_err(|_| malformed())?;
                (first, second, third)
            }
            None => (0, first, second),
        };
        // Leading component may be any size; the rest are sexagesimal.
        if seconds >= 60 || (caps.get(3).is_some() && minutes >= 60) {
            return Err(malformed());
        }
        return hours
            .checked_mul(3_600_000)
            .and_then(|h| minutes.checked_mul(60_000).and_then(|m| h.checked_add(m)))
            .and_then(|hm| hm.checked_add(seconds * 1000))
            .ok_or_else(overflow);
    }

    if !UNIT_FORM_RE.is_match(&compact) {
        return Err(malformed());
    }

    let mut total: u64 = 0;
    for caps in UNIT_TOKEN_RE.captures_iter(&compact) {
        let n: u64 = caps[1].parse().map_err(|_| overflow())?;
        let per_unit = match &caps[2] {
            "h" => 3_600_000,
            "m" => 60_000,
            "s" => 1000,
            "ms" => 1,
            _ => return Err(malformed()),
        };
        total = n
            .checked_mul(per_unit)
            .and_then(|ms| total.checked_add(ms))
            .ok_or_else(overflow)?;
    }
    Ok(total)
}

/// Formats milliseconds as "MM:SS:CC" (minutes, seconds, centiseconds).
///
/// Minutes are not wrapped into hours, so a 90 minute value reads "90:00:00".
pub fn format_clock(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) / 1000;
    let centis = (ms % 1000) / 10;
    format!("{minutes:02}:{seconds:02}:{centis:02}")
}

/// Formats milliseconds as "HH:MM:SS".
pub fn format_hms(ms: u64) -> String {
    let total_secs = ms / 1000;
    let h = total_secs / 3600;
    let m = (total_secs % 3600) / 60;
    let s = total_secs % 60;
    format!("{h:02}:{m:02}:{s:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_unit_form() {
        assert_eq!(parse_duration("90s"), Ok(90_000));
        assert_eq!(parse_duration("5m"), Ok(300_000));
        assert_eq!(parse_duration("1h30m"), Ok(5_400_000));
        assert_eq!(parse_duration("1h 30m 15s"), Ok(5_415_000));
        assert_eq!(parse_duration("250ms"), Ok(250));
        assert_eq!(parse_duration("2m500ms"), Ok(120_500));
    }

    #[test]
    fn parses_clock_form() {
        assert_eq!(parse_duration("05:00"), Ok(300_000));
        assert_eq!(parse_duration("01:30:00"), Ok(5_400_000));
        assert_eq!(parse_duration("90:00"), Ok(5_400_000));
        assert_eq!(parse_duration("23:59:59"), Ok(86_399_000));
    }

    #[test]
    fn bare_number_is_seconds() {
        assert_eq!(parse_duration("90"), Ok(90_000));
        assert_eq!(parse_duration("0"), Ok(0));
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(parse_duration("  "), Err(ParseDurationError::Empty));
        assert!(matches!(
            parse_duration("-5m"),
            Err(ParseDurationError::Malformed { .. })
        ));
        assert!(matches!(
            parse_duration("5 minutes"),
            Err(ParseDurationError::Malformed { .. })
        ));
        assert!(matches!(
            parse_duration("01:75"),
            Err(ParseDurationError::Malformed { .. })
        ));
        assert!(matches!(
            parse_duration("1:60:00"),
            Err(ParseDurationError::Malformed { .. })
        ));
    }

    #[test]
    fn rejects_overflow() {
        assert!(matches!(
            parse_duration("99999999999999999999h"),
            Err(ParseDurationError::Overflow { .. })
        ));
        assert!(matches!(
            parse_duration("9999999999999999h"),
            Err(ParseDurationError::Overflow { .. })
        ));
    }

    #[test]
    fn formats_clock() {
        assert_eq!(format_clock(0), "00:00:00");
        assert_eq!(format_clock(30), "00:00:03");
        assert_eq!(format_clock(61_250), "01:01:25");
        assert_eq!(format_clock(5_400_000), "90:00:00");
    }

    #[test]
    fn formats_hms() {
        assert_eq!(format_hms(0), "00:00:00");
        assert_eq!(format_hms(61_000), "00:01:01");
        assert_eq!(format_hms(3_661_000), "01:01:01");
    }
}
