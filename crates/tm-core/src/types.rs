//! Core type definitions and engine errors.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One day in milliseconds. Presets must be strictly below this.
pub const DAY_MS: u64 = 24 * 60 * 60 * 1000;

/// Default countdown preset (one minute).
pub const DEFAULT_PRESET_MS: u64 = 60_000;

/// Errors surfaced by the clock engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A preset duration was outside `[0, 24h)`.
    #[error("duration {duration_ms}ms is out of range (must be below 24h)")]
    InvalidDuration { duration_ms: u64 },

    /// A command was issued in a state where it has no meaning.
    #[error("cannot {operation}: {reason}")]
    InvalidOperation {
        operation: &'static str,
        reason: &'static str,
    },

    /// An unrecognized mode name.
    #[error("unknown mode: {value}")]
    UnknownMode { value: String },
}

/// Whether the clock counts up or down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Counts up from zero indefinitely.
    #[default]
    Stopwatch,
    /// Counts down from the preset to zero.
    Countdown,
}

impl Mode {
    /// String representation used in reports and config.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Stopwatch => "stopwatch",
            Self::Countdown => "countdown",
        }
    }

    /// The other mode.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Stopwatch => Self::Countdown,
            Self::Countdown => Self::Stopwatch,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Mode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stopwatch" => Ok(Self::Stopwatch),
            // The timer view calls countdown mode "timer".
            "countdown" | "timer" => Ok(Self::Countdown),
            _ => Err(EngineError::UnknownMode {
                value: s.to_string(),
            }),
        }
    }
}

/// Validates a countdown preset.
pub const fn check_preset(duration_ms: u64) -> Result<u64, EngineError> {
    if duration_ms >= DAY_MS {
        return Err(EngineError::InvalidDuration { duration_ms });
    }
    Ok(duration_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_toggles_back_and_forth() {
        assert_eq!(Mode::Stopwatch.toggled(), Mode::Countdown);
        assert_eq!(Mode::Countdown.toggled().toggled(), Mode::Countdown);
    }

    #[test]
    fn mode_parses_aliases() {
        assert_eq!("timer".parse::<Mode>().unwrap(), Mode::Countdown);
        assert_eq!("stopwatch".parse::<Mode>().unwrap(), Mode::Stopwatch);
        assert!(matches!(
            "lap".parse::<Mode>(),
            Err(EngineError::UnknownMode { .. })
        ));
    }

    #[test]
    fn mode_serializes_lowercase() {
        let json = serde_json::to_string(&Mode::Countdown).unwrap();
        assert_eq!(json, r#""countdown""#);
    }

    #[test]
    fn preset_bounds() {
        assert_eq!(check_preset(0), Ok(0));
        assert_eq!(check_preset(DAY_MS - 1), Ok(DAY_MS - 1));
        assert_eq!(
            check_preset(DAY_MS),
            Err(EngineError::InvalidDuration {
                duration_ms: DAY_MS
            })
        );
    }
}
