//! Text rendering of clock state for the terminal.

use serde::{Deserialize, Serialize};
use tm_core::{ClockSnapshot, LapSummary, Mode, format_clock, format_hms};

/// End-of-session summary shared by `run` and `replay`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    #[serde(flatten)]
    pub snapshot: ClockSnapshot,
    /// Countdowns that reached zero.
    pub completions: usize,
    /// Commands refused by the engine (laps out of context, bad presets).
    pub rejected: usize,
}

const fn state_word(running: bool) -> &'static str {
    if running { "running" } else { "stopped" }
}

/// One-line live display, e.g. `stopwatch  00:01:25  running  laps:2`.
pub fn format_status_line(snapshot: &ClockSnapshot) -> String {
    let mut line = format!(
        "{:<9}  {}  {}",
        snapshot.mode.as_str(),
        snapshot.display,
        state_word(snapshot.running)
    );
    if snapshot.mode == Mode::Stopwatch && !snapshot.laps.is_empty() {
        line.push_str(&format!("  laps:{}", snapshot.laps.len()));
    }
    line
}

/// Lap rows, most recent first, with fastest/slowest tags.
pub fn format_laps(laps: &[LapSummary]) -> String {
    if laps.is_empty() {
        return "Laps:      none\n".to_string();
    }

    let mut output = String::from("Laps (latest first):\n");
    for lap in laps.iter().rev() {
        let tag = match (lap.fastest, lap.slowest) {
            (true, true) => "  fastest, slowest",
            (true, false) => "  fastest",
            (false, true) => "  slowest",
            (false, false) => "",
        };
        output.push_str(&format!(
            "  Lap {:>2}  {}  {}{tag}\n",
            lap.number,
            format_clock(lap.segment_ms),
            format_clock(lap.cumulative_ms),
        ));
    }
    output
}

/// Multi-line human-readable summary.
pub fn format_summary(summary: &SessionSummary) -> String {
    let snapshot = &summary.snapshot;
    let mut output = String::new();
    output.push_str(&format!(
        "Mode:      {} ({})\n",
        snapshot.mode,
        state_word(snapshot.running)
    ));
    output.push_str(&format!("Time:      {}\n", snapshot.display));
    output.push_str(&format!("Preset:    {}\n", format_hms(snapshot.preset_ms)));
    output.push_str(&format!("Completed: {}\n", summary.completions));
    output.push_str(&format!("Rejected:  {}\n", summary.rejected));
    if snapshot.mode == Mode::Stopwatch {
        output.push('\n');
        output.push_str(&format_laps(&snapshot.laps));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;
    use tm_core::{ClockEngine, ManualClock};

    fn stopwatch_with_laps() -> ClockSnapshot {
        let clock = ManualClock::new(0);
        let mut engine = ClockEngine::new(clock.clone());
        engine.start();
        for at in [1000, 1800, 2200] {
            clock.set(at);
            engine.lap().unwrap();
        }
        clock.set(2500);
        engine.stop();
        engine.snapshot()
    }

    #[test]
    fn status_line_shows_lap_count() {
        let snapshot = stopwatch_with_laps();
        assert_eq!(
            format_status_line(&snapshot),
            "stopwatch  00:02:50  stopped  laps:3"
        );
    }

    #[test]
    fn status_line_for_countdown() {
        let mut engine = ClockEngine::new(ManualClock::new(0));
        engine.toggle_mode();
        assert_eq!(
            format_status_line(&engine.snapshot()),
            "countdown  01:00:00  stopped"
        );
    }

    #[test]
    fn summary_lists_laps_latest_first() {
        let summary = SessionSummary {
            snapshot: stopwatch_with_laps(),
            completions: 0,
            rejected: 0,
        };
        assert_snapshot!(format_summary(&summary), @r"
        Mode:      stopwatch (stopped)
        Time:      00:02:50
        Preset:    00:01:00
        Completed: 0
        Rejected:  0

        Laps (latest first):
          Lap  3  00:00:40  00:02:20  fastest
          Lap  2  00:00:80  00:01:80
          Lap  1  00:01:00  00:01:00  slowest
        ");
    }

    #[test]
    fn summary_without_laps() {
        let engine = ClockEngine::new(ManualClock::new(0));
        let summary = SessionSummary {
            snapshot: engine.snapshot(),
            completions: 0,
            rejected: 2,
        };
        assert_snapshot!(format_summary(&summary), @r"
        Mode:      stopwatch (stopped)
        Time:      00:00:00
        Preset:    00:01:00
        Completed: 0
        Rejected:  2

        Laps:      none
        ");
    }

    #[test]
    fn countdown_summary_omits_laps() {
        let mut engine = ClockEngine::new(ManualClock::new(0));
        engine.toggle_mode();
        let summary = SessionSummary {
            snapshot: engine.snapshot(),
            completions: 1,
            rejected: 0,
        };
        let output = format_summary(&summary);
        assert!(output.starts_with("Mode:      countdown (stopped)\n"));
        assert!(!output.contains("Laps"));
    }
}
