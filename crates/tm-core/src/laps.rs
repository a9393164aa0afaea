//! Lap bookkeeping for stopwatch mode.
//!
//! Laps are stored in the order they were recorded. Segment durations and the
//! fastest/slowest classification are derived on demand, never stored.

use serde::{Deserialize, Serialize};

/// A snapshot of stopwatch elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lap {
    /// Engine elapsed time when the lap was recorded.
    pub cumulative_ms: u64,
}

/// Indices (chronological) of the quickest and slowest segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LapExtremes {
    pub fastest: usize,
    pub slowest: usize,
}

/// Display-ready view of one lap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LapSummary {
    /// 1-based lap number.
    pub number: usize,
    pub segment_ms: u64,
    pub cumulative_ms: u64,
    #[serde(default)]
    pub fastest: bool,
    #[serde(default)]
    pub slowest: bool,
}

/// Ordered record of laps.
#[derive(Debug, Clone, Default)]
pub struct LapRecorder {
    laps: Vec<Lap>,
}

impl LapRecorder {
    pub const fn new() -> Self {
        Self { laps: Vec::new() }
    }

    /// Appends a lap taken at `current_elapsed_ms` and returns it.
    pub fn record_lap(&mut self, current_elapsed_ms: u64) -> Lap {
        let lap = Lap {
            cumulative_ms: current_elapsed_ms,
        };
        self.laps.push(lap);
        lap
    }

    pub fn clear(&mut self) {
        self.laps.clear();
    }

    /// Recorded laps, oldest first.
    pub fn laps(&self) -> &[Lap] {
        &self.laps
    }

    pub fn len(&self) -> usize {
        self.laps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.laps.is_empty()
    }

    /// Per-lap durations, oldest first.
    ///
    /// The first segment is the first lap's cumulative time; each later one is
    /// the difference from its predecessor.
    pub fn segments(&self) -> Vec<u64> {
        let mut previous = 0;
        self.laps
            .iter()
            .map(|lap| {
                let segment = lap.cumulative_ms.saturating_sub(previous);
                previous = lap.cumulative_ms;
                segment
            })
            .collect()
    }

    /// Fastest and slowest segment indices.
    ///
    /// `None` with fewer than two laps. Ties resolve to the earliest lap.
    pub fn fastest_and_slowest(&self) -> Option<LapExtremes> {
        let segments = self.segments();
        if segments.len() < 2 {
            return None;
        }

        let mut extremes = LapExtremes {
            fastest: 0,
            slowest: 0,
        };
        for (i, &segment) in segments.iter().enumerate().skip(1) {
            if segment < segments[extremes.fastest] {
                extremes.fastest = i;
            }
            if segment > segments[extremes.slowest] {
                extremes.slowest = i;
            }
        }
        Some(extremes)
    }

    /// Display-ready rows, oldest first.
    pub fn summaries(&self) -> Vec<LapSummary> {
        let extremes = self.fastest_and_slowest();
        self.segments()
            .into_iter()
            .zip(&self.laps)
            .enumerate()
            .map(|(i, (segment_ms, lap))| LapSummary {
                number: i + 1,
                segment_ms,
                cumulative_ms: lap.cumulative_ms,
                fastest: extremes.is_some_and(|e| e.fastest == i),
                slowest: extremes.is_some_and(|e| e.slowest == i),
            })
            .collect()
    }
}
