//! Core time keeping for the TimeMaster stopwatch and countdown timer.
//!
//! This crate contains the platform-free logic for:
//! - Clock engine: stopwatch/countdown state, drift-free ticks, notifications
//! - Laps: chronological snapshots with segment and fastest/slowest derivation
//! - Tick scheduling: generation tickets so cancelled ticks are ignored
//! - Shake gestures: classifying motion samples into start/stop toggles
//! - Durations: parsing human input and formatting clock values

pub mod clock;
pub mod duration;
mod engine;
pub mod gesture;
mod laps;
pub mod scheduler;
mod types;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use duration::{ParseDurationError, QUICK_PRESETS, format_clock, format_hms, parse_duration};
pub use engine::{ClockEngine, ClockEvent, ClockSnapshot, SubscriberId};
pub use gesture::{MotionSample, ShakeConfig, ShakeDetector};
pub use laps::{Lap, LapExtremes, LapRecorder, LapSummary};
pub use scheduler::{DEFAULT_TICK_INTERVAL, MIN_TICK_INTERVAL, TickScheduler, TickTicket};
pub use types::{DAY_MS, DEFAULT_PRESET_MS, EngineError, Mode, check_preset};
