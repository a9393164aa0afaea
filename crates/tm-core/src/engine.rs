//! The clock engine: single owner of the running time value.
//!
//! # Time keeping
//!
//! While running, the value is recomputed from absolute timestamps rather than
//! incremented per tick, so late or irregular ticks never accumulate drift:
//!
//! - stopwatch: `elapsed = base + (now - run_start)`
//! - countdown: `remaining = base - (now - run_start)`, saturating at zero
//!
//! `base` is the value when the current run started, which is how time
//! accumulated before a pause carries into the next run.
//!
//! # Notifications
//!
//! Subscribers are plain callbacks invoked synchronously, in registration
//! order, on the thread issuing the command or delivering the tick.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::clock::{Clock, MonotonicClock};
use crate::duration::format_clock;
use crate::laps::{Lap, LapExtremes, LapRecorder, LapSummary};
use crate::scheduler::{TickScheduler, TickTicket};
use crate::types::{DEFAULT_PRESET_MS, EngineError, Mode, check_preset};

/// Length of one stopwatch progress-ring revolution.
const STOPWATCH_RING_MS: u64 = 60_000;

/// Something observers may want to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ClockEvent {
    /// The time value advanced.
    Tick { value_ms: u64 },
    /// A countdown reached zero. Fired once per run.
    Completed,
    Started { value_ms: u64 },
    Stopped { value_ms: u64 },
    Reset { value_ms: u64 },
    ModeChanged { mode: Mode },
    PresetChanged { preset_ms: u64 },
    LapRecorded { number: usize, lap: Lap },
}

/// Handle returned by [`ClockEngine::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type Subscriber = Box<dyn FnMut(&ClockEvent)>;

/// Read-only view of the engine for renderers and reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockSnapshot {
    pub mode: Mode,
    pub running: bool,
    pub value_ms: u64,
    pub display: String,
    pub preset_ms: u64,
    pub progress: f64,
    /// Oldest first.
    pub laps: Vec<LapSummary>,
}

/// Stopwatch/countdown state machine.
pub struct ClockEngine<C: Clock = MonotonicClock> {
    clock: C,
    mode: Mode,
    running: bool,
    value_ms: u64,
    preset_ms: u64,
    run_base_ms: u64,
    run_started_at: u64,
    completed_this_run: bool,
    laps: LapRecorder,
    scheduler: TickScheduler,
    subscribers: Vec<(SubscriberId, Subscriber)>,
    next_subscriber: u64,
}

impl<C: Clock> fmt::Debug for ClockEngine<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClockEngine")
            .field("mode", &self.mode)
            .field("running", &self.running)
            .field("value_ms", &self.value_ms)
            .field("preset_ms", &self.preset_ms)
            .field("laps", &self.laps.len())
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

impl ClockEngine<MonotonicClock> {
    /// An engine reading wall time from a fresh [`MonotonicClock`].
    pub fn with_monotonic_clock() -> Self {
        Self::new(MonotonicClock::new())
    }
}

impl<C: Clock> ClockEngine<C> {
    /// Creates a stopped stopwatch at zero with the default countdown preset.
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            mode: Mode::Stopwatch,
            running: false,
            value_ms: 0,
            preset_ms: DEFAULT_PRESET_MS,
            run_base_ms: 0,
            run_started_at: 0,
            completed_this_run: false,
            laps: LapRecorder::new(),
            scheduler: TickScheduler::default(),
            subscribers: Vec::new(),
            next_subscriber: 0,
        }
    }

    /// Overrides the tick interval handed to the periodic driver.
    #[must_use]
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.scheduler = TickScheduler::new(interval);
        self
    }

    /// Sets the initial countdown preset.
    pub fn with_preset(mut self, preset_ms: u64) -> Result<Self, EngineError> {
        self.set_preset(preset_ms)?;
        Ok(self)
    }

    // ========== Accessors ==========

    pub const fn mode(&self) -> Mode {
        self.mode
    }

    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// The value as of the last tick or command: elapsed in stopwatch mode,
    /// remaining in countdown mode.
    pub const fn value_ms(&self) -> u64 {
        self.value_ms
    }

    /// The value as of right now, without advancing state.
    pub fn current_value_ms(&self) -> u64 {
        self.value_at(self.clock.now_ms())
    }

    pub const fn preset_ms(&self) -> u64 {
        self.preset_ms
    }

    /// Recorded laps, oldest first.
    pub fn laps(&self) -> &[Lap] {
        self.laps.laps()
    }

    pub fn segments(&self) -> Vec<u64> {
        self.laps.segments()
    }

    pub fn fastest_and_slowest(&self) -> Option<LapExtremes> {
        self.laps.fastest_and_slowest()
    }

    pub fn lap_summaries(&self) -> Vec<LapSummary> {
        self.laps.summaries()
    }

    /// The live tick registration, present only while running.
    pub const fn ticket(&self) -> Option<TickTicket> {
        self.scheduler.active()
    }

    pub const fn tick_interval(&self) -> Duration {
        self.scheduler.interval()
    }

    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Fraction of the progress ring to fill, in `[0, 1]`.
    ///
    /// Countdown: share of the preset still remaining. Stopwatch: position
    /// within the current minute.
    #[expect(
        clippy::cast_precision_loss,
        reason = "values are below 2^53 ms for any realistic run"
    )]
    pub fn progress(&self) -> f64 {
        match self.mode {
            Mode::Countdown => {
                if self.preset_ms == 0 {
                    return 0.0;
                }
                (self.value_ms as f64 / self.preset_ms as f64).min(1.0)
            }
            Mode::Stopwatch => {
                (self.value_ms % STOPWATCH_RING_MS) as f64 / STOPWATCH_RING_MS as f64
            }
        }
    }

    pub fn snapshot(&self) -> ClockSnapshot {
        ClockSnapshot {
            mode: self.mode,
            running: self.running,
            value_ms: self.value_ms,
            display: format_clock(self.value_ms),
            preset_ms: self.preset_ms,
            progress: self.progress(),
            laps: self.laps.summaries(),
        }
    }

    // ========== Subscribers ==========

    /// Registers a callback for every [`ClockEvent`].
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriberId
    where
        F: FnMut(&ClockEvent) + 'static,
    {
        let id = SubscriberId(self.next_subscriber);
        self.next_subscriber += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Removes a callback. Returns false if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    fn emit(&mut self, event: ClockEvent) {
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&event);
        }
    }

    // ========== Commands ==========

    /// Starts (or resumes) the clock. No-op if already running.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        let now = self.clock.now_ms();
        self.run_base_ms = self.value_ms;
        self.run_started_at = now;
        self.running = true;
        self.completed_this_run = false;
        let ticket = self.scheduler.register();
        tracing::debug!(
            mode = %self.mode,
            value_ms = self.value_ms,
            generation = ticket.generation(),
            "clock started"
        );
        self.emit(ClockEvent::Started {
            value_ms: self.value_ms,
        });
    }

    /// Stops the clock, freezing the value. No-op if already stopped.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        let now = self.clock.now_ms();
        self.value_ms = self.advanced_value(now);
        self.halt();
        tracing::debug!(mode = %self.mode, value_ms = self.value_ms, "clock stopped");
        self.emit(ClockEvent::Stopped {
            value_ms: self.value_ms,
        });
        // The countdown may have run out since the last tick.
        self.complete_if_expired();
    }

    /// Starts when stopped, stops when running.
    pub fn toggle_running(&mut self) {
        if self.running {
            self.stop();
        } else {
            self.start();
        }
    }

    /// Stops the clock and restores the mode's starting value.
    ///
    /// Stopwatch: zero, laps cleared. Countdown: the preset.
    pub fn reset(&mut self) {
        self.stop();
        self.laps.clear();
        self.value_ms = self.initial_value();
        tracing::debug!(mode = %self.mode, value_ms = self.value_ms, "clock reset");
        self.emit(ClockEvent::Reset {
            value_ms: self.value_ms,
        });
    }

    /// Changes the countdown target.
    ///
    /// Rejects values of 24 hours or more, leaving state untouched. When the
    /// countdown is not running, the displayed remaining time follows the
    /// new preset. In stopwatch mode only the stored preset changes.
    pub fn set_preset(&mut self, duration_ms: u64) -> Result<(), EngineError> {
        let duration_ms = check_preset(duration_ms).inspect_err(|err| {
            tracing::warn!(duration_ms, error = %err, "rejected countdown preset");
        })?;
        self.preset_ms = duration_ms;
        if !self.running && self.mode == Mode::Countdown {
            self.value_ms = duration_ms;
        }
        tracing::debug!(preset_ms = duration_ms, "countdown preset changed");
        self.emit(ClockEvent::PresetChanged {
            preset_ms: duration_ms,
        });
        Ok(())
    }

    /// Switches between stopwatch and countdown.
    ///
    /// Always stops the clock, clears laps and resets the value for the new
    /// mode.
    pub fn toggle_mode(&mut self) {
        self.stop();
        self.mode = self.mode.toggled();
        self.laps.clear();
        self.value_ms = self.initial_value();
        tracing::debug!(mode = %self.mode, value_ms = self.value_ms, "mode changed");
        self.emit(ClockEvent::ModeChanged { mode: self.mode });
    }

    /// Records a lap at the current elapsed time.
    ///
    /// Only valid while the stopwatch is running; otherwise nothing changes.
    pub fn lap(&mut self) -> Result<Lap, EngineError> {
        if self.mode != Mode::Stopwatch {
            return Err(EngineError::InvalidOperation {
                operation: "record lap",
                reason: "laps are only kept in stopwatch mode",
            });
        }
        if !self.running {
            return Err(EngineError::InvalidOperation {
                operation: "record lap",
                reason: "the stopwatch is not running",
            });
        }
        let now = self.clock.now_ms();
        self.value_ms = self.advanced_value(now);
        let lap = self.laps.record_lap(self.value_ms);
        let number = self.laps.len();
        tracing::debug!(number, cumulative_ms = lap.cumulative_ms, "lap recorded");
        self.emit(ClockEvent::LapRecorded { number, lap });
        Ok(lap)
    }

    /// The secondary button: lap while the stopwatch runs, reset otherwise.
    ///
    /// Returns the lap when one was recorded.
    pub fn lap_or_reset(&mut self) -> Option<Lap> {
        if self.mode == Mode::Stopwatch && self.running {
            self.lap().ok()
        } else {
            self.reset();
            None
        }
    }

    // ========== Ticks ==========

    /// Advances the value to `now_ms`. Ignored unless running.
    ///
    /// A countdown that reaches zero stops itself and fires
    /// [`ClockEvent::Completed`].
    pub fn tick(&mut self, now_ms: u64) {
        if !self.running {
            return;
        }
        self.value_ms = self.advanced_value(now_ms);
        self.emit(ClockEvent::Tick {
            value_ms: self.value_ms,
        });

        self.complete_if_expired();
    }

    /// Applies a tick from the periodic driver.
    ///
    /// Returns false, without touching state, when `ticket` belongs to a
    /// registration that has since been cancelled.
    pub fn deliver(&mut self, ticket: TickTicket, now_ms: u64) -> bool {
        if !self.scheduler.accepts(ticket) {
            tracing::trace!(generation = ticket.generation(), "dropped stale tick");
            return false;
        }
        self.tick(now_ms);
        true
    }

    /// Ticks at the clock's current time.
    pub fn tick_now(&mut self) {
        let now = self.clock.now_ms();
        self.tick(now);
    }

    // ========== Internals ==========

    fn halt(&mut self) {
        self.running = false;
        self.scheduler.cancel();
    }

    /// Ends a countdown run that has reached zero, firing `Completed` once.
    fn complete_if_expired(&mut self) {
        if self.mode != Mode::Countdown || self.value_ms != 0 {
            return;
        }
        self.halt();
        if !self.completed_this_run {
            self.completed_this_run = true;
            tracing::debug!(preset_ms = self.preset_ms, "countdown completed");
            self.emit(ClockEvent::Completed);
        }
    }

    const fn initial_value(&self) -> u64 {
        match self.mode {
            Mode::Stopwatch => 0,
            Mode::Countdown => self.preset_ms,
        }
    }

    /// Like [`Self::value_at`], but never moves against the mode's direction.
    fn advanced_value(&self, now_ms: u64) -> u64 {
        let computed = self.value_at(now_ms);
        match self.mode {
            Mode::Stopwatch => computed.max(self.value_ms),
            Mode::Countdown => computed.min(self.value_ms),
        }
    }

    fn value_at(&self, now_ms: u64) -> u64 {
        if !self.running {
            return self.value_ms;
        }
        let run_ms = now_ms.saturating_sub(self.run_started_at);
        match self.mode {
            Mode::Stopwatch => self.run_base_ms.saturating_add(run_ms),
            Mode::Countdown => self.run_base_ms.saturating_sub(run_ms),
        }
    }
}
