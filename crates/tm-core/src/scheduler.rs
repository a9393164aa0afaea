//! Tick registration for the periodic driver.
//!
//! The engine owns a [`TickScheduler`]. Starting the engine registers a new
//! generation and hands out a [`TickTicket`]; stopping it cancels the
//! registration. Whatever timer the host uses to fire ticks must present the
//! ticket it was given, so a callback that was already queued when the engine
//! stopped is recognised as stale and ignored.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Target interval between ticks.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(10);

/// Shortest interval the scheduler will hand out.
pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

/// Proof of a live registration, handed to the periodic driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TickTicket(u64);

impl TickTicket {
    /// The registration generation this ticket belongs to.
    pub const fn generation(self) -> u64 {
        self.0
    }
}

/// Tracks the single active tick registration.
#[derive(Debug, Clone)]
pub struct TickScheduler {
    interval: Duration,
    generation: u64,
    active: Option<TickTicket>,
}

impl TickScheduler {
    /// Creates a scheduler firing every `interval`, at least one millisecond.
    pub const fn new(interval: Duration) -> Self {
        let interval = if interval.as_nanos() < MIN_TICK_INTERVAL.as_nanos() {
            MIN_TICK_INTERVAL
        } else {
            interval
        };
        Self {
            interval,
            generation: 0,
            active: None,
        }
    }

    /// Interval the driver should fire at.
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Replaces any existing registration with a fresh generation.
    pub fn register(&mut self) -> TickTicket {
        self.generation += 1;
        let ticket = TickTicket(self.generation);
        self.active = Some(ticket);
        ticket
    }

    /// Drops the active registration. Outstanding tickets become stale.
    pub fn cancel(&mut self) {
        self.active = None;
    }

    /// The live ticket, if a registration is active.
    pub const fn active(&self) -> Option<TickTicket> {
        self.active
    }

    /// Whether a tick carrying `ticket` should be applied.
    pub fn accepts(&self, ticket: TickTicket) -> bool {
        self.active == Some(ticket)
    }
}

impl Default for TickScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_interval_is_ten_ms() {
        assert_eq!(TickScheduler::default().interval(), Duration::from_millis(10));
    }

    #[test]
    fn sub_millisecond_interval_is_clamped() {
        assert_eq!(
            TickScheduler::new(Duration::ZERO).interval(),
            Duration::from_millis(1)
        );
        assert_eq!(
            TickScheduler::new(Duration::from_micros(250)).interval(),
            Duration::from_millis(1)
        );
        assert_eq!(
            TickScheduler::new(Duration::from_millis(25)).interval(),
            Duration::from_millis(25)
        );
    }

    #[test]
    fn cancelled_ticket_is_rejected() {
        let mut scheduler = TickScheduler::default();
        let ticket = scheduler.register();
        assert!(scheduler.accepts(ticket));

        scheduler.cancel();
        assert!(!scheduler.accepts(ticket));
        assert_eq!(scheduler.active(), None);
    }

    #[test]
    fn re_registering_invalidates_older_ticket() {
        let mut scheduler = TickScheduler::default();
        let first = scheduler.register();
        scheduler.cancel();
        let second = scheduler.register();

        assert_ne!(first, second);
        assert!(!scheduler.accepts(first));
        assert!(scheduler.accepts(second));
        assert_eq!(second.generation(), 2);
    }
}
