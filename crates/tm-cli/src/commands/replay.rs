//! Replay command: drive the engine from a timestamped JSONL script.
//!
//! Each line is one step, for example:
//!
//! ```text
//! {"at": 0, "command": "start"}
//! {"at": 1250, "command": "lap"}
//! {"at": 2000, "command": "preset", "duration": "5m"}
//! {"at": 2600, "command": "motion", "x": 25.0, "y": 9.0, "z": 1.5}
//! ```
//!
//! `at` is milliseconds on a manual clock and must not decrease. Between
//! steps the engine receives scheduler ticks at the configured interval,
//! exactly as the interactive host would deliver them.

use std::cell::Cell;
use std::io::Write;
use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tm_core::{
    Clock, ClockEngine, ClockEvent, ManualClock, MotionSample, ShakeDetector, parse_duration,
};

use crate::Config;
use crate::commands::render::{SessionSummary, format_summary};

/// One line of a replay script.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Step {
    /// Manual clock time of the step, in milliseconds.
    pub at: u64,
    #[serde(flatten)]
    pub action: Action,
}

/// What a step does to the engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Action {
    Start,
    Stop,
    Toggle,
    Lap,
    LapOrReset,
    Reset,
    Mode,
    Preset { duration: String },
    Motion { x: f64, y: f64, z: f64 },
    /// Deliver a tick at exactly `at`, without waiting for the interval.
    Tick,
}

/// Parses a script, skipping blank lines and `#` comments.
pub fn parse_script(content: &str) -> Result<Vec<Step>> {
    let mut steps = Vec::new();
    let mut last_at = 0;
    for (index, line) in content.lines().enumerate() {
        let line_no = index + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let step: Step = serde_json::from_str(line)
            .with_context(|| format!("line {line_no}: invalid step"))?;
        if step.at < last_at {
            bail!(
                "line {line_no}: timestamp {} is earlier than the previous step ({last_at})",
                step.at
            );
        }
        if let Action::Preset { duration } = &step.action {
            parse_duration(duration).with_context(|| format!("line {line_no}: bad preset"))?;
        }
        last_at = step.at;
        steps.push(step);
    }
    Ok(steps)
}

/// Brings the engine up to `until`, then leaves the clock there.
///
/// Only the last interval boundary at or before `until` is delivered. Values
/// are recomputed from absolute timestamps, so the intermediate ticks would
/// not change the outcome, and skipping them keeps long gaps cheap.
fn advance_to(engine: &mut ClockEngine<ManualClock>, clock: &ManualClock, until: u64) {
    let interval_ms = u64::try_from(engine.tick_interval().as_millis())
        .unwrap_or(u64::MAX)
        .max(1);
    if let Some(ticket) = engine.ticket() {
        let now = clock.now_ms();
        let ticks = until.saturating_sub(now) / interval_ms;
        if ticks > 0 {
            let last_boundary = now.saturating_add(ticks.saturating_mul(interval_ms));
            clock.set(last_boundary);
            engine.deliver(ticket, last_boundary);
        }
    }
    clock.set(until);
}

/// Runs `steps` against a fresh engine and summarizes the outcome.
pub fn replay(steps: &[Step], config: &Config) -> Result<SessionSummary> {
    let clock = ManualClock::new(0);
    let mut engine = ClockEngine::new(clock.clone())
        .with_tick_interval(config.tick_interval())
        .with_preset(config.default_preset_ms)
        .context("invalid default_preset_ms in configuration")?;
    let mut detector = ShakeDetector::new(config.shake);

    let completions = Rc::new(Cell::new(0_usize));
    let counter = Rc::clone(&completions);
    engine.subscribe(move |event| {
        if *event == ClockEvent::Completed {
            counter.set(counter.get() + 1);
        }
    });

    let mut rejected = 0;
    for step in steps {
        advance_to(&mut engine, &clock, step.at);
        tracing::trace!(at = step.at, action = ?step.action, "replaying step");

        match &step.action {
            Action::Start => engine.start(),
            Action::Stop => engine.stop(),
            Action::Toggle => engine.toggle_running(),
            Action::LapOrReset => {
                engine.lap_or_reset();
            }
            Action::Reset => engine.reset(),
            Action::Mode => engine.toggle_mode(),
            Action::Tick => engine.tick_now(),
            Action::Lap => {
                if let Err(err) = engine.lap() {
                    tracing::warn!(at = step.at, error = %err, "lap ignored");
                    rejected += 1;
                }
            }
            Action::Preset { duration } => {
                let duration_ms = parse_duration(duration)?;
                if engine.set_preset(duration_ms).is_err() {
                    rejected += 1;
                }
            }
            Action::Motion { x, y, z } => {
                let sample = MotionSample {
                    timestamp_ms: step.at,
                    x: *x,
                    y: *y,
                    z: *z,
                };
                if detector.observe(&sample) {
                    engine.toggle_running();
                }
            }
        }
    }

    Ok(SessionSummary {
        snapshot: engine.snapshot(),
        completions: completions.get(),
        rejected,
    })
}

/// Runs the replay command.
pub fn run<W: Write>(writer: &mut W, script: &Path, config: &Config, json: bool) -> Result<()> {
    let content = std::fs::read_to_string(script)
        .with_context(|| format!("failed to read {}", script.display()))?;
    let steps = parse_script(&content)?;
    tracing::debug!(steps = steps.len(), "loaded replay script");

    let summary = replay(&steps, config)?;
    if json {
        let json = serde_json::to_string_pretty(&summary).context("failed to serialize summary")?;
        writeln!(writer, "{json}")?;
    } else {
        write!(writer, "{}", format_summary(&summary))?;
    }
    Ok(())
}
