//! Interactive timer driven by stdin commands.
//!
//! A single-threaded tokio runtime multiplexes two sources in one task: the
//! periodic tick interval and lines read from stdin. Every engine mutation
//! happens on that task, so no locking is needed.

use std::cell::Cell;
use std::io::{self, Write};
use std::rc::Rc;

use anyhow::{Context, Result};
use tm_core::{
    Clock, ClockEngine, ClockEvent, MonotonicClock, ParseDurationError, QUICK_PRESETS,
    format_clock, parse_duration,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;

use crate::Config;
use crate::commands::render::{SessionSummary, format_status_line, format_summary};

const HELP: &str = "\
commands:
  <enter>, space   start/stop
  s, start         start
  x, stop          stop
  l, lap           lap (running stopwatch) or reset
  r, reset         reset
  m, mode          switch stopwatch/countdown
  p, preset <dur>  set countdown (90s, 5m, 1h30m, 01:30:00)
  1-4              quick preset (1m, 3m, 5m, 10m)
  h, help          show this help
  q, quit          exit";

/// A parsed line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Toggle,
    Start,
    Stop,
    LapOrReset,
    Reset,
    Mode,
    Preset(u64),
    Help,
    Quit,
    Unknown(String),
}

/// Parses one line of user input.
pub fn parse_input(line: &str) -> Result<Input, ParseDurationError> {
    // A bare space counts as the start/stop key, so only trim the line ending.
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Ok(Input::Toggle);
    }
    let mut parts = line.trim().splitn(2, char::is_whitespace);
    let command = parts.next().unwrap_or_default().to_ascii_lowercase();
    let argument = parts.next().map(str::trim);

    let input = match command.as_str() {
        "space" => Input::Toggle,
        "s" | "start" => Input::Start,
        "x" | "stop" => Input::Stop,
        "l" | "lap" => Input::LapOrReset,
        "r" | "reset" => Input::Reset,
        "m" | "mode" => Input::Mode,
        "h" | "help" | "?" => Input::Help,
        "q" | "quit" | "exit" => Input::Quit,
        "p" | "preset" => Input::Preset(parse_duration(argument.unwrap_or_default())?),
        "1" | "2" | "3" | "4" => {
            let index = command.parse::<usize>().unwrap_or(1) - 1;
            Input::Preset(QUICK_PRESETS[index].1)
        }
        _ => Input::Unknown(line.trim().to_string()),
    };
    Ok(input)
}

/// Applies one input. Returns false when the session should end.
fn apply(engine: &mut ClockEngine, input: Input, rejected: &mut usize) -> bool {
    match input {
        Input::Toggle => engine.toggle_running(),
        Input::Start => engine.start(),
        Input::Stop => engine.stop(),
        Input::LapOrReset => {
            engine.lap_or_reset();
        }
        Input::Reset => engine.reset(),
        Input::Mode => engine.toggle_mode(),
        Input::Preset(duration_ms) => {
            if let Err(err) = engine.set_preset(duration_ms) {
                eprintln!("\n{err}");
                *rejected += 1;
            }
        }
        Input::Help => eprintln!("\n{HELP}"),
        Input::Quit => return false,
        Input::Unknown(text) => eprintln!("\nunknown command: {text} (h for help)"),
    }
    true
}

/// Redraws the status line in place.
fn redraw<W: Write>(out: &mut W, engine: &ClockEngine) -> io::Result<()> {
    write!(out, "\r\x1b[2K{}", format_status_line(&engine.snapshot()))?;
    out.flush()
}

async fn event_loop(mut engine: ClockEngine, completions: Rc<Cell<usize>>) -> Result<SessionSummary> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut interval = tokio::time::interval(engine.tick_interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut rejected = 0;
    let mut stdout = io::stdout();

    redraw(&mut stdout, &engine).context("failed to write to stdout")?;
    loop {
        tokio::select! {
            _ = interval.tick(), if engine.is_running() => {
                if let Some(ticket) = engine.ticket() {
                    let now = engine.clock().now_ms();
                    engine.deliver(ticket, now);
                }
            }
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    break;
                };
                let input = match parse_input(&line) {
                    Ok(input) => input,
                    Err(err) => {
                        eprintln!("\n{err}");
                        continue;
                    }
                };
                let was_running = engine.is_running();
                if !apply(&mut engine, input, &mut rejected) {
                    break;
                }
                if !was_running && engine.is_running() {
                    interval.reset();
                }
            }
        }
        redraw(&mut stdout, &engine).context("failed to write to stdout")?;
    }

    engine.stop();
    println!();
    Ok(SessionSummary {
        snapshot: engine.snapshot(),
        completions: completions.get(),
        rejected,
    })
}

/// Runs the interactive timer until `q` or end of input.
pub fn run(config: &Config, countdown: bool, preset: Option<&str>) -> Result<()> {
    let preset_ms = match preset {
        Some(text) => parse_duration(text).context("invalid --preset")?,
        None => config.default_preset_ms,
    };

    let mut engine = ClockEngine::new(MonotonicClock::new())
        .with_tick_interval(config.tick_interval())
        .with_preset(preset_ms)
        .context("invalid countdown preset")?;
    if countdown {
        engine.toggle_mode();
    }

    let completions = Rc::new(Cell::new(0_usize));
    let counter = Rc::clone(&completions);
    engine.subscribe(move |event| match event {
        ClockEvent::Completed => {
            counter.set(counter.get() + 1);
            // Terminal bell stands in for the completion chime.
            eprintln!("\x07\ncountdown finished");
        }
        ClockEvent::LapRecorded { number, lap } => {
            eprintln!("\nlap {number}: {}", format_clock(lap.cumulative_ms));
        }
        _ => {}
    });

    eprintln!("{HELP}");
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;
    let summary = runtime.block_on(event_loop(engine, completions))?;

    print!("{}", format_summary(&summary));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_line_and_space_toggle() {
        assert_eq!(parse_input(""), Ok(Input::Toggle));
        assert_eq!(parse_input(" "), Ok(Input::Toggle));
        assert_eq!(parse_input("space"), Ok(Input::Toggle));
    }

    #[test]
    fn short_and_long_commands() {
        assert_eq!(parse_input("s"), Ok(Input::Start));
        assert_eq!(parse_input("STOP"), Ok(Input::Stop));
        assert_eq!(parse_input("lap\n"), Ok(Input::LapOrReset));
        assert_eq!(parse_input("r"), Ok(Input::Reset));
        assert_eq!(parse_input("mode"), Ok(Input::Mode));
        assert_eq!(parse_input("q"), Ok(Input::Quit));
        assert_eq!(parse_input("?"), Ok(Input::Help));
    }

    #[test]
    fn preset_with_duration() {
        assert_eq!(parse_input("p 5m"), Ok(Input::Preset(300_000)));
        assert_eq!(parse_input("preset 01:30:00"), Ok(Input::Preset(5_400_000)));
        assert_eq!(parse_input("p"), Err(ParseDurationError::Empty));
    }

    #[test]
    fn quick_presets() {
        assert_eq!(parse_input("1"), Ok(Input::Preset(60_000)));
        assert_eq!(parse_input("4"), Ok(Input::Preset(600_000)));
    }

    #[test]
    fn unknown_input_is_kept() {
        assert_eq!(
            parse_input("  dance "),
            Ok(Input::Unknown("dance".to_string()))
        );
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn redraw_writes_status_line() {
        let engine = ClockEngine::with_monotonic_clock();
        let mut output = Vec::new();
        redraw(&mut output, &engine).unwrap();
        let output = String::from_utf8(output).unwrap();
        assert_eq!(output, "\r\x1b[2Kstopwatch  00:00:00  stopped");
    }

    #[test]
    fn redraw_reports_write_failures() {
        let engine = ClockEngine::with_monotonic_clock();
        let err = redraw(&mut ClosedPipe, &engine).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn apply_counts_rejected_presets() {
        let mut engine = ClockEngine::with_monotonic_clock();
        let mut rejected = 0;
        assert!(apply(&mut engine, Input::Preset(tm_core::DAY_MS), &mut rejected));
        assert_eq!(rejected, 1);
        assert!(apply(&mut engine, Input::Mode, &mut rejected));
        assert!(apply(&mut engine, Input::Preset(5000), &mut rejected));
        assert_eq!(engine.value_ms(), 5000);
        assert!(!apply(&mut engine, Input::Quit, &mut rejected));
    }
}
