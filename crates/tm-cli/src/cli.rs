//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Stopwatch and countdown timer.
///
/// Counts up with lap recording, or down from a preset, ticking every 10ms.
#[derive(Debug, Parser)]
#[command(name = "tm", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the timer interactively, reading commands from stdin.
    Run {
        /// Start in countdown mode instead of stopwatch mode.
        #[arg(long)]
        countdown: bool,

        /// Countdown preset (e.g., 90s, 5m, 1h30m, 01:30:00).
        #[arg(long)]
        preset: Option<String>,
    },

    /// Replay a JSONL script of timestamped commands and print the result.
    Replay {
        /// Path to the script file.
        script: PathBuf,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}
