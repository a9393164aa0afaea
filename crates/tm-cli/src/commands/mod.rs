//! CLI subcommand implementations.

pub mod render;
pub mod replay;
pub mod run;
