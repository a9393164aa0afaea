//! TimeMaster CLI library.
//!
//! This crate provides the terminal host for the clock engine.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands};
pub use config::Config;
