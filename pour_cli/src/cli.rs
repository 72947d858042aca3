//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "pour", version, about = "Scale-guided bottle pourer")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/pour_config.toml")]
    pub config: PathBuf,

    /// Log as JSON lines and print results as JSON
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

/// Named servo positions a bottle can be sent to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum TurnTarget {
    /// Rest, bottle upright
    Up,
    /// Pouring position
    Down,
    /// Halfway between pouring and rest
    Pause,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Pour a target amount from one bottle
    Pour {
        /// Bottle number as listed in [[bottles]]
        #[arg(long)]
        bottle: u8,
        /// Target grams to pour
        #[arg(long, value_parser = clap::value_parser!(i32).range(1..=2000))]
        grams: i32,
    },
    /// Move one bottle to a named position
    Turn {
        #[arg(long)]
        bottle: u8,
        #[arg(long, value_enum)]
        to: TurnTarget,
    },
    /// Quick health check (hardware presence / sim ok)
    SelfCheck,
}
