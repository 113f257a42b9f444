//! CLI argument parsing for housekeeping tools
//!
//! Common arguments are shared via `#[command(flatten)]`; each binary adds
//! its own subcommands.

use clap::Parser;

/// Common arguments shared across all tools
#[derive(Parser, Debug, Clone)]
pub struct CommonArgs {
    /// Path to configuration file (ignored if missing)
    #[arg(short = 'f', long = "config", default_value = "hk.toml", global = true)]
    pub config_file: String,

    /// Log every decoded frame at debug level
    #[arg(long, global = true)]
    pub dump: bool,
}

/// Arguments for commands that decode a single log
#[derive(Parser, Debug, Clone)]
pub struct DecodeArgs {
    /// Path to a housekeeping_rtd.log file
    pub file: std::path::PathBuf,

    /// Skip frames with an unknown chip id instead of failing
    #[arg(long)]
    pub skip_unknown: bool,
}
