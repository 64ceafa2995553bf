//! CLI argument definitions for tailstat-daemon.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Default configuration file, looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "tailstat.toml";

/// HTTP access log monitor.
///
/// Tails an access log, prints traffic statistics for the recent window
/// at a fixed cadence and raises an alert while the request rate stays
/// above the configured threshold.
#[derive(Parser, Debug, Default)]
#[command(name = "tailstat-daemon")]
#[command(version, about, long_about = None)]
pub struct DaemonCli {
    /// Path to tailstat.toml configuration file.
    ///
    /// When omitted, `./tailstat.toml` is used if present and built-in
    /// defaults otherwise. An explicitly given file must exist.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    #[arg(long)]
    pub log_format: Option<String>,

    /// Override the access log file to analyse.
    #[arg(long)]
    pub logfile: Option<String>,

    /// Validate configuration, print the effective settings and exit.
    #[arg(long)]
    pub validate: bool,
}
