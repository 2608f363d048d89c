use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::alerts::AlertConfig;
use crate::error::StorageError;
use crate::storage::FileStore;

const DEFAULT_TICK_MS: u64 = 1000;

#[derive(Parser, Debug)]
#[command(name = "pomodoro", version, about = "Pomodoro timer for the terminal")]
pub struct Cli {
    /// Directory for the saved settings and statistics
    #[arg(long, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    /// Real-time length of one tick in milliseconds
    #[arg(long, value_name = "N", default_value_t = DEFAULT_TICK_MS)]
    pub tick_ms: u64,

    /// Do not ring the terminal bell when a phase ends
    #[arg(long)]
    pub no_bell: bool,

    /// Do not print completion and confirmation notices
    #[arg(long)]
    pub no_notify: bool,

    /// Log filter, e.g. "debug" or "pomodoro=trace" (defaults to RUST_LOG, then "info")
    #[arg(long, value_name = "FILTER")]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub tick_interval: Duration,
    pub alerts: AlertConfig,
    pub log_filter: String,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self, StorageError> {
        let data_dir = match cli.data_dir {
            Some(dir) => dir,
            None => FileStore::default_root()?,
        };
        let tick_ms = if cli.tick_ms == 0 {
            DEFAULT_TICK_MS
        } else {
            cli.tick_ms
        };
        let log_filter = cli
            .log_level
            .or_else(|| std::env::var("RUST_LOG").ok())
            .unwrap_or_else(|| "info".to_string());
        Ok(Self {
            data_dir,
            tick_interval: Duration::from_millis(tick_ms),
            alerts: AlertConfig {
                bell: !cli.no_bell,
                notification: !cli.no_notify,
            },
            log_filter,
        })
    }
}
