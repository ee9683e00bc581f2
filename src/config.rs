//! Configuration parsing for the Presswire core.
//!
//! Supports:
//! - CLI arguments via clap (flattened into the embedding app's parser)
//! - Environment variable overrides
//! - Sensible defaults for quick start

use clap::Parser;
use std::time::Duration;

/// Presswire: content prominence ranking and notification fan-out.
#[derive(Parser, Debug, Clone)]
#[command(name = "presswire")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Interval between heartbeat reaper scans, in seconds
    #[arg(long, env = "PRESSWIRE_HEARTBEAT_INTERVAL_SECS", default_value_t = 60)]
    pub heartbeat_interval_secs: u64,

    /// Connections without a ping for this long are evicted, in seconds
    #[arg(long, env = "PRESSWIRE_HEARTBEAT_TIMEOUT_SECS", default_value_t = 90)]
    pub heartbeat_timeout_secs: u64,

    /// How far back the trending selector looks for candidates, in hours
    #[arg(long, env = "PRESSWIRE_TRENDING_WINDOW_HOURS", default_value_t = 6)]
    pub trending_window_hours: i64,

    /// Maximum length of the notification body excerpt, in characters
    #[arg(long, env = "PRESSWIRE_EXCERPT_MAX_CHARS", default_value_t = 140)]
    pub excerpt_max_chars: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

impl Config {
    /// Parse configuration from CLI arguments and environment.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Heartbeat reaper scan interval.
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    /// Heartbeat liveness timeout.
    pub fn heartbeat_timeout(&self) -> Duration {
        Duration::from_secs(self.heartbeat_timeout_secs)
    }

    /// Trending candidate window.
    pub fn trending_window(&self) -> chrono::Duration {
        chrono::Duration::hours(self.trending_window_hours)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            heartbeat_interval_secs: 60,
            heartbeat_timeout_secs: 90,
            trending_window_hours: 6,
            excerpt_max_chars: 140,
            log_level: "info".into(),
        }
    }
}
