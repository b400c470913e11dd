//! Command-line and environment configuration.
//!
//! Every option can be given as a flag or through a `POKEDEX_*` environment
//! variable; flags win.  [`Config::validate`] runs once at startup so the
//! rest of the program can rely on a usable range, period and base URL.

use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;
use url::Url;

use crate::refresh::{OverlapPolicy, AUTO_REFRESH_INTERVAL};
use crate::source::DEFAULT_BASE_URL;

const LOG_FILE_NAME: &str = "pokedex-tui.log";

#[derive(Debug, Clone, Parser)]
#[command(
    name = "pokedex-tui",
    version,
    about = "Shows a random Pokémon every few seconds in a live-updating terminal grid"
)]
pub struct Config {
    /// API root; the item path `pokemon/{id}` is appended to it.
    #[arg(long, env = "POKEDEX_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Smallest id that may be requested.
    #[arg(long, env = "POKEDEX_MIN_ID", default_value_t = 1)]
    pub min_id: u32,

    /// Largest id that may be requested (inclusive).
    #[arg(long, env = "POKEDEX_MAX_ID", default_value_t = 800)]
    pub max_id: u32,

    /// Seconds between automatic fetches.
    #[arg(long, env = "POKEDEX_REFRESH_SECS", default_value_t = AUTO_REFRESH_INTERVAL.as_secs())]
    pub refresh_secs: u64,

    /// Whether an automatic fetch may start while another fetch is loading.
    #[arg(long, env = "POKEDEX_OVERLAP", value_enum, default_value_t = OverlapPolicy::default())]
    pub overlap: OverlapPolicy,

    /// Show failed fetches in the status bar instead of only logging them.
    #[arg(long, env = "POKEDEX_SHOW_ERRORS")]
    pub show_errors: bool,

    /// Log file path (defaults to pokedex-tui.log in the temp directory).
    #[arg(long, env = "POKEDEX_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("ids start at 1, got --min-id 0")]
    ZeroId,
    #[error("empty id range {min}..={max}")]
    EmptyRange { min: u32, max: u32 },
    #[error("--refresh-secs must be greater than zero")]
    ZeroRefresh,
    #[error("invalid base URL {url:?}: {source}")]
    BaseUrl { url: String, source: url::ParseError },
    #[error("base URL {0:?} must end with '/'")]
    MissingTrailingSlash(String),
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_id == 0 {
            return Err(ConfigError::ZeroId);
        }
        if self.min_id > self.max_id {
            return Err(ConfigError::EmptyRange {
                min: self.min_id,
                max: self.max_id,
            });
        }
        if self.refresh_secs == 0 {
            return Err(ConfigError::ZeroRefresh);
        }
        Url::parse(&self.base_url).map_err(|source| ConfigError::BaseUrl {
            url: self.base_url.clone(),
            source,
        })?;
        if !self.base_url.ends_with('/') {
            return Err(ConfigError::MissingTrailingSlash(self.base_url.clone()));
        }
        Ok(())
    }

    pub fn id_range(&self) -> RangeInclusive<u32> {
        self.min_id..=self.max_id
    }

    pub fn refresh_period(&self) -> Duration {
        Duration::from_secs(self.refresh_secs)
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(LOG_FILE_NAME))
    }
}
