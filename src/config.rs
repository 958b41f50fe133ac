use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::retry::{RateLimitMode, RetryPolicy};

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.5 = 500ms).
    pub base_delay_secs: f64,
    /// Multiplier applied per additional attempt.
    pub growth_factor: f64,
    /// Optional cap on total backoff in seconds across one fetch.
    #[serde(default)]
    pub max_total_wait_secs: Option<f64>,
    /// Retry rate-limit rejections instead of failing fast (default false).
    #[serde(default)]
    pub retry_rate_limited: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 0.5,
            growth_factor: 2.0,
            max_total_wait_secs: None,
            retry_rate_limited: false,
        }
    }
}

impl RetryConfig {
    /// Sanitize config values into a policy: at least one attempt, no
    /// negative delays, growth never below 1.
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay: Duration::try_from_secs_f64(self.base_delay_secs.max(0.0))
                .unwrap_or(Duration::ZERO),
            growth_factor: self.growth_factor.max(1.0),
            max_total_wait: self
                .max_total_wait_secs
                .and_then(|s| Duration::try_from_secs_f64(s.max(0.0)).ok()),
            rate_limit: if self.retry_rate_limited {
                RateLimitMode::Retry
            } else {
                RateLimitMode::FailFast
            },
        }
    }
}

/// Global configuration loaded from `~/.config/pricefetch/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchConfig {
    /// API key for the price source.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl FetchConfig {
    pub fn policy(&self) -> RetryPolicy {
        self.retry
            .as_ref()
            .map(RetryConfig::to_policy)
            .unwrap_or_default()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pricefetch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<FetchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = FetchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: FetchConfig = toml::from_str(&data)?;
    Ok(cfg)
}
