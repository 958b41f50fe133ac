//! CLI for the pricefetch client.

use anyhow::Result;
use clap::Parser;
use std::time::Duration;

use crate::client::PriceClient;
use crate::config;
use crate::retry::{RateLimitMode, StopReason};
use crate::source::MockPriceApi;

/// Fetch a stock price with fault-classified retries.
#[derive(Debug, Parser)]
#[command(name = "pricefetch")]
#[command(about = "pricefetch: stock price client with fault-classified retries", long_about = None)]
pub struct Cli {
    /// Ticker symbol to fetch (e.g. AAPL).
    pub ticker: String,

    /// API key; overrides the one in config.toml.
    #[arg(long)]
    pub api_key: Option<String>,

    /// Maximum attempts including the first; overrides config.
    #[arg(long, value_name = "N")]
    pub max_attempts: Option<u32>,

    /// Base backoff delay in seconds; overrides config.
    #[arg(long, value_name = "SECS")]
    pub base_delay: Option<f64>,

    /// Retry rate-limit rejections instead of failing fast.
    #[arg(long)]
    pub retry_rate_limited: bool,
}

impl Cli {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;

        let mut policy = cfg.policy();
        if let Some(n) = cli.max_attempts {
            policy.max_attempts = n.max(1);
        }
        if let Some(secs) = cli.base_delay {
            policy.base_delay =
                Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(policy.base_delay);
        }
        if cli.retry_rate_limited {
            policy.rate_limit = RateLimitMode::Retry;
        }

        let api_key = cli.api_key.or(cfg.api_key);
        let client = PriceClient::new(MockPriceApi::new(api_key), policy);

        match client.get_price(&cli.ticker) {
            Ok(price) => {
                println!("{} {:.2}", cli.ticker.to_ascii_uppercase(), price);
                Ok(())
            }
            Err(failure) => {
                let hint = match failure.reason {
                    StopReason::Permanent => "not retried: the request must change to succeed",
                    StopReason::RateLimited => "not retried: rate limited, try another source or resubmit later",
                    StopReason::Exhausted => "gave up: transient failures up to the attempt limit",
                    StopReason::Cancelled => "cancelled during backoff",
                };
                anyhow::bail!(
                    "{} (attempts: {}) - {}",
                    failure.error,
                    failure.attempts,
                    hint
                )
            }
        }
    }
}
