//! Price source boundary: the fetch collaborator trait, the raw payload it
//! yields, and a mock API with realistic failure injection.

use rand::Rng;

use crate::retry::FetchError;

/// Raw payload of one successful transport response. The price stays
/// optional here so payload-level corruption (missing field) is
/// representable and can be reclassified instead of trusted.
#[derive(Debug, Clone, PartialEq)]
pub struct RawQuote {
    pub ticker: String,
    pub price: Option<f64>,
}

impl RawQuote {
    /// Validate the data contract: a quote must carry a finite,
    /// non-negative price. A violation is a permanent failure, never a
    /// success, so quiet corruption cannot propagate.
    pub fn validate(&self) -> Result<f64, FetchError> {
        match self.price {
            None => Err(FetchError::DataContract(format!(
                "missing price for {}",
                self.ticker
            ))),
            Some(p) if !p.is_finite() => Err(FetchError::DataContract(format!(
                "non-numeric price for {}: {}",
                self.ticker, p
            ))),
            Some(p) if p < 0.0 => Err(FetchError::DataContract(format!(
                "negative price for {}: {}",
                self.ticker, p
            ))),
            Some(p) => Ok(p),
        }
    }
}

/// The single function-shaped collaborator the engine drives. Anything can
/// sit behind it (HTTP, mock, scripted test double); the only requirement
/// is that failures arrive classifiable as `FetchError`.
pub trait PriceSource {
    fn fetch_quote(&self, ticker: &str) -> Result<RawQuote, FetchError>;
}

/// Mock price API simulating a real quote endpoint: input validation,
/// authentication, a fixed ticker table, and randomized transient failures.
///
/// All randomness lives here at the collaborator boundary. The retry engine
/// itself is deterministic given a fixed sequence of outcomes.
#[derive(Debug, Clone)]
pub struct MockPriceApi {
    api_key: Option<String>,
    /// Probability of a simulated network failure per call.
    network_failure_rate: f64,
    /// Probability of a simulated rate-limit rejection per call.
    rate_limit_rate: f64,
}

/// The only key the mock accepts.
pub const VALID_API_KEY: &str = "valid_api_key";

const MOCK_PRICES: &[(&str, f64)] = &[
    ("AAPL", 175.50),
    ("GOOGL", 140.25),
    ("MSFT", 380.00),
    ("AMZN", 155.75),
    ("TSLA", 245.30),
    ("META", 350.60),
];

impl MockPriceApi {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            network_failure_rate: 0.05,
            rate_limit_rate: 0.05,
        }
    }

    /// Disable random failure injection (useful for demos and tests that
    /// only exercise the deterministic paths).
    pub fn without_failures(mut self) -> Self {
        self.network_failure_rate = 0.0;
        self.rate_limit_rate = 0.0;
        self
    }

    pub fn with_failure_rates(mut self, network: f64, rate_limit: f64) -> Self {
        self.network_failure_rate = network;
        self.rate_limit_rate = rate_limit;
        self
    }
}

impl PriceSource for MockPriceApi {
    fn fetch_quote(&self, ticker: &str) -> Result<RawQuote, FetchError> {
        if ticker.is_empty() {
            return Err(FetchError::Validation(
                "ticker must be a non-empty string".into(),
            ));
        }
        if !ticker.chars().all(|c| c.is_ascii_alphabetic()) || ticker.len() > 5 {
            return Err(FetchError::Validation(format!(
                "invalid ticker format: {}",
                ticker
            )));
        }

        match self.api_key.as_deref() {
            None => return Err(FetchError::Auth("API key is required".into())),
            Some(key) if key != VALID_API_KEY => {
                return Err(FetchError::Auth("invalid API key".into()))
            }
            Some(_) => {}
        }

        let upper = ticker.to_ascii_uppercase();
        let Some(&(_, price)) = MOCK_PRICES.iter().find(|(t, _)| *t == upper) else {
            return Err(FetchError::NotFound(format!("ticker '{}' not found", ticker)));
        };

        let roll: f64 = rand::thread_rng().gen();
        if roll < self.network_failure_rate {
            return Err(FetchError::Network("connection timeout".into()));
        }
        if roll < self.network_failure_rate + self.rate_limit_rate {
            return Err(FetchError::RateLimited {
                message: "rate limit exceeded, please try again later".into(),
                retry_after: None,
            });
        }

        Ok(RawQuote {
            ticker: upper,
            price: Some(price),
        })
    }
}
