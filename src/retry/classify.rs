//! Classify fetch failures into transient/permanent for retry decisions.

use super::error::FetchError;

/// The two failure classes the driver acts on. Always derived from the
/// error kind, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// May resolve if the same request is retried.
    Transient,
    /// Will not resolve without changing credentials, input, or the server.
    Permanent,
}

/// Fixed kind -> class mapping. This is the policy contract of the whole
/// engine: network, server, and rate-limit failures are transient (rate
/// limits are additionally fail-fast by default, see `RetryPolicy`);
/// everything else, including unknown shapes, is permanent.
pub fn classify(e: &FetchError) -> FailureClass {
    match e {
        FetchError::Network(_) | FetchError::Server(_) | FetchError::RateLimited { .. } => {
            FailureClass::Transient
        }
        FetchError::Auth(_)
        | FetchError::NotFound(_)
        | FetchError::Validation(_)
        | FetchError::DataContract(_)
        | FetchError::Unknown(_) => FailureClass::Permanent,
    }
}

/// Map an HTTP status code into the failure taxonomy. Statuses we do not
/// recognize become `Unknown`, which classifies permanent.
pub fn classify_http_status(code: u16) -> FetchError {
    match code {
        429 => FetchError::RateLimited {
            message: format!("HTTP {}", code),
            retry_after: None,
        },
        500..=599 => FetchError::Server(code),
        401 | 403 => FetchError::Auth(format!("HTTP {}", code)),
        404 => FetchError::NotFound(format!("HTTP {}", code)),
        400 | 422 => FetchError::Validation(format!("HTTP {}", code)),
        _ => FetchError::Unknown(format!("HTTP {}", code)),
    }
}
