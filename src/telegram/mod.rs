//! Bot API delivery of the release media group.

pub mod client;
pub mod delivery;

pub use client::{create_http_client, send_media_group};
pub use delivery::{deliver, DeliveryOutcome};

use thiserror::Error;

/// Failure of a single `sendMediaGroup` attempt
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Connection refused, reset or other transport failure
    #[error("Network error: {0}")]
    Network(String),
    /// Neither upload nor response made progress within the timeout
    #[error("Timed out: no progress for {0:?}")]
    Timeout(std::time::Duration),
    /// Non-success status returned by the endpoint
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Cleaned-up response body
        message: String,
    },
    /// An artifact could not be prepared for upload
    #[error("I/O error: {0}")]
    Io(String),
}

/// A Bot API method URL, with a short name for logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub name: &'static str,
    pub url: String,
}

impl Endpoint {
    /// `{base}/bot{token}/sendMediaGroup`
    #[must_use]
    pub fn send_media_group(name: &'static str, base: &str, token: &str) -> Self {
        Self {
            name,
            url: format!("{}/bot{token}/sendMediaGroup", base.trim_end_matches('/')),
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.url, self.name)
    }
}
