//! Errors that abort a notifier run.
//!
//! Delivery failures are not listed here: they are recovered by endpoint
//! fallback and reported through [`crate::telegram::DeliveryOutcome`].

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifierError {
    /// Settings could not be loaded or deserialized
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    /// Artifacts directory or release notes could not be read
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path being read
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Media descriptors could not be encoded
    #[error("JSON error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl NotifierError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
