//! Endpoint fallback for the release announcement.
//!
//! The local Bot API relay is tried first, then the public API. A failed
//! announcement is logged and reported, never escalated: the release pipeline
//! must not break because Telegram is unreachable.

use crate::config::Settings;
use crate::error::NotifierError;
use crate::release::{ArtifactSet, MediaGroupPayload};
use crate::telegram::client::send_media_group;
use reqwest::Client as HttpClient;
use serde_json::Value;
use std::time::Duration;
use tracing::{error, info, warn};

/// Terminal state of a delivery run. Every variant maps to exit status 0.
#[derive(Debug)]
pub enum DeliveryOutcome {
    /// No bot token configured, nothing was sent
    Skipped,
    /// An endpoint accepted the media group
    Succeeded {
        /// URL of the endpoint that accepted the request
        endpoint: String,
        /// Parsed response body
        response: Value,
    },
    /// Every endpoint failed, one `"<url> -> <error>"` entry per attempt
    AllFailed { errors: Vec<String> },
}

impl DeliveryOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

/// Sends the payload to the first endpoint that accepts it.
///
/// Consumes `artifacts`; all file handles are closed before returning,
/// whatever the outcome.
///
/// # Errors
///
/// Returns `NotifierError::Serialize` if the media descriptors cannot be
/// encoded. Endpoint failures are reported through `DeliveryOutcome`.
pub async fn deliver(
    client: &HttpClient,
    settings: &Settings,
    payload: &MediaGroupPayload,
    artifacts: ArtifactSet,
) -> Result<DeliveryOutcome, NotifierError> {
    let Some(token) = settings.telegram_token() else {
        warn!("TELEGRAM_BOT_TOKEN is missing, skip telegram push.");
        artifacts.close();
        return Ok(DeliveryOutcome::Skipped);
    };

    let media_json = payload.to_json()?;
    let timeout = Duration::from_secs(settings.http_timeout_secs);
    let mut errors = Vec::new();
    let mut delivered = None;

    for endpoint in settings.endpoints(token) {
        let attempt = send_media_group(
            client,
            &endpoint,
            &settings.chat_id,
            &media_json,
            &artifacts,
            timeout,
        );
        match attempt.await {
            Ok(response) => {
                info!("Telegram push succeeded via: {}", endpoint);
                info!("Response JSON: {}", response);
                delivered = Some((endpoint.url, response));
                break;
            }
            Err(e) => {
                warn!("Telegram push failed via: {}, error: {}", endpoint, e);
                errors.push(format!("{} -> {e}", endpoint.url));
            }
        }
    }

    artifacts.close();

    if let Some((endpoint, response)) = delivered {
        return Ok(DeliveryOutcome::Succeeded { endpoint, response });
    }

    error!("Telegram push failed on all endpoints:");
    for err in &errors {
        error!("{}", err);
    }
    Ok(DeliveryOutcome::AllFailed { errors })
}
