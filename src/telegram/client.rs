//! HTTP plumbing for the Bot API
//!
//! Builds the multipart `sendMediaGroup` request and maps responses to
//! [`DeliveryError`].
//!
//! Installers are tens of megabytes, so an attempt has no overall deadline.
//! It is abandoned only when neither the upload nor the response makes
//! progress for the configured timeout.

use crate::release::ArtifactSet;
use crate::telegram::{DeliveryError, Endpoint};
use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client as HttpClient};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::io::ReaderStream;

/// Longest error body kept in a `DeliveryError::Api` message
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Creates an HTTP client that gives up on connecting after `timeout_secs`.
///
/// Stalls after the connection is up are caught per attempt by
/// [`send_media_group`].
#[must_use]
pub fn create_http_client(timeout_secs: u64) -> HttpClient {
    let timeout = Duration::from_secs(timeout_secs);
    HttpClient::builder()
        .connect_timeout(timeout)
        .build()
        .unwrap_or_else(|_| HttpClient::new())
}

/// Time of the last observed progress on an attempt.
struct ProgressClock {
    start: Instant,
    last_ms: AtomicU64,
}

impl ProgressClock {
    fn new() -> Self {
        Self {
            start: Instant::now(),
            last_ms: AtomicU64::new(0),
        }
    }

    fn touch(&self) {
        let elapsed = u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.last_ms.store(elapsed, Ordering::Relaxed);
    }

    fn idle(&self) -> Duration {
        let last = Duration::from_millis(self.last_ms.load(Ordering::Relaxed));
        self.start.elapsed().saturating_sub(last)
    }

    /// Resolves once nothing has happened for `timeout`.
    async fn stalled(&self, timeout: Duration) {
        loop {
            let idle = self.idle();
            if idle >= timeout {
                return;
            }
            tokio::time::sleep(timeout - idle).await;
        }
    }
}

fn network_error(e: reqwest::Error) -> DeliveryError {
    // `{:#}` keeps the cause chain, e.g. "tcp connect error: Connection refused"
    DeliveryError::Network(format!("{:#}", anyhow::Error::from(e)))
}

/// Builds the form: `chat_id`, `media` and one file part per artifact.
///
/// File parts stream from a fresh handle, so the form can be rebuilt for
/// every attempt. Every chunk handed to the connection counts as progress.
fn build_form(
    chat_id: &str,
    media_json: &str,
    artifacts: &ArtifactSet,
    clock: &Arc<ProgressClock>,
) -> Result<Form, DeliveryError> {
    let mut form = Form::new()
        .text("chat_id", chat_id.to_string())
        .text("media", media_json.to_string());

    for artifact in artifacts.iter() {
        let file = artifact.reopen().map_err(|e| {
            DeliveryError::Io(format!("{}: {e}", artifact.path().display()))
        })?;
        let clock = Arc::clone(clock);
        let stream = ReaderStream::new(tokio::fs::File::from_std(file))
            .inspect(move |_| clock.touch());
        let part = Part::stream_with_length(Body::wrap_stream(stream), artifact.len())
            .file_name(artifact.file_name().to_string());
        form = form.part(artifact.key().to_string(), part);
    }

    Ok(form)
}

/// Turns an error body into a short message; proxies often answer with HTML.
fn clean_error_body(body: &str) -> String {
    let trimmed = body.trim_start();
    let is_html = trimmed.starts_with("<!DOCTYPE")
        || trimmed.starts_with("<html")
        || trimmed.starts_with("<HTML");

    if is_html {
        "Server returned HTML error page".to_string()
    } else if body.chars().count() > MAX_ERROR_BODY_CHARS {
        let truncated: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
        format!("{truncated}... (truncated)")
    } else {
        body.to_string()
    }
}

/// Posts the media group to one endpoint and returns the response body.
///
/// A success response that is not JSON is returned as a JSON string so the
/// caller still treats the attempt as delivered.
///
/// # Errors
///
/// Returns `DeliveryError::Network` on transport failures,
/// `DeliveryError::Timeout` when the attempt makes no progress for `timeout`,
/// `DeliveryError::Api` on non-success status codes and `DeliveryError::Io`
/// if an artifact cannot be reopened.
pub async fn send_media_group(
    client: &HttpClient,
    endpoint: &Endpoint,
    chat_id: &str,
    media_json: &str,
    artifacts: &ArtifactSet,
    timeout: Duration,
) -> Result<Value, DeliveryError> {
    let clock = Arc::new(ProgressClock::new());
    let form = build_form(chat_id, media_json, artifacts, &clock)?;

    let request = client.post(&endpoint.url).multipart(form).send();
    let response = tokio::select! {
        result = request => result.map_err(network_error)?,
        () = clock.stalled(timeout) => return Err(DeliveryError::Timeout(timeout)),
    };

    clock.touch();
    let status = response.status();
    let text = tokio::select! {
        result = response.text() => result.map_err(network_error)?,
        () = clock.stalled(timeout) => return Err(DeliveryError::Timeout(timeout)),
    };

    if !status.is_success() {
        return Err(DeliveryError::Api {
            status: status.as_u16(),
            message: clean_error_body(&text),
        });
    }

    Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
}
