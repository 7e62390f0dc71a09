//! The release announcement pipeline: collect, build, deliver.

use crate::config::Settings;
use crate::error::NotifierError;
use crate::release::{build_caption, collect_artifacts, read_release_notes, MediaGroupPayload};
use crate::telegram::{create_http_client, deliver, DeliveryOutcome};
use tracing::info;

/// Runs the notifier once.
///
/// Only conditions outside the delivery flow (unreadable artifacts directory
/// or release notes) are returned as errors; a skipped or failed delivery is
/// an `Ok` outcome.
///
/// # Errors
///
/// Returns `NotifierError` if artifacts or release notes cannot be read.
pub async fn run(settings: &Settings) -> Result<DeliveryOutcome, NotifierError> {
    let artifacts = collect_artifacts(&settings.dist_dir, &settings.release_keywords())?;

    let context = settings.release_context();
    info!(
        "Announcing tag '{}' (run '{}', stable: {})",
        context.tag,
        context.run_id,
        context.is_stable()
    );

    let notes = read_release_notes(&settings.release_notes_path)?;
    let caption = build_caption(&context, &settings.repository_url, notes.as_deref());
    let payload = MediaGroupPayload::new(&artifacts, caption);

    let client = create_http_client(settings.http_timeout_secs);
    deliver(&client, settings, &payload, artifacts).await
}
