//! Caption and `sendMediaGroup` media descriptors.

use crate::error::NotifierError;
use crate::release::{ArtifactSet, ReleaseContext};
use serde::Serialize;
use std::path::Path;

/// Every artifact is sent as a generic document
pub const MEDIA_TYPE_DOCUMENT: &str = "document";
/// Caption formatting understood by the Bot API
pub const PARSE_MODE_MARKDOWN: &str = "Markdown";

/// One entry of the `media` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaDescriptor {
    #[serde(rename = "type")]
    pub media_type: String,
    /// `attach://<key>` reference to a multipart file part
    pub media: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<String>,
}

impl MediaDescriptor {
    #[must_use]
    pub fn document(media: impl Into<String>) -> Self {
        Self {
            media_type: MEDIA_TYPE_DOCUMENT.to_string(),
            media: media.into(),
            caption: None,
            parse_mode: None,
        }
    }
}

/// Ordered media descriptors for a single `sendMediaGroup` call.
///
/// A media group shows one caption, taken from its last item, so the caption
/// is only ever attached there.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaGroupPayload {
    media: Vec<MediaDescriptor>,
}

impl MediaGroupPayload {
    /// Builds one document descriptor per artifact and captions the last one.
    ///
    /// With no artifacts the caption is dropped and the payload stays empty.
    #[must_use]
    pub fn new(artifacts: &ArtifactSet, caption: String) -> Self {
        let mut media: Vec<MediaDescriptor> = artifacts
            .iter()
            .map(|artifact| MediaDescriptor::document(artifact.attach_uri()))
            .collect();

        if let Some(last) = media.last_mut() {
            last.caption = Some(caption);
            last.parse_mode = Some(PARSE_MODE_MARKDOWN.to_string());
        }

        Self { media }
    }

    #[must_use]
    pub fn media(&self) -> &[MediaDescriptor] {
        &self.media
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.media.is_empty()
    }

    /// JSON array for the `media` form field.
    ///
    /// # Errors
    ///
    /// Returns `NotifierError::Serialize` if encoding fails.
    pub fn to_json(&self) -> Result<String, NotifierError> {
        Ok(serde_json::to_string(&self.media)?)
    }
}

/// Composes the caption: bold tag, release or CI run link, release notes.
#[must_use]
pub fn build_caption(
    context: &ReleaseContext,
    repository_url: &str,
    release_notes: Option<&str>,
) -> String {
    let mut text = String::new();

    if !context.tag.is_empty() {
        text.push_str(&format!("\n**{}**\n", context.tag));
    }

    text.push_str(&format!("\n{}\n", context.link(repository_url)));

    if let Some(notes) = release_notes {
        text.push('\n');
        text.push_str(notes);
        text.push('\n');
    }

    text
}

/// Reads the release notes file verbatim, `None` if it does not exist.
///
/// # Errors
///
/// Returns `NotifierError::Io` if the file exists but cannot be read.
pub fn read_release_notes(path: &Path) -> Result<Option<String>, NotifierError> {
    match std::fs::read_to_string(path) {
        Ok(notes) => Ok(Some(notes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(NotifierError::io(path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::collect_artifacts;
    use serde_json::{json, Value};
    use std::fs;

    const REPO: &str = "https://github.com/chen08209/FlClash";

    fn artifacts_for(names: &[&str]) -> anyhow::Result<(tempfile::TempDir, ArtifactSet)> {
        let dir = tempfile::tempdir()?;
        for name in names {
            fs::write(dir.path().join(name), name.as_bytes())?;
        }
        let keywords = vec!["android-arm64".to_string(), "windows-amd64-setup".to_string()];
        let artifacts = collect_artifacts(dir.path(), &keywords)?;
        Ok((dir, artifacts))
    }

    #[test]
    fn test_stable_caption() {
        let context = ReleaseContext::new("v0.8.90", "42");
        let caption = build_caption(&context, REPO, None);
        assert_eq!(
            caption,
            "\n**v0.8.90**\n\nhttps://github.com/chen08209/FlClash/releases/tag/v0.8.90\n"
        );
    }

    #[test]
    fn test_prerelease_caption_with_notes() {
        let context = ReleaseContext::new("v0.8.90-pre", "42");
        let caption = build_caption(&context, REPO, Some("## Changes\n- fix"));
        assert_eq!(
            caption,
            "\n**v0.8.90-pre**\n\nhttps://github.com/chen08209/FlClash/actions/runs/42\n\n## Changes\n- fix\n"
        );
    }

    #[test]
    fn test_caption_without_tag_skips_bold_line() {
        let caption = build_caption(&ReleaseContext::default(), REPO, None);
        assert_eq!(caption, "\nhttps://github.com/chen08209/FlClash/releases/tag/\n");
    }

    #[test]
    fn test_release_notes_absent() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        assert_eq!(read_release_notes(&dir.path().join("release.md"))?, None);

        fs::write(dir.path().join("release.md"), "notes")?;
        assert_eq!(
            read_release_notes(&dir.path().join("release.md"))?,
            Some("notes".to_string())
        );
        Ok(())
    }

    #[test]
    fn test_caption_only_on_last_descriptor() -> anyhow::Result<()> {
        let (_dir, artifacts) = artifacts_for(&[
            "FlClash-windows-amd64-setup.exe",
            "FlClash-android-arm64.apk",
            "readme.txt",
        ])?;

        let payload = MediaGroupPayload::new(&artifacts, "caption".to_string());
        let media = payload.media();

        assert_eq!(media.len(), 2);
        assert_eq!(media[0].caption, None);
        assert_eq!(media[0].parse_mode, None);
        assert_eq!(media[1].caption.as_deref(), Some("caption"));
        assert_eq!(media[1].parse_mode.as_deref(), Some("Markdown"));

        let keys: Vec<&str> = media.iter().map(|m| m.media.as_str()).collect();
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec!["attach://file1", "attach://file2"]);
        assert_eq!(keys.last(), Some(&"attach://file2"));
        Ok(())
    }

    #[test]
    fn test_json_shape() -> anyhow::Result<()> {
        let (_dir, artifacts) = artifacts_for(&["FlClash-android-arm64.apk"])?;
        let payload = MediaGroupPayload::new(&artifacts, "hi".to_string());

        let encoded: Value = serde_json::from_str(&payload.to_json()?)?;
        assert_eq!(
            encoded,
            json!([{
                "type": "document",
                "media": "attach://file1",
                "caption": "hi",
                "parse_mode": "Markdown"
            }])
        );
        Ok(())
    }

    #[test]
    fn test_no_artifacts_drops_caption() -> anyhow::Result<()> {
        let (_dir, artifacts) = artifacts_for(&["readme.txt"])?;
        let payload = MediaGroupPayload::new(&artifacts, "dropped".to_string());

        assert!(payload.is_empty());
        assert_eq!(payload.to_json()?, "[]");
        Ok(())
    }
}
