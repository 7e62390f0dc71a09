/// Identity of the build being announced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseContext {
    /// Version tag, may be empty
    pub tag: String,
    /// CI run identifier, may be empty
    pub run_id: String,
}

impl ReleaseContext {
    #[must_use]
    pub fn new(tag: impl Into<String>, run_id: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            run_id: run_id.into(),
        }
    }

    /// Stable releases have no pre-release suffix, so no hyphen in the tag.
    ///
    /// An empty tag counts as stable.
    #[must_use]
    pub fn is_stable(&self) -> bool {
        !self.tag.contains('-')
    }

    /// Release page for stable builds, CI run page otherwise.
    #[must_use]
    pub fn link(&self, repository_url: &str) -> String {
        let base = repository_url.trim_end_matches('/');
        if self.is_stable() {
            format!("{base}/releases/tag/{}", self.tag)
        } else {
            format!("{base}/actions/runs/{}", self.run_id)
        }
    }
}
