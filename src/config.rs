//! Configuration and settings management
//!
//! Loads settings from optional config files and environment variables and
//! defines the defaults used by the notifier.

use crate::release::ReleaseContext;
use crate::telegram::Endpoint;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Channel the release is announced in
pub const DEFAULT_CHAT_ID: &str = "@FlClash";
/// Base URL of the self-hosted Bot API relay
pub const DEFAULT_LOCAL_API_BASE: &str = "http://localhost:8081";
/// Base URL of the public Bot API
pub const DEFAULT_PUBLIC_API_BASE: &str = "https://api.telegram.org";
/// Repository used for release and CI run links
pub const DEFAULT_REPOSITORY_URL: &str = "https://github.com/chen08209/FlClash";
/// Directory holding the build artifacts
pub const DEFAULT_DIST_DIR: &str = "dist";
/// Optional release notes appended to the caption
pub const DEFAULT_RELEASE_NOTES_PATH: &str = "release.md";
/// Per-request timeout for Bot API calls
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Substrings that select which artifacts get published
pub const DEFAULT_RELEASE_KEYWORDS: &[&str] = &[
    "windows-amd64-setup",
    "android-arm64",
    "macos-arm64",
    "macos-amd64",
];

/// Application settings loaded from environment variables
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Telegram Bot API token, delivery is skipped without it
    pub telegram_bot_token: Option<String>,

    /// Release tag, e.g. `v0.8.90` or `v0.8.90-pre`
    #[serde(default)]
    pub tag: String,
    /// CI run identifier used for pre-release links
    #[serde(default)]
    pub run_id: String,

    /// Target chat handle or id
    #[serde(default = "default_chat_id")]
    pub chat_id: String,
    /// Local Bot API relay, tried first
    #[serde(default = "default_local_api_base")]
    pub local_api_base: String,
    /// Public Bot API, tried when the relay fails
    #[serde(default = "default_public_api_base")]
    pub public_api_base: String,
    /// Repository URL without trailing slash
    #[serde(default = "default_repository_url")]
    pub repository_url: String,

    /// Artifacts directory
    #[serde(default = "default_dist_dir")]
    pub dist_dir: PathBuf,
    /// Release notes file
    #[serde(default = "default_release_notes_path")]
    pub release_notes_path: PathBuf,

    /// Comma-separated keyword override
    #[serde(rename = "release_keywords")]
    pub release_keywords_str: Option<String>,

    /// Timeout for a single delivery attempt
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

fn default_chat_id() -> String {
    DEFAULT_CHAT_ID.to_string()
}

fn default_local_api_base() -> String {
    DEFAULT_LOCAL_API_BASE.to_string()
}

fn default_public_api_base() -> String {
    DEFAULT_PUBLIC_API_BASE.to_string()
}

fn default_repository_url() -> String {
    DEFAULT_REPOSITORY_URL.to_string()
}

fn default_dist_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DIST_DIR)
}

fn default_release_notes_path() -> PathBuf {
    PathBuf::from(DEFAULT_RELEASE_NOTES_PATH)
}

const fn default_http_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            telegram_bot_token: None,
            tag: String::new(),
            run_id: String::new(),
            chat_id: default_chat_id(),
            local_api_base: default_local_api_base(),
            public_api_base: default_public_api_base(),
            repository_url: default_repository_url(),
            dist_dir: default_dist_dir(),
            release_notes_path: default_release_notes_path(),
            release_keywords_str: None,
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

impl Settings {
    /// Create new settings by loading from environment and files
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use release_notifier::config::Settings;
    ///
    /// let settings = Settings::new().expect("Failed to load configuration");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails.
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            // Not checked into git
            .add_source(File::with_name("config/local").required(false))
            // `APP__CHAT_ID=@other ./release-notifier` overrides `chat_id`
            .add_source(Environment::with_prefix("APP").separator("__"))
            // CI variables such as TELEGRAM_BOT_TOKEN, TAG and RUN_ID.
            // Empty variables count as unset.
            .add_source(Environment::default().ignore_empty(true))
            .build()?;

        Self::from_config(s)
    }

    /// Deserialize settings from an already assembled `Config`.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a value has the wrong shape.
    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let mut settings: Self = config.try_deserialize()?;

        if settings
            .telegram_bot_token
            .as_ref()
            .is_some_and(|token| token.trim().is_empty())
        {
            settings.telegram_bot_token = None;
        }

        Ok(settings)
    }

    /// Bot token, if one is configured
    #[must_use]
    pub fn telegram_token(&self) -> Option<&str> {
        self.telegram_bot_token.as_deref()
    }

    /// Tag and run id of the build being announced
    #[must_use]
    pub fn release_context(&self) -> ReleaseContext {
        ReleaseContext::new(self.tag.clone(), self.run_id.clone())
    }

    /// Keywords selecting artifacts, lowercased
    #[must_use]
    pub fn release_keywords(&self) -> Vec<String> {
        let parsed: Vec<String> = self
            .release_keywords_str
            .as_ref()
            .map(|s| {
                s.split(|c: char| c == ',' || c == ';' || c.is_whitespace())
                    .filter(|token| !token.is_empty())
                    .map(str::to_lowercase)
                    .collect()
            })
            .unwrap_or_default();

        if parsed.is_empty() {
            DEFAULT_RELEASE_KEYWORDS
                .iter()
                .map(ToString::to_string)
                .collect()
        } else {
            parsed
        }
    }

    /// `sendMediaGroup` endpoints in the order they are tried: local relay first.
    #[must_use]
    pub fn endpoints(&self, token: &str) -> Vec<Endpoint> {
        vec![
            Endpoint::send_media_group("local", &self.local_api_base, token),
            Endpoint::send_media_group("public", &self.public_api_base, token),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with(overrides: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let mut builder = Config::builder();
        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }
        Settings::from_config(builder.build()?)
    }

    #[test]
    fn test_defaults_when_nothing_is_set() -> Result<(), ConfigError> {
        let settings = settings_with(&[])?;

        assert_eq!(settings.telegram_token(), None);
        assert_eq!(settings.tag, "");
        assert_eq!(settings.run_id, "");
        assert_eq!(settings.chat_id, "@FlClash");
        assert_eq!(settings.dist_dir, PathBuf::from("dist"));
        assert_eq!(settings.release_notes_path, PathBuf::from("release.md"));
        assert_eq!(settings.http_timeout_secs, 30);
        Ok(())
    }

    #[test]
    fn test_values_are_picked_up() -> Result<(), ConfigError> {
        let settings = settings_with(&[
            ("telegram_bot_token", "123456:ABC"),
            ("tag", "v0.8.90"),
            ("run_id", "987654"),
            ("http_timeout_secs", "5"),
        ])?;

        assert_eq!(settings.telegram_token(), Some("123456:ABC"));
        let context = settings.release_context();
        assert_eq!(context.tag, "v0.8.90");
        assert_eq!(context.run_id, "987654");
        assert_eq!(settings.http_timeout_secs, 5);
        Ok(())
    }

    #[test]
    fn test_blank_token_counts_as_missing() -> Result<(), ConfigError> {
        let settings = settings_with(&[("telegram_bot_token", "  ")])?;
        assert_eq!(settings.telegram_token(), None);
        Ok(())
    }

    #[test]
    fn test_keyword_parsing() {
        let mut settings = Settings::default();
        assert_eq!(settings.release_keywords(), DEFAULT_RELEASE_KEYWORDS);

        settings.release_keywords_str = Some("Linux-AMD64; windows-arm64,  deb".to_string());
        assert_eq!(
            settings.release_keywords(),
            vec!["linux-amd64", "windows-arm64", "deb"]
        );

        settings.release_keywords_str = Some(" ,; ".to_string());
        assert_eq!(settings.release_keywords(), DEFAULT_RELEASE_KEYWORDS);
    }

    #[test]
    fn test_endpoint_order() {
        let settings = Settings::default();
        let endpoints = settings.endpoints("123456:ABC");

        assert_eq!(endpoints.len(), 2);
        assert_eq!(endpoints[0].name, "local");
        assert_eq!(
            endpoints[0].url,
            "http://localhost:8081/bot123456:ABC/sendMediaGroup"
        );
        assert_eq!(endpoints[1].name, "public");
        assert_eq!(
            endpoints[1].url,
            "https://api.telegram.org/bot123456:ABC/sendMediaGroup"
        );
    }
}
