//! Posts the build artifacts of a CI release to a Telegram channel as a media
//! group, captioned with the tag and a release or CI run link.

pub mod config;
pub mod error;
pub mod logging;
pub mod notifier;
pub mod release;
pub mod telegram;

pub use error::NotifierError;
