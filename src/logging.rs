//! Log setup with bot token redaction.
//!
//! Endpoint URLs embed the bot token and reqwest errors echo the URL, so every
//! line written by the subscriber passes through [`redact`] first.

// lazy_regex! validates patterns at compile time and stores them in once_cell statics
#![allow(clippy::non_std_lazy_statics)]

use lazy_regex::lazy_regex;
use std::io::{self, Write};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Token inside a Bot API URL: `https://host/bot<id>:<secret>/method`
static RE_URL_TOKEN: lazy_regex::Lazy<regex::Regex> =
    lazy_regex!(r"(https?://[^/\s]+/bot)([0-9]+:[A-Za-z0-9_-]+)");

/// Bare token as issued by BotFather
static RE_BARE_TOKEN: lazy_regex::Lazy<regex::Regex> =
    lazy_regex!(r"[0-9]{8,10}:[A-Za-z0-9_-]{35}");

/// Masks Telegram bot tokens in `input`.
#[must_use]
pub fn redact(input: &str) -> String {
    let output = RE_URL_TOKEN.replace_all(input, "${1}[TELEGRAM_TOKEN]");
    RE_BARE_TOKEN
        .replace_all(&output, "[TELEGRAM_TOKEN]")
        .into_owned()
}

struct RedactingWriter<W: Write> {
    inner: W,
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s = String::from_utf8_lossy(buf);
        self.inner.write_all(redact(&s).as_bytes())?;
        // The caller only needs to know its whole buffer was consumed.
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

struct RedactingMakeWriter<F> {
    make_inner: F,
}

impl<'a, F, W> tracing_subscriber::fmt::MakeWriter<'a> for RedactingMakeWriter<F>
where
    F: Fn() -> W + 'static,
    W: Write,
{
    type Writer = RedactingWriter<W>;

    fn make_writer(&'a self) -> Self::Writer {
        RedactingWriter {
            inner: (self.make_inner)(),
        }
    }
}

/// Installs the global subscriber: `RUST_LOG` filter (default `info`),
/// redacted output on stderr.
pub fn init_logging() {
    let make_writer = RedactingMakeWriter {
        make_inner: io::stderr,
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(make_writer))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_in_endpoint_url_is_masked() {
        let line = "Telegram push failed via: https://api.telegram.org/bot123456:AbC_d-1/sendMediaGroup (public)";
        assert_eq!(
            redact(line),
            "Telegram push failed via: https://api.telegram.org/bot[TELEGRAM_TOKEN]/sendMediaGroup (public)"
        );
    }

    #[test]
    fn test_local_relay_url_is_masked() {
        let line = "error sending request for url (http://localhost:8081/bot42:secret/sendMediaGroup)";
        assert!(!redact(line).contains("secret"));
    }

    #[test]
    fn test_bare_token_is_masked() {
        let token = format!("1234567890:{}", "A".repeat(35));
        assert_eq!(redact(&format!("token={token}")), "token=[TELEGRAM_TOKEN]");
    }

    #[test]
    fn test_plain_text_is_untouched() {
        let line = "Collected 2 release artifacts from dist";
        assert_eq!(redact(line), line);
    }

    #[test]
    fn test_writer_reports_full_buffer() -> io::Result<()> {
        let mut writer = RedactingWriter { inner: Vec::new() };
        let input = b"via http://localhost:8081/bot1:abc/sendMediaGroup";
        assert_eq!(writer.write(input)?, input.len());
        assert_eq!(
            String::from_utf8_lossy(&writer.inner),
            "via http://localhost:8081/bot[TELEGRAM_TOKEN]/sendMediaGroup"
        );
        Ok(())
    }
}
