use anyhow::Context;
use dotenvy::dotenv;
use release_notifier::config::Settings;
use release_notifier::logging::init_logging;
use release_notifier::notifier;
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenv().ok();

    init_logging();

    let settings = Settings::new().context("Failed to load configuration")?;
    info!("Configuration loaded successfully.");

    match notifier::run(&settings).await {
        Ok(outcome) => {
            if !outcome.is_success() {
                // Release flow must not be blocked by Telegram
                info!("Telegram push did not go through, continuing release.");
            }
            Ok(())
        }
        Err(e) => {
            error!("Release notification aborted: {}", e);
            Err(e.into())
        }
    }
}
