mod config;

use config::Config;
use extractor::YtDlpApi;
use telegram::telegram;
use teloxide::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    let extractor = YtDlpApi::new(&config.ytdlp_path, config.download_dir.clone());
    if let Err(e) = extractor.ensure_download_dir().await {
        tracing::error!(
            "Cannot create download directory {}: {}",
            config.download_dir.display(),
            e
        );
        std::process::exit(1);
    }

    let bot = Bot::new(config.token);

    if let Err(e) = telegram::set_bot_commands(&bot).await {
        tracing::warn!("Failed to register bot commands: {}", e);
    }

    tracing::info!(
        "Bot started, downloading into {} with {}",
        config.download_dir.display(),
        config.ytdlp_path
    );

    Dispatcher::builder(bot, telegram::schema())
        .dependencies(dptree::deps![extractor])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}
