use anyhow::Result;
use clap::Parser;
use job_matcher::app_log;
use job_matcher::cli::{handle_command, Cli};
use job_matcher::core::ConfigManager;
use job_matcher::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ConfigManager::load(cli.config.as_deref())?;
    logging::init(config.log_file.as_deref())?;

    match &config.source {
        Some(path) => app_log!(debug, "Loaded configuration from {}", path.display()),
        None => app_log!(debug, "No configuration file, using environment and defaults"),
    }
    app_log!(debug, "API URL: {}", config.service.api_url);
    app_log!(debug, "Store: {}", config.storage.database_path.display());

    handle_command(cli, config).await
}
