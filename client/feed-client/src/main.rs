use anyhow::{Context, Result};
use feed_client::{cli, diagnostics, logging, Config, ErrorLog};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    config
        .validate()
        .context("Configuration validation failed")?;

    logging::init_tracing(&config.log_level);

    let error_log = ErrorLog::new(&config.error_log_path);
    diagnostics::install_panic_hook(error_log.clone());

    let command = cli::parse_args(std::env::args().skip(1))?;
    info!(
        api_base_url = %config.api_base_url,
        author = %config.author_name,
        ?command,
        "Starting echo-feed"
    );

    let result = cli::run(command, &config, error_log.clone()).await;
    if let Err(e) = &result {
        error_log.record_non_fatal(format!("{e:#}")).await;
    }
    result
}
