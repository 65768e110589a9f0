use clap::Parser;

use news_portal_comments::config::AppConfig;
use news_portal_comments::delivery::cli::{self, Cli};
use news_portal_comments::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    let tracer_provider = telemetry::init(&config)
        .map_err(|e| anyhow::anyhow!("failed to initialize telemetry: {e}"))?;

    tracing::debug!(
        api_base_url = %config.api_base_url,
        cache_dir = %config.cache_dir.display(),
        telemetry_enabled = config.telemetry_enabled,
        "config loaded"
    );

    let (comments, notifications) = cli::build_usecases(&config)?;

    let mut stdout = std::io::stdout().lock();
    let result = cli::run(cli.command, &comments, &notifications, &mut stdout).await;

    if let Err(e) = &result {
        tracing::error!(error = %e, "command failed");
    }

    telemetry::shutdown(tracer_provider);
    result
}
