use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use devpi_rss::controllers::{feed::FeedController, hooks::HookController};
use devpi_rss::domain::feed::FeedService;
use devpi_rss::infrastructure::config::{Config, LogFormat};
use devpi_rss::infrastructure::http::{build_router, start_http_server};
use devpi_rss::infrastructure::repositories::FeedRepository;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    init_logging(&config);

    tracing::info!("Starting devpi-rss on {}:{}", config.host, config.port);
    tracing::info!(
        rss_dir = %config.rss_dir.display(),
        max_items = config.max_items,
        truncate_description = config.truncate_description,
        no_auto = config.no_auto,
        base_url = ?config.base_url,
        "Feed settings loaded"
    );

    let config = Arc::new(config);

    let feed_repo = Arc::new(FeedRepository::new(config.rss_dir.clone()));
    let feed_service = Arc::new(FeedService::new(
        feed_repo,
        config.feed_settings(),
        config.base_url.clone(),
    ));

    let feed_controller = Arc::new(FeedController::new(feed_service.clone()));
    let hook_controller = Arc::new(HookController::new(feed_service));

    let app = build_router(feed_controller, hook_controller);
    start_http_server(config, app).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "devpi_rss=debug,tower_http=debug".into());

    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
