use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod request_id;

pub use request_id::{request_id_middleware, RequestId, X_REQUEST_ID};

use crate::controllers::{feed::FeedController, health, hooks::HookController};
use crate::infrastructure::config::Config;

/// Assemble the public feed routes and the host event hooks
pub fn build_router(
    feed_controller: Arc<FeedController>,
    hook_controller: Arc<HookController>,
) -> Router {
    let hook_routes = Router::new()
        .route("/+rss/hooks/upload", post(HookController::on_upload))
        .route("/+rss/hooks/upload-sync", post(HookController::on_upload_sync))
        .route(
            "/+rss/indexconfig-defaults",
            get(HookController::index_config_defaults),
        )
        .with_state(hook_controller);

    let feed_routes = Router::new()
        .route("/:user/:index/+rss", get(FeedController::get_feed))
        .with_state(feed_controller);

    Router::new()
        .route("/health", get(health::health))
        .merge(hook_routes)
        .merge(feed_routes)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server with all routes configured
pub async fn start_http_server(
    config: Arc<Config>,
    app: Router,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
