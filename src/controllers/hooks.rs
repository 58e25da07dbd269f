use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::{
    domain::feed::{
        FeedService, FeedServiceApi, FeedServiceError, IndexConfigDefaults, RecordOutcome,
        UploadEvent, UploadSyncEvent,
    },
    error::AppResult,
};

/// Event hooks called by the index server's upload pipeline.
pub struct HookController {
    feed_service: Arc<FeedService>,
}

impl HookController {
    pub fn new(feed_service: Arc<FeedService>) -> Self {
        Self { feed_service }
    }

    /// POST /+rss/hooks/upload - Record a stored upload
    ///
    /// Feed maintenance must never fail an upload, so storage failures are
    /// logged and still answered with 204. Only malformed events are rejected.
    pub async fn on_upload(
        State(controller): State<Arc<HookController>>,
        payload: Result<Json<UploadEvent>, JsonRejection>,
    ) -> AppResult<StatusCode> {
        let Json(event) = payload?;
        let index = event.index.clone();
        match controller.feed_service.record_upload(event).await {
            Ok(RecordOutcome::Recorded { .. }) | Ok(RecordOutcome::Inactive) => {}
            Err(FeedServiceError::Invalid(msg)) => {
                return Err(FeedServiceError::Invalid(msg).into());
            }
            Err(e) => {
                tracing::error!(index = %index, error = %e, "Failed to update feed");
            }
        }
        Ok(StatusCode::NO_CONTENT)
    }

    /// POST /+rss/hooks/upload-sync - Learn the server's public URL
    pub async fn on_upload_sync(
        State(controller): State<Arc<HookController>>,
        payload: Result<Json<UploadSyncEvent>, JsonRejection>,
    ) -> AppResult<StatusCode> {
        let Json(event) = payload?;
        tracing::debug!(
            index = ?event.index,
            project = ?event.project,
            version = ?event.version,
            "Upload sync event received"
        );
        controller
            .feed_service
            .sync_base_url(event.application_url)
            .await;
        Ok(StatusCode::NO_CONTENT)
    }

    /// GET /+rss/indexconfig-defaults - Defaults for new index configurations
    pub async fn index_config_defaults(
        State(controller): State<Arc<HookController>>,
    ) -> Json<IndexConfigDefaults> {
        Json(controller.feed_service.index_config_defaults())
    }
}
