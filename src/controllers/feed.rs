use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::domain::feed::{FeedDocument, FeedService, FeedServiceApi, RSS_CONTENT_TYPE};

pub const NO_UPLOADS_MESSAGE: &str =
    "The RSS feed of this index has not recorded any uploads yet.";

pub struct FeedController {
    feed_service: Arc<FeedService>,
}

impl FeedController {
    pub fn new(feed_service: Arc<FeedService>) -> Self {
        Self { feed_service }
    }

    /// GET /{user}/{index}/+rss - Serve the index feed
    pub async fn get_feed(
        State(controller): State<Arc<FeedController>>,
        Path((user, index)): Path<(String, String)>,
    ) -> Response {
        let index = format!("{}/{}", user, index);
        match controller.feed_service.get_feed_document(&index).await {
            FeedDocument::Rendered(bytes) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, RSS_CONTENT_TYPE)],
                bytes,
            )
                .into_response(),
            FeedDocument::Placeholder => (StatusCode::OK, NO_UPLOADS_MESSAGE).into_response(),
        }
    }
}
