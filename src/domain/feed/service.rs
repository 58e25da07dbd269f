use super::dto::{FeedDocument, IndexConfigDefaults, RecordOutcome, UploadEvent};
use super::error::FeedServiceError;
use super::model::Feed;
use super::updater::{apply_upload, FeedSettings, Upload};
use crate::infrastructure::repositories::FeedRepository;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, RwLock};

pub struct FeedService {
    feed_repo: Arc<FeedRepository>,
    settings: FeedSettings,
    configured_base_url: Option<String>,
    synced_base_url: RwLock<Option<String>>,
}

impl FeedService {
    pub fn new(
        feed_repo: Arc<FeedRepository>,
        settings: FeedSettings,
        configured_base_url: Option<String>,
    ) -> Self {
        Self {
            feed_repo,
            settings,
            configured_base_url,
            synced_base_url: RwLock::new(None),
        }
    }
}

#[async_trait]
pub trait FeedServiceApi: Send + Sync {
    /// Record one upload in its index's feed
    ///
    /// This operation:
    /// - Skips indices whose `rss_active` flag is off
    /// - Prepends the release, evicting the oldest items beyond capacity
    /// - Rewrites the snapshot and the RSS document under the index lock
    async fn record_upload(&self, event: UploadEvent) -> Result<RecordOutcome, FeedServiceError>;

    /// Remember the server's public URL for links of later uploads
    async fn sync_base_url(&self, application_url: String);

    /// The rendered feed of an index, or a placeholder if nothing was recorded
    async fn get_feed_document(&self, index: &str) -> FeedDocument;

    fn index_config_defaults(&self) -> IndexConfigDefaults;
}

#[async_trait]
impl FeedServiceApi for FeedService {
    async fn record_upload(&self, event: UploadEvent) -> Result<RecordOutcome, FeedServiceError> {
        tracing::debug!(
            index = %event.index,
            project = %event.project,
            version = %event.version,
            link = ?event.link,
            "Upload event received"
        );

        self.validate(&event)?;
        let key = FeedRepository::storage_key(&event.index)?;

        if !event.rss_active.unwrap_or(self.settings.default_active) {
            tracing::debug!(index = %event.index, "RSS not active for this index");
            return Ok(RecordOutcome::Inactive);
        }

        if !event.file_exists {
            tracing::warn!(
                index = %event.index,
                project = %event.project,
                version = %event.version,
                "Ignoring lost upload, recording release metadata only"
            );
        }

        let base_url = self.resolve_base_url(event.application_url.as_deref());
        if base_url.is_empty() {
            tracing::warn!(
                index = %event.index,
                "No base URL known yet, feed links will be relative"
            );
        }

        let upload = Upload {
            index: event.index,
            project: event.project,
            version: event.version,
            base_url,
            description: event.description.unwrap_or_default(),
        };

        let _guard = self.feed_repo.lock_index(&key).await;

        let repo = self.feed_repo.clone();
        let settings = self.settings;
        let feed = tokio::task::spawn_blocking(move || {
            repo.update_exclusive(&key, |current| {
                let now = Utc::now();
                let mut feed =
                    current.unwrap_or_else(|| Feed::new(&upload.index, &upload.base_url, now));
                apply_upload(&mut feed, &upload, &settings, now);
                feed
            })
        })
        .await
        .map_err(|e| FeedServiceError::Other(e.into()))??;

        tracing::info!(
            title = %feed.items[0].title,
            items = feed.items.len(),
            "Upload recorded in feed"
        );

        Ok(RecordOutcome::Recorded {
            items: feed.items.len(),
        })
    }

    async fn sync_base_url(&self, application_url: String) {
        let url = application_url.trim_end_matches('/').to_string();
        tracing::debug!(application_url = %url, "Base URL synced");

        let mut synced = self
            .synced_base_url
            .write()
            .unwrap_or_else(|e| e.into_inner());
        *synced = Some(url).filter(|u| !u.is_empty());
    }

    async fn get_feed_document(&self, index: &str) -> FeedDocument {
        let key = match FeedRepository::storage_key(index) {
            Ok(key) => key,
            Err(e) => {
                tracing::debug!(index = %index, error = %e, "Feed requested for invalid index");
                return FeedDocument::Placeholder;
            }
        };

        match self.feed_repo.read_document(&key).await {
            Ok(Some(bytes)) => FeedDocument::Rendered(bytes),
            Ok(None) => FeedDocument::Placeholder,
            Err(e) => {
                tracing::warn!(index = %index, error = %e, "Failed to read feed document");
                FeedDocument::Placeholder
            }
        }
    }

    fn index_config_defaults(&self) -> IndexConfigDefaults {
        IndexConfigDefaults {
            rss_active: self.settings.default_active,
        }
    }
}

impl FeedService {
    fn validate(&self, event: &UploadEvent) -> Result<(), FeedServiceError> {
        for (field, value) in [
            ("index", &event.index),
            ("project", &event.project),
            ("version", &event.version),
        ] {
            if value.trim().is_empty() {
                return Err(FeedServiceError::Invalid(format!("{} must not be empty", field)));
            }
        }
        Ok(())
    }

    /// Event URL first, then the configured URL, then the last synced one.
    fn resolve_base_url(&self, event_url: Option<&str>) -> String {
        if let Some(url) = event_url.filter(|u| !u.trim().is_empty()) {
            return url.trim_end_matches('/').to_string();
        }
        if let Some(url) = &self.configured_base_url {
            return url.clone();
        }
        self.synced_base_url
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .unwrap_or_default()
    }
}
