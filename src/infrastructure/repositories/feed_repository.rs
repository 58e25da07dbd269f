use fs2::FileExt;
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::OwnedMutexGuard;

use crate::{
    domain::feed::{render_feed, Feed, FeedSnapshot, SNAPSHOT_VERSION},
    error::{AppError, AppResult},
};

/// Filesystem storage for feeds: `<key>.json` snapshot, `<key>.xml`
/// rendered document and `<key>.lock` writer lock, all under one directory.
pub struct FeedRepository {
    root: PathBuf,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl FeedRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem-safe name for an index: `root/dev` becomes `root.dev`.
    pub fn storage_key(index: &str) -> AppResult<String> {
        let key = index.trim().replace(['/', '\\'], ".");
        if key.is_empty() || key.starts_with('.') {
            return Err(AppError::BadRequest(format!("invalid index name: {:?}", index)));
        }
        Ok(key)
    }

    pub fn snapshot_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }

    pub fn document_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.xml", key))
    }

    fn lock_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.lock", key))
    }

    /// Serialise writers of one index within this process.
    ///
    /// Entries are never removed; the map holds one mutex per index ever written.
    pub async fn lock_index(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            locks.entry(key.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Load, update and persist a feed while holding the index's lock file.
    ///
    /// Blocking; call from `spawn_blocking`. `update` receives the stored
    /// feed, or `None` when there is none or it cannot be read.
    pub fn update_exclusive<F>(&self, key: &str, update: F) -> AppResult<Feed>
    where
        F: FnOnce(Option<Feed>) -> Feed,
    {
        fs::create_dir_all(&self.root)?;

        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path(key))?;
        lock_file.lock_exclusive()?;

        let result = self.load(key).map(update).and_then(|feed| {
            self.save(key, &feed)?;
            Ok(feed)
        });

        if let Err(e) = FileExt::unlock(&lock_file) {
            tracing::warn!(key = %key, error = %e, "Failed to release feed lock");
        }

        result
    }

    /// Read the stored snapshot. Corrupt or unknown-version snapshots are
    /// reported and treated as missing.
    pub fn load(&self, key: &str) -> AppResult<Option<Feed>> {
        let path = self.snapshot_path(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Unreadable feed snapshot, starting a new feed"
                );
                return Ok(None);
            }
        };

        match serde_json::from_slice::<FeedSnapshot>(&bytes) {
            Ok(snapshot) if snapshot.version == SNAPSHOT_VERSION => Ok(Some(snapshot.feed)),
            Ok(snapshot) => {
                tracing::warn!(
                    path = %path.display(),
                    version = snapshot.version,
                    "Unsupported feed snapshot version, starting a new feed"
                );
                Ok(None)
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Corrupt feed snapshot, starting a new feed"
                );
                Ok(None)
            }
        }
    }

    /// Write the snapshot and the rendered document from the same feed.
    pub fn save(&self, key: &str, feed: &Feed) -> AppResult<()> {
        fs::create_dir_all(&self.root)?;

        let document = render_feed(feed)?;
        let snapshot = serde_json::to_vec_pretty(&FeedSnapshot::from(feed.clone()))?;

        fs::write(self.snapshot_path(key), snapshot)?;
        fs::write(self.document_path(key), document)?;

        tracing::debug!(key = %key, items = feed.items.len(), "Feed written");
        Ok(())
    }

    /// Rendered document bytes, or `None` if the index has no feed yet.
    pub async fn read_document(&self, key: &str) -> AppResult<Option<Vec<u8>>> {
        match tokio::fs::read(self.document_path(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Storage(e)),
        }
    }
}
