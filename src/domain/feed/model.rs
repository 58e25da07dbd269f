use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const FEED_DESCRIPTION: &str = "The latest package uploads";

/// Version of the on-disk snapshot layout. Bump when `Feed` changes shape.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feed {
    pub title: String,
    pub link: String,
    pub description: String,
    pub last_build_date: DateTime<Utc>,
    /// Newest first
    pub items: Vec<FeedItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub description: String,
    pub guid: String,
    pub pub_date: DateTime<Utc>,
}

/// Stored form of a feed, independent of the rendering library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSnapshot {
    pub version: u32,
    pub feed: Feed,
}

impl Feed {
    pub fn new(index: &str, base_url: &str, now: DateTime<Utc>) -> Self {
        Self {
            title: format!("Devpi index '{}'", index),
            link: index_link(base_url, index),
            description: FEED_DESCRIPTION.to_string(),
            last_build_date: now,
            items: Vec::new(),
        }
    }
}

impl FeedItem {
    pub fn new(
        index_link: &str,
        project: &str,
        version: &str,
        description: String,
        now: DateTime<Utc>,
    ) -> Self {
        let link = format!("{}/{}/{}", index_link, project, version);
        Self {
            title: format!("{} {}", project, version),
            guid: link.clone(),
            link,
            description,
            pub_date: now,
        }
    }
}

impl From<Feed> for FeedSnapshot {
    fn from(feed: Feed) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            feed,
        }
    }
}

/// `<base_url>/<index>`; with no base URL the link stays root-relative.
pub fn index_link(base_url: &str, index: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), index)
}
