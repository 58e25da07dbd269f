use chrono::{DateTime, Utc};

use super::model::{index_link, Feed, FeedItem};

pub const MAX_DESCRIPTION_LINES: usize = 32;
pub const MAX_DESCRIPTION_CHARS: usize = 1024;
pub const TRUNCATION_MARKER: &str = "[...]";

/// Process-wide feed policy, handed to every update explicitly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedSettings {
    pub max_items: usize,
    pub truncate_description: bool,
    /// Value of `rss_active` for indices that do not set it
    pub default_active: bool,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            max_items: 50,
            truncate_description: false,
            default_active: true,
        }
    }
}

/// A single upload, already validated and with its base URL resolved.
#[derive(Debug, Clone)]
pub struct Upload {
    pub index: String,
    pub project: String,
    pub version: String,
    pub base_url: String,
    pub description: String,
}

/// Bound a description to 32 lines, or failing that to 1024 characters.
///
/// Only one limit is applied: a description cut by lines is not checked
/// for length afterwards.
pub fn truncate_description(description: &str) -> String {
    let lines: Vec<&str> = description.split_inclusive('\n').collect();
    if lines.len() > MAX_DESCRIPTION_LINES {
        let mut truncated = lines[..MAX_DESCRIPTION_LINES].concat();
        truncated.push_str(TRUNCATION_MARKER);
        return truncated;
    }

    if description.chars().count() > MAX_DESCRIPTION_CHARS {
        let mut truncated: String = description.chars().take(MAX_DESCRIPTION_CHARS).collect();
        truncated.push_str(TRUNCATION_MARKER);
        return truncated;
    }

    description.to_string()
}

/// Evict from the tail until there is room, then prepend the new item.
pub fn apply_upload(
    feed: &mut Feed,
    upload: &Upload,
    settings: &FeedSettings,
    now: DateTime<Utc>,
) {
    let description = if settings.truncate_description {
        truncate_description(&upload.description)
    } else {
        upload.description.clone()
    };

    if !upload.base_url.is_empty() {
        feed.link = index_link(&upload.base_url, &upload.index);
    }

    let max_items = settings.max_items.max(1);
    while feed.items.len() >= max_items {
        feed.items.pop();
    }

    let item = FeedItem::new(
        &index_link(&upload.base_url, &upload.index),
        &upload.project,
        &upload.version,
        description,
        now,
    );
    feed.items.insert(0, item);
    feed.last_build_date = now;
}
