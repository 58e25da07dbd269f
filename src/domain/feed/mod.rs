pub mod dto;
pub mod error;
pub mod model;
pub mod render;
pub mod service;
pub mod updater;

pub use dto::{FeedDocument, IndexConfigDefaults, RecordOutcome, UploadEvent, UploadSyncEvent};
pub use error::FeedServiceError;
pub use model::{Feed, FeedItem, FeedSnapshot, SNAPSHOT_VERSION};
pub use render::{render_feed, RSS_CONTENT_TYPE};
pub use service::{FeedService, FeedServiceApi};
pub use updater::{truncate_description, FeedSettings};
