use rss::{Channel, ChannelBuilder, GuidBuilder, Item, ItemBuilder};

use super::model::{Feed, FeedItem};
use crate::error::{AppError, AppResult};

pub const RSS_CONTENT_TYPE: &str = "application/rss+xml; charset=utf-8";

const GENERATOR: &str = concat!("devpi-rss ", env!("CARGO_PKG_VERSION"));

/// Render a feed as an RSS 2.0 document.
pub fn render_feed(feed: &Feed) -> AppResult<Vec<u8>> {
    to_channel(feed)
        .write_to(Vec::new())
        .map_err(|e| AppError::Render(e.to_string()))
}

fn to_channel(feed: &Feed) -> Channel {
    ChannelBuilder::default()
        .title(feed.title.clone())
        .link(feed.link.clone())
        .description(feed.description.clone())
        .last_build_date(Some(feed.last_build_date.to_rfc2822()))
        .generator(Some(GENERATOR.to_string()))
        .items(feed.items.iter().map(to_item).collect::<Vec<Item>>())
        .build()
}

fn to_item(item: &FeedItem) -> Item {
    let guid = GuidBuilder::default()
        .value(item.guid.clone())
        .permalink(true)
        .build();

    ItemBuilder::default()
        .title(Some(item.title.clone()))
        .link(Some(item.link.clone()))
        .description(Some(item.description.clone()))
        .guid(Some(guid))
        .pub_date(Some(item.pub_date.to_rfc2822()))
        .build()
}
