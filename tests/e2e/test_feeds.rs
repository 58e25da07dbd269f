use crate::e2e::helpers;

use helpers::assertions::{assert_rss_item_links, rss_item_titles};
use helpers::TestContext;
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_context::test_context;

const PLACEHOLDER: &str = "The RSS feed of this index has not recorded any uploads yet.";

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_serve_placeholder_for_index_without_uploads(ctx: &TestContext) {
    let response = ctx.client.get("/root/dev/+rss").await.unwrap();

    response
        .assert_status(StatusCode::OK)
        .assert_header_starts_with("content-type", "text/plain");
    assert_eq!(response.text(), PLACEHOLDER);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_serve_feed_after_upload(ctx: &TestContext) {
    ctx.client
        .post(
            "/+rss/hooks/upload-sync",
            &json!({ "application_url": "https://pypi.example.com/" }),
        )
        .await
        .unwrap()
        .assert_status(StatusCode::NO_CONTENT);

    ctx.client
        .post(
            "/+rss/hooks/upload",
            &ctx.fixtures.upload_event("root/dev", "demo", "1.0"),
        )
        .await
        .unwrap()
        .assert_status(StatusCode::NO_CONTENT);

    let response = ctx.client.get("/root/dev/+rss").await.unwrap();

    response
        .assert_status(StatusCode::OK)
        .assert_header_starts_with("content-type", "application/rss+xml");
    assert_eq!(rss_item_titles(&response.body_bytes), vec!["demo 1.0"]);
    assert_rss_item_links(&response.body_bytes, "https://pypi.example.com/root/dev/demo/");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_list_newest_uploads_first(ctx: &TestContext) {
    for (project, version) in [("pkgA", "1.0"), ("pkgA", "2.0"), ("pkgB", "1.0")] {
        ctx.client
            .post(
                "/+rss/hooks/upload",
                &ctx.fixtures.upload_event("root/dev", project, version),
            )
            .await
            .unwrap()
            .assert_status(StatusCode::NO_CONTENT);
    }

    let response = ctx.client.get("/root/dev/+rss").await.unwrap();

    assert_eq!(
        rss_item_titles(&response.body_bytes),
        vec!["pkgB 1.0", "pkgA 2.0", "pkgA 1.0"]
    );
}

#[tokio::test]
async fn it_should_evict_oldest_items_beyond_max_items() {
    let ctx = TestContext::with_config(|config| config.max_items = 2)
        .await
        .unwrap();

    for (project, version) in [("pkgA", "1.0"), ("pkgA", "2.0"), ("pkgB", "1.0")] {
        ctx.client
            .post(
                "/+rss/hooks/upload",
                &ctx.fixtures.upload_event("myindex/prod", project, version),
            )
            .await
            .unwrap();
    }

    let response = ctx.client.get("/myindex/prod/+rss").await.unwrap();
    assert_eq!(
        rss_item_titles(&response.body_bytes),
        vec!["pkgB 1.0", "pkgA 2.0"]
    );
}

#[tokio::test]
async fn it_should_truncate_long_descriptions_when_configured() {
    let ctx = TestContext::with_config(|config| config.truncate_description = true)
        .await
        .unwrap();

    let mut event = ctx.fixtures.upload_event("root/dev", "demo", "1.0");
    event["description"] = json!("a".repeat(1500));
    ctx.client.post("/+rss/hooks/upload", &event).await.unwrap();

    let feed = ctx.fixtures.stored_feed("root/dev").unwrap();
    assert_eq!(feed.items[0].description, format!("{}[...]", "a".repeat(1024)));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_keep_separate_feeds_per_index(ctx: &TestContext) {
    ctx.client
        .post(
            "/+rss/hooks/upload",
            &ctx.fixtures.upload_event("root/dev", "demo", "1.0"),
        )
        .await
        .unwrap();
    ctx.client
        .post(
            "/+rss/hooks/upload",
            &ctx.fixtures.upload_event("root/prod", "other", "3.0"),
        )
        .await
        .unwrap();

    let dev = ctx.client.get("/root/dev/+rss").await.unwrap();
    let prod = ctx.client.get("/root/prod/+rss").await.unwrap();

    assert_eq!(rss_item_titles(&dev.body_bytes), vec!["demo 1.0"]);
    assert_eq!(rss_item_titles(&prod.body_bytes), vec!["other 3.0"]);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_record_all_concurrent_uploads(ctx: &TestContext) {
    let events: Vec<_> = (0..10)
        .map(|n| ctx.fixtures.upload_event("root/dev", "demo", &format!("1.{}", n)))
        .collect();
    let requests: Vec<_> = events
        .iter()
        .map(|event| ctx.client.post("/+rss/hooks/upload", event))
        .collect();

    for response in futures::future::join_all(requests).await {
        response.unwrap().assert_status(StatusCode::NO_CONTENT);
    }

    let feed = ctx.fixtures.stored_feed("root/dev").unwrap();
    assert_eq!(feed.items.len(), 10);
}
