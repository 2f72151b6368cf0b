//! Live extraction tests against the real site.
//!
//! These drive an actual Chrome instance and hit lttlabs.com, so they are
//! ignored by default. Run with:
//!
//! ```text
//! CF_CLEARANCE=... cargo test --test live -- --ignored --test-threads=1
//! ```

use std::time::Duration;

use labscrape::extract::expand_section;
use labscrape::{fetch_product_details, BrowserOptions, BrowserSession, ScrapeConfig};

const KNOWN_ARTICLE: &str = "https://www.lttlabs.com/articles/gpu/nvidia-geforce-rtx-4080-super-16gb";
const MISSING_ARTICLE: &str = "https://www.lttlabs.com/articles/gpu/not-a-real-product";

async fn session() -> BrowserSession {
    BrowserSession::start(BrowserOptions::default())
        .await
        .expect("browser launch")
}

#[tokio::test]
#[ignore = "requires Chrome, network access, and a fresh CF_CLEARANCE"]
async fn extracts_known_article() {
    let config = ScrapeConfig::from_env();
    let session = session().await;

    let record = fetch_product_details(&session, &config, KNOWN_ARTICLE)
        .await
        .expect("extraction");

    assert_eq!(
        record.name.as_deref(),
        Some("NVIDIA GeForce RTX 4080 SUPER 16GB")
    );

    let hardware = record.hardware.expect("hardware section");
    let summary = hardware.summary.expect("hardware summary");
    assert!(
        summary.contains("AD103"),
        "hardware summary should name the AD103 die, got: {}",
        summary
    );

    let in_the_box = hardware.in_the_box.expect("in the box");
    assert_eq!(in_the_box.images.len(), 4);
    assert_eq!(in_the_box.box_items.len(), 3);

    session.close().await;
}

#[tokio::test]
#[ignore = "requires Chrome, network access, and a fresh CF_CLEARANCE"]
async fn extracts_gaming_benchmarks() {
    let config = ScrapeConfig::from_env();
    assert!(
        config.cf_clearance.is_some(),
        "set CF_CLEARANCE to exercise chart fetching"
    );
    let session = session().await;

    let record = fetch_product_details(&session, &config, KNOWN_ARTICLE)
        .await
        .expect("extraction");

    let performance = record.performance.expect("performance section");
    let gaming = performance.gaming_performance.expect("gaming performance");

    let atomic_heart_4k = gaming
        .iter()
        .find(|e| e.game == "Atomic Heart" && e.resolution == 2160)
        .expect("Atomic Heart at 2160p");
    assert_eq!(atomic_heart_4k.fps_data.average_fps, 91.0);
    assert_eq!(atomic_heart_4k.fps_data.one_percent_low_fps, 79.0);

    let cyberpunk_1080 = gaming
        .iter()
        .find(|e| e.game == "Cyberpunk 2077" && e.resolution == 1080)
        .expect("Cyberpunk 2077 at 1080p");
    assert_eq!(cyberpunk_1080.fps_data.average_fps, 181.0);

    session.close().await;
}

#[tokio::test]
#[ignore = "requires Chrome (no network needed)"]
async fn expanding_an_open_section_clicks_at_most_once() {
    let session = session().await;
    let page = session.new_page().await.expect("page");

    // The button reveals the open indicator and counts its own clicks.
    let fixture = "data:text/html,<html><body>\
        <button id='reveal' onclick=\"window.__clicks=(window.__clicks||0)+1;\
var d=document.createElement('div');d.id='content';\
document.body.appendChild(d);\">open</button>\
        </body></html>";
    session.goto(&page, fixture).await.expect("navigation");

    let first = expand_section(
        &page,
        "#reveal",
        "#content",
        "Fixture",
        3,
        Duration::from_millis(1500),
    )
    .await;
    assert!(first, "first expansion should click and succeed");

    let second = expand_section(
        &page,
        "#reveal",
        "#content",
        "Fixture",
        3,
        Duration::from_millis(1500),
    )
    .await;
    assert!(second, "already-open section should still report success");

    let clicks: i64 = page
        .evaluate("window.__clicks")
        .await
        .expect("evaluate")
        .into_value()
        .expect("click count");
    assert_eq!(clicks, 1, "second expansion must not click again");

    let _ = page.close().await;
    session.close().await;
}

#[tokio::test]
#[ignore = "requires Chrome and network access"]
async fn missing_article_degrades_to_empty_record() {
    let config = ScrapeConfig::from_env();
    let session = session().await;

    // A bad slug still renders a page shell, so navigation succeeds and
    // every section parser comes back empty.
    let record = fetch_product_details(&session, &config, MISSING_ARTICLE)
        .await
        .expect("extraction should not error on a missing article");

    assert!(record.hardware.is_none());
    assert!(record.features_and_software.is_none());
    assert!(record.performance.is_none());
    assert!(record.productivity_and_efficiency.is_none());
    assert!(record.test_configuration.is_none());
    assert!(record.good_points.is_empty());
    assert!(record.links.is_empty());

    session.close().await;
}
