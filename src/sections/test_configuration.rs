//! Test configuration section: summary, test bench parts (link-bearing
//! values), tested settings as titled paragraphs.

use std::time::Duration;

use chromiumoxide::Page;
use tracing::debug;

use crate::browser::dom;
use crate::config::ScrapeConfig;
use crate::extract::expand_section;
use crate::models::{SpecsObject, TestConfiguration};

const BUTTON: &str = "#test-configuration > div > button";
const OPEN_INDICATOR: &str = "#test-configuration .text-base.wysiwyg";

pub async fn parse(config: &ScrapeConfig, page: &Page) -> Option<TestConfiguration> {
    let opened = expand_section(
        page,
        BUTTON,
        OPEN_INDICATOR,
        "Test Configuration",
        config.expand_retries,
        Duration::from_millis(config.expand_timeout_ms),
    )
    .await;
    if !opened {
        return None;
    }

    let (summary, test_bench, tested_settings) = tokio::join!(
        parse_summary(page),
        parse_test_bench(page),
        parse_tested_settings(page),
    );

    Some(TestConfiguration {
        summary,
        test_bench,
        tested_settings,
    })
}

async fn parse_summary(page: &Page) -> Option<String> {
    dom::text_content(page, "#test-configuration .text-base.wysiwyg")
        .await
        .ok()
        .flatten()
}

async fn parse_test_bench(page: &Page) -> Option<SpecsObject> {
    let root = "#test-bench";
    if !dom::element_exists(page, root).await.unwrap_or(false) {
        debug!("Test bench section not present");
        return None;
    }
    // Bench parts are rendered as links to their own articles.
    dom::specs_object(page, "#test-bench div.group.text-sm", true)
        .await
        .ok()
}

async fn parse_tested_settings(page: &Page) -> Option<std::collections::BTreeMap<String, String>> {
    dom::titled_paragraphs(page, "#tested-settings .group.text-sm")
        .await
        .ok()
        .flatten()
}
