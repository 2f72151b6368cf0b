//! Features & software section: summary, supported features, encode/decode
//! capabilities, OEM technologies.

use std::time::Duration;

use chromiumoxide::Page;
use tracing::debug;

use crate::browser::dom;
use crate::config::ScrapeConfig;
use crate::extract::expand_section;
use crate::models::{FeaturesAndSoftware, SpecsObject};

const BUTTON: &str = "#features-and-software > div > button";
const OPEN_INDICATOR: &str = "#features-software-summary .text-base";

pub async fn parse(config: &ScrapeConfig, page: &Page) -> Option<FeaturesAndSoftware> {
    let opened = expand_section(
        page,
        BUTTON,
        OPEN_INDICATOR,
        "Features & Software",
        config.expand_retries,
        Duration::from_millis(config.expand_timeout_ms),
    )
    .await;
    if !opened {
        return None;
    }

    let (summary, supported_features, encode_decode, oem_technologies) = tokio::join!(
        parse_summary(page),
        parse_specs_section(page, "#supported-features"),
        parse_specs_section(page, "#encode-decode"),
        parse_oem_technologies(page),
    );

    Some(FeaturesAndSoftware {
        summary,
        supported_features,
        encode_decode,
        oem_technologies,
    })
}

async fn parse_summary(page: &Page) -> Option<String> {
    dom::text_content(page, "#features-and-software .text-base.wysiwyg")
        .await
        .ok()
        .flatten()
}

async fn parse_specs_section(page: &Page, root: &str) -> Option<SpecsObject> {
    if !dom::element_exists(page, root).await.unwrap_or(false) {
        debug!("{} section not present", root);
        return None;
    }
    dom::specs_object(page, &format!("{} div.group.text-sm", root), false)
        .await
        .ok()
}

async fn parse_oem_technologies(page: &Page) -> Option<Vec<String>> {
    let root = "#oem-technologies";
    if !dom::element_exists(page, root).await.unwrap_or(false) {
        debug!("OEM technologies section not present");
        return None;
    }
    dom::spec_list(page, "#oem-technologies div.group.text-sm")
        .await
        .ok()
        .flatten()
}
