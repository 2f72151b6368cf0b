//! Hardware section: summary, in-the-box gallery, graphics processor, cores
//! and clocks, board design.

use std::time::Duration;

use chromiumoxide::Page;
use tracing::{debug, warn};

use crate::browser::dom;
use crate::config::ScrapeConfig;
use crate::extract::expand_section;
use crate::models::{BoardDesign, GraphicsProcessor, Hardware, InTheBox, SpecsObject};

const BUTTON: &str = "#hardware > div > button";
const OPEN_INDICATOR: &str = "#hardware-summary .text-base";

pub async fn parse(config: &ScrapeConfig, page: &Page) -> Option<Hardware> {
    let opened = expand_section(
        page,
        BUTTON,
        OPEN_INDICATOR,
        "Hardware",
        config.expand_retries,
        Duration::from_millis(config.expand_timeout_ms),
    )
    .await;
    if !opened {
        return None;
    }

    let (summary, in_the_box, graphics_processor, cores_and_clocks, board_design) = tokio::join!(
        parse_summary(page),
        parse_in_the_box(page),
        parse_graphics_processor(page),
        parse_cores_and_clocks(page),
        parse_board_design(page),
    );

    Some(Hardware {
        summary,
        in_the_box,
        graphics_processor,
        cores_and_clocks,
        board_design,
    })
}

/// The summary block renders a heading and the body text under the same
/// class; the second element is the content.
async fn parse_summary(page: &Page) -> Option<String> {
    let script = r#"
        (function() {
            const els = document.querySelectorAll('#hardware-summary .text-base');
            if (els.length < 2) return null;
            return (els[1].textContent || '').trim() || null;
        })()
    "#;
    match page.evaluate(script).await {
        Ok(result) => result.into_value().unwrap_or(None),
        Err(e) => {
            warn!("Could not read hardware summary: {}", e);
            None
        }
    }
}

async fn parse_in_the_box(page: &Page) -> Option<InTheBox> {
    let root = "#in-the-box";
    if !dom::element_exists(page, root).await.unwrap_or(false) {
        debug!("In-the-box section not present");
        return None;
    }

    let images = dom::gallery_images(page, root).await.unwrap_or_default();

    let items_selector = "#in-the-box div.group.text-sm";
    let box_items = match dom::spec_list(page, items_selector).await {
        Ok(Some(items)) => items,
        // Some pages render the box contents as a single text blob
        _ => dom::text_content(page, items_selector)
            .await
            .ok()
            .flatten()
            .map(|text| vec![text])
            .unwrap_or_default(),
    };

    Some(InTheBox { images, box_items })
}

async fn parse_graphics_processor(page: &Page) -> Option<GraphicsProcessor> {
    let root = "#graphics-processor";
    if !dom::element_exists(page, root).await.unwrap_or(false) {
        debug!("Graphics processor section not present");
        return None;
    }

    let images = dom::gallery_images(page, root).await.unwrap_or_default();
    let specs = dom::specs_object(page, "#graphics-processor div.group.text-sm", false)
        .await
        .unwrap_or_default();
    let note = dom::text_content(page, "#graphics-processor div.wysiwyg")
        .await
        .ok()
        .flatten();

    Some(GraphicsProcessor {
        images,
        note,
        specs,
    })
}

async fn parse_cores_and_clocks(page: &Page) -> Option<SpecsObject> {
    let root = "#cores-and-clocks";
    if !dom::element_exists(page, root).await.unwrap_or(false) {
        debug!("Cores and clocks section not present");
        return None;
    }
    dom::specs_object(page, "#cores-and-clocks div.group.text-sm", false)
        .await
        .ok()
}

async fn parse_board_design(page: &Page) -> Option<BoardDesign> {
    let root = "#board-design";
    if !dom::element_exists(page, root).await.unwrap_or(false) {
        debug!("Board design section not present");
        return None;
    }

    let images = dom::gallery_images(page, root).await.unwrap_or_default();
    let specs = dom::specs_object(page, "#board-design div.group.text-sm", false)
        .await
        .unwrap_or_default();

    Some(BoardDesign { images, specs })
}
