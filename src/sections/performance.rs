//! Performance section: summary plus gaming and ray-tracing benchmark data.
//!
//! The benchmark numbers are not in the DOM. After expansion, each chart is
//! given a chance to reach a terminal render state; if it loads, the
//! session identifiers recovered from the hydration payload drive
//! out-of-band `gameReport` fetches, whose payloads are reduced to
//! per-game, per-resolution entries.

use std::time::Duration;

use chromiumoxide::Page;
use serde_json::Value;
use tracing::{info, warn};

use crate::browser::dom;
use crate::browser::BrowserSession;
use crate::config::ScrapeConfig;
use crate::error::ScrapeError;
use crate::extract::{charts, expand_section, hydration, wait_for_chart};
use crate::models::{
    ChartLoadStatus, FpsData, GameReport, GamingPerformanceEntry, Performance,
};

const BUTTON: &str = "#performance > div > button";
const OPEN_INDICATOR: &str = "#performance-summary";

const CATEGORY: &str = "performance";
const REPORT_KIND: &str = "gameReport";

pub async fn parse(
    session: &BrowserSession,
    config: &ScrapeConfig,
    page: &Page,
    article_url: &str,
) -> Option<Performance> {
    let opened = expand_section(
        page,
        BUTTON,
        OPEN_INDICATOR,
        "Performance",
        config.expand_retries,
        Duration::from_millis(config.expand_timeout_ms),
    )
    .await;
    if !opened {
        return None;
    }

    let summary = dom::text_content(page, "#performance .text-base.wysiwyg")
        .await
        .ok()
        .flatten();

    let gaming_performance = chart_section(
        session,
        config,
        page,
        article_url,
        "Gaming Performance",
        "#gaming-performance",
    )
    .await;
    let ray_tracing_performance = chart_section(
        session,
        config,
        page,
        article_url,
        "Ray Tracing Performance",
        "#ray-tracing-performance",
    )
    .await;

    Some(Performance {
        summary,
        gaming_performance,
        ray_tracing_performance,
    })
}

/// Resolve one benchmark title to its reduced entries, or `None` when the
/// chart confirms no data, times out, or the fetch pipeline fails.
async fn chart_section(
    session: &BrowserSession,
    config: &ScrapeConfig,
    page: &Page,
    article_url: &str,
    title: &str,
    chart_selector: &str,
) -> Option<Vec<GamingPerformanceEntry>> {
    match wait_for_chart(
        page,
        chart_selector,
        Duration::from_millis(config.chart_timeout_ms),
        config.chart_attempts,
    )
    .await
    {
        ChartLoadStatus::Loaded => {}
        ChartLoadStatus::DataUnavailable => {
            info!("{}: data not gathered for this product", title);
            return None;
        }
        ChartLoadStatus::TimedOut => {
            warn!(
                "{}",
                ScrapeError::ChartTimedOut {
                    chart: title.to_string()
                }
            );
            return None;
        }
    }

    let ids = hydration::session_ids(page, &[title], CATEGORY).await;
    if !ids.contains_key(title) {
        warn!(
            "{}",
            ScrapeError::SessionIdMissing {
                section: title.to_string()
            }
        );
        return None;
    }

    let reports =
        charts::fetch_section_reports(session, config, article_url, REPORT_KIND, &ids).await;
    let entries: Vec<GamingPerformanceEntry> = reports
        .get(title)
        .into_iter()
        .flatten()
        .flat_map(|payload| parse_gaming_performance(payload))
        .collect();

    if entries.is_empty() {
        None
    } else {
        Some(entries)
    }
}

/// Reduce one `gameReport` payload to per-game entries. Only the base test
/// results are kept; the resolution is the height of the `WxH` string.
pub fn parse_gaming_performance(payload: &Value) -> Vec<GamingPerformanceEntry> {
    let report: GameReport = match serde_json::from_value(payload.clone()) {
        Ok(report) => report,
        Err(e) => {
            warn!("Game report payload had unexpected shape: {}", e);
            return Vec::new();
        }
    };

    report
        .base_test_result
        .into_iter()
        .map(|result| GamingPerformanceEntry {
            game: result.friendly_test,
            resolution: result
                .friendly_resolution
                .split('x')
                .nth(1)
                .and_then(|h| h.trim().parse().ok())
                .unwrap_or(0),
            fps_data: FpsData {
                average_fps: result.average,
                one_percent_low_fps: result.p1,
                min_fps: Some(result.min),
                max_fps: Some(result.max),
                percent99_fps: Some(result.p99),
                percent95_fps: Some(result.p95),
                percent5_fps: Some(result.p5),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_payload() -> Value {
        serde_json::json!({
            "baseTestResult": [
                {
                    "component": "NVIDIA GeForce RTX 4080 SUPER",
                    "manufacturer": "NVIDIA",
                    "average": 91.0,
                    "p99": 88.0,
                    "p95": 86.0,
                    "p5": 81.0,
                    "p1": 79.0,
                    "min": 70.0,
                    "max": 101.0,
                    "settings": "ultra",
                    "test": "atomic-heart",
                    "friendlyTest": "Atomic Heart",
                    "friendlyResolution": "3840x2160",
                    "friendlySettings": "Ultra"
                },
                {
                    "component": "NVIDIA GeForce RTX 4080 SUPER",
                    "manufacturer": "NVIDIA",
                    "average": 181.0,
                    "p99": 170.0,
                    "p95": 166.0,
                    "p5": 150.0,
                    "p1": 144.0,
                    "min": 131.0,
                    "max": 198.0,
                    "settings": "ultra",
                    "test": "cyberpunk-2077",
                    "friendlyTest": "Cyberpunk 2077",
                    "friendlyResolution": "1920x1080",
                    "friendlySettings": "Ultra"
                }
            ],
            "additionalTestResults": []
        })
    }

    #[test]
    fn test_parse_gaming_performance_fixture() {
        let entries = parse_gaming_performance(&fixture_payload());
        assert_eq!(entries.len(), 2);

        let atomic_heart = entries
            .iter()
            .find(|e| e.game == "Atomic Heart" && e.resolution == 2160)
            .expect("Atomic Heart @2160 present");
        assert_eq!(atomic_heart.fps_data.average_fps, 91.0);
        assert_eq!(atomic_heart.fps_data.one_percent_low_fps, 79.0);

        let cyberpunk = entries
            .iter()
            .find(|e| e.game == "Cyberpunk 2077")
            .expect("Cyberpunk present");
        assert_eq!(cyberpunk.resolution, 1080);
        assert_eq!(cyberpunk.fps_data.average_fps, 181.0);
    }

    #[test]
    fn test_malformed_payload_yields_no_entries() {
        let entries = parse_gaming_performance(&serde_json::json!({ "unexpected": true }));
        assert!(entries.is_empty());
    }
}
