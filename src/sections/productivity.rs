//! Productivity & efficiency section: non-game benchmark reports, filtered
//! down to the article's own component.

use std::time::Duration;

use chromiumoxide::Page;
use serde_json::Value;
use tracing::warn;

use crate::browser::BrowserSession;
use crate::config::ScrapeConfig;
use crate::error::ScrapeError;
use crate::extract::{charts, expand_section, hydration};
use crate::models::{filter_reference_components, NonGameReport, ProductivityAndEfficiency};

// The section header renders two buttons; the expand trigger is the
// unlabeled one.
const BUTTON: &str = "#productivity-and-efficiency > div > button:not([aria-label])";
const OPEN_INDICATOR: &str = "#productivity-efficiency-summary";

const CATEGORY: &str = "productivity-and-efficiency";
const REPORT_KIND: &str = "nonGameReport";

const PRODUCTIVITY: &str = "Productivity";
const SYNTHETICS: &str = "Synthetics";

pub async fn parse(
    session: &BrowserSession,
    config: &ScrapeConfig,
    page: &Page,
    article_url: &str,
) -> Option<ProductivityAndEfficiency> {
    let opened = expand_section(
        page,
        BUTTON,
        OPEN_INDICATOR,
        "Productivity & Efficiency",
        config.expand_retries,
        Duration::from_millis(config.expand_timeout_ms),
    )
    .await;
    if !opened {
        return None;
    }

    let ids = hydration::session_ids(page, &[PRODUCTIVITY, SYNTHETICS], CATEGORY).await;
    for title in [PRODUCTIVITY, SYNTHETICS] {
        if !ids.contains_key(title) {
            warn!(
                "{}",
                ScrapeError::SessionIdMissing {
                    section: title.to_string()
                }
            );
        }
    }
    if ids.is_empty() {
        return Some(ProductivityAndEfficiency::default());
    }

    let reports =
        charts::fetch_section_reports(session, config, article_url, REPORT_KIND, &ids).await;

    let reduce = |title: &str| -> Option<Vec<NonGameReport>> {
        let parsed: Vec<NonGameReport> = reports
            .get(title)
            .into_iter()
            .flatten()
            .flat_map(parse_report_payload)
            .collect();
        let filtered = filter_reference_components(parsed);
        if filtered.is_empty() {
            None
        } else {
            Some(filtered)
        }
    };

    Some(ProductivityAndEfficiency {
        productivity_tasks: reduce(PRODUCTIVITY),
        synthetic_scores: reduce(SYNTHETICS),
    })
}

/// A payload is either one report object or an array of them, depending on
/// the endpoint's mood for a given session identifier.
fn parse_report_payload(payload: &Value) -> Vec<NonGameReport> {
    let candidates: Vec<&Value> = match payload.as_array() {
        Some(array) => array.iter().collect(),
        None => vec![payload],
    };

    candidates
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value.clone()) {
            Ok(report) => Some(report),
            Err(e) => {
                warn!("Non-game report payload had unexpected shape: {}", e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_value(name: &str, reference: bool) -> Value {
        serde_json::json!({
            "xAxisLabel": "Score",
            "measurementUnit": "points",
            "title": "3DMark Time Spy",
            "subtitle": "",
            "componentMeasurements": [{
                "componentName": name,
                "manufacturer": "NVIDIA",
                "isReferenceComponent": reference,
                "measurements": [{ "label": "Score", "value": 28000.0 }]
            }]
        })
    }

    #[test]
    fn test_single_object_payload() {
        let reports = parse_report_payload(&report_value("RTX 4080 SUPER", true));
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].title, "3DMark Time Spy");
    }

    #[test]
    fn test_array_payload() {
        let payload = serde_json::json!([
            report_value("RTX 4080 SUPER", true),
            report_value("RX 7900 XTX", false),
        ]);
        let reports = parse_report_payload(&payload);
        assert_eq!(reports.len(), 2);
    }
}
