//! Out-of-band chart data fetches.
//!
//! Chart volumes are not in the initial page payload; each session
//! identifier requires a second authenticated round-trip to the chart API,
//! which sits behind bot-detection middleware. Every fetch happens on its
//! own short-lived page so the primary article page's DOM state is never
//! disturbed: the page carries the clearance cookie, browser-realistic
//! headers and the article as referer, and is closed on every path.

use std::collections::BTreeMap;

use chromiumoxide::Page;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::browser::dom;
use crate::browser::BrowserSession;
use crate::config::ScrapeConfig;
use crate::error::{Result, ScrapeError};
use crate::models::SessionIdMap;

/// Title fragment of the interstitial challenge page.
const CHALLENGE_TITLE_MARKER: &str = "Just a moment";

/// Whether a page title identifies the bot-challenge interstitial.
pub fn is_challenge_title(title: &str) -> bool {
    title.contains(CHALLENGE_TITLE_MARKER)
}

/// Extract the API's own error message from a parsed payload, if present.
/// The first non-empty entry of the `errors` array wins; the API uses it
/// for unknown session identifiers ("Could not fetch game report data")
/// among others.
pub fn payload_error(payload: &Value) -> Option<String> {
    let errors = payload.get("errors")?.as_array()?;
    errors
        .iter()
        .filter_map(Value::as_str)
        .find(|e| !e.is_empty())
        .map(String::from)
}

/// Fetch the chart JSON for one session identifier.
///
/// Fails fast without a clearance credential - an unauthenticated request
/// would only burn time against the challenge middleware.
pub async fn fetch_chart_json(
    session: &BrowserSession,
    config: &ScrapeConfig,
    referer: &str,
    kind: &str,
    session_id: &str,
) -> Result<Value> {
    let clearance = config
        .cf_clearance
        .as_deref()
        .ok_or(ScrapeError::ClearanceMissing)?;

    let url = config.chart_data_url(kind, session_id);
    let page = session.new_page().await?;
    let result = fetch_on_page(session, config, &page, clearance, referer, &url).await;
    // Release the page on every path; these fetches fail often.
    let _ = page.close().await;
    result
}

async fn fetch_on_page(
    session: &BrowserSession,
    config: &ScrapeConfig,
    page: &Page,
    clearance: &str,
    referer: &str,
    url: &str,
) -> Result<Value> {
    let domain = config
        .site_host()
        .ok_or_else(|| ScrapeError::MalformedPayload(format!("bad base URL: {}", config.base_url)))?;

    session
        .set_cookie(page, "cf_clearance", clearance, &domain)
        .await?;

    session
        .set_extra_headers(
            page,
            serde_json::json!({
                "Accept": "application/json",
                "Accept-Language": "en-US,en;q=0.9",
                "Cache-Control": "no-cache",
                "Pragma": "no-cache",
                "Referer": referer,
                "Sec-Fetch-Dest": "empty",
                "Sec-Fetch-Mode": "cors",
                "Sec-Fetch-Site": "same-origin",
            }),
        )
        .await?;

    session.goto(page, url).await?;

    let title = dom::page_title(page).await.unwrap_or_default();
    if is_challenge_title(&title) {
        return Err(ScrapeError::AntiBotChallenge {
            url: url.to_string(),
        });
    }

    let body = read_json_body(page).await?;
    let payload: Value = serde_json::from_str(&body)
        .map_err(|e| ScrapeError::MalformedPayload(format!("{}: {}", url, e)))?;

    if let Some(error) = payload_error(&payload) {
        return Err(ScrapeError::Upstream(error));
    }

    Ok(payload)
}

/// Read the response body as text. Browsers wrap raw JSON responses in a
/// `<pre>` element; fall back to the whole body text when that wrapper is
/// absent.
async fn read_json_body(page: &Page) -> Result<String> {
    if let Some(pre) = dom::text_content(page, "pre").await? {
        return Ok(pre);
    }
    debug!("No <pre> wrapper; falling back to body text");
    dom::text_content(page, "body")
        .await?
        .ok_or_else(|| ScrapeError::MalformedPayload("empty response body".to_string()))
}

/// Fetch chart payloads for every section in a [`SessionIdMap`].
///
/// Identifiers are fetched concurrently. One identifier's failure is logged
/// and does not affect its siblings; a section appears in the result only
/// when at least one of its identifiers succeeded. A challenge page aborts
/// nothing else but is logged loudly - retrying against an active challenge
/// wastes the credential.
pub async fn fetch_section_reports(
    session: &BrowserSession,
    config: &ScrapeConfig,
    referer: &str,
    kind: &str,
    ids: &SessionIdMap,
) -> BTreeMap<String, Vec<Value>> {
    let fetches = ids.iter().flat_map(|(title, session_ids)| {
        session_ids.iter().map(move |id| async move {
            let result = fetch_chart_json(session, config, referer, kind, id).await;
            (title.clone(), id.clone(), result)
        })
    });

    let mut reports: BTreeMap<String, Vec<Value>> = BTreeMap::new();
    for (title, id, result) in futures::future::join_all(fetches).await {
        match result {
            Ok(payload) => {
                reports.entry(title).or_default().push(payload);
            }
            Err(e @ ScrapeError::AntiBotChallenge { .. }) => {
                warn!("{} ({}): {} - refresh CF_CLEARANCE", title, id, e);
            }
            Err(e) => {
                info!("Chart fetch failed for {} ({}): {}", title, id, e);
            }
        }
    }
    reports
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_challenge_title_detection() {
        assert!(is_challenge_title("Just a moment..."));
        assert!(!is_challenge_title("NVIDIA GeForce RTX 4080 SUPER Review"));
    }

    #[test]
    fn test_payload_error_detection() {
        let bad = serde_json::json!({
            "errors": ["Could not fetch game report data"]
        });
        assert!(payload_error(&bad).is_some());

        let good = serde_json::json!({ "baseTestResult": [] });
        assert!(payload_error(&good).is_none());

        let empty_errors = serde_json::json!({ "errors": [] });
        assert!(payload_error(&empty_errors).is_none());
    }

    #[test]
    fn test_payload_error_takes_first_nonempty_message() {
        let padded = serde_json::json!({
            "errors": ["", "rate limited", "Could not fetch game report data"]
        });
        assert_eq!(payload_error(&padded).as_deref(), Some("rate limited"));

        let blank_only = serde_json::json!({ "errors": ["", ""] });
        assert!(payload_error(&blank_only).is_none());
    }
}
