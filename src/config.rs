//! Configuration for the extraction pipeline.
//!
//! Everything is plain serde with defaults; the only secret is the site
//! clearance cookie, which is read from the environment (a `.env` file is
//! honored) and never generated here.

use serde::{Deserialize, Serialize};

/// Site and extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Origin of the review site, without a trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Clearance cookie value for the chart API, sourced from `CF_CLEARANCE`.
    /// Chart fetches fail fast when this is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cf_clearance: Option<String>,

    /// Retries for expanding a collapsible section.
    #[serde(default = "default_expand_retries")]
    pub expand_retries: usize,

    /// Per-attempt wait for a section's open indicator, in milliseconds.
    #[serde(default = "default_expand_timeout_ms")]
    pub expand_timeout_ms: u64,

    /// Per-attempt wait for a chart to render, in milliseconds.
    #[serde(default = "default_chart_timeout_ms")]
    pub chart_timeout_ms: u64,

    /// Scroll-and-probe attempts before a chart is declared timed out.
    #[serde(default = "default_chart_attempts")]
    pub chart_attempts: usize,
}

fn default_base_url() -> String {
    "https://www.lttlabs.com".to_string()
}

fn default_expand_retries() -> usize {
    3
}

fn default_expand_timeout_ms() -> u64 {
    1500
}

fn default_chart_timeout_ms() -> u64 {
    2000
}

fn default_chart_attempts() -> usize {
    10
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            cf_clearance: None,
            expand_retries: default_expand_retries(),
            expand_timeout_ms: default_expand_timeout_ms(),
            chart_timeout_ms: default_chart_timeout_ms(),
            chart_attempts: default_chart_attempts(),
        }
    }
}

impl ScrapeConfig {
    /// Build a config from the process environment, loading `.env` first.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        let mut config = Self::default();
        if let Ok(base_url) = std::env::var("LABSCRAPE_BASE_URL") {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        config.cf_clearance = std::env::var("CF_CLEARANCE")
            .ok()
            .filter(|v| !v.is_empty());
        config
    }

    /// URL of the article listing page for a category.
    pub fn category_url(&self, category: &str) -> String {
        format!("{}/categories/{}", self.base_url, category)
    }

    /// URL of the out-of-band chart data endpoint for one session identifier.
    pub fn chart_data_url(&self, kind: &str, session_id: &str) -> String {
        format!(
            "{}/api/chart/data/gpu/{}/{}",
            self.base_url, kind, session_id
        )
    }

    /// Host of the site origin, used as the cookie domain.
    pub fn site_host(&self) -> Option<String> {
        url::Url::parse(&self.base_url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_data_url() {
        let config = ScrapeConfig::default();
        assert_eq!(
            config.chart_data_url("gameReport", "abc123"),
            "https://www.lttlabs.com/api/chart/data/gpu/gameReport/abc123"
        );
    }

    #[test]
    fn test_site_host() {
        let config = ScrapeConfig::default();
        assert_eq!(config.site_host().as_deref(), Some("www.lttlabs.com"));
    }
}
