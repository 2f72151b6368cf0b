//! Chrome session management over CDP.
//!
//! A [`BrowserSession`] is an explicit context object owned by the caller:
//! launch (or connect to) one, pass it into the extraction operations, close
//! it when done. There is no module-level browser state. Pages opened from a
//! session get a realistic user agent and the stealth patches before any
//! site navigation.

mod stealth;

pub mod dom;

use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::network::{
    CookieParam, Headers, SetExtraHttpHeadersParams, SetUserAgentOverrideParams,
};
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Result, ScrapeError};

pub use stealth::STEALTH_SCRIPTS;

/// User agent reported by every page this session opens.
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Browser startup options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserOptions {
    /// Run in headless mode (default: true).
    /// Set to false for debugging or if headless detection is an issue.
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Remote Chrome DevTools URL (e.g., "ws://localhost:9222").
    /// If set, connects to an existing browser instead of launching one.
    #[serde(default)]
    pub remote_url: Option<String>,

    /// Page load timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Additional Chrome arguments.
    #[serde(default)]
    pub chrome_args: Vec<String>,
}

fn default_headless() -> bool {
    true
}

fn default_timeout() -> u64 {
    30
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            remote_url: None,
            timeout: default_timeout(),
            chrome_args: Vec::new(),
        }
    }
}

/// A launched or remote-connected Chrome instance.
pub struct BrowserSession {
    browser: Browser,
    options: BrowserOptions,
}

impl BrowserSession {
    /// Common Chrome executable paths to check.
    const CHROME_PATHS: &'static [&'static str] = &[
        // Linux
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
        // macOS
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        // Common install locations
        "/opt/google/chrome/google-chrome",
    ];

    /// Launch a browser, or connect to a remote one if configured.
    pub async fn start(options: BrowserOptions) -> Result<Self> {
        if let Some(remote_url) = options.remote_url.clone() {
            return Self::connect_remote(options, &remote_url).await;
        }

        info!("Launching browser (headless={})", options.headless);

        let chrome_path = Self::find_chrome()?;

        let mut builder = BrowserConfig::builder().chrome_executable(chrome_path);

        // with_head means NOT headless, confusingly
        if !options.headless {
            builder = builder.with_head();
        }

        builder = builder
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-infobars")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-background-networking")
            .arg("--disable-sync")
            .arg("--disable-translate")
            .arg("--no-sandbox") // Often needed for headless in containers/restricted environments
            .arg("--disable-gpu")
            .arg("--disable-software-rasterizer");

        for arg in &options.chrome_args {
            builder = builder.arg(arg.as_str());
        }

        let config = builder
            .build()
            .map_err(|e| ScrapeError::Launch(format!("invalid browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScrapeError::Launch(e.to_string()))?;

        tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok(Self { browser, options })
    }

    /// Find a local Chrome executable.
    fn find_chrome() -> Result<std::path::PathBuf> {
        for path in Self::CHROME_PATHS {
            let p = std::path::Path::new(path);
            if p.exists() {
                info!("Found Chrome at: {}", path);
                return Ok(p.to_path_buf());
            }
        }

        for cmd in &[
            "google-chrome",
            "google-chrome-stable",
            "chromium",
            "chromium-browser",
        ] {
            if let Ok(output) = std::process::Command::new("which").arg(cmd).output() {
                if output.status.success() {
                    let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                    if !path.is_empty() {
                        info!("Found Chrome in PATH: {}", path);
                        return Ok(std::path::PathBuf::from(path));
                    }
                }
            }
        }

        Err(ScrapeError::ChromeNotFound)
    }

    /// Connect to a remote Chrome instance.
    async fn connect_remote(options: BrowserOptions, url: &str) -> Result<Self> {
        info!("Connecting to remote browser at {}", url);

        // Get the WebSocket URL from the /json/version endpoint
        let http_url = url
            .replace("ws://", "http://")
            .replace("wss://", "https://");
        let version_url = format!("{}/json/version", http_url.trim_end_matches('/'));

        let client = reqwest::Client::new();
        let resp: serde_json::Value = client
            .get(&version_url)
            .send()
            .await
            .map_err(|e| ScrapeError::Launch(format!("remote browser unreachable: {}", e)))?
            .json()
            .await
            .map_err(|e| ScrapeError::Launch(format!("bad version response: {}", e)))?;

        let ws_url = resp
            .get("webSocketDebuggerUrl")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                ScrapeError::Launch("no webSocketDebuggerUrl in version response".to_string())
            })?;

        debug!("Connecting to WebSocket: {}", ws_url);

        let (browser, mut handler) = Browser::connect(ws_url)
            .await
            .map_err(|e| ScrapeError::Launch(e.to_string()))?;

        tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok(Self { browser, options })
    }

    /// Open a blank page with the session user agent applied.
    pub async fn new_page(&self) -> Result<Page> {
        let page = self.browser.new_page("about:blank").await?;
        page.execute(SetUserAgentOverrideParams::new(USER_AGENT.to_string()))
            .await?;
        Ok(page)
    }

    /// Navigate a page and wait for it to become interactive.
    pub async fn goto(&self, page: &Page, url: &str) -> Result<()> {
        debug!("Navigating to {}", url);
        let params = NavigateParams::builder()
            .url(url)
            .build()
            .map_err(|e| ScrapeError::Navigation {
                url: url.to_string(),
                message: e,
            })?;

        page.execute(params)
            .await
            .map_err(|e| ScrapeError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        self.wait_for_ready(page).await;

        // Apply stealth once a real page context exists
        for script in STEALTH_SCRIPTS {
            if let Err(e) = page.evaluate(script.to_string()).await {
                // Best-effort evasion; can fail on non-HTML pages
                debug!("Stealth script injection skipped: {}", e);
            }
        }

        // Late-loading hydration scripts need a moment
        tokio::time::sleep(Duration::from_millis(500)).await;

        Ok(())
    }

    /// Wait for `document.readyState` instead of a fixed timeout.
    async fn wait_for_ready(&self, page: &Page) {
        let wait_for_ready_script = r#"
            new Promise((resolve) => {
                if (document.readyState === 'complete' || document.readyState === 'interactive') {
                    resolve(document.readyState);
                } else {
                    document.addEventListener('DOMContentLoaded', () => resolve(document.readyState));
                    // Fallback timeout in case the event never fires
                    setTimeout(() => resolve('timeout'), 10000);
                }
            })
        "#;

        let ready_timeout = Duration::from_secs(self.options.timeout);
        match tokio::time::timeout(
            ready_timeout,
            page.evaluate(wait_for_ready_script.to_string()),
        )
        .await
        {
            Ok(Ok(result)) => {
                let state: String = result
                    .into_value()
                    .unwrap_or_else(|_| "unknown".to_string());
                debug!("Page ready state: {}", state);
            }
            Ok(Err(e)) => {
                debug!("Could not check ready state: {}", e);
            }
            Err(_) => {
                warn!("Timeout waiting for page ready state");
            }
        }
    }

    /// Set a cookie on a page before navigation.
    pub async fn set_cookie(&self, page: &Page, name: &str, value: &str, domain: &str) -> Result<()> {
        let cookie = CookieParam::builder()
            .name(name)
            .value(value)
            .domain(domain)
            .build()
            .map_err(|e| ScrapeError::MalformedPayload(format!("cookie {}: {}", name, e)))?;
        page.set_cookie(cookie).await?;
        Ok(())
    }

    /// Attach extra HTTP headers to every request a page makes.
    pub async fn set_extra_headers(&self, page: &Page, headers: serde_json::Value) -> Result<()> {
        page.execute(SetExtraHttpHeadersParams::new(Headers::new(headers)))
            .await?;
        Ok(())
    }

    /// Close the browser. In-flight waits on its pages will fail rather than
    /// hang, which is the intended cancellation path.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            debug!("Browser close: {}", e);
        }
        let _ = self.browser.wait().await;
    }
}
