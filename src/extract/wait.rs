//! Retry-with-timeout engine for uncertain UI timing.
//!
//! Section expansion and chart rendering share the same problem: an action
//! was taken, and the page will reach one of several terminal states at an
//! unknown time. [`poll_until`] runs an observation probe on an interval and
//! classifies the wait; the section expander and chart waiter are both built
//! on it.

use std::future::Future;
use std::time::Duration;

use chromiumoxide::Page;
use tracing::{debug, info, warn};

use crate::browser::dom;
use crate::models::ChartLoadStatus;

/// Interval between observation probes.
const PROBE_INTERVAL: Duration = Duration::from_millis(100);

/// One observation of the watched condition.
pub enum PollOutcome<T> {
    /// Terminal success.
    Ready(T),
    /// Terminal negative: the page states the condition will never hold.
    /// Distinct from `Pending` so callers stop wasting their budget.
    ConfirmedNegative,
    /// Nothing yet; keep polling.
    Pending,
}

/// Classified result of a bounded wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitResult<T> {
    Ready(T),
    ConfirmedNegative,
    TimedOut,
}

/// Poll `probe` every [`PROBE_INTERVAL`] until it returns a terminal outcome
/// or `budget` elapses.
pub async fn poll_until<T, F, Fut>(mut probe: F, budget: Duration) -> WaitResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = PollOutcome<T>>,
{
    let deadline = tokio::time::Instant::now() + budget;
    loop {
        match probe().await {
            PollOutcome::Ready(value) => return WaitResult::Ready(value),
            PollOutcome::ConfirmedNegative => return WaitResult::ConfirmedNegative,
            PollOutcome::Pending => {}
        }
        if tokio::time::Instant::now() >= deadline {
            return WaitResult::TimedOut;
        }
        tokio::time::sleep(PROBE_INTERVAL).await;
    }
}

/// Expand a click-to-reveal section.
///
/// Idempotent: when the open indicator is already present no click is
/// issued. A missing trigger button means the section does not exist on this
/// page variant and is reported as failure immediately, without retries.
/// Otherwise the button is clicked (click errors swallowed) and the open
/// indicator awaited, up to `retries` times.
///
/// Safe to run concurrently with other sections' expansion; not
/// reentrant-safe for the same section.
pub async fn expand_section(
    page: &Page,
    button_selector: &str,
    open_selector: &str,
    section_name: &str,
    retries: usize,
    per_attempt_timeout: Duration,
) -> bool {
    if dom::element_exists(page, open_selector).await.unwrap_or(false) {
        debug!("{} is already open", section_name);
        return true;
    }

    match dom::element_exists(page, button_selector).await {
        Ok(true) => {}
        Ok(false) => {
            info!("Button to expand {} not found", section_name);
            return false;
        }
        Err(e) => {
            warn!("Could not probe {} button: {}", section_name, e);
            return false;
        }
    }

    for attempt in 1..=retries {
        if let Err(e) = dom::click(page, button_selector).await {
            debug!(
                "Click on {} failed on attempt {}: {}",
                section_name, attempt, e
            );
        }

        let opened = poll_until(
            || async {
                match dom::element_exists(page, open_selector).await {
                    Ok(true) => PollOutcome::Ready(()),
                    _ => PollOutcome::Pending,
                }
            },
            per_attempt_timeout,
        )
        .await;

        if matches!(opened, WaitResult::Ready(())) {
            debug!("{} expanded on attempt {}", section_name, attempt);
            return true;
        }
        debug!(
            "Attempt {} to expand {} failed, retrying",
            attempt, section_name
        );
    }

    warn!("Failed to expand {} after {} attempts", section_name, retries);
    false
}

/// Classify one chart observation. The unavailable message wins over a
/// rendered label: the site stating "not gathered" is authoritative.
pub fn classify_chart_probe(
    has_data_label: bool,
    has_unavailable_message: bool,
) -> Option<ChartLoadStatus> {
    if has_unavailable_message {
        Some(ChartLoadStatus::DataUnavailable)
    } else if has_data_label {
        Some(ChartLoadStatus::Loaded)
    } else {
        None
    }
}

/// Message the site renders in place of a chart whose data was not gathered.
const UNAVAILABLE_MESSAGE: &str = "not gathered during testing";

/// Selector for a rendered data label inside a chart root.
const DATA_LABEL_SELECTOR: &str = "svg text";

/// Wait for a lazily rendered chart to reach a terminal state.
///
/// Charts render on viewport intersection, so every attempt scrolls the
/// chart back into view before probing. The explicit data-unavailable
/// message short-circuits the remaining attempt budget.
pub async fn wait_for_chart(
    page: &Page,
    chart_selector: &str,
    per_attempt_timeout: Duration,
    max_attempts: usize,
) -> ChartLoadStatus {
    for attempt in 1..=max_attempts {
        if let Err(e) = dom::scroll_into_view(page, chart_selector).await {
            debug!("Scroll to {} failed: {}", chart_selector, e);
        }

        let result = poll_until(
            || async {
                match probe_chart(page, chart_selector).await {
                    Some(ChartLoadStatus::Loaded) => PollOutcome::Ready(ChartLoadStatus::Loaded),
                    Some(ChartLoadStatus::DataUnavailable) => PollOutcome::ConfirmedNegative,
                    _ => PollOutcome::Pending,
                }
            },
            per_attempt_timeout,
        )
        .await;

        match result {
            WaitResult::Ready(status) => return status,
            WaitResult::ConfirmedNegative => {
                info!("Chart {} reports data unavailable", chart_selector);
                return ChartLoadStatus::DataUnavailable;
            }
            WaitResult::TimedOut => {
                debug!(
                    "Chart {} not ready after attempt {}/{}",
                    chart_selector, attempt, max_attempts
                );
            }
        }
    }

    ChartLoadStatus::TimedOut
}

async fn probe_chart(page: &Page, chart_selector: &str) -> Option<ChartLoadStatus> {
    let script = format!(
        r#"(function(sel, labelSel, unavailable) {{
            const root = document.querySelector(sel);
            if (!root) return {{ label: false, unavailable: false }};
            return {{
                label: !!root.querySelector(labelSel),
                unavailable: (root.textContent || '').includes(unavailable)
            }};
        }})({}, {}, {})"#,
        serde_json::to_string(chart_selector).unwrap_or_default(),
        serde_json::to_string(DATA_LABEL_SELECTOR).unwrap_or_default(),
        serde_json::to_string(UNAVAILABLE_MESSAGE).unwrap_or_default(),
    );

    #[derive(serde::Deserialize)]
    struct Probe {
        label: bool,
        unavailable: bool,
    }

    match page.evaluate(script).await {
        Ok(result) => match result.into_value::<Probe>() {
            Ok(probe) => classify_chart_probe(probe.label, probe.unavailable),
            Err(_) => None,
        },
        Err(e) => {
            debug!("Chart probe failed: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_unavailable_message_wins_over_label() {
        assert_eq!(
            classify_chart_probe(false, true),
            Some(ChartLoadStatus::DataUnavailable)
        );
        assert_eq!(
            classify_chart_probe(true, true),
            Some(ChartLoadStatus::DataUnavailable)
        );
        assert_eq!(
            classify_chart_probe(true, false),
            Some(ChartLoadStatus::Loaded)
        );
        assert_eq!(classify_chart_probe(false, false), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_until_ready_on_later_probe() {
        let calls = AtomicUsize::new(0);
        let result = poll_until(
            || async {
                if calls.fetch_add(1, Ordering::SeqCst) >= 2 {
                    PollOutcome::Ready(42)
                } else {
                    PollOutcome::Pending
                }
            },
            Duration::from_secs(5),
        )
        .await;

        assert_eq!(result, WaitResult::Ready(42));
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_until_confirmed_negative_short_circuits() {
        let calls = AtomicUsize::new(0);
        let result: WaitResult<()> = poll_until(
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                PollOutcome::ConfirmedNegative
            },
            Duration::from_secs(5),
        )
        .await;

        assert_eq!(result, WaitResult::ConfirmedNegative);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_until_times_out() {
        let result: WaitResult<()> =
            poll_until(|| async { PollOutcome::Pending }, Duration::from_millis(350)).await;
        assert_eq!(result, WaitResult::TimedOut);
    }
}
