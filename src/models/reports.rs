//! Raw benchmark payloads returned by the chart data endpoint.

use serde::{Deserialize, Serialize};

/// Per-game benchmark payload (`gameReport` endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameReport {
    pub base_test_result: Vec<GameTestResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_test_results: Vec<GameTestResult>,
}

/// One component's result in one game test.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameTestResult {
    pub component: String,
    #[serde(default)]
    pub manufacturer: String,
    pub average: f64,
    pub p99: f64,
    pub p95: f64,
    pub p5: f64,
    pub p1: f64,
    pub min: f64,
    pub max: f64,
    #[serde(default)]
    pub settings: String,
    #[serde(default)]
    pub test: String,
    pub friendly_test: String,
    pub friendly_resolution: String,
    #[serde(default)]
    pub friendly_settings: String,
}

/// Non-game benchmark payload (`nonGameReport` endpoint): productivity tasks
/// and synthetic scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NonGameReport {
    #[serde(default)]
    pub x_axis_label: String,
    #[serde(default)]
    pub measurement_unit: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    pub component_measurements: Vec<ComponentMeasurement>,
}

/// Measurements for a single hardware component within a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentMeasurement {
    pub component_name: String,
    #[serde(default)]
    pub manufacturer: String,
    /// True when this component is the unit the article is about, as opposed
    /// to a comparison unit included for context.
    #[serde(default)]
    pub is_reference_component: bool,
    pub measurements: Vec<Measurement>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Measurement {
    pub label: String,
    pub value: f64,
}

/// Keep only the article's own component in each report.
///
/// Reports whose measurements are entirely comparison data are dropped;
/// everything else keeps the shape of the original report with the
/// non-reference rows removed.
pub fn filter_reference_components(reports: Vec<NonGameReport>) -> Vec<NonGameReport> {
    reports
        .into_iter()
        .filter_map(|mut report| {
            report
                .component_measurements
                .retain(|component| component.is_reference_component);
            if report.component_measurements.is_empty() {
                None
            } else {
                Some(report)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(components: Vec<(&str, bool)>) -> NonGameReport {
        NonGameReport {
            x_axis_label: "Score".to_string(),
            measurement_unit: "points".to_string(),
            title: "3DMark Time Spy".to_string(),
            subtitle: String::new(),
            component_measurements: components
                .into_iter()
                .map(|(name, reference)| ComponentMeasurement {
                    component_name: name.to_string(),
                    manufacturer: String::new(),
                    is_reference_component: reference,
                    measurements: vec![Measurement {
                        label: "Score".to_string(),
                        value: 100.0,
                    }],
                })
                .collect(),
        }
    }

    #[test]
    fn test_filter_keeps_only_reference_components() {
        let filtered = filter_reference_components(vec![report(vec![
            ("RTX 4080 SUPER", true),
            ("RX 7900 XTX", false),
        ])]);

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].component_measurements.len(), 1);
        assert!(filtered[0]
            .component_measurements
            .iter()
            .all(|c| c.is_reference_component));
    }

    #[test]
    fn test_filter_drops_reports_without_reference_component() {
        let filtered = filter_reference_components(vec![
            report(vec![("RX 7900 XTX", false)]),
            report(vec![("RTX 4080 SUPER", true)]),
        ]);

        assert_eq!(filtered.len(), 1);
        assert_eq!(
            filtered[0].component_measurements[0].component_name,
            "RTX 4080 SUPER"
        );
    }

    #[test]
    fn test_game_report_deserializes_wire_shape() {
        let raw = serde_json::json!({
            "baseTestResult": [{
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
            }]
        });

        let report: GameReport = serde_json::from_value(raw).unwrap();
        assert_eq!(report.base_test_result.len(), 1);
        assert_eq!(report.base_test_result[0].friendly_test, "Atomic Heart");
        assert!(report.additional_test_results.is_empty());
    }
}
