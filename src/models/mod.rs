//! Typed records produced by the extraction pipeline.
//!
//! Field names serialize in the shapes the site itself uses (camelCase,
//! `averageFPS`-style keys) so the output file diffs cleanly against data
//! captured from the live pages. Every sub-record of [`ProductRecord`] is
//! independently optional: pages legitimately lack whole sections.

mod reports;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use reports::{
    filter_reference_components, ComponentMeasurement, GameReport, GameTestResult, Measurement,
    NonGameReport,
};

/// Key/value specification table read from repeated label/value fragments.
pub type SpecsObject = BTreeMap<String, String>;

/// Mapping of section title to the opaque session identifiers of its charts.
pub type SessionIdMap = BTreeMap<String, Vec<String>>;

/// Outcome of waiting for a lazily rendered chart.
///
/// `DataUnavailable` is a legitimate terminal state - the page explicitly
/// says the data was not gathered - and must never be confused with
/// `TimedOut`, which is transient and worth retrying at a higher level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartLoadStatus {
    Loaded,
    DataUnavailable,
    TimedOut,
}

/// One entry on the category listing page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleLink {
    pub name: String,
    pub url: String,
}

/// The root aggregate for one article page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub name: Option<String>,
    pub author: Option<String>,
    pub tested_by: Option<String>,
    pub published: Option<String>,
    pub overview: Option<String>,
    pub good_points: Vec<String>,
    pub bad_points: Vec<String>,
    pub other_points: Vec<String>,
    /// Purchase links, label to URL.
    pub links: BTreeMap<String, String>,
    pub hardware: Option<Hardware>,
    pub features_and_software: Option<FeaturesAndSoftware>,
    pub performance: Option<Performance>,
    pub productivity_and_efficiency: Option<ProductivityAndEfficiency>,
    pub test_configuration: Option<TestConfiguration>,
}

/// Article byline metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    pub tested_by: Option<String>,
    pub published: Option<String>,
}

/// Image plus caption from a gallery slider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryImage {
    pub url: Option<String>,
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hardware {
    pub summary: Option<String>,
    pub in_the_box: Option<InTheBox>,
    pub graphics_processor: Option<GraphicsProcessor>,
    pub cores_and_clocks: Option<SpecsObject>,
    pub board_design: Option<BoardDesign>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InTheBox {
    pub images: Vec<GalleryImage>,
    #[serde(rename = "box")]
    pub box_items: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphicsProcessor {
    pub images: Vec<GalleryImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(flatten)]
    pub specs: SpecsObject,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardDesign {
    pub images: Vec<GalleryImage>,
    #[serde(flatten)]
    pub specs: SpecsObject,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturesAndSoftware {
    pub summary: Option<String>,
    pub supported_features: Option<SpecsObject>,
    pub encode_decode: Option<SpecsObject>,
    pub oem_technologies: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Performance {
    pub summary: Option<String>,
    pub gaming_performance: Option<Vec<GamingPerformanceEntry>>,
    pub ray_tracing_performance: Option<Vec<GamingPerformanceEntry>>,
}

/// One game at one resolution, reduced from the raw `gameReport` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GamingPerformanceEntry {
    pub game: String,
    /// Vertical resolution: 1080, 1440 or 2160.
    pub resolution: u32,
    pub fps_data: FpsData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FpsData {
    #[serde(rename = "averageFPS")]
    pub average_fps: f64,
    #[serde(rename = "onePercentLowFPS")]
    pub one_percent_low_fps: f64,
    #[serde(rename = "minFPS", skip_serializing_if = "Option::is_none")]
    pub min_fps: Option<f64>,
    #[serde(rename = "maxFPS", skip_serializing_if = "Option::is_none")]
    pub max_fps: Option<f64>,
    #[serde(rename = "percent99FPS", skip_serializing_if = "Option::is_none")]
    pub percent99_fps: Option<f64>,
    #[serde(rename = "percent95FPS", skip_serializing_if = "Option::is_none")]
    pub percent95_fps: Option<f64>,
    #[serde(rename = "percent5FPS", skip_serializing_if = "Option::is_none")]
    pub percent5_fps: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductivityAndEfficiency {
    pub productivity_tasks: Option<Vec<NonGameReport>>,
    pub synthetic_scores: Option<Vec<NonGameReport>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestConfiguration {
    pub summary: Option<String>,
    pub test_bench: Option<SpecsObject>,
    pub tested_settings: Option<BTreeMap<String, String>>,
}
