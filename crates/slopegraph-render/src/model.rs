//! Positioned layout types, serializable for inspection and consumed by the
//! SVG emitter.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlopePoint {
    pub x: f64,
    pub y: f64,
}

/// One item's trace: a point per city, joined left-to-right when both ends
/// are present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlopeTrace {
    pub item: String,
    pub color: String,
    #[serde(rename = "strokeWidth")]
    pub stroke_width: f64,
    #[serde(rename = "markerRadius")]
    pub marker_radius: f64,
    pub points: Vec<SlopePoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextLabel {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub fill: String,
    #[serde(rename = "fontSize")]
    pub font_size: f64,
    pub anchor: TextAnchor,
    #[serde(default)]
    pub bold: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentData {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    #[serde(rename = "strokeFill")]
    pub stroke_fill: String,
    #[serde(rename = "strokeWidth")]
    pub stroke_width: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlopegraphLayout {
    pub width: f64,
    pub height: f64,
    pub background: String,
    pub title: TextLabel,
    pub traces: Vec<SlopeTrace>,
    /// Per-item annotations: the B-side value labels and the A-side
    /// item/price/variance labels.
    #[serde(rename = "valueLabels")]
    pub value_labels: Vec<TextLabel>,
    #[serde(rename = "categoryLabels")]
    pub category_labels: Vec<TextLabel>,
    pub baseline: SegmentData,
    pub notes: Vec<TextLabel>,
    pub credit: Vec<TextLabel>,
}
