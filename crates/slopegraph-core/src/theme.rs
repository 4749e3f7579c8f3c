//! Chart theme: the immutable styling configuration handed to the renderer.
//!
//! Everything the chart hard-codes visually lives here: canvas geometry,
//! colors, font sizes, the emphasis set, and the static label-position
//! overrides for known collision pairs. `ChartTheme::default()` reproduces
//! the shipped London/New York restaurant chart; JSON overrides deep-merge
//! over the default so a caller only states what differs.

use crate::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        // The wide right margin holds the item annotations and commentary.
        Self {
            top: 30.0,
            right: 400.0,
            bottom: 90.0,
            left: 40.0,
        }
    }
}

/// Display attributes derived from an item's membership in the emphasis set.
#[derive(Debug, Clone, PartialEq)]
pub struct Emphasis {
    pub color: String,
    pub line_width: f64,
    pub marker_size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartTheme {
    pub width: f64,
    pub height: f64,
    pub margin: Margins,
    pub line_color: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub font_color: String,
    pub font_size: f64,
    pub title_color: String,
    pub title_size: f64,
    pub background_color: String,
    pub line_width: f64,
    pub emphasis_line_width: f64,
    pub marker_size: f64,
    pub emphasis_marker_size: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub title: String,
    pub created_by: String,
    pub data_source: String,
    /// Item receiving the primary highlight.
    pub primary_item: String,
    /// Item receiving the secondary highlight.
    pub secondary_item: String,
    /// Static collision overrides: item name -> label y position, replacing
    /// the default (the baseline city's price) where two near-equal prices
    /// would overlap.
    pub label_overrides: IndexMap<String, f64>,
    /// Minimum vertical separation the overrides are expected to provide.
    pub min_label_separation: f64,
}

impl Default for ChartTheme {
    fn default() -> Self {
        let mut label_overrides = IndexMap::new();
        // McDonalds and an imported beer both cost $10 in New York; nudge
        // the value labels apart so they stay readable.
        label_overrides.insert("Imported Beer".to_string(), 9.5);
        label_overrides.insert("Meal (McDonalds)".to_string(), 10.5);

        Self {
            width: 1280.0,
            height: 720.0,
            margin: Margins::default(),
            line_color: "#798286".to_string(),
            primary_color: "#076b78".to_string(),
            secondary_color: "#0cbdd4".to_string(),
            font_color: "#6d7578".to_string(),
            font_size: 18.0,
            title_color: "#303436".to_string(),
            title_size: 22.0,
            background_color: "#c9cdcf".to_string(),
            line_width: 2.0,
            emphasis_line_width: 4.0,
            marker_size: 2.0,
            emphasis_marker_size: 12.0,
            y_min: 0.0,
            y_max: 30.0,
            title: "Restaurant Prices are Cheaper in London than New York Across All Items"
                .to_string(),
            created_by: "Tom Price".to_string(),
            data_source: "\"Cost of Living\" dataset on Kaggle".to_string(),
            primary_item: "Meal (Inexpensive Restaurant)".to_string(),
            secondary_item: "Imported Beer".to_string(),
            label_overrides,
            min_label_separation: 1.0,
        }
    }
}

impl ChartTheme {
    /// Pure classification: same item name, same attributes, always.
    pub fn emphasis(&self, item: &str) -> Emphasis {
        let color = if item == self.primary_item {
            &self.primary_color
        } else if item == self.secondary_item {
            &self.secondary_color
        } else {
            &self.line_color
        };
        let emphasized = item == self.primary_item || item == self.secondary_item;
        Emphasis {
            color: color.clone(),
            line_width: if emphasized {
                self.emphasis_line_width
            } else {
                self.line_width
            },
            marker_size: if emphasized {
                self.emphasis_marker_size
            } else {
                self.marker_size
            },
        }
    }

    /// Label y position for an item: the override if one is configured,
    /// otherwise the baseline price.
    pub fn label_y(&self, item: &str, baseline: f64) -> f64 {
        self.label_overrides.get(item).copied().unwrap_or(baseline)
    }

    /// Deep-merges a JSON override object over this theme and returns the
    /// merged theme. Unknown keys are ignored by deserialization; partial
    /// objects override only the fields they name.
    pub fn merged(&self, overrides: &Value) -> Result<Self> {
        let mut base = serde_json::to_value(self)?;
        deep_merge_value(&mut base, overrides);
        Ok(serde_json::from_value(base)?)
    }
}

fn deep_merge_value(base: &mut Value, incoming: &Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(in_map)) => {
            for (key, in_value) in in_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge_value(base_value, in_value),
                    None => {
                        base_map.insert(key.clone(), in_value.clone());
                    }
                }
            }
        }
        (base_slot, in_value) => {
            *base_slot = in_value.clone();
        }
    }
}
