//! Wide-to-long reshaping.
//!
//! Turns the filtered wide table into one observation per (selected item,
//! retained row) pair, replacing column ids with display names and stamping
//! each observation with its emphasis attributes. Display names come from
//! the validated selection, so the mapping step cannot fail here; the id
//! whitelist was already checked against the catalog at selection time.

use crate::catalog::ItemSelection;
use crate::dataset::Filtered;
use crate::theme::ChartTheme;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemObservation {
    pub city: String,
    pub item: String,
    pub price: Option<f64>,
    pub color: String,
    pub line_width: f64,
    pub marker_size: f64,
}

/// Output order is canonical: items in selection order, rows in retained
/// (source) order within each item.
pub fn melt(
    filtered: &Filtered,
    selection: &ItemSelection,
    theme: &ChartTheme,
) -> Vec<ItemObservation> {
    let mut observations = Vec::with_capacity(filtered.rows.len() * selection.len());
    for item in selection.items() {
        let emphasis = theme.emphasis(&item.name);
        for row in &filtered.rows {
            observations.push(ItemObservation {
                city: row.city.clone(),
                item: item.name.clone(),
                price: row.prices.get(&item.id).copied().flatten(),
                color: emphasis.color.clone(),
                line_width: emphasis.line_width,
                marker_size: emphasis.marker_size,
            });
        }
    }
    tracing::debug!(observations = observations.len(), "melted filtered table");
    observations
}
