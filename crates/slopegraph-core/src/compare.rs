//! Pivot and variance computation.
//!
//! Pivots the long observation table to exactly one row per item with one
//! price column per city, then derives the relative variance and the label
//! y position. The baseline city (city B) is load-bearing: its price drives
//! both the variance denominator and the default label position, so a
//! missing or zero baseline fails loudly. A missing A-side price is
//! representable (the source dataset has gaps) and yields a row with no
//! variance rather than an error.

use crate::dataset::CityPair;
use crate::reshape::ItemObservation;
use crate::theme::ChartTheme;
use crate::{Error, Result};
use indexmap::IndexMap;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRow {
    pub item: String,
    /// Price in city A; absent when the dataset has no value for it.
    pub price_a: Option<f64>,
    /// Price in city B, the comparison baseline.
    pub price_b: f64,
    /// `(price_a - price_b) / price_b`; positive means city A is more
    /// expensive. Absent exactly when `price_a` is.
    pub relative_variance: Option<f64>,
    /// Where the B-side value label is drawn: `price_b`, unless a collision
    /// override replaces it.
    pub label_y: f64,
    pub color: String,
}

struct Slot {
    price_a: Option<Option<f64>>,
    price_b: Option<Option<f64>>,
    color: String,
}

/// Row order is the first-seen item order of `observations`, which the
/// reshaper guarantees to be selection order.
pub fn compare(
    observations: &[ItemObservation],
    pair: &CityPair,
    theme: &ChartTheme,
) -> Result<Vec<ComparisonRow>> {
    let mut slots: IndexMap<&str, Slot> = IndexMap::new();

    for obs in observations {
        let slot = slots.entry(obs.item.as_str()).or_insert_with(|| Slot {
            price_a: None,
            price_b: None,
            color: obs.color.clone(),
        });
        let cell = if obs.city == pair.city_a {
            &mut slot.price_a
        } else if obs.city == pair.city_b {
            &mut slot.price_b
        } else {
            continue;
        };
        if cell.is_some() {
            return Err(Error::PivotCollision {
                item: obs.item.clone(),
                city: obs.city.clone(),
            });
        }
        *cell = Some(obs.price);
    }

    let mut rows = Vec::with_capacity(slots.len());
    for (item, slot) in slots {
        let price_b = slot
            .price_b
            .flatten()
            .ok_or_else(|| Error::MissingPrice {
                item: item.to_string(),
                city: pair.city_b.clone(),
            })?;
        if price_b == 0.0 {
            return Err(Error::ZeroBaseline {
                item: item.to_string(),
                city: pair.city_b.clone(),
            });
        }

        let price_a = slot.price_a.flatten();
        let relative_variance = price_a.map(|a| (a - price_b) / price_b);
        rows.push(ComparisonRow {
            label_y: theme.label_y(item, price_b),
            item: item.to_string(),
            price_a,
            price_b,
            relative_variance,
            color: slot.color,
        });
    }

    tracing::debug!(rows = rows.len(), "pivoted comparison table");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(city: &str, item: &str, price: Option<f64>) -> ItemObservation {
        ItemObservation {
            city: city.to_string(),
            item: item.to_string(),
            price,
            color: "#798286".to_string(),
            line_width: 2.0,
            marker_size: 2.0,
        }
    }

    fn pair() -> CityPair {
        CityPair::new("London", "New York")
    }

    #[test]
    fn variance_is_signed_relative_to_the_baseline() {
        let observations = vec![
            obs("London", "Cappuccino", Some(3.0)),
            obs("New York", "Cappuccino", Some(4.0)),
            obs("London", "Wine", Some(12.0)),
            obs("New York", "Wine", Some(10.0)),
        ];
        let rows = compare(&observations, &pair(), &ChartTheme::default()).unwrap();

        let cappuccino = &rows[0];
        assert!((cappuccino.relative_variance.unwrap() - (-0.25)).abs() < 1e-9);
        // London dearer than New York: positive.
        let wine = &rows[1];
        assert!((wine.relative_variance.unwrap() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn variance_round_trips_from_the_pivoted_prices() {
        let observations = vec![
            obs("London", "Coke", Some(1.8)),
            obs("New York", "Coke", Some(2.3)),
        ];
        let rows = compare(&observations, &pair(), &ChartTheme::default()).unwrap();
        let row = &rows[0];
        let expected = (row.price_a.unwrap() - row.price_b) / row.price_b;
        assert!((row.relative_variance.unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn pivot_emits_exactly_one_row_per_item() {
        let observations = vec![
            obs("London", "Coke", Some(1.8)),
            obs("New York", "Coke", Some(2.3)),
            obs("London", "Wine", Some(12.0)),
            obs("New York", "Wine", Some(10.0)),
        ];
        let rows = compare(&observations, &pair(), &ChartTheme::default()).unwrap();
        let items: Vec<&str> = rows.iter().map(|r| r.item.as_str()).collect();
        assert_eq!(items, ["Coke", "Wine"]);
    }

    #[test]
    fn duplicate_observation_for_a_city_is_a_pivot_collision() {
        let observations = vec![
            obs("London", "Coke", Some(1.8)),
            obs("London", "Coke", Some(1.9)),
            obs("New York", "Coke", Some(2.3)),
        ];
        let err = compare(&observations, &pair(), &ChartTheme::default()).unwrap_err();
        match err {
            Error::PivotCollision { item, city } => {
                assert_eq!(item, "Coke");
                assert_eq!(city, "London");
            }
            other => panic!("expected PivotCollision, got {other}"),
        }
    }

    #[test]
    fn missing_baseline_price_fails() {
        let observations = vec![
            obs("London", "Coke", Some(1.8)),
            obs("New York", "Coke", None),
        ];
        let err = compare(&observations, &pair(), &ChartTheme::default()).unwrap_err();
        match err {
            Error::MissingPrice { item, city } => {
                assert_eq!(item, "Coke");
                assert_eq!(city, "New York");
            }
            other => panic!("expected MissingPrice, got {other}"),
        }
    }

    #[test]
    fn missing_comparison_price_yields_a_row_without_variance() {
        let observations = vec![
            obs("London", "Coke", None),
            obs("New York", "Coke", Some(2.3)),
        ];
        let rows = compare(&observations, &pair(), &ChartTheme::default()).unwrap();
        assert_eq!(rows[0].price_a, None);
        assert_eq!(rows[0].relative_variance, None);
        assert_eq!(rows[0].label_y, 2.3);
    }

    #[test]
    fn zero_baseline_fails_rather_than_propagating_nan() {
        let observations = vec![
            obs("London", "Water", Some(1.0)),
            obs("New York", "Water", Some(0.0)),
        ];
        let err = compare(&observations, &pair(), &ChartTheme::default()).unwrap_err();
        match err {
            Error::ZeroBaseline { item, city } => {
                assert_eq!(item, "Water");
                assert_eq!(city, "New York");
            }
            other => panic!("expected ZeroBaseline, got {other}"),
        }
    }

    #[test]
    fn label_y_defaults_to_baseline_and_honors_overrides() {
        let observations = vec![
            obs("London", "Imported Beer", Some(6.0)),
            obs("New York", "Imported Beer", Some(10.0)),
            obs("London", "Cappuccino", Some(3.4)),
            obs("New York", "Cappuccino", Some(5.1)),
        ];
        let rows = compare(&observations, &pair(), &ChartTheme::default()).unwrap();
        assert_eq!(rows[0].label_y, 9.5);
        assert_eq!(rows[1].label_y, 5.1);
    }
}
