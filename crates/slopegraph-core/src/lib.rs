#![forbid(unsafe_code)]

//! Cost-of-living comparison pipeline (headless).
//!
//! Three stages over an in-memory table, one pass per invocation:
//! filter the wide source table down to two cities and a validated item
//! selection, melt it into long-form observations with display names and
//! emphasis attributes, and pivot those into one comparison row per item
//! with relative variance and label positions. Rendering consumes the
//! resulting tables; it lives in `slopegraph-render`.

pub mod catalog;
pub mod compare;
pub mod dataset;
pub mod error;
pub mod geom;
pub mod reshape;
pub mod theme;

pub use catalog::{ItemCatalog, ItemSelection, SelectedItem};
pub use compare::{ComparisonRow, compare};
pub use dataset::{CityPair, Dataset, Filtered, FilteredRow, SourceRow};
pub use error::{Error, Result};
pub use reshape::{ItemObservation, melt};
pub use theme::{ChartTheme, Emphasis, Margins};

/// Both tables the rendering collaborator consumes: observations grouped by
/// item, and one comparison row per item.
#[derive(Debug, Clone)]
pub struct Comparison {
    pub observations: Vec<ItemObservation>,
    pub rows: Vec<ComparisonRow>,
}

/// Runs the full pipeline over an already-loaded dataset.
pub fn run_pipeline(
    dataset: &Dataset,
    pair: &CityPair,
    selection: &ItemSelection,
    theme: &ChartTheme,
) -> Result<Comparison> {
    let filtered = dataset.filter(pair, selection)?;
    let observations = melt(&filtered, selection, theme);
    let rows = compare(&observations, pair, theme)?;
    Ok(Comparison { observations, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    // The worked example: London vs New York restaurant prices, including
    // the $10/$10 label collision in New York and a gap on the London side.
    const CSV: &str = "\
city,country,x1,x3,x5
New York,United States,25.00,10.00,10.00
London,United Kingdom,18.00,,6.00
";

    #[test]
    fn end_to_end_london_new_york() {
        let dataset = Dataset::from_reader(CSV.as_bytes()).unwrap();
        let catalog = ItemCatalog::kaggle_2022();
        let selection = ItemSelection::new(["x1", "x3", "x5"], &catalog).unwrap();
        let pair = CityPair::london_new_york();
        let theme = ChartTheme::default();

        let comparison = run_pipeline(&dataset, &pair, &selection, &theme).unwrap();

        assert_eq!(comparison.observations.len(), 6);
        assert_eq!(comparison.rows.len(), 3);

        let meal = &comparison.rows[0];
        assert_eq!(meal.item, "Meal (Inexpensive Restaurant)");
        assert!((meal.relative_variance.unwrap() - (-0.28)).abs() < 1e-9);
        assert_eq!(meal.label_y, 25.0);
        assert_eq!(meal.color, theme.primary_color);

        let mcdonalds = &comparison.rows[1];
        assert_eq!(mcdonalds.item, "Meal (McDonalds)");
        assert_eq!(mcdonalds.price_a, None);
        assert_eq!(mcdonalds.relative_variance, None);
        assert_eq!(mcdonalds.label_y, 10.5);

        let beer = &comparison.rows[2];
        assert_eq!(beer.item, "Imported Beer");
        assert!((beer.relative_variance.unwrap() - (-0.40)).abs() < 1e-9);
        assert_eq!(beer.label_y, 9.5);
        assert_eq!(beer.color, theme.secondary_color);
    }

    #[test]
    fn collision_pair_labels_stay_apart() {
        let dataset = Dataset::from_reader(CSV.as_bytes()).unwrap();
        let catalog = ItemCatalog::kaggle_2022();
        let selection = ItemSelection::new(["x3", "x5"], &catalog).unwrap();
        let theme = ChartTheme::default();

        let comparison =
            run_pipeline(&dataset, &CityPair::london_new_york(), &selection, &theme).unwrap();

        let [mcdonalds, beer] = &comparison.rows[..] else {
            panic!("expected two rows");
        };
        assert_eq!(mcdonalds.price_b, beer.price_b);
        assert!((mcdonalds.label_y - beer.label_y).abs() >= theme.min_label_separation);
        assert_ne!(mcdonalds.label_y, mcdonalds.price_b);
        assert_ne!(beer.label_y, beer.price_b);
    }
}
