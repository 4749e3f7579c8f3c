//! Dataset loading and filtering.
//!
//! The source table is a wide CSV: identifier columns (`city`, `country`)
//! followed by one numeric price column per item (`x1..xN`). Cells that are
//! empty or not parseable as numbers are treated as missing prices; presence
//! of the identifier columns is the only schema check applied at load time.

use crate::catalog::ItemSelection;
use crate::{Error, Result};
use indexmap::IndexMap;
use std::io::Read;
use std::path::Path;

/// The two cities under comparison. City A is the annotated side of the
/// chart; city B is the baseline for variance and label positions.
#[derive(Debug, Clone)]
pub struct CityPair {
    pub city_a: String,
    pub city_b: String,
    countries: Vec<String>,
}

impl CityPair {
    pub fn new(city_a: impl Into<String>, city_b: impl Into<String>) -> Self {
        Self {
            city_a: city_a.into(),
            city_b: city_b.into(),
            countries: Vec::new(),
        }
    }

    /// Restricts matching rows to the given countries. City names are not
    /// globally unique (London, Ontario), so the default comparison pins
    /// countries too.
    pub fn with_countries<I, S>(mut self, countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.countries = countries.into_iter().map(Into::into).collect();
        self
    }

    /// The comparison the default chart ships with.
    pub fn london_new_york() -> Self {
        Self::new("London", "New York").with_countries(["United Kingdom", "United States"])
    }

    pub fn cities(&self) -> [&str; 2] {
        [&self.city_a, &self.city_b]
    }

    pub(crate) fn matches(&self, city: &str, country: &str) -> bool {
        if city != self.city_a && city != self.city_b {
            return false;
        }
        self.countries.is_empty() || self.countries.iter().any(|c| c == country)
    }
}

#[derive(Debug, Clone)]
pub struct SourceRow {
    pub city: String,
    pub country: String,
    prices: Vec<Option<f64>>,
}

#[derive(Debug, Clone)]
pub struct Dataset {
    item_columns: Vec<String>,
    rows: Vec<SourceRow>,
}

#[derive(Debug, Clone)]
pub struct FilteredRow {
    pub city: String,
    pub country: String,
    /// Selected item id -> price, in selection order.
    pub prices: IndexMap<String, Option<f64>>,
}

#[derive(Debug, Clone)]
pub struct Filtered {
    pub rows: Vec<FilteredRow>,
}

fn parse_price(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    cell.parse::<f64>().ok()
}

impl Dataset {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let headers = csv.headers()?.clone();
        let position = |name: &str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| Error::SchemaMismatch {
                    column: name.to_string(),
                })
        };
        let city_idx = position("city")?;
        let country_idx = position("country")?;

        let mut item_columns = Vec::new();
        let mut item_indices = Vec::new();
        for (idx, header) in headers.iter().enumerate() {
            if idx == city_idx || idx == country_idx {
                continue;
            }
            item_columns.push(header.trim().to_string());
            item_indices.push(idx);
        }

        let mut rows = Vec::new();
        for record in csv.records() {
            let record = record?;
            let prices = item_indices
                .iter()
                .map(|&idx| record.get(idx).and_then(parse_price))
                .collect();
            rows.push(SourceRow {
                city: record.get(city_idx).unwrap_or("").trim().to_string(),
                country: record.get(country_idx).unwrap_or("").trim().to_string(),
                prices,
            });
        }

        tracing::debug!(
            rows = rows.len(),
            item_columns = item_columns.len(),
            "loaded dataset"
        );
        Ok(Self { item_columns, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Retains the pair's rows and the selection's columns.
    ///
    /// Selected ids are resolved against the header up front; a selection
    /// that names a column the table does not have fails before any row
    /// work. A pair that matches no rows yields an empty result rather than
    /// an error.
    pub fn filter(&self, pair: &CityPair, selection: &ItemSelection) -> Result<Filtered> {
        let mut indices = Vec::with_capacity(selection.len());
        for item in selection.items() {
            let Some(pos) = self.item_columns.iter().position(|c| *c == item.id) else {
                return Err(Error::SchemaMismatch {
                    column: item.id.clone(),
                });
            };
            indices.push(pos);
        }

        let mut rows = Vec::new();
        for row in &self.rows {
            if !pair.matches(&row.city, &row.country) {
                continue;
            }
            let mut prices = IndexMap::with_capacity(indices.len());
            for (item, &pos) in selection.items().iter().zip(&indices) {
                prices.insert(item.id.clone(), row.prices[pos]);
            }
            rows.push(FilteredRow {
                city: row.city.clone(),
                country: row.country.clone(),
                prices,
            });
        }

        tracing::debug!(retained = rows.len(), "filtered dataset");
        Ok(Filtered { rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ItemCatalog;

    const CSV: &str = "\
city,country,x1,x3,x5
New York,United States,25.00,10.00,10.00
London,United Kingdom,18.00,8.50,6.00
London,Canada,14.00,9.00,5.00
Paris,France,16.00,9.50,6.50
Oslo,Norway,,12.00,not-a-number
";

    fn dataset() -> Dataset {
        Dataset::from_reader(CSV.as_bytes()).unwrap()
    }

    fn selection(ids: &[&str]) -> ItemSelection {
        ItemSelection::new(ids, &ItemCatalog::kaggle_2022()).unwrap()
    }

    #[test]
    fn filter_retains_exactly_the_pair_rows_in_source_order() {
        let pair = CityPair::london_new_york();
        assert_eq!(dataset().len(), 5);
        let filtered = dataset().filter(&pair, &selection(&["x1", "x5"])).unwrap();

        let cities: Vec<&str> = filtered.rows.iter().map(|r| r.city.as_str()).collect();
        assert_eq!(cities, ["New York", "London"]);
    }

    #[test]
    fn filter_applies_country_whitelist() {
        let pair = CityPair::london_new_york();
        let filtered = dataset().filter(&pair, &selection(&["x1"])).unwrap();
        assert!(
            filtered
                .rows
                .iter()
                .all(|r| r.country != "Canada"),
            "London, Canada must be excluded by the country whitelist"
        );
    }

    #[test]
    fn filter_keeps_only_selected_columns_in_selection_order() {
        let pair = CityPair::london_new_york();
        let filtered = dataset().filter(&pair, &selection(&["x5", "x1"])).unwrap();
        let keys: Vec<&str> = filtered.rows[0].prices.keys().map(String::as_str).collect();
        assert_eq!(keys, ["x5", "x1"]);
    }

    #[test]
    fn filter_with_unmatched_pair_is_silently_empty() {
        let pair = CityPair::new("Atlantis", "El Dorado");
        let filtered = dataset().filter(&pair, &selection(&["x1"])).unwrap();
        assert!(filtered.rows.is_empty());
    }

    #[test]
    fn filter_rejects_selection_missing_from_header() {
        let pair = CityPair::london_new_york();
        // x4 is in the catalog but not in this table's header.
        let err = dataset().filter(&pair, &selection(&["x4"])).unwrap_err();
        match err {
            Error::SchemaMismatch { column } => assert_eq!(column, "x4"),
            other => panic!("expected SchemaMismatch, got {other}"),
        }
    }

    #[test]
    fn missing_identifier_column_fails_at_load() {
        let err = Dataset::from_reader("town,x1\nLondon,1.0\n".as_bytes()).unwrap_err();
        match err {
            Error::SchemaMismatch { column } => assert_eq!(column, "city"),
            other => panic!("expected SchemaMismatch, got {other}"),
        }
    }

    #[test]
    fn empty_and_unparseable_cells_are_missing_prices() {
        let pair = CityPair::new("Oslo", "Oslo").with_countries(["Norway"]);
        let filtered = dataset().filter(&pair, &selection(&["x1", "x3", "x5"])).unwrap();
        let row = &filtered.rows[0];
        assert_eq!(row.prices["x1"], None);
        assert_eq!(row.prices["x3"], Some(12.00));
        assert_eq!(row.prices["x5"], None);
    }
}
