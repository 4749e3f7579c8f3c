//! Item catalog: the fixed mapping from the dataset's `x`-column identifiers
//! to human-readable item names.
//!
//! The source data contract (the Kaggle "Cost of Living" export) names its
//! price columns `x1..x55`. The catalog is constructed once and item
//! selections are validated against it up front, so later display-name
//! lookups are total.

use crate::{Error, Result};
use indexmap::IndexMap;

#[derive(Debug, Clone)]
pub struct ItemCatalog {
    names: IndexMap<String, String>,
}

impl ItemCatalog {
    /// The documented column mapping for the 2022 Kaggle cost-of-living
    /// export. The two supermarket beer columns share their restaurant
    /// counterparts' names upstream; they are disambiguated here so a
    /// selection containing both sides stays pivotable.
    pub fn kaggle_2022() -> Self {
        let entries: &[(&str, &str)] = &[
            // Restaurants
            ("x1", "Meal (Inexpensive Restaurant)"),
            ("x3", "Meal (McDonalds)"),
            ("x4", "Domestic Beer"),
            ("x5", "Imported Beer"),
            ("x6", "Cappuccino"),
            ("x7", "Coke"),
            // Supermarket
            ("x9", "Milk"),
            ("x10", "Bread"),
            ("x11", "Rice"),
            ("x13", "Cheese"),
            ("x14", "Chicken Fillets"),
            ("x15", "Beef"),
            ("x16", "Apples"),
            ("x20", "Potatoes"),
            ("x23", "Water"),
            ("x24", "Wine"),
            ("x25", "Domestic Beer (Supermarket)"),
            ("x26", "Imported Beer (Supermarket)"),
            // Household
            ("x36", "Bills"),
            ("x38", "Internet"),
            ("x39", "Gym"),
            ("x40", "Tennis Court Rental"),
            ("x41", "Cinema"),
            // Clothing
            ("x44", "Jeans"),
            ("x45", "Dress"),
            ("x46", "Nike Trainers"),
            ("x47", "Leather Shoes"),
            // Rent
            ("x48", "Apartment (1 bed) City Centre"),
            ("x49", "Apartment (1 bed) Outside City Centre"),
            ("x50", "Apartment (3 bed) City Centre"),
            ("x51", "Apartment (3 bed) Outside City Centre"),
        ];

        let names = entries
            .iter()
            .map(|(id, name)| (id.to_string(), name.to_string()))
            .collect();
        Self { names }
    }

    pub fn display_name(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectedItem {
    pub id: String,
    pub name: String,
}

/// An ordered, validated set of item columns to compare.
///
/// Construction resolves every id against the catalog, so a selection that
/// exists cannot fail a display-name lookup later. Selection order is the
/// canonical item order for every downstream table.
#[derive(Debug, Clone)]
pub struct ItemSelection {
    items: Vec<SelectedItem>,
}

impl ItemSelection {
    pub fn new<I, S>(ids: I, catalog: &ItemCatalog) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut items = Vec::new();
        for id in ids {
            let id = id.as_ref();
            let Some(name) = catalog.display_name(id) else {
                return Err(Error::UnknownItem { id: id.to_string() });
            };
            items.push(SelectedItem {
                id: id.to_string(),
                name: name.to_string(),
            });
        }
        Ok(Self { items })
    }

    /// The restaurant-section basket used by the default comparison.
    pub fn restaurant_basket(catalog: &ItemCatalog) -> Result<Self> {
        Self::new(["x1", "x3", "x4", "x5", "x6", "x7"], catalog)
    }

    pub fn items(&self) -> &[SelectedItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_maps_restaurant_columns() {
        let catalog = ItemCatalog::kaggle_2022();
        assert_eq!(
            catalog.display_name("x1"),
            Some("Meal (Inexpensive Restaurant)")
        );
        assert_eq!(catalog.display_name("x5"), Some("Imported Beer"));
        assert!(catalog.display_name("x2").is_none());
    }

    #[test]
    fn selection_preserves_requested_order() {
        let catalog = ItemCatalog::kaggle_2022();
        let selection = ItemSelection::new(["x5", "x1"], &catalog).unwrap();
        let names: Vec<&str> = selection.items().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Imported Beer", "Meal (Inexpensive Restaurant)"]);
    }

    #[test]
    fn selection_rejects_unmapped_id() {
        let catalog = ItemCatalog::kaggle_2022();
        let err = ItemSelection::new(["x1", "x999"], &catalog).unwrap_err();
        match err {
            Error::UnknownItem { id } => assert_eq!(id, "x999"),
            other => panic!("expected UnknownItem, got {other}"),
        }
    }

    #[test]
    fn supermarket_beer_names_do_not_collide_with_restaurant_names() {
        let catalog = ItemCatalog::kaggle_2022();
        assert_ne!(catalog.display_name("x4"), catalog.display_name("x25"));
        assert_ne!(catalog.display_name("x5"), catalog.display_name("x26"));
    }
}
