//! Inventory data model: items detected in a photographed storage location.
//!
//! Field names match the inference response schema, so a [`Location`] can be
//! deserialized straight from the model's JSON output.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::InventoryError;

/// A single detected object type with a count and category.
///
/// Duplicate names within a location are allowed and never merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub quantity: u32,
    pub category: String,
}

impl Item {
    pub fn new(name: impl Into<String>, quantity: u32, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity,
            category: category.into(),
        }
    }

    /// Summary line used in label prompts, e.g. `Tuna (x3)`.
    pub fn summary(&self) -> String {
        format!("{} (x{})", self.name, self.quantity)
    }
}

/// A photographed storage area and the items detected within it.
///
/// Items keep detection order. Locations carry no stable identifier; display
/// identity is the suggestion text plus the position in the [`Inventory`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub location_suggestion: String,
    pub items: Vec<Item>,
}

impl Location {
    pub fn new(location_suggestion: impl Into<String>, items: Vec<Item>) -> Self {
        Self {
            location_suggestion: location_suggestion.into(),
            items,
        }
    }
}

/// Session-scoped, append-only collection of locations.
///
/// Insertion order is the order of successful analyses. Items can be replaced
/// in place; nothing is ever removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Inventory {
    locations: Vec<Location>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a location to the end of the inventory. No dedup, no merging.
    pub fn append(&mut self, location: Location) {
        info!(
            location = %location.location_suggestion,
            items = location.items.len(),
            position = self.locations.len(),
            "appended location"
        );
        self.locations.push(location);
    }

    /// Replace the item at `(location_index, item_index)` in place.
    pub fn update_item(
        &mut self,
        location_index: usize,
        item_index: usize,
        new_item: Item,
    ) -> Result<(), InventoryError> {
        let len = self.locations.len();
        let location = self
            .locations
            .get_mut(location_index)
            .ok_or(InventoryError::LocationOutOfRange {
                index: location_index,
                len,
            })?;

        let items_len = location.items.len();
        let slot = location
            .items
            .get_mut(item_index)
            .ok_or(InventoryError::ItemOutOfRange {
                location: location_index,
                index: item_index,
                len: items_len,
            })?;

        *slot = new_item;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Location> {
        self.locations.get(index)
    }

    pub fn item(&self, location_index: usize, item_index: usize) -> Option<&Item> {
        self.get(location_index)?.items.get(item_index)
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.locations.iter()
    }

    /// Sum of item quantities across every location.
    pub fn total_items(&self) -> u64 {
        self.locations
            .iter()
            .flat_map(|l| l.items.iter())
            .map(|i| u64::from(i.quantity))
            .sum()
    }

    /// `name (xquantity)` summaries for one location, in item order.
    pub fn item_summaries(&self, location_index: usize) -> Option<Vec<String>> {
        self.get(location_index)
            .map(|l| l.items.iter().map(Item::summary).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pantry() -> Location {
        Location::new(
            "Pantry",
            vec![
                Item::new("Tuna", 3, "Food"),
                Item::new("Hammer", 1, "Tools"),
            ],
        )
    }

    fn garage() -> Location {
        Location::new(
            "Garage - Left Shelf",
            vec![
                Item::new("Screwdriver", 4, "Tools"),
                Item::new("Paint Can", 2, "Supplies"),
            ],
        )
    }

    #[test]
    fn starts_empty() {
        let inv = Inventory::new();
        assert!(inv.is_empty());
        assert_eq!(inv.len(), 0);
        assert_eq!(inv.total_items(), 0);
    }

    #[test]
    fn append_preserves_order() {
        let mut inv = Inventory::new();
        inv.append(pantry());
        let before = inv.locations().to_vec();

        inv.append(garage());
        assert_eq!(inv.len(), 2);
        assert_eq!(&inv.locations()[..1], &before[..]);
        assert_eq!(inv.locations().last(), Some(&garage()));
    }

    #[test]
    fn append_does_not_merge_duplicates() {
        let mut inv = Inventory::new();
        inv.append(pantry());
        inv.append(pantry());
        assert_eq!(inv.len(), 2);
        assert_eq!(inv.get(0), inv.get(1));
    }

    #[test]
    fn update_item_changes_exactly_one_item() {
        let mut inv = Inventory::new();
        inv.append(pantry());
        inv.append(garage());
        let before = inv.clone();

        let replacement = Item::new("Claw Hammer", 2, "Tools");
        inv.update_item(0, 1, replacement.clone()).unwrap();

        assert_eq!(inv.item(0, 1), Some(&replacement));
        assert_eq!(inv.item(0, 0), before.item(0, 0));
        assert_eq!(inv.get(1), before.get(1));
        assert_eq!(inv.get(0).unwrap().location_suggestion, "Pantry");
    }

    #[test]
    fn update_item_location_out_of_range() {
        let mut inv = Inventory::new();
        inv.append(pantry());
        let err = inv.update_item(3, 0, Item::new("x", 1, "y")).unwrap_err();
        assert_eq!(err, InventoryError::LocationOutOfRange { index: 3, len: 1 });
    }

    #[test]
    fn update_item_item_out_of_range() {
        let mut inv = Inventory::new();
        inv.append(pantry());
        let before = inv.clone();
        let err = inv.update_item(0, 2, Item::new("x", 1, "y")).unwrap_err();
        assert_eq!(
            err,
            InventoryError::ItemOutOfRange {
                location: 0,
                index: 2,
                len: 2
            }
        );
        assert_eq!(inv, before);
    }

    #[test]
    fn total_items_sums_quantities() {
        let mut inv = Inventory::new();
        inv.append(pantry());
        inv.append(garage());
        assert_eq!(inv.total_items(), 3 + 1 + 4 + 2);
    }

    #[test]
    fn item_summaries_format() {
        let mut inv = Inventory::new();
        inv.append(pantry());
        assert_eq!(
            inv.item_summaries(0).unwrap(),
            vec!["Tuna (x3)".to_string(), "Hammer (x1)".to_string()]
        );
        assert!(inv.item_summaries(1).is_none());
    }

    #[test]
    fn location_from_response_json() {
        let json = r#"{
            "location_suggestion": "Kitchen Pantry - Top Shelf",
            "items": [
                {"name": "Pasta", "quantity": 5, "category": "Food"},
                {"name": "Pasta", "quantity": 1, "category": "Food"}
            ]
        }"#;
        let loc: Location = serde_json::from_str(json).unwrap();
        assert_eq!(loc.location_suggestion, "Kitchen Pantry - Top Shelf");
        assert_eq!(loc.items.len(), 2);
        assert_eq!(loc.items[1], Item::new("Pasta", 1, "Food"));
    }

    #[test]
    fn location_rejects_negative_quantity() {
        let json = r#"{"location_suggestion": "Shed", "items": [{"name": "Rake", "quantity": -1, "category": "Tools"}]}"#;
        assert!(serde_json::from_str::<Location>(json).is_err());
    }

    #[test]
    fn location_requires_items() {
        let json = r#"{"location_suggestion": "Shed"}"#;
        assert!(serde_json::from_str::<Location>(json).is_err());
    }

    #[test]
    fn inventory_serializes_as_array() {
        let mut inv = Inventory::new();
        inv.append(pantry());
        let value = serde_json::to_value(&inv).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["location_suggestion"], "Pantry");
        assert_eq!(value[0]["items"][0]["quantity"], 3);
    }
}
