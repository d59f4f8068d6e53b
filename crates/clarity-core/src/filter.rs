//! Search projection over the inventory.
//!
//! Case-insensitive substring match against item name and category. The
//! projection is recomputed from scratch on every query; inventories are
//! tens of items, so there is no index to maintain.

use crate::{Inventory, Item, Location};

/// Filter locations down to the items matching `query`.
///
/// The empty query returns the input unchanged. Otherwise each location keeps
/// only matching items, and locations left with no items are dropped.
/// Location and item order are preserved.
pub fn filter(locations: &[Location], query: &str) -> Vec<Location> {
    if query.is_empty() {
        return locations.to_vec();
    }

    let needle = query.to_lowercase();
    locations
        .iter()
        .filter_map(|location| {
            let items: Vec<Item> = location
                .items
                .iter()
                .filter(|item| item_matches(item, &needle))
                .cloned()
                .collect();
            (!items.is_empty()).then(|| Location {
                location_suggestion: location.location_suggestion.clone(),
                items,
            })
        })
        .collect()
}

/// A filtered location that remembers where it came from.
///
/// `index` and each item's index point into the unfiltered [`Inventory`], so
/// an edit made from a filtered view lands on the right entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationView<'a> {
    pub index: usize,
    pub location_suggestion: &'a str,
    pub items: Vec<(usize, &'a Item)>,
}

/// Same projection as [`filter`], borrowing from the inventory and keeping
/// original indices.
pub fn filter_indexed<'a>(inventory: &'a Inventory, query: &str) -> Vec<LocationView<'a>> {
    let needle = query.to_lowercase();
    inventory
        .iter()
        .enumerate()
        .filter_map(|(index, location)| {
            let items: Vec<(usize, &Item)> = location
                .items
                .iter()
                .enumerate()
                .filter(|(_, item)| query.is_empty() || item_matches(item, &needle))
                .collect();
            // An unfiltered view keeps empty locations, matching `filter`'s identity.
            (query.is_empty() || !items.is_empty()).then_some(LocationView {
                index,
                location_suggestion: &location.location_suggestion,
                items,
            })
        })
        .collect()
}

/// `needle` must already be lowercased.
fn item_matches(item: &Item, needle: &str) -> bool {
    item.name.to_lowercase().contains(needle) || item.category.to_lowercase().contains(needle)
}
