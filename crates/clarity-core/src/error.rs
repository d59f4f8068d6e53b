use thiserror::Error;

/// Index errors raised by [`Inventory::update_item`](crate::Inventory::update_item).
///
/// These indicate a caller bug, never a user-facing condition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InventoryError {
    #[error("location index {index} out of range (inventory has {len} locations)")]
    LocationOutOfRange { index: usize, len: usize },

    #[error("item index {index} out of range (location {location} has {len} items)")]
    ItemOutOfRange {
        location: usize,
        index: usize,
        len: usize,
    },
}
