pub mod error;
pub mod filter;
pub mod inventory;
pub mod schema;

pub use error::InventoryError;
pub use filter::{LocationView, filter, filter_indexed};
pub use inventory::{Inventory, Item, Location};
pub use schema::{INVENTORY_SCHEMA_VERSION, inventory_response_schema};
