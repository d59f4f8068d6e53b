//! Response schema for the structured inventory request.
//!
//! Expressed in the inference service's OpenAPI-subset dialect (uppercase
//! type names). The shape must stay in step with [`Location`](crate::Location):
//! anything the schema accepts has to deserialize.

use serde_json::{Value, json};

/// Bumped whenever the schema's required fields or types change.
pub const INVENTORY_SCHEMA_VERSION: u32 = 1;

/// Required top-level fields of the inventory response.
const REQUIRED_LOCATION_FIELDS: &[&str] = &["location_suggestion", "items"];

/// Required fields of each item in the inventory response.
const REQUIRED_ITEM_FIELDS: &[&str] = &["name", "quantity", "category"];

/// JSON schema constraining the model's inventory output.
pub fn inventory_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "location_suggestion": {
                "type": "STRING",
                "description": "A descriptive name for the storage location shown in the image."
            },
            "items": {
                "type": "ARRAY",
                "description": "A list of all items identified in the storage location.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": {
                            "type": "STRING",
                            "description": "The specific name of the item."
                        },
                        "quantity": {
                            "type": "INTEGER",
                            "description": "The count of this specific item."
                        },
                        "category": {
                            "type": "STRING",
                            "description": "A general category for the item (e.g., Clothing, Food, Electronics, Tools)."
                        }
                    },
                    "required": REQUIRED_ITEM_FIELDS
                }
            }
        },
        "required": REQUIRED_LOCATION_FIELDS
    })
}
