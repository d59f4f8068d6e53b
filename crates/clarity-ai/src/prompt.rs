//! Prompt templates and response post-processing.

use tracing::warn;

/// Instruction sent alongside the image for the structured inventory request.
pub const INVENTORY_INSTRUCTION: &str = "\
Analyze this image of a storage space. Identify every item, its quantity, and assign it a \
category (e.g., Clothing, Food, Electronics, Tools, Office Supplies, etc.).
Also, suggest a descriptive name for this storage location (e.g., \"Kitchen Pantry - Top Shelf\", \
\"Office Drawer - Left\").
Return the response as a single JSON object.";

/// Word limit requested of the model for bin labels. Not enforced client-side.
pub const LABEL_MAX_WORDS: usize = 4;

/// Build the label-suggestion prompt from `name (xquantity)` summaries.
pub fn label_prompt(item_summaries: &[String]) -> String {
    format!(
        "Based on this list of items: {items}. Suggest a short, clear, and concise label for a \
         storage bin containing them. The label should be no more than {max} words.",
        items = item_summaries.join(", "),
        max = LABEL_MAX_WORDS,
    )
}

/// Strip every double quote from a label response and trim surrounding whitespace.
///
/// Over-long labels are kept as returned; only a warning is logged.
pub fn clean_label(raw: &str) -> String {
    let label = raw.replace('"', "").trim().to_string();
    let words = label.split_whitespace().count();
    if words > LABEL_MAX_WORDS {
        warn!(words, label = %label, "suggested label exceeds requested word limit");
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_prompt_joins_summaries() {
        let prompt = label_prompt(&["Tuna (x3)".into(), "Hammer (x1)".into()]);
        assert!(prompt.starts_with("Based on this list of items: Tuna (x3), Hammer (x1). "));
        assert!(prompt.ends_with("no more than 4 words."));
    }

    #[test]
    fn label_prompt_with_no_items() {
        let prompt = label_prompt(&[]);
        assert!(prompt.starts_with("Based on this list of items: . "));
    }

    #[test]
    fn clean_label_strips_quotes() {
        assert_eq!(clean_label("\"Pantry Staples\""), "Pantry Staples");
        assert_eq!(clean_label("Dad's \"Good\" Tools"), "Dad's Good Tools");
    }

    #[test]
    fn clean_label_trims_whitespace() {
        assert_eq!(clean_label("  Camping Gear\n"), "Camping Gear");
    }

    #[test]
    fn clean_label_keeps_long_labels() {
        let long = "Assorted Kitchen and Garage Odds and Ends";
        assert_eq!(clean_label(long), long);
    }

    #[test]
    fn instruction_asks_for_json() {
        assert!(INVENTORY_INSTRUCTION.contains("single JSON object"));
        assert!(INVENTORY_INSTRUCTION.contains("quantity"));
    }
}
