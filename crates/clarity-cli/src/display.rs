//! Card rendering for locations and items.
//!
//! Indices shown to the user are 1-based and always refer to the unfiltered
//! inventory, so `edit 2 3` means the same item whatever the search query.

use std::io::{self, Write};

use clarity_ai::InferenceGateway;
use clarity_core::{Item, LocationView};

use crate::session::{LabelSlot, Session};

const NAME_WIDTH: usize = 28;

/// Render the whole inventory as seen through the current search query.
pub fn render_inventory<G: InferenceGateway>(
    out: &mut impl Write,
    session: &Session<G>,
) -> io::Result<()> {
    let inventory = session.inventory();
    if inventory.is_empty() {
        writeln!(out, "Your inventory is empty")?;
        writeln!(out, "Open an image and run `analyze` to start cataloging your items.")?;
        return Ok(());
    }

    writeln!(
        out,
        "Your Inventory ({} locations, {} items)",
        inventory.len(),
        inventory.total_items()
    )?;
    if !session.query().is_empty() {
        writeln!(out, "Search: {:?}", session.query())?;
    }
    writeln!(out)?;

    let view = session.view();
    if view.is_empty() {
        writeln!(out, "No results found")?;
        writeln!(out, "Try adjusting your search term.")?;
        return Ok(());
    }

    for location in &view {
        render_card(out, location, session.label(location.index))?;
    }
    Ok(())
}

/// Render one location card.
pub fn render_card(
    out: &mut impl Write,
    location: &LocationView<'_>,
    label: Option<&LabelSlot>,
) -> io::Result<()> {
    writeln!(
        out,
        "=== #{} {} ===",
        location.index + 1,
        location.location_suggestion
    )?;
    if location.items.is_empty() {
        writeln!(out, "  (no items detected)")?;
    }
    for (index, item) in &location.items {
        render_item(out, *index, item)?;
    }
    match label {
        Some(LabelSlot::Suggested(label)) => writeln!(out, "  Suggested label: {label}")?,
        Some(LabelSlot::Failed(message)) => writeln!(out, "  {message}")?,
        _ => {}
    }
    writeln!(out)
}

fn render_item(out: &mut impl Write, index: usize, item: &Item) -> io::Result<()> {
    writeln!(
        out,
        "  {:>3}. {:<width$} x{:<5} [{}]",
        index + 1,
        item.name,
        item.quantity,
        item.category,
        width = NAME_WIDTH
    )
}

/// Render the item currently being edited.
pub fn render_edit_header(
    out: &mut impl Write,
    location: usize,
    index: usize,
    item: &Item,
) -> io::Result<()> {
    writeln!(
        out,
        "Editing item {} of location #{} (blank keeps the current value, `cancel` aborts)",
        index + 1,
        location + 1
    )?;
    render_item(out, index, item)
}

/// One-paragraph session summary.
pub fn render_status<G: InferenceGateway>(
    out: &mut impl Write,
    session: &Session<G>,
) -> io::Result<()> {
    match session.selection() {
        Some(preview) => writeln!(
            out,
            "Selected: {} ({}, {} bytes)",
            preview.path().display(),
            preview.mime_type(),
            preview.size()
        )?,
        None => writeln!(out, "Selected: none")?,
    }
    let inventory = session.inventory();
    writeln!(
        out,
        "Inventory: {} locations, {} items",
        inventory.len(),
        inventory.total_items()
    )?;
    if !session.query().is_empty() {
        writeln!(out, "Search: {:?}", session.query())?;
    }
    if let Some(error) = session.last_error() {
        writeln!(out, "Last error: {error}")?;
    }
    Ok(())
}
