//! Session controller: the single owner of application state.
//!
//! All mutations go through named transitions. Failures are converted to a
//! user-facing [`ActionError`] at this boundary and the last one is kept for
//! display; inventory state is never partially updated.

use std::path::{Path, PathBuf};

use clarity_ai::prompt::INVENTORY_INSTRUCTION;
use clarity_ai::{
    ConfigError, EncodingError, GatewayError, InferenceGateway, encode_image, mime_type_for,
};
use clarity_core::{Inventory, InventoryError, Item, Location, LocationView, filter_indexed};
use futures::future::join_all;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Please select an image first.")]
    NoSelection,
    #[error("Cannot open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not an image ({mime})", .path.display())]
    NotAnImage { path: PathBuf, mime: String },
    #[error("Configuration error: {0}")]
    Config(#[source] ConfigError),
    #[error("Failed to analyze image. {0}")]
    Encode(#[from] EncodingError),
    #[error("Failed to analyze image. {0}")]
    Analyze(#[source] GatewayError),
    #[error("Failed to generate label: {0}")]
    Label(#[source] GatewayError),
    #[error("No location #{}", .0 + 1)]
    NoLocation(usize),
    #[error(transparent)]
    Index(#[from] InventoryError),
    #[error("No item is being edited.")]
    NotEditing,
}

impl ActionError {
    /// Configuration problems are reported as such, never as inference failures.
    fn analyze(err: GatewayError) -> Self {
        match err {
            GatewayError::Config(e) => Self::Config(e),
            other => Self::Analyze(other),
        }
    }

    fn label(err: GatewayError) -> Self {
        match err {
            GatewayError::Config(e) => Self::Config(e),
            other => Self::Label(other),
        }
    }
}

/// The selected image, held until analysis succeeds or the selection changes.
///
/// Dropping the preview releases it; replacing or clearing the selection
/// drops the old one immediately.
#[derive(Debug)]
pub struct Preview {
    path: PathBuf,
    mime_type: String,
    size: u64,
}

impl Preview {
    async fn open(path: &Path) -> Result<Self, ActionError> {
        let meta = tokio::fs::metadata(path)
            .await
            .map_err(|source| ActionError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        let mime_type = mime_type_for(path);
        if !mime_type.starts_with("image/") {
            return Err(ActionError::NotAnImage {
                path: path.to_path_buf(),
                mime: mime_type,
            });
        }
        Ok(Self {
            path: path.to_path_buf(),
            mime_type,
            size: meta.len(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

impl Drop for Preview {
    fn drop(&mut self) {
        debug!(path = %self.path.display(), "released preview");
    }
}

/// Transient per-location label state. Never stored in the inventory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LabelSlot {
    #[default]
    Empty,
    Suggested(String),
    Failed(String),
}

/// Position of the item currently being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditTarget {
    pub location: usize,
    pub item: usize,
}

pub struct Session<G> {
    gateway: G,
    inventory: Inventory,
    selection: Option<Preview>,
    query: String,
    labels: Vec<LabelSlot>,
    editing: Option<EditTarget>,
    last_error: Option<String>,
}

impl<G: InferenceGateway> Session<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            inventory: Inventory::new(),
            selection: None,
            query: String::new(),
            labels: Vec::new(),
            editing: None,
            last_error: None,
        }
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn selection(&self) -> Option<&Preview> {
        self.selection.as_ref()
    }

    /// The analyze action is available only with an image selected.
    pub fn can_analyze(&self) -> bool {
        self.selection.is_some()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn editing(&self) -> Option<EditTarget> {
        self.editing
    }

    pub fn label(&self, location: usize) -> Option<&LabelSlot> {
        self.labels.get(location)
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Current filtered view, recomputed from the query on every call.
    pub fn view(&self) -> Vec<LocationView<'_>> {
        filter_indexed(&self.inventory, &self.query)
    }

    // ── Transitions ──

    /// Select an image, releasing any previous selection.
    pub async fn select_image(&mut self, path: &Path) -> Result<&Preview, ActionError> {
        self.last_error = None;
        let preview = Preview::open(path).await;
        let preview = self.record(preview)?;
        info!(path = %path.display(), size = preview.size, "selected image");
        Ok(self.selection.insert(preview))
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Encode the selection, analyze it, and append the result.
    ///
    /// Returns the index of the new location. On failure nothing is appended
    /// and the selection is kept so the user can retry.
    pub async fn analyze(&mut self) -> Result<usize, ActionError> {
        self.last_error = None;
        let result = self.run_analysis().await;
        let location = self.record(result)?;

        self.inventory.append(location);
        self.labels.push(LabelSlot::Empty);
        self.clear_selection();
        Ok(self.inventory.len() - 1)
    }

    async fn run_analysis(&self) -> Result<Location, ActionError> {
        let preview = self.selection.as_ref().ok_or(ActionError::NoSelection)?;
        self.gateway.ready().map_err(ActionError::Config)?;
        let payload = encode_image(preview.path()).await?;
        self.gateway
            .analyze_image(&payload, INVENTORY_INSTRUCTION)
            .await
            .map_err(ActionError::analyze)
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Start editing the item at `(location, item)`, returning its current value.
    pub fn begin_edit(&mut self, location: usize, item: usize) -> Result<Item, ActionError> {
        let current: Result<Item, ActionError> = match self.inventory.get(location) {
            None => Err(ActionError::NoLocation(location)),
            Some(l) => l.items.get(item).cloned().ok_or_else(|| {
                InventoryError::ItemOutOfRange {
                    location,
                    index: item,
                    len: l.items.len(),
                }
                .into()
            }),
        };
        let current = self.record(current)?;
        self.editing = Some(EditTarget { location, item });
        Ok(current)
    }

    /// Replace the item being edited and leave edit mode.
    pub fn save_edit(&mut self, new_item: Item) -> Result<(), ActionError> {
        let target = self.editing.ok_or(ActionError::NotEditing);
        let target = self.record(target)?;
        let result = self
            .inventory
            .update_item(target.location, target.item, new_item)
            .map_err(ActionError::from);
        self.record(result)?;
        self.editing = None;
        Ok(())
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Request a label for one location. The result only touches that
    /// location's label slot.
    pub async fn suggest_label(&mut self, location: usize) -> Result<String, ActionError> {
        let summaries = self
            .inventory
            .item_summaries(location)
            .ok_or(ActionError::NoLocation(location));
        let summaries = self.record(summaries)?;

        let result = self
            .gateway
            .suggest_label(&summaries)
            .await
            .map_err(ActionError::label);
        self.apply_label(location, &result);
        self.record(result)
    }

    /// Request labels for every location concurrently. Returns how many succeeded.
    pub async fn suggest_all_labels(&mut self) -> usize {
        let summaries: Vec<Vec<String>> = (0..self.inventory.len())
            .filter_map(|i| self.inventory.item_summaries(i))
            .collect();

        let gateway = &self.gateway;
        let results = join_all(summaries.iter().map(|s| gateway.suggest_label(s))).await;

        let mut succeeded = 0;
        for (location, result) in results.into_iter().enumerate() {
            let result = result.map_err(ActionError::label);
            if result.is_ok() {
                succeeded += 1;
            }
            self.apply_label(location, &result);
        }
        succeeded
    }

    /// Close a suggested label.
    pub fn dismiss_label(&mut self, location: usize) -> Result<(), ActionError> {
        let slot = self
            .labels
            .get_mut(location)
            .ok_or(ActionError::NoLocation(location))?;
        *slot = LabelSlot::Empty;
        Ok(())
    }

    fn apply_label(&mut self, location: usize, result: &Result<String, ActionError>) {
        if let Some(slot) = self.labels.get_mut(location) {
            *slot = match result {
                Ok(label) => LabelSlot::Suggested(label.clone()),
                Err(e) => LabelSlot::Failed(e.to_string()),
            };
        }
    }

    /// Remember the message of a failed action for display.
    fn record<T>(&mut self, result: Result<T, ActionError>) -> Result<T, ActionError> {
        if let Err(e) = &result {
            warn!(error = %e, "action failed");
            self.last_error = Some(e.to_string());
        }
        result
    }
}
