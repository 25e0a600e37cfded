//! Per-file print configuration and the in-memory selection store
//!
//! One `FileConfig` exists per user-selected file. The price is never
//! stored on the entry; it is derived from the price model on every read,
//! so a rates change can never leave a stale figure behind.

use crate::error::PrintHubError;
use crate::pricing::{self, PrintingRates};
use serde::Serialize;

/// File type tag attached to upload-flow entries.
pub const UPLOAD_FILE_TYPE: &str = "pdf";

/// Print configuration for a single selected file.
///
/// Option flags default to false and quantity to one. Quantity is kept
/// private so the "at least one copy" invariant holds from construction on.
#[derive(Debug, Clone)]
pub struct FileConfig {
    /// Raw file bytes, owned exclusively by this entry.
    pub file: Vec<u8>,
    /// Display name, mutable independently of the underlying file name.
    pub name: String,
    pub coloured: bool,
    pub duplex: bool,
    pub spiral: bool,
    pub hardbind: bool,
    quantity: u32,
    pub file_type: String,
}

impl FileConfig {
    pub fn new(file: Vec<u8>, name: impl Into<String>) -> Self {
        Self {
            file,
            name: name.into(),
            coloured: false,
            duplex: false,
            spiral: false,
            hardbind: false,
            quantity: 1,
            file_type: UPLOAD_FILE_TYPE.to_string(),
        }
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Set the copy count. Zero is rejected; there is no enforced maximum.
    pub fn set_quantity(&mut self, quantity: u32) -> Result<(), PrintHubError> {
        if quantity == 0 {
            return Err(PrintHubError::Validation(
                "Quantity must be at least 1".into(),
            ));
        }
        self.quantity = quantity;
        Ok(())
    }
}

/// Partial update applied to one configuration entry.
#[derive(Debug, Clone, Default)]
pub struct ConfigUpdate {
    pub name: Option<String>,
    pub coloured: Option<bool>,
    pub duplex: Option<bool>,
    pub spiral: Option<bool>,
    pub hardbind: Option<bool>,
    pub quantity: Option<u32>,
}

/// Snapshot of one configuration with its derived price, in the exact
/// shape the cart submission endpoint expects.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PricedConfig {
    pub name: String,
    pub coloured: bool,
    pub duplex: bool,
    pub spiral: bool,
    pub hardbind: bool,
    pub quantity: u32,
    pub price: u64,
    #[serde(rename = "fileType")]
    pub file_type: String,
}

/// Ordered list of per-file configurations backing the upload flow.
///
/// Entries are created one-to-one with selected files and destroyed when a
/// file is removed or the whole selection is cleared after upload.
#[derive(Debug, Default)]
pub struct FileConfigStore {
    entries: Vec<FileConfig>,
}

impl FileConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file to the selection, initializing a default configuration.
    /// Returns the entry index.
    pub fn add_file(&mut self, file: Vec<u8>, name: impl Into<String>) -> usize {
        self.entries.push(FileConfig::new(file, name));
        self.entries.len() - 1
    }

    pub fn update(&mut self, index: usize, update: ConfigUpdate) -> Result<(), PrintHubError> {
        let entry = self.entries.get_mut(index).ok_or_else(|| {
            PrintHubError::Validation(format!("No file at index {}", index))
        })?;

        if let Some(name) = update.name {
            entry.name = name;
        }
        if let Some(coloured) = update.coloured {
            entry.coloured = coloured;
        }
        if let Some(duplex) = update.duplex {
            entry.duplex = duplex;
        }
        if let Some(spiral) = update.spiral {
            entry.spiral = spiral;
        }
        if let Some(hardbind) = update.hardbind {
            entry.hardbind = hardbind;
        }
        if let Some(quantity) = update.quantity {
            entry.set_quantity(quantity)?;
        }

        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Option<FileConfig> {
        if index < self.entries.len() {
            Some(self.entries.remove(index))
        } else {
            None
        }
    }

    /// Drop the whole selection (upload completed or user reset).
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[FileConfig] {
        &self.entries
    }

    /// Sum of the derived prices of all entries.
    pub fn total_price(&self, rates: &PrintingRates) -> u64 {
        self.entries
            .iter()
            .map(|c| pricing::compute_price(c, rates))
            .sum()
    }

    /// Order-aligned submission snapshots with freshly computed prices.
    pub fn priced_configs(&self, rates: &PrintingRates) -> Vec<PricedConfig> {
        self.entries
            .iter()
            .map(|c| PricedConfig {
                name: c.name.clone(),
                coloured: c.coloured,
                duplex: c.duplex,
                spiral: c.spiral,
                hardbind: c.hardbind,
                quantity: c.quantity(),
                price: pricing::compute_price(c, rates),
                file_type: c.file_type.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_config_has_defaults() {
        let c = FileConfig::new(vec![1, 2, 3], "notes.pdf");
        assert!(!c.coloured);
        assert!(!c.duplex);
        assert!(!c.spiral);
        assert!(!c.hardbind);
        assert_eq!(c.quantity(), 1);
        assert_eq!(c.file_type, "pdf");
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let mut c = FileConfig::new(Vec::new(), "a.pdf");
        assert!(c.set_quantity(0).is_err());
        assert_eq!(c.quantity(), 1);
    }

    #[test]
    fn test_store_one_entry_per_file() {
        let mut store = FileConfigStore::new();
        store.add_file(vec![1], "a.pdf");
        store.add_file(vec![2], "b.pdf");
        assert_eq!(store.len(), 2);
        assert_eq!(store.entries()[1].name, "b.pdf");
    }

    #[test]
    fn test_update_applies_partial_changes() {
        let mut store = FileConfigStore::new();
        store.add_file(Vec::new(), "a.pdf");
        store
            .update(
                0,
                ConfigUpdate {
                    coloured: Some(true),
                    quantity: Some(3),
                    ..Default::default()
                },
            )
            .unwrap();
        let entry = &store.entries()[0];
        assert!(entry.coloured);
        assert!(!entry.duplex);
        assert_eq!(entry.quantity(), 3);
    }

    #[test]
    fn test_update_out_of_range_fails() {
        let mut store = FileConfigStore::new();
        assert!(store.update(0, ConfigUpdate::default()).is_err());
    }

    #[test]
    fn test_update_zero_quantity_leaves_entry_unchanged() {
        let mut store = FileConfigStore::new();
        store.add_file(Vec::new(), "a.pdf");
        let result = store.update(
            0,
            ConfigUpdate {
                quantity: Some(0),
                ..Default::default()
            },
        );
        assert!(result.is_err());
        assert_eq!(store.entries()[0].quantity(), 1);
    }

    #[test]
    fn test_total_price_sums_derived_prices() {
        let rates = PrintingRates::fallback();
        let mut store = FileConfigStore::new();
        store.add_file(Vec::new(), "a.pdf");
        store.add_file(Vec::new(), "b.pdf");
        store
            .update(
                1,
                ConfigUpdate {
                    coloured: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();
        // 2 (B&W) + 10 (color)
        assert_eq!(store.total_price(&rates), 12);
    }

    #[test]
    fn test_priced_configs_align_with_entry_order() {
        let rates = PrintingRates::fallback();
        let mut store = FileConfigStore::new();
        store.add_file(Vec::new(), "first.pdf");
        store.add_file(Vec::new(), "second.pdf");

        let priced = store.priced_configs(&rates);
        assert_eq!(priced[0].name, "first.pdf");
        assert_eq!(priced[1].name, "second.pdf");
        assert_eq!(priced[0].price, 2);
    }

    #[test]
    fn test_priced_config_serializes_wire_keys() {
        let rates = PrintingRates::fallback();
        let mut store = FileConfigStore::new();
        store.add_file(Vec::new(), "a.pdf");
        let json = serde_json::to_value(&store.priced_configs(&rates)[0]).unwrap();
        assert_eq!(json["fileType"], "pdf");
        assert_eq!(json["coloured"], false);
        assert_eq!(json["price"], 2);
    }

    #[test]
    fn test_clear_destroys_all_entries() {
        let mut store = FileConfigStore::new();
        store.add_file(Vec::new(), "a.pdf");
        store.clear();
        assert!(store.is_empty());
    }
}
