use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use super::product::Product;
use crate::utils::error::{AppError, Result};

/// The persisted record set: every tracked product plus the shared notification cap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Inventory {
    pub products: Vec<Product>,
    pub notified_max_counter: u32,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Inventory {
    pub fn new(products: Vec<Product>, notified_max_counter: u32) -> Self {
        Self {
            products,
            notified_max_counter,
            extra: serde_json::Map::new(),
        }
    }

    /// Read the inventory file. A missing file is reported as
    /// [`AppError::InventoryNotFound`] so callers can abort before any side effect.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::InventoryNotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let inventory: Inventory = serde_json::from_str(&data)?;
        debug!(
            "Loaded {} products from {}",
            inventory.products.len(),
            path.display()
        );
        Ok(inventory)
    }

    /// Replace the file's content with the current record set in one write.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut data = serde_json::to_string_pretty(self)?;
        data.push('\n');
        std::fs::write(path, data)?;
        debug!("Saved {} products to {}", self.products.len(), path.display());
        Ok(())
    }

    /// Products that are available and still under the notification cap.
    ///
    /// Reads the counters as they are after this pass's increments, so a product
    /// that reaches the cap on this pass is still listed once and excluded from
    /// the next pass onwards.
    pub fn pending_notifications(&self) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| p.should_notify(self.notified_max_counter))
            .collect()
    }

    pub fn available_count(&self) -> usize {
        self.products.iter().filter(|p| p.available).count()
    }
}
