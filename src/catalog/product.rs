//! Product definitions
//!
//! A product is one catalog entry together with the inventory fields the shelf
//! monitor mutates (stock and observed shelf) and the flags the stock-in
//! scanner reads (SKU, expiry tracking).

use crate::types::{ProductId, ShelfId, StockLevel};
use serde::{Deserialize, Serialize};

/// A sellable product in the kiosk catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique catalog identifier
    pub id: ProductId,
    /// Display name
    pub name: String,
    /// Stock keeping unit, e.g. `FNB-DRK-005`
    pub sku: Option<String>,
    /// Category name used for shelf assignment
    pub category: String,
    /// Units on hand
    pub stock: u32,
    /// Threshold below which the product raises a low-stock alert
    pub reorder_level: Option<u32>,
    /// Shelf the product belongs on
    pub shelf_location_id: Option<ShelfId>,
    /// Shelf the product was last observed on
    pub current_shelf_location_id: Option<ShelfId>,
    /// Whether received units carry an expiry date
    pub has_expiry_date: bool,
}

impl Product {
    /// Create a product with no SKU, shelf, or reorder level
    pub fn new(id: ProductId, name: impl Into<String>, stock: u32) -> Self {
        Self {
            id,
            name: name.into(),
            sku: None,
            category: String::new(),
            stock,
            reorder_level: None,
            shelf_location_id: None,
            current_shelf_location_id: None,
            has_expiry_date: false,
        }
    }

    /// Set the SKU
    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    /// Set the category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the reorder level
    pub fn with_reorder_level(mut self, level: u32) -> Self {
        self.reorder_level = Some(level);
        self
    }

    /// Place the product on its canonical shelf (observed location included)
    pub fn with_shelf(mut self, shelf: ShelfId) -> Self {
        self.current_shelf_location_id = Some(shelf.clone());
        self.shelf_location_id = Some(shelf);
        self
    }

    /// Mark the product as expiry tracked
    pub fn with_expiry_tracking(mut self, tracked: bool) -> Self {
        self.has_expiry_date = tracked;
        self
    }

    /// Low-stock membership: a reorder level is set and stock is below it
    pub fn is_low_stock(&self) -> bool {
        matches!(self.reorder_level, Some(level) if self.stock < level)
    }

    /// Misplaced membership: both locations are known and they differ
    pub fn is_misplaced(&self) -> bool {
        match (&self.shelf_location_id, &self.current_shelf_location_id) {
            (Some(canonical), Some(current)) => canonical != current,
            _ => false,
        }
    }

    /// Classify the stock level for the shelf grid
    pub fn stock_level(&self) -> StockLevel {
        if self.stock == 0 {
            return StockLevel::Empty;
        }
        match self.reorder_level {
            Some(level) if self.stock < level => StockLevel::Low,
            // stock < 1.5 * level, kept in integers
            Some(level) if u64::from(self.stock) * 2 < u64::from(level) * 3 => StockLevel::Warning,
            _ => StockLevel::Healthy,
        }
    }

    /// Remove up to `delta` units, flooring at zero; returns the new stock
    pub fn decrease_stock(&mut self, delta: u32) -> u32 {
        self.stock = self.stock.saturating_sub(delta);
        self.stock
    }
}
