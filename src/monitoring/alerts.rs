//! Alert derivation over the monitored products

use crate::catalog::Product;
use crate::types::ProductId;
use serde::{Deserialize, Serialize};

/// Low-stock and misplaced sets derived from one product snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertSnapshot {
    /// Products below their reorder level
    pub low_stock: Vec<Product>,
    /// Products observed away from their canonical shelf
    pub misplaced: Vec<Product>,
}

impl AlertSnapshot {
    /// Whether neither set has members
    pub fn is_empty(&self) -> bool {
        self.low_stock.is_empty() && self.misplaced.is_empty()
    }

    /// Ids of the low-stock products
    pub fn low_stock_ids(&self) -> Vec<ProductId> {
        self.low_stock.iter().map(|product| product.id).collect()
    }

    /// Ids of the misplaced products
    pub fn misplaced_ids(&self) -> Vec<ProductId> {
        self.misplaced.iter().map(|product| product.id).collect()
    }
}

/// Recompute both alert sets from the full collection
///
/// Both sets come from the same slice, so they always describe the same
/// instant.
pub fn update_alerts(products: &[Product]) -> AlertSnapshot {
    AlertSnapshot {
        low_stock: products.iter().filter(|p| p.is_low_stock()).cloned().collect(),
        misplaced: products.iter().filter(|p| p.is_misplaced()).cloned().collect(),
    }
}
