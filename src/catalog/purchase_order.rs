//! Purchase order definitions
//!
//! Purchase orders are immutable once loaded; the stock-in engine only reads
//! expected quantities from them.

use crate::types::{ProductId, PurchaseOrderId, PurchaseOrderStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One line of a purchase order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderItem {
    /// Ordered product
    pub product_id: ProductId,
    /// Product name as printed on the order
    pub product_name: String,
    /// Units the supplier is expected to deliver (> 0)
    pub expected_quantity: u32,
}

impl PurchaseOrderItem {
    /// Create an order line
    pub fn new(product_id: ProductId, product_name: impl Into<String>, expected_quantity: u32) -> Self {
        Self { product_id, product_name: product_name.into(), expected_quantity }
    }
}

/// A request to a supplier enumerating expected products and quantities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrder {
    /// Internal identifier, e.g. `PO2024001`
    pub id: PurchaseOrderId,
    /// Number printed on the order, e.g. `PO-XYZ-001`
    pub po_number: String,
    /// Supplier the order was placed with
    pub supplier_name: String,
    /// Date the order was placed
    pub order_date: NaiveDate,
    /// Lifecycle status
    pub status: PurchaseOrderStatus,
    /// Ordered lines, in order
    pub items: Vec<PurchaseOrderItem>,
}

impl PurchaseOrder {
    /// Expected quantity for a product, `None` when the order does not list it
    pub fn expected_quantity_for(&self, product_id: ProductId) -> Option<u32> {
        self.items
            .iter()
            .find(|item| item.product_id == product_id)
            .map(|item| item.expected_quantity)
    }

    /// Whether the order lists the product
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.items.iter().any(|item| item.product_id == product_id)
    }

    /// Whether the order has no lines
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of expected units over all lines
    pub fn total_expected_units(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.expected_quantity)).sum()
    }
}
