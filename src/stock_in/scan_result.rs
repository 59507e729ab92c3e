//! Reconciliation rows and the table that holds them

use crate::catalog::{Catalog, PurchaseOrder};
use crate::stock_in::derive_status;
use crate::types::{ProductId, ScanStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Expected versus scanned quantity for one product in a stock-in session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockInScanResult {
    /// Product the row tracks
    pub product_id: ProductId,
    /// Product display name
    pub product_name: String,
    /// Product SKU, when the catalog has one
    pub sku: Option<String>,
    /// Units the purchase order expects (0 for unexpected items)
    pub expected_quantity: u32,
    /// Units scanned so far; never decreases
    pub scanned_quantity: u32,
    /// `scanned_quantity - expected_quantity`
    pub discrepancy: i64,
    /// Derived status
    pub status: ScanStatus,
    /// Expiry date assigned on first scan of an expiry-tracked product
    pub simulated_expiry_date: Option<NaiveDate>,
}

impl StockInScanResult {
    /// An untouched row for a purchase order line
    pub fn pending(
        product_id: ProductId,
        product_name: impl Into<String>,
        sku: Option<String>,
        expected_quantity: u32,
    ) -> Self {
        Self {
            product_id,
            product_name: product_name.into(),
            sku,
            expected_quantity,
            scanned_quantity: 0,
            discrepancy: -i64::from(expected_quantity),
            status: ScanStatus::PendingScan,
            simulated_expiry_date: None,
        }
    }

    /// Accumulate scanned units and re-derive discrepancy and status
    pub fn add_scanned(&mut self, quantity: u32, has_expiry_date: bool) {
        self.scanned_quantity = self.scanned_quantity.saturating_add(quantity);
        self.discrepancy = i64::from(self.scanned_quantity) - i64::from(self.expected_quantity);
        self.status = derive_status(self.expected_quantity, self.scanned_quantity, has_expiry_date);
    }

    /// Set the expiry date unless one is already assigned; returns whether it was set
    pub fn assign_expiry_once(&mut self, date: NaiveDate) -> bool {
        if self.simulated_expiry_date.is_some() {
            return false;
        }
        self.simulated_expiry_date = Some(date);
        true
    }

    /// Whether more units are still expected
    pub fn is_under_scanned(&self) -> bool {
        self.scanned_quantity < self.expected_quantity
    }

    /// Whether the product was not on the purchase order
    pub fn is_unexpected(&self) -> bool {
        self.expected_quantity == 0
    }
}

/// Reconciliation rows keyed by product, in insertion order
///
/// Purchase order lines come first in order-line order; unexpected products
/// are appended as they are scanned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReconciliationTable {
    rows: Vec<StockInScanResult>,
}

impl ReconciliationTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// One pending row per purchase order line
    pub fn for_purchase_order(po: &PurchaseOrder, catalog: &Catalog) -> Self {
        let rows = po
            .items
            .iter()
            .map(|item| {
                let product = catalog.get_product(item.product_id);
                let name = product.map(|p| p.name.clone()).unwrap_or_else(|| item.product_name.clone());
                let sku = product.and_then(|p| p.sku.clone());
                StockInScanResult::pending(item.product_id, name, sku, item.expected_quantity)
            })
            .collect();
        Self { rows }
    }

    /// Row for a product
    pub fn get(&self, product_id: ProductId) -> Option<&StockInScanResult> {
        self.rows.iter().find(|row| row.product_id == product_id)
    }

    /// Mutable row for a product
    pub fn get_mut(&mut self, product_id: ProductId) -> Option<&mut StockInScanResult> {
        self.rows.iter_mut().find(|row| row.product_id == product_id)
    }

    /// Append a row; the caller guarantees the product has no row yet
    pub(crate) fn push(&mut self, row: StockInScanResult) {
        debug_assert!(self.get(row.product_id).is_none());
        self.rows.push(row);
    }

    /// All rows
    pub fn rows(&self) -> &[StockInScanResult] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Drop every row
    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Take the rows, leaving the table empty
    pub fn take_rows(&mut self) -> Vec<StockInScanResult> {
        std::mem::take(&mut self.rows)
    }

    /// Whether any row is under or over quantity
    pub fn has_discrepancies(&self) -> bool {
        self.rows.iter().any(|row| row.status.is_discrepancy())
    }

    /// Rows that are under or over quantity
    pub fn discrepancy_rows(&self) -> impl Iterator<Item = &StockInScanResult> {
        self.rows.iter().filter(|row| row.status.is_discrepancy())
    }

    /// Rows still waiting for units
    pub fn under_scanned(&self) -> impl Iterator<Item = &StockInScanResult> {
        self.rows.iter().filter(|row| row.is_under_scanned())
    }

    /// Row count per status label
    pub fn status_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for row in &self.rows {
            *counts.entry(row.status.to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Sum of scanned units over all rows
    pub fn total_scanned_units(&self) -> u64 {
        self.rows.iter().map(|row| u64::from(row.scanned_quantity)).sum()
    }
}
