//! Catalog registry and lookup system
//!
//! This module contains the [`Catalog`] struct: the fixed product catalog, the
//! purchase orders the stock-in workflow can receive, and the store's shelf
//! layout, with index maps for constant-time product lookup.

use crate::catalog::{Product, PurchaseOrder, ShelfLayout};
use crate::simulation::{SimulationError, SimulationResult};
use crate::types::{ProductId, PurchaseOrderId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The immutable catalog the simulation engines operate over
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    /// All products, in catalog order
    products: Vec<Product>,
    /// All purchase orders, in catalog order
    purchase_orders: Vec<PurchaseOrder>,
    /// Shelf layout of the store
    layout: ShelfLayout,
    /// Quick lookup map from product ID to index
    #[serde(skip)]
    product_index: HashMap<ProductId, usize>,
    /// Quick lookup map from SKU to index
    #[serde(skip)]
    sku_index: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog, validating ids and order lines
    ///
    /// Product ids must be unique and every purchase order line must expect
    /// at least one unit. Order lines may reference products outside the
    /// catalog; such lines reconcile under the name printed on the order.
    pub fn new(
        products: Vec<Product>,
        purchase_orders: Vec<PurchaseOrder>,
        layout: ShelfLayout,
    ) -> SimulationResult<Self> {
        let mut seen_orders = std::collections::HashSet::new();
        for po in &purchase_orders {
            if !seen_orders.insert(po.id.clone()) {
                return Err(SimulationError::catalog_error(format!(
                    "duplicate purchase order id {}",
                    po.id
                )));
            }
            if let Some(item) = po.items.iter().find(|item| item.expected_quantity == 0) {
                return Err(SimulationError::catalog_error(format!(
                    "purchase order {} expects zero units of product {}",
                    po.po_number, item.product_id
                )));
            }
        }

        let mut catalog = Self {
            products,
            purchase_orders,
            layout,
            product_index: HashMap::new(),
            sku_index: HashMap::new(),
        };
        catalog.rebuild_indices()?;
        Ok(catalog)
    }

    /// Rebuild the internal indices (call after deserializing)
    pub fn rebuild_indices(&mut self) -> SimulationResult<()> {
        self.product_index.clear();
        self.sku_index.clear();

        for (idx, product) in self.products.iter().enumerate() {
            if self.product_index.insert(product.id, idx).is_some() {
                return Err(SimulationError::catalog_error(format!(
                    "duplicate product id {}",
                    product.id
                )));
            }
            if let Some(sku) = &product.sku {
                self.sku_index.insert(sku.clone(), idx);
            }
        }
        Ok(())
    }

    /// Get a product by ID
    pub fn get_product(&self, product_id: ProductId) -> Option<&Product> {
        self.product_index.get(&product_id).and_then(|&idx| self.products.get(idx))
    }

    /// Get a product by SKU
    pub fn get_product_by_sku(&self, sku: &str) -> Option<&Product> {
        self.sku_index.get(sku).and_then(|&idx| self.products.get(idx))
    }

    /// Get a purchase order by ID
    pub fn get_purchase_order(&self, id: &PurchaseOrderId) -> Option<&PurchaseOrder> {
        self.purchase_orders.iter().find(|po| &po.id == id)
    }

    /// All products
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// All purchase orders
    pub fn purchase_orders(&self) -> &[PurchaseOrder] {
        &self.purchase_orders
    }

    /// The shelf layout
    pub fn layout(&self) -> &ShelfLayout {
        &self.layout
    }

    /// Number of products
    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog has no products
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
