//! Purchase order selection

use crate::catalog::{Catalog, PurchaseOrder};
use crate::simulation::{SimulationError, SimulationResult};
use crate::types::PurchaseOrderId;
use tracing::debug;

/// Holds the selected purchase order id and its resolved record
#[derive(Debug, Clone, Default)]
pub struct PurchaseOrderSelector {
    current: Option<PurchaseOrder>,
}

impl PurchaseOrderSelector {
    /// Create a selector with nothing selected
    pub fn new() -> Self {
        Self::default()
    }

    /// Select an order by id
    ///
    /// An unknown id is rejected and the previous selection is kept.
    pub fn select(&mut self, id: &PurchaseOrderId, catalog: &Catalog) -> SimulationResult<&PurchaseOrder> {
        let po = catalog
            .get_purchase_order(id)
            .ok_or_else(|| SimulationError::UnknownPurchaseOrder(id.clone()))?;
        debug!(po_id = %id, po_number = %po.po_number, "purchase order selected");
        Ok(self.current.insert(po.clone()))
    }

    /// Clear the selection
    pub fn clear(&mut self) -> Option<PurchaseOrder> {
        self.current.take()
    }

    /// Selected order
    pub fn current(&self) -> Option<&PurchaseOrder> {
        self.current.as_ref()
    }

    /// Selected order id
    pub fn selected_id(&self) -> Option<&PurchaseOrderId> {
        self.current.as_ref().map(|po| &po.id)
    }

    /// Whether an order is selected
    pub fn is_selected(&self) -> bool {
        self.current.is_some()
    }
}
