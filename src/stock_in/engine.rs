//! Stock-in reconciliation engine
//!
//! Owns the selected purchase order, the reconciliation table and the
//! scanning flag. Scan events are applied here; when they are generated and
//! when deferred ones fire is the orchestrator's business.

use crate::catalog::{Catalog, Product, PurchaseOrder};
use crate::kiosk_event;
use crate::simulation::{Notification, NotificationKind, SimulationError, SimulationResult};
use crate::stock_in::{
    PlannedScan, PurchaseOrderSelector, ReconciliationTable, ScanContext, ScanEvent, ScanEventSource,
    StockInScanResult,
};
use crate::types::{ProductId, PurchaseOrderId, SessionId, SimulationConfig};
use chrono::{Days, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Window for simulated expiry dates, in days from "today"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryPolicy {
    /// Earliest offset (inclusive)
    pub min_days: u32,
    /// Latest offset (exclusive unless equal to `min_days`)
    pub max_days: u32,
}

impl ExpiryPolicy {
    /// Policy from the configured window
    pub fn from_config(config: &SimulationConfig) -> Self {
        let (min_days, max_days) = config.expiry_window_days();
        Self { min_days, max_days }
    }

    /// Draw an expiry date
    pub fn draw<R: Rng>(&self, today: NaiveDate, rng: &mut R) -> NaiveDate {
        let days = if self.min_days < self.max_days {
            rng.gen_range(self.min_days..self.max_days)
        } else {
            self.min_days
        };
        today.checked_add_days(Days::new(u64::from(days))).unwrap_or(today)
    }
}

/// What a single applied scan did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutcome {
    /// Row after the scan
    pub row: StockInScanResult,
    /// Whether the scan created the row
    pub created: bool,
    /// Expiry date assigned by this scan, if any
    pub expiry_assigned: Option<NaiveDate>,
}

impl ScanOutcome {
    /// Whether the scanned product is not on the order
    pub fn is_unexpected(&self) -> bool {
        self.row.is_unexpected()
    }
}

/// Result of closing a stock-in session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentSummary {
    /// Order that was received
    pub purchase_order_id: PurchaseOrderId,
    /// Order number
    pub po_number: String,
    /// Supplier
    pub supplier_name: String,
    /// Rows at the time of finalizing
    pub rows: Vec<StockInScanResult>,
    /// Row count per status
    pub status_counts: BTreeMap<String, usize>,
    /// Whether any row was under or over quantity
    pub has_discrepancies: bool,
    /// Units the order expected
    pub total_expected_units: u64,
    /// Units scanned across all rows, unexpected items included
    pub total_scanned_units: u64,
}

/// Stock-in state machine
#[derive(Debug)]
pub struct StockInEngine {
    selector: PurchaseOrderSelector,
    results: ReconciliationTable,
    is_scanning: bool,
    session: Option<SessionId>,
    expiry: ExpiryPolicy,
    rng: StdRng,
    outbox: Vec<Notification>,
}

impl StockInEngine {
    /// Engine configured from the simulation config
    pub fn new(config: &SimulationConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(2)),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(ExpiryPolicy::from_config(config), rng)
    }

    /// Engine with an explicit expiry policy and random source
    pub fn with_rng(expiry: ExpiryPolicy, rng: StdRng) -> Self {
        Self {
            selector: PurchaseOrderSelector::new(),
            results: ReconciliationTable::new(),
            is_scanning: false,
            session: None,
            expiry,
            rng,
            outbox: Vec::new(),
        }
    }

    fn reject(&mut self, error: SimulationError) -> SimulationError {
        kiosk_event!(warn, "stock_in", "stock-in action rejected", reason = %error);
        self.outbox.push(Notification::warning(NotificationKind::ScanRejected, error.to_string()));
        error
    }

    /// Select a purchase order and reset the reconciliation table to its lines
    ///
    /// If scanning is active it continues against the new order under a fresh
    /// session, so batches planned for the old order become stale.
    #[instrument(skip(self, catalog), fields(po_id = %id))]
    pub fn select_purchase_order(&mut self, id: &PurchaseOrderId, catalog: &Catalog) -> SimulationResult<()> {
        let selected = self.selector.select(id, catalog).map(|po| po.po_number.clone());
        let po_number = match selected {
            Ok(number) => number,
            Err(e) => return Err(self.reject(e)),
        };
        let mut has_lines = false;
        if let Some(po) = self.selector.current() {
            self.results = ReconciliationTable::for_purchase_order(po, catalog);
            has_lines = !po.is_empty();
        }

        kiosk_event!(info, "stock_in", "purchase order selected", po_number = %po_number, rows = self.results.len());
        self.outbox.push(Notification::success(
            NotificationKind::PurchaseOrderSelected,
            format!("Purchase order {} selected", po_number),
        ));
        // an order with no lines cannot be scanned against
        if self.is_scanning {
            if has_lines {
                self.session = Some(SessionId::new());
            } else {
                self.stop_scanning();
            }
        }
        Ok(())
    }

    /// Start scanning; returns the session id
    ///
    /// Requires a selected order with at least one line. Starting while
    /// already scanning returns the running session.
    #[instrument(skip(self))]
    pub fn start_scanning(&mut self) -> SimulationResult<SessionId> {
        let po = match self.selector.current() {
            Some(po) => po,
            None => return Err(self.reject(SimulationError::NoPurchaseOrderSelected)),
        };
        if po.is_empty() {
            let number = po.po_number.clone();
            return Err(self.reject(SimulationError::EmptyPurchaseOrder(number)));
        }
        if let (true, Some(session)) = (self.is_scanning, self.session) {
            return Ok(session);
        }

        let session = SessionId::new();
        self.is_scanning = true;
        self.session = Some(session);
        kiosk_event!(info, "stock_in", "scanning started", session = %session);
        self.outbox.push(Notification::info(NotificationKind::ScanningStarted, "Scanning started"));
        Ok(session)
    }

    /// Stop scanning; returns whether scanning was active
    pub fn stop_scanning(&mut self) -> bool {
        let was_scanning = self.is_scanning;
        self.is_scanning = false;
        self.session = None;
        if was_scanning {
            kiosk_event!(info, "stock_in", "scanning stopped");
            self.outbox.push(Notification::info(NotificationKind::ScanningStopped, "Scanning stopped"));
        }
        was_scanning
    }

    /// Plan the next scan batch while scanning
    pub fn plan_scan_batch(
        &self,
        source: &mut dyn ScanEventSource,
        catalog: &Catalog,
    ) -> Option<(SessionId, Vec<PlannedScan>)> {
        let session = self.session.filter(|_| self.is_scanning)?;
        let purchase_order = self.selector.current()?;
        let ctx = ScanContext { purchase_order, results: &self.results, catalog };
        Some((session, source.next_batch(&ctx)))
    }

    /// Apply a scan to the reconciliation table
    ///
    /// Existing rows accumulate; unknown products get a new row expecting
    /// whatever the order lists for them (zero when absent). Expiry-tracked
    /// products get an expiry date on the first scan that finds none.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub fn apply_scan_event(
        &mut self,
        product: &Product,
        quantity: u32,
        today: NaiveDate,
    ) -> SimulationResult<ScanOutcome> {
        let po = match self.selector.current() {
            Some(po) => po,
            None => return Err(self.reject(SimulationError::NoPurchaseOrderSelected)),
        };

        let created = self.results.get(product.id).is_none();
        if created {
            let expected = po.expected_quantity_for(product.id).unwrap_or(0);
            self.results.push(StockInScanResult::pending(
                product.id,
                product.name.clone(),
                product.sku.clone(),
                expected,
            ));
        }

        let row = self
            .results
            .get_mut(product.id)
            .ok_or(SimulationError::UnknownProduct(product.id))?;
        row.add_scanned(quantity, product.has_expiry_date);

        let mut expiry_assigned = None;
        if product.has_expiry_date && row.simulated_expiry_date.is_none() {
            let date = self.expiry.draw(today, &mut self.rng);
            row.assign_expiry_once(date);
            expiry_assigned = Some(date);
            self.outbox.push(Notification::info(
                NotificationKind::ExpiryAssigned,
                format!("{}: expiry date {} recorded", product.name, date),
            ));
        }

        let row = row.clone();
        debug!(
            scanned = row.scanned_quantity,
            expected = row.expected_quantity,
            status = %row.status,
            "scan applied"
        );
        self.outbox.push(Notification::success(
            NotificationKind::ScanApplied,
            format!("Scanned {} x {}", quantity, product.name),
        ));
        Ok(ScanOutcome { row, created, expiry_assigned })
    }

    /// Apply a deferred scan planned under `session`
    ///
    /// Returns `Ok(None)` without touching state when scanning has stopped or
    /// the session has changed since the scan was planned.
    pub fn apply_scheduled_scan(
        &mut self,
        session: SessionId,
        event: ScanEvent,
        catalog: &Catalog,
        today: NaiveDate,
    ) -> SimulationResult<Option<ScanOutcome>> {
        if !self.is_scanning || self.session != Some(session) {
            debug!(%session, product_id = %event.product_id, "discarding stale scan");
            return Ok(None);
        }
        let product = catalog
            .get_product(event.product_id)
            .ok_or(SimulationError::UnknownProduct(event.product_id))?;
        self.apply_scan_event(product, event.quantity, today).map(Some)
    }

    /// Close the session
    ///
    /// Discrepancies produce a warning but never block. Afterwards no order is
    /// selected, the table is empty and scanning is off.
    #[instrument(skip(self))]
    pub fn finalize_shipment(&mut self) -> SimulationResult<ShipmentSummary> {
        if !self.selector.is_selected() {
            return Err(self.reject(SimulationError::NoPurchaseOrderSelected));
        }
        let has_discrepancies = self.results.has_discrepancies();
        let status_counts = self.results.status_counts();
        let total_scanned_units = self.results.total_scanned_units();

        self.is_scanning = false;
        self.session = None;
        let rows = self.results.take_rows();
        let po = self.selector.clear().ok_or(SimulationError::NoPurchaseOrderSelected)?;

        if has_discrepancies {
            kiosk_event!(warn, "stock_in", "finalizing with discrepancies", po_number = %po.po_number);
            self.outbox.push(Notification::warning(
                NotificationKind::DiscrepanciesFound,
                format!("Shipment {} has quantity discrepancies", po.po_number),
            ));
        }
        kiosk_event!(info, "stock_in", "shipment finalized", po_number = %po.po_number, rows = rows.len());
        self.outbox.push(Notification::success(
            NotificationKind::ShipmentFinalized,
            format!("Shipment for {} finalized", po.po_number),
        ));

        Ok(ShipmentSummary {
            total_expected_units: po.total_expected_units(),
            purchase_order_id: po.id,
            po_number: po.po_number,
            supplier_name: po.supplier_name,
            rows,
            status_counts,
            has_discrepancies,
            total_scanned_units,
        })
    }

    /// Selected purchase order
    pub fn current_purchase_order(&self) -> Option<&PurchaseOrder> {
        self.selector.current()
    }

    /// Reconciliation table
    pub fn results(&self) -> &ReconciliationTable {
        &self.results
    }

    /// Row for a product
    pub fn result_for(&self, product_id: ProductId) -> Option<&StockInScanResult> {
        self.results.get(product_id)
    }

    /// Whether scanning is active
    pub fn is_scanning(&self) -> bool {
        self.is_scanning
    }

    /// Current session while scanning
    pub fn session(&self) -> Option<SessionId> {
        self.session
    }

    /// Take queued notifications
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.outbox)
    }
}
