//! Statistics collection and reporting
//!
//! Counters for everything the two engines and the scheduler do during a run.
//! The orchestrator is the only writer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Run-wide counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KioskStatistics {
    // Catalog
    /// Products in the catalog
    pub total_products: usize,
    /// Purchase orders available for receiving
    pub total_purchase_orders: usize,
    /// Shelves in the layout
    pub total_shelves: usize,

    // Stock-in
    /// Scan batches generated by the ticker
    pub scan_batches_planned: u64,
    /// Scan events applied to the reconciliation table
    pub scans_applied: u64,
    /// Units added by applied scans
    pub units_scanned: u64,
    /// Applied scans for products the selected order does not list
    pub unexpected_scans: u64,
    /// Deferred scans discarded because their session was over
    pub stale_scans_discarded: u64,
    /// Expiry dates assigned to reconciliation rows
    pub expiry_dates_assigned: u64,
    /// Shipments finalized
    pub shipments_finalized: u64,
    /// Finalized shipments that still had quantity discrepancies
    pub shipments_with_discrepancies: u64,
    /// Scan starts rejected for missing or empty orders
    pub rejected_scan_starts: u64,

    // Shelf monitoring
    /// Monitor ticks executed while monitoring was active
    pub monitor_ticks: u64,
    /// Stock decay events
    pub stock_decreases: u64,
    /// Units removed by stock decay
    pub units_decayed: u64,
    /// Misplacement events
    pub misplacements: u64,

    // Scheduler
    /// Pending tasks cancelled by stop, reselection or teardown
    pub tasks_cancelled: u64,
    /// Simulated milliseconds covered by the run
    pub simulated_ms: i64,
}

impl KioskStatistics {
    /// Create statistics seeded with catalog sizes
    pub fn new(total_products: usize, total_purchase_orders: usize, total_shelves: usize) -> Self {
        Self { total_products, total_purchase_orders, total_shelves, ..Default::default() }
    }

    /// Count one applied scan
    pub fn record_scan(&mut self, quantity: u32, unexpected: bool, expiry_assigned: bool) {
        self.scans_applied += 1;
        self.units_scanned += u64::from(quantity);
        if unexpected {
            self.unexpected_scans += 1;
        }
        if expiry_assigned {
            self.expiry_dates_assigned += 1;
        }
    }

    /// Count one finalized shipment
    pub fn record_finalize(&mut self, had_discrepancies: bool) {
        self.shipments_finalized += 1;
        if had_discrepancies {
            self.shipments_with_discrepancies += 1;
        }
    }

    /// Count one stock decay event
    pub fn record_stock_decrease(&mut self, units: u32) {
        self.stock_decreases += 1;
        self.units_decayed += u64::from(units);
    }

    /// Share of applied scans that hit products outside the order
    pub fn unexpected_scan_percentage(&self) -> f64 {
        if self.scans_applied == 0 {
            0.0
        } else {
            (self.unexpected_scans as f64 / self.scans_applied as f64) * 100.0
        }
    }

    /// Average units per applied scan
    pub fn average_scan_quantity(&self) -> f64 {
        if self.scans_applied == 0 {
            0.0
        } else {
            self.units_scanned as f64 / self.scans_applied as f64
        }
    }

    /// One-line summary
    pub fn summary(&self) -> String {
        format!(
            "Stock-in: {} scans, {} units ({:.1}% unexpected), {} stale discarded | Shelves: {} ticks, {} decreases, {} misplacements",
            self.scans_applied,
            self.units_scanned,
            self.unexpected_scan_percentage(),
            self.stale_scans_discarded,
            self.monitor_ticks,
            self.stock_decreases,
            self.misplacements
        )
    }

    /// Multi-line breakdown for the end-of-run report
    pub fn detailed_breakdown(&self) -> String {
        let mut out = String::new();
        out.push_str("=== Run Statistics ===\n");
        out.push_str(&format!(
            "Catalog: {} products, {} purchase orders, {} shelves\n",
            self.total_products, self.total_purchase_orders, self.total_shelves
        ));
        out.push_str(&format!("Simulated time: {:.1}s\n\n", self.simulated_ms as f64 / 1000.0));

        out.push_str("Stock-In:\n");
        out.push_str(&format!("  - Batches planned: {}\n", self.scan_batches_planned));
        out.push_str(&format!(
            "  - Scans applied: {} ({} units, {:.2} avg)\n",
            self.scans_applied,
            self.units_scanned,
            self.average_scan_quantity()
        ));
        out.push_str(&format!(
            "  - Unexpected scans: {} ({:.1}%)\n",
            self.unexpected_scans,
            self.unexpected_scan_percentage()
        ));
        out.push_str(&format!("  - Expiry dates assigned: {}\n", self.expiry_dates_assigned));
        out.push_str(&format!("  - Stale scans discarded: {}\n", self.stale_scans_discarded));
        out.push_str(&format!("  - Rejected scan starts: {}\n", self.rejected_scan_starts));
        out.push_str(&format!(
            "  - Shipments finalized: {} ({} with discrepancies)\n",
            self.shipments_finalized, self.shipments_with_discrepancies
        ));

        out.push_str("\nShelf Monitoring:\n");
        out.push_str(&format!("  - Monitor ticks: {}\n", self.monitor_ticks));
        out.push_str(&format!(
            "  - Stock decreases: {} ({} units)\n",
            self.stock_decreases, self.units_decayed
        ));
        out.push_str(&format!("  - Misplacements: {}\n", self.misplacements));

        out.push_str(&format!("\nTasks cancelled: {}\n", self.tasks_cancelled));
        out
    }
}

impl fmt::Display for KioskStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}
