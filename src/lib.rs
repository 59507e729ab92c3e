//! Kiosk Inventory Simulator
//!
//! A headless simulation of a retail kiosk's inventory back office: vision
//! based stock-in of purchase orders with expected-versus-scanned
//! reconciliation, and simulated shelf sensors that drive low-stock and
//! misplaced-item alerts.
//!
//! # Overview
//!
//! Both engines run on a single virtual-time task queue. Nothing sleeps: the
//! orchestrator advances the clock to the next due task, so a simulated hour
//! completes instantly and, with a seed, reproducibly.
//!
//! ## Key Features
//!
//! - **Stock-In Reconciliation**: per-product expected, scanned, discrepancy and status
//! - **Pluggable Scan Sources**: randomized camera stand-in or scripted replay
//! - **Shelf Monitoring**: stock decay, misplacement, derived alert sets
//! - **Cancellable Scheduling**: stopping an engine cancels its pending work
//! - **Structured Event Log**: kiosk event records as JSON lines
//! - **Vision Boundary**: detection request/response contract with a simulated detector
//!
//! ## Quick Start
//!
//! ```rust
//! use kiosk_inventory_sim::*;
//!
//! let config = SimulationConfig { seed: Some(3), ..Default::default() };
//! let mut sim = KioskSimulation::new(config, reference_catalog()?)?;
//!
//! sim.select_purchase_order(&PurchaseOrderId::from("PO2024002"))?;
//! sim.start_scanning()?;
//! sim.advance(chrono::Duration::seconds(60))?;
//!
//! let summary = sim.finalize_shipment()?;
//! println!("{} units scanned for {}", summary.total_scanned_units, summary.po_number);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Module Organization
//!
//! - [`types`]: Core types, identifiers, and configuration
//! - [`catalog`]: Products, purchase orders, shelf layout and reference data
//! - [`stock_in`]: Scan reconciliation and the stock-in engine
//! - [`monitoring`]: Shelf monitoring and alert derivation
//! - [`simulation`]: Orchestration, scheduling, notifications, logging
//! - [`vision`]: Vision detection contract
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │   Types     │    │   Catalog   │    │   Vision    │
//! │             │    │             │    │             │
//! │ Identifiers │◄───┤ Products    │    │ Detection   │
//! │ Enums       │    │ Orders      │    │ Contract    │
//! │ Config      │    │ Shelves     │    │             │
//! └─────────────┘    └─────────────┘    └─────────────┘
//!        ▲                   ▲
//!        │                   │
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │  Stock-In   │    │ Monitoring  │    │ Simulation  │
//! │             │    │             │    │             │
//! │ Reconcile   │◄───┤ Alerts      │◄───┤ Orchestrator│
//! │ Scan Source │    │ Shelf Grid  │    │ Scheduler   │
//! └─────────────┘    └─────────────┘    └─────────────┘
//! ```
#![warn(missing_docs, missing_debug_implementations, unreachable_pub)]

// Module declarations
pub mod catalog;
pub mod monitoring;
pub mod simulation;
pub mod stock_in;
pub mod types;
pub mod vision;

// Core types and identifiers
pub use types::{
    ConfigValidationError,
    KioskId,
    NotificationSeverity,
    OutputFormat,
    // Identifiers
    ProductId,
    PurchaseOrderId,
    // Enums
    PurchaseOrderStatus,
    ScanStatus,
    SessionId,
    ShelfId,
    // Configuration
    SimulationConfig,
    StockLevel,
};

// Catalog
pub use catalog::{reference_catalog, Catalog, Product, PurchaseOrder, PurchaseOrderItem, ShelfConfig, ShelfLayout};

// Stock-in
pub use stock_in::{
    derive_status, ReconciliationTable, ReplayScanSource, ScanEvent, ScanEventSource, ShipmentSummary,
    StockInEngine, StockInScanResult,
};

// Shelf monitoring
pub use monitoring::{update_alerts, AlertSnapshot, ShelfMonitor};

// Simulation types and functionality
pub use simulation::{
    KioskSimulation, KioskStatistics, Notification, NotificationKind, SimulationError, SimulationResult,
    TaskGroup, TaskScheduler, TimeManager,
};
