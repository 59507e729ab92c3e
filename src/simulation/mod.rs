//! Simulation orchestration and control
//!
//! This module contains the kiosk orchestrator and the infrastructure both
//! engines run on: the virtual clock, the cancellable task queue,
//! notifications, the monitoring event sink, statistics, error handling and
//! logging.
//!
//! # Overview
//!
//! - **KioskSimulation**: owns the catalog, both engines and the task queue
//! - **TaskScheduler**: virtual-time queue with cancellation by handle or group
//! - **TimeManager**: the virtual clock
//! - **NotificationLog**: user-facing notifications mirrored to tracing
//! - **MonitoringService**: structured kiosk event records for the log sink
//! - **KioskStatistics**: run counters
//! - **SimulationError**: error handling for simulation operations
//!
//! # Usage Example
//!
//! ```rust
//! use kiosk_inventory_sim::catalog::reference_catalog;
//! use kiosk_inventory_sim::simulation::*;
//! use kiosk_inventory_sim::types::*;
//!
//! let config = SimulationConfig { seed: Some(7), ..Default::default() };
//! let mut sim = KioskSimulation::new(config, reference_catalog()?)?;
//!
//! sim.select_purchase_order(&PurchaseOrderId::from("PO2024001"))?;
//! sim.start_scanning()?;
//! sim.advance(chrono::Duration::seconds(30))?;
//!
//! assert!(sim.statistics().scan_batches_planned > 0);
//! sim.shutdown();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod event_sink;
pub mod logging;
pub mod notifications;
pub mod orchestrator;
pub mod scheduler;
pub mod statistics;
pub mod time_manager;

// Re-export all public types for convenience
pub use error::*;
pub use event_sink::*;
pub use logging::*;
pub use notifications::*;
pub use orchestrator::*;
pub use scheduler::*;
pub use statistics::*;
pub use time_manager::*;
