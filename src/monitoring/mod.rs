//! Shelf monitoring
//!
//! Simulated shelf sensors decrease stock and move products between shelves;
//! low-stock and misplaced-item alerts are derived from the product
//! collection after every change.
//!
//! # Usage Example
//!
//! ```rust
//! use kiosk_inventory_sim::catalog::reference_catalog;
//! use kiosk_inventory_sim::monitoring::*;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let catalog = reference_catalog()?;
//! let mut monitor = ShelfMonitor::new(&catalog, MonitorSettings::default());
//! monitor.toggle_monitoring();
//!
//! let report = monitor.tick(&mut StdRng::seed_from_u64(42));
//! assert!(report.active);
//! assert_eq!(monitor.alerts(), &update_alerts(monitor.products()));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod alerts;
pub mod engine;

pub use alerts::*;
pub use engine::*;
