//! Vision stock-in reconciliation
//!
//! Receiving a shipment means selecting its purchase order, scanning what
//! arrives and comparing scanned against expected quantities row by row.
//!
//! - **derive_status**: the single producer of [`ScanStatus`](crate::types::ScanStatus)
//! - **ReconciliationTable**: expected versus scanned rows for the session
//! - **PurchaseOrderSelector**: the selected order
//! - **ScanEventSource**: pluggable scan producers (random or replayed)
//! - **StockInEngine**: the state machine tying them together
//!
//! # Usage Example
//!
//! ```rust
//! use kiosk_inventory_sim::catalog::reference_catalog;
//! use kiosk_inventory_sim::stock_in::*;
//! use kiosk_inventory_sim::types::*;
//!
//! let catalog = reference_catalog()?;
//! let mut engine = StockInEngine::new(&SimulationConfig { seed: Some(1), ..Default::default() });
//! engine.select_purchase_order(&PurchaseOrderId::from("PO2024001"), &catalog)?;
//!
//! let oreo = catalog.get_product_by_sku("FNB-BSK-002").expect("fixture product");
//! let outcome = engine.apply_scan_event(oreo, 4, chrono::Utc::now().date_naive())?;
//! assert_eq!(outcome.row.status, ScanStatus::UnderQuantity);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod engine;
pub mod event_source;
pub mod scan_result;
pub mod selector;
pub mod status;

pub use engine::*;
pub use event_source::*;
pub use scan_result::*;
pub use selector::*;
pub use status::*;
