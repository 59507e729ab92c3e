//! Product catalog, purchase orders and store layout
//!
//! The catalog is the fixed data both simulation engines operate over. It is
//! never grown or shrunk during a run; the shelf monitor works on its own copy
//! of the product list.
//!
//! # Usage Example
//!
//! ```rust
//! use kiosk_inventory_sim::catalog::*;
//! use kiosk_inventory_sim::types::*;
//!
//! let catalog = reference_catalog().unwrap();
//! let po = catalog.get_purchase_order(&PurchaseOrderId::from("PO2024001")).unwrap();
//! assert_eq!(po.po_number, "PO-XYZ-001");
//! assert_eq!(catalog.layout().shelf_count(), 5);
//! ```

pub mod fixtures;
pub mod product;
pub mod purchase_order;
pub mod registry;
pub mod shelf;

pub use fixtures::*;
pub use product::*;
pub use purchase_order::*;
pub use registry::*;
pub use shelf::*;
