//! Core types and identifiers for the kiosk inventory simulator
//!
//! This module contains fundamental types, identifiers, and configuration structures
//! used throughout the simulation system.
//!
//! # Overview
//!
//! - **Identifiers**: catalog identifiers plus generated session and device ids
//! - **Enums**: closed enumerations for reconciliation status, severities, etc.
//! - **Configuration**: simulation configuration with validation and CLI support
//!
//! # Usage Example
//!
//! ```rust
//! use kiosk_inventory_sim::types::*;
//!
//! let product_id = ProductId::new(7);
//! let shelf = ShelfId::from("SHELF-A");
//! assert_eq!(shelf.as_str(), "SHELF-A");
//! assert!(ScanStatus::OverQuantity.is_discrepancy());
//!
//! let config = SimulationConfig {
//!     duration_secs: 120,
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! # let _ = product_id;
//! ```

pub mod config;
pub mod enums;
pub mod identifiers;

// Re-export all public types for convenience
pub use config::*;
pub use enums::*;
pub use identifiers::*;
