//! Error types and handling
//!
//! This module contains the error type shared by the catalog, both simulation
//! engines, the scheduler and the vision boundary.

use crate::types::{ProductId, PurchaseOrderId};
use thiserror::Error;

/// Errors that can occur during simulation
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ConfigurationError(String),

    /// Catalog data is inconsistent
    #[error("Catalog error: {0}")]
    CatalogError(String),

    /// A stock-in operation needs a selected purchase order
    #[error("No purchase order selected")]
    NoPurchaseOrderSelected,

    /// The selected purchase order has no lines to scan against
    #[error("Purchase order {0} has no items")]
    EmptyPurchaseOrder(String),

    /// The requested purchase order does not exist
    #[error("Unknown purchase order: {0}")]
    UnknownPurchaseOrder(PurchaseOrderId),

    /// The requested product does not exist
    #[error("Unknown product: {0}")]
    UnknownProduct(ProductId),

    /// Task scheduling failed
    #[error("Scheduler error: {0}")]
    SchedulerError(String),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Vision detection request failed
    #[error("Vision detection error: {0}")]
    VisionError(String),
}

impl SimulationError {
    /// Create a configuration error
    pub fn configuration_error(msg: impl Into<String>) -> Self {
        Self::ConfigurationError(msg.into())
    }

    /// Create a catalog error
    pub fn catalog_error(msg: impl Into<String>) -> Self {
        Self::CatalogError(msg.into())
    }

    /// Create a scheduler error
    pub fn scheduler_error(msg: impl Into<String>) -> Self {
        Self::SchedulerError(msg.into())
    }

    /// Create a vision error
    pub fn vision_error(msg: impl Into<String>) -> Self {
        Self::VisionError(msg.into())
    }

    /// Whether the error is a rejected user action rather than a fault
    ///
    /// Precondition failures leave all state untouched, so the caller can
    /// correct the input and try again.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            SimulationError::NoPurchaseOrderSelected
                | SimulationError::EmptyPurchaseOrder(_)
                | SimulationError::UnknownPurchaseOrder(_)
                | SimulationError::UnknownProduct(_)
        )
    }

    /// Check if this is a recoverable error
    pub fn is_recoverable(&self) -> bool {
        match self {
            SimulationError::ConfigurationError(_) => false,
            SimulationError::CatalogError(_) => false,
            SimulationError::NoPurchaseOrderSelected => true,
            SimulationError::EmptyPurchaseOrder(_) => true,
            SimulationError::UnknownPurchaseOrder(_) => true,
            SimulationError::UnknownProduct(_) => true,
            SimulationError::SchedulerError(_) => false,
            SimulationError::IoError(_) => true,
            SimulationError::SerializationError(_) => true,
            SimulationError::VisionError(_) => true,
        }
    }

    /// Get the error category
    pub fn category(&self) -> &'static str {
        match self {
            SimulationError::ConfigurationError(_) => "Configuration",
            SimulationError::CatalogError(_) => "Catalog",
            SimulationError::NoPurchaseOrderSelected
            | SimulationError::EmptyPurchaseOrder(_)
            | SimulationError::UnknownPurchaseOrder(_) => "Stock-In",
            SimulationError::UnknownProduct(_) => "Catalog",
            SimulationError::SchedulerError(_) => "Scheduler",
            SimulationError::IoError(_) => "IO",
            SimulationError::SerializationError(_) => "Serialization",
            SimulationError::VisionError(_) => "Vision",
        }
    }
}

/// Result type for simulation operations
pub type SimulationResult<T> = Result<T, SimulationError>;
