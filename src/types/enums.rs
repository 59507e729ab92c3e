//! Enumeration types for the kiosk inventory simulator
//!
//! This module contains the closed enumerations used throughout the simulator:
//! reconciliation statuses, purchase order lifecycle, notification severities,
//! shelf stock levels, and output formats.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status of one reconciliation row in a stock-in session
///
/// Every status except [`ScanStatus::PendingScan`] is produced by
/// [`derive_status`](crate::stock_in::derive_status).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScanStatus {
    /// Expected by the purchase order but not scanned yet
    #[serde(rename = "Pending Scan")]
    PendingScan,
    /// Fewer units scanned than expected
    #[serde(rename = "Under Quantity")]
    UnderQuantity,
    /// Scanned quantity matches the purchase order
    #[serde(rename = "OK")]
    Ok,
    /// Scanned quantity matches and the product carries an expiry date
    #[serde(rename = "OK with Expiry")]
    OkWithExpiry,
    /// More units scanned than expected
    #[serde(rename = "Over Quantity")]
    OverQuantity,
    /// Product scanned that the purchase order does not list
    #[serde(rename = "Unexpected Item")]
    UnexpectedItem,
}

impl ScanStatus {
    /// Whether the status counts as a quantity discrepancy at finalize time
    pub fn is_discrepancy(&self) -> bool {
        matches!(self, ScanStatus::UnderQuantity | ScanStatus::OverQuantity)
    }

    /// Whether the status is one of the two matching outcomes
    pub fn is_ok(&self) -> bool {
        matches!(self, ScanStatus::Ok | ScanStatus::OkWithExpiry)
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanStatus::PendingScan => write!(f, "Pending Scan"),
            ScanStatus::UnderQuantity => write!(f, "Under Quantity"),
            ScanStatus::Ok => write!(f, "OK"),
            ScanStatus::OkWithExpiry => write!(f, "OK with Expiry"),
            ScanStatus::OverQuantity => write!(f, "Over Quantity"),
            ScanStatus::UnexpectedItem => write!(f, "Unexpected Item"),
        }
    }
}

impl FromStr for ScanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending scan" | "pendingscan" | "pending" => Ok(ScanStatus::PendingScan),
            "under quantity" | "underquantity" | "under" => Ok(ScanStatus::UnderQuantity),
            "ok" => Ok(ScanStatus::Ok),
            "ok with expiry" | "okwithexpiry" => Ok(ScanStatus::OkWithExpiry),
            "over quantity" | "overquantity" | "over" => Ok(ScanStatus::OverQuantity),
            "unexpected item" | "unexpecteditem" | "unexpected" => Ok(ScanStatus::UnexpectedItem),
            _ => Err(format!("Unknown scan status: {}", s)),
        }
    }
}

/// Lifecycle status of a purchase order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PurchaseOrderStatus {
    /// Ordered, nothing received yet
    Pending,
    /// Some deliveries received
    #[serde(rename = "Partially Received")]
    PartiallyReceived,
    /// Fully received
    Received,
    /// Cancelled by the store or supplier
    Cancelled,
}

impl fmt::Display for PurchaseOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PurchaseOrderStatus::Pending => write!(f, "Pending"),
            PurchaseOrderStatus::PartiallyReceived => write!(f, "Partially Received"),
            PurchaseOrderStatus::Received => write!(f, "Received"),
            PurchaseOrderStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// Severity of a user-facing notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationSeverity {
    /// Informational progress message
    Info,
    /// An operation completed
    Success,
    /// Something needs attention; never fatal
    Warning,
}

impl fmt::Display for NotificationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationSeverity::Info => write!(f, "info"),
            NotificationSeverity::Success => write!(f, "success"),
            NotificationSeverity::Warning => write!(f, "warning"),
        }
    }
}

/// Stock level classification used by the shelf grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StockLevel {
    /// No units left
    Empty,
    /// Below the reorder level
    Low,
    /// Below one and a half times the reorder level
    Warning,
    /// Comfortably stocked, or no reorder level configured
    Healthy,
}

impl fmt::Display for StockLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StockLevel::Empty => write!(f, "Empty"),
            StockLevel::Low => write!(f, "Low"),
            StockLevel::Warning => write!(f, "Warning"),
            StockLevel::Healthy => write!(f, "Healthy"),
        }
    }
}

/// Output format for the end-of-run report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human readable tables
    Text,
    /// A single JSON document
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "TEXT"),
            OutputFormat::Json => write!(f, "JSON"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}
