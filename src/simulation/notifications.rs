//! User-facing notifications
//!
//! The engines never print. They queue [`Notification`]s which the
//! orchestrator forwards to a [`NotificationSink`]; the default sink keeps a
//! history and mirrors every notification into tracing.

use crate::types::NotificationSeverity;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

/// What a notification is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A purchase order was selected for receiving
    PurchaseOrderSelected,
    /// A stock-in action was rejected (no order, empty order, unknown order)
    ScanRejected,
    /// Scanning started
    ScanningStarted,
    /// Scanning stopped
    ScanningStopped,
    /// A scan event was applied to the reconciliation table
    ScanApplied,
    /// An expiry date was assigned to a row
    ExpiryAssigned,
    /// Discrepancies were present at finalize time
    DiscrepanciesFound,
    /// The shipment was finalized
    ShipmentFinalized,
    /// Shelf monitoring started
    MonitoringStarted,
    /// Shelf monitoring stopped
    MonitoringStopped,
    /// A product was observed on the wrong shelf
    ItemMisplaced,
    /// A product's stock level changed
    StockUpdated,
}

impl NotificationKind {
    /// How long a front end should display this kind of notification
    pub fn display_ms(&self) -> u64 {
        match self {
            NotificationKind::ScanApplied => 1500,
            NotificationKind::ExpiryAssigned | NotificationKind::StockUpdated => 2000,
            NotificationKind::ItemMisplaced => 3000,
            NotificationKind::ShipmentFinalized => 4000,
            _ => 3000,
        }
    }
}

/// A human-readable notification event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Severity shown to the user
    pub severity: NotificationSeverity,
    /// Event the notification reports
    pub kind: NotificationKind,
    /// Message text
    pub message: String,
    /// Suggested display time in milliseconds
    pub display_ms: u64,
}

impl Notification {
    /// Create a notification with the kind's default display time
    pub fn new(severity: NotificationSeverity, kind: NotificationKind, message: impl Into<String>) -> Self {
        Self { severity, kind, message: message.into(), display_ms: kind.display_ms() }
    }

    /// Informational notification
    pub fn info(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self::new(NotificationSeverity::Info, kind, message)
    }

    /// Success notification
    pub fn success(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self::new(NotificationSeverity::Success, kind, message)
    }

    /// Warning notification
    pub fn warning(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self::new(NotificationSeverity::Warning, kind, message)
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)
    }
}

/// Receiver of notifications
pub trait NotificationSink: fmt::Debug {
    /// Deliver one notification
    fn notify(&mut self, notification: Notification);
}

/// In-memory notification history mirrored to tracing
#[derive(Debug, Default, Clone)]
pub struct NotificationLog {
    entries: Vec<Notification>,
}

impl NotificationLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// All notifications in delivery order
    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }

    /// Notifications of one kind
    pub fn of_kind(&self, kind: NotificationKind) -> impl Iterator<Item = &Notification> {
        self.entries.iter().filter(move |n| n.kind == kind)
    }

    /// Number of notifications with the given severity
    pub fn count_severity(&self, severity: NotificationSeverity) -> usize {
        self.entries.iter().filter(|n| n.severity == severity).count()
    }

    /// Most recent notification
    pub fn last(&self) -> Option<&Notification> {
        self.entries.last()
    }

    /// Remove and return everything delivered so far
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.entries)
    }

    /// Number of delivered notifications
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been delivered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl NotificationSink for NotificationLog {
    fn notify(&mut self, notification: Notification) {
        match notification.severity {
            NotificationSeverity::Warning => {
                warn!(kind = ?notification.kind, "{}", notification.message)
            }
            _ => info!(kind = ?notification.kind, "{}", notification.message),
        }
        self.entries.push(notification);
    }
}
