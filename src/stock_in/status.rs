//! Reconciliation status derivation

use crate::types::ScanStatus;

/// Derive the status of a reconciliation row
///
/// Rules are evaluated in order: nothing expected is an unexpected item,
/// then under, exact (with or without expiry), and finally over quantity.
/// `PendingScan` is never produced here; it only marks untouched rows.
pub fn derive_status(expected_quantity: u32, scanned_quantity: u32, has_expiry_date: bool) -> ScanStatus {
    if expected_quantity == 0 {
        ScanStatus::UnexpectedItem
    } else if scanned_quantity < expected_quantity {
        ScanStatus::UnderQuantity
    } else if scanned_quantity == expected_quantity {
        if has_expiry_date {
            ScanStatus::OkWithExpiry
        } else {
            ScanStatus::Ok
        }
    } else {
        ScanStatus::OverQuantity
    }
}
