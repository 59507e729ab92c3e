//! Identifier types for the kiosk inventory simulator
//!
//! Catalog entities (products, purchase orders, shelves) keep the identifiers
//! the store already uses, while runtime entities (scan sessions, kiosk
//! devices) get generated UUID-based identifiers.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

/// Catalog identifier for a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u32);

impl ProductId {
    /// Wrap a raw catalog number
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw catalog number
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ProductId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

/// Identifier of a purchase order, e.g. `PO2024001`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PurchaseOrderId(pub String);

impl PurchaseOrderId {
    /// Create a purchase order identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PurchaseOrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PurchaseOrderId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Identifier of a shelf in the store layout, e.g. `SHELF-A`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShelfId(pub String);

impl ShelfId {
    /// Create a shelf identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShelfId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ShelfId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Unique identifier for one stock-in scanning session
///
/// A new session is opened every time scanning starts. Deferred scan
/// applications remember the session they were planned in so that work
/// planned before a stop can be recognised as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new random session ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SCAN_{}", self.0.simple())
    }
}

impl Serialize for SessionId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("SCAN_{}", self.0.simple()))
    }
}

impl<'de> Deserialize<'de> for SessionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let raw = s.strip_prefix("SCAN_").unwrap_or(&s);
        let uuid = Uuid::parse_str(raw).map_err(serde::de::Error::custom)?;
        Ok(SessionId(uuid))
    }
}

/// Device identifier stamped on every record sent to the monitoring sink
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KioskId(pub String);

impl KioskId {
    /// Generate a device id of the form `kiosk-xxxxxxxxx`
    pub fn generate() -> Self {
        let raw = Uuid::new_v4().simple().to_string();
        Self(format!("kiosk-{}", &raw[..9]))
    }

    /// Borrow the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for KioskId {
    fn default() -> Self {
        Self::generate()
    }
}

impl fmt::Display for KioskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_id_display_and_serde() {
        let id = ProductId::new(42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");

        let parsed: ProductId = serde_json::from_str("7").unwrap();
        assert_eq!(parsed, ProductId(7));
    }

    #[test]
    fn test_purchase_order_id_is_transparent() {
        let id = PurchaseOrderId::from("PO2024001");
        assert_eq!(id.as_str(), "PO2024001");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"PO2024001\"");
    }

    #[test]
    fn test_session_id_creation() {
        let id1 = SessionId::new();
        let id2 = SessionId::new();
        assert_ne!(id1, id2);
        assert_ne!(id1, SessionId::default());
    }

    #[test]
    fn test_session_id_display() {
        let id = SessionId::new();
        let display_str = id.to_string();

        assert!(display_str.starts_with("SCAN_"));
        // SCAN_ + 32 hex chars
        assert_eq!(display_str.len(), 37);
    }

    #[test]
    fn test_session_id_serde_round_trip_and_fallback() {
        let id = SessionId::new();
        let json = serde_json::to_string(&id).unwrap();
        let back: SessionId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);

        let raw = format!("\"{}\"", id.0);
        let from_raw: SessionId = serde_json::from_str(&raw).unwrap();
        assert_eq!(id, from_raw);
    }

    #[test]
    fn test_kiosk_id_format() {
        let id = KioskId::generate();
        assert!(id.as_str().starts_with("kiosk-"));
        assert_eq!(id.as_str().len(), "kiosk-".len() + 9);
        assert_ne!(id, KioskId::generate());
    }
}
