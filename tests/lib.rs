// Integration tests test your crate's public API. They only have access to items
// in your crate that are marked pub. See the Cargo Targets page of the Cargo Book
// for more information.
//
//   https://doc.rust-lang.org/cargo/reference/cargo-targets.html#integration-tests
//

use kiosk_inventory_sim::*;


// Scheduling and orchestration
mod orchestrator_tests;


#[test]
fn test_core_id_types() {
    let session = SessionId::new();
    assert_ne!(session, SessionId::new());
    assert!(session.to_string().starts_with("SCAN_"));

    let kiosk = KioskId::generate();
    assert!(kiosk.as_str().starts_with("kiosk-"));
    assert_eq!(kiosk.as_str().len(), "kiosk-".len() + 9);

    assert_eq!(ProductId::new(7).to_string(), "7");
    assert_eq!(PurchaseOrderId::from("PO2024001").as_str(), "PO2024001");
    assert_eq!(ShelfId::from("SHELF-A").to_string(), "SHELF-A");
}

#[test]
fn test_scan_status_serialization() {
    let json = serde_json::to_string(&ScanStatus::OkWithExpiry).unwrap();
    assert_eq!(json, "\"OK with Expiry\"");

    let back: ScanStatus = serde_json::from_str("\"Unexpected Item\"").unwrap();
    assert_eq!(back, ScanStatus::UnexpectedItem);

    assert!(ScanStatus::OverQuantity.is_discrepancy());
    assert!(ScanStatus::UnderQuantity.is_discrepancy());
    assert!(!ScanStatus::UnexpectedItem.is_discrepancy());
    assert!(!ScanStatus::PendingScan.is_discrepancy());
}

#[test]
fn test_reference_catalog_shape() {
    let catalog = reference_catalog().unwrap();

    assert_eq!(catalog.layout().shelf_count(), 5);
    assert_eq!(catalog.purchase_orders().len(), 3);
    assert!(!catalog.is_empty());

    for product in catalog.products() {
        let canonical = product.shelf_location_id.as_ref().expect("every fixture product is shelved");
        assert!(catalog.layout().contains(canonical), "{} on unknown shelf", product.name);
        assert!(!product.is_misplaced());
    }
}

#[test]
fn test_output_format_parsing() {
    assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
    assert_eq!("TEXT".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
    assert!("csv".parse::<OutputFormat>().is_err());
}
