//! Reference store fixtures
//!
//! A static catalog of the kiosk's shelves, products and open purchase
//! orders. Shelf assignment and expiry tracking follow the product category.

use crate::catalog::{Catalog, Product, PurchaseOrder, PurchaseOrderItem, ShelfConfig, ShelfLayout};
use crate::simulation::{SimulationError, SimulationResult};
use crate::types::{ProductId, PurchaseOrderId, PurchaseOrderStatus, ShelfId};
use chrono::NaiveDate;

/// (sku, name, category, initial stock)
const PRODUCT_TABLE: &[(&str, &str, &str, u32)] = &[
    ("FNB-DRK-001", "Air Mineral Dasani 600ml", "Minuman", 240),
    ("FNB-DRK-002", "Coca-Cola Classic 320ml", "Minuman", 120),
    ("FNB-DRK-003", "100 Plus Original 325ml", "Minuman", 120),
    ("FNB-DRK-004", "Milo Ais (Cup)", "Minuman", 100),
    ("FNB-DRK-005", "Kopi O Panas (Cup)", "Minuman", 100),
    ("FNB-DRK-006", "Teh O Ais (Cup)", "Minuman", 100),
    ("FNB-DRK-015", "Yakult Ace Light", "Minuman", 50),
    ("FNB-DRK-018", "Susu Goodday Full Cream 200ml", "Minuman", 72),
    ("FNB-SNK-001", "Twisties Super Ring Cheese 60g", "Snek", 60),
    ("FNB-SNK-004", "Pringles Original 110g", "Snek", 36),
    ("FNB-BSK-001", "Biskut Tiger", "Biskut", 30),
    ("FNB-BSK-002", "Oreo Original", "Biskut", 40),
    ("FNB-BSK-003", "Jacobs Cream Cracker", "Biskut", 24),
    ("FNB-CND-002", "KitKat 2 Finger", "Coklat & Gula-gula", 80),
    ("FNB-RTG-001", "Roti Gardenia Original Classic", "Roti & Bakeri", 40),
    ("FNB-RTG-003", "Apollo Chocolate Layer Cake", "Roti & Bakeri", 80),
    ("FNB-RTG-008", "Nasi Lemak Bungkus Daun Pisang", "Makanan Sedia", 40),
    ("FNB-RTG-010", "Sandwich Telur Mayo", "Makanan Sedia", 20),
    ("FNB-FRT-002", "Buah Epal Merah", "Buah & Kekacang", 30),
    ("FNB-FRT-003", "Buah Pisang Berangan", "Buah & Kekacang", 40),
    ("ESS-TLT-001", "Ubat Gigi Colgate 50g", "Peralatan Mandian", 24),
    ("ESS-TLT-003", "Sabun Mandi Dettol Original", "Peralatan Mandian", 36),
    ("ESS-TLT-012", "Baby Oil Johnson's 50ml", "Peralatan Mandian", 24),
    ("ESS-HBC-003", "Panadol Actifast (1 Strip)", "Kesihatan Asas", 50),
    ("ESS-HBC-005", "Vicks VapoRub 10g", "Kesihatan Asas", 30),
    ("ESS-HBC-007", "Strepsils Honey Lemon", "Kesihatan Asas", 40),
    ("ESS-HYG-001", "Tisu Muka Kleenex (Pek Poket)", "Kebersihan", 100),
    ("ESS-ELC-001", "USB-C Cable 1m", "Elektronik", 24),
    ("PUB-NWS-001", "Surat Khabar (The Star)", "Penerbitan", 30),
    ("STA-WRT-001", "Pen Bola Hitam Pilot", "Alat Tulis", 50),
    ("TOB-ACS-001", "Lighter", "Tembakau", 50),
    ("SVC-RLD-001", "Topup Maxis RM10", "Servis Digital", 9999),
];

/// SKUs that carry an expiry date regardless of category
const EXPIRY_OVERRIDES: &[&str] = &["ESS-TLT-012", "ESS-HBC-005", "ESS-HBC-007"];

/// Reorder level applied to service products
const SERVICE_REORDER_LEVEL: u32 = 500;

/// The five-aisle layout of the reference store
pub fn reference_layout() -> ShelfLayout {
    ShelfLayout::new(
        "Main Store Layout",
        vec![
            ShelfConfig::new("SHELF-A", "Aisle 1 - Drinks & Dairy", 2, 3),
            ShelfConfig::new("SHELF-B", "Aisle 2 - Snacks & Biscuits", 2, 3),
            ShelfConfig::new("SHELF-C", "Aisle 3 - Bread & Ready Food", 2, 2),
            ShelfConfig::new("SHELF-D", "Aisle 4 - Toiletries & Health", 2, 3),
            ShelfConfig::new("SHELF-E", "Aisle 5 - Miscellaneous & Tobacco", 1, 4),
        ],
    )
}

/// Whether products of a category track expiry dates
pub fn category_tracks_expiry(category: &str) -> bool {
    matches!(
        category,
        "Minuman"
            | "Snek"
            | "Roti & Bakeri"
            | "Makanan Sedia"
            | "Biskut"
            | "Coklat & Gula-gula"
            | "Buah & Kekacang"
            | "Kesihatan Asas"
            | "Tembakau"
    )
}

/// Shelf a category is stocked on
pub fn shelf_for_category(category: &str) -> ShelfId {
    let shelf = match category {
        "Minuman" => "SHELF-A",
        "Snek" | "Biskut" | "Coklat & Gula-gula" => "SHELF-B",
        "Roti & Bakeri" | "Makanan Sedia" | "Buah & Kekacang" => "SHELF-C",
        "Peralatan Mandian" | "Kesihatan Asas" | "Kebersihan" => "SHELF-D",
        _ => "SHELF-E",
    };
    ShelfId::from(shelf)
}

/// Reorder level for an initial stock: 15% of stock, at least 5
pub fn default_reorder_level(category: &str, initial_stock: u32) -> u32 {
    if category.starts_with("Servis") {
        return SERVICE_REORDER_LEVEL;
    }
    (initial_stock * 15 / 100).max(5)
}

/// Build the reference product list; ids are assigned in table order from 1
pub fn reference_products() -> Vec<Product> {
    PRODUCT_TABLE
        .iter()
        .zip(1u32..)
        .map(|(&(sku, name, category, stock), id)| {
            let tracks_expiry = category_tracks_expiry(category) || EXPIRY_OVERRIDES.contains(&sku);
            Product::new(ProductId(id), name, stock)
                .with_sku(sku)
                .with_category(category)
                .with_reorder_level(default_reorder_level(category, stock))
                .with_shelf(shelf_for_category(category))
                .with_expiry_tracking(tracks_expiry)
        })
        .collect()
}

/// Build the reference purchase orders against a product list
pub fn reference_purchase_orders(products: &[Product]) -> SimulationResult<Vec<PurchaseOrder>> {
    let line = |sku: &str, quantity: u32| -> SimulationResult<PurchaseOrderItem> {
        let product = products
            .iter()
            .find(|p| p.sku.as_deref() == Some(sku))
            .ok_or_else(|| SimulationError::catalog_error(format!("fixture SKU {} missing", sku)))?;
        Ok(PurchaseOrderItem::new(product.id, product.name.clone(), quantity))
    };
    let date = |y: i32, m: u32, d: u32| -> SimulationResult<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
            .ok_or_else(|| SimulationError::catalog_error("invalid fixture order date"))
    };

    Ok(vec![
        PurchaseOrder {
            id: PurchaseOrderId::from("PO2024001"),
            po_number: "PO-XYZ-001".to_string(),
            supplier_name: "Snek Borong Sdn Bhd".to_string(),
            order_date: date(2024, 7, 15)?,
            status: PurchaseOrderStatus::Pending,
            items: vec![line("FNB-BSK-002", 100)?, line("FNB-BSK-003", 50)?],
        },
        PurchaseOrder {
            id: PurchaseOrderId::from("PO2024002"),
            po_number: "PO-ABC-002".to_string(),
            supplier_name: "Minuman Segar Enterprise".to_string(),
            order_date: date(2024, 7, 20)?,
            status: PurchaseOrderStatus::Pending,
            items: vec![
                line("FNB-DRK-005", 200)?,
                line("FNB-DRK-006", 150)?,
                line("FNB-DRK-018", 120)?,
            ],
        },
        PurchaseOrder {
            id: PurchaseOrderId::from("PO2024003"),
            po_number: "PO-DEF-003".to_string(),
            supplier_name: "Runcit Harian Trading".to_string(),
            order_date: date(2024, 7, 22)?,
            status: PurchaseOrderStatus::PartiallyReceived,
            items: vec![line("FNB-RTG-001", 75)?, line("FNB-FRT-002", 20)?],
        },
    ])
}

/// The complete reference catalog
pub fn reference_catalog() -> SimulationResult<Catalog> {
    let products = reference_products();
    let orders = reference_purchase_orders(&products)?;
    Catalog::new(products, orders, reference_layout())
}
