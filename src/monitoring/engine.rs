//! Shelf-monitoring engine
//!
//! Stands in for shelf sensors: while active, every tick may knock a few
//! units off one product and may move one product to another shelf. Alert
//! sets are recomputed from the whole collection after every tick.

use crate::catalog::{Catalog, Product, ShelfLayout};
use crate::kiosk_event;
use crate::monitoring::{update_alerts, AlertSnapshot};
use crate::simulation::{Notification, NotificationKind};
use crate::types::{ProductId, ShelfId, SimulationConfig, StockLevel};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Mutation probabilities for one monitor tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonitorSettings {
    /// Chance that the picked product loses stock
    pub stock_decay_probability: f64,
    /// Largest decrease per tick
    pub max_stock_decrease: u32,
    /// Chance that a product is moved to another shelf
    pub misplacement_probability: f64,
}

impl MonitorSettings {
    /// Settings from the simulation config
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            stock_decay_probability: config.stock_decay_probability.clamp(0.0, 1.0),
            max_stock_decrease: config.max_stock_decrease.max(1),
            misplacement_probability: config.misplacement_probability.clamp(0.0, 1.0),
        }
    }
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self::from_config(&SimulationConfig::default())
    }
}

/// One change made by a monitor tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MonitorMutation {
    /// Units disappeared from the shelf
    StockDecreased {
        /// Affected product
        product_id: ProductId,
        /// Stock before the tick
        from: u32,
        /// Stock after the tick
        to: u32,
    },
    /// The product was observed on another shelf
    Misplaced {
        /// Affected product
        product_id: ProductId,
        /// Shelf it was observed on before
        from: Option<ShelfId>,
        /// Shelf it is observed on now
        to: ShelfId,
    },
}

/// What a tick did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Whether the monitor was active (inactive ticks change nothing)
    pub active: bool,
    /// Mutations in the order they happened
    pub mutations: Vec<MonitorMutation>,
    /// Low-stock alert count after the tick
    pub low_stock_count: usize,
    /// Misplaced alert count after the tick
    pub misplaced_count: usize,
}

/// One product as shown in the shelf grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShelfSlot {
    /// Product shown in the slot
    pub product_id: ProductId,
    /// Display name
    pub name: String,
    /// Units on hand
    pub stock: u32,
    /// Stock classification
    pub level: StockLevel,
    /// Whether the product belongs on another shelf
    pub misplaced: bool,
}

/// Products currently observed on one shelf
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShelfView {
    /// Shelf id
    pub shelf_id: ShelfId,
    /// Shelf name
    pub name: String,
    /// Number of slots on the shelf
    pub capacity: u32,
    /// Products observed on the shelf, in catalog order
    pub slots: Vec<ShelfSlot>,
}

impl ShelfView {
    /// Whether more products are on the shelf than it has slots
    pub fn is_over_capacity(&self) -> bool {
        self.slots.len() as u64 > u64::from(self.capacity)
    }
}

/// Shelf monitor state
#[derive(Debug, Clone)]
pub struct ShelfMonitor {
    products: Vec<Product>,
    layout: ShelfLayout,
    settings: MonitorSettings,
    is_active: bool,
    alerts: AlertSnapshot,
    outbox: Vec<Notification>,
}

impl ShelfMonitor {
    /// Monitor over a private copy of the catalog products
    pub fn new(catalog: &Catalog, settings: MonitorSettings) -> Self {
        Self::from_products(catalog.products().to_vec(), catalog.layout().clone(), settings)
    }

    /// Monitor over an explicit product collection and layout
    pub fn from_products(products: Vec<Product>, layout: ShelfLayout, settings: MonitorSettings) -> Self {
        let alerts = update_alerts(&products);
        Self { products, layout, settings, is_active: false, alerts, outbox: Vec::new() }
    }

    /// Flip monitoring on or off; returns the new state
    ///
    /// Products are not touched.
    pub fn toggle_monitoring(&mut self) -> bool {
        self.is_active = !self.is_active;
        if self.is_active {
            kiosk_event!(info, "shelf_monitor", "monitoring started", products = self.products.len());
            self.outbox.push(Notification::success(NotificationKind::MonitoringStarted, "Shelf monitoring started"));
        } else {
            kiosk_event!(info, "shelf_monitor", "monitoring stopped");
            self.outbox.push(Notification::info(NotificationKind::MonitoringStopped, "Shelf monitoring stopped"));
        }
        self.is_active
    }

    /// Run one mutation round
    ///
    /// Does nothing while inactive, so a tick that fires after monitoring was
    /// switched off cannot change the products.
    #[instrument(skip(self, rng), fields(active = self.is_active))]
    pub fn tick<R: Rng>(&mut self, rng: &mut R) -> TickReport {
        if !self.is_active {
            return TickReport::default();
        }

        let mut mutations = Vec::new();
        if let Some(mutation) = self.decay_stock(rng) {
            mutations.push(mutation);
        }
        if let Some(mutation) = self.misplace_product(rng) {
            mutations.push(mutation);
        }

        self.alerts = update_alerts(&self.products);
        debug!(
            mutations = mutations.len(),
            low_stock = self.alerts.low_stock.len(),
            misplaced = self.alerts.misplaced.len(),
            "monitor tick"
        );
        TickReport {
            active: true,
            mutations,
            low_stock_count: self.alerts.low_stock.len(),
            misplaced_count: self.alerts.misplaced.len(),
        }
    }

    fn decay_stock<R: Rng>(&mut self, rng: &mut R) -> Option<MonitorMutation> {
        let settings = self.settings;
        let product = self.products.choose_mut(rng)?;
        if product.stock == 0 || !rng.gen_bool(settings.stock_decay_probability) {
            return None;
        }
        let from = product.stock;
        let to = product.decrease_stock(rng.gen_range(1..=settings.max_stock_decrease));
        self.outbox.push(Notification::info(
            NotificationKind::StockUpdated,
            format!("{}: stock now {}", product.name, to),
        ));
        Some(MonitorMutation::StockDecreased { product_id: product.id, from, to })
    }

    fn misplace_product<R: Rng>(&mut self, rng: &mut R) -> Option<MonitorMutation> {
        if self.layout.shelf_count() < 2 || self.products.is_empty() {
            return None;
        }
        if !rng.gen_bool(self.settings.misplacement_probability) {
            return None;
        }
        let index = rng.gen_range(0..self.products.len());
        let product = &self.products[index];

        // the new shelf must differ from both the observed and the home shelf
        let candidates: Vec<&ShelfId> = self
            .layout
            .shelf_ids()
            .filter(|id| product.current_shelf_location_id.as_ref() != Some(*id))
            .filter(|id| product.shelf_location_id.as_ref() != Some(*id))
            .collect();
        let target = candidates.choose(rng).map(|id| (*id).clone())?;

        let product = &mut self.products[index];
        let from = product.current_shelf_location_id.replace(target.clone());
        kiosk_event!(
            warn,
            "shelf_monitor",
            "item misplaced",
            product = %product.name,
            observed = %target
        );
        self.outbox.push(Notification::warning(
            NotificationKind::ItemMisplaced,
            format!(
                "{} found on {} (belongs on {})",
                product.name,
                target,
                product.shelf_location_id.as_ref().map(ShelfId::as_str).unwrap_or("N/A")
            ),
        ));
        Some(MonitorMutation::Misplaced { product_id: product.id, from, to: target })
    }

    /// Products grouped by the shelf they are currently observed on
    ///
    /// Shelves follow layout order; products without a known shelf are left
    /// out.
    pub fn shelf_overview(&self) -> Vec<ShelfView> {
        self.layout
            .shelves
            .iter()
            .map(|shelf| ShelfView {
                shelf_id: shelf.id.clone(),
                name: shelf.name.clone(),
                capacity: shelf.capacity(),
                slots: self
                    .products
                    .iter()
                    .filter(|p| p.current_shelf_location_id.as_ref() == Some(&shelf.id))
                    .map(|p| ShelfSlot {
                        product_id: p.id,
                        name: p.name.clone(),
                        stock: p.stock,
                        level: p.stock_level(),
                        misplaced: p.is_misplaced(),
                    })
                    .collect(),
            })
            .collect()
    }

    /// Monitored products
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Monitored product by id
    pub fn product(&self, product_id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == product_id)
    }

    /// Current alert sets
    pub fn alerts(&self) -> &AlertSnapshot {
        &self.alerts
    }

    /// Whether monitoring is on
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Shelf layout the monitor moves products between
    pub fn layout(&self) -> &ShelfLayout {
        &self.layout
    }

    /// Take queued notifications
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.outbox)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{reference_catalog, ShelfConfig};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn always() -> MonitorSettings {
        MonitorSettings { stock_decay_probability: 1.0, max_stock_decrease: 3, misplacement_probability: 1.0 }
    }

    fn two_shelves() -> ShelfLayout {
        ShelfLayout::new(
            "Two",
            vec![ShelfConfig::new("SHELF-A", "A", 1, 2), ShelfConfig::new("SHELF-B", "B", 1, 2)],
        )
    }

    #[test]
    fn test_inactive_tick_changes_nothing() {
        let catalog = reference_catalog().unwrap();
        let mut monitor = ShelfMonitor::new(&catalog, always());
        let before = monitor.products().to_vec();

        let report = monitor.tick(&mut StdRng::seed_from_u64(1));
        assert!(!report.active);
        assert!(report.mutations.is_empty());
        assert_eq!(monitor.products(), before.as_slice());
    }

    #[test]
    fn test_toggle_notifies_without_mutating() {
        let catalog = reference_catalog().unwrap();
        let mut monitor = ShelfMonitor::new(&catalog, always());
        let before = monitor.products().to_vec();

        assert!(monitor.toggle_monitoring());
        assert!(!monitor.toggle_monitoring());
        assert_eq!(monitor.products(), before.as_slice());

        let kinds: Vec<NotificationKind> = monitor.drain_notifications().into_iter().map(|n| n.kind).collect();
        assert_eq!(kinds, vec![NotificationKind::MonitoringStarted, NotificationKind::MonitoringStopped]);
    }

    #[test]
    fn test_stock_never_negative() {
        let products = vec![Product::new(ProductId(1), "Last one", 1).with_reorder_level(5)];
        let layout = ShelfLayout::new("One", vec![ShelfConfig::new("SHELF-A", "A", 1, 1)]);
        let mut monitor = ShelfMonitor::from_products(products, layout, always());
        monitor.toggle_monitoring();
        let mut rng = StdRng::seed_from_u64(9);

        let report = monitor.tick(&mut rng);
        assert_eq!(report.mutations, vec![MonitorMutation::StockDecreased { product_id: ProductId(1), from: 1, to: 0 }]);

        let report = monitor.tick(&mut rng);
        assert!(report.mutations.is_empty());
        assert_eq!(monitor.products()[0].stock, 0);
        assert_eq!(monitor.products()[0].stock_level(), StockLevel::Empty);
    }

    #[test]
    fn test_single_shelf_never_misplaces() {
        let products = vec![Product::new(ProductId(1), "Solo", 0).with_shelf(ShelfId::from("SHELF-A"))];
        let layout = ShelfLayout::new("One", vec![ShelfConfig::new("SHELF-A", "A", 1, 1)]);
        let mut monitor = ShelfMonitor::from_products(products, layout, always());
        monitor.toggle_monitoring();

        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..50 {
            assert!(monitor.tick(&mut rng).mutations.is_empty());
        }
        assert!(monitor.alerts().misplaced.is_empty());
    }

    #[test]
    fn test_misplacement_moves_to_other_shelf() {
        let products = vec![Product::new(ProductId(1), "Teh O", 0).with_shelf(ShelfId::from("SHELF-A"))];
        let mut monitor = ShelfMonitor::from_products(products, two_shelves(), always());
        monitor.toggle_monitoring();

        let report = monitor.tick(&mut StdRng::seed_from_u64(2));
        assert_eq!(
            report.mutations,
            vec![MonitorMutation::Misplaced {
                product_id: ProductId(1),
                from: Some(ShelfId::from("SHELF-A")),
                to: ShelfId::from("SHELF-B"),
            }]
        );
        assert_eq!(report.misplaced_count, 1);
        assert_eq!(monitor.alerts().misplaced_ids(), vec![ProductId(1)]);
        assert!(monitor.drain_notifications().iter().any(|n| n.kind == NotificationKind::ItemMisplaced));
    }

    #[test]
    fn test_no_third_shelf_means_no_misplacement() {
        let mut product = Product::new(ProductId(1), "Roamer", 0).with_shelf(ShelfId::from("SHELF-A"));
        product.current_shelf_location_id = Some(ShelfId::from("SHELF-B"));
        let mut monitor = ShelfMonitor::from_products(vec![product], two_shelves(), always());
        monitor.toggle_monitoring();
        monitor.drain_notifications();

        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..20 {
            let report = monitor.tick(&mut rng);
            assert!(report.mutations.is_empty());
            assert_eq!(report.misplaced_count, 1);
        }
        assert_eq!(monitor.products()[0].current_shelf_location_id, Some(ShelfId::from("SHELF-B")));
        assert!(monitor.drain_notifications().iter().all(|n| n.kind != NotificationKind::ItemMisplaced));
    }

    #[test]
    fn test_misplaced_item_moves_to_a_third_shelf() {
        let layout = ShelfLayout::new(
            "Three",
            vec![
                ShelfConfig::new("SHELF-A", "A", 1, 2),
                ShelfConfig::new("SHELF-B", "B", 1, 2),
                ShelfConfig::new("SHELF-C", "C", 1, 2),
            ],
        );
        let mut product = Product::new(ProductId(1), "Roamer", 0).with_shelf(ShelfId::from("SHELF-A"));
        product.current_shelf_location_id = Some(ShelfId::from("SHELF-B"));
        let mut monitor = ShelfMonitor::from_products(vec![product], layout, always());
        monitor.toggle_monitoring();

        let report = monitor.tick(&mut StdRng::seed_from_u64(5));
        assert_eq!(
            report.mutations,
            vec![MonitorMutation::Misplaced {
                product_id: ProductId(1),
                from: Some(ShelfId::from("SHELF-B")),
                to: ShelfId::from("SHELF-C"),
            }]
        );
        assert_eq!(monitor.alerts().misplaced_ids(), vec![ProductId(1)]);
    }

    #[test]
    fn test_alerts_match_collection_after_every_tick() {
        let catalog = reference_catalog().unwrap();
        let mut monitor = ShelfMonitor::new(&catalog, always());
        monitor.toggle_monitoring();
        let mut rng = StdRng::seed_from_u64(21);
        let stock_before: u64 = monitor.products().iter().map(|p| u64::from(p.stock)).sum();

        for _ in 0..200 {
            monitor.tick(&mut rng);
            assert_eq!(monitor.alerts(), &update_alerts(monitor.products()));
        }
        let stock_after: u64 = monitor.products().iter().map(|p| u64::from(p.stock)).sum();
        assert!(stock_after < stock_before);
    }

    #[test]
    fn test_shelf_overview_groups_by_observed_shelf() {
        let mut moved = Product::new(ProductId(2), "Moved", 10).with_shelf(ShelfId::from("SHELF-A"));
        moved.current_shelf_location_id = Some(ShelfId::from("SHELF-B"));
        let products = vec![
            Product::new(ProductId(1), "Home", 2).with_reorder_level(5).with_shelf(ShelfId::from("SHELF-A")),
            moved,
        ];
        let monitor = ShelfMonitor::from_products(products, two_shelves(), always());

        let overview = monitor.shelf_overview();
        assert_eq!(overview.len(), 2);
        assert_eq!(overview[0].slots.len(), 1);
        assert_eq!(overview[0].slots[0].level, StockLevel::Low);
        assert_eq!(overview[1].slots[0].product_id, ProductId(2));
        assert!(overview[1].slots[0].misplaced);
        assert!(!overview[1].is_over_capacity());
    }
}
