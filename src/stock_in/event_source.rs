//! Scan event sources
//!
//! The stock-in engine does not care where scans come from. A
//! [`ScanEventSource`] is asked for a batch on every scan tick; the random
//! generator stands in for the camera, the replay source feeds a fixed script
//! for tests and demos.

use crate::catalog::{Catalog, PurchaseOrder};
use crate::stock_in::ReconciliationTable;
use crate::types::{ProductId, SimulationConfig};
use chrono::Duration;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// One detected product and the number of units seen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanEvent {
    /// Scanned product
    pub product_id: ProductId,
    /// Units seen in this event
    pub quantity: u32,
}

impl ScanEvent {
    /// Create a scan event
    pub fn new(product_id: ProductId, quantity: u32) -> Self {
        Self { product_id, quantity }
    }
}

/// A scan event together with how long after the tick it should apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedScan {
    /// The event to apply
    pub event: ScanEvent,
    /// Offset from the tick
    pub delay: Duration,
}

/// Read-only view of the session a batch is planned for
#[derive(Debug, Clone, Copy)]
pub struct ScanContext<'a> {
    /// Order being received
    pub purchase_order: &'a PurchaseOrder,
    /// Reconciliation state at the start of the tick
    pub results: &'a ReconciliationTable,
    /// Full product catalog
    pub catalog: &'a Catalog,
}

/// Producer of scan events
pub trait ScanEventSource: fmt::Debug {
    /// Number of sub-events to draw for the next batch
    fn batch_size(&mut self) -> usize;

    /// Draw one scan event, or `None` when nothing should be scanned
    fn next_scan_event(&mut self, ctx: &ScanContext<'_>) -> Option<ScanEvent>;

    /// Delay of the sub-event at `index` within its batch
    fn stagger_delay(&mut self, index: usize) -> Duration;

    /// Plan a full batch
    fn next_batch(&mut self, ctx: &ScanContext<'_>) -> Vec<PlannedScan> {
        let size = self.batch_size();
        let mut batch = Vec::with_capacity(size);
        for index in 0..size {
            if let Some(event) = self.next_scan_event(ctx) {
                batch.push(PlannedScan { event, delay: self.stagger_delay(index) });
            }
        }
        batch
    }
}

/// Randomized camera stand-in
///
/// Each sub-event picks a purchase order line with probability
/// `po_item_probability`, preferring lines still under-scanned with
/// probability `unscanned_priority`; otherwise it picks any catalog product.
#[derive(Debug, Clone)]
pub struct RandomScanGenerator<R: Rng = StdRng> {
    rng: R,
    max_batch: usize,
    max_quantity: u32,
    po_item_probability: f64,
    unscanned_priority: f64,
    delay_range_ms: (u64, u64),
}

impl RandomScanGenerator<StdRng> {
    /// Generator seeded from the config seed, or from entropy when unset
    pub fn from_config(config: &SimulationConfig) -> Self {
        let rng = match config.seed {
            // distinct stream from the engines sharing the same seed
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> RandomScanGenerator<R> {
    /// Generator using the given random source
    pub fn with_rng(config: &SimulationConfig, rng: R) -> Self {
        Self {
            rng,
            max_batch: config.max_products_per_batch.max(1),
            max_quantity: config.max_quantity_per_product.max(1),
            po_item_probability: config.po_item_scan_probability.clamp(0.0, 1.0),
            unscanned_priority: config.unscanned_item_priority.clamp(0.0, 1.0),
            delay_range_ms: config.item_delay_range_ms(),
        }
    }

    fn pick_product(&mut self, ctx: &ScanContext<'_>) -> Option<ProductId> {
        let po = ctx.purchase_order;
        if !po.items.is_empty() && self.rng.gen_bool(self.po_item_probability) {
            let pending: Vec<ProductId> = ctx
                .results
                .under_scanned()
                .filter(|row| !row.is_unexpected())
                .map(|row| row.product_id)
                .collect();
            if !pending.is_empty() && self.rng.gen_bool(self.unscanned_priority) {
                return pending.choose(&mut self.rng).copied();
            }
            return po.items.choose(&mut self.rng).map(|item| item.product_id);
        }
        ctx.catalog.products().choose(&mut self.rng).map(|product| product.id)
    }
}

impl<R: Rng + fmt::Debug> ScanEventSource for RandomScanGenerator<R> {
    fn batch_size(&mut self) -> usize {
        self.rng.gen_range(1..=self.max_batch)
    }

    fn next_scan_event(&mut self, ctx: &ScanContext<'_>) -> Option<ScanEvent> {
        let product_id = self.pick_product(ctx)?;
        // order lines may name products the catalog no longer carries
        let product = ctx.catalog.get_product(product_id)?;
        let quantity = self.rng.gen_range(1..=self.max_quantity);
        Some(ScanEvent::new(product.id, quantity))
    }

    fn stagger_delay(&mut self, index: usize) -> Duration {
        let (min, max) = self.delay_range_ms;
        let base = if min < max { self.rng.gen_range(min..max) } else { min };
        Duration::milliseconds(base as i64 * index as i64)
    }
}

/// Scripted scan source that replays a fixed sequence of events
#[derive(Debug, Clone, Default)]
pub struct ReplayScanSource {
    events: VecDeque<ScanEvent>,
    batch_size: usize,
    stagger: Duration,
}

impl ReplayScanSource {
    /// Replay `events` one per batch with no stagger
    pub fn new(events: impl IntoIterator<Item = ScanEvent>) -> Self {
        Self { events: events.into_iter().collect(), batch_size: 1, stagger: Duration::zero() }
    }

    /// Emit up to `batch_size` events per batch
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Space events within a batch by `stagger`
    pub fn with_stagger(mut self, stagger: Duration) -> Self {
        self.stagger = stagger;
        self
    }

    /// Events not replayed yet
    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl ScanEventSource for ReplayScanSource {
    fn batch_size(&mut self) -> usize {
        self.batch_size.min(self.events.len())
    }

    fn next_scan_event(&mut self, _ctx: &ScanContext<'_>) -> Option<ScanEvent> {
        self.events.pop_front()
    }

    fn stagger_delay(&mut self, index: usize) -> Duration {
        self.stagger * index as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::reference_catalog;
    use crate::types::PurchaseOrderId;

    fn fixture() -> (Catalog, PurchaseOrder) {
        let catalog = reference_catalog().unwrap();
        let po = catalog.get_purchase_order(&PurchaseOrderId::from("PO2024002")).unwrap().clone();
        (catalog, po)
    }

    #[test]
    fn test_random_batches_respect_bounds() {
        let (catalog, po) = fixture();
        let results = ReconciliationTable::for_purchase_order(&po, &catalog);
        let ctx = ScanContext { purchase_order: &po, results: &results, catalog: &catalog };
        let config = SimulationConfig::default();
        let mut generator = RandomScanGenerator::with_rng(&config, StdRng::seed_from_u64(7));

        for _ in 0..200 {
            let batch = generator.next_batch(&ctx);
            assert!(!batch.is_empty() && batch.len() <= config.max_products_per_batch);
            for (index, planned) in batch.iter().enumerate() {
                assert!((1..=config.max_quantity_per_product).contains(&planned.event.quantity));
                assert!(catalog.get_product(planned.event.product_id).is_some());
                let ms = planned.delay.num_milliseconds();
                if index == 0 {
                    assert_eq!(ms, 0);
                } else {
                    let per_index = ms / index as i64;
                    assert!((100..400).contains(&per_index), "delay {} at index {}", ms, index);
                }
            }
        }
    }

    #[test]
    fn test_po_items_dominate_random_picks() {
        let (catalog, po) = fixture();
        let results = ReconciliationTable::for_purchase_order(&po, &catalog);
        let ctx = ScanContext { purchase_order: &po, results: &results, catalog: &catalog };
        let mut generator = RandomScanGenerator::with_rng(&SimulationConfig::default(), StdRng::seed_from_u64(11));

        let draws = 2000;
        let on_order = (0..draws)
            .filter_map(|_| generator.next_scan_event(&ctx))
            .filter(|event| po.contains(event.product_id))
            .count();
        // 0.85 direct plus the catalog draws that happen to land on the order
        assert!(on_order > draws * 80 / 100, "only {} of {} on order", on_order, draws);
    }

    #[test]
    fn test_probability_zero_always_picks_catalog() {
        let (catalog, po) = fixture();
        let results = ReconciliationTable::for_purchase_order(&po, &catalog);
        let ctx = ScanContext { purchase_order: &po, results: &results, catalog: &catalog };
        let config = SimulationConfig { po_item_scan_probability: 0.0, ..Default::default() };
        let mut generator = RandomScanGenerator::with_rng(&config, StdRng::seed_from_u64(3));

        let off_order = (0..500)
            .filter_map(|_| generator.next_scan_event(&ctx))
            .filter(|event| !po.contains(event.product_id))
            .count();
        assert!(off_order > 400);
    }

    #[test]
    fn test_replay_source_emits_in_order() {
        let (catalog, po) = fixture();
        let results = ReconciliationTable::new();
        let ctx = ScanContext { purchase_order: &po, results: &results, catalog: &catalog };
        let mut source = ReplayScanSource::new(vec![
            ScanEvent::new(ProductId(1), 2),
            ScanEvent::new(ProductId(2), 3),
            ScanEvent::new(ProductId(3), 4),
        ])
        .with_batch_size(2)
        .with_stagger(Duration::milliseconds(150));

        let first = source.next_batch(&ctx);
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].event, ScanEvent::new(ProductId(1), 2));
        assert_eq!(first[1].delay, Duration::milliseconds(150));

        let second = source.next_batch(&ctx);
        assert_eq!(second.len(), 1);
        assert_eq!(source.remaining(), 0);
        assert!(source.next_batch(&ctx).is_empty());
    }
}
