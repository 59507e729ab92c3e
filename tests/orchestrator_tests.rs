//! Integration tests for the kiosk simulation orchestrator
//!
//! These tests run complete headless sessions over virtual time: scripted and
//! seeded scanning, reselection and stop semantics, shelf monitoring on the
//! shared task queue, the JSONL event log and reproducibility under a seed.

use chrono::{DateTime, Duration, TimeZone, Utc};
use kiosk_inventory_sim::catalog::{reference_catalog, Catalog, PurchaseOrder};
use kiosk_inventory_sim::simulation::{
    JsonlEventSink, KioskEventRecord, KioskSimulation, NotificationKind, SimulationError, TaskGroup,
};
use kiosk_inventory_sim::stock_in::{ReplayScanSource, ScanEvent};
use kiosk_inventory_sim::types::{
    NotificationSeverity, ProductId, PurchaseOrderId, PurchaseOrderStatus, ScanStatus, SimulationConfig,
};
use std::fs;
use tempfile::TempDir;

const KOPI_O: ProductId = ProductId(5);
const TEH_O: ProductId = ProductId(6);
const SUSU: ProductId = ProductId(8);
const LIGHTER: ProductId = ProductId(31);

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 15, 9, 0, 0).unwrap()
}

fn seeded_config(seed: u64) -> SimulationConfig {
    SimulationConfig { seed: Some(seed), ..Default::default() }
}

fn simulation(seed: u64) -> KioskSimulation {
    KioskSimulation::new(seeded_config(seed), reference_catalog().unwrap())
        .unwrap()
        .with_start_time(start())
}

/// A scripted delivery reconciles exactly
#[test]
fn test_scripted_delivery_reconciles() {
    let script = ReplayScanSource::new(vec![
        ScanEvent::new(KOPI_O, 200),
        ScanEvent::new(TEH_O, 100),
        ScanEvent::new(SUSU, 130),
        ScanEvent::new(LIGHTER, 2),
    ]);
    let mut sim = simulation(1).with_scan_source(Box::new(script));
    sim.select_purchase_order(&PurchaseOrderId::from("PO2024002")).unwrap();
    sim.start_scanning().unwrap();

    // one event per 4s tick
    sim.advance(Duration::seconds(16)).unwrap();
    assert_eq!(sim.statistics().scans_applied, 4);
    assert_eq!(sim.statistics().unexpected_scans, 1);

    let results = sim.stock_in().results();
    assert_eq!(results.get(KOPI_O).unwrap().status, ScanStatus::OkWithExpiry);
    assert_eq!(results.get(TEH_O).unwrap().status, ScanStatus::UnderQuantity);
    assert_eq!(results.get(TEH_O).unwrap().discrepancy, -50);
    assert_eq!(results.get(SUSU).unwrap().status, ScanStatus::OverQuantity);
    assert_eq!(results.get(LIGHTER).unwrap().status, ScanStatus::UnexpectedItem);
    assert_eq!(results.get(LIGHTER).unwrap().expected_quantity, 0);

    // expiry dates fall inside the window measured from simulated "today"
    let expiry = results.get(KOPI_O).unwrap().simulated_expiry_date.unwrap();
    let offset = (expiry - start().date_naive()).num_days();
    assert!((30..365).contains(&offset));

    let summary = sim.finalize_shipment().unwrap();
    assert!(summary.has_discrepancies);
    assert_eq!(summary.total_expected_units, 470);
    assert_eq!(summary.total_scanned_units, 432);
    assert_eq!(sim.statistics().shipments_finalized, 1);
    assert_eq!(sim.statistics().shipments_with_discrepancies, 1);
    assert!(sim.stock_in().current_purchase_order().is_none());
    assert!(sim.scan_ticker().is_none());
    assert_eq!(sim.scheduler().pending(), 0);

    let warnings: Vec<_> = sim
        .notifications()
        .entries()
        .iter()
        .filter(|n| n.severity == NotificationSeverity::Warning)
        .collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].kind, NotificationKind::DiscrepanciesFound);
}

/// Reselecting while scanning drops scans planned for the old order
#[test]
fn test_reselection_cancels_planned_scans() {
    let script = ReplayScanSource::new(vec![ScanEvent::new(KOPI_O, 2), ScanEvent::new(TEH_O, 3)])
        .with_batch_size(2)
        .with_stagger(Duration::milliseconds(300));
    let mut sim = simulation(2).with_scan_source(Box::new(script));
    sim.select_purchase_order(&PurchaseOrderId::from("PO2024002")).unwrap();
    sim.start_scanning().unwrap();

    sim.advance(Duration::milliseconds(4100)).unwrap();
    assert_eq!(sim.scheduler().pending_in_group(TaskGroup::ScanApply), 1);

    sim.select_purchase_order(&PurchaseOrderId::from("PO2024001")).unwrap();
    assert_eq!(sim.scheduler().pending_in_group(TaskGroup::ScanApply), 0);
    assert_eq!(sim.scheduler().pending_in_group(TaskGroup::ScanTicker), 1);
    assert!(sim.stock_in().is_scanning());

    sim.advance(Duration::seconds(1)).unwrap();
    let rows = sim.stock_in().results().rows();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|row| row.scanned_quantity == 0));
    assert_eq!(sim.statistics().scans_applied, 1);
    assert_eq!(sim.statistics().tasks_cancelled, 1);
}

/// Switching to an order with no lines ends the scanning session
#[test]
fn test_selecting_empty_order_stops_scanning() {
    let reference = reference_catalog().unwrap();
    let mut orders = reference.purchase_orders().to_vec();
    orders.push(PurchaseOrder {
        id: PurchaseOrderId::from("PO-EMPTY"),
        po_number: "PO-EMPTY-000".to_string(),
        supplier_name: "Nobody".to_string(),
        order_date: start().date_naive(),
        status: PurchaseOrderStatus::Pending,
        items: Vec::new(),
    });
    let catalog = Catalog::new(reference.products().to_vec(), orders, reference.layout().clone()).unwrap();
    let mut sim = KioskSimulation::new(seeded_config(9), catalog).unwrap().with_start_time(start());

    sim.select_purchase_order(&PurchaseOrderId::from("PO2024001")).unwrap();
    sim.start_scanning().unwrap();
    sim.advance(Duration::seconds(5)).unwrap();
    let batches = sim.statistics().scan_batches_planned;
    assert_eq!(batches, 1);

    sim.select_purchase_order(&PurchaseOrderId::from("PO-EMPTY")).unwrap();
    assert!(!sim.stock_in().is_scanning());
    assert!(sim.scan_ticker().is_none());
    assert_eq!(sim.scheduler().pending_in_group(TaskGroup::ScanTicker), 0);
    assert_eq!(sim.scheduler().pending_in_group(TaskGroup::ScanApply), 0);

    sim.advance(Duration::seconds(30)).unwrap();
    assert_eq!(sim.statistics().scan_batches_planned, batches);
    assert!(sim.stock_in().results().is_empty());
    assert!(sim.start_scanning().is_err());
}

/// Stopping scanning leaves no task that can still mutate the table
#[test]
fn test_stop_then_restart_scanning() {
    let mut sim = simulation(3);
    sim.select_purchase_order(&PurchaseOrderId::from("PO2024001")).unwrap();
    let first = sim.start_scanning().unwrap();
    sim.advance(Duration::seconds(30)).unwrap();

    assert!(sim.stop_scanning());
    assert!(!sim.stop_scanning());
    assert_eq!(sim.scheduler().pending(), 0);

    let frozen = sim.stock_in().results().clone();
    sim.advance(Duration::minutes(2)).unwrap();
    assert_eq!(sim.stock_in().results(), &frozen);

    let second = sim.start_scanning().unwrap();
    assert_ne!(first, second);
    assert_eq!(sim.scheduler().pending_in_group(TaskGroup::ScanTicker), 1);
    sim.advance(Duration::seconds(8)).unwrap();
    assert!(sim.stock_in().results().total_scanned_units() > frozen.total_scanned_units());
}

/// Both engines share one queue without interfering
#[test]
fn test_scanning_and_monitoring_together() {
    let mut sim = simulation(4);
    sim.select_purchase_order(&PurchaseOrderId::from("PO2024003")).unwrap();
    sim.toggle_monitoring().unwrap();
    sim.start_scanning().unwrap();

    sim.advance(Duration::seconds(60)).unwrap();
    let stats = sim.statistics();
    assert_eq!(stats.scan_batches_planned, 15);
    assert_eq!(stats.monitor_ticks, 12);
    assert_eq!(stats.simulated_ms, 60_000);
    assert_eq!(stats.stock_decreases + stats.misplacements, {
        let log = sim.notifications();
        (log.of_kind(NotificationKind::StockUpdated).count() + log.of_kind(NotificationKind::ItemMisplaced).count())
            as u64
    });

    // the monitor works on its own copy; the catalog keeps the reference stock
    let snapshot = sim.snapshot();
    assert_eq!(snapshot.alerts.low_stock.len(), sim.monitor().alerts().low_stock.len());
    assert!(snapshot.monitoring_active);
    assert!(snapshot.is_scanning);
    assert_eq!(sim.catalog().products(), reference_catalog().unwrap().products());
}

/// The same seed and start time reproduce the same run
#[test]
fn test_seeded_runs_are_reproducible() {
    let run = |seed: u64| {
        let mut sim = simulation(seed);
        sim.select_purchase_order(&PurchaseOrderId::from("PO2024002")).unwrap();
        sim.toggle_monitoring().unwrap();
        sim.start_scanning().unwrap();
        sim.advance(Duration::seconds(90)).unwrap();
        serde_json::to_value(sim.snapshot()).unwrap()
    };

    assert_eq!(run(77), run(77));
    assert_ne!(run(77)["reconciliation"], run(78)["reconciliation"]);
}

/// Negative advances are rejected and leave the clock alone
#[test]
fn test_negative_advance_rejected() {
    let mut sim = simulation(5);
    let before = sim.now();
    let err = sim.advance(Duration::seconds(-1)).unwrap_err();
    assert!(matches!(err, SimulationError::SchedulerError(_)));
    assert_eq!(sim.now(), before);

    assert_eq!(sim.advance(Duration::zero()).unwrap(), 0);
    assert_eq!(sim.now(), before);
}

/// Periods and runs beyond the calendar are errors, not panics
#[test]
fn test_out_of_range_timing_rejected() {
    let config = SimulationConfig { scan_interval_ms: 9_000_000_000_000_000_000, ..seeded_config(8) };
    let err = KioskSimulation::new(config, reference_catalog().unwrap()).unwrap_err();
    assert!(matches!(err, SimulationError::ConfigurationError(_)));

    let config = SimulationConfig { duration_secs: 10_000_000_000_000_000, ..seeded_config(8) };
    assert!(KioskSimulation::new(config, reference_catalog().unwrap()).is_err());

    let mut sim = simulation(8);
    sim.select_purchase_order(&PurchaseOrderId::from("PO2024001")).unwrap();
    sim.start_scanning().unwrap();
    let before = sim.now();
    let err = sim.advance(Duration::days(1_000_000_000)).unwrap_err();
    assert!(matches!(err, SimulationError::SchedulerError(_)));
    assert_eq!(sim.now(), before);
    assert_eq!(sim.scheduler().pending_in_group(TaskGroup::ScanTicker), 1);
}

/// Kiosk events land in the JSONL log
#[test]
fn test_event_log_written_as_jsonl() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("kiosk_events.jsonl");
    let sink = JsonlEventSink::create(&path).unwrap();

    let script = ReplayScanSource::new(vec![ScanEvent::new(KOPI_O, 3)]);
    let mut sim = simulation(6).with_scan_source(Box::new(script)).with_event_sink(Box::new(sink));
    sim.select_purchase_order(&PurchaseOrderId::from("PO2024002")).unwrap();
    sim.start_scanning().unwrap();
    sim.advance(Duration::seconds(5)).unwrap();
    sim.stop_scanning();
    sim.finalize_shipment().unwrap();
    sim.shutdown();

    let content = fs::read_to_string(&path).unwrap();
    let records: Vec<KioskEventRecord> = content
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    let events: Vec<&str> = records.iter().map(|r| r.event.as_str()).collect();
    assert_eq!(
        events,
        vec![
            "stock_in_po_selected",
            "stock_in_scanning_started",
            "stock_in_scan_applied",
            "stock_in_scanning_stopped",
            "stock_in_shipment_finalized",
            "metric",
        ]
    );

    let kiosk_id = sim.monitoring_service().kiosk_id();
    assert!(records.iter().all(|r| &r.kiosk_id == kiosk_id));
    assert!(records.windows(2).all(|pair| pair[0].timestamp <= pair[1].timestamp));
    assert_eq!(records[2].data["quantity"], 3);
    assert_eq!(records[5].data["metricType"], "stock_in_units_scanned");
    assert_eq!(records[5].data["value"], 3.0);
    assert_eq!(sim.monitoring_service().records_written(), 6);
    assert_eq!(sim.monitoring_service().failures(), 0);
}

/// Shelf mutations reach the event log with their details
#[test]
fn test_monitor_mutations_logged_with_data() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("shelf_events.jsonl");
    let sink = JsonlEventSink::create(&path).unwrap();

    let config = SimulationConfig {
        stock_decay_probability: 1.0,
        misplacement_probability: 1.0,
        ..seeded_config(10)
    };
    let mut sim = KioskSimulation::new(config, reference_catalog().unwrap())
        .unwrap()
        .with_start_time(start())
        .with_event_sink(Box::new(sink));
    sim.toggle_monitoring().unwrap();
    sim.advance(Duration::seconds(20)).unwrap();
    sim.shutdown();

    let records: Vec<KioskEventRecord> = fs::read_to_string(&path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    let shelf_events: Vec<&KioskEventRecord> = records
        .iter()
        .filter(|r| r.event == "shelf_stock_decreased" || r.event == "shelf_item_misplaced")
        .collect();

    let stats = sim.statistics();
    assert_eq!(stats.monitor_ticks, 4);
    assert_eq!(stats.misplacements, 4);
    assert_eq!(shelf_events.len() as u64, stats.stock_decreases + stats.misplacements);
    for record in shelf_events {
        assert!(record.data["type"].is_string());
        assert!(!record.data["product_id"].is_null());
    }
}
