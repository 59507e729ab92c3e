//! Main simulation orchestrator
//!
//! [`KioskSimulation`] owns the catalog, both engines and the single task
//! queue they share. Every timer in the kiosk (the scan ticker, the staggered
//! scan applications and the shelf-monitor ticker) is a task on that queue, so
//! stopping an engine cancels its pending work before the call returns.

use crate::catalog::Catalog;
use crate::monitoring::{AlertSnapshot, MonitorMutation, MonitorSettings, ShelfMonitor, ShelfView};
use crate::simulation::{
    EventSink, KioskStatistics, MonitoringService, NotificationLog, NotificationSink, SimulationError,
    SimulationResult, TaskGroup, TaskHandle, TaskScheduler, TimeManager,
};
use crate::stock_in::{
    RandomScanGenerator, ScanEvent, ScanEventSource, ScanOutcome, ShipmentSummary, StockInEngine,
    StockInScanResult,
};
use crate::types::{ProductId, PurchaseOrderId, SessionId, SimulationConfig};
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

/// Work items on the shared task queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimTask {
    /// Plan the next scan batch
    ScanTick,
    /// Apply one scan planned under `session`
    ApplyScan {
        /// Session the scan was planned in
        session: SessionId,
        /// The scan to apply
        event: ScanEvent,
    },
    /// Run one shelf-monitor mutation round
    MonitorTick,
}

/// Point-in-time view of the whole kiosk
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationSnapshot {
    /// Simulated time of the snapshot
    pub timestamp: DateTime<Utc>,
    /// Selected purchase order number
    pub purchase_order: Option<String>,
    /// Whether scanning is active
    pub is_scanning: bool,
    /// Reconciliation rows
    pub reconciliation: Vec<StockInScanResult>,
    /// Whether the shelf monitor is active
    pub monitoring_active: bool,
    /// Current alert sets
    pub alerts: AlertSnapshot,
    /// Products grouped by observed shelf
    pub shelves: Vec<ShelfView>,
    /// Run counters
    pub statistics: KioskStatistics,
}

/// Headless kiosk: catalog, both engines, and their shared task queue
#[derive(Debug)]
pub struct KioskSimulation {
    config: SimulationConfig,
    catalog: Catalog,
    time_manager: TimeManager,
    scheduler: TaskScheduler<SimTask>,
    stock_in: StockInEngine,
    monitor: ShelfMonitor,
    scan_source: Box<dyn ScanEventSource>,
    /// Random source for the shelf monitor
    rng: StdRng,
    notifications: NotificationLog,
    monitoring: MonitoringService,
    statistics: KioskStatistics,
    scan_ticker: Option<TaskHandle>,
    monitor_ticker: Option<TaskHandle>,
}

impl KioskSimulation {
    /// Create a simulation over `catalog`
    #[instrument(skip(config, catalog), fields(products = catalog.product_count()))]
    pub fn new(config: SimulationConfig, catalog: Catalog) -> SimulationResult<Self> {
        config
            .validate()
            .map_err(|e| SimulationError::configuration_error(e.to_string()))?;

        let rng = match config.seed {
            Some(seed) => {
                info!("Using deterministic seed: {}", seed);
                StdRng::seed_from_u64(seed.wrapping_add(3))
            }
            None => {
                debug!("Using entropy-based random seed");
                StdRng::from_entropy()
            }
        };

        let statistics = KioskStatistics::new(
            catalog.product_count(),
            catalog.purchase_orders().len(),
            catalog.layout().shelf_count(),
        );
        let monitor = ShelfMonitor::new(&catalog, MonitorSettings::from_config(&config));

        info!(
            "Kiosk simulation initialized with {} products, {} purchase orders and {} shelves",
            statistics.total_products, statistics.total_purchase_orders, statistics.total_shelves
        );
        Ok(Self {
            stock_in: StockInEngine::new(&config),
            scan_source: Box::new(RandomScanGenerator::from_config(&config)),
            config,
            catalog,
            time_manager: TimeManager::new(),
            scheduler: TaskScheduler::new(),
            monitor,
            rng,
            notifications: NotificationLog::new(),
            monitoring: MonitoringService::disabled(),
            statistics,
            scan_ticker: None,
            monitor_ticker: None,
        })
    }

    /// Replace the scan producer
    pub fn with_scan_source(mut self, source: Box<dyn ScanEventSource>) -> Self {
        self.scan_source = source;
        self
    }

    /// Send kiosk event records to `sink`
    pub fn with_event_sink(mut self, sink: Box<dyn EventSink>) -> Self {
        self.monitoring.replace_sink(sink);
        self
    }

    /// Replace the monitoring service
    pub fn with_monitoring_service(mut self, monitoring: MonitoringService) -> Self {
        self.monitoring = monitoring;
        self
    }

    /// Start the virtual clock at a fixed instant
    ///
    /// Only meaningful before anything has been scheduled.
    pub fn with_start_time(mut self, start: DateTime<Utc>) -> Self {
        self.time_manager = TimeManager::starting_at(start);
        self
    }

    /// Select the purchase order to receive
    ///
    /// Scans planned for the previous order are cancelled. Selecting an order
    /// with no lines while scanning also stops the scan ticker.
    pub fn select_purchase_order(&mut self, id: &PurchaseOrderId) -> SimulationResult<()> {
        let result = self.stock_in.select_purchase_order(id, &self.catalog);
        if result.is_ok() {
            self.cancel_group(TaskGroup::ScanApply);
            let rows = self.stock_in.results().len();
            self.log_event("stock_in_po_selected", json!({ "purchaseOrderId": id, "rows": rows }));
            if self.scan_ticker.is_some() && !self.stock_in.is_scanning() {
                self.cancel_scanning_tasks();
                self.log_event("stock_in_scanning_stopped", json!({ "reason": "empty_purchase_order" }));
            }
        }
        self.forward_notifications();
        result
    }

    /// Start scanning and schedule the scan ticker
    pub fn start_scanning(&mut self) -> SimulationResult<SessionId> {
        let period = period_from_ms("scan_interval_ms", self.config.scan_interval_ms)?;
        let first_due = self.due_after(period)?;
        let session = match self.stock_in.start_scanning() {
            Ok(session) => session,
            Err(e) => {
                self.statistics.rejected_scan_starts += 1;
                self.forward_notifications();
                return Err(e);
            }
        };

        if self.scan_ticker.is_none() {
            let handle = self.scheduler.schedule_periodic(first_due, period, TaskGroup::ScanTicker, SimTask::ScanTick)?;
            self.scan_ticker = Some(handle);
            self.log_event("stock_in_scanning_started", json!({ "session": session }));
        }
        self.forward_notifications();
        Ok(session)
    }

    /// Stop scanning; pending ticks and scan applications are cancelled first
    pub fn stop_scanning(&mut self) -> bool {
        self.cancel_scanning_tasks();
        let was_scanning = self.stock_in.stop_scanning();
        if was_scanning {
            self.log_event("stock_in_scanning_stopped", json!({}));
        }
        self.forward_notifications();
        was_scanning
    }

    /// Close the current stock-in session
    pub fn finalize_shipment(&mut self) -> SimulationResult<ShipmentSummary> {
        let result = self.stock_in.finalize_shipment();
        if let Ok(summary) = &result {
            self.cancel_scanning_tasks();
            self.statistics.record_finalize(summary.has_discrepancies);

            let now = self.now();
            self.monitoring.log_event(
                "stock_in_shipment_finalized",
                json!({
                    "poNumber": summary.po_number,
                    "hasDiscrepancies": summary.has_discrepancies,
                    "statusCounts": summary.status_counts,
                }),
                now,
            );
            let labels = BTreeMap::from([("poNumber".to_string(), summary.po_number.clone())]);
            self.monitoring
                .record_metric("stock_in_units_scanned", summary.total_scanned_units as f64, labels, now);
        }
        self.forward_notifications();
        result
    }

    /// Turn shelf monitoring on or off; returns the new state
    ///
    /// Turning it off cancels the pending monitor tick. The ticker is scheduled
    /// before the monitor is switched on, so a failure leaves it off.
    pub fn toggle_monitoring(&mut self) -> SimulationResult<bool> {
        if !self.monitor.is_active() {
            let period = period_from_ms("monitor_interval_ms", self.config.monitor_interval_ms)?;
            let first_due = self.due_after(period)?;
            let handle =
                self.scheduler.schedule_periodic(first_due, period, TaskGroup::ShelfMonitor, SimTask::MonitorTick)?;
            self.monitor_ticker = Some(handle);
        }
        let active = self.monitor.toggle_monitoring();
        if !active {
            self.cancel_group(TaskGroup::ShelfMonitor);
            self.monitor_ticker = None;
        }
        self.log_event("shelf_monitoring_toggled", json!({ "active": active }));
        self.forward_notifications();
        Ok(active)
    }

    /// Apply a scan immediately, bypassing the ticker
    pub fn apply_scan_event(&mut self, product_id: ProductId, quantity: u32) -> SimulationResult<ScanOutcome> {
        let today = self.time_manager.today();
        let product = self
            .catalog
            .get_product(product_id)
            .ok_or(SimulationError::UnknownProduct(product_id))?;
        let result = self.stock_in.apply_scan_event(product, quantity, today);
        if let Ok(outcome) = &result {
            self.record_scan(outcome, quantity);
        }
        self.forward_notifications();
        result
    }

    /// Run every task due within the next `duration` of simulated time
    ///
    /// Returns the number of tasks fired. The clock ends exactly `duration`
    /// later even when nothing was due.
    #[instrument(skip(self), fields(duration_ms = duration.num_milliseconds()))]
    pub fn advance(&mut self, duration: Duration) -> SimulationResult<usize> {
        if duration < Duration::zero() {
            return Err(SimulationError::scheduler_error(format!(
                "cannot advance by a negative duration ({})",
                duration
            )));
        }
        let target = self.due_after(duration)?;
        let mut fired = 0;
        while let Some(task) = self.scheduler.pop_due(target) {
            self.time_manager.advance_to(task.due);
            self.dispatch(task.payload);
            fired += 1;
        }
        self.time_manager.advance_to(target);
        self.statistics.simulated_ms = self.time_manager.elapsed().num_milliseconds();
        debug!(fired, pending = self.scheduler.pending(), "advanced simulation clock");
        Ok(fired)
    }

    fn dispatch(&mut self, task: SimTask) {
        match task {
            SimTask::ScanTick => self.run_scan_tick(),
            SimTask::ApplyScan { session, event } => self.run_scheduled_scan(session, event),
            SimTask::MonitorTick => self.run_monitor_tick(),
        }
        self.forward_notifications();
    }

    fn run_scan_tick(&mut self) {
        let Some((session, batch)) = self.stock_in.plan_scan_batch(self.scan_source.as_mut(), &self.catalog) else {
            return;
        };
        self.statistics.scan_batches_planned += 1;
        let now = self.now();
        debug!(%session, scans = batch.len(), "planned scan batch");
        for planned in batch {
            let Some(due) = now.checked_add_signed(planned.delay) else {
                warn!(product_id = %planned.event.product_id, "Scan stagger out of range, scan dropped");
                continue;
            };
            self.scheduler
                .schedule_once(due, TaskGroup::ScanApply, SimTask::ApplyScan { session, event: planned.event });
        }
    }

    fn run_scheduled_scan(&mut self, session: SessionId, event: ScanEvent) {
        let today = self.time_manager.today();
        match self.stock_in.apply_scheduled_scan(session, event, &self.catalog, today) {
            Ok(Some(outcome)) => self.record_scan(&outcome, event.quantity),
            Ok(None) => self.statistics.stale_scans_discarded += 1,
            Err(e) => warn!(product_id = %event.product_id, "Scheduled scan failed: {}", e),
        }
    }

    fn run_monitor_tick(&mut self) {
        let report = self.monitor.tick(&mut self.rng);
        if !report.active {
            return;
        }
        self.statistics.monitor_ticks += 1;
        for mutation in &report.mutations {
            match mutation {
                MonitorMutation::StockDecreased { from, to, .. } => {
                    self.statistics.record_stock_decrease(from - to);
                }
                MonitorMutation::Misplaced { .. } => self.statistics.misplacements += 1,
            }
            let event = match mutation {
                MonitorMutation::StockDecreased { .. } => "shelf_stock_decreased",
                MonitorMutation::Misplaced { .. } => "shelf_item_misplaced",
            };
            match serde_json::to_value(mutation) {
                Ok(data) => self.log_event(event, data),
                Err(e) => warn!(event, "Failed to serialize monitor mutation: {}", e),
            }
        }
    }

    fn record_scan(&mut self, outcome: &ScanOutcome, quantity: u32) {
        self.statistics
            .record_scan(quantity, outcome.is_unexpected(), outcome.expiry_assigned.is_some());
        self.log_event(
            "stock_in_scan_applied",
            json!({
                "productId": outcome.row.product_id,
                "quantity": quantity,
                "scannedQuantity": outcome.row.scanned_quantity,
                "status": outcome.row.status.to_string(),
            }),
        );
    }

    fn due_after(&self, delay: Duration) -> SimulationResult<DateTime<Utc>> {
        self.now().checked_add_signed(delay).ok_or_else(|| {
            SimulationError::scheduler_error(format!("{} from {} is past the end of the calendar", delay, self.now()))
        })
    }

    fn cancel_scanning_tasks(&mut self) {
        self.cancel_group(TaskGroup::ScanTicker);
        self.cancel_group(TaskGroup::ScanApply);
        self.scan_ticker = None;
    }

    fn cancel_group(&mut self, group: TaskGroup) {
        let cancelled = self.scheduler.cancel_group(group);
        self.statistics.tasks_cancelled += cancelled as u64;
    }

    fn forward_notifications(&mut self) {
        let pending = self.stock_in.drain_notifications().into_iter().chain(self.monitor.drain_notifications());
        for notification in pending {
            self.notifications.notify(notification);
        }
    }

    fn log_event(&mut self, event: &str, data: serde_json::Value) {
        let now = self.now();
        self.monitoring.log_event(event, data, now);
    }

    /// Cancel everything and stop both engines
    ///
    /// Returns the number of pending tasks cancelled.
    pub fn shutdown(&mut self) -> usize {
        let cancelled = self.scheduler.cancel_all();
        self.statistics.tasks_cancelled += cancelled as u64;
        self.scan_ticker = None;
        self.monitor_ticker = None;
        self.stock_in.stop_scanning();
        if self.monitor.is_active() {
            self.monitor.toggle_monitoring();
        }
        self.forward_notifications();
        self.monitoring.flush();
        info!(cancelled, "Kiosk simulation shut down");
        cancelled
    }

    /// Snapshot of both engines and the counters
    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            timestamp: self.now(),
            purchase_order: self.stock_in.current_purchase_order().map(|po| po.po_number.clone()),
            is_scanning: self.stock_in.is_scanning(),
            reconciliation: self.stock_in.results().rows().to_vec(),
            monitoring_active: self.monitor.is_active(),
            alerts: self.monitor.alerts().clone(),
            shelves: self.monitor.shelf_overview(),
            statistics: self.statistics.clone(),
        }
    }

    /// Current simulated time
    pub fn now(&self) -> DateTime<Utc> {
        self.time_manager.current_simulated_time()
    }

    /// Simulation configuration
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Product catalog
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Stock-in engine
    pub fn stock_in(&self) -> &StockInEngine {
        &self.stock_in
    }

    /// Shelf monitor
    pub fn monitor(&self) -> &ShelfMonitor {
        &self.monitor
    }

    /// Task queue
    pub fn scheduler(&self) -> &TaskScheduler<SimTask> {
        &self.scheduler
    }

    /// Notifications delivered so far
    pub fn notifications(&self) -> &NotificationLog {
        &self.notifications
    }

    /// Monitoring service receiving kiosk event records
    pub fn monitoring_service(&self) -> &MonitoringService {
        &self.monitoring
    }

    /// Run counters
    pub fn statistics(&self) -> &KioskStatistics {
        &self.statistics
    }

    /// Handle of the running scan ticker
    pub fn scan_ticker(&self) -> Option<TaskHandle> {
        self.scan_ticker
    }

    /// Handle of the running monitor ticker
    pub fn monitor_ticker(&self) -> Option<TaskHandle> {
        self.monitor_ticker
    }
}

fn period_from_ms(field: &str, ms: u64) -> SimulationResult<Duration> {
    i64::try_from(ms)
        .ok()
        .and_then(Duration::try_milliseconds)
        .ok_or_else(|| SimulationError::scheduler_error(format!("{} of {} ms is out of range", field, ms)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::reference_catalog;
    use crate::simulation::NotificationKind;
    use crate::stock_in::ReplayScanSource;

    fn config() -> SimulationConfig {
        SimulationConfig { seed: Some(42), ..Default::default() }
    }

    fn simulation() -> KioskSimulation {
        KioskSimulation::new(config(), reference_catalog().unwrap()).unwrap()
    }

    #[test]
    fn test_orchestrator_creation() {
        let sim = simulation();
        assert_eq!(sim.statistics().total_products, 32);
        assert_eq!(sim.statistics().total_purchase_orders, 3);
        assert_eq!(sim.statistics().total_shelves, 5);
        assert_eq!(sim.scheduler().pending(), 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let bad = SimulationConfig { scan_interval_ms: 0, ..Default::default() };
        let err = KioskSimulation::new(bad, reference_catalog().unwrap()).unwrap_err();
        assert_eq!(err.category(), "Configuration");
    }

    #[test]
    fn test_rejected_start_counts_and_warns() {
        let mut sim = simulation();
        assert!(sim.start_scanning().is_err());
        assert_eq!(sim.statistics().rejected_scan_starts, 1);
        assert_eq!(sim.notifications().of_kind(NotificationKind::ScanRejected).count(), 1);
        assert!(sim.scan_ticker().is_none());
    }

    #[test]
    fn test_ticker_drives_scans() {
        let mut sim = simulation();
        sim.select_purchase_order(&PurchaseOrderId::from("PO2024002")).unwrap();
        sim.start_scanning().unwrap();

        let fired = sim.advance(Duration::seconds(20)).unwrap();
        assert!(fired >= 5);
        assert_eq!(sim.statistics().scan_batches_planned, 5);
        assert!(sim.statistics().scans_applied >= 5);
        assert!(sim.stock_in().results().total_scanned_units() > 0);
    }

    #[test]
    fn test_stop_cancels_pending_scans() {
        let source = ReplayScanSource::new(vec![ScanEvent::new(ProductId(5), 2), ScanEvent::new(ProductId(6), 3)])
            .with_batch_size(2)
            .with_stagger(Duration::milliseconds(300));
        let mut sim = simulation().with_scan_source(Box::new(source));
        sim.select_purchase_order(&PurchaseOrderId::from("PO2024002")).unwrap();
        sim.start_scanning().unwrap();

        // the tick at 4000ms applies the first scan and defers the second to 4300ms
        sim.advance(Duration::milliseconds(4100)).unwrap();
        assert_eq!(sim.statistics().scans_applied, 1);
        assert_eq!(sim.scheduler().pending_in_group(TaskGroup::ScanApply), 1);

        assert!(sim.stop_scanning());
        assert_eq!(sim.scheduler().pending(), 0);
        sim.advance(Duration::seconds(10)).unwrap();
        assert_eq!(sim.statistics().scans_applied, 1);
        assert_eq!(sim.stock_in().results().total_scanned_units(), 2);
    }

    #[test]
    fn test_monitoring_toggle_schedules_and_cancels() {
        let mut sim = simulation();
        assert!(sim.toggle_monitoring().unwrap());
        assert_eq!(sim.scheduler().pending_in_group(TaskGroup::ShelfMonitor), 1);

        sim.advance(Duration::seconds(25)).unwrap();
        assert_eq!(sim.statistics().monitor_ticks, 5);

        assert!(!sim.toggle_monitoring().unwrap());
        let before = sim.monitor().products().to_vec();
        sim.advance(Duration::seconds(60)).unwrap();
        assert_eq!(sim.monitor().products(), before.as_slice());
        assert_eq!(sim.statistics().monitor_ticks, 5);
    }

    #[test]
    fn test_shutdown_cancels_everything() {
        let mut sim = simulation();
        sim.select_purchase_order(&PurchaseOrderId::from("PO2024001")).unwrap();
        sim.start_scanning().unwrap();
        sim.toggle_monitoring().unwrap();

        assert_eq!(sim.shutdown(), 2);
        assert!(!sim.stock_in().is_scanning());
        assert!(!sim.monitor().is_active());
        assert_eq!(sim.advance(Duration::minutes(5)).unwrap(), 0);
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut sim = simulation();
        sim.select_purchase_order(&PurchaseOrderId::from("PO2024003")).unwrap();
        let snapshot = sim.snapshot();
        assert_eq!(snapshot.purchase_order.as_deref(), Some("PO-DEF-003"));
        assert_eq!(snapshot.reconciliation.len(), 2);
        assert_eq!(snapshot.shelves.len(), 5);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["reconciliation"][0]["status"], "Pending Scan");
    }

    #[test]
    fn test_period_conversion_is_checked() {
        assert_eq!(period_from_ms("scan_interval_ms", 4000).unwrap(), Duration::milliseconds(4000));
        let err = period_from_ms("monitor_interval_ms", u64::MAX).unwrap_err();
        assert!(matches!(err, SimulationError::SchedulerError(_)));
    }
}
