//! Structured monitoring/log sink
//!
//! Every significant kiosk action is recorded as a [`KioskEventRecord`] and
//! handed to an [`EventSink`]. Recording is fire-and-forget: the
//! [`MonitoringService`] logs sink failures locally and never returns them to
//! the engine that produced the event.

use crate::simulation::SimulationResult;
use crate::types::KioskId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One structured event sent to the monitoring sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KioskEventRecord {
    /// Event name, e.g. `stock_in_scan_applied`
    pub event: String,
    /// Arbitrary event payload
    pub data: Value,
    /// Simulated time of the event
    pub timestamp: DateTime<Utc>,
    /// Device the event came from
    pub kiosk_id: KioskId,
    /// Operator, when known
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub user_id: Option<String>,
}

/// Destination for event records
pub trait EventSink: fmt::Debug {
    /// Write one record
    fn write_record(&mut self, record: &KioskEventRecord) -> SimulationResult<()>;

    /// Flush buffered records
    fn flush(&mut self) -> SimulationResult<()> {
        Ok(())
    }
}

/// Sink that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn write_record(&mut self, _record: &KioskEventRecord) -> SimulationResult<()> {
        Ok(())
    }
}

/// Sink writing one JSON object per line
#[derive(Debug)]
pub struct JsonlEventSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl JsonlEventSink {
    /// Create (or truncate) the output file
    pub fn create<P: AsRef<Path>>(path: P) -> SimulationResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        info!("Writing kiosk events to {}", path.display());
        Ok(Self { path, writer: BufWriter::new(file) })
    }

    /// Output path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventSink for JsonlEventSink {
    fn write_record(&mut self, record: &KioskEventRecord) -> SimulationResult<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> SimulationResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Stamps events with the device id and forwards them to a sink
#[derive(Debug)]
pub struct MonitoringService {
    kiosk_id: KioskId,
    user_id: Option<String>,
    sink: Box<dyn EventSink>,
    records_written: u64,
    failures: u64,
}

impl MonitoringService {
    /// Create a service with a generated kiosk id
    pub fn new(sink: Box<dyn EventSink>) -> Self {
        Self::with_kiosk_id(KioskId::generate(), sink)
    }

    /// Create a service for a known kiosk id
    pub fn with_kiosk_id(kiosk_id: KioskId, sink: Box<dyn EventSink>) -> Self {
        debug!(kiosk_id = %kiosk_id, "Monitoring service initialized");
        Self { kiosk_id, user_id: None, sink, records_written: 0, failures: 0 }
    }

    /// A service that records nothing
    pub fn disabled() -> Self {
        Self::new(Box::new(NullEventSink))
    }

    /// Attribute subsequent events to an operator
    pub fn set_user(&mut self, user_id: Option<String>) {
        self.user_id = user_id;
    }

    /// Replace the sink, flushing the old one first
    pub fn replace_sink(&mut self, sink: Box<dyn EventSink>) {
        self.flush();
        self.sink = sink;
    }

    /// Device id stamped on every record
    pub fn kiosk_id(&self) -> &KioskId {
        &self.kiosk_id
    }

    /// Record an event; failures are logged and swallowed
    pub fn log_event(&mut self, event: &str, data: Value, timestamp: DateTime<Utc>) {
        let record = KioskEventRecord {
            event: event.to_string(),
            data,
            timestamp,
            kiosk_id: self.kiosk_id.clone(),
            user_id: self.user_id.clone(),
        };
        match self.sink.write_record(&record) {
            Ok(()) => self.records_written += 1,
            Err(e) => {
                self.failures += 1;
                warn!(event_name = event, "Failed to record kiosk event: {}", e);
            }
        }
    }

    /// Record a metric sample as a `metric` event
    pub fn record_metric(
        &mut self,
        metric_type: &str,
        value: f64,
        labels: BTreeMap<String, String>,
        timestamp: DateTime<Utc>,
    ) {
        let data = json!({ "metricType": metric_type, "value": value, "labels": labels });
        self.log_event("metric", data, timestamp);
    }

    /// Flush the sink; failures are logged and swallowed
    pub fn flush(&mut self) {
        if let Err(e) = self.sink.flush() {
            self.failures += 1;
            warn!("Failed to flush kiosk event sink: {}", e);
        }
    }

    /// Records accepted by the sink
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Write or flush failures swallowed so far
    pub fn failures(&self) -> u64 {
        self.failures
    }
}

impl Drop for MonitoringService {
    fn drop(&mut self) {
        self.flush();
    }
}
