//! Virtual clock
//!
//! The simulation never sleeps. Time only moves when the orchestrator advances
//! the clock to the next due task, so a run of any length completes instantly
//! and deterministically.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::{debug, instrument, warn};

/// Monotonic virtual clock for the task scheduler and expiry dates
#[derive(Debug, Clone)]
pub struct TimeManager {
    /// When the simulation started in simulated time
    simulation_start: DateTime<Utc>,
    /// Current simulated time
    current: DateTime<Utc>,
}

impl TimeManager {
    /// Create a clock starting at the current wall-clock time
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    /// Create a clock starting at a fixed instant
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        debug!("Initializing virtual clock at {}", start);
        Self { simulation_start: start, current: start }
    }

    /// Get the current simulated time
    pub fn current_simulated_time(&self) -> DateTime<Utc> {
        self.current
    }

    /// Simulated calendar date, used as "now" for expiry assignment
    pub fn today(&self) -> NaiveDate {
        self.current.date_naive()
    }

    /// When the simulation started
    pub fn simulation_start(&self) -> DateTime<Utc> {
        self.simulation_start
    }

    /// Simulated time elapsed since start
    pub fn elapsed(&self) -> Duration {
        self.current - self.simulation_start
    }

    /// Advance the simulation time by a specific duration
    ///
    /// Negative durations are ignored; the clock never runs backwards.
    #[instrument(skip(self))]
    pub fn advance_by(&mut self, duration: Duration) {
        if duration < Duration::zero() {
            warn!("Ignoring negative clock advance of {}", duration);
            return;
        }
        self.current += duration;
    }

    /// Move the clock forward to `instant`; earlier instants are ignored
    pub fn advance_to(&mut self, instant: DateTime<Utc>) {
        if instant > self.current {
            self.current = instant;
        }
    }
}

impl Default for TimeManager {
    fn default() -> Self {
        Self::new()
    }
}
