//! Cancellable virtual-time task scheduler
//!
//! Both simulation engines run on one [`TaskScheduler`]: periodic tickers and
//! the staggered one-shot scan applications are entries in a single queue
//! ordered by due time and then insertion order. Nothing runs on its own; the
//! orchestrator pops due tasks and dispatches them, so cancelling a task (or a
//! whole [`TaskGroup`]) takes effect before the next pop.

use crate::simulation::{SimulationError, SimulationResult};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::{debug, trace, warn};

/// Kind of work a task belongs to, used for group cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskGroup {
    /// Periodic scan batch generator
    ScanTicker,
    /// Deferred application of a single scan event
    ScanApply,
    /// Periodic shelf-monitor mutator
    ShelfMonitor,
}

impl fmt::Display for TaskGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskGroup::ScanTicker => write!(f, "scan-ticker"),
            TaskGroup::ScanApply => write!(f, "scan-apply"),
            TaskGroup::ShelfMonitor => write!(f, "shelf-monitor"),
        }
    }
}

/// Handle of a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

impl TaskHandle {
    /// Raw handle value
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// A task popped from the queue, ready to dispatch
#[derive(Debug, Clone, PartialEq)]
pub struct FiredTask<T> {
    /// Handle the task was scheduled under
    pub handle: TaskHandle,
    /// Group the task belongs to
    pub group: TaskGroup,
    /// Time the task was due
    pub due: DateTime<Utc>,
    /// Work item
    pub payload: T,
}

#[derive(Debug, Clone)]
struct TaskEntry<T> {
    handle: TaskHandle,
    group: TaskGroup,
    period: Option<Duration>,
    payload: T,
}

type QueueKey = (DateTime<Utc>, u64);

/// Single-threaded queue of one-shot and periodic tasks
#[derive(Debug)]
pub struct TaskScheduler<T> {
    queue: BTreeMap<QueueKey, TaskEntry<T>>,
    keys: HashMap<TaskHandle, QueueKey>,
    next_seq: u64,
    next_handle: u64,
    cancelled_total: u64,
}

impl<T: Clone> TaskScheduler<T> {
    /// Create an empty scheduler
    pub fn new() -> Self {
        Self {
            queue: BTreeMap::new(),
            keys: HashMap::new(),
            next_seq: 0,
            next_handle: 0,
            cancelled_total: 0,
        }
    }

    fn insert(&mut self, due: DateTime<Utc>, entry: TaskEntry<T>) {
        let key = (due, self.next_seq);
        self.next_seq += 1;
        self.keys.insert(entry.handle, key);
        self.queue.insert(key, entry);
    }

    fn allocate_handle(&mut self) -> TaskHandle {
        let handle = TaskHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    /// Schedule a task that fires once at `due`
    pub fn schedule_once(&mut self, due: DateTime<Utc>, group: TaskGroup, payload: T) -> TaskHandle {
        let handle = self.allocate_handle();
        trace!(handle = handle.0, %group, %due, "scheduled one-shot task");
        self.insert(due, TaskEntry { handle, group, period: None, payload });
        handle
    }

    /// Schedule a task that fires at `first_due` and then every `period`
    pub fn schedule_periodic(
        &mut self,
        first_due: DateTime<Utc>,
        period: Duration,
        group: TaskGroup,
        payload: T,
    ) -> SimulationResult<TaskHandle> {
        if period <= Duration::zero() {
            return Err(SimulationError::scheduler_error(format!(
                "periodic {} task needs a positive period, got {}",
                group, period
            )));
        }
        let handle = self.allocate_handle();
        debug!(handle = handle.0, %group, period_ms = period.num_milliseconds(), "scheduled periodic task");
        self.insert(first_due, TaskEntry { handle, group, period: Some(period), payload });
        Ok(handle)
    }

    /// Pop the earliest task due at or before `until`
    ///
    /// Periodic tasks are re-queued one period after the time they were due,
    /// keeping their handle.
    pub fn pop_due(&mut self, until: DateTime<Utc>) -> Option<FiredTask<T>> {
        let (&key, _) = self.queue.iter().next()?;
        if key.0 > until {
            return None;
        }
        let entry = self.queue.remove(&key)?;
        self.keys.remove(&entry.handle);

        let fired = FiredTask {
            handle: entry.handle,
            group: entry.group,
            due: key.0,
            payload: entry.payload.clone(),
        };
        if let Some(period) = entry.period {
            match key.0.checked_add_signed(period) {
                Some(next) => self.insert(next, entry),
                None => warn!(handle = entry.handle.0, group = %entry.group, "periodic task ran off the calendar"),
            }
        }
        Some(fired)
    }

    /// Due time of the earliest pending task
    pub fn next_due(&self) -> Option<DateTime<Utc>> {
        self.queue.keys().next().map(|key| key.0)
    }

    /// Cancel one task; returns whether it was pending
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        match self.keys.remove(&handle) {
            Some(key) => {
                self.queue.remove(&key);
                self.cancelled_total += 1;
                true
            }
            None => false,
        }
    }

    /// Cancel every pending task in a group; returns how many were removed
    pub fn cancel_group(&mut self, group: TaskGroup) -> usize {
        let doomed: Vec<TaskHandle> = self
            .queue
            .values()
            .filter(|entry| entry.group == group)
            .map(|entry| entry.handle)
            .collect();
        let count = doomed.into_iter().filter(|&handle| self.cancel(handle)).count();
        if count > 0 {
            debug!(%group, count, "cancelled task group");
        }
        count
    }

    /// Cancel everything; used on teardown
    pub fn cancel_all(&mut self) -> usize {
        let count = self.queue.len();
        self.queue.clear();
        self.keys.clear();
        self.cancelled_total += count as u64;
        count
    }

    /// Whether a handle is still pending
    pub fn is_scheduled(&self, handle: TaskHandle) -> bool {
        self.keys.contains_key(&handle)
    }

    /// Number of pending tasks
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Number of pending tasks in a group
    pub fn pending_in_group(&self, group: TaskGroup) -> usize {
        self.queue.values().filter(|entry| entry.group == group).count()
    }

    /// Tasks cancelled over the scheduler's lifetime
    pub fn cancelled_total(&self) -> u64 {
        self.cancelled_total
    }
}

impl<T: Clone> Default for TaskScheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}
