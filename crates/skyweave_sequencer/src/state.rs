// SPDX-License-Identifier: MIT OR Apache-2.0
//! Cache of the last computed schedules.
//!
//! [`SchedulerState`] is owned by the host and recomputes on demand.
//! Readers on other threads can hold a [`SharedSchedule`]; it only ever
//! sees complete schedules because publishing swaps an `Arc`.

use crate::schedule::Schedule;
use crate::scheduler::compute_schedule;
use indexmap::IndexMap;
use parking_lot::RwLock;
use skyweave_graph::Graph;
use std::sync::Arc;

/// Read-only handle to the most recently published schedule
#[derive(Debug, Clone, Default)]
pub struct SharedSchedule {
    inner: Arc<RwLock<Option<Arc<Schedule>>>>,
}

impl SharedSchedule {
    /// Create an empty handle
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the published schedule
    pub fn publish(&self, schedule: Arc<Schedule>) {
        *self.inner.write() = Some(schedule);
    }

    /// Latest published schedule
    pub fn current(&self) -> Option<Arc<Schedule>> {
        self.inner.read().clone()
    }

    /// Drop the published schedule
    pub fn clear(&self) {
        *self.inner.write() = None;
    }
}

/// Scheduler state kept by the host between passes
#[derive(Debug, Default)]
pub struct SchedulerState {
    /// Last schedule per graph name
    schedules: IndexMap<String, Arc<Schedule>>,
    /// Optional handle readers watch
    shared: Option<SharedSchedule>,
    /// Number of completed passes
    generation: u64,
}

impl SchedulerState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Also publish every recomputed schedule to `shared`
    pub fn with_shared(mut self, shared: SharedSchedule) -> Self {
        self.shared = Some(shared);
        self
    }

    /// Recompute the schedule of `graph` from scratch and cache it
    pub fn recompute(&mut self, graph: &mut Graph) -> Arc<Schedule> {
        let schedule = Arc::new(compute_schedule(graph));
        self.schedules.insert(graph.name.clone(), Arc::clone(&schedule));
        if let Some(shared) = &self.shared {
            shared.publish(Arc::clone(&schedule));
        }
        self.generation += 1;
        tracing::debug!(
            "Cached schedule of '{}' ({} entries, pass {})",
            graph.name,
            schedule.len(),
            self.generation
        );
        schedule
    }

    /// Cached schedule of a graph
    pub fn get_cached(&self, graph_name: &str) -> Option<Arc<Schedule>> {
        self.schedules.get(graph_name).cloned()
    }

    /// Names of graphs with a cached schedule
    pub fn graph_names(&self) -> impl Iterator<Item = &str> {
        self.schedules.keys().map(String::as_str)
    }

    /// Number of completed passes
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Forget the schedule of a graph
    pub fn invalidate(&mut self, graph_name: &str) -> Option<Arc<Schedule>> {
        self.schedules.shift_remove(graph_name)
    }
}
