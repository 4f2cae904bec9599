// SPDX-License-Identifier: MIT OR Apache-2.0
//! Show scheduler for Skyweave.
//!
//! This crate turns a show graph into a timeline:
//! - Absolute start/end frame for every flow node reachable from start
//! - Dataflow-resolved durations and start offset
//! - Schedule queries in finalization or causal order
//!
//! ## Architecture
//!
//! The scheduler is built on:
//! - Kahn traversal of the flow graph
//! - A per-pass resolution cache for node inputs
//! - A host-owned state caching the last schedule per graph

pub mod schedule;
pub mod scheduler;
pub mod state;

pub use schedule::{Schedule, ScheduleEntry};
pub use scheduler::{annotate, compute_schedule, frame_count, try_compute_schedule, ScheduleError};
pub use state::{SchedulerState, SharedSchedule};
