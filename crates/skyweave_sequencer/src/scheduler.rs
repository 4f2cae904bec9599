// SPDX-License-Identifier: MIT OR Apache-2.0
//! Frame scheduling over the flow graph.
//!
//! Walks the nodes reachable from the start node in Kahn order. A node
//! starts when the last of its flow predecessors ends and lasts
//! `ceil(Duration)` frames. The start node's `Start Frame` input shifts
//! the whole timeline.
//!
//! Flow cycles cannot be ordered; nodes caught in one are placed after
//! the regular pass using whatever predecessor end frames they saw.

use crate::schedule::{Schedule, ScheduleEntry};
use skyweave_graph::graphs::show::{COLLECTION, DURATION, START_FRAME};
use skyweave_graph::{build_edges, reachable, start_nodes, FlowEdges, Graph, NodeId, ResolutionPass};
use std::collections::{HashMap, HashSet, VecDeque};

/// Error preventing a schedule from being computed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    /// The graph has no start node
    #[error("Graph '{0}' has no start node")]
    NoStartNode(String),
}

/// Relative frames of one node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NodeFrames {
    node: NodeId,
    start: i32,
    end: i32,
}

/// Number of frames a duration occupies: `ceil(duration)`, at least zero
pub fn frame_count(duration: f32) -> i32 {
    if duration.is_nan() {
        return 0;
    }
    duration.max(0.0).ceil() as i32
}

/// Compute the schedule of `graph` and record start frames on its nodes.
///
/// Structural problems are logged and yield an empty schedule.
pub fn compute_schedule(graph: &mut Graph) -> Schedule {
    match try_compute_schedule(graph) {
        Ok(schedule) => {
            annotate(graph, &schedule);
            schedule
        }
        Err(e) => {
            tracing::warn!("Skipping schedule: {e}");
            Schedule::empty(graph.name.clone())
        }
    }
}

/// Compute the schedule of `graph` without touching it
pub fn try_compute_schedule(graph: &Graph) -> Result<Schedule, ScheduleError> {
    let starts = start_nodes(graph);
    let Some(&start) = starts.first() else {
        return Err(ScheduleError::NoStartNode(graph.name.clone()));
    };
    if starts.len() > 1 {
        tracing::warn!(
            "Graph '{}' has {} start nodes, using the first",
            graph.name,
            starts.len()
        );
    }

    let edges = build_edges(graph);
    let reachable = reachable(start, &edges);
    let mut pass = ResolutionPass::new(graph);

    let frames = plan_frames(start, &reachable, &edges, &mut pass);
    let offset = pass.resolve_i32(start, START_FRAME, 0);

    let mut entries = Vec::with_capacity(frames.len().saturating_sub(1));
    for timing in frames.into_iter().filter(|f| f.node != start) {
        let Some(node) = graph.node(timing.node) else {
            continue;
        };
        entries.push(ScheduleEntry {
            graph_name: graph.name.clone(),
            node_id: node.id,
            node_name: node.name.clone(),
            node_type: node.node_type.clone(),
            start_frame: timing.start.saturating_add(offset),
            end_frame: timing.end.saturating_add(offset),
            formation: pass.resolve_collection(node.id, COLLECTION),
        });
    }

    tracing::debug!(
        "Scheduled {} node(s) of '{}' ({} reachable, offset {})",
        entries.len(),
        graph.name,
        reachable.len(),
        offset
    );
    Ok(Schedule::new(graph.name.clone(), entries))
}

/// Write each entry's start frame onto its node, where the kind has the field
pub fn annotate(graph: &mut Graph, schedule: &Schedule) {
    for entry in schedule.entries() {
        if let Some(node) = graph.node_mut(entry.node_id) {
            // Value-like kinds have no such field
            let _ = node.set_computed_start_frame(entry.start_frame);
        }
    }
}

fn duration_frames(pass: &mut ResolutionPass<'_>, node_id: NodeId) -> i32 {
    let literal = pass
        .graph()
        .node(node_id)
        .and_then(|n| n.input_named(DURATION))
        .and_then(|s| s.value.as_ref())
        .and_then(|v| v.as_f32())
        .unwrap_or(0.0);
    frame_count(pass.resolve_f32(node_id, DURATION, literal))
}

fn successors<'e>(edges: &'e FlowEdges, node: &NodeId) -> &'e [NodeId] {
    edges.get(node).map(Vec::as_slice).unwrap_or(&[])
}

fn plan_frames(
    start: NodeId,
    reachable: &[NodeId],
    edges: &FlowEdges,
    pass: &mut ResolutionPass<'_>,
) -> Vec<NodeFrames> {
    let mut in_degree: HashMap<NodeId, usize> = reachable.iter().map(|n| (*n, 0)).collect();
    for node in reachable {
        for next in successors(edges, node) {
            if let Some(degree) = in_degree.get_mut(next) {
                *degree += 1;
            }
        }
    }

    let mut queue: VecDeque<NodeId> = reachable
        .iter()
        .copied()
        .filter(|n| in_degree[n] == 0)
        .collect();
    if let Some(position) = queue.iter().position(|n| *n == start) {
        queue.remove(position);
        queue.push_front(start);
    }

    // Latest end frame seen among each node's scheduled predecessors
    let mut earliest: HashMap<NodeId, i32> = HashMap::new();
    let mut finalized: HashMap<NodeId, i32> = HashMap::new();
    let mut done: HashSet<NodeId> = HashSet::new();
    let mut frames = Vec::with_capacity(reachable.len());

    while let Some(node) = queue.pop_front() {
        let start_frame = finalized
            .get(&node)
            .or_else(|| earliest.get(&node))
            .copied()
            .unwrap_or(0);
        let end_frame = start_frame.saturating_add(duration_frames(pass, node));
        frames.push(NodeFrames { node, start: start_frame, end: end_frame });
        done.insert(node);

        for next in successors(edges, &node) {
            let Some(degree) = in_degree.get_mut(next) else {
                continue;
            };
            let pending = earliest.entry(*next).or_insert(end_frame);
            *pending = (*pending).max(end_frame);
            if *degree > 0 {
                *degree -= 1;
                if *degree == 0 {
                    finalized.insert(*next, *pending);
                    queue.push_back(*next);
                }
            }
        }
    }

    if done.len() < reachable.len() {
        tracing::warn!(
            "Flow cycle: {} node(s) scheduled without a valid order",
            reachable.len() - done.len()
        );
        for &node in reachable {
            if done.contains(&node) {
                continue;
            }
            let start_frame = earliest.get(&node).copied().unwrap_or(0);
            let end_frame = start_frame.saturating_add(duration_frames(pass, node));
            frames.push(NodeFrames { node, start: start_frame, end: end_frame });
            done.insert(node);

            for next in successors(edges, &node) {
                if !done.contains(next) {
                    let pending = earliest.entry(*next).or_insert(end_frame);
                    *pending = (*pending).max(end_frame);
                }
            }
        }
    }

    frames
}
