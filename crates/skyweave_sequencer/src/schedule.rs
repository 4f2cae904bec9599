// SPDX-License-Identifier: MIT OR Apache-2.0
//! Computed show timeline.

use serde::{Deserialize, Serialize};
use skyweave_graph::{CollectionRef, NodeId};

/// Resolved timing of one flow node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Name of the graph the node belongs to
    pub graph_name: String,
    /// Scheduled node
    pub node_id: NodeId,
    /// Node name, unique within its graph
    pub node_name: String,
    /// Node type ID
    pub node_type: String,
    /// Absolute first frame
    pub start_frame: i32,
    /// Absolute end frame, never before `start_frame`
    pub end_frame: i32,
    /// Formation shown by this node, if any
    pub formation: Option<CollectionRef>,
}

impl ScheduleEntry {
    /// Length in frames
    pub fn duration(&self) -> i32 {
        self.end_frame - self.start_frame
    }

    /// Whether `frame` falls in `[start_frame, end_frame)`
    pub fn contains(&self, frame: i32) -> bool {
        frame >= self.start_frame && frame < self.end_frame
    }
}

/// Timeline produced by one scheduling pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Graph the schedule was computed from
    pub graph_name: String,
    /// Entries in the order nodes were finalized
    entries: Vec<ScheduleEntry>,
}

impl Schedule {
    /// Create a schedule from finished entries
    pub fn new(graph_name: impl Into<String>, entries: Vec<ScheduleEntry>) -> Self {
        Self {
            graph_name: graph_name.into(),
            entries,
        }
    }

    /// Schedule with no entries
    pub fn empty(graph_name: impl Into<String>) -> Self {
        Self::new(graph_name, Vec::new())
    }

    /// Entries in finalization order (not necessarily causal)
    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was scheduled
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry of a node by name
    pub fn entry(&self, node_name: &str) -> Option<&ScheduleEntry> {
        self.entries.iter().find(|e| e.node_name == node_name)
    }

    /// Entries in causal order: by start frame, then end frame
    pub fn sorted_by_start(&self) -> Vec<&ScheduleEntry> {
        let mut sorted: Vec<&ScheduleEntry> = self.entries.iter().collect();
        sorted.sort_by_key(|e| (e.start_frame, e.end_frame));
        sorted
    }

    /// Entries running at `frame`
    pub fn active_at(&self, frame: i32) -> impl Iterator<Item = &ScheduleEntry> {
        self.entries.iter().filter(move |e| e.contains(frame))
    }

    /// First scheduled frame
    pub fn start_frame(&self) -> Option<i32> {
        self.entries.iter().map(|e| e.start_frame).min()
    }

    /// Last scheduled frame
    pub fn end_frame(&self) -> Option<i32> {
        self.entries.iter().map(|e| e.end_frame).max()
    }

    /// Entries showing a formation, in causal order
    pub fn formation_entries(&self) -> Vec<&ScheduleEntry> {
        self.sorted_by_start()
            .into_iter()
            .filter(|e| e.formation.is_some())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, start: i32, end: i32, formation: Option<&str>) -> ScheduleEntry {
        ScheduleEntry {
            graph_name: "Show".to_string(),
            node_id: NodeId::new(),
            node_name: name.to_string(),
            node_type: "show".to_string(),
            start_frame: start,
            end_frame: end,
            formation: formation.map(CollectionRef::new),
        }
    }

    #[test]
    fn test_queries() {
        let schedule = Schedule::new(
            "Show",
            vec![
                entry("B", 148, 172, Some("Star")),
                entry("Fly", 130, 148, None),
                entry("A", 100, 130, Some("Heart")),
            ],
        );

        let names: Vec<&str> = schedule.sorted_by_start().iter().map(|e| e.node_name.as_str()).collect();
        assert_eq!(names, ["A", "Fly", "B"]);
        assert_eq!(schedule.start_frame(), Some(100));
        assert_eq!(schedule.end_frame(), Some(172));
        assert_eq!(schedule.active_at(148).map(|e| e.node_name.as_str()).collect::<Vec<_>>(), ["B"]);
        assert_eq!(schedule.formation_entries().len(), 2);
        assert_eq!(schedule.entry("Fly").map(ScheduleEntry::duration), Some(18));
    }

    #[test]
    fn test_zero_duration_entry_is_never_active() {
        let schedule = Schedule::new("Show", vec![entry("Blink", 10, 10, None)]);
        assert_eq!(schedule.active_at(10).count(), 0);
        assert!(Schedule::empty("Show").end_frame().is_none());
    }
}
