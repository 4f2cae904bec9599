// SPDX-License-Identifier: MIT OR Apache-2.0
//! Show build pipeline.
//!
//! This module handles:
//! - Scheduling the show graph
//! - Sampling one formation per scheduled show node, in causal order
//! - Pairing consecutive formations and carrying drone identities forward
//! - Collecting the result into a build report

use crate::app::{AppError, Result};
use crate::config::{ShowSettings, SolverFailurePolicy};
use serde::{Deserialize, Serialize};
use skyweave_formation::{
    assign_initial, propagate, Correspondence, CorrespondenceError, Formation, FormationSource,
    PairingStrategy, PointSet,
};
use skyweave_graph::Graph;
use skyweave_sequencer::{Schedule, SchedulerState};

/// Outcome of pairing a formation with the one before it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TransitionStatus {
    /// Identities came through the computed correspondence
    Paired {
        /// Strategy used
        strategy: PairingStrategy,
        /// Total cost, for the optimal strategy
        total_cost: Option<f64>,
    },
    /// Point counts or identity arrays did not line up; identities reseeded
    Reseeded {
        /// Reason
        reason: String,
    },
    /// The solver failed; the formation kept its previous identities
    Skipped {
        /// Reason
        reason: String,
    },
}

/// One formation of the built show
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormationReport {
    /// Show node that displays the formation
    pub node_name: String,
    /// Frame the formation was sampled at
    pub frame: i32,
    /// Formation with written `pair_id`/`formation_id` arrays
    pub formation: Formation,
    /// How the formation was linked to the previous one
    pub transition: Option<TransitionStatus>,
    /// Matching with the previous formation, when pairing succeeded
    pub correspondence: Option<Correspondence>,
}

/// Result of a show build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildReport {
    /// Computed timeline
    pub schedule: Schedule,
    /// Formations in causal order
    pub formations: Vec<FormationReport>,
}

impl BuildReport {
    /// Number of transitions that did not go through pairing
    pub fn degraded_transitions(&self) -> usize {
        self.formations
            .iter()
            .filter(|f| !matches!(f.transition, None | Some(TransitionStatus::Paired { .. })))
            .count()
    }
}

struct Sampled {
    node_name: String,
    frame: i32,
    formation: Formation,
    points: PointSet,
}

/// Schedule `graph` and assign drone identities to every formation
pub fn build_show(
    graph: &mut Graph,
    source: &impl FormationSource,
    settings: &ShowSettings,
    state: &mut SchedulerState,
) -> Result<BuildReport> {
    let schedule = state.recompute(graph);
    tracing::info!(
        "Scheduled '{}': {} entries, frames {:?}..{:?}",
        schedule.graph_name,
        schedule.len(),
        schedule.start_frame(),
        schedule.end_frame()
    );

    let mut sampled = Vec::new();
    for entry in schedule.formation_entries() {
        let Some(collection) = entry.formation.as_ref() else {
            continue;
        };
        let Some(formation) = source.sample(collection.name(), entry.start_frame) else {
            tracing::warn!(
                "Collection '{collection}' of '{}' not found in the scene",
                entry.node_name
            );
            continue;
        };
        sampled.push(Sampled {
            node_name: entry.node_name.clone(),
            frame: entry.start_frame,
            points: formation.flatten(),
            formation,
        });
    }

    let mut sets: Vec<PointSet> = sampled.iter().map(|s| s.points.clone()).collect();
    if let Some(first) = sets.first_mut() {
        assign_initial(first, settings.drone_count);
    }

    let engine = settings.engine();
    let pairings = engine.correspond_chain(&sets);
    let mut transitions = vec![None; sets.len()];
    let mut correspondences = vec![None; sets.len()];

    for (index, pairing) in pairings.into_iter().enumerate() {
        let (done, rest) = sets.split_at_mut(index + 1);
        let prev = &done[index];
        let next = &mut rest[0];
        let next_index = index + 1;
        let name = &sampled[next_index].node_name;

        let status = match engine.apply(next, pairing) {
            Ok(correspondence) => match propagate(prev, next) {
                Ok(()) => {
                    let status = TransitionStatus::Paired {
                        strategy: correspondence.strategy,
                        total_cost: correspondence.total_cost,
                    };
                    correspondences[next_index] = Some(correspondence);
                    status
                }
                Err(e) => TransitionStatus::Reseeded { reason: e.to_string() },
            },
            Err(e) if e.is_solver_failure() => {
                if settings.on_solver_failure == SolverFailurePolicy::Abort {
                    return Err(AppError::Solver {
                        formation: name.clone(),
                        source: e,
                    });
                }
                tracing::warn!("Skipping transition into '{name}': {e}");
                assign_initial(next, settings.drone_count);
                TransitionStatus::Skipped { reason: e.to_string() }
            }
            Err(e) => {
                tracing::warn!("Reseeded '{name}': {e}");
                TransitionStatus::Reseeded { reason: mismatch_reason(&e) }
            }
        };
        transitions[next_index] = Some(status);
    }

    let formations = sampled
        .into_iter()
        .zip(sets)
        .zip(transitions.into_iter().zip(correspondences))
        .map(|((sample, points), (transition, correspondence))| {
            let mut formation = sample.formation;
            if !formation.scatter(&points) {
                tracing::warn!("Could not write identities back to '{}'", sample.node_name);
            }
            FormationReport {
                node_name: sample.node_name,
                frame: sample.frame,
                formation,
                transition,
                correspondence,
            }
        })
        .collect();

    Ok(BuildReport {
        schedule: (*schedule).clone(),
        formations,
    })
}

fn mismatch_reason(error: &CorrespondenceError) -> String {
    match error {
        CorrespondenceError::LengthMismatch { prev, next } => {
            format!("{prev} points before, {next} after")
        }
        other => other.to_string(),
    }
}
