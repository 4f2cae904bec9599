// SPDX-License-Identifier: MIT OR Apache-2.0
//! Show build settings.
//!
//! Settings are stored as RON. Missing fields take their defaults, so a
//! settings file only needs the values it changes.

use crate::app::{AppError, Result};
use crate::cli::Args;
use serde::{Deserialize, Serialize};
use skyweave_formation::{CorrespondenceEngine, CostWeights, PairingStrategy, DEFAULT_MAX_POINTS};
use std::path::Path;

/// Current settings format version
pub const SHOW_SETTINGS_VERSION: u32 = 1;

/// What to do when the assignment solver fails on a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SolverFailurePolicy {
    /// Keep the formation's previous identities and carry on
    #[default]
    SkipTransition,
    /// Stop the whole build
    Abort,
}

/// Settings for one show build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowSettings {
    /// Format version
    pub version: u32,
    /// Number of drones; identities wrap modulo this count
    pub drone_count: Option<u32>,
    /// Pairing strategy
    pub strategy: PairingStrategy,
    /// Directional movement cost
    pub weights: CostWeights,
    /// Largest formation handed to the optimal solver
    pub max_assignment_points: usize,
    /// Solver failure handling
    pub on_solver_failure: SolverFailurePolicy,
    /// Extra `tracing` directives, comma separated
    pub log_filter: Option<String>,
}

impl Default for ShowSettings {
    fn default() -> Self {
        Self {
            version: SHOW_SETTINGS_VERSION,
            drone_count: None,
            strategy: PairingStrategy::Optimal,
            weights: CostWeights::default(),
            max_assignment_points: DEFAULT_MAX_POINTS,
            on_solver_failure: SolverFailurePolicy::default(),
            log_filter: None,
        }
    }
}

impl ShowSettings {
    /// Parse settings from RON text
    pub fn from_ron(content: &str) -> Result<Self> {
        let settings: ShowSettings = ron::from_str(content)?;

        if settings.version > SHOW_SETTINGS_VERSION {
            return Err(AppError::UnsupportedVersion {
                found: settings.version,
                supported: SHOW_SETTINGS_VERSION,
            });
        }

        Ok(settings)
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AppError::io(path, e))?;
        Self::from_ron(&content)
    }

    /// Save settings to a file
    #[allow(dead_code)] // Intentionally kept for API completeness
    pub fn save(&self, path: &Path) -> Result<()> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);

        let content = ron::ser::to_string_pretty(self, config)?;
        std::fs::write(path, content).map_err(|e| AppError::io(path, e))
    }

    /// Let command-line values win over the file
    pub fn apply_overrides(&mut self, args: &Args) {
        if let Some(count) = args.drone_count {
            self.drone_count = Some(count);
        }
        if let Some(strategy) = args.strategy {
            self.strategy = strategy.into();
        }
    }

    /// Pairing engine for these settings
    pub fn engine(&self) -> CorrespondenceEngine {
        CorrespondenceEngine {
            strategy: self.strategy,
            weights: self.weights,
            max_points: self.max_assignment_points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_default_settings() {
        let settings = ShowSettings::default();
        assert_eq!(settings.version, SHOW_SETTINGS_VERSION);
        assert_eq!(settings.strategy, PairingStrategy::Optimal);
        assert_eq!(settings.weights.negative_y, 1.0e6);
        assert_eq!(settings.weights.positive_y, 1.0e3);
        assert_eq!(settings.max_assignment_points, 4096);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let settings = ShowSettings::from_ron("(drone_count: Some(8), weights: (lateral: 2.0))").unwrap();
        assert_eq!(settings.drone_count, Some(8));
        assert_eq!(settings.weights.lateral, 2.0);
        assert_eq!(settings.weights.tie, 1.0e-3);
        assert_eq!(settings.on_solver_failure, SolverFailurePolicy::SkipTransition);
    }

    #[test]
    fn test_newer_version_rejected() {
        let result = ShowSettings::from_ron("(version: 99)");
        assert!(matches!(
            result,
            Err(AppError::UnsupportedVersion { found: 99, supported: SHOW_SETTINGS_VERSION })
        ));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("skyweave_settings_{}.ron", std::process::id()));
        let settings = ShowSettings {
            strategy: PairingStrategy::Greedy,
            on_solver_failure: SolverFailurePolicy::Abort,
            ..ShowSettings::default()
        };
        settings.save(&path).unwrap();
        let loaded = ShowSettings::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_cli_overrides() {
        let args = Args::parse_from(["skyweave", "show.ron", "-n", "4", "--strategy", "greedy"]);
        let mut settings = ShowSettings::default();
        settings.apply_overrides(&args);
        assert_eq!(settings.drone_count, Some(4));
        assert_eq!(settings.engine().strategy, PairingStrategy::Greedy);
    }
}
