// SPDX-License-Identifier: MIT OR Apache-2.0
//! Show builder entry point and error type.

use crate::build::{build_show, BuildReport};
use crate::cli::Args;
use crate::config::ShowSettings;
use crate::scene::{is_json, ShowDocument};
use skyweave_formation::CorrespondenceError;
use skyweave_sequencer::{SchedulerState, SharedSchedule};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Show builder errors
#[derive(Debug, Error)]
pub enum AppError {
    /// File could not be read or written
    #[error("{}: {source}", .path.display())]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// RON input did not parse
    #[error("RON parse error: {0}")]
    RonDecode(#[from] ron::error::SpannedError),

    /// RON output could not be produced
    #[error("RON write error: {0}")]
    RonEncode(#[from] ron::Error),

    /// JSON input or output failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Settings written by a newer version
    #[error("Settings version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version in the file
        found: u32,
        /// Highest supported version
        supported: u32,
    },

    /// Solver failure under the abort policy
    #[error("Pairing into '{formation}' failed: {source}")]
    Solver {
        /// Formation that could not be paired
        formation: String,
        /// Underlying failure
        source: CorrespondenceError,
    },
}

impl AppError {
    /// Attach a path to an I/O error
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result type for show builder operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Build the show named on the command line
pub fn run(args: &Args, mut settings: ShowSettings) -> Result<()> {
    settings.apply_overrides(args);
    tracing::info!(
        "Building {} ({:?} pairing, drone count {:?})",
        args.show.display(),
        settings.strategy,
        settings.drone_count
    );

    let mut document = ShowDocument::load(&args.show)?;
    let shared = SharedSchedule::new();
    let mut state = SchedulerState::new().with_shared(shared.clone());

    let report = build_show(&mut document.graph, &document.scene, &settings, &mut state)?;
    if let Some(schedule) = shared.current() {
        tracing::info!(
            "Published schedule of '{}' ending at frame {:?}",
            schedule.graph_name,
            schedule.end_frame()
        );
    }
    if report.degraded_transitions() > 0 {
        tracing::warn!(
            "{} of {} transitions fell back to fresh identities",
            report.degraded_transitions(),
            report.formations.len().saturating_sub(1)
        );
    }

    write_report(&report, args.output.as_deref())
}

/// Serialize the report to `output`, or to stdout as RON
fn write_report(report: &BuildReport, output: Option<&Path>) -> Result<()> {
    let Some(path) = output else {
        println!("{}", report_ron(report)?);
        return Ok(());
    };

    let content = if is_json(path) {
        serde_json::to_string_pretty(report)?
    } else {
        report_ron(report)?
    };
    std::fs::write(path, content).map_err(|e| AppError::io(path, e))?;
    tracing::info!("Wrote build report to {}", path.display());
    Ok(())
}

fn report_ron(report: &BuildReport) -> Result<String> {
    let config = ron::ser::PrettyConfig::default()
        .struct_names(true)
        .enumerate_arrays(false);
    Ok(ron::ser::to_string_pretty(report, config)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use skyweave_graph::Graph;
    use std::ffi::OsStr;

    #[test]
    fn test_run_writes_json_report() {
        let dir = std::env::temp_dir();
        let show = dir.join(format!("skyweave_show_{}.ron", std::process::id()));
        let output = dir.join(format!("skyweave_report_{}.json", std::process::id()));

        let document = ShowDocument {
            graph: Graph::new("Empty"),
            ..ShowDocument::default()
        };
        std::fs::write(&show, ron::to_string(&document).unwrap()).unwrap();

        let args = Args::parse_from([
            OsStr::new("skyweave"),
            show.as_os_str(),
            OsStr::new("--output"),
            output.as_os_str(),
        ]);
        run(&args, ShowSettings::default()).unwrap();

        let text = std::fs::read_to_string(&output).unwrap();
        let report: BuildReport = serde_json::from_str(&text).unwrap();
        let _ = std::fs::remove_file(&show);
        let _ = std::fs::remove_file(&output);

        // No start node: empty schedule, nothing to pair
        assert!(report.schedule.is_empty());
        assert!(report.formations.is_empty());
    }

    #[test]
    fn test_missing_show_file() {
        let args = Args::parse_from(["skyweave", "/nonexistent/skyweave/show.ron"]);
        let result = run(&args, ShowSettings::default());
        assert!(matches!(result, Err(AppError::Io { .. })));
    }
}
