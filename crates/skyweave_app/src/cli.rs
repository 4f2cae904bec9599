// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command-line arguments.

use clap::{Parser, ValueEnum};
use skyweave_formation::PairingStrategy;
use std::path::PathBuf;

/// Pairing strategy selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Nearest unclaimed neighbor
    Greedy,
    /// Minimum-cost assignment
    Optimal,
}

impl From<StrategyArg> for PairingStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Greedy => PairingStrategy::Greedy,
            StrategyArg::Optimal => PairingStrategy::Optimal,
        }
    }
}

/// Drone show builder
#[derive(Parser, Debug)]
#[command(name = "skyweave", author, version, about, long_about = None)]
pub struct Args {
    /// Show document (RON, or JSON by extension) with the graph and scene
    #[arg(value_name = "SHOW")]
    pub show: PathBuf,

    /// Show settings file (RON)
    #[arg(short = 's', long = "settings", value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Write the build report here instead of stdout (JSON for .json)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Number of drones; identities wrap modulo this count
    #[arg(short = 'n', long = "drone-count", value_name = "N")]
    pub drone_count: Option<u32>,

    /// Pairing strategy between consecutive formations
    #[arg(long = "strategy", value_enum)]
    pub strategy: Option<StrategyArg>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_overrides() {
        let args = Args::try_parse_from([
            "skyweave",
            "show.ron",
            "--drone-count",
            "12",
            "--strategy",
            "greedy",
        ])
        .unwrap();
        assert_eq!(args.show, PathBuf::from("show.ron"));
        assert_eq!(args.drone_count, Some(12));
        assert_eq!(args.strategy.map(PairingStrategy::from), Some(PairingStrategy::Greedy));
        assert!(args.settings.is_none());
    }

    #[test]
    fn test_show_is_required() {
        assert!(Args::try_parse_from(["skyweave"]).is_err());
    }
}
