// SPDX-License-Identifier: MIT OR Apache-2.0
//! Skyweave - drone show builder
//!
//! Reads a show document (node graph plus baked formation geometry) and:
//! - Schedules every show and transition node on the timeline
//! - Samples the formation of each show node at its start frame
//! - Pairs consecutive formations and carries drone identities forward
//! - Writes a build report with the schedule and per-point identities
//!
//! ## Architecture
//!
//! The binary is a thin shell over the `skyweave_graph`,
//! `skyweave_sequencer` and `skyweave_formation` crates. Settings come
//! from a RON file with command-line overrides.

mod app;
mod build;
mod cli;
mod config;
mod scene;

use clap::Parser;
use cli::Args;
use config::ShowSettings;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn init_tracing(extra: Option<&str>) {
    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env();
    let mut rejected = Vec::new();

    let defaults = ["skyweave_app=info"].into_iter();
    let configured = extra.into_iter().flat_map(|filter| filter.split(','));
    for directive in defaults.chain(configured).map(str::trim).filter(|d| !d.is_empty()) {
        match directive.parse::<Directive>() {
            Ok(directive) => env_filter = env_filter.add_directive(directive),
            Err(_) => rejected.push(directive.to_string()),
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    for directive in rejected {
        tracing::warn!("Ignoring invalid log directive '{directive}'");
    }
}

fn main() {
    let args = Args::parse();

    let settings = match &args.settings {
        Some(path) => ShowSettings::load(path).map(Some),
        None => Ok(None),
    };
    let log_filter = settings
        .as_ref()
        .ok()
        .and_then(|s| s.as_ref())
        .and_then(|s| s.log_filter.as_deref());
    init_tracing(log_filter);

    tracing::info!("Starting Skyweave v{}", env!("CARGO_PKG_VERSION"));

    let result = settings.and_then(|settings| app::run(&args, settings.unwrap_or_default()));
    if let Err(e) = result {
        tracing::error!("Show build failed: {e}");
        std::process::exit(1);
    }
}
