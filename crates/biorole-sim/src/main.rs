//! Headless harness for the biorole engine.
//!
//! Loads configuration, spawns a population, assigns identity and
//! capabilities, runs pairing and pregnancy ticks, and prints a JSON
//! population summary to stdout.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from the path given as the first argument, or
//!    `biorole-config.yaml` in the working directory (defaults if absent)
//! 2. Initialize structured logging (tracing), honoring `RUST_LOG`
//! 3. Run the simulation
//! 4. Print the summary

mod config;
mod error;
mod run;
mod spawner;
mod summary;

use std::path::PathBuf;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::SimConfig;
use crate::error::SimError;

/// Default configuration file name.
const DEFAULT_CONFIG: &str = "biorole-config.yaml";

fn main() -> Result<(), SimError> {
    let config_path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG), PathBuf::from);
    let config = if config_path.exists() {
        SimConfig::from_file(&config_path)?
    } else {
        SimConfig::default()
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.logging.filter_directive())),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!(
        path = %config_path.display(),
        seed = config.simulation.seed,
        population = config.simulation.population,
        ticks = config.simulation.ticks,
        "biorole-sim starting"
    );

    let summary = run::run(&config)?;
    let json = serde_json::to_string_pretty(&summary)?;
    println!("{json}");
    Ok(())
}
