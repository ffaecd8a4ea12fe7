//! Typed configuration for the harness.
//!
//! The harness reads `biorole-config.yaml` (or the path given on the command
//! line). Every section is optional; missing fields take the defaults below.
//! The `rates` section is a flat key to percentage map handed to
//! [`RateTable::from_percentages`], so a bad rate falls back to its default
//! instead of failing the whole file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use biorole_engine::{ConfigError, RateLoadReport, RateStore, RateTable};
use serde::Deserialize;

/// Top-level harness configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimConfig {
    /// Population and tick parameters.
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Log verbosity.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Inline rate percentages, keyed by rate name.
    #[serde(default)]
    pub rates: BTreeMap<String, serde_yml::Value>,
}

impl SimConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// An empty document yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Option<Self> = serde_yml::from_str(yaml)?;
        Ok(config.unwrap_or_default())
    }

    /// Build the rate store.
    ///
    /// With `simulation.rates_file` set, rates come from that file and the
    /// store can reload it. Otherwise the inline `rates` map is used.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the rates file cannot be read or parsed.
    pub fn rate_store(&self) -> Result<(RateStore, RateLoadReport), ConfigError> {
        match &self.simulation.rates_file {
            Some(path) => RateStore::from_file(path),
            None => {
                let (table, report) = RateTable::from_percentages(&self.rates);
                Ok((RateStore::new(table), report))
            }
        }
    }
}

/// Population and tick parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Seed for the single random source driving the whole run.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of individuals spawned at start.
    #[serde(default = "default_population")]
    pub population: u32,

    /// Number of pairing ticks to run.
    #[serde(default = "default_ticks")]
    pub ticks: u32,

    /// Host base chance per pregnancy attempt.
    #[serde(default = "default_base_chance")]
    pub base_chance: f64,

    /// Relationships each spawned individual forms.
    #[serde(default = "default_relationships_per_individual")]
    pub relationships_per_individual: u32,

    /// Single-individual attempts per tick.
    #[serde(default = "default_single_attempts_per_tick")]
    pub single_attempts_per_tick: u32,

    /// Whether single-individual attempts may draw a sirer from relationships.
    #[serde(default = "default_allow_random_sirer")]
    pub allow_random_sirer: bool,

    /// Ticks from conception to birth.
    #[serde(default = "default_gestation_ticks")]
    pub gestation_ticks: u32,

    /// Genes that make a pair incompatible.
    #[serde(default)]
    pub blocking_genes: Vec<String>,

    /// Rates file to load instead of the inline `rates` map.
    #[serde(default)]
    pub rates_file: Option<PathBuf>,

    /// Tick at which the rates file is reloaded.
    #[serde(default)]
    pub reload_rates_at_tick: Option<u32>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            population: default_population(),
            ticks: default_ticks(),
            base_chance: default_base_chance(),
            relationships_per_individual: default_relationships_per_individual(),
            single_attempts_per_tick: default_single_attempts_per_tick(),
            allow_random_sirer: default_allow_random_sirer(),
            gestation_ticks: default_gestation_ticks(),
            blocking_genes: Vec::new(),
            rates_file: None,
            reload_rates_at_tick: None,
        }
    }
}

const fn default_seed() -> u64 {
    42
}

const fn default_population() -> u32 {
    100
}

const fn default_ticks() -> u32 {
    24
}

const fn default_base_chance() -> f64 {
    0.3
}

const fn default_relationships_per_individual() -> u32 {
    2
}

const fn default_single_attempts_per_tick() -> u32 {
    2
}

const fn default_allow_random_sirer() -> bool {
    true
}

const fn default_gestation_ticks() -> u32 {
    9
}

/// Log verbosity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// 0 is quiet, 3 traces every roll. `RUST_LOG` takes precedence.
    #[serde(default)]
    pub debug_level: u8,
}

impl LoggingConfig {
    /// The `EnvFilter` directive for the configured level.
    pub const fn filter_directive(&self) -> &'static str {
        match self.debug_level {
            0 => "info",
            1 => "biorole_engine=debug,biorole_sim=debug,info",
            2 => "debug",
            _ => "trace",
        }
    }
}
