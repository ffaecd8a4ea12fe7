//! Rate configuration for capability assignment and overlays.
//!
//! The configuration surface is a flat mapping from key to percentage
//! (`0`--`100`), normally the `rates:` section of a YAML file. Percentages are
//! divided by 100 on load. A key that is missing, unparseable, or out of range
//! falls back to its documented default on its own; the rest of the table
//! still loads. Only a file that cannot be read or is not YAML at all fails
//! the load.
//!
//! A loaded [`RateTable`] is an immutable snapshot. [`RateStore`] hands out
//! `Arc` snapshots and swaps in a fresh one on reload, so a snapshot that is
//! already in use never changes underneath its holder.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde_yml::Value;
use tracing::{info, warn};

/// Errors that can occur when loading rate configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read rate config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse rate config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A reload was requested but the store was not loaded from a file.
    #[error("rate store has no source file to reload from")]
    NoSource,
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Generates [`RateTable`] together with its key list and default table.
///
/// Each entry is `field = default_percentage`; the field name doubles as the
/// configuration key.
macro_rules! define_rate_table {
    (
        $(
            $(#[$meta:meta])*
            $field:ident = $default_pct:expr
        ),+ $(,)?
    ) => {
        /// Every probability the engine uses, as fractions in `0.0..=1.0`.
        ///
        /// The "both" and "neither" rates of a group are sequential
        /// thresholds rolled against the same draw, not a partition: when
        /// `both + neither` reaches 1.0 the single-ability branch is never
        /// entered.
        #[derive(Debug, Clone, PartialEq, Serialize)]
        pub struct RateTable {
            $(
                $(#[$meta])*
                pub $field: f64,
            )+
        }

        impl Default for RateTable {
            fn default() -> Self {
                Self {
                    $( $field: $default_pct / 100.0, )+
                }
            }
        }

        impl RateTable {
            /// Every configuration key with its default percentage.
            pub const KEYS: &'static [(&'static str, f64)] = &[
                $( (stringify!($field), $default_pct), )+
            ];

            fn rate_mut(&mut self, key: &str) -> Option<&mut f64> {
                match key {
                    $( stringify!($field) => Some(&mut self.$field), )+
                    _ => None,
                }
            }
        }
    };
}

define_rate_table! {
    /// A binary individual is cisgender iff the identity roll is at most this.
    cis_rate = 90.0,
    /// Cisgender: both capabilities.
    cis_both_rate = 1.0,
    /// Cisgender: neither capability.
    cis_neither_rate = 5.0,
    /// Cisgender man, single-ability branch: carry instead of sire.
    cis_man_carry_rate = 1.0,
    /// Cisgender woman, single-ability branch: sire instead of carry.
    cis_woman_sire_rate = 1.0,
    /// Transgender binary: both capabilities.
    trans_both_rate = 5.0,
    /// Transgender binary: neither capability.
    trans_neither_rate = 10.0,
    /// Transgender man, single-ability branch: carry instead of sire.
    trans_man_carry_rate = 80.0,
    /// Transgender woman, single-ability branch: sire instead of carry.
    trans_woman_sire_rate = 80.0,
    /// Nonbinary: both capabilities.
    nonbinary_both_rate = 10.0,
    /// Nonbinary: neither capability.
    nonbinary_neither_rate = 10.0,
    /// Nonbinary, single-ability branch: carry instead of sire.
    nonbinary_carry_rate = 50.0,
    /// A granted carry capability is prosthetic.
    prosthetic_carry_rate = 2.0,
    /// A granted sire capability is prosthetic.
    prosthetic_sire_rate = 2.0,
    /// A prosthetic is bionic rather than basic.
    bionic_upgrade_rate = 25.0,
    /// A natural carry capability is sterilized.
    carry_sterilization_rate = 5.0,
    /// A natural sire capability is sterilized.
    sire_sterilization_rate = 5.0,
    /// A sterilization is reversible rather than permanent.
    reversible_sterilization_rate = 50.0,
}

/// Keys that did not load as written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLoadReport {
    /// Known keys absent from the source; defaults were used.
    pub missing: Vec<String>,
    /// Known keys whose value was rejected, with the raw value; defaults were used.
    pub invalid: Vec<(String, String)>,
    /// Keys in the source that the table does not know. Ignored.
    pub unknown: Vec<String>,
}

impl RateLoadReport {
    /// Whether any present key had to be replaced by its default.
    pub fn has_fallbacks(&self) -> bool {
        !self.invalid.is_empty()
    }
}

impl RateTable {
    /// Build a table from a flat key-to-percentage mapping.
    ///
    /// Values may be YAML numbers or strings (an optional trailing `%` is
    /// accepted). Anything else, or a value outside `0..=100`, falls back to
    /// the default for that key.
    pub fn from_percentages(values: &BTreeMap<String, Value>) -> (Self, RateLoadReport) {
        let mut table = Self::default();
        let mut report = RateLoadReport::default();

        for &(key, default_pct) in Self::KEYS {
            let Some(raw) = values.get(key) else {
                report.missing.push(key.to_owned());
                continue;
            };
            match parse_percentage(raw) {
                Some(pct) => {
                    if let Some(slot) = table.rate_mut(key) {
                        *slot = pct / 100.0;
                    }
                }
                None => {
                    warn!(key, value = ?raw, default_pct, "Unparseable rate, using default");
                    report.invalid.push((key.to_owned(), format!("{raw:?}")));
                }
            }
        }

        for key in values.keys() {
            if !Self::KEYS.iter().any(|&(known, _)| known == key.as_str()) {
                warn!(key = %key, "Unknown rate key ignored");
                report.unknown.push(key.clone());
            }
        }

        (table, report)
    }

    /// Parse a table from a YAML document holding a flat key-to-percentage map.
    ///
    /// An empty document yields the default table.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the document is not a YAML mapping.
    pub fn from_yaml_str(yaml: &str) -> Result<(Self, RateLoadReport), ConfigError> {
        let values: Option<BTreeMap<String, Value>> = serde_yml::from_str(yaml)?;
        Ok(Self::from_percentages(&values.unwrap_or_default()))
    }

    /// Load a table from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not a YAML mapping.
    pub fn from_file(path: &Path) -> Result<(Self, RateLoadReport), ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }
}

/// Interpret one raw configuration value as a percentage in `0..=100`.
fn parse_percentage(raw: &Value) -> Option<f64> {
    let pct = match raw {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (pct.is_finite() && (0.0..=100.0).contains(&pct)).then_some(pct)
}

// ---------------------------------------------------------------------------
// RateStore
// ---------------------------------------------------------------------------

/// Holder of the current [`RateTable`] snapshot.
///
/// Callers take a snapshot once per operation with [`RateStore::snapshot`]
/// and pass it down explicitly. Reloading replaces the snapshot; previously
/// taken snapshots keep their values.
#[derive(Debug, Clone)]
pub struct RateStore {
    current: Arc<RateTable>,
    source: Option<PathBuf>,
    generation: u64,
}

impl RateStore {
    /// Create a store holding `table`, with no backing file.
    pub fn new(table: RateTable) -> Self {
        Self {
            current: Arc::new(table),
            source: None,
            generation: 0,
        }
    }

    /// Create a store from a YAML file, remembering the path for reloads.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<(Self, RateLoadReport), ConfigError> {
        let (table, report) = RateTable::from_file(path)?;
        info!(path = %path.display(), fallbacks = report.invalid.len(), "Rate table loaded");
        let store = Self {
            current: Arc::new(table),
            source: Some(path.to_path_buf()),
            generation: 0,
        };
        Ok((store, report))
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<RateTable> {
        Arc::clone(&self.current)
    }

    /// Number of times the snapshot has been replaced.
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Swap in a new snapshot.
    pub fn replace(&mut self, table: RateTable) {
        self.current = Arc::new(table);
        self.generation = self.generation.saturating_add(1);
        info!(generation = self.generation, "Rate table replaced");
    }

    /// Reload from the file the store was created from.
    ///
    /// On failure the current snapshot is kept.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoSource`] if the store has no backing file, or
    /// the read/parse error otherwise.
    pub fn reload(&mut self) -> Result<RateLoadReport, ConfigError> {
        let path = self.source.clone().ok_or(ConfigError::NoSource)?;
        match RateTable::from_file(&path) {
            Ok((table, report)) => {
                self.replace(table);
                Ok(report)
            }
            Err(err) => {
                warn!(path = %path.display(), %err, "Rate reload failed, keeping current table");
                Err(err)
            }
        }
    }

    /// Reload from an in-memory YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the document is not a YAML mapping;
    /// the current snapshot is kept.
    pub fn reload_from_str(&mut self, yaml: &str) -> Result<RateLoadReport, ConfigError> {
        let (table, report) = RateTable::from_yaml_str(yaml)?;
        self.replace(table);
        Ok(report)
    }
}

impl Default for RateStore {
    fn default() -> Self {
        Self::new(RateTable::default())
    }
}
