//! Capability assignment, role resolution, and pregnancy rules.
//!
//! This crate holds every decision the biorole engine makes about an
//! individual: which identity and reproductive capabilities they get, which
//! overlays those capabilities carry, who carries and who sires in an
//! interaction, and whether a pregnancy results. It operates on the snapshot
//! types from `biorole-types` and performs no I/O apart from loading rate
//! files.
//!
//! All randomness comes from a caller-supplied `rand::Rng`; draws are taken
//! in a fixed order so a seeded run replays exactly.
//!
//! # Modules
//!
//! - [`assignment`] -- Tiered identity and capability assignment ([`assign`], [`reassign`])
//! - [`config`] -- Rate table, percentage parsing, reloadable snapshots ([`RateTable`], [`RateStore`])
//! - [`error`] -- Error types for engine operations ([`EngineError`])
//! - [`fertility`] -- Per-slot fertility factors and approach multipliers
//! - [`overlay`] -- Prosthetic and sterilization overlays for granted capabilities
//! - [`pregnancy`] -- Pregnancy creation, genetics and notification seams
//! - [`roles`] -- Carrier and sirer resolution ([`resolve`])
//! - [`sterilization`] -- Conversion of the host's generic sterilized flag
//! - [`surgery`] -- Explicit slot mutations: grants, removals, sterilization

pub mod assignment;
pub mod config;
pub mod error;
pub mod fertility;
pub mod overlay;
pub mod pregnancy;
pub mod roles;
pub mod sterilization;
pub mod surgery;

// Re-export primary types at crate root for convenience.
pub use assignment::{AbilityTier, ReassignOutcome, ReassignReport, assign, reassign};
pub use config::{ConfigError, RateLoadReport, RateStore, RateTable};
pub use error::EngineError;
pub use fertility::{approach_factor, fertility_factor};
pub use overlay::{apply_overlays, roll_overlay};
pub use pregnancy::{
    Attempt, Compatibility, GeneticCompatibility, InheritAllGenes, NO_SIRER_CHANCE,
    PregnancyNotifier, SilentNotifier, attempt_pregnancy, end_pregnancy, try_create,
    try_create_single,
};
pub use roles::resolve;
pub use sterilization::InferenceMode;
pub use surgery::GrantSource;
