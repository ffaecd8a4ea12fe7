//! Shared type definitions for the biorole engine.
//!
//! This crate is the single source of truth for the data the engine reads
//! and writes on behalf of a host simulation. It holds no decision logic;
//! everything that rolls dice or enforces rules lives in `biorole-engine`.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for individuals and pregnancies
//! - [`enums`] -- Base gender, identity, capability, overlay and outcome enums
//! - [`structs`] -- Capability state, the individual snapshot, role and pregnancy records

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    BaseGender, Capability, Fertility, Identity, PregnancyApproach, ProstheticTier,
    RejectionReason, Sterilization,
};
pub use ids::{IndividualId, PregnancyId};
pub use structs::{
    CapabilitySlot, CapabilityState, GeneticPayload, Individual, PregnancyOutcome,
    PregnancyRecord, Relationship, RoleAssignment,
};
