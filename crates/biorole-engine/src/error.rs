//! Error types for the biorole-engine crate.
//!
//! Only genuine failures live here: missing host state and surgery requests
//! whose preconditions do not hold. Negative pregnancy results are not errors;
//! they are reported through [`PregnancyOutcome`].
//!
//! [`PregnancyOutcome`]: biorole_types::PregnancyOutcome

use biorole_types::{Capability, IndividualId};

/// Errors that can occur during engine operations.
///
/// Every operation that returns one of these has left the individual
/// untouched.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A required host field was absent.
    #[error("individual {individual} is missing required state: {field}")]
    MissingState {
        /// The individual with incomplete state.
        individual: IndividualId,
        /// Name of the absent field.
        field: &'static str,
    },

    /// The individual has never been assigned a capability state.
    #[error("individual {0} has no capability state")]
    Unassigned(IndividualId),

    /// The capability is already held.
    #[error("individual {individual} already has {capability} capability")]
    CapabilityPresent {
        /// The individual.
        individual: IndividualId,
        /// The capability that was to be added.
        capability: Capability,
    },

    /// The capability is not held.
    #[error("individual {individual} has no {capability} capability")]
    CapabilityAbsent {
        /// The individual.
        individual: IndividualId,
        /// The capability that was expected.
        capability: Capability,
    },

    /// The operation needs natural organs but the slot is prosthetic.
    #[error("individual {individual}'s {capability} capability is prosthetic")]
    NotNatural {
        /// The individual.
        individual: IndividualId,
        /// The prosthetic capability.
        capability: Capability,
    },

    /// The carry capability cannot be removed while a pregnancy is active.
    #[error("individual {0} is pregnant; carry capability cannot be removed")]
    PregnancyActive(IndividualId),

    /// Reversal was requested on a slot that is not reversibly sterilized.
    #[error("individual {individual}'s {capability} capability is not reversibly sterilized")]
    NotReversible {
        /// The individual.
        individual: IndividualId,
        /// The capability whose reversal was requested.
        capability: Capability,
    },
}
