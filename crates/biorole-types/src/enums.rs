//! Enumeration types for the biorole engine.
//!
//! Base gender is owned by the host; identity, capability and overlay enums
//! are owned by the engine. Outcome enums describe negative pregnancy results,
//! which are valid answers rather than errors.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Host-provided
// ---------------------------------------------------------------------------

/// The host simulation's gender value for an individual.
///
/// This is the presented gender the host tracks, not a statement about
/// reproductive capability. A host without nonbinary support never produces
/// [`BaseGender::Nonbinary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BaseGender {
    /// Host-side male.
    Male,
    /// Host-side female.
    Female,
    /// Host-side nonbinary.
    Nonbinary,
}

impl BaseGender {
    /// Whether this is one of the two binary genders.
    pub const fn is_binary(self) -> bool {
        matches!(self, Self::Male | Self::Female)
    }
}

impl core::fmt::Display for BaseGender {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Male => write!(f, "male"),
            Self::Female => write!(f, "female"),
            Self::Nonbinary => write!(f, "nonbinary"),
        }
    }
}

// ---------------------------------------------------------------------------
// Identity and capability
// ---------------------------------------------------------------------------

/// Gender identity tag, independent of reproductive capability.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Identity {
    /// Identity matches the gender assigned at birth.
    #[default]
    Cisgender,
    /// Identity differs from the gender assigned at birth.
    Transgender,
}

impl core::fmt::Display for Identity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Cisgender => write!(f, "cisgender"),
            Self::Transgender => write!(f, "transgender"),
        }
    }
}

/// One of the two reproductive capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// Ability to gestate a pregnancy.
    Carry,
    /// Ability to contribute genetic payload to start a pregnancy.
    Sire,
}

impl Capability {
    /// The other capability.
    pub const fn opposite(self) -> Self {
        match self {
            Self::Carry => Self::Sire,
            Self::Sire => Self::Carry,
        }
    }
}

impl core::fmt::Display for Capability {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Carry => write!(f, "carry"),
            Self::Sire => write!(f, "sire"),
        }
    }
}

/// Prosthetic replacement tier for a capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProstheticTier {
    /// Basic prosthetic: functional, reduced fertility.
    Basic,
    /// Bionic prosthetic: full fertility, implantation-capable when carrying.
    Bionic,
}

/// Kind of sterilization applied to a natural capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Sterilization {
    /// Can be surgically reversed.
    Reversible,
    /// Cannot be reversed.
    Permanent,
}

/// Fertility sub-state of a natural capability.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Fertility {
    /// Natural and unsterilized.
    #[default]
    Fertile,
    /// Natural but sterilized.
    Sterilized(Sterilization),
}

// ---------------------------------------------------------------------------
// Pregnancy
// ---------------------------------------------------------------------------

/// How a pair is approaching conception, as set by the host.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum PregnancyApproach {
    /// No preference.
    #[default]
    Normal,
    /// The pair is trying to avoid pregnancy.
    AvoidPregnancy,
    /// The pair is actively trying to conceive.
    TryForBaby,
}

/// Why a pregnancy attempt did not produce a pregnancy.
///
/// None of these are errors: each is a valid negative answer the host may
/// surface to the player.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectionReason {
    /// Neither individual can carry (or the only carrier is the sirer).
    NoCarrier,
    /// Neither individual can sire.
    NoSirer,
    /// The carrier already has an active pregnancy.
    AlreadyPregnant,
    /// The success roll failed.
    ChanceFailed,
    /// The genetic-compatibility function refused the pair.
    Incompatible {
        /// Human-readable explanation from the compatibility function.
        detail: String,
    },
}

impl core::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NoCarrier => write!(f, "no carrier"),
            Self::NoSirer => write!(f, "no sirer"),
            Self::AlreadyPregnant => write!(f, "already pregnant"),
            Self::ChanceFailed => write!(f, "chance failed"),
            Self::Incompatible { detail } => write!(f, "genetically incompatible: {detail}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_capability_is_an_involution() {
        assert_eq!(Capability::Carry.opposite(), Capability::Sire);
        assert_eq!(Capability::Sire.opposite(), Capability::Carry);
        assert_eq!(Capability::Carry.opposite().opposite(), Capability::Carry);
    }

    #[test]
    fn binary_genders() {
        assert!(BaseGender::Male.is_binary());
        assert!(BaseGender::Female.is_binary());
        assert!(!BaseGender::Nonbinary.is_binary());
    }

    #[test]
    fn rejection_reason_display() {
        assert_eq!(RejectionReason::NoCarrier.to_string(), "no carrier");
        let reason = RejectionReason::Incompatible {
            detail: String::from("xenotype mismatch"),
        };
        assert_eq!(reason.to_string(), "genetically incompatible: xenotype mismatch");
    }

    #[test]
    fn fertility_defaults_to_fertile() {
        assert_eq!(Fertility::default(), Fertility::Fertile);
        assert_eq!(Identity::default(), Identity::Cisgender);
    }
}
