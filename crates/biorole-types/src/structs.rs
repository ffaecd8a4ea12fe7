//! Core entity structs for the biorole engine.
//!
//! Covers the per-individual [`CapabilityState`], the [`Individual`] snapshot
//! a host hands to the engine, and the transient [`RoleAssignment`] and
//! [`PregnancyOutcome`] values produced per interaction.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::enums::{
    BaseGender, Capability, Fertility, Identity, ProstheticTier, RejectionReason, Sterilization,
};
use crate::ids::{IndividualId, PregnancyId};

// ---------------------------------------------------------------------------
// CapabilitySlot
// ---------------------------------------------------------------------------

/// State of a single reproductive capability.
///
/// Sterilization only exists under [`CapabilitySlot::Natural`]; a prosthetic
/// slot cannot be sterilized, and an absent slot has nothing to sterilize.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum CapabilitySlot {
    /// The capability is not held.
    #[default]
    Absent,
    /// Natural organs, possibly sterilized.
    Natural(Fertility),
    /// Basic prosthetic replacement.
    BasicProsthetic,
    /// Bionic prosthetic replacement.
    BionicProsthetic,
}

impl CapabilitySlot {
    /// A natural, fertile slot.
    pub const fn natural() -> Self {
        Self::Natural(Fertility::Fertile)
    }

    /// A prosthetic slot of the given tier.
    pub const fn prosthetic(tier: ProstheticTier) -> Self {
        match tier {
            ProstheticTier::Basic => Self::BasicProsthetic,
            ProstheticTier::Bionic => Self::BionicProsthetic,
        }
    }

    /// A natural slot with the given sterilization.
    pub const fn sterilized(kind: Sterilization) -> Self {
        Self::Natural(Fertility::Sterilized(kind))
    }

    /// Whether the capability is held at all.
    pub const fn is_present(self) -> bool {
        !matches!(self, Self::Absent)
    }

    /// Whether the capability is held through natural organs.
    pub const fn is_natural(self) -> bool {
        matches!(self, Self::Natural(_))
    }

    /// Prosthetic tier, if the slot is prosthetic.
    pub const fn prosthetic_tier(self) -> Option<ProstheticTier> {
        match self {
            Self::BasicProsthetic => Some(ProstheticTier::Basic),
            Self::BionicProsthetic => Some(ProstheticTier::Bionic),
            Self::Absent | Self::Natural(_) => None,
        }
    }

    /// Sterilization kind, if the slot is natural and sterilized.
    pub const fn sterilization(self) -> Option<Sterilization> {
        match self {
            Self::Natural(Fertility::Sterilized(kind)) => Some(kind),
            Self::Absent | Self::Natural(Fertility::Fertile) | Self::BasicProsthetic
            | Self::BionicProsthetic => None,
        }
    }
}

// ---------------------------------------------------------------------------
// CapabilityState
// ---------------------------------------------------------------------------

/// Identity and both capability slots for one individual.
///
/// The default value is the explicit "reset" state: cisgender with neither
/// capability.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct CapabilityState {
    /// Cisgender or transgender.
    pub identity: Identity,
    /// The carry capability.
    pub carry: CapabilitySlot,
    /// The sire capability.
    pub sire: CapabilitySlot,
}

impl CapabilityState {
    /// Build a state from an identity and two presence flags, all natural and fertile.
    pub const fn with_abilities(identity: Identity, carry: bool, sire: bool) -> Self {
        Self {
            identity,
            carry: if carry {
                CapabilitySlot::natural()
            } else {
                CapabilitySlot::Absent
            },
            sire: if sire {
                CapabilitySlot::natural()
            } else {
                CapabilitySlot::Absent
            },
        }
    }

    /// The slot for `capability`.
    pub const fn slot(&self, capability: Capability) -> CapabilitySlot {
        match capability {
            Capability::Carry => self.carry,
            Capability::Sire => self.sire,
        }
    }

    /// Mutable access to the slot for `capability`.
    pub const fn slot_mut(&mut self, capability: Capability) -> &mut CapabilitySlot {
        match capability {
            Capability::Carry => &mut self.carry,
            Capability::Sire => &mut self.sire,
        }
    }

    /// Whether `capability` is held.
    pub const fn has(&self, capability: Capability) -> bool {
        self.slot(capability).is_present()
    }

    /// Whether the carry capability is held.
    pub const fn can_carry(&self) -> bool {
        self.carry.is_present()
    }

    /// Whether the sire capability is held.
    pub const fn can_sire(&self) -> bool {
        self.sire.is_present()
    }

    /// Prosthetic overlay on `capability`, if any.
    pub const fn overlay(&self, capability: Capability) -> Option<ProstheticTier> {
        self.slot(capability).prosthetic_tier()
    }

    /// Sterilization overlay on `capability`, if any.
    pub const fn sterilization(&self, capability: Capability) -> Option<Sterilization> {
        self.slot(capability).sterilization()
    }
}

// ---------------------------------------------------------------------------
// Individual
// ---------------------------------------------------------------------------

/// A weighted relationship from one individual to another.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// The other individual.
    pub partner: IndividualId,
    /// Relative weight used when sampling a partner (non-negative).
    pub weight: f64,
}

/// Genetic payload attached to a pregnancy by the compatibility function.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneticPayload {
    /// Gene identifiers inherited by the offspring.
    pub genes: BTreeSet<String>,
}

/// An active pregnancy attached to its carrier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PregnancyRecord {
    /// Unique pregnancy identifier.
    pub id: PregnancyId,
    /// The individual gestating the pregnancy.
    pub carrier: IndividualId,
    /// The individual that sired it, if known.
    pub sirer: Option<IndividualId>,
    /// Whether the pregnancy was created through the bionic implantation path.
    pub implanted: bool,
    /// Genetic payload from the compatibility function.
    pub payload: GeneticPayload,
}

/// The host snapshot of one individual that the engine reads and writes.
///
/// `capability` is `None` until the individual has been assigned; role
/// resolution falls back to `base_gender` for such individuals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    /// Unique identifier.
    pub id: IndividualId,
    /// Display name.
    pub name: String,
    /// Host gender value. `None` means the host did not provide one.
    pub base_gender: Option<BaseGender>,
    /// Biological age in years.
    pub age_years: f64,
    /// Host fertility-by-age statistic in `0.0..=1.0`.
    pub fertility: f64,
    /// Assigned capability state.
    pub capability: Option<CapabilityState>,
    /// The host's generic sterilized flag, before conversion.
    pub legacy_sterilization: Option<Sterilization>,
    /// Active pregnancy carried by this individual.
    pub pregnancy: Option<PregnancyRecord>,
    /// Relationships used for random-sirer sampling.
    pub relationships: Vec<Relationship>,
    /// Gene identifiers passed to the compatibility function.
    pub genes: BTreeSet<String>,
}

impl Individual {
    /// Create an unassigned individual with no relationships or genes.
    pub fn new(name: impl Into<String>, base_gender: BaseGender, age_years: f64, fertility: f64) -> Self {
        Self {
            id: IndividualId::new(),
            name: name.into(),
            base_gender: Some(base_gender),
            age_years,
            fertility,
            capability: None,
            legacy_sterilization: None,
            pregnancy: None,
            relationships: Vec::new(),
            genes: BTreeSet::new(),
        }
    }

    /// Whether an active pregnancy is attached.
    pub const fn is_pregnant(&self) -> bool {
        self.pregnancy.is_some()
    }

    /// Add or replace the relationship toward `partner`.
    pub fn set_relationship(&mut self, partner: IndividualId, weight: f64) {
        if let Some(existing) = self.relationships.iter_mut().find(|r| r.partner == partner) {
            existing.weight = weight;
        } else {
            self.relationships.push(Relationship { partner, weight });
        }
    }
}

// ---------------------------------------------------------------------------
// Per-interaction results
// ---------------------------------------------------------------------------

/// Which individual plays which role in one interaction.
///
/// Both slots must be filled for a pregnancy attempt to proceed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleAssignment {
    /// The individual that would gestate.
    pub carrier: Option<IndividualId>,
    /// The individual that would sire.
    pub sirer: Option<IndividualId>,
}

impl RoleAssignment {
    /// Whether both roles are filled.
    pub const fn is_viable(&self) -> bool {
        self.carrier.is_some() && self.sirer.is_some()
    }
}

/// Result of a pregnancy attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PregnancyOutcome {
    /// A pregnancy was created and attached to the carrier.
    Created {
        /// The new pregnancy's identifier.
        pregnancy: PregnancyId,
        /// The carrier.
        carrier: IndividualId,
        /// The sirer, if any.
        sirer: Option<IndividualId>,
        /// Genetic payload stored on the record.
        payload: GeneticPayload,
    },
    /// No pregnancy was created.
    Rejected {
        /// Why the attempt was rejected.
        reason: RejectionReason,
    },
}

impl PregnancyOutcome {
    /// Shorthand for a rejection.
    pub const fn rejected(reason: RejectionReason) -> Self {
        Self::Rejected { reason }
    }

    /// Whether a pregnancy was created.
    pub const fn created(&self) -> bool {
        matches!(self, Self::Created { .. })
    }

    /// The rejection reason, if the attempt was rejected.
    pub const fn rejection(&self) -> Option<&RejectionReason> {
        match self {
            Self::Rejected { reason } => Some(reason),
            Self::Created { .. } => None,
        }
    }
}
