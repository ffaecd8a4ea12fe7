//! Explicit single-slot mutations requested by the host.
//!
//! These are the entry points for surgeries, prosthetic fittings, and
//! player-driven edits. They never roll; the caller decides the outcome.
//! Every function checks its preconditions before touching the individual, so
//! an `Err` always means nothing changed.

use tracing::{debug, info};

use biorole_types::{
    Capability, CapabilitySlot, CapabilityState, Identity, Individual, ProstheticTier,
    Sterilization,
};

use crate::error::EngineError;
use crate::sterilization::{self, InferenceMode};

/// What a newly granted capability is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrantSource {
    /// Transplanted natural organs, fertile.
    Natural,
    /// A prosthetic of the given tier.
    Prosthetic(ProstheticTier),
}

impl GrantSource {
    const fn slot(self) -> CapabilitySlot {
        match self {
            Self::Natural => CapabilitySlot::natural(),
            Self::Prosthetic(tier) => CapabilitySlot::prosthetic(tier),
        }
    }
}

fn state_mut(individual: &mut Individual) -> Result<&mut CapabilityState, EngineError> {
    let id = individual.id;
    individual.capability.as_mut().ok_or(EngineError::Unassigned(id))
}

/// Grant `capability` to an individual that lacks it.
///
/// A generic sterilized flag is converted first, onto the capability opposite
/// the one being granted.
///
/// # Errors
///
/// [`EngineError::Unassigned`] without a capability state,
/// [`EngineError::CapabilityPresent`] if the capability is already held.
pub fn add_capability(
    individual: &mut Individual,
    capability: Capability,
    source: GrantSource,
) -> Result<(), EngineError> {
    let id = individual.id;
    if state_mut(individual)?.has(capability) {
        return Err(EngineError::CapabilityPresent { individual: id, capability });
    }

    sterilization::convert(individual, InferenceMode::OppositeOf(capability))?;
    *state_mut(individual)?.slot_mut(capability) = source.slot();

    info!(individual = %id, %capability, ?source, "Capability granted");
    Ok(())
}

/// Remove `capability`, whatever it was made of.
///
/// # Errors
///
/// [`EngineError::Unassigned`] without a capability state,
/// [`EngineError::CapabilityAbsent`] if it is not held,
/// [`EngineError::PregnancyActive`] when removing carry during a pregnancy.
pub fn remove_capability(individual: &mut Individual, capability: Capability) -> Result<(), EngineError> {
    let id = individual.id;
    let pregnant = individual.is_pregnant();
    let state = state_mut(individual)?;
    if !state.has(capability) {
        return Err(EngineError::CapabilityAbsent { individual: id, capability });
    }
    if capability == Capability::Carry && pregnant {
        return Err(EngineError::PregnancyActive(id));
    }

    *state.slot_mut(capability) = CapabilitySlot::Absent;
    info!(individual = %id, %capability, "Capability removed");
    Ok(())
}

/// Sterilize the natural organs behind `capability`.
///
/// Re-sterilizing replaces the previous kind.
///
/// # Errors
///
/// [`EngineError::Unassigned`], [`EngineError::CapabilityAbsent`], or
/// [`EngineError::NotNatural`] for a prosthetic slot.
pub fn sterilize(
    individual: &mut Individual,
    capability: Capability,
    kind: Sterilization,
) -> Result<(), EngineError> {
    let id = individual.id;
    let slot = state_mut(individual)?.slot_mut(capability);
    match *slot {
        CapabilitySlot::Absent => Err(EngineError::CapabilityAbsent { individual: id, capability }),
        CapabilitySlot::BasicProsthetic | CapabilitySlot::BionicProsthetic => {
            Err(EngineError::NotNatural { individual: id, capability })
        }
        CapabilitySlot::Natural(_) => {
            *slot = CapabilitySlot::sterilized(kind);
            debug!(individual = %id, %capability, ?kind, "Sterilized");
            Ok(())
        }
    }
}

/// Reverse a reversible sterilization.
///
/// # Errors
///
/// [`EngineError::Unassigned`] without a capability state, or
/// [`EngineError::NotReversible`] unless the slot is reversibly sterilized.
pub fn reverse_sterilization(individual: &mut Individual, capability: Capability) -> Result<(), EngineError> {
    let id = individual.id;
    let slot = state_mut(individual)?.slot_mut(capability);
    if slot.sterilization() != Some(Sterilization::Reversible) {
        return Err(EngineError::NotReversible { individual: id, capability });
    }
    *slot = CapabilitySlot::natural();
    debug!(individual = %id, %capability, "Sterilization reversed");
    Ok(())
}

/// Set identity without touching capabilities.
///
/// An unassigned individual gets a default state with the requested identity.
pub fn set_identity(individual: &mut Individual, identity: Identity) {
    let state = individual.capability.get_or_insert_with(CapabilityState::default);
    state.identity = identity;
    debug!(individual = %individual.id, %identity, "Identity set");
}

/// Replace the capability state with the default: cisgender, no capabilities.
pub fn reset(individual: &mut Individual) {
    individual.capability = Some(CapabilityState::default());
    debug!(individual = %individual.id, "Capability state reset");
}
