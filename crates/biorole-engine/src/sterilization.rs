//! Conversion of the host's generic sterilized flag into a capability-specific
//! sterilization.
//!
//! A host only knows "this individual is sterilized". Once capabilities are
//! tracked separately the flag has to land on one of them:
//!
//! - [`InferenceMode::Identity`] (reassignment): the capability assigned at
//!   birth, inferred from identity and base gender. A trans man's birth
//!   capability is carry; a cis man's is sire.
//! - [`InferenceMode::OppositeOf`] (surgical grant): the capability opposite
//!   the one being added, since the new organs cannot be the sterilized ones.

use tracing::{debug, warn};

use biorole_types::{
    BaseGender, Capability, CapabilitySlot, CapabilityState, Identity, Individual, Sterilization,
};

use crate::error::EngineError;

/// How to decide which capability a generic sterilized flag belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InferenceMode {
    /// Infer from identity and base gender.
    Identity,
    /// The capability opposite the one being granted.
    OppositeOf(Capability),
}

/// The capability assigned at birth for an identity and base gender.
///
/// Nonbinary individuals carry no birth inference; the natural carry slot is
/// preferred when present, otherwise sire.
pub const fn birth_capability(
    state: &CapabilityState,
    base_gender: BaseGender,
) -> Capability {
    match (base_gender, state.identity) {
        (BaseGender::Male, Identity::Cisgender) | (BaseGender::Female, Identity::Transgender) => {
            Capability::Sire
        }
        (BaseGender::Male, Identity::Transgender) | (BaseGender::Female, Identity::Cisgender) => {
            Capability::Carry
        }
        (BaseGender::Nonbinary, _) => {
            if state.carry.is_natural() {
                Capability::Carry
            } else {
                Capability::Sire
            }
        }
    }
}

/// Sterilize `target` if it holds natural organs.
///
/// Returns whether the sterilization was applied.
pub(crate) fn place_sterilization(
    state: &mut CapabilityState,
    target: Capability,
    kind: Sterilization,
) -> bool {
    let slot = state.slot_mut(target);
    if slot.is_natural() {
        *slot = CapabilitySlot::sterilized(kind);
        true
    } else {
        false
    }
}

/// Convert `individual`'s generic sterilized flag, if any.
///
/// Returns `Ok(false)` when there was no flag. When there was one it is
/// removed and, if the inferred slot holds natural organs, replaced by a
/// sterilization of the same kind on that slot. A flag inferred onto an
/// absent or prosthetic slot is dropped, since sterilization only applies to
/// natural organs. This holds in [`InferenceMode::OppositeOf`] too: granting
/// carry to someone with no natural sire slot consumes the flag and leaves
/// the state unchanged.
///
/// # Errors
///
/// Returns [`EngineError::Unassigned`] if the individual has no capability
/// state, or [`EngineError::MissingState`] if identity inference needs a base
/// gender the host did not provide. The flag is left in place in both cases.
pub fn convert(individual: &mut Individual, mode: InferenceMode) -> Result<bool, EngineError> {
    let Some(kind) = individual.legacy_sterilization else {
        return Ok(false);
    };
    let Some(state) = individual.capability.as_mut() else {
        warn!(individual = %individual.id, "Cannot convert sterilization before assignment");
        return Err(EngineError::Unassigned(individual.id));
    };

    let target = match mode {
        InferenceMode::OppositeOf(granted) => granted.opposite(),
        InferenceMode::Identity => {
            let Some(base_gender) = individual.base_gender else {
                warn!(individual = %individual.id, "Missing base gender for sterilization inference");
                return Err(EngineError::MissingState {
                    individual: individual.id,
                    field: "base_gender",
                });
            };
            birth_capability(state, base_gender)
        }
    };

    if place_sterilization(state, target, kind) {
        debug!(individual = %individual.id, capability = %target, ?kind, "Legacy sterilization converted");
    } else {
        debug!(
            individual = %individual.id,
            capability = %target,
            "Legacy sterilization dropped, slot is not natural"
        );
    }
    individual.legacy_sterilization = None;
    Ok(true)
}
