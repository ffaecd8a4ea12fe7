//! Prosthetic and sterilization overlays for freshly granted capabilities.
//!
//! Each granted capability gets one overlay decision:
//!
//! ```text
//! roll < prosthetic_<cap>_rate      -> prosthetic (bionic iff next roll < bionic_upgrade_rate)
//! else roll < <cap>_sterilization_rate -> sterilized (reversible iff next roll < reversible_sterilization_rate)
//! else                              -> natural, fertile
//! ```
//!
//! Sterilization is only rolled once the prosthetic roll has failed, so a
//! prosthetic slot is never sterilized.

use rand::Rng;
use tracing::trace;

use biorole_types::{Capability, CapabilitySlot, CapabilityState, ProstheticTier, Sterilization};

use crate::config::RateTable;

/// Roll the overlay for a newly granted `capability`.
///
/// Draws consumed: two on the prosthetic path, three on the sterilized path,
/// two on the natural path.
pub fn roll_overlay(capability: Capability, rates: &RateTable, rng: &mut impl Rng) -> CapabilitySlot {
    let (prosthetic_rate, sterilization_rate) = match capability {
        Capability::Carry => (rates.prosthetic_carry_rate, rates.carry_sterilization_rate),
        Capability::Sire => (rates.prosthetic_sire_rate, rates.sire_sterilization_rate),
    };

    let prosthetic_roll: f64 = rng.random();
    if prosthetic_roll < prosthetic_rate {
        let tier_roll: f64 = rng.random();
        let tier = if tier_roll < rates.bionic_upgrade_rate {
            ProstheticTier::Bionic
        } else {
            ProstheticTier::Basic
        };
        trace!(%capability, ?tier, "Prosthetic overlay");
        return CapabilitySlot::prosthetic(tier);
    }

    let sterilization_roll: f64 = rng.random();
    if sterilization_roll < sterilization_rate {
        let kind_roll: f64 = rng.random();
        let kind = if kind_roll < rates.reversible_sterilization_rate {
            Sterilization::Reversible
        } else {
            Sterilization::Permanent
        };
        trace!(%capability, ?kind, "Sterilization overlay");
        return CapabilitySlot::sterilized(kind);
    }

    CapabilitySlot::natural()
}

/// Roll overlays for every capability held in `state`, carry first.
///
/// Absent slots consume no draws.
pub fn apply_overlays(state: &mut CapabilityState, rates: &RateTable, rng: &mut impl Rng) {
    for capability in [Capability::Carry, Capability::Sire] {
        if state.has(capability) {
            *state.slot_mut(capability) = roll_overlay(capability, rates, rng);
        }
    }
}
