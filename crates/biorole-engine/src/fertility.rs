//! Per-slot fertility factors and conception approach multipliers.

use biorole_types::{Capability, CapabilitySlot, Fertility, Individual, PregnancyApproach};

use crate::roles;

/// Flat factor for a basic prosthetic, independent of age.
pub const BASIC_PROSTHETIC_FERTILITY: f64 = 0.5;

/// Flat factor for a bionic prosthetic.
pub const BIONIC_PROSTHETIC_FERTILITY: f64 = 1.0;

/// How much `individual` contributes to conception in the `capability` role.
///
/// Natural fertile organs follow the host's age-based statistic. Prosthetics
/// ignore it. Sterilized or absent slots contribute nothing. Unassigned
/// individuals use the host statistic when their binary role matches.
pub fn fertility_factor(individual: &Individual, capability: Capability) -> f64 {
    let Some(state) = individual.capability else {
        return if roles::can_fill(individual, capability) {
            individual.fertility.clamp(0.0, 1.0)
        } else {
            0.0
        };
    };
    match state.slot(capability) {
        CapabilitySlot::Absent | CapabilitySlot::Natural(Fertility::Sterilized(_)) => 0.0,
        CapabilitySlot::Natural(Fertility::Fertile) => individual.fertility.clamp(0.0, 1.0),
        CapabilitySlot::BasicProsthetic => BASIC_PROSTHETIC_FERTILITY,
        CapabilitySlot::BionicProsthetic => BIONIC_PROSTHETIC_FERTILITY,
    }
}

/// Multiplier applied for the pair's stated approach.
pub const fn approach_factor(approach: PregnancyApproach) -> f64 {
    match approach {
        PregnancyApproach::Normal => 1.0,
        PregnancyApproach::AvoidPregnancy => 0.1,
        PregnancyApproach::TryForBaby => 4.0,
    }
}
