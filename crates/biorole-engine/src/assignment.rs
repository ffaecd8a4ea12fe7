//! Tiered assignment of identity and reproductive capability.
//!
//! Every individual goes through the same three tiers, with rates chosen by
//! group (cisgender, transgender binary, nonbinary):
//!
//! 1. **Identity.** Nonbinary is always transgender and consumes no draw.
//!    Binary is transgender iff `roll > cis_rate`.
//! 2. **Tier.** One fresh draw `r`: `r < both` grants both capabilities,
//!    `r < both + neither` grants neither, anything else falls through.
//! 3. **Single ability.** Only when tier 2 fell through, one more fresh draw
//!    against the group's threshold picks carry or sire.
//!
//! Draws happen strictly in that order and only when their tier is reached.
//! Two hosts replaying the same seed therefore see the same downstream draws
//! no matter which branch an earlier individual took.

use rand::Rng;
use tracing::{debug, trace, warn};

use biorole_types::{BaseGender, Capability, CapabilitySlot, CapabilityState, Identity, Individual};

use crate::config::RateTable;
use crate::error::EngineError;
use crate::overlay;
use crate::sterilization;

/// Which branch of the tier roll an assignment took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbilityTier {
    /// Both capabilities.
    Both,
    /// Neither capability.
    Neither,
    /// Exactly the given capability.
    Single(Capability),
}

/// Rates for one group's tier and single-ability rolls.
#[derive(Debug, Clone, Copy, PartialEq)]
struct GroupRates {
    both: f64,
    neither: f64,
    /// Threshold below which the single-ability roll grants `favored`.
    single: f64,
    favored: Capability,
}

impl GroupRates {
    const fn select(identity: Identity, base_gender: BaseGender, rates: &RateTable) -> Self {
        match (base_gender, identity) {
            (BaseGender::Nonbinary, _) => Self {
                both: rates.nonbinary_both_rate,
                neither: rates.nonbinary_neither_rate,
                single: rates.nonbinary_carry_rate,
                favored: Capability::Carry,
            },
            (BaseGender::Male, Identity::Cisgender) => Self {
                both: rates.cis_both_rate,
                neither: rates.cis_neither_rate,
                single: rates.cis_man_carry_rate,
                favored: Capability::Carry,
            },
            (BaseGender::Female, Identity::Cisgender) => Self {
                both: rates.cis_both_rate,
                neither: rates.cis_neither_rate,
                single: rates.cis_woman_sire_rate,
                favored: Capability::Sire,
            },
            (BaseGender::Male, Identity::Transgender) => Self {
                both: rates.trans_both_rate,
                neither: rates.trans_neither_rate,
                single: rates.trans_man_carry_rate,
                favored: Capability::Carry,
            },
            (BaseGender::Female, Identity::Transgender) => Self {
                both: rates.trans_both_rate,
                neither: rates.trans_neither_rate,
                single: rates.trans_woman_sire_rate,
                favored: Capability::Sire,
            },
        }
    }
}

/// Roll identity for `base_gender`.
pub fn roll_identity(base_gender: BaseGender, rates: &RateTable, rng: &mut impl Rng) -> Identity {
    if !base_gender.is_binary() {
        return Identity::Transgender;
    }
    let roll: f64 = rng.random();
    trace!(roll, cis_rate = rates.cis_rate, "Identity roll");
    if roll > rates.cis_rate {
        Identity::Transgender
    } else {
        Identity::Cisgender
    }
}

/// Roll the ability tier for an already-decided identity.
pub fn roll_tier(
    identity: Identity,
    base_gender: BaseGender,
    rates: &RateTable,
    rng: &mut impl Rng,
) -> AbilityTier {
    let group = GroupRates::select(identity, base_gender, rates);

    let tier_roll: f64 = rng.random();
    trace!(tier_roll, both = group.both, neither = group.neither, "Tier roll");
    if tier_roll < group.both {
        return AbilityTier::Both;
    }
    if tier_roll < group.both + group.neither {
        return AbilityTier::Neither;
    }

    let single_roll: f64 = rng.random();
    trace!(single_roll, threshold = group.single, "Single-ability roll");
    if single_roll < group.single {
        AbilityTier::Single(group.favored)
    } else {
        AbilityTier::Single(group.favored.opposite())
    }
}

/// Produce a fresh capability state for `base_gender`.
///
/// Capabilities come out natural and fertile; overlays are a separate step
/// (see [`overlay::apply_overlays`]).
pub fn assign(base_gender: BaseGender, rates: &RateTable, rng: &mut impl Rng) -> CapabilityState {
    let identity = roll_identity(base_gender, rates, rng);
    let tier = roll_tier(identity, base_gender, rates, rng);
    let (carry, sire) = match tier {
        AbilityTier::Both => (true, true),
        AbilityTier::Neither => (false, false),
        AbilityTier::Single(Capability::Carry) => (true, false),
        AbilityTier::Single(Capability::Sire) => (false, true),
    };
    CapabilityState::with_abilities(identity, carry, sire)
}

/// What [`reassign`] did to an individual.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReassignOutcome {
    /// A fresh state replaced the old one.
    Assigned(CapabilityState),
    /// The individual is pregnant; only carry capability was ensured.
    PregnancyPreserved(CapabilityState),
}

impl ReassignOutcome {
    /// The state the individual holds after reassignment.
    pub const fn state(&self) -> CapabilityState {
        match self {
            Self::Assigned(state) | Self::PregnancyPreserved(state) => *state,
        }
    }
}

/// Summary of one [`reassign`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReassignReport {
    /// Resulting state and which path produced it.
    pub outcome: ReassignOutcome,
    /// Whether a generic sterilized flag was consumed.
    pub sterilization_converted: bool,
}

/// Reassign identity and capabilities for a host individual.
///
/// Runs [`assign`], rolls an overlay for each granted capability (carry
/// first), then converts any generic sterilized flag by identity inference.
/// The individual is written only once everything has been decided.
///
/// A pregnant individual is not reassigned: carry capability is ensured
/// (natural and fertile if it was absent), everything else is kept, and no
/// draws are consumed.
///
/// # Errors
///
/// Returns [`EngineError::MissingState`] if the host gave no base gender; the
/// individual is left unchanged.
pub fn reassign(
    individual: &mut Individual,
    rates: &RateTable,
    rng: &mut impl Rng,
) -> Result<ReassignReport, EngineError> {
    let Some(base_gender) = individual.base_gender else {
        warn!(individual = %individual.id, "Reassignment aborted: missing base gender");
        return Err(EngineError::MissingState {
            individual: individual.id,
            field: "base_gender",
        });
    };

    if individual.is_pregnant() {
        let mut state = individual.capability.unwrap_or_default();
        if !state.can_carry() {
            state.carry = CapabilitySlot::natural();
        }
        individual.capability = Some(state);
        debug!(individual = %individual.id, "Pregnant, carry capability preserved");
        return Ok(ReassignReport {
            outcome: ReassignOutcome::PregnancyPreserved(state),
            sterilization_converted: false,
        });
    }

    let mut state = assign(base_gender, rates, rng);
    overlay::apply_overlays(&mut state, rates, rng);

    let sterilization_converted = match individual.legacy_sterilization {
        Some(kind) => {
            let target = sterilization::birth_capability(&state, base_gender);
            let placed = sterilization::place_sterilization(&mut state, target, kind);
            debug!(individual = %individual.id, capability = %target, placed, "Legacy sterilization converted");
            true
        }
        None => false,
    };

    individual.capability = Some(state);
    if sterilization_converted {
        individual.legacy_sterilization = None;
    }

    debug!(
        individual = %individual.id,
        %base_gender,
        identity = %state.identity,
        carry = ?state.carry,
        sire = ?state.sire,
        "Capabilities assigned"
    );

    Ok(ReassignReport {
        outcome: ReassignOutcome::Assigned(state),
        sterilization_converted,
    })
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use biorole_types::{PregnancyId, PregnancyRecord, Sterilization};

    use super::*;

    fn flat_rates() -> RateTable {
        RateTable {
            prosthetic_carry_rate: 0.0,
            prosthetic_sire_rate: 0.0,
            carry_sterilization_rate: 0.0,
            sire_sterilization_rate: 0.0,
            ..RateTable::default()
        }
    }

    #[test]
    fn nonbinary_is_always_transgender_without_a_draw() {
        let rates = RateTable {
            cis_rate: 1.0,
            ..RateTable::default()
        };
        let mut rng = SmallRng::seed_from_u64(1);
        let mut shadow = rng.clone();
        assert_eq!(
            roll_identity(BaseGender::Nonbinary, &rates, &mut rng),
            Identity::Transgender
        );
        let next: u64 = rng.random();
        let expected: u64 = shadow.random();
        assert_eq!(next, expected);
    }

    #[test]
    fn cis_rate_bounds_identity() {
        let mut rng = SmallRng::seed_from_u64(2);
        let all_cis = RateTable {
            cis_rate: 1.0,
            ..RateTable::default()
        };
        let all_trans = RateTable {
            cis_rate: 0.0,
            ..RateTable::default()
        };
        for _ in 0..500 {
            assert_eq!(roll_identity(BaseGender::Male, &all_cis, &mut rng), Identity::Cisgender);
        }
        let trans = (0..500)
            .filter(|_| roll_identity(BaseGender::Female, &all_trans, &mut rng) == Identity::Transgender)
            .count();
        assert_eq!(trans, 500);
    }

    #[test]
    fn both_and_neither_short_circuit_the_single_roll() {
        let rates = RateTable {
            cis_both_rate: 1.0,
            ..RateTable::default()
        };
        let mut rng = SmallRng::seed_from_u64(3);
        let mut shadow = rng.clone();
        assert_eq!(
            roll_tier(Identity::Cisgender, BaseGender::Male, &rates, &mut rng),
            AbilityTier::Both
        );
        // Only the tier draw was consumed.
        let _: f64 = shadow.random();
        let next: u64 = rng.random();
        let expected: u64 = shadow.random();
        assert_eq!(next, expected);
    }

    #[test]
    fn thresholds_are_sequential_not_normalized() {
        // both + neither >= 1.0 makes the single branch unreachable.
        let rates = RateTable {
            trans_both_rate: 0.6,
            trans_neither_rate: 0.6,
            ..RateTable::default()
        };
        let mut rng = SmallRng::seed_from_u64(4);
        for _ in 0..1_000 {
            let tier = roll_tier(Identity::Transgender, BaseGender::Female, &rates, &mut rng);
            assert!(matches!(tier, AbilityTier::Both | AbilityTier::Neither));
        }
    }

    #[test]
    fn single_branch_uses_gender_specific_threshold() {
        let rates = RateTable {
            trans_both_rate: 0.0,
            trans_neither_rate: 0.0,
            trans_man_carry_rate: 1.0,
            trans_woman_sire_rate: 1.0,
            ..RateTable::default()
        };
        let mut rng = SmallRng::seed_from_u64(5);
        assert_eq!(
            roll_tier(Identity::Transgender, BaseGender::Male, &rates, &mut rng),
            AbilityTier::Single(Capability::Carry)
        );
        assert_eq!(
            roll_tier(Identity::Transgender, BaseGender::Female, &rates, &mut rng),
            AbilityTier::Single(Capability::Sire)
        );
    }

    #[test]
    fn assign_is_total_over_extreme_rates() {
        let extremes = [0.0, 1.0];
        for gender in [BaseGender::Male, BaseGender::Female, BaseGender::Nonbinary] {
            for &a in &extremes {
                for &b in &extremes {
                    let rates = RateTable {
                        cis_rate: a,
                        cis_both_rate: b,
                        cis_neither_rate: a,
                        trans_both_rate: a,
                        trans_neither_rate: b,
                        nonbinary_both_rate: b,
                        nonbinary_neither_rate: a,
                        ..RateTable::default()
                    };
                    let mut rng = SmallRng::seed_from_u64(6);
                    let state = assign(gender, &rates, &mut rng);
                    assert!(matches!(state.identity, Identity::Cisgender | Identity::Transgender));
                    assert!(state.carry == CapabilitySlot::Absent || state.carry.is_natural());
                    assert!(state.sire == CapabilitySlot::Absent || state.sire.is_natural());
                }
            }
        }
    }

    #[test]
    fn same_seed_same_state() {
        let rates = RateTable::default();
        for seed in 0..100_u64 {
            let first = assign(BaseGender::Female, &rates, &mut SmallRng::seed_from_u64(seed));
            let second = assign(BaseGender::Female, &rates, &mut SmallRng::seed_from_u64(seed));
            assert_eq!(first, second);
        }
    }

    #[test]
    fn reassign_missing_base_gender_leaves_individual_untouched() {
        let mut ind = Individual::new("Nameless", BaseGender::Male, 25.0, 1.0);
        ind.base_gender = None;
        let before = ind.clone();
        let mut rng = SmallRng::seed_from_u64(7);
        let result = reassign(&mut ind, &RateTable::default(), &mut rng);
        assert!(matches!(
            result,
            Err(EngineError::MissingState { field: "base_gender", .. })
        ));
        assert_eq!(ind, before);
    }

    #[test]
    fn reassign_pregnant_keeps_carry_and_skips_rolls() {
        let mut ind = Individual::new("Expecting", BaseGender::Male, 25.0, 1.0);
        ind.capability = Some(CapabilityState::with_abilities(Identity::Cisgender, false, true));
        ind.pregnancy = Some(PregnancyRecord {
            id: PregnancyId::new(),
            carrier: ind.id,
            sirer: None,
            implanted: false,
            payload: biorole_types::GeneticPayload::default(),
        });
        let mut rng = SmallRng::seed_from_u64(8);
        let mut shadow = rng.clone();

        let report = reassign(&mut ind, &RateTable::default(), &mut rng);
        assert!(report.is_ok());
        let state = ind.capability.unwrap_or_default();
        assert!(state.can_carry());
        assert!(state.can_sire());
        assert!(matches!(
            report.ok().map(|r| r.outcome),
            Some(ReassignOutcome::PregnancyPreserved(_))
        ));

        let next: u64 = rng.random();
        let expected: u64 = shadow.random();
        assert_eq!(next, expected);
    }

    #[test]
    fn reassign_converts_legacy_flag_by_identity() {
        let rates = RateTable {
            cis_rate: 1.0,
            cis_both_rate: 1.0,
            ..flat_rates()
        };
        let mut ind = Individual::new("Vas", BaseGender::Male, 40.0, 1.0);
        ind.legacy_sterilization = Some(Sterilization::Reversible);
        let mut rng = SmallRng::seed_from_u64(9);

        let report = reassign(&mut ind, &rates, &mut rng);
        assert!(matches!(report, Ok(ReassignReport { sterilization_converted: true, .. })));
        let state = ind.capability.unwrap_or_default();
        assert_eq!(state.sterilization(Capability::Sire), Some(Sterilization::Reversible));
        assert_eq!(state.sterilization(Capability::Carry), None);
        assert!(ind.legacy_sterilization.is_none());
    }

    #[test]
    fn reassign_rolls_overlays_for_granted_capabilities() {
        let rates = RateTable {
            nonbinary_both_rate: 1.0,
            prosthetic_carry_rate: 1.0,
            bionic_upgrade_rate: 1.0,
            ..flat_rates()
        };
        let mut ind = Individual::new("Bolt", BaseGender::Nonbinary, 30.0, 1.0);
        let mut rng = SmallRng::seed_from_u64(10);
        assert!(reassign(&mut ind, &rates, &mut rng).is_ok());
        let state = ind.capability.unwrap_or_default();
        assert_eq!(state.carry, CapabilitySlot::BionicProsthetic);
        assert_eq!(state.sire, CapabilitySlot::natural());
        assert_eq!(state.identity, Identity::Transgender);
    }
}
