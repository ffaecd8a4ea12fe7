//! End-to-end and statistical scenarios for the `biorole-engine` crate.
//!
//! These run large seeded samples, so they live outside the unit test
//! modules. Everything is deterministic: each test owns its seed.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::cast_precision_loss,
    clippy::arithmetic_side_effects,
    clippy::float_cmp
)]

use biorole_engine::assignment::roll_tier;
use biorole_engine::sterilization::{self, InferenceMode};
use biorole_engine::{
    AbilityTier, Attempt, InheritAllGenes, RateStore, RateTable, SilentNotifier, assign,
    attempt_pregnancy, reassign, resolve,
};
use biorole_types::{
    BaseGender, Capability, CapabilitySlot, CapabilityState, Identity, Individual,
    RejectionReason, Sterilization,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;

const SAMPLES: u32 = 100_000;

fn fraction(count: u32, total: u32) -> f64 {
    f64::from(count) / f64::from(total)
}

#[test]
fn tier_roll_partitions_by_sequential_thresholds() {
    let rates = RateTable {
        trans_both_rate: 0.1,
        trans_neither_rate: 0.2,
        trans_man_carry_rate: 0.5,
        ..RateTable::default()
    };
    let mut rng = SmallRng::seed_from_u64(2024);
    let (mut both, mut neither, mut carry, mut sire) = (0_u32, 0_u32, 0_u32, 0_u32);
    for _ in 0..SAMPLES {
        match roll_tier(Identity::Transgender, BaseGender::Male, &rates, &mut rng) {
            AbilityTier::Both => both += 1,
            AbilityTier::Neither => neither += 1,
            AbilityTier::Single(Capability::Carry) => carry += 1,
            AbilityTier::Single(Capability::Sire) => sire += 1,
        }
    }

    assert!((fraction(both, SAMPLES) - 0.1).abs() < 0.01, "both {both}");
    assert!((fraction(neither, SAMPLES) - 0.2).abs() < 0.01, "neither {neither}");
    // The remaining ~70% split evenly by the single-ability threshold.
    assert!((fraction(carry, SAMPLES) - 0.35).abs() < 0.01, "carry {carry}");
    assert!((fraction(sire, SAMPLES) - 0.35).abs() < 0.01, "sire {sire}");
}

#[test]
fn cis_men_in_single_branch_almost_always_sire() {
    let rates = RateTable {
        cis_rate: 0.9,
        cis_both_rate: 0.0,
        cis_neither_rate: 0.0,
        cis_man_carry_rate: 0.01,
        ..RateTable::default()
    };
    let mut rng = SmallRng::seed_from_u64(7);
    let (mut cis, mut sire_only) = (0_u32, 0_u32);
    for _ in 0..SAMPLES {
        let state = assign(BaseGender::Male, &rates, &mut rng);
        if state.identity == Identity::Cisgender {
            cis += 1;
            if state.can_sire() && !state.can_carry() {
                sire_only += 1;
            }
        }
    }

    assert!((fraction(cis, SAMPLES) - 0.9).abs() < 0.01, "cis {cis}");
    assert!((fraction(sire_only, cis) - 0.99).abs() < 0.005, "sire-only {sire_only} of {cis}");
}

#[test]
fn opposite_conversion_for_carry_only_ever_sterilizes_sire() {
    let rates = RateTable::default();
    let mut rng = SmallRng::seed_from_u64(99);
    for gender in [BaseGender::Male, BaseGender::Female, BaseGender::Nonbinary] {
        for _ in 0..1_000 {
            let mut ind = Individual::new("Donor", gender, 30.0, 1.0);
            let mut state = assign(gender, &rates, &mut rng);
            state.carry = CapabilitySlot::Absent;
            ind.capability = Some(state);
            ind.legacy_sterilization = Some(Sterilization::Reversible);

            let converted = sterilization::convert(&mut ind, InferenceMode::OppositeOf(Capability::Carry));
            assert!(matches!(converted, Ok(true)));
            assert!(ind.legacy_sterilization.is_none());
            let after = ind.capability.unwrap_or_default();
            assert_eq!(after.sterilization(Capability::Carry), None);
            match state.sire {
                CapabilitySlot::Natural(_) => {
                    assert_eq!(after.sterilization(Capability::Sire), Some(Sterilization::Reversible));
                }
                // No natural sire slot to hold the flag: it is consumed and dropped.
                _ => assert_eq!(after, state),
            }
        }
    }
}

#[test]
fn opposite_conversion_onto_absent_or_prosthetic_slot_drops_flag() {
    for sire in [CapabilitySlot::Absent, CapabilitySlot::BasicProsthetic, CapabilitySlot::BionicProsthetic] {
        let state = CapabilityState {
            identity: Identity::Transgender,
            carry: CapabilitySlot::Absent,
            sire,
        };
        let mut ind = Individual::new("Donor", BaseGender::Female, 30.0, 1.0);
        ind.capability = Some(state);
        ind.legacy_sterilization = Some(Sterilization::Permanent);

        let converted = sterilization::convert(&mut ind, InferenceMode::OppositeOf(Capability::Carry));
        assert!(matches!(converted, Ok(true)));
        assert!(ind.legacy_sterilization.is_none());
        assert_eq!(ind.capability, Some(state));
    }
}

#[test]
fn reassigned_population_resolves_and_conceives() {
    let rates = RateTable::default();
    let mut rng = SmallRng::seed_from_u64(31);
    let mut population: Vec<Individual> = (0..200)
        .map(|i| {
            let gender = match i % 3 {
                0 => BaseGender::Male,
                1 => BaseGender::Female,
                _ => BaseGender::Nonbinary,
            };
            Individual::new(format!("Person {i}"), gender, 25.0, 0.9)
        })
        .collect();
    for ind in &mut population {
        assert!(reassign(ind, &rates, &mut rng).is_ok());
    }

    let mut created = 0_u32;
    let mut rejected_no_role = 0_u32;
    for pair in population.chunks_exact_mut(2) {
        let [a, b] = pair else { continue };
        let roles = resolve(a, b);
        let outcome = attempt_pregnancy(
            a,
            b,
            Attempt::new(1.0),
            &mut rng,
            &InheritAllGenes::new(),
            &mut SilentNotifier,
        );
        if outcome.created() {
            created += 1;
            assert!(roles.is_viable());
        } else if matches!(
            outcome.rejection(),
            Some(RejectionReason::NoCarrier | RejectionReason::NoSirer)
        ) {
            rejected_no_role += 1;
            assert!(!roles.is_viable());
        }
    }
    assert!(created > 0);
    assert!(rejected_no_role > 0);
}

#[test]
fn two_sirers_without_carrier_reject_with_no_carrier() {
    let mut a = Individual::new("A", BaseGender::Female, 30.0, 1.0);
    a.capability = Some(CapabilityState::with_abilities(Identity::Transgender, false, true));
    let mut b = Individual::new("B", BaseGender::Male, 30.0, 1.0);
    b.capability = Some(CapabilityState::with_abilities(Identity::Cisgender, false, true));

    let roles = resolve(&a, &b);
    assert_eq!(roles.sirer, Some(a.id));
    assert_eq!(roles.carrier, None);

    let before = (a.clone(), b.clone());
    let mut rng = SmallRng::seed_from_u64(3);
    let outcome = attempt_pregnancy(
        &mut a,
        &mut b,
        Attempt::new(1.0),
        &mut rng,
        &InheritAllGenes::new(),
        &mut SilentNotifier,
    );
    assert_eq!(outcome.rejection(), Some(&RejectionReason::NoCarrier));
    assert_eq!((a, b), before);
}

#[test]
fn reloaded_snapshot_changes_later_assignments_only() {
    let mut store = RateStore::new(RateTable {
        cis_rate: 1.0,
        ..RateTable::default()
    });
    let before = store.snapshot();
    let reloaded = store.reload_from_str("cis_rate: 0\n");
    assert!(reloaded.is_ok());
    let after = store.snapshot();

    assert_eq!(before.cis_rate, 1.0);
    assert_eq!(after.cis_rate, 0.0);
    assert!(store.generation() > 0);

    let mut rng = SmallRng::seed_from_u64(5);
    let old = assign(BaseGender::Female, &before, &mut rng);
    assert_eq!(old.identity, Identity::Cisgender);
}
