//! Pregnancy creation.
//!
//! [`try_create`] is the core protocol for an already-resolved carrier and
//! sirer:
//!
//! 1. A carrier that is already pregnant, or cannot carry, is rejected with
//!    no draw and no mutation.
//! 2. The success chance is the base chance times both fertility factors
//!    times the approach factor, clamped to `[0, 1]`. A bionic carry slot
//!    takes the implantation path with a chance of exactly 1.0, unless the
//!    sirer is sterilized or has no sire slot.
//! 3. One draw decides success. A failed draw leaves no trace.
//! 4. The [`GeneticCompatibility`] seam produces the payload or refuses the
//!    pair. Refusals go to the [`PregnancyNotifier`].
//!
//! [`attempt_pregnancy`] resolves roles for two individuals first.
//! [`try_create_single`] is the single-individual entry point, which may
//! pick a sirer from the carrier's relationships.

use std::collections::BTreeSet;

use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{debug, info, trace};

use biorole_types::{
    Capability, CapabilitySlot, GeneticPayload, Individual, PregnancyApproach, PregnancyId,
    PregnancyOutcome, PregnancyRecord, RejectionReason,
};

use crate::fertility::{approach_factor, fertility_factor};
use crate::roles;

/// Probability that the random-sirer fallback concludes there is no sirer.
pub const NO_SIRER_CHANCE: f64 = 0.25;

/// Parameters of one conception attempt, supplied by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attempt {
    /// Host base chance before fertility and approach factors.
    pub base_chance: f64,
    /// How the pair is approaching conception.
    pub approach: PregnancyApproach,
}

impl Attempt {
    /// An attempt with the given base chance and no stated approach.
    pub const fn new(base_chance: f64) -> Self {
        Self {
            base_chance,
            approach: PregnancyApproach::Normal,
        }
    }

    /// Set the approach.
    #[must_use]
    pub const fn with_approach(mut self, approach: PregnancyApproach) -> Self {
        self.approach = approach;
        self
    }
}

/// Answer from a [`GeneticCompatibility`] implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compatibility {
    /// The pair is compatible; the payload goes on the pregnancy record.
    Compatible(GeneticPayload),
    /// The pair cannot conceive together.
    Incompatible {
        /// Explanation for the host.
        detail: String,
    },
}

/// Genetic-compatibility seam.
///
/// The engine does not model inheritance itself; it asks this for a payload
/// once the success roll has passed.
pub trait GeneticCompatibility {
    /// Decide whether `carrier` and `sirer` can conceive and with what payload.
    fn check(&self, carrier: &Individual, sirer: Option<&Individual>) -> Compatibility;
}

/// Compatibility that passes every parental gene through.
///
/// A pair is incompatible when either parent carries a gene from the blocking
/// set.
#[derive(Debug, Clone, Default)]
pub struct InheritAllGenes {
    blocking: BTreeSet<String>,
}

impl InheritAllGenes {
    /// No blocking genes; every pair is compatible.
    pub const fn new() -> Self {
        Self {
            blocking: BTreeSet::new(),
        }
    }

    /// Treat `genes` as blocking.
    pub fn with_blocking<I, S>(genes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            blocking: genes.into_iter().map(Into::into).collect(),
        }
    }
}

impl GeneticCompatibility for InheritAllGenes {
    fn check(&self, carrier: &Individual, sirer: Option<&Individual>) -> Compatibility {
        for parent in std::iter::once(carrier).chain(sirer) {
            if let Some(gene) = parent.genes.intersection(&self.blocking).next() {
                return Compatibility::Incompatible {
                    detail: format!("{} carries blocking gene {gene}", parent.name),
                };
            }
        }
        let genes = carrier
            .genes
            .iter()
            .chain(sirer.into_iter().flat_map(|s| s.genes.iter()))
            .cloned()
            .collect();
        Compatibility::Compatible(GeneticPayload { genes })
    }
}

/// Receives pregnancy events the host may want to show.
pub trait PregnancyNotifier {
    /// The genetic seam refused the pair.
    fn incompatible(&mut self, carrier: &Individual, sirer: Option<&Individual>, detail: &str);

    /// A pregnancy was attached to its carrier.
    fn created(&mut self, _record: &PregnancyRecord) {}
}

/// A notifier that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentNotifier;

impl PregnancyNotifier for SilentNotifier {
    fn incompatible(&mut self, _carrier: &Individual, _sirer: Option<&Individual>, _detail: &str) {}
}

/// Whether the carrier's carry slot is bionic.
fn is_implantation(carrier: &Individual) -> bool {
    carrier
        .capability
        .is_some_and(|state| state.carry == CapabilitySlot::BionicProsthetic)
}

/// Chance of conception for `carrier` with `sirer`.
///
/// With no sirer only the carrier's fertility counts. When the sirer is the
/// carrier, its fertility is counted once, in the sire role. A carrier that
/// cannot carry has no chance at all.
///
/// A bionic carrier skips the age curve but still needs a sirer that
/// contributes something: a sterilized or absent sire slot gives 0.
pub fn pregnancy_chance(carrier: &Individual, sirer: Option<&Individual>, attempt: Attempt) -> f64 {
    if !roles::can_fill(carrier, Capability::Carry) {
        return 0.0;
    }
    if is_implantation(carrier) {
        let sirer_viable = sirer.is_none_or(|s| fertility_factor(s, Capability::Sire) > 0.0);
        return if sirer_viable { 1.0 } else { 0.0 };
    }
    let carrier_factor = match sirer {
        Some(s) if s.id == carrier.id => 1.0,
        _ => fertility_factor(carrier, Capability::Carry),
    };
    let sirer_factor = sirer.map_or(1.0, |s| fertility_factor(s, Capability::Sire));
    let chance = attempt.base_chance * sirer_factor * carrier_factor * approach_factor(attempt.approach);
    chance.clamp(0.0, 1.0)
}

/// Try to create a pregnancy for an already-resolved pair.
pub fn try_create(
    carrier: &mut Individual,
    sirer: Option<&Individual>,
    attempt: Attempt,
    rng: &mut impl Rng,
    genetics: &impl GeneticCompatibility,
    notifier: &mut impl PregnancyNotifier,
) -> PregnancyOutcome {
    if carrier.is_pregnant() {
        debug!(carrier = %carrier.id, "Already pregnant");
        return PregnancyOutcome::rejected(RejectionReason::AlreadyPregnant);
    }
    if !roles::can_fill(carrier, Capability::Carry) {
        debug!(carrier = %carrier.id, "Carrier cannot carry");
        return PregnancyOutcome::rejected(RejectionReason::NoCarrier);
    }

    let implanted = is_implantation(carrier);
    let chance = pregnancy_chance(carrier, sirer, attempt);
    let roll: f64 = rng.random();
    trace!(carrier = %carrier.id, roll, chance, implanted, "Conception roll");
    if roll >= chance {
        return PregnancyOutcome::rejected(RejectionReason::ChanceFailed);
    }

    let payload = match genetics.check(carrier, sirer) {
        Compatibility::Compatible(payload) => payload,
        Compatibility::Incompatible { detail } => {
            debug!(carrier = %carrier.id, %detail, "Genetically incompatible");
            notifier.incompatible(carrier, sirer, &detail);
            return PregnancyOutcome::rejected(RejectionReason::Incompatible { detail });
        }
    };

    let record = PregnancyRecord {
        id: PregnancyId::new(),
        carrier: carrier.id,
        sirer: sirer.map(|s| s.id),
        implanted,
        payload,
    };
    let outcome = PregnancyOutcome::Created {
        pregnancy: record.id,
        carrier: record.carrier,
        sirer: record.sirer,
        payload: record.payload.clone(),
    };
    info!(carrier = %carrier.id, sirer = ?record.sirer, pregnancy = %record.id, implanted, "Pregnancy created");
    notifier.created(&record);
    carrier.pregnancy = Some(record);
    outcome
}

/// Resolve roles for `a` and `b`, then try to create a pregnancy.
pub fn attempt_pregnancy(
    a: &mut Individual,
    b: &mut Individual,
    attempt: Attempt,
    rng: &mut impl Rng,
    genetics: &impl GeneticCompatibility,
    notifier: &mut impl PregnancyNotifier,
) -> PregnancyOutcome {
    let roles = roles::resolve(a, b);
    let Some(carrier) = roles.carrier else {
        return PregnancyOutcome::rejected(RejectionReason::NoCarrier);
    };
    if roles.sirer.is_none() {
        return PregnancyOutcome::rejected(RejectionReason::NoSirer);
    }

    if carrier == a.id {
        try_create(a, Some(&*b), attempt, rng, genetics, notifier)
    } else {
        try_create(b, Some(&*a), attempt, rng, genetics, notifier)
    }
}

/// Pick a sirer from the carrier's relationships, weighted by relationship
/// weight.
///
/// Returns `None` when there is no eligible partner, or when the
/// [`NO_SIRER_CHANCE`] draw concludes there is no sirer. The weighted pick is
/// only drawn after the no-sirer draw fails.
pub fn pick_random_sirer<'a>(
    carrier: &Individual,
    population: &'a [Individual],
    rng: &mut impl Rng,
) -> Option<&'a Individual> {
    let candidates: Vec<(&Individual, f64)> = carrier
        .relationships
        .iter()
        .filter(|rel| rel.weight.is_finite() && rel.weight > 0.0 && rel.partner != carrier.id)
        .filter_map(|rel| {
            population
                .iter()
                .find(|ind| ind.id == rel.partner)
                .filter(|ind| roles::can_fill(ind, Capability::Sire))
                .map(|ind| (ind, rel.weight))
        })
        .collect();
    if candidates.is_empty() {
        return None;
    }

    let no_sirer_roll: f64 = rng.random();
    if no_sirer_roll < NO_SIRER_CHANCE {
        trace!(carrier = %carrier.id, "Random sirer fallback chose no sirer");
        return None;
    }
    candidates
        .choose_weighted(rng, |(_, weight)| *weight)
        .ok()
        .map(|(ind, _)| *ind)
}

/// Single-individual entry point.
///
/// With `allow_random_sirer`, a sirer may be drawn from the carrier's
/// relationships (see [`pick_random_sirer`]); otherwise, or when none is
/// drawn, the pregnancy is sirer-less and uses carrier fertility only.
pub fn try_create_single(
    carrier: &mut Individual,
    population: &[Individual],
    attempt: Attempt,
    allow_random_sirer: bool,
    rng: &mut impl Rng,
    genetics: &impl GeneticCompatibility,
    notifier: &mut impl PregnancyNotifier,
) -> PregnancyOutcome {
    if carrier.is_pregnant() {
        return PregnancyOutcome::rejected(RejectionReason::AlreadyPregnant);
    }
    if !roles::can_fill(carrier, Capability::Carry) {
        return PregnancyOutcome::rejected(RejectionReason::NoCarrier);
    }

    let sirer = if allow_random_sirer {
        pick_random_sirer(carrier, population, rng)
    } else {
        None
    };
    try_create(carrier, sirer, attempt, rng, genetics, notifier)
}

/// Detach and return the carrier's active pregnancy.
pub fn end_pregnancy(individual: &mut Individual) -> Option<PregnancyRecord> {
    let record = individual.pregnancy.take();
    if let Some(ref ended) = record {
        info!(carrier = %individual.id, pregnancy = %ended.id, "Pregnancy ended");
    }
    record
}
