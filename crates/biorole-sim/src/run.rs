//! The tick loop.
//!
//! A run goes through these phases:
//!
//! 1. Spawn the population and assign every individual from the current rate
//!    snapshot.
//! 2. Each tick:
//!    - reload the rates file if this is the configured reload tick;
//!    - deliver pregnancies that have reached term, assigning the newborns
//!      from the snapshot current at birth;
//!    - let every related pair attempt a pregnancy once;
//!    - run a few single-individual attempts, which may draw a sirer at
//!      random from the carrier's relationships.
//! 3. Tally the final population into a [`PopulationSummary`].
//!
//! A single seeded `SmallRng` drives everything, so a configuration and seed
//! always produce the same summary.

use std::collections::BTreeMap;

use biorole_engine::{
    Attempt, InheritAllGenes, PregnancyNotifier, RateStore, RateTable,
    attempt_pregnancy, end_pregnancy, reassign, try_create_single,
};
use biorole_types::{Individual, PregnancyId, PregnancyOutcome, PregnancyRecord};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::config::SimConfig;
use crate::error::SimError;
use crate::spawner;
use crate::summary::PopulationSummary;

/// Notifier that logs incompatible pairs and counts them.
#[derive(Debug, Default)]
struct LoggingNotifier {
    incompatible: u32,
}

impl PregnancyNotifier for LoggingNotifier {
    fn incompatible(&mut self, carrier: &Individual, sirer: Option<&Individual>, detail: &str) {
        self.incompatible = self.incompatible.saturating_add(1);
        info!(
            carrier = %carrier.name,
            sirer = sirer.map_or("none", |s| s.name.as_str()),
            detail,
            "Pair is genetically incompatible"
        );
    }

    fn created(&mut self, record: &PregnancyRecord) {
        debug!(pregnancy = %record.id, implanted = record.implanted, "Pregnancy announced");
    }
}

/// Two distinct mutable elements of `items`.
fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> Option<(&mut T, &mut T)> {
    if i == j {
        return None;
    }
    let (low, high) = (i.min(j), i.max(j));
    let (head, tail) = items.split_at_mut(high);
    let first = head.get_mut(low)?;
    let second = tail.first_mut()?;
    if i < j { Some((first, second)) } else { Some((second, first)) }
}

struct Simulation {
    population: Vec<Individual>,
    store: RateStore,
    rng: SmallRng,
    genetics: InheritAllGenes,
    notifier: LoggingNotifier,
    conceived_at: BTreeMap<PregnancyId, u32>,
    summary: PopulationSummary,
}

impl Simulation {
    fn assign(&mut self, index: usize, rates: &RateTable) {
        let Some(ind) = self.population.get_mut(index) else {
            return;
        };
        match reassign(ind, rates, &mut self.rng) {
            Ok(report) => {
                if report.sterilization_converted {
                    self.summary.sterilizations_converted =
                        self.summary.sterilizations_converted.saturating_add(1);
                }
            }
            Err(err) => {
                warn!(individual = %ind.id, %err, "Assignment failed");
                self.summary.assignment_errors = self.summary.assignment_errors.saturating_add(1);
            }
        }
    }

    fn record(&mut self, outcome: &PregnancyOutcome, tick: u32) {
        match outcome {
            PregnancyOutcome::Created { pregnancy, .. } => {
                self.conceived_at.insert(*pregnancy, tick);
                self.summary.pregnancies_created = self.summary.pregnancies_created.saturating_add(1);
            }
            PregnancyOutcome::Rejected { reason } => {
                self.summary.record_rejection(&reason.to_string());
            }
        }
    }

    fn deliver(&mut self, tick: u32, gestation_ticks: u32) {
        let rates = self.store.snapshot();
        let mut births = Vec::new();
        for carrier in &mut self.population {
            let due = carrier.pregnancy.as_ref().is_some_and(|p| {
                self.conceived_at
                    .get(&p.id)
                    .is_some_and(|&at| tick.saturating_sub(at) >= gestation_ticks)
            });
            if !due {
                continue;
            }
            if let Some(record) = end_pregnancy(carrier) {
                self.conceived_at.remove(&record.id);
                births.push(record);
            }
        }

        for record in births {
            let name = format!("Child-{}", self.summary.births.saturating_add(1));
            let child = spawner::spawn_newborn(&record, name, &mut self.rng);
            self.population.push(child);
            self.assign(self.population.len().saturating_sub(1), &rates);
            self.summary.births = self.summary.births.saturating_add(1);
        }
    }

    fn pair_attempts(&mut self, tick: u32, attempt: Attempt) {
        for i in 0..self.population.len() {
            let partners: Vec<_> = self
                .population
                .get(i)
                .map(|ind| ind.relationships.iter().map(|r| r.partner).collect())
                .unwrap_or_default();
            for partner in partners {
                let Some(j) = self.population.iter().position(|p| p.id == partner) else {
                    continue;
                };
                // Each related pair tries once per tick.
                if j <= i {
                    continue;
                }
                let Some((a, b)) = pair_mut(&mut self.population, i, j) else {
                    continue;
                };
                let outcome =
                    attempt_pregnancy(a, b, attempt, &mut self.rng, &self.genetics, &mut self.notifier);
                self.record(&outcome, tick);
            }
        }
    }

    fn single_attempts(&mut self, tick: u32, attempt: Attempt, count: u32, allow_random_sirer: bool) {
        for _ in 0..count {
            if self.population.is_empty() {
                return;
            }
            let index = self.rng.random_range(0..self.population.len());
            let mut carrier = self.population.swap_remove(index);
            let outcome = try_create_single(
                &mut carrier,
                &self.population,
                attempt,
                allow_random_sirer,
                &mut self.rng,
                &self.genetics,
                &mut self.notifier,
            );
            self.population.push(carrier);
            let last = self.population.len().saturating_sub(1);
            self.population.swap(index, last);
            self.record(&outcome, tick);
        }
    }
}

/// Validate the parts of the configuration the engine cannot recover from.
fn validate(config: &SimConfig) -> Result<(), SimError> {
    let chance = config.simulation.base_chance;
    if !(0.0..=1.0).contains(&chance) {
        return Err(SimError::InvalidConfig {
            message: format!("simulation.base_chance must be within 0..=1, got {chance}"),
        });
    }
    Ok(())
}

/// Run a full simulation and return its summary.
///
/// # Errors
///
/// Returns [`SimError`] if the configuration is invalid or the rates cannot
/// be loaded. Failures during the run are counted in the summary instead.
pub fn run(config: &SimConfig) -> Result<PopulationSummary, SimError> {
    validate(config)?;
    let sim_config = &config.simulation;

    let (store, report) = config.rate_store()?;
    if report.has_fallbacks() {
        warn!(keys = ?report.invalid, "Some rates fell back to defaults");
    }

    let mut rng = SmallRng::seed_from_u64(sim_config.seed);
    let population = spawner::spawn_population(sim_config, &mut rng);

    let mut sim = Simulation {
        population,
        store,
        rng,
        genetics: InheritAllGenes::with_blocking(sim_config.blocking_genes.iter().cloned()),
        notifier: LoggingNotifier::default(),
        conceived_at: BTreeMap::new(),
        summary: PopulationSummary {
            seed: sim_config.seed,
            ..PopulationSummary::default()
        },
    };

    let rates = sim.store.snapshot();
    for index in 0..sim.population.len() {
        sim.assign(index, &rates);
    }
    info!(
        assigned = sim.population.len(),
        converted = sim.summary.sterilizations_converted,
        errors = sim.summary.assignment_errors,
        "Initial assignment complete"
    );

    let attempt = Attempt::new(sim_config.base_chance);
    for tick in 1..=sim_config.ticks {
        if sim_config.reload_rates_at_tick == Some(tick) {
            match sim.store.reload() {
                Ok(report) => info!(tick, fallbacks = report.invalid.len(), "Rates reloaded"),
                Err(err) => warn!(tick, %err, "Rates reload skipped"),
            }
        }

        sim.deliver(tick, sim_config.gestation_ticks);
        sim.pair_attempts(tick, attempt);
        sim.single_attempts(
            tick,
            attempt,
            sim_config.single_attempts_per_tick,
            sim_config.allow_random_sirer,
        );
        sim.summary.ticks = tick;
        debug!(tick, population = sim.population.len(), "Tick complete");
    }

    sim.summary.pregnancies_implanted = u32::try_from(
        sim.population
            .iter()
            .filter(|i| i.pregnancy.as_ref().is_some_and(|p| p.implanted))
            .count(),
    )
    .unwrap_or(u32::MAX);
    sim.summary.rate_generation = sim.store.generation();
    sim.summary.tally_population(&sim.population);

    info!(
        population = sim.summary.population,
        pregnancies = sim.summary.pregnancies_created,
        births = sim.summary.births,
        incompatible = sim.notifier.incompatible,
        "Run complete"
    );
    Ok(sim.summary)
}
