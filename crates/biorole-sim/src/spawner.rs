//! Population spawner for seeding a run.
//!
//! At start the spawner creates the configured number of adults with random
//! names, base genders, ages, and genes, then links them with weighted
//! relationships. A small share arrive with the host's generic sterilized
//! flag set, as a save from before capability tracking would.
//!
//! Individuals leave the spawner unassigned; the run assigns them.

use biorole_types::{BaseGender, Individual, PregnancyRecord, Sterilization};
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use tracing::{debug, info};

use crate::config::SimulationConfig;

/// Built-in name pool. Shuffled per run; reused with a numeric suffix once
/// exhausted.
const NAME_POOL: &[&str] = &[
    "Alex", "Blair", "Casey", "Dana", "Eden", "Finley", "Gray", "Harper",
    "Indigo", "Jordan", "Kai", "Lane", "Morgan", "Noel", "Oakley", "Parker",
    "Quinn", "Reese", "Sasha", "Taylor", "Umi", "Val", "Wren", "Xen",
    "Yael", "Zion", "Ash", "Bay", "Cam", "Drew", "Ellis", "Frankie",
];

/// Genes spawned individuals may carry.
const GENE_POOL: &[&str] = &[
    "red-hair", "freckles", "tall", "left-handed", "green-eyes", "curly-hair",
];

/// Share of the population spawned with a nonbinary base gender.
const NONBINARY_SHARE: f64 = 0.04;

/// Share spawned with the host's generic sterilized flag.
const LEGACY_STERILIZATION_SHARE: f64 = 0.05;

/// Host fertility-by-age curve: full until 30, falling linearly to zero at 50.
pub fn fertility_for_age(age_years: f64) -> f64 {
    if age_years < 30.0 {
        1.0
    } else {
        ((50.0 - age_years) / 20.0).clamp(0.0, 1.0)
    }
}

fn random_base_gender(rng: &mut impl Rng) -> BaseGender {
    if rng.random_bool(NONBINARY_SHARE) {
        BaseGender::Nonbinary
    } else if rng.random_bool(0.5) {
        BaseGender::Male
    } else {
        BaseGender::Female
    }
}

/// Produce `count` names, unique within the run.
fn pick_names(rng: &mut impl Rng, count: usize) -> Vec<String> {
    let mut pool: Vec<&str> = NAME_POOL.to_vec();
    pool.shuffle(rng);
    let round_len = pool.len().max(1);
    pool.iter()
        .cycle()
        .take(count)
        .enumerate()
        .map(|(i, name)| match i.checked_div(round_len).unwrap_or(0) {
            0 => String::from(*name),
            round => format!("{name}-{}", round.saturating_add(1)),
        })
        .collect()
}

/// Spawn the starting population.
///
/// Relationship weights are symmetric; each individual initiates
/// `relationships_per_individual` links toward random others.
pub fn spawn_population(config: &SimulationConfig, rng: &mut impl Rng) -> Vec<Individual> {
    let count = usize::try_from(config.population).unwrap_or(usize::MAX);
    let names = pick_names(rng, count);

    let mut population: Vec<Individual> = names
        .into_iter()
        .map(|name| {
            let base_gender = random_base_gender(rng);
            let age_years = rng.random_range(18.0..45.0);
            let mut ind = Individual::new(name, base_gender, age_years, fertility_for_age(age_years));
            if rng.random_bool(LEGACY_STERILIZATION_SHARE) {
                ind.legacy_sterilization = Some(if rng.random_bool(0.5) {
                    Sterilization::Reversible
                } else {
                    Sterilization::Permanent
                });
            }
            let gene_count = rng.random_range(0..=2);
            ind.genes = GENE_POOL
                .choose_multiple(rng, gene_count)
                .map(|gene| String::from(*gene))
                .collect();
            ind
        })
        .collect();

    link_relationships(&mut population, config.relationships_per_individual, rng);

    info!(
        population = population.len(),
        legacy_sterilized = population.iter().filter(|i| i.legacy_sterilization.is_some()).count(),
        "Population spawned"
    );
    population
}

fn link_relationships(population: &mut [Individual], per_individual: u32, rng: &mut impl Rng) {
    let len = population.len();
    if len < 2 {
        return;
    }

    let mut links = Vec::new();
    for from in 0..len {
        for _ in 0..per_individual {
            let to = rng.random_range(0..len);
            if to != from {
                let weight: f64 = rng.random_range(0.1..1.0);
                links.push((from, to, weight));
            }
        }
    }

    for (from, to, weight) in links {
        let (Some(a), Some(b)) = (population.get(from).map(|i| i.id), population.get(to).map(|i| i.id))
        else {
            continue;
        };
        if let Some(ind) = population.get_mut(from) {
            ind.set_relationship(b, weight);
        }
        if let Some(ind) = population.get_mut(to) {
            ind.set_relationship(a, weight);
        }
    }
}

/// Create the individual born from `record`.
///
/// Newborns inherit the pregnancy's genetic payload and start infertile.
pub fn spawn_newborn(record: &PregnancyRecord, name: String, rng: &mut impl Rng) -> Individual {
    let mut child = Individual::new(name, random_base_gender(rng), 0.0, 0.0);
    child.genes.clone_from(&record.payload.genes);
    debug!(child = %child.id, carrier = %record.carrier, sirer = ?record.sirer, "Newborn spawned");
    child
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use biorole_types::{GeneticPayload, PregnancyId};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn config(population: u32) -> SimulationConfig {
        SimulationConfig {
            population,
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn fertility_curve() {
        assert!((fertility_for_age(20.0) - 1.0).abs() < 1e-12);
        assert!((fertility_for_age(40.0) - 0.5).abs() < 1e-12);
        assert!(fertility_for_age(60.0).abs() < 1e-12);
    }

    #[test]
    fn names_are_unique_past_the_pool() {
        let mut rng = SmallRng::seed_from_u64(1);
        let count = NAME_POOL.len().saturating_mul(2).saturating_add(3);
        let names = pick_names(&mut rng, count);
        let unique: BTreeSet<&String> = names.iter().collect();
        assert_eq!(names.len(), count);
        assert_eq!(unique.len(), count);
    }

    #[test]
    fn spawns_requested_count_unassigned() {
        let mut rng = SmallRng::seed_from_u64(2);
        let population = spawn_population(&config(40), &mut rng);
        assert_eq!(population.len(), 40);
        assert!(population.iter().all(|i| i.capability.is_none()));
        assert!(population.iter().all(|i| i.base_gender.is_some()));
        assert!(population.iter().all(|i| (18.0..45.0).contains(&i.age_years)));
    }

    #[test]
    fn relationships_are_symmetric() {
        let mut rng = SmallRng::seed_from_u64(3);
        let population = spawn_population(&config(30), &mut rng);
        for ind in &population {
            for rel in &ind.relationships {
                assert_ne!(rel.partner, ind.id);
                let partner = population.iter().find(|p| p.id == rel.partner);
                assert!(partner.is_some_and(|p| p.relationships.iter().any(|r| r.partner == ind.id)));
            }
        }
    }

    #[test]
    fn same_seed_same_population_shape() {
        let shape = |seed| {
            let mut rng = SmallRng::seed_from_u64(seed);
            spawn_population(&config(25), &mut rng)
                .into_iter()
                .map(|i| (i.name, i.base_gender, i.genes, i.legacy_sterilization))
                .collect::<Vec<_>>()
        };
        assert_eq!(shape(9), shape(9));
    }

    #[test]
    fn newborn_inherits_payload() {
        let mut rng = SmallRng::seed_from_u64(4);
        let record = PregnancyRecord {
            id: PregnancyId::new(),
            carrier: biorole_types::IndividualId::new(),
            sirer: None,
            implanted: false,
            payload: GeneticPayload {
                genes: BTreeSet::from([String::from("tall")]),
            },
        };
        let child = spawn_newborn(&record, String::from("Baby"), &mut rng);
        assert!(child.genes.contains("tall"));
        assert!(child.fertility.abs() < 1e-12);
        assert!(child.capability.is_none());
    }
}
