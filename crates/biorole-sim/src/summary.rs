//! End-of-run population summary, printed as JSON.

use std::collections::BTreeMap;

use biorole_types::{Capability, CapabilitySlot, Fertility, Identity, Individual, Sterilization};
use serde::Serialize;

/// How many individuals hold which capability combination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CapabilityCounts {
    /// Both carry and sire.
    pub both: u32,
    /// Carry only.
    pub carry_only: u32,
    /// Sire only.
    pub sire_only: u32,
    /// Neither.
    pub neither: u32,
    /// Never assigned.
    pub unassigned: u32,
}

/// Overlay counts across both capability slots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OverlayCounts {
    /// Basic prosthetic slots.
    pub basic_prosthetic: u32,
    /// Bionic prosthetic slots.
    pub bionic_prosthetic: u32,
    /// Reversibly sterilized natural slots.
    pub reversible_sterilization: u32,
    /// Permanently sterilized natural slots.
    pub permanent_sterilization: u32,
}

impl OverlayCounts {
    fn record(&mut self, slot: CapabilitySlot) {
        let counter = match slot {
            CapabilitySlot::Absent | CapabilitySlot::Natural(Fertility::Fertile) => return,
            CapabilitySlot::BasicProsthetic => &mut self.basic_prosthetic,
            CapabilitySlot::BionicProsthetic => &mut self.bionic_prosthetic,
            CapabilitySlot::Natural(Fertility::Sterilized(Sterilization::Reversible)) => {
                &mut self.reversible_sterilization
            }
            CapabilitySlot::Natural(Fertility::Sterilized(Sterilization::Permanent)) => {
                &mut self.permanent_sterilization
            }
        };
        *counter = counter.saturating_add(1);
    }
}

/// Everything the harness reports after a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PopulationSummary {
    /// Seed the run used.
    pub seed: u64,
    /// Ticks executed.
    pub ticks: u32,
    /// Final population size, newborns included.
    pub population: u32,
    /// Individuals per identity.
    pub identities: BTreeMap<String, u32>,
    /// Capability combinations.
    pub capabilities: CapabilityCounts,
    /// Overlays.
    pub overlays: OverlayCounts,
    /// Legacy sterilized flags converted during assignment.
    pub sterilizations_converted: u32,
    /// Individuals the engine could not assign.
    pub assignment_errors: u32,
    /// Pregnancies created.
    pub pregnancies_created: u32,
    /// Active pregnancies on the implantation path.
    pub pregnancies_implanted: u32,
    /// Pregnancies carried to birth.
    pub births: u32,
    /// Pregnancies still active at the end.
    pub pregnancies_active: u32,
    /// Rejected attempts by reason.
    pub rejections: BTreeMap<String, u32>,
    /// Rate snapshots replaced during the run.
    pub rate_generation: u64,
}

fn bump<K: Into<String>>(map: &mut BTreeMap<String, u32>, key: K) {
    let count = map.entry(key.into()).or_insert(0);
    *count = count.saturating_add(1);
}

impl PopulationSummary {
    /// Count one rejection.
    pub fn record_rejection(&mut self, reason: &str) {
        bump(&mut self.rejections, reason);
    }

    /// Fill the population-derived fields from the final population.
    pub fn tally_population(&mut self, population: &[Individual]) {
        self.population = u32::try_from(population.len()).unwrap_or(u32::MAX);
        self.identities.clear();
        self.capabilities = CapabilityCounts::default();
        self.overlays = OverlayCounts::default();
        self.pregnancies_active = 0;

        for ind in population {
            if ind.is_pregnant() {
                self.pregnancies_active = self.pregnancies_active.saturating_add(1);
            }
            let Some(state) = ind.capability else {
                self.capabilities.unassigned = self.capabilities.unassigned.saturating_add(1);
                continue;
            };
            bump(
                &mut self.identities,
                match state.identity {
                    Identity::Cisgender => "cisgender",
                    Identity::Transgender => "transgender",
                },
            );
            let counter = match (state.has(Capability::Carry), state.has(Capability::Sire)) {
                (true, true) => &mut self.capabilities.both,
                (true, false) => &mut self.capabilities.carry_only,
                (false, true) => &mut self.capabilities.sire_only,
                (false, false) => &mut self.capabilities.neither,
            };
            *counter = counter.saturating_add(1);
            self.overlays.record(state.carry);
            self.overlays.record(state.sire);
        }
    }
}

#[cfg(test)]
mod tests {
    use biorole_types::{BaseGender, CapabilityState};

    use super::*;

    #[test]
    fn tallies_capabilities_and_overlays() {
        let mut a = Individual::new("A", BaseGender::Male, 30.0, 1.0);
        a.capability = Some(CapabilityState {
            identity: Identity::Cisgender,
            carry: CapabilitySlot::Absent,
            sire: CapabilitySlot::sterilized(Sterilization::Permanent),
        });
        let mut b = Individual::new("B", BaseGender::Female, 30.0, 1.0);
        b.capability = Some(CapabilityState {
            identity: Identity::Transgender,
            carry: CapabilitySlot::BionicProsthetic,
            sire: CapabilitySlot::natural(),
        });
        let c = Individual::new("C", BaseGender::Nonbinary, 0.0, 0.0);

        let mut summary = PopulationSummary::default();
        summary.tally_population(&[a, b, c]);

        assert_eq!(summary.population, 3);
        assert_eq!(summary.capabilities.sire_only, 1);
        assert_eq!(summary.capabilities.both, 1);
        assert_eq!(summary.capabilities.unassigned, 1);
        assert_eq!(summary.overlays.permanent_sterilization, 1);
        assert_eq!(summary.overlays.bionic_prosthetic, 1);
        assert_eq!(summary.identities.get("transgender"), Some(&1));
    }

    #[test]
    fn serializes_as_json() {
        let mut summary = PopulationSummary::default();
        summary.record_rejection("no carrier");
        summary.record_rejection("no carrier");
        let json = serde_json::to_value(&summary).ok().unwrap_or_default();
        let count = json.pointer("/rejections/no carrier").and_then(serde_json::Value::as_u64);
        assert_eq!(count, Some(2));
        assert!(json.get("capabilities").is_some());
    }
}
