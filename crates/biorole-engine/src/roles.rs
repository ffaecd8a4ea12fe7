//! Deciding who carries and who sires in a two-party interaction.

use tracing::debug;

use biorole_types::{BaseGender, Capability, Individual, RoleAssignment};

/// Whether `individual` can fill the role for `capability`.
///
/// Individuals without a capability state fall back to the host's binary
/// assumption: male sires, female carries, anyone else neither.
pub fn can_fill(individual: &Individual, capability: Capability) -> bool {
    match individual.capability {
        Some(state) => state.has(capability),
        None => matches!(
            (individual.base_gender, capability),
            (Some(BaseGender::Male), Capability::Sire) | (Some(BaseGender::Female), Capability::Carry)
        ),
    }
}

/// Resolve roles for `a` and `b`.
///
/// The sirer is picked first, checking `a` before `b`. The carrier is then the
/// first of `a`, `b` that can carry and is not the sirer. When both qualify
/// for a role, `a` wins.
pub fn resolve(a: &Individual, b: &Individual) -> RoleAssignment {
    let sirer = [a, b].into_iter().find(|ind| can_fill(ind, Capability::Sire));
    let carrier = [a, b]
        .into_iter()
        .filter(|ind| sirer.is_none_or(|s| s.id != ind.id))
        .find(|ind| can_fill(ind, Capability::Carry));

    let roles = RoleAssignment {
        carrier: carrier.map(|ind| ind.id),
        sirer: sirer.map(|ind| ind.id),
    };
    debug!(a = %a.id, b = %b.id, carrier = ?roles.carrier, sirer = ?roles.sirer, "Roles resolved");
    roles
}

#[cfg(test)]
mod tests {
    use biorole_types::{CapabilityState, Identity};

    use super::*;

    fn with(gender: BaseGender, carry: bool, sire: bool) -> Individual {
        let mut ind = Individual::new("Partner", gender, 28.0, 1.0);
        ind.capability = Some(CapabilityState::with_abilities(Identity::Cisgender, carry, sire));
        ind
    }

    #[test]
    fn capability_wins_over_base_gender() {
        // A female sirer and a male carrier.
        let a = with(BaseGender::Female, false, true);
        let b = with(BaseGender::Male, true, false);
        let roles = resolve(&a, &b);
        assert_eq!(roles.sirer, Some(a.id));
        assert_eq!(roles.carrier, Some(b.id));
        assert!(roles.is_viable());
    }

    #[test]
    fn two_sirers_no_carrier_first_wins() {
        let a = with(BaseGender::Male, false, true);
        let b = with(BaseGender::Male, false, true);
        let roles = resolve(&a, &b);
        assert_eq!(roles.sirer, Some(a.id));
        assert_eq!(roles.carrier, None);
        assert!(!roles.is_viable());
    }

    #[test]
    fn sirer_is_excluded_from_carrying() {
        // a can do both, b can only carry: a sires, b carries.
        let a = with(BaseGender::Nonbinary, true, true);
        let b = with(BaseGender::Female, true, false);
        let roles = resolve(&a, &b);
        assert_eq!(roles.sirer, Some(a.id));
        assert_eq!(roles.carrier, Some(b.id));
    }

    #[test]
    fn lone_dual_capability_cannot_fill_both_roles() {
        let a = with(BaseGender::Nonbinary, true, true);
        let b = with(BaseGender::Female, false, false);
        let roles = resolve(&a, &b);
        assert_eq!(roles.sirer, Some(a.id));
        assert_eq!(roles.carrier, None);
    }

    #[test]
    fn unassigned_individuals_use_binary_fallback() {
        let a = Individual::new("Legacy", BaseGender::Female, 30.0, 1.0);
        let b = Individual::new("Legacy", BaseGender::Male, 30.0, 1.0);
        let roles = resolve(&a, &b);
        assert_eq!(roles.sirer, Some(b.id));
        assert_eq!(roles.carrier, Some(a.id));

        let nb = Individual::new("Legacy", BaseGender::Nonbinary, 30.0, 1.0);
        assert!(!can_fill(&nb, Capability::Carry));
        assert!(!can_fill(&nb, Capability::Sire));
    }
}
