use super::Domain;
use super::Failure;
use super::VarId;
use crate::basic_types::Trail;
use crate::containers::KeyedVec;

/// A single reversible domain operation recorded on the trail.
#[derive(Debug, Clone, Copy)]
pub(crate) enum DomainChange {
    LowerBound { variable: VarId, old_bound: i64 },
    UpperBound { variable: VarId, old_bound: i64 },
    Removal { variable: VarId, value: i64 },
}

/// The domain store. All mutations are recorded on a [`Trail`] partitioned by decision level;
/// backtracking restores every domain to its state at the target level before anything else
/// observes it.
#[derive(Debug, Default)]
pub(crate) struct Assignments {
    domains: KeyedVec<VarId, Domain>,
    trail: Trail<DomainChange>,
}

impl Assignments {
    pub(crate) fn grow(&mut self, lower_bound: i64, upper_bound: i64) -> VarId {
        self.domains.push(Domain::new(lower_bound, upper_bound))
    }

    pub(crate) fn num_domains(&self) -> usize {
        self.domains.len()
    }

    pub(crate) fn domain(&self, variable: VarId) -> &Domain {
        &self.domains[variable]
    }

    pub(crate) fn decision_level(&self) -> usize {
        self.trail.get_decision_level()
    }

    pub(crate) fn increase_decision_level(&mut self) {
        self.trail.increase_decision_level();
    }

    pub(crate) fn synchronise(&mut self, new_decision_level: usize) {
        let domains = &mut self.domains;
        self.trail
            .synchronise(new_decision_level)
            .for_each(|change| match change {
                DomainChange::LowerBound {
                    variable,
                    old_bound,
                } => domains[variable].set_lower_bound(old_bound),
                DomainChange::UpperBound {
                    variable,
                    old_bound,
                } => domains[variable].set_upper_bound(old_bound),
                DomainChange::Removal { variable, value } => domains[variable].remove_hole(value),
            });
    }

    /// Raises the lower bound to `value`; returns whether the domain changed.
    pub(crate) fn tighten_lower_bound(
        &mut self,
        variable: VarId,
        value: i64,
    ) -> Result<bool, Failure> {
        let domain = &self.domains[variable];
        if value <= domain.lower_bound() {
            return Ok(false);
        }
        let new_bound = domain.first_value_at_or_above(value).ok_or(Failure)?;
        self.trail.push(DomainChange::LowerBound {
            variable,
            old_bound: domain.lower_bound(),
        });
        self.domains[variable].set_lower_bound(new_bound);
        Ok(true)
    }

    /// Lowers the upper bound to `value`; returns whether the domain changed.
    pub(crate) fn tighten_upper_bound(
        &mut self,
        variable: VarId,
        value: i64,
    ) -> Result<bool, Failure> {
        let domain = &self.domains[variable];
        if value >= domain.upper_bound() {
            return Ok(false);
        }
        let new_bound = domain.first_value_at_or_below(value).ok_or(Failure)?;
        self.trail.push(DomainChange::UpperBound {
            variable,
            old_bound: domain.upper_bound(),
        });
        self.domains[variable].set_upper_bound(new_bound);
        Ok(true)
    }

    pub(crate) fn fix(&mut self, variable: VarId, value: i64) -> Result<bool, Failure> {
        if !self.domains[variable].contains(value) {
            return Err(Failure);
        }
        let raised = self.tighten_lower_bound(variable, value)?;
        let lowered = self.tighten_upper_bound(variable, value)?;
        Ok(raised || lowered)
    }

    pub(crate) fn remove_value(&mut self, variable: VarId, value: i64) -> Result<bool, Failure> {
        let domain = &self.domains[variable];
        if !domain.contains(value) {
            return Ok(false);
        }
        if domain.is_fixed() {
            return Err(Failure);
        }
        if value == domain.lower_bound() {
            let new_bound = domain.first_value_at_or_above(value + 1).ok_or(Failure)?;
            self.trail.push(DomainChange::LowerBound {
                variable,
                old_bound: domain.lower_bound(),
            });
            self.domains[variable].set_lower_bound(new_bound);
        } else if value == domain.upper_bound() {
            let new_bound = domain.first_value_at_or_below(value - 1).ok_or(Failure)?;
            self.trail.push(DomainChange::UpperBound {
                variable,
                old_bound: domain.upper_bound(),
            });
            self.domains[variable].set_upper_bound(new_bound);
        } else {
            self.trail.push(DomainChange::Removal { variable, value });
            self.domains[variable].insert_hole(value);
        }
        Ok(true)
    }

    pub(crate) fn memory_estimate(&self) -> usize {
        self.domains.len() * std::mem::size_of::<Domain>()
            + self.trail.len() * std::mem::size_of::<DomainChange>()
    }
}

#[cfg(test)]
mod tests {
    use super::Assignments;

    #[test]
    fn backtracking_restores_bounds_and_holes() {
        let mut assignments = Assignments::default();
        let variable = assignments.grow(0, 10);

        assignments.increase_decision_level();
        let _ = assignments.tighten_lower_bound(variable, 2).unwrap();
        let _ = assignments.remove_value(variable, 5).unwrap();
        let _ = assignments.tighten_upper_bound(variable, 8).unwrap();

        assert_eq!(assignments.domain(variable).lower_bound(), 2);
        assert_eq!(assignments.domain(variable).upper_bound(), 8);
        assert!(!assignments.domain(variable).contains(5));

        assignments.synchronise(0);
        assert_eq!(assignments.domain(variable).lower_bound(), 0);
        assert_eq!(assignments.domain(variable).upper_bound(), 10);
        assert!(assignments.domain(variable).contains(5));
    }

    #[test]
    fn removing_a_bound_value_moves_the_bound_past_holes() {
        let mut assignments = Assignments::default();
        let variable = assignments.grow(0, 5);

        let _ = assignments.remove_value(variable, 1).unwrap();
        let _ = assignments.remove_value(variable, 0).unwrap();
        assert_eq!(assignments.domain(variable).lower_bound(), 2);
    }

    #[test]
    fn fixing_outside_the_domain_fails() {
        let mut assignments = Assignments::default();
        let variable = assignments.grow(0, 5);
        let _ = assignments.remove_value(variable, 3).unwrap();
        assert!(assignments.fix(variable, 3).is_err());
    }
}
