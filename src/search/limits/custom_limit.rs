use std::rc::Rc;

use super::super::SearchMonitor;
use crate::branching::Decision;
use crate::branching::DecisionBuilder;
use crate::engine::SearchStatus;
use crate::engine::Solver;

/// A limit delegating to a user predicate; the search fails as soon as the predicate returns
/// true. Clones share the predicate rather than owning a copy, so a custom limit can be handed
/// to several searches. The predicate may be invoked on every decision and must be repeatable.
pub struct CustomLimit {
    limiter: Rc<dyn Fn(&Solver) -> bool>,
    crossed: bool,
}

impl std::fmt::Debug for CustomLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomLimit")
            .field("crossed", &self.crossed)
            .finish()
    }
}

impl CustomLimit {
    pub fn new(limiter: impl Fn(&Solver) -> bool + 'static) -> CustomLimit {
        CustomLimit {
            limiter: Rc::new(limiter),
            crossed: false,
        }
    }

    /// A copy enforcing the same predicate; the predicate itself is shared, not owned by the
    /// clone.
    pub fn make_clone(&self) -> CustomLimit {
        CustomLimit {
            limiter: Rc::clone(&self.limiter),
            crossed: false,
        }
    }

    fn periodic_check(&mut self, solver: &mut Solver) -> SearchStatus {
        if self.crossed || (self.limiter)(solver) {
            self.crossed = true;
            return Err(solver.fail());
        }
        Ok(())
    }
}

impl SearchMonitor for CustomLimit {
    fn enter_search(&mut self, _solver: &mut Solver) {
        self.crossed = false;
    }

    fn begin_next_decision(
        &mut self,
        solver: &mut Solver,
        _builder: &dyn DecisionBuilder,
    ) -> SearchStatus {
        self.periodic_check(solver)
    }

    fn refute_decision(&mut self, solver: &mut Solver, _decision: &Decision) -> SearchStatus {
        self.periodic_check(solver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_predicate_decides_the_limit() {
        let mut solver = Solver::default();
        let mut limit = CustomLimit::new(|solver: &Solver| solver.branches() >= 3);
        limit.enter_search(&mut solver);

        assert!(limit.periodic_check(&mut solver).is_ok());
        solver.counters.branches = 3;
        assert!(limit.periodic_check(&mut solver).is_err());
    }

    #[test]
    fn clones_share_the_predicate() {
        let limit = CustomLimit::new(|solver: &Solver| solver.failures() > 0);
        let mut cloned = limit.make_clone();

        let mut solver = Solver::default();
        solver.counters.failures = 1;
        assert!(cloned.periodic_check(&mut solver).is_err());
    }
}
