use super::SearchMonitor;
use crate::branching::Decision;
use crate::engine::SearchStatus;
use crate::engine::Solver;
use crate::engine::VarId;
use crate::gourd_assert_simple;

/// The objective monitor: after each accepted solution with value `v`, all subsequent search is
/// constrained to an objective strictly better than `v` by at least `step`. The bound is
/// re-asserted on every refutation and on restarts so it survives backtracking.
#[derive(Debug)]
pub struct OptimizeVar {
    maximize: bool,
    variable: VarId,
    step: i64,
    best: i64,
}

impl OptimizeVar {
    pub fn new(maximize: bool, variable: VarId, step: i64) -> OptimizeVar {
        gourd_assert_simple!(step > 0, "The step of an objective must be positive");
        OptimizeVar {
            maximize,
            variable,
            step,
            best: if maximize { i64::MIN } else { i64::MAX },
        }
    }

    pub fn minimize(variable: VarId, step: i64) -> OptimizeVar {
        OptimizeVar::new(false, variable, step)
    }

    pub fn maximize(variable: VarId, step: i64) -> OptimizeVar {
        OptimizeVar::new(true, variable, step)
    }

    pub fn best(&self) -> i64 {
        self.best
    }

    fn apply_bound(&self, solver: &mut Solver) -> SearchStatus {
        if self.maximize {
            solver.set_min(self.variable, self.best.saturating_add(self.step))
        } else {
            solver.set_max(self.variable, self.best.saturating_sub(self.step))
        }
    }
}

impl SearchMonitor for OptimizeVar {
    fn enter_search(&mut self, _solver: &mut Solver) {
        self.best = if self.maximize { i64::MIN } else { i64::MAX };
    }

    fn restart_search(&mut self, solver: &mut Solver) -> SearchStatus {
        self.apply_bound(solver)
    }

    fn refute_decision(&mut self, solver: &mut Solver, _decision: &Decision) -> SearchStatus {
        self.apply_bound(solver)
    }

    fn accept_solution(&mut self, solver: &mut Solver) -> bool {
        let value = solver.value(self.variable);
        // In a single-threaded search the bound has always been applied before a candidate is
        // reached, so this check cannot reject; it is kept for drivers which interleave bound
        // updates differently.
        if self.maximize {
            value > self.best
        } else {
            value < self.best
        }
    }

    fn at_solution(&mut self, solver: &mut Solver) -> bool {
        let value = solver.value(self.variable);
        if self.maximize {
            gourd_assert_simple!(
                value > self.best,
                "The solution must improve on the best objective"
            );
        } else {
            gourd_assert_simple!(
                value < self.best,
                "The solution must improve on the best objective"
            );
        }
        self.best = value;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_bound_is_reapplied_on_refutation() {
        let mut solver = Solver::default();
        let objective = solver.new_bounded_integer(0, 10);
        let mut optimize = OptimizeVar::minimize(objective, 1);

        optimize.enter_search(&mut solver);
        solver.push_decision_level();
        solver.set_value(objective, 5).unwrap();
        assert!(optimize.accept_solution(&mut solver));
        assert!(optimize.at_solution(&mut solver));
        assert_eq!(optimize.best(), 5);

        solver.backtrack_to(0);
        let decision = Decision::assign(objective, 0);
        optimize.refute_decision(&mut solver, &decision).unwrap();
        assert_eq!(solver.upper_bound(objective), 4);
    }

    #[test]
    fn non_improving_solutions_are_rejected() {
        let mut solver = Solver::default();
        let objective = solver.new_bounded_integer(0, 10);
        let mut optimize = OptimizeVar::maximize(objective, 2);
        optimize.enter_search(&mut solver);

        solver.set_value(objective, 4).unwrap();
        assert!(optimize.accept_solution(&mut solver));
        assert!(optimize.at_solution(&mut solver));

        let mut fresh = Solver::default();
        let objective = fresh.new_bounded_integer(0, 10);
        fresh.set_value(objective, 4).unwrap();
        assert!(!optimize.accept_solution(&mut fresh));
    }

    #[test]
    #[should_panic]
    fn a_non_positive_step_aborts() {
        let _ = OptimizeVar::new(false, VarId::new(0), 0);
    }
}
