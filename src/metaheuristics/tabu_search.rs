use std::collections::VecDeque;

use super::Metaheuristic;
use crate::basic_types::Assignment;
use crate::branching::Decision;
use crate::engine::SearchStatus;
use crate::engine::Solver;
use crate::engine::VarId;
use crate::search::SearchMonitor;

#[derive(Debug, Clone, Copy)]
struct VarValue {
    variable: VarId,
    value: i64,
    stamp: i64,
}

/// Tabu search. Keeps two rolling lists stamped by a counter advanced at every local optimum and
/// accepted neighbor: the keep list of (variable, value) pairs a neighbor should retain and the
/// forbid list of pairs it should avoid. On every decision the tabu criterion is posted,
/// softened by `tabu_factor` (1.0 requires all pairs respected, 0.0 none) and overridden by the
/// aspiration criterion (a neighbor strictly improving the best solution is always allowed),
/// together with a downhill step from the current objective and a plateau breaker.
pub struct TabuSearch {
    meta: Metaheuristic,
    variables: Vec<VarId>,
    assignment: Assignment,
    last: i64,
    keep_tabu_list: VecDeque<VarValue>,
    keep_tenure: i64,
    forbid_tabu_list: VecDeque<VarValue>,
    forbid_tenure: i64,
    tabu_factor: f64,
    stamp: i64,
}

impl std::fmt::Debug for TabuSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TabuSearch")
            .field("stamp", &self.stamp)
            .field("keep", &self.keep_tabu_list.len())
            .field("forbid", &self.forbid_tabu_list.len())
            .finish()
    }
}

impl TabuSearch {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        maximize: bool,
        objective: VarId,
        step: i64,
        variables: &[VarId],
        keep_tenure: i64,
        forbid_tenure: i64,
        tabu_factor: f64,
    ) -> TabuSearch {
        TabuSearch {
            meta: Metaheuristic::new(maximize, objective, step),
            variables: variables.to_vec(),
            assignment: Assignment::with_variables(variables),
            last: i64::MAX,
            keep_tabu_list: VecDeque::new(),
            keep_tenure,
            forbid_tabu_list: VecDeque::new(),
            forbid_tenure,
            tabu_factor,
            stamp: 0,
        }
    }

    fn age_list(tenure: i64, stamp: i64, list: &mut VecDeque<VarValue>) {
        while let Some(back) = list.back() {
            if back.stamp < stamp - tenure {
                let _ = list.pop_back();
            } else {
                break;
            }
        }
    }

    fn age_lists(&mut self) {
        Self::age_list(self.keep_tenure, self.stamp, &mut self.keep_tabu_list);
        Self::age_list(self.forbid_tenure, self.stamp, &mut self.forbid_tabu_list);
        self.stamp += 1;
    }
}

impl SearchMonitor for TabuSearch {
    fn enter_search(&mut self, solver: &mut Solver) {
        self.meta.enter_search(solver);
    }

    fn apply_decision(&mut self, solver: &mut Solver, decision: &Decision) -> SearchStatus {
        if decision.is_balancing() {
            return Ok(());
        }
        let objective = self.meta.objective;

        // Aspiration criterion: a neighbor improving the best solution found so far is accepted
        // regardless of the tabu lists.
        let aspiration = solver.new_bool_var();
        if self.meta.maximize {
            solver.add_is_greater_or_equal_constant(
                objective,
                self.meta.best.saturating_add(self.meta.step),
                aspiration,
            );
        } else {
            solver.add_is_less_or_equal_constant(
                objective,
                self.meta.best.saturating_sub(self.meta.step),
                aspiration,
            );
        }

        // Tabu criterion: a variable in the keep list should keep its value, a variable in the
        // forbid list should not take the listed value. The criterion is softened by the tabu
        // factor which gives the fraction of pairs that must be respected.
        let mut tabu_vars = Vec::new();
        for entry in &self.keep_tabu_list {
            let respected = solver.new_bool_var();
            solver.add_is_equal_constant(entry.variable, entry.value, respected);
            tabu_vars.push(respected);
        }
        for entry in &self.forbid_tabu_list {
            let respected = solver.new_bool_var();
            solver.add_is_different_constant(entry.variable, entry.value, respected);
            tabu_vars.push(respected);
        }
        if !tabu_vars.is_empty() {
            let tabu = solver.new_bool_var();
            let respected_count = solver.make_sum(&tabu_vars);
            let required = (tabu_vars.len() as f64 * self.tabu_factor) as i64;
            solver.add_is_greater_or_equal_constant(respected_count, required, tabu);
            solver.add_sum_greater_or_equal(&[aspiration, tabu], 1);
        }

        // Go downhill to the next local optimum.
        if self.meta.maximize {
            solver.add_greater_or_equal(
                objective,
                self.meta.current.saturating_add(self.meta.step),
            );
        } else {
            solver.add_less_or_equal(
                objective,
                self.meta.current.saturating_sub(self.meta.step),
            );
        }

        // Avoid cost plateaus which lead to tabu cycles.
        solver.add_not_equal(objective, self.last);
        Ok(())
    }

    fn refute_decision(&mut self, solver: &mut Solver, _decision: &Decision) -> SearchStatus {
        self.meta.refute_check(solver)
    }

    fn at_solution(&mut self, solver: &mut Solver) -> bool {
        let value = solver.value(self.meta.objective);
        self.meta.record_solution(value);
        self.last = value;

        // Record the moved variables in the tabu lists; only after the first local optimum.
        if self.stamp != 0 {
            for &variable in &self.variables {
                let old_value = self.assignment.value(variable);
                let new_value = solver.value(variable);
                if old_value != new_value {
                    self.keep_tabu_list.push_front(VarValue {
                        variable,
                        value: new_value,
                        stamp: self.stamp,
                    });
                    self.forbid_tabu_list.push_front(VarValue {
                        variable,
                        value: old_value,
                        stamp: self.stamp,
                    });
                }
            }
        }
        self.assignment.store(solver);
        true
    }

    fn local_optimum(&mut self, _solver: &mut Solver) -> bool {
        self.age_lists();
        self.meta.reset_current_to_worst();
        true
    }

    fn accept_neighbor(&mut self, _solver: &mut Solver) {
        if self.stamp != 0 {
            self.age_lists();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drive_to_solution(
        solver: &mut Solver,
        tabu: &mut TabuSearch,
        variable: VarId,
        value: i64,
    ) {
        solver.push_decision_level();
        solver.set_value(variable, value).unwrap();
        assert!(tabu.at_solution(solver));
        solver.backtrack_to(0);
    }

    #[test]
    fn forbidden_values_fail_and_allowed_values_pass() {
        let mut solver = Solver::default();
        let x = solver.new_bounded_integer(0, 2);
        let mut tabu = TabuSearch::new(false, x, 1, &[x], 2, 2, 0.5);

        tabu.enter_search(&mut solver);
        drive_to_solution(&mut solver, &mut tabu, x, 0);
        assert!(tabu.local_optimum(&mut solver));
        drive_to_solution(&mut solver, &mut tabu, x, 1);
        assert!(tabu.local_optimum(&mut solver));

        // The move from 0 to 1 put (x, 1) on the keep list and (x, 0) on the forbid list.
        assert_eq!(tabu.keep_tabu_list.len(), 1);
        assert_eq!(tabu.forbid_tabu_list.len(), 1);

        // A neighbor taking the forbidden value 0 violates both pairs and fails.
        solver.push_decision_level();
        let decision = Decision::assign(x, 0);
        tabu.apply_decision(&mut solver, &decision).unwrap();
        solver.set_value(x, 0).unwrap();
        assert!(solver.propagate().is_err());
        solver.backtrack_to(0);

        // A neighbor taking 2 respects the forbid pair (half of the list) and passes.
        solver.push_decision_level();
        let decision = Decision::assign(x, 2);
        tabu.apply_decision(&mut solver, &decision).unwrap();
        solver.set_value(x, 2).unwrap();
        assert!(solver.propagate().is_ok());
        solver.backtrack_to(0);
    }

    #[test]
    fn entries_age_out_strictly_past_the_tenure() {
        let mut solver = Solver::default();
        let x = solver.new_bounded_integer(0, 5);
        let mut tabu = TabuSearch::new(false, x, 1, &[x], 1, 1, 1.0);

        tabu.enter_search(&mut solver);
        drive_to_solution(&mut solver, &mut tabu, x, 5);
        assert!(tabu.local_optimum(&mut solver)); // stamp 0 -> 1
        drive_to_solution(&mut solver, &mut tabu, x, 4); // records with stamp 1
        assert_eq!(tabu.forbid_tabu_list.len(), 1);

        // Ageing drops entries with stamp < stamp - tenure, strictly.
        assert!(tabu.local_optimum(&mut solver)); // ages at stamp 1: 1 < 1 - 1 is false
        assert_eq!(tabu.forbid_tabu_list.len(), 1);
        assert!(tabu.local_optimum(&mut solver)); // ages at stamp 2: 1 < 2 - 1 is false
        assert_eq!(tabu.forbid_tabu_list.len(), 1);
        assert!(tabu.local_optimum(&mut solver)); // ages at stamp 3: 1 < 3 - 1 is true
        assert!(tabu.forbid_tabu_list.is_empty());
    }

    #[test]
    fn balancing_decisions_are_ignored() {
        let mut solver = Solver::default();
        let x = solver.new_bounded_integer(0, 2);
        let mut tabu = TabuSearch::new(false, x, 1, &[x], 2, 2, 1.0);
        tabu.enter_search(&mut solver);

        let balancing = solver.balancing_decision();
        tabu.apply_decision(&mut solver, &balancing).unwrap();
        // Nothing was posted; the domain is untouched.
        assert_eq!(solver.upper_bound(x), 2);
        solver.propagate().unwrap();
        assert_eq!(solver.upper_bound(x), 2);
    }
}
