use std::ops::Deref;

use super::SolutionCollector;
use crate::basic_types::Assignment;
use crate::engine::Solver;
use crate::search::SearchMonitor;

/// Retains exactly one snapshot: the solution whose objective is the strict extremum of all
/// solutions seen. The comparison reads the objective variable's current upper bound (maximize)
/// or lower bound (minimize) rather than the snapshot value.
#[derive(Debug)]
pub struct BestValueSolutionCollector {
    collector: SolutionCollector,
    maximize: bool,
    best: i64,
}

impl BestValueSolutionCollector {
    pub fn new(prototype: Assignment, maximize: bool) -> BestValueSolutionCollector {
        BestValueSolutionCollector {
            collector: SolutionCollector::new(Some(prototype)),
            maximize,
            best: if maximize { i64::MIN } else { i64::MAX },
        }
    }
}

impl Deref for BestValueSolutionCollector {
    type Target = SolutionCollector;

    fn deref(&self) -> &SolutionCollector {
        &self.collector
    }
}

impl SearchMonitor for BestValueSolutionCollector {
    fn enter_search(&mut self, _solver: &mut Solver) {
        self.collector.clear();
        self.best = if self.maximize { i64::MIN } else { i64::MAX };
    }

    fn at_solution(&mut self, solver: &mut Solver) -> bool {
        if let Some(objective) = self.collector.prototype().and_then(Assignment::objective) {
            if self.maximize && solver.upper_bound(objective) > self.best {
                self.collector.pop_solution();
                self.collector.push_solution(solver);
                self.best = solver.upper_bound(objective);
            } else if !self.maximize && solver.lower_bound(objective) < self.best {
                self.collector.pop_solution();
                self.collector.push_solution(solver);
                self.best = solver.lower_bound(objective);
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_the_strict_extremum_only() {
        let mut solver = Solver::default();
        let x = solver.new_bounded_integer(0, 5);
        let objective = solver.new_bounded_integer(0, 10);

        let mut prototype = Assignment::with_variables(&[x]);
        prototype.add_objective(objective);
        let mut collector = BestValueSolutionCollector::new(prototype, false);

        collector.enter_search(&mut solver);

        solver.push_decision_level();
        solver.set_value(x, 1).unwrap();
        solver.set_value(objective, 7).unwrap();
        assert!(collector.at_solution(&mut solver));
        solver.backtrack_to(0);

        solver.push_decision_level();
        solver.set_value(x, 2).unwrap();
        solver.set_value(objective, 3).unwrap();
        let _ = collector.at_solution(&mut solver);
        solver.backtrack_to(0);

        solver.push_decision_level();
        solver.set_value(x, 4).unwrap();
        solver.set_value(objective, 3).unwrap();
        let _ = collector.at_solution(&mut solver);
        solver.backtrack_to(0);

        assert_eq!(collector.solution_count(), 1);
        assert_eq!(collector.value(0, x), 2);
        assert_eq!(collector.objective_value(0), 3);
    }
}
