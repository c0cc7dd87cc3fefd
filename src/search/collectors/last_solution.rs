use std::ops::Deref;

use super::SolutionCollector;
use crate::basic_types::Assignment;
use crate::engine::Solver;
use crate::search::SearchMonitor;

/// Keeps a single slot holding the most recent solution; useful when optimizing, where the last
/// solution is the best one.
#[derive(Debug)]
pub struct LastSolutionCollector {
    collector: SolutionCollector,
}

impl LastSolutionCollector {
    pub fn new(prototype: Assignment) -> LastSolutionCollector {
        LastSolutionCollector {
            collector: SolutionCollector::new(Some(prototype)),
        }
    }

    pub fn without_prototype() -> LastSolutionCollector {
        LastSolutionCollector {
            collector: SolutionCollector::new(None),
        }
    }
}

impl Deref for LastSolutionCollector {
    type Target = SolutionCollector;

    fn deref(&self) -> &SolutionCollector {
        &self.collector
    }
}

impl SearchMonitor for LastSolutionCollector {
    fn enter_search(&mut self, _solver: &mut Solver) {
        self.collector.clear();
    }

    fn at_solution(&mut self, solver: &mut Solver) -> bool {
        self.collector.pop_solution();
        self.collector.push_solution(solver);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_most_recent_solution_is_kept() {
        let mut solver = Solver::default();
        let x = solver.new_bounded_integer(0, 5);
        let mut collector = LastSolutionCollector::new(Assignment::with_variables(&[x]));

        collector.enter_search(&mut solver);
        solver.push_decision_level();
        solver.set_value(x, 2).unwrap();
        assert!(collector.at_solution(&mut solver));

        solver.backtrack_to(0);
        solver.set_value(x, 3).unwrap();
        let _ = collector.at_solution(&mut solver);

        assert_eq!(collector.solution_count(), 1);
        assert_eq!(collector.value(0, x), 3);
    }
}
