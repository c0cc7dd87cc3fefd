use std::ops::Deref;

use super::SolutionCollector;
use crate::basic_types::Assignment;
use crate::engine::Solver;
use crate::search::SearchMonitor;

/// Captures the first solution of the search; later solutions are ignored.
#[derive(Debug)]
pub struct FirstSolutionCollector {
    collector: SolutionCollector,
    done: bool,
}

impl FirstSolutionCollector {
    pub fn new(prototype: Assignment) -> FirstSolutionCollector {
        FirstSolutionCollector {
            collector: SolutionCollector::new(Some(prototype)),
            done: false,
        }
    }

    /// A collector which only counts; no snapshots are taken.
    pub fn without_prototype() -> FirstSolutionCollector {
        FirstSolutionCollector {
            collector: SolutionCollector::new(None),
            done: false,
        }
    }
}

impl Deref for FirstSolutionCollector {
    type Target = SolutionCollector;

    fn deref(&self) -> &SolutionCollector {
        &self.collector
    }
}

impl SearchMonitor for FirstSolutionCollector {
    fn enter_search(&mut self, _solver: &mut Solver) {
        self.collector.clear();
        self.done = false;
    }

    fn at_solution(&mut self, solver: &mut Solver) -> bool {
        if !self.done {
            self.collector.push_solution(solver);
            self.done = true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_first_solution_is_kept() {
        let mut solver = Solver::default();
        let x = solver.new_bounded_integer(0, 5);
        let mut collector = FirstSolutionCollector::new(Assignment::with_variables(&[x]));

        collector.enter_search(&mut solver);
        solver.push_decision_level();
        solver.set_value(x, 2).unwrap();
        assert!(!collector.at_solution(&mut solver));

        solver.backtrack_to(0);
        solver.set_value(x, 3).unwrap();
        let _ = collector.at_solution(&mut solver);

        assert_eq!(collector.solution_count(), 1);
        assert_eq!(collector.value(0, x), 2);
    }
}
