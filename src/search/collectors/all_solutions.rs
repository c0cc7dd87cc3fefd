use std::ops::Deref;

use super::SolutionCollector;
use crate::basic_types::Assignment;
use crate::engine::Solver;
use crate::search::SearchMonitor;

/// Captures every accepted solution.
#[derive(Debug)]
pub struct AllSolutionCollector {
    collector: SolutionCollector,
}

impl AllSolutionCollector {
    pub fn new(prototype: Assignment) -> AllSolutionCollector {
        AllSolutionCollector {
            collector: SolutionCollector::new(Some(prototype)),
        }
    }

    pub fn without_prototype() -> AllSolutionCollector {
        AllSolutionCollector {
            collector: SolutionCollector::new(None),
        }
    }
}

impl Deref for AllSolutionCollector {
    type Target = SolutionCollector;

    fn deref(&self) -> &SolutionCollector {
        &self.collector
    }
}

impl SearchMonitor for AllSolutionCollector {
    fn enter_search(&mut self, _solver: &mut Solver) {
        self.collector.clear();
    }

    fn at_solution(&mut self, solver: &mut Solver) -> bool {
        self.collector.push_solution(solver);
        true
    }
}
