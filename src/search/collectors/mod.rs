//! Solution collectors: monitors which snapshot solutions together with the wall time, branch
//! count, failure count, and objective value at which they were found.

mod all_solutions;
mod best_value;
mod first_solution;
mod last_solution;

pub use all_solutions::AllSolutionCollector;
pub use best_value::BestValueSolutionCollector;
pub use first_solution::FirstSolutionCollector;
pub use last_solution::LastSolutionCollector;

use crate::basic_types::Assignment;
use crate::engine::Solver;
use crate::engine::VarId;

/// The shared storage of the collectors: parallel sequences of snapshots and per-solution
/// metadata, always of equal length, plus a recycle list which avoids re-allocating snapshots
/// when a collector replaces solutions.
#[derive(Debug, Default)]
pub struct SolutionCollector {
    prototype: Option<Assignment>,
    solutions: Vec<Option<Assignment>>,
    recycle_solutions: Vec<Assignment>,
    times: Vec<i64>,
    branches: Vec<i64>,
    failures: Vec<i64>,
    objective_values: Vec<i64>,
}

impl SolutionCollector {
    pub(crate) fn new(prototype: Option<Assignment>) -> SolutionCollector {
        SolutionCollector {
            prototype,
            ..SolutionCollector::default()
        }
    }

    pub(crate) fn clear(&mut self) {
        self.solutions.clear();
        self.recycle_solutions.clear();
        self.times.clear();
        self.branches.clear();
        self.failures.clear();
        self.objective_values.clear();
    }

    /// Snapshots the current solution. The snapshot object is taken from the recycle list when
    /// possible.
    pub(crate) fn push_solution(&mut self, solver: &Solver) {
        let snapshot = self.prototype.as_ref().map(|prototype| {
            let mut snapshot = self
                .recycle_solutions
                .pop()
                .unwrap_or_else(|| prototype.clone());
            snapshot.store(solver);
            snapshot
        });
        self.times.push(solver.wall_time_ms());
        self.branches.push(solver.branches());
        self.failures.push(solver.failures());
        self.objective_values
            .push(snapshot.as_ref().map_or(0, Assignment::objective_value));
        self.solutions.push(snapshot);
    }

    /// Removes the most recent solution, returning its snapshot to the recycle list.
    pub(crate) fn pop_solution(&mut self) {
        if let Some(popped) = self.solutions.pop() {
            if let Some(snapshot) = popped {
                self.recycle_solutions.push(snapshot);
            }
            let _ = self.times.pop();
            let _ = self.branches.pop();
            let _ = self.failures.pop();
            let _ = self.objective_values.pop();
        }
    }

    pub(crate) fn prototype(&self) -> Option<&Assignment> {
        self.prototype.as_ref()
    }

    fn check_index(&self, n: usize) {
        assert!(
            n < self.solutions.len(),
            "wrong index {n} in solution getter ({} solutions)",
            self.solutions.len()
        );
    }

    pub fn solution_count(&self) -> usize {
        self.solutions.len()
    }

    /// The n-th collected snapshot; `None` when the collector was built without a prototype.
    pub fn solution(&self, n: usize) -> Option<&Assignment> {
        self.check_index(n);
        self.solutions[n].as_ref()
    }

    /// The wall time (in ms since the solver was created) at which the n-th solution was found.
    pub fn wall_time(&self, n: usize) -> i64 {
        self.check_index(n);
        self.times[n]
    }

    pub fn branches(&self, n: usize) -> i64 {
        self.check_index(n);
        self.branches[n]
    }

    pub fn failures(&self, n: usize) -> i64 {
        self.check_index(n);
        self.failures[n]
    }

    pub fn objective_value(&self, n: usize) -> i64 {
        self.check_index(n);
        self.objective_values[n]
    }

    /// The recorded value of `variable` in the n-th solution.
    pub fn value(&self, n: usize, variable: VarId) -> i64 {
        self.check_index(n);
        self.solutions[n]
            .as_ref()
            .expect("the collector was built without a prototype")
            .value(variable)
    }
}

#[cfg(test)]
mod tests {
    use super::SolutionCollector;
    use crate::basic_types::Assignment;
    use crate::engine::Solver;

    #[test]
    fn sequences_share_length() {
        let mut solver = Solver::default();
        let x = solver.new_bounded_integer(0, 5);
        let mut collector = SolutionCollector::new(Some(Assignment::with_variables(&[x])));

        solver.set_value(x, 1).unwrap();
        collector.push_solution(&solver);
        collector.push_solution(&solver);
        collector.pop_solution();

        assert_eq!(collector.solution_count(), 1);
        assert_eq!(collector.value(0, x), 1);
        assert_eq!(collector.branches(0), 0);
    }

    #[test]
    fn popped_snapshots_are_recycled() {
        let mut solver = Solver::default();
        let x = solver.new_bounded_integer(0, 5);
        let mut collector = SolutionCollector::new(Some(Assignment::with_variables(&[x])));

        collector.push_solution(&solver);
        collector.pop_solution();
        assert_eq!(collector.recycle_solutions.len(), 1);

        collector.push_solution(&solver);
        assert!(collector.recycle_solutions.is_empty());
    }

    #[test]
    #[should_panic(expected = "wrong index")]
    fn out_of_range_accessors_identify_themselves() {
        let collector = SolutionCollector::new(None);
        let _ = collector.wall_time(0);
    }
}
