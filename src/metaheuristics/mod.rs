//! Metaheuristics: monitors which reshape the feasible region after every solution or local
//! optimum to drive a local-search process out of plateaus.

mod simulated_annealing;
mod tabu_search;

pub mod guided_local_search;

pub use guided_local_search::GuidedLocalSearch;
pub use simulated_annealing::SimulatedAnnealing;
pub use tabu_search::TabuSearch;

use crate::engine::Failure;
use crate::engine::SearchStatus;
use crate::engine::Solver;
use crate::engine::VarId;

/// The state shared by all metaheuristics: the objective variable, the improvement step, the
/// objective of the last solution (`current`), and the best objective seen (`best`).
#[derive(Debug, Clone, Copy)]
pub(crate) struct Metaheuristic {
    pub(crate) objective: VarId,
    pub(crate) step: i64,
    pub(crate) current: i64,
    pub(crate) best: i64,
    pub(crate) maximize: bool,
}

impl Metaheuristic {
    pub(crate) fn new(maximize: bool, objective: VarId, step: i64) -> Metaheuristic {
        Metaheuristic {
            objective,
            step,
            current: i64::MAX,
            best: i64::MAX,
            maximize,
        }
    }

    /// On entering a search the incumbent is reset to the worst the objective can reach, so the
    /// first solution always improves on it.
    pub(crate) fn enter_search(&mut self, solver: &Solver) {
        self.best = if self.maximize {
            solver.lower_bound(self.objective)
        } else {
            solver.upper_bound(self.objective)
        };
        self.current = self.best;
    }

    /// Fails the branch when the objective can no longer beat `best` by `step`.
    pub(crate) fn refute_check(&self, solver: &Solver) -> SearchStatus {
        if self.maximize {
            if solver.upper_bound(self.objective) < self.best.saturating_add(self.step) {
                return Err(Failure);
            }
        } else if solver.lower_bound(self.objective) > self.best.saturating_sub(self.step) {
            return Err(Failure);
        }
        Ok(())
    }

    pub(crate) fn reset_current_to_worst(&mut self) {
        self.current = if self.maximize { i64::MIN } else { i64::MAX };
    }

    /// Records a solution value into `best` and `current`.
    pub(crate) fn record_solution(&mut self, value: i64) {
        self.best = if self.maximize {
            value.max(self.best)
        } else {
            value.min(self.best)
        };
        self.current = value;
    }
}
