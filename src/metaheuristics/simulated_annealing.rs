use rand::rngs::SmallRng;
use rand::SeedableRng;

use super::Metaheuristic;
use crate::basic_types::Random;
use crate::branching::Decision;
use crate::engine::SearchStatus;
use crate::engine::Solver;
use crate::engine::VarId;
use crate::search::SearchMonitor;

const ANNEALING_RANDOM_SEED: u64 = 654;

/// Simulated annealing over a Cauchy cooling schedule: the temperature at iteration k is
/// `initial_temperature / k`. On every decision an energy slack of `T * ln(U(0, 1])` (always
/// non-positive) is added to the downhill bound, so worse neighbors are accepted with a
/// probability which shrinks as the search cools down.
pub struct SimulatedAnnealing {
    meta: Metaheuristic,
    temperature0: i64,
    iteration: i64,
    random: Box<dyn Random>,
}

impl std::fmt::Debug for SimulatedAnnealing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedAnnealing")
            .field("temperature0", &self.temperature0)
            .field("iteration", &self.iteration)
            .finish()
    }
}

impl SimulatedAnnealing {
    pub fn new(
        maximize: bool,
        objective: VarId,
        step: i64,
        initial_temperature: i64,
    ) -> SimulatedAnnealing {
        SimulatedAnnealing::with_random(
            maximize,
            objective,
            step,
            initial_temperature,
            Box::new(SmallRng::seed_from_u64(ANNEALING_RANDOM_SEED)),
        )
    }

    pub fn with_random(
        maximize: bool,
        objective: VarId,
        step: i64,
        initial_temperature: i64,
        random: Box<dyn Random>,
    ) -> SimulatedAnnealing {
        SimulatedAnnealing {
            meta: Metaheuristic::new(maximize, objective, step),
            temperature0: initial_temperature,
            iteration: 0,
            random,
        }
    }

    fn temperature(&self) -> f64 {
        if self.iteration > 0 {
            self.temperature0 as f64 / self.iteration as f64
        } else {
            0.0
        }
    }
}

impl SearchMonitor for SimulatedAnnealing {
    fn enter_search(&mut self, solver: &mut Solver) {
        self.meta.enter_search(solver);
    }

    fn apply_decision(&mut self, solver: &mut Solver, decision: &Decision) -> SearchStatus {
        if decision.is_balancing() {
            return Ok(());
        }
        let energy_bound =
            (self.temperature() * self.random.generate_positive_unit_f64().ln()) as i64;
        let objective = self.meta.objective;
        if self.meta.maximize {
            let bound = if self.meta.current > i64::MIN {
                self.meta
                    .current
                    .saturating_add(self.meta.step)
                    .saturating_add(energy_bound)
            } else {
                self.meta.current
            };
            solver.add_greater_or_equal(objective, bound);
        } else {
            let bound = if self.meta.current < i64::MAX {
                self.meta
                    .current
                    .saturating_sub(self.meta.step)
                    .saturating_sub(energy_bound)
            } else {
                self.meta.current
            };
            solver.add_less_or_equal(objective, bound);
        }
        Ok(())
    }

    fn refute_decision(&mut self, solver: &mut Solver, _decision: &Decision) -> SearchStatus {
        self.meta.refute_check(solver)
    }

    fn at_solution(&mut self, solver: &mut Solver) -> bool {
        let value = solver.value(self.meta.objective);
        self.meta.record_solution(value);
        true
    }

    fn local_optimum(&mut self, _solver: &mut Solver) -> bool {
        self.meta.reset_current_to_worst();
        self.iteration += 1;
        self.temperature() > 0.0
    }

    fn accept_neighbor(&mut self, _solver: &mut Solver) {
        if self.iteration > 0 {
            self.iteration += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::TestRandom;

    #[test]
    fn the_energy_bound_relaxes_the_downhill_constraint() {
        let random = TestRandom {
            f64s: vec![(-2.0f64).exp()],
            ..Default::default()
        };
        let mut solver = Solver::default();
        let objective = solver.new_bounded_integer(0, 100);
        let mut annealing =
            SimulatedAnnealing::with_random(false, objective, 1, 10, Box::new(random));

        annealing.enter_search(&mut solver);
        solver.push_decision_level();
        solver.set_value(objective, 50).unwrap();
        assert!(annealing.at_solution(&mut solver));
        solver.backtrack_to(0);

        // First local optimum: iteration 1, temperature 10.
        assert!(annealing.local_optimum(&mut solver));

        // A fresh incumbent keeps the iteration but makes the downhill bound finite again.
        solver.push_decision_level();
        solver.set_value(objective, 50).unwrap();
        let _ = annealing.at_solution(&mut solver);
        solver.backtrack_to(0);

        // energy = T * ln(u) = 10 * ln(exp(-2)) = -20; bound = 50 - 1 - (-20) = 69.
        let decision = Decision::assign(objective, 0);
        annealing.apply_decision(&mut solver, &decision).unwrap();
        solver.propagate().unwrap();
        assert_eq!(solver.upper_bound(objective), 69);
    }

    #[test]
    fn cooling_stops_the_search_when_the_temperature_reaches_zero() {
        let mut solver = Solver::default();
        let objective = solver.new_bounded_integer(0, 10);
        let mut annealing = SimulatedAnnealing::new(false, objective, 1, 5);
        annealing.enter_search(&mut solver);

        // The temperature is T0 / iteration; it stays positive while T0 does.
        assert!(annealing.local_optimum(&mut solver));

        let mut frozen = SimulatedAnnealing::new(false, objective, 1, 0);
        frozen.enter_search(&mut solver);
        assert!(!frozen.local_optimum(&mut solver));
    }

    #[test]
    fn neighbors_advance_the_iteration_only_after_the_first_optimum() {
        let mut solver = Solver::default();
        let objective = solver.new_bounded_integer(0, 10);
        let mut annealing = SimulatedAnnealing::new(false, objective, 1, 100);
        annealing.enter_search(&mut solver);

        annealing.accept_neighbor(&mut solver);
        assert_eq!(annealing.iteration, 0);

        let _ = annealing.local_optimum(&mut solver);
        annealing.accept_neighbor(&mut solver);
        assert_eq!(annealing.iteration, 2);
    }
}
