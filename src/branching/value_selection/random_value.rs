use super::ValueSelector;
use crate::engine::Solver;
use crate::engine::VarId;

/// Selects a uniformly random in-domain value. Dense domains are rejection-sampled within
/// `[min, max]`; sparse domains are counted into, enumerating from whichever end is closer to
/// the drawn rank.
#[derive(Debug, Copy, Clone)]
pub struct RandomValue;

impl ValueSelector for RandomValue {
    fn select_value(&mut self, solver: &mut Solver, variable: VarId, _id: usize) -> i64 {
        let lower_bound = solver.lower_bound(variable);
        let upper_bound = solver.upper_bound(variable);
        let span = upper_bound - lower_bound + 1;
        let size = solver.size(variable);
        if size > span / 4 {
            // Dense enough to find an in-domain value by sampling.
            loop {
                let value = lower_bound + solver.random().generate_i64_in_range(0..span);
                if solver.contains(variable, value) {
                    return value;
                }
            }
        }
        // Sparse: draw a rank and count to it from the closer end.
        let mut rank = solver.random().generate_i64_in_range(0..size);
        if rank <= size / 2 {
            for value in solver.domain_values(variable) {
                if rank == 0 {
                    return value;
                }
                rank -= 1;
            }
        } else {
            let mut remaining = size - 1 - rank;
            for value in solver.domain_values(variable).into_iter().rev() {
                if remaining == 0 {
                    return value;
                }
                remaining -= 1;
            }
        }
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::TestRandom;
    use crate::engine::SolverOptions;

    #[test]
    fn dense_domain_is_rejection_sampled() {
        let random = TestRandom {
            i64s: vec![3],
            ..Default::default()
        };
        let mut solver =
            Solver::with_options_and_random(SolverOptions::default(), Box::new(random));
        let variable = solver.new_bounded_integer(10, 19);

        let mut selector = RandomValue;
        assert_eq!(selector.select_value(&mut solver, variable, 0), 13);
    }

    #[test]
    fn sparse_domain_counts_from_the_closer_end() {
        let random = TestRandom {
            i64s: vec![2],
            ..Default::default()
        };
        let mut solver =
            Solver::with_options_and_random(SolverOptions::default(), Box::new(random));
        let variable = solver.new_bounded_integer(0, 30);
        for value in 0..=30 {
            if value % 10 != 0 {
                solver.remove_value(variable, value).unwrap();
            }
        }
        // Remaining domain {0, 10, 20, 30}; rank 2 counts to 20.
        let mut selector = RandomValue;
        assert_eq!(selector.select_value(&mut solver, variable, 0), 20);
    }
}
