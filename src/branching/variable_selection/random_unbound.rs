use log::warn;

use super::VariableSelector;
use crate::engine::Solver;
use crate::engine::VarId;

/// Selects a uniformly random unfixed variable by scanning circularly from a random shift.
#[derive(Debug)]
pub struct RandomUnbound {
    variables: Vec<VarId>,
}

impl RandomUnbound {
    pub fn new(variables: &[VarId]) -> RandomUnbound {
        if variables.is_empty() {
            warn!("The RandomUnbound variable selector was not provided with any variables");
        }
        RandomUnbound {
            variables: variables.to_vec(),
        }
    }
}

impl VariableSelector for RandomUnbound {
    fn select_variable(&mut self, solver: &mut Solver) -> Option<(VarId, usize)> {
        if self.variables.is_empty() {
            return None;
        }
        let shift = solver
            .random()
            .generate_usize_in_range(0..self.variables.len());
        for offset in 0..self.variables.len() {
            let index = (offset + shift) % self.variables.len();
            if !solver.is_fixed(self.variables[index]) {
                return Some((self.variables[index], index));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::TestRandom;
    use crate::engine::SolverOptions;

    #[test]
    fn scans_circularly_from_the_random_shift() {
        let random = TestRandom {
            usizes: vec![2],
            ..Default::default()
        };
        let mut solver =
            Solver::with_options_and_random(SolverOptions::default(), Box::new(random));
        let x = solver.new_bounded_integer(0, 5);
        let y = solver.new_bounded_integer(0, 5);
        let z = solver.new_bounded_integer(0, 5);
        solver.set_value(z, 0).unwrap();

        let mut selector = RandomUnbound::new(&[x, y, z]);
        // Shift 2 starts the scan at the fixed z and wraps to x.
        assert_eq!(selector.select_variable(&mut solver), Some((x, 0)));
    }
}
