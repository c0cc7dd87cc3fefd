use log::warn;

use super::VariableSelector;
use crate::engine::Solver;
use crate::engine::TrailedInt;
use crate::engine::VarId;

/// Selects the first unfixed variable in the array order. The cursor is reversible: once a prefix
/// is fixed the scan resumes past it on re-entry from the same node, while backtracking restores
/// the earlier cursor.
#[derive(Debug)]
pub struct FirstUnbound {
    variables: Vec<VarId>,
    first: TrailedInt,
}

impl FirstUnbound {
    pub fn new(solver: &mut Solver, variables: &[VarId]) -> FirstUnbound {
        if variables.is_empty() {
            warn!("The FirstUnbound variable selector was not provided with any variables");
        }
        FirstUnbound {
            variables: variables.to_vec(),
            first: solver.new_trailed_int(0),
        }
    }
}

impl VariableSelector for FirstUnbound {
    fn select_variable(&mut self, solver: &mut Solver) -> Option<(VarId, usize)> {
        let first = solver.trailed_read(self.first) as usize;
        for index in first..self.variables.len() {
            if !solver.is_fixed(self.variables[index]) {
                solver.trailed_assign(self.first, index as i64);
                return Some((self.variables[index], index));
            }
        }
        solver.trailed_assign(self.first, self.variables.len() as i64);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_the_first_unfixed_variable() {
        let mut solver = Solver::default();
        let x = solver.new_bounded_integer(0, 5);
        let y = solver.new_bounded_integer(0, 5);
        let mut selector = FirstUnbound::new(&mut solver, &[x, y]);

        assert_eq!(selector.select_variable(&mut solver), Some((x, 0)));

        solver.set_value(x, 0).unwrap();
        assert_eq!(selector.select_variable(&mut solver), Some((y, 1)));
    }

    #[test]
    fn cursor_is_restored_on_backtracking() {
        let mut solver = Solver::default();
        let x = solver.new_bounded_integer(0, 5);
        let y = solver.new_bounded_integer(0, 5);
        let mut selector = FirstUnbound::new(&mut solver, &[x, y]);

        solver.push_decision_level();
        solver.set_value(x, 0).unwrap();
        assert_eq!(selector.select_variable(&mut solver), Some((y, 1)));

        solver.backtrack_to(0);
        assert_eq!(selector.select_variable(&mut solver), Some((x, 0)));
    }

    #[test]
    fn returns_none_when_everything_is_fixed() {
        let mut solver = Solver::default();
        let x = solver.new_bounded_integer(1, 1);
        let mut selector = FirstUnbound::new(&mut solver, &[x]);
        assert_eq!(selector.select_variable(&mut solver), None);
    }
}
