use super::VariableSelector;
use crate::engine::Solver;
use crate::engine::TrailedInt;
use crate::engine::VarId;

/// Selects variables along a successor chain, where `variables[i]` holds the index of the
/// successor of `i`. The walk starts from an unfixed variable which no other variable can point
/// to (a good path start) and follows fixed successors; cycles are broken by picking a fresh
/// start. The chain position is reversible.
#[derive(Debug)]
pub struct PathSelector {
    variables: Vec<VarId>,
    first: TrailedInt,
}

impl PathSelector {
    pub fn new(solver: &mut Solver, variables: &[VarId]) -> PathSelector {
        PathSelector {
            variables: variables.to_vec(),
            first: solver.new_trailed_int(i64::MAX),
        }
    }

    /// Picks an unfixed variable to which no other variable can point; if none exists, the first
    /// unfixed one.
    fn find_path_start(&self, solver: &Solver) -> Option<usize> {
        for index in (0..self.variables.len()).rev() {
            if solver.is_fixed(self.variables[index]) {
                continue;
            }
            let has_possible_predecessor = self
                .variables
                .iter()
                .any(|&other| solver.contains(other, index as i64));
            if !has_possible_predecessor {
                return Some(index);
            }
        }
        (0..self.variables.len()).find(|&index| !solver.is_fixed(self.variables[index]))
    }

    fn updated_index(&self, solver: &Solver, index: usize) -> Option<usize> {
        if index >= self.variables.len() {
            self.find_path_start(solver)
        } else {
            Some(index)
        }
    }
}

impl VariableSelector for PathSelector {
    fn select_variable(&mut self, solver: &mut Solver) -> Option<(VarId, usize)> {
        let start = solver.trailed_read(self.first).unsigned_abs() as usize;
        let mut index = self.updated_index(solver, start.min(self.variables.len()))?;
        let mut hops = 0;
        while solver.is_fixed(self.variables[index]) {
            let successor = solver.value(self.variables[index]);
            if successor < 0 {
                return None;
            }
            index = self.updated_index(solver, successor as usize)?;
            hops += 1;
            if hops >= self.variables.len() {
                // Cycle detected; restart from a fresh path start.
                index = self.find_path_start(solver)?;
                if solver.is_fixed(self.variables[index]) {
                    return None;
                }
            }
        }
        solver.trailed_assign(self.first, index as i64);
        Some((self.variables[index], index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follows_the_successor_chain() {
        let mut solver = Solver::default();
        // Three successor variables over indices {0, 1, 2}.
        let variables = vec![
            solver.new_bounded_integer(0, 2),
            solver.new_bounded_integer(0, 2),
            solver.new_bounded_integer(0, 2),
        ];
        let mut selector = PathSelector::new(&mut solver, &variables);

        // 0 -> 1 fixed; the walk continues at 1.
        solver.set_value(variables[0], 1).unwrap();
        let selected = selector.select_variable(&mut solver);
        assert_eq!(selected, Some((variables[1], 1)));
    }

    #[test]
    fn exhausted_when_all_fixed_into_a_cycle() {
        let mut solver = Solver::default();
        let variables = vec![
            solver.new_bounded_integer(0, 2),
            solver.new_bounded_integer(0, 2),
            solver.new_bounded_integer(0, 2),
        ];
        let mut selector = PathSelector::new(&mut solver, &variables);

        solver.set_value(variables[0], 1).unwrap();
        solver.set_value(variables[1], 2).unwrap();
        solver.set_value(variables[2], 0).unwrap();
        assert_eq!(selector.select_variable(&mut solver), None);
    }
}
