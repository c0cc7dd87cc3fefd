use super::Element;
use crate::branching::phase::VariableAssignmentSelector;
use crate::engine::Solver;
use crate::engine::TrailedInt;
use crate::engine::VarId;

/// On the first selection, enumerates and sorts all (variable, value) candidates of the
/// initially unfixed variables by their evaluation. Subsequent selections resume from a
/// reversible cursor and return the first candidate whose variable is still unfixed and whose
/// value is still in the domain.
pub struct StaticEvaluator {
    variables: Vec<VarId>,
    evaluator: Box<dyn Fn(usize, i64) -> i64>,
    elements: Vec<Element>,
    first: TrailedInt,
}

impl std::fmt::Debug for StaticEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticEvaluator").finish()
    }
}

impl StaticEvaluator {
    pub fn new(
        solver: &mut Solver,
        variables: &[VarId],
        evaluator: Box<dyn Fn(usize, i64) -> i64>,
    ) -> StaticEvaluator {
        StaticEvaluator {
            variables: variables.to_vec(),
            evaluator,
            elements: Vec::new(),
            first: solver.new_trailed_int(-1),
        }
    }
}

impl VariableAssignmentSelector for StaticEvaluator {
    fn select_variable(&mut self, solver: &mut Solver) -> Option<(VarId, usize)> {
        if solver.trailed_read(self.first) == -1 {
            // First call: enumerate and sort the candidate assignments.
            self.elements.clear();
            for (index, &variable) in self.variables.iter().enumerate() {
                if solver.is_fixed(variable) {
                    continue;
                }
                for value in solver.domain_values(variable) {
                    self.elements.push(Element { var: index, value });
                }
            }
            let evaluator = &self.evaluator;
            self.elements
                .sort_by_key(|element| (evaluator(element.var, element.value), element.var));
            solver.trailed_assign(self.first, 0);
        }
        let first = solver.trailed_read(self.first) as usize;
        for position in first..self.elements.len() {
            let element = self.elements[position];
            let variable = self.variables[element.var];
            if !solver.is_fixed(variable) && solver.contains(variable, element.value) {
                solver.trailed_assign(self.first, position as i64);
                return Some((variable, element.var));
            }
        }
        solver.trailed_assign(self.first, self.elements.len() as i64);
        None
    }

    fn select_value(&mut self, solver: &mut Solver, _variable: VarId, _id: usize) -> i64 {
        let first = solver.trailed_read(self.first) as usize;
        self.elements[first].value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::branching::phase::VariableAssignmentSelector;

    #[test]
    fn candidates_are_visited_in_evaluation_order() {
        let mut solver = Solver::default();
        let x = solver.new_bounded_integer(0, 1);
        let y = solver.new_bounded_integer(0, 1);

        let mut selector =
            StaticEvaluator::new(&mut solver, &[x, y], Box::new(|_, value| -value));

        // The cheapest candidate is a value of 1; variable order breaks the tie.
        assert_eq!(selector.select_variable(&mut solver), Some((x, 0)));
        assert_eq!(selector.select_value(&mut solver, x, 0), 1);
    }

    #[test]
    fn stale_candidates_are_skipped() {
        let mut solver = Solver::default();
        let x = solver.new_bounded_integer(0, 2);
        let y = solver.new_bounded_integer(0, 2);

        let mut selector =
            StaticEvaluator::new(&mut solver, &[x, y], Box::new(|_, value| -value));
        let _ = selector.select_variable(&mut solver);

        solver.set_value(x, 0).unwrap();
        solver.remove_value(y, 2).unwrap();
        // x is fixed and y can no longer take 2; the best live candidate is y = 1.
        assert_eq!(selector.select_variable(&mut solver), Some((y, 1)));
        assert_eq!(selector.select_value(&mut solver, y, 1), 1);
    }

    #[test]
    fn the_cursor_is_reversible() {
        let mut solver = Solver::default();
        let x = solver.new_bounded_integer(0, 1);
        let y = solver.new_bounded_integer(0, 1);

        let mut selector =
            StaticEvaluator::new(&mut solver, &[x, y], Box::new(|_, value| -value));
        let _ = selector.select_variable(&mut solver);

        solver.push_decision_level();
        solver.set_value(x, 1).unwrap();
        solver.set_value(y, 1).unwrap();
        assert_eq!(selector.select_variable(&mut solver), None);

        solver.backtrack_to(0);
        assert_eq!(selector.select_variable(&mut solver), Some((x, 0)));
    }
}
