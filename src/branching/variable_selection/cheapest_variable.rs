use super::VariableSelector;
use crate::engine::Solver;
use crate::engine::VarId;

/// Selects the unfixed variable minimizing a user-supplied cost over the variable index. The
/// evaluator may be invoked repeatedly for the same index and must be repeatable.
pub struct CheapestVariable {
    variables: Vec<VarId>,
    evaluator: Box<dyn Fn(usize) -> i64>,
}

impl std::fmt::Debug for CheapestVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheapestVariable").finish()
    }
}

impl CheapestVariable {
    pub fn new(variables: &[VarId], evaluator: Box<dyn Fn(usize) -> i64>) -> CheapestVariable {
        CheapestVariable {
            variables: variables.to_vec(),
            evaluator,
        }
    }
}

impl VariableSelector for CheapestVariable {
    fn select_variable(&mut self, solver: &mut Solver) -> Option<(VarId, usize)> {
        let mut best: Option<(VarId, usize)> = None;
        let mut best_evaluation = i64::MAX;
        for (index, &variable) in self.variables.iter().enumerate() {
            if solver.is_fixed(variable) {
                continue;
            }
            let evaluation = (self.evaluator)(index);
            if evaluation < best_evaluation {
                best_evaluation = evaluation;
                best = Some((variable, index));
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_the_cheapest_unfixed_variable() {
        let mut solver = Solver::default();
        let variables = vec![
            solver.new_bounded_integer(0, 5),
            solver.new_bounded_integer(0, 5),
            solver.new_bounded_integer(0, 5),
        ];
        let costs = [7, 3, 5];
        let mut selector =
            CheapestVariable::new(&variables, Box::new(move |index| costs[index]));
        assert_eq!(
            selector.select_variable(&mut solver),
            Some((variables[1], 1))
        );

        solver.set_value(variables[1], 0).unwrap();
        assert_eq!(
            selector.select_variable(&mut solver),
            Some((variables[2], 2))
        );
    }
}
