use super::Element;
use crate::branching::phase::VariableAssignmentSelector;
use crate::engine::Solver;
use crate::engine::VarId;

/// On every selection, enumerates all (unfixed variable, in-domain value) pairs and returns the
/// one minimizing the evaluator. Ties are recorded when a tie-breaker is present, which then
/// picks among them; otherwise the first minimum wins.
pub struct DynamicEvaluator {
    variables: Vec<VarId>,
    evaluator: Box<dyn Fn(usize, i64) -> i64>,
    tie_breaker: Option<Box<dyn Fn(usize) -> usize>>,
    first: usize,
    cache: Vec<Element>,
}

impl std::fmt::Debug for DynamicEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicEvaluator").finish()
    }
}

impl DynamicEvaluator {
    pub fn new(
        variables: &[VarId],
        evaluator: Box<dyn Fn(usize, i64) -> i64>,
        tie_breaker: Option<Box<dyn Fn(usize) -> usize>>,
    ) -> DynamicEvaluator {
        DynamicEvaluator {
            variables: variables.to_vec(),
            evaluator,
            tie_breaker,
            first: 0,
            cache: Vec::new(),
        }
    }
}

impl VariableAssignmentSelector for DynamicEvaluator {
    fn select_variable(&mut self, solver: &mut Solver) -> Option<(VarId, usize)> {
        let mut best_evaluation = i64::MAX;
        self.cache.clear();
        for (index, &variable) in self.variables.iter().enumerate() {
            if solver.is_fixed(variable) {
                continue;
            }
            for value in solver.domain_values(variable) {
                let evaluation = (self.evaluator)(index, value);
                if evaluation < best_evaluation {
                    best_evaluation = evaluation;
                    self.cache.clear();
                    self.cache.push(Element { var: index, value });
                } else if evaluation == best_evaluation && self.tie_breaker.is_some() {
                    self.cache.push(Element { var: index, value });
                }
            }
        }
        if self.cache.is_empty() {
            return None;
        }
        self.first = match &self.tie_breaker {
            Some(tie_breaker) if self.cache.len() > 1 => tie_breaker(self.cache.len()),
            _ => 0,
        };
        let selected = self.cache[self.first].var;
        Some((self.variables[selected], selected))
    }

    fn select_value(&mut self, _solver: &mut Solver, _variable: VarId, _id: usize) -> i64 {
        self.cache[self.first].value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimizes_over_all_candidate_assignments() {
        let mut solver = Solver::default();
        let x = solver.new_bounded_integer(0, 2);
        let y = solver.new_bounded_integer(0, 2);

        // Cheapest overall assignment is y = 2.
        let mut selector = DynamicEvaluator::new(
            &[x, y],
            Box::new(|index, value| if index == 1 && value == 2 { -5 } else { value }),
            None,
        );
        assert_eq!(selector.select_variable(&mut solver), Some((y, 1)));
        assert_eq!(selector.select_value(&mut solver, y, 1), 2);
    }

    #[test]
    fn the_tie_breaker_picks_among_equal_candidates() {
        let mut solver = Solver::default();
        let x = solver.new_bounded_integer(0, 1);
        let y = solver.new_bounded_integer(0, 1);

        let mut selector = DynamicEvaluator::new(
            &[x, y],
            Box::new(|_, _| 7),
            Some(Box::new(|count| count - 1)),
        );
        // All four candidates tie; the tie-breaker selects the last one, y = 1.
        assert_eq!(selector.select_variable(&mut solver), Some((y, 1)));
        assert_eq!(selector.select_value(&mut solver, y, 1), 1);
    }

    #[test]
    fn exhausted_when_all_variables_are_fixed() {
        let mut solver = Solver::default();
        let x = solver.new_bounded_integer(1, 1);
        let mut selector = DynamicEvaluator::new(&[x], Box::new(|_, value| value), None);
        assert_eq!(selector.select_variable(&mut solver), None);
    }
}
