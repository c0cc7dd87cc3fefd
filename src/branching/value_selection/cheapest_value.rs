use super::ValueSelector;
use crate::engine::Solver;
use crate::engine::VarId;
use crate::gourd_assert_moderate;

/// Selects an in-domain value minimizing a user-supplied cost over (variable id, value). All
/// values achieving the minimum are collected; the optional tie-breaker picks among them by
/// index, otherwise the last one found is returned. The callbacks must be repeatable.
pub struct CheapestValue {
    evaluator: Box<dyn Fn(usize, i64) -> i64>,
    tie_breaker: Option<Box<dyn Fn(usize) -> usize>>,
    cache: Vec<i64>,
}

impl std::fmt::Debug for CheapestValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheapestValue").finish()
    }
}

impl CheapestValue {
    pub fn new(evaluator: Box<dyn Fn(usize, i64) -> i64>) -> CheapestValue {
        CheapestValue {
            evaluator,
            tie_breaker: None,
            cache: Vec::new(),
        }
    }

    pub fn with_tie_breaker(
        evaluator: Box<dyn Fn(usize, i64) -> i64>,
        tie_breaker: Box<dyn Fn(usize) -> usize>,
    ) -> CheapestValue {
        CheapestValue {
            evaluator,
            tie_breaker: Some(tie_breaker),
            cache: Vec::new(),
        }
    }
}

impl ValueSelector for CheapestValue {
    fn select_value(&mut self, solver: &mut Solver, variable: VarId, id: usize) -> i64 {
        self.cache.clear();
        let mut best = i64::MAX;
        for value in solver.domain_values(variable) {
            let evaluation = (self.evaluator)(id, value);
            if evaluation < best {
                best = evaluation;
                self.cache.clear();
                self.cache.push(value);
            } else if evaluation == best {
                self.cache.push(value);
            }
        }
        gourd_assert_moderate!(!self.cache.is_empty());
        match &self.tie_breaker {
            Some(tie_breaker) if self.cache.len() > 1 => self.cache[tie_breaker(self.cache.len())],
            _ => *self.cache.last().expect("non-empty domain"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimizes_the_evaluation() {
        let mut solver = Solver::default();
        let variable = solver.new_bounded_integer(0, 5);
        let mut selector = CheapestValue::new(Box::new(|_, value| (value - 3).abs()));
        assert_eq!(selector.select_value(&mut solver, variable, 0), 3);
    }

    #[test]
    fn without_tie_breaker_the_last_tie_wins() {
        let mut solver = Solver::default();
        let variable = solver.new_bounded_integer(0, 5);
        let mut selector = CheapestValue::new(Box::new(|_, value| value % 2));
        // 0, 2 and 4 all evaluate to 0; the last one found is returned.
        assert_eq!(selector.select_value(&mut solver, variable, 0), 4);
    }

    #[test]
    fn the_tie_breaker_picks_among_the_ties() {
        let mut solver = Solver::default();
        let variable = solver.new_bounded_integer(0, 5);
        let mut selector = CheapestValue::with_tie_breaker(
            Box::new(|_, value| value % 2),
            Box::new(|_count| 0),
        );
        assert_eq!(selector.select_value(&mut solver, variable, 0), 0);
    }
}
