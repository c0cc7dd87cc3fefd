use super::evaluator_selection::DynamicEvaluator;
use super::evaluator_selection::StaticEvaluator;
use super::value_selection::CenterValue;
use super::value_selection::CheapestValue;
use super::value_selection::MaxValue;
use super::value_selection::MinValue;
use super::value_selection::RandomValue;
use super::value_selection::ValueSelector;
use super::variable_selection::CheapestVariable;
use super::variable_selection::FirstUnbound;
use super::variable_selection::MinSize;
use super::variable_selection::PathSelector;
use super::variable_selection::RandomUnbound;
use super::variable_selection::VariableSelector;
use super::Decision;
use super::DecisionBuilder;
use crate::engine::Failure;
use crate::engine::Solver;
use crate::engine::VarId;

/// The variable selection strategies available to [`Phase::new`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum IntVarStrategy {
    ChooseFirstUnbound,
    ChooseRandom,
    ChooseMinSizeLowestMin,
    ChooseMinSizeHighestMin,
    ChooseMinSizeLowestMax,
    ChooseMinSizeHighestMax,
    ChoosePath,
}

/// The value selection strategies available to [`Phase::new`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum IntValueStrategy {
    AssignMinValue,
    AssignMaxValue,
    AssignRandomValue,
    AssignCenterValue,
}

/// The strategies for evaluator-based joint selection of variable and value.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EvaluatorStrategy {
    ChooseStaticGlobalBest,
    ChooseDynamicGlobalBest,
}

/// Combined selection of the next variable and its value; implemented either by a pair of
/// independent selectors or by a global evaluator-based selector which picks both jointly.
pub trait VariableAssignmentSelector: std::fmt::Debug {
    fn select_variable(&mut self, solver: &mut Solver) -> Option<(VarId, usize)>;
    fn select_value(&mut self, solver: &mut Solver, variable: VarId, id: usize) -> i64;
}

#[derive(Debug)]
struct SelectorPair {
    variable_selector: Box<dyn VariableSelector>,
    value_selector: Box<dyn ValueSelector>,
}

impl VariableAssignmentSelector for SelectorPair {
    fn select_variable(&mut self, solver: &mut Solver) -> Option<(VarId, usize)> {
        self.variable_selector.select_variable(solver)
    }

    fn select_value(&mut self, solver: &mut Solver, variable: VarId, id: usize) -> i64 {
        self.value_selector.select_value(solver, variable, id)
    }
}

/// The base assigning decision builder: emits one "assign variable to value" decision per call
/// until the variable selection is exhausted.
pub struct Phase {
    selector: Box<dyn VariableAssignmentSelector>,
}

impl std::fmt::Debug for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Phase").field("selector", &self.selector).finish()
    }
}

fn make_variable_selector(
    solver: &mut Solver,
    variables: &[VarId],
    strategy: IntVarStrategy,
) -> Box<dyn VariableSelector> {
    match strategy {
        IntVarStrategy::ChooseFirstUnbound => Box::new(FirstUnbound::new(solver, variables)),
        IntVarStrategy::ChooseRandom => Box::new(RandomUnbound::new(variables)),
        IntVarStrategy::ChooseMinSizeLowestMin => Box::new(MinSize::lowest_min(variables)),
        IntVarStrategy::ChooseMinSizeHighestMin => Box::new(MinSize::highest_min(variables)),
        IntVarStrategy::ChooseMinSizeLowestMax => Box::new(MinSize::lowest_max(variables)),
        IntVarStrategy::ChooseMinSizeHighestMax => Box::new(MinSize::highest_max(variables)),
        IntVarStrategy::ChoosePath => Box::new(PathSelector::new(solver, variables)),
    }
}

fn make_value_selector(strategy: IntValueStrategy) -> Box<dyn ValueSelector> {
    match strategy {
        IntValueStrategy::AssignMinValue => Box::new(MinValue),
        IntValueStrategy::AssignMaxValue => Box::new(MaxValue),
        IntValueStrategy::AssignRandomValue => Box::new(RandomValue),
        IntValueStrategy::AssignCenterValue => Box::new(CenterValue),
    }
}

impl Phase {
    /// A phase over `variables` using the named variable and value strategies.
    pub fn new(
        solver: &mut Solver,
        variables: &[VarId],
        variable_strategy: IntVarStrategy,
        value_strategy: IntValueStrategy,
    ) -> Phase {
        let variable_selector = make_variable_selector(solver, variables, variable_strategy);
        let value_selector = make_value_selector(value_strategy);
        Phase::with_selectors(variable_selector, value_selector)
    }

    /// A phase from explicit selector implementations.
    pub fn with_selectors(
        variable_selector: Box<dyn VariableSelector>,
        value_selector: Box<dyn ValueSelector>,
    ) -> Phase {
        Phase {
            selector: Box::new(SelectorPair {
                variable_selector,
                value_selector,
            }),
        }
    }

    /// A phase selecting the variable minimizing `variable_evaluator` over the variable index.
    /// The evaluator must be repeatable.
    pub fn with_variable_evaluator(
        variables: &[VarId],
        variable_evaluator: Box<dyn Fn(usize) -> i64>,
        value_strategy: IntValueStrategy,
    ) -> Phase {
        Phase::with_selectors(
            Box::new(CheapestVariable::new(variables, variable_evaluator)),
            make_value_selector(value_strategy),
        )
    }

    /// A phase selecting the value minimizing `value_evaluator` over (variable id, value). The
    /// evaluator must be repeatable.
    pub fn with_value_evaluator(
        solver: &mut Solver,
        variables: &[VarId],
        variable_strategy: IntVarStrategy,
        value_evaluator: Box<dyn Fn(usize, i64) -> i64>,
    ) -> Phase {
        Phase::with_selectors(
            make_variable_selector(solver, variables, variable_strategy),
            Box::new(CheapestValue::new(value_evaluator)),
        )
    }

    /// Like [`Phase::with_value_evaluator`] with a tie-breaker picking among equally cheap
    /// values by index.
    pub fn with_value_evaluator_and_tie_breaker(
        solver: &mut Solver,
        variables: &[VarId],
        variable_strategy: IntVarStrategy,
        value_evaluator: Box<dyn Fn(usize, i64) -> i64>,
        tie_breaker: Box<dyn Fn(usize) -> usize>,
    ) -> Phase {
        Phase::with_selectors(
            make_variable_selector(solver, variables, variable_strategy),
            Box::new(CheapestValue::with_tie_breaker(value_evaluator, tie_breaker)),
        )
    }

    /// A phase selecting variable and value jointly by minimizing `evaluator` over all candidate
    /// assignments. The evaluator must be repeatable.
    pub fn with_evaluator(
        solver: &mut Solver,
        variables: &[VarId],
        evaluator: Box<dyn Fn(usize, i64) -> i64>,
        strategy: EvaluatorStrategy,
    ) -> Phase {
        Phase::with_evaluator_and_tie_breaker(solver, variables, evaluator, None, strategy)
    }

    /// Like [`Phase::with_evaluator`]; the tie-breaker is honored by the dynamic strategy only.
    pub fn with_evaluator_and_tie_breaker(
        solver: &mut Solver,
        variables: &[VarId],
        evaluator: Box<dyn Fn(usize, i64) -> i64>,
        tie_breaker: Option<Box<dyn Fn(usize) -> usize>>,
        strategy: EvaluatorStrategy,
    ) -> Phase {
        let selector: Box<dyn VariableAssignmentSelector> = match strategy {
            EvaluatorStrategy::ChooseStaticGlobalBest => {
                Box::new(StaticEvaluator::new(solver, variables, evaluator))
            }
            EvaluatorStrategy::ChooseDynamicGlobalBest => {
                Box::new(DynamicEvaluator::new(variables, evaluator, tie_breaker))
            }
        };
        Phase { selector }
    }
}

impl DecisionBuilder for Phase {
    fn next(&mut self, solver: &mut Solver) -> Result<Option<Decision>, Failure> {
        match self.selector.select_variable(solver) {
            Some((variable, id)) => {
                let value = self.selector.select_value(solver, variable, id);
                Ok(Some(Decision::assign(variable, value)))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_unbound_min_value_assigns_in_order() {
        let mut solver = Solver::default();
        let x = solver.new_bounded_integer(2, 5);
        let y = solver.new_bounded_integer(0, 5);
        let mut phase = Phase::new(
            &mut solver,
            &[x, y],
            IntVarStrategy::ChooseFirstUnbound,
            IntValueStrategy::AssignMinValue,
        );

        assert_eq!(phase.next(&mut solver).unwrap(), Some(Decision::assign(x, 2)));
        solver.set_value(x, 2).unwrap();
        assert_eq!(phase.next(&mut solver).unwrap(), Some(Decision::assign(y, 0)));
        solver.set_value(y, 0).unwrap();
        assert_eq!(phase.next(&mut solver).unwrap(), None);
    }

    #[test]
    fn evaluator_phase_emits_the_global_best() {
        let mut solver = Solver::default();
        let x = solver.new_bounded_integer(0, 1);
        let y = solver.new_bounded_integer(0, 1);
        let mut phase = Phase::with_evaluator(
            &mut solver,
            &[x, y],
            Box::new(|index, value| 10 * (index as i64) + value),
            EvaluatorStrategy::ChooseStaticGlobalBest,
        );

        assert_eq!(phase.next(&mut solver).unwrap(), Some(Decision::assign(x, 0)));
    }
}
