use rand::rngs::SmallRng;
use rand::SeedableRng;
use thiserror::Error;

use super::propagation::PropagationContext;
use super::Assignments;
use super::Failure;
use super::Propagator;
use super::SearchStatus;
use super::TrailedInt;
use super::TrailedValues;
use super::VarId;
use crate::basic_types::Random;
use crate::basic_types::Stopwatch;
use crate::branching::Decision;
use crate::engine::propagation::DifferenceEqual;
use crate::engine::propagation::EqualConstant;
use crate::engine::propagation::FunctionElement;
use crate::engine::propagation::FunctionElementBinary;
use crate::engine::propagation::GreaterOrEqualConstant;
use crate::engine::propagation::GreaterOrEqualVar;
use crate::engine::propagation::LessOrEqualConstant;
use crate::engine::propagation::LessOrEqualVar;
use crate::engine::propagation::MaxEqual;
use crate::engine::propagation::MinEqual;
use crate::engine::propagation::NotEqualConstant;
use crate::engine::propagation::ReifiedEqualConstant;
use crate::engine::propagation::ReifiedGreaterOrEqualConstant;
use crate::engine::propagation::ReifiedLessOrEqualConstant;
use crate::engine::propagation::ReifiedNotEqualConstant;
use crate::engine::propagation::SumEqual;
use crate::engine::propagation::SumGreaterOrEqualConstant;
use crate::gourd_assert_simple;

const DEFAULT_RANDOM_SEED: u64 = 42;

// Domains are enumerated at element construction only below this size; larger domains get wide
// sentinel bounds which propagation tightens once the argument becomes fixed.
const ELEMENT_BOUNDS_ENUMERATION_LIMIT: i64 = 4096;
const WIDE_BOUND: i64 = i64::MAX / 4;

/// Configuration of the solver.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolverOptions {
    /// Select the sparse (hash map) implementation for storing guided local search penalties
    /// instead of the dense table.
    pub use_sparse_gls_penalties: bool,
}

#[derive(Error, Debug, Copy, Clone)]
pub enum ConstraintOperationError {
    #[error("Adding the constraint failed because the solver is in an infeasible state")]
    InfeasibleState,
}

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Counters {
    pub(crate) branches: i64,
    pub(crate) failures: i64,
    pub(crate) solutions: i64,
}

/// The host of a search: the domain store, the trail, the posted constraints, the search
/// counters, and the random generator. The search-control components (decision builders, search
/// monitors, metaheuristics) all operate against this structure.
pub struct Solver {
    pub(crate) assignments: Assignments,
    pub(crate) trailed: TrailedValues,
    propagators: Vec<Box<dyn Propagator>>,
    /// The number of currently active propagators; trailed so that constraints posted inside the
    /// search tree are retracted on backtracking.
    active_propagators: TrailedInt,
    pub(crate) counters: Counters,
    timer: Stopwatch,
    random: Box<dyn Random>,
    options: SolverOptions,
    restart_requested: bool,
    pub(crate) search_depth: usize,
    pub(crate) solve_depth: usize,
}

impl std::fmt::Debug for Solver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Solver")
            .field("num_domains", &self.assignments.num_domains())
            .field("num_propagators", &self.propagators.len())
            .field("counters", &self.counters)
            .finish()
    }
}

impl Default for Solver {
    fn default() -> Self {
        Solver::with_options(SolverOptions::default())
    }
}

impl Solver {
    pub fn with_options(options: SolverOptions) -> Solver {
        Solver::with_options_and_random(
            options,
            Box::new(SmallRng::seed_from_u64(DEFAULT_RANDOM_SEED)),
        )
    }

    pub fn with_options_and_random(options: SolverOptions, random: Box<dyn Random>) -> Solver {
        let mut trailed = TrailedValues::default();
        let active_propagators = trailed.grow(0);
        Solver {
            assignments: Assignments::default(),
            trailed,
            propagators: Vec::new(),
            active_propagators,
            counters: Counters::default(),
            timer: Stopwatch::starting_now(),
            random,
            options,
            restart_requested: false,
            search_depth: 0,
            solve_depth: 0,
        }
    }

    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    // ---------- variables ----------

    /// Creates a new integer variable with the domain `[lower_bound, upper_bound]`.
    pub fn new_bounded_integer(&mut self, lower_bound: i64, upper_bound: i64) -> VarId {
        self.assignments.grow(lower_bound, upper_bound)
    }

    /// Creates a new 0-1 variable.
    pub fn new_bool_var(&mut self) -> VarId {
        self.new_bounded_integer(0, 1)
    }

    pub fn lower_bound(&self, variable: VarId) -> i64 {
        self.assignments.domain(variable).lower_bound()
    }

    pub fn upper_bound(&self, variable: VarId) -> i64 {
        self.assignments.domain(variable).upper_bound()
    }

    pub fn size(&self, variable: VarId) -> i64 {
        self.assignments.domain(variable).size()
    }

    pub fn is_fixed(&self, variable: VarId) -> bool {
        self.assignments.domain(variable).is_fixed()
    }

    /// The value of a fixed variable; asserts that the variable is fixed.
    pub fn value(&self, variable: VarId) -> i64 {
        self.assignments.domain(variable).value()
    }

    pub fn contains(&self, variable: VarId, value: i64) -> bool {
        self.assignments.domain(variable).contains(value)
    }

    /// The values currently in the domain, in increasing order.
    pub fn domain_values(&self, variable: VarId) -> Vec<i64> {
        self.assignments.domain(variable).iter().collect()
    }

    // ---------- reversible mutation ----------

    pub fn set_min(&mut self, variable: VarId, value: i64) -> SearchStatus {
        self.assignments
            .tighten_lower_bound(variable, value)
            .map(|_| ())
    }

    pub fn set_max(&mut self, variable: VarId, value: i64) -> SearchStatus {
        self.assignments
            .tighten_upper_bound(variable, value)
            .map(|_| ())
    }

    pub fn set_value(&mut self, variable: VarId, value: i64) -> SearchStatus {
        self.assignments.fix(variable, value).map(|_| ())
    }

    pub fn remove_value(&mut self, variable: VarId, value: i64) -> SearchStatus {
        self.assignments.remove_value(variable, value).map(|_| ())
    }

    /// Registers a reversible scalar with the given initial value.
    pub fn new_trailed_int(&mut self, initial_value: i64) -> TrailedInt {
        self.trailed.grow(initial_value)
    }

    pub fn trailed_read(&self, cell: TrailedInt) -> i64 {
        self.trailed.read(cell)
    }

    /// Reversibly overwrites the cell; the previous value is restored on backtracking.
    pub fn trailed_assign(&mut self, cell: TrailedInt, value: i64) {
        self.trailed.assign(cell, value);
    }

    // ---------- search bookkeeping ----------

    pub(crate) fn decision_level(&self) -> usize {
        self.assignments.decision_level()
    }

    pub(crate) fn push_decision_level(&mut self) {
        self.assignments.increase_decision_level();
        self.trailed.increase_decision_level();
    }

    pub(crate) fn backtrack_to(&mut self, decision_level: usize) {
        gourd_assert_simple!(decision_level < self.decision_level());
        self.assignments.synchronise(decision_level);
        self.trailed.synchronise(decision_level);
        let active = self.trailed.read(self.active_propagators) as usize;
        self.propagators.truncate(active);
    }

    pub fn branches(&self) -> i64 {
        self.counters.branches
    }

    pub fn failures(&self) -> i64 {
        self.counters.failures
    }

    pub fn solutions(&self) -> i64 {
        self.counters.solutions
    }

    /// The number of currently active posted constraints.
    pub fn constraints(&self) -> usize {
        self.trailed.read(self.active_propagators) as usize
    }

    pub fn wall_time(&self) -> std::time::Duration {
        self.timer.elapsed()
    }

    pub fn wall_time_ms(&self) -> i64 {
        self.timer.elapsed_ms()
    }

    /// The depth of the current node in the search tree.
    pub fn search_depth(&self) -> usize {
        self.search_depth
    }

    /// The nesting depth of solves; 0 outside of search, incremented for each nested solve.
    pub fn solve_depth(&self) -> usize {
        self.solve_depth
    }

    /// A rough estimate of the memory held by the solver, in bytes.
    pub fn memory_usage(&self) -> i64 {
        let propagator_estimate = self.propagators.len() * 128;
        (self.assignments.memory_estimate() + self.trailed.memory_estimate() + propagator_estimate)
            as i64
    }

    pub fn random(&mut self) -> &mut dyn Random {
        self.random.as_mut()
    }

    /// Constructs the failure token. Monitors reject the current branch by returning this from a
    /// fallible hook.
    pub fn fail(&self) -> Failure {
        Failure
    }

    /// Requests that the ongoing search restarts from its root; honored by the search driver at
    /// the next failure handling step.
    pub fn restart_current_search(&mut self) {
        self.restart_requested = true;
    }

    pub(crate) fn take_restart_request(&mut self) -> bool {
        std::mem::take(&mut self.restart_requested)
    }

    /// The distinguished decision used by local-search drivers to re-balance; metaheuristics do
    /// not post their objective constraints for it.
    pub fn balancing_decision(&self) -> Decision {
        Decision::Balance
    }

    // ---------- constraints ----------

    /// Adds a propagator; when called inside the search tree the propagator is retracted on
    /// backtracking past this point.
    pub fn add_constraint(&mut self, propagator: Box<dyn Propagator>) {
        self.propagators.push(propagator);
        self.trailed
            .assign(self.active_propagators, self.propagators.len() as i64);
    }

    /// Adds a propagator at the root of the search and immediately propagates; intended for model
    /// building.
    pub fn post(&mut self, propagator: Box<dyn Propagator>) -> Result<(), ConstraintOperationError> {
        self.add_constraint(propagator);
        self.propagate()
            .map_err(|_| ConstraintOperationError::InfeasibleState)
    }

    /// Runs the propagators to fixpoint.
    pub(crate) fn propagate(&mut self) -> SearchStatus {
        loop {
            let active = self.trailed.read(self.active_propagators) as usize;
            let Solver {
                propagators,
                assignments,
                ..
            } = self;
            let mut context = PropagationContext::new(assignments);
            let mut changed = false;
            for propagator in propagators[..active].iter_mut() {
                changed |= propagator.propagate(&mut context)?;
            }
            if !changed {
                return Ok(());
            }
        }
    }

    pub fn add_greater_or_equal(&mut self, variable: VarId, bound: i64) {
        self.add_constraint(Box::new(GreaterOrEqualConstant { variable, bound }));
    }

    pub fn add_less_or_equal(&mut self, variable: VarId, bound: i64) {
        self.add_constraint(Box::new(LessOrEqualConstant { variable, bound }));
    }

    pub fn add_equality(&mut self, variable: VarId, value: i64) {
        self.add_constraint(Box::new(EqualConstant { variable, value }));
    }

    pub fn add_not_equal(&mut self, variable: VarId, value: i64) {
        self.add_constraint(Box::new(NotEqualConstant { variable, value }));
    }

    pub fn add_greater_or_equal_var(&mut self, left: VarId, right: VarId) {
        self.add_constraint(Box::new(GreaterOrEqualVar { left, right }));
    }

    pub fn add_less_or_equal_var(&mut self, left: VarId, right: VarId) {
        self.add_constraint(Box::new(LessOrEqualVar { left, right }));
    }

    pub fn add_sum_greater_or_equal(&mut self, variables: &[VarId], bound: i64) {
        self.add_constraint(Box::new(SumGreaterOrEqualConstant {
            variables: variables.to_vec(),
            bound,
        }));
    }

    /// reification <-> (variable == value)
    pub fn add_is_equal_constant(&mut self, variable: VarId, value: i64, reification: VarId) {
        self.add_constraint(Box::new(ReifiedEqualConstant {
            variable,
            value,
            reification,
        }));
    }

    /// reification <-> (variable != value)
    pub fn add_is_different_constant(&mut self, variable: VarId, value: i64, reification: VarId) {
        self.add_constraint(Box::new(ReifiedNotEqualConstant {
            variable,
            value,
            reification,
        }));
    }

    /// reification <-> (variable >= bound)
    pub fn add_is_greater_or_equal_constant(
        &mut self,
        variable: VarId,
        bound: i64,
        reification: VarId,
    ) {
        self.add_constraint(Box::new(ReifiedGreaterOrEqualConstant {
            variable,
            bound,
            reification,
        }));
    }

    /// reification <-> (variable <= bound)
    pub fn add_is_less_or_equal_constant(
        &mut self,
        variable: VarId,
        bound: i64,
        reification: VarId,
    ) {
        self.add_constraint(Box::new(ReifiedLessOrEqualConstant {
            variable,
            bound,
            reification,
        }));
    }

    // ---------- expressions ----------

    /// Creates a variable constrained to the sum of `variables`.
    pub fn make_sum(&mut self, variables: &[VarId]) -> VarId {
        let lower = variables
            .iter()
            .map(|&variable| self.lower_bound(variable))
            .fold(0i64, i64::saturating_add);
        let upper = variables
            .iter()
            .map(|&variable| self.upper_bound(variable))
            .fold(0i64, i64::saturating_add);
        let result = self.new_bounded_integer(lower, upper);
        self.add_constraint(Box::new(SumEqual {
            variables: variables.to_vec(),
            result,
        }));
        result
    }

    /// Creates a variable constrained to the minimum of `variables`.
    pub fn make_min(&mut self, variables: &[VarId]) -> VarId {
        gourd_assert_simple!(!variables.is_empty());
        let lower = variables
            .iter()
            .map(|&variable| self.lower_bound(variable))
            .min()
            .unwrap_or(0);
        let upper = variables
            .iter()
            .map(|&variable| self.upper_bound(variable))
            .min()
            .unwrap_or(0);
        let result = self.new_bounded_integer(lower, upper);
        self.add_constraint(Box::new(MinEqual {
            variables: variables.to_vec(),
            result,
        }));
        result
    }

    /// Creates a variable constrained to the maximum of `variables`.
    pub fn make_max(&mut self, variables: &[VarId]) -> VarId {
        gourd_assert_simple!(!variables.is_empty());
        let lower = variables
            .iter()
            .map(|&variable| self.lower_bound(variable))
            .max()
            .unwrap_or(0);
        let upper = variables
            .iter()
            .map(|&variable| self.upper_bound(variable))
            .max()
            .unwrap_or(0);
        let result = self.new_bounded_integer(lower, upper);
        self.add_constraint(Box::new(MaxEqual {
            variables: variables.to_vec(),
            result,
        }));
        result
    }

    /// Creates a variable constrained to `min(variable, constant)`.
    pub fn make_min_with_constant(&mut self, variable: VarId, constant: i64) -> VarId {
        let fixed = self.new_bounded_integer(constant, constant);
        self.make_min(&[variable, fixed])
    }

    /// Creates a variable constrained to `max(variable, constant)`.
    pub fn make_max_with_constant(&mut self, variable: VarId, constant: i64) -> VarId {
        let fixed = self.new_bounded_integer(constant, constant);
        self.make_max(&[variable, fixed])
    }

    /// Creates a variable constrained to `constant - variable`.
    pub fn make_difference(&mut self, constant: i64, variable: VarId) -> VarId {
        let lower = constant.saturating_sub(self.upper_bound(variable));
        let upper = constant.saturating_sub(self.lower_bound(variable));
        let result = self.new_bounded_integer(lower, upper);
        self.add_constraint(Box::new(DifferenceEqual {
            constant,
            variable,
            result,
        }));
        result
    }

    /// Creates a variable constrained to `evaluator(variable)`. The evaluator may be invoked more
    /// than once per value and must be repeatable.
    pub fn make_function_element(
        &mut self,
        evaluator: Box<dyn Fn(i64) -> i64>,
        variable: VarId,
    ) -> VarId {
        let (lower, upper) = if self.size(variable) <= ELEMENT_BOUNDS_ENUMERATION_LIMIT {
            let images = self
                .domain_values(variable)
                .into_iter()
                .map(&evaluator)
                .collect::<Vec<_>>();
            (
                images.iter().copied().min().unwrap_or(0),
                images.iter().copied().max().unwrap_or(0),
            )
        } else {
            (-WIDE_BOUND, WIDE_BOUND)
        };
        let result = self.new_bounded_integer(lower, upper);
        self.add_constraint(Box::new(FunctionElement {
            evaluator,
            variable,
            result,
        }));
        result
    }

    /// Creates a variable constrained to `evaluator(variable, second)`; the two-dimensional
    /// counterpart of [`Solver::make_function_element`].
    pub fn make_function_element_binary(
        &mut self,
        evaluator: Box<dyn Fn(i64, i64) -> i64>,
        variable: VarId,
        second: VarId,
    ) -> VarId {
        let product = self.size(variable).saturating_mul(self.size(second));
        let (lower, upper) = if product <= ELEMENT_BOUNDS_ENUMERATION_LIMIT {
            let mut lowest = i64::MAX;
            let mut highest = i64::MIN;
            for value in self.domain_values(variable) {
                for second_value in self.domain_values(second) {
                    let image = evaluator(value, second_value);
                    lowest = lowest.min(image);
                    highest = highest.max(image);
                }
            }
            (lowest, highest)
        } else {
            (-WIDE_BOUND, WIDE_BOUND)
        };
        let result = self.new_bounded_integer(lower, upper);
        self.add_constraint(Box::new(FunctionElementBinary {
            evaluator,
            variable,
            second,
            result,
        }));
        result
    }
}

#[cfg(test)]
mod tests {
    use super::Solver;

    #[test]
    fn posting_an_infeasible_constraint_reports_an_error() {
        let mut solver = Solver::default();
        let variable = solver.new_bounded_integer(0, 5);
        solver.add_greater_or_equal(variable, 3);
        solver.add_less_or_equal(variable, 1);
        assert!(solver.propagate().is_err());
    }

    #[test]
    fn sum_expression_tracks_its_terms() {
        let mut solver = Solver::default();
        let x = solver.new_bounded_integer(0, 5);
        let y = solver.new_bounded_integer(0, 5);
        let sum = solver.make_sum(&[x, y]);

        assert_eq!(solver.lower_bound(sum), 0);
        assert_eq!(solver.upper_bound(sum), 10);

        solver.set_min(x, 3).unwrap();
        solver.propagate().unwrap();
        assert_eq!(solver.lower_bound(sum), 3);

        solver.set_max(sum, 4).unwrap();
        solver.propagate().unwrap();
        assert_eq!(solver.upper_bound(y), 1);
    }

    #[test]
    fn constraints_posted_in_the_tree_are_retracted_on_backtracking() {
        let mut solver = Solver::default();
        let variable = solver.new_bounded_integer(0, 5);

        solver.push_decision_level();
        solver.add_greater_or_equal(variable, 4);
        solver.propagate().unwrap();
        assert_eq!(solver.lower_bound(variable), 4);

        solver.backtrack_to(0);
        assert_eq!(solver.lower_bound(variable), 0);
        solver.propagate().unwrap();
        assert_eq!(solver.lower_bound(variable), 0);
    }

    #[test]
    fn function_element_follows_its_argument() {
        let mut solver = Solver::default();
        let variable = solver.new_bounded_integer(0, 3);
        let element = solver.make_function_element(Box::new(|value| value * 10), variable);
        assert_eq!(solver.lower_bound(element), 0);
        assert_eq!(solver.upper_bound(element), 30);

        solver.set_value(variable, 2).unwrap();
        solver.propagate().unwrap();
        assert_eq!(solver.value(element), 20);
    }
}
