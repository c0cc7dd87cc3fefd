//! Guided local search: penalizes the costly (variable, value) arcs of each local optimum and
//! searches a penalized objective which steers subsequent neighbors away from them.

mod penalties;

pub use penalties::Arc;
pub use penalties::GuidedLocalSearchPenalties;
pub use penalties::PenaltiesMap;
pub use penalties::PenaltiesTable;

use std::cell::RefCell;
use std::rc::Rc;

use super::Metaheuristic;
use crate::basic_types::Assignment;
use crate::basic_types::HashMap;
use crate::branching::Decision;
use crate::engine::SearchStatus;
use crate::engine::Solver;
use crate::engine::VarId;
use crate::gourd_assert_simple;
use crate::search::SearchMonitor;

enum CostEvaluator {
    /// cost(index, value)
    Binary(Rc<dyn Fn(usize, i64) -> i64>),
    /// cost(index, value, secondary value), where a parallel array of secondary variables
    /// contributes the third argument.
    Ternary {
        secondary: Vec<VarId>,
        cost: Rc<dyn Fn(usize, i64, i64) -> i64>,
    },
}

/// The guided local search monitor. Between solutions it bounds the objective by
/// `min(current + step - penalized, best + step)` (maximize) or
/// `max(current - step - penalized, best - step)` (minimize), where `penalized` is the sum of
/// per-variable element expressions `penalty_factor * penalty(arc) * cost(arc)`. At every local
/// optimum the arcs of highest utility `cost / (1 + penalty)` are penalized.
pub struct GuidedLocalSearch {
    meta: Metaheuristic,
    penalized_objective: Option<VarId>,
    assignment: Assignment,
    assignment_penalized_value: i64,
    old_penalized_value: i64,
    variables: Vec<VarId>,
    indices: HashMap<VarId, usize>,
    penalty_factor: f64,
    penalties: Rc<RefCell<dyn GuidedLocalSearchPenalties>>,
    current_penalized_values: Vec<i64>,
    delta_cache: Vec<i64>,
    incremental: bool,
    evaluator: CostEvaluator,
}

impl std::fmt::Debug for GuidedLocalSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuidedLocalSearch")
            .field("penalty_factor", &self.penalty_factor)
            .field("incremental", &self.incremental)
            .finish()
    }
}

impl GuidedLocalSearch {
    /// Guided local search over a binary cost `cost(index, value)`. The sparse or dense penalty
    /// store is chosen by [`SolverOptions::use_sparse_gls_penalties`].
    ///
    /// [`SolverOptions::use_sparse_gls_penalties`]: crate::SolverOptions
    pub fn binary(
        solver: &Solver,
        maximize: bool,
        objective: VarId,
        cost: Rc<dyn Fn(usize, i64) -> i64>,
        step: i64,
        variables: &[VarId],
        penalty_factor: f64,
    ) -> GuidedLocalSearch {
        GuidedLocalSearch::with_evaluator(
            solver,
            maximize,
            objective,
            step,
            variables,
            penalty_factor,
            CostEvaluator::Binary(cost),
        )
    }

    /// Guided local search over a ternary cost `cost(index, value, secondary value)`.
    pub fn ternary(
        solver: &Solver,
        maximize: bool,
        objective: VarId,
        cost: Rc<dyn Fn(usize, i64, i64) -> i64>,
        step: i64,
        variables: &[VarId],
        secondary_variables: &[VarId],
        penalty_factor: f64,
    ) -> GuidedLocalSearch {
        gourd_assert_simple!(
            variables.len() == secondary_variables.len(),
            "One secondary variable is required per primary variable"
        );
        GuidedLocalSearch::with_evaluator(
            solver,
            maximize,
            objective,
            step,
            variables,
            penalty_factor,
            CostEvaluator::Ternary {
                secondary: secondary_variables.to_vec(),
                cost,
            },
        )
    }

    fn with_evaluator(
        solver: &Solver,
        maximize: bool,
        objective: VarId,
        step: i64,
        variables: &[VarId],
        penalty_factor: f64,
        evaluator: CostEvaluator,
    ) -> GuidedLocalSearch {
        let mut assignment = Assignment::with_variables(variables);
        if let CostEvaluator::Ternary { secondary, .. } = &evaluator {
            for &variable in secondary {
                assignment.add(variable);
            }
        }
        let indices = variables
            .iter()
            .enumerate()
            .map(|(index, &variable)| (variable, index))
            .collect();
        let penalties: Rc<RefCell<dyn GuidedLocalSearchPenalties>> =
            if solver.options().use_sparse_gls_penalties {
                Rc::new(RefCell::new(PenaltiesMap::new(variables.len())))
            } else {
                Rc::new(RefCell::new(PenaltiesTable::new(variables.len())))
            };
        GuidedLocalSearch {
            meta: Metaheuristic::new(maximize, objective, step),
            penalized_objective: None,
            assignment,
            assignment_penalized_value: 0,
            old_penalized_value: 0,
            variables: variables.to_vec(),
            indices,
            penalty_factor,
            penalties,
            current_penalized_values: vec![0; variables.len()],
            delta_cache: vec![0; variables.len()],
            incremental: false,
            evaluator,
        }
    }

    /// The penalized cost of the arc: `penalty_factor * penalty * cost`, negated when
    /// maximizing. Zero-penalty arcs avoid the cost callback entirely.
    fn penalized_arc_value(
        penalties: &RefCell<dyn GuidedLocalSearchPenalties>,
        penalty_factor: f64,
        maximize: bool,
        arc: Arc,
        cost: i64,
    ) -> i64 {
        let penalty = penalties.borrow().value(arc);
        if penalty == 0 {
            return 0;
        }
        let penalized_value = (penalty_factor * penalty as f64 * cost as f64) as i64;
        if maximize {
            -penalized_value
        } else {
            penalized_value
        }
    }

    fn penalized_value(&self, index: usize, value: i64, secondary_value: i64) -> i64 {
        let arc = (index, value);
        if self.penalties.borrow().value(arc) == 0 {
            return 0;
        }
        let cost = match &self.evaluator {
            CostEvaluator::Binary(cost) => cost(index, value),
            CostEvaluator::Ternary { cost, .. } => cost(index, value, secondary_value),
        };
        Self::penalized_arc_value(
            &self.penalties,
            self.penalty_factor,
            self.meta.maximize,
            arc,
            cost,
        )
    }

    /// Builds the element expression `penalty_factor * penalty(index, var) * cost(index, var)`
    /// for one variable of the penalized objective.
    fn make_element_penalty(&self, solver: &mut Solver, index: usize) -> VarId {
        let penalties = Rc::clone(&self.penalties);
        let penalty_factor = self.penalty_factor;
        let maximize = self.meta.maximize;
        match &self.evaluator {
            CostEvaluator::Binary(cost) => {
                let cost = Rc::clone(cost);
                solver.make_function_element(
                    Box::new(move |value| {
                        let arc = (index, value);
                        if penalties.borrow().value(arc) == 0 {
                            return 0;
                        }
                        let cost = cost(index, value);
                        Self::penalized_arc_value(
                            &penalties,
                            penalty_factor,
                            maximize,
                            arc,
                            cost,
                        )
                    }),
                    self.variables[index],
                )
            }
            CostEvaluator::Ternary { secondary, cost } => {
                let cost = Rc::clone(cost);
                solver.make_function_element_binary(
                    Box::new(move |value, secondary_value| {
                        let arc = (index, value);
                        if penalties.borrow().value(arc) == 0 {
                            return 0;
                        }
                        let cost = cost(index, value, secondary_value);
                        Self::penalized_arc_value(
                            &penalties,
                            penalty_factor,
                            maximize,
                            arc,
                            cost,
                        )
                    }),
                    self.variables[index],
                    secondary[index],
                )
            }
        }
    }

    /// The penalized contribution of variable `index` under the stored assignment.
    fn assignment_element_penalty(&self, index: usize) -> i64 {
        let value = self.assignment.value(self.variables[index]);
        let secondary_value = match &self.evaluator {
            CostEvaluator::Binary(_) => 0,
            CostEvaluator::Ternary { secondary, .. } => self.assignment.value(secondary[index]),
        };
        self.penalized_value(index, value, secondary_value)
    }

    /// The raw cost of assigning `next` at `index` under the stored assignment.
    fn assignment_penalty(&self, index: usize, next: i64) -> i64 {
        match &self.evaluator {
            CostEvaluator::Binary(cost) => cost(index, next),
            CostEvaluator::Ternary { secondary, cost } => {
                cost(index, next, self.assignment.value(secondary[index]))
            }
        }
    }

    /// Re-evaluates the penalized value over a neighbor delta: for every delta entry of a
    /// penalized variable, its cached contribution is subtracted and the contribution under the
    /// delta value added back.
    fn evaluate(
        &mut self,
        delta: &Assignment,
        current_penalty: i64,
        read_delta_cache: bool,
        cache_delta_values: bool,
    ) -> i64 {
        let mut penalty = current_penalty;
        let mut position = 0;
        while position < delta.len() {
            let element = *delta.element(position);
            if let Some(&index) = self.indices.get(&element.variable()) {
                penalty -= if read_delta_cache {
                    self.delta_cache[index]
                } else {
                    self.current_penalized_values[index]
                };
                if element.activated() {
                    let secondary_value = match &self.evaluator {
                        CostEvaluator::Binary(_) => 0,
                        CostEvaluator::Ternary { secondary, .. } => {
                            self.delta_secondary_value(delta, secondary[index], &mut position)
                        }
                    };
                    let new_penalty =
                        self.penalized_value(index, element.value(), secondary_value);
                    penalty += new_penalty;
                    if cache_delta_values {
                        self.delta_cache[index] = new_penalty;
                    }
                }
            }
            position += 1;
        }
        penalty
    }

    /// Looks up the delta value of a secondary variable, preferring the position right after the
    /// primary entry; entries missing from the delta read the stored assignment.
    fn delta_secondary_value(
        &self,
        delta: &Assignment,
        secondary: VarId,
        position: &mut usize,
    ) -> i64 {
        let hint = *position + 1;
        if hint < delta.len() && delta.element(hint).variable() == secondary {
            *position = hint;
            return delta.element(hint).value();
        }
        match delta.element_by_variable(secondary) {
            Some(element) => element.value(),
            None => self.assignment.value(secondary),
        }
    }
}

impl SearchMonitor for GuidedLocalSearch {
    fn enter_search(&mut self, solver: &mut Solver) {
        self.meta.enter_search(solver);
    }

    fn apply_decision(&mut self, solver: &mut Solver, decision: &Decision) -> SearchStatus {
        if decision.is_balancing() {
            return Ok(());
        }
        let objective = self.meta.objective;
        if self.penalties.borrow().has_values() {
            // Materialize the penalized objective and bound the real objective with it,
            // including the aspiration on the best solution.
            self.assignment_penalized_value = 0;
            let mut elements = Vec::with_capacity(self.variables.len());
            for index in 0..self.variables.len() {
                let element = self.make_element_penalty(solver, index);
                elements.push(element);
                let penalty = self.assignment_element_penalty(index);
                self.current_penalized_values[index] = penalty;
                self.delta_cache[index] = penalty;
                self.assignment_penalized_value =
                    self.assignment_penalized_value.saturating_add(penalty);
            }
            self.old_penalized_value = self.assignment_penalized_value;
            self.incremental = false;
            let penalized_objective = solver.make_sum(&elements);
            self.penalized_objective = Some(penalized_objective);
            if self.meta.maximize {
                let min_pen_exp = solver.make_difference(
                    self.meta.current.saturating_add(self.meta.step),
                    penalized_objective,
                );
                let min_exp = solver.make_min_with_constant(
                    min_pen_exp,
                    self.meta.best.saturating_add(self.meta.step),
                );
                solver.add_greater_or_equal_var(objective, min_exp);
            } else {
                let max_pen_exp = solver.make_difference(
                    self.meta.current.saturating_sub(self.meta.step),
                    penalized_objective,
                );
                let max_exp = solver.make_max_with_constant(
                    max_pen_exp,
                    self.meta.best.saturating_sub(self.meta.step),
                );
                solver.add_less_or_equal_var(objective, max_exp);
            }
        } else {
            self.penalized_objective = None;
            if self.meta.maximize {
                solver.set_min(
                    objective,
                    self.meta.current.saturating_add(self.meta.step),
                )?;
            } else {
                solver.set_max(
                    objective,
                    self.meta.current.saturating_sub(self.meta.step),
                )?;
            }
        }
        Ok(())
    }

    fn refute_decision(&mut self, solver: &mut Solver, _decision: &Decision) -> SearchStatus {
        self.meta.refute_check(solver)
    }

    fn at_solution(&mut self, solver: &mut Solver) -> bool {
        let value = solver.value(self.meta.objective);
        self.meta.record_solution(value);
        // The incumbent tracks the penalized cost of the solution when penalties are active.
        if let Some(penalized_objective) = self.penalized_objective {
            self.meta.current = self
                .meta
                .current
                .saturating_add(solver.value(penalized_objective));
        }
        self.assignment.store(solver);
        true
    }

    fn accept_delta(
        &mut self,
        _solver: &mut Solver,
        delta: &mut Assignment,
        deltadelta: &Assignment,
    ) -> bool {
        if self.penalties.borrow().has_values() {
            let penalty = if !deltadelta.is_empty() {
                let penalty = if !self.incremental {
                    self.evaluate(delta, self.assignment_penalized_value, false, true)
                } else {
                    self.evaluate(deltadelta, self.old_penalized_value, true, true)
                };
                self.incremental = true;
                penalty
            } else {
                if self.incremental {
                    self.delta_cache.copy_from_slice(&self.current_penalized_values);
                    self.old_penalized_value = self.assignment_penalized_value;
                }
                self.incremental = false;
                self.evaluate(delta, self.assignment_penalized_value, false, false)
            };
            self.old_penalized_value = penalty;
            if !delta.has_objective() {
                delta.add_objective(self.meta.objective);
            }
            if delta.objective() == Some(self.meta.objective) {
                if self.meta.maximize {
                    let bound = self
                        .meta
                        .current
                        .saturating_add(self.meta.step)
                        .saturating_sub(penalty)
                        .min(self.meta.best.saturating_add(self.meta.step));
                    delta.set_objective_min(bound.max(delta.objective_min()));
                } else {
                    let bound = self
                        .meta
                        .current
                        .saturating_sub(self.meta.step)
                        .saturating_sub(penalty)
                        .max(self.meta.best.saturating_sub(self.meta.step));
                    delta.set_objective_max(bound.min(delta.objective_max()));
                }
            }
        }
        true
    }

    fn local_optimum(&mut self, _solver: &mut Solver) -> bool {
        gourd_assert_simple!(!self.variables.is_empty());
        // Penalize the arcs of highest utility cost / (1 + penalty), ties included.
        let mut utility = Vec::with_capacity(self.variables.len());
        for index in 0..self.variables.len() {
            let var_value = self.assignment.value(self.variables[index]);
            let value = if var_value != index as i64 {
                self.assignment_penalty(index, var_value)
            } else {
                0
            };
            let arc = (index, var_value);
            let penalty = self.penalties.borrow().value(arc);
            utility.push((arc, value as f64 / (penalty as f64 + 1.0)));
        }
        utility.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        let top_utility = utility[0].1;
        self.penalties.borrow_mut().increment(utility[0].0);
        for &(arc, arc_utility) in utility.iter().skip(1) {
            if arc_utility != top_utility {
                break;
            }
            self.penalties.borrow_mut().increment(arc);
        }
        self.meta.reset_current_to_worst();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SolverOptions;

    fn toy_cost() -> Rc<dyn Fn(usize, i64) -> i64> {
        // Two variables over {0, 1} with the cost matrix [[0, 1], [1, 0]].
        Rc::new(|index, value| match (index, value) {
            (0, 1) | (1, 0) => 1,
            _ => 0,
        })
    }

    fn setup(use_sparse: bool) -> (Solver, Vec<VarId>, VarId, GuidedLocalSearch) {
        let mut solver = Solver::with_options(SolverOptions {
            use_sparse_gls_penalties: use_sparse,
        });
        let variables = vec![
            solver.new_bounded_integer(0, 1),
            solver.new_bounded_integer(0, 1),
        ];
        let objective = solver.new_bounded_integer(0, 2);
        let gls = GuidedLocalSearch::binary(
            &solver,
            true,
            objective,
            toy_cost(),
            1,
            &variables,
            1.0,
        );
        (solver, variables, objective, gls)
    }

    fn first_local_optimum(use_sparse: bool) -> Vec<i64> {
        let (mut solver, variables, objective, mut gls) = setup(use_sparse);
        gls.enter_search(&mut solver);

        // The first solution is (0, 1) with cost 1.
        solver.push_decision_level();
        solver.set_value(variables[0], 0).unwrap();
        solver.set_value(variables[1], 1).unwrap();
        solver.set_value(objective, 1).unwrap();
        assert!(gls.at_solution(&mut solver));
        solver.backtrack_to(0);

        assert!(gls.local_optimum(&mut solver));
        let penalties = gls.penalties.borrow();
        vec![
            penalties.value((0, 0)),
            penalties.value((0, 1)),
            penalties.value((1, 0)),
            penalties.value((1, 1)),
        ]
    }

    #[test]
    fn the_costly_arc_is_penalized_at_the_local_optimum() {
        // At (0, 1): arc (0, 0) is a self-loop (cost 0 by convention) and arc (1, 1) has cost
        // 0; the only cost is carried by... the assignment value of variable 1 is 1, which has
        // cost 0, while variable 0 takes value 0 with cost 0. The utilities tie at 0 and every
        // arc is penalized once.
        let penalties = first_local_optimum(false);
        assert_eq!(penalties.iter().sum::<i64>(), 2);
    }

    #[test]
    fn sparse_and_dense_stores_agree_on_the_same_run() {
        assert_eq!(first_local_optimum(false), first_local_optimum(true));
    }

    #[test]
    fn penalties_reshape_the_objective_bound() {
        let (mut solver, variables, objective, mut gls) = setup(false);
        gls.enter_search(&mut solver);

        solver.push_decision_level();
        solver.set_value(variables[0], 0).unwrap();
        solver.set_value(variables[1], 1).unwrap();
        solver.set_value(objective, 1).unwrap();
        assert!(gls.at_solution(&mut solver));
        solver.backtrack_to(0);
        assert!(gls.local_optimum(&mut solver));

        // With penalties present, the next decision materializes the penalized objective
        // instead of a plain bound.
        solver.push_decision_level();
        let decision = Decision::assign(variables[0], 0);
        gls.apply_decision(&mut solver, &decision).unwrap();
        assert!(gls.penalized_objective.is_some());
        solver.backtrack_to(0);
    }

    #[test]
    fn without_penalties_the_plain_bound_is_used() {
        let (mut solver, variables, objective, mut gls) = setup(false);
        gls.enter_search(&mut solver);

        // best = current = lower bound of the objective (maximize), so the bound is
        // current + step = 1.
        solver.push_decision_level();
        let decision = Decision::assign(variables[0], 0);
        gls.apply_decision(&mut solver, &decision).unwrap();
        assert!(gls.penalized_objective.is_none());
        assert_eq!(solver.lower_bound(objective), 1);
        solver.backtrack_to(0);
    }

    #[test]
    fn ternary_costs_read_the_secondary_variable() {
        let mut solver = Solver::default();
        let primary = solver.new_bounded_integer(0, 3);
        let secondary = solver.new_bounded_integer(0, 3);
        let objective = solver.new_bounded_integer(0, 10);
        let mut gls = GuidedLocalSearch::ternary(
            &solver,
            false,
            objective,
            Rc::new(|_, value, secondary_value| value + secondary_value),
            1,
            &[primary],
            &[secondary],
            1.0,
        );

        gls.enter_search(&mut solver);
        solver.push_decision_level();
        solver.set_value(primary, 1).unwrap();
        solver.set_value(secondary, 2).unwrap();
        solver.set_value(objective, 3).unwrap();
        assert!(gls.at_solution(&mut solver));
        solver.backtrack_to(0);

        // The only arc, (0, 1), carries cost 1 + 2 = 3 and is penalized.
        assert!(gls.local_optimum(&mut solver));
        assert_eq!(gls.penalties.borrow().value((0, 1)), 1);

        // The penalized objective element evaluates cost(0, primary, secondary).
        solver.push_decision_level();
        let decision = Decision::assign(primary, 1);
        gls.apply_decision(&mut solver, &decision).unwrap();
        let penalized_objective = gls.penalized_objective.expect("penalties are present");
        solver.set_value(primary, 1).unwrap();
        solver.set_value(secondary, 2).unwrap();
        solver.propagate().unwrap();
        assert_eq!(solver.value(penalized_objective), 3);
        solver.backtrack_to(0);
    }

    #[test]
    fn accept_delta_bounds_the_neighbor_objective() {
        let (mut solver, variables, objective, mut gls) = setup(false);
        gls.enter_search(&mut solver);

        solver.push_decision_level();
        solver.set_value(variables[0], 0).unwrap();
        solver.set_value(variables[1], 1).unwrap();
        solver.set_value(objective, 1).unwrap();
        assert!(gls.at_solution(&mut solver));
        solver.backtrack_to(0);
        assert!(gls.local_optimum(&mut solver));

        // A neighbor moving variable 1 to 0.
        let mut delta = Assignment::with_variables(&[variables[1]]);
        delta.set_value(variables[1], 0);
        let deltadelta = Assignment::default();
        assert!(gls.accept_delta(&mut solver, &mut delta, &deltadelta));
        assert!(delta.has_objective());
        // Maximize: the delta objective gained a lower bound.
        assert!(delta.objective_min() > i64::MIN);
    }
}
