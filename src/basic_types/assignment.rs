use crate::basic_types::HashMap;
use crate::engine::Solver;
use crate::engine::VarId;
use crate::gourd_assert_simple;

/// One recorded (variable, value) pair of an [`Assignment`]. Deactivated elements are ignored
/// when the assignment is evaluated (used by local-search deltas to mark untouched variables).
#[derive(Debug, Clone, Copy)]
pub struct AssignmentElement {
    variable: VarId,
    value: i64,
    activated: bool,
}

impl AssignmentElement {
    pub fn variable(&self) -> VarId {
        self.variable
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn activated(&self) -> bool {
        self.activated
    }
}

/// A snapshot of variable values, decoupled from the live domains. Collectors keep solutions in
/// this form, metaheuristics diff the current solution against it, and local-search deltas are
/// communicated as sparse assignments with objective bounds.
#[derive(Debug, Clone, Default)]
pub struct Assignment {
    elements: Vec<AssignmentElement>,
    index_of: HashMap<VarId, usize>,
    objective: Option<VarId>,
    objective_value: i64,
    objective_min: i64,
    objective_max: i64,
}

impl Assignment {
    pub fn with_variables(variables: &[VarId]) -> Assignment {
        let mut assignment = Assignment::default();
        for &variable in variables {
            assignment.add(variable);
        }
        assignment
    }

    /// Adds a variable to the snapshot with a zero placeholder value.
    pub fn add(&mut self, variable: VarId) {
        if self.index_of.contains_key(&variable) {
            return;
        }
        let _ = self.index_of.insert(variable, self.elements.len());
        self.elements.push(AssignmentElement {
            variable,
            value: 0,
            activated: true,
        });
    }

    pub fn add_objective(&mut self, objective: VarId) {
        self.objective = Some(objective);
        self.objective_min = i64::MIN;
        self.objective_max = i64::MAX;
    }

    pub fn has_objective(&self) -> bool {
        self.objective.is_some()
    }

    pub fn objective(&self) -> Option<VarId> {
        self.objective
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn element(&self, index: usize) -> &AssignmentElement {
        &self.elements[index]
    }

    pub fn element_by_variable(&self, variable: VarId) -> Option<&AssignmentElement> {
        self.index_of.get(&variable).map(|&index| &self.elements[index])
    }

    pub fn contains_variable(&self, variable: VarId) -> bool {
        self.index_of.contains_key(&variable)
    }

    /// The recorded value of `variable`; the variable must have been added.
    pub fn value(&self, variable: VarId) -> i64 {
        let index = self.index_of[&variable];
        self.elements[index].value
    }

    pub fn set_value(&mut self, variable: VarId, value: i64) {
        gourd_assert_simple!(
            self.index_of.contains_key(&variable),
            "set_value on a variable which is not part of the assignment"
        );
        let index = self.index_of[&variable];
        self.elements[index].value = value;
    }

    pub fn activate(&mut self, variable: VarId) {
        let index = self.index_of[&variable];
        self.elements[index].activated = true;
    }

    pub fn deactivate(&mut self, variable: VarId) {
        let index = self.index_of[&variable];
        self.elements[index].activated = false;
    }

    /// Reads the current domain values into the snapshot. Unfixed variables record their lower
    /// bound.
    pub fn store(&mut self, solver: &Solver) {
        for element in self.elements.iter_mut() {
            element.value = if solver.is_fixed(element.variable) {
                solver.value(element.variable)
            } else {
                solver.lower_bound(element.variable)
            };
            element.activated = true;
        }
        if let Some(objective) = self.objective {
            self.objective_value = if solver.is_fixed(objective) {
                solver.value(objective)
            } else {
                solver.lower_bound(objective)
            };
            self.objective_min = self.objective_value;
            self.objective_max = self.objective_value;
        }
    }

    pub fn objective_value(&self) -> i64 {
        self.objective_value
    }

    pub fn objective_min(&self) -> i64 {
        self.objective_min
    }

    pub fn objective_max(&self) -> i64 {
        self.objective_max
    }

    pub fn set_objective_min(&mut self, value: i64) {
        self.objective_min = value;
    }

    pub fn set_objective_max(&mut self, value: i64) {
        self.objective_max = value;
    }
}

#[cfg(test)]
mod tests {
    use super::Assignment;
    use crate::engine::Solver;

    #[test]
    fn store_reads_the_current_values() {
        let mut solver = Solver::default();
        let x = solver.new_bounded_integer(0, 5);
        let y = solver.new_bounded_integer(0, 5);

        let mut assignment = Assignment::with_variables(&[x, y]);
        solver.set_value(x, 4).unwrap();
        solver.set_value(y, 2).unwrap();
        assignment.store(&solver);

        assert_eq!(assignment.value(x), 4);
        assert_eq!(assignment.value(y), 2);
    }

    #[test]
    fn objective_bounds_follow_the_stored_value() {
        let mut solver = Solver::default();
        let objective = solver.new_bounded_integer(0, 10);

        let mut assignment = Assignment::default();
        assignment.add_objective(objective);
        solver.set_value(objective, 7).unwrap();
        assignment.store(&solver);

        assert_eq!(assignment.objective_value(), 7);
        assert_eq!(assignment.objective_min(), 7);
        assert_eq!(assignment.objective_max(), 7);
    }
}
