use crate::engine::Failure;
use crate::engine::SearchStatus;
use crate::engine::Solver;
use crate::engine::VarId;

/// A visitor over the set-variable-value effects of a [`Decision`]; used by symmetry breakers to
/// observe what the search committed to without inspecting the variant structure.
pub trait DecisionInspector {
    fn visit_set_variable_value(&mut self, variable: VarId, value: i64);
}

/// An atomic, reversible commitment at a search-tree node. Applying a decision takes the left
/// branch; refuting it takes the right branch once the left branch is exhausted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Assign the variable to the value; the refutation removes the value.
    Assign { variable: VarId, value: i64 },
    /// Assign the variable to the value; the refutation fails immediately.
    AssignOrFail { variable: VarId, value: i64 },
    /// Assign every listed variable to the paired value; the refutation posts that at least one
    /// of them differs.
    AssignAll {
        variables: Vec<VarId>,
        values: Vec<i64>,
    },
    /// The distinguished re-balancing decision of local-search drivers; applying or refuting it
    /// does nothing.
    Balance,
}

impl Decision {
    pub fn assign(variable: VarId, value: i64) -> Decision {
        Decision::Assign { variable, value }
    }

    pub fn assign_or_fail(variable: VarId, value: i64) -> Decision {
        Decision::AssignOrFail { variable, value }
    }

    pub fn assign_all(variables: Vec<VarId>, values: Vec<i64>) -> Decision {
        assert_eq!(
            variables.len(),
            values.len(),
            "assign_all requires one value per variable"
        );
        Decision::AssignAll { variables, values }
    }

    pub fn is_balancing(&self) -> bool {
        matches!(self, Decision::Balance)
    }

    pub fn apply(&self, solver: &mut Solver) -> SearchStatus {
        match self {
            Decision::Assign { variable, value }
            | Decision::AssignOrFail { variable, value } => solver.set_value(*variable, *value),
            Decision::AssignAll { variables, values } => {
                for (&variable, &value) in variables.iter().zip(values) {
                    solver.set_value(variable, value)?;
                }
                Ok(())
            }
            Decision::Balance => Ok(()),
        }
    }

    pub fn refute(&self, solver: &mut Solver) -> SearchStatus {
        match self {
            Decision::Assign { variable, value } => solver.remove_value(*variable, *value),
            Decision::AssignOrFail { .. } => Err(Failure),
            Decision::AssignAll { variables, values } => {
                let mut terms = Vec::with_capacity(variables.len());
                for (&variable, &value) in variables.iter().zip(values) {
                    let term = solver.new_bool_var();
                    solver.add_is_different_constant(variable, value, term);
                    terms.push(term);
                }
                solver.add_sum_greater_or_equal(&terms, 1);
                Ok(())
            }
            Decision::Balance => Ok(()),
        }
    }

    pub fn accept(&self, inspector: &mut dyn DecisionInspector) {
        match self {
            Decision::Assign { variable, value }
            | Decision::AssignOrFail { variable, value } => {
                inspector.visit_set_variable_value(*variable, *value)
            }
            Decision::AssignAll { variables, values } => {
                for (&variable, &value) in variables.iter().zip(values) {
                    inspector.visit_set_variable_value(variable, value);
                }
            }
            Decision::Balance => {}
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decision::Assign { variable, value }
            | Decision::AssignOrFail { variable, value } => write!(f, "[{variable} == {value}]"),
            Decision::AssignAll { variables, values } => {
                for (variable, value) in variables.iter().zip(values) {
                    write!(f, "[{variable} == {value}]")?;
                }
                Ok(())
            }
            Decision::Balance => write!(f, "[balance]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Decision;
    use crate::engine::Solver;

    #[test]
    fn applying_an_assignment_fixes_the_variable() {
        let mut solver = Solver::default();
        let variable = solver.new_bounded_integer(0, 5);
        Decision::assign(variable, 3).apply(&mut solver).unwrap();
        assert_eq!(solver.value(variable), 3);
    }

    #[test]
    fn refuting_an_assignment_removes_the_value() {
        let mut solver = Solver::default();
        let variable = solver.new_bounded_integer(0, 5);
        Decision::assign(variable, 3).refute(&mut solver).unwrap();
        assert!(!solver.contains(variable, 3));
    }

    #[test]
    fn refuting_assign_or_fail_fails() {
        let mut solver = Solver::default();
        let variable = solver.new_bounded_integer(0, 5);
        assert!(Decision::assign_or_fail(variable, 3)
            .refute(&mut solver)
            .is_err());
    }

    #[test]
    fn refuting_a_tuple_assignment_forces_a_difference() {
        let mut solver = Solver::default();
        let x = solver.new_bounded_integer(0, 1);
        let y = solver.new_bounded_integer(0, 1);
        Decision::assign_all(vec![x, y], vec![0, 0])
            .refute(&mut solver)
            .unwrap();
        solver.set_value(x, 0).unwrap();
        solver.propagate().unwrap();
        // With x fixed to 0, y must differ from its refuted value.
        assert_eq!(solver.value(y), 1);
    }
}
