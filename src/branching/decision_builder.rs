use super::Decision;
use crate::basic_types::Assignment;
use crate::engine::Failure;
use crate::engine::Solver;
use crate::engine::TrailedInt;
use crate::engine::VarId;

/// A source of [`Decision`]s which also decides when its part of the search is complete by
/// returning `Ok(None)`. Returning `Err` fails the current branch (used by nested solves).
pub trait DecisionBuilder: std::fmt::Debug {
    fn next(&mut self, solver: &mut Solver) -> Result<Option<Decision>, Failure>;
}

/// Drives a list of builders sequentially: each child is driven to completion before the next one
/// is consulted. The cursor is reversible, so a child which was exhausted at some node stays
/// exhausted for all descendants of that node while re-entry after backtracking resumes at the
/// earlier child.
pub struct Compose {
    builders: Vec<Box<dyn DecisionBuilder>>,
    start_index: TrailedInt,
}

impl std::fmt::Debug for Compose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compose")
            .field("builders", &self.builders)
            .finish()
    }
}

impl Compose {
    pub fn new(solver: &mut Solver, builders: Vec<Box<dyn DecisionBuilder>>) -> Compose {
        Compose {
            builders,
            start_index: solver.new_trailed_int(0),
        }
    }
}

impl DecisionBuilder for Compose {
    fn next(&mut self, solver: &mut Solver) -> Result<Option<Decision>, Failure> {
        let start = solver.trailed_read(self.start_index) as usize;
        for index in start..self.builders.len() {
            if let Some(decision) = self.builders[index].next(solver)? {
                solver.trailed_assign(self.start_index, index as i64);
                return Ok(Some(decision));
            }
        }
        solver.trailed_assign(self.start_index, self.builders.len() as i64);
        Ok(None)
    }
}

/// Replays the values a previous [`Assignment`] recorded for the listed variables, one decision
/// per variable, and then delegates to the chained builder.
pub struct AssignVariablesFromAssignment {
    assignment: Assignment,
    builder: Box<dyn DecisionBuilder>,
    variables: Vec<VarId>,
    iterator: usize,
}

impl std::fmt::Debug for AssignVariablesFromAssignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssignVariablesFromAssignment").finish()
    }
}

impl AssignVariablesFromAssignment {
    pub fn new(
        assignment: Assignment,
        builder: Box<dyn DecisionBuilder>,
        variables: &[VarId],
    ) -> AssignVariablesFromAssignment {
        AssignVariablesFromAssignment {
            assignment,
            builder,
            variables: variables.to_vec(),
            iterator: 0,
        }
    }
}

impl DecisionBuilder for AssignVariablesFromAssignment {
    fn next(&mut self, solver: &mut Solver) -> Result<Option<Decision>, Failure> {
        if self.iterator < self.variables.len() {
            let variable = self.variables[self.iterator];
            self.iterator += 1;
            Ok(Some(Decision::assign(
                variable,
                self.assignment.value(variable),
            )))
        } else {
            self.builder.next(solver)
        }
    }
}
