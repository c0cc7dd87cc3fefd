use super::ValueSelector;
use crate::engine::Solver;
use crate::engine::VarId;

/// Selects the upper bound of the domain.
#[derive(Debug, Copy, Clone)]
pub struct MaxValue;

impl ValueSelector for MaxValue {
    fn select_value(&mut self, solver: &mut Solver, variable: VarId, _id: usize) -> i64 {
        solver.upper_bound(variable)
    }
}
