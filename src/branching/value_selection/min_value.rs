use super::ValueSelector;
use crate::engine::Solver;
use crate::engine::VarId;

/// Selects the lower bound of the domain.
#[derive(Debug, Copy, Clone)]
pub struct MinValue;

impl ValueSelector for MinValue {
    fn select_value(&mut self, solver: &mut Solver, variable: VarId, _id: usize) -> i64 {
        solver.lower_bound(variable)
    }
}
