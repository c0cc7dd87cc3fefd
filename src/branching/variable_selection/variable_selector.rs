use crate::engine::Solver;
use crate::engine::VarId;

/// Picks the next unfixed variable to branch on, together with its index in the selector's
/// variable array.
///
/// Selectors never fail: when no unfixed variable remains they return [`None`] and the enclosing
/// decision builder treats its work as complete. Any cursor state a selector keeps inside the
/// search tree must be reversible (registered through
/// [`Solver::new_trailed_int`](crate::Solver::new_trailed_int)) so that backtracking restores it.
pub trait VariableSelector: std::fmt::Debug {
    fn select_variable(&mut self, solver: &mut Solver) -> Option<(VarId, usize)>;
}
