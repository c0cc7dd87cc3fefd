mod assignments;
mod domain;
mod propagation;
mod search;
mod solver;
mod trailed;
mod variables;

pub use propagation::PropagationContext;
pub use propagation::Propagator;
pub use solver::ConstraintOperationError;
pub use solver::Solver;
pub use solver::SolverOptions;
pub use trailed::TrailedInt;
pub use variables::VarId;

pub(crate) use assignments::Assignments;
pub(crate) use domain::Domain;
pub(crate) use trailed::TrailedValues;

/// The outcome of taking a branch which turned out to be infeasible; unwinding to the nearest
/// choice point is driven by propagating this value upwards with `?`.
///
/// A [`SearchMonitor`](crate::search::SearchMonitor) rejects the current branch by returning
/// `Err(Failure)` from one of its fallible hooks; this is the only sanctioned way for a monitor
/// to prune the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Failure;

/// The result type threaded through every operation which can fail the current branch.
pub type SearchStatus = Result<(), Failure>;
