use crate::basic_types::Assignment;
use crate::branching::Decision;
use crate::branching::DecisionBuilder;
use crate::engine::SearchStatus;
use crate::engine::Solver;

/// An observer of the search lifecycle. Monitors are registered with a solve and receive every
/// hook in registration order; they may influence the search by posting constraints, tightening
/// domains, requesting a restart, or failing the current branch (by returning `Err` from one of
/// the fallible hooks).
///
/// Hooks which are only meaningful inside the search tree (`Err`-returning ones) must not be used
/// to fail from [`SearchMonitor::enter_search`] or [`SearchMonitor::exit_search`]; there is no
/// branch to reject there.
#[allow(unused_variables)]
pub trait SearchMonitor {
    /// Called once before the initial propagation when a search starts.
    fn enter_search(&mut self, solver: &mut Solver) {}

    /// Called when the search restarts from its root.
    fn restart_search(&mut self, solver: &mut Solver) -> SearchStatus {
        Ok(())
    }

    /// Called once when the search ends.
    fn exit_search(&mut self, solver: &mut Solver) {}

    /// Called before the decision builder is asked for the next decision.
    fn begin_next_decision(
        &mut self,
        solver: &mut Solver,
        builder: &dyn DecisionBuilder,
    ) -> SearchStatus {
        Ok(())
    }

    /// Called after the decision builder produced `decision` (or none, meaning a leaf).
    fn end_next_decision(
        &mut self,
        solver: &mut Solver,
        builder: &dyn DecisionBuilder,
        decision: Option<&Decision>,
    ) -> SearchStatus {
        Ok(())
    }

    /// Called before `decision` is applied.
    fn apply_decision(&mut self, solver: &mut Solver, decision: &Decision) -> SearchStatus {
        Ok(())
    }

    /// Called before `decision` is refuted.
    fn refute_decision(&mut self, solver: &mut Solver, decision: &Decision) -> SearchStatus {
        Ok(())
    }

    /// Called when a failure starts being processed.
    fn begin_fail(&mut self, solver: &mut Solver) {}

    /// Called when the failure processing is finished.
    fn end_fail(&mut self, solver: &mut Solver) {}

    /// Called before the initial propagation at the search root.
    fn begin_initial_propagation(&mut self, solver: &mut Solver) {}

    /// Called after the initial propagation at the search root.
    fn end_initial_propagation(&mut self, solver: &mut Solver) {}

    /// Decides whether the candidate solution is acceptable; the solution is rejected if any
    /// monitor returns false.
    fn accept_solution(&mut self, solver: &mut Solver) -> bool {
        true
    }

    /// Called on every accepted solution; the search continues looking for further solutions if
    /// any monitor returns true.
    fn at_solution(&mut self, solver: &mut Solver) -> bool {
        false
    }

    /// Called when the search tree is exhausted.
    fn no_more_solutions(&mut self, solver: &mut Solver) {}

    /// Called by a local-search driver when the neighborhood produced no improving neighbor;
    /// returning true asks the driver to keep going.
    fn local_optimum(&mut self, solver: &mut Solver) -> bool {
        false
    }

    /// Called by a local-search driver to filter a neighbor delta; returning false discards the
    /// neighbor. `delta` carries the changed variables and may have its objective bounds
    /// tightened by the monitor.
    fn accept_delta(
        &mut self,
        solver: &mut Solver,
        delta: &mut Assignment,
        deltadelta: &Assignment,
    ) -> bool {
        true
    }

    /// Called by a local-search driver when a neighbor has been accepted.
    fn accept_neighbor(&mut self, solver: &mut Solver) {}
}
