use log::info;

use super::SearchMonitor;
use crate::basic_types::Assignment;
use crate::branching::Decision;
use crate::branching::DecisionBuilder;
use crate::engine::SearchStatus;
use crate::engine::Solver;

/// Logs every lifecycle event with a user-chosen prefix; meant for debugging search strategies.
#[derive(Debug)]
pub struct SearchTrace {
    prefix: String,
}

impl SearchTrace {
    pub fn new(prefix: impl Into<String>) -> SearchTrace {
        SearchTrace {
            prefix: prefix.into(),
        }
    }
}

impl SearchMonitor for SearchTrace {
    fn enter_search(&mut self, solver: &mut Solver) {
        info!("{} EnterSearch({})", self.prefix, solver.solve_depth());
    }

    fn restart_search(&mut self, solver: &mut Solver) -> SearchStatus {
        info!("{} RestartSearch({})", self.prefix, solver.solve_depth());
        Ok(())
    }

    fn exit_search(&mut self, solver: &mut Solver) {
        info!("{} ExitSearch({})", self.prefix, solver.solve_depth());
    }

    fn begin_next_decision(
        &mut self,
        _solver: &mut Solver,
        builder: &dyn DecisionBuilder,
    ) -> SearchStatus {
        info!("{} BeginNextDecision({builder:?})", self.prefix);
        Ok(())
    }

    fn end_next_decision(
        &mut self,
        _solver: &mut Solver,
        builder: &dyn DecisionBuilder,
        decision: Option<&Decision>,
    ) -> SearchStatus {
        match decision {
            Some(decision) => info!("{} EndNextDecision({builder:?}, {decision})", self.prefix),
            None => info!("{} EndNextDecision({builder:?})", self.prefix),
        }
        Ok(())
    }

    fn apply_decision(&mut self, _solver: &mut Solver, decision: &Decision) -> SearchStatus {
        info!("{} ApplyDecision({decision})", self.prefix);
        Ok(())
    }

    fn refute_decision(&mut self, _solver: &mut Solver, decision: &Decision) -> SearchStatus {
        info!("{} RefuteDecision({decision})", self.prefix);
        Ok(())
    }

    fn begin_fail(&mut self, solver: &mut Solver) {
        info!("{} BeginFail({})", self.prefix, solver.search_depth());
    }

    fn end_fail(&mut self, solver: &mut Solver) {
        info!("{} EndFail({})", self.prefix, solver.search_depth());
    }

    fn begin_initial_propagation(&mut self, _solver: &mut Solver) {
        info!("{} BeginInitialPropagation()", self.prefix);
    }

    fn end_initial_propagation(&mut self, _solver: &mut Solver) {
        info!("{} EndInitialPropagation()", self.prefix);
    }

    fn at_solution(&mut self, _solver: &mut Solver) -> bool {
        info!("{} AtSolution()", self.prefix);
        false
    }

    fn accept_solution(&mut self, _solver: &mut Solver) -> bool {
        info!("{} AcceptSolution()", self.prefix);
        true
    }

    fn no_more_solutions(&mut self, _solver: &mut Solver) {
        info!("{} NoMoreSolutions()", self.prefix);
    }

    fn local_optimum(&mut self, _solver: &mut Solver) -> bool {
        info!("{} LocalOptimum()", self.prefix);
        false
    }

    fn accept_delta(
        &mut self,
        _solver: &mut Solver,
        _delta: &mut Assignment,
        _deltadelta: &Assignment,
    ) -> bool {
        info!("{} AcceptDelta()", self.prefix);
        true
    }

    fn accept_neighbor(&mut self, _solver: &mut Solver) {
        info!("{} AcceptNeighbor()", self.prefix);
    }
}
