use super::Decision;
use super::DecisionBuilder;
use crate::engine::Failure;
use crate::engine::Solver;
use crate::search::SearchMonitor;

/// Runs a nested search with its own monitors as a single atomic step of the enclosing search.
/// When the nested search fails, the failure propagates to the enclosing search; otherwise the
/// nested solution state is kept and the builder reports completion.
pub struct SolveOnce {
    builder: Box<dyn DecisionBuilder>,
    monitors: Vec<Box<dyn SearchMonitor>>,
}

impl std::fmt::Debug for SolveOnce {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolveOnce")
            .field("builder", &self.builder)
            .finish()
    }
}

impl SolveOnce {
    pub fn new(builder: Box<dyn DecisionBuilder>) -> SolveOnce {
        SolveOnce {
            builder,
            monitors: Vec::new(),
        }
    }

    pub fn with_monitors(
        builder: Box<dyn DecisionBuilder>,
        monitors: Vec<Box<dyn SearchMonitor>>,
    ) -> SolveOnce {
        SolveOnce { builder, monitors }
    }
}

impl DecisionBuilder for SolveOnce {
    fn next(&mut self, solver: &mut Solver) -> Result<Option<Decision>, Failure> {
        let mut monitor_refs: Vec<&mut dyn SearchMonitor> = Vec::with_capacity(self.monitors.len());
        for monitor in self.monitors.iter_mut() {
            monitor_refs.push(monitor.as_mut());
        }
        if solver.nested_solve(self.builder.as_mut(), &mut monitor_refs) {
            Ok(None)
        } else {
            Err(Failure)
        }
    }
}
