//! Search monitors: observers of the search lifecycle which log progress, collect solutions,
//! tighten the objective, enforce limits, schedule restarts, and break symmetries.

pub mod collectors;
pub mod limits;
pub mod restart;
mod search_log;
mod search_monitor;
mod search_trace;
mod optimize_var;
mod symmetry;

pub use optimize_var::OptimizeVar;
pub use search_log::SearchLog;
pub use search_monitor::SearchMonitor;
pub use search_trace::SearchTrace;
pub use symmetry::SymmetryBreaker;
pub use symmetry::SymmetryContext;
pub use symmetry::SymmetryManager;
