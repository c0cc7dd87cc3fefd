//! # Gourd
//! The search-control core of a finite-domain constraint programming solver: tree search over
//! integer decision variables, composable branching strategies, a polymorphic search-monitor
//! protocol, solution collection, objective management, metaheuristics (tabu search, simulated
//! annealing, guided local search), search limits, restart policies, and symmetry breaking
//! during search.
//!
//! # Example
//!
//! ```rust
//! use gourd_solver::basic_types::Assignment;
//! use gourd_solver::branching::IntValueStrategy;
//! use gourd_solver::branching::IntVarStrategy;
//! use gourd_solver::branching::Phase;
//! use gourd_solver::search::collectors::LastSolutionCollector;
//! use gourd_solver::search::OptimizeVar;
//! use gourd_solver::search::SearchMonitor;
//! use gourd_solver::Solver;
//!
//! // Minimize x + y over two small domains.
//! let mut solver = Solver::default();
//! let x = solver.new_bounded_integer(0, 5);
//! let y = solver.new_bounded_integer(0, 5);
//! let objective = solver.make_sum(&[x, y]);
//!
//! let mut phase = Phase::new(
//!     &mut solver,
//!     &[x, y],
//!     IntVarStrategy::ChooseFirstUnbound,
//!     IntValueStrategy::AssignMinValue,
//! );
//! let mut optimize = OptimizeVar::minimize(objective, 1);
//! let mut prototype = Assignment::with_variables(&[x, y]);
//! prototype.add_objective(objective);
//! let mut collector = LastSolutionCollector::new(prototype);
//!
//! let mut monitors: Vec<&mut dyn SearchMonitor> = vec![&mut optimize, &mut collector];
//! assert!(solver.solve(&mut phase, &mut monitors));
//! assert_eq!(collector.objective_value(0), 0);
//! ```

pub mod basic_types;
pub mod branching;
pub mod containers;
pub mod engine;
#[doc(hidden)]
pub mod gourd_asserts;
pub mod metaheuristics;
pub mod search;

pub use engine::ConstraintOperationError;
pub use engine::Failure;
pub use engine::SearchStatus;
pub use engine::Solver;
pub use engine::SolverOptions;
pub use engine::VarId;
