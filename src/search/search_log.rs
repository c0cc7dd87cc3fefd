use log::info;

use super::SearchMonitor;
use crate::basic_types::Stopwatch;
use crate::branching::Decision;
use crate::engine::SearchStatus;
use crate::engine::Solver;
use crate::engine::VarId;

const KILOBYTE: i64 = 1024;
const MEGABYTE: i64 = KILOBYTE * KILOBYTE;
const GIGABYTE: i64 = MEGABYTE * KILOBYTE;
const DISPLAY_THRESHOLD: i64 = 2;

/// Emits a progress line every `period` branches plus structured lines when the search starts,
/// finds a solution, finishes its tree, and exits. Tracks the solution count, the objective
/// range over the solutions seen, and several depth statistics: the sliding minimum/maximum
/// depth between periodic lines, the minimum depth at which a refutation happened (a proxy for
/// the proof depth), and the maximum depth reached.
pub struct SearchLog {
    period: i64,
    timer: Stopwatch,
    objective: Option<VarId>,
    display_callback: Option<Box<dyn Fn() -> String>>,
    solution_count: i64,
    tick: i64,
    objective_min: i64,
    objective_max: i64,
    min_right_depth: i64,
    max_depth: i64,
    sliding_min_depth: i64,
    sliding_max_depth: i64,
}

impl std::fmt::Debug for SearchLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchLog")
            .field("period", &self.period)
            .finish()
    }
}

impl SearchLog {
    pub fn new(period: i64) -> SearchLog {
        SearchLog {
            period,
            timer: Stopwatch::starting_now(),
            objective: None,
            display_callback: None,
            solution_count: 0,
            tick: 0,
            objective_min: i64::MAX,
            objective_max: i64::MIN,
            min_right_depth: i64::MAX,
            max_depth: 0,
            sliding_min_depth: 0,
            sliding_max_depth: 0,
        }
    }

    /// Additionally report the value and running extrema of `objective` at each solution.
    pub fn with_objective(period: i64, objective: VarId) -> SearchLog {
        SearchLog {
            objective: Some(objective),
            ..SearchLog::new(period)
        }
    }

    /// Appends the callback's text to each solution line. The callback may be invoked once per
    /// solution and must be repeatable.
    pub fn with_display_callback(
        period: i64,
        objective: Option<VarId>,
        display_callback: Box<dyn Fn() -> String>,
    ) -> SearchLog {
        SearchLog {
            objective,
            display_callback: Some(display_callback),
            ..SearchLog::new(period)
        }
    }

    fn maintain(&mut self, solver: &Solver) {
        let current_depth = solver.search_depth() as i64;
        self.sliding_min_depth = self.sliding_min_depth.min(current_depth);
        self.sliding_max_depth = self.sliding_max_depth.max(current_depth);
        self.max_depth = self.max_depth.max(current_depth);
    }

    fn output_line(&self, line: &str) {
        info!("{line}");
    }

    fn output_decision(&mut self, solver: &Solver) {
        let mut buffer = format!(
            "{} branches, {} ms, {} failures",
            solver.branches(),
            self.timer.elapsed_ms(),
            solver.failures()
        );
        if self.min_right_depth != i64::MAX && self.max_depth != 0 {
            let depth = solver.search_depth() as i64;
            buffer.push_str(&format!(
                ", tree pos={}/{}/{} minref={} max={}",
                self.sliding_min_depth,
                depth,
                self.sliding_max_depth,
                self.min_right_depth,
                self.max_depth
            ));
            self.sliding_min_depth = depth;
            self.sliding_max_depth = depth;
        }
        if self.objective.is_some() && self.objective_min != i64::MAX && self.objective_max != i64::MIN
        {
            buffer.push_str(&format!(
                ", objective minimum = {}, objective maximum = {}",
                self.objective_min, self.objective_max
            ));
        }
        self.output_line(&buffer);
    }

    fn memory_usage(solver: &Solver) -> String {
        let memory_usage = solver.memory_usage();
        if memory_usage > DISPLAY_THRESHOLD * GIGABYTE {
            format!("memory used = {:.2} GB", memory_usage as f64 / GIGABYTE as f64)
        } else if memory_usage > DISPLAY_THRESHOLD * MEGABYTE {
            format!("memory used = {:.2} MB", memory_usage as f64 / MEGABYTE as f64)
        } else if memory_usage > DISPLAY_THRESHOLD * KILOBYTE {
            format!("memory used = {:.2} KB", memory_usage as f64 / KILOBYTE as f64)
        } else {
            format!("memory used = {memory_usage}")
        }
    }
}

impl SearchMonitor for SearchLog {
    fn enter_search(&mut self, solver: &mut Solver) {
        self.output_line(&format!("Start search, {}", Self::memory_usage(solver)));
        self.timer.reset();
        self.min_right_depth = i64::MAX;
    }

    fn exit_search(&mut self, solver: &mut Solver) {
        self.output_line(&format!(
            "End search (time = {} ms, branches = {}, failures = {}, {})",
            self.timer.elapsed_ms(),
            solver.branches(),
            solver.failures(),
            Self::memory_usage(solver)
        ));
    }

    fn at_solution(&mut self, solver: &mut Solver) -> bool {
        self.maintain(solver);
        let depth = solver.search_depth();
        let mut objective_part = String::new();
        if let Some(objective) = self.objective {
            let current = solver.value(objective);
            objective_part = format!("objective value = {current}, ");
            if current >= self.objective_min {
                objective_part.push_str(&format!(
                    "objective minimum = {}, ",
                    self.objective_min
                ));
            } else {
                self.objective_min = current;
            }
            if current <= self.objective_max {
                objective_part.push_str(&format!(
                    "objective maximum = {}, ",
                    self.objective_max
                ));
            } else {
                self.objective_max = current;
            }
        }
        let line = format!(
            "Solution #{} ({}time = {} ms, branches = {}, failures = {}, depth = {}, {})",
            self.solution_count,
            objective_part,
            self.timer.elapsed_ms(),
            solver.branches(),
            solver.failures(),
            depth,
            Self::memory_usage(solver)
        );
        self.solution_count += 1;
        self.output_line(&line);
        if let Some(display_callback) = &self.display_callback {
            self.output_line(&display_callback());
        }
        false
    }

    fn begin_fail(&mut self, solver: &mut Solver) {
        self.maintain(solver);
    }

    fn no_more_solutions(&mut self, solver: &mut Solver) {
        self.output_line(&format!(
            "Finished search tree, time = {} ms, branches = {}, failures = {}, {}",
            self.timer.elapsed_ms(),
            solver.branches(),
            solver.failures(),
            Self::memory_usage(solver)
        ));
    }

    fn apply_decision(&mut self, solver: &mut Solver, _decision: &Decision) -> SearchStatus {
        self.maintain(solver);
        let branches = solver.branches();
        if self.period > 0 && branches > 0 && branches % self.period == 0 {
            self.output_decision(solver);
        }
        Ok(())
    }

    fn refute_decision(&mut self, solver: &mut Solver, decision: &Decision) -> SearchStatus {
        self.min_right_depth = self.min_right_depth.min(solver.search_depth() as i64);
        self.apply_decision(solver, decision)
    }

    fn begin_initial_propagation(&mut self, _solver: &mut Solver) {
        self.tick = self.timer.elapsed_ms();
    }

    fn end_initial_propagation(&mut self, solver: &mut Solver) {
        let delta = (self.timer.elapsed_ms() - self.tick).max(0);
        self.output_line(&format!(
            "Root node processed (time = {} ms, constraints = {}, {})",
            delta,
            solver.constraints(),
            Self::memory_usage(solver)
        ));
    }
}
