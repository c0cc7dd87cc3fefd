use super::super::SearchMonitor;
use crate::branching::Decision;
use crate::branching::DecisionBuilder;
use crate::engine::SearchStatus;
use crate::engine::Solver;

const MAX_TIME_CHECK_SKIP: i64 = 100;
const TIME_CHECK_WARMUP_ITERATIONS: i64 = 100;

/// The usual limit on wall time, explored branches, failures, and solutions. Budgets are
/// measured relative to the counter values snapshotted when the search is entered; a budget of
/// `i64::MAX` is unlimited.
///
/// With `smart_time_check`, the clock is only consulted every few checks once the check rate has
/// been estimated, bounding the `Instant::now` overhead while still enforcing the budget.
#[derive(Debug, Clone)]
pub struct RegularLimit {
    wall_time_ms: i64,
    wall_time_offset: i64,
    check_count: i64,
    next_check: i64,
    smart_time_check: bool,
    branches: i64,
    branches_offset: i64,
    failures: i64,
    failures_offset: i64,
    solutions: i64,
    solutions_offset: i64,
    crossed: bool,
}

impl RegularLimit {
    pub fn new(wall_time_ms: i64, branches: i64, failures: i64, solutions: i64) -> RegularLimit {
        RegularLimit::with_smart_time_check(wall_time_ms, branches, failures, solutions, false)
    }

    pub fn with_smart_time_check(
        wall_time_ms: i64,
        branches: i64,
        failures: i64,
        solutions: i64,
        smart_time_check: bool,
    ) -> RegularLimit {
        RegularLimit {
            wall_time_ms,
            wall_time_offset: 0,
            check_count: 0,
            next_check: 0,
            smart_time_check,
            branches,
            branches_offset: 0,
            failures,
            failures_offset: 0,
            solutions,
            solutions_offset: 0,
            crossed: false,
        }
    }

    /// Replaces the budgets; offsets are untouched, so the new budgets still count from the last
    /// search entry.
    pub fn update_limits(
        &mut self,
        wall_time_ms: i64,
        branches: i64,
        failures: i64,
        solutions: i64,
    ) {
        self.wall_time_ms = wall_time_ms;
        self.branches = branches;
        self.failures = failures;
        self.solutions = solutions;
    }

    /// The wall-time budget in milliseconds.
    pub fn wall_time_budget_ms(&self) -> i64 {
        self.wall_time_ms
    }

    /// A copy of this limit with the same budgets and a fresh latch; nothing is shared between
    /// the two.
    pub fn make_clone(&self) -> RegularLimit {
        RegularLimit::with_smart_time_check(
            self.wall_time_ms,
            self.branches,
            self.failures,
            self.solutions,
            self.smart_time_check,
        )
    }

    pub fn crossed(&self) -> bool {
        self.crossed
    }

    /// Whether any budget is exceeded relative to the offsets snapshotted at search entry.
    pub fn check(&mut self, solver: &Solver) -> bool {
        // Budgets may be i64::MAX; compare against the counter delta rather than offset + budget.
        solver.branches() - self.branches_offset > self.branches
            || solver.failures() - self.failures_offset > self.failures
            || self.check_time(solver)
            || solver.solutions() - self.solutions_offset >= self.solutions
    }

    fn init(&mut self, solver: &Solver) {
        self.branches_offset = solver.branches();
        self.failures_offset = solver.failures();
        self.wall_time_offset = solver.wall_time_ms();
        self.check_count = 0;
        self.next_check = 0;
        self.solutions_offset = solver.solutions();
    }

    fn check_time(&mut self, solver: &Solver) -> bool {
        self.check_count += 1;
        if self.wall_time_ms == i64::MAX || self.next_check > self.check_count {
            return false;
        }
        let time_delta = solver.wall_time_ms() - self.wall_time_offset;
        if self.smart_time_check && self.check_count > TIME_CHECK_WARMUP_ITERATIONS && time_delta > 0
        {
            let approximate_calls = (self.wall_time_ms * self.check_count) / time_delta;
            self.next_check = self.check_count + approximate_calls.min(MAX_TIME_CHECK_SKIP);
        }
        time_delta > self.wall_time_ms
    }

    fn periodic_check(&mut self, solver: &mut Solver) -> SearchStatus {
        if self.crossed || self.check(solver) {
            self.crossed = true;
            return Err(solver.fail());
        }
        Ok(())
    }
}

impl SearchMonitor for RegularLimit {
    fn enter_search(&mut self, solver: &mut Solver) {
        self.crossed = false;
        self.init(solver);
    }

    fn begin_next_decision(
        &mut self,
        solver: &mut Solver,
        _builder: &dyn DecisionBuilder,
    ) -> SearchStatus {
        self.periodic_check(solver)
    }

    fn refute_decision(&mut self, solver: &mut Solver, _decision: &Decision) -> SearchStatus {
        self.periodic_check(solver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budgets_count_from_the_search_entry_snapshot() {
        let mut solver = Solver::default();
        solver.counters.branches = 10;
        solver.counters.failures = 20;

        let mut limit = RegularLimit::new(i64::MAX, 5, 5, i64::MAX);
        limit.enter_search(&mut solver);
        assert!(!limit.check(&solver));

        solver.counters.branches = 15;
        assert!(!limit.check(&solver));
        solver.counters.branches = 16;
        assert!(limit.check(&solver));
    }

    #[test]
    fn the_solutions_budget_is_inclusive() {
        let mut solver = Solver::default();
        let mut limit = RegularLimit::new(i64::MAX, i64::MAX, i64::MAX, 2);
        limit.enter_search(&mut solver);

        solver.counters.solutions = 1;
        assert!(!limit.check(&solver));
        solver.counters.solutions = 2;
        assert!(limit.check(&solver));
    }

    #[test]
    fn a_crossed_limit_latches_until_the_next_search() {
        let mut solver = Solver::default();
        let mut limit = RegularLimit::new(i64::MAX, 0, i64::MAX, i64::MAX);
        limit.enter_search(&mut solver);

        solver.counters.branches = 1;
        assert!(limit.periodic_check(&mut solver).is_err());
        assert!(limit.crossed());

        // Still failing even when the counters no longer exceed the budget.
        solver.counters.branches = 0;
        assert!(limit.periodic_check(&mut solver).is_err());

        limit.enter_search(&mut solver);
        assert!(!limit.crossed());
        assert!(limit.periodic_check(&mut solver).is_ok());
    }

    #[test]
    fn updated_budgets_keep_the_entry_offsets() {
        let mut solver = Solver::default();
        solver.counters.branches = 100;
        let mut limit = RegularLimit::new(i64::MAX, i64::MAX, i64::MAX, i64::MAX);
        limit.enter_search(&mut solver);

        limit.update_limits(i64::MAX, 10, i64::MAX, i64::MAX);
        solver.counters.branches = 110;
        assert!(!limit.check(&solver));
        solver.counters.branches = 111;
        assert!(limit.check(&solver));
    }
}
