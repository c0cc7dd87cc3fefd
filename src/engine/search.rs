use super::Solver;
use crate::branching::Decision;
use crate::branching::DecisionBuilder;
use crate::search::SearchMonitor;

/// One open node of the depth-first search: the decision taken at it and the decision level of
/// its parent, to which the solver backtracks before refuting.
struct SearchNode {
    parent_level: usize,
    decision: Decision,
}

enum Step {
    /// Extend the current branch with the next decision.
    Extend,
    /// Recover from a failure: restart or backtrack and refute.
    Recover,
}

impl Solver {
    /// Runs a depth-first search driven by `builder`, dispatching every lifecycle event to the
    /// `monitors` in registration order. Returns whether at least one solution was accepted. The
    /// solver state is restored to the pre-search state on exit.
    pub fn solve(
        &mut self,
        builder: &mut dyn DecisionBuilder,
        monitors: &mut [&mut dyn SearchMonitor],
    ) -> bool {
        self.run_search(builder, monitors, false)
    }

    /// Runs a nested search as a single step of the enclosing search: it stops at the first
    /// accepted solution and, contrary to [`Solver::solve`], keeps the solution state applied.
    /// When no solution is found the state is restored and false is returned.
    pub fn nested_solve(
        &mut self,
        builder: &mut dyn DecisionBuilder,
        monitors: &mut [&mut dyn SearchMonitor],
    ) -> bool {
        self.run_search(builder, monitors, true)
    }

    fn run_search(
        &mut self,
        builder: &mut dyn DecisionBuilder,
        monitors: &mut [&mut dyn SearchMonitor],
        stop_at_first_solution: bool,
    ) -> bool {
        self.solve_depth += 1;
        let root_level = self.decision_level();
        let entry_search_depth = self.search_depth;

        for monitor in monitors.iter_mut() {
            monitor.enter_search(self);
        }

        // The sentinel level of this search; everything below it (initial propagation included)
        // is undone when the search is exited.
        self.push_decision_level();
        let base_level = self.decision_level();

        for monitor in monitors.iter_mut() {
            monitor.begin_initial_propagation(self);
        }
        let initially_consistent = self.propagate().is_ok();
        for monitor in monitors.iter_mut() {
            monitor.end_initial_propagation(self);
        }

        let mut stack: Vec<SearchNode> = Vec::new();
        let mut found_solution = false;
        let mut exhausted = false;
        let mut keep_state = false;

        let mut step = if initially_consistent {
            Step::Extend
        } else {
            self.register_failure(monitors);
            Step::Recover
        };

        'search: loop {
            match step {
                Step::Extend => {
                    if self.dispatch_begin_next_decision(monitors, builder).is_err() {
                        self.register_failure(monitors);
                        step = Step::Recover;
                        continue 'search;
                    }
                    let next = match builder.next(self) {
                        Ok(next) => next,
                        Err(_) => {
                            self.register_failure(monitors);
                            step = Step::Recover;
                            continue 'search;
                        }
                    };
                    if self
                        .dispatch_end_next_decision(monitors, builder, next.as_ref())
                        .is_err()
                    {
                        self.register_failure(monitors);
                        step = Step::Recover;
                        continue 'search;
                    }
                    match next {
                        None => {
                            // A leaf: every registered monitor gets a veto on the candidate.
                            let mut accepted = true;
                            for monitor in monitors.iter_mut() {
                                accepted &= monitor.accept_solution(self);
                            }
                            if !accepted {
                                self.register_failure(monitors);
                                step = Step::Recover;
                                continue 'search;
                            }
                            self.counters.solutions += 1;
                            found_solution = true;
                            let mut continue_search = false;
                            for monitor in monitors.iter_mut() {
                                continue_search |= monitor.at_solution(self);
                            }
                            if stop_at_first_solution {
                                keep_state = true;
                                break 'search;
                            }
                            if continue_search {
                                self.register_failure(monitors);
                                step = Step::Recover;
                            } else {
                                break 'search;
                            }
                        }
                        Some(decision) => {
                            let parent_level = self.decision_level();
                            self.push_decision_level();
                            self.search_depth += 1;
                            self.counters.branches += 1;
                            stack.push(SearchNode {
                                parent_level,
                                decision,
                            });
                            let decision = &stack.last().expect("just pushed").decision;
                            let applied = (|| {
                                self.dispatch_apply_decision(monitors, decision)?;
                                decision.apply(self)?;
                                self.propagate()
                            })();
                            if applied.is_err() {
                                self.register_failure(monitors);
                                step = Step::Recover;
                            }
                        }
                    }
                }
                Step::Recover => {
                    if self.take_restart_request() {
                        // A failure with no open choice point exhausts the search; restarting
                        // would replay the identical root state forever.
                        if stack.is_empty() {
                            exhausted = true;
                            break 'search;
                        }
                        if self.decision_level() > base_level {
                            self.backtrack_to(base_level);
                        }
                        stack.clear();
                        self.search_depth = entry_search_depth;
                        let restarted = (|| {
                            self.dispatch_restart_search(monitors)?;
                            self.propagate()
                        })();
                        if restarted.is_ok() {
                            step = Step::Extend;
                        } else {
                            exhausted = true;
                            break 'search;
                        }
                        continue 'search;
                    }
                    match stack.pop() {
                        None => {
                            exhausted = true;
                            break 'search;
                        }
                        Some(node) => {
                            self.backtrack_to(node.parent_level);
                            self.search_depth -= 1;
                            self.counters.branches += 1;
                            let refuted = (|| {
                                self.dispatch_refute_decision(monitors, &node.decision)?;
                                node.decision.refute(self)?;
                                self.propagate()
                            })();
                            match refuted {
                                Ok(()) => step = Step::Extend,
                                Err(_) => self.register_failure(monitors),
                            }
                        }
                    }
                }
            }
        }

        if exhausted {
            for monitor in monitors.iter_mut() {
                monitor.no_more_solutions(self);
            }
        }
        if !keep_state && self.decision_level() > root_level {
            self.backtrack_to(root_level);
        }
        self.search_depth = entry_search_depth;
        for monitor in monitors.iter_mut() {
            monitor.exit_search(self);
        }
        self.solve_depth -= 1;
        found_solution
    }

    fn register_failure(&mut self, monitors: &mut [&mut dyn SearchMonitor]) {
        self.counters.failures += 1;
        for monitor in monitors.iter_mut() {
            monitor.begin_fail(self);
        }
        for monitor in monitors.iter_mut() {
            monitor.end_fail(self);
        }
    }

    fn dispatch_begin_next_decision(
        &mut self,
        monitors: &mut [&mut dyn SearchMonitor],
        builder: &mut dyn DecisionBuilder,
    ) -> crate::engine::SearchStatus {
        for monitor in monitors.iter_mut() {
            monitor.begin_next_decision(self, &*builder)?;
        }
        Ok(())
    }

    fn dispatch_end_next_decision(
        &mut self,
        monitors: &mut [&mut dyn SearchMonitor],
        builder: &mut dyn DecisionBuilder,
        decision: Option<&Decision>,
    ) -> crate::engine::SearchStatus {
        for monitor in monitors.iter_mut() {
            monitor.end_next_decision(self, &*builder, decision)?;
        }
        Ok(())
    }

    fn dispatch_apply_decision(
        &mut self,
        monitors: &mut [&mut dyn SearchMonitor],
        decision: &Decision,
    ) -> crate::engine::SearchStatus {
        for monitor in monitors.iter_mut() {
            monitor.apply_decision(self, decision)?;
        }
        Ok(())
    }

    fn dispatch_refute_decision(
        &mut self,
        monitors: &mut [&mut dyn SearchMonitor],
        decision: &Decision,
    ) -> crate::engine::SearchStatus {
        for monitor in monitors.iter_mut() {
            monitor.refute_decision(self, decision)?;
        }
        Ok(())
    }

    fn dispatch_restart_search(
        &mut self,
        monitors: &mut [&mut dyn SearchMonitor],
    ) -> crate::engine::SearchStatus {
        for monitor in monitors.iter_mut() {
            monitor.restart_search(self)?;
        }
        Ok(())
    }
}
