use super::SearchMonitor;
use crate::branching::Decision;
use crate::branching::DecisionBuilder;
use crate::engine::SearchStatus;
use crate::engine::Solver;
use crate::engine::TrailedInt;
use crate::engine::VarId;

/// A FIFO whose length is reversible: entries pushed inside the search tree disappear when the
/// search backtracks past the push. The element slots themselves are plain storage; a stale tail
/// beyond the reversible length is overwritten by the next push.
#[derive(Debug)]
struct RevFifo<T> {
    items: Vec<T>,
    len: TrailedInt,
}

impl<T: Clone> RevFifo<T> {
    fn new(solver: &mut Solver) -> RevFifo<T> {
        RevFifo {
            items: Vec::new(),
            len: solver.new_trailed_int(0),
        }
    }

    fn len(&self, solver: &Solver) -> usize {
        solver.trailed_read(self.len) as usize
    }

    fn entries(&self, solver: &Solver) -> &[T] {
        &self.items[..self.len(solver)]
    }

    fn push(&mut self, solver: &mut Solver, item: T) {
        let len = self.len(solver);
        self.items.truncate(len);
        self.items.push(item);
        solver.trailed_assign(self.len, len as i64 + 1);
    }

    fn last(&self, solver: &Solver) -> Option<&T> {
        self.len(solver).checked_sub(1).map(|index| &self.items[index])
    }

    /// Overwrites the most recent entry in place. The write is not reversible; the slot itself
    /// is discarded when the push is undone.
    fn set_last(&mut self, solver: &Solver, item: T) {
        let index = self.len(solver) - 1;
        self.items[index] = item;
    }
}

/// The per-decision view handed to a [`SymmetryBreaker`]: access to the solver for building
/// reified terms, and the clause the breaker appends its terms to.
pub struct SymmetryContext<'a> {
    solver: &'a mut Solver,
    terms: Vec<VarId>,
}

impl<'a> SymmetryContext<'a> {
    pub fn solver(&mut self) -> &mut Solver {
        self.solver
    }

    /// Appends a 0-1 term representing the truth of the symmetrical image of the visited
    /// decision.
    pub fn add_to_clause(&mut self, term: VarId) {
        self.terms.push(term);
    }
}

/// A problem symmetry. The breaker is visited with every set-variable-value effect of every
/// decision and responds with a boolean term representing the symmetrical decision (e.g. for the
/// decision `x == 3` under a symmetry mapping x to y and 3 to 5, a term reifying `y == 5`).
pub trait SymmetryBreaker: std::fmt::Debug {
    fn visit_set_variable_value(
        &mut self,
        context: &mut SymmetryContext<'_>,
        variable: VarId,
        value: i64,
    );
}

struct BreakerInspector<'a, 'b> {
    breaker: &'a mut dyn SymmetryBreaker,
    context: &'a mut SymmetryContext<'b>,
}

impl crate::branching::DecisionInspector for BreakerInspector<'_, '_> {
    fn visit_set_variable_value(&mut self, variable: VarId, value: i64) {
        self.breaker
            .visit_set_variable_value(self.context, variable, value);
    }
}

/// Symmetry breaking during search. For every registered breaker the manager keeps reversible
/// FIFOs of the clause terms the breaker produced, the decisions which produced them, and a
/// direction flag per decision (left while the decision is applied, flipped once it is refuted).
/// When a decision with recorded terms is refuted, a no-go is posted forbidding the symmetrical
/// image of the refuted left-branch prefix: `min(guard terms and the current term) == 0`.
pub struct SymmetryManager {
    breakers: Vec<Box<dyn SymmetryBreaker>>,
    clauses: Vec<RevFifo<VarId>>,
    decisions: Vec<RevFifo<Decision>>,
    directions: Vec<RevFifo<bool>>,
}

impl std::fmt::Debug for SymmetryManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymmetryManager")
            .field("breakers", &self.breakers)
            .finish()
    }
}

impl SymmetryManager {
    pub fn new(solver: &mut Solver, breakers: Vec<Box<dyn SymmetryBreaker>>) -> SymmetryManager {
        assert!(
            !breakers.is_empty(),
            "A symmetry manager requires at least one breaker"
        );
        let clauses = breakers.iter().map(|_| RevFifo::new(solver)).collect();
        let decisions = breakers.iter().map(|_| RevFifo::new(solver)).collect();
        let directions = breakers.iter().map(|_| RevFifo::new(solver)).collect();
        SymmetryManager {
            breakers,
            clauses,
            decisions,
            directions,
        }
    }

    fn check_symmetries(&mut self, index: usize, solver: &mut Solver) {
        let terms = self.clauses[index].entries(solver);
        let current_term = *terms.last().expect("a recorded decision has a term");
        let mut guard = Vec::new();
        for (&term, &left) in terms[..terms.len() - 1]
            .iter()
            .zip(self.directions[index].entries(solver))
        {
            if left {
                continue;
            }
            if solver.upper_bound(term) == 0 {
                // The premise is false; the clause can never apply.
                return;
            }
            if solver.lower_bound(term) == 0 {
                guard.push(term);
            }
        }
        guard.push(current_term);
        self.directions[index].set_last(solver, true);
        // With premises x_i == a_i and the current symmetrical term y == b, this posts
        // And(x_i == a_i) => y != b.
        let minimum = solver.make_min(&guard);
        solver.add_equality(minimum, 0);
    }
}

impl SearchMonitor for SymmetryManager {
    fn end_next_decision(
        &mut self,
        solver: &mut Solver,
        _builder: &dyn DecisionBuilder,
        decision: Option<&Decision>,
    ) -> SearchStatus {
        let Some(decision) = decision else {
            return Ok(());
        };
        for index in 0..self.breakers.len() {
            let mut context = SymmetryContext {
                solver: &mut *solver,
                terms: Vec::new(),
            };
            let mut inspector = BreakerInspector {
                breaker: self.breakers[index].as_mut(),
                context: &mut context,
            };
            decision.accept(&mut inspector);
            let terms = context.terms;
            if terms.is_empty() {
                continue;
            }
            for term in terms {
                self.clauses[index].push(solver, term);
            }
            self.decisions[index].push(solver, decision.clone());
            self.directions[index].push(solver, false);
        }
        Ok(())
    }

    fn refute_decision(&mut self, solver: &mut Solver, decision: &Decision) -> SearchStatus {
        for index in 0..self.breakers.len() {
            if self.decisions[index].last(solver) == Some(decision) {
                self.check_symmetries(index, solver);
            }
        }
        Ok(())
    }
}
