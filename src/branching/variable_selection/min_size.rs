use log::warn;

use super::VariableSelector;
use crate::engine::Solver;
use crate::engine::VarId;

/// How ties between variables of equal domain size are broken.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TieBreakCriterion {
    LowestMin,
    HighestMin,
    LowestMax,
    HighestMax,
}

/// Selects the unfixed variable with the smallest domain, breaking ties on the bound named by the
/// [`TieBreakCriterion`]. Earlier variables win remaining ties.
#[derive(Debug)]
pub struct MinSize {
    variables: Vec<VarId>,
    criterion: TieBreakCriterion,
}

impl MinSize {
    pub fn new(variables: &[VarId], criterion: TieBreakCriterion) -> MinSize {
        if variables.is_empty() {
            warn!("The MinSize variable selector was not provided with any variables");
        }
        MinSize {
            variables: variables.to_vec(),
            criterion,
        }
    }

    pub fn lowest_min(variables: &[VarId]) -> MinSize {
        MinSize::new(variables, TieBreakCriterion::LowestMin)
    }

    pub fn highest_min(variables: &[VarId]) -> MinSize {
        MinSize::new(variables, TieBreakCriterion::HighestMin)
    }

    pub fn lowest_max(variables: &[VarId]) -> MinSize {
        MinSize::new(variables, TieBreakCriterion::LowestMax)
    }

    pub fn highest_max(variables: &[VarId]) -> MinSize {
        MinSize::new(variables, TieBreakCriterion::HighestMax)
    }

    fn tie_value(&self, solver: &Solver, variable: VarId) -> i64 {
        match self.criterion {
            TieBreakCriterion::LowestMin | TieBreakCriterion::HighestMin => {
                solver.lower_bound(variable)
            }
            TieBreakCriterion::LowestMax | TieBreakCriterion::HighestMax => {
                solver.upper_bound(variable)
            }
        }
    }

    fn prefers(&self, candidate: i64, incumbent: i64) -> bool {
        match self.criterion {
            TieBreakCriterion::LowestMin | TieBreakCriterion::LowestMax => candidate < incumbent,
            TieBreakCriterion::HighestMin | TieBreakCriterion::HighestMax => candidate > incumbent,
        }
    }
}

impl VariableSelector for MinSize {
    fn select_variable(&mut self, solver: &mut Solver) -> Option<(VarId, usize)> {
        let mut best: Option<(VarId, usize)> = None;
        let mut best_size = i64::MAX;
        let mut best_tie = 0;
        for (index, &variable) in self.variables.iter().enumerate() {
            if solver.is_fixed(variable) {
                continue;
            }
            let size = solver.size(variable);
            let tie = self.tie_value(solver, variable);
            if size < best_size || (size == best_size && self.prefers(tie, best_tie)) {
                best_size = size;
                best_tie = tie;
                best = Some((variable, index));
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Solver, Vec<VarId>) {
        let mut solver = Solver::default();
        let variables = vec![
            solver.new_bounded_integer(0, 9),
            solver.new_bounded_integer(2, 5),
            solver.new_bounded_integer(4, 7),
        ];
        (solver, variables)
    }

    #[test]
    fn smallest_domain_wins() {
        let (mut solver, variables) = setup();
        let mut selector = MinSize::lowest_min(&variables);
        assert_eq!(
            selector.select_variable(&mut solver),
            Some((variables[1], 1))
        );
    }

    #[test]
    fn ties_break_on_the_requested_bound() {
        let (mut solver, variables) = setup();

        let mut selector = MinSize::highest_min(&variables);
        assert_eq!(
            selector.select_variable(&mut solver),
            Some((variables[2], 2))
        );

        let mut selector = MinSize::lowest_max(&variables);
        assert_eq!(
            selector.select_variable(&mut solver),
            Some((variables[1], 1))
        );

        let mut selector = MinSize::highest_max(&variables);
        assert_eq!(
            selector.select_variable(&mut solver),
            Some((variables[2], 2))
        );
    }

    #[test]
    fn fixed_variables_are_skipped() {
        let (mut solver, variables) = setup();
        solver.set_value(variables[1], 3).unwrap();
        let mut selector = MinSize::lowest_min(&variables);
        assert_eq!(
            selector.select_variable(&mut solver),
            Some((variables[2], 2))
        );
    }
}
