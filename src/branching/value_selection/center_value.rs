use super::ValueSelector;
use crate::engine::Solver;
use crate::engine::VarId;

/// Selects the value closest to the middle of the domain, `(min + max) / 2`, expanding outwards
/// by ±1, ±2, ... and preferring the high side on ties. Falls back to 0 when no value is found;
/// unreachable for non-empty domains but kept as the defined result.
#[derive(Debug, Copy, Clone)]
pub struct CenterValue;

impl ValueSelector for CenterValue {
    fn select_value(&mut self, solver: &mut Solver, variable: VarId, _id: usize) -> i64 {
        let lower_bound = solver.lower_bound(variable);
        let upper_bound = solver.upper_bound(variable);
        let mid = (lower_bound + upper_bound) / 2;
        if solver.contains(variable, mid) {
            return mid;
        }
        // Always at least as large as mid - lower_bound.
        let diameter = upper_bound - mid;
        for offset in 1..=diameter {
            if solver.contains(variable, mid + offset) {
                return mid + offset;
            }
            if solver.contains(variable, mid - offset) {
                return mid - offset;
            }
        }
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_the_middle_of_a_full_domain() {
        let mut solver = Solver::default();
        let variable = solver.new_bounded_integer(0, 10);
        let mut selector = CenterValue;
        assert_eq!(selector.select_value(&mut solver, variable, 0), 5);
    }

    #[test]
    fn prefers_the_high_side_when_the_middle_is_removed() {
        let mut solver = Solver::default();
        let variable = solver.new_bounded_integer(0, 10);
        solver.remove_value(variable, 5).unwrap();
        let mut selector = CenterValue;
        assert_eq!(selector.select_value(&mut solver, variable, 0), 6);
    }

    #[test]
    fn walks_outwards_past_removed_values() {
        let mut solver = Solver::default();
        let variable = solver.new_bounded_integer(0, 10);
        for value in [4, 5, 6] {
            solver.remove_value(variable, value).unwrap();
        }
        let mut selector = CenterValue;
        assert_eq!(selector.select_value(&mut solver, variable, 0), 7);
    }
}
