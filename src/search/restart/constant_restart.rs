use super::super::SearchMonitor;
use crate::basic_types::sequence_generators::ConstantSequence;
use crate::basic_types::sequence_generators::SequenceGenerator;
use crate::engine::Solver;
use crate::gourd_assert_simple;

/// Restarts the search every `frequency` failures.
#[derive(Debug)]
pub struct ConstantRestart {
    sequence: ConstantSequence,
    current_fails: i64,
    next_step: i64,
}

impl ConstantRestart {
    pub fn new(frequency: i64) -> ConstantRestart {
        gourd_assert_simple!(frequency >= 1);
        let mut sequence = ConstantSequence::new(frequency);
        let next_step = sequence.next();
        ConstantRestart {
            sequence,
            current_fails: 0,
            next_step,
        }
    }
}

impl SearchMonitor for ConstantRestart {
    fn begin_fail(&mut self, solver: &mut Solver) {
        self.current_fails += 1;
        if self.current_fails >= self.next_step {
            self.current_fails = 0;
            self.next_step = self.sequence.next();
            solver.restart_current_search();
        }
    }
}
