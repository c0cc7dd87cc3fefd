use super::super::SearchMonitor;
use crate::basic_types::sequence_generators::LubySequence;
use crate::basic_types::sequence_generators::SequenceGenerator;
use crate::engine::Solver;
use crate::gourd_assert_simple;

/// Restarts the search after a number of failures scheduled by the Luby sequence
/// (1, 1, 2, 1, 1, 2, 4, ...) scaled with `scale_factor`.
#[derive(Debug)]
pub struct LubyRestart {
    sequence: LubySequence,
    current_fails: i64,
    next_step: i64,
}

impl LubyRestart {
    pub fn new(scale_factor: i64) -> LubyRestart {
        gourd_assert_simple!(scale_factor >= 1);
        let mut sequence = LubySequence::new(scale_factor);
        let next_step = sequence.next();
        LubyRestart {
            sequence,
            current_fails: 0,
            next_step,
        }
    }
}

impl SearchMonitor for LubyRestart {
    fn begin_fail(&mut self, solver: &mut Solver) {
        self.current_fails += 1;
        if self.current_fails >= self.next_step {
            self.current_fails = 0;
            self.next_step = self.sequence.next();
            solver.restart_current_search();
        }
    }
}
