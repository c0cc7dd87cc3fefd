use crate::basic_types::Trail;
use crate::containers::KeyedVec;
use crate::containers::StorageKey;

/// A handle to a reversible `i64` registered in [`TrailedValues`]. Any component which keeps
/// cursor state inside the search tree (selector cursors, composition indices, reversible FIFO
/// lengths) stores it behind one of these so that backtracking restores the previous value.
#[derive(Debug, Clone, Copy)]
pub struct TrailedInt {
    id: u32,
}

impl Default for TrailedInt {
    fn default() -> Self {
        Self { id: u32::MAX }
    }
}

impl StorageKey for TrailedInt {
    fn index(&self) -> usize {
        self.id as usize
    }

    fn create_from_index(index: usize) -> Self {
        Self { id: index as u32 }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct TrailedChange {
    old_value: i64,
    reference: TrailedInt,
}

/// The store of uniformly trailed scalars; the single reversible-mutation primitive offered to
/// selectors and monitors.
#[derive(Default, Debug, Clone)]
pub(crate) struct TrailedValues {
    trail: Trail<TrailedChange>,
    values: KeyedVec<TrailedInt, i64>,
}

impl TrailedValues {
    pub(crate) fn grow(&mut self, initial_value: i64) -> TrailedInt {
        self.values.push(initial_value)
    }

    pub(crate) fn increase_decision_level(&mut self) {
        self.trail.increase_decision_level()
    }

    pub(crate) fn read(&self, stateful_int: TrailedInt) -> i64 {
        self.values[stateful_int]
    }

    pub(crate) fn synchronise(&mut self, new_decision_level: usize) {
        self.trail
            .synchronise(new_decision_level)
            .for_each(|state_change| self.values[state_change.reference] = state_change.old_value)
    }

    pub(crate) fn assign(&mut self, stateful_int: TrailedInt, value: i64) {
        let old_value = self.values[stateful_int];
        if old_value == value {
            return;
        }
        let entry = TrailedChange {
            old_value,
            reference: stateful_int,
        };
        self.trail.push(entry);
        self.values[stateful_int] = value;
    }

    pub(crate) fn memory_estimate(&self) -> usize {
        self.values.len() * std::mem::size_of::<i64>()
            + self.trail.len() * std::mem::size_of::<TrailedChange>()
    }
}

#[cfg(test)]
mod tests {
    use super::TrailedValues;

    #[test]
    fn assignments_are_undone_on_synchronise() {
        let mut values = TrailedValues::default();
        let cursor = values.grow(0);

        assert_eq!(values.read(cursor), 0);

        values.increase_decision_level();
        values.assign(cursor, 5);
        assert_eq!(values.read(cursor), 5);

        values.increase_decision_level();
        values.assign(cursor, 7);
        assert_eq!(values.read(cursor), 7);

        values.synchronise(1);
        assert_eq!(values.read(cursor), 5);

        values.synchronise(0);
        assert_eq!(values.read(cursor), 0);
    }
}
