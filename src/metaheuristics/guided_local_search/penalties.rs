use crate::basic_types::HashMap;
use crate::gourd_assert_moderate;

/// A penalized (variable index, value) pair.
pub type Arc = (usize, i64);

/// The penalty counts guided local search associates with (variable, value) arcs. Two stores
/// satisfy this contract: a dense ragged table and a sparse hash map; they are observationally
/// equivalent on non-negative values.
pub trait GuidedLocalSearchPenalties: std::fmt::Debug {
    /// Whether any arc has been penalized yet; the common "no penalties" case short-circuits the
    /// penalized-objective construction entirely.
    fn has_values(&self) -> bool;

    fn increment(&mut self, arc: Arc);

    fn value(&self, arc: Arc) -> i64;
}

/// Dense store: one row of counts per variable, grown to the highest penalized value.
#[derive(Debug)]
pub struct PenaltiesTable {
    penalties: Vec<Vec<i64>>,
    has_values: bool,
}

impl PenaltiesTable {
    pub fn new(size: usize) -> PenaltiesTable {
        PenaltiesTable {
            penalties: vec![Vec::new(); size],
            has_values: false,
        }
    }
}

impl GuidedLocalSearchPenalties for PenaltiesTable {
    fn has_values(&self) -> bool {
        self.has_values
    }

    fn increment(&mut self, arc: Arc) {
        gourd_assert_moderate!(arc.1 >= 0, "The dense penalty store requires values >= 0");
        let row = &mut self.penalties[arc.0];
        let value = arc.1 as usize;
        if value >= row.len() {
            row.resize(value + 1, 0);
        }
        row[value] += 1;
        self.has_values = true;
    }

    fn value(&self, arc: Arc) -> i64 {
        if arc.1 < 0 {
            return 0;
        }
        self.penalties[arc.0].get(arc.1 as usize).copied().unwrap_or(0)
    }
}

/// Sparse store: a hash map keyed by arc with a penalized-variable bitmap for a fast
/// short-circuit on variables without any penalty.
#[derive(Debug)]
pub struct PenaltiesMap {
    penalized: Vec<bool>,
    penalties: HashMap<Arc, i64>,
}

impl PenaltiesMap {
    pub fn new(size: usize) -> PenaltiesMap {
        PenaltiesMap {
            penalized: vec![false; size],
            penalties: HashMap::default(),
        }
    }
}

impl GuidedLocalSearchPenalties for PenaltiesMap {
    fn has_values(&self) -> bool {
        !self.penalties.is_empty()
    }

    fn increment(&mut self, arc: Arc) {
        *self.penalties.entry(arc).or_insert(0) += 1;
        self.penalized[arc.0] = true;
    }

    fn value(&self, arc: Arc) -> i64 {
        if self.penalized[arc.0] {
            self.penalties.get(&arc).copied().unwrap_or(0)
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(store: &mut dyn GuidedLocalSearchPenalties) -> Vec<i64> {
        assert!(!store.has_values());
        store.increment((0, 3));
        store.increment((0, 3));
        store.increment((1, 0));
        store.increment((2, 7));
        assert!(store.has_values());
        vec![
            store.value((0, 3)),
            store.value((0, 4)),
            store.value((1, 0)),
            store.value((2, 7)),
            store.value((2, 0)),
            store.value((3, 1)),
        ]
    }

    #[test]
    fn dense_and_sparse_stores_agree() {
        let mut table = PenaltiesTable::new(4);
        let mut map = PenaltiesMap::new(4);
        assert_eq!(exercise(&mut table), exercise(&mut map));
        assert_eq!(table.value((0, 3)), 2);
    }
}
