use std::fmt::Debug;
use std::ops::Range;

use rand::Rng;
use rand::SeedableRng;

use crate::gourd_assert_moderate;

/// A trait for generating random values; used by the random variable and value selectors and by
/// simulated annealing. The solver owns the generator and hands it to the components which need
/// randomness, so deterministic test doubles can be substituted.
pub trait Random: Debug {
    /// Generates a bool which is true with probability `probability`. It should hold that
    /// `probability` is in `[0, 1]`; this method panics otherwise.
    fn generate_bool(&mut self, probability: f64) -> bool;

    /// Generates a usize sampled uniformly from `[range.start, range.end)`.
    fn generate_usize_in_range(&mut self, range: Range<usize>) -> usize;

    /// Generates an i64 sampled uniformly from `[range.start, range.end)`.
    fn generate_i64_in_range(&mut self, range: Range<i64>) -> i64;

    /// Generates an f64 sampled uniformly from `(0, 1]`; the lower bound is excluded so the
    /// result can be passed to `ln` directly.
    fn generate_positive_unit_f64(&mut self) -> f64;
}

// Blanket implementation so that any "regular" seedable generator (e.g. `SmallRng`) can be used
// where an implementation of `Random` is expected.
impl<T> Random for T
where
    T: SeedableRng + Rng + Debug,
{
    fn generate_bool(&mut self, probability: f64) -> bool {
        gourd_assert_moderate!(
            (0.0..=1.0).contains(&probability),
            "It should hold that 0.0 <= {probability} <= 1.0"
        );
        self.gen_bool(probability)
    }

    fn generate_usize_in_range(&mut self, range: Range<usize>) -> usize {
        self.gen_range(range)
    }

    fn generate_i64_in_range(&mut self, range: Range<i64>) -> i64 {
        self.gen_range(range)
    }

    fn generate_positive_unit_f64(&mut self) -> f64 {
        1.0 - self.gen::<f64>()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::ops::Range;

    use super::Random;
    use crate::gourd_assert_simple;

    /// A test "random" generator which takes lists of values and returns them in order; attempting
    /// to generate more values than were provided panics. This allows deterministic test cases
    /// for components which consume randomness.
    #[derive(Debug, Default)]
    pub(crate) struct TestRandom {
        pub(crate) usizes: Vec<usize>,
        pub(crate) i64s: Vec<i64>,
        pub(crate) bools: Vec<bool>,
        pub(crate) f64s: Vec<f64>,
    }

    impl Random for TestRandom {
        fn generate_bool(&mut self, _probability: f64) -> bool {
            self.bools.remove(0)
        }

        fn generate_usize_in_range(&mut self, range: Range<usize>) -> usize {
            let selected = self.usizes.remove(0);
            gourd_assert_simple!(
                range.contains(&selected),
                "The selected element ({selected}) is not in the provided range ({range:?})"
            );
            selected
        }

        fn generate_i64_in_range(&mut self, range: Range<i64>) -> i64 {
            let selected = self.i64s.remove(0);
            gourd_assert_simple!(
                range.contains(&selected),
                "The selected element ({selected}) is not in the provided range ({range:?})"
            );
            selected
        }

        fn generate_positive_unit_f64(&mut self) -> f64 {
            self.f64s.remove(0)
        }
    }
}
