/// Source of uniform randomness for steering and goal picking.
///
/// Implemented for `fastrand::Rng`; tests plug in fixed sequences.
pub trait RandomSource {
    /// Uniform in [0, 1).
    fn unit(&mut self) -> f32;

    /// Uniform in [lo, hi).
    fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.unit()
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn index(&mut self, len: usize) -> usize {
        ((self.unit() * len as f32) as usize).min(len.saturating_sub(1))
    }
}

impl RandomSource for fastrand::Rng {
    fn unit(&mut self) -> f32 {
        self.f32()
    }

    fn index(&mut self, len: usize) -> usize {
        self.usize(0..len)
    }
}

#[cfg(test)]
pub mod testing {
    use super::RandomSource;

    /// Always returns the same value.
    pub struct Constant(pub f32);

    impl RandomSource for Constant {
        fn unit(&mut self) -> f32 {
            self.0
        }
    }

    /// Replays a fixed sequence, wrapping around.
    pub struct Sequence {
        values: Vec<f32>,
        next: usize,
    }

    impl Sequence {
        pub fn new(values: &[f32]) -> Self {
            Self {
                values: values.to_vec(),
                next: 0,
            }
        }
    }

    impl RandomSource for Sequence {
        fn unit(&mut self) -> f32 {
            let v = self.values[self.next % self.values.len()];
            self.next += 1;
            v
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{Constant, Sequence};
    use super::*;

    #[test]
    fn range_maps_unit_interval() {
        assert_eq!(Constant(0.5).range(-1.0, 1.0), 0.0);
        assert_eq!(Constant(0.0).range(0.1, 1.0), 0.1);
    }

    #[test]
    fn index_stays_in_bounds() {
        assert_eq!(Constant(0.999_999).index(3), 2);
        assert_eq!(Constant(0.0).index(3), 0);
        let mut rng = fastrand::Rng::with_seed(1);
        for _ in 0..100 {
            assert!(rng.index(5) < 5);
        }
    }

    #[test]
    fn sequence_wraps() {
        let mut s = Sequence::new(&[0.1, 0.2]);
        assert_eq!([s.unit(), s.unit(), s.unit()], [0.1, 0.2, 0.1]);
    }
}
