/// Rate-limited open ratio of one flower.
///
/// The actual ratio chases the desired one at `1 / opening_duration` per
/// second on the way up and `1 / closing_duration` on the way down, and never
/// overshoots it.
#[derive(Debug, Clone, Copy)]
pub struct Bloom {
    pub open_ratio: f32,
    pub desired_open_ratio: f32,
    /// Seconds to go from closed to fully open.
    pub opening_duration: f32,
    /// Seconds to go from fully open to closed.
    pub closing_duration: f32,
    pose_stale: bool,
}

impl Bloom {
    /// A closed bud that wants to stay closed.
    pub fn new(opening_duration: f32, closing_duration: f32) -> Self {
        Self {
            open_ratio: 0.0,
            desired_open_ratio: 0.0,
            opening_duration,
            closing_duration,
            pose_stale: true,
        }
    }

    pub fn set_desired(&mut self, open: bool) {
        self.desired_open_ratio = if open { 1.0 } else { 0.0 };
    }

    /// Advance by `dt` seconds. Returns true if the ratio moved.
    pub fn step(&mut self, dt: f32) -> bool {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let before = self.open_ratio;

        if self.desired_open_ratio < self.open_ratio {
            let rate = dt / self.closing_duration;
            self.open_ratio = if rate.is_finite() {
                (self.open_ratio - rate).max(self.desired_open_ratio)
            } else {
                self.desired_open_ratio
            };
        } else if self.open_ratio < self.desired_open_ratio {
            let rate = dt / self.opening_duration;
            self.open_ratio = if rate.is_finite() {
                (self.open_ratio + rate).min(self.desired_open_ratio)
            } else {
                self.desired_open_ratio
            };
        }

        self.open_ratio = self.open_ratio.clamp(0.0, 1.0);
        let moved = self.open_ratio != before;
        self.pose_stale |= moved;
        moved
    }

    /// More than half open; such flowers attract butterflies.
    pub fn is_open(&self) -> bool {
        self.open_ratio > 0.5
    }

    /// True once after every change of the ratio (and once after creation).
    pub fn take_pose_stale(&mut self) -> bool {
        std::mem::replace(&mut self.pose_stale, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_at_configured_rate() {
        let mut b = Bloom::new(1.0, 2.0);
        b.set_desired(true);
        assert!(b.step(0.5));
        assert_eq!(b.open_ratio, 0.5);
        assert!(b.step(0.5));
        assert_eq!(b.open_ratio, 1.0);
    }

    #[test]
    fn clamps_exactly_and_stays() {
        let mut b = Bloom::new(1.0, 2.0);
        b.set_desired(true);
        b.step(0.7);
        b.step(0.7);
        assert_eq!(b.open_ratio, 1.0);
        for _ in 0..10 {
            assert!(!b.step(0.3));
            assert_eq!(b.open_ratio, 1.0);
        }
    }

    #[test]
    fn closes_at_its_own_rate() {
        let mut b = Bloom::new(1.0, 2.0);
        b.set_desired(true);
        b.step(1.0);
        b.set_desired(false);
        b.step(0.5);
        assert_eq!(b.open_ratio, 0.75);
        b.step(10.0);
        assert_eq!(b.open_ratio, 0.0);
    }

    #[test]
    fn stays_in_range_under_random_flips() {
        let mut rng = fastrand::Rng::with_seed(7);
        let mut b = Bloom::new(0.3, 1.7);
        for _ in 0..10_000 {
            if rng.f32() < 0.1 {
                b.set_desired(rng.bool());
            }
            b.step(rng.f32() * 0.2);
            assert!((0.0..=1.0).contains(&b.open_ratio));
        }
    }

    #[test]
    fn bad_dt_is_ignored() {
        let mut b = Bloom::new(1.0, 1.0);
        b.set_desired(true);
        assert!(!b.step(-1.0));
        assert!(!b.step(f32::NAN));
        assert_eq!(b.open_ratio, 0.0);
    }

    #[test]
    fn zero_duration_snaps() {
        let mut b = Bloom::new(0.0, 0.0);
        b.set_desired(true);
        b.step(0.01);
        assert_eq!(b.open_ratio, 1.0);
    }

    #[test]
    fn pose_staleness_tracks_changes() {
        let mut b = Bloom::new(1.0, 1.0);
        assert!(b.take_pose_stale());
        assert!(!b.take_pose_stale());
        b.step(0.1);
        assert!(!b.take_pose_stale());
        b.set_desired(true);
        b.step(0.1);
        assert!(b.take_pose_stale());
    }
}
