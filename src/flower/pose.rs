use std::f32::consts::FRAC_PI_2;

/// Joint angles along a petal, base to tip. Radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PetalPose {
    pub near: f32,
    pub mid: f32,
    pub far: f32,
}

impl PetalPose {
    /// Pose for an open ratio: 0 is a closed bud, 1 is fully splayed.
    ///
    /// Out-of-range ratios are clamped; NaN is treated as closed.
    pub fn from_ratio(ratio: f32, fold_angle: f32, open_angle: f32) -> Self {
        let r = if ratio.is_nan() { 0.0 } else { ratio.clamp(0.0, 1.0) };
        Self {
            near: lerp(r, FRAC_PI_2 - fold_angle, FRAC_PI_2 - open_angle),
            mid: lerp(r, fold_angle, 0.0),
            far: lerp(r, fold_angle, 0.0),
        }
    }
}

/// Blend from `a` at `p = 0` to `b` at `p = 1`, hitting both ends exactly.
pub fn lerp(p: f32, a: f32, b: f32) -> f32 {
    (1.0 - p) * a + p * b
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANGLES: [(f32, f32); 4] = [(0.3, 0.3), (0.785, 1.2), (0.1, FRAC_PI_2), (1.0, 1.4)];

    #[test]
    fn closed_pose_is_exact() {
        for (fold, open) in ANGLES {
            let p = PetalPose::from_ratio(0.0, fold, open);
            assert_eq!(p.near, FRAC_PI_2 - fold);
            assert_eq!(p.mid, fold);
            assert_eq!(p.far, fold);
        }
    }

    #[test]
    fn open_pose_is_exact() {
        for (fold, open) in ANGLES {
            let p = PetalPose::from_ratio(1.0, fold, open);
            assert_eq!(p.near, FRAC_PI_2 - open);
            assert_eq!(p.mid, 0.0);
            assert_eq!(p.far, 0.0);
        }
    }

    #[test]
    fn pose_moves_monotonically() {
        for (fold, open) in ANGLES {
            let mut prev = PetalPose::from_ratio(0.0, fold, open);
            for i in 1..=20 {
                let p = PetalPose::from_ratio(i as f32 / 20.0, fold, open);
                assert!(p.near <= prev.near + 1e-6);
                assert!(p.mid <= prev.mid + 1e-6);
                assert!(p.far <= prev.far + 1e-6);
                prev = p;
            }
        }
    }

    #[test]
    fn midway_is_halfway() {
        let p = PetalPose::from_ratio(0.5, 0.8, 1.2);
        assert!((p.mid - 0.4).abs() < 1e-6);
        let expected = ((FRAC_PI_2 - 0.8) + (FRAC_PI_2 - 1.2)) / 2.0;
        assert!((p.near - expected).abs() < 1e-6);
    }

    #[test]
    fn ratio_is_clamped() {
        assert_eq!(
            PetalPose::from_ratio(-3.0, 0.5, 1.0),
            PetalPose::from_ratio(0.0, 0.5, 1.0)
        );
        assert_eq!(
            PetalPose::from_ratio(7.0, 0.5, 1.0),
            PetalPose::from_ratio(1.0, 0.5, 1.0)
        );
        assert_eq!(
            PetalPose::from_ratio(f32::NAN, 0.5, 1.0),
            PetalPose::from_ratio(0.0, 0.5, 1.0)
        );
    }

    #[test]
    fn pose_is_pure() {
        let a = PetalPose::from_ratio(0.37, 0.6, 1.3);
        let b = PetalPose::from_ratio(0.37, 0.6, 1.3);
        assert_eq!(a.near.to_bits(), b.near.to_bits());
        assert_eq!(a.mid.to_bits(), b.mid.to_bits());
        assert_eq!(a.far.to_bits(), b.far.to_bits());
    }
}
