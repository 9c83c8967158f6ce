use glam::{Vec2, Vec3};

/// Empty border around the garden, as a fraction of its width.
const MARGIN: f32 = 0.08;

/// Top-down camera: world `x` runs right, world `z` runs down the screen,
/// height is dropped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanView {
    /// Screen pixel the world origin lands on.
    pub center: Vec2,
    /// Pixels per metre.
    pub scale: f32,
}

impl PlanView {
    /// Fit a square garden of half-width `half_extent` into a `width x height` window.
    pub fn fit(width: u32, height: u32, half_extent: f32) -> Self {
        let w = width.max(1) as f32;
        let h = height.max(1) as f32;
        let span = (2.0 * half_extent).max(f32::EPSILON) * (1.0 + 2.0 * MARGIN);
        Self {
            center: Vec2::new(w * 0.5, h * 0.5),
            scale: w.min(h) / span,
        }
    }

    pub fn to_screen(&self, p: Vec3) -> Vec2 {
        self.center + Vec2::new(p.x, p.z) * self.scale
    }

    pub fn to_pixels(&self, metres: f32) -> f32 {
        metres * self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_is_the_window_centre() {
        let view = PlanView::fit(800, 600, 10.0);
        assert_eq!(view.to_screen(Vec3::ZERO), Vec2::new(400.0, 300.0));
    }

    #[test]
    fn garden_corners_stay_inside_the_window() {
        let view = PlanView::fit(800, 600, 10.0);
        for corner in [
            Vec3::new(-10.0, 0.0, -10.0),
            Vec3::new(10.0, 3.0, 10.0),
        ] {
            let s = view.to_screen(corner);
            assert!(s.x > 0.0 && s.x < 800.0, "{s:?}");
            assert!(s.y > 0.0 && s.y < 600.0, "{s:?}");
        }
    }

    #[test]
    fn height_is_ignored_and_z_points_down() {
        let view = PlanView::fit(500, 500, 5.0);
        let low = view.to_screen(Vec3::new(1.0, 0.0, 2.0));
        let high = view.to_screen(Vec3::new(1.0, 4.0, 2.0));
        assert_eq!(low, high);
        assert!(low.y > view.center.y);
    }
}
