//! Where the viewer is looking, which flowers that wakes up, and where the
//! butterflies go next.

use std::f32::consts::PI;

use glam::{Quat, Vec3};

use crate::util::rng::RandomSource;

/// Eye height of the standing viewer (metres).
pub const EYE_HEIGHT: f32 = 1.6;

/// Viewer eye and look direction.
#[derive(Debug, Clone, Copy)]
pub struct Gaze {
    pub eye: Vec3,
    pub direction: Vec3,
}

impl Default for Gaze {
    fn default() -> Self {
        Self::from_pointer(0.5, 0.5)
    }
}

impl Gaze {
    /// Gaze for a pointer at window fraction `(u, v)`, `(0, 0)` top-left.
    ///
    /// The horizontal axis turns the head a full half-turn each way, the
    /// vertical axis tilts it.
    pub fn from_pointer(u: f32, v: f32) -> Self {
        let yaw = -PI * (u * 2.0 - 1.0);
        let pitch = -PI * (v * 2.0 - 1.0);
        let rotation = Quat::from_rotation_y(yaw) * Quat::from_rotation_x(pitch);
        Self {
            eye: Vec3::new(0.0, EYE_HEIGHT, 0.0),
            direction: rotation * Vec3::NEG_Z,
        }
    }

    pub fn focus(&self) -> Vec3 {
        ground_focus(self.eye, self.direction)
    }
}

/// Where a ray from `eye` along `direction` hits the ground plane, or the
/// origin if it never does.
pub fn ground_focus(eye: Vec3, direction: Vec3) -> Vec3 {
    if direction.y < 0.0 {
        let hit = eye + direction * (-eye.y / direction.y);
        if hit.is_finite() {
            return Vec3::new(hit.x, 0.0, hit.z);
        }
    }
    Vec3::ZERO
}

/// Whether a flower at `flower` should open for a focus point.
pub fn wants_open(flower: Vec3, focus: Vec3, attention_radius: f32) -> bool {
    let dx = flower.x - focus.x;
    let dz = flower.z - focus.z;
    (dx * dx + dz * dz).sqrt() < attention_radius
}

/// Landing spots of all flowers, split by whether they are open, taken once
/// at the start of a tick.
#[derive(Debug, Default)]
pub struct OpenFlowerSnapshot {
    open: Vec<Vec3>,
    all: Vec<Vec3>,
}

impl OpenFlowerSnapshot {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            open: Vec::with_capacity(cap),
            all: Vec::with_capacity(cap),
        }
    }

    pub fn clear(&mut self) {
        self.open.clear();
        self.all.clear();
    }

    pub fn push(&mut self, landing: Vec3, is_open: bool) {
        self.all.push(landing);
        if is_open {
            self.open.push(landing);
        }
    }

    /// Open flowers, or every flower while none are open.
    pub fn pool(&self) -> &[Vec3] {
        if self.open.is_empty() {
            &self.all
        } else {
            &self.open
        }
    }

    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    /// Uniformly random landing spot from [`Self::pool`].
    pub fn pick(&self, rng: &mut impl RandomSource) -> Option<Vec3> {
        let pool = self.pool();
        if pool.is_empty() {
            return None;
        }
        Some(pool[rng.index(pool.len())])
    }
}
