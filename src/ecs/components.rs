use glam::Vec3;

/// Where a flower's stem meets the ground. Never changes after planting.
#[derive(Debug, Clone, Copy)]
pub struct GroundPosition(pub Vec3);

/// Current world position of a butterfly.
#[derive(Debug, Clone, Copy)]
pub struct Position(pub Vec3);

/// Previous tick's position, used for render interpolation.
#[derive(Debug, Clone, Copy)]
pub struct PrevPosition(pub Vec3);

/// Heading of a butterfly. Radians.
#[derive(Debug, Clone, Copy)]
pub struct Orientation {
    /// Rotation about the vertical axis, `atan2(dx, dz)` of travel.
    pub yaw: f32,
    /// Held constant while gliding.
    pub pitch: f32,
}

/// Wing flap state, derived from simulation time only.
#[derive(Debug, Clone, Copy)]
pub struct WingBeat {
    /// 0 = wings down, 1 = wings fully raised.
    pub phase: f32,
    pub left: f32,
    pub right: f32,
}

/// Visual appearance of a butterfly.
#[derive(Debug, Clone, Copy)]
pub struct Appearance {
    /// RGBA packed as u32.
    pub color: u32,
    /// Size multiplier (1.0 = normal).
    pub size: f32,
}
