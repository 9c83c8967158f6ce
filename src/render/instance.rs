use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use super::view::PlanView;
use crate::ecs::components::{Appearance, Orientation, Position, PrevPosition, WingBeat};

/// Sprite shapes understood by the sprite shader.
pub const FRAME_BUTTERFLY: u32 = 0;
pub const FRAME_RING: u32 = 1;
pub const FRAME_DISC: u32 = 2;

/// Wing span of a butterfly at `Appearance::size == 1` (metres).
const BUTTERFLY_SPAN: f32 = 0.25;
/// Smallest disc drawn, so thin stems stay visible when zoomed out.
const MIN_DISC_PIXELS: f32 = 3.0;
/// Narrowest the flapping sprite gets, relative to its full width.
const MIN_WING_WIDTH: f32 = 0.15;

/// Per-instance data uploaded to GPU each frame.
/// Stride = 28 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct SpriteInstance {
    /// Screen position (x, y).
    pub position: [f32; 2],
    /// Full width and height in pixels.
    pub size: [f32; 2],
    /// RGBA color packed as u32.
    pub color: u32,
    /// One of the `FRAME_*` shapes.
    pub frame: u32,
    /// Rotation angle in radians, clockwise on screen.
    pub rotation: f32,
}

impl SpriteInstance {
    const ATTRIBS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        2 => Float32x2, // position
        3 => Float32x2, // size
        4 => Uint32,    // color
        5 => Uint32,    // frame
        6 => Float32,   // rotation
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }

    /// Build a butterfly sprite from ECS components, interpolating position.
    pub fn butterfly(
        pos: &Position,
        prev_pos: &PrevPosition,
        orientation: &Orientation,
        wings: &WingBeat,
        appearance: &Appearance,
        alpha: f32,
        view: &PlanView,
    ) -> Self {
        let interp = Vec3::lerp(prev_pos.0, pos.0, alpha);
        let span = view.to_pixels(BUTTERFLY_SPAN * appearance.size);
        // Seen from above, raised wings look narrower.
        let width = span * wings.left.cos().abs().max(MIN_WING_WIDTH);

        Self {
            position: view.to_screen(interp).into(),
            size: [width, span],
            color: appearance.color,
            frame: FRAME_BUTTERFLY,
            rotation: -orientation.yaw,
        }
    }

    /// Outline around the gaze focus showing the attention radius.
    pub fn focus_ring(focus: Vec3, radius: f32, color: u32, view: &PlanView) -> Self {
        let d = view.to_pixels(2.0 * radius);
        Self {
            position: view.to_screen(focus).into(),
            size: [d, d],
            color,
            frame: FRAME_RING,
            rotation: 0.0,
        }
    }

    /// Filled disc, used for flower hearts and stems seen from above.
    pub fn disc(center: Vec3, radius: f32, color: u32, view: &PlanView) -> Self {
        let d = view.to_pixels(2.0 * radius).max(MIN_DISC_PIXELS);
        Self {
            position: view.to_screen(center).into(),
            size: [d, d],
            color,
            frame: FRAME_DISC,
            rotation: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> PlanView {
        PlanView {
            center: glam::Vec2::new(100.0, 100.0),
            scale: 100.0,
        }
    }

    fn butterfly_at(wings: WingBeat) -> SpriteInstance {
        SpriteInstance::butterfly(
            &Position(Vec3::new(1.0, 0.5, 0.0)),
            &PrevPosition(Vec3::new(0.0, 0.5, 0.0)),
            &Orientation { yaw: 0.3, pitch: 0.0 },
            &wings,
            &Appearance { color: 0xFF00FFFF, size: 1.0 },
            0.5,
            &view(),
        )
    }

    #[test]
    fn butterfly_is_interpolated_and_turned() {
        let s = butterfly_at(WingBeat { phase: 0.0, left: 0.0, right: 0.0 });
        assert_eq!(s.position, [150.0, 100.0]);
        assert_eq!(s.rotation, -0.3);
        assert_eq!(s.frame, FRAME_BUTTERFLY);
        assert!((s.size[0] - 25.0).abs() < 1e-4);
    }

    #[test]
    fn raised_wings_narrow_the_sprite() {
        let flat = butterfly_at(WingBeat { phase: 0.0, left: 0.0, right: 0.0 });
        let raised = butterfly_at(WingBeat { phase: 1.0, left: 1.2, right: -1.2 });
        assert!(raised.size[0] < flat.size[0]);
        assert_eq!(raised.size[1], flat.size[1]);
    }

    #[test]
    fn ring_spans_the_attention_diameter() {
        let ring = SpriteInstance::focus_ring(Vec3::ZERO, 3.0, 0xFFFFFFFF, &view());
        assert_eq!(ring.size, [600.0, 600.0]);
        assert_eq!(ring.frame, FRAME_RING);
    }
}
