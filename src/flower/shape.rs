use std::collections::HashMap;
use std::f32::consts::PI;
use std::sync::Arc;

use glam::{Vec2, Vec3};
use thiserror::Error;

use super::pose::PetalPose;
use super::FlowerDesign;

/// Why a flower design cannot be folded into a petal template.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeError {
    #[error("petal count {0} is below the minimum of 3")]
    TooFewPetals(u32),
    #[error("fold angle {0} must lie strictly between 0 and pi/2")]
    FoldAngleOutOfRange(f32),
    #[error("open angle {open} must lie between the fold angle {fold} and pi/2")]
    OpenAngleOutOfRange { open: f32, fold: f32 },
    #[error("{name} must be positive and finite, got {value}")]
    InvalidDimension { name: &'static str, value: f32 },
    #[error("petal tips leave {rectangle_height} for the straight section; the flower is too short to fold closed")]
    ShapeInfeasible { rectangle_height: f32 },
}

/// Triangles of the flat petal outline, as indices into [`PetalTemplate::outline`].
pub const PETAL_TRIANGLES: [[u16; 3]; 4] = [[0, 1, 2], [1, 3, 2], [2, 3, 4], [4, 3, 5]];

/// Number of bones along a petal's axis (base, two inner joints, tip).
pub const PETAL_BONES: usize = 4;

/// Flat petal geometry shared by every petal of a flower.
///
/// A petal is a rectangle with a triangular cap at each end:
///
/// ```text
///        0
///       / \        tip_height
///      1---2
///      |   |       rectangle_height
///      3---4
///       \ /        tip_height
///        5
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PetalTemplate {
    pub tip_height: f32,
    pub tip_width: f32,
    pub rectangle_height: f32,
}

impl PetalTemplate {
    /// Derive the template for a design.
    ///
    /// The tip height is chosen so that a petal folded by `fold_angle` at both
    /// joints closes exactly onto the flower axis, with neighbouring petals
    /// meeting edge to edge.
    pub fn solve(design: &FlowerDesign) -> Result<Self, ShapeError> {
        design.validate()?;

        let half_slot = PI / design.petal_count as f32;
        let petal_width = 2.0 * design.flower_radius * half_slot.sin();
        let tip_height = (petal_width / 2.0) / half_slot.tan() / design.fold_angle.sin();
        let rectangle_height =
            design.flower_height - 2.0 * tip_height * design.fold_angle.cos();

        if !(rectangle_height > 0.0) {
            return Err(ShapeError::ShapeInfeasible { rectangle_height });
        }

        Ok(Self {
            tip_height,
            tip_width: petal_width,
            rectangle_height,
        })
    }

    /// The six control points in the petal's local plane (x across, y along).
    pub fn outline(&self) -> [Vec2; 6] {
        let half = self.tip_width / 2.0;
        let t = self.tip_height;
        let r = self.rectangle_height;
        [
            Vec2::new(0.0, 0.0),
            Vec2::new(-half, t),
            Vec2::new(half, t),
            Vec2::new(-half, t + r),
            Vec2::new(half, t + r),
            Vec2::new(0.0, 2.0 * t + r),
        ]
    }

    /// Bone each control point is rigidly bound to.
    pub fn skin_indices(&self) -> [usize; 6] {
        std::array::from_fn(|i| (i + 1) >> 1)
    }

    /// Distance of each bone from the petal base, measured along the flat petal.
    pub fn bone_offsets(&self) -> [f32; PETAL_BONES] {
        let t = self.tip_height;
        let r = self.rectangle_height;
        [0.0, t, t + r, 2.0 * t + r]
    }

    /// Full length of the unfolded petal.
    pub fn length(&self) -> f32 {
        2.0 * self.tip_height + self.rectangle_height
    }

    /// Bend the petal by `pose` and return its control points in petal space:
    /// x across the petal, y up, z radially outward from the flower axis.
    ///
    /// Each joint rotation tilts the rest of the chain upward from the
    /// horizontal, so `near` is the angle of the first segment and the
    /// following joints add to it.
    pub fn pose_points(&self, pose: &PetalPose) -> [Vec3; 6] {
        let offsets = self.bone_offsets();
        let joints = [pose.near, pose.mid, pose.far, 0.0];

        let mut bone_pos = [Vec3::ZERO; PETAL_BONES];
        let mut bone_angle = [0.0f32; PETAL_BONES];
        let mut angle = 0.0;
        for b in 0..PETAL_BONES {
            angle += joints[b];
            bone_angle[b] = angle;
            if b + 1 < PETAL_BONES {
                let seg = offsets[b + 1] - offsets[b];
                bone_pos[b + 1] = bone_pos[b] + along(angle) * seg;
            }
        }

        let outline = self.outline();
        let skin = self.skin_indices();
        std::array::from_fn(|i| {
            let b = skin[i];
            let residual = outline[i].y - offsets[b];
            bone_pos[b] + Vec3::X * outline[i].x + along(bone_angle[b]) * residual
        })
    }
}

/// Unit direction of a segment tilted `angle` up from the radial axis.
fn along(angle: f32) -> Vec3 {
    Vec3::new(0.0, angle.sin(), angle.cos())
}

/// Exact bit pattern of the shape-relevant design fields.
type TemplateKey = (u32, u32, u32, u32);

/// Hands out one shared template per distinct petal shape.
#[derive(Default)]
pub struct TemplateFactory {
    cache: HashMap<TemplateKey, Arc<PetalTemplate>>,
}

impl TemplateFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared template for `design`, solving it on first request.
    pub fn template_for(&mut self, design: &FlowerDesign) -> Result<Arc<PetalTemplate>, ShapeError> {
        let key = (
            design.petal_count,
            design.fold_angle.to_bits(),
            design.flower_radius.to_bits(),
            design.flower_height.to_bits(),
        );
        if let Some(template) = self.cache.get(&key) {
            // Open angle is not part of the key but still has to be valid.
            design.validate()?;
            return Ok(Arc::clone(template));
        }
        let template = Arc::new(PetalTemplate::solve(design)?);
        self.cache.insert(key, Arc::clone(&template));
        Ok(template)
    }

    /// Number of distinct templates built so far.
    pub fn len(&self) -> usize {
        self.cache.len()
    }
}
