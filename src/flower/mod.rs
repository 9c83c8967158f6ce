pub mod bloom;
pub mod pose;
pub mod shape;

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, TAU};
use std::sync::Arc;

use glam::{Quat, Vec3};

use crate::config::GardenConfig;
use crate::ecs::components::GroundPosition;
use crate::error::GardenError;
use crate::util::color;
use bloom::Bloom;
use pose::PetalPose;
use shape::{PetalTemplate, ShapeError, TemplateFactory};

/// Designer parameters of one flower. Angles in radians, lengths in metres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowerDesign {
    pub petal_count: u32,
    /// Bend of each joint of a closed petal, measured from vertical.
    pub fold_angle: f32,
    /// Splay of a fully open petal, measured from vertical.
    pub open_angle: f32,
    pub flower_radius: f32,
    pub flower_height: f32,
    pub stem_radius: f32,
    pub stem_height: f32,
    /// RGBA packed as u32.
    pub petal_color: u32,
    /// RGBA packed as u32.
    pub stem_color: u32,
}

impl Default for FlowerDesign {
    fn default() -> Self {
        Self {
            petal_count: 5,
            fold_angle: FRAC_PI_4,
            open_angle: FRAC_PI_2,
            flower_radius: 0.1,
            flower_height: 0.3,
            stem_radius: 0.01,
            stem_height: 0.4,
            petal_color: color::hsl(0.9, 0.5, 0.5),
            stem_color: color::hsl(0.33, 1.0, 0.5),
        }
    }
}

impl FlowerDesign {
    pub fn validate(&self) -> Result<(), ShapeError> {
        if self.petal_count < 3 {
            return Err(ShapeError::TooFewPetals(self.petal_count));
        }
        if !(self.fold_angle > 0.0 && self.fold_angle < FRAC_PI_2) {
            return Err(ShapeError::FoldAngleOutOfRange(self.fold_angle));
        }
        if !(self.open_angle >= self.fold_angle && self.open_angle <= FRAC_PI_2) {
            return Err(ShapeError::OpenAngleOutOfRange {
                open: self.open_angle,
                fold: self.fold_angle,
            });
        }
        for (name, value) in [
            ("flower radius", self.flower_radius),
            ("flower height", self.flower_height),
            ("stem radius", self.stem_radius),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ShapeError::InvalidDimension { name, value });
            }
        }
        if !(self.stem_height >= 0.0 && self.stem_height.is_finite()) {
            return Err(ShapeError::InvalidDimension {
                name: "stem height",
                value: self.stem_height,
            });
        }
        Ok(())
    }
}

/// A built flower: its design, the shared petal template, and where each
/// petal sits around the stem.
#[derive(Debug, Clone)]
pub struct Flower {
    pub design: FlowerDesign,
    pub template: Arc<PetalTemplate>,
    /// Rotation of petal `i` about the stem, `i * 2pi / count`.
    pub petal_offsets: Vec<f32>,
}

impl Flower {
    pub fn new(design: FlowerDesign, factory: &mut TemplateFactory) -> Result<Self, ShapeError> {
        let template = factory.template_for(&design)?;
        let count = design.petal_count;
        let petal_offsets = (0..count).map(|i| i as f32 / count as f32 * TAU).collect();
        Ok(Self {
            design,
            template,
            petal_offsets,
        })
    }

    pub fn pose_for(&self, open_ratio: f32) -> PetalPose {
        PetalPose::from_ratio(open_ratio, self.design.fold_angle, self.design.open_angle)
    }

    /// Height above the ground where petals meet the stem.
    pub fn attachment_height(&self) -> f32 {
        self.design.stem_height
    }

    /// Control points of petal `index` in flower space (origin at the stem foot).
    pub fn petal_points(&self, index: usize, pose: &PetalPose) -> [Vec3; 6] {
        let spin = Quat::from_rotation_y(self.petal_offsets[index]);
        let lift = Vec3::Y * self.attachment_height();
        self.template.pose_points(pose).map(|p| spin * p + lift)
    }
}

/// Draw a random flower design from the configured ranges.
pub fn random_design(config: &GardenConfig, index: usize, rng: &mut fastrand::Rng) -> FlowerDesign {
    let r = &config.flowers;
    FlowerDesign {
        petal_count: rng.u32(r.petal_count.0..=r.petal_count.1),
        fold_angle: r.fold_angle,
        open_angle: r.open_angle,
        flower_radius: r.flower_radius.0 + rng.f32() * (r.flower_radius.1 - r.flower_radius.0),
        flower_height: r.flower_height,
        stem_radius: r.stem_radius,
        stem_height: r.stem_height.0 + rng.f32() * (r.stem_height.1 - r.stem_height.0),
        petal_color: color::hsl(rng.f32(), 0.5, 0.5),
        stem_color: color::hsl((index % 3) as f32 / 3.0, 1.0, 0.5),
    }
}

/// Plant a square grid of random flowers. Returns how many were planted.
///
/// Designs that cannot fold are skipped with a warning; the garden only fails
/// if nothing could be planted at all. Out-of-range design parameters are a
/// configuration mistake shared by every flower and fail immediately.
pub fn spawn_garden(
    world: &mut hecs::World,
    config: &GardenConfig,
    factory: &mut TemplateFactory,
    rng: &mut fastrand::Rng,
) -> Result<usize, GardenError> {
    let n = config.grid_size;
    let half = config.half_extent();
    let mut planted = 0;

    for i in 0..n * n {
        let design = random_design(config, i, rng);
        let flower = match Flower::new(design, factory) {
            Ok(flower) => flower,
            Err(e @ ShapeError::ShapeInfeasible { .. }) => {
                log::warn!("Skipping flower {i}: {e}");
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let pos = Vec3::new(
            -half + (i % n) as f32 * config.spacing,
            0.0,
            -half + (i / n) as f32 * config.spacing,
        );
        let bloom = Bloom::new(config.opening_duration, config.closing_duration);
        let pose = flower.pose_for(bloom.open_ratio);

        world.spawn((GroundPosition(pos), flower, bloom, pose));
        planted += 1;
    }

    if planted == 0 {
        return Err(GardenError::EmptyGarden);
    }
    log::info!(
        "Planted {} flowers sharing {} petal templates",
        planted,
        factory.len()
    );
    Ok(planted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn petals_are_spread_evenly() {
        let mut factory = TemplateFactory::new();
        let flower = Flower::new(FlowerDesign::default(), &mut factory).unwrap();
        assert_eq!(flower.petal_offsets.len(), 5);
        assert_eq!(flower.petal_offsets[0], 0.0);
        assert!((flower.petal_offsets[1] - TAU / 5.0).abs() < 1e-6);
    }

    #[test]
    fn petal_points_start_at_the_stem_top() {
        let mut factory = TemplateFactory::new();
        let flower = Flower::new(FlowerDesign::default(), &mut factory).unwrap();
        let pose = flower.pose_for(1.0);
        for i in 0..flower.petal_offsets.len() {
            let pts = flower.petal_points(i, &pose);
            assert!((pts[0] - Vec3::Y * 0.4).length() < 1e-6);
        }
        // A quarter turn points petal 0 down +z; open petals lie flat.
        let tip = flower.petal_points(0, &pose)[5];
        assert!(tip.z > 0.0);
        assert!((tip.y - 0.4).abs() < 1e-5);
    }

    #[test]
    fn validate_rejects_wide_open_angle() {
        let d = FlowerDesign {
            open_angle: 2.0,
            ..FlowerDesign::default()
        };
        assert!(matches!(
            d.validate(),
            Err(ShapeError::OpenAngleOutOfRange { .. })
        ));
    }

    #[test]
    fn default_garden_plants_every_cell() {
        let mut world = hecs::World::new();
        let config = GardenConfig {
            grid_size: 6,
            ..GardenConfig::default()
        };
        let mut rng = fastrand::Rng::with_seed(3);
        let mut factory = TemplateFactory::new();
        let planted = spawn_garden(&mut world, &config, &mut factory, &mut rng).unwrap();
        assert_eq!(planted, 36);
        for (_, (flower, bloom)) in world.query::<(&Flower, &Bloom)>().iter() {
            assert!((3..=8).contains(&flower.design.petal_count));
            assert_eq!(bloom.open_ratio, 0.0);
        }
    }

    #[test]
    fn unbuildable_garden_is_an_error() {
        let mut world = hecs::World::new();
        let mut config = GardenConfig {
            grid_size: 2,
            ..GardenConfig::default()
        };
        config.flowers.flower_height = 0.01;
        let mut rng = fastrand::Rng::with_seed(3);
        let mut factory = TemplateFactory::new();
        assert!(matches!(
            spawn_garden(&mut world, &config, &mut factory, &mut rng),
            Err(GardenError::EmptyGarden)
        ));
        assert_eq!(world.len(), 0);
    }

    #[test]
    fn invalid_design_ranges_are_reported_as_shape_errors() {
        let mut world = hecs::World::new();
        let mut config = GardenConfig {
            grid_size: 2,
            ..GardenConfig::default()
        };
        config.flowers.open_angle = config.flowers.fold_angle / 2.0;
        let mut rng = fastrand::Rng::with_seed(3);
        let mut factory = TemplateFactory::new();
        assert!(matches!(
            spawn_garden(&mut world, &config, &mut factory, &mut rng),
            Err(GardenError::Shape(ShapeError::OpenAngleOutOfRange { .. }))
        ));
        assert_eq!(world.len(), 0);
    }
}
