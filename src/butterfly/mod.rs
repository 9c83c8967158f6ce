pub mod steering;

use std::f32::consts::TAU;

use glam::Vec3;

use crate::config::GardenConfig;
use crate::ecs::components::{Appearance, Orientation, Position, PrevPosition, WingBeat};
use crate::util::color;
use steering::{Steering, GLIDE_PITCH};

/// Wing angle at the top of a flap (radians from flat).
const WING_SWEEP: f32 = 1.2;
/// Flaps per second.
const FLAP_RATE: f64 = 4.0;

impl WingBeat {
    /// Flap state at simulation time `now`. Same for every butterfly.
    pub fn at(now: f64) -> Self {
        let phase = ((1.0 + (std::f64::consts::TAU * FLAP_RATE * now).sin()) / 2.0) as f32;
        let angle = phase * WING_SWEEP;
        Self {
            phase,
            left: angle,
            right: -angle,
        }
    }
}

/// Release a flock of butterflies at random spots over the garden.
pub fn spawn_flock(world: &mut hecs::World, config: &GardenConfig, rng: &mut fastrand::Rng) -> usize {
    let half = config.half_extent();
    let (slow, fast) = config.butterfly_speed;

    for _ in 0..config.butterfly_count {
        let pos = Vec3::new(
            -half + rng.f32() * 2.0 * half,
            0.1 + rng.f32() * 0.9,
            -half + rng.f32() * 2.0 * half,
        );
        let speed = slow + rng.f32() * (fast - slow);

        world.spawn((
            Position(pos),
            PrevPosition(pos),
            Steering::new(pos, speed, rng.f32() * TAU),
            Orientation {
                yaw: rng.f32() * TAU,
                pitch: GLIDE_PITCH,
            },
            WingBeat::at(0.0),
            Appearance {
                color: random_wing_color(rng),
                size: 0.7 + rng.f32() * 0.6,
            },
        ));
    }

    log::info!("Released {} butterflies", config.butterfly_count);
    config.butterfly_count
}

/// Random butterfly-ish wing colour.
fn random_wing_color(rng: &mut fastrand::Rng) -> u32 {
    let palette: &[[u8; 3]] = &[
        [255, 140, 0],   // monarch
        [250, 250, 240], // cabbage white
        [255, 220, 60],  // brimstone
        [70, 130, 255],  // morpho
        [200, 60, 60],   // red admiral
        [160, 110, 200], // purple emperor
    ];
    let [r, g, b] = palette[rng.usize(0..palette.len())];
    color::pack_rgba(r, g, b, 0xFF)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wing_phase_follows_time() {
        assert!((WingBeat::at(0.0).phase - 0.5).abs() < 1e-6);
        let up = WingBeat::at(1.0 / 16.0);
        assert!((up.phase - 1.0).abs() < 1e-6);
        assert!((up.left - WING_SWEEP).abs() < 1e-6);
        assert_eq!(up.right, -up.left);
        assert!(WingBeat::at(3.0 / 16.0).phase.abs() < 1e-6);
    }

    #[test]
    fn flock_spawns_parked_over_the_garden() {
        let mut world = hecs::World::new();
        let config = GardenConfig::default();
        let mut rng = fastrand::Rng::with_seed(9);
        assert_eq!(spawn_flock(&mut world, &config, &mut rng), 12);

        let half = config.half_extent();
        for (_, (pos, steering)) in world.query::<(&Position, &Steering)>().iter() {
            assert!(pos.0.x.abs() <= half && pos.0.z.abs() <= half);
            assert!(steering.has_arrived(pos.0));
            assert!((0.6..=1.2).contains(&steering.speed));
        }
    }
}
