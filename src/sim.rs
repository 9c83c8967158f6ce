use glam::Vec3;

use crate::attention::{Gaze, OpenFlowerSnapshot};
use crate::butterfly;
use crate::config::GardenConfig;
use crate::debug::timer::SystemTimers;
use crate::ecs::systems::{self, TickReport};
use crate::error::GardenError;
use crate::flower;
use crate::flower::shape::TemplateFactory;

/// Target simulation tick rate (seconds per tick).
pub const TICK_RATE: f64 = 1.0 / 100.0;
/// Max accumulated time before we clamp (prevents spiral of death).
pub const MAX_ACCUMULATOR: f64 = 0.25;

/// Fixed-timestep accumulator. The only place simulation time advances.
#[derive(Debug, Clone)]
pub struct FixedStep {
    tick: f64,
    max_accumulator: f64,
    accumulator: f64,
}

impl FixedStep {
    pub fn new(tick: f64, max_accumulator: f64) -> Self {
        Self {
            tick,
            max_accumulator,
            accumulator: 0.0,
        }
    }

    pub fn tick(&self) -> f64 {
        self.tick
    }

    /// Add elapsed wall time and return how many ticks are now due.
    pub fn accumulate(&mut self, elapsed: f64) -> u32 {
        if elapsed.is_finite() && elapsed > 0.0 {
            self.accumulator = (self.accumulator + elapsed).min(self.max_accumulator);
        }
        let mut due = 0;
        while self.accumulator >= self.tick {
            self.accumulator -= self.tick;
            due += 1;
        }
        due
    }

    /// Interpolation alpha for rendering between ticks.
    pub fn alpha(&self) -> f32 {
        (self.accumulator / self.tick) as f32
    }
}

/// The whole garden: world, randomness, clock and viewer input.
pub struct Simulation {
    pub world: hecs::World,
    pub config: GardenConfig,
    pub gaze: Gaze,
    pub attention_radius: f32,
    pub paused: bool,
    pub timers: SystemTimers,
    pub last_report: TickReport,
    rng: fastrand::Rng,
    snapshot: OpenFlowerSnapshot,
    clock: FixedStep,
    time: f64,
    tick_count: u64,
    flower_count: usize,
}

impl Simulation {
    /// Plant the garden and release the flock.
    pub fn new(config: GardenConfig) -> Result<Self, GardenError> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        let mut world = hecs::World::new();
        let mut factory = TemplateFactory::new();
        let flower_count = flower::spawn_garden(&mut world, &config, &mut factory, &mut rng)?;
        butterfly::spawn_flock(&mut world, &config, &mut rng);

        Ok(Self {
            world,
            attention_radius: config.attention_radius,
            gaze: Gaze::default(),
            paused: false,
            timers: SystemTimers::new(),
            last_report: TickReport::default(),
            rng,
            snapshot: OpenFlowerSnapshot::with_capacity(flower_count),
            clock: FixedStep::new(TICK_RATE, MAX_ACCUMULATOR),
            time: 0.0,
            tick_count: 0,
            flower_count,
            config,
        })
    }

    /// Point the viewer's gaze from a pointer at window fraction `(u, v)`.
    pub fn set_pointer(&mut self, u: f32, v: f32) {
        self.gaze = Gaze::from_pointer(u, v);
    }

    pub fn focus(&self) -> Vec3 {
        self.gaze.focus()
    }

    /// Feed elapsed wall time; runs however many fixed ticks are due.
    pub fn advance(&mut self, elapsed: f64) -> u32 {
        let due = self.clock.accumulate(elapsed);
        if self.paused {
            return 0;
        }
        for _ in 0..due {
            self.step();
        }
        due
    }

    /// Run exactly one fixed tick.
    pub fn step(&mut self) {
        let focus = self.focus();
        self.last_report = systems::tick(
            &mut self.world,
            self.time,
            self.clock.tick(),
            focus,
            self.attention_radius,
            &mut self.rng,
            &mut self.snapshot,
            &mut self.timers,
        );
        self.time += self.clock.tick();
        self.tick_count += 1;
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn flower_count(&self) -> usize {
        self.flower_count
    }

    pub fn interpolation_alpha(&self) -> f32 {
        self.clock.alpha()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::butterfly::steering::Steering;
    use crate::ecs::components::{GroundPosition, Position};
    use crate::flower::bloom::Bloom;

    fn small_garden() -> Simulation {
        Simulation::new(GardenConfig {
            grid_size: 8,
            butterfly_count: 5,
            seed: Some(42),
            ..GardenConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn fixed_step_counts_ticks() {
        let mut clock = FixedStep::new(0.01, 0.25);
        assert_eq!(clock.accumulate(0.035), 3);
        assert!((clock.alpha() - 0.5).abs() < 1e-3);
        assert_eq!(clock.accumulate(0.005), 1);
    }

    #[test]
    fn fixed_step_clamps_stalls() {
        let mut clock = FixedStep::new(0.01, 0.25);
        let due = clock.accumulate(10.0);
        assert!((24..=25).contains(&due), "due {due}");
        assert_eq!(clock.accumulate(-1.0), 0);
        assert_eq!(clock.accumulate(f64::NAN), 0);
    }

    #[test]
    fn time_advances_once_per_tick() {
        let mut sim = small_garden();
        let ticks = sim.advance(0.1);
        assert_eq!(sim.tick_count(), ticks as u64);
        assert!((sim.time() - ticks as f64 * TICK_RATE).abs() < 1e-9);
    }

    #[test]
    fn paused_simulation_stands_still() {
        let mut sim = small_garden();
        sim.paused = true;
        assert_eq!(sim.advance(0.1), 0);
        assert_eq!(sim.tick_count(), 0);
    }

    #[test]
    fn first_tick_hands_out_goals() {
        let mut sim = small_garden();
        sim.step();
        assert_eq!(sim.last_report.goals_assigned, 5);
        for (_, (pos, steering)) in sim.world.query::<(&Position, &Steering)>().iter() {
            assert!(!steering.has_arrived(pos.0));
        }
    }

    #[test]
    fn flowers_under_the_gaze_open_and_attract_butterflies() {
        let mut sim = small_garden();
        // Straight down: the focus is the origin, at the centre of the garden.
        sim.set_pointer(0.5, 0.75);
        sim.attention_radius = 1.5;

        for _ in 0..300 {
            sim.step();
        }

        let mut open_near = 0;
        for (_, (ground, bloom)) in sim.world.query::<(&GroundPosition, &Bloom)>().iter() {
            let near = ground.0.length() < 1.5;
            assert_eq!(bloom.desired_open_ratio, if near { 1.0 } else { 0.0 });
            if near {
                assert_eq!(bloom.open_ratio, 1.0);
                open_near += 1;
            } else {
                assert_eq!(bloom.open_ratio, 0.0);
            }
        }
        assert!(open_near > 0);
        assert_eq!(sim.last_report.open_flowers, open_near);

        // Land every butterfly, then let the next tick hand out fresh goals.
        for (_, (pos, steering)) in sim.world.query_mut::<(&Position, &mut Steering)>() {
            steering.goal = pos.0;
        }
        sim.step();
        assert_eq!(sim.last_report.goals_assigned, 5);

        let landings: Vec<Vec3> = sim
            .world
            .query::<(&GroundPosition, &crate::flower::Flower, &Bloom)>()
            .iter()
            .filter(|(_, (_, _, b))| b.is_open())
            .map(|(_, (g, f, _))| g.0 + Vec3::Y * f.attachment_height())
            .collect();
        for (_, steering) in sim.world.query::<&Steering>().iter() {
            assert!(
                landings.iter().any(|l| l.distance(steering.goal) < 1e-6),
                "goal {:?} is not an open flower",
                steering.goal
            );
        }
    }
}
