use std::f64::consts::TAU;

use glam::Vec3;

use crate::util::rng::RandomSource;

/// Closer than this counts as being at a point (metres).
pub const STOP_EPS: f32 = 0.01;
/// Within this distance of the goal the butterfly flies straight in.
pub const NEAR: f32 = 1.0;
/// Waypoint regenerations plus moves allowed in one tick.
pub const MAX_SUBSTEPS: u32 = 64;
/// Pitch held while gliding.
pub const GLIDE_PITCH: f32 = 0.0;
/// Half-width of the sideways jitter added to each waypoint.
const WANDER: f32 = 1.0;
/// Altitude band waypoints are drawn from.
const WAYPOINT_ALTITUDE: (f32, f32) = (0.1, 1.0);

/// Result of advancing a butterfly over one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SteerOutcome {
    /// At the goal; waiting for a new one.
    Arrived,
    /// Used the whole tick flying.
    Travelling,
    /// Could not use the whole tick (no speed, or sub-step budget spent).
    Stalled,
}

/// Waypoint-following state of one butterfly.
///
/// The butterfly never flies straight at its goal while far away. It hops
/// between waypoints that creep toward the goal by a random fraction and
/// wander sideways, then dives straight in once within [`NEAR`].
#[derive(Debug, Clone, Copy)]
pub struct Steering {
    pub goal: Vec3,
    pub next_stop: Vec3,
    /// Cruising speed (m/s).
    pub speed: f32,
    /// Phase offset of the vertical bob.
    pub seed: f32,
}

impl Steering {
    /// A butterfly parked at `position`, already "arrived" so it gets a goal
    /// on the next tick.
    pub fn new(position: Vec3, speed: f32, seed: f32) -> Self {
        Self {
            goal: position,
            next_stop: position,
            speed,
            seed,
        }
    }

    pub fn has_arrived(&self, position: Vec3) -> bool {
        position.distance(self.goal) < STOP_EPS
    }

    /// Fly from `then` to `now` (simulation seconds), updating `position` and
    /// `yaw` in place.
    ///
    /// The tick is split at every waypoint so corners and speed do not depend
    /// on tick length.
    ///
    /// The vertical bob is sampled once per call and scaled by each sub-step's
    /// full length, so it only stays small next to the waypoint correction for
    /// short ticks. Over a single multi-second call a butterfly whose bob is
    /// out of phase can hover above a waypoint and end `Travelling`. The
    /// scheduler always passes one 10 ms tick.
    pub fn advance(
        &mut self,
        position: &mut Vec3,
        yaw: &mut f32,
        then: f64,
        now: f64,
        rng: &mut impl RandomSource,
    ) -> SteerOutcome {
        let bob = (TAU * now + self.seed as f64).sin();
        let mut t = then;
        let mut budget = MAX_SUBSTEPS;

        while t < now {
            if budget == 0 {
                log::debug!(
                    "Butterfly at {:?} spent {} sub-steps, dropping {:.3}s",
                    position,
                    MAX_SUBSTEPS,
                    now - t
                );
                return SteerOutcome::Stalled;
            }
            budget -= 1;

            let to_stop = position.distance(self.next_stop);
            if to_stop < STOP_EPS {
                let to_goal = position.distance(self.goal);
                if to_goal < STOP_EPS {
                    return SteerOutcome::Arrived;
                }
                self.next_stop = if to_goal < NEAR {
                    self.goal
                } else {
                    self.wander(to_goal, rng)
                };
                continue;
            }

            if !(self.speed > 0.0 && self.speed.is_finite()) {
                return SteerOutcome::Stalled;
            }

            let time_to_stop = (to_stop / self.speed) as f64;
            let step = time_to_stop.min(now - t);
            let delta = self.next_stop - *position;
            *yaw = delta.x.atan2(delta.z);
            *position = position.lerp(self.next_stop, (step / time_to_stop) as f32);
            position.y += (step * bob) as f32;
            t += step;
        }

        if self.has_arrived(*position) {
            SteerOutcome::Arrived
        } else {
            SteerOutcome::Travelling
        }
    }

    /// Next waypoint: a random fraction of the way to the goal, then jittered
    /// sideways and given a fresh altitude.
    fn wander(&self, to_goal: f32, rng: &mut impl RandomSource) -> Vec3 {
        let mut stop = self.next_stop.lerp(self.goal, rng.unit() / to_goal);
        stop.x += rng.range(-WANDER, WANDER);
        stop.z += rng.range(-WANDER, WANDER);
        stop.y = rng.range(WAYPOINT_ALTITUDE.0, WAYPOINT_ALTITUDE.1);
        stop
    }
}
