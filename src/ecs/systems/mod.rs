pub mod attention;
pub mod bloom;
pub mod flight;
pub mod pose;

use glam::Vec3;

use crate::attention::OpenFlowerSnapshot;
use crate::debug::timer::{SystemPhase, SystemTimers};

/// What happened during one tick, for the overlay.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickReport {
    pub open_flowers: usize,
    pub goals_assigned: usize,
    pub arrived: usize,
    pub stalled: usize,
}

/// Run all simulation systems for one fixed tick covering `[then, then + dt)`.
#[allow(clippy::too_many_arguments)]
pub fn tick(
    world: &mut hecs::World,
    then: f64,
    dt: f64,
    focus: Vec3,
    attention_radius: f32,
    rng: &mut fastrand::Rng,
    snapshot: &mut OpenFlowerSnapshot,
    timers: &mut SystemTimers,
) -> TickReport {
    let now = then + dt;
    let mut report = TickReport::default();

    // 1. Freeze which flowers are open before anything moves
    timers.begin();
    attention::snapshot(world, snapshot);
    report.open_flowers = snapshot.open_count();
    timers.end(SystemPhase::Snapshot);

    // 2. Gaze focus decides which flowers want to open
    timers.begin();
    attention::update_desired(world, focus, attention_radius);
    timers.end(SystemPhase::Attention);

    // 3. Rate-limited opening/closing
    timers.begin();
    bloom::update(world, dt as f32);
    timers.end(SystemPhase::Bloom);

    // 4. Joint angles for flowers that moved
    timers.begin();
    pose::update(world);
    timers.end(SystemPhase::Pose);

    // 5. New goals for butterflies that landed
    timers.begin();
    report.goals_assigned = attention::assign_goals(world, snapshot, rng);
    timers.end(SystemPhase::Goals);

    // 6. Fly
    timers.begin();
    let (arrived, stalled) = flight::update(world, then, now, rng);
    report.arrived = arrived;
    report.stalled = stalled;
    timers.end(SystemPhase::Flight);

    report
}
