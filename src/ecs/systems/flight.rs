use crate::butterfly::steering::{SteerOutcome, Steering};
use crate::ecs::components::{Orientation, Position, PrevPosition, WingBeat};

/// Fly every butterfly over `[then, now)` and refresh its wing flap.
/// Returns (arrived, stalled) counts.
pub fn update(
    world: &mut hecs::World,
    then: f64,
    now: f64,
    rng: &mut fastrand::Rng,
) -> (usize, usize) {
    let wings = WingBeat::at(now);
    let mut arrived = 0;
    let mut stalled = 0;

    for (_, (pos, prev_pos, steering, orientation, wing)) in world.query_mut::<(
        &mut Position,
        &mut PrevPosition,
        &mut Steering,
        &mut Orientation,
        &mut WingBeat,
    )>() {
        // Store previous position for render interpolation
        prev_pos.0 = pos.0;

        match steering.advance(&mut pos.0, &mut orientation.yaw, then, now, rng) {
            SteerOutcome::Arrived => arrived += 1,
            SteerOutcome::Stalled => stalled += 1,
            SteerOutcome::Travelling => {}
        }
        *wing = wings;
    }

    (arrived, stalled)
}
