use crate::flower::bloom::Bloom;

/// Step every flower's open ratio toward its desired value.
pub fn update(world: &mut hecs::World, dt: f32) {
    for (_, bloom) in world.query_mut::<&mut Bloom>() {
        bloom.step(dt);
    }
}
