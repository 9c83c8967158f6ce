use crate::flower::bloom::Bloom;
use crate::flower::pose::PetalPose;
use crate::flower::Flower;

/// Recompute joint angles of flowers whose open ratio changed.
/// Returns how many poses were rebuilt.
pub fn update(world: &mut hecs::World) -> usize {
    let mut rebuilt = 0;
    for (_, (flower, bloom, pose)) in
        world.query_mut::<(&Flower, &mut Bloom, &mut PetalPose)>()
    {
        if bloom.take_pose_stale() {
            *pose = flower.pose_for(bloom.open_ratio);
            rebuilt += 1;
        }
    }
    rebuilt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::systems::bloom;
    use crate::flower::shape::TemplateFactory;
    use crate::flower::FlowerDesign;

    #[test]
    fn pose_tracks_bloom() {
        let mut world = hecs::World::new();
        let mut factory = TemplateFactory::new();
        let flower = Flower::new(FlowerDesign::default(), &mut factory).unwrap();
        let closed = flower.pose_for(0.0);
        let mut b = Bloom::new(1.0, 1.0);
        b.set_desired(true);
        let e = world.spawn((flower, b, closed));

        assert_eq!(update(&mut world), 1);
        assert_eq!(update(&mut world), 0);

        bloom::update(&mut world, 0.25);
        assert_eq!(update(&mut world), 1);
        let pose = *world.get::<&PetalPose>(e).unwrap();
        let expected = world.get::<&Flower>(e).unwrap().pose_for(0.25);
        assert_eq!(pose, expected);
    }
}
