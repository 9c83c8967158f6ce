use glam::Vec3;

use crate::attention::{self, OpenFlowerSnapshot};
use crate::butterfly::steering::Steering;
use crate::ecs::components::{GroundPosition, Position};
use crate::flower::bloom::Bloom;
use crate::flower::Flower;

/// Rebuild the open-flower snapshot from current bloom states.
pub fn snapshot(world: &hecs::World, snapshot: &mut OpenFlowerSnapshot) {
    snapshot.clear();
    for (_, (ground, flower, bloom)) in world
        .query::<(&GroundPosition, &Flower, &Bloom)>()
        .iter()
    {
        let landing = ground.0 + Vec3::Y * flower.attachment_height();
        snapshot.push(landing, bloom.is_open());
    }
}

/// Open flowers near the focus point, close the rest.
pub fn update_desired(world: &mut hecs::World, focus: Vec3, attention_radius: f32) {
    for (_, (ground, bloom)) in world.query_mut::<(&GroundPosition, &mut Bloom)>() {
        bloom.set_desired(attention::wants_open(ground.0, focus, attention_radius));
    }
}

/// Give every butterfly sitting on its goal a new flower to visit.
/// Returns how many goals were handed out.
pub fn assign_goals(
    world: &mut hecs::World,
    snapshot: &OpenFlowerSnapshot,
    rng: &mut fastrand::Rng,
) -> usize {
    let mut assigned = 0;
    for (entity, (pos, steering)) in world.query_mut::<(&Position, &mut Steering)>() {
        if !steering.has_arrived(pos.0) {
            continue;
        }
        if let Some(goal) = snapshot.pick(rng) {
            log::debug!("Butterfly {:?} heading for {:?}", entity, goal);
            steering.goal = goal;
            assigned += 1;
        }
    }
    assigned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flower::shape::TemplateFactory;
    use crate::flower::FlowerDesign;

    fn plant(world: &mut hecs::World, at: Vec3, open: bool) -> hecs::Entity {
        let mut factory = TemplateFactory::new();
        let flower = Flower::new(FlowerDesign::default(), &mut factory).unwrap();
        let mut bloom = Bloom::new(1.0, 1.0);
        if open {
            bloom.set_desired(true);
            bloom.step(1.0);
        }
        let pose = flower.pose_for(bloom.open_ratio);
        world.spawn((GroundPosition(at), flower, bloom, pose))
    }

    #[test]
    fn snapshot_uses_landing_height() {
        let mut world = hecs::World::new();
        plant(&mut world, Vec3::new(2.0, 0.0, 3.0), true);
        plant(&mut world, Vec3::new(-2.0, 0.0, 3.0), false);

        let mut snap = OpenFlowerSnapshot::default();
        snapshot(&world, &mut snap);
        assert_eq!(snap.open_count(), 1);
        assert_eq!(snap.pool(), &[Vec3::new(2.0, 0.4, 3.0)]);
    }

    #[test]
    fn only_nearby_flowers_want_to_open() {
        let mut world = hecs::World::new();
        let near = plant(&mut world, Vec3::new(1.0, 0.0, 0.0), false);
        let far = plant(&mut world, Vec3::new(5.0, 0.0, 0.0), true);

        update_desired(&mut world, Vec3::ZERO, 2.0);
        assert_eq!(world.get::<&Bloom>(near).unwrap().desired_open_ratio, 1.0);
        assert_eq!(world.get::<&Bloom>(far).unwrap().desired_open_ratio, 0.0);
    }

    #[test]
    fn only_arrived_butterflies_get_goals() {
        let mut world = hecs::World::new();
        let parked = world.spawn((Position(Vec3::ZERO), Steering::new(Vec3::ZERO, 1.0, 0.0)));
        let mut busy_steering = Steering::new(Vec3::ZERO, 1.0, 0.0);
        busy_steering.goal = Vec3::new(9.0, 0.0, 9.0);
        let busy = world.spawn((Position(Vec3::ZERO), busy_steering));

        let mut snap = OpenFlowerSnapshot::default();
        snap.push(Vec3::new(4.0, 0.5, 4.0), true);
        let mut rng = fastrand::Rng::with_seed(1);

        assert_eq!(assign_goals(&mut world, &snap, &mut rng), 1);
        assert_eq!(
            world.get::<&Steering>(parked).unwrap().goal,
            Vec3::new(4.0, 0.5, 4.0)
        );
        assert_eq!(
            world.get::<&Steering>(busy).unwrap().goal,
            Vec3::new(9.0, 0.0, 9.0)
        );
    }
}
