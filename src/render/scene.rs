use glam::Vec3;

use super::instance::SpriteInstance;
use super::trail::ColorVertex;
use super::view::PlanView;
use crate::butterfly::steering::Steering;
use crate::ecs::components::{
    Appearance, GroundPosition, Orientation, Position, PrevPosition, WingBeat,
};
use crate::flower::pose::PetalPose;
use crate::flower::shape::PETAL_TRIANGLES;
use crate::flower::Flower;
use crate::util::color::{self, unpack_rgba};

/// Darkest shade of a petal facing sideways.
const MIN_LIGHT: f32 = 0.45;
/// Heart disc radius relative to the flower radius.
const HEART_SCALE: f32 = 0.35;

fn heart_color() -> u32 {
    color::hsl(0.13, 0.9, 0.55)
}

fn ring_color() -> u32 {
    color::pack_rgba(255, 255, 255, 140)
}

/// Skin every petal on the CPU and project the triangles onto the ground.
/// Faces tilted away from the overhead light are drawn darker.
pub fn build_petals(world: &hecs::World, view: &PlanView, out: &mut Vec<ColorVertex>) {
    out.clear();
    for (_, (ground, flower, pose)) in world
        .query::<(&GroundPosition, &Flower, &PetalPose)>()
        .iter()
    {
        let [r, g, b, _] = unpack_rgba(flower.design.petal_color);
        for i in 0..flower.petal_offsets.len() {
            let points = flower.petal_points(i, pose).map(|p| p + ground.0);
            for tri in PETAL_TRIANGLES {
                let [a, bb, c] = tri.map(|k| points[k as usize]);
                let normal = (bb - a).cross(c - a).normalize_or_zero();
                let light = MIN_LIGHT + (1.0 - MIN_LIGHT) * normal.y.abs();
                let color = [r * light, g * light, b * light, 1.0];
                for p in [a, bb, c] {
                    out.push(ColorVertex {
                        position: view.to_screen(p).into(),
                        color,
                    });
                }
            }
        }
    }
}

/// Flower hearts with their stems seen end-on, then butterflies, then the
/// gaze ring on top.
pub fn build_sprites(
    world: &hecs::World,
    view: &PlanView,
    alpha: f32,
    focus: Vec3,
    attention_radius: f32,
    out: &mut Vec<SpriteInstance>,
) {
    out.clear();

    for (_, (ground, flower)) in world.query::<(&GroundPosition, &Flower)>().iter() {
        let center = ground.0 + Vec3::Y * flower.attachment_height();
        out.push(SpriteInstance::disc(
            center,
            flower.design.flower_radius * HEART_SCALE,
            heart_color(),
            view,
        ));
        out.push(SpriteInstance::disc(
            ground.0,
            flower.design.stem_radius,
            flower.design.stem_color,
            view,
        ));
    }

    for (_, (pos, prev, orientation, wings, appearance)) in world
        .query::<(&Position, &PrevPosition, &Orientation, &WingBeat, &Appearance)>()
        .iter()
    {
        out.push(SpriteInstance::butterfly(
            pos,
            prev,
            orientation,
            wings,
            appearance,
            alpha,
            view,
        ));
    }

    out.push(SpriteInstance::focus_ring(
        focus,
        attention_radius,
        ring_color(),
        view,
    ));
}

/// One trail sample per butterfly, in a stable order.
pub fn trail_samples(world: &hecs::World, out: &mut Vec<(Vec3, [f32; 3])>) {
    out.clear();
    for (_, (pos, appearance, _)) in world
        .query::<(&Position, &Appearance, &Steering)>()
        .iter()
    {
        let [r, g, b, _] = unpack_rgba(appearance.color);
        out.push((pos.0, [r, g, b]));
    }
}
