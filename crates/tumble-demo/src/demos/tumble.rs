use rand::rngs::StdRng;

use tumble_engine::coords::Vec2;

use super::{BasicScene, DemoEntry, Scene};
use crate::space::{ShapeProps, Space, NOT_GRABBABLE_FILTER};

pub const TUMBLE: DemoEntry = DemoEntry {
    name: "Tumble",
    timestep: 1.0 / 180.0,
    init,
};

const SPIN_RATE: f32 = 0.4;

fn init(_rng: &mut StdRng) -> Box<dyn Scene> {
    let mut space = Space::new();
    space.set_gravity(Vec2::new(0.0, -600.0));

    // Hollow kinematic box turning at a constant rate.
    let container = space.add_kinematic(Vec2::zero());
    space.set_angular_velocity(container, SPIN_RATE);

    let wall = ShapeProps::default()
        .with_friction(1.0)
        .with_elasticity(1.0)
        .with_filter(NOT_GRABBABLE_FILTER);
    let corners = [
        Vec2::new(-200.0, -200.0),
        Vec2::new(-200.0, 200.0),
        Vec2::new(200.0, 200.0),
        Vec2::new(200.0, -200.0),
    ];
    for i in 0..corners.len() {
        let (a, b) = (corners[i], corners[(i + 1) % corners.len()]);
        space.add_segment(container, a, b, 0.0, wall);
    }

    let (width, height) = (30.0, 60.0);
    let props = ShapeProps::default().with_mass(1.0).with_friction(0.7);
    for i in 0..6 {
        for j in 0..5 {
            let pos = Vec2::new(j as f32 * 60.0 - 150.0, i as f32 * 60.0 - 150.0);
            let body = space.add_dynamic(pos, 0.0);
            match (i + j) % 3 {
                0 => {
                    space.add_box(body, width, height, 0.0, props);
                }
                1 => {
                    let half = (height - width) * 0.5;
                    space.add_segment(body, Vec2::new(0.0, half), Vec2::new(0.0, -half), width * 0.5, props);
                }
                _ => {
                    space.add_circle(body, width * 0.5, Vec2::zero(), props);
                }
            }
        }
    }

    Box::new(BasicScene(space))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::BodyKind;
    use approx::assert_relative_eq;
    use rand::SeedableRng;

    #[test]
    fn container_turns_at_constant_rate() {
        let mut scene = init(&mut StdRng::seed_from_u64(0));
        let space = scene.space_mut();
        let container = space
            .body_handles()
            .find(|b| space.body_kind(*b) == Some(BodyKind::Kinematic))
            .unwrap();
        for _ in 0..60 {
            space.step(1.0 / 60.0);
        }
        let angle = space.body(container).unwrap().rotation().angle();
        assert_relative_eq!(angle, SPIN_RATE, epsilon = 1e-3);
    }
}
