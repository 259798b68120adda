use rand::rngs::StdRng;

use tumble_engine::coords::Vec2;
use tumble_engine::render::DebugRenderer;

use super::{DemoEntry, Scene};
use crate::harness::default_draw;
use crate::space::{RigidBodyHandle, ShapeProps, Space, NOT_GRABBABLE_FILTER};

pub const JOINTS: DemoEntry = DemoEntry {
    name: "Joints",
    timestep: 1.0 / 60.0,
    init,
};

const CELL_WIDTH: f32 = 200.0;
const CELL_HEIGHT: f32 = 220.0;
const BALL_RADIUS: f32 = 15.0;

/// Bottom-left corners of the cells, left to right then top to bottom.
const CELLS: [Vec2; 6] = [
    Vec2::new(-300.0, 0.0),
    Vec2::new(-100.0, 0.0),
    Vec2::new(100.0, 0.0),
    Vec2::new(-300.0, -220.0),
    Vec2::new(-100.0, -220.0),
    Vec2::new(100.0, -220.0),
];

/// One labelled cell per joint type, each built from a wheel pinned to the
/// world and a free body hooked to it.
struct Joints {
    space: Space,
    labels: Vec<(Vec2, &'static str)>,
}

fn add_ball(space: &mut Space, pos: Vec2) -> RigidBodyHandle {
    let body = space.add_dynamic(pos, 0.0);
    space.add_circle(body, BALL_RADIUS, Vec2::zero(), ShapeProps::default().with_mass(1.0));
    body
}

/// Ball free to spin around its center.
fn add_wheel(space: &mut Space, pos: Vec2) -> RigidBodyHandle {
    let body = add_ball(space, pos);
    let ground = space.static_body();
    space.add_pivot(ground, body, pos, Vec2::zero());
    body
}

fn add_cell_walls(space: &mut Space, corner: Vec2) {
    let ground = space.static_body();
    let props = ShapeProps::default().with_friction(1.0).with_filter(NOT_GRABBABLE_FILTER);
    let (w, h) = (CELL_WIDTH, CELL_HEIGHT);
    space.add_segment(ground, corner, corner + Vec2::new(w, 0.0), 0.0, props);
    space.add_segment(ground, corner, corner + Vec2::new(0.0, h), 0.0, props);
    space.add_segment(ground, corner + Vec2::new(w, 0.0), corner + Vec2::new(w, h), 0.0, props);
}

fn init(_rng: &mut StdRng) -> Box<dyn Scene> {
    let mut space = Space::new();
    space.set_iterations(10);
    space.set_gravity(Vec2::new(0.0, -100.0));

    for corner in CELLS {
        add_cell_walls(&mut space, corner);
    }

    let left = Vec2::new(60.0, 140.0);
    let right = Vec2::new(140.0, 140.0);
    let mut labels = Vec::with_capacity(CELLS.len());

    // Pivot: a pendulum hung from the wheel's rim.
    let c = CELLS[0];
    let wheel = add_wheel(&mut space, c + left);
    let bob = add_ball(&mut space, c + right);
    space.add_pivot_at(wheel, bob, c + (left + right) * 0.5);
    labels.push((c, "Pivot"));

    // Slide: a slack rope of at most 90 units.
    let c = CELLS[1];
    let wheel = add_wheel(&mut space, c + left);
    let bob = add_ball(&mut space, c + right);
    space.add_slide(wheel, bob, Vec2::new(BALL_RADIUS, 0.0), Vec2::zero(), 90.0);
    labels.push((c, "Slide"));

    // Groove: the ball rides a horizontal rail.
    let c = CELLS[2];
    let ground = space.static_body();
    let bob = add_ball(&mut space, c + Vec2::new(100.0, 160.0));
    space.add_groove(ground, bob, c + Vec2::new(30.0, 160.0), c + Vec2::new(170.0, 160.0), Vec2::zero());
    labels.push((c, "Groove"));

    // Damped spring: the ball bounces below the wheel.
    let c = CELLS[3];
    let wheel = add_wheel(&mut space, c + left);
    let bob = add_ball(&mut space, c + right);
    space.add_damped_spring(wheel, bob, Vec2::new(BALL_RADIUS, 0.0), Vec2::zero(), 60.0, 100.0, 1.0);
    labels.push((c, "Damped Spring"));

    // Weld: the ball is rigidly fixed to the wheel and swings it round.
    let c = CELLS[4];
    let wheel = add_wheel(&mut space, c + left);
    let bob = add_ball(&mut space, c + right);
    space.add_weld(wheel, bob, right - left, Vec2::zero());
    labels.push((c, "Weld"));

    // Motor: drives the wheel, which drags a pendulum around.
    let c = CELLS[5];
    let ground = space.static_body();
    let wheel = add_ball(&mut space, c + left);
    space.add_motor(ground, wheel, c + left, Vec2::zero(), std::f32::consts::PI);
    let bob = add_ball(&mut space, c + right);
    space.add_pivot_at(wheel, bob, c + (left + right) * 0.5);
    labels.push((c, "Motor"));

    Box::new(Joints { space, labels })
}

impl Scene for Joints {
    fn space(&self) -> &Space {
        &self.space
    }

    fn space_mut(&mut self) -> &mut Space {
        &mut self.space
    }

    fn draw(&self, renderer: &mut DebugRenderer) {
        default_draw(&self.space, renderer);

        let color = renderer.state.text_color;
        for (corner, label) in &self.labels {
            renderer.text(*corner + Vec2::new(10.0, CELL_HEIGHT - 10.0), label, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::JointKind;
    use rand::SeedableRng;

    #[test]
    fn each_cell_shows_its_joint() {
        let scene = init(&mut StdRng::seed_from_u64(0));
        let space = scene.space();
        let kinds: Vec<_> = space.joint_handles().filter_map(|j| space.joint_kind(j)).collect();

        assert!(kinds.iter().any(|k| matches!(k, JointKind::Slide { max } if *max == 90.0)));
        assert!(kinds.iter().any(|k| matches!(k, JointKind::Groove { .. })));
        assert!(kinds.iter().any(|k| matches!(k, JointKind::DampedSpring { rest_length } if *rest_length == 60.0)));
        assert!(kinds.iter().any(|k| matches!(k, JointKind::Weld)));
        assert!(kinds.iter().any(|k| matches!(k, JointKind::Motor { .. })));
        // Four wheel pins plus two pendulum pivots.
        assert_eq!(kinds.iter().filter(|k| matches!(k, JointKind::Pivot)).count(), 6);
    }

    #[test]
    fn labels_are_drawn() {
        let scene = init(&mut StdRng::seed_from_u64(0));
        let mut renderer = DebugRenderer::new();
        renderer.begin(640, 480);
        scene.draw(&mut renderer);
        assert!(!renderer.frame().is_empty());
    }
}
