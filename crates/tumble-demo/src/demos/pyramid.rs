use rand::rngs::StdRng;

use tumble_engine::coords::Vec2;

use super::{add_view_walls, BasicScene, DemoEntry, Scene};
use crate::space::{ShapeProps, Space, NOT_GRABBABLE_FILTER};

pub const PYRAMID_STACK: DemoEntry = DemoEntry {
    name: "Pyramid Stack",
    timestep: 1.0 / 180.0,
    init: init_stack,
};

pub const PYRAMID_TOPPLE: DemoEntry = DemoEntry {
    name: "Pyramid Topple",
    timestep: 1.0 / 180.0,
    init: init_topple,
};

const STACK_ROWS: usize = 14;

fn init_stack(_rng: &mut StdRng) -> Box<dyn Scene> {
    let mut space = Space::new();
    space.set_iterations(30);
    space.set_gravity(Vec2::new(0.0, -100.0));
    space.set_sleep_time_threshold(0.5);

    add_view_walls(&mut space, 1.0, 1.0);

    let block = ShapeProps::default().with_mass(1.0).with_friction(0.8);
    for i in 0..STACK_ROWS {
        for j in 0..=i {
            let pos = Vec2::new(j as f32 * 32.0 - i as f32 * 16.0, 300.0 - i as f32 * 32.0);
            let body = space.add_dynamic(pos, 0.0);
            space.add_box(body, 30.0, 30.0, 0.5, block);
        }
    }

    let radius = 15.0;
    let ball = space.add_dynamic(Vec2::new(0.0, -240.0 + radius + 5.0), 0.0);
    space.add_circle(ball, radius, Vec2::zero(), ShapeProps::default().with_mass(10.0).with_friction(0.9));

    Box::new(BasicScene(space))
}

const DOMINO_WIDTH: f32 = 4.0;
const DOMINO_HEIGHT: f32 = 30.0;
const TOPPLE_ROWS: usize = 12;

fn add_domino(space: &mut Space, pos: Vec2, flipped: bool) {
    let body = space.add_dynamic(pos, 0.0);
    let (w, h) = if flipped {
        (DOMINO_HEIGHT, DOMINO_WIDTH)
    } else {
        (DOMINO_WIDTH, DOMINO_HEIGHT)
    };
    space.add_box(body, w, h, 0.0, ShapeProps::default().with_mass(1.0).with_friction(0.6));
}

fn init_topple(_rng: &mut StdRng) -> Box<dyn Scene> {
    let mut space = Space::new();
    space.set_iterations(30);
    space.set_gravity(Vec2::new(0.0, -300.0));
    space.set_sleep_time_threshold(0.5);

    let ground = space.static_body();
    space.add_segment(
        ground,
        Vec2::new(-600.0, -240.0),
        Vec2::new(600.0, -240.0),
        0.0,
        ShapeProps::default()
            .with_friction(1.0)
            .with_elasticity(1.0)
            .with_filter(NOT_GRABBABLE_FILTER),
    );

    let (w, h) = (DOMINO_WIDTH, DOMINO_HEIGHT);
    let n = TOPPLE_ROWS;
    for i in 0..n {
        let row = n - i;
        for j in 0..row {
            let offset = Vec2::new(
                (j as f32 - (row - 1) as f32 * 0.5) * 1.5 * h,
                (i as f32 + 0.5) * (h + 2.0 * w) - w - 240.0,
            );
            add_domino(&mut space, offset, false);
            add_domino(&mut space, offset + Vec2::new(0.0, (h + w) * 0.5), true);

            if j == 0 {
                add_domino(&mut space, offset + Vec2::new(0.5 * (w - h), h + w), false);
            }

            if j != row - 1 {
                add_domino(&mut space, offset + Vec2::new(h * 0.75, (h + 3.0 * w) * 0.5), true);
            } else {
                add_domino(&mut space, offset + Vec2::new(0.5 * (h - w), h + w), false);
            }
        }
    }

    Box::new(BasicScene(space))
}
