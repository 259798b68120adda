//! Stress scenes for `--bench` and `--trial`. No interaction, just load.

use rand::rngs::StdRng;
use rand::Rng;

use tumble_engine::coords::Vec2;

use super::{add_view_walls, BasicScene, DemoEntry, Scene};
use crate::space::{ShapeProps, Space};

pub const MANY_CIRCLES: DemoEntry = DemoEntry {
    name: "Many Circles",
    timestep: 1.0 / 60.0,
    init: init_circles,
};

pub const MANY_BOXES: DemoEntry = DemoEntry {
    name: "Many Boxes",
    timestep: 1.0 / 60.0,
    init: init_boxes,
};

pub const COMPOUND_PILE: DemoEntry = DemoEntry {
    name: "Compound Pile",
    timestep: 1.0 / 60.0,
    init: init_compounds,
};

fn bench_space() -> Space {
    let mut space = Space::new();
    space.set_iterations(10);
    space.set_gravity(Vec2::new(0.0, -100.0));
    space.set_sleep_time_threshold(0.5);
    add_view_walls(&mut space, 1.0, 0.0);
    space
}

/// Grid of `count` cells `spacing` apart, rising from just above the floor,
/// jittered so the pile does not settle symmetrically.
fn grid(rng: &mut StdRng, count: usize, columns: usize, spacing: f32) -> Vec<Vec2> {
    let left = -(columns as f32 - 1.0) * spacing * 0.5;
    (0..count)
        .map(|i| {
            let (col, row) = (i % columns, i / columns);
            let jitter = rng.gen_range(-0.1..0.1);
            Vec2::new(left + col as f32 * spacing + jitter, -220.0 + row as f32 * spacing)
        })
        .collect()
}

fn init_circles(rng: &mut StdRng) -> Box<dyn Scene> {
    let mut space = bench_space();
    let props = ShapeProps::default().with_mass(1.0);
    for pos in grid(rng, 500, 25, 12.0) {
        let body = space.add_dynamic(pos, 0.0);
        space.add_circle(body, 5.0, Vec2::zero(), props);
    }
    Box::new(BasicScene(space))
}

fn init_boxes(rng: &mut StdRng) -> Box<dyn Scene> {
    let mut space = bench_space();
    let props = ShapeProps::default().with_mass(1.0);
    for pos in grid(rng, 500, 25, 12.0) {
        let body = space.add_dynamic(pos, 0.0);
        space.add_box(body, 10.0, 10.0, 0.0, props);
    }
    Box::new(BasicScene(space))
}

/// Dumbbells: a bar with a ball at each end.
fn init_compounds(rng: &mut StdRng) -> Box<dyn Scene> {
    let mut space = bench_space();
    let props = ShapeProps::default().with_mass(0.5);
    for pos in grid(rng, 200, 10, 40.0) {
        let angle = rng.gen_range(-0.3..0.3);
        let body = space.add_dynamic(pos, angle);
        space.add_box(body, 24.0, 6.0, 0.0, props);
        space.add_circle(body, 7.0, Vec2::new(-12.0, 0.0), props);
        space.add_circle(body, 7.0, Vec2::new(12.0, 0.0), props);
    }
    Box::new(BasicScene(space))
}
