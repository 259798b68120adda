use rand::rngs::StdRng;
use rand::Rng;

use tumble_engine::coords::Vec2;

use super::{add_view_walls, regular_polygon, BasicScene, DemoEntry, Scene};
use crate::space::{ShapeProps, Space, NOT_GRABBABLE_FILTER};

pub const BOUNCY_HEXAGONS: DemoEntry = DemoEntry {
    name: "Bouncy Hexagons",
    timestep: 1.0 / 60.0,
    init,
};

const HEXAGON_COUNT: usize = 500;
const HEXAGON_RADIUS: f32 = 5.0;
const BEVEL: f32 = 1.0;

/// Random point inside the view, outside a clear disc at the center.
fn random_position(rng: &mut StdRng, radius: f32) -> Vec2 {
    let (hw, hh) = (320.0 - radius, 240.0 - radius);
    loop {
        let v = Vec2::new(rng.gen_range(-hw..hw), rng.gen_range(-hh..hh));
        if v.length() >= 85.0 {
            return v;
        }
    }
}

fn init(rng: &mut StdRng) -> Box<dyn Scene> {
    let mut space = Space::new();
    space.set_iterations(10);

    add_view_walls(&mut space, 0.0, 1.0);
    let ground = space.static_body();
    space.add_segment(
        ground,
        Vec2::new(-320.0, 240.0),
        Vec2::new(320.0, 240.0),
        0.0,
        ShapeProps::default()
            .with_elasticity(1.0)
            .with_friction(0.0)
            .with_filter(NOT_GRABBABLE_FILTER),
    );

    let hexagon = regular_polygon(6, HEXAGON_RADIUS);
    let props = ShapeProps::default().with_mass(1.0).with_friction(0.0).with_elasticity(1.0);

    for _ in 0..HEXAGON_COUNT {
        let pos = random_position(rng, HEXAGON_RADIUS + BEVEL);
        let body = space.add_dynamic(pos, 0.0);
        let heading = Vec2::for_angle(rng.gen_range(0.0..std::f32::consts::TAU));
        space.set_velocity(body, heading * rng.gen_range(50.0..150.0));
        space.add_polygon(body, &hexagon, BEVEL, props);
    }

    Box::new(BasicScene(space))
}
