use rand::rngs::StdRng;
use rand::Rng;

use tumble_engine::coords::Vec2;

use super::{regular_polygon, DemoCtx, DemoEntry, Scene};
use crate::space::{BodyKind, RigidBodyHandle, ShapeProps, Space, GRAB_FILTER, NOT_GRABBABLE_FILTER};

pub const PLINK: DemoEntry = DemoEntry {
    name: "Plink",
    timestep: 1.0 / 60.0,
    init,
};

const PENTAGON_COUNT: usize = 300;
const PENTAGON_RADIUS: f32 = 10.0;
const DROP_HEIGHT: f32 = 350.0;

/// Pentagons rain through a field of static triangles. Right-clicking a
/// pentagon freezes it in place or releases it again.
struct Plink {
    space: Space,
    pentagons: Vec<RigidBodyHandle>,
}

fn drop_point(rng: &mut StdRng) -> Vec2 {
    Vec2::new(rng.gen_range(-300.0..300.0), DROP_HEIGHT)
}

fn init(rng: &mut StdRng) -> Box<dyn Scene> {
    let mut space = Space::new();
    space.set_iterations(5);
    space.set_gravity(Vec2::new(0.0, -100.0));

    let ground = space.static_body();
    let peg = ShapeProps::default()
        .with_friction(1.0)
        .with_elasticity(1.0)
        .with_filter(NOT_GRABBABLE_FILTER);
    let triangle = [Vec2::new(-15.0, -15.0), Vec2::new(0.0, 10.0), Vec2::new(15.0, -15.0)];

    for i in 0..9 {
        for j in 0..6 {
            let stagger = (j % 2) as f32 * 40.0;
            let offset = Vec2::new(i as f32 * 80.0 - 320.0 + stagger, j as f32 * 70.0 - 240.0);
            let verts: Vec<Vec2> = triangle.iter().map(|v| *v + offset).collect();
            space.add_polygon(ground, &verts, 0.0, peg);
        }
    }

    let pentagon = regular_polygon(5, PENTAGON_RADIUS);
    let props = ShapeProps::default().with_mass(1.0).with_friction(0.4);
    let mut pentagons = Vec::with_capacity(PENTAGON_COUNT);
    for _ in 0..PENTAGON_COUNT {
        let body = space.add_dynamic(drop_point(rng), 0.0);
        space.add_polygon(body, &pentagon, 0.0, props);
        pentagons.push(body);
    }

    Box::new(Plink { space, pentagons })
}

impl Scene for Plink {
    fn space(&self) -> &Space {
        &self.space
    }

    fn space_mut(&mut self) -> &mut Space {
        &mut self.space
    }

    fn update(&mut self, ctx: &mut DemoCtx<'_>, dt: f64) {
        if ctx.right_down {
            if let Some(hit) = self.space.point_query_nearest(ctx.mouse, 0.0, GRAB_FILTER) {
                if let Some(body) = hit.body.filter(|b| self.pentagons.contains(b)) {
                    let kind = match self.space.body_kind(body) {
                        Some(BodyKind::Dynamic) => BodyKind::Static,
                        _ => BodyKind::Dynamic,
                    };
                    self.space.set_body_kind(body, kind);
                }
            }
        }

        for &body in &self.pentagons {
            let Some(pos) = self.space.body_position(body) else { continue };
            if pos.y < -260.0 || pos.x.abs() > 340.0 {
                let point = drop_point(ctx.rng);
                self.space.reset_body(body, point);
            }
        }

        self.space.step(dt);
    }
}
