use rand::rngs::StdRng;

use tumble_engine::coords::Vec2;
use tumble_engine::paint::Color;
use tumble_engine::render::DebugRenderer;

use super::{regular_polygon, DemoCtx, DemoEntry, Scene};
use crate::harness::default_draw;
use crate::space::{InteractionGroups, PointQueryInfo, SegmentQueryInfo, ShapeProps, Space};

pub const QUERY: DemoEntry = DemoEntry {
    name: "Query",
    timestep: 1.0 / 60.0,
    init,
};

/// Reach of the nearest-shape query around the mouse.
const NEAREST_RADIUS: f32 = 100.0;

/// Arrow-key speed of the query start, in units per tick.
const NUDGE_SPEED: f32 = 4.0;

/// A segment from the query start to the mouse, plus a nearest-shape query
/// around the mouse. Right-click moves the start; the arrow keys nudge it.
struct Query {
    space: Space,
    start: Vec2,
    end: Vec2,
    segment_hit: Option<SegmentQueryInfo>,
    nearest: Option<PointQueryInfo>,
}

fn init(_rng: &mut StdRng) -> Box<dyn Scene> {
    let mut space = Space::new();
    space.set_iterations(5);

    let ground = space.static_body();
    space.add_segment(ground, Vec2::new(0.0, 100.0), Vec2::new(100.0, -50.0), 20.0, ShapeProps::default());

    let pentagon = space.add_dynamic(Vec2::new(-100.0, 20.0), 0.0);
    space.add_polygon(pentagon, &regular_polygon(5, 30.0), 0.0, ShapeProps::default().with_mass(1.0));

    let ball = space.add_dynamic(Vec2::new(100.0, 100.0), 0.0);
    space.add_circle(ball, 20.0, Vec2::zero(), ShapeProps::default().with_mass(1.0));

    let stick = space.add_dynamic(Vec2::new(-100.0, -150.0), 0.5);
    space.add_segment(stick, Vec2::new(-60.0, 0.0), Vec2::new(60.0, 0.0), 5.0, ShapeProps::default().with_mass(1.0));

    Box::new(Query {
        space,
        start: Vec2::zero(),
        end: Vec2::zero(),
        segment_hit: None,
        nearest: None,
    })
}

impl Scene for Query {
    fn space(&self) -> &Space {
        &self.space
    }

    fn space_mut(&mut self) -> &mut Space {
        &mut self.space
    }

    fn update(&mut self, ctx: &mut DemoCtx<'_>, dt: f64) {
        self.space.step(dt);

        if ctx.right_click {
            self.start = ctx.mouse;
        }
        self.start += ctx.keyboard * NUDGE_SPEED;
        self.end = ctx.mouse;

        let everything = InteractionGroups::all();
        ctx.print(format_args!(
            "Query: Dist({:.1}) Point({:5.2}, {:5.2}), ",
            self.start.distance(self.end),
            self.end.x,
            self.end.y,
        ));

        self.segment_hit = self.space.segment_query_first(self.start, self.end, everything);
        match self.segment_hit {
            Some(hit) => ctx.print(format_args!(
                "Segment Query: Dist({:.2}) Normal({:5.2}, {:5.2})",
                hit.alpha * self.start.distance(self.end),
                hit.normal.x,
                hit.normal.y,
            )),
            None => ctx.print(format_args!("Segment Query (None)")),
        }

        self.nearest = self.space.point_query_nearest(self.end, NEAREST_RADIUS, everything);
        if let Some(nearest) = self.nearest {
            ctx.print(format_args!(
                "\nPoint Query: Dist({:.2}) Point({:5.2}, {:5.2})",
                nearest.distance, nearest.point.x, nearest.point.y,
            ));
        }
    }

    fn draw(&self, renderer: &mut DebugRenderer) {
        default_draw(&self.space, renderer);

        match self.segment_hit {
            Some(hit) => {
                let green = Color::rgba(0.0, 1.0, 0.0, 1.0);
                let red = Color::rgba(1.0, 0.0, 0.0, 1.0);
                renderer.segment(self.start, hit.point, green);
                renderer.segment(hit.point, self.end, red);
                renderer.segment(hit.point, hit.point + hit.normal * 16.0, red);
                renderer.dot(3.0, hit.point, red);
            }
            None => renderer.segment(self.start, self.end, Color::rgba(0.0, 1.0, 0.0, 1.0)),
        }

        if let Some(nearest) = self.nearest {
            let grey = Color::la(0.5, 1.0);
            renderer.dot(3.0, self.end, grey);
            renderer.segment(self.end, nearest.point, grey);
            if let Some(bb) = self.space.shape_bb(nearest.collider) {
                renderer.bb(bb, Color::rgba(0.3, 0.3, 0.7, 0.3));
            }
        }
    }
}
