//! Demo table.
//!
//! Each entry pairs a name and a fixed timestep with a constructor. The
//! constructed [`Scene`] owns its [`Space`]; switching demos drops it.

mod bench;
mod chains;
mod joints;
mod plink;
mod pyramid;
mod query;
mod sensors;
mod shapes;
mod tumble;

use std::fmt;

use rand::rngs::StdRng;
use tumble_engine::coords::Vec2;
use tumble_engine::render::DebugRenderer;

use crate::harness::{default_draw, MessageBuffer};
use crate::space::{ShapeProps, Space, NOT_GRABBABLE_FILTER};

/// Per-tick inputs and services handed to [`Scene::update`].
pub struct DemoCtx<'a> {
    /// Mouse position in world units.
    pub mouse: Vec2,
    /// Arrow-key direction, each axis in `[-1, 1]`.
    pub keyboard: Vec2,
    /// Right button held.
    pub right_click: bool,
    /// Right button went down since the previous tick.
    pub right_down: bool,
    pub ticks: u64,
    /// Simulated seconds since the demo started.
    pub time: f64,
    pub rng: &'a mut StdRng,
    pub messages: &'a mut MessageBuffer,
}

impl DemoCtx<'_> {
    /// Appends to the on-screen message for this tick.
    pub fn print(&mut self, args: fmt::Arguments<'_>) {
        self.messages.print(args);
    }
}

/// A running demo.
pub trait Scene {
    fn space(&self) -> &Space;
    fn space_mut(&mut self) -> &mut Space;

    /// Advances the demo by one fixed tick.
    fn update(&mut self, ctx: &mut DemoCtx<'_>, dt: f64) {
        let _ = ctx;
        self.space_mut().step(dt);
    }

    fn draw(&self, renderer: &mut DebugRenderer) {
        default_draw(self.space(), renderer);
    }
}

/// Scene with no state beyond its space.
pub struct BasicScene(pub Space);

impl Scene for BasicScene {
    fn space(&self) -> &Space {
        &self.0
    }

    fn space_mut(&mut self) -> &mut Space {
        &mut self.0
    }
}

pub type InitFn = fn(&mut StdRng) -> Box<dyn Scene>;

#[derive(Clone, Copy)]
pub struct DemoEntry {
    pub name: &'static str,
    /// Seconds per tick.
    pub timestep: f64,
    pub init: InitFn,
}

impl fmt::Debug for DemoEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DemoEntry")
            .field("name", &self.name)
            .field("timestep", &self.timestep)
            .finish_non_exhaustive()
    }
}

/// Interactive demos, in key order starting at `a`.
pub fn demo_list() -> Vec<DemoEntry> {
    vec![
        pyramid::PYRAMID_STACK,
        plink::PLINK,
        shapes::BOUNCY_HEXAGONS,
        tumble::TUMBLE,
        pyramid::PYRAMID_TOPPLE,
        chains::CHAINS,
        joints::JOINTS,
        query::QUERY,
        sensors::SENSORS,
    ]
}

/// Stress scenes used for timing.
pub fn bench_list() -> Vec<DemoEntry> {
    vec![bench::MANY_CIRCLES, bench::MANY_BOXES, bench::COMPOUND_PILE]
}

/// Static, ungrabbable walls around the default 640×480 view.
fn add_view_walls(space: &mut Space, friction: f32, elasticity: f32) {
    let props = ShapeProps::default()
        .with_friction(friction)
        .with_elasticity(elasticity)
        .with_filter(NOT_GRABBABLE_FILTER);
    let ground = space.static_body();
    let (l, b, r, t) = (-320.0, -240.0, 320.0, 240.0);
    space.add_segment(ground, Vec2::new(l, b), Vec2::new(l, t), 0.0, props);
    space.add_segment(ground, Vec2::new(r, b), Vec2::new(r, t), 0.0, props);
    space.add_segment(ground, Vec2::new(l, b), Vec2::new(r, b), 0.0, props);
}

/// Regular polygon of `count` vertices around the origin, clockwise from +x.
fn regular_polygon(count: usize, radius: f32) -> Vec<Vec2> {
    (0..count)
        .map(|i| {
            let angle = -std::f32::consts::TAU * i as f32 / count as f32;
            Vec2::for_angle(angle) * radius
        })
        .collect()
}

/// Letter bound to the demo at `index`.
pub fn demo_letter(index: usize) -> char {
    char::from(b'a' + (index % 26) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn run(entry: &DemoEntry, ticks: u32) -> Box<dyn Scene> {
        let mut rng = StdRng::seed_from_u64(45073);
        let mut messages = MessageBuffer::default();
        let mut scene = (entry.init)(&mut rng);
        for tick in 0..ticks {
            messages.reset();
            let mut ctx = DemoCtx {
                mouse: Vec2::zero(),
                keyboard: Vec2::zero(),
                right_click: false,
                right_down: false,
                ticks: tick as u64,
                time: tick as f64 * entry.timestep,
                rng: &mut rng,
                messages: &mut messages,
            };
            scene.update(&mut ctx, entry.timestep);
        }
        scene
    }

    #[test]
    fn table_order_and_names() {
        let names: Vec<_> = demo_list().iter().map(|d| d.name).collect();
        assert_eq!(
            names,
            [
                "Pyramid Stack",
                "Plink",
                "Bouncy Hexagons",
                "Tumble",
                "Pyramid Topple",
                "Chains",
                "Joints",
                "Query",
                "Sensors",
            ]
        );
        let bench: Vec<_> = bench_list().iter().map(|d| d.name).collect();
        assert_eq!(bench, ["Many Circles", "Many Boxes", "Compound Pile"]);
    }

    #[test]
    fn letters_follow_indices() {
        assert_eq!(demo_letter(0), 'a');
        assert_eq!(demo_letter(8), 'i');
    }

    #[test]
    fn every_scene_builds_and_steps() {
        for entry in demo_list().iter().chain(bench_list().iter()) {
            assert!(entry.timestep > 0.0, "{}", entry.name);
            let scene = run(entry, 5);
            assert!(scene.space().body_count() > 1, "{} has no bodies", entry.name);
            assert!(scene.space().shape_count() > 0, "{} has no shapes", entry.name);
        }
    }

    #[test]
    fn scenes_are_deterministic_for_a_seed() {
        for entry in demo_list() {
            let a = run(&entry, 3);
            let b = run(&entry, 3);
            let pa: Vec<_> = a.space().body_handles().filter_map(|h| a.space().body_position(h)).collect();
            let pb: Vec<_> = b.space().body_handles().filter_map(|h| b.space().body_position(h)).collect();
            assert_eq!(pa, pb, "{}", entry.name);
        }
    }
}
