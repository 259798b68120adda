use rand::rngs::StdRng;
use rand::Rng;

use tumble_engine::coords::Vec2;

use super::{DemoCtx, DemoEntry, Scene};
use crate::space::{ColliderHandle, ShapeProps, Space, NOT_GRABBABLE_FILTER};

pub const SENSORS: DemoEntry = DemoEntry {
    name: "Sensors",
    timestep: 1.0 / 60.0,
    init,
};

const EMITTER_POS: Vec2 = Vec2::new(0.0, 150.0);
const BALL_RADIUS: f32 = 15.0;
const QUEUE_SIZE: u32 = 5;

/// An emitter drops balls while nothing blocks it. A catcher sensor near
/// the floor swallows them and hands them back to the emitter queue.
struct Sensors {
    space: Space,
    emitter: ColliderHandle,
    catcher: ColliderHandle,
    queue: u32,
}

fn init(_rng: &mut StdRng) -> Box<dyn Scene> {
    let mut space = Space::new();
    space.set_iterations(10);
    space.set_gravity(Vec2::new(0.0, -100.0));

    let ground = space.static_body();
    let sensor = ShapeProps::default().sensor().with_filter(NOT_GRABBABLE_FILTER);
    let emitter = space.add_circle(ground, BALL_RADIUS, EMITTER_POS, sensor);
    let catcher = space.add_segment(ground, Vec2::new(-2000.0, -200.0), Vec2::new(2000.0, -200.0), 15.0, sensor);

    Box::new(Sensors {
        space,
        emitter,
        catcher,
        queue: QUEUE_SIZE,
    })
}

impl Sensors {
    /// Balls touching the catcher go back into the queue.
    fn catch(&mut self) {
        for collider in self.space.sensor_overlaps(self.catcher) {
            let Some(body) = self.space.collider(collider).and_then(|c| c.parent()) else { continue };
            if body == self.space.static_body() {
                continue;
            }
            self.space.remove_body(body);
            self.queue += 1;
        }
    }

    fn emit(&mut self, rng: &mut StdRng) {
        let blocked = !self.space.sensor_overlaps(self.emitter).is_empty();
        if blocked || self.queue == 0 {
            return;
        }

        let body = self.space.add_dynamic(EMITTER_POS, 0.0);
        let props = ShapeProps::default().with_mass(1.0).with_friction(0.9);
        self.space.add_circle(body, BALL_RADIUS, Vec2::zero(), props);
        let heading = Vec2::for_angle(rng.gen_range(0.0..std::f32::consts::TAU));
        self.space.set_velocity(body, heading * 100.0);
        self.queue -= 1;
    }
}

impl Scene for Sensors {
    fn space(&self) -> &Space {
        &self.space
    }

    fn space_mut(&mut self) -> &mut Space {
        &mut self.space
    }

    fn update(&mut self, ctx: &mut DemoCtx<'_>, dt: f64) {
        self.space.step(dt);
        self.catch();
        self.emit(ctx.rng);

        ctx.print(format_args!("Emitter queue: {}", self.queue));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::MessageBuffer;
    use crate::space::BodyKind;
    use rand::SeedableRng;

    fn run(scene: &mut dyn Scene, rng: &mut StdRng, messages: &mut MessageBuffer, ticks: u32) {
        for tick in 0..ticks {
            messages.reset();
            let mut ctx = DemoCtx {
                mouse: Vec2::zero(),
                keyboard: Vec2::zero(),
                right_click: false,
                right_down: false,
                ticks: u64::from(tick),
                time: 0.0,
                rng: &mut *rng,
                messages: &mut *messages,
            };
            scene.update(&mut ctx, 1.0 / 60.0);
        }
    }

    fn balls(space: &Space) -> usize {
        space.body_handles().filter(|b| space.body_kind(*b) == Some(BodyKind::Dynamic)).count()
    }

    #[test]
    fn emitter_waits_until_it_is_clear() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut messages = MessageBuffer::default();
        let mut scene = init(&mut rng);

        run(scene.as_mut(), &mut rng, &mut messages, 1);
        assert_eq!(balls(scene.space()), 1);
        assert_eq!(messages.as_str(), "Emitter queue: 4");

        // The new ball still sits inside the emitter.
        run(scene.as_mut(), &mut rng, &mut messages, 1);
        assert_eq!(balls(scene.space()), 1);
    }

    #[test]
    fn caught_balls_return_to_the_queue() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut messages = MessageBuffer::default();
        let mut scene = init(&mut rng);

        // Long enough for the first balls to fall past the catcher.
        run(scene.as_mut(), &mut rng, &mut messages, 600);
        let live = balls(scene.space()) as u32;
        assert!(live <= QUEUE_SIZE);
        assert_eq!(messages.as_str(), format!("Emitter queue: {}", QUEUE_SIZE - live));
        assert!(scene.space().shape_count() >= 2);
    }
}
