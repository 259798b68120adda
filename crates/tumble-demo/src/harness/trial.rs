use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;

use tumble_engine::coords::Vec2;

use crate::demos::{DemoCtx, DemoEntry, Scene};

use super::{MessageBuffer, DEMO_SEED};

/// Builds `entry` headless and times `steps` updates at its timestep.
/// Scene construction is not timed.
pub fn time_trial(entry: &DemoEntry, steps: u32) -> Duration {
    let mut rng = StdRng::seed_from_u64(DEMO_SEED);
    let mut messages = MessageBuffer::default();
    let mut scene = (entry.init)(&mut rng);
    let dt = entry.timestep;

    let start = Instant::now();
    for tick in 0..steps {
        messages.reset();
        let mut ctx = DemoCtx {
            mouse: Vec2::zero(),
            keyboard: Vec2::zero(),
            right_click: false,
            right_down: false,
            ticks: u64::from(tick),
            time: f64::from(tick) * dt,
            rng: &mut rng,
            messages: &mut messages,
        };
        scene.update(&mut ctx, dt);
    }
    let elapsed = start.elapsed();

    log::debug!("{} finished {steps} steps with {} bodies", entry.name, scene.space().body_count());
    elapsed
}
