use rand::rngs::StdRng;

use tumble_engine::coords::Vec2;

use super::{add_view_walls, DemoCtx, DemoEntry, Scene};
use crate::space::{ImpulseJointHandle, ShapeProps, Space};

pub const CHAINS: DemoEntry = DemoEntry {
    name: "Chains",
    timestep: 1.0 / 60.0,
    init,
};

const CHAIN_COUNT: usize = 8;
const LINK_COUNT: usize = 10;

/// Force at which a link snaps.
const BREAKING_FORCE: f32 = 80_000.0;

/// Hanging chains of pill-shaped links joined by slide joints. Links snap
/// when pulled too hard.
struct Chains {
    space: Space,
    links: Vec<ImpulseJointHandle>,
}

fn init(_rng: &mut StdRng) -> Box<dyn Scene> {
    let mut space = Space::new();
    space.set_iterations(30);
    space.set_gravity(Vec2::new(0.0, -100.0));
    space.set_sleep_time_threshold(0.5);

    add_view_walls(&mut space, 1.0, 1.0);

    let (width, height) = (20.0, 30.0);
    let spacing = width * 0.3;
    let half = (height - width) * 0.5;
    let link = ShapeProps::default().with_mass(1.0).with_friction(0.8);
    let ground = space.static_body();

    let mut links = Vec::with_capacity(CHAIN_COUNT * LINK_COUNT);
    for i in 0..CHAIN_COUNT {
        let x = 40.0 * (i as f32 - (CHAIN_COUNT - 1) as f32 * 0.5);
        let mut prev = None;

        for j in 0..LINK_COUNT {
            let y = 240.0 - (j as f32 + 0.5) * height - (j as f32 + 1.0) * spacing;
            let body = space.add_dynamic(Vec2::new(x, y), 0.0);
            space.add_segment(body, Vec2::new(0.0, half), Vec2::new(0.0, -half), width * 0.5, link);

            let top = Vec2::new(0.0, height * 0.5);
            let joint = match prev {
                None => space.add_slide(ground, body, Vec2::new(x, 240.0), top, spacing),
                Some(prev) => space.add_slide(prev, body, Vec2::new(0.0, -height * 0.5), top, spacing),
            };
            links.push(joint);
            prev = Some(body);
        }
    }

    let radius = 15.0;
    let ball = space.add_dynamic(Vec2::new(0.0, -240.0 + radius + 5.0), 0.0);
    space.add_circle(ball, radius, Vec2::zero(), ShapeProps::default().with_mass(10.0).with_friction(0.9));

    Box::new(Chains { space, links })
}

impl Scene for Chains {
    fn space(&self) -> &Space {
        &self.space
    }

    fn space_mut(&mut self) -> &mut Space {
        &mut self.space
    }

    fn update(&mut self, _ctx: &mut DemoCtx<'_>, dt: f64) {
        self.space.step(dt);

        let space = &mut self.space;
        self.links.retain(|&joint| match space.joint_force(joint, dt) {
            Some(force) if force > BREAKING_FORCE => {
                log::debug!("link snapped at {force:.0}");
                space.remove_joint(joint);
                false
            }
            Some(_) => true,
            None => false,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::MessageBuffer;
    use crate::space::{BodyKind, JointKind};
    use rand::SeedableRng;

    #[test]
    fn every_link_is_a_slide_joint() {
        let scene = init(&mut StdRng::seed_from_u64(0));
        let space = scene.space();
        assert_eq!(space.joint_count(), CHAIN_COUNT * LINK_COUNT);
        assert!(space
            .joint_handles()
            .all(|j| matches!(space.joint_kind(j), Some(JointKind::Slide { .. }))));
    }

    #[test]
    fn yanked_link_snaps() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut messages = MessageBuffer::default();
        let mut scene = init(&mut rng);

        let space = scene.space_mut();
        let link = space
            .body_handles()
            .find(|b| space.body_kind(*b) == Some(BodyKind::Dynamic))
            .unwrap();
        space.set_velocity(link, Vec2::new(0.0, -100_000.0));

        let mut ctx = DemoCtx {
            mouse: Vec2::zero(),
            keyboard: Vec2::zero(),
            right_click: false,
            right_down: false,
            ticks: 0,
            time: 0.0,
            rng: &mut rng,
            messages: &mut messages,
        };
        scene.update(&mut ctx, 1.0 / 60.0);
        assert!(scene.space().joint_count() < CHAIN_COUNT * LINK_COUNT);
    }
}
