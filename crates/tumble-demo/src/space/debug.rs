use tumble_engine::coords::Vec2;
use tumble_engine::paint::Color;

use super::from_vector;
use super::joints::JointKind;
use super::shapes::{ShapeGeom, ShapeInfo};
use super::world::Space;

/// Zig-zag outline of a spring, `x` along the spring and `y` across it.
const SPRING_VERTS: [(f32, f32); 15] = [
    (0.00, 0.0),
    (0.20, 0.0),
    (0.25, 3.0),
    (0.30, -6.0),
    (0.35, 6.0),
    (0.40, -6.0),
    (0.45, 6.0),
    (0.50, -6.0),
    (0.55, 6.0),
    (0.60, -6.0),
    (0.65, 6.0),
    (0.70, -3.0),
    (0.75, 6.0),
    (0.80, 0.0),
    (1.00, 0.0),
];

const ANCHOR_DOT_SIZE: f32 = 5.0;
const CONTACT_HALF_LENGTH: f32 = 2.0;

/// Sink for [`Space::debug_draw`]. Each method receives world-space
/// geometry.
pub trait DebugDrawCallbacks {
    fn draw_circle(&mut self, pos: Vec2, angle: f32, radius: f32, outline: Color, fill: Color);
    fn draw_segment(&mut self, a: Vec2, b: Vec2, color: Color);
    fn draw_fat_segment(&mut self, a: Vec2, b: Vec2, radius: f32, outline: Color, fill: Color);
    fn draw_polygon(&mut self, verts: &[Vec2], radius: f32, outline: Color, fill: Color);
    fn draw_dot(&mut self, size: f32, pos: Vec2, color: Color);
    fn color_for_shape(&mut self, space: &Space, shape: &ShapeInfo) -> Color;
}

/// Which layers [`Space::debug_draw`] walks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DebugDrawFlags {
    pub shapes: bool,
    pub constraints: bool,
    pub collision_points: bool,
}

impl DebugDrawFlags {
    pub const ALL: DebugDrawFlags = DebugDrawFlags {
        shapes: true,
        constraints: true,
        collision_points: true,
    };

    pub const NONE: DebugDrawFlags = DebugDrawFlags {
        shapes: false,
        constraints: false,
        collision_points: false,
    };
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DebugDrawOptions {
    pub flags: DebugDrawFlags,
    pub outline_color: Color,
    pub constraint_color: Color,
    pub collision_point_color: Color,
}

impl Space {
    /// Replays the space's shapes, joints and contacts into `callbacks`.
    pub fn debug_draw<C: DebugDrawCallbacks + ?Sized>(&self, options: &DebugDrawOptions, callbacks: &mut C) {
        if options.flags.shapes {
            for shape in self.shapes() {
                let fill = callbacks.color_for_shape(self, &shape);
                draw_shape(&shape, options.outline_color, fill, callbacks);
            }
        }

        if options.flags.constraints {
            for handle in self.joint_handles() {
                self.draw_joint(handle, options.constraint_color, callbacks);
            }
        }

        if options.flags.collision_points {
            let color = options.collision_point_color;
            for pair in self.narrow_phase.contact_pairs() {
                if !pair.has_any_active_contact {
                    continue;
                }
                for manifold in &pair.manifolds {
                    let n = from_vector(&manifold.data.normal);
                    for contact in &manifold.data.solver_contacts {
                        let p = Vec2::new(contact.point.x, contact.point.y);
                        callbacks.draw_segment(
                            p - n * CONTACT_HALF_LENGTH,
                            p + n * CONTACT_HALF_LENGTH,
                            color,
                        );
                    }
                }
            }
        }
    }

    fn draw_joint<C: DebugDrawCallbacks + ?Sized>(
        &self,
        handle: super::ImpulseJointHandle,
        color: Color,
        callbacks: &mut C,
    ) {
        let Some(kind) = self.joint_kind(handle) else { return };
        let Some((body1, anchor1, body2, anchor2)) = self.joint_anchors(handle) else { return };
        let (Some(t1), Some(t2)) = (self.body_transform(body1), self.body_transform(body2)) else {
            return;
        };
        let a = t1.point(anchor1);
        let b = t2.point(anchor2);

        match kind {
            JointKind::Pivot | JointKind::Motor { .. } | JointKind::Weld => {
                callbacks.draw_dot(ANCHOR_DOT_SIZE, a, color);
                callbacks.draw_dot(ANCHOR_DOT_SIZE, b, color);
            }
            JointKind::Slide { .. } => {
                callbacks.draw_dot(ANCHOR_DOT_SIZE, a, color);
                callbacks.draw_dot(ANCHOR_DOT_SIZE, b, color);
                callbacks.draw_segment(a, b, color);
            }
            JointKind::Groove { a: ga, b: gb } => {
                callbacks.draw_dot(ANCHOR_DOT_SIZE, b, color);
                callbacks.draw_segment(t1.point(ga), t1.point(gb), color);
            }
            JointKind::DampedSpring { .. } => {
                callbacks.draw_dot(ANCHOR_DOT_SIZE, a, color);
                callbacks.draw_dot(ANCHOR_DOT_SIZE, b, color);
                draw_spring(a, b, color, callbacks);
            }
        }
    }
}

fn draw_shape<C: DebugDrawCallbacks + ?Sized>(shape: &ShapeInfo, outline: Color, fill: Color, callbacks: &mut C) {
    match shape.world() {
        ShapeGeom::Circle { center, radius } => {
            callbacks.draw_circle(center, shape.body_angle, radius, outline, fill);
        }
        ShapeGeom::Segment { a, b, radius } => {
            callbacks.draw_fat_segment(a, b, radius, outline, fill);
        }
        ShapeGeom::Polygon { verts, radius } => {
            callbacks.draw_polygon(&verts, radius, outline, fill);
        }
    }
}

fn draw_spring<C: DebugDrawCallbacks + ?Sized>(a: Vec2, b: Vec2, color: Color, callbacks: &mut C) {
    let delta = b - a;
    let length = delta.length();
    if length <= f32::EPSILON {
        return;
    }
    let s = 1.0 / length;

    let place = |(x, y): (f32, f32)| {
        Vec2::new(
            a.x + x * delta.x - y * delta.y * s,
            a.y + x * delta.y + y * delta.x * s,
        )
    };

    let mut prev = place(SPRING_VERTS[0]);
    for v in &SPRING_VERTS[1..] {
        let next = place(*v);
        callbacks.draw_segment(prev, next, color);
        prev = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::ShapeProps;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Circle { pos: Vec2, radius: f32 },
        Segment { a: Vec2, b: Vec2, color: Color },
        FatSegment { radius: f32 },
        Polygon { count: usize },
        Dot { size: f32, pos: Vec2 },
        ColorFor,
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
    }

    impl Recorder {
        fn count(&self, f: impl Fn(&Call) -> bool) -> usize {
            self.calls.iter().filter(|c| f(c)).count()
        }
    }

    impl DebugDrawCallbacks for Recorder {
        fn draw_circle(&mut self, pos: Vec2, _angle: f32, radius: f32, _outline: Color, _fill: Color) {
            self.calls.push(Call::Circle { pos, radius });
        }
        fn draw_segment(&mut self, a: Vec2, b: Vec2, color: Color) {
            self.calls.push(Call::Segment { a, b, color });
        }
        fn draw_fat_segment(&mut self, _a: Vec2, _b: Vec2, radius: f32, _outline: Color, _fill: Color) {
            self.calls.push(Call::FatSegment { radius });
        }
        fn draw_polygon(&mut self, verts: &[Vec2], _radius: f32, _outline: Color, _fill: Color) {
            self.calls.push(Call::Polygon { count: verts.len() });
        }
        fn draw_dot(&mut self, size: f32, pos: Vec2, _color: Color) {
            self.calls.push(Call::Dot { size, pos });
        }
        fn color_for_shape(&mut self, _space: &Space, _shape: &ShapeInfo) -> Color {
            self.calls.push(Call::ColorFor);
            Color::la(1.0, 1.0)
        }
    }

    const RED: Color = Color::rgba(1.0, 0.0, 0.0, 1.0);
    const GREEN: Color = Color::rgba(0.0, 1.0, 0.0, 1.0);

    fn options(flags: DebugDrawFlags) -> DebugDrawOptions {
        DebugDrawOptions {
            flags,
            outline_color: Color::la(0.0, 1.0),
            constraint_color: GREEN,
            collision_point_color: RED,
        }
    }

    fn mixed_space() -> Space {
        let mut space = Space::new();
        let ground = space.static_body();
        space.add_segment(ground, Vec2::new(-50.0, 0.0), Vec2::new(50.0, 0.0), 1.0, ShapeProps::default());
        let ball = space.add_dynamic(Vec2::new(0.0, 30.0), 0.0);
        space.add_circle(ball, 4.0, Vec2::zero(), ShapeProps::default().with_mass(1.0));
        let crate_ = space.add_dynamic(Vec2::new(20.0, 30.0), 0.0);
        space.add_box(crate_, 10.0, 10.0, 0.0, ShapeProps::default().with_mass(1.0));
        space.add_pivot(ball, crate_, Vec2::new(10.0, 0.0), Vec2::new(-10.0, 0.0));
        space
    }

    // ── dispatch ──────────────────────────────────────────────────────────

    #[test]
    fn shapes_get_one_color_query_and_one_draw_each() {
        let space = mixed_space();
        let mut rec = Recorder::default();
        let flags = DebugDrawFlags { shapes: true, ..DebugDrawFlags::NONE };
        space.debug_draw(&options(flags), &mut rec);

        assert_eq!(rec.count(|c| *c == Call::ColorFor), 3);
        assert_eq!(rec.count(|c| matches!(c, Call::Circle { radius, .. } if *radius == 4.0)), 1);
        assert_eq!(rec.count(|c| *c == Call::FatSegment { radius: 1.0 }), 1);
        assert_eq!(rec.count(|c| *c == Call::Polygon { count: 4 }), 1);
        assert_eq!(rec.calls.len(), 6);
    }

    #[test]
    fn circle_is_drawn_at_its_world_position() {
        let space = mixed_space();
        let mut rec = Recorder::default();
        let flags = DebugDrawFlags { shapes: true, ..DebugDrawFlags::NONE };
        space.debug_draw(&options(flags), &mut rec);
        assert!(rec.calls.contains(&Call::Circle { pos: Vec2::new(0.0, 30.0), radius: 4.0 }));
    }

    #[test]
    fn pivot_joint_draws_two_anchor_dots() {
        let space = mixed_space();
        let mut rec = Recorder::default();
        let flags = DebugDrawFlags { constraints: true, ..DebugDrawFlags::NONE };
        space.debug_draw(&options(flags), &mut rec);

        assert_eq!(
            rec.calls,
            vec![
                Call::Dot { size: 5.0, pos: Vec2::new(10.0, 30.0) },
                Call::Dot { size: 5.0, pos: Vec2::new(10.0, 30.0) },
            ]
        );
    }

    #[test]
    fn spring_draws_dots_and_zigzag() {
        let mut space = Space::new();
        let a = space.add_dynamic(Vec2::zero(), 0.0);
        let b = space.add_dynamic(Vec2::new(100.0, 0.0), 0.0);
        space.add_damped_spring(a, b, Vec2::zero(), Vec2::zero(), 100.0, 1.0, 0.0);

        let mut rec = Recorder::default();
        space.debug_draw(&options(DebugDrawFlags::ALL), &mut rec);

        assert_eq!(rec.count(|c| matches!(c, Call::Dot { .. })), 2);
        let segments: Vec<_> = rec
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Segment { a, b, .. } => Some((*a, *b)),
                _ => None,
            })
            .collect();
        assert_eq!(segments.len(), SPRING_VERTS.len() - 1);
        assert_eq!(segments[0].0, Vec2::zero());
        assert_eq!(segments.last().unwrap().1, Vec2::new(100.0, 0.0));
        // The widest swing of the zig-zag is 6 units off the axis.
        assert!(segments.iter().all(|(p, _)| p.y.abs() <= 6.0 + 1e-4));
    }

    #[test]
    fn contacts_draw_short_red_segments_along_normal() {
        let mut space = Space::new();
        space.set_gravity(Vec2::new(0.0, -100.0));
        let ground = space.static_body();
        space.add_segment(ground, Vec2::new(-50.0, 0.0), Vec2::new(50.0, 0.0), 0.0, ShapeProps::default());
        let ball = space.add_dynamic(Vec2::new(0.0, 6.0), 0.0);
        space.add_circle(ball, 5.0, Vec2::zero(), ShapeProps::default().with_mass(1.0));
        for _ in 0..120 {
            space.step(1.0 / 60.0);
        }

        let mut rec = Recorder::default();
        let flags = DebugDrawFlags { collision_points: true, ..DebugDrawFlags::NONE };
        space.debug_draw(&options(flags), &mut rec);

        assert!(!rec.calls.is_empty());
        for call in &rec.calls {
            let Call::Segment { a, b, color } = call else { panic!("unexpected {call:?}") };
            assert_eq!(*color, RED);
            assert!((a.distance(*b) - 2.0 * CONTACT_HALF_LENGTH).abs() < 1e-3);
        }
    }

    #[test]
    fn no_flags_no_calls() {
        let space = mixed_space();
        let mut rec = Recorder::default();
        space.debug_draw(&options(DebugDrawFlags::NONE), &mut rec);
        assert!(rec.calls.is_empty());
    }
}
