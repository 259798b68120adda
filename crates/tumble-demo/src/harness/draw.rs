use tumble_engine::coords::{Transform, Vec2};
use tumble_engine::paint::Color;
use tumble_engine::render::DebugRenderer;

use crate::space::{
    BodyKind, DebugDrawCallbacks, DebugDrawFlags, DebugDrawOptions, ShapeGeom, ShapeInfo, Space,
};

pub const CONSTRAINT_COLOR: Color = Color::rgba(0.0, 1.0, 0.0, 1.0);
pub const COLLISION_POINT_COLOR: Color = Color::rgba(1.0, 0.0, 0.0, 1.0);

/// Fill for awake dynamic shapes.
pub const SHAPE_FILL: Color = Color::rgba(253.0 / 256.0, 214.0 / 256.0, 146.0 / 256.0, 1.0);

/// Occluder outline for circles, scaled by the radius.
const CIRCLE_OCCLUDER: [Vec2; 8] = [
    Vec2::new(0.00, 1.00),
    Vec2::new(0.71, -0.71),
    Vec2::new(-1.00, 0.00),
    Vec2::new(-0.71, -0.71),
    Vec2::new(0.00, -1.00),
    Vec2::new(-0.71, 0.71),
    Vec2::new(1.00, 0.00),
    Vec2::new(0.71, 0.71),
];

/// Shape fill by state: sensors are faint, sleeping and idle bodies grey,
/// static geometry dark.
pub fn color_for_shape(space: &Space, shape: &ShapeInfo) -> Color {
    if shape.sensor {
        return Color::la(1.0, 0.1);
    }

    let Some(body) = shape.body else {
        return Color::la(0.2, 1.0);
    };

    if space.is_sleeping(body) {
        Color::la(0.3, 1.0)
    } else if space.idle_time(body) > space.sleep_time_threshold() {
        Color::la(0.4, 1.0)
    } else if shape.body_kind == BodyKind::Static {
        Color::la(0.2, 1.0)
    } else {
        SHAPE_FILL
    }
}

/// Debug-draw callbacks backed by the renderer. Outline colors are ignored;
/// the renderer outlines everything with its own outline color.
pub struct RendererCallbacks<'a> {
    pub renderer: &'a mut DebugRenderer,
}

impl DebugDrawCallbacks for RendererCallbacks<'_> {
    fn draw_circle(&mut self, pos: Vec2, angle: f32, radius: f32, _outline: Color, fill: Color) {
        self.renderer.circle(pos, angle, radius, fill);
    }

    fn draw_segment(&mut self, a: Vec2, b: Vec2, color: Color) {
        self.renderer.segment(a, b, color);
    }

    fn draw_fat_segment(&mut self, a: Vec2, b: Vec2, radius: f32, _outline: Color, fill: Color) {
        self.renderer.fat_segment(a, b, radius, fill);
    }

    fn draw_polygon(&mut self, verts: &[Vec2], radius: f32, _outline: Color, fill: Color) {
        self.renderer.polygon(verts, radius, fill);
    }

    fn draw_dot(&mut self, size: f32, pos: Vec2, color: Color) {
        self.renderer.dot(size, pos, color);
    }

    fn color_for_shape(&mut self, space: &Space, shape: &ShapeInfo) -> Color {
        color_for_shape(space, shape)
    }
}

/// Options used by [`default_draw`].
pub fn default_draw_options(outline_color: Color) -> DebugDrawOptions {
    DebugDrawOptions {
        flags: DebugDrawFlags::ALL,
        outline_color,
        constraint_color: CONSTRAINT_COLOR,
        collision_point_color: COLLISION_POINT_COLOR,
    }
}

/// Shapes, joints and contacts of `space` with the standard palette.
pub fn default_draw(space: &Space, renderer: &mut DebugRenderer) {
    let options = default_draw_options(renderer.state.outline_color);
    space.debug_draw(&options, &mut RendererCallbacks { renderer });
}

/// Shadow outline of a shape, or `None` when it casts no shadow.
///
/// Only dynamic bodies cast shadows. Segments never do.
pub fn shadow_occluder(shape: &ShapeInfo) -> Option<(Transform, Vec<Vec2>)> {
    if shape.body_kind != BodyKind::Dynamic {
        return None;
    }

    match &shape.local {
        ShapeGeom::Circle { center, radius } => {
            let transform = shape
                .body_transform
                .mult(Transform::translate(*center))
                .mult(Transform::scale(*radius, *radius));
            Some((transform, CIRCLE_OCCLUDER.to_vec()))
        }
        ShapeGeom::Polygon { verts, .. } => {
            Some((shape.body_transform, verts.iter().rev().copied().collect()))
        }
        ShapeGeom::Segment { .. } => None,
    }
}

/// Emits the shadow volume of every dynamic shape.
pub fn draw_shadows(space: &Space, renderer: &mut DebugRenderer) {
    for shape in space.shapes() {
        if let Some((transform, verts)) = shadow_occluder(&shape) {
            renderer.shadow(transform, &verts);
        }
    }
}
