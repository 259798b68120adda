use rapier2d::prelude::*;

use tumble_engine::coords::{Transform, Vec2};

use super::from_point;
use super::world::BodyKind;

/// Material and filtering settings applied to a new collider.
#[derive(Debug, Clone, Copy)]
pub struct ShapeProps {
    /// Mass contributed to the parent body. Zero leaves the body massless
    /// (static and kinematic parents ignore it).
    pub mass: f32,
    pub friction: f32,
    pub elasticity: f32,
    pub sensor: bool,
    pub filter: InteractionGroups,
}

impl Default for ShapeProps {
    fn default() -> Self {
        Self {
            mass: 0.0,
            friction: 0.7,
            elasticity: 0.0,
            sensor: false,
            filter: InteractionGroups::all(),
        }
    }
}

impl ShapeProps {
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_elasticity(mut self, elasticity: f32) -> Self {
        self.elasticity = elasticity;
        self
    }

    pub fn with_filter(mut self, filter: InteractionGroups) -> Self {
        self.filter = filter;
        self
    }

    pub fn sensor(mut self) -> Self {
        self.sensor = true;
        self
    }

    pub(crate) fn apply(&self, builder: ColliderBuilder) -> ColliderBuilder {
        let builder = builder
            .friction(self.friction)
            .restitution(self.elasticity)
            .sensor(self.sensor)
            .collision_groups(self.filter);
        if self.mass > 0.0 {
            builder.mass(self.mass)
        } else {
            builder.density(0.0)
        }
    }
}

/// Collider geometry expressed in its body's local frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeGeom {
    Circle { center: Vec2, radius: f32 },
    Segment { a: Vec2, b: Vec2, radius: f32 },
    /// Convex outline, counter-clockwise.
    Polygon { verts: Vec<Vec2>, radius: f32 },
}

impl ShapeGeom {
    /// Reads a rapier shape placed at `offset` inside its body.
    ///
    /// Returns `None` for shapes the demos never create (heightfields,
    /// compounds, meshes).
    pub(crate) fn from_shape(shape: &dyn Shape, offset: &Isometry<Real>) -> Option<Self> {
        let pt = |p: &Point<Real>| from_point(&(offset * p));

        let geom = match shape.as_typed_shape() {
            TypedShape::Ball(ball) => ShapeGeom::Circle {
                center: pt(&Point::origin()),
                radius: ball.radius,
            },
            TypedShape::Cuboid(cuboid) => ShapeGeom::Polygon {
                verts: box_corners(cuboid.half_extents).iter().map(pt).collect(),
                radius: 0.0,
            },
            TypedShape::RoundCuboid(round) => ShapeGeom::Polygon {
                verts: box_corners(round.inner_shape.half_extents).iter().map(pt).collect(),
                radius: round.border_radius,
            },
            TypedShape::ConvexPolygon(poly) => ShapeGeom::Polygon {
                verts: poly.points().iter().map(pt).collect(),
                radius: 0.0,
            },
            TypedShape::RoundConvexPolygon(round) => ShapeGeom::Polygon {
                verts: round.inner_shape.points().iter().map(pt).collect(),
                radius: round.border_radius,
            },
            TypedShape::Triangle(tri) => ShapeGeom::Polygon {
                verts: vec![pt(&tri.a), pt(&tri.b), pt(&tri.c)],
                radius: 0.0,
            },
            TypedShape::Segment(seg) => ShapeGeom::Segment {
                a: pt(&seg.a),
                b: pt(&seg.b),
                radius: 0.0,
            },
            TypedShape::Capsule(capsule) => ShapeGeom::Segment {
                a: pt(&capsule.segment.a),
                b: pt(&capsule.segment.b),
                radius: capsule.radius,
            },
            _ => return None,
        };
        Some(geom)
    }

    /// Same geometry moved by `transform`.
    pub fn transformed(&self, transform: Transform) -> Self {
        match self {
            ShapeGeom::Circle { center, radius } => ShapeGeom::Circle {
                center: transform.point(*center),
                radius: *radius,
            },
            ShapeGeom::Segment { a, b, radius } => ShapeGeom::Segment {
                a: transform.point(*a),
                b: transform.point(*b),
                radius: *radius,
            },
            ShapeGeom::Polygon { verts, radius } => ShapeGeom::Polygon {
                verts: verts.iter().map(|v| transform.point(*v)).collect(),
                radius: *radius,
            },
        }
    }
}

fn box_corners(half: Vector<Real>) -> [Point<Real>; 4] {
    [
        Point::new(half.x, -half.y),
        Point::new(half.x, half.y),
        Point::new(-half.x, half.y),
        Point::new(-half.x, -half.y),
    ]
}

/// Snapshot of one collider used by drawing code.
#[derive(Debug, Clone)]
pub struct ShapeInfo {
    pub collider: ColliderHandle,
    pub body: Option<RigidBodyHandle>,
    pub body_kind: BodyKind,
    /// Body placement (identity for parentless colliders).
    pub body_transform: Transform,
    pub body_angle: f32,
    /// Geometry in body space.
    pub local: ShapeGeom,
    pub sensor: bool,
}

impl ShapeInfo {
    pub fn world(&self) -> ShapeGeom {
        self.local.transformed(self.body_transform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // ── geometry extraction ───────────────────────────────────────────────

    #[test]
    fn cuboid_becomes_four_ccw_corners() {
        let shape = Cuboid::new(Vector::new(2.0, 1.0));
        let geom = ShapeGeom::from_shape(&shape, &Isometry::identity()).unwrap();
        let ShapeGeom::Polygon { verts, radius } = geom else { panic!("expected polygon") };
        assert_eq!(radius, 0.0);
        assert_eq!(verts.len(), 4);

        let area2: f32 = (0..4).map(|i| verts[i].cross(verts[(i + 1) % 4])).sum();
        assert_relative_eq!(area2, 2.0 * 8.0);
    }

    #[test]
    fn ball_center_follows_collider_offset() {
        let shape = Ball::new(3.0);
        let offset = Isometry::translation(5.0, -1.0);
        let geom = ShapeGeom::from_shape(&shape, &offset).unwrap();
        assert_eq!(geom, ShapeGeom::Circle { center: Vec2::new(5.0, -1.0), radius: 3.0 });
    }

    #[test]
    fn capsule_keeps_its_radius() {
        let shape = Capsule::new(Point::new(0.0, 0.0), Point::new(4.0, 0.0), 0.5);
        let geom = ShapeGeom::from_shape(&shape, &Isometry::identity()).unwrap();
        assert_eq!(
            geom,
            ShapeGeom::Segment { a: Vec2::new(0.0, 0.0), b: Vec2::new(4.0, 0.0), radius: 0.5 }
        );
    }

    #[test]
    fn transformed_moves_points_not_radii() {
        let geom = ShapeGeom::Circle { center: Vec2::new(1.0, 0.0), radius: 2.0 };
        let moved = geom.transformed(Transform::translate(Vec2::new(10.0, 10.0)));
        assert_eq!(moved, ShapeGeom::Circle { center: Vec2::new(11.0, 10.0), radius: 2.0 });
    }

    // ── props ─────────────────────────────────────────────────────────────

    #[test]
    fn props_builder_sets_fields() {
        let props = ShapeProps::default().with_mass(2.0).with_friction(0.3).with_elasticity(0.9).sensor();
        assert_eq!(props.mass, 2.0);
        assert_eq!(props.friction, 0.3);
        assert_eq!(props.elasticity, 0.9);
        assert!(props.sensor);
    }
}
