//! Physics space adapter.
//!
//! Wraps the `rapier2d` sets and pipeline behind the small surface the demos
//! need: body/shape/joint creation, stepping, queries, sleep state and the
//! debug-draw walk. Positions cross this boundary as engine [`Vec2`]s in
//! world units (+Y up).
//!
//! [`Vec2`]: tumble_engine::coords::Vec2

mod debug;
mod joints;
mod query;
mod shapes;
mod world;

pub use debug::{DebugDrawCallbacks, DebugDrawFlags, DebugDrawOptions};
pub use joints::JointKind;
pub use query::{PointQueryInfo, SegmentQueryInfo, GRAB_FILTER, NOT_GRABBABLE_FILTER};
pub use shapes::{ShapeGeom, ShapeInfo, ShapeProps};
pub use world::{BodyKind, Space, SpaceStats};

pub use rapier2d::prelude::{ColliderHandle, ImpulseJointHandle, InteractionGroups, RigidBodyHandle};

use rapier2d::prelude::{Point, Real, Vector};
use tumble_engine::coords::Vec2;

#[inline]
pub(crate) fn to_vector(v: Vec2) -> Vector<Real> {
    Vector::new(v.x, v.y)
}

#[inline]
pub(crate) fn to_point(v: Vec2) -> Point<Real> {
    Point::new(v.x, v.y)
}

#[inline]
pub(crate) fn from_vector(v: &Vector<Real>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

#[inline]
pub(crate) fn from_point(p: &Point<Real>) -> Vec2 {
    Vec2::new(p.x, p.y)
}
