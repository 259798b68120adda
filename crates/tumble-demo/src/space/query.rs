use rapier2d::parry::query::PointQuery;
use rapier2d::prelude::*;

use tumble_engine::coords::{BB, Vec2};

use super::world::Space;
use super::{from_point, from_vector, to_point, to_vector};

const GRABBABLE_MASK_BIT: Group = Group::GROUP_32;

/// Candidate search radius for zero-distance point queries; results are
/// still cut at the requested distance.
const MIN_REACH: f32 = 1e-3;

/// Query filter matching shapes the mouse can pick up.
pub const GRAB_FILTER: InteractionGroups = InteractionGroups::new(GRABBABLE_MASK_BIT, GRABBABLE_MASK_BIT);

/// Collision groups for level geometry the mouse must ignore.
pub const NOT_GRABBABLE_FILTER: InteractionGroups =
    InteractionGroups::new(GRABBABLE_MASK_BIT.complement(), GRABBABLE_MASK_BIT.complement());

/// Nearest-shape result of a point query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointQueryInfo {
    pub collider: ColliderHandle,
    pub body: Option<RigidBodyHandle>,
    /// Closest point on the shape's surface.
    pub point: Vec2,
    /// Distance to `point`; negative when the query point is inside.
    pub distance: f32,
}

/// First hit along a segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentQueryInfo {
    pub collider: ColliderHandle,
    pub point: Vec2,
    pub normal: Vec2,
    /// Fraction of the segment before the hit, in `[0, 1]`.
    pub alpha: f32,
}

impl Space {
    /// Shape with the smallest signed distance to `point`, no farther than
    /// `max_distance`. A shape containing the point beats one merely near
    /// it. Sensors are skipped.
    pub fn point_query_nearest(&self, point: Vec2, max_distance: f32, filter: InteractionGroups) -> Option<PointQueryInfo> {
        let p = to_point(point);
        let reach = Ball::new(max_distance.max(MIN_REACH));
        let mut nearest: Option<PointQueryInfo> = None;

        self.query_pipeline.intersections_with_shape(
            &self.bodies,
            &self.colliders,
            &Isometry::translation(p.x, p.y),
            &reach,
            QueryFilter::default().groups(filter).exclude_sensors(),
            |handle| {
                let Some(collider) = self.colliders.get(handle) else { return true };
                let projection = collider.shape().project_point(collider.position(), &p, false);
                let gap = (projection.point - p).norm();
                let distance = if projection.is_inside { -gap } else { gap };

                if distance <= max_distance && nearest.is_none_or(|best| distance < best.distance) {
                    nearest = Some(PointQueryInfo {
                        collider: handle,
                        body: collider.parent(),
                        point: from_point(&projection.point),
                        distance,
                    });
                }
                true
            },
        );
        nearest
    }

    /// First shape crossed by the segment `start..end`.
    pub fn segment_query_first(&self, start: Vec2, end: Vec2, filter: InteractionGroups) -> Option<SegmentQueryInfo> {
        let ray = Ray::new(to_point(start), to_vector(end - start));
        let (collider, hit) = self.query_pipeline.cast_ray_and_get_normal(
            &self.bodies,
            &self.colliders,
            &ray,
            1.0,
            true,
            QueryFilter::default().groups(filter),
        )?;

        let alpha = hit.time_of_impact;
        Some(SegmentQueryInfo {
            collider,
            point: from_point(&ray.point_at(alpha)),
            normal: from_vector(&hit.normal),
            alpha,
        })
    }

    /// Every collider containing `point`.
    pub fn shapes_at_point(&self, point: Vec2, filter: InteractionGroups) -> Vec<ColliderHandle> {
        let mut hits = Vec::new();
        self.query_pipeline.intersections_with_point(
            &self.bodies,
            &self.colliders,
            &to_point(point),
            QueryFilter::default().groups(filter),
            |handle| {
                hits.push(handle);
                true
            },
        );
        hits
    }

    /// Colliders currently overlapping the sensor `sensor`.
    pub fn sensor_overlaps(&self, sensor: ColliderHandle) -> Vec<ColliderHandle> {
        self.narrow_phase
            .intersection_pairs_with(sensor)
            .filter(|(_, _, intersecting)| *intersecting)
            .map(|(c1, c2, _)| if c1 == sensor { c2 } else { c1 })
            .collect()
    }

    /// World-space bounding box of a collider.
    pub fn shape_bb(&self, handle: ColliderHandle) -> Option<BB> {
        let aabb = self.colliders.get(handle)?.compute_aabb();
        Some(BB::new(aabb.mins.x, aabb.mins.y, aabb.maxs.x, aabb.maxs.y))
    }
}
