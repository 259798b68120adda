use std::collections::HashMap;
use std::num::NonZeroUsize;

use rapier2d::prelude::*;

use tumble_engine::coords::{Transform, Vec2};

use super::joints::JointKind;
use super::shapes::{ShapeGeom, ShapeInfo, ShapeProps};
use super::{from_vector, to_point, to_vector};

/// Motion type of a body, mirrored from rapier's body types.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BodyKind {
    Static,
    Dynamic,
    Kinematic,
}

impl BodyKind {
    fn of(body: &RigidBody) -> Self {
        if body.is_dynamic() {
            BodyKind::Dynamic
        } else if body.is_kinematic() {
            BodyKind::Kinematic
        } else {
            BodyKind::Static
        }
    }
}

/// Per-step solver counters shown in the info overlay.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct SpaceStats {
    /// Collider pairs with at least one active contact.
    pub arbiters: usize,
    pub contact_points: usize,
    /// Joints other than contacts.
    pub constraints: usize,
    pub iterations: usize,
    pub kinetic_energy: f32,
}

/// A rapier world plus the settings the demos tune.
///
/// Every space owns one static body for level geometry; see
/// [`Space::static_body`].
pub struct Space {
    gravity: Vector<Real>,
    damping: f32,
    sleep_time_threshold: f32,

    pub(crate) params: IntegrationParameters,
    pipeline: PhysicsPipeline,
    pub(crate) islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    pub(crate) narrow_phase: NarrowPhase,
    pub(crate) bodies: RigidBodySet,
    pub(crate) colliders: ColliderSet,
    pub(crate) impulse_joints: ImpulseJointSet,
    pub(crate) multibody_joints: MultibodyJointSet,
    ccd: CCDSolver,
    pub(crate) query_pipeline: QueryPipeline,

    pub(crate) joint_kinds: HashMap<ImpulseJointHandle, JointKind>,
    static_body: RigidBodyHandle,
}

impl Default for Space {
    fn default() -> Self {
        Self::new()
    }
}

impl Space {
    pub fn new() -> Self {
        let mut params = IntegrationParameters::default();
        // The demos work in pixel-sized units.
        params.length_unit = 20.0;

        let mut bodies = RigidBodySet::new();
        let static_body = bodies.insert(RigidBodyBuilder::fixed().build());

        Self {
            gravity: Vector::zeros(),
            damping: 1.0,
            sleep_time_threshold: f32::INFINITY,
            params,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies,
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            joint_kinds: HashMap::new(),
            static_body,
        }
    }

    // ── settings ──────────────────────────────────────────────────────────

    pub fn gravity(&self) -> Vec2 {
        from_vector(&self.gravity)
    }

    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = to_vector(gravity);
    }

    pub fn iterations(&self) -> usize {
        self.params.num_solver_iterations.get()
    }

    /// Solver iterations per step; clamped to at least one.
    pub fn set_iterations(&mut self, iterations: usize) {
        self.params.num_solver_iterations = NonZeroUsize::new(iterations).unwrap_or(NonZeroUsize::MIN);
    }

    /// Fraction of velocity kept after one second.
    pub fn damping(&self) -> f32 {
        self.damping
    }

    /// Applies to every dynamic body, existing and future.
    pub fn set_damping(&mut self, damping: f32) {
        self.damping = damping.clamp(f32::MIN_POSITIVE, 1.0);
        let coefficient = self.damping_coefficient();
        for (_, body) in self.bodies.iter_mut() {
            body.set_linear_damping(coefficient);
            body.set_angular_damping(coefficient);
        }
    }

    fn damping_coefficient(&self) -> f32 {
        -self.damping.ln()
    }

    pub fn sleep_time_threshold(&self) -> f32 {
        self.sleep_time_threshold
    }

    /// Seconds a body must stay idle before it sleeps. `INFINITY` disables
    /// sleeping.
    pub fn set_sleep_time_threshold(&mut self, seconds: f32) {
        self.sleep_time_threshold = seconds;
        for (_, body) in self.bodies.iter_mut() {
            body.activation_mut().time_until_sleep = seconds;
        }
    }

    // ── bodies ────────────────────────────────────────────────────────────

    /// The space's built-in static body.
    pub fn static_body(&self) -> RigidBodyHandle {
        self.static_body
    }

    pub fn add_body(&mut self, builder: RigidBodyBuilder) -> RigidBodyHandle {
        let coefficient = self.damping_coefficient();
        let mut body = builder.build();
        if body.is_dynamic() {
            body.set_linear_damping(body.linear_damping() + coefficient);
            body.set_angular_damping(body.angular_damping() + coefficient);
        }
        body.activation_mut().time_until_sleep = self.sleep_time_threshold;
        self.bodies.insert(body)
    }

    pub fn add_dynamic(&mut self, position: Vec2, angle: f32) -> RigidBodyHandle {
        self.add_body(RigidBodyBuilder::dynamic().translation(to_vector(position)).rotation(angle))
    }

    pub fn add_kinematic(&mut self, position: Vec2) -> RigidBodyHandle {
        self.add_body(RigidBodyBuilder::kinematic_velocity_based().translation(to_vector(position)))
    }

    /// Kinematic body moved by position targets; see
    /// [`Space::set_kinematic_target`].
    pub fn add_kinematic_target(&mut self, position: Vec2) -> RigidBodyHandle {
        self.add_body(RigidBodyBuilder::kinematic_position_based().translation(to_vector(position)))
    }

    /// Position the kinematic body reaches at the end of the next step. Its
    /// velocity is derived from the move.
    pub fn set_kinematic_target(&mut self, handle: RigidBodyHandle, position: Vec2) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_next_kinematic_translation(to_vector(position));
        }
    }

    /// Switches a body between static, dynamic and velocity-based kinematic.
    /// Dynamic mass comes back from the body's colliders.
    pub fn set_body_kind(&mut self, handle: RigidBodyHandle, kind: BodyKind) {
        let Some(body) = self.bodies.get_mut(handle) else { return };
        let body_type = match kind {
            BodyKind::Static => RigidBodyType::Fixed,
            BodyKind::Dynamic => RigidBodyType::Dynamic,
            BodyKind::Kinematic => RigidBodyType::KinematicVelocityBased,
        };
        body.set_body_type(body_type, true);
    }

    pub fn set_velocity(&mut self, handle: RigidBodyHandle, velocity: Vec2) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_linvel(to_vector(velocity), true);
        }
    }

    pub fn velocity(&self, handle: RigidBodyHandle) -> Option<Vec2> {
        self.bodies.get(handle).map(|b| from_vector(b.linvel()))
    }

    pub fn set_angular_velocity(&mut self, handle: RigidBodyHandle, w: f32) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_angvel(w, true);
        }
    }

    /// Teleports a body and clears its velocity.
    pub fn reset_body(&mut self, handle: RigidBodyHandle, position: Vec2) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_translation(to_vector(position), true);
            body.set_linvel(Vector::zeros(), true);
            body.set_angvel(0.0, true);
        }
    }

    /// Removes a body with its colliders and joints.
    pub fn remove_body(&mut self, handle: RigidBodyHandle) {
        let removed = self.bodies.remove(
            handle,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
        if removed.is_some() {
            let joints = &self.impulse_joints;
            self.joint_kinds.retain(|h, _| joints.contains(*h));
        }
    }

    pub fn body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle)
    }

    pub fn body_kind(&self, handle: RigidBodyHandle) -> Option<BodyKind> {
        self.bodies.get(handle).map(BodyKind::of)
    }

    pub fn body_position(&self, handle: RigidBodyHandle) -> Option<Vec2> {
        self.bodies.get(handle).map(|b| from_vector(b.translation()))
    }

    pub fn body_transform(&self, handle: RigidBodyHandle) -> Option<Transform> {
        self.bodies.get(handle).map(body_transform)
    }

    /// World point to the body's local frame.
    pub fn world_to_local(&self, handle: RigidBodyHandle, point: Vec2) -> Option<Vec2> {
        let body = self.bodies.get(handle)?;
        let local = body.position().inverse_transform_point(&to_point(point));
        Some(Vec2::new(local.x, local.y))
    }

    /// Mass of the body; infinite for static and kinematic bodies.
    pub fn body_mass(&self, handle: RigidBodyHandle) -> f32 {
        match self.bodies.get(handle) {
            Some(body) if body.is_dynamic() => body.mass(),
            _ => f32::INFINITY,
        }
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn body_handles(&self) -> impl Iterator<Item = RigidBodyHandle> + '_ {
        self.bodies.iter().map(|(h, _)| h)
    }

    // ── shapes ────────────────────────────────────────────────────────────

    fn attach(&mut self, body: RigidBodyHandle, builder: ColliderBuilder, props: ShapeProps) -> ColliderHandle {
        let collider = props.apply(builder).build();
        self.colliders.insert_with_parent(collider, body, &mut self.bodies)
    }

    pub fn add_circle(&mut self, body: RigidBodyHandle, radius: f32, offset: Vec2, props: ShapeProps) -> ColliderHandle {
        self.attach(body, ColliderBuilder::ball(radius).translation(to_vector(offset)), props)
    }

    /// Axis-aligned box centered on the body, optionally rounded by `radius`.
    pub fn add_box(&mut self, body: RigidBodyHandle, width: f32, height: f32, radius: f32, props: ShapeProps) -> ColliderHandle {
        let (hw, hh) = (width * 0.5, height * 0.5);
        let builder = if radius > 0.0 {
            ColliderBuilder::round_cuboid(hw, hh, radius)
        } else {
            ColliderBuilder::cuboid(hw, hh)
        };
        self.attach(body, builder, props)
    }

    /// Convex hull of `verts` in body space. `None` when the hull is
    /// degenerate.
    pub fn add_polygon(&mut self, body: RigidBodyHandle, verts: &[Vec2], radius: f32, props: ShapeProps) -> Option<ColliderHandle> {
        let points: Vec<Point<Real>> = verts.iter().map(|v| to_point(*v)).collect();
        let builder = if radius > 0.0 {
            ColliderBuilder::round_convex_hull(&points, radius)?
        } else {
            ColliderBuilder::convex_hull(&points)?
        };
        Some(self.attach(body, builder, props))
    }

    /// Segment in body space; rounded to a capsule when `radius` > 0.
    pub fn add_segment(&mut self, body: RigidBodyHandle, a: Vec2, b: Vec2, radius: f32, props: ShapeProps) -> ColliderHandle {
        let builder = if radius > 0.0 {
            ColliderBuilder::capsule_from_endpoints(to_point(a), to_point(b), radius)
        } else {
            ColliderBuilder::segment(to_point(a), to_point(b))
        };
        self.attach(body, builder, props)
    }

    pub fn collider(&self, handle: ColliderHandle) -> Option<&Collider> {
        self.colliders.get(handle)
    }

    pub fn shape_count(&self) -> usize {
        self.colliders.len()
    }

    /// Body-space geometry and placement of one collider.
    pub fn shape_info(&self, handle: ColliderHandle) -> Option<ShapeInfo> {
        let collider = self.colliders.get(handle)?;
        let parent = collider.parent().and_then(|h| self.bodies.get(h).map(|b| (h, b)));

        let (body, body_kind, body_transform, body_angle, local) = match parent {
            Some((h, b)) => {
                let offset = collider.position_wrt_parent().copied().unwrap_or_else(Isometry::identity);
                let local = ShapeGeom::from_shape(collider.shape(), &offset)?;
                (Some(h), BodyKind::of(b), body_transform(b), b.rotation().angle(), local)
            }
            None => {
                let local = ShapeGeom::from_shape(collider.shape(), collider.position())?;
                (None, BodyKind::Static, Transform::IDENTITY, 0.0, local)
            }
        };

        Some(ShapeInfo {
            collider: handle,
            body,
            body_kind,
            body_transform,
            body_angle,
            local,
            sensor: collider.is_sensor(),
        })
    }

    /// Every drawable collider, in storage order.
    pub fn shapes(&self) -> impl Iterator<Item = ShapeInfo> + '_ {
        self.colliders.iter().filter_map(|(h, _)| self.shape_info(h))
    }

    // ── sleeping ──────────────────────────────────────────────────────────

    /// Static bodies never report sleeping.
    pub fn is_sleeping(&self, handle: RigidBodyHandle) -> bool {
        self.bodies.get(handle).is_some_and(|b| !b.is_fixed() && b.is_sleeping())
    }

    /// Seconds the body has been below the sleep velocity thresholds.
    /// Static bodies are permanently idle.
    pub fn idle_time(&self, handle: RigidBodyHandle) -> f32 {
        match self.bodies.get(handle) {
            Some(body) if body.is_fixed() => f32::INFINITY,
            Some(body) => body.activation().time_since_can_sleep,
            None => 0.0,
        }
    }

    // ── stepping ──────────────────────────────────────────────────────────

    pub fn step(&mut self, dt: f64) {
        self.params.dt = dt as Real;
        self.pipeline.step(
            &self.gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// Rebuilds the query index from current collider positions, so queries
    /// see shapes added since the last step.
    pub fn update_query_index(&mut self) {
        self.query_pipeline.update(&self.colliders);
    }

    /// Contact and energy counters for the last step.
    pub fn stats(&self) -> SpaceStats {
        let mut arbiters = 0;
        let mut contact_points = 0;
        for pair in self.narrow_phase.contact_pairs() {
            if !pair.has_any_active_contact {
                continue;
            }
            arbiters += 1;
            contact_points += pair
                .manifolds
                .iter()
                .map(|m| m.data.solver_contacts.len())
                .sum::<usize>();
        }

        SpaceStats {
            arbiters,
            contact_points,
            constraints: self.impulse_joints.len(),
            iterations: self.iterations(),
            kinetic_energy: self.kinetic_energy(),
        }
    }

    /// `Σ m v·v + i ω²` over dynamic bodies, without the ½ factor.
    pub fn kinetic_energy(&self) -> f32 {
        self.bodies
            .iter()
            .filter(|(_, b)| b.is_dynamic())
            .map(|(_, b)| {
                let m = b.mass();
                let i = b.mass_properties().local_mprops.principal_inertia();
                if !m.is_finite() || !i.is_finite() {
                    return 0.0;
                }
                let w = b.angvel();
                m * b.linvel().norm_squared() + i * w * w
            })
            .sum()
    }
}

pub(crate) fn body_transform(body: &RigidBody) -> Transform {
    Transform::rigid(from_vector(body.translation()), body.rotation().angle())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ground_and_ball() -> (Space, RigidBodyHandle) {
        let mut space = Space::new();
        space.set_gravity(Vec2::new(0.0, -100.0));
        let ground = space.static_body();
        space.add_segment(ground, Vec2::new(-100.0, 0.0), Vec2::new(100.0, 0.0), 0.0, ShapeProps::default());
        let ball = space.add_dynamic(Vec2::new(0.0, 50.0), 0.0);
        space.add_circle(ball, 5.0, Vec2::zero(), ShapeProps::default().with_mass(1.0));
        (space, ball)
    }

    // ── settings ──────────────────────────────────────────────────────────

    #[test]
    fn defaults_match_an_empty_world() {
        let space = Space::new();
        assert_eq!(space.gravity(), Vec2::zero());
        assert_eq!(space.damping(), 1.0);
        assert!(space.sleep_time_threshold().is_infinite());
        assert_eq!(space.body_count(), 1);
        assert_eq!(space.body_kind(space.static_body()), Some(BodyKind::Static));
    }

    #[test]
    fn iterations_never_drop_to_zero() {
        let mut space = Space::new();
        space.set_iterations(0);
        assert_eq!(space.iterations(), 1);
        space.set_iterations(30);
        assert_eq!(space.iterations(), 30);
    }

    #[test]
    fn damping_maps_to_log_coefficient() {
        let mut space = Space::new();
        space.set_damping(0.5);
        let body = space.add_dynamic(Vec2::zero(), 0.0);
        let b = space.body(body).unwrap();
        assert_relative_eq!(b.linear_damping(), -(0.5f32).ln());
    }

    // ── stepping ──────────────────────────────────────────────────────────

    #[test]
    fn gravity_pulls_dynamic_bodies_down() {
        let (mut space, ball) = ground_and_ball();
        let y0 = space.body_position(ball).unwrap().y;
        for _ in 0..10 {
            space.step(1.0 / 60.0);
        }
        assert!(space.body_position(ball).unwrap().y < y0);
        assert!(space.kinetic_energy() > 0.0);
    }

    #[test]
    fn resting_ball_produces_one_arbiter() {
        let (mut space, _) = ground_and_ball();
        for _ in 0..240 {
            space.step(1.0 / 60.0);
        }
        let stats = space.stats();
        assert_eq!(stats.arbiters, 1);
        assert!(stats.contact_points >= 1);
        assert_eq!(stats.constraints, 0);
    }

    // ── bodies ────────────────────────────────────────────────────────────

    #[test]
    fn world_local_round_trip() {
        let mut space = Space::new();
        let body = space.add_dynamic(Vec2::new(10.0, 0.0), std::f32::consts::FRAC_PI_2);
        let local = space.world_to_local(body, Vec2::new(10.0, 1.0)).unwrap();
        assert_relative_eq!(local.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(local.y, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn kinematic_target_is_reached_after_one_step() {
        let mut space = Space::new();
        let body = space.add_kinematic_target(Vec2::zero());
        space.set_kinematic_target(body, Vec2::new(3.0, 4.0));
        space.step(1.0 / 60.0);
        let p = space.body_position(body).unwrap();
        assert_relative_eq!(p.x, 3.0, epsilon = 1e-4);
        assert_relative_eq!(p.y, 4.0, epsilon = 1e-4);
        assert!(space.body_mass(body).is_infinite());
    }

    #[test]
    fn static_bodies_have_infinite_mass_and_idle_time() {
        let space = Space::new();
        assert!(space.body_mass(space.static_body()).is_infinite());
        assert!(space.idle_time(space.static_body()).is_infinite());
    }

    #[test]
    fn body_kind_can_be_toggled() {
        let (mut space, ball) = ground_and_ball();
        space.set_body_kind(ball, BodyKind::Static);
        assert_eq!(space.body_kind(ball), Some(BodyKind::Static));
        assert!(space.body_mass(ball).is_infinite());
        space.set_body_kind(ball, BodyKind::Dynamic);
        assert_eq!(space.body_kind(ball), Some(BodyKind::Dynamic));
        assert!(space.body_mass(ball).is_finite());
    }

    #[test]
    fn reset_body_teleports_and_stops() {
        let (mut space, ball) = ground_and_ball();
        space.set_velocity(ball, Vec2::new(5.0, 5.0));
        space.reset_body(ball, Vec2::new(1.0, 2.0));
        assert_eq!(space.body_position(ball), Some(Vec2::new(1.0, 2.0)));
        assert_eq!(space.velocity(ball), Some(Vec2::zero()));
    }

    #[test]
    fn removing_a_body_drops_its_shapes() {
        let (mut space, ball) = ground_and_ball();
        assert_eq!(space.shape_count(), 2);
        space.remove_body(ball);
        assert_eq!(space.shape_count(), 1);
        assert!(space.body(ball).is_none());
    }

    #[test]
    fn shape_info_reports_body_space_geometry() {
        let (space, ball) = ground_and_ball();
        let info = space.shapes().find(|s| s.body == Some(ball)).unwrap();
        assert_eq!(info.body_kind, BodyKind::Dynamic);
        assert_eq!(info.local, ShapeGeom::Circle { center: Vec2::zero(), radius: 5.0 });
        let ShapeGeom::Circle { center, .. } = info.world() else { panic!() };
        assert_relative_eq!(center.y, 50.0);
    }
}
