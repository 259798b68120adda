use rapier2d::prelude::*;

use tumble_engine::coords::Vec2;

use super::world::Space;
use super::{to_point, to_vector};

/// How a joint was created; selects its debug-draw glyph.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum JointKind {
    /// Shared anchor point, free rotation.
    Pivot,
    /// Distance between anchors capped at `max`.
    Slide { max: f32 },
    /// Anchor of the second body slides along a groove on the first.
    Groove { a: Vec2, b: Vec2 },
    DampedSpring { rest_length: f32 },
    /// Anchors locked together, rotation included.
    Weld,
    /// Pivot driven at a constant relative angular rate.
    Motor { rate: f32 },
}

impl Space {
    fn insert_joint(
        &mut self,
        body1: RigidBodyHandle,
        body2: RigidBodyHandle,
        joint: impl Into<GenericJoint>,
        kind: JointKind,
    ) -> ImpulseJointHandle {
        let handle = self.impulse_joints.insert(body1, body2, joint, true);
        self.joint_kinds.insert(handle, kind);
        handle
    }

    /// Pins `anchor1` on `body1` to `anchor2` on `body2` (body-space anchors).
    pub fn add_pivot(&mut self, body1: RigidBodyHandle, body2: RigidBodyHandle, anchor1: Vec2, anchor2: Vec2) -> ImpulseJointHandle {
        let joint = RevoluteJointBuilder::new()
            .local_anchor1(to_point(anchor1))
            .local_anchor2(to_point(anchor2))
            .contacts_enabled(false)
            .build();
        self.insert_joint(body1, body2, joint, JointKind::Pivot)
    }

    /// Pivot at a world-space point shared by both bodies.
    pub fn add_pivot_at(&mut self, body1: RigidBodyHandle, body2: RigidBodyHandle, pivot: Vec2) -> Option<ImpulseJointHandle> {
        let anchor1 = self.world_to_local(body1, pivot)?;
        let anchor2 = self.world_to_local(body2, pivot)?;
        Some(self.add_pivot(body1, body2, anchor1, anchor2))
    }

    /// Keeps the anchors at most `max` apart.
    pub fn add_slide(
        &mut self,
        body1: RigidBodyHandle,
        body2: RigidBodyHandle,
        anchor1: Vec2,
        anchor2: Vec2,
        max: f32,
    ) -> ImpulseJointHandle {
        let joint = RopeJointBuilder::new(max)
            .local_anchor1(to_point(anchor1))
            .local_anchor2(to_point(anchor2))
            .build();
        self.insert_joint(body1, body2, joint, JointKind::Slide { max })
    }

    /// `anchor2` on `body2` slides between `groove_a` and `groove_b` on
    /// `body1`. Relative rotation is locked.
    pub fn add_groove(
        &mut self,
        body1: RigidBodyHandle,
        body2: RigidBodyHandle,
        groove_a: Vec2,
        groove_b: Vec2,
        anchor2: Vec2,
    ) -> Option<ImpulseJointHandle> {
        let delta = groove_b - groove_a;
        let axis = UnitVector::try_new(to_vector(delta), 1.0e-6)?;
        let joint = PrismaticJointBuilder::new(axis)
            .local_anchor1(to_point(groove_a))
            .local_anchor2(to_point(anchor2))
            .limits([0.0, delta.length()])
            .contacts_enabled(false)
            .build();
        Some(self.insert_joint(body1, body2, joint, JointKind::Groove { a: groove_a, b: groove_b }))
    }

    pub fn add_damped_spring(
        &mut self,
        body1: RigidBodyHandle,
        body2: RigidBodyHandle,
        anchor1: Vec2,
        anchor2: Vec2,
        rest_length: f32,
        stiffness: f32,
        damping: f32,
    ) -> ImpulseJointHandle {
        let joint = SpringJointBuilder::new(rest_length, stiffness, damping)
            .local_anchor1(to_point(anchor1))
            .local_anchor2(to_point(anchor2))
            .build();
        self.insert_joint(body1, body2, joint, JointKind::DampedSpring { rest_length })
    }

    pub fn add_weld(&mut self, body1: RigidBodyHandle, body2: RigidBodyHandle, anchor1: Vec2, anchor2: Vec2) -> ImpulseJointHandle {
        let joint = FixedJointBuilder::new()
            .local_anchor1(to_point(anchor1))
            .local_anchor2(to_point(anchor2))
            .build();
        self.insert_joint(body1, body2, joint, JointKind::Weld)
    }

    /// Pivot at shared anchors that spins `body2` relative to `body1` at
    /// `rate` radians per second.
    pub fn add_motor(
        &mut self,
        body1: RigidBodyHandle,
        body2: RigidBodyHandle,
        anchor1: Vec2,
        anchor2: Vec2,
        rate: f32,
    ) -> ImpulseJointHandle {
        let joint = RevoluteJointBuilder::new()
            .local_anchor1(to_point(anchor1))
            .local_anchor2(to_point(anchor2))
            .motor_velocity(rate, 1.0e4)
            .contacts_enabled(false)
            .build();
        self.insert_joint(body1, body2, joint, JointKind::Motor { rate })
    }

    pub fn remove_joint(&mut self, handle: ImpulseJointHandle) {
        self.impulse_joints.remove(handle, true);
        self.joint_kinds.remove(&handle);
    }

    pub fn joint_count(&self) -> usize {
        self.impulse_joints.len()
    }

    pub fn joint_kind(&self, handle: ImpulseJointHandle) -> Option<JointKind> {
        self.joint_kinds.get(&handle).copied()
    }

    /// Bodies and body-space anchors of a joint.
    pub fn joint_anchors(&self, handle: ImpulseJointHandle) -> Option<(RigidBodyHandle, Vec2, RigidBodyHandle, Vec2)> {
        let joint = self.impulse_joints.get(handle)?;
        let a1 = joint.data.local_anchor1();
        let a2 = joint.data.local_anchor2();
        Some((joint.body1, Vec2::new(a1.x, a1.y), joint.body2, Vec2::new(a2.x, a2.y)))
    }

    /// Magnitude of the force the joint applied during the last step of
    /// length `dt`.
    pub fn joint_force(&self, handle: ImpulseJointHandle, dt: f64) -> Option<f32> {
        let joint = self.impulse_joints.get(handle)?;
        Some(joint.impulses.norm() / dt as f32)
    }

    pub fn joint_handles(&self) -> impl Iterator<Item = ImpulseJointHandle> + '_ {
        self.impulse_joints.iter().map(|(h, _)| h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::ShapeProps;

    fn two_bodies() -> (Space, RigidBodyHandle, RigidBodyHandle) {
        let mut space = Space::new();
        let a = space.add_dynamic(Vec2::new(0.0, 0.0), 0.0);
        let b = space.add_dynamic(Vec2::new(20.0, 0.0), 0.0);
        space.add_circle(a, 5.0, Vec2::zero(), ShapeProps::default().with_mass(1.0));
        space.add_circle(b, 5.0, Vec2::zero(), ShapeProps::default().with_mass(1.0));
        (space, a, b)
    }

    #[test]
    fn joints_record_their_kind_and_anchors() {
        let (mut space, a, b) = two_bodies();
        let pivot = space.add_pivot(a, b, Vec2::new(10.0, 0.0), Vec2::new(-10.0, 0.0));
        let spring = space.add_damped_spring(a, b, Vec2::zero(), Vec2::zero(), 20.0, 10.0, 0.3);

        assert_eq!(space.joint_count(), 2);
        assert_eq!(space.joint_kind(pivot), Some(JointKind::Pivot));
        assert_eq!(space.joint_kind(spring), Some(JointKind::DampedSpring { rest_length: 20.0 }));

        let (b1, a1, b2, a2) = space.joint_anchors(pivot).unwrap();
        assert_eq!((b1, b2), (a, b));
        assert_eq!(a1, Vec2::new(10.0, 0.0));
        assert_eq!(a2, Vec2::new(-10.0, 0.0));
    }

    #[test]
    fn pivot_at_converts_world_point_per_body() {
        let (mut space, a, b) = two_bodies();
        let joint = space.add_pivot_at(a, b, Vec2::new(10.0, 0.0)).unwrap();
        let (_, a1, _, a2) = space.joint_anchors(joint).unwrap();
        assert_eq!(a1, Vec2::new(10.0, 0.0));
        assert_eq!(a2, Vec2::new(-10.0, 0.0));
    }

    #[test]
    fn degenerate_groove_is_rejected() {
        let (mut space, a, b) = two_bodies();
        assert!(space.add_groove(a, b, Vec2::zero(), Vec2::zero(), Vec2::zero()).is_none());
        assert_eq!(space.joint_count(), 0);
    }

    #[test]
    fn removing_joints_and_bodies_forgets_kinds() {
        let (mut space, a, b) = two_bodies();
        let weld = space.add_weld(a, b, Vec2::zero(), Vec2::new(-20.0, 0.0));
        let motor = space.add_motor(a, b, Vec2::zero(), Vec2::zero(), 1.0);

        space.remove_joint(weld);
        assert_eq!(space.joint_kind(weld), None);
        assert_eq!(space.joint_count(), 1);

        space.remove_body(b);
        assert_eq!(space.joint_kind(motor), None);
        assert_eq!(space.joint_count(), 0);
    }
}
