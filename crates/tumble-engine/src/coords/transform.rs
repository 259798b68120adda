use super::{BB, Vec2};

/// 2D affine transform.
///
/// Maps `p` to `(a*x + c*y + tx, b*x + d*y + ty)`, i.e. the column-major
/// matrix
///
/// ```text
/// | a c tx |
/// | b d ty |
/// ```
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform { a: 1.0, b: 0.0, c: 0.0, d: 1.0, tx: 0.0, ty: 0.0 };

    #[inline]
    pub const fn new(a: f32, b: f32, c: f32, d: f32, tx: f32, ty: f32) -> Self {
        Self { a, b, c, d, tx, ty }
    }

    #[inline]
    pub const fn translate(t: Vec2) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, t.x, t.y)
    }

    #[inline]
    pub const fn scale(sx: f32, sy: f32) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Rotation by `angle` radians followed by a translation.
    #[inline]
    pub fn rigid(translation: Vec2, angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::new(c, s, -s, c, translation.x, translation.y)
    }

    /// Orthographic projection mapping `bb` onto the [-1, 1] clip square.
    pub fn ortho(bb: BB) -> Self {
        let w = bb.r - bb.l;
        let h = bb.t - bb.b;
        Self::new(
            2.0 / w,
            0.0,
            0.0,
            2.0 / h,
            -(bb.r + bb.l) / w,
            -(bb.t + bb.b) / h,
        )
    }

    /// `self * rhs`: applies `rhs` first, then `self`.
    pub fn mult(self, rhs: Transform) -> Self {
        let t1 = self;
        let t2 = rhs;
        Self::new(
            t2.a * t1.a + t2.b * t1.c,
            t2.a * t1.b + t2.b * t1.d,
            t2.c * t1.a + t2.d * t1.c,
            t2.c * t1.b + t2.d * t1.d,
            t2.tx * t1.a + t2.ty * t1.c + t1.tx,
            t2.tx * t1.b + t2.ty * t1.d + t1.ty,
        )
    }

    pub fn inverse(self) -> Self {
        let inv_det = 1.0 / (self.a * self.d - self.c * self.b);
        Self::new(
            self.d * inv_det,
            -self.b * inv_det,
            -self.c * inv_det,
            self.a * inv_det,
            (self.c * self.ty - self.tx * self.d) * inv_det,
            (self.tx * self.b - self.a * self.ty) * inv_det,
        )
    }

    #[inline]
    pub fn point(self, p: Vec2) -> Vec2 {
        Vec2::new(
            self.a * p.x + self.c * p.y + self.tx,
            self.b * p.x + self.d * p.y + self.ty,
        )
    }

    /// Column-major 4×4 matrix as laid out in the shader uniform blocks.
    pub fn to_mat4(self) -> [[f32; 4]; 4] {
        [
            [self.a, self.b, 0.0, 0.0],
            [self.c, self.d, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [self.tx, self.ty, 0.0, 1.0],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_point_eq(a: Vec2, b: Vec2) {
        assert_relative_eq!(a.x, b.x, epsilon = 1e-4);
        assert_relative_eq!(a.y, b.y, epsilon = 1e-4);
    }

    #[test]
    fn mult_applies_right_hand_side_first() {
        let t = Transform::translate(Vec2::new(10.0, 0.0)).mult(Transform::scale(2.0, 2.0));
        assert_point_eq(t.point(Vec2::new(1.0, 1.0)), Vec2::new(12.0, 2.0));
    }

    #[test]
    fn inverse_round_trips_rigid_transform() {
        let t = Transform::rigid(Vec2::new(3.0, -7.0), 0.7);
        let p = Vec2::new(5.0, 11.0);
        assert_point_eq(t.inverse().point(t.point(p)), p);
        assert_point_eq(t.mult(t.inverse()).point(p), p);
    }

    #[test]
    fn ortho_maps_box_corners_to_clip_square() {
        let t = Transform::ortho(BB::new(-320.0, -240.0, 320.0, 240.0));
        assert_point_eq(t.point(Vec2::new(-320.0, -240.0)), Vec2::new(-1.0, -1.0));
        assert_point_eq(t.point(Vec2::new(320.0, 240.0)), Vec2::new(1.0, 1.0));
        assert_point_eq(t.point(Vec2::zero()), Vec2::zero());
    }

    #[test]
    fn mat4_is_column_major() {
        let m = Transform::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0).to_mat4();
        assert_eq!(m[0], [1.0, 2.0, 0.0, 0.0]);
        assert_eq!(m[1], [3.0, 4.0, 0.0, 0.0]);
        assert_eq!(m[3], [5.0, 6.0, 0.0, 1.0]);
    }
}
