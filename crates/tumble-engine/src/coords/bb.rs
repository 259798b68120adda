use super::Vec2;

/// Axis-aligned bounding box stored as left/bottom/right/top edges.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct BB {
    pub l: f32,
    pub b: f32,
    pub r: f32,
    pub t: f32,
}

impl BB {
    #[inline]
    pub const fn new(l: f32, b: f32, r: f32, t: f32) -> Self {
        Self { l, b, r, t }
    }

    #[inline]
    pub fn width(self) -> f32 {
        self.r - self.l
    }

    #[inline]
    pub fn height(self) -> f32 {
        self.t - self.b
    }

    #[inline]
    pub fn contains(self, p: Vec2) -> bool {
        self.l <= p.x && p.x <= self.r && self.b <= p.y && p.y <= self.t
    }
}
