/// Straight-alpha RGBA color.
///
/// Vertex colors are stored straight and premultiplied in the vertex stage
/// (`color * color.a`), so callers never premultiply by hand.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const CLEAR: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    #[inline]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Grey of luminance `l` with alpha `a`.
    #[inline]
    pub const fn la(l: f32, a: f32) -> Self {
        Self { r: l, g: l, b: l, a }
    }

    /// Opaque color from 8-bit channels scaled by 1/256.
    ///
    /// Matches hex-float literals like `0xFDp-8`, so `0xFF` maps slightly below 1.
    #[inline]
    pub fn from_u8_256(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r as f32 / 256.0, g as f32 / 256.0, b as f32 / 256.0, 1.0)
    }

    #[inline]
    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Returns the premultiplied representation.
    #[inline]
    pub fn premultiplied(self) -> [f32; 4] {
        [self.r * self.a, self.g * self.a, self.b * self.a, self.a]
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn la_is_grey() {
        let c = Color::la(0.3, 1.0);
        assert_eq!((c.r, c.g, c.b, c.a), (0.3, 0.3, 0.3, 1.0));
    }

    #[test]
    fn from_u8_256_matches_hex_float_scale() {
        let c = Color::from_u8_256(0x80, 0x40, 0x00);
        assert_eq!(c.to_array(), [0.5, 0.25, 0.0, 1.0]);
    }

    #[test]
    fn premultiplied_scales_rgb() {
        assert_eq!(Color::rgba(1.0, 0.5, 0.0, 0.5).premultiplied(), [0.5, 0.25, 0.0, 0.5]);
    }
}
