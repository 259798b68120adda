//! Coordinate and geometry types shared by the debug renderer and the demos.
//!
//! Canonical CPU space:
//! - world units (the demos use a 640×480 reference view)
//! - origin at the view center
//! - +X right, +Y up
//!
//! Transforms are 2D affine matrices and are widened to `mat4` when uploaded.

mod bb;
mod transform;
mod vec2;

pub use bb::BB;
pub use transform::Transform;
pub use vec2::Vec2;
