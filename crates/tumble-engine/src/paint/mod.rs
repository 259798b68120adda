//! Color model shared between the debug renderer and the demos.
//!
//! Colors are straight (non-premultiplied) RGBA; the vertex shaders
//! premultiply before blending.

pub mod color;

pub use color::Color;
