//! Tumble engine crate.
//!
//! Window, GPU and input runtime plus the immediate-mode debug renderer used
//! by the physics demos.

pub mod core;
pub mod device;
pub mod input;
pub mod time;
pub mod window;

pub mod coords;
pub mod logging;
pub mod paint;
pub mod render;
