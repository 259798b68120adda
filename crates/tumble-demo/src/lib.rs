//! Rigid-body demo scenes drawn through the tumble debug renderer.
//!
//! `space` wraps the physics engine and exposes the debug-draw walk,
//! `harness` runs one scene at a time inside the engine runtime and
//! `demos` holds the scene table.

pub mod config;
pub mod demos;
pub mod harness;
pub mod space;
