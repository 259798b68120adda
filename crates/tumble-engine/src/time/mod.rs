//! Time subsystem.
//!
//! - `FrameClock`: wall-clock deltas, one tick per presented frame
//! - `FixedStepper`: accumulator that turns variable frame deltas into
//!   fixed-size simulation ticks

mod fixed_step;
mod frame_clock;

pub use fixed_step::{FixedStepper, MAX_FRAME_DELTA};
pub use frame_clock::{FrameClock, FrameTime};
