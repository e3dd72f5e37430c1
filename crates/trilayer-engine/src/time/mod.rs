//! Time subsystem.
//!
//! One `FrameClock` per run; `tick()` once per frame gives the `FrameTime`
//! (seconds since start) that animation is computed from.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
