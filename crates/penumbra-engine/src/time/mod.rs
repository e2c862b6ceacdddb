//! Time subsystem.
//!
//! One `FrameClock` per window; call `tick()` once per presented frame to
//! obtain `FrameTime`, which also carries the averaged frame rate.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
