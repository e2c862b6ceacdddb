//! Penumbra engine crate.
//!
//! Platform + GPU runtime pieces (window, device, input, timing) and the
//! screen-space ambient occlusion render pipeline built on top of them.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod paint;
pub mod camera;
pub mod scene;
pub mod render;
