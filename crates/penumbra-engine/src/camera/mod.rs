//! Camera and light descriptions read by the render pipeline.
//!
//! Both are plain values owned by the application. The pipeline takes them by
//! reference each frame and returns any derived state explicitly.

mod camera;
mod light;

pub use camera::{reproject_eye, Camera};
pub use light::{Light, LightView, ShadowParams};
