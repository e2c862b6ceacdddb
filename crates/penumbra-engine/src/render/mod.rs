//! GPU rendering subsystem.
//!
//! [`SsaoPipeline`] owns every GPU resource of the frame: compiled programs,
//! the offscreen [`TargetPool`], the uploaded scene and the noise texture.
//! Callers drive it through [`RenderCtx`] / [`RenderTarget`] and plain value
//! inputs; no state leaks out between frames except what [`FrameOutput`]
//! returns.
//!
//! Convention:
//! - Fullscreen passes draw a unit quad (top-left origin) mapped to NDC in `vs_quad`.
//! - Colour targets are `Rgba16Float`; only the scene target is full resolution.

mod ctx;
pub mod bindings;
pub mod config;
pub mod noise;
pub mod passes;
mod pipeline;
pub mod programs;
pub mod readback;
pub mod schedule;
pub mod targets;
pub mod tracker;

pub use ctx::{RenderCtx, RenderTarget};
pub use config::{PipelineConfig, SsaoConfig};
pub use noise::NoiseImage;
pub use pipeline::{FrameInputs, FrameOutput, SsaoPipeline};
pub use readback::read_texture;
pub use schedule::{frame_schedule, CompositePath, PassKind, RenderMode};
pub use targets::{ResolutionTier, TargetPool, TargetRole};
