//! Render passes of the occlusion pipeline, one module per pass.

pub(crate) mod common;
pub mod blur;
pub(crate) mod composite;
pub mod geometry;
pub(crate) mod normal_depth;
pub(crate) mod scene_uniform;
pub(crate) mod ssao;

pub use blur::{blur_reference, BlurAxis, BLUR_RADIUS, BLUR_WEIGHTS};
pub use geometry::{frustum_lines, prepare_view, FrameView, FRUSTUM_COLOR};
pub use normal_depth::NORMAL_DEPTH_CLEAR;
