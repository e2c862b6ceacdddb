//! Pixel-space sizes shared by the runtime and the render pipeline.
//!
//! All sizes are physical pixels. Offscreen targets derive their sizes from
//! the window extent through `render::targets::ResolutionTier`.

mod extent;

pub use extent::Extent;
