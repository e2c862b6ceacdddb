//! Color model shared between the scene description and the renderers.

pub mod color;

pub use color::Color;
