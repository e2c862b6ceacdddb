//! Static scene content: procedural meshes, materials and placed objects.

mod arena;
mod gpu;
mod material;
mod mesh;
pub mod primitives;

pub use arena::{MeshArena, MeshId, Scene, SceneObject};
pub use material::Material;
pub use mesh::{MeshData, Vertex};

pub(crate) use gpu::{object_layout, GpuScene};
