use bytemuck::{Pod, Zeroable};

/// Position + normal vertex shared by every scene mesh.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x3  // normal
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Indexed triangle list on the CPU.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Checks that the index list forms whole triangles and stays in range.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.indices.is_empty(), "mesh has no triangles");
        anyhow::ensure!(
            self.indices.len() % 3 == 0,
            "mesh index count {} is not a multiple of 3",
            self.indices.len()
        );
        let n = self.vertices.len() as u32;
        if let Some(bad) = self.indices.iter().find(|&&i| i >= n) {
            anyhow::bail!("mesh index {bad} out of range ({n} vertices)");
        }
        Ok(())
    }
}
