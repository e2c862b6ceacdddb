use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;

use super::arena::{Scene, SceneObject};

/// Per-object uniform block (`group(1)` of the geometry and normal/depth programs).
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub normal_model: [[f32; 4]; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub shininess: [f32; 4], // x = exponent
}

impl ObjectUniform {
    fn from_object(obj: &SceneObject) -> Self {
        let m = &obj.material;
        Self {
            model: obj.transform.to_cols_array_2d(),
            normal_model: obj.transform.inverse().transpose().to_cols_array_2d(),
            ambient: m.ambient.to_array(),
            diffuse: m.diffuse.to_array(),
            specular: m.specular.to_array(),
            shininess: [m.shininess, 0.0, 0.0, 0.0],
        }
    }
}

pub(crate) fn object_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("penumbra object bgl"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<ObjectUniform>() as u64),
            },
            count: None,
        }],
    })
}

struct GpuMesh {
    vbo: wgpu::Buffer,
    ibo: wgpu::Buffer,
    index_count: u32,
}

struct GpuObject {
    mesh: usize,
    bind_group: wgpu::BindGroup,
    _ubo: wgpu::Buffer,
}

/// Immutable GPU copy of a [`Scene`].
pub(crate) struct GpuScene {
    meshes: Vec<GpuMesh>,
    objects: Vec<GpuObject>,
}

impl GpuScene {
    pub fn upload(
        device: &wgpu::Device,
        scene: &Scene,
        object_bgl: &wgpu::BindGroupLayout,
    ) -> anyhow::Result<Self> {
        scene.validate()?;

        let meshes = scene
            .meshes
            .iter()
            .map(|(id, mesh)| GpuMesh {
                vbo: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("penumbra mesh #{} vbo", id.index())),
                    contents: bytemuck::cast_slice(&mesh.vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                }),
                ibo: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("penumbra mesh #{} ibo", id.index())),
                    contents: bytemuck::cast_slice(&mesh.indices),
                    usage: wgpu::BufferUsages::INDEX,
                }),
                index_count: mesh.indices.len() as u32,
            })
            .collect();

        let objects = scene
            .objects
            .iter()
            .map(|obj| {
                let ubo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("penumbra object ubo"),
                    contents: bytemuck::bytes_of(&ObjectUniform::from_object(obj)),
                    usage: wgpu::BufferUsages::UNIFORM,
                });
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("penumbra object bind group"),
                    layout: object_bgl,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: ubo.as_entire_binding(),
                    }],
                });
                GpuObject {
                    mesh: obj.mesh.index(),
                    bind_group,
                    _ubo: ubo,
                }
            })
            .collect();

        Ok(Self { meshes, objects })
    }

    /// Issues one indexed draw per object. Object uniforms go to `group(1)`.
    pub fn draw(&self, rpass: &mut wgpu::RenderPass<'_>) {
        for obj in &self.objects {
            let Some(mesh) = self.meshes.get(obj.mesh) else { continue };
            rpass.set_bind_group(1, &obj.bind_group, &[]);
            rpass.set_vertex_buffer(0, mesh.vbo.slice(..));
            rpass.set_index_buffer(mesh.ibo.slice(..), wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Material;
    use glam::Vec3;

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let obj = SceneObject {
            mesh: crate::scene::MeshArena::new().insert(Default::default()),
            material: Material::default(),
            transform: Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0)),
        };
        let u = ObjectUniform::from_object(&obj);
        let n = Mat4::from_cols_array_2d(&u.normal_model);
        assert!((n.x_axis.x - 0.5).abs() < 1e-6);
        assert!((n.y_axis.y - 1.0).abs() < 1e-6);
    }
}
