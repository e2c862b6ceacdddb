use bytemuck::{Pod, Zeroable};

use crate::camera::{Camera, Light, LightView};
use crate::paint::Color;

use super::common::{uniform_buffer, uniform_entry};

/// Camera and light block at `group(0) binding(0)` of the mesh programs.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct SceneUniform {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub to_light: [f32; 4],
    pub light_ambient: [f32; 4],
    pub light_diffuse: [f32; 4],
    pub light_specular: [f32; 4],
    pub flat_color: [f32; 4],
    pub params: [f32; 4], // x = lighting enabled, y = far clip
}

impl SceneUniform {
    pub fn new(camera: &Camera, light: &Light, light_view: LightView, lighting: bool, flat: Color) -> Self {
        Self {
            view: camera.view().to_cols_array_2d(),
            proj: camera.projection().to_cols_array_2d(),
            to_light: light_view.to_light.extend(0.0).to_array(),
            light_ambient: light.ambient.to_array(),
            light_diffuse: light.diffuse.to_array(),
            light_specular: light.specular.to_array(),
            flat_color: flat.to_array(),
            params: [if lighting { 1.0 } else { 0.0 }, camera.far, 0.0, 0.0],
        }
    }
}

/// Uniform buffer + bind group shared by the geometry and normal/depth passes.
pub(crate) struct SceneBinding {
    pub layout: wgpu::BindGroupLayout,
    pub bind_group: wgpu::BindGroup,
    buffer: wgpu::Buffer,
}

impl SceneBinding {
    pub fn new(device: &wgpu::Device) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("penumbra scene bgl"),
            entries: &[uniform_entry::<SceneUniform>(
                0,
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            )],
        });
        let buffer = uniform_buffer(device, "penumbra scene ubo", &SceneUniform::zeroed());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("penumbra scene bind group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self {
            layout,
            bind_group,
            buffer,
        }
    }

    pub fn write(&self, queue: &wgpu::Queue, uniform: &SceneUniform) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(uniform));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn layout_is_vec4_aligned() {
        assert_eq!(std::mem::size_of::<SceneUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<SceneUniform>(), 2 * 64 + 6 * 16);
    }

    #[test]
    fn flags_and_far_clip_are_packed() {
        let cam = Camera::look_at(Vec3::new(0.0, 0.0, -8.0), Vec3::ZERO, Vec3::Y);
        let light = Light::directional(Vec3::new(0.0, 4.0, 0.0), Vec3::ZERO);
        let lv = light.view_space(cam.view());
        let u = SceneUniform::new(&cam, &light, lv, false, Color::WHITE);
        assert_eq!(u.params[0], 0.0);
        assert_eq!(u.params[1], 50.0);
        assert_eq!(u.to_light[3], 0.0);
    }
}
