//! Full-resolution lit scene plus the light's frustum wireframe.

use wgpu::util::DeviceExt;

use crate::camera::{Camera, Light, LightView};
use crate::paint::Color;
use crate::render::programs::ShaderProgram;
use crate::render::targets::{OffscreenTarget, DEPTH_FORMAT};
use crate::scene::{GpuScene, Vertex};

use super::common::begin_pass;
use super::scene_uniform::SceneBinding;

/// Flat colour of the light frustum lines.
pub const FRUSTUM_COLOR: Color = Color::rgb(1.0, 1.0, 0.1);

/// 12 frustum edges plus 4 lines from the light to the near corners.
const FRUSTUM_VERTEX_COUNT: usize = 32;

/// Camera and light state derived once per frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameView {
    pub camera: Camera,
    pub light_view: LightView,
}

/// Moves the eye to `eye_distance` from the origin, fits the aspect ratio to the
/// output and expresses the light in the resulting camera space.
pub fn prepare_view(camera: &Camera, light: &Light, eye_distance: f32, aspect: f32) -> FrameView {
    let camera = camera.reprojected(eye_distance).with_aspect(aspect);
    let light_view = light.view_space(camera.view());
    FrameView { camera, light_view }
}

/// Line-list vertices outlining the light's shadow frustum.
pub fn frustum_lines(light: &Light) -> [[f32; 3]; FRUSTUM_VERTEX_COUNT] {
    let c = light.shadow_camera().frustum_corners();
    let mut out = [[0.0; 3]; FRUSTUM_VERTEX_COUNT];
    let mut n = 0;
    let mut push = |a: glam::Vec3, b: glam::Vec3| {
        out[n] = a.to_array();
        out[n + 1] = b.to_array();
        n += 2;
    };
    for i in 0..4 {
        let j = (i + 1) % 4;
        push(c[i], c[j]); // near ring
        push(c[4 + i], c[4 + j]); // far ring
        push(c[i], c[4 + i]); // sides
        push(light.position, c[i]); // apex
    }
    out
}

pub(crate) struct GeometryPass {
    lit: wgpu::RenderPipeline,
    frustum: wgpu::RenderPipeline,
    frustum_vbo: wgpu::Buffer,
    clear: Color,
}

/// Shared shape of the mesh pipelines (lit scene, frustum, normal/depth).
pub(crate) struct MeshPipelineDesc<'a> {
    pub label: &'a str,
    pub program: &'a ShaderProgram,
    pub vs_entry: &'a str,
    pub fs_entry: &'a str,
    pub layouts: &'a [&'a wgpu::BindGroupLayout],
    pub vertex: wgpu::VertexBufferLayout<'static>,
    pub topology: wgpu::PrimitiveTopology,
    pub format: wgpu::TextureFormat,
    pub sample_count: u32,
}

pub(crate) fn mesh_pipeline(device: &wgpu::Device, desc: MeshPipelineDesc<'_>) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(desc.label),
        bind_group_layouts: desc.layouts,
        immediate_size: 0,
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: desc.program.module(),
            entry_point: Some(desc.vs_entry),
            compilation_options: Default::default(),
            buffers: &[desc.vertex],
        },
        fragment: Some(wgpu::FragmentState {
            module: desc.program.module(),
            entry_point: Some(desc.fs_entry),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: desc.format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: desc.topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: desc.sample_count,
            ..Default::default()
        },
        multiview_mask: None,
        cache: None,
    })
}

const FRUSTUM_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

impl GeometryPass {
    pub fn new(
        device: &wgpu::Device,
        program: &ShaderProgram,
        scene_bgl: &wgpu::BindGroupLayout,
        object_bgl: &wgpu::BindGroupLayout,
        target: &OffscreenTarget,
        clear: Color,
    ) -> Self {
        let spec = target.spec();
        let lit = mesh_pipeline(
            device,
            MeshPipelineDesc {
                label: "penumbra geometry pipeline",
                program,
                vs_entry: "vs_main",
                fs_entry: "fs_main",
                layouts: &[scene_bgl, object_bgl],
                vertex: Vertex::layout(),
                topology: wgpu::PrimitiveTopology::TriangleList,
                format: spec.format,
                sample_count: spec.sample_count,
            },
        );
        let frustum = mesh_pipeline(
            device,
            MeshPipelineDesc {
                label: "penumbra light frustum pipeline",
                program,
                vs_entry: "vs_flat",
                fs_entry: "fs_flat",
                layouts: &[scene_bgl],
                vertex: wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<[f32; 3]>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &FRUSTUM_ATTRS,
                },
                topology: wgpu::PrimitiveTopology::LineList,
                format: spec.format,
                sample_count: spec.sample_count,
            },
        );
        let frustum_vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("penumbra light frustum vbo"),
            contents: bytemuck::cast_slice(&[[0.0f32; 3]; FRUSTUM_VERTEX_COUNT]),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        Self {
            lit,
            frustum,
            frustum_vbo,
            clear,
        }
    }

    pub fn record(
        &self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        target: &OffscreenTarget,
        scene_binding: &SceneBinding,
        scene: &GpuScene,
        light: &Light,
    ) {
        queue.write_buffer(&self.frustum_vbo, 0, bytemuck::cast_slice(&frustum_lines(light)));

        let mut rpass = begin_pass(
            encoder,
            "penumbra geometry pass",
            target.color_attachment(self.clear),
            target.depth_attachment(),
        );
        rpass.set_bind_group(0, &scene_binding.bind_group, &[]);

        rpass.set_pipeline(&self.frustum);
        rpass.set_vertex_buffer(0, self.frustum_vbo.slice(..));
        rpass.draw(0..FRUSTUM_VERTEX_COUNT as u32, 0..1);

        rpass.set_pipeline(&self.lit);
        scene.draw(&mut rpass);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn prepared_view_sits_at_requested_distance() {
        let cam = Camera::look_at(Vec3::new(0.0, 0.0, -8.0), Vec3::ZERO, Vec3::Y);
        let light = Light::directional(Vec3::new(0.0, 4.0, 0.0), Vec3::ZERO);
        let view = prepare_view(&cam, &light, 20.0, 720.0 / 486.0);
        assert!((view.camera.eye.length() - 20.0).abs() < 1e-4);
        assert!((view.camera.aspect - 720.0 / 486.0).abs() < 1e-6);
        assert!((view.light_view.to_light.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn frustum_is_drawn_in_warm_yellow() {
        assert_eq!(FRUSTUM_COLOR.to_array(), [1.0, 1.0, 0.1, 1.0]);
    }

    #[test]
    fn frustum_apex_lines_start_at_light() {
        let light = Light::directional(Vec3::new(0.0, 4.0, 0.0), Vec3::ZERO);
        let lines = frustum_lines(&light);
        let apex_starts = lines
            .chunks_exact(2)
            .filter(|seg| seg[0] == light.position.to_array())
            .count();
        assert_eq!(apex_starts, 4);
        assert!(lines.iter().flatten().all(|c| c.is_finite()));
    }
}
