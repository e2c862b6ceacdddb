use crate::paint::Color;
use crate::render::programs::ShaderProgram;
use crate::render::targets::OffscreenTarget;
use crate::scene::{GpuScene, Vertex};

use super::common::begin_pass;
use super::geometry::{mesh_pipeline, MeshPipelineDesc};
use super::scene_uniform::SceneBinding;

/// Background of the normal/depth target: no normal, depth at the far plane.
pub const NORMAL_DEPTH_CLEAR: Color = Color::new(0.0, 0.0, 0.0, 1.0);

/// Half-resolution view-space normals (rgb) and linear depth over far (a).
pub(crate) struct NormalDepthPass {
    pipeline: wgpu::RenderPipeline,
}

impl NormalDepthPass {
    pub fn new(
        device: &wgpu::Device,
        program: &ShaderProgram,
        scene_bgl: &wgpu::BindGroupLayout,
        object_bgl: &wgpu::BindGroupLayout,
        target: &OffscreenTarget,
    ) -> Self {
        let spec = target.spec();
        let pipeline = mesh_pipeline(
            device,
            MeshPipelineDesc {
                label: "penumbra normal/depth pipeline",
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
        Self { pipeline }
    }

    pub fn record(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &OffscreenTarget,
        scene_binding: &SceneBinding,
        scene: &GpuScene,
    ) {
        let mut rpass = begin_pass(
            encoder,
            "penumbra normal/depth pass",
            target.color_attachment(NORMAL_DEPTH_CLEAR),
            target.depth_attachment(),
        );
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &scene_binding.bind_group, &[]);
        scene.draw(&mut rpass);
    }
}
