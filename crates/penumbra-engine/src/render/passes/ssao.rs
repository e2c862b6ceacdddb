use crate::render::bindings::{
    BindingTable, TextureRole, CLAMP_SAMPLER_BINDING, PARAMS_BINDING, REPEAT_SAMPLER_BINDING,
};
use crate::render::config::{SsaoConfig, SsaoUniform};
use crate::render::noise::NoiseTexture;
use crate::render::programs::ShaderProgram;
use crate::render::targets::{OffscreenTarget, TargetPool, TargetRole};
use crate::paint::Color;

use super::common::{
    begin_pass, fullscreen_layout, fullscreen_pipeline, linear_sampler, uniform_buffer, Extras,
    FullscreenQuad,
};

/// Occlusion estimate from normal/depth and the tiled noise texture.
pub(crate) struct SsaoPass {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    params: wgpu::Buffer,
    clamp_sampler: wgpu::Sampler,
    repeat_sampler: wgpu::Sampler,
    bind_group: wgpu::BindGroup,
    noise_unit: u32,
    normal_depth_unit: u32,
}

impl SsaoPass {
    pub fn new(
        device: &wgpu::Device,
        program: &ShaderProgram,
        table: &BindingTable,
        config: SsaoConfig,
        pool: &TargetPool,
        noise: &NoiseTexture,
    ) -> anyhow::Result<Self> {
        let noise_unit = table.require(TextureRole::Noise)?;
        let normal_depth_unit = table.require(TextureRole::NormalDepth)?;

        let layout = fullscreen_layout(
            device,
            "penumbra ssao bgl",
            table,
            Extras {
                params_size: Some(std::mem::size_of::<SsaoUniform>() as u64),
                clamp_sampler: true,
                repeat_sampler: true,
            },
        );
        let target = pool.get(TargetRole::Occlusion);
        let pipeline = fullscreen_pipeline(
            device,
            "penumbra ssao pipeline",
            program.module(),
            "fs_main",
            &layout,
            target.spec().format,
        );
        let params = uniform_buffer(device, "penumbra ssao params", &config.to_uniform());
        let clamp_sampler = linear_sampler(device, "penumbra clamp sampler", wgpu::AddressMode::ClampToEdge);
        let repeat_sampler = linear_sampler(device, "penumbra repeat sampler", wgpu::AddressMode::Repeat);

        let bind_group = Self::make_bind_group(
            device,
            &layout,
            &params,
            &clamp_sampler,
            &repeat_sampler,
            (noise_unit, noise.view()),
            (normal_depth_unit, pool.get(TargetRole::NormalDepth).sampled_view()),
        );

        Ok(Self {
            pipeline,
            layout,
            params,
            clamp_sampler,
            repeat_sampler,
            bind_group,
            noise_unit,
            normal_depth_unit,
        })
    }

    fn make_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        params: &wgpu::Buffer,
        clamp: &wgpu::Sampler,
        repeat: &wgpu::Sampler,
        noise: (u32, &wgpu::TextureView),
        normal_depth: (u32, &wgpu::TextureView),
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("penumbra ssao bind group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: noise.0,
                    resource: wgpu::BindingResource::TextureView(noise.1),
                },
                wgpu::BindGroupEntry {
                    binding: normal_depth.0,
                    resource: wgpu::BindingResource::TextureView(normal_depth.1),
                },
                wgpu::BindGroupEntry {
                    binding: PARAMS_BINDING,
                    resource: params.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: CLAMP_SAMPLER_BINDING,
                    resource: wgpu::BindingResource::Sampler(clamp),
                },
                wgpu::BindGroupEntry {
                    binding: REPEAT_SAMPLER_BINDING,
                    resource: wgpu::BindingResource::Sampler(repeat),
                },
            ],
        })
    }

    /// Points the bind group at the pool's current normal/depth target.
    pub fn rebind(&mut self, device: &wgpu::Device, pool: &TargetPool, noise: &NoiseTexture) {
        self.bind_group = Self::make_bind_group(
            device,
            &self.layout,
            &self.params,
            &self.clamp_sampler,
            &self.repeat_sampler,
            (self.noise_unit, noise.view()),
            (self.normal_depth_unit, pool.get(TargetRole::NormalDepth).sampled_view()),
        );
    }

    pub fn units(&self) -> (u32, u32) {
        (self.noise_unit, self.normal_depth_unit)
    }

    pub fn record(&self, encoder: &mut wgpu::CommandEncoder, target: &OffscreenTarget, quad: &FullscreenQuad) {
        let mut rpass = begin_pass(
            encoder,
            "penumbra ssao pass",
            target.color_attachment(Color::WHITE),
            None,
        );
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);
        quad.draw(&mut rpass);
    }
}
