use crate::render::bindings::{BindingTable, TextureRole, CLAMP_SAMPLER_BINDING};
use crate::render::programs::ShaderProgram;
use crate::render::schedule::CompositePath;
use crate::render::targets::{TargetPool, TargetRole};

use super::common::{begin_pass, fullscreen_layout, fullscreen_pipeline, linear_sampler, Extras, FullscreenQuad};

impl CompositePath {
    /// Targets bound to the (occlusion, scene colour) slots.
    ///
    /// Single-image views put the same target in both slots.
    pub fn sources(self) -> (TargetRole, TargetRole) {
        match self {
            CompositePath::Scene => (TargetRole::SceneColor, TargetRole::SceneColor),
            CompositePath::Occlusion => (TargetRole::Occlusion, TargetRole::Occlusion),
            CompositePath::NormalDepth => (TargetRole::NormalDepth, TargetRole::NormalDepth),
            CompositePath::Blended => (TargetRole::BlurVertical, TargetRole::SceneColor),
        }
    }

    fn fs_entry(self) -> &'static str {
        match self {
            CompositePath::Scene | CompositePath::NormalDepth => "fs_base",
            CompositePath::Occlusion => "fs_occlusion",
            CompositePath::Blended => "fs_composite",
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    const ALL: [CompositePath; 4] = [
        CompositePath::Scene,
        CompositePath::Occlusion,
        CompositePath::NormalDepth,
        CompositePath::Blended,
    ];
}

/// Writes the selected image(s) into the output view.
pub(crate) struct CompositePass {
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    occlusion_unit: u32,
    scene_unit: u32,
    format: wgpu::TextureFormat,
    /// Indexed by [`CompositePath`].
    pipelines: Vec<wgpu::RenderPipeline>,
    bind_groups: Vec<wgpu::BindGroup>,
}

impl CompositePass {
    pub fn new(
        device: &wgpu::Device,
        program: &ShaderProgram,
        table: &BindingTable,
        pool: &TargetPool,
        format: wgpu::TextureFormat,
    ) -> anyhow::Result<Self> {
        let occlusion_unit = table.require(TextureRole::Occlusion)?;
        let scene_unit = table.require(TextureRole::SceneColor)?;
        let layout = fullscreen_layout(
            device,
            "penumbra composite bgl",
            table,
            Extras {
                clamp_sampler: true,
                ..Extras::default()
            },
        );
        let sampler = linear_sampler(device, "penumbra composite sampler", wgpu::AddressMode::ClampToEdge);

        let mut pass = Self {
            layout,
            sampler,
            occlusion_unit,
            scene_unit,
            format,
            pipelines: Vec::new(),
            bind_groups: Vec::new(),
        };
        pass.build_pipelines(device, program);
        pass.rebind(device, pool);
        Ok(pass)
    }

    fn build_pipelines(&mut self, device: &wgpu::Device, program: &ShaderProgram) {
        self.pipelines = CompositePath::ALL
            .iter()
            .map(|path| {
                fullscreen_pipeline(
                    device,
                    &format!("penumbra composite pipeline ({})", path.fs_entry()),
                    program.module(),
                    path.fs_entry(),
                    &self.layout,
                    self.format,
                )
            })
            .collect();
    }

    /// Rebuilds the pipelines when the output format changes.
    pub fn ensure_format(&mut self, device: &wgpu::Device, program: &ShaderProgram, format: wgpu::TextureFormat) {
        if self.format == format {
            return;
        }
        log::debug!("composite output format {:?} -> {format:?}", self.format);
        self.format = format;
        self.build_pipelines(device, program);
    }

    pub fn rebind(&mut self, device: &wgpu::Device, pool: &TargetPool) {
        self.bind_groups = CompositePath::ALL
            .iter()
            .map(|path| {
                let (occlusion, scene) = path.sources();
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(&format!(
                        "composite sources: {} / {}",
                        occlusion.label(),
                        scene.label()
                    )),
                    layout: &self.layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: self.occlusion_unit,
                            resource: wgpu::BindingResource::TextureView(pool.get(occlusion).sampled_view()),
                        },
                        wgpu::BindGroupEntry {
                            binding: self.scene_unit,
                            resource: wgpu::BindingResource::TextureView(pool.get(scene).sampled_view()),
                        },
                        wgpu::BindGroupEntry {
                            binding: CLAMP_SAMPLER_BINDING,
                            resource: wgpu::BindingResource::Sampler(&self.sampler),
                        },
                    ],
                })
            })
            .collect();
    }

    pub fn units(&self) -> (u32, u32) {
        (self.occlusion_unit, self.scene_unit)
    }

    pub fn record(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        path: CompositePath,
        output: &wgpu::TextureView,
        quad: &FullscreenQuad,
    ) {
        let mut rpass = begin_pass(
            encoder,
            "penumbra composite pass",
            wgpu::RenderPassColorAttachment {
                view: output,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            },
            None,
        );
        rpass.set_pipeline(&self.pipelines[path.index()]);
        rpass.set_bind_group(0, &self.bind_groups[path.index()], &[]);
        quad.draw(&mut rpass);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_blended_path_reads_the_blur() {
        for path in CompositePath::ALL {
            let (occ, _) = path.sources();
            assert_eq!(occ == TargetRole::BlurVertical, path == CompositePath::Blended);
        }
    }

    #[test]
    fn paths_index_their_own_slot() {
        for (i, path) in CompositePath::ALL.iter().enumerate() {
            assert_eq!(path.index(), i);
        }
    }
}
