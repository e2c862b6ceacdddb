//! The multi-pass occlusion pipeline.
//!
//! Per frame, in order: lit scene at full resolution, normal/depth at half
//! resolution, occlusion estimate, optional horizontal + vertical blur, and
//! one composite into the output view. Which composite runs (and whether the
//! blur runs at all) depends on [`RenderMode`].

use crate::camera::{Camera, Light};
use crate::coords::Extent;
use crate::scene::{object_layout, GpuScene, Scene};

use super::bindings::ProgramBindings;
use super::config::PipelineConfig;
use super::ctx::{RenderCtx, RenderTarget};
use super::noise::{NoiseImage, NoiseTexture};
use super::passes::blur::BlurPass;
use super::passes::common::FullscreenQuad;
use super::passes::composite::CompositePass;
use super::passes::geometry::{prepare_view, GeometryPass, FRUSTUM_COLOR};
use super::passes::normal_depth::NormalDepthPass;
use super::passes::scene_uniform::{SceneBinding, SceneUniform};
use super::passes::ssao::SsaoPass;
use super::passes::BlurAxis;
use super::programs::ProgramSet;
use super::readback::read_texture;
use super::schedule::{frame_schedule, PassKind, RenderMode};
use super::targets::{target_plan, OffscreenTarget, TargetPool, TargetRole};
use super::tracker::{Destination, PassTracker, TextureSource};

/// Per-frame inputs, borrowed for the duration of [`SsaoPipeline::render`].
#[derive(Debug, Copy, Clone)]
pub struct FrameInputs<'a> {
    pub camera: &'a Camera,
    pub light: &'a Light,
    /// Distance of the eye from the origin this frame.
    pub eye_distance: f32,
    /// Phong lighting on, or flat diffuse colour.
    pub lighting: bool,
    pub mode: RenderMode,
}

/// What a frame hands back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutput {
    /// The camera actually used: eye reprojected to `eye_distance`, aspect fitted to the output.
    pub camera: Camera,
    pub passes: Vec<PassKind>,
}

pub struct SsaoPipeline {
    config: PipelineConfig,
    programs: ProgramSet,
    pool: TargetPool,
    noise: NoiseTexture,
    scene: GpuScene,
    scene_binding: SceneBinding,
    quad: FullscreenQuad,
    geometry: GeometryPass,
    normal_depth: NormalDepthPass,
    ssao: SsaoPass,
    blur: BlurPass,
    composite: CompositePass,
    tracker: PassTracker,
}

impl SsaoPipeline {
    /// Validates configuration and bindings, compiles every program, allocates
    /// targets for `size` and uploads the scene and noise.
    ///
    /// Any failure here is fatal: nothing is partially built.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        output_format: wgpu::TextureFormat,
        size: Extent,
        scene: &Scene,
        noise: &NoiseImage,
        config: PipelineConfig,
    ) -> anyhow::Result<Self> {
        config.validate()?;
        let bindings = ProgramBindings::standard()?;
        let programs = ProgramSet::compile(device, &bindings)?;
        let pool = TargetPool::new(device, size, target_plan(config.scene_samples))?;
        let noise = NoiseTexture::upload(device, queue, noise);

        let object_bgl = object_layout(device);
        let gpu_scene = GpuScene::upload(device, scene, &object_bgl)?;
        let scene_binding = SceneBinding::new(device);
        let quad = FullscreenQuad::new(device);

        let geometry = GeometryPass::new(
            device,
            &programs.scene_lit,
            &scene_binding.layout,
            &object_bgl,
            pool.get(TargetRole::SceneColor),
            config.clear_color,
        );
        let normal_depth = NormalDepthPass::new(
            device,
            &programs.normal_depth,
            &scene_binding.layout,
            &object_bgl,
            pool.get(TargetRole::NormalDepth),
        );
        let ssao = SsaoPass::new(device, &programs.ssao, &bindings.ssao, config.ssao, &pool, &noise)?;
        let blur = BlurPass::new(device, &programs.blur, &bindings.blur, &pool)?;
        let composite = CompositePass::new(
            device,
            &programs.composite,
            &bindings.composite,
            &pool,
            output_format,
        )?;

        log::info!(
            "ssao pipeline ready: {}x{}, {} objects, {}x scene msaa",
            size.width,
            size.height,
            gpu_scene.object_count(),
            config.scene_samples
        );

        Ok(Self {
            config,
            programs,
            pool,
            noise,
            scene: gpu_scene,
            scene_binding,
            quad,
            geometry,
            normal_depth,
            ssao,
            blur,
            composite,
            tracker: PassTracker::new(),
        })
    }

    /// Reallocates every target for a new output size and rebinds the passes.
    pub fn resize(&mut self, device: &wgpu::Device, size: Extent) -> anyhow::Result<()> {
        if size == self.pool.window() {
            return Ok(());
        }
        self.pool.resize(device, size)?;
        self.ssao.rebind(device, &self.pool, &self.noise);
        self.blur.rebind(device, &self.pool);
        self.composite.rebind(device, &self.pool);
        Ok(())
    }

    /// Records one frame into `target.encoder`, ending with the composite into
    /// `target.color_view`.
    ///
    /// Resizes first if `ctx.size` differs from the current targets. The caller
    /// submits the encoder.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        inputs: &FrameInputs<'_>,
    ) -> anyhow::Result<FrameOutput> {
        self.resize(ctx.device, ctx.size)?;
        self.composite
            .ensure_format(ctx.device, &self.programs.composite, ctx.surface_format);

        let view = prepare_view(inputs.camera, inputs.light, inputs.eye_distance, ctx.size.aspect());
        let uniform = SceneUniform::new(
            &view.camera,
            inputs.light,
            view.light_view,
            inputs.lighting,
            FRUSTUM_COLOR,
        );
        self.scene_binding.write(ctx.queue, &uniform);

        self.tracker.begin_frame();
        for &pass in frame_schedule(inputs.mode) {
            self.run_pass(ctx.queue, target, pass, inputs.light);
        }
        let passes = self.tracker.end_frame().to_vec();
        debug_assert!(self.tracker.is_clean(), "frame ended with bindings outstanding");
        log::trace!(
            "frame ({}): {} passes, eye {:?}",
            inputs.mode.label(),
            passes.len(),
            view.camera.eye
        );

        Ok(FrameOutput {
            camera: view.camera,
            passes,
        })
    }

    fn run_pass(&mut self, queue: &wgpu::Queue, target: &mut RenderTarget<'_>, pass: PassKind, light: &Light) {
        let encoder = &mut *target.encoder;
        match pass {
            PassKind::Geometry => {
                self.tracker
                    .bind_target(pass, Destination::Target(TargetRole::SceneColor));
                self.geometry.record(
                    queue,
                    encoder,
                    self.pool.get(TargetRole::SceneColor),
                    &self.scene_binding,
                    &self.scene,
                    light,
                );
                self.tracker.unbind_target();
            }
            PassKind::NormalDepth => {
                self.tracker
                    .bind_target(pass, Destination::Target(TargetRole::NormalDepth));
                self.normal_depth.record(
                    encoder,
                    self.pool.get(TargetRole::NormalDepth),
                    &self.scene_binding,
                    &self.scene,
                );
                self.tracker.unbind_target();
            }
            PassKind::Ssao => {
                let (noise_unit, nd_unit) = self.ssao.units();
                self.tracker
                    .bind_target(pass, Destination::Target(TargetRole::Occlusion));
                self.tracker.bind_texture(noise_unit, TextureSource::Noise);
                self.tracker
                    .bind_texture(nd_unit, TextureSource::Target(TargetRole::NormalDepth));
                self.ssao
                    .record(encoder, self.pool.get(TargetRole::Occlusion), &self.quad);
                self.tracker.unbind_texture(nd_unit);
                self.tracker.unbind_texture(noise_unit);
                self.tracker.unbind_target();
            }
            PassKind::BlurHorizontal | PassKind::BlurVertical => {
                let (axis, dest) = match pass {
                    PassKind::BlurHorizontal => (BlurAxis::Horizontal, TargetRole::BlurHorizontal),
                    _ => (BlurAxis::Vertical, TargetRole::BlurVertical),
                };
                let unit = self.blur.unit();
                self.tracker.bind_target(pass, Destination::Target(dest));
                self.tracker
                    .bind_texture(unit, TextureSource::Target(self.blur.source(axis)));
                self.blur.record(encoder, axis, self.pool.get(dest), &self.quad);
                self.tracker.unbind_texture(unit);
                self.tracker.unbind_target();
            }
            PassKind::Composite(path) => {
                let (occlusion_unit, scene_unit) = self.composite.units();
                let (occlusion, scene) = path.sources();
                self.tracker.bind_target(pass, Destination::Output);
                self.tracker
                    .bind_texture(occlusion_unit, TextureSource::Target(occlusion));
                self.tracker
                    .bind_texture(scene_unit, TextureSource::Target(scene));
                self.composite
                    .record(encoder, path, target.color_view, &self.quad);
                self.tracker.unbind_texture(scene_unit);
                self.tracker.unbind_texture(occlusion_unit);
                self.tracker.unbind_target();
            }
        }
    }

    /// Size of the output the targets are currently allocated for.
    pub fn size(&self) -> Extent {
        self.pool.window()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn target(&self, role: TargetRole) -> &OffscreenTarget {
        self.pool.get(role)
    }

    pub fn targets(&self) -> &TargetPool {
        &self.pool
    }

    /// Downloads the single-sample contents of an offscreen target.
    ///
    /// Only meaningful after the encoder holding the frame has been submitted.
    pub fn read_target(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        role: TargetRole,
    ) -> anyhow::Result<Vec<u8>> {
        read_texture(device, queue, self.pool.get(role).sampled_texture())
    }
}
