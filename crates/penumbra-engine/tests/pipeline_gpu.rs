//! End-to-end pipeline checks on a real device.
//!
//! Every test skips (passes with a note on stderr) when no adapter is available.

use glam::{Mat4, Vec3};

use penumbra_engine::camera::{Camera, Light};
use penumbra_engine::coords::Extent;
use penumbra_engine::device::{GpuInit, HeadlessGpu};
use penumbra_engine::paint::Color;
use penumbra_engine::render::passes::{blur_reference, BlurAxis};
use penumbra_engine::render::{
    frame_schedule, read_texture, FrameInputs, FrameOutput, NoiseImage, PipelineConfig, RenderCtx,
    RenderMode, RenderTarget, ResolutionTier, SsaoPipeline, TargetRole,
};
use penumbra_engine::scene::{primitives, Material, Scene};

const OUTPUT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

fn gpu() -> Option<HeadlessGpu> {
    match pollster::block_on(HeadlessGpu::new(GpuInit::default())) {
        Ok(gpu) => Some(gpu),
        Err(err) => {
            eprintln!("skipping: no GPU adapter ({err:#})");
            None
        }
    }
}

fn test_scene() -> Scene {
    let mut scene = Scene::new();
    let board = scene.add_mesh(primitives::cuboid([10.0, 0.1, 10.0]));
    let cube = scene.add_mesh(primitives::cuboid([1.0, 1.0, 1.0]));
    let sphere = scene.add_mesh(primitives::uv_sphere(0.8, 24));
    scene.add_object(
        board,
        Material::matte(Color::rgb(0.2, 0.8, 0.3), 0.3),
        Mat4::from_translation(Vec3::new(0.0, -1.35, 0.0)),
    );
    scene.add_object(
        cube,
        Material::matte(Color::rgb(0.2, 0.4, 0.9), 0.3),
        Mat4::from_translation(Vec3::new(0.4, -0.3, 0.5)) * Mat4::from_scale(Vec3::splat(2.0)),
    );
    scene.add_object(
        sphere,
        Material::matte(Color::rgb(1.0, 0.6, 0.1), 0.3).with_specular(Color::WHITE, 35.0),
        Mat4::from_translation(Vec3::new(0.1, -0.56, -1.25)),
    );
    scene
}

struct Harness {
    gpu: HeadlessGpu,
    pipeline: SsaoPipeline,
    output: wgpu::Texture,
    view: wgpu::TextureView,
    size: Extent,
    camera: Camera,
    light: Light,
}

impl Harness {
    fn new(gpu: HeadlessGpu, size: Extent) -> Self {
        let pipeline = SsaoPipeline::new(
            gpu.device(),
            gpu.queue(),
            OUTPUT_FORMAT,
            size,
            &test_scene(),
            &NoiseImage::generate(64, 1),
            PipelineConfig::default(),
        )
        .expect("pipeline construction");
        let (output, view) = output_texture(gpu.device(), size);
        Self {
            gpu,
            pipeline,
            output,
            view,
            size,
            camera: Camera::look_at(Vec3::new(3.0, 2.0, -8.0), Vec3::ZERO, Vec3::Y),
            light: Light::directional(Vec3::new(0.0, 4.0, 0.0), Vec3::ZERO),
        }
    }

    fn set_size(&mut self, size: Extent) {
        let (output, view) = output_texture(self.gpu.device(), size);
        self.output = output;
        self.view = view;
        self.size = size;
    }

    fn render(&mut self, mode: RenderMode) -> FrameOutput {
        let device = self.gpu.device();
        let queue = self.gpu.queue();
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("test frame"),
        });
        let ctx = RenderCtx::new(device, queue, OUTPUT_FORMAT, self.size);
        let out = {
            let mut target = RenderTarget::new(&mut encoder, &self.view);
            let inputs = FrameInputs {
                camera: &self.camera,
                light: &self.light,
                eye_distance: 10.0,
                lighting: true,
                mode,
            };
            self.pipeline
                .render(&ctx, &mut target, &inputs)
                .expect("frame")
        };
        queue.submit(std::iter::once(encoder.finish()));
        out
    }

    fn output_bytes(&self) -> Vec<u8> {
        read_texture(self.gpu.device(), self.gpu.queue(), &self.output).expect("output readback")
    }

    fn target_bytes(&self, role: TargetRole) -> Vec<u8> {
        self.pipeline
            .read_target(self.gpu.device(), self.gpu.queue(), role)
            .expect("target readback")
    }
}

fn output_texture(device: &wgpu::Device, size: Extent) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("test output"),
        size: size.to_wgpu(),
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: OUTPUT_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

/// IEEE half to single precision.
fn f16_to_f32(bits: u16) -> f32 {
    let sign = if bits & 0x8000 != 0 { -1.0 } else { 1.0 };
    let exp = ((bits >> 10) & 0x1f) as i32;
    let frac = (bits & 0x3ff) as f32;
    match exp {
        0 => sign * frac * 2f32.powi(-24),
        31 if frac == 0.0 => sign * f32::INFINITY,
        31 => f32::NAN,
        _ => sign * (1.0 + frac / 1024.0) * 2f32.powi(exp - 15),
    }
}

/// Red channel of an `Rgba16Float` readback.
fn red_channel(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(8)
        .map(|px| f16_to_f32(u16::from_le_bytes([px[0], px[1]])))
        .collect()
}

#[test]
fn half_float_decoder_handles_common_values() {
    assert_eq!(f16_to_f32(0x3c00), 1.0);
    assert_eq!(f16_to_f32(0x3800), 0.5);
    assert_eq!(f16_to_f32(0x0000), 0.0);
    assert_eq!(f16_to_f32(0xc000), -2.0);
}

#[test]
fn standard_view_is_an_exact_copy_of_the_scene() {
    let Some(gpu) = gpu() else { return };
    let mut h = Harness::new(gpu, Extent::new(96, 64));
    h.render(RenderMode::StandardView);
    assert_eq!(h.output_bytes(), h.target_bytes(TargetRole::SceneColor));
}

#[test]
fn repeated_frames_are_identical() {
    let Some(gpu) = gpu() else { return };
    let mut h = Harness::new(gpu, Extent::new(96, 64));
    for mode in [RenderMode::FinalComposite, RenderMode::NormalMapView] {
        let a_out = h.render(mode);
        let a = h.output_bytes();
        let b_out = h.render(mode);
        let b = h.output_bytes();
        assert_eq!(a, b, "{mode:?}");
        assert_eq!(a_out, b_out);
    }
}

#[test]
fn each_mode_runs_its_schedule() {
    let Some(gpu) = gpu() else { return };
    let mut h = Harness::new(gpu, Extent::new(64, 48));
    for mode in RenderMode::ALL {
        let out = h.render(mode);
        assert_eq!(out.passes, frame_schedule(mode), "{mode:?}");
        assert!((out.camera.eye.length() - 10.0).abs() < 1e-4);
    }
}

#[test]
fn blur_matches_cpu_reference() {
    let Some(gpu) = gpu() else { return };
    let size = Extent::new(80, 60);
    let mut h = Harness::new(gpu, size);
    h.render(RenderMode::FinalComposite);

    let half = ResolutionTier::Half.extent(size);
    let (w, ht) = (half.width as usize, half.height as usize);
    let occlusion = red_channel(&h.target_bytes(TargetRole::Occlusion));
    let horizontal = red_channel(&h.target_bytes(TargetRole::BlurHorizontal));
    let vertical = red_channel(&h.target_bytes(TargetRole::BlurVertical));

    // Each pass is checked against its own (half-float) input.
    let expected_h = blur_reference(&occlusion, w, ht, BlurAxis::Horizontal);
    let expected_v = blur_reference(&horizontal, w, ht, BlurAxis::Vertical);
    for (i, (got, want)) in horizontal.iter().zip(&expected_h).enumerate() {
        assert!((got - want).abs() < 2e-3, "blur_h texel {i}: {got} vs {want}");
    }
    for (i, (got, want)) in vertical.iter().zip(&expected_v).enumerate() {
        assert!((got - want).abs() < 2e-3, "blur_v texel {i}: {got} vs {want}");
    }
}

#[test]
fn occlusion_stays_in_unit_range() {
    let Some(gpu) = gpu() else { return };
    let mut h = Harness::new(gpu, Extent::new(80, 60));
    h.render(RenderMode::SsaoView);
    let ao = red_channel(&h.target_bytes(TargetRole::Occlusion));
    assert!(ao.iter().all(|v| (0.0..=1.0).contains(v)));
}

#[test]
fn resize_reallocates_every_target() {
    let Some(gpu) = gpu() else { return };
    let mut h = Harness::new(gpu, Extent::new(64, 48));
    h.render(RenderMode::FinalComposite);
    let before = h.pipeline.targets().serials();

    let size = Extent::new(101, 61);
    h.set_size(size);
    h.render(RenderMode::FinalComposite);

    assert_eq!(h.pipeline.size(), size);
    assert_eq!(h.pipeline.targets().live_count(), TargetRole::ALL.len());
    let after = h.pipeline.targets().serials();
    assert!(before.iter().all(|s| !after.contains(s)), "{before:?} / {after:?}");

    assert_eq!(h.pipeline.target(TargetRole::SceneColor).extent(), size);
    for role in [
        TargetRole::NormalDepth,
        TargetRole::Occlusion,
        TargetRole::BlurHorizontal,
        TargetRole::BlurVertical,
    ] {
        assert_eq!(h.pipeline.target(role).extent(), Extent::new(50, 30), "{role:?}");
    }
}

#[test]
fn resize_to_same_size_keeps_targets() {
    let Some(gpu) = gpu() else { return };
    let mut h = Harness::new(gpu, Extent::new(64, 48));
    let before = h.pipeline.targets().serials();
    h.pipeline
        .resize(h.gpu.device(), Extent::new(64, 48))
        .unwrap();
    assert_eq!(before, h.pipeline.targets().serials());
}

#[test]
fn degenerate_window_is_rejected() {
    let Some(gpu) = gpu() else { return };
    let result = SsaoPipeline::new(
        gpu.device(),
        gpu.queue(),
        OUTPUT_FORMAT,
        Extent::new(1, 1),
        &test_scene(),
        &NoiseImage::generate(8, 1),
        PipelineConfig::default(),
    );
    assert!(result.is_err());
}

#[test]
fn invalid_config_is_rejected_before_allocation() {
    let Some(gpu) = gpu() else { return };
    let config = PipelineConfig {
        scene_samples: 3,
        ..PipelineConfig::default()
    };
    let result = SsaoPipeline::new(
        gpu.device(),
        gpu.queue(),
        OUTPUT_FORMAT,
        Extent::new(64, 48),
        &test_scene(),
        &NoiseImage::generate(8, 1),
        config,
    );
    assert!(result.is_err());
}
