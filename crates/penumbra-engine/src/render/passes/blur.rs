//! Separable 9-tap binomial blur of the occlusion buffer.

use bytemuck::{Pod, Zeroable};

use crate::paint::Color;
use crate::render::bindings::{BindingTable, TextureRole, PARAMS_BINDING};
use crate::render::programs::ShaderProgram;
use crate::render::targets::{OffscreenTarget, TargetPool, TargetRole};

use super::common::{begin_pass, fullscreen_layout, fullscreen_pipeline, uniform_buffer, Extras, FullscreenQuad};

/// Taps on each side of the centre texel.
pub const BLUR_RADIUS: usize = 4;

/// Row 8 of Pascal's triangle over 256; sums to exactly one.
pub const BLUR_WEIGHTS: [f32; 2 * BLUR_RADIUS + 1] = [
    1.0 / 256.0,
    8.0 / 256.0,
    28.0 / 256.0,
    56.0 / 256.0,
    70.0 / 256.0,
    56.0 / 256.0,
    28.0 / 256.0,
    8.0 / 256.0,
    1.0 / 256.0,
];

/// Axis a blur pass runs along.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BlurAxis {
    Horizontal,
    Vertical,
}

impl BlurAxis {
    fn step(self) -> (i64, i64) {
        match self {
            BlurAxis::Horizontal => (1, 0),
            BlurAxis::Vertical => (0, 1),
        }
    }
}

/// CPU version of one blur axis over a single-channel `width x height` image.
///
/// Coordinates clamp to the edge exactly like the shader's texel loads.
pub fn blur_reference(src: &[f32], width: usize, height: usize, axis: BlurAxis) -> Vec<f32> {
    assert_eq!(src.len(), width * height);
    let (dx, dy) = axis.step();
    let mut out = vec![0.0; src.len()];
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0;
            for (k, w) in BLUR_WEIGHTS.iter().enumerate() {
                let o = k as i64 - BLUR_RADIUS as i64;
                let sx = (x as i64 + dx * o).clamp(0, width as i64 - 1) as usize;
                let sy = (y as i64 + dy * o).clamp(0, height as i64 - 1) as usize;
                acc += src[sy * width + sx] * w;
            }
            out[y * width + x] = acc;
        }
    }
    out
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct BlurUniform {
    direction: [f32; 4],
    weights: [[f32; 4]; 3],
}

impl BlurUniform {
    fn new(axis: BlurAxis) -> Self {
        let (dx, dy) = axis.step();
        let mut weights = [[0.0; 4]; 3];
        for (i, w) in BLUR_WEIGHTS.iter().enumerate() {
            weights[i / 4][i % 4] = *w;
        }
        Self {
            direction: [dx as f32, dy as f32, 0.0, 0.0],
            weights,
        }
    }
}

struct AxisBinding {
    source: TargetRole,
    params: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Horizontal then vertical blur; both axes share one pipeline.
pub(crate) struct BlurPass {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    unit: u32,
    horizontal: AxisBinding,
    vertical: AxisBinding,
}

impl BlurPass {
    pub fn new(
        device: &wgpu::Device,
        program: &ShaderProgram,
        table: &BindingTable,
        pool: &TargetPool,
    ) -> anyhow::Result<Self> {
        let unit = table.require(TextureRole::Occlusion)?;
        let layout = fullscreen_layout(
            device,
            "penumbra blur bgl",
            table,
            Extras {
                params_size: Some(std::mem::size_of::<BlurUniform>() as u64),
                ..Extras::default()
            },
        );
        let pipeline = fullscreen_pipeline(
            device,
            "penumbra blur pipeline",
            program.module(),
            "fs_main",
            &layout,
            pool.get(TargetRole::BlurHorizontal).spec().format,
        );

        let axis_binding = |axis: BlurAxis, source: TargetRole| {
            let params = uniform_buffer(device, "penumbra blur params", &BlurUniform::new(axis));
            let bind_group = Self::make_bind_group(device, &layout, unit, &params, pool.get(source).sampled_view(), source);
            AxisBinding {
                source,
                params,
                bind_group,
            }
        };
        let horizontal = axis_binding(BlurAxis::Horizontal, TargetRole::Occlusion);
        let vertical = axis_binding(BlurAxis::Vertical, TargetRole::BlurHorizontal);

        Ok(Self {
            pipeline,
            layout,
            unit,
            horizontal,
            vertical,
        })
    }

    fn make_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        unit: u32,
        params: &wgpu::Buffer,
        source: &wgpu::TextureView,
        role: TargetRole,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("blur source: {}", role.label())),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: unit,
                    resource: wgpu::BindingResource::TextureView(source),
                },
                wgpu::BindGroupEntry {
                    binding: PARAMS_BINDING,
                    resource: params.as_entire_binding(),
                },
            ],
        })
    }

    pub fn rebind(&mut self, device: &wgpu::Device, pool: &TargetPool) {
        for axis in [&mut self.horizontal, &mut self.vertical] {
            axis.bind_group = Self::make_bind_group(
                device,
                &self.layout,
                self.unit,
                &axis.params,
                pool.get(axis.source).sampled_view(),
                axis.source,
            );
        }
    }

    pub fn unit(&self) -> u32 {
        self.unit
    }

    /// Target the given axis reads.
    pub fn source(&self, axis: BlurAxis) -> TargetRole {
        match axis {
            BlurAxis::Horizontal => self.horizontal.source,
            BlurAxis::Vertical => self.vertical.source,
        }
    }

    pub fn record(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        axis: BlurAxis,
        target: &OffscreenTarget,
        quad: &FullscreenQuad,
    ) {
        let binding = match axis {
            BlurAxis::Horizontal => &self.horizontal,
            BlurAxis::Vertical => &self.vertical,
        };
        let label = match axis {
            BlurAxis::Horizontal => "penumbra blur_h pass",
            BlurAxis::Vertical => "penumbra blur_v pass",
        };
        let mut rpass = begin_pass(encoder, label, target.color_attachment(Color::WHITE), None);
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &binding.bind_group, &[]);
        quad.draw(&mut rpass);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_sum_to_one_and_are_symmetric() {
        let sum: f32 = BLUR_WEIGHTS.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        for i in 0..BLUR_RADIUS {
            assert_eq!(BLUR_WEIGHTS[i], BLUR_WEIGHTS[BLUR_WEIGHTS.len() - 1 - i]);
        }
    }

    #[test]
    fn constant_image_is_unchanged() {
        let src = vec![0.25; 7 * 5];
        for axis in [BlurAxis::Horizontal, BlurAxis::Vertical] {
            let out = blur_reference(&src, 7, 5, axis);
            assert!(out.iter().all(|v| (v - 0.25).abs() < 1e-6));
        }
    }

    #[test]
    fn impulse_spreads_as_separable_kernel() {
        let (w, h) = (16, 16);
        let mut src = vec![0.0; w * h];
        src[8 * w + 8] = 1.0;
        let out = blur_reference(&blur_reference(&src, w, h, BlurAxis::Horizontal), w, h, BlurAxis::Vertical);
        for dy in -4i32..=4 {
            for dx in -4i32..=4 {
                let expected = BLUR_WEIGHTS[(dx + 4) as usize] * BLUR_WEIGHTS[(dy + 4) as usize];
                let got = out[(8 + dy) as usize * w + (8 + dx) as usize];
                assert!((got - expected).abs() < 1e-7, "({dx},{dy}) {got} vs {expected}");
            }
        }
        assert_eq!(out[0], 0.0);
    }

    #[test]
    fn edges_clamp_instead_of_darkening() {
        let mut src = vec![1.0; 9];
        src[0] = 0.0;
        let out = blur_reference(&src, 9, 1, BlurAxis::Horizontal);
        // Left edge repeats texel 0 five times in the footprint.
        let expected: f32 = BLUR_WEIGHTS[5..].iter().sum();
        assert!((out[0] - expected).abs() < 1e-6);
    }

    #[test]
    fn uniform_packs_all_nine_taps() {
        let u = BlurUniform::new(BlurAxis::Vertical);
        assert_eq!(u.direction[..2], [0.0, 1.0]);
        assert_eq!(u.weights[1][0], BLUR_WEIGHTS[4]);
        assert_eq!(u.weights[2][0], BLUR_WEIGHTS[8]);
        assert_eq!(u.weights[2][3], 0.0);
    }
}
