use bytemuck::{Pod, Zeroable};

use crate::paint::Color;

/// Number of hemisphere samples taken per pixel by the occlusion shader.
pub const SSAO_SAMPLE_COUNT: usize = 10;

/// Sample offsets reflected by the per-pixel noise vector.
pub const SSAO_SAMPLE_KERNEL: [[f32; 3]; SSAO_SAMPLE_COUNT] = [
    [-0.010735935, 0.01647018, 0.0062425877],
    [-0.06533369, 0.3647007, -0.13746321],
    [-0.6539235, -0.016726388, -0.53000957],
    [0.40958285, 0.0052428036, -0.5591124],
    [-0.1465366, 0.09899267, 0.15571679],
    [-0.44122112, -0.5458797, 0.04912532],
    [0.03755566, -0.10961345, -0.33040273],
    [0.019100213, 0.29652783, 0.066237666],
    [0.8765323, 0.011236004, 0.28265962],
    [0.29264435, -0.40794238, 0.15964167],
];

/// Tunables of the occlusion estimate.
///
/// `radius` is the sampling radius in texture space at unit normalized depth,
/// `falloff`..`strength` is the depth-difference window that counts as
/// occluding, `total_strength` scales the final darkening and
/// `noise_tiling` is how often the noise texture repeats across the screen.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SsaoConfig {
    pub radius: f32,
    pub falloff: f32,
    pub strength: f32,
    pub total_strength: f32,
    pub noise_tiling: f32,
}

impl Default for SsaoConfig {
    fn default() -> Self {
        Self {
            radius: 0.006,
            falloff: 0.000002,
            strength: 0.07,
            total_strength: 1.38,
            noise_tiling: 18.0,
        }
    }
}

impl SsaoConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        let finite = [
            self.radius,
            self.falloff,
            self.strength,
            self.total_strength,
            self.noise_tiling,
        ]
        .iter()
        .all(|v| v.is_finite());
        anyhow::ensure!(finite, "ssao parameters must be finite: {self:?}");
        anyhow::ensure!(
            self.radius > 0.0 && self.radius <= 1.0,
            "ssao radius {} outside (0, 1]",
            self.radius
        );
        anyhow::ensure!(
            self.strength > 0.0 && self.strength <= 1.0,
            "ssao strength {} outside (0, 1]",
            self.strength
        );
        anyhow::ensure!(
            self.falloff >= 0.0 && self.falloff < self.strength,
            "ssao falloff {} must lie in [0, strength)",
            self.falloff
        );
        anyhow::ensure!(
            (0.0..=10.0).contains(&self.total_strength),
            "ssao total strength {} outside [0, 10]",
            self.total_strength
        );
        anyhow::ensure!(
            self.noise_tiling > 0.0 && self.noise_tiling <= 256.0,
            "noise tiling {} outside (0, 256]",
            self.noise_tiling
        );
        Ok(())
    }

    pub(crate) fn to_uniform(self) -> SsaoUniform {
        let mut samples = [[0.0; 4]; SSAO_SAMPLE_COUNT];
        for (dst, src) in samples.iter_mut().zip(SSAO_SAMPLE_KERNEL) {
            *dst = [src[0], src[1], src[2], 0.0];
        }
        SsaoUniform {
            radius: self.radius,
            falloff: self.falloff,
            strength: self.strength,
            total_strength: self.total_strength,
            noise_tiling: self.noise_tiling,
            inv_samples: 1.0 / SSAO_SAMPLE_COUNT as f32,
            _pad: [0.0; 2],
            samples,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct SsaoUniform {
    pub radius: f32,
    pub falloff: f32,
    pub strength: f32,
    pub total_strength: f32,
    pub noise_tiling: f32,
    pub inv_samples: f32,
    pub _pad: [f32; 2],
    pub samples: [[f32; 4]; SSAO_SAMPLE_COUNT],
}

/// Construction-time settings of [`SsaoPipeline`](super::SsaoPipeline).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PipelineConfig {
    pub ssao: SsaoConfig,
    /// MSAA sample count of the full-resolution scene target (1 or 4).
    pub scene_samples: u32,
    /// Background of the scene colour target.
    pub clear_color: Color,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ssao: SsaoConfig::default(),
            scene_samples: 4,
            clear_color: Color::grey(0.5),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        self.ssao.validate()?;
        anyhow::ensure!(
            matches!(self.scene_samples, 1 | 4),
            "scene sample count {} unsupported (expected 1 or 4)",
            self.scene_samples
        );
        anyhow::ensure!(self.clear_color.is_finite(), "clear colour must be finite");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        PipelineConfig::default().validate().unwrap();
    }

    #[test]
    fn scene_clears_to_mid_grey() {
        assert_eq!(PipelineConfig::default().clear_color, Color::grey(0.5));
    }

    #[test]
    fn falloff_must_stay_below_strength() {
        let cfg = SsaoConfig {
            falloff: 0.07,
            ..SsaoConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_radius_is_rejected() {
        let cfg = SsaoConfig {
            radius: 0.0,
            ..SsaoConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn nan_is_rejected() {
        let cfg = SsaoConfig {
            total_strength: f32::NAN,
            ..SsaoConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn odd_sample_counts_are_rejected() {
        let cfg = PipelineConfig {
            scene_samples: 2,
            ..PipelineConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn uniform_layout_matches_wgsl_block() {
        // 8 scalars then 10 vec4 samples.
        assert_eq!(std::mem::size_of::<SsaoUniform>(), 32 + 16 * SSAO_SAMPLE_COUNT);
        let u = SsaoConfig::default().to_uniform();
        assert_eq!(u.samples[8][0], SSAO_SAMPLE_KERNEL[8][0]);
        assert_eq!(u.samples[3][3], 0.0);
    }
}
