//! Random-normal texture tiled across the screen by the occlusion pass.

use std::path::Path;

use anyhow::Context;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// RGBA8 image whose rgb encodes a random direction as `v * 0.5 + 0.5`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoiseImage {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl NoiseImage {
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> anyhow::Result<Self> {
        anyhow::ensure!(width > 0 && height > 0, "noise image is empty");
        anyhow::ensure!(
            rgba.len() == (width as usize) * (height as usize) * 4,
            "noise image is {}x{} but holds {} bytes",
            width,
            height,
            rgba.len()
        );
        Ok(Self { width, height, rgba })
    }

    /// Decodes an image file (any colour type) into RGBA8.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let img = image::open(path)
            .with_context(|| format!("loading noise texture {}", path.display()))?
            .to_rgba8();
        let (w, h) = img.dimensions();
        Self::from_rgba(w, h, img.into_raw())
    }

    /// Deterministic noise: one random unit vector per texel, seeded by `seed`.
    pub fn generate(size: u32, seed: u64) -> Self {
        let size = size.max(1);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut next = move || rng.gen_range(-1.0f32..=1.0);

        let mut rgba = Vec::with_capacity((size * size * 4) as usize);
        for _ in 0..size * size {
            let v = loop {
                let v = glam::Vec3::new(next(), next(), next());
                let len2 = v.length_squared();
                if len2 > 1e-4 && len2 <= 1.0 {
                    break v / len2.sqrt();
                }
            };
            for c in v.to_array() {
                rgba.push(((c * 0.5 + 0.5) * 255.0).round() as u8);
            }
            rgba.push(255);
        }
        Self {
            width: size,
            height: size,
            rgba,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }
}

/// GPU copy of a [`NoiseImage`], sampled with a repeating sampler.
pub struct NoiseTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl NoiseTexture {
    pub fn upload(device: &wgpu::Device, queue: &wgpu::Queue, image: &NoiseImage) -> Self {
        let size = wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("penumbra noise texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(image.width * 4),
                rows_per_image: Some(image.height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }
}
