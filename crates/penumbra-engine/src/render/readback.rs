//! Blocking texture downloads for tests and captures.

use anyhow::{anyhow, bail, ensure};
use futures_intrusive::channel::shared::oneshot_channel;

/// Bytes per texel of the formats the pipeline produces.
pub fn bytes_per_texel(format: wgpu::TextureFormat) -> anyhow::Result<u32> {
    Ok(match format {
        wgpu::TextureFormat::Rgba8Unorm
        | wgpu::TextureFormat::Rgba8UnormSrgb
        | wgpu::TextureFormat::Bgra8Unorm
        | wgpu::TextureFormat::Bgra8UnormSrgb => 4,
        wgpu::TextureFormat::Rgba16Float => 8,
        other => bail!("readback does not support {other:?}"),
    })
}

/// Row pitch rounded up to the copy alignment.
fn padded_row_bytes(tight: u32) -> u32 {
    tight.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT) * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT
}

/// Copies mip 0 of a single-sample texture into a tightly packed CPU buffer.
///
/// Submits its own command buffer and blocks until the copy has landed, so
/// everything submitted earlier on `queue` is visible in the result.
pub fn read_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
) -> anyhow::Result<Vec<u8>> {
    let (width, height) = (texture.width(), texture.height());
    ensure!(width > 0 && height > 0, "readback of an empty texture");
    ensure!(
        texture.sample_count() == 1,
        "readback needs a single-sample texture, got {} samples",
        texture.sample_count()
    );

    let tight = bytes_per_texel(texture.format())? * width;
    let padded = padded_row_bytes(tight);

    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("penumbra readback staging"),
        size: padded as u64 * height as u64,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("penumbra readback encoder"),
    });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &staging,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded),
                rows_per_image: Some(height),
            },
        },
        texture.size(),
    );
    queue.submit(std::iter::once(encoder.finish()));

    let slice = staging.slice(..);
    let (sender, receiver) = oneshot_channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = sender.send(result);
    });
    device
        .poll(wgpu::PollType::wait_indefinitely())
        .map_err(|e| anyhow!("device poll failed: {e}"))?;
    pollster::block_on(receiver.receive())
        .ok_or_else(|| anyhow!("readback callback dropped"))?
        .map_err(|e| anyhow!("readback mapping failed: {e}"))?;

    let mut out = Vec::with_capacity((tight * height) as usize);
    {
        let data = slice.get_mapped_range();
        for row in data.chunks_exact(padded as usize) {
            out.extend_from_slice(&row[..tight as usize]);
        }
    }
    staging.unmap();
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_pad_to_copy_alignment() {
        assert_eq!(padded_row_bytes(4), 256);
        assert_eq!(padded_row_bytes(256), 256);
        assert_eq!(padded_row_bytes(360 * 8), 3072);
    }

    #[test]
    fn unsupported_formats_are_refused() {
        assert!(bytes_per_texel(wgpu::TextureFormat::Depth32Float).is_err());
        assert_eq!(bytes_per_texel(wgpu::TextureFormat::Rgba16Float).unwrap(), 8);
    }
}
