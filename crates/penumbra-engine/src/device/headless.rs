use anyhow::Result;

use super::{adapter, GpuInit};

/// Surface-less GPU context for offscreen rendering and tests.
///
/// Shares adapter/device selection with [`Gpu`](super::Gpu) but never touches a
/// window. Output goes to textures owned by the caller.
pub struct HeadlessGpu {
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl HeadlessGpu {
    pub async fn new(init: GpuInit) -> Result<Self> {
        let instance = adapter::create_instance();
        let adapter = adapter::request_adapter(&instance, None).await?;
        let (device, queue) = adapter::request_device(&adapter, &init).await?;

        Ok(Self {
            adapter,
            device,
            queue,
        })
    }

    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }
}
