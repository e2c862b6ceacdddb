//! Offscreen render targets and the pool that owns them.
//!
//! Every intermediate image of the frame lives in a [`TargetPool`], keyed by
//! [`TargetRole`]. A resize rebuilds the whole set; nothing else allocates
//! or frees targets.

use crate::coords::Extent;
use crate::paint::Color;

/// Format of every colour target (scene, normal/depth, occlusion, blur).
pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
/// Format of the depth buffers attached to the geometry passes.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Sample counts accepted for colour targets.
pub const SUPPORTED_SAMPLE_COUNTS: [u32; 2] = [1, 4];

/// Resolution class of a target relative to the output window.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ResolutionTier {
    Full,
    /// `floor(w / 2) x floor(h / 2)`.
    Half,
}

impl ResolutionTier {
    pub fn extent(self, window: Extent) -> Extent {
        match self {
            ResolutionTier::Full => window,
            ResolutionTier::Half => window.halved(),
        }
    }
}

/// Which intermediate image a target holds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TargetRole {
    SceneColor,
    NormalDepth,
    Occlusion,
    BlurHorizontal,
    BlurVertical,
}

impl TargetRole {
    pub const ALL: [TargetRole; 5] = [
        TargetRole::SceneColor,
        TargetRole::NormalDepth,
        TargetRole::Occlusion,
        TargetRole::BlurHorizontal,
        TargetRole::BlurVertical,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TargetRole::SceneColor => "scene_color",
            TargetRole::NormalDepth => "normal_depth",
            TargetRole::Occlusion => "ssao",
            TargetRole::BlurHorizontal => "blur_h",
            TargetRole::BlurVertical => "blur_v",
        }
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// Allocation request for one target.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TargetSpec {
    pub tier: ResolutionTier,
    pub format: wgpu::TextureFormat,
    pub sample_count: u32,
    /// Attach a [`DEPTH_FORMAT`] buffer with the same size and sample count.
    pub depth: bool,
}

/// Fixed layout of the frame's targets for a given scene sample count.
///
/// Only the scene colour target is full resolution (and possibly multisampled);
/// everything feeding the occlusion estimate runs at half resolution.
pub fn target_plan(scene_samples: u32) -> [(TargetRole, TargetSpec); 5] {
    let half = |depth| TargetSpec {
        tier: ResolutionTier::Half,
        format: COLOR_FORMAT,
        sample_count: 1,
        depth,
    };
    [
        (
            TargetRole::SceneColor,
            TargetSpec {
                tier: ResolutionTier::Full,
                format: COLOR_FORMAT,
                sample_count: scene_samples,
                depth: true,
            },
        ),
        (TargetRole::NormalDepth, half(true)),
        (TargetRole::Occlusion, half(false)),
        (TargetRole::BlurHorizontal, half(false)),
        (TargetRole::BlurVertical, half(false)),
    ]
}

/// Rejects specs the device cannot allocate, before any GPU call is made.
pub fn validate_target(spec: &TargetSpec, extent: Extent, max_dimension: u32) -> anyhow::Result<()> {
    anyhow::ensure!(
        !extent.is_empty(),
        "target extent {}x{} is empty",
        extent.width,
        extent.height
    );
    anyhow::ensure!(
        extent.width <= max_dimension && extent.height <= max_dimension,
        "target extent {}x{} exceeds device limit {max_dimension}",
        extent.width,
        extent.height
    );
    anyhow::ensure!(
        SUPPORTED_SAMPLE_COUNTS.contains(&spec.sample_count),
        "sample count {} unsupported",
        spec.sample_count
    );
    anyhow::ensure!(
        !spec.format.is_depth_stencil_format(),
        "colour target cannot use depth format {:?}",
        spec.format
    );
    Ok(())
}

struct TextureSlot {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl TextureSlot {
    fn new(
        device: &wgpu::Device,
        label: &str,
        extent: Extent,
        format: wgpu::TextureFormat,
        sample_count: u32,
        usage: wgpu::TextureUsages,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: extent.to_wgpu(),
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

/// One allocated target: colour attachment, optional resolve and depth buffers.
pub struct OffscreenTarget {
    serial: u64,
    spec: TargetSpec,
    extent: Extent,
    color: TextureSlot,
    /// Single-sample copy of `color` when the target is multisampled.
    resolve: Option<TextureSlot>,
    depth: Option<TextureSlot>,
}

impl OffscreenTarget {
    fn create(device: &wgpu::Device, label: &str, spec: TargetSpec, extent: Extent, serial: u64) -> Self {
        let sampled = wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_SRC;
        let multisampled = spec.sample_count > 1;

        let color_usage = if multisampled {
            wgpu::TextureUsages::RENDER_ATTACHMENT
        } else {
            wgpu::TextureUsages::RENDER_ATTACHMENT | sampled
        };
        let color = TextureSlot::new(
            device,
            &format!("penumbra {label} color"),
            extent,
            spec.format,
            spec.sample_count,
            color_usage,
        );
        let resolve = multisampled.then(|| {
            TextureSlot::new(
                device,
                &format!("penumbra {label} resolve"),
                extent,
                spec.format,
                1,
                wgpu::TextureUsages::RENDER_ATTACHMENT | sampled,
            )
        });
        let depth = spec.depth.then(|| {
            TextureSlot::new(
                device,
                &format!("penumbra {label} depth"),
                extent,
                DEPTH_FORMAT,
                spec.sample_count,
                wgpu::TextureUsages::RENDER_ATTACHMENT,
            )
        });

        Self {
            serial,
            spec,
            extent,
            color,
            resolve,
            depth,
        }
    }

    /// Colour attachment that clears to `clear` and resolves when multisampled.
    pub fn color_attachment(&self, clear: Color) -> wgpu::RenderPassColorAttachment<'_> {
        wgpu::RenderPassColorAttachment {
            view: &self.color.view,
            resolve_target: self.resolve.as_ref().map(|r| &r.view),
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(clear.to_wgpu()),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        }
    }

    /// Depth attachment cleared to the far plane, if this target has one.
    pub fn depth_attachment(&self) -> Option<wgpu::RenderPassDepthStencilAttachment<'_>> {
        self.depth
            .as_ref()
            .map(|d| wgpu::RenderPassDepthStencilAttachment {
                view: &d.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            })
    }

    /// Single-sample texture later passes read from.
    pub fn sampled_texture(&self) -> &wgpu::Texture {
        &self.resolve.as_ref().unwrap_or(&self.color).texture
    }

    pub fn sampled_view(&self) -> &wgpu::TextureView {
        &self.resolve.as_ref().unwrap_or(&self.color).view
    }

    /// Unique per allocation; changes every time the pool rebuilds the target.
    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub fn spec(&self) -> TargetSpec {
        self.spec
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    fn destroy(&self) {
        self.color.texture.destroy();
        if let Some(r) = &self.resolve {
            r.texture.destroy();
        }
        if let Some(d) = &self.depth {
            d.texture.destroy();
        }
    }
}

/// Owner of every offscreen target, sized from the output window.
pub struct TargetPool {
    window: Extent,
    plan: [(TargetRole, TargetSpec); 5],
    targets: Vec<OffscreenTarget>,
    next_serial: u64,
}

impl TargetPool {
    /// Allocates every role of `plan` for a `window`-sized output.
    pub fn new(
        device: &wgpu::Device,
        window: Extent,
        plan: [(TargetRole, TargetSpec); 5],
    ) -> anyhow::Result<Self> {
        let mut pool = Self {
            window,
            plan,
            targets: Vec::new(),
            next_serial: 1,
        };
        pool.targets = pool.allocate_all(device, window)?;
        Ok(pool)
    }

    /// Allocates a standalone target with a fresh serial.
    pub fn create_target(
        &mut self,
        device: &wgpu::Device,
        label: &str,
        spec: TargetSpec,
        window: Extent,
    ) -> anyhow::Result<OffscreenTarget> {
        let extent = spec.tier.extent(window);
        validate_target(&spec, extent, device.limits().max_texture_dimension_2d)
            .map_err(|e| e.context(format!("creating target `{label}`")))?;

        let serial = self.next_serial;
        self.next_serial += 1;
        log::debug!(
            "target `{label}` #{serial}: {}x{} {:?} x{}",
            extent.width,
            extent.height,
            spec.format,
            spec.sample_count
        );
        Ok(OffscreenTarget::create(device, label, spec, extent, serial))
    }

    /// Rebuilds every target for a new window size.
    ///
    /// All replacements are created before the old set is released, so on error
    /// the pool keeps its previous (still consistent) targets.
    pub fn resize(&mut self, device: &wgpu::Device, window: Extent) -> anyhow::Result<()> {
        let fresh = self.allocate_all(device, window)?;
        let stale = std::mem::replace(&mut self.targets, fresh);
        for target in &stale {
            target.destroy();
        }
        self.window = window;
        log::info!("render targets resized to {}x{}", window.width, window.height);
        Ok(())
    }

    fn allocate_all(&mut self, device: &wgpu::Device, window: Extent) -> anyhow::Result<Vec<OffscreenTarget>> {
        let plan = self.plan;
        let mut out = Vec::with_capacity(plan.len());
        for (i, role) in TargetRole::ALL.into_iter().enumerate() {
            let (planned_role, spec) = plan[i];
            debug_assert_eq!(planned_role, role);
            out.push(self.create_target(device, role.label(), spec, window)?);
        }
        Ok(out)
    }

    pub fn get(&self, role: TargetRole) -> &OffscreenTarget {
        &self.targets[role.index()]
    }

    pub fn window(&self) -> Extent {
        self.window
    }

    /// Number of live targets. Stays at [`TargetRole::ALL`]`.len()` across resizes.
    pub fn live_count(&self) -> usize {
        self.targets.len()
    }

    pub fn serials(&self) -> Vec<u64> {
        self.targets.iter().map(OffscreenTarget::serial).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_tier_floors_each_axis() {
        let w = Extent::new(721, 487);
        assert_eq!(ResolutionTier::Half.extent(w), Extent::new(360, 243));
        assert_eq!(ResolutionTier::Full.extent(w), w);
    }

    #[test]
    fn plan_keeps_only_scene_at_full_resolution() {
        let plan = target_plan(4);
        for (i, (role, spec)) in plan.iter().enumerate() {
            assert_eq!(*role, TargetRole::ALL[i]);
            match role {
                TargetRole::SceneColor => {
                    assert_eq!(spec.tier, ResolutionTier::Full);
                    assert_eq!(spec.sample_count, 4);
                }
                _ => {
                    assert_eq!(spec.tier, ResolutionTier::Half);
                    assert_eq!(spec.sample_count, 1);
                }
            }
        }
        assert!(plan[1].1.depth, "normal/depth pass needs its own depth buffer");
        assert!(!plan[2].1.depth);
    }

    #[test]
    fn empty_extent_is_rejected() {
        let spec = target_plan(1)[2].1;
        let half = spec.tier.extent(Extent::new(1, 400));
        assert!(validate_target(&spec, half, 8192).is_err());
    }

    #[test]
    fn oversized_extent_is_rejected() {
        let spec = target_plan(1)[0].1;
        assert!(validate_target(&spec, Extent::new(9000, 10), 8192).is_err());
        assert!(validate_target(&spec, Extent::new(8192, 10), 8192).is_ok());
    }

    #[test]
    fn unsupported_sample_count_is_rejected() {
        let spec = TargetSpec {
            sample_count: 8,
            ..target_plan(4)[0].1
        };
        assert!(validate_target(&spec, Extent::new(64, 64), 8192).is_err());
    }

    #[test]
    fn role_labels_are_distinct() {
        let mut labels: Vec<_> = TargetRole::ALL.iter().map(|r| r.label()).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), TargetRole::ALL.len());
    }
}
