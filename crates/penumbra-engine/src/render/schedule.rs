/// What the final composite shows.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum RenderMode {
    /// Lit scene without occlusion.
    StandardView,
    /// Raw occlusion buffer as greyscale.
    SsaoView,
    /// Raw normal/depth buffer.
    NormalMapView,
    /// Scene darkened by the blurred occlusion.
    #[default]
    FinalComposite,
}

impl RenderMode {
    pub const ALL: [RenderMode; 4] = [
        RenderMode::StandardView,
        RenderMode::SsaoView,
        RenderMode::NormalMapView,
        RenderMode::FinalComposite,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RenderMode::StandardView => "standard",
            RenderMode::SsaoView => "ssao",
            RenderMode::NormalMapView => "normal map",
            RenderMode::FinalComposite => "final composite",
        }
    }
}

/// Source arrangement of the composite pass.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CompositePath {
    Scene,
    Occlusion,
    NormalDepth,
    Blended,
}

/// One step of the frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PassKind {
    Geometry,
    NormalDepth,
    Ssao,
    BlurHorizontal,
    BlurVertical,
    Composite(CompositePath),
}

impl PassKind {
    pub fn label(self) -> &'static str {
        match self {
            PassKind::Geometry => "geometry",
            PassKind::NormalDepth => "normal_depth",
            PassKind::Ssao => "ssao",
            PassKind::BlurHorizontal => "blur_h",
            PassKind::BlurVertical => "blur_v",
            PassKind::Composite(_) => "composite",
        }
    }
}

/// Passes executed for `mode`, in order.
///
/// Geometry, normal/depth and occlusion run every frame regardless of mode;
/// only the tail differs. The blur pair only runs when its result is shown.
pub const fn frame_schedule(mode: RenderMode) -> &'static [PassKind] {
    match mode {
        RenderMode::StandardView => &[
            PassKind::Geometry,
            PassKind::NormalDepth,
            PassKind::Ssao,
            PassKind::Composite(CompositePath::Scene),
        ],
        RenderMode::SsaoView => &[
            PassKind::Geometry,
            PassKind::NormalDepth,
            PassKind::Ssao,
            PassKind::Composite(CompositePath::Occlusion),
        ],
        RenderMode::NormalMapView => &[
            PassKind::Geometry,
            PassKind::NormalDepth,
            PassKind::Ssao,
            PassKind::Composite(CompositePath::NormalDepth),
        ],
        RenderMode::FinalComposite => &[
            PassKind::Geometry,
            PassKind::NormalDepth,
            PassKind::Ssao,
            PassKind::BlurHorizontal,
            PassKind::BlurVertical,
            PassKind::Composite(CompositePath::Blended),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: [PassKind; 3] = [PassKind::Geometry, PassKind::NormalDepth, PassKind::Ssao];

    #[test]
    fn prefix_is_mode_independent() {
        for mode in RenderMode::ALL {
            assert_eq!(&frame_schedule(mode)[..3], &PREFIX, "{mode:?}");
        }
    }

    #[test]
    fn every_schedule_ends_with_exactly_one_composite() {
        for mode in RenderMode::ALL {
            let passes = frame_schedule(mode);
            let composites = passes
                .iter()
                .filter(|p| matches!(p, PassKind::Composite(_)))
                .count();
            assert_eq!(composites, 1, "{mode:?}");
            assert!(matches!(passes.last(), Some(PassKind::Composite(_))));
        }
    }

    #[test]
    fn blur_runs_only_for_final_composite() {
        for mode in RenderMode::ALL {
            let passes = frame_schedule(mode);
            let blurred = passes.contains(&PassKind::BlurHorizontal);
            assert_eq!(blurred, mode == RenderMode::FinalComposite);
            assert_eq!(blurred, passes.contains(&PassKind::BlurVertical));
        }
        let fc = frame_schedule(RenderMode::FinalComposite);
        let h = fc.iter().position(|p| *p == PassKind::BlurHorizontal);
        let v = fc.iter().position(|p| *p == PassKind::BlurVertical);
        assert!(h < v);
    }

    #[test]
    fn default_mode_is_final_composite() {
        assert_eq!(RenderMode::default(), RenderMode::FinalComposite);
    }
}
