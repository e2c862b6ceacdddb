//! Bind/unbind bookkeeping for the passes of one frame.
//!
//! wgpu scopes attachments to a render pass, so nothing can actually leak
//! between passes. The tracker still records every target and texture a
//! pass claims and checks, in debug builds, that each pass releases what it
//! took and never samples the target it is drawing into. It also keeps the
//! list of passes executed this frame.

use super::schedule::PassKind;
use super::targets::TargetRole;

/// Where a pass draws.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Destination {
    Target(TargetRole),
    Output,
}

/// What a pass samples on a texture unit.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TextureSource {
    Noise,
    Target(TargetRole),
}

#[derive(Debug, Default)]
pub struct PassTracker {
    current: Option<(PassKind, Destination)>,
    units: Vec<(u32, TextureSource)>,
    trace: Vec<PassKind>,
    in_frame: bool,
}

impl PassTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_frame(&mut self) {
        debug_assert!(!self.in_frame, "begin_frame called twice");
        self.trace.clear();
        self.in_frame = true;
    }

    /// Claims `dest` for `pass`. The previous pass must have released its target.
    pub fn bind_target(&mut self, pass: PassKind, dest: Destination) {
        debug_assert!(self.in_frame, "pass {pass:?} outside a frame");
        debug_assert!(
            self.current.is_none(),
            "pass {pass:?} started while {:?} still bound",
            self.current
        );
        debug_assert!(self.units.is_empty(), "stale texture bindings {:?}", self.units);
        self.current = Some((pass, dest));
        self.trace.push(pass);
    }

    pub fn bind_texture(&mut self, unit: u32, source: TextureSource) {
        debug_assert!(self.current.is_some(), "texture bound with no target");
        debug_assert!(
            !self.units.iter().any(|&(u, _)| u == unit),
            "unit {unit} already bound"
        );
        if let (Some((pass, Destination::Target(role))), TextureSource::Target(read)) =
            (self.current, source)
        {
            debug_assert_ne!(role, read, "{pass:?} samples the target it renders into");
        }
        self.units.push((unit, source));
    }

    pub fn unbind_texture(&mut self, unit: u32) {
        let before = self.units.len();
        self.units.retain(|&(u, _)| u != unit);
        debug_assert_eq!(before, self.units.len() + 1, "unit {unit} was not bound");
    }

    pub fn unbind_target(&mut self) {
        debug_assert!(self.units.is_empty(), "target released with textures bound {:?}", self.units);
        debug_assert!(self.current.is_some(), "no target bound");
        self.current = None;
    }

    /// Closes the frame and returns the passes it ran.
    pub fn end_frame(&mut self) -> &[PassKind] {
        debug_assert!(self.current.is_none(), "frame ended inside {:?}", self.current);
        debug_assert!(self.units.is_empty());
        self.in_frame = false;
        &self.trace
    }

    /// Whether the frame ended with nothing bound.
    pub fn is_clean(&self) -> bool {
        self.current.is_none() && self.units.is_empty() && !self.in_frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_pass(t: &mut PassTracker, pass: PassKind, dest: Destination, reads: &[(u32, TextureSource)]) {
        t.bind_target(pass, dest);
        for &(unit, src) in reads {
            t.bind_texture(unit, src);
        }
        for &(unit, _) in reads.iter().rev() {
            t.unbind_texture(unit);
        }
        t.unbind_target();
    }

    #[test]
    fn balanced_frame_is_clean_and_traced() {
        let mut t = PassTracker::new();
        t.begin_frame();
        run_pass(&mut t, PassKind::Geometry, Destination::Target(TargetRole::SceneColor), &[]);
        run_pass(
            &mut t,
            PassKind::Ssao,
            Destination::Target(TargetRole::Occlusion),
            &[
                (1, TextureSource::Noise),
                (2, TextureSource::Target(TargetRole::NormalDepth)),
            ],
        );
        let trace = t.end_frame().to_vec();
        assert_eq!(trace, vec![PassKind::Geometry, PassKind::Ssao]);
        assert!(t.is_clean());
    }

    #[test]
    fn trace_restarts_every_frame() {
        let mut t = PassTracker::new();
        for _ in 0..2 {
            t.begin_frame();
            run_pass(&mut t, PassKind::Geometry, Destination::Output, &[]);
            assert_eq!(t.end_frame().len(), 1);
        }
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "still bound")]
    fn overlapping_passes_panic() {
        let mut t = PassTracker::new();
        t.begin_frame();
        t.bind_target(PassKind::Geometry, Destination::Target(TargetRole::SceneColor));
        t.bind_target(PassKind::NormalDepth, Destination::Target(TargetRole::NormalDepth));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "samples the target it renders into")]
    fn feedback_loop_panics() {
        let mut t = PassTracker::new();
        t.begin_frame();
        t.bind_target(PassKind::BlurHorizontal, Destination::Target(TargetRole::Occlusion));
        t.bind_texture(0, TextureSource::Target(TargetRole::Occlusion));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "textures bound")]
    fn releasing_target_with_bound_texture_panics() {
        let mut t = PassTracker::new();
        t.begin_frame();
        t.bind_target(PassKind::Composite(crate::render::CompositePath::Scene), Destination::Output);
        t.bind_texture(1, TextureSource::Target(TargetRole::SceneColor));
        t.unbind_target();
    }
}
