use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Time elapsed since the previous frame tick, in seconds.
    pub dt: f32,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,

    /// Frames per second averaged over the clock's rolling window.
    pub average_fps: f32,
}

/// Frame clock producing `FrameTime` snapshots.
///
/// Delta time is clamped to avoid pathological values when the application is paused
/// by the debugger, minimized, or stalls. The average frame rate is computed from the
/// unclamped tick timestamps of the last `window` worth of frames.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,

    window: Duration,
    history: VecDeque<Instant>,
}

impl FrameClock {
    /// Creates a new clock with default clamps and a one second averaging window.
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    /// Creates a clock with custom delta-time clamps.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: Instant::now(),
            frame_index: 0,
            dt_min,
            dt_max,
            window: Duration::from_secs(1),
            history: VecDeque::with_capacity(128),
        }
    }

    /// Resets the clock baseline and forgets the frame-rate history.
    pub fn reset(&mut self) {
        self.last = Instant::now();
        self.history.clear();
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);

        self.last = now;
        self.history.push_back(now);
        while let Some(&front) = self.history.front() {
            if now.saturating_duration_since(front) > self.window {
                self.history.pop_front();
            } else {
                break;
            }
        }

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            now,
            frame_index: self.frame_index,
            average_fps: self.average_fps(),
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }

    /// Average frames per second over the retained history; `0.0` until two ticks exist.
    pub fn average_fps(&self) -> f32 {
        let (Some(first), Some(last)) = (self.history.front(), self.history.back()) else {
            return 0.0;
        };
        let span = last.saturating_duration_since(*first).as_secs_f32();
        if span <= 0.0 {
            return 0.0;
        }
        (self.history.len() - 1) as f32 / span
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_index_is_monotonic() {
        let mut clock = FrameClock::new();
        let start = Instant::now();
        let a = clock.tick_at(start);
        let b = clock.tick_at(start + Duration::from_millis(16));
        assert_eq!(a.frame_index + 1, b.frame_index);
    }

    #[test]
    fn dt_is_clamped_after_stall() {
        let mut clock = FrameClock::new();
        let start = Instant::now();
        clock.tick_at(start);
        let ft = clock.tick_at(start + Duration::from_secs(5));
        assert!((ft.dt - 0.25).abs() < 1e-6);
    }

    #[test]
    fn average_fps_tracks_steady_rate() {
        let mut clock = FrameClock::new();
        let start = Instant::now();
        let step = Duration::from_millis(20);
        let mut last = None;
        for i in 0..30 {
            last = Some(clock.tick_at(start + step * i));
        }
        let fps = last.map(|ft| ft.average_fps).unwrap_or_default();
        assert!((fps - 50.0).abs() < 0.5, "fps = {fps}");
    }
}
