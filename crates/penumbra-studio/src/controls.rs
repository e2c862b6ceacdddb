//! Keyboard bindings of the viewer.

use glam::Vec3;

use penumbra_engine::camera::{Camera, Light};
use penumbra_engine::input::Key;
use penumbra_engine::render::RenderMode;

/// Zoom step per key trigger.
pub const ZOOM_STEP: f32 = 1.0;

/// Viewer tunables. Distances are magnitudes; the camera sits `eye_distance`
/// away from the origin.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewConfig {
    pub eye_distance: f32,
    pub eye_distance_bounds: (f32, f32),
    pub lighting: bool,
    pub initial_mode: RenderMode,
    /// Orbit step per key trigger, in radians.
    pub orbit_step: f32,
    /// Light translation per key trigger.
    pub light_step: f32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            eye_distance: 8.0,
            eye_distance_bounds: (5.0, 100.0),
            lighting: true,
            initial_mode: RenderMode::default(),
            orbit_step: 0.03,
            light_step: 0.1,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Command {
    SelectMode(RenderMode),
    Orbit { axis: Vec3, angle: f32 },
    MoveLight(Vec3),
    Zoom(f32),
    ToggleLighting,
    ToggleFps,
    Quit,
}

/// Binding of a key under `config`, if any.
pub fn command_for(key: Key, config: &ViewConfig) -> Option<Command> {
    let orbit = config.orbit_step;
    let step = config.light_step;

    Some(match key {
        Key::Digit1 => Command::SelectMode(RenderMode::StandardView),
        Key::Digit2 => Command::SelectMode(RenderMode::SsaoView),
        Key::Digit3 => Command::SelectMode(RenderMode::NormalMapView),
        Key::Digit4 => Command::SelectMode(RenderMode::FinalComposite),

        Key::W => Command::Orbit { axis: Vec3::X, angle: -orbit },
        Key::S => Command::Orbit { axis: Vec3::X, angle: orbit },
        Key::A => Command::Orbit { axis: Vec3::Y, angle: orbit },
        Key::D => Command::Orbit { axis: Vec3::Y, angle: -orbit },

        Key::ArrowUp => Command::MoveLight(Vec3::new(0.0, 0.0, step)),
        Key::ArrowDown => Command::MoveLight(Vec3::new(0.0, 0.0, -step)),
        Key::ArrowLeft => Command::MoveLight(Vec3::new(step, 0.0, 0.0)),
        Key::ArrowRight => Command::MoveLight(Vec3::new(-step, 0.0, 0.0)),

        Key::Equal => Command::Zoom(-ZOOM_STEP),
        Key::Minus => Command::Zoom(ZOOM_STEP),

        Key::L => Command::ToggleLighting,
        Key::X => Command::ToggleFps,
        Key::Escape => Command::Quit,
        _ => return None,
    })
}

/// Everything the keyboard can change.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerState {
    pub camera: Camera,
    pub light: Light,
    pub eye_distance: f32,
    pub mode: RenderMode,
    pub lighting: bool,
    pub show_fps: bool,
    config: ViewConfig,
}

impl ViewerState {
    pub fn new(camera: Camera, light: Light, config: ViewConfig) -> Self {
        let (min, max) = config.eye_distance_bounds;
        Self {
            camera,
            light,
            eye_distance: config.eye_distance.abs().clamp(min, max),
            mode: config.initial_mode,
            lighting: config.lighting,
            show_fps: true,
            config,
        }
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    /// Applies `cmd`; returns `false` when the viewer should quit.
    pub fn apply(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::SelectMode(mode) => {
                if self.mode != mode {
                    log::info!("render mode: {}", mode.label());
                }
                self.mode = mode;
            }
            Command::Orbit { axis, angle } => self.camera = self.camera.orbited(axis, angle),
            Command::MoveLight(delta) => self.light = self.light.nudged(delta),
            Command::Zoom(delta) => {
                let (min, max) = self.config.eye_distance_bounds;
                self.eye_distance = (self.eye_distance + delta).clamp(min, max);
            }
            Command::ToggleLighting => {
                self.lighting = !self.lighting;
                log::info!("lighting {}", if self.lighting { "on" } else { "off" });
            }
            Command::ToggleFps => self.show_fps = !self.show_fps,
            Command::Quit => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{initial_camera, initial_light};

    fn state() -> ViewerState {
        ViewerState::new(initial_camera(), initial_light(), ViewConfig::default())
    }

    fn press(s: &mut ViewerState, key: Key) -> bool {
        let cmd = command_for(key, s.config()).expect("bound key");
        s.apply(cmd)
    }

    #[test]
    fn starts_in_final_composite_at_eight_units() {
        let s = state();
        assert_eq!(s.mode, RenderMode::FinalComposite);
        assert!((s.eye_distance - 8.0).abs() < 1e-6);
        assert!(s.lighting);
    }

    #[test]
    fn digits_select_modes() {
        let mut s = state();
        for (key, mode) in [
            (Key::Digit1, RenderMode::StandardView),
            (Key::Digit2, RenderMode::SsaoView),
            (Key::Digit3, RenderMode::NormalMapView),
            (Key::Digit4, RenderMode::FinalComposite),
        ] {
            assert!(press(&mut s, key));
            assert_eq!(s.mode, mode);
        }
    }

    #[test]
    fn zoom_is_clamped() {
        let mut s = state();
        for _ in 0..10 {
            press(&mut s, Key::Equal);
        }
        assert_eq!(s.eye_distance, 5.0);
        for _ in 0..200 {
            press(&mut s, Key::Minus);
        }
        assert_eq!(s.eye_distance, 100.0);
    }

    #[test]
    fn opposite_orbits_cancel() {
        let mut s = state();
        let start = s.camera.eye;
        press(&mut s, Key::A);
        press(&mut s, Key::D);
        assert!((s.camera.eye - start).length() < 1e-5);
    }

    #[test]
    fn arrows_move_light_in_xz() {
        let mut s = state();
        press(&mut s, Key::ArrowUp);
        press(&mut s, Key::ArrowLeft);
        let p = s.light.position;
        assert!((p - Vec3::new(0.1, 4.0, 0.1)).length() < 1e-6);
    }

    #[test]
    fn toggles_flip_and_escape_quits() {
        let mut s = state();
        press(&mut s, Key::L);
        assert!(!s.lighting);
        press(&mut s, Key::X);
        assert!(!s.show_fps);
        assert!(!press(&mut s, Key::Escape));
    }

    #[test]
    fn unbound_keys_are_ignored() {
        let config = ViewConfig::default();
        assert_eq!(command_for(Key::Q, &config), None);
        assert_eq!(command_for(Key::Unknown(999), &config), None);
    }
}
