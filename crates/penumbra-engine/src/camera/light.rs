use glam::{Mat4, Vec3};

use crate::paint::Color;

use super::Camera;

/// Projection used to visualize a light's shadow frustum.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ShadowParams {
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for ShadowParams {
    fn default() -> Self {
        Self {
            fov_y_deg: 100.0,
            near: 1.0,
            far: 20.0,
        }
    }
}

/// Directional light positioned in the scene so it can be moved and visualized.
///
/// Shading only uses the direction from `position` to `target`; the shadow
/// camera exists for the debug frustum drawn by the geometry pass.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Light {
    pub position: Vec3,
    pub target: Vec3,
    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,
    pub shadow: ShadowParams,
}

/// Light terms expressed in camera space for one frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LightView {
    /// Unit vector from a surface towards the light, in view space.
    pub to_light: Vec3,
}

impl Light {
    /// White directional light at `position` aimed at `target`.
    pub fn directional(position: Vec3, target: Vec3) -> Self {
        Self {
            position,
            target,
            ambient: Color::WHITE,
            diffuse: Color::WHITE,
            specular: Color::WHITE,
            shadow: ShadowParams::default(),
        }
    }

    /// Unit direction the light travels in (from `position` towards `target`).
    pub fn direction(&self) -> Vec3 {
        (self.target - self.position)
            .try_normalize()
            .unwrap_or(Vec3::NEG_Y)
    }

    /// Copy with the position shifted by `delta`; the aim point stays put.
    pub fn nudged(&self, delta: Vec3) -> Self {
        Self {
            position: self.position + delta,
            ..*self
        }
    }

    /// Camera looking along the light with the shadow projection.
    pub fn shadow_camera(&self) -> Camera {
        Camera::look_at(self.position, self.target, Vec3::Y).with_perspective(
            self.shadow.fov_y_deg,
            1.0,
            self.shadow.near,
            self.shadow.far,
        )
    }

    /// Camera-relative light terms for the given view matrix.
    pub fn view_space(&self, view: Mat4) -> LightView {
        let to_light = view
            .transform_vector3(-self.direction())
            .try_normalize()
            .unwrap_or(Vec3::Z);
        LightView { to_light }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overhead_light_points_down() {
        let light = Light::directional(Vec3::new(0.0, 4.0, 0.0), Vec3::ZERO);
        assert!((light.direction() - Vec3::NEG_Y).length() < 1e-6);
    }

    #[test]
    fn view_space_direction_follows_camera() {
        let light = Light::directional(Vec3::new(0.0, 4.0, 0.0), Vec3::ZERO);
        let cam = Camera::look_at(Vec3::new(0.0, 0.0, -8.0), Vec3::ZERO, Vec3::Y);
        let lv = light.view_space(cam.view());
        // World +Y stays +Y in a camera that only yaws around Y.
        assert!((lv.to_light - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn nudge_moves_position_only() {
        let light = Light::directional(Vec3::new(0.0, 4.0, 0.0), Vec3::ZERO);
        let moved = light.nudged(Vec3::new(0.1, 0.0, 0.0));
        assert_eq!(moved.target, light.target);
        assert!((moved.position.x - 0.1).abs() < 1e-6);
    }

    #[test]
    fn shadow_camera_uses_shadow_projection() {
        let light = Light::directional(Vec3::new(0.0, 4.0, 0.0), Vec3::ZERO);
        let cam = light.shadow_camera();
        assert_eq!(cam.fov_y_deg, 100.0);
        assert_eq!(cam.far, 20.0);
        assert!(cam.view().is_finite());
    }
}
