use glam::{Mat4, Quat, Vec3, Vec4};

/// Perspective camera described by eye/center/up plus projection parameters.
///
/// Owned by the application. The pipeline reads it once per frame and hands
/// back a reprojected copy; it never keeps a reference across frames.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub center: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees.
    pub fov_y_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// Camera looking from `eye` at `center` with a 45 degree, 1..50 perspective.
    pub fn look_at(eye: Vec3, center: Vec3, up: Vec3) -> Self {
        Self {
            eye,
            center,
            up,
            fov_y_deg: 45.0,
            aspect: 1.0,
            near: 1.0,
            far: 50.0,
        }
    }

    pub fn with_perspective(mut self, fov_y_deg: f32, aspect: f32, near: f32, far: f32) -> Self {
        self.fov_y_deg = fov_y_deg;
        self.aspect = aspect;
        self.near = near;
        self.far = far;
        self
    }

    pub fn with_aspect(mut self, aspect: f32) -> Self {
        self.aspect = aspect;
        self
    }

    /// Right-handed view matrix.
    ///
    /// When the view direction is parallel to `up` the basis is rebuilt around +Z
    /// so orbiting over a pole never yields a NaN matrix.
    pub fn view(&self) -> Mat4 {
        let forward = self.center - self.eye;
        let up = if forward.cross(self.up).length_squared() <= f32::EPSILON {
            Vec3::Z
        } else {
            self.up
        };
        Mat4::look_at_rh(self.eye, self.center, up)
    }

    /// Right-handed perspective projection with a `[0, 1]` depth range.
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_deg.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// Copy with the eye moved onto the sphere of radius `|distance|`, keeping its direction.
    pub fn reprojected(&self, distance: f32) -> Self {
        Self {
            eye: reproject_eye(self.eye, distance),
            ..*self
        }
    }

    /// Copy with the eye rotated by `angle` radians about `axis` (through the origin).
    pub fn orbited(&self, axis: Vec3, angle: f32) -> Self {
        Self {
            eye: Quat::from_axis_angle(axis.normalize_or_zero(), angle) * self.eye,
            ..*self
        }
    }

    /// World-space corners of the view frustum: near plane first, then far plane,
    /// each in (-x -y), (+x -y), (+x +y), (-x +y) order.
    pub fn frustum_corners(&self) -> [Vec3; 8] {
        let inv = self.view_projection().inverse();
        let ndc = [
            (-1.0, -1.0, 0.0),
            (1.0, -1.0, 0.0),
            (1.0, 1.0, 0.0),
            (-1.0, 1.0, 0.0),
            (-1.0, -1.0, 1.0),
            (1.0, -1.0, 1.0),
            (1.0, 1.0, 1.0),
            (-1.0, 1.0, 1.0),
        ];
        ndc.map(|(x, y, z)| {
            let p = inv * Vec4::new(x, y, z, 1.0);
            p.truncate() / p.w
        })
    }
}

/// `normalize(eye) * |distance|`.
///
/// Decouples orbit input (which rotates the eye) from zoom input (which sets the
/// distance): the direction survives, the magnitude is enforced, the sign of
/// `distance` is ignored. A zero eye vector falls back to looking down -Z.
pub fn reproject_eye(eye: Vec3, distance: f32) -> Vec3 {
    eye.try_normalize().unwrap_or(Vec3::NEG_Z) * distance.abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn reprojection_keeps_direction_and_sets_magnitude() {
        let eye = Vec3::new(3.0, 4.0, 0.0);
        let out = reproject_eye(eye, 10.0);
        assert!(approx(out, Vec3::new(6.0, 8.0, 0.0)));
    }

    #[test]
    fn reprojection_ignores_distance_sign() {
        let eye = Vec3::new(0.0, 0.0, -8.0);
        assert!(approx(reproject_eye(eye, -20.0), Vec3::new(0.0, 0.0, -20.0)));
        assert!(approx(reproject_eye(eye, 20.0), Vec3::new(0.0, 0.0, -20.0)));
    }

    #[test]
    fn reprojection_is_idempotent_for_fixed_distance() {
        let eye = Vec3::new(1.5, -2.0, 7.25);
        let once = reproject_eye(eye, 8.0);
        let twice = reproject_eye(once, 8.0);
        assert!(approx(once, twice));
    }

    #[test]
    fn reprojection_of_zero_eye_is_finite() {
        let out = reproject_eye(Vec3::ZERO, 5.0);
        assert!(out.is_finite());
        assert!((out.length() - 5.0).abs() < 1e-5);
    }

    #[test]
    fn orbit_preserves_distance() {
        let cam = Camera::look_at(Vec3::new(0.0, 0.0, -8.0), Vec3::ZERO, Vec3::Y);
        let orbited = cam.orbited(Vec3::Y, 0.03).orbited(Vec3::X, -0.03);
        assert!((orbited.eye.length() - 8.0).abs() < 1e-4);
        assert!(!approx(orbited.eye, cam.eye));
    }

    #[test]
    fn view_is_finite_when_looking_along_up() {
        let cam = Camera::look_at(Vec3::new(0.0, 5.0, 0.0), Vec3::ZERO, Vec3::Y);
        assert!(cam.view().is_finite());
    }

    #[test]
    fn frustum_corners_lie_on_clip_planes() {
        let cam = Camera::look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y)
            .with_perspective(90.0, 1.0, 1.0, 10.0);
        let corners = cam.frustum_corners();
        for near in &corners[..4] {
            assert!((near.z - 4.0).abs() < 1e-3, "near corner {near}");
        }
        for far in &corners[4..] {
            assert!((far.z + 5.0).abs() < 1e-2, "far corner {far}");
        }
    }
}
