//! The demo scene: a torus, a box and a sphere resting on a board.

use glam::{Mat4, Vec3};

use penumbra_engine::camera::{Camera, Light};
use penumbra_engine::paint::Color;
use penumbra_engine::scene::{primitives, Material, Scene};

pub const PINK: Color = Color::rgb(0.84, 0.49, 0.50);
pub const GREEN: Color = Color::rgb(0.39, 0.78, 0.64);
pub const BLUE: Color = Color::rgb(0.32, 0.59, 0.81);
pub const ORANGE: Color = Color::rgb(0.77, 0.35, 0.35);

const AMBIENT: f32 = 0.3;

pub const INITIAL_EYE: Vec3 = Vec3::new(0.0, 0.0, -8.0);
pub const LIGHT_POSITION: Vec3 = Vec3::new(0.0, 4.0, 0.0);

pub fn build_scene() -> Scene {
    let mut scene = Scene::new();

    let torus = scene.add_mesh(primitives::torus(1.0, 0.3, 32, 64));
    let board = scene.add_mesh(primitives::cuboid([10.0, 0.1, 10.0]));
    let cube = scene.add_mesh(primitives::cuboid([1.0, 1.0, 1.0]));
    let sphere = scene.add_mesh(primitives::uv_sphere(0.8, 30));

    scene.add_object(
        torus,
        Material::matte(PINK, AMBIENT).with_specular(Color::WHITE, 25.0),
        Mat4::from_translation(Vec3::new(-2.0, -1.0, 0.0))
            * Mat4::from_rotation_x(90f32.to_radians()),
    );
    scene.add_object(
        board,
        Material::matte(GREEN, AMBIENT),
        Mat4::from_translation(Vec3::new(0.0, -1.35, 0.0)),
    );
    scene.add_object(
        cube,
        Material::matte(BLUE, AMBIENT),
        Mat4::from_translation(Vec3::new(0.4, -0.3, 0.5)) * Mat4::from_scale(Vec3::splat(2.0)),
    );
    scene.add_object(
        sphere,
        Material::matte(ORANGE, AMBIENT).with_specular(Color::WHITE, 35.0),
        Mat4::from_translation(Vec3::new(0.1, -0.56, -1.25)),
    );

    scene
}

pub fn initial_camera() -> Camera {
    Camera::look_at(INITIAL_EYE, Vec3::ZERO, Vec3::Y)
}

pub fn initial_light() -> Light {
    Light::directional(LIGHT_POSITION, Vec3::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_is_valid() {
        let scene = build_scene();
        scene.validate().unwrap();
        assert_eq!(scene.objects.len(), 4);
        assert_eq!(scene.meshes.len(), 4);
    }

    #[test]
    fn torus_stands_upright() {
        let scene = build_scene();
        let t = scene.objects[0].transform;
        // The torus axis (+Y in mesh space) ends up along +/-Z.
        let axis = t.transform_vector3(Vec3::Y);
        assert!(axis.z.abs() > 0.999);
    }
}
