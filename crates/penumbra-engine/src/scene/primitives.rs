//! Procedural meshes used by the demo scene: box, UV sphere and torus.
//!
//! All meshes are centred on the origin, wound counter-clockwise when seen
//! from outside and carry unit outward normals.

use std::f32::consts::{PI, TAU};

use super::mesh::{MeshData, Vertex};

/// Axis-aligned box with full edge lengths `size`; each face has its own normals.
pub fn cuboid(size: [f32; 3]) -> MeshData {
    let [hx, hy, hz] = size.map(|s| s * 0.5);
    // (normal, u axis, v axis); u x v == normal keeps the winding CCW.
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]),
    ];

    let mut mesh = MeshData::default();
    for (normal, u, v) in faces {
        let base = mesh.vertices.len() as u32;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let position = [
                (normal[0] + u[0] * su + v[0] * sv) * hx,
                (normal[1] + u[1] * su + v[1] * sv) * hy,
                (normal[2] + u[2] * su + v[2] * sv) * hz,
            ];
            mesh.vertices.push(Vertex { position, normal });
        }
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    mesh
}

/// UV sphere; `segments` slices around the equator, half as many stacks.
pub fn uv_sphere(radius: f32, segments: u32) -> MeshData {
    let slices = segments.max(3);
    let stacks = (segments / 2).max(2);

    let mut mesh = MeshData::default();
    for stack in 0..=stacks {
        let phi = PI * stack as f32 / stacks as f32;
        let (sin_phi, cos_phi) = phi.sin_cos();
        for slice in 0..=slices {
            let theta = TAU * slice as f32 / slices as f32;
            let (sin_theta, cos_theta) = theta.sin_cos();
            let n = [sin_phi * cos_theta, cos_phi, -sin_phi * sin_theta];
            mesh.vertices.push(Vertex {
                position: n.map(|c| c * radius),
                normal: n,
            });
        }
    }

    let row = slices + 1;
    for stack in 0..stacks {
        for slice in 0..slices {
            let a = stack * row + slice;
            let b = a + row;
            mesh.indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }
    mesh
}

/// Torus in the XZ plane around +Y.
///
/// `ring_radius` is the distance from the centre to the tube centre, `tube_radius`
/// the tube thickness. `rings` segments run around the main ring and `sides`
/// around the tube.
pub fn torus(ring_radius: f32, tube_radius: f32, rings: u32, sides: u32) -> MeshData {
    let rings = rings.max(3);
    let sides = sides.max(3);

    let mut mesh = MeshData::default();
    for ring in 0..=rings {
        let u = TAU * ring as f32 / rings as f32;
        let (sin_u, cos_u) = u.sin_cos();
        for side in 0..=sides {
            let v = TAU * side as f32 / sides as f32;
            let (sin_v, cos_v) = v.sin_cos();
            let normal = [cos_v * cos_u, sin_v, -cos_v * sin_u];
            let reach = ring_radius + tube_radius * cos_v;
            mesh.vertices.push(Vertex {
                position: [reach * cos_u, tube_radius * sin_v, -reach * sin_u],
                normal,
            });
        }
    }

    let row = sides + 1;
    for ring in 0..rings {
        for side in 0..sides {
            let a = ring * row + side;
            let b = a + row;
            mesh.indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    /// Every triangle's geometric normal should agree with its vertex normals.
    fn assert_outward_winding(mesh: &MeshData) {
        for tri in mesh.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| mesh.vertices[i as usize]);
            let pa = Vec3::from(a.position);
            let face = (Vec3::from(b.position) - pa).cross(Vec3::from(c.position) - pa);
            if face.length_squared() < 1e-12 {
                continue; // degenerate pole triangle
            }
            let n = Vec3::from(a.normal) + Vec3::from(b.normal) + Vec3::from(c.normal);
            assert!(face.dot(n) > 0.0, "inward triangle {tri:?}");
        }
    }

    fn assert_unit_normals(mesh: &MeshData) {
        for v in &mesh.vertices {
            let len = Vec3::from(v.normal).length();
            assert!((len - 1.0).abs() < 1e-4, "normal length {len}");
        }
    }

    #[test]
    fn cuboid_spans_requested_size() {
        let mesh = cuboid([10.0, 0.1, 10.0]);
        mesh.validate().unwrap();
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.triangle_count(), 12);
        let max_y = mesh.vertices.iter().map(|v| v.position[1]).fold(f32::MIN, f32::max);
        let max_x = mesh.vertices.iter().map(|v| v.position[0]).fold(f32::MIN, f32::max);
        assert!((max_y - 0.05).abs() < 1e-6);
        assert!((max_x - 5.0).abs() < 1e-6);
        assert_outward_winding(&mesh);
    }

    #[test]
    fn sphere_vertices_sit_on_radius() {
        let mesh = uv_sphere(0.8, 30);
        mesh.validate().unwrap();
        for v in &mesh.vertices {
            assert!((Vec3::from(v.position).length() - 0.8).abs() < 1e-5);
        }
        assert_unit_normals(&mesh);
        assert_outward_winding(&mesh);
    }

    #[test]
    fn torus_has_expected_topology() {
        let mesh = torus(1.0, 0.3, 32, 64);
        mesh.validate().unwrap();
        assert_eq!(mesh.triangle_count(), 32 * 64 * 2);
        assert_unit_normals(&mesh);
        assert_outward_winding(&mesh);
        let max_x = mesh.vertices.iter().map(|v| v.position[0]).fold(f32::MIN, f32::max);
        assert!((max_x - 1.3).abs() < 1e-5);
    }
}
