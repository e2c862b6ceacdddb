use glam::Mat4;

use super::material::Material;
use super::mesh::MeshData;

/// Index of a mesh inside a [`MeshArena`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct MeshId(u32);

impl MeshId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Append-only store of CPU meshes; several objects may share one mesh.
#[derive(Debug, Default)]
pub struct MeshArena {
    meshes: Vec<MeshData>,
}

impl MeshArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, mesh: MeshData) -> MeshId {
        let id = MeshId(self.meshes.len() as u32);
        self.meshes.push(mesh);
        id
    }

    pub fn get(&self, id: MeshId) -> Option<&MeshData> {
        self.meshes.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MeshId, &MeshData)> {
        self.meshes
            .iter()
            .enumerate()
            .map(|(i, m)| (MeshId(i as u32), m))
    }
}

/// One placed, shaded mesh instance.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SceneObject {
    pub mesh: MeshId,
    pub material: Material,
    pub transform: Mat4,
}

/// Static scene content: meshes plus the objects that reference them.
///
/// Built once before pipeline construction and uploaded as immutable GPU
/// buffers; nothing here changes while frames are rendered.
#[derive(Debug, Default)]
pub struct Scene {
    pub meshes: MeshArena,
    pub objects: Vec<SceneObject>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_mesh(&mut self, mesh: MeshData) -> MeshId {
        self.meshes.insert(mesh)
    }

    pub fn add_object(&mut self, mesh: MeshId, material: Material, transform: Mat4) {
        self.objects.push(SceneObject {
            mesh,
            material,
            transform,
        });
    }

    /// Every mesh must be drawable and every object must point at a mesh.
    pub fn validate(&self) -> anyhow::Result<()> {
        for (id, mesh) in self.meshes.iter() {
            mesh.validate()
                .map_err(|e| e.context(format!("mesh #{}", id.index())))?;
        }
        for (i, obj) in self.objects.iter().enumerate() {
            anyhow::ensure!(
                self.meshes.get(obj.mesh).is_some(),
                "object #{i} references missing mesh #{}",
                obj.mesh.index()
            );
            anyhow::ensure!(
                obj.transform.is_finite(),
                "object #{i} has a non-finite transform"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::primitives;

    #[test]
    fn objects_can_share_a_mesh() {
        let mut scene = Scene::new();
        let cube = scene.add_mesh(primitives::cuboid([1.0; 3]));
        scene.add_object(cube, Material::default(), Mat4::IDENTITY);
        scene.add_object(cube, Material::default(), Mat4::from_scale(glam::Vec3::splat(2.0)));
        assert_eq!(scene.meshes.len(), 1);
        assert_eq!(scene.objects.len(), 2);
        scene.validate().unwrap();
    }

    #[test]
    fn dangling_mesh_reference_is_rejected() {
        let mut other = MeshArena::new();
        let foreign = other.insert(primitives::cuboid([1.0; 3]));
        let mut scene = Scene::new();
        scene.add_object(foreign, Material::default(), Mat4::IDENTITY);
        assert!(scene.validate().is_err());
    }

    #[test]
    fn empty_mesh_is_rejected() {
        let mut scene = Scene::new();
        scene.add_mesh(MeshData::default());
        let err = scene.validate().unwrap_err();
        assert!(format!("{err:#}").contains("mesh #0"));
    }
}
