//! Texture-unit assignments shared by Rust bind groups and WGSL sources.
//!
//! Each fullscreen program gets a [`BindingTable`] mapping the logical
//! textures it reads to binding indices. Shader sources name their texture
//! bindings with `{unit:<role>}` placeholders that are filled from the table
//! before compilation, so the two sides cannot drift apart.

use std::fmt;

/// Highest texture unit (exclusive) available to a program.
pub const MAX_TEXTURE_UNITS: u32 = 8;
/// Binding of the program's uniform block.
pub const PARAMS_BINDING: u32 = 8;
/// Binding of the clamp-to-edge linear sampler.
pub const CLAMP_SAMPLER_BINDING: u32 = 9;
/// Binding of the repeating linear sampler (noise lookups).
pub const REPEAT_SAMPLER_BINDING: u32 = 10;

/// Logical texture a program reads.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TextureRole {
    Noise,
    NormalDepth,
    Occlusion,
    SceneColor,
}

impl TextureRole {
    /// Placeholder name used in shader sources.
    pub fn key(self) -> &'static str {
        match self {
            TextureRole::Noise => "noise",
            TextureRole::NormalDepth => "normal_depth",
            TextureRole::Occlusion => "occlusion",
            TextureRole::SceneColor => "scene_color",
        }
    }
}

impl fmt::Display for TextureRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Validated role -> unit map for one program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingTable {
    entries: Vec<(TextureRole, u32)>,
}

impl BindingTable {
    /// Fails on a unit outside `0..MAX_TEXTURE_UNITS`, a unit used twice, or a role listed twice.
    pub fn new(entries: &[(TextureRole, u32)]) -> anyhow::Result<Self> {
        for (i, &(role, unit)) in entries.iter().enumerate() {
            anyhow::ensure!(
                unit < MAX_TEXTURE_UNITS,
                "texture `{role}` bound to unit {unit}, limit is {MAX_TEXTURE_UNITS}"
            );
            for &(other_role, other_unit) in &entries[..i] {
                anyhow::ensure!(
                    other_unit != unit,
                    "textures `{other_role}` and `{role}` collide on unit {unit}"
                );
                anyhow::ensure!(other_role != role, "texture `{role}` bound twice");
            }
        }
        Ok(Self {
            entries: entries.to_vec(),
        })
    }

    pub fn unit(&self, role: TextureRole) -> Option<u32> {
        self.entries
            .iter()
            .find_map(|&(r, u)| (r == role).then_some(u))
    }

    /// Unit of `role`, or an error naming the missing texture.
    pub fn require(&self, role: TextureRole) -> anyhow::Result<u32> {
        self.unit(role)
            .ok_or_else(|| anyhow::anyhow!("no texture unit assigned to `{role}`"))
    }

    pub fn iter(&self) -> impl Iterator<Item = (TextureRole, u32)> + '_ {
        self.entries.iter().copied()
    }

    /// Replaces every `{unit:<role>}` placeholder in `source`.
    ///
    /// A placeholder naming a role absent from the table is an error.
    pub fn resolve_source(&self, source: &str) -> anyhow::Result<String> {
        const OPEN: &str = "{unit:";
        let mut out = String::with_capacity(source.len());
        let mut rest = source;
        while let Some(start) = rest.find(OPEN) {
            out.push_str(&rest[..start]);
            let after = &rest[start + OPEN.len()..];
            let end = after
                .find('}')
                .ok_or_else(|| anyhow::anyhow!("unterminated texture unit placeholder"))?;
            let key = &after[..end];
            let unit = self
                .iter()
                .find_map(|(role, unit)| (role.key() == key).then_some(unit))
                .ok_or_else(|| anyhow::anyhow!("shader references unbound texture `{key}`"))?;
            out.push_str(&unit.to_string());
            rest = &after[end + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }

    /// Fragment-visible, filterable 2D float texture entries for every unit.
    pub fn layout_entries(&self) -> Vec<wgpu::BindGroupLayoutEntry> {
        self.iter()
            .map(|(_, unit)| wgpu::BindGroupLayoutEntry {
                binding: unit,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            })
            .collect()
    }
}

/// Binding tables of the three texture-reading programs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramBindings {
    pub ssao: BindingTable,
    pub blur: BindingTable,
    pub composite: BindingTable,
}

impl ProgramBindings {
    /// Noise on 1 and normal/depth on 2 for the occlusion estimate; blur reads
    /// unit 0; the compositor takes occlusion on 0 and the scene on 1.
    pub fn standard() -> anyhow::Result<Self> {
        let bindings = Self {
            ssao: BindingTable::new(&[(TextureRole::Noise, 1), (TextureRole::NormalDepth, 2)])?,
            blur: BindingTable::new(&[(TextureRole::Occlusion, 0)])?,
            composite: BindingTable::new(&[
                (TextureRole::Occlusion, 0),
                (TextureRole::SceneColor, 1),
            ])?,
        };
        bindings.validate()?;
        Ok(bindings)
    }

    /// Every program must expose the textures its pass binds.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.ssao.require(TextureRole::Noise)?;
        self.ssao.require(TextureRole::NormalDepth)?;
        self.blur.require(TextureRole::Occlusion)?;
        self.composite.require(TextureRole::Occlusion)?;
        self.composite.require(TextureRole::SceneColor)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_tables_validate() {
        let b = ProgramBindings::standard().unwrap();
        assert_eq!(b.ssao.unit(TextureRole::Noise), Some(1));
        assert_eq!(b.ssao.unit(TextureRole::NormalDepth), Some(2));
        assert_eq!(b.composite.unit(TextureRole::SceneColor), Some(1));
    }

    #[test]
    fn unit_collision_is_rejected() {
        let err = BindingTable::new(&[(TextureRole::Noise, 2), (TextureRole::NormalDepth, 2)])
            .unwrap_err();
        assert!(err.to_string().contains("collide"));
    }

    #[test]
    fn unit_beyond_limit_is_rejected() {
        assert!(BindingTable::new(&[(TextureRole::Noise, MAX_TEXTURE_UNITS)]).is_err());
    }

    #[test]
    fn duplicate_role_is_rejected() {
        assert!(BindingTable::new(&[(TextureRole::Noise, 1), (TextureRole::Noise, 3)]).is_err());
    }

    #[test]
    fn uniform_and_sampler_bindings_sit_above_texture_units() {
        for b in [PARAMS_BINDING, CLAMP_SAMPLER_BINDING, REPEAT_SAMPLER_BINDING] {
            assert!(b >= MAX_TEXTURE_UNITS);
        }
    }

    #[test]
    fn placeholders_are_resolved() {
        let table = BindingTable::new(&[(TextureRole::Noise, 1), (TextureRole::NormalDepth, 2)]).unwrap();
        let src = "@binding({unit:noise}) var a; @binding({unit:normal_depth}) var b;";
        assert_eq!(
            table.resolve_source(src).unwrap(),
            "@binding(1) var a; @binding(2) var b;"
        );
    }

    #[test]
    fn missing_role_in_source_is_an_error() {
        let table = BindingTable::new(&[(TextureRole::Occlusion, 0)]).unwrap();
        assert!(table.resolve_source("@binding({unit:scene_color})").is_err());
        assert!(table.resolve_source("@binding({unit:occlusion").is_err());
    }
}
