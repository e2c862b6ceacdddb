//! Compiled shader programs of the pipeline.
//!
//! Each program has a stable logical name (used in labels and error
//! messages), a WGSL source and the list of uniform blocks it declares.
//! Fullscreen programs share the `vs_quad` vertex stage, prepended from
//! `fullscreen.wgsl`.

use super::bindings::{BindingTable, ProgramBindings};

const FULLSCREEN_PREAMBLE: &str = include_str!("shaders/fullscreen.wgsl");

/// Identity of a program in the [`ProgramSet`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ProgramId {
    SceneLit,
    NormalDepth,
    Ssao,
    Blur,
    Composite,
}

impl ProgramId {
    pub const ALL: [ProgramId; 5] = [
        ProgramId::SceneLit,
        ProgramId::NormalDepth,
        ProgramId::Ssao,
        ProgramId::Blur,
        ProgramId::Composite,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ProgramId::SceneLit => "scene_lit",
            ProgramId::NormalDepth => "normal_depth",
            ProgramId::Ssao => "ssao",
            ProgramId::Blur => "blur",
            ProgramId::Composite => "composite",
        }
    }

    fn source(self) -> &'static str {
        match self {
            ProgramId::SceneLit => include_str!("shaders/scene_lit.wgsl"),
            ProgramId::NormalDepth => include_str!("shaders/normal_depth.wgsl"),
            ProgramId::Ssao => include_str!("shaders/ssao.wgsl"),
            ProgramId::Blur => include_str!("shaders/blur.wgsl"),
            ProgramId::Composite => include_str!("shaders/composite.wgsl"),
        }
    }

    fn is_fullscreen(self) -> bool {
        matches!(self, ProgramId::Ssao | ProgramId::Blur | ProgramId::Composite)
    }

    /// Named uniform blocks the program reads.
    pub fn uniforms(self) -> &'static [&'static str] {
        match self {
            ProgramId::SceneLit | ProgramId::NormalDepth => &["scene", "obj"],
            ProgramId::Ssao | ProgramId::Blur => &["params"],
            ProgramId::Composite => &[],
        }
    }

    fn bindings(self, tables: &ProgramBindings) -> Option<&BindingTable> {
        match self {
            ProgramId::Ssao => Some(&tables.ssao),
            ProgramId::Blur => Some(&tables.blur),
            ProgramId::Composite => Some(&tables.composite),
            ProgramId::SceneLit | ProgramId::NormalDepth => None,
        }
    }

    /// Final WGSL text with the preamble attached and texture units filled in.
    pub fn assemble(self, tables: &ProgramBindings) -> anyhow::Result<String> {
        let body = match self.bindings(tables) {
            Some(table) => table.resolve_source(self.source())?,
            None => self.source().to_owned(),
        };
        Ok(if self.is_fullscreen() {
            format!("{FULLSCREEN_PREAMBLE}\n{body}")
        } else {
            body
        })
    }
}

/// A compiled shader module plus its identity.
pub struct ShaderProgram {
    id: ProgramId,
    module: wgpu::ShaderModule,
}

impl ShaderProgram {
    /// Compiles `id` and fails if the backend reports any error.
    pub fn compile(device: &wgpu::Device, id: ProgramId, tables: &ProgramBindings) -> anyhow::Result<Self> {
        let source = id.assemble(tables)?;
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(id.name()),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let info = pollster::block_on(module.get_compilation_info());
        let errors: Vec<String> = info
            .messages
            .iter()
            .filter(|m| m.message_type == wgpu::CompilationMessageType::Error)
            .map(|m| match &m.location {
                Some(loc) => format!("{}:{}: {}", loc.line_number, loc.line_position, m.message),
                None => m.message.clone(),
            })
            .collect();
        if !errors.is_empty() {
            anyhow::bail!(
                "shader program `{}` failed to compile:\n{}",
                id.name(),
                errors.join("\n")
            );
        }
        for warning in info
            .messages
            .iter()
            .filter(|m| m.message_type == wgpu::CompilationMessageType::Warning)
        {
            log::warn!("shader program `{}`: {}", id.name(), warning.message);
        }

        Ok(Self { id, module })
    }

    pub fn id(&self) -> ProgramId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.id.name()
    }

    pub fn module(&self) -> &wgpu::ShaderModule {
        &self.module
    }
}

/// Every program the pipeline uses, compiled once at construction.
pub struct ProgramSet {
    pub scene_lit: ShaderProgram,
    pub normal_depth: ShaderProgram,
    pub ssao: ShaderProgram,
    pub blur: ShaderProgram,
    pub composite: ShaderProgram,
}

impl ProgramSet {
    pub fn compile(device: &wgpu::Device, tables: &ProgramBindings) -> anyhow::Result<Self> {
        let set = Self {
            scene_lit: ShaderProgram::compile(device, ProgramId::SceneLit, tables)?,
            normal_depth: ShaderProgram::compile(device, ProgramId::NormalDepth, tables)?,
            ssao: ShaderProgram::compile(device, ProgramId::Ssao, tables)?,
            blur: ShaderProgram::compile(device, ProgramId::Blur, tables)?,
            composite: ShaderProgram::compile(device, ProgramId::Composite, tables)?,
        };
        log::debug!("compiled {} shader programs", ProgramId::ALL.len());
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique() {
        let mut names: Vec<_> = ProgramId::ALL.iter().map(|p| p.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), ProgramId::ALL.len());
    }

    #[test]
    fn assembled_sources_have_no_placeholders() {
        let tables = ProgramBindings::standard().unwrap();
        for id in ProgramId::ALL {
            let src = id.assemble(&tables).unwrap();
            assert!(!src.contains("{unit:"), "{}", id.name());
            assert_eq!(src.contains("fn vs_quad"), id.is_fullscreen(), "{}", id.name());
        }
    }

    #[test]
    fn ssao_source_uses_table_units() {
        let tables = ProgramBindings::standard().unwrap();
        let src = ProgramId::Ssao.assemble(&tables).unwrap();
        assert!(src.contains("@binding(1) var noise_tex"));
        assert!(src.contains("@binding(2) var normal_depth_tex"));
    }

    #[test]
    fn declared_uniforms_appear_in_source() {
        let tables = ProgramBindings::standard().unwrap();
        for id in ProgramId::ALL {
            let src = id.assemble(&tables).unwrap();
            for name in id.uniforms() {
                assert!(src.contains(&format!("var<uniform> {name}:")), "{} lacks {name}", id.name());
            }
        }
    }

    #[test]
    fn sources_validate_as_wgsl() {
        let tables = ProgramBindings::standard().unwrap();
        for id in ProgramId::ALL {
            let src = id.assemble(&tables).unwrap();
            let module = match naga::front::wgsl::parse_str(&src) {
                Ok(m) => m,
                Err(err) => panic!("{}: {}", id.name(), err.emit_to_string(&src)),
            };
            let mut validator = naga::valid::Validator::new(
                naga::valid::ValidationFlags::all(),
                naga::valid::Capabilities::empty(),
            );
            if let Err(err) = validator.validate(&module) {
                panic!("{}: {}", id.name(), err.emit_to_string(&src));
            }
        }
    }
}
