use std::collections::HashMap;

use wesl::{ModulePath, VirtualResolver, Wesl};
use wgpu::ShaderModuleDescriptor;

use crate::error::RendererError;

// Embed shader sources at compile time so no filesystem access is needed
const SHADER_CAMERA: &str = include_str!("shaders/camera.wesl");
const SHADER_VERTEX: &str = include_str!("shaders/vertex.wesl");
const SHADER_LIGHTS: &str = include_str!("shaders/lights.wesl");
const SHADER_LIT: &str = include_str!("shaders/lit.wesl");
const SHADER_DEPTH_ONLY: &str = include_str!("shaders/depth_only.wesl");
const SHADER_OUTLINE: &str = include_str!("shaders/outline.wesl");

/// The entry modules the renderer compiles. Each exposes `vs_main` and `fs_main`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub(crate) enum ShaderKind {
    /// Lit scene geometry.
    Lit,
    /// Position-only transform for depth priming.
    DepthOnly,
    /// Flat instance color for the outline shell.
    Outline,
}

impl ShaderKind {
    fn module_path(&self) -> &'static str {
        match self {
            ShaderKind::Lit => "package::lit",
            ShaderKind::DepthOnly => "package::depth_only",
            ShaderKind::Outline => "package::outline",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ShaderKind::Lit => "Lit Shader",
            ShaderKind::DepthOnly => "Depth Only Shader",
            ShaderKind::Outline => "Outline Shader",
        }
    }
}

fn parse_path(path: &str) -> Result<ModulePath, RendererError> {
    path.parse().map_err(|err| RendererError::Shader {
        module: path.to_string(),
        message: format!("{err}"),
    })
}

/// Shader generator using the WESL compiler over embedded sources.
pub(crate) struct ShaderGenerator {
    compiler: Wesl<VirtualResolver<'static>>,
    module_cache: HashMap<ShaderKind, wgpu::ShaderModule>,
}

impl ShaderGenerator {
    pub fn new() -> Result<Self, RendererError> {
        let mut resolver = VirtualResolver::default();

        let sources = [
            ("package::camera", SHADER_CAMERA),
            ("package::vertex", SHADER_VERTEX),
            ("package::lights", SHADER_LIGHTS),
            ("package::lit", SHADER_LIT),
            ("package::depth_only", SHADER_DEPTH_ONLY),
            ("package::outline", SHADER_OUTLINE),
        ];
        for (path, source) in sources {
            resolver.add_module(parse_path(path)?, source.into());
        }

        let compiler = Wesl::new(".").set_custom_resolver(resolver);

        Ok(Self {
            compiler,
            module_cache: HashMap::new(),
        })
    }

    /// Compiles `kind` to WGSL, or returns the cached module.
    pub fn generate(
        &mut self,
        device: &wgpu::Device,
        kind: ShaderKind,
    ) -> Result<wgpu::ShaderModule, RendererError> {
        if let Some(cached) = self.module_cache.get(&kind) {
            return Ok(cached.clone());
        }

        let wgsl = self.compile(kind)?;
        let module = device.create_shader_module(ShaderModuleDescriptor {
            label: Some(kind.label()),
            source: wgpu::ShaderSource::Wgsl(wgsl.into()),
        });

        self.module_cache.insert(kind, module.clone());
        Ok(module)
    }

    fn compile(&mut self, kind: ShaderKind) -> Result<String, RendererError> {
        let path = parse_path(kind.module_path())?;
        let result = self.compiler.compile(&path).map_err(|err| RendererError::Shader {
            module: kind.module_path().to_string(),
            message: err.to_string(),
        })?;
        Ok(result.to_string())
    }
}
