use crate::error::RendererError;
use crate::shaders::{ShaderGenerator, ShaderKind};

use super::Renderer;
use super::gpu_resources::DEPTH_FORMAT;
use super::passes::{PassKind, StencilMode};
use super::types::{instance_buffer_layout, vertex_buffer_layout};

/// Everything that requires a distinct compiled pipeline.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub(super) struct PipelineCacheKey {
    pub(super) kind: PassKind,
    pub(super) stencil: StencilMode,
}

/// Pipeline layouts for the two shader families.
pub(super) struct PipelineLayouts {
    /// Camera and lights.
    pub(super) lit: wgpu::PipelineLayout,
    /// Camera only.
    pub(super) unlit: wgpu::PipelineLayout,
}

impl PipelineLayouts {
    pub(super) fn new(
        device: &wgpu::Device,
        camera_layout: &wgpu::BindGroupLayout,
        light_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let lit = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Lit Pipeline Layout"),
            bind_group_layouts: &[camera_layout, light_layout],
            push_constant_ranges: &[],
        });
        let unlit = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Unlit Pipeline Layout"),
            bind_group_layouts: &[camera_layout],
            push_constant_ranges: &[],
        });
        Self { lit, unlit }
    }
}

/// Fixed-function state per pass kind.
struct PassState {
    shader: ShaderKind,
    cull_mode: wgpu::Face,
    depth_write_enabled: bool,
    depth_compare: wgpu::CompareFunction,
    bias: wgpu::DepthBiasState,
    blend: wgpu::BlendState,
    color_writes: wgpu::ColorWrites,
}

impl PassState {
    fn for_kind(kind: PassKind) -> Self {
        match kind {
            PassKind::DepthPrime => PassState {
                shader: ShaderKind::DepthOnly,
                cull_mode: wgpu::Face::Back,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                bias: wgpu::DepthBiasState::default(),
                blend: wgpu::BlendState::REPLACE,
                color_writes: wgpu::ColorWrites::empty(),
            },
            // Back faces of the enlarged shell, pushed slightly away so they
            // never win against the primed surface they sit behind.
            PassKind::OutlineStencilWrite => PassState {
                shader: ShaderKind::Outline,
                cull_mode: wgpu::Face::Front,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::LessEqual,
                bias: wgpu::DepthBiasState {
                    constant: 1,
                    slope_scale: 1.0,
                    clamp: 0.0,
                },
                // Translucent outline colors blend over the cleared background.
                blend: wgpu::BlendState::ALPHA_BLENDING,
                color_writes: wgpu::ColorWrites::ALL,
            },
            PassKind::Scene => PassState {
                shader: ShaderKind::Lit,
                cull_mode: wgpu::Face::Back,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                bias: wgpu::DepthBiasState::default(),
                blend: wgpu::BlendState::REPLACE,
                color_writes: wgpu::ColorWrites::ALL,
            },
        }
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    shader_generator: &mut ShaderGenerator,
    layouts: &PipelineLayouts,
    format: wgpu::TextureFormat,
    key: PipelineCacheKey,
) -> Result<wgpu::RenderPipeline, RendererError> {
    let state = PassState::for_kind(key.kind);
    let shader = shader_generator.generate(device, state.shader)?;
    let layout = match state.shader {
        ShaderKind::Lit => &layouts.lit,
        ShaderKind::DepthOnly | ShaderKind::Outline => &layouts.unlit,
    };
    log::debug!("Creating pipeline for {:?} with stencil {:?}", key.kind, key.stencil);

    Ok(device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Render Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[vertex_buffer_layout(), instance_buffer_layout()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(state.blend),
                write_mask: state.color_writes,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(state.cull_mode),
            // Setting this to anything other than Fill requires Features::NON_FILL_POLYGON_MODE
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: state.depth_write_enabled,
            depth_compare: state.depth_compare,
            stencil: key.stencil.to_stencil_state(),
            bias: state.bias,
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    }))
}

impl<'a> Renderer<'a> {
    pub(super) fn get_or_create_pipeline(
        &mut self,
        key: PipelineCacheKey,
    ) -> Result<wgpu::RenderPipeline, RendererError> {
        if let Some(pipeline) = self.pipeline_cache.get(&key) {
            return Ok(pipeline.clone());
        }
        let pipeline = create_pipeline(
            &self.device,
            &mut self.shader_generator,
            &self.pipelines,
            self.config.format,
            key,
        )?;
        self.pipeline_cache.insert(key, pipeline.clone());
        Ok(pipeline)
    }
}
