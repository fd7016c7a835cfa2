mod gpu_resources;
mod outline;
mod passes;
mod pipeline;
mod types;

use std::collections::HashMap;

use anyhow::{Result, anyhow};
use cgmath::Point3;

use crate::{
    error::RendererError,
    scene::{Camera, EntityId, LightsArrayUniform, Scene, Viewport},
    selection::SelectionState,
    shaders::ShaderGenerator,
};

pub use gpu_resources::{CameraUniform, DEPTH_FORMAT, GpuInstance};
pub use outline::{OutlineInstance, OutlineSlot};
pub use passes::{AttachmentLoad, FramePlan, PassKind, PassSpec, StencilMode, StencilTracker};

use gpu_resources::{
    DepthTexture, GpuResourceManager, InstanceBuffer, create_depth_texture, draw_mesh_instance,
};
use pipeline::{PipelineCacheKey, PipelineLayouts};
use types::{CameraResources, LightResources};

/// Instances the entity buffer starts with before it has to grow.
const INITIAL_INSTANCE_CAPACITY: usize = 16;

pub struct Renderer<'a> {
    // Core GPU resources
    surface: wgpu::Surface<'a>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: (u32, u32),

    // Grouped resources
    camera_resources: CameraResources,
    lights: LightResources,
    pipelines: PipelineLayouts,
    depth: DepthTexture,
    gpu_resources: GpuResourceManager,
    instances: InstanceBuffer,
    /// Holds exactly one instance: the outline shell.
    outline_instance: InstanceBuffer,

    // Other
    shader_generator: ShaderGenerator,
    pipeline_cache: HashMap<PipelineCacheKey, wgpu::RenderPipeline>,
    outline_slot: OutlineSlot,
    stencil: StencilTracker,
}

impl<'a> Renderer<'a> {
    // Creating some of the wgpu types requires async code
    // The target parameter can be a Window or any type implementing the necessary traits
    pub async fn new<T>(target: T, width: u32, height: u32) -> Result<Renderer<'a>, RendererError>
    where
        T: Into<wgpu::SurfaceTarget<'a>>,
    {
        let size = (width.max(1), height.max(1));

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(target)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        let info = adapter.get_info();
        log::info!("Using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                label: None,
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(RendererError::NoSurfaceFormat)?;

        // Prefer Fifo (vsync) to avoid tearing, fall back to whatever is offered first
        let present_mode = surface_caps
            .present_modes
            .iter()
            .copied()
            .find(|mode| *mode == wgpu::PresentMode::Fifo)
            .or_else(|| surface_caps.present_modes.first().copied())
            .unwrap_or(wgpu::PresentMode::Fifo);
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.0,
            height: size.1,
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::info!(
            "Configured {}x{} surface with {:?}, {:?}",
            size.0,
            size.1,
            surface_format,
            present_mode
        );

        let mut camera = Camera::looking_at_origin(Point3::new(0.0, 2.0, 5.0), 45.0, 0.1, 100.0);
        camera.aspect = size.0 as f32 / size.1 as f32;
        let camera_resources = CameraResources::new(&device, camera);
        let lights = LightResources::new(&device);
        let pipelines = PipelineLayouts::new(
            &device,
            &camera_resources.bind_group_layout,
            &lights.bind_group_layout,
        );
        let depth = create_depth_texture(&device, &config, "depth_stencil_texture");
        let instances =
            InstanceBuffer::new(&device, "Entity Instance Buffer", INITIAL_INSTANCE_CAPACITY);
        let outline_instance = InstanceBuffer::new(&device, "Outline Instance Buffer", 1);
        let shader_generator = ShaderGenerator::new()?;

        let mut renderer = Self {
            surface,
            device,
            queue,
            config,
            size,
            camera_resources,
            lights,
            pipelines,
            depth,
            gpu_resources: GpuResourceManager::new(),
            instances,
            outline_instance,
            shader_generator,
            pipeline_cache: HashMap::new(),
            outline_slot: OutlineSlot::new(),
            stencil: StencilTracker::new(),
        };

        // Compile every pipeline up front so shader errors surface at startup
        for pass in FramePlan::for_selection(None)
            .into_iter()
            .chain(FramePlan::for_selection(Some(1)))
        {
            renderer.get_or_create_pipeline(PipelineCacheKey {
                kind: pass.kind,
                stencil: pass.stencil,
            })?;
        }

        Ok(renderer)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn camera(&self) -> &Camera {
        &self.camera_resources.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera_resources.camera
    }

    /// Replaces the camera, keeping the aspect ratio of the surface.
    pub fn set_camera(&mut self, camera: Camera) {
        self.camera_resources.camera = Camera {
            aspect: self.size.0 as f32 / self.size.1 as f32,
            ..camera
        };
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.size.0, self.size.1)
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Stencil mode currently in force. Outside of [`Renderer::render`] this is
    /// always [`StencilMode::Disabled`].
    pub fn stencil_mode(&self) -> StencilMode {
        self.stencil.current()
    }

    pub fn outline_slot(&self) -> &OutlineSlot {
        &self.outline_slot
    }

    pub fn resize(&mut self, new_size: (u32, u32)) {
        let (width, height) = new_size;
        if width == 0 || height == 0 {
            log::warn!("Ignoring resize to {width}x{height}");
            return;
        }
        self.size = (width, height);
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);

        self.camera_resources.camera.aspect = width as f32 / height as f32;
        self.depth = create_depth_texture(&self.device, &self.config, "depth_stencil_texture");
    }

    // =========================================================================
    // Frame
    // =========================================================================

    /// Uploads camera, lights, meshes and instances for this frame.
    fn prepare(&mut self, scene: &Scene, outline: Option<&OutlineInstance>) {
        self.camera_resources.upload(&self.queue);
        self.lights
            .upload(&self.queue, &LightsArrayUniform::from_lights(&scene.lights));

        for entity in scene.entities() {
            if let Some(mesh) = scene.get_mesh(entity.mesh) {
                self.gpu_resources.ensure_mesh(entity.mesh, mesh, &self.device);
            }
        }

        let instances: Vec<GpuInstance> = scene
            .entities()
            .iter()
            .map(|entity| {
                GpuInstance::new(
                    &entity.transform,
                    entity.material.base_color,
                    entity.material.roughness,
                )
            })
            .collect();
        self.instances.write(&self.device, &self.queue, &instances);

        if let Some(outline) = outline {
            let shell = GpuInstance::new(&outline.transform, outline.color, 1.0);
            self.outline_instance
                .write(&self.device, &self.queue, std::slice::from_ref(&shell));
        }
    }

    /// Draws one frame of `scene`, outlining the selected entity.
    ///
    /// The outline slot is synced with `selection` first, so the shell always
    /// follows the entity's current transform. The stencil mode is back to
    /// [`StencilMode::Disabled`] when this returns, also on error.
    pub fn render(&mut self, scene: &Scene, selection: &SelectionState) -> Result<()> {
        let outline = self.outline_slot.sync(selection, scene).copied();
        self.prepare(scene, outline.as_ref());

        let plan =
            FramePlan::for_selection(outline.map(|_| selection.config().stencil_reference));
        let passes = plan
            .into_iter()
            .map(|pass| {
                let key = PipelineCacheKey {
                    kind: pass.kind,
                    stencil: pass.stencil,
                };
                Ok((pass, self.get_or_create_pipeline(key)?))
            })
            .collect::<Result<Vec<_>, RendererError>>()?;

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let background = scene.background.to_linear();
        let frame = FrameResources {
            color_view: &view,
            depth_view: &self.depth.view,
            clear_color: wgpu::Color {
                r: background.r as f64,
                g: background.g as f64,
                b: background.b as f64,
                a: background.a as f64,
            },
            camera_bind_group: &self.camera_resources.bind_group,
            light_bind_group: &self.lights.bind_group,
            meshes: &self.gpu_resources,
            instances: &self.instances,
            outline_instance: &self.outline_instance,
        };

        for (pass, pipeline) in &passes {
            self.stencil.with_mode(pass.stencil, |mode| {
                frame.encode_pass(&mut encoder, pass, pipeline, mode, scene, outline.as_ref())
            })?;
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

/// Borrowed views of everything a pass needs.
struct FrameResources<'f> {
    color_view: &'f wgpu::TextureView,
    depth_view: &'f wgpu::TextureView,
    clear_color: wgpu::Color,
    camera_bind_group: &'f wgpu::BindGroup,
    light_bind_group: &'f wgpu::BindGroup,
    meshes: &'f GpuResourceManager,
    instances: &'f InstanceBuffer,
    outline_instance: &'f InstanceBuffer,
}

impl FrameResources<'_> {
    fn encode_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        pass: &PassSpec,
        pipeline: &wgpu::RenderPipeline,
        stencil: StencilMode,
        scene: &Scene,
        outline: Option<&OutlineInstance>,
    ) -> Result<()> {
        let color_load = match pass.color {
            AttachmentLoad::Clear => wgpu::LoadOp::Clear(self.clear_color),
            AttachmentLoad::Load => wgpu::LoadOp::Load,
        };
        let depth_load = match pass.depth {
            AttachmentLoad::Clear => wgpu::LoadOp::Clear(1.0),
            AttachmentLoad::Load => wgpu::LoadOp::Load,
        };
        let stencil_load = match pass.stencil_load {
            AttachmentLoad::Clear => wgpu::LoadOp::Clear(0),
            AttachmentLoad::Load => wgpu::LoadOp::Load,
        };

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(pass.label()),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: self.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: color_load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: depth_load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: Some(wgpu::Operations {
                    load: stencil_load,
                    store: wgpu::StoreOp::Store,
                }),
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        render_pass.set_pipeline(pipeline);
        render_pass.set_stencil_reference(stencil.reference());
        render_pass.set_bind_group(0, self.camera_bind_group, &[]);

        match pass.kind {
            PassKind::DepthPrime => {
                let outline = outline.ok_or_else(|| anyhow!("depth prime without an outline"))?;
                let index = instance_index(scene, outline.entity)
                    .ok_or_else(|| anyhow!("entity {} is not in the scene", outline.entity))?;
                let mesh = self.mesh(outline.mesh)?;
                draw_mesh_instance(&mut render_pass, mesh, self.instances, index);
            }
            PassKind::OutlineStencilWrite => {
                let outline = outline.ok_or_else(|| anyhow!("outline pass without an outline"))?;
                let mesh = self.mesh(outline.mesh)?;
                draw_mesh_instance(&mut render_pass, mesh, self.outline_instance, 0);
            }
            PassKind::Scene => {
                render_pass.set_bind_group(1, self.light_bind_group, &[]);
                for (index, entity) in scene.entities().iter().enumerate() {
                    let mesh = self.mesh(entity.mesh)?;
                    draw_mesh_instance(&mut render_pass, mesh, self.instances, index as u32);
                }
            }
        }

        Ok(())
    }

    fn mesh(&self, id: crate::scene::MeshId) -> Result<&gpu_resources::MeshGpuResources> {
        self.meshes
            .get_mesh(id)
            .ok_or_else(|| anyhow!("mesh {id} has no GPU buffers"))
    }
}

/// Position of `entity` in the per-frame instance buffer.
fn instance_index(scene: &Scene, entity: EntityId) -> Option<u32> {
    scene
        .entities()
        .iter()
        .position(|candidate| candidate.id == entity)
        .map(|index| index as u32)
}
