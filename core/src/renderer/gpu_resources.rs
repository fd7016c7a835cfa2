//! GPU resource management for scene objects.
//!
//! Mesh buffers are uploaded the first time a mesh is drawn and kept for the
//! life of the renderer, since meshes never change after the scene is built.
//! Per-entity instance data lives in one growable buffer that is rewritten
//! every frame.

use std::collections::HashMap;

use wgpu::util::{BufferInitDescriptor, DeviceExt};

use crate::common::RgbaColor;
use crate::scene::{Camera, Mesh, MeshId, Transform};

/// Depth-stencil format shared by every pipeline and the depth attachment.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;

/// Per-draw instance data, laid out for the instance vertex buffer.
///
/// `color` is linear. For the outline instance it carries the outline color.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuInstance {
    pub transform: [[f32; 4]; 4],
    pub normal_mat: [[f32; 3]; 3],
    pub color: [f32; 4],
    pub roughness: f32,
}

impl GpuInstance {
    pub fn new(transform: &Transform, color: RgbaColor, roughness: f32) -> Self {
        Self {
            transform: transform.to_matrix().into(),
            normal_mat: transform.normal_matrix().into(),
            color: color.to_linear().to_array(),
            roughness,
        }
    }
}

/// Camera block bound at group 0.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    /// Eye position in world space, `w` unused.
    pub eye: [f32; 4],
}

impl CameraUniform {
    pub fn from_camera(camera: &Camera) -> Self {
        Self {
            view_proj: camera.build_view_projection_matrix().into(),
            eye: [camera.eye.x, camera.eye.y, camera.eye.z, 1.0],
        }
    }
}

/// Vertex and index buffers for one mesh.
pub(crate) struct MeshGpuResources {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl MeshGpuResources {
    fn upload(mesh: &Mesh, device: &wgpu::Device) -> Self {
        let vertex_buffer = device.create_buffer_init(&BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(mesh.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: bytemuck::cast_slice(mesh.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices().len() as u32,
        }
    }
}

/// Uploaded meshes by id.
#[derive(Default)]
pub(crate) struct GpuResourceManager {
    meshes: HashMap<MeshId, MeshGpuResources>,
}

impl GpuResourceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads `mesh` unless it is already resident.
    pub fn ensure_mesh(&mut self, id: MeshId, mesh: &Mesh, device: &wgpu::Device) {
        self.meshes.entry(id).or_insert_with(|| {
            log::debug!(
                "Uploading mesh {id} ({} triangles)",
                mesh.triangle_count()
            );
            MeshGpuResources::upload(mesh, device)
        });
    }

    pub fn get_mesh(&self, id: MeshId) -> Option<&MeshGpuResources> {
        self.meshes.get(&id)
    }
}

/// Capacity, in instances, needed to hold `required` instances when the
/// buffer currently holds `current`. Grows to the next power of two.
pub(crate) fn grown_capacity(current: usize, required: usize) -> usize {
    if required <= current {
        current
    } else {
        required.next_power_of_two()
    }
}

/// A vertex buffer of [`GpuInstance`]s, rewritten in place and reallocated
/// only when it is too small.
pub(crate) struct InstanceBuffer {
    label: &'static str,
    buffer: wgpu::Buffer,
    capacity: usize,
}

impl InstanceBuffer {
    pub fn new(device: &wgpu::Device, label: &'static str, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            label,
            buffer: Self::allocate(device, label, capacity),
            capacity,
        }
    }

    fn allocate(device: &wgpu::Device, label: &str, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: (capacity * std::mem::size_of::<GpuInstance>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    pub fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, instances: &[GpuInstance]) {
        let capacity = grown_capacity(self.capacity, instances.len());
        if capacity != self.capacity {
            log::debug!("Growing {} to {capacity} instances", self.label);
            self.buffer = Self::allocate(device, self.label, capacity);
            self.capacity = capacity;
        }
        if !instances.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(instances));
        }
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

/// Binds `mesh` and instance `index` of `instances`, then draws it.
pub(crate) fn draw_mesh_instance(
    render_pass: &mut wgpu::RenderPass<'_>,
    mesh: &MeshGpuResources,
    instances: &InstanceBuffer,
    index: u32,
) {
    if mesh.index_count == 0 {
        return;
    }
    render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
    render_pass.set_vertex_buffer(1, instances.buffer().slice(..));
    render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
    render_pass.draw_indexed(0..mesh.index_count, 0, index..index + 1);
}

/// Depth-stencil attachment matching the surface size.
pub(crate) struct DepthTexture {
    _texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

pub(crate) fn create_depth_texture(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    label: &str,
) -> DepthTexture {
    let size = wgpu::Extent3d {
        width: config.width.max(1),
        height: config.height.max(1),
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    DepthTexture {
        _texture: texture,
        view,
    }
}
