use thiserror::Error;

/// Failures while bringing up the GPU side of the viewer. All of them are
/// fatal at startup.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("failed to create a rendering surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to open the GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("the surface reports no supported texture formats")]
    NoSurfaceFormat,
    #[error("failed to compose shader `{module}`: {message}")]
    Shader { module: String, message: String },
}
