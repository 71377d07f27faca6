use cubefield_render::{PipelineError, SsaoError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no compatible GPU adapter found")]
    NoAdapter,
    #[error("surface reports no supported formats")]
    UnsupportedSurface,
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("failed to open device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("invalid occlusion settings: {0}")]
    Ssao(#[from] SsaoError),
}
