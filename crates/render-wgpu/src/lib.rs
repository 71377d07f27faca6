//! wgpu backend: a base pass writing color, normals and depth, then a
//! screen-space ambient occlusion pass onto the surface.
//!
//! # Invariants
//! - Passes choose their own load operations; nothing clears implicitly.
//! - Render buffers follow the pipeline's clamped pixel ratio, not the window's.

mod backend;
mod base_pass;
mod error;
mod mesh;
mod renderer;
mod shaders;
mod ssao_pass;

pub use backend::{FrameCamera, GBuffer, GpuContext, GpuFrame, WgpuBackend};
pub use base_pass::BasePass;
pub use error::RenderError;
pub use mesh::{InstanceData, grid_instances};
pub use renderer::{RendererSettings, WgpuRenderer};
pub use ssao_pass::SsaoPass;
