//! Renderer-agnostic rendering: camera, orbit controls, and a pass pipeline
//! that composes backend passes.
//!
//! # Invariants
//! - A pass only reads attachments written by an earlier pass.
//! - Resizing with unchanged arguments reallocates nothing.
//! - The pixel ratio used for buffers never exceeds [`MAX_PIXEL_RATIO`].

pub mod camera;
pub mod pipeline;
pub mod ssao;

pub use camera::{OrbitControls, PerspectiveCamera};
pub use pipeline::{
    Attachment, MAX_PIXEL_RATIO, PassBackend, PipelineError, RenderPass, RenderPipeline,
    SurfaceSize, clamp_pixel_ratio,
};
pub use ssao::{MAX_KERNEL_SIZE, SsaoError, SsaoParams, hemisphere_kernel};
