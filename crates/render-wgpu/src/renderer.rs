use crate::backend::{FrameCamera, GpuContext, GpuFrame, WgpuBackend};
use crate::base_pass::BasePass;
use crate::error::RenderError;
use crate::mesh::grid_instances;
use crate::ssao_pass::SsaoPass;
use cubefield_common::{Color, Viewport};
use cubefield_kernel::EntityGrid;
use cubefield_render::{PerspectiveCamera, RenderPipeline, SsaoParams, SurfaceSize};

#[derive(Debug, Clone, Copy)]
pub struct RendererSettings {
    pub background: Color,
    pub ssao: SsaoParams,
    /// Seed for the occlusion sample kernel.
    pub kernel_seed: u64,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            background: Color::from_hex(0xa7d2f2),
            ssao: SsaoParams::default(),
            kernel_seed: 0,
        }
    }
}

/// Base pass followed by ambient occlusion.
pub struct WgpuRenderer {
    pipeline: RenderPipeline<WgpuBackend>,
}

impl WgpuRenderer {
    pub fn new(ctx: &GpuContext, settings: RendererSettings) -> Result<Self, RenderError> {
        settings.ssao.validate()?;
        let mut pipeline = RenderPipeline::new();
        pipeline.add_pass(BasePass::new(ctx, settings.background))?;
        pipeline.add_pass(SsaoPass::new(ctx, settings.ssao, settings.kernel_seed))?;
        tracing::debug!(passes = ?pipeline.pass_labels(), "render pipeline built");
        Ok(Self { pipeline })
    }

    pub fn pass_labels(&self) -> Vec<&'static str> {
        self.pipeline.pass_labels()
    }

    pub fn size(&self) -> Option<SurfaceSize> {
        self.pipeline.size()
    }

    /// See [`RenderPipeline::resize`].
    pub fn resize(
        &mut self,
        ctx: &GpuContext,
        camera: &mut PerspectiveCamera,
        viewport: Viewport,
        device_pixel_ratio: f64,
    ) -> bool {
        self.pipeline.resize(ctx, camera, viewport, device_pixel_ratio)
    }

    /// Snapshot camera and grid into a frame that records into `target`.
    pub fn begin_frame(
        &self,
        ctx: &GpuContext,
        target: wgpu::TextureView,
        target_size: [u32; 2],
        camera: &PerspectiveCamera,
        grid: &EntityGrid,
    ) -> GpuFrame {
        let encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });
        GpuFrame {
            encoder,
            target,
            target_size,
            camera: FrameCamera::from_camera(camera),
            instances: grid_instances(grid),
        }
    }

    /// Record every pass into `frame`. The caller submits.
    pub fn render(&mut self, ctx: &GpuContext, frame: &mut GpuFrame) -> Result<(), RenderError> {
        self.pipeline.render(ctx, frame)?;
        Ok(())
    }
}
