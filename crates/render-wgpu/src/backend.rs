use crate::error::RenderError;
use crate::mesh::InstanceData;
use bytemuck::{Pod, Zeroable};
use cubefield_render::{PassBackend, PerspectiveCamera, SurfaceSize};
use glam::Mat4;

pub(crate) const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
pub(crate) const NORMAL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Device handles shared by every pass.
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface_format: wgpu::TextureFormat,
}

impl GpuContext {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue, surface_format: wgpu::TextureFormat) -> Self {
        Self {
            device,
            queue,
            surface_format,
        }
    }

    /// Pick an adapter for `surface`, open a device and configure the surface
    /// at `width`×`height` physical pixels.
    pub async fn for_surface(
        instance: &wgpu::Instance,
        surface: &wgpu::Surface<'_>,
        width: u32,
        height: u32,
    ) -> Result<(Self, wgpu::SurfaceConfiguration), RenderError> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("cubefield_device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let caps = surface.get_capabilities(&adapter);
        let surface_format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first())
            .copied()
            .ok_or(RenderError::UnsupportedSurface)?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            adapter = %adapter.get_info().name,
            format = ?surface_format,
            "GPU initialized"
        );
        Ok((Self::new(device, queue, surface_format), config))
    }
}

/// Intermediate targets written by the base pass and read by later passes.
#[derive(Default)]
pub struct GBuffer {
    pub(crate) color: Option<wgpu::TextureView>,
    pub(crate) normal: Option<wgpu::TextureView>,
    pub(crate) depth: Option<wgpu::TextureView>,
    size: Option<SurfaceSize>,
}

impl GBuffer {
    pub(crate) fn allocate(&mut self, device: &wgpu::Device, size: SurfaceSize) {
        let (width, height) = (size.physical_width(), size.physical_height());
        self.color = Some(create_target(device, "gbuffer_color", COLOR_FORMAT, width, height));
        self.normal = Some(create_target(device, "gbuffer_normal", NORMAL_FORMAT, width, height));
        self.depth = Some(create_target(device, "gbuffer_depth", DEPTH_FORMAT, width, height));
        self.size = Some(size);
    }

    pub fn size(&self) -> Option<SurfaceSize> {
        self.size
    }
}

fn create_target(
    device: &wgpu::Device,
    label: &str,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}

/// Camera matrices for one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameCamera {
    pub view: Mat4,
    pub projection: Mat4,
    pub near: f32,
    pub far: f32,
}

impl FrameCamera {
    pub fn from_camera(camera: &PerspectiveCamera) -> Self {
        Self {
            view: camera.view_matrix(),
            projection: camera.projection_matrix(),
            near: camera.near,
            far: camera.far,
        }
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub(crate) struct CameraUniforms {
    view_proj: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
}

impl From<&FrameCamera> for CameraUniforms {
    fn from(camera: &FrameCamera) -> Self {
        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            view: camera.view.to_cols_array_2d(),
        }
    }
}

/// Everything passes need to record one frame.
pub struct GpuFrame {
    pub encoder: wgpu::CommandEncoder,
    /// Output target, usually the current surface texture.
    pub target: wgpu::TextureView,
    /// Output size in physical pixels.
    pub target_size: [u32; 2],
    pub camera: FrameCamera,
    pub instances: Vec<InstanceData>,
}

impl GpuFrame {
    pub fn submit(self, queue: &wgpu::Queue) {
        queue.submit(std::iter::once(self.encoder.finish()));
    }
}

/// wgpu types plugged into [`cubefield_render::RenderPipeline`].
pub enum WgpuBackend {}

impl PassBackend for WgpuBackend {
    type Context = GpuContext;
    type Attachments = GBuffer;
    type Frame = GpuFrame;
}
