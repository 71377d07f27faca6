use crate::backend::{GBuffer, GpuContext, GpuFrame, WgpuBackend};
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use cubefield_render::{
    Attachment, MAX_KERNEL_SIZE, RenderPass, SsaoParams, SurfaceSize, hemisphere_kernel,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct SsaoUniforms {
    projection: [[f32; 4]; 4],
    inverse_projection: [[f32; 4]; 4],
    kernel: [[f32; 4]; MAX_KERNEL_SIZE],
    output_size: [f32; 2],
    kernel_radius: f32,
    kernel_size: u32,
    min_distance: f32,
    max_distance: f32,
    near: f32,
    far: f32,
}

/// Darkens creases using the base pass's depth and normals and writes the
/// result to the frame target.
pub struct SsaoPass {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: Option<wgpu::BindGroup>,
    uniform_buffer: wgpu::Buffer,
    params: SsaoParams,
    kernel: [[f32; 4]; MAX_KERNEL_SIZE],
}

impl SsaoPass {
    pub fn new(ctx: &GpuContext, params: SsaoParams, seed: u64) -> Self {
        let device = &ctx.device;

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("ssao_uniforms"),
            size: std::mem::size_of::<SsaoUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let texture_entry = |binding: u32, sample_type: wgpu::TextureSampleType| {
            wgpu::BindGroupLayoutEntry {
                binding,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            }
        };
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("ssao_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                texture_entry(1, wgpu::TextureSampleType::Float { filterable: false }),
                texture_entry(2, wgpu::TextureSampleType::Float { filterable: false }),
                texture_entry(3, wgpu::TextureSampleType::Depth),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("ssao_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("ssao_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SSAO_SHADER.into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("ssao_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_fullscreen"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_ssao"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let mut rng = SmallRng::seed_from_u64(seed);
        let mut kernel = [[0.0; 4]; MAX_KERNEL_SIZE];
        for (slot, sample) in kernel
            .iter_mut()
            .zip(hemisphere_kernel(params.kernel_size, &mut rng))
        {
            *slot = sample.extend(0.0).to_array();
        }

        Self {
            pipeline,
            bind_group_layout,
            bind_group: None,
            uniform_buffer,
            params,
            kernel,
        }
    }

    pub fn params(&self) -> SsaoParams {
        self.params
    }
}

impl RenderPass<WgpuBackend> for SsaoPass {
    fn label(&self) -> &'static str {
        "ssao"
    }

    fn reads(&self) -> &[Attachment] {
        &[Attachment::Color, Attachment::Normal, Attachment::Depth]
    }

    fn resize(&mut self, ctx: &GpuContext, _size: SurfaceSize, attachments: &mut GBuffer) {
        let (Some(color), Some(normal), Some(depth)) =
            (&attachments.color, &attachments.normal, &attachments.depth)
        else {
            self.bind_group = None;
            return;
        };
        self.bind_group = Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("ssao_bind_group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(color),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(normal),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(depth),
                },
            ],
        }));
    }

    fn execute(&mut self, ctx: &GpuContext, _attachments: &GBuffer, frame: &mut GpuFrame) {
        let Some(bind_group) = &self.bind_group else {
            tracing::warn!("ssao pass skipped: no G-buffer bound");
            return;
        };

        let uniforms = SsaoUniforms {
            projection: frame.camera.projection.to_cols_array_2d(),
            inverse_projection: frame.camera.projection.inverse().to_cols_array_2d(),
            kernel: self.kernel,
            output_size: [
                frame.target_size[0].max(1) as f32,
                frame.target_size[1].max(1) as f32,
            ],
            kernel_radius: self.params.kernel_radius,
            kernel_size: self.params.kernel_size as u32,
            min_distance: self.params.min_distance,
            max_distance: self.params.max_distance,
            near: frame.camera.near,
            far: frame.camera.far,
        };
        ctx.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let mut pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("ssao_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &frame.target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            ..Default::default()
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}
