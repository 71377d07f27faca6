use crate::scene::{Reaction, Scene};
use anyhow::{Context as _, Result};
use cubefield_common::Viewport;
use cubefield_input::{Action, PointerButton, PointerState};
use cubefield_kernel::{AnimationRegistry, FrameHooks, FrameInfo, FrameScheduler, TickOutcome};
use cubefield_render_wgpu::{GpuContext, GpuFrame, RenderError, RendererSettings, WgpuRenderer};
use cubefield_tools::GridInspector;
use egui::Context as EguiContext;
use glam::Vec2;
use std::sync::Arc;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalPosition, LogicalSize};
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

/// Window, surface and everything drawn into it.
struct GpuState {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    ctx: GpuContext,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl GpuState {
    fn new(
        event_loop: &ActiveEventLoop,
        initial: Viewport,
        settings: RendererSettings,
        egui_ctx: &EguiContext,
    ) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("cubefield")
            .with_inner_size(LogicalSize::new(initial.width(), initial.height()));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window.clone())
            .map_err(RenderError::from)?;

        let size = window.inner_size();
        let (ctx, config) = pollster::block_on(GpuContext::for_surface(
            &instance,
            &surface,
            size.width,
            size.height,
        ))?;
        let renderer = WgpuRenderer::new(&ctx, settings)?;

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&ctx.device, ctx.surface_format, None, 1, false);

        Ok(Self {
            window,
            surface,
            ctx,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    /// Match the surface to the window's physical size.
    fn configure_surface(&mut self) {
        let size = self.window.inner_size();
        let (width, height) = (size.width.max(1), size.height.max(1));
        if (width, height) == (self.config.width, self.config.height) {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.ctx.device, &self.config);
    }

    fn resize_pipeline(&mut self, scene: &mut Scene) {
        let viewport = scene.viewport();
        let ratio = scene.pixel_ratio();
        self.renderer
            .resize(&self.ctx, scene.camera_mut(), viewport, ratio);
    }

    fn logical_viewport(&self) -> (Viewport, f64) {
        let scale = self.window.scale_factor();
        let logical: LogicalSize<u32> = self.window.inner_size().to_logical(scale);
        (Viewport::new(logical.width, logical.height), scale)
    }
}

/// Hooks run by the scheduler on every redraw.
struct GpuHooks<'a> {
    scene: &'a mut Scene,
    gpu: &'a mut GpuState,
    egui_ctx: &'a EguiContext,
}

impl FrameHooks for GpuHooks<'_> {
    type Error = RenderError;

    fn update_controls(&mut self, delta: f32) {
        self.scene.update_controls(delta);
    }

    fn update_overlay(&mut self, frame: &FrameInfo) {
        self.scene.record_frame(frame);
    }

    fn render(&mut self, _frame: &FrameInfo) -> Result<(), RenderError> {
        let gpu = &mut *self.gpu;
        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::debug!("surface lost or outdated, reconfiguring");
                gpu.surface.configure(&gpu.ctx.device, &gpu.config);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut frame = {
            let grid = self.scene.grid();
            gpu.renderer.begin_frame(
                &gpu.ctx,
                view,
                [gpu.config.width, gpu.config.height],
                self.scene.camera(),
                &grid,
            )
        };
        gpu.renderer.render(&gpu.ctx, &mut frame)?;
        paint_overlay(gpu, self.egui_ctx, self.scene, &mut frame);

        frame.submit(&gpu.ctx.queue);
        output.present();
        Ok(())
    }
}

fn paint_overlay(gpu: &mut GpuState, egui_ctx: &EguiContext, scene: &Scene, frame: &mut GpuFrame) {
    let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
    let full_output = egui_ctx.run(raw_input, |ctx| draw_overlay(ctx, scene));
    gpu.egui_winit
        .handle_platform_output(&gpu.window, full_output.platform_output);

    let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
    let screen_descriptor = egui_wgpu::ScreenDescriptor {
        size_in_pixels: [gpu.config.width, gpu.config.height],
        pixels_per_point: full_output.pixels_per_point,
    };

    for (id, image_delta) in &full_output.textures_delta.set {
        gpu.egui_renderer
            .update_texture(&gpu.ctx.device, &gpu.ctx.queue, *id, image_delta);
    }
    gpu.egui_renderer.update_buffers(
        &gpu.ctx.device,
        &gpu.ctx.queue,
        &mut frame.encoder,
        &paint_jobs,
        &screen_descriptor,
    );
    {
        let mut pass = frame
            .encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            })
            .forget_lifetime();
        gpu.egui_renderer
            .render(&mut pass, &paint_jobs, &screen_descriptor);
    }
    for id in &full_output.textures_delta.free {
        gpu.egui_renderer.free_texture(id);
    }
}

fn draw_overlay(ctx: &EguiContext, scene: &Scene) {
    if !scene.show_overlay() {
        return;
    }
    let grid = scene.grid();
    let summary = GridInspector::summary(&grid);

    egui::Window::new("Diagnostics")
        .anchor(egui::Align2::LEFT_TOP, [8.0, 8.0])
        .resizable(false)
        .collapsible(false)
        .show(ctx, |ui| {
            ui.label(scene.stats().to_string());
            if let Some(frame) = scene.last_frame() {
                ui.label(format!("Frame {}  t={:.2}s", frame.frame, frame.elapsed));
            }
            ui.label(format!("Seed: {}", scene.seed()));
            ui.label(summary.to_string());
            ui.separator();

            for (color, count) in &summary.palette_histogram {
                let hex = color.to_hex();
                let swatch = egui::Color32::from_rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8);
                ui.horizontal(|ui| {
                    ui.colored_label(swatch, "■");
                    ui.label(format!("{color} × {count}"));
                });
            }

            if let Some(info) = scene
                .hovered()
                .and_then(|id| GridInspector::inspect_entity(&grid, id))
            {
                ui.separator();
                ui.label(info.to_string());
            }

            ui.separator();
            ui.small("F1: overlay | drag: orbit | wheel: zoom | Esc: quit");
        });
}

fn pointer_button(button: MouseButton) -> PointerButton {
    match button {
        MouseButton::Left => PointerButton::Primary,
        MouseButton::Right => PointerButton::Secondary,
        _ => PointerButton::Other,
    }
}

struct CubefieldApp {
    scene: Scene,
    registry: AnimationRegistry,
    scheduler: FrameScheduler,
    pointer: PointerState,
    settings: RendererSettings,
    initial: Viewport,
    max_frames: Option<u64>,
    egui_ctx: EguiContext,
    gpu: Option<GpuState>,
    fatal: Option<anyhow::Error>,
}

impl CubefieldApp {
    fn dispatch(&mut self, action: Action, event_loop: &ActiveEventLoop) {
        match self.scene.handle_action(action) {
            Reaction::Resized => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize_pipeline(&mut self.scene);
                }
            }
            Reaction::Stopped => event_loop.exit(),
            Reaction::Hover(_) | Reaction::None => {}
        }
    }

    fn sync_viewport(&mut self, event_loop: &ActiveEventLoop) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };
        gpu.configure_surface();
        let (viewport, pixel_ratio) = gpu.logical_viewport();
        self.dispatch(
            Action::Resized {
                viewport,
                pixel_ratio,
            },
            event_loop,
        );
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        if self
            .max_frames
            .is_some_and(|max| self.scheduler.frames() >= max)
        {
            self.dispatch(Action::Stop, event_loop);
        }

        let Some(gpu) = &mut self.gpu else {
            return;
        };
        let mut hooks = GpuHooks {
            scene: &mut self.scene,
            gpu,
            egui_ctx: &self.egui_ctx,
        };
        match self.scheduler.tick(&mut self.registry, &mut hooks) {
            TickOutcome::Continue(_) => hooks.gpu.window.request_redraw(),
            TickOutcome::Stopped => event_loop.exit(),
        }
    }
}

impl ApplicationHandler for CubefieldApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match GpuState::new(event_loop, self.initial, self.settings, &self.egui_ctx) {
            Ok(gpu) => {
                self.gpu = Some(gpu);
                self.sync_viewport(event_loop);
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize_pipeline(&mut self.scene);
                    gpu.window.request_redraw();
                }
            }
            Err(e) => {
                tracing::error!("initialization failed: {e:#}");
                self.fatal = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };
        if gpu.egui_winit.on_window_event(&gpu.window, &event).consumed {
            return;
        }
        let scale = gpu.window.scale_factor();

        match event {
            WindowEvent::CloseRequested => self.dispatch(Action::Stop, event_loop),
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                self.sync_viewport(event_loop);
            }
            WindowEvent::CursorMoved { position, .. } => {
                let logical: LogicalPosition<f32> = position.to_logical(scale);
                for action in self.pointer.moved(Vec2::new(logical.x, logical.y)) {
                    self.dispatch(action, event_loop);
                }
            }
            WindowEvent::CursorLeft { .. } => self.pointer.left(),
            WindowEvent::MouseInput { state, button, .. } => {
                self.pointer
                    .button(pointer_button(button), state == ElementState::Pressed);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => (p.y / 50.0) as f32,
                };
                self.dispatch(Action::Zoom(steps), event_loop);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => match key {
                KeyCode::Escape => self.dispatch(Action::Stop, event_loop),
                KeyCode::F1 => self.dispatch(Action::ToggleOverlay, event_loop),
                _ => {}
            },
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}

/// Open a window and run until closed, stopped or `max_frames` is reached.
pub fn run(
    scene: Scene,
    registry: AnimationRegistry,
    settings: RendererSettings,
    initial: Viewport,
    max_frames: Option<u64>,
) -> Result<()> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let scheduler = FrameScheduler::new().with_stop_handle(scene.stop_handle());
    let mut app = CubefieldApp {
        scene,
        registry,
        scheduler,
        pointer: PointerState::new(),
        settings,
        initial,
        max_frames,
        egui_ctx: EguiContext::default(),
        gpu: None,
        fatal: None,
    };
    event_loop.run_app(&mut app)?;

    if let Some(e) = app.fatal.take() {
        return Err(e);
    }
    tracing::info!(frames = app.scheduler.frames(), "{}", app.scene.stats());
    Ok(())
}
