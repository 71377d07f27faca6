use crate::camera::PerspectiveCamera;
use cubefield_common::Viewport;
use thiserror::Error;

/// Upper bound on the device pixel ratio used for render buffers.
pub const MAX_PIXEL_RATIO: f64 = 2.0;

/// Intermediate targets passes exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attachment {
    Color,
    Normal,
    Depth,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("pass `{pass}` reads {attachment:?}, which no earlier pass writes")]
    MissingInput {
        pass: &'static str,
        attachment: Attachment,
    },
    #[error("pipeline has no passes")]
    Empty,
    #[error("pipeline rendered before its first resize")]
    NotSized,
}

/// Clamp a device pixel ratio into `(0, MAX_PIXEL_RATIO]`; garbage becomes 1.
pub fn clamp_pixel_ratio(device_pixel_ratio: f64) -> f64 {
    if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
        device_pixel_ratio.min(MAX_PIXEL_RATIO)
    } else {
        1.0
    }
}

/// Logical drawable size plus the clamped pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f64,
}

impl SurfaceSize {
    pub fn new(viewport: Viewport, device_pixel_ratio: f64) -> Self {
        Self {
            width: viewport.width(),
            height: viewport.height(),
            pixel_ratio: clamp_pixel_ratio(device_pixel_ratio),
        }
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }

    pub fn physical_width(&self) -> u32 {
        scale_dimension(self.width, self.pixel_ratio)
    }

    pub fn physical_height(&self) -> u32 {
        scale_dimension(self.height, self.pixel_ratio)
    }
}

fn scale_dimension(logical: u32, ratio: f64) -> u32 {
    ((logical as f64 * ratio).round() as u32).max(1)
}

/// Types a backend plugs into the pipeline.
pub trait PassBackend {
    /// Device handles shared by every pass.
    type Context;
    /// Targets passes exchange; owned by the pipeline, rebuilt on resize.
    type Attachments: Default;
    /// Per-frame state such as a command encoder and the output target.
    type Frame;
}

/// One stage of a [`RenderPipeline`].
pub trait RenderPass<B: PassBackend> {
    fn label(&self) -> &'static str;

    fn reads(&self) -> &[Attachment] {
        &[]
    }

    fn writes(&self) -> &[Attachment] {
        &[]
    }

    /// Reallocate size-dependent resources. Earlier passes have already
    /// resized, so attachments they write are current.
    fn resize(&mut self, ctx: &B::Context, size: SurfaceSize, attachments: &mut B::Attachments);

    fn execute(&mut self, ctx: &B::Context, attachments: &B::Attachments, frame: &mut B::Frame);
}

/// Ordered list of passes producing one frame.
pub struct RenderPipeline<B: PassBackend> {
    passes: Vec<Box<dyn RenderPass<B>>>,
    attachments: B::Attachments,
    size: Option<SurfaceSize>,
}

impl<B: PassBackend> Default for RenderPipeline<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: PassBackend> RenderPipeline<B> {
    pub fn new() -> Self {
        Self {
            passes: Vec::new(),
            attachments: B::Attachments::default(),
            size: None,
        }
    }

    /// Append a pass. Every attachment it reads must be written by an
    /// earlier pass. Adding a pass forces the next resize to reallocate.
    pub fn add_pass(&mut self, pass: impl RenderPass<B> + 'static) -> Result<(), PipelineError> {
        for &attachment in pass.reads() {
            let written = self
                .passes
                .iter()
                .any(|earlier| earlier.writes().contains(&attachment));
            if !written {
                return Err(PipelineError::MissingInput {
                    pass: pass.label(),
                    attachment,
                });
            }
        }
        tracing::debug!(pass = pass.label(), index = self.passes.len(), "pass added");
        self.passes.push(Box::new(pass));
        self.size = None;
        Ok(())
    }

    pub fn pass_labels(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.label()).collect()
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    pub fn size(&self) -> Option<SurfaceSize> {
        self.size
    }

    pub fn attachments(&self) -> &B::Attachments {
        &self.attachments
    }

    /// Set the camera aspect and resize every pass in order.
    ///
    /// Returns `false` when the clamped size equals the current one; nothing
    /// is reallocated in that case.
    pub fn resize(
        &mut self,
        ctx: &B::Context,
        camera: &mut PerspectiveCamera,
        viewport: Viewport,
        device_pixel_ratio: f64,
    ) -> bool {
        let size = SurfaceSize::new(viewport, device_pixel_ratio);
        camera.aspect = size.viewport().aspect();
        if self.size == Some(size) {
            return false;
        }

        let _span = tracing::debug_span!("resize", width = size.width, height = size.height)
            .entered();
        for pass in &mut self.passes {
            pass.resize(ctx, size, &mut self.attachments);
        }
        self.size = Some(size);
        tracing::debug!(
            physical_width = size.physical_width(),
            physical_height = size.physical_height(),
            pixel_ratio = size.pixel_ratio,
            "pipeline resized"
        );
        true
    }

    /// Execute every pass in order.
    pub fn render(&mut self, ctx: &B::Context, frame: &mut B::Frame) -> Result<(), PipelineError> {
        if self.passes.is_empty() {
            return Err(PipelineError::Empty);
        }
        if self.size.is_none() {
            return Err(PipelineError::NotSized);
        }
        for pass in &mut self.passes {
            pass.execute(ctx, &self.attachments, frame);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Mock;

    impl PassBackend for Mock {
        type Context = ();
        type Attachments = Vec<(&'static str, u32, u32)>;
        type Frame = Vec<&'static str>;
    }

    struct FakePass {
        label: &'static str,
        reads: &'static [Attachment],
        writes: &'static [Attachment],
    }

    impl RenderPass<Mock> for FakePass {
        fn label(&self) -> &'static str {
            self.label
        }

        fn reads(&self) -> &[Attachment] {
            self.reads
        }

        fn writes(&self) -> &[Attachment] {
            self.writes
        }

        fn resize(&mut self, _: &(), size: SurfaceSize, attachments: &mut Vec<(&'static str, u32, u32)>) {
            attachments.push((self.label, size.physical_width(), size.physical_height()));
        }

        fn execute(&mut self, _: &(), _: &Vec<(&'static str, u32, u32)>, frame: &mut Vec<&'static str>) {
            frame.push(self.label);
        }
    }

    fn base() -> FakePass {
        FakePass {
            label: "base",
            reads: &[],
            writes: &[Attachment::Color, Attachment::Normal, Attachment::Depth],
        }
    }

    fn ssao() -> FakePass {
        FakePass {
            label: "ssao",
            reads: &[Attachment::Color, Attachment::Normal, Attachment::Depth],
            writes: &[],
        }
    }

    fn pipeline() -> RenderPipeline<Mock> {
        let mut p = RenderPipeline::new();
        p.add_pass(base()).unwrap();
        p.add_pass(ssao()).unwrap();
        p
    }

    #[test]
    fn occlusion_before_base_is_rejected() {
        let mut p = RenderPipeline::<Mock>::new();
        let err = p.add_pass(ssao()).unwrap_err();
        assert!(matches!(err, PipelineError::MissingInput { pass: "ssao", .. }));
        assert!(p.is_empty());
    }

    #[test]
    fn resize_sets_aspect_and_buffer_size() {
        let mut p = pipeline();
        let mut cam = PerspectiveCamera::default();
        assert!(p.resize(&(), &mut cam, Viewport::new(800, 600), 1.0));
        assert_eq!(cam.aspect, 800.0 / 600.0);
        assert_eq!(p.attachments(), &vec![("base", 800, 600), ("ssao", 800, 600)]);
    }

    #[test]
    fn repeated_resize_is_a_no_op() {
        let mut p = pipeline();
        let mut cam = PerspectiveCamera::default();
        p.resize(&(), &mut cam, Viewport::new(800, 600), 1.0);
        assert!(!p.resize(&(), &mut cam, Viewport::new(800, 600), 1.0));
        assert_eq!(p.attachments().len(), 2);
        assert_eq!(cam.aspect, 800.0 / 600.0);
    }

    #[test]
    fn pixel_ratio_is_clamped() {
        let mut p = pipeline();
        let mut cam = PerspectiveCamera::default();
        p.resize(&(), &mut cam, Viewport::new(100, 50), 3.0);
        let size = p.size().unwrap();
        assert_eq!(size.pixel_ratio, MAX_PIXEL_RATIO);
        assert_eq!((size.physical_width(), size.physical_height()), (200, 100));

        assert_eq!(clamp_pixel_ratio(0.0), 1.0);
        assert_eq!(clamp_pixel_ratio(f64::NAN), 1.0);
        assert_eq!(clamp_pixel_ratio(1.5), 1.5);
    }

    #[test]
    fn degenerate_viewport_clamps_to_one() {
        let mut p = pipeline();
        let mut cam = PerspectiveCamera::default();
        p.resize(&(), &mut cam, Viewport::new(0, 0), 1.0);
        assert_eq!(cam.aspect, 1.0);
        assert_eq!(p.attachments()[0], ("base", 1, 1));
    }

    #[test]
    fn render_runs_passes_in_order() {
        let mut p = pipeline();
        let mut cam = PerspectiveCamera::default();
        let mut frame = Vec::new();
        assert_eq!(p.render(&(), &mut frame), Err(PipelineError::NotSized));

        p.resize(&(), &mut cam, Viewport::new(10, 10), 1.0);
        p.render(&(), &mut frame).unwrap();
        assert_eq!(frame, vec!["base", "ssao"]);
        assert_eq!(p.pass_labels(), vec!["base", "ssao"]);
    }

    #[test]
    fn empty_pipeline_cannot_render() {
        let mut p = RenderPipeline::<Mock>::new();
        let mut frame = Vec::new();
        assert_eq!(p.render(&(), &mut frame), Err(PipelineError::Empty));
    }

    #[test]
    fn adding_a_pass_forces_reallocation() {
        let mut p = RenderPipeline::<Mock>::new();
        let mut cam = PerspectiveCamera::default();
        p.add_pass(base()).unwrap();
        p.resize(&(), &mut cam, Viewport::new(10, 10), 1.0);
        p.add_pass(ssao()).unwrap();
        assert!(p.size().is_none());
        assert!(p.resize(&(), &mut cam, Viewport::new(10, 10), 1.0));
    }
}
