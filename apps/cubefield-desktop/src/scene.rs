use crate::config::{ConfigError, SceneConfig};
use cubefield_common::Viewport;
use cubefield_input::Action;
use cubefield_kernel::{AnimationRegistry, EntityGrid, FrameInfo, StopHandle};
use cubefield_pick::{HighlightController, HoverChange, Picker, Raycast};
use cubefield_render::{OrbitControls, PerspectiveCamera, clamp_pixel_ratio};
use cubefield_tools::FrameStats;
use glam::{Vec2, Vec3};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::cell::{Ref, RefCell};
use std::rc::Rc;

/// What the host must do after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    None,
    Hover(HoverChange),
    /// Viewport or pixel ratio changed; resize render targets.
    Resized,
    Stopped,
}

/// Composition root: owns the grid and everything that reacts to input.
pub struct Scene {
    grid: Rc<RefCell<EntityGrid>>,
    camera: PerspectiveCamera,
    controls: OrbitControls,
    picker: Picker,
    highlight: HighlightController,
    viewport: Viewport,
    pixel_ratio: f64,
    show_overlay: bool,
    stats: FrameStats,
    last_frame: Option<FrameInfo>,
    seed: u64,
    stop: StopHandle,
}

impl Scene {
    /// Build the grid from `config` and register it for animation.
    pub fn build(
        config: &SceneConfig,
        viewport: Viewport,
        stop: StopHandle,
    ) -> Result<(Self, AnimationRegistry), ConfigError> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = SmallRng::seed_from_u64(seed);
        let grid = EntityGrid::generate(config.lattice_size, &config.palette()?, &mut rng)
            .map_err(|_| ConfigError::LatticeSize {
                size: config.lattice_size,
                max: cubefield_kernel::MAX_LATTICE_SIZE,
            })?;
        let grid = Rc::new(RefCell::new(grid));

        let mut registry = AnimationRegistry::new();
        registry.add(&grid);

        let camera = PerspectiveCamera {
            position: Vec3::from_array(config.camera_position),
            fov_y: config.fov_degrees.to_radians(),
            aspect: viewport.aspect(),
            ..PerspectiveCamera::default()
        };
        tracing::info!(
            seed,
            entities = grid.borrow().len(),
            "scene built"
        );

        let scene = Self {
            grid,
            camera,
            controls: OrbitControls::with_damping(config.damping),
            picker: Picker::new(),
            highlight: HighlightController::new(config.highlight_color, config.highlight_scale),
            viewport,
            pixel_ratio: 1.0,
            show_overlay: true,
            stats: FrameStats::default(),
            last_frame: None,
            seed,
            stop,
        };
        Ok((scene, registry))
    }

    pub fn grid(&self) -> Ref<'_, EntityGrid> {
        self.grid.borrow()
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut PerspectiveCamera {
        &mut self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn show_overlay(&self) -> bool {
        self.show_overlay
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    pub fn last_frame(&self) -> Option<&FrameInfo> {
        self.last_frame.as_ref()
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn hovered(&self) -> Option<cubefield_common::EntityId> {
        self.highlight.current()
    }

    pub fn handle_action(&mut self, action: Action) -> Reaction {
        match action {
            Action::PointerMoved(position) => Reaction::Hover(self.hover(position)),
            Action::Orbit(delta) => {
                self.controls.rotate(delta, self.viewport.height());
                Reaction::None
            }
            Action::Zoom(steps) => {
                self.controls.zoom(steps);
                Reaction::None
            }
            Action::Resized {
                viewport,
                pixel_ratio,
            } => {
                let pixel_ratio = clamp_pixel_ratio(pixel_ratio);
                if viewport == self.viewport && pixel_ratio == self.pixel_ratio {
                    return Reaction::None;
                }
                self.viewport = viewport;
                self.pixel_ratio = pixel_ratio;
                self.camera.aspect = viewport.aspect();
                Reaction::Resized
            }
            Action::ToggleOverlay => {
                self.show_overlay = !self.show_overlay;
                Reaction::None
            }
            Action::Stop => {
                self.stop.stop();
                Reaction::Stopped
            }
        }
    }

    /// Pick under `pointer` and move the highlight there.
    pub fn hover(&mut self, pointer: Vec2) -> HoverChange {
        let result = {
            let grid = self.grid.borrow();
            let targets: [&dyn Raycast; 1] = [&*grid];
            self.picker.pick(pointer, self.viewport, &self.camera, &targets)
        };
        self.highlight
            .apply_hover(&mut self.grid.borrow_mut(), result)
    }

    pub fn update_controls(&mut self, _delta: f32) {
        self.controls.update(&mut self.camera);
    }

    pub fn record_frame(&mut self, frame: &FrameInfo) {
        self.stats.record_frame(frame);
        self.last_frame = Some(*frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubefield_common::EntityId;

    fn scene() -> (Scene, AnimationRegistry, StopHandle) {
        let stop = StopHandle::default();
        let config = SceneConfig {
            seed: Some(1),
            ..SceneConfig::default()
        };
        let (scene, registry) = Scene::build(&config, Viewport::new(800, 600), stop.clone()).unwrap();
        (scene, registry, stop)
    }

    #[test]
    fn build_registers_the_grid() {
        let (scene, mut registry, _) = scene();
        assert_eq!(registry.len(), 1);
        assert_eq!(scene.grid().len(), 1000);
        assert_eq!(scene.seed(), 1);
        let report = registry.animate(0.0);
        assert_eq!(report.updated, 1);
    }

    #[test]
    fn invalid_config_fails_to_build() {
        let config = SceneConfig {
            palette: vec![],
            ..SceneConfig::default()
        };
        let result = Scene::build(&config, Viewport::new(10, 10), StopHandle::default());
        assert!(matches!(result, Err(ConfigError::EmptyPalette)));
    }

    #[test]
    fn pointer_over_center_highlights_front_cube() {
        let (mut scene, _, _) = scene();
        let reaction = scene.handle_action(Action::PointerMoved(Vec2::new(400.0, 300.0)));
        assert_eq!(reaction, Reaction::Hover(HoverChange::Entered(EntityId(0))));
        assert_eq!(scene.hovered(), Some(EntityId(0)));
        assert_eq!(scene.grid().highlighted().count(), 1);

        let reaction = scene.handle_action(Action::PointerMoved(Vec2::ZERO));
        assert_eq!(reaction, Reaction::Hover(HoverChange::Left(EntityId(0))));
        assert_eq!(scene.grid().highlighted().count(), 0);
    }

    #[test]
    fn resize_updates_aspect_once() {
        let (mut scene, _, _) = scene();
        let resize = Action::Resized {
            viewport: Viewport::new(1000, 500),
            pixel_ratio: 3.0,
        };
        assert_eq!(scene.handle_action(resize.clone()), Reaction::Resized);
        assert_eq!(scene.camera().aspect, 2.0);
        assert_eq!(scene.pixel_ratio(), 2.0);
        assert_eq!(scene.handle_action(resize), Reaction::None);
    }

    #[test]
    fn orbit_moves_the_camera() {
        let (mut scene, _, _) = scene();
        let before = scene.camera().position;
        scene.handle_action(Action::Orbit(Vec2::new(50.0, 0.0)));
        scene.update_controls(0.016);
        assert_ne!(scene.camera().position, before);
    }

    #[test]
    fn overlay_toggles_and_stop_trips_handle() {
        let (mut scene, _, stop) = scene();
        assert!(scene.show_overlay());
        scene.handle_action(Action::ToggleOverlay);
        assert!(!scene.show_overlay());

        assert_eq!(scene.handle_action(Action::Stop), Reaction::Stopped);
        assert!(stop.is_stopped());
    }
}
