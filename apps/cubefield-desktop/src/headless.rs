use crate::scene::{Reaction, Scene};
use cubefield_input::Action;
use cubefield_kernel::{AnimationRegistry, FrameHooks, FrameInfo, FrameScheduler, ManualClock};
use cubefield_pick::HoverChange;
use cubefield_render_wgpu::grid_instances;
use glam::Vec2;
use std::convert::Infallible;
use std::time::Duration;

const FRAME_STEP: Duration = Duration::from_micros(16_667);

/// Outcome of a headless run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeadlessReport {
    pub frames: u64,
    pub hover_changes: usize,
    pub animation_failures: usize,
    pub instances_per_frame: usize,
}

/// Frame hooks with no GPU: frame data is built but not drawn, and the
/// pointer sweeps the viewport diagonally so picking runs every frame.
struct HeadlessHooks<'a> {
    scene: &'a mut Scene,
    clock: &'a ManualClock,
    total_frames: u64,
    report: HeadlessReport,
}

impl HeadlessHooks<'_> {
    fn sweep_position(&self, frame: u64) -> Vec2 {
        let viewport = self.scene.viewport();
        let t = if self.total_frames > 1 {
            frame as f32 / (self.total_frames - 1) as f32
        } else {
            0.5
        };
        Vec2::new(viewport.width() as f32, viewport.height() as f32) * t
    }
}

impl FrameHooks for HeadlessHooks<'_> {
    type Error = Infallible;

    fn update_controls(&mut self, delta: f32) {
        self.scene.update_controls(delta);
    }

    fn update_overlay(&mut self, frame: &FrameInfo) {
        self.scene.record_frame(frame);
        self.report.animation_failures += frame.animation.failed;
    }

    fn render(&mut self, frame: &FrameInfo) -> Result<(), Infallible> {
        let instances = grid_instances(&self.scene.grid()).len();
        self.report.instances_per_frame = instances;
        self.report.frames += 1;

        let pointer = self.sweep_position(frame.frame);
        if let Reaction::Hover(change) = self.scene.handle_action(Action::PointerMoved(pointer)) {
            if change != HoverChange::Unchanged {
                self.report.hover_changes += 1;
            }
        }
        self.clock.advance(FRAME_STEP);
        Ok(())
    }
}

/// Run `frames` frames on a fixed 60 Hz clock.
pub fn run(scene: &mut Scene, registry: &mut AnimationRegistry, frames: u64) -> HeadlessReport {
    let clock = ManualClock::new();
    let mut scheduler = FrameScheduler::with_clock(&clock).with_stop_handle(scene.stop_handle());
    let mut hooks = HeadlessHooks {
        scene,
        clock: &clock,
        total_frames: frames,
        report: HeadlessReport::default(),
    };
    let ran = scheduler.run(registry, &mut hooks, Some(frames));
    tracing::info!(
        frames = ran,
        hover_changes = hooks.report.hover_changes,
        "{}",
        hooks.scene.stats()
    );
    hooks.report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use cubefield_common::Viewport;
    use cubefield_kernel::StopHandle;

    fn build() -> (Scene, AnimationRegistry, StopHandle) {
        let stop = StopHandle::default();
        let config = SceneConfig {
            seed: Some(8),
            ..SceneConfig::default()
        };
        let (scene, registry) = Scene::build(&config, Viewport::new(640, 480), stop.clone()).unwrap();
        (scene, registry, stop)
    }

    #[test]
    fn runs_requested_frames() {
        let (mut scene, mut registry, _) = build();
        let report = run(&mut scene, &mut registry, 30);
        assert_eq!(report.frames, 30);
        assert_eq!(report.instances_per_frame, 1000);
        assert_eq!(report.animation_failures, 0);
        assert_eq!(scene.stats().count(), 29);
        assert_eq!(scene.last_frame().map(|f| f.frame), Some(29));
    }

    #[test]
    fn sweep_crosses_the_grid() {
        let (mut scene, mut registry, _) = build();
        let report = run(&mut scene, &mut registry, 60);
        assert!(report.hover_changes > 0);
        assert!(scene.grid().highlighted().count() <= 1);
    }

    #[test]
    fn stop_before_start_runs_nothing() {
        let (mut scene, mut registry, stop) = build();
        stop.stop();
        let report = run(&mut scene, &mut registry, 10);
        assert_eq!(report.frames, 0);
    }

    #[test]
    fn rotation_follows_the_fixed_clock() {
        let (mut scene, mut registry, _) = build();
        run(&mut scene, &mut registry, 2);
        // Second frame saw exactly one step of elapsed time.
        let elapsed = FRAME_STEP.as_secs_f64();
        let expected = cubefield_kernel::entity_rotation(glam::Vec3::splat(5.0), elapsed);
        let grid = scene.grid();
        assert_eq!(grid.entity(cubefield_common::EntityId(0)).unwrap().rotation(), expected);
    }
}
