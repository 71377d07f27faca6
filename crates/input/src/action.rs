use cubefield_common::Viewport;
use glam::Vec2;

/// A high-level action produced from host input.
///
/// The scene reacts to actions, never to raw window events, so the desktop
/// app and the headless runner drive the same code.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Pointer is now at these client coordinates (logical pixels, origin top-left).
    PointerMoved(Vec2),
    /// Orbit the camera by a drag delta in logical pixels.
    Orbit(Vec2),
    /// Zoom by wheel steps; positive moves the camera closer.
    Zoom(f32),
    /// Drawable area changed size or density.
    Resized { viewport: Viewport, pixel_ratio: f64 },
    /// Show or hide the diagnostics overlay.
    ToggleOverlay,
    /// End the frame loop.
    Stop,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resized_carries_clamped_viewport() {
        let a = Action::Resized {
            viewport: Viewport::new(0, 600),
            pixel_ratio: 2.0,
        };
        let Action::Resized { viewport, .. } = a else {
            panic!("expected resize");
        };
        assert_eq!(viewport.width(), 1);
    }

    #[test]
    fn actions_compare_by_value() {
        assert_eq!(
            Action::PointerMoved(Vec2::new(1.0, 2.0)),
            Action::PointerMoved(Vec2::new(1.0, 2.0))
        );
        assert_ne!(Action::Zoom(1.0), Action::Zoom(-1.0));
        assert!(matches!(Action::Stop, Action::Stop));
    }
}
