use crate::action::Action;
use cubefield_common::Viewport;
use glam::Vec2;

/// Map client coordinates to normalized device coordinates in `[-1, 1]²`,
/// +Y up: `x' = x/w*2 - 1`, `y' = -(y/h)*2 + 1`.
pub fn to_ndc(pointer: Vec2, viewport: Viewport) -> Vec2 {
    Vec2::new(
        pointer.x / viewport.width() as f32 * 2.0 - 1.0,
        -(pointer.y / viewport.height() as f32) * 2.0 + 1.0,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Other,
}

/// Tracks cursor position and primary-button drags.
#[derive(Debug, Clone, Default)]
pub struct PointerState {
    position: Option<Vec2>,
    dragging: bool,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Option<Vec2> {
        self.position
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Cursor moved. Always yields `PointerMoved`; while dragging, an `Orbit`
    /// with the movement delta comes first.
    pub fn moved(&mut self, position: Vec2) -> Vec<Action> {
        let mut actions = Vec::with_capacity(2);
        if self.dragging {
            if let Some(last) = self.position {
                let delta = position - last;
                if delta != Vec2::ZERO {
                    actions.push(Action::Orbit(delta));
                }
            }
        }
        self.position = Some(position);
        actions.push(Action::PointerMoved(position));
        actions
    }

    pub fn button(&mut self, button: PointerButton, pressed: bool) {
        if button == PointerButton::Primary && self.dragging != pressed {
            self.dragging = pressed;
            tracing::trace!(dragging = pressed, "pointer drag state changed");
        }
    }

    /// Cursor left the drawable area; drags end there.
    pub fn left(&mut self) {
        self.position = None;
        self.dragging = false;
    }
}
