//! Pointer picking and hover highlighting.
//!
//! # Invariants
//! - A miss is a result, never an error.
//! - After [`HighlightController::apply_hover`] at most one entity is highlighted.

pub mod highlight;
pub mod picker;

pub use highlight::{HIGHLIGHT_SCALE, HighlightController, HoverChange};
pub use picker::{
    Hit, PickResult, Picker, Raycast, intersect_aabb, intersect_oriented_box, nearest_hit,
};
