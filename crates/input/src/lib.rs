//! Input: host events reduced to a small shared action vocabulary.
//!
//! # Invariants
//! - The scene consumes `Action`s, never raw window-system events.
//! - NDC conversion never divides by zero (viewports are at least 1×1).

pub mod action;
pub mod pointer;

pub use action::Action;
pub use pointer::{PointerButton, PointerState, to_ndc};
