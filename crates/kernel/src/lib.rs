//! Kernel: the entity grid, the animation registry and the frame scheduler.
//!
//! # Invariants
//! - Entity rotation is a pure function of fixed position and elapsed time.
//! - Exactly one entity per lattice coordinate.
//! - The registry never owns what it animates.
//! - A stopped scheduler never runs another frame.

pub mod animation;
pub mod grid;
pub mod scheduler;

pub use animation::{Animate, AnimateError, AnimateReport, AnimationRegistry};
pub use grid::{
    CUBE_EDGE, DEFAULT_PALETTE, Entity, EntityGrid, GridError, LATTICE_SIZE, MAX_LATTICE_SIZE,
    Palette, entity_rotation, group_rotation, phase,
};
pub use scheduler::{
    Clock, FrameHooks, FrameInfo, FrameScheduler, ManualClock, SchedulerState, StopHandle,
    SystemClock, TickOutcome,
};
