//! Developer tooling: frame statistics and a read-only grid inspector.
//!
//! # Invariants
//! - Tools never mutate the grid.

mod inspector;
mod stats;

pub use inspector::{EntityInfo, GridInspector, GridSummary};
pub use stats::FrameStats;
