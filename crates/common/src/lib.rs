//! Shared value types for the cubefield workspace.

mod types;

pub use types::{Color, ColorParseError, EntityId, LatticeCoord, Ray, Transform, Viewport};
