//! Math primitives shared by the facet tessellator and tracer.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod epsilon;
mod interval;
mod ray;

pub use aabb::Aabb;
pub use epsilon::{prevent_zero, safe_normalize, scale_epsilon};
pub use interval::Interval;
pub use ray::Ray;
