//! Facet Geom - parametric surfaces and their tessellation into meshes.
//!
//! This crate provides:
//!
//! - **Surfaces**: the `(u, v) -> (position, normal)` contract plus a few
//!   elementary shapes used by scene construction
//! - **Tessellators**: regular-grid sampling with analytic, finite-difference
//!   or displaced normals, and an irregular-domain variant with row stitching
//! - **Mesh post-processing**: `polygonate`, normal reversal, placement
//!
//! # Example
//!
//! ```ignore
//! use facet_geom::{Sphere, Tessellator};
//!
//! let mesh = Tessellator::with_finite_difference_normals(16, 16)
//!     .with_surface(Box::new(Sphere::new(1.0)))
//!     .tessellate()?;
//! println!("{} triangles", mesh.triangle_count());
//! ```

pub mod bounded;
pub mod displacement;
pub mod error;
pub mod mesh;
pub mod surface;
pub mod tessellate;

// Re-export commonly used types
pub use bounded::{BoundedTessellator, VBoundsFn};
pub use displacement::{Displacement, FractalNoise};
pub use error::{GeomError, GeomResult};
pub use mesh::{polygonate, Mesh, Vertex};
pub use surface::{Helix, RectPlane, Sphere, Surface, SurfaceSample};
pub use tessellate::{NormalSource, Tessellator, DEFAULT_NORMAL_EPSILON};
