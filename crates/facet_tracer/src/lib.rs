//! Facet Tracer - offline ray tracing of tessellated scenes.
//!
//! Meshes are placed into a [`Scene`], flattened into triangles and handed
//! once to a [`Bound`] builder. The [`RayTracer`] casts camera rays through
//! the resulting hierarchy, shades hits with an ambient term plus an
//! optional directional light with hard shadows, and follows refraction
//! through transparent models with an [`InsideModelStack`].

mod bound;
mod camera;
mod error;
mod intersectable;
mod lights;
mod material;
mod scene;
mod texture;
mod tracer;
mod transparency;
mod triangle;

pub use bound::{Bound, BoundStats, TopDownOptions};
pub use camera::Camera;
pub use error::{TracerError, TracerResult};
pub use intersectable::{Group, Intersectable, ShadeablePoint};
pub use lights::{DirectionalLight, PointLight, SceneLights};
pub use material::{Material, MaterialOptions, AIR_INDEX, AIR_MATERIAL};
pub use scene::{Model, ModelId, Scene};
pub use texture::{Color, Texture};
pub use tracer::{color_to_rgb, RayTracer, TracerOptions};
pub use transparency::{reflect, refract, InsideModelStack};
pub use triangle::Triangle;

/// Re-export Vec3 and common math types from facet_math
pub use facet_math::{Aabb, Interval, Mat4, Ray, Vec2, Vec3};
