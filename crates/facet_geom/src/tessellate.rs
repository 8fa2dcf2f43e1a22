//! Regular-grid tessellation of parametric surfaces.
//!
//! The `(u, v)` domain is sampled on a `u_texels x v_texels` grid. Every
//! interior grid cell becomes two triangles with a fixed winding. When the
//! surface is closed in `u` the last row is not sampled; instead the row
//! before it is stitched back to row 0.

use std::sync::Arc;

use facet_math::{safe_normalize, Vec2, Vec3};

use crate::displacement::Displacement;
use crate::error::{GeomError, GeomResult};
use crate::mesh::{Mesh, Vertex};
use crate::surface::Surface;

/// Parameter step used for finite-difference normals.
pub const DEFAULT_NORMAL_EPSILON: f32 = 1e-3;

/// How vertex normals are produced.
#[derive(Clone)]
pub enum NormalSource {
    /// Take the surface's analytic normal.
    Surface,
    /// Central differences of position at `u +- epsilon`, `v +- epsilon`.
    FiniteDifference { epsilon: f32 },
    /// Offset positions along the analytic normal, then take central
    /// differences of the displaced positions.
    Displaced {
        displacement: Arc<dyn Displacement>,
        epsilon: f32,
    },
}

/// Samples a [`Surface`] on a regular grid.
pub struct Tessellator {
    u_texels: u32,
    v_texels: u32,
    normals: NormalSource,
    surface: Option<Box<dyn Surface>>,
}

impl Tessellator {
    /// Tessellator using the surface's own normals.
    pub fn new(u_texels: u32, v_texels: u32) -> Self {
        Self {
            u_texels,
            v_texels,
            normals: NormalSource::Surface,
            surface: None,
        }
    }

    /// Tessellator estimating normals by finite differences.
    pub fn with_finite_difference_normals(u_texels: u32, v_texels: u32) -> Self {
        Self {
            normals: NormalSource::FiniteDifference {
                epsilon: DEFAULT_NORMAL_EPSILON,
            },
            ..Self::new(u_texels, v_texels)
        }
    }

    /// Tessellator pushing every sample along its normal by `displacement`.
    pub fn with_displacement(
        u_texels: u32,
        v_texels: u32,
        displacement: Arc<dyn Displacement>,
    ) -> Self {
        Self {
            normals: NormalSource::Displaced {
                displacement,
                epsilon: DEFAULT_NORMAL_EPSILON,
            },
            ..Self::new(u_texels, v_texels)
        }
    }

    /// Override the finite-difference step. No effect for analytic normals.
    pub fn with_epsilon(mut self, step: f32) -> Self {
        match &mut self.normals {
            NormalSource::Surface => {}
            NormalSource::FiniteDifference { epsilon }
            | NormalSource::Displaced { epsilon, .. } => *epsilon = step,
        }
        self
    }

    pub fn set_surface(&mut self, surface: Box<dyn Surface>) {
        self.surface = Some(surface);
    }

    pub fn with_surface(mut self, surface: Box<dyn Surface>) -> Self {
        self.set_surface(surface);
        self
    }

    /// Walk the grid and build the mesh.
    pub fn tessellate(&self) -> GeomResult<Mesh> {
        let surface = self.surface.as_deref().ok_or(GeomError::UnsetSurface)?;
        if self.u_texels == 0 || self.v_texels == 0 {
            return Err(GeomError::InvalidResolution {
                u_texels: self.u_texels,
                v_texels: self.v_texels,
            });
        }

        let closed = surface.is_closed();
        let row = self.v_texels + 1;
        let u_rows = if closed { self.u_texels } else { self.u_texels + 1 };
        let mut mesh = Mesh::with_capacity(
            (u_rows * row) as usize,
            (self.u_texels * self.v_texels * 6) as usize,
        );

        for u_ind in 0..u_rows {
            let u = u_ind as f32 / self.u_texels as f32;
            for v_ind in 0..=self.v_texels {
                let v = v_ind as f32 / self.v_texels as f32;
                mesh.vertices.push(self.vertex(surface, u, v));

                let vert_num = (mesh.vertices.len() - 1) as u32;
                let expected = u_ind * row + v_ind;
                if vert_num != expected {
                    return Err(GeomError::GridIndexMismatch {
                        expected,
                        actual: vert_num,
                    });
                }

                if u_ind != 0 && v_ind != 0 {
                    mesh.indices.extend_from_slice(&[
                        vert_num,
                        vert_num - row,
                        vert_num - row - 1,
                        vert_num,
                        vert_num - row - 1,
                        vert_num - 1,
                    ]);

                    // Row 0 plays the part of row `u_texels`.
                    if closed && u_ind == self.u_texels - 1 {
                        mesh.indices.extend_from_slice(&[
                            v_ind,
                            vert_num,
                            vert_num - 1,
                            v_ind,
                            vert_num - 1,
                            v_ind - 1,
                        ]);
                    }
                }
            }
        }

        log::debug!(
            "Tessellated {}x{} grid{}: {} vertices, {} triangles",
            self.u_texels,
            self.v_texels,
            if closed { " (closed)" } else { "" },
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        Ok(mesh)
    }

    fn vertex(&self, surface: &dyn Surface, u: f32, v: f32) -> Vertex {
        let tex_coords = Vec2::new(u, v);
        match &self.normals {
            NormalSource::Surface => {
                let sample = surface.sample(u, v);
                Vertex::new(sample.position, sample.normal, tex_coords)
            }
            NormalSource::FiniteDifference { epsilon } => {
                let position = surface.sample(u, v).position;
                let normal =
                    finite_difference_normal(|u, v| surface.sample(u, v).position, u, v, *epsilon);
                Vertex::new(position, normal, tex_coords)
            }
            NormalSource::Displaced {
                displacement,
                epsilon,
            } => {
                let displaced = |u: f32, v: f32| {
                    let sample = surface.sample(u, v);
                    sample.position + sample.normal * displacement.displacement(u, v)
                };
                let normal = finite_difference_normal(&displaced, u, v, *epsilon);
                Vertex::new(displaced(u, v), normal, tex_coords)
            }
        }
    }
}

/// Normal of `position(u, v)` from central differences, clamped to the unit
/// square. Oriented like `dP/dv x dP/du`.
pub(crate) fn finite_difference_normal<F>(position: F, u: f32, v: f32, epsilon: f32) -> Vec3
where
    F: Fn(f32, f32) -> Vec3,
{
    let u_up = (u + epsilon).min(1.0);
    let u_down = (u - epsilon).max(0.0);
    let v_up = (v + epsilon).min(1.0);
    let v_down = (v - epsilon).max(0.0);

    let u_diff = position(u_up, v) - position(u_down, v);
    let v_diff = position(u, v_up) - position(u, v_down);
    safe_normalize(v_diff.cross(u_diff))
}
