//! Tessellation of irregular `(u, v)` domains.
//!
//! Each `u` row samples only the `v` range reported by a bounds function,
//! so neighbouring rows can hold different vertex counts. Rows are joined
//! by walking both with a cursor: every new vertex closes a triangle with
//! its predecessor and the nearest unmatched vertex of the previous row,
//! then fans over every previous-row vertex whose `v` it has passed.

use facet_math::{Vec2, Vec3};

use crate::error::{GeomError, GeomResult};
use crate::mesh::{Mesh, Vertex};
use crate::surface::Surface;

/// `v` range to sample for a given `u`, or `None` for a row with no geometry.
///
/// The legacy `(-1, -1)` pair is also read as an empty row. Ranges reaching
/// outside `[0, 1]` are clamped to it.
pub type VBoundsFn = Box<dyn Fn(f32) -> Option<(f32, f32)> + Send + Sync>;

/// Sample counts within this distance of an integer are rounded down, so
/// float noise in `span * texels` does not add a duplicate clamped sample.
const COUNT_TOLERANCE: f32 = 1e-4;

/// Bounds pair that older bounds functions return for a row with no geometry.
const EMPTY_ROW: (f32, f32) = (-1.0, -1.0);

/// Samples a [`Surface`] over `[u_min, u_max]` with per-row `v` bounds.
pub struct BoundedTessellator {
    u_texels: u32,
    v_texels: u32,
    u_min: f32,
    u_max: f32,
    bounds: VBoundsFn,
    reverse_normals: bool,
    surface: Option<Box<dyn Surface>>,
}

impl BoundedTessellator {
    /// `u_texels`/`v_texels` give the sample spacing over a full unit of
    /// parameter, not the number of samples in the bounded range.
    pub fn new(u_texels: u32, v_texels: u32, u_min: f32, u_max: f32, bounds: VBoundsFn) -> Self {
        Self {
            u_texels,
            v_texels,
            u_min,
            u_max,
            bounds,
            reverse_normals: false,
            surface: None,
        }
    }

    /// Negate the surface normals, for shapes seen from the inside.
    pub fn with_reversed_normals(mut self) -> Self {
        self.reverse_normals = true;
        self
    }

    pub fn set_surface(&mut self, surface: Box<dyn Surface>) {
        self.surface = Some(surface);
    }

    pub fn with_surface(mut self, surface: Box<dyn Surface>) -> Self {
        self.set_surface(surface);
        self
    }

    pub fn tessellate(&self) -> GeomResult<Mesh> {
        let surface = self.surface.as_deref().ok_or(GeomError::UnsetSurface)?;
        if self.u_texels == 0 || self.v_texels == 0 {
            return Err(GeomError::InvalidResolution {
                u_texels: self.u_texels,
                v_texels: self.v_texels,
            });
        }

        let u_step = 1.0 / self.u_texels as f32;
        let v_step = 1.0 / self.v_texels as f32;
        let mut mesh = Mesh::default();
        let mut skipped = 0;
        // (v, vertex index) of the previous row with geometry
        let mut previous: Vec<(f32, u32)> = Vec::new();

        for u_ind in 0..sample_count(self.u_max - self.u_min, self.u_texels) {
            let u = (self.u_min + u_ind as f32 * u_step).min(self.u_max);
            let Some((v_min, v_max)) = row_bounds((self.bounds)(u), u) else {
                previous.clear();
                continue;
            };

            let v_samples = sample_count(v_max - v_min, self.v_texels);
            let mut current = Vec::with_capacity(v_samples as usize);
            let mut cursor = 0;

            for v_ind in 0..v_samples {
                let v = (v_min + v_ind as f32 * v_step).min(v_max);
                let sample = surface.sample(u, v);
                let normal = if self.reverse_normals {
                    -sample.normal
                } else {
                    sample.normal
                };
                mesh.vertices.push(Vertex::new(sample.position, normal, Vec2::new(u, v)));
                let vert_num = (mesh.vertices.len() - 1) as u32;
                current.push((v, vert_num));

                if v_ind == 0 || previous.is_empty() {
                    continue;
                }
                // Past the end of the previous row everything fans from its last vertex.
                let across = previous[cursor.min(previous.len() - 1)].1;
                skipped += push_triangle(&mut mesh, [vert_num, across, vert_num - 1]);
                cursor = fan_previous_row(&mut mesh, &previous, cursor, vert_num, v, &mut skipped);
            }

            // Close off whatever is left of the previous row.
            let last = (mesh.vertices.len() - 1) as u32;
            fan_previous_row(&mut mesh, &previous, cursor, last, f32::INFINITY, &mut skipped);
            previous = current;
        }

        if skipped > 0 {
            log::debug!("Skipped {skipped} degenerate triangles in bounded tessellation");
        }
        Ok(mesh)
    }
}

/// Validates a row's `v` range. `None` means the row has no geometry.
fn row_bounds(bounds: Option<(f32, f32)>, u: f32) -> Option<(f32, f32)> {
    let (lo, hi) = bounds?;
    if lo == EMPTY_ROW.0 && hi == EMPTY_ROW.1 {
        return None;
    }
    if lo.is_nan() || hi.is_nan() || lo > hi {
        log::warn!("Inverted v bounds ({lo}, {hi}) at u = {u}, treating row as empty");
        return None;
    }
    if hi < 0.0 || lo > 1.0 {
        log::warn!("v bounds ({lo}, {hi}) at u = {u} lie outside [0, 1], treating row as empty");
        return None;
    }
    if lo < 0.0 || hi > 1.0 {
        log::warn!("v bounds ({lo}, {hi}) at u = {u} reach outside [0, 1], clamping");
    }
    Some((lo.max(0.0), hi.min(1.0)))
}

/// Number of samples needed to cover `span` at `texels` per unit, both ends included.
fn sample_count(span: f32, texels: u32) -> u32 {
    (span * texels as f32 + 1.0 - COUNT_TOLERANCE).ceil().max(0.0) as u32
}

/// Emits `(apex, previous[i + 1], previous[i])` for every previous-row vertex
/// from `cursor` whose `v` is `<= up_to`. Returns the advanced cursor.
fn fan_previous_row(
    mesh: &mut Mesh,
    previous: &[(f32, u32)],
    mut cursor: usize,
    apex: u32,
    up_to: f32,
    skipped: &mut usize,
) -> usize {
    while cursor + 1 < previous.len() && previous[cursor].0 <= up_to {
        *skipped += push_triangle(mesh, [apex, previous[cursor + 1].1, previous[cursor].1]);
        cursor += 1;
    }
    cursor
}

/// Appends the triangle unless it has zero area. Returns 1 when skipped.
fn push_triangle(mesh: &mut Mesh, tri: [u32; 3]) -> usize {
    let p = |i: u32| mesh.vertices[i as usize].position;
    if is_degenerate(p(tri[0]), p(tri[1]), p(tri[2])) {
        return 1;
    }
    mesh.indices.extend_from_slice(&tri);
    0
}

fn is_degenerate(a: Vec3, b: Vec3, c: Vec3) -> bool {
    let ab = b - a;
    let ac = c - a;
    let scale = ab.length_squared().max(ac.length_squared());
    ab.cross(ac).length_squared() <= (1e-6 * scale).powi(2)
}
