//! Indexed triangle meshes produced by the tessellators.
//!
//! A mesh is an ordered vertex buffer plus an index buffer in which every
//! consecutive triple names one triangle. The tracer turns meshes into
//! intersectable triangles.

use facet_math::{safe_normalize, Aabb, Mat3, Mat4, Vec2, Vec3};

use crate::error::{GeomError, GeomResult};

/// One sampled surface point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    /// Not required to be unit length until consumed.
    pub normal: Vec3,
    pub tex_coords: Vec2,
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, tex_coords: Vec2) -> Self {
        Self {
            position,
            normal,
            tex_coords,
        }
    }
}

/// A vertex buffer with triangle indices (every 3 indices form a triangle).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    pub fn with_capacity(vertices: usize, indices: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(indices),
        }
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Checks the index buffer: length a multiple of 3, every index in range.
    pub fn validate(&self) -> GeomResult<()> {
        if self.indices.len() % 3 != 0 {
            return Err(GeomError::MalformedMesh(format!(
                "index count {} is not a multiple of 3",
                self.indices.len()
            )));
        }
        if let Some(bad) = self
            .indices
            .iter()
            .find(|&&i| i as usize >= self.vertices.len())
        {
            return Err(GeomError::MalformedMesh(format!(
                "index {} out of range for {} vertices",
                bad,
                self.vertices.len()
            )));
        }
        Ok(())
    }

    /// Iterate the triangles as vertex triples.
    ///
    /// Assumes a validated mesh; a trailing partial triple is ignored.
    pub fn triangles(&self) -> impl Iterator<Item = [Vertex; 3]> + '_ {
        self.indices.chunks_exact(3).map(|tri| {
            [
                self.vertices[tri[0] as usize],
                self.vertices[tri[1] as usize],
                self.vertices[tri[2] as usize],
            ]
        })
    }

    /// Bounding box of all vertex positions.
    pub fn bounds(&self) -> Aabb {
        Aabb::from_point_cloud(self.vertices.iter().map(|v| v.position))
    }

    /// Negate every vertex normal in place.
    pub fn reverse_normals(&mut self) {
        for vertex in &mut self.vertices {
            vertex.normal = -vertex.normal;
        }
    }

    /// Copy of the mesh placed by `matrix`.
    ///
    /// Positions are transformed as points, normals by the inverse transpose
    /// of the upper 3x3 so they stay perpendicular under non-uniform scale.
    pub fn transformed(&self, matrix: Mat4) -> Mesh {
        let normal_matrix = Mat3::from_mat4(matrix).inverse().transpose();
        let vertices = self
            .vertices
            .iter()
            .map(|v| Vertex {
                position: matrix.transform_point3(v.position),
                normal: normal_matrix * v.normal,
                tex_coords: v.tex_coords,
            })
            .collect();
        Mesh::new(vertices, self.indices.clone())
    }
}

/// Flattens a shared-vertex mesh so every triangle owns three vertices with
/// a flat face normal.
///
/// The face normal is flipped where needed to agree in sign with the
/// average of the triangle's original smooth normals, so lighting does not
/// invert regardless of winding.
pub fn polygonate(mesh: &Mesh) -> GeomResult<Mesh> {
    mesh.validate()?;

    let mut result = Mesh::with_capacity(mesh.indices.len(), mesh.indices.len());
    for (tri_index, [a, b, c]) in mesh.triangles().enumerate() {
        let face = safe_normalize((b.position - a.position).cross(c.position - a.position));
        let smooth = safe_normalize(a.normal + b.normal + c.normal);
        let normal = if face.dot(smooth) < 0.0 { -face } else { face };

        let base = (tri_index * 3) as u32;
        for (offset, vertex) in [a, b, c].into_iter().enumerate() {
            result.vertices.push(Vertex { normal, ..vertex });
            result.indices.push(base + offset as u32);
        }
    }
    Ok(result)
}
