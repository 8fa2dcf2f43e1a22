//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection. Normals
//! and UVs are interpolated from the mesh vertices only when a hit is shaded.

use facet_geom::Vertex;
use facet_math::{safe_normalize, Aabb, Interval, Ray, Vec2, Vec3};

use crate::scene::ModelId;

/// A world-space triangle belonging to one model.
#[derive(Debug, Clone)]
pub struct Triangle {
    vertices: [Vertex; 3],
    model: ModelId,
    bbox: Aabb,
}

impl Triangle {
    pub fn new(vertices: [Vertex; 3], model: ModelId) -> Self {
        let bbox = Aabb::from_point_cloud(vertices.iter().map(|v| v.position));
        Self {
            vertices,
            model,
            bbox,
        }
    }

    pub fn vertices(&self) -> &[Vertex; 3] {
        &self.vertices
    }

    /// Model this triangle was built from.
    pub fn model(&self) -> ModelId {
        self.model
    }

    pub fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    /// Distance along `ray` to the hit, if it lies strictly inside `ray_t`.
    pub fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        let [a, b, c] = self.positions();
        let edge1 = b - a;
        let edge2 = c - a;

        let h = ray.direction.cross(edge2);
        let det = edge1.dot(h);
        // Ray is parallel to triangle
        if det.abs() < 1e-10 {
            return None;
        }

        let f = 1.0 / det;
        let s = ray.origin - a;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * ray.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        ray_t.surrounds(t).then_some(t)
    }

    /// Unit normal from the geometric winding, `(b - a) x (c - a)`.
    pub fn face_normal(&self) -> Vec3 {
        let [a, b, c] = self.positions();
        safe_normalize((b - a).cross(c - a))
    }

    /// Interpolated vertex normal at a point on the triangle.
    pub fn normal_at(&self, point: Vec3) -> Vec3 {
        let [w0, w1, w2] = self.barycentric(point);
        let [a, b, c] = &self.vertices;
        safe_normalize(a.normal * w0 + b.normal * w1 + c.normal * w2)
    }

    /// Interpolated texture coordinate at a point on the triangle.
    pub fn uv_at(&self, point: Vec3) -> Vec2 {
        let [w0, w1, w2] = self.barycentric(point);
        let [a, b, c] = &self.vertices;
        a.tex_coords * w0 + b.tex_coords * w1 + c.tex_coords * w2
    }

    fn positions(&self) -> [Vec3; 3] {
        self.vertices.map(|v| v.position)
    }

    /// Barycentric weights of `point` projected onto the triangle's plane.
    fn barycentric(&self, point: Vec3) -> [f32; 3] {
        let [a, b, c] = self.positions();
        let v0 = b - a;
        let v1 = c - a;
        let v2 = point - a;
        let d00 = v0.dot(v0);
        let d01 = v0.dot(v1);
        let d11 = v1.dot(v1);
        let d20 = v2.dot(v0);
        let d21 = v2.dot(v1);
        let denom = d00 * d11 - d01 * d01;
        if denom.abs() <= f32::MIN_POSITIVE {
            return [1.0 / 3.0; 3];
        }
        let w1 = (d11 * d20 - d01 * d21) / denom;
        let w2 = (d00 * d21 - d01 * d20) / denom;
        [1.0 - w1 - w2, w1, w2]
    }
}
