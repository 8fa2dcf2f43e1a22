//! Anything a ray can be tested against.

use facet_math::{Aabb, Interval, Ray, Vec2, Vec3};

use crate::material::Material;
use crate::scene::{ModelId, Scene};
use crate::triangle::Triangle;

/// A ray hit. Normal and UV are computed on demand when the hit is shaded.
#[derive(Debug, Clone, Copy)]
pub struct ShadeablePoint<'a> {
    pub point: Vec3,
    /// Ray parameter of the hit.
    pub distance: f32,
    pub shape: &'a Triangle,
}

impl<'a> ShadeablePoint<'a> {
    pub fn model(&self) -> ModelId {
        self.shape.model()
    }

    pub fn normal(&self) -> Vec3 {
        self.shape.normal_at(self.point)
    }

    pub fn uv(&self) -> Vec2 {
        self.shape.uv_at(self.point)
    }
}

#[derive(Debug, Clone)]
pub enum Intersectable {
    Triangle(Triangle),
    Group(Group),
}

/// Primitives tested together behind one shared bounding box. Members may
/// come from different models.
#[derive(Debug, Clone)]
pub struct Group {
    members: Vec<Intersectable>,
    bbox: Aabb,
}

impl Group {
    pub fn new(members: Vec<Intersectable>) -> Self {
        let bbox = members
            .iter()
            .fold(Aabb::EMPTY, |acc, m| Aabb::surrounding(&acc, &m.bounding_box()));
        Self { members, bbox }
    }

    pub fn members(&self) -> &[Intersectable] {
        &self.members
    }
}

impl Intersectable {
    /// Closest hit strictly inside `ray_t`.
    pub fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<ShadeablePoint<'_>> {
        match self {
            Intersectable::Triangle(tri) => tri.intersect(ray, ray_t).map(|t| ShadeablePoint {
                point: ray.at(t),
                distance: t,
                shape: tri,
            }),
            Intersectable::Group(group) => {
                if group.members.is_empty() {
                    return None;
                }
                group.bbox.hit(ray, ray_t)?;
                closest_hit(&group.members, ray, ray_t)
            }
        }
    }

    pub fn bounding_box(&self) -> Aabb {
        match self {
            Intersectable::Triangle(tri) => tri.bounding_box(),
            Intersectable::Group(group) => group.bbox,
        }
    }

    /// Model every triangle under this primitive belongs to. `None` for a
    /// group that spans several models or holds no triangles.
    pub fn model(&self) -> Option<ModelId> {
        match self {
            Intersectable::Triangle(tri) => Some(tri.model()),
            Intersectable::Group(group) => {
                let mut models = group.members.iter().map(Intersectable::model);
                let first = models.next()??;
                models.all(|m| m == Some(first)).then_some(first)
            }
        }
    }

    pub fn material<'s>(&self, scene: &'s Scene) -> Option<&'s Material> {
        self.model().map(|id| scene.material(id))
    }

    /// Description of the first member lying outside its group's box.
    pub(crate) fn find_escaped_member(&self) -> Option<String> {
        let Intersectable::Group(group) = self else {
            return None;
        };
        for member in &group.members {
            if !group.bbox.encloses(&member.bounding_box()) {
                return Some(format!(
                    "group member {:?} escapes group bounds {:?}",
                    member.bounding_box(),
                    group.bbox
                ));
            }
            if let Some(nested) = member.find_escaped_member() {
                return Some(nested);
            }
        }
        None
    }
}

/// Closest hit among `primitives`, shrinking the search interval as hits are found.
pub(crate) fn closest_hit<'a>(
    primitives: &'a [Intersectable],
    ray: &Ray,
    ray_t: Interval,
) -> Option<ShadeablePoint<'a>> {
    let mut closest = None;
    let mut range = ray_t;
    for primitive in primitives {
        if let Some(hit) = primitive.intersect(ray, range) {
            range = range.with_max(hit.distance);
            closest = Some(hit);
        }
    }
    closest
}
