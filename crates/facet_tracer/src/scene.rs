//! Scene assembly: an arena of placed models.
//!
//! Triangles and hit records refer back to their model through a
//! [`ModelId`] handle into the arena rather than by reference.

use facet_geom::Mesh;
use facet_math::{Aabb, Mat4};

use crate::error::TracerResult;
use crate::intersectable::{Group, Intersectable};
use crate::material::Material;
use crate::triangle::Triangle;

/// Handle to a model owned by a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(usize);

impl ModelId {
    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// A world-space mesh with the material shared by all of its triangles.
#[derive(Debug, Clone)]
pub struct Model {
    mesh: Mesh,
    material: Material,
}

impl Model {
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn material(&self) -> &Material {
        &self.material
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scene {
    models: Vec<Model>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place `mesh` in the world with `transform` and take ownership of it.
    ///
    /// The mesh is validated first, so every later triangle lookup is in range.
    pub fn add_model(
        &mut self,
        mesh: &Mesh,
        material: Material,
        transform: Mat4,
    ) -> TracerResult<ModelId> {
        mesh.validate()?;
        let id = ModelId::new(self.models.len());
        self.models.push(Model {
            mesh: mesh.transformed(transform),
            material,
        });
        Ok(id)
    }

    pub fn model(&self, id: ModelId) -> &Model {
        &self.models[id.0]
    }

    pub fn material(&self, id: ModelId) -> &Material {
        &self.models[id.0].material
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.models.iter().map(|m| m.mesh.triangle_count()).sum()
    }

    pub fn bounds(&self) -> Aabb {
        self.models
            .iter()
            .fold(Aabb::EMPTY, |acc, m| Aabb::surrounding(&acc, &m.mesh.bounds()))
    }

    /// Every triangle of every model as its own primitive.
    pub fn intersectables(&self) -> Vec<Intersectable> {
        let mut primitives = Vec::with_capacity(self.triangle_count());
        for (index, model) in self.models.iter().enumerate() {
            primitives.extend(
                model_triangles(model, ModelId::new(index)).map(Intersectable::Triangle),
            );
        }
        primitives
    }

    /// One group primitive per non-empty model.
    pub fn grouped_intersectables(&self) -> Vec<Intersectable> {
        self.models
            .iter()
            .enumerate()
            .filter(|(_, model)| model.mesh.triangle_count() > 0)
            .map(|(index, model)| {
                let members = model_triangles(model, ModelId::new(index))
                    .map(Intersectable::Triangle)
                    .collect();
                Intersectable::Group(Group::new(members))
            })
            .collect()
    }
}

fn model_triangles(model: &Model, id: ModelId) -> impl Iterator<Item = Triangle> + '_ {
    model
        .mesh
        .triangles()
        .map(move |vertices| Triangle::new(vertices, id))
}
