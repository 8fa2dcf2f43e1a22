//! Bookkeeping for rays travelling through nested transparent models.
//!
//! A ray that enters a transparent model pushes an entry; leaving the model
//! pops that model's entry wherever it sits in the stack, since overlapping
//! solids can be exited in any order. The current medium is the most
//! recently entered model still on the stack, or air.

use facet_math::Vec3;

use crate::intersectable::ShadeablePoint;
use crate::material::{Material, AIR_MATERIAL};
use crate::scene::{ModelId, Scene};

/// Models the current ray is inside, oldest first. One per ray path.
#[derive(Debug, Clone, Default)]
pub struct InsideModelStack<'a> {
    entries: Vec<(ModelId, ShadeablePoint<'a>)>,
}

impl<'a> InsideModelStack<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record entering the model that owns `point`. Re-entering a model
    /// replaces its old entry.
    pub fn push(&mut self, point: ShadeablePoint<'a>) {
        let model = point.model();
        self.entries.retain(|(id, _)| *id != model);
        self.entries.push((model, point));
    }

    /// Remove and return the entry for `model`.
    pub fn pop(&mut self, model: ModelId) -> Option<ShadeablePoint<'a>> {
        let index = self.entries.iter().position(|(id, _)| *id == model)?;
        Some(self.entries.remove(index).1)
    }

    /// Point where the ray entered `model`.
    pub fn get(&self, model: ModelId) -> Option<&ShadeablePoint<'a>> {
        self.entries
            .iter()
            .find(|(id, _)| *id == model)
            .map(|(_, point)| point)
    }

    pub fn contains(&self, model: ModelId) -> bool {
        self.get(model).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Material of the medium the ray is currently travelling through.
    pub fn current_material<'s>(&self, scene: &'s Scene) -> &'s Material {
        match self.entries.last() {
            Some((model, _)) => scene.material(*model),
            None => &AIR_MATERIAL,
        }
    }
}

/// Snell refraction of `incident` through a surface with `normal`, going
/// from index `old_index` to `new_index`.
///
/// The normal may face either side. Returns the zero vector on total
/// internal reflection.
pub fn refract(incident: Vec3, normal: Vec3, old_index: f32, new_index: f32) -> Vec3 {
    let incident = incident.normalize_or_zero();
    let mut normal = normal.normalize_or_zero();
    let mut cos_i = -normal.dot(incident);
    if cos_i < 0.0 {
        normal = -normal;
        cos_i = -cos_i;
    }
    let eta = old_index / new_index;
    let sin2_t = eta * eta * (1.0 - cos_i * cos_i);
    if sin2_t > 1.0 {
        return Vec3::ZERO;
    }
    let cos_t = (1.0 - sin2_t).sqrt();
    eta * incident + (eta * cos_i - cos_t) * normal
}

/// Mirror `incident` about `normal`.
pub fn reflect(incident: Vec3, normal: Vec3) -> Vec3 {
    let normal = normal.normalize_or_zero();
    incident - 2.0 * incident.dot(normal) * normal
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_geom::{Mesh, Vertex};
    use facet_math::{Mat4, Vec2};

    use crate::material::MaterialOptions;
    use crate::texture::{Color, Texture};
    use crate::triangle::Triangle;

    fn glass(index: f32) -> Material {
        Material::with_options(
            Texture::Solid(Color::ONE),
            MaterialOptions::default()
                .with_transparency(0.9)
                .with_refractive_index(index),
        )
    }

    fn two_model_scene() -> Scene {
        let v = |x: f32| Vertex::new(Vec3::new(x, 0.0, 0.0), Vec3::Y, Vec2::ZERO);
        let mesh = Mesh::new(vec![v(0.0), v(1.0), v(2.0)], vec![0, 1, 2]);
        let mut scene = Scene::new();
        scene.add_model(&mesh, glass(1.5), Mat4::IDENTITY).unwrap();
        scene.add_model(&mesh, glass(1.33), Mat4::IDENTITY).unwrap();
        scene
    }

    fn triangle(model: usize) -> Triangle {
        let v = |x: f32, y: f32| Vertex::new(Vec3::new(x, y, 0.0), Vec3::Z, Vec2::ZERO);
        Triangle::new([v(0.0, 0.0), v(1.0, 0.0), v(0.0, 1.0)], ModelId::new(model))
    }

    fn point(shape: &Triangle, distance: f32) -> ShadeablePoint<'_> {
        ShadeablePoint {
            point: Vec3::new(0.2, 0.2, 0.0),
            distance,
            shape,
        }
    }

    #[test]
    fn test_empty_stack_is_air() {
        let scene = two_model_scene();
        let stack = InsideModelStack::new();
        let material = stack.current_material(&scene);
        assert_eq!(material.transparency(), 1.0);
        assert!((material.refractive_index() - 1.0003).abs() < 1e-6);
    }

    #[test]
    fn test_push_pop_out_of_order() {
        let scene = two_model_scene();
        let (a, b) = (triangle(0), triangle(1));
        let mut stack = InsideModelStack::new();

        stack.push(point(&a, 1.0));
        stack.push(point(&b, 2.0));
        assert_eq!(stack.current_material(&scene).refractive_index(), 1.33);

        let popped = stack.pop(ModelId::new(1)).unwrap();
        assert_eq!(popped.distance, 2.0);
        assert_eq!(stack.current_material(&scene).refractive_index(), 1.5);

        // Exit A while B is still the most recent entry.
        stack.push(point(&b, 3.0));
        assert!(stack.pop(ModelId::new(0)).is_some());
        assert_eq!(stack.current_material(&scene).refractive_index(), 1.33);
        assert!(stack.pop(ModelId::new(0)).is_none());
    }

    #[test]
    fn test_reentry_replaces_entry() {
        let a = triangle(0);
        let mut stack = InsideModelStack::new();
        stack.push(point(&a, 1.0));
        stack.push(point(&a, 4.0));

        assert_eq!(stack.len(), 1);
        assert_eq!(stack.get(ModelId::new(0)).unwrap().distance, 4.0);
        assert!(stack.contains(ModelId::new(0)));
        assert!(!stack.contains(ModelId::new(1)));
    }

    #[test]
    fn test_total_internal_reflection() {
        // 60 degrees from the normal, beyond the 41.8 degree critical angle.
        let angle = 60f32.to_radians();
        let incident = Vec3::new(angle.sin(), -angle.cos(), 0.0);
        assert_eq!(refract(incident, Vec3::Y, 1.5, 1.0), Vec3::ZERO);
    }

    #[test]
    fn test_refraction_follows_snell() {
        let angle = 30f32.to_radians();
        let incident = Vec3::new(angle.sin(), -angle.cos(), 0.0);
        let refracted = refract(incident, Vec3::Y, 1.0, 1.5);

        assert!((refracted.length() - 1.0).abs() < 1e-5);
        assert!(refracted.y < 0.0);
        // sin(t) = sin(30) / 1.5
        assert!((refracted.x - 0.5 / 1.5).abs() < 1e-5);

        // The normal may face the incoming ray or away from it.
        let flipped = refract(incident, -Vec3::Y, 1.0, 1.5);
        assert!((flipped - refracted).length() < 1e-5);
    }

    #[test]
    fn test_normal_incidence_passes_straight() {
        let refracted = refract(-Vec3::Y, Vec3::Y, 1.0, 1.5);
        assert!((refracted + Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn test_reflect() {
        let reflected = reflect(Vec3::new(1.0, -1.0, 0.0), Vec3::Y);
        assert_eq!(reflected, Vec3::new(1.0, 1.0, 0.0));
    }
}
