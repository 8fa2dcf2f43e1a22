//! The ray tracer: owns the scene and its acceleration structure, casts
//! camera rays through it and shades the hits.
//!
//! Shading is an ambient term plus at most one directional light with
//! Blinn-Phong specular and hard shadows. Point lights are accepted but
//! contribute nothing yet. Transparent and reflective materials continue
//! along secondary rays up to [`TracerOptions::max_depth`].

use std::path::Path;
use std::time::Instant;

use facet_math::{safe_normalize, Interval, Ray, Vec3};
use image::{Rgb, RgbImage};
use rayon::prelude::*;

use crate::bound::{Bound, TopDownOptions};
use crate::camera::Camera;
use crate::error::TracerResult;
use crate::intersectable::{Intersectable, ShadeablePoint};
use crate::lights::{DirectionalLight, PointLight, SceneLights};
use crate::scene::Scene;
use crate::texture::Color;
use crate::transparency::{reflect, refract, InsideModelStack};

/// Render configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TracerOptions {
    /// Colour of pixels no ray hits.
    pub background: Color,
    /// Fraction of the diffuse colour visible without any light.
    pub ambient: f32,
    /// Blinn-Phong exponent.
    pub shininess: f32,
    /// Secondary bounces allowed for refraction and reflection.
    pub max_depth: u32,
}

impl Default for TracerOptions {
    fn default() -> Self {
        Self {
            background: Color::splat(100.0 / 255.0),
            ambient: 0.1,
            shininess: 16.0,
            max_depth: 4,
        }
    }
}

pub struct RayTracer {
    options: TracerOptions,
    scene: Scene,
    root: Bound,
}

impl RayTracer {
    /// Tracer testing every ray against every triangle.
    pub fn no_acceleration(options: TracerOptions, scene: Scene) -> TracerResult<Self> {
        Self::build(options, scene, Bound::no_acceleration)
    }

    /// Tracer over a top-down hierarchy splitting each level three ways.
    pub fn top_down_triple(options: TracerOptions, scene: Scene) -> TracerResult<Self> {
        Self::with_top_down(options, scene, &TopDownOptions::default())
    }

    pub fn with_top_down(
        options: TracerOptions,
        scene: Scene,
        top_down: &TopDownOptions,
    ) -> TracerResult<Self> {
        Self::build(options, scene, |primitives| {
            Bound::top_down(primitives, top_down)
        })
    }

    fn build<F>(options: TracerOptions, scene: Scene, builder: F) -> TracerResult<Self>
    where
        F: FnOnce(Vec<Intersectable>) -> Bound,
    {
        let start = Instant::now();
        let root = builder(scene.intersectables());
        root.check_sanity()?;
        log::info!("Acceleration structure built in {:.2?}", start.elapsed());

        let stats = root.stats();
        log::debug!(
            "{} primitives in {} nodes / {} leaves, depth {}, largest leaf {}",
            stats.primitives,
            stats.nodes,
            stats.leaves,
            stats.max_depth,
            stats.largest_leaf
        );
        log::debug!("Scene bounds {:?}", scene.bounds());
        Ok(Self {
            options,
            scene,
            root,
        })
    }

    pub fn options(&self) -> &TracerOptions {
        &self.options
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn root(&self) -> &Bound {
        &self.root
    }

    /// Closest hit of `ray` with the scene.
    pub fn intersect_scene(&self, ray: &Ray) -> Option<ShadeablePoint<'_>> {
        self.root.intersect(ray)
    }

    /// Render a still image. Every camera sample that hits something
    /// overwrites the pixel; samples are not averaged.
    pub fn render(&self, camera: &Camera, lights: &SceneLights) -> RgbImage {
        let start = Instant::now();
        let lights = SceneLights {
            points: lights.points.clone(),
            directional: lights.directional.map(|light| DirectionalLight {
                direction: safe_normalize(light.direction),
                color: light.color,
            }),
        };

        let (width, height) = (camera.image_width(), camera.image_height());
        let background = Rgb(color_to_rgb(self.options.background));
        let mut image = RgbImage::from_pixel(width, height, background);
        let row_len = width as usize * 3;

        image
            .par_chunks_mut(row_len)
            .enumerate()
            .for_each(|(y, row)| {
                for x in 0..width {
                    for ray in camera.screen_rays(x, y as u32) {
                        // Every primary ray starts in air.
                        let mut stack = InsideModelStack::new();
                        let depth = self.options.max_depth;
                        if let Some(color) = self.trace(&ray, &lights, &mut stack, depth) {
                            let offset = x as usize * 3;
                            row[offset..offset + 3].copy_from_slice(&color_to_rgb(color));
                        }
                    }
                }
            });

        log::info!("Rendered {}x{} in {:.2?}", width, height, start.elapsed());
        image
    }

    /// Render and write the image to `path`; the format follows the extension.
    pub fn render_to_file(
        &self,
        camera: &Camera,
        lights: &SceneLights,
        path: impl AsRef<Path>,
    ) -> TracerResult<()> {
        let image = self.render(camera, lights);
        image.save(path.as_ref())?;
        log::info!("Saved {}", path.as_ref().display());
        Ok(())
    }

    /// Colour seen along `ray`, or `None` if it hits nothing.
    pub fn trace<'a>(
        &'a self,
        ray: &Ray,
        lights: &SceneLights,
        stack: &mut InsideModelStack<'a>,
        depth: u32,
    ) -> Option<Color> {
        let hit = self.intersect_scene(ray)?;
        let mut color = self.shade(&hit, ray, lights);
        if depth == 0 {
            return Some(color);
        }

        let material = self.scene.material(hit.model());
        let transparency = material.transparency();
        if transparency > 0.0 {
            let through = self.refracted_color(&hit, ray, lights, stack, depth - 1);
            color = color * (1.0 - transparency) + through * transparency;
        }
        let reflectivity = material.reflectivity();
        if reflectivity > 0.0 {
            let direction = reflect(ray.direction, hit.normal());
            let mut branch = stack.clone();
            let mirrored = self.secondary_color(&hit, direction, lights, &mut branch, depth - 1);
            color = color * (1.0 - reflectivity) + mirrored * reflectivity;
        }
        Some(color)
    }

    /// Continue through a transparent surface, updating the media stack.
    /// Total internal reflection keeps the ray in its current medium.
    fn refracted_color<'a>(
        &'a self,
        hit: &ShadeablePoint<'a>,
        ray: &Ray,
        lights: &SceneLights,
        stack: &InsideModelStack<'a>,
        depth: u32,
    ) -> Color {
        let (mut next, old_index, new_index) = self.cross_boundary(hit, stack);
        let normal = hit.normal();
        let refracted = refract(ray.direction, normal, old_index, new_index);
        if refracted == Vec3::ZERO {
            let mirrored = reflect(ray.direction, normal);
            return self.secondary_color(hit, mirrored, lights, &mut stack.clone(), depth);
        }
        self.secondary_color(hit, refracted, lights, &mut next, depth)
    }

    /// Media stack on the far side of `hit`, with the refractive indices
    /// before and after the crossing.
    fn cross_boundary<'a>(
        &'a self,
        hit: &ShadeablePoint<'a>,
        stack: &InsideModelStack<'a>,
    ) -> (InsideModelStack<'a>, f32, f32) {
        let model = hit.model();
        let mut next = stack.clone();
        if next.contains(model) {
            let leaving = self.scene.material(model).refractive_index();
            next.pop(model);
            let entering = next.current_material(&self.scene).refractive_index();
            (next, leaving, entering)
        } else {
            let outside = next.current_material(&self.scene).refractive_index();
            next.push(*hit);
            (next, outside, self.scene.material(model).refractive_index())
        }
    }

    fn secondary_color<'a>(
        &'a self,
        hit: &ShadeablePoint<'a>,
        direction: Vec3,
        lights: &SceneLights,
        stack: &mut InsideModelStack<'a>,
        depth: u32,
    ) -> Color {
        let ray = Ray::new(hit.point, direction).nudged();
        self.trace(&ray, lights, stack, depth)
            .unwrap_or(self.options.background)
    }

    /// Local illumination at a hit.
    fn shade(&self, hit: &ShadeablePoint<'_>, ray: &Ray, lights: &SceneLights) -> Color {
        let material = self.scene.material(hit.model());
        let diffuse = material.diffuse().sample(hit.uv());
        let normal = hit.normal();
        let view_dir = safe_normalize(-ray.direction);

        let mut lighting = diffuse * self.options.ambient;
        if let Some(light) = &lights.directional {
            lighting += self.directional_light(hit.point, normal, view_dir, diffuse, light);
        }
        for light in &lights.points {
            lighting += self.point_light(hit.point, normal, view_dir, diffuse, light);
        }
        lighting
    }

    fn directional_light(
        &self,
        point: Vec3,
        normal: Vec3,
        view_dir: Vec3,
        diffuse: Color,
        light: &DirectionalLight,
    ) -> Color {
        let lit = 1.0 - self.directional_shadow(point, light.direction);
        if lit <= 0.0 {
            return Color::ZERO;
        }

        let to_light = -light.direction;
        let diffuse_term = normal.dot(to_light).max(0.0) * diffuse * light.color;
        let halfway = safe_normalize(to_light + view_dir);
        let specular_strength = normal.dot(halfway).max(0.0).powf(self.options.shininess);
        let specular_term = specular_strength * diffuse * light.color;
        lit * (diffuse_term + specular_term)
    }

    /// Point lights are carried through the API but not shaded yet.
    fn point_light(
        &self,
        _point: Vec3,
        _normal: Vec3,
        _view_dir: Vec3,
        _diffuse: Color,
        _light: &PointLight,
    ) -> Color {
        Color::ZERO
    }

    /// 1.0 if anything blocks the way from `point` towards the light.
    fn directional_shadow(&self, point: Vec3, light_dir: Vec3) -> f32 {
        let shadow_ray = Ray::new(point, -light_dir).nudged();
        if self.root.any_hit(&shadow_ray, Interval::FORWARD) {
            1.0
        } else {
            0.0
        }
    }
}

/// Convert a colour to 8-bit RGB, rounding and then clamping each channel.
pub fn color_to_rgb(color: Color) -> [u8; 3] {
    let channel = |c: f32| (c * 255.0).round().clamp(0.0, 255.0) as u8;
    [channel(color.x), channel(color.y), channel(color.z)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_geom::{Mesh, RectPlane, Sphere, Tessellator, Vertex};
    use facet_math::{Mat4, Vec2};

    use crate::material::{Material, MaterialOptions, AIR_INDEX};
    use crate::texture::Texture;

    fn glass(refractive_index: f32) -> Material {
        Material::with_options(
            Texture::Solid(Color::ZERO),
            MaterialOptions::default()
                .with_transparency(1.0)
                .with_refractive_index(refractive_index),
        )
    }

    fn ground() -> Mesh {
        Tessellator::new(2, 2)
            .with_surface(Box::new(RectPlane::new(10.0, 10.0)))
            .tessellate()
            .unwrap()
    }

    fn ball() -> Mesh {
        Tessellator::new(16, 16)
            .with_surface(Box::new(Sphere::new(0.5)))
            .tessellate()
            .unwrap()
    }

    /// Looks straight down, off-centre so no pixel ray lands on a mesh edge.
    fn overhead_camera(size: u32) -> Camera {
        Camera::new()
            .with_resolution(size, size)
            .with_position(Vec3::new(0.3, 5.0, 0.7), Vec3::new(0.3, 0.0, 0.7), Vec3::Z)
            .with_fov(30.0)
    }

    fn sun() -> SceneLights {
        SceneLights::new().with_directional(DirectionalLight::new(-Vec3::Y, Color::ONE))
    }

    #[test]
    fn test_color_to_rgb_rounds_then_clamps() {
        assert_eq!(color_to_rgb(Color::new(0.5, 1.7, -0.3)), [128, 255, 0]);
        assert_eq!(color_to_rgb(Color::new(0.998, 0.0, 1.0)), [254, 0, 255]);
    }

    #[test]
    fn test_empty_scene_renders_background() {
        let tracer = RayTracer::top_down_triple(TracerOptions::default(), Scene::new()).unwrap();
        let image = tracer.render(&overhead_camera(8), &sun());
        assert!(image.pixels().all(|p| p.0 == [100, 100, 100]));
    }

    #[test]
    fn test_zero_sized_camera_renders_one_pixel() {
        let tracer = RayTracer::no_acceleration(TracerOptions::default(), Scene::new()).unwrap();
        let camera = Camera::new().with_resolution(0, 0);
        let image = tracer.render(&camera, &sun());
        assert_eq!(image.dimensions(), (1, 1));
    }

    #[test]
    fn test_lit_ground_plane() {
        let mut scene = Scene::new();
        scene
            .add_model(&ground(), Material::solid(Color::new(0.5, 0.5, 0.5)), Mat4::IDENTITY)
            .unwrap();
        let tracer = RayTracer::no_acceleration(TracerOptions::default(), scene).unwrap();

        let unlit = tracer.render(&overhead_camera(4), &SceneLights::new());
        // Ambient only: 0.1 * 0.5
        assert!(unlit.pixels().all(|p| p.0 == [13, 13, 13]));

        // Head-on sun: ambient + full diffuse + full specular.
        let lit = tracer.render(&overhead_camera(4), &sun());
        let center = lit.get_pixel(2, 2).0;
        assert_eq!(center, [255, 255, 255]);
    }

    #[test]
    fn test_point_lights_contribute_nothing() {
        let mut scene = Scene::new();
        scene
            .add_model(&ground(), Material::solid(Color::ONE), Mat4::IDENTITY)
            .unwrap();
        let tracer = RayTracer::no_acceleration(TracerOptions::default(), scene).unwrap();
        let lights = SceneLights::new()
            .with_point(PointLight::new(Vec3::new(0.0, 1.0, 0.0), Color::ONE));

        let image = tracer.render(&overhead_camera(4), &lights);
        assert!(image.pixels().all(|p| p.0 == [26, 26, 26]));
    }

    #[test]
    fn test_shadow_blocks_directional_light() {
        let mut scene = Scene::new();
        scene
            .add_model(&ground(), Material::solid(Color::ONE), Mat4::IDENTITY)
            .unwrap();
        scene
            .add_model(
                &ball(),
                Material::solid(Color::ONE),
                Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0)),
            )
            .unwrap();
        let tracer = RayTracer::top_down_triple(TracerOptions::default(), scene).unwrap();

        let lights = SceneLights::new()
            .with_directional(DirectionalLight::new(Vec3::new(0.0, -3.0, 0.0), Color::ONE));
        let below_ball = Ray::new(Vec3::new(0.1, 1.0, 0.2), -Vec3::Y);
        let in_open = Ray::new(Vec3::new(3.1, 1.0, 0.3), -Vec3::Y);

        let normalized = sun();
        let mut stack = InsideModelStack::new();
        let shaded = tracer.trace(&below_ball, &normalized, &mut stack, 0).unwrap();
        assert!((shaded - Color::splat(0.1)).length() < 1e-5);

        let lit = tracer.trace(&in_open, &normalized, &mut stack, 0).unwrap();
        assert!(lit.x > 1.0);

        // render normalizes the light direction itself
        let image = tracer.render(&overhead_camera(3), &lights);
        assert_eq!(image.get_pixel(0, 0).0, [255, 255, 255]);
    }

    #[test]
    fn test_miss_returns_none() {
        let mut scene = Scene::new();
        scene
            .add_model(&ball(), Material::solid(Color::ONE), Mat4::IDENTITY)
            .unwrap();
        let tracer = RayTracer::top_down_triple(TracerOptions::default(), scene).unwrap();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);
        assert!(tracer.intersect_scene(&ray).is_none());
        assert!(tracer.trace(&ray, &sun(), &mut InsideModelStack::new(), 4).is_none());
    }

    #[test]
    fn test_clear_glass_shows_what_is_behind() {
        let clear = glass(AIR_INDEX);
        let v = |x: f32, z: f32| Vertex::new(Vec3::new(x, 0.0, z), Vec3::Y, Vec2::ZERO);
        let pane = Mesh::new(vec![v(-1.0, -1.0), v(1.0, -1.0), v(0.0, 1.0)], vec![0, 1, 2]);

        let mut scene = Scene::new();
        scene
            .add_model(&ground(), Material::solid(Color::ONE), Mat4::IDENTITY)
            .unwrap();
        scene
            .add_model(&pane, clear, Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0)))
            .unwrap();
        let tracer = RayTracer::top_down_triple(TracerOptions::default(), scene).unwrap();

        let ray = Ray::new(Vec3::new(0.1, 3.0, 0.2), -Vec3::Y);
        let seen = tracer
            .trace(&ray, &SceneLights::new(), &mut InsideModelStack::new(), 4)
            .unwrap();
        // The pane adds nothing; the ground's ambient shows through.
        assert!((seen - Color::splat(0.1)).length() < 1e-4);
    }

    #[test]
    fn test_ground_seen_through_glass_ball() {
        let mut scene = Scene::new();
        scene
            .add_model(&ground(), Material::solid(Color::ONE), Mat4::IDENTITY)
            .unwrap();
        scene
            .add_model(&ball(), glass(1.5), Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0)))
            .unwrap();
        let tracer = RayTracer::top_down_triple(TracerOptions::default(), scene).unwrap();

        let ray = Ray::new(Vec3::new(0.065, 4.0, 0.097), -Vec3::Y);
        let entry = tracer.intersect_scene(&ray).unwrap();
        assert!((entry.point.y - 2.5).abs() < 0.05);

        // The ball shades nothing itself and the ground under it is in its
        // shadow, so only the ground's ambient term comes through.
        let seen = tracer
            .trace(&ray, &sun(), &mut InsideModelStack::new(), 4)
            .unwrap();
        assert!((seen - Color::splat(0.1)).length() < 1e-4, "saw {seen}");
    }

    #[test]
    fn test_overlapping_volumes_exited_out_of_order() {
        let mut scene = Scene::new();
        let left = scene
            .add_model(&ball(), glass(1.5), Mat4::from_translation(Vec3::new(-0.2, 0.0, 0.0)))
            .unwrap();
        let right = scene
            .add_model(&ball(), glass(1.3), Mat4::from_translation(Vec3::new(0.2, 0.0, 0.0)))
            .unwrap();
        let tracer = RayTracer::top_down_triple(TracerOptions::default(), scene).unwrap();

        // Walk a straight line through both balls, crossing each boundary.
        let mut ray = Ray::new(Vec3::new(-5.0, 0.05, 0.04), Vec3::X);
        let mut stack = InsideModelStack::new();
        let mut crossings = Vec::new();
        while let Some(hit) = tracer.intersect_scene(&ray) {
            let (next, old_index, new_index) = tracer.cross_boundary(&hit, &stack);
            crossings.push((hit.model(), old_index, new_index, next.len()));
            stack = next;
            ray = Ray::new(hit.point, ray.direction).nudged();
        }

        assert_eq!(
            crossings,
            vec![
                (left, AIR_INDEX, 1.5, 1),
                (right, 1.5, 1.3, 2),
                // Leaving the left ball while still inside the right one.
                (left, 1.5, 1.3, 1),
                (right, 1.3, AIR_INDEX, 0),
            ]
        );
        assert!(stack.is_empty());
    }

    #[test]
    fn test_total_internal_reflection_stays_inside() {
        let v = |x: f32, z: f32| Vertex::new(Vec3::new(x, 0.0, z), Vec3::Y, Vec2::ZERO);
        let pane = Mesh::new(vec![v(-1.0, -1.0), v(1.0, -1.0), v(0.0, 1.0)], vec![0, 1, 2]);
        let mut scene = Scene::new();
        scene.add_model(&pane, glass(1.5), Mat4::IDENTITY).unwrap();
        scene
            .add_model(
                &ground(),
                Material::solid(Color::ONE),
                Mat4::from_translation(Vec3::new(0.0, -1.0, 0.0)),
            )
            .unwrap();
        let tracer = RayTracer::no_acceleration(TracerOptions::default(), scene).unwrap();

        // 60 degrees off the normal, well past the critical angle out of glass.
        let direction = Vec3::new(60f32.to_radians().sin(), 0.5, 0.0);
        let hit_point = Vec3::new(0.1, 0.0, 0.2);
        let ray = Ray::new(hit_point - 1.2 * direction, direction);

        let mut stack = InsideModelStack::new();
        stack.push(tracer.intersect_scene(&ray).unwrap());

        // Refraction would escape upwards into the background; the mirrored
        // ray comes back down onto the ground instead.
        let seen = tracer
            .trace(&ray, &SceneLights::new(), &mut stack, 4)
            .unwrap();
        assert!((seen - Color::splat(0.1)).length() < 1e-4, "saw {seen}");
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_mirror_reflects_background() {
        let mirror = Material::with_options(
            Texture::Solid(Color::ZERO),
            MaterialOptions::default().with_reflectivity(1.0),
        );
        let mut scene = Scene::new();
        scene.add_model(&ground(), mirror, Mat4::IDENTITY).unwrap();
        let options = TracerOptions::default();
        let tracer = RayTracer::no_acceleration(options, scene).unwrap();

        let ray = Ray::new(Vec3::new(0.1, 3.0, 0.2), -Vec3::Y);
        let seen = tracer
            .trace(&ray, &SceneLights::new(), &mut InsideModelStack::new(), 2)
            .unwrap();
        assert!((seen - options.background).length() < 1e-5);
    }
}
