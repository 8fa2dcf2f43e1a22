//! Demo scenes exercising the tessellators and the tracer.

use std::sync::Arc;

use anyhow::{bail, Result};
use facet_geom::{
    polygonate, BoundedTessellator, FractalNoise, Helix, Mesh, RectPlane, Sphere, Tessellator,
};
use facet_tracer::{
    Color, DirectionalLight, Material, MaterialOptions, Mat4, PointLight, Scene, SceneLights,
    Texture, Vec3,
};
use image::{Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const SCENE_NAMES: [&str; 3] = ["helix", "noise", "glass"];

/// A scene with the lights it is meant to be seen under.
pub struct Demo {
    pub scene: Scene,
    pub lights: SceneLights,
}

pub fn build(name: &str, seed: u64) -> Result<Demo> {
    let mut rng = StdRng::seed_from_u64(seed);
    let demo = match name {
        "helix" => helix_scene(&mut rng)?,
        "noise" => noise_scene(&mut rng)?,
        "glass" => glass_scene()?,
        other => bail!(
            "Unknown scene '{other}', expected one of: {}",
            SCENE_NAMES.join(", ")
        ),
    };
    log::info!(
        "Built scene '{name}': {} models, {} triangles",
        demo.scene.len(),
        demo.scene.triangle_count()
    );
    Ok(demo)
}

fn default_lights() -> SceneLights {
    SceneLights::new()
        .with_directional(DirectionalLight::new(
            Vec3::new(-1.0, -2.0, -1.5),
            Color::splat(0.9),
        ))
        .with_point(PointLight::new(Vec3::new(0.0, 4.0, 3.0), Color::ONE))
}

fn ground(size: f32) -> Result<Mesh> {
    Ok(Tessellator::new(4, 4)
        .with_surface(Box::new(RectPlane::new(size, size)))
        .tessellate()?)
}

/// Two helix tubes, one with analytic normals and one with estimated
/// normals, around a sphere on a test-box floor.
fn helix_scene(rng: &mut StdRng) -> Result<Demo> {
    let helix = Helix::new(0.8, 3.0, 0.2, 1.2);
    let direct = Tessellator::new(16, 96)
        .with_surface(Box::new(helix))
        .tessellate()?;
    let estimated = Tessellator::with_finite_difference_normals(16, 96)
        .with_surface(Box::new(helix))
        .tessellate()?;
    let sphere = Tessellator::with_finite_difference_normals(24, 16)
        .with_surface(Box::new(Sphere::new(0.7)))
        .tessellate()?;

    let mut scene = Scene::new();
    scene.add_model(
        &ground(12.0)?,
        Material::new(test_box_texture(rng, 256, 8)),
        Mat4::IDENTITY,
    )?;
    scene.add_model(
        &direct,
        Material::solid(Color::new(0.9, 0.3, 0.2)),
        Mat4::from_translation(Vec3::new(-2.0, 1.6, 0.0)),
    )?;
    scene.add_model(
        &estimated,
        Material::solid(Color::new(0.2, 0.5, 0.9)),
        Mat4::from_translation(Vec3::new(2.0, 1.6, 0.0)),
    )?;
    scene.add_model(
        &sphere,
        Material::solid(Color::new(0.9, 0.9, 0.4)),
        Mat4::from_translation(Vec3::new(0.0, 0.7, 1.5)),
    )?;
    Ok(Demo {
        scene,
        lights: default_lights(),
    })
}

/// A noise-displaced terrain patch, smooth and flat shaded side by side.
fn noise_scene(rng: &mut StdRng) -> Result<Demo> {
    let noise = Arc::new(FractalNoise::new(rng.gen(), 7, -0.5, 0.7));
    let terrain = Tessellator::with_displacement(17, 17, noise)
        .with_surface(Box::new(RectPlane::new(3.5, 3.5)))
        .tessellate()?;
    let helix = Tessellator::new(8, 48)
        .with_surface(Box::new(Helix::new(0.5, 1.5, 0.15, 0.75)))
        .tessellate()?;

    let rock = || Material::solid(Color::new(0.6, 0.55, 0.5));
    let mut scene = Scene::new();
    scene.add_model(
        &terrain,
        rock(),
        Mat4::from_translation(Vec3::new(-2.0, 0.0, 0.0)),
    )?;
    scene.add_model(
        &polygonate(&terrain)?,
        rock(),
        Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0)),
    )?;
    scene.add_model(
        &polygonate(&helix)?,
        Material::solid(Color::new(0.3, 0.8, 0.4)),
        Mat4::from_translation(Vec3::new(0.0, 1.5, -1.5)),
    )?;
    Ok(Demo {
        scene,
        lights: default_lights(),
    })
}

/// Overlapping glass spheres above a checker floor and a mirrored disc.
fn glass_scene() -> Result<Demo> {
    let sphere = Tessellator::new(32, 24)
        .with_surface(Box::new(Sphere::new(1.0)))
        .tessellate()?;
    let disc = BoundedTessellator::new(
        24,
        24,
        0.0,
        1.0,
        Box::new(|u| {
            let half = (0.25 - (u - 0.5) * (u - 0.5)).max(0.0).sqrt();
            Some((0.5 - half, 0.5 + half))
        }),
    )
    .with_surface(Box::new(RectPlane::new(3.0, 3.0)))
    .tessellate()?;

    let glass = |index: f32, tint: Color| {
        Material::with_options(
            Texture::solid_color(tint),
            MaterialOptions::default()
                .with_transparency(0.85)
                .with_refractive_index(index)
                .with_reflectivity(0.05),
        )
    };
    let mirror = Material::with_options(
        Texture::solid_color(Color::splat(0.2)),
        MaterialOptions::default().with_reflectivity(0.6),
    );
    let floor = Texture::checker(256, 8, Color::splat(0.9), Color::new(0.2, 0.2, 0.3));

    let mut scene = Scene::new();
    scene.add_model(&ground(14.0)?, Material::new(floor), Mat4::IDENTITY)?;
    scene.add_model(
        &disc,
        mirror,
        Mat4::from_translation(Vec3::new(0.0, 0.01, 0.0)),
    )?;
    scene.add_model(
        &sphere,
        glass(1.5, Color::new(0.8, 0.9, 1.0)),
        Mat4::from_translation(Vec3::new(-0.5, 1.2, 0.0)),
    )?;
    scene.add_model(
        &sphere,
        glass(1.33, Color::new(1.0, 0.85, 0.8)),
        Mat4::from_translation(Vec3::new(0.6, 1.0, 0.4)) * Mat4::from_scale(Vec3::splat(0.8)),
    )?;
    Ok(Demo {
        scene,
        lights: default_lights(),
    })
}

/// Grid of randomly coloured boxes with dark borders.
pub fn test_box_texture(rng: &mut impl Rng, size: u32, boxes: u32) -> Texture {
    let boxes = boxes.clamp(1, size.max(1));
    let cell = (size / boxes).max(1);
    let colors: Vec<Rgb<u8>> = (0..boxes * boxes)
        .map(|_| Rgb([0; 3].map(|_| rng.gen_range(80..=255))))
        .collect();

    Texture::from_image(RgbImage::from_fn(size, size, |x, y| {
        let (bx, by) = ((x / cell).min(boxes - 1), (y / cell).min(boxes - 1));
        if x % cell == 0 || y % cell == 0 {
            Rgb([20, 20, 20])
        } else {
            colors[(by * boxes + bx) as usize]
        }
    }))
}
