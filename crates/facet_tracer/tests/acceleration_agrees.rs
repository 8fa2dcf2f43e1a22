//! The accelerated hierarchy must find the same closest hits as testing
//! every primitive.

use std::f32::consts::PI;
use std::sync::Arc;

use facet_geom::{polygonate, FractalNoise, Helix, RectPlane, Sphere, Tessellator};
use facet_tracer::{
    Bound, Color, Material, Mat4, Ray, RayTracer, Scene, TopDownOptions, TracerOptions, Vec3,
};

fn busy_scene() -> Scene {
    let mut scene = Scene::new();
    let sphere = Tessellator::new(12, 10)
        .with_surface(Box::new(Sphere::new(1.0)))
        .tessellate()
        .unwrap();
    let helix = Tessellator::with_finite_difference_normals(8, 40)
        .with_surface(Box::new(Helix::new(1.2, 3.0, 0.2, 1.0)))
        .tessellate()
        .unwrap();
    let noise = Arc::new(FractalNoise::new(4, 7, -0.5, 0.7));
    let ground = Tessellator::with_displacement(9, 9, noise)
        .with_surface(Box::new(RectPlane::new(8.0, 8.0)))
        .tessellate()
        .unwrap();

    let material = || Material::solid(Color::ONE);
    scene
        .add_model(&sphere, material(), Mat4::from_translation(Vec3::new(1.5, 0.5, 0.0)))
        .unwrap();
    scene
        .add_model(&helix, material(), Mat4::from_translation(Vec3::new(-1.5, 0.0, 0.5)))
        .unwrap();
    scene
        .add_model(
            &polygonate(&ground).unwrap(),
            material(),
            Mat4::from_translation(Vec3::new(0.0, -2.0, 0.0)),
        )
        .unwrap();
    scene
}

/// Rays from a spiral of origins around the scene, aimed near its centre.
fn spiral_rays(count: usize) -> Vec<Ray> {
    let golden = PI * (3.0 - 5f32.sqrt());
    (0..count)
        .map(|i| {
            let y = 1.0 - 2.0 * (i as f32 + 0.5) / count as f32;
            let radius = (1.0 - y * y).sqrt();
            let theta = golden * i as f32;
            let origin = 9.0 * Vec3::new(radius * theta.cos(), y, radius * theta.sin());
            let wobble = 1.5 * Vec3::new((i as f32 * 0.37).sin(), (i as f32 * 0.71).cos(), 0.0);
            Ray::new(origin, (wobble - origin).normalize())
        })
        .collect()
}

#[test]
fn test_top_down_matches_no_acceleration() {
    let _ = env_logger::builder().is_test(true).try_init();
    let reference = RayTracer::no_acceleration(TracerOptions::default(), busy_scene()).unwrap();
    let accelerated = RayTracer::top_down_triple(TracerOptions::default(), busy_scene()).unwrap();

    let mut hits = 0;
    for ray in spiral_rays(400) {
        let expected = reference.intersect_scene(&ray);
        let actual = accelerated.intersect_scene(&ray);
        match (expected, actual) {
            (Some(e), Some(a)) => {
                hits += 1;
                assert!((e.point - a.point).length() < 1e-4, "{:?} vs {:?}", e.point, a.point);
                assert!((e.distance - a.distance).abs() < 1e-4);
            }
            (None, None) => {}
            (e, a) => panic!(
                "disagreement for {ray:?}: {:?} vs {:?}",
                e.map(|h| h.point),
                a.map(|h| h.point)
            ),
        }
    }
    assert!(hits > 100, "only {hits} spiral rays hit anything");
}

#[test]
fn test_grouped_models_match_flat_triangles() {
    let scene = busy_scene();
    let flat = Bound::no_acceleration(scene.intersectables());
    let grouped = Bound::top_down(scene.grouped_intersectables(), &TopDownOptions::default());
    assert!(grouped.check_sanity().is_ok());

    for ray in spiral_rays(200) {
        let expected = flat.intersect(&ray).map(|h| h.point);
        let actual = grouped.intersect(&ray).map(|h| h.point);
        match (expected, actual) {
            (Some(e), Some(a)) => assert!((e - a).length() < 1e-4),
            (None, None) => {}
            (e, a) => panic!("disagreement for {ray:?}: {e:?} vs {a:?}"),
        }
    }
}

#[test]
fn test_hierarchy_is_sane_for_every_split_setting() {
    for split_count in 2..=5 {
        for leaf_size in [1, 4, 16] {
            let options = TopDownOptions {
                leaf_size,
                split_count,
                ..TopDownOptions::default()
            };
            let tracer =
                RayTracer::with_top_down(TracerOptions::default(), busy_scene(), &options).unwrap();
            let stats = tracer.root().stats();
            assert_eq!(stats.primitives, tracer.scene().triangle_count());
            assert!(tracer.root().check_sanity().is_ok());
        }
    }
}

#[test]
fn test_spiral_rays_are_unit_length() {
    for ray in spiral_rays(16) {
        assert!((ray.direction.length() - 1.0).abs() < 1e-5);
        assert!((ray.origin.length() - 9.0).abs() < 1e-3);
    }
}
