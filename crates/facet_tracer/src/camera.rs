//! Pinhole camera producing primary rays.

use facet_math::{Ray, Vec3};

/// Camera for generating rays into the scene.
///
/// Each pixel is sampled on a regular `samples_per_axis x samples_per_axis`
/// sub-pixel grid, so renders are deterministic. Every builder step keeps
/// the viewport up to date, so a camera is always ready to generate rays.
#[derive(Debug, Clone)]
pub struct Camera {
    image_width: u32,
    image_height: u32,
    samples_per_axis: u32,

    look_from: Vec3,
    look_at: Vec3,
    vup: Vec3,
    vfov: f32, // Vertical field of view in degrees

    // Cached computed values (set by update_viewport())
    pixel00_loc: Vec3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
}

impl Camera {
    pub fn new() -> Self {
        let mut camera = Self {
            image_width: 640,
            image_height: 480,
            samples_per_axis: 1,
            look_from: Vec3::new(0.0, 0.0, 5.0),
            look_at: Vec3::ZERO,
            vup: Vec3::Y,
            vfov: 45.0,
            pixel00_loc: Vec3::ZERO,
            pixel_delta_u: Vec3::ZERO,
            pixel_delta_v: Vec3::ZERO,
        };
        camera.update_viewport();
        camera
    }

    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width.max(1);
        self.image_height = height.max(1);
        self.update_viewport();
        self
    }

    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self.update_viewport();
        self
    }

    /// Vertical field of view in degrees.
    pub fn with_fov(mut self, vfov: f32) -> Self {
        self.vfov = vfov;
        self.update_viewport();
        self
    }

    pub fn with_samples_per_axis(mut self, samples: u32) -> Self {
        self.samples_per_axis = samples.max(1);
        self
    }

    pub fn image_width(&self) -> u32 {
        self.image_width
    }

    pub fn image_height(&self) -> u32 {
        self.image_height
    }

    pub fn samples_per_axis(&self) -> u32 {
        self.samples_per_axis
    }

    pub fn position(&self) -> Vec3 {
        self.look_from
    }

    fn update_viewport(&mut self) {
        let h = (self.vfov.to_radians() / 2.0).tan();
        let viewport_height = 2.0 * h;
        let viewport_width = viewport_height * (self.image_width as f32 / self.image_height as f32);

        let w = (self.look_from - self.look_at).normalize_or_zero();
        let u = self.vup.cross(w).normalize_or_zero();
        let v = w.cross(u);

        let viewport_u = viewport_width * u;
        let viewport_v = -viewport_height * v;
        self.pixel_delta_u = viewport_u / self.image_width as f32;
        self.pixel_delta_v = viewport_v / self.image_height as f32;
        self.pixel00_loc = self.look_from - w - viewport_u / 2.0 - viewport_v / 2.0;
    }

    /// Unit-direction rays through the sub-pixel grid of pixel `(x, y)`,
    /// with `y = 0` the top row.
    pub fn screen_rays(&self, x: u32, y: u32) -> Vec<Ray> {
        let n = self.samples_per_axis;
        let step = 1.0 / n as f32;
        let mut rays = Vec::with_capacity((n * n) as usize);
        for j in 0..n {
            for i in 0..n {
                let sample = self.pixel00_loc
                    + (x as f32 + (i as f32 + 0.5) * step) * self.pixel_delta_u
                    + (y as f32 + (j as f32 + 0.5) * step) * self.pixel_delta_v;
                let direction = (sample - self.look_from).normalize_or_zero();
                rays.push(Ray::new(self.look_from, direction));
            }
        }
        rays
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn looking_down_z(width: u32, height: u32) -> Camera {
        Camera::new()
            .with_resolution(width, height)
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_fov(90.0)
    }

    #[test]
    fn test_center_ray_points_forward() {
        let camera = looking_down_z(101, 101);
        let rays = camera.screen_rays(50, 50);
        assert_eq!(rays.len(), 1);
        assert!((rays[0].direction - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
        assert_eq!(rays[0].origin, Vec3::ZERO);
    }

    #[test]
    fn test_corners_follow_image_orientation() {
        let camera = looking_down_z(100, 100);
        let top_left = camera.screen_rays(0, 0)[0].direction;
        let bottom_right = camera.screen_rays(99, 99)[0].direction;
        assert!(top_left.x < 0.0 && top_left.y > 0.0);
        assert!(bottom_right.x > 0.0 && bottom_right.y < 0.0);
        // 90 degree fov: the edge of the viewport is at 45 degrees.
        assert!((top_left.y / -top_left.z) < 1.0 && (top_left.y / -top_left.z) > 0.95);
    }

    #[test]
    fn test_sub_pixel_grid() {
        let camera = looking_down_z(10, 10).with_samples_per_axis(3);
        let rays = camera.screen_rays(4, 4);
        assert_eq!(rays.len(), 9);
        for ray in &rays {
            assert!((ray.direction.length() - 1.0).abs() < 1e-5);
        }
        // Samples step right along a row, then down.
        assert!(rays[1].direction.x > rays[0].direction.x);
        assert!(rays[3].direction.y < rays[0].direction.y);
    }

    #[test]
    fn test_default_camera_is_ready() {
        // Looks from +5 on z towards the origin.
        let camera = Camera::new();
        let rays = camera.screen_rays(320, 240);
        assert!(rays[0].direction.z < -0.99);
    }

    #[test]
    fn test_zero_resolution_and_samples_are_clamped() {
        let camera = Camera::new().with_resolution(0, 0).with_samples_per_axis(0);
        assert_eq!((camera.image_width(), camera.image_height()), (1, 1));
        assert_eq!(camera.samples_per_axis(), 1);
        assert_eq!(camera.screen_rays(0, 0).len(), 1);
    }

    #[test]
    fn test_changing_view_after_resolution() {
        // Reframing updates the viewport whatever order the builder runs in.
        let camera = Camera::new()
            .with_fov(90.0)
            .with_position(Vec3::ZERO, Vec3::X, Vec3::Y)
            .with_resolution(9, 9);
        let center = camera.screen_rays(4, 4)[0].direction;
        assert!((center - Vec3::X).length() < 1e-5);
    }
}
