//! Parametric surfaces consumed by the tessellators.

use std::f32::consts::{PI, TAU};

use facet_math::Vec3;

/// Position and normal of a surface at one `(u, v)` parameter pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    pub position: Vec3,
    pub normal: Vec3,
}

/// A continuous surface over the closed unit square.
///
/// Implementations orient `normal` like `dP/dv x dP/du`, which is what the
/// finite-difference tessellators reproduce numerically.
pub trait Surface: Send + Sync {
    /// Sample the surface at `u, v` in `[0, 1]`.
    fn sample(&self, u: f32, v: f32) -> SurfaceSample;

    /// True when the surface is periodic in `u` (`u = 1` coincides with `u = 0`).
    fn is_closed(&self) -> bool {
        false
    }
}

/// Sphere centred at the origin. `u` runs around the Y axis, `v` from the
/// south pole (`v = 0`) to the north pole.
#[derive(Debug, Clone, Copy)]
pub struct Sphere {
    pub radius: f32,
}

impl Sphere {
    pub fn new(radius: f32) -> Self {
        Self { radius }
    }
}

impl Surface for Sphere {
    fn sample(&self, u: f32, v: f32) -> SurfaceSample {
        let phi = TAU * u;
        let theta = PI * v;
        let normal = Vec3::new(
            theta.sin() * phi.cos(),
            -theta.cos(),
            theta.sin() * phi.sin(),
        );
        SurfaceSample {
            position: normal * self.radius,
            normal,
        }
    }

    fn is_closed(&self) -> bool {
        true
    }
}

/// Rectangle in the XZ plane centred at the origin, facing +Y.
#[derive(Debug, Clone, Copy)]
pub struct RectPlane {
    pub width: f32,
    pub depth: f32,
}

impl RectPlane {
    pub fn new(width: f32, depth: f32) -> Self {
        Self { width, depth }
    }
}

impl Surface for RectPlane {
    fn sample(&self, u: f32, v: f32) -> SurfaceSample {
        SurfaceSample {
            position: Vec3::new((u - 0.5) * self.width, 0.0, (v - 0.5) * self.depth),
            normal: Vec3::Y,
        }
    }
}

/// Tube swept along a helix around the Y axis.
///
/// `u` runs around the tube cross-section (closed), `v` along the helix
/// from `y = -height / 2` to `y = height / 2`.
#[derive(Debug, Clone, Copy)]
pub struct Helix {
    pub radius: f32,
    pub height: f32,
    pub tube_radius: f32,
    /// Vertical rise per full revolution.
    pub pitch: f32,
}

impl Helix {
    pub fn new(radius: f32, height: f32, tube_radius: f32, pitch: f32) -> Self {
        Self {
            radius,
            height,
            tube_radius,
            pitch,
        }
    }

    fn angular_rate(&self) -> f32 {
        TAU * self.height / self.pitch
    }
}

impl Surface for Helix {
    fn sample(&self, u: f32, v: f32) -> SurfaceSample {
        let omega = self.angular_rate();
        let angle = omega * v;
        let centre = Vec3::new(
            self.radius * angle.cos(),
            self.height * (v - 0.5),
            self.radius * angle.sin(),
        );
        let tangent = Vec3::new(
            -self.radius * omega * angle.sin(),
            self.height,
            self.radius * omega * angle.cos(),
        )
        .normalize();
        let radial = Vec3::new(angle.cos(), 0.0, angle.sin());
        let binormal = radial.cross(tangent);

        let around = TAU * u;
        let normal = radial * around.cos() + binormal * around.sin();
        SurfaceSample {
            position: centre + normal * self.tube_radius,
            normal,
        }
    }

    fn is_closed(&self) -> bool {
        true
    }
}
