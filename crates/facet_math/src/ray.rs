use crate::{scale_epsilon, Vec3};

/// A half-line starting at `origin` and travelling along `direction`.
///
/// The direction is not required to be unit length; hit distances are
/// expressed in multiples of it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Ray with the origin nudged along the direction by a scale-dependent
    /// epsilon, so secondary rays do not re-hit the surface they leave.
    pub fn nudged(self) -> Ray {
        Ray {
            origin: self.origin + scale_epsilon(self.origin) * self.direction,
            direction: self.direction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        assert_eq!(ray.at(0.0), Vec3::ZERO);
        assert_eq!(ray.at(2.0), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(ray.at(-1.0), Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_ray_nudged_moves_forward() {
        let ray = Ray::new(Vec3::new(100.0, 0.0, 0.0), Vec3::Y).nudged();
        assert_eq!(ray.origin.x, 100.0);
        assert!(ray.origin.y > 0.0);
        assert_eq!(ray.direction, Vec3::Y);
    }
}
