//! Scale-aware epsilons and NaN-free normalisation.

use crate::Vec3;

/// Relative tolerance applied to the largest coordinate magnitude.
const RELATIVE_EPSILON: f32 = 1e-4;

/// Epsilon suited to positions around `v`: grows with the largest coordinate
/// so far-away geometry gets a proportionally larger offset.
pub fn scale_epsilon(v: Vec3) -> f32 {
    v.abs().max_element().max(1.0) * RELATIVE_EPSILON
}

/// Replaces exactly-zero components with a small epsilon.
pub fn prevent_zero(mut v: Vec3) -> Vec3 {
    let eps = scale_epsilon(v);
    for i in 0..3 {
        if v[i] == 0.0 {
            v[i] = eps;
        }
    }
    v
}

/// Normalises `v`, perturbing it first when it is too short to normalise.
pub fn safe_normalize(v: Vec3) -> Vec3 {
    if v.length_squared() > f32::MIN_POSITIVE {
        v.normalize()
    } else {
        prevent_zero(v).normalize()
    }
}
