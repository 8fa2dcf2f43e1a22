//! Procedural displacement along the surface normal.

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

/// Offset along the surface normal at a parameter pair.
pub trait Displacement: Send + Sync {
    fn displacement(&self, u: f32, v: f32) -> f32;
}

impl<F> Displacement for F
where
    F: Fn(f32, f32) -> f32 + Send + Sync,
{
    fn displacement(&self, u: f32, v: f32) -> f32 {
        self(u, v)
    }
}

/// Multi-octave Perlin noise remapped to `[min, max]`.
pub struct FractalNoise {
    fbm: Fbm<Perlin>,
    frequency: f64,
    min: f32,
    max: f32,
}

impl FractalNoise {
    pub const DEFAULT_FREQUENCY: f64 = 4.0;

    pub fn new(seed: u32, octaves: usize, min: f32, max: f32) -> Self {
        Self {
            fbm: Fbm::<Perlin>::new(seed).set_octaves(octaves),
            frequency: Self::DEFAULT_FREQUENCY,
            min,
            max,
        }
    }

    /// Number of noise features across the unit square.
    pub fn with_frequency(mut self, frequency: f64) -> Self {
        self.frequency = frequency;
        self
    }
}

impl Displacement for FractalNoise {
    fn displacement(&self, u: f32, v: f32) -> f32 {
        let raw = self
            .fbm
            .get([u as f64 * self.frequency, v as f64 * self.frequency]);
        let unit = ((raw.clamp(-1.0, 1.0) + 1.0) * 0.5) as f32;
        self.min + unit * (self.max - self.min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fractal_noise_in_range() {
        let noise = FractalNoise::new(4, 7, -0.5, 0.7);
        for i in 0..=20 {
            for j in 0..=20 {
                let d = noise.displacement(i as f32 / 20.0, j as f32 / 20.0);
                assert!((-0.5..=0.7).contains(&d), "displacement {d} out of range");
            }
        }
    }

    #[test]
    fn test_fractal_noise_deterministic() {
        let a = FractalNoise::new(11, 5, 0.0, 1.0);
        let b = FractalNoise::new(11, 5, 0.0, 1.0);
        assert_eq!(a.displacement(0.37, 0.81), b.displacement(0.37, 0.81));
    }

    #[test]
    fn test_fractal_noise_varies() {
        let noise = FractalNoise::new(4, 7, -0.5, 0.7);
        let samples: Vec<f32> = (0..10)
            .map(|i| noise.displacement(i as f32 * 0.093 + 0.01, 0.37))
            .collect();
        let spread = samples.iter().cloned().fold(f32::MIN, f32::max)
            - samples.iter().cloned().fold(f32::MAX, f32::min);
        assert!(spread > 0.0);
    }

    #[test]
    fn test_closure_displacement() {
        let bump = |u: f32, _v: f32| u * 2.0;
        assert_eq!(bump.displacement(0.25, 0.9), 0.5);
    }
}
