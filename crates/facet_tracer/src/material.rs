//! Surface materials: a diffuse texture plus transparency, refraction and
//! reflectivity options.

use crate::texture::{Color, Texture};

/// Refractive index of air, used whenever a ray is not inside any model.
pub const AIR_INDEX: f32 = 1.0003;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialOptions {
    /// 0 is opaque, 1 lets all light through.
    pub transparency: f32,
    pub refractive_index: f32,
    pub reflectivity: f32,
}

impl MaterialOptions {
    pub const DEFAULT: MaterialOptions = MaterialOptions {
        transparency: 0.0,
        refractive_index: AIR_INDEX,
        reflectivity: 0.0,
    };

    pub fn with_transparency(mut self, transparency: f32) -> Self {
        self.transparency = transparency.clamp(0.0, 1.0);
        self
    }

    pub fn with_refractive_index(mut self, index: f32) -> Self {
        self.refractive_index = index;
        self
    }

    pub fn with_reflectivity(mut self, reflectivity: f32) -> Self {
        self.reflectivity = reflectivity.clamp(0.0, 1.0);
        self
    }
}

impl Default for MaterialOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Material owned by a model and shared by all of its triangles.
#[derive(Debug, Clone)]
pub struct Material {
    diffuse: Texture,
    options: MaterialOptions,
}

/// Material of the medium outside every model.
pub static AIR_MATERIAL: Material = Material {
    diffuse: Texture::Solid(Color::ONE),
    options: MaterialOptions {
        transparency: 1.0,
        refractive_index: AIR_INDEX,
        reflectivity: 0.0,
    },
};

impl Material {
    pub fn new(diffuse: Texture) -> Self {
        Self::with_options(diffuse, MaterialOptions::DEFAULT)
    }

    pub fn with_options(diffuse: Texture, options: MaterialOptions) -> Self {
        Self { diffuse, options }
    }

    /// Opaque material of a single colour.
    pub fn solid(color: Color) -> Self {
        Self::new(Texture::Solid(color))
    }

    pub fn diffuse(&self) -> &Texture {
        &self.diffuse
    }

    pub fn options(&self) -> &MaterialOptions {
        &self.options
    }

    pub fn transparency(&self) -> f32 {
        self.options.transparency
    }

    pub fn refractive_index(&self) -> f32 {
        self.options.refractive_index
    }

    pub fn reflectivity(&self) -> f32 {
        self.options.reflectivity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_air() {
        assert_eq!(AIR_MATERIAL.transparency(), 1.0);
        assert!((AIR_MATERIAL.refractive_index() - 1.0003).abs() < 1e-6);
        assert_eq!(AIR_MATERIAL.reflectivity(), 0.0);
    }

    #[test]
    fn test_options_clamped() {
        let options = MaterialOptions::default()
            .with_transparency(1.5)
            .with_reflectivity(-0.2)
            .with_refractive_index(1.5);
        assert_eq!(options.transparency, 1.0);
        assert_eq!(options.reflectivity, 0.0);
        assert_eq!(options.refractive_index, 1.5);
    }
}
