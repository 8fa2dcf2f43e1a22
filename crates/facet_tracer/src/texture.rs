//! Diffuse textures sampled at hit-point UVs.
//!
//! Textures are either a single colour or an RGB image shared between
//! materials. Image lookups wrap UVs into `[0, 1)` and take the nearest
//! texel; no filtering is applied.

use std::sync::Arc;

use facet_math::{Vec2, Vec3};
use image::{Rgb, RgbImage};

/// Linear RGB in `[0, 1]` per channel.
pub type Color = Vec3;

#[derive(Debug, Clone)]
pub enum Texture {
    Solid(Color),
    Image(Arc<RgbImage>),
}

impl Texture {
    pub fn solid_color(color: Color) -> Self {
        Texture::Solid(color)
    }

    pub fn from_image(image: RgbImage) -> Self {
        Texture::Image(Arc::new(image))
    }

    /// Square checkerboard of `cells x cells` squares, `size` texels wide.
    pub fn checker(size: u32, cells: u32, even: Color, odd: Color) -> Self {
        let cell = (size / cells.max(1)).max(1);
        let (even, odd) = (to_rgb(even), to_rgb(odd));
        Self::from_image(RgbImage::from_fn(size, size, |x, y| {
            if (x / cell + y / cell) % 2 == 0 {
                even
            } else {
                odd
            }
        }))
    }

    /// Colour at `uv`. UVs outside the unit square wrap around.
    pub fn sample(&self, uv: Vec2) -> Color {
        match self {
            Texture::Solid(color) => *color,
            Texture::Image(image) => {
                let (width, height) = image.dimensions();
                if width == 0 || height == 0 {
                    return Color::ZERO;
                }
                let x = texel_index(uv.x, width);
                let y = texel_index(uv.y, height);
                let Rgb([r, g, b]) = *image.get_pixel(x, y);
                Color::new(r as f32, g as f32, b as f32) / 255.0
            }
        }
    }
}

fn texel_index(coord: f32, extent: u32) -> u32 {
    let wrapped = coord.rem_euclid(1.0);
    let index = (wrapped * extent as f32).round();
    (index.max(0.0) as u32).min(extent - 1)
}

fn to_rgb(color: Color) -> Rgb<u8> {
    let [r, g, b] = crate::tracer::color_to_rgb(color);
    Rgb([r, g, b])
}
