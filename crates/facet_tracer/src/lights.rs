//! Light descriptors borrowed by the tracer for one render.

use facet_math::Vec3;

use crate::texture::Color;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Color,
    pub linear_attenuation: f32,
    pub quadratic_attenuation: f32,
}

impl PointLight {
    pub fn new(position: Vec3, color: Color) -> Self {
        Self {
            position,
            color,
            linear_attenuation: 0.2,
            quadratic_attenuation: 0.4,
        }
    }

    pub fn with_attenuation(mut self, linear: f32, quadratic: f32) -> Self {
        self.linear_attenuation = linear;
        self.quadratic_attenuation = quadratic;
        self
    }
}

/// Light arriving from infinitely far away along `direction`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// Direction the light travels, not the direction towards it.
    pub direction: Vec3,
    pub color: Color,
}

impl DirectionalLight {
    pub fn new(direction: Vec3, color: Color) -> Self {
        Self { direction, color }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneLights {
    pub points: Vec<PointLight>,
    pub directional: Option<DirectionalLight>,
}

impl SceneLights {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_point(mut self, light: PointLight) -> Self {
        self.points.push(light);
        self
    }

    pub fn with_directional(mut self, light: DirectionalLight) -> Self {
        self.directional = Some(light);
        self
    }
}
