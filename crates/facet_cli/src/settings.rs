//! Render settings read from an optional JSON file.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use facet_tracer::{Camera, TracerOptions, Vec3};
use serde::Deserialize;

/// Every field is optional in the file; missing ones take the defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    pub camera_position: [f32; 3],
    pub look_at: [f32; 3],
    /// Vertical field of view in degrees.
    pub vfov: f32,
    pub samples_per_axis: u32,
    /// Build the top-down hierarchy instead of a single flat leaf.
    pub accelerate: bool,
    pub background: [f32; 3],
    pub max_depth: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        let options = TracerOptions::default();
        Self {
            width: 640,
            height: 480,
            camera_position: [0.0, 3.0, 9.0],
            look_at: [0.0, 0.5, 0.0],
            vfov: 40.0,
            samples_per_axis: 1,
            accelerate: true,
            background: options.background.to_array(),
            max_depth: options.max_depth,
        }
    }
}

impl RenderSettings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open settings file {}", path.display()))?;
        let settings = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse settings file {}", path.display()))?;
        Ok(settings)
    }

    pub fn camera(&self) -> Camera {
        Camera::new()
            .with_resolution(self.width, self.height)
            .with_position(
                Vec3::from_array(self.camera_position),
                Vec3::from_array(self.look_at),
                Vec3::Y,
            )
            .with_fov(self.vfov)
            .with_samples_per_axis(self.samples_per_axis)
    }

    pub fn tracer_options(&self) -> TracerOptions {
        TracerOptions {
            background: Vec3::from_array(self.background),
            max_depth: self.max_depth,
            ..TracerOptions::default()
        }
    }
}
