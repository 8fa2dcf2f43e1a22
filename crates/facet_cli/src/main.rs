//! `facet <scene> [settings.json] [output.png]`
//!
//! Builds one of the demo scenes, ray traces it and writes the image.

mod scenes;
mod settings;

use anyhow::{Context, Result};
use facet_tracer::RayTracer;

use crate::settings::RenderSettings;

/// Seed for the procedural textures and noise of the demo scenes.
const DEMO_SEED: u64 = 4;

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let mut args = std::env::args().skip(1);
    let scene_name = args.next().unwrap_or_else(|| "helix".to_string());
    let settings = match args.next() {
        Some(path) => RenderSettings::load(path)?,
        None => RenderSettings::default(),
    };
    let output = args.next().unwrap_or_else(|| format!("{scene_name}.png"));

    log::info!("Starting facet: scene '{scene_name}'");
    let demo = scenes::build(&scene_name, DEMO_SEED)?;

    let options = settings.tracer_options();
    let tracer = if settings.accelerate {
        RayTracer::top_down_triple(options, demo.scene)
    } else {
        RayTracer::no_acceleration(options, demo.scene)
    }
    .context("Failed to build acceleration structure")?;

    tracer
        .render_to_file(&settings.camera(), &demo.lights, &output)
        .with_context(|| format!("Failed to render {output}"))?;
    Ok(())
}
