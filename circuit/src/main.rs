use anyhow::Result;

use circuit_graphics::{
    gpu::headless::HeadlessDevice,
    renderer::TrackRenderer,
    track::{ribbon::RibbonMeshBuilder, TrackGeometry},
};

use crate::config::{parse::parse_track_file, TrackSettings};
use crate::game::{camera::ChaseCamera, pilot::Autopilot, FrameLoop};

mod config;
mod game;

fn main() -> Result<()> {
    let env = env_logger::Env::default()
        .filter_or("CIRCUIT_LOG_LEVEL", "info")
        .write_style_or("CIRCUIT_LOG_STYLE", "always");
    env_logger::init_from_env(env);

    log::info!("Starting Circuit...");

    let settings = match std::env::args().nth(1) {
        Some(track_file) => parse_track_file(&track_file)?,
        None => {
            log::info!("No track file given, using default track settings");
            TrackSettings::default()
        }
    };

    let geometry = TrackGeometry::generate(&settings.parameters)?;
    let track_mesh = RibbonMeshBuilder::new(&geometry).build();
    let mut renderer = TrackRenderer::new(HeadlessDevice::new(), &track_mesh)?;

    let mut pilot = Autopilot::new(geometry.centerline(), settings.pilot_speed);
    log::info!("Lap length {:.1}", pilot.lap_length());

    FrameLoop::new(settings.frame_count, settings.target_fps).run(
        &mut renderer,
        &mut pilot,
        &ChaseCamera::default(),
    )?;

    log::info!("{:?}", renderer.device().stats());

    Ok(())
}
