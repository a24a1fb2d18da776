use anyhow::Result;
use clap::Parser;
use std::time::Duration;
use tracing::info;

use eye_mouse::args::Args;
use eye_mouse::camera::{self, CameraSource};
use eye_mouse::config::AppConfig;
use eye_mouse::inference::FaceMeshPipeline;
use eye_mouse::logging::init_logging;
use eye_mouse::output::WindowOutput;
use eye_mouse::overlay::OverlayRenderer;
use eye_mouse::pipeline::{Pipeline, SimulatedPipeline};
use eye_mouse::pointer::{EnigoPointer, LoggingPointer, PointerDriver};
use eye_mouse::session::{GestureLoop, LoopSettings, SystemClock};
use eye_mouse::ttf::FontRenderer;
use eye_mouse::types::ScreenSize;

fn create_pipeline(config: &AppConfig, simulate: bool) -> Result<Box<dyn Pipeline>> {
    if simulate {
        return Ok(Box::new(SimulatedPipeline::new()));
    }
    let models = &config.models;
    Ok(Box::new(FaceMeshPipeline::new(&models.face_mesh, &models.face_detection, models.mesh_input_size)?))
}

fn run_session<P: PointerDriver>(config: &AppConfig, args: &Args, pointer: P) -> Result<()> {
    let screen = match config.screen.size() {
        Some(size) => size,
        None => pointer.screen_size()?,
    };

    let camera = CameraSource::new(config.camera.index)?;
    let window = WindowOutput::new(&config.ui.window_title, camera.width() as usize, camera.height() as usize)?;
    let pipeline = create_pipeline(config, args.simulate)?;
    println!("Active Pipeline: {}", pipeline.name());

    let overlay = OverlayRenderer::new(
        config.ui.marker_radius,
        FontRenderer::try_load(&config.ui.font_family),
        config.ui.font_size_pt,
    );
    let settings = LoopSettings {
        mirror: config.camera.mirror,
        screen,
        time_limit: config.session.time_limit(),
        stats_interval: config.session.stats_interval(),
    };

    let mut session = GestureLoop::new(camera, pipeline, window, pointer, SystemClock, overlay, settings);
    let summary = session.run()?;
    info!(reason = ?summary.reason, frames = summary.frames, "done");
    Ok(())
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    if args.list {
        return camera::list_cameras();
    }

    let mut config = AppConfig::load(&args.config)?;
    if let Some(index) = args.cam_index {
        config.camera.index = index;
    }
    if let Some(secs) = args.time_limit {
        config.session.time_limit_secs = secs;
    }
    info!(limit = ?Duration::from_secs(config.session.time_limit_secs), "configuration ready");

    if args.dry_run {
        let screen = config.screen.size().unwrap_or(ScreenSize::new(1920, 1080));
        run_session(&config, &args, LoggingPointer::new(screen))
    } else {
        run_session(&config, &args, EnigoPointer::new()?)
    }
}
