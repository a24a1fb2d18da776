use anyhow::{anyhow, Context, Result};
use colored::*;
use image::ImageBuffer;
use nokhwa::{
    pixel_format::RgbFormat,
    utils::{ApiBackend, CameraIndex, RequestedFormat, RequestedFormatType},
    Camera,
};
use tracing::{info, warn};

use crate::error::Error;
use crate::types::RgbFrame;

/// Something that yields camera frames until it fails.
pub trait FrameSource {
    fn capture(&mut self) -> Result<RgbFrame>;

    /// Gives the device back. Must be safe to call more than once.
    fn release(&mut self) {}
}

pub struct CameraSource {
    camera: Camera,
    released: bool,
}

impl CameraSource {
    pub fn new(index: u32) -> Result<Self> {
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
        let mut camera = Camera::new(CameraIndex::Index(index), requested)
            .map_err(|e| Error::Camera(e.to_string()))
            .context("Failed to create camera instance")?;

        camera
            .open_stream()
            .map_err(|e| Error::Camera(e.to_string()))
            .context("Failed to open camera stream")?;

        println!("{}", format!("Opened camera: {}", camera.info().human_name()).green());
        info!(format = %camera.camera_format(), "camera stream open");

        Ok(Self { camera, released: false })
    }

    pub fn width(&self) -> u32 {
        self.camera.resolution().width()
    }

    pub fn height(&self) -> u32 {
        self.camera.resolution().height()
    }
}

impl FrameSource for CameraSource {
    fn capture(&mut self) -> Result<RgbFrame> {
        let frame = self.camera.frame().map_err(|e| anyhow!(e)).context("Failed to get frame")?;
        let decoded = frame
            .decode_image::<RgbFormat>()
            .map_err(|e| anyhow!(e))
            .context("Failed to decode frame")?;
        let (w, h) = (decoded.width(), decoded.height());
        ImageBuffer::from_raw(w, h, decoded.into_raw()).ok_or_else(|| anyhow!("frame buffer size mismatch"))
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        match self.camera.stop_stream() {
            Ok(()) => info!("camera released"),
            Err(e) => warn!(error = %e, "failed to stop camera stream"),
        }
    }
}

impl Drop for CameraSource {
    fn drop(&mut self) {
        self.release();
    }
}

/// Prints the cameras visible to the native backend.
pub fn list_cameras() -> Result<()> {
    let cameras = nokhwa::query(ApiBackend::Auto).map_err(|e| Error::Camera(e.to_string()))?;
    println!("Available Cameras:");
    println!("{:<5} | {:<30} | {:<10}", "Index", "Name", "Misc");
    println!("{}", "-".repeat(60));
    for cam in cameras {
        println!("{:<5} | {:<30} | {:?}", cam.index(), cam.human_name(), cam.misc());
    }
    Ok(())
}
