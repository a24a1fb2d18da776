use anyhow::Result;
use image::imageops::{self, FilterType};
use ort::session::Session;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::detector::{build_session, FaceDetector};
use crate::error::Error;
use crate::pipeline::Pipeline;
use crate::types::{landmark, Landmarks, Point3D, Rect, RgbFrame};

/// Extra context around the detected face box, as a fraction of its size.
const ROI_PADDING: f32 = 0.25;

/// Refined face mesh (478 points, iris included) on a detector crop.
pub struct FaceMeshPipeline {
    mesh_session: Session,
    detector: Option<FaceDetector>,
    input_size: u32,
}

impl FaceMeshPipeline {
    pub fn new(mesh_path: &Path, detector_path: &Path, input_size: u32) -> Result<Self> {
        if !mesh_path.exists() {
            return Err(Error::ModelMissing(mesh_path.to_path_buf()).into());
        }

        let detector = if detector_path.exists() {
            info!(path = %detector_path.display(), "loading face detector");
            Some(FaceDetector::new(detector_path)?)
        } else {
            warn!(path = %detector_path.display(), "face detector not found, meshing the full frame");
            None
        };

        info!(path = %mesh_path.display(), input_size, "loading face mesh");
        Ok(Self {
            mesh_session: build_session(mesh_path)?,
            detector,
            input_size,
        })
    }

    fn run_mesh(&mut self, crop: &RgbFrame) -> Result<Option<Vec<f32>>> {
        let size = self.input_size;
        let resized = imageops::resize(crop, size, size, FilterType::Triangle);

        // NHWC, 0..1
        let input: Vec<f32> = resized.pixels().flat_map(|p| p.0).map(|v| v as f32 / 255.0).collect();
        let tensor = ort::value::Tensor::from_array((vec![1usize, size as usize, size as usize, 3], input))?;
        let outputs = self.mesh_session.run(ort::inputs![tensor])?;
        let (_, raw) = outputs[0].try_extract_tensor::<f32>()?;

        if raw.len() < landmark::MESH_POINTS * 3 {
            warn!(values = raw.len(), "mesh output too small, is this the refined model?");
            return Ok(None);
        }
        Ok(Some(raw[..landmark::MESH_POINTS * 3].to_vec()))
    }
}

/// Grows the face box by [`ROI_PADDING`] and clips it to the frame.
/// `None` when less than one pixel of the box lies inside the frame.
pub(crate) fn padded_roi(rect: Rect, frame_w: u32, frame_h: u32) -> Option<Rect> {
    let fw = frame_w as f32;
    let fh = frame_h as f32;
    let x = (rect.x - rect.width * ROI_PADDING / 2.0).max(0.0);
    let y = (rect.y - rect.height * ROI_PADDING / 2.0).max(0.0);
    let right = (x + rect.width * (1.0 + ROI_PADDING)).min(fw);
    let bottom = (y + rect.height * (1.0 + ROI_PADDING)).min(fh);
    if right - x < 1.0 || bottom - y < 1.0 {
        return None;
    }
    Some(Rect::new(x, y, right - x, bottom - y))
}

/// Mesh coordinates (input pixels) -> frame-normalized landmarks.
pub(crate) fn to_normalized(raw: &[f32], roi: Rect, input_size: u32, frame_w: u32, frame_h: u32) -> Landmarks {
    let scale_x = roi.width / input_size as f32;
    let scale_y = roi.height / input_size as f32;
    let points = raw
        .chunks_exact(3)
        .map(|p| Point3D {
            x: (roi.x + p[0] * scale_x) / frame_w as f32,
            y: (roi.y + p[1] * scale_y) / frame_h as f32,
            z: p[2] / input_size as f32,
        })
        .collect();
    Landmarks::new(points)
}

impl Pipeline for FaceMeshPipeline {
    fn name(&self) -> String {
        format!("Face Mesh ({} pts)", landmark::MESH_POINTS)
    }

    fn process(&mut self, frame: &RgbFrame) -> Result<Option<Landmarks>> {
        let (fw, fh) = frame.dimensions();

        let roi = match &mut self.detector {
            Some(det) => match det.detect(frame)? {
                Some(rect) => match padded_roi(rect, fw, fh) {
                    Some(roi) => roi,
                    None => {
                        debug!(?rect, "face box outside the frame");
                        return Ok(None);
                    }
                },
                None => return Ok(None),
            },
            None => Rect::new(0.0, 0.0, fw as f32, fh as f32),
        };

        let crop = imageops::crop_imm(frame, roi.x as u32, roi.y as u32, roi.width as u32, roi.height as u32).to_image();
        let Some(raw) = self.run_mesh(&crop)? else {
            return Ok(None);
        };
        Ok(Some(to_normalized(&raw, roi, self.input_size, fw, fh)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roi_is_padded_and_clipped() {
        let roi = padded_roi(Rect::new(10.0, 100.0, 200.0, 200.0), 640, 280).unwrap();
        assert_eq!(roi.x, 0.0);
        assert_eq!(roi.y, 75.0);
        assert_eq!(roi.width, 250.0);
        assert_eq!(roi.height, 205.0);
    }

    #[test]
    fn test_roi_outside_frame_is_rejected() {
        assert_eq!(padded_roi(Rect::new(660.0, 100.0, 20.0, 20.0), 640, 480), None);
        assert_eq!(padded_roi(Rect::new(100.0, 500.0, 20.0, 20.0), 640, 480), None);
        assert_eq!(padded_roi(Rect::new(100.0, 100.0, 0.0, 20.0), 640, 480), None);
    }

    #[test]
    fn test_roi_straddling_edge_is_clipped() {
        let roi = padded_roi(Rect::new(630.0, 100.0, 40.0, 40.0), 640, 480).unwrap();
        assert_eq!(roi.x, 625.0);
        assert_eq!(roi.width, 15.0);
        assert_eq!(roi.y, 95.0);
        assert_eq!(roi.height, 50.0);
    }

    #[test]
    fn test_mesh_points_map_into_frame_space() {
        let raw = [128.0, 64.0, 0.0, 0.0, 256.0, 0.0];
        let roi = Rect::new(100.0, 50.0, 200.0, 100.0);
        let lm = to_normalized(&raw, roi, 256, 400, 200);
        assert_eq!(lm.len(), 2);
        let p = lm.get(0).unwrap();
        assert!((p.x - 0.5).abs() < 1e-6);
        assert!((p.y - 0.375).abs() < 1e-6);
        let q = lm.get(1).unwrap();
        assert!((q.x - 0.25).abs() < 1e-6);
        assert!((q.y - 0.75).abs() < 1e-6);
    }
}
