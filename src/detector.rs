use anyhow::Result;
use image::imageops::{self, FilterType};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use std::path::Path;

use crate::types::{Rect, RgbFrame};

const INPUT_W: u32 = 320;
const INPUT_H: u32 = 240;
const SCORE_THRESHOLD: f32 = 0.7;
const CENTER_VARIANCE: f32 = 0.1;
const SIZE_VARIANCE: f32 = 0.2;

/// (cx, cy, w, h), normalized to the detector input.
type Anchor = (f32, f32, f32, f32);

/// UltraFace RFB-320 face box detector used to crop before the mesh model.
pub struct FaceDetector {
    session: Session,
    anchors: Vec<Anchor>,
}

pub(crate) fn build_session(model_path: &Path) -> Result<Session> {
    let session = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(4)?
        .with_execution_providers([ort::execution_providers::CPUExecutionProvider::default().build()])?
        .commit_from_file(model_path)?;
    Ok(session)
}

impl FaceDetector {
    pub fn new(model_path: &Path) -> Result<Self> {
        Ok(Self {
            session: build_session(model_path)?,
            anchors: generate_anchors(INPUT_W as usize, INPUT_H as usize),
        })
    }

    /// Best face box in frame pixels, if any scores above the threshold.
    pub fn detect(&mut self, frame: &RgbFrame) -> Result<Option<Rect>> {
        let resized = imageops::resize(frame, INPUT_W, INPUT_H, FilterType::Triangle);

        // NCHW, (pixel - 127) / 128
        let plane = (INPUT_W * INPUT_H) as usize;
        let mut input = vec![0.0f32; 3 * plane];
        for (i, px) in resized.pixels().enumerate() {
            for c in 0..3 {
                input[c * plane + i] = (px[c] as f32 - 127.0) / 128.0;
            }
        }

        let tensor = Tensor::from_array((vec![1usize, 3, INPUT_H as usize, INPUT_W as usize], input))?;
        let outputs = self.session.run(ort::inputs![tensor])?;
        let (_, scores) = outputs["scores"].try_extract_tensor::<f32>()?;
        let (_, boxes) = outputs["boxes"].try_extract_tensor::<f32>()?;

        let Some(rect) = best_box(&self.anchors, scores, boxes, SCORE_THRESHOLD) else {
            return Ok(None);
        };

        let sx = frame.width() as f32;
        let sy = frame.height() as f32;
        Ok(Some(Rect::new(rect.x * sx, rect.y * sy, rect.width * sx, rect.height * sy)))
    }
}

/// Decodes the highest scoring box. Output rect is normalized (0..1).
fn best_box(anchors: &[Anchor], scores: &[f32], boxes: &[f32], threshold: f32) -> Option<Rect> {
    let mut best_score = threshold;
    let mut best = None;

    for (i, &(ax, ay, aw, ah)) in anchors.iter().enumerate() {
        let Some(&score) = scores.get(i * 2 + 1) else { break };
        if score <= best_score {
            continue;
        }
        let Some(enc) = boxes.get(i * 4..i * 4 + 4) else { break };

        let cx = enc[0] * CENTER_VARIANCE * aw + ax;
        let cy = enc[1] * CENTER_VARIANCE * ah + ay;
        let w = (enc[2] * SIZE_VARIANCE).exp() * aw;
        let h = (enc[3] * SIZE_VARIANCE).exp() * ah;

        best_score = score;
        best = Some(Rect::new(cx - w / 2.0, cy - h / 2.0, w, h));
    }
    best
}

fn generate_anchors(width: usize, height: usize) -> Vec<Anchor> {
    const STRIDES: [usize; 4] = [8, 16, 32, 64];
    const MIN_BOXES: [&[f32]; 4] = [&[10.0, 16.0, 24.0], &[32.0, 48.0], &[64.0, 96.0], &[128.0, 192.0, 256.0]];

    let w = width as f32;
    let h = height as f32;
    let mut anchors = Vec::new();

    for (stride, sizes) in STRIDES.iter().zip(MIN_BOXES.iter()) {
        let s = *stride as f32;
        let feature_w = (w / s).ceil() as usize;
        let feature_h = (h / s).ceil() as usize;
        for v in 0..feature_h {
            for u in 0..feature_w {
                let cx = (u as f32 + 0.5) * s / w;
                let cy = (v as f32 + 0.5) * s / h;
                for &size in sizes.iter() {
                    anchors.push((cx, cy, size / w, size / h));
                }
            }
        }
    }
    anchors
}
