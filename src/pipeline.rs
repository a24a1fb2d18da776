use anyhow::Result;

use crate::types::{landmark, Landmarks, Point3D, RgbFrame};

/// A face landmark detector: at most one face per frame.
pub trait Pipeline {
    fn name(&self) -> String;
    fn process(&mut self, frame: &RgbFrame) -> Result<Option<Landmarks>>;
}

/// Used when no ONNX models are available (`--simulate`).
///
/// Produces a relaxed face: eyes open, mouth closed, head level. The iris
/// point circles slowly around the middle of the frame so the cursor visibly
/// moves without ever triggering a click, scroll or exit.
pub struct SimulatedPipeline {
    frame_count: u32,
}

impl SimulatedPipeline {
    pub fn new() -> Self {
        Self { frame_count: 0 }
    }

    pub fn neutral_face(gaze_x: f32, gaze_y: f32) -> Landmarks {
        let mut points = vec![Point3D::new(0.5, 0.5); landmark::MESH_POINTS];
        points[landmark::UPPER_INNER_LIP].y = 0.66;
        points[landmark::LOWER_INNER_LIP].y = 0.67;
        points[landmark::LEFT_EYE_UPPER] = Point3D::new(0.40, 0.40);
        points[landmark::LEFT_EYE_LOWER] = Point3D::new(0.40, 0.42);
        points[landmark::RIGHT_EYE_UPPER] = Point3D::new(0.60, 0.40);
        points[landmark::RIGHT_EYE_LOWER] = Point3D::new(0.60, 0.42);
        points[landmark::GAZE_IRIS] = Point3D::new(gaze_x, gaze_y);
        Landmarks::new(points)
    }
}

impl Default for SimulatedPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline for SimulatedPipeline {
    fn name(&self) -> String {
        "Simulated Face (no ONNX)".to_string()
    }

    fn process(&mut self, _frame: &RgbFrame) -> Result<Option<Landmarks>> {
        self.frame_count = self.frame_count.wrapping_add(1);
        let t = self.frame_count as f32 * 0.02;
        Ok(Some(Self::neutral_face(0.5 + t.cos() * 0.2, 0.5 + t.sin() * 0.2)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture;

    #[test]
    fn test_simulated_face_is_neutral() {
        let mut pipeline = SimulatedPipeline::new();
        let frame = RgbFrame::new(8, 8);
        for _ in 0..200 {
            let lm = pipeline.process(&frame).unwrap().unwrap();
            assert!(!gesture::mouth_open(&lm));
            assert!(!gesture::left_eye_closed(&lm));
            assert!(!gesture::right_eye_closed(&lm));
            assert!(gesture::head_tilt(&lm).unwrap().abs() <= gesture::SCROLL_THRESHOLD);
            let gaze = lm.get(landmark::GAZE_IRIS).unwrap();
            assert!((0.0..=1.0).contains(&gaze.x) && (0.0..=1.0).contains(&gaze.y));
        }
    }
}
