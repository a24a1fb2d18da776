//! Debug overlay drawn onto the mirrored camera frame before it is shown.

use image::Rgb;

use crate::font;
use crate::ttf::FontRenderer;
use crate::types::{landmark, Landmarks, RgbFrame};

pub const CAPTION: &str = "Open mouth to exit";

const EYE_COLOR: Rgb<u8> = Rgb([255, 255, 0]);
const GAZE_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const CAPTION_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const CAPTION_X: u32 = 10;
const CAPTION_BASELINE: u32 = 30;
const BITMAP_SCALE: u32 = 3;

pub struct OverlayRenderer {
    marker_radius: i32,
    font: Option<FontRenderer>,
    font_size_pt: f32,
}

impl OverlayRenderer {
    pub fn new(marker_radius: u32, font: Option<FontRenderer>, font_size_pt: f32) -> Self {
        Self {
            marker_radius: marker_radius as i32,
            font,
            font_size_pt,
        }
    }

    /// Eye markers and the gaze point when a face is present, then the caption.
    pub fn draw(&self, frame: &mut RgbFrame, landmarks: Option<&Landmarks>) {
        if let Some(lm) = landmarks {
            for idx in landmark::EYE_MARKERS {
                if let Some(p) = lm.get(idx) {
                    self.draw_marker(frame, p.x, p.y, EYE_COLOR);
                }
            }
            if let Some(gaze) = lm.get(landmark::GAZE_IRIS) {
                self.draw_marker(frame, gaze.x, gaze.y, GAZE_COLOR);
            }
        }
        self.draw_caption(frame);
    }

    fn draw_marker(&self, frame: &mut RgbFrame, nx: f32, ny: f32, color: Rgb<u8>) {
        let (w, h) = frame.dimensions();
        let cx = (nx * w as f32) as i32;
        let cy = (ny * h as f32) as i32;
        fill_circle(frame, cx, cy, self.marker_radius, color);
    }

    fn draw_caption(&self, frame: &mut RgbFrame) {
        match &self.font {
            Some(fr) => fr.draw_text(frame, CAPTION_X, CAPTION_BASELINE, CAPTION, CAPTION_COLOR, self.font_size_pt),
            None => {
                let top = CAPTION_BASELINE.saturating_sub(font::GLYPH_HEIGHT * BITMAP_SCALE);
                font::draw_text_line(frame, CAPTION_X, top, CAPTION, CAPTION_COLOR, BITMAP_SCALE);
            }
        }
    }
}

pub fn fill_circle(frame: &mut RgbFrame, cx: i32, cy: i32, radius: i32, color: Rgb<u8>) {
    let (w, h) = frame.dimensions();
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy > radius * radius {
                continue;
            }
            let px = cx + dx;
            let py = cy + dy;
            if px >= 0 && py >= 0 && (px as u32) < w && (py as u32) < h {
                frame.put_pixel(px as u32, py as u32, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point3D;

    #[test]
    fn test_markers_at_landmarks() {
        let mut points = vec![Point3D::new(0.0, 0.9); landmark::MESH_POINTS];
        points[landmark::LEFT_EYE_LOWER] = Point3D::new(0.25, 0.5);
        points[landmark::GAZE_IRIS] = Point3D::new(0.75, 0.5);
        let lm = Landmarks::new(points);

        let mut frame = RgbFrame::new(200, 100);
        OverlayRenderer::new(3, None, 20.0).draw(&mut frame, Some(&lm));

        assert_eq!(*frame.get_pixel(50, 50), EYE_COLOR);
        assert_eq!(*frame.get_pixel(150, 50), GAZE_COLOR);
        assert_eq!(*frame.get_pixel(100, 50), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_caption_without_face() {
        let mut frame = RgbFrame::new(200, 60);
        OverlayRenderer::new(3, None, 20.0).draw(&mut frame, None);
        assert!(frame.pixels().any(|p| *p == CAPTION_COLOR));
    }

    #[test]
    fn test_circle_clipped_at_edges() {
        let mut frame = RgbFrame::new(4, 4);
        fill_circle(&mut frame, 0, 0, 3, GAZE_COLOR);
        assert_eq!(*frame.get_pixel(0, 0), GAZE_COLOR);
        assert_eq!(*frame.get_pixel(3, 3), Rgb([0, 0, 0]));
    }
}
