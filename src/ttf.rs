use image::Rgb;
use rusttype::{point, Font, Scale};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::types::RgbFrame;

pub struct FontRenderer {
    font: Font<'static>,
}

fn candidate_paths(family: &str) -> Vec<PathBuf> {
    let file = format!("{}.ttf", family);
    [
        "/Library/Fonts",
        "/System/Library/Fonts",
        "/System/Library/Fonts/Supplemental",
        "/usr/share/fonts/truetype",
        "/usr/share/fonts/TTF",
        "C:\\Windows\\Fonts",
        ".",
    ]
    .iter()
    .map(|dir| Path::new(dir).join(&file))
    .collect()
}

impl FontRenderer {
    /// Looks for `<family>.ttf` in the usual system font folders.
    pub fn try_load(family: &str) -> Option<Self> {
        for path in candidate_paths(family) {
            let Ok(data) = fs::read(&path) else { continue };
            if let Some(font) = Font::try_from_vec(data) {
                info!(path = %path.display(), "loaded caption font");
                return Some(Self { font });
            }
        }
        debug!(family, "font not found, using bitmap font");
        None
    }

    /// Draws `text` with its baseline at `baseline_y`.
    pub fn draw_text(&self, frame: &mut RgbFrame, x: u32, baseline_y: u32, text: &str, color: Rgb<u8>, size_pt: f32) {
        let (width, height) = frame.dimensions();
        let scale = Scale::uniform(size_pt);
        let start = point(x as f32, baseline_y as f32);

        for glyph in self.font.layout(text, scale, start) {
            let Some(bb) = glyph.pixel_bounding_box() else { continue };
            glyph.draw(|gx, gy, coverage| {
                if coverage <= 0.2 {
                    return;
                }
                let px = bb.min.x + gx as i32;
                let py = bb.min.y + gy as i32;
                if px >= 0 && py >= 0 && (px as u32) < width && (py as u32) < height {
                    frame.put_pixel(px as u32, py as u32, color);
                }
            });
        }
    }
}
