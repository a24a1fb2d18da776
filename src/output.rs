use anyhow::Result;
use minifb::{KeyRepeat, Window, WindowOptions};

use crate::error::Error;
use crate::types::RgbFrame;

/// Input observed while presenting a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    KeyPressed(String),
    Closed,
}

/// Where annotated frames go, and where key presses come from.
pub trait FrameSink {
    fn present(&mut self, frame: &RgbFrame) -> Result<()>;

    /// Non-blocking check for user input since the last call.
    fn poll_event(&mut self) -> Option<SinkEvent>;
}

pub struct WindowOutput {
    window: Window,
    buffer: Vec<u32>,
    width: usize,
    height: usize,
}

impl WindowOutput {
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self> {
        let window = Window::new(
            title,
            width,
            height,
            WindowOptions {
                resize: true,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| Error::Window(e.to_string()))?;

        Ok(Self {
            window,
            buffer: vec![0; width * height],
            width,
            height,
        })
    }
}

impl FrameSink for WindowOutput {
    fn present(&mut self, frame: &RgbFrame) -> Result<()> {
        let (w, h) = (frame.width() as usize, frame.height() as usize);
        if w != self.width || h != self.height {
            self.width = w;
            self.height = h;
        }
        self.buffer.resize(self.width * self.height, 0);

        // RGB8 -> 0RGB
        for (dst, px) in self.buffer.iter_mut().zip(frame.pixels()) {
            *dst = (px[0] as u32) << 16 | (px[1] as u32) << 8 | px[2] as u32;
        }

        self.window
            .update_with_buffer(&self.buffer, self.width, self.height)
            .map_err(|e| Error::Window(e.to_string()).into())
    }

    fn poll_event(&mut self) -> Option<SinkEvent> {
        if !self.window.is_open() {
            return Some(SinkEvent::Closed);
        }
        self.window
            .get_keys_pressed(KeyRepeat::No)
            .first()
            .map(|key| SinkEvent::KeyPressed(format!("{:?}", key)))
    }
}
