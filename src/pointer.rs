use anyhow::{anyhow, Result};
use enigo::{Axis, Button, Coordinate, Direction, Enigo, Mouse, Settings};
use tracing::{debug, info};

use crate::error::Error;
use crate::types::ScreenSize;

/// OS pointer injection.
pub trait PointerDriver {
    /// Moves to an absolute screen position in pixels.
    fn move_to(&mut self, x: i32, y: i32) -> Result<()>;
    fn left_click(&mut self) -> Result<()>;
    fn right_click(&mut self) -> Result<()>;
    /// Scrolls vertically by a signed amount, positive is up. The amount is
    /// in the platform's native wheel units: raw wheel delta on Windows
    /// (120 per notch), lines or notches elsewhere.
    fn scroll(&mut self, amount: i32) -> Result<()>;
    fn screen_size(&self) -> Result<ScreenSize>;
}

/// Native wheel units in one enigo scroll step. enigo counts notches and
/// multiplies by `WHEEL_DELTA` itself on Windows.
#[cfg(windows)]
const UNITS_PER_NOTCH: i32 = 120;
#[cfg(not(windows))]
const UNITS_PER_NOTCH: i32 = 1;

/// Converts native wheel units to enigo notches, keeping at least one notch
/// for any non-zero amount.
fn wheel_notches(amount: i32, units_per_notch: i32) -> i32 {
    let notches = amount / units_per_notch;
    if notches == 0 {
        amount.signum()
    } else {
        notches
    }
}

pub struct EnigoPointer {
    enigo: Enigo,
}

impl EnigoPointer {
    pub fn new() -> Result<Self> {
        let enigo = Enigo::new(&Settings::default()).map_err(|e| Error::Pointer(e.to_string()))?;
        Ok(Self { enigo })
    }
}

impl PointerDriver for EnigoPointer {
    fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        self.enigo.move_mouse(x, y, Coordinate::Abs).map_err(|e| anyhow!(e))
    }

    fn left_click(&mut self) -> Result<()> {
        self.enigo.button(Button::Left, Direction::Click).map_err(|e| anyhow!(e))
    }

    fn right_click(&mut self) -> Result<()> {
        self.enigo.button(Button::Right, Direction::Click).map_err(|e| anyhow!(e))
    }

    fn scroll(&mut self, amount: i32) -> Result<()> {
        // enigo scrolls down for positive lengths
        let notches = wheel_notches(amount, UNITS_PER_NOTCH);
        self.enigo.scroll(-notches, Axis::Vertical).map_err(|e| anyhow!(e))
    }

    fn screen_size(&self) -> Result<ScreenSize> {
        let (w, h) = self.enigo.main_display().map_err(|e| anyhow!(e))?;
        if w <= 0 || h <= 0 {
            return Err(Error::Pointer(format!("invalid display size {}x{}", w, h)).into());
        }
        Ok(ScreenSize::new(w as u32, h as u32))
    }
}

/// Logs pointer actions instead of performing them (`--dry-run`).
pub struct LoggingPointer {
    screen: ScreenSize,
}

impl LoggingPointer {
    pub fn new(screen: ScreenSize) -> Self {
        info!(width = screen.width, height = screen.height, "pointer dry run");
        Self { screen }
    }
}

impl PointerDriver for LoggingPointer {
    fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        debug!(x, y, "move");
        Ok(())
    }

    fn left_click(&mut self) -> Result<()> {
        info!("left click");
        Ok(())
    }

    fn right_click(&mut self) -> Result<()> {
        info!("right click");
        Ok(())
    }

    fn scroll(&mut self, amount: i32) -> Result<()> {
        info!(amount, "scroll");
        Ok(())
    }

    fn screen_size(&self) -> Result<ScreenSize> {
        Ok(self.screen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wheel_delta_becomes_notches() {
        assert_eq!(wheel_notches(300, 120), 2);
        assert_eq!(wheel_notches(-300, 120), -2);
        assert_eq!(wheel_notches(240, 120), 2);
    }

    #[test]
    fn test_small_amounts_still_scroll() {
        assert_eq!(wheel_notches(60, 120), 1);
        assert_eq!(wheel_notches(-1, 120), -1);
        assert_eq!(wheel_notches(0, 120), 0);
    }

    #[test]
    fn test_notch_platforms_pass_through() {
        assert_eq!(wheel_notches(300, 1), 300);
        assert_eq!(wheel_notches(-300, 1), -300);
    }
}
