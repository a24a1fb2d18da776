use tracing::warn;

use crate::gesture::Gesture;
use crate::pointer::PointerDriver;
use crate::session::Clock;
use crate::stats::GestureStats;

/// Turns gestures into pointer calls and times each call.
pub struct Dispatcher<P: PointerDriver> {
    pointer: P,
}

impl<P: PointerDriver> Dispatcher<P> {
    pub fn new(pointer: P) -> Self {
        Self { pointer }
    }

    pub fn pointer(&self) -> &P {
        &self.pointer
    }

    pub fn dispatch(&mut self, gesture: Gesture, stats: &mut GestureStats, clock: &dyn Clock) {
        let start = clock.now();
        let result = match gesture {
            Gesture::MoveCursor { x, y } => self.pointer.move_to(x.round() as i32, y.round() as i32),
            Gesture::LeftClick => self.pointer.left_click(),
            Gesture::RightClick => self.pointer.right_click(),
            Gesture::Scroll(amount) => self.pointer.scroll(amount),
        };
        if let Err(e) = &result {
            warn!(gesture = gesture.kind().label(), error = %e, "pointer action failed");
        }
        stats.update_stats(gesture.kind(), result.is_ok(), start, clock.now());
    }
}
