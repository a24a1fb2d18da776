//! Gesture classification from face mesh geometry.
//!
//! Every predicate reads vertical distances between a handful of mesh points.
//! A missing point never triggers anything: the predicate it feeds is false.

use std::time::{Duration, Instant};

use crate::types::{landmark, Landmarks, ScreenSize};

/// Lip gap (lower minus upper inner lip) above which the session ends.
pub const MOUTH_OPEN_THRESHOLD: f32 = 0.03;
/// Left eyelid gap below which the left eye counts as closed.
pub const LEFT_EYE_CLOSED_THRESHOLD: f32 = 0.007;
/// Right eyelid gap below which the right eye counts as closed.
/// Empirically the detector reports the right lid a little wider than the left.
pub const RIGHT_EYE_CLOSED_THRESHOLD: f32 = 0.008;
/// Vertical offset between the eyes above which the head counts as tilted.
pub const SCROLL_THRESHOLD: f32 = 0.03;
/// Cooldown shared by both clicks, and separately by scrolling.
pub const DEBOUNCE: Duration = Duration::from_millis(500);
/// Wheel amount per scroll gesture, in native wheel units (see
/// [`crate::pointer::PointerDriver::scroll`]). Positive scrolls up.
pub const SCROLL_AMOUNT: i32 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GestureKind {
    Cursor,
    LeftClick,
    RightClick,
    ScrollUp,
    ScrollDown,
}

impl GestureKind {
    pub const ALL: [GestureKind; 5] = [
        GestureKind::Cursor,
        GestureKind::LeftClick,
        GestureKind::RightClick,
        GestureKind::ScrollUp,
        GestureKind::ScrollDown,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            GestureKind::Cursor => "Cursor",
            GestureKind::LeftClick => "Left_Click",
            GestureKind::RightClick => "Right_Click",
            GestureKind::ScrollUp => "Scroll_Up",
            GestureKind::ScrollDown => "Scroll_Down",
        }
    }
}

/// A pointer action requested by the operator's face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// Absolute screen position in pixels.
    MoveCursor { x: f64, y: f64 },
    LeftClick,
    RightClick,
    /// Signed wheel amount, positive is up.
    Scroll(i32),
}

impl Gesture {
    pub fn kind(&self) -> GestureKind {
        match self {
            Gesture::MoveCursor { .. } => GestureKind::Cursor,
            Gesture::LeftClick => GestureKind::LeftClick,
            Gesture::RightClick => GestureKind::RightClick,
            Gesture::Scroll(amount) if *amount > 0 => GestureKind::ScrollUp,
            Gesture::Scroll(_) => GestureKind::ScrollDown,
        }
    }
}

/// Outcome of classifying one face.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// The mouth is open: stop the session, nothing else was evaluated.
    Exit,
    /// Gestures to dispatch, in evaluation order (cursor, clicks, scroll).
    Gestures(Vec<Gesture>),
}

/// Cross-frame state used to fire clicks on edges and to rate-limit them.
#[derive(Debug, Clone)]
pub struct DebounceState {
    pub left_closed: bool,
    pub right_closed: bool,
    pub last_click: Instant,
    pub last_scroll: Instant,
}

impl DebounceState {
    /// Both cooldowns start running at `now`, so nothing fires during the
    /// first [`DEBOUNCE`] of a session.
    pub fn new(now: Instant) -> Self {
        Self {
            left_closed: false,
            right_closed: false,
            last_click: now,
            last_scroll: now,
        }
    }
}

fn vertical_gap(lm: &Landmarks, lower: usize, upper: usize) -> Option<f32> {
    Some(lm.y(lower)? - lm.y(upper)?)
}

pub fn mouth_open(lm: &Landmarks) -> bool {
    vertical_gap(lm, landmark::LOWER_INNER_LIP, landmark::UPPER_INNER_LIP)
        .map_or(false, |gap| gap > MOUTH_OPEN_THRESHOLD)
}

pub fn left_eye_closed(lm: &Landmarks) -> bool {
    vertical_gap(lm, landmark::LEFT_EYE_LOWER, landmark::LEFT_EYE_UPPER)
        .map_or(false, |gap| gap < LEFT_EYE_CLOSED_THRESHOLD)
}

pub fn right_eye_closed(lm: &Landmarks) -> bool {
    vertical_gap(lm, landmark::RIGHT_EYE_LOWER, landmark::RIGHT_EYE_UPPER)
        .map_or(false, |gap| gap < RIGHT_EYE_CLOSED_THRESHOLD)
}

/// Right eye height minus left eye height. Negative when the head leans so
/// that the right eye sits higher in the (mirrored) frame.
pub fn head_tilt(lm: &Landmarks) -> Option<f32> {
    Some(lm.y(landmark::RIGHT_EYE_LOWER)? - lm.y(landmark::LEFT_EYE_LOWER)?)
}

/// Maps the iris reference point onto the screen.
pub fn cursor_target(lm: &Landmarks, screen: ScreenSize) -> Option<Gesture> {
    let gaze = lm.get(landmark::GAZE_IRIS)?;
    Some(Gesture::MoveCursor {
        x: gaze.x as f64 * screen.width as f64,
        y: gaze.y as f64 * screen.height as f64,
    })
}

fn cooled_down(last: Instant, now: Instant) -> bool {
    now.saturating_duration_since(last) >= DEBOUNCE
}

pub struct GestureClassifier {
    state: DebounceState,
}

impl GestureClassifier {
    pub fn new(now: Instant) -> Self {
        Self {
            state: DebounceState::new(now),
        }
    }

    pub fn state(&self) -> &DebounceState {
        &self.state
    }

    /// Classifies one detected face at time `now`.
    ///
    /// Mouth-open short-circuits everything, including the eye state update.
    /// Otherwise the eye open/closed flags are always refreshed, whether or
    /// not a click fired, and the cooldown timestamps move only when a
    /// gesture fires.
    pub fn classify(&mut self, lm: &Landmarks, now: Instant, screen: ScreenSize) -> Classification {
        if mouth_open(lm) {
            return Classification::Exit;
        }

        let mut gestures = Vec::with_capacity(3);

        if let Some(cursor) = cursor_target(lm, screen) {
            gestures.push(cursor);
        }

        let left_closed = left_eye_closed(lm);
        if left_closed && !self.state.left_closed && cooled_down(self.state.last_click, now) {
            gestures.push(Gesture::LeftClick);
            self.state.last_click = now;
        }
        self.state.left_closed = left_closed;

        let right_closed = right_eye_closed(lm);
        if right_closed && !self.state.right_closed && cooled_down(self.state.last_click, now) {
            gestures.push(Gesture::RightClick);
            self.state.last_click = now;
        }
        self.state.right_closed = right_closed;

        if cooled_down(self.state.last_scroll, now) {
            if let Some(tilt) = head_tilt(lm) {
                if tilt.abs() > SCROLL_THRESHOLD {
                    let amount = if tilt < 0.0 { SCROLL_AMOUNT } else { -SCROLL_AMOUNT };
                    gestures.push(Gesture::Scroll(amount));
                    self.state.last_scroll = now;
                }
            }
        }

        Classification::Gestures(gestures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point3D;

    const SCREEN: ScreenSize = ScreenSize { width: 1920, height: 1080 };

    /// Eyes open, mouth shut, level head, iris at (0.5, 0.4).
    fn neutral() -> Landmarks {
        let mut points = vec![Point3D::new(0.5, 0.5); landmark::MESH_POINTS];
        points[landmark::UPPER_INNER_LIP].y = 0.70;
        points[landmark::LOWER_INNER_LIP].y = 0.71;
        points[landmark::LEFT_EYE_UPPER].y = 0.38;
        points[landmark::LEFT_EYE_LOWER].y = 0.40;
        points[landmark::RIGHT_EYE_UPPER].y = 0.38;
        points[landmark::RIGHT_EYE_LOWER].y = 0.40;
        points[landmark::GAZE_IRIS] = Point3D::new(0.5, 0.4);
        Landmarks::new(points)
    }

    fn close_left(lm: &mut Landmarks) {
        lm.points[landmark::LEFT_EYE_UPPER].y = lm.points[landmark::LEFT_EYE_LOWER].y - 0.002;
    }

    fn open_left(lm: &mut Landmarks) {
        lm.points[landmark::LEFT_EYE_UPPER].y = lm.points[landmark::LEFT_EYE_LOWER].y - 0.02;
    }

    fn gestures(c: Classification) -> Vec<Gesture> {
        match c {
            Classification::Gestures(g) => g,
            Classification::Exit => panic!("unexpected exit"),
        }
    }

    fn after(start: Instant, ms: u64) -> Instant {
        start + Duration::from_millis(ms)
    }

    #[test]
    fn test_mouth_open_exits_before_anything_else() {
        let start = Instant::now();
        let mut classifier = GestureClassifier::new(start);
        let mut lm = neutral();
        lm.points[landmark::LOWER_INNER_LIP].y = 0.75;
        close_left(&mut lm);

        assert_eq!(classifier.classify(&lm, after(start, 2000), SCREEN), Classification::Exit);
        // eye state untouched by the exit frame
        assert!(!classifier.state().left_closed);
    }

    #[test]
    fn test_mouth_threshold_is_strict() {
        let mut lm = neutral();
        lm.points[landmark::UPPER_INNER_LIP].y = 0.5;
        lm.points[landmark::LOWER_INNER_LIP].y = 0.52;
        assert!(!mouth_open(&lm));
        lm.points[landmark::LOWER_INNER_LIP].y = 0.54;
        assert!(mouth_open(&lm));
    }

    #[test]
    fn test_missing_landmarks_are_not_gestures() {
        let lm = Landmarks::new(vec![Point3D::new(0.5, 0.5); 10]);
        assert!(!mouth_open(&lm));
        assert!(!left_eye_closed(&lm));
        assert!(!right_eye_closed(&lm));
        assert_eq!(head_tilt(&lm), None);

        let start = Instant::now();
        let mut classifier = GestureClassifier::new(start);
        assert_eq!(gestures(classifier.classify(&lm, after(start, 1000), SCREEN)), vec![]);
    }

    #[test]
    fn test_cursor_scales_iris_to_screen() {
        let start = Instant::now();
        let mut classifier = GestureClassifier::new(start);
        let mut lm = neutral();
        lm.points[landmark::GAZE_IRIS] = Point3D::new(0.25, 0.75);

        let out = gestures(classifier.classify(&lm, start, SCREEN));
        assert_eq!(out, vec![Gesture::MoveCursor { x: 480.0, y: 810.0 }]);
    }

    #[test]
    fn test_left_click_fires_once_per_closure() {
        let start = Instant::now();
        let mut classifier = GestureClassifier::new(start);
        let mut lm = neutral();

        classifier.classify(&lm, after(start, 600), SCREEN);
        close_left(&mut lm);
        let out = gestures(classifier.classify(&lm, after(start, 700), SCREEN));
        assert!(out.contains(&Gesture::LeftClick));

        // Held closed well past the cooldown: no refire.
        let out = gestures(classifier.classify(&lm, after(start, 2000), SCREEN));
        assert!(!out.contains(&Gesture::LeftClick));

        open_left(&mut lm);
        classifier.classify(&lm, after(start, 2100), SCREEN);
        close_left(&mut lm);
        let out = gestures(classifier.classify(&lm, after(start, 2200), SCREEN));
        assert!(out.contains(&Gesture::LeftClick));
    }

    #[test]
    fn test_click_within_cooldown_is_swallowed_but_state_kept() {
        let start = Instant::now();
        let mut classifier = GestureClassifier::new(start);
        let mut lm = neutral();
        close_left(&mut lm);

        // Closed edge arrives before the session cooldown elapsed.
        let out = gestures(classifier.classify(&lm, after(start, 100), SCREEN));
        assert!(!out.contains(&Gesture::LeftClick));
        assert!(classifier.state().left_closed);

        // Still closed later: it is not an edge any more.
        let out = gestures(classifier.classify(&lm, after(start, 1000), SCREEN));
        assert!(!out.contains(&Gesture::LeftClick));
    }

    #[test]
    fn test_clicks_share_one_cooldown() {
        let start = Instant::now();
        let mut classifier = GestureClassifier::new(start);
        let mut lm = neutral();

        close_left(&mut lm);
        let out = gestures(classifier.classify(&lm, after(start, 1000), SCREEN));
        assert!(out.contains(&Gesture::LeftClick));

        lm.points[landmark::RIGHT_EYE_UPPER].y = lm.points[landmark::RIGHT_EYE_LOWER].y - 0.001;
        let out = gestures(classifier.classify(&lm, after(start, 1200), SCREEN));
        assert!(!out.contains(&Gesture::RightClick));
    }

    #[test]
    fn test_right_click_uses_its_own_threshold() {
        let start = Instant::now();
        let mut classifier = GestureClassifier::new(start);
        let mut lm = neutral();
        // 0.0075 is closed for the right eye but would be open for the left.
        lm.points[landmark::RIGHT_EYE_UPPER].y = lm.points[landmark::RIGHT_EYE_LOWER].y - 0.0075;
        lm.points[landmark::LEFT_EYE_UPPER].y = lm.points[landmark::LEFT_EYE_LOWER].y - 0.0075;

        let out = gestures(classifier.classify(&lm, after(start, 1000), SCREEN));
        assert!(out.contains(&Gesture::RightClick));
        assert!(!out.contains(&Gesture::LeftClick));
    }

    fn tilted(tilt: f32) -> Landmarks {
        let mut lm = neutral();
        let left = lm.points[landmark::LEFT_EYE_LOWER].y;
        lm.points[landmark::RIGHT_EYE_LOWER].y = left + tilt;
        lm.points[landmark::RIGHT_EYE_UPPER].y = left + tilt - 0.02;
        lm
    }

    #[test]
    fn test_scroll_direction_follows_tilt() {
        let start = Instant::now();

        let mut classifier = GestureClassifier::new(start);
        let out = gestures(classifier.classify(&tilted(-0.05), after(start, 600), SCREEN));
        assert!(out.contains(&Gesture::Scroll(300)));
        assert_eq!(Gesture::Scroll(300).kind(), GestureKind::ScrollUp);

        let mut classifier = GestureClassifier::new(start);
        let out = gestures(classifier.classify(&tilted(0.05), after(start, 600), SCREEN));
        assert!(out.contains(&Gesture::Scroll(-300)));
        assert_eq!(Gesture::Scroll(-300).kind(), GestureKind::ScrollDown);

        let mut classifier = GestureClassifier::new(start);
        let out = gestures(classifier.classify(&tilted(0.01), after(start, 600), SCREEN));
        assert!(out.iter().all(|g| !matches!(g, Gesture::Scroll(_))));
    }

    #[test]
    fn test_scroll_repeats_after_cooldown() {
        let start = Instant::now();
        let mut classifier = GestureClassifier::new(start);
        let lm = tilted(-0.05);

        let count_scrolls = |c: Classification| gestures(c).iter().filter(|g| matches!(g, Gesture::Scroll(_))).count();

        assert_eq!(count_scrolls(classifier.classify(&lm, after(start, 600), SCREEN)), 1);
        assert_eq!(count_scrolls(classifier.classify(&lm, after(start, 900), SCREEN)), 0);
        assert_eq!(count_scrolls(classifier.classify(&lm, after(start, 1100), SCREEN)), 1);
    }
}
