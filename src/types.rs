use image::{ImageBuffer, Rgb};

/// A decoded camera frame in RGB order.
pub type RgbFrame = ImageBuffer<Rgb<u8>, Vec<u8>>;

/// Represents a single 3D point
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point3D {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3D {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }
}

/// Positional indices into the 478-point refined face mesh topology.
pub mod landmark {
    pub const UPPER_INNER_LIP: usize = 13;
    pub const LOWER_INNER_LIP: usize = 14;
    pub const LEFT_EYE_LOWER: usize = 145;
    pub const LEFT_EYE_UPPER: usize = 159;
    pub const RIGHT_EYE_LOWER: usize = 374;
    pub const RIGHT_EYE_UPPER: usize = 386;
    /// Iris point used as the gaze reference.
    pub const GAZE_IRIS: usize = 477;

    /// Mesh size with iris refinement enabled.
    pub const MESH_POINTS: usize = 478;

    /// Points marked on the debug overlay in yellow.
    pub const EYE_MARKERS: [usize; 4] = [LEFT_EYE_LOWER, LEFT_EYE_UPPER, RIGHT_EYE_LOWER, RIGHT_EYE_UPPER];
}

/// One detected face. Coordinates are normalized to the frame (0..1).
#[derive(Debug, Clone, Default)]
pub struct Landmarks {
    pub points: Vec<Point3D>,
}

impl Landmarks {
    pub fn new(points: Vec<Point3D>) -> Self {
        Self { points }
    }

    pub fn get(&self, index: usize) -> Option<Point3D> {
        self.points.get(index).copied()
    }

    pub fn y(&self, index: usize) -> Option<f32> {
        self.get(index).map(|p| p.y)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }
}

/// Screen size in pixels, used to scale the normalized gaze point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl ScreenSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}
