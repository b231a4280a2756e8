//! View-to-surface coordinate transforms.

use crate::capture::{Point, Resolution};

/// Maps a point in view space into surface-request space.
pub trait CoordinateTransformer: Send + Sync {
    /// Returns `view_point` in surface coordinates.
    fn transform(&self, view_point: Point) -> Point;
}

/// Passes points through unchanged, for views drawn at buffer size.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTransformer;

impl CoordinateTransformer for IdentityTransformer {
    fn transform(&self, view_point: Point) -> Point {
        view_point
    }
}

/// Scales from a view of one size to a buffer of another.
///
/// Assumes the buffer is stretched to fill the view.
#[derive(Debug, Clone, Copy)]
pub struct ScaleTransformer {
    scale_x: f32,
    scale_y: f32,
}

impl ScaleTransformer {
    /// Creates a transform from a `view` of (width, height) to `buffer`.
    pub fn new(view: (f32, f32), buffer: Resolution) -> Self {
        let ratio = |buffer: u32, view: f32| {
            if view > 0.0 {
                buffer as f32 / view
            } else {
                1.0
            }
        };
        Self {
            scale_x: ratio(buffer.width, view.0),
            scale_y: ratio(buffer.height, view.1),
        }
    }
}

impl CoordinateTransformer for ScaleTransformer {
    fn transform(&self, view_point: Point) -> Point {
        Point::new(view_point.x * self.scale_x, view_point.y * self.scale_y)
    }
}
