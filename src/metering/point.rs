//! Surface-oriented metering point factory.
//!
//! Maps a coordinate in surface (buffer) space into a normalized
//! device-space point in `[0, 1] x [0, 1]`, which is what the camera
//! hardware consumes for focus and exposure regions.

use crate::capture::{Point, Resolution};

/// Default metering region size, as a fraction of the frame.
pub const DEFAULT_POINT_SIZE: f32 = 0.15;

/// A normalized device-space point with a region size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeteringPoint {
    /// Normalized horizontal position.
    pub x: f32,
    /// Normalized vertical position.
    pub y: f32,
    /// Region size as a fraction of the frame.
    pub size: f32,
}

/// Creates metering points for a surface of a given resolution.
///
/// A factory is only valid for the resolution it was built from. The
/// frame source rebuilds it each time a new surface request arrives.
#[derive(Debug, Clone, PartialEq)]
pub struct MeteringPointFactory {
    width: f32,
    height: f32,
    default_size: f32,
}

impl MeteringPointFactory {
    /// Creates a factory for a surface of `width` x `height`.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            default_size: DEFAULT_POINT_SIZE,
        }
    }

    /// Creates a factory from a surface resolution.
    pub fn from_resolution(resolution: Resolution) -> Self {
        Self::new(resolution.width as f32, resolution.height as f32)
    }

    /// Overrides the region size used by [`create_point`](Self::create_point).
    pub fn with_default_size(mut self, size: f32) -> Self {
        self.default_size = size.clamp(f32::EPSILON, 1.0);
        self
    }

    /// Returns the surface size this factory maps from.
    pub fn surface_size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Creates a point with the default region size.
    pub fn create_point(&self, x: f32, y: f32) -> MeteringPoint {
        self.create_point_with_size(x, y, self.default_size)
    }

    /// Creates a point from a surface-space [`Point`].
    pub fn point_at(&self, point: Point) -> MeteringPoint {
        self.create_point(point.x, point.y)
    }

    /// Creates a point with an explicit region size.
    ///
    /// Coordinates outside the surface are clamped to its edge.
    pub fn create_point_with_size(&self, x: f32, y: f32, size: f32) -> MeteringPoint {
        MeteringPoint {
            x: normalize(x, self.width),
            y: normalize(y, self.height),
            size,
        }
    }
}

fn normalize(value: f32, extent: f32) -> f32 {
    if extent <= 0.0 || !value.is_finite() {
        return 0.0;
    }
    (value / extent).clamp(0.0, 1.0)
}
