//! Surface request type describing a buffer the preview pipeline fills.

use serde::{Deserialize, Serialize};

/// Pixel dimensions of a preview buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Resolution {
    /// Creates a resolution of `width` x `height` pixels.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns true if both dimensions are non-zero.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A 2-D coordinate, either in view space or in surface (buffer) space
/// depending on where it sits in the tap pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position in pixels.
    pub x: f32,
    /// Vertical position in pixels.
    pub y: f32,
}

impl Point {
    /// Creates a point at (`x`, `y`).
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A request from the camera pipeline for a surface to render into.
///
/// Opaque to the core apart from its resolution. Only the most recent
/// request is ever current; older ones are dropped by the frame source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceRequest {
    /// Buffer resolution the hardware will produce.
    resolution: Resolution,
    /// Monotonic sequence number assigned by the frame source.
    sequence: u64,
}

impl SurfaceRequest {
    /// Creates a new surface request.
    pub fn new(resolution: Resolution, sequence: u64) -> Self {
        Self {
            resolution,
            sequence,
        }
    }

    /// Returns the buffer resolution.
    #[inline]
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Returns the sequence number.
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}
