//! Crop rectangle normalization.
//!
//! An interactive crop UI reports a region in source-pixel coordinates, and
//! nothing guarantees that region is well formed: coordinates may be
//! negative, fractional, or extend past the image edge.
//! [`CropRect::normalize`] clamps any such rectangle into a [`CropRegion`]
//! that is guaranteed to lie within the source bounds.

use serde::{Deserialize, Serialize};

/// A caller-supplied crop rectangle in source-pixel coordinates.
///
/// Values are `f64` because crop UIs commonly report fractional positions.
/// Nothing is validated on construction; pass the rectangle through
/// [`CropRect::normalize`] before using it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Clamp this rectangle to the bounds of a `source_width` by
    /// `source_height` image.
    ///
    /// Coordinates are floored, the origin is clamped to `[0, dim - 1]`,
    /// and each side is clamped to `[1, dim - offset]`, so the result
    /// satisfies `x + width <= source_width` and
    /// `y + height <= source_height` with both sides at least one pixel.
    /// Never fails: any input, however malformed, yields a valid in-bounds
    /// region. Non-finite values collapse to the nearest bound.
    pub fn normalize(&self, source_width: u32, source_height: u32) -> CropRegion {
        let source_width = source_width.max(1);
        let source_height = source_height.max(1);

        let x = floor_clamp(self.x, 0, i64::from(source_width) - 1) as u32;
        let y = floor_clamp(self.y, 0, i64::from(source_height) - 1) as u32;
        let width = floor_clamp(self.width, 1, i64::from(source_width - x)) as u32;
        let height = floor_clamp(self.height, 1, i64::from(source_height - y)) as u32;

        CropRegion {
            x,
            y,
            width,
            height,
        }
    }
}

impl From<CropRegion> for CropRect {
    fn from(region: CropRegion) -> Self {
        Self::new(
            f64::from(region.x),
            f64::from(region.y),
            f64::from(region.width),
            f64::from(region.height),
        )
    }
}

/// Floor `value` and clamp it into `[min, max]`.
///
/// `NaN` casts to zero before clamping, so it lands on a bound rather than
/// propagating.
fn floor_clamp(value: f64, min: i64, max: i64) -> i64 {
    (value.floor() as i64).clamp(min, max)
}

/// A crop region guaranteed to lie within the source image it was
/// normalized against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}


// ============================================================================
// Property-Based Tests
// ============================================================================
