//! Integer geometry for frame regions.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Axis-aligned integer rectangle in pixel coordinates.
///
/// Used both as an output merge window and as a per-input merge area
/// for the blend operation, and as the source/destination area pair
/// for the copy operation. `repr(C)` + Pod so it can be embedded
/// directly in GPU uniform structs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Full-frame rectangle at the origin.
    #[inline]
    pub const fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Exclusive right edge.
    #[inline]
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    #[inline]
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Area in pixels.
    #[inline]
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// True if this rect has the same width and height as `other`.
    #[inline]
    pub fn same_size(&self, other: &Rect) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// True if this rect lies entirely within a `width`x`height` frame.
    pub fn fits_in(&self, width: u32, height: u32) -> bool {
        self.right() <= width && self.bottom() <= height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_frame_rect() {
        let r = Rect::full(1280, 800);
        assert_eq!(r, Rect::new(0, 0, 1280, 800));
        assert_eq!(r.right(), 1280);
        assert_eq!(r.bottom(), 800);
        assert_eq!(r.area(), 1280 * 800);
    }

    #[test]
    fn same_size_ignores_position() {
        let a = Rect::new(0, 0, 640, 480);
        let b = Rect::new(100, 50, 640, 480);
        assert!(a.same_size(&b));
        assert!(!a.same_size(&Rect::new(0, 0, 640, 481)));
    }

    #[test]
    fn fits_in_frame() {
        assert!(Rect::new(0, 0, 640, 480).fits_in(640, 480));
        assert!(Rect::new(64, 64, 512, 384).fits_in(640, 480));
        assert!(!Rect::new(1, 0, 640, 480).fits_in(640, 480));
    }
}
