//! Displacement lookup tables for the remap operation.
//!
//! The remap kernel samples geometry at a coarse 8x8-pixel grid: one
//! displacement vector per grid cell, addressed row-major. The table
//! stores absolute source positions in input-pixel coordinates; every
//! output pixel inside a cell resolves against that cell's sample.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Edge length of one coarse grid cell in pixels.
///
/// Must match the granularity the remap consumer dispatches with; the
/// remap operation validates the grid dimensions against its output
/// size when the table is handed over.
pub const CELL_SIZE: u32 = 8;

/// A dense 2-D grid of displacement vectors, one per coarse cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplacementTable {
    width: u32,
    height: u32,
    /// Row-major samples, `data[y * width + x]`.
    data: Vec<Vec2>,
}

impl DisplacementTable {
    /// Grid dimensions covering an output frame of `out_w` x `out_h`:
    /// `(ceil(out_w / 8), ceil(out_h / 8))`.
    pub fn grid_size(out_w: u32, out_h: u32) -> (u32, u32) {
        (out_w.div_ceil(CELL_SIZE), out_h.div_ceil(CELL_SIZE))
    }

    /// Build a table by evaluating `f` at every grid cell.
    ///
    /// Any `(cell_x, cell_y) -> displacement` function is a valid
    /// transform; [`DisplacementTable::horizontal_flip`] is one
    /// concrete instance.
    pub fn from_fn<F>(width: u32, height: u32, f: F) -> Self
    where
        F: Fn(u32, u32) -> Vec2,
    {
        let mut data = Vec::with_capacity((width as usize) * (height as usize));
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Reference transform: horizontal flip.
    ///
    /// Cell (x, y) maps to source position `((width - x) * 8, y * 8)`.
    pub fn horizontal_flip(width: u32, height: u32) -> Self {
        Self::from_fn(width, height, |x, y| {
            Vec2::new(
                ((width - x) * CELL_SIZE) as f32,
                (y * CELL_SIZE) as f32,
            )
        })
    }

    /// Grid width in cells.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in cells.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Sample at grid cell (x, y). Panics if out of range.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Vec2 {
        assert!(x < self.width && y < self.height);
        self.data[(y * self.width + x) as usize]
    }

    /// All samples in row-major order.
    #[inline]
    pub fn as_slice(&self) -> &[Vec2] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn grid_size_rounds_up() {
        assert_eq!(DisplacementTable::grid_size(1280, 800), (160, 100));
        assert_eq!(DisplacementTable::grid_size(1281, 801), (161, 101));
        assert_eq!(DisplacementTable::grid_size(1, 1), (1, 1));
        assert_eq!(DisplacementTable::grid_size(8, 16), (1, 2));
    }

    #[test]
    fn from_fn_populates_row_major() {
        let t = DisplacementTable::from_fn(3, 2, |x, y| Vec2::new(x as f32, y as f32));
        assert_eq!(t.as_slice().len(), 6);
        assert_eq!(t.get(2, 0), Vec2::new(2.0, 0.0));
        assert_eq!(t.get(0, 1), Vec2::new(0.0, 1.0));
        assert_eq!(t.as_slice()[5], Vec2::new(2.0, 1.0));
    }

    #[test]
    fn horizontal_flip_reference_values() {
        let w = 160;
        let h = 100;
        let t = DisplacementTable::horizontal_flip(w, h);
        for y in [0, 1, h - 1] {
            // Leftmost cell maps to the far right edge
            assert_eq!(t.get(0, y), Vec2::new((w * 8) as f32, (y * 8) as f32));
            // Rightmost cell maps one cell in from the left
            assert_eq!(t.get(w - 1, y), Vec2::new(8.0, (y * 8) as f32));
        }
        assert_eq!(t.get(40, 25), Vec2::new(((w - 40) * 8) as f32, 200.0));
    }

    #[test]
    fn table_survives_serde_round_trip() {
        let t = DisplacementTable::horizontal_flip(160, 100);
        let json = serde_json::to_string(&t).unwrap();
        let back: DisplacementTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }

    proptest! {
        #[test]
        fn table_has_exactly_w_times_h_entries(w in 1u32..64, h in 1u32..64) {
            let t = DisplacementTable::horizontal_flip(w, h);
            prop_assert_eq!(t.as_slice().len(), (w * h) as usize);
            prop_assert_eq!(t.width(), w);
            prop_assert_eq!(t.height(), h);
        }

        #[test]
        fn flip_matches_closed_form(w in 1u32..64, h in 1u32..64,
                                    x in 0u32..64, y in 0u32..64) {
            prop_assume!(x < w && y < h);
            let t = DisplacementTable::horizontal_flip(w, h);
            let d = t.get(x, y);
            prop_assert_eq!(d.x, ((w - x) * 8) as f32);
            prop_assert_eq!(d.y, (y * 8) as f32);
        }
    }
}
