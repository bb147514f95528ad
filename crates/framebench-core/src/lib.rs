//! framebench core - Foundation types for the benchmark harness
//!
//! This crate provides the fundamental types used throughout framebench:
//! - Error taxonomy and Result alias
//! - Pixel formats and frame descriptors
//! - Integer geometry (rectangles)
//! - Displacement lookup tables for the remap operation

pub mod error;
pub mod frame;
pub mod geometry;
pub mod lut;

pub use error::{FramebenchError, Result};
pub use frame::{PixelFormat, VideoInfo};
pub use geometry::Rect;
pub use lut::{DisplacementTable, CELL_SIZE};

/// Default frame resolution when none is given on the command line.
pub mod defaults {
    /// Default input/output frame width.
    pub const FRAME_WIDTH: u32 = 1280;

    /// Default input/output frame height.
    pub const FRAME_HEIGHT: u32 = 800;

    /// Frames reserved per stream buffer pool.
    pub const POOL_RESERVE_COUNT: usize = 4;

    /// Completed frames per throughput report window.
    pub const FPS_WINDOW_FRAMES: u64 = 30;
}
