//! Frame operations: copy, remap, blend.
//!
//! Each operation owns a WGSL compute pipeline pair (one entry point
//! for the Y plane, one for the interleaved UV plane), a bind-group
//! layout, and a uniform parameter buffer. Call-site configuration
//! (areas, lookup table, merge regions) is set once before the
//! benchmark loop; `execute` then only rebinds frame buffers,
//! dispatches, and blocks until the device is idle.
//!
//! NV12 bytes live in `array<u32>` storage, so kernels write whole
//! 32-bit words: one thread owns four Y bytes or two UV pairs, which
//! keeps writes race-free without atomics. That places one constraint
//! on configuration: frame widths and copy-area x/width must be
//! multiples of 4.

mod blend;
mod copy;
mod remap;

pub use blend::BlendOp;
pub use copy::CopyOp;
pub use remap::RemapOp;

use crate::pool::GpuFrame;
use framebench_core::{FramebenchError, PixelFormat, Result};

/// A configured frame operation the benchmark loop can drive.
pub trait FrameOp {
    /// Short name for logs and error messages.
    fn name(&self) -> &str;

    /// Number of input frames one invocation consumes.
    fn input_count(&self) -> usize;

    /// Run the operation once, blocking until the GPU completes.
    fn execute(&self, inputs: &[&GpuFrame], output: &GpuFrame) -> Result<()>;
}

/// Threads per workgroup axis for all kernels.
pub(crate) const WORKGROUP_DIM: u32 = 16;

pub(crate) fn workgroups(threads: u32) -> u32 {
    threads.div_ceil(WORKGROUP_DIM)
}

/// All operations work on NV12 frames; reject anything else early.
pub(crate) fn check_nv12(op: &str, frame: &GpuFrame) -> Result<()> {
    if frame.info().format() != PixelFormat::Nv12 {
        return Err(FramebenchError::UnsupportedFormat(format!(
            "{}: expected NV12, got {:?}",
            op,
            frame.info().format()
        )));
    }
    Ok(())
}

pub(crate) fn check_input_count(op: &str, expected: usize, got: usize) -> Result<()> {
    if got != expected {
        return Err(FramebenchError::Operation(format!(
            "{}: needs {} input frame(s), got {}",
            op, expected, got
        )));
    }
    Ok(())
}

/// Word-granular kernels need the width in whole 32-bit words.
pub(crate) fn check_word_aligned(op: &str, what: &str, value: u32) -> Result<()> {
    if value % 4 != 0 {
        return Err(FramebenchError::InvalidParameter(format!(
            "{}: {} must be a multiple of 4 bytes, got {}",
            op, what, value
        )));
    }
    Ok(())
}
