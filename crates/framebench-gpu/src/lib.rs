//! framebench GPU - wgpu-based frame processing
//!
//! Provides the device context, GPU-resident frame buffer pools, and
//! the three compute operations (copy, remap, blend) the benchmark
//! harness drives. All execution is blocking-synchronous from the
//! caller's point of view: one submit, one poll-to-completion.

pub mod context;
pub mod ops;
pub mod pool;

pub use context::GpuContext;
pub use ops::{BlendOp, CopyOp, FrameOp, RemapOp};
pub use pool::{FramePool, GpuFrame};
