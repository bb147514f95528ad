//! Harness internals for the `framebench` binary.
//!
//! Split out as a library so the configuration, merge-region, and
//! benchmark-loop logic can be exercised by the integration test
//! crate without a GPU.

pub mod bench;
pub mod config;
pub mod regions;
