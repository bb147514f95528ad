//! Integration test crate for framebench.
//!
//! Cross-crate scenarios that run without a GPU: configuration
//! resolution feeding merge regions and lookup tables, and stream
//! setup driven by the save flag.

#[cfg(test)]
mod harness;

#[cfg(test)]
mod streams;
