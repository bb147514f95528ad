//! Raw-frame file streams bound to GPU frame pools.
//!
//! A [`VideoStream`] ties a file path to a pool of GPU frames sharing
//! one format/resolution descriptor. Reading pulls one raw frame from
//! the file and uploads it into a pooled buffer; writing downloads the
//! stream's current frame and appends it to the file.

mod stream;

pub use stream::{ContainerFormat, VideoStream};
