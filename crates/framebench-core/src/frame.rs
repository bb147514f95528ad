//! Pixel formats and frame descriptors.
//!
//! A [`VideoInfo`] describes one frame of raw video as it sits on disk
//! and in GPU storage buffers: pixel format, resolution, and the
//! byte layout of its planes. All frames drawn from one buffer pool
//! share a single descriptor.

use crate::error::{FramebenchError, Result};
use serde::{Deserialize, Serialize};

/// Pixel format enumeration for raw frame data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PixelFormat {
    /// Y plane followed by interleaved UV at half resolution.
    #[default]
    Nv12,
    /// Y, U, V planes with U/V at half resolution.
    Yuv420P,
    /// Single 8-bit luma plane.
    Gray8,
}

impl PixelFormat {
    /// Number of planes for this format.
    pub fn plane_count(self) -> usize {
        match self {
            Self::Gray8 => 1,
            Self::Nv12 => 2,
            Self::Yuv420P => 3,
        }
    }

    /// True if chroma is subsampled, requiring even frame dimensions.
    pub fn is_subsampled(self) -> bool {
        matches!(self, Self::Nv12 | Self::Yuv420P)
    }

    /// Total bytes for one frame of this format.
    pub fn frame_size(self, width: u32, height: u32) -> usize {
        let y_size = (width as usize) * (height as usize);
        match self {
            Self::Gray8 => y_size,
            // UV interleaved at half resolution in both axes
            Self::Nv12 => y_size + y_size / 2,
            Self::Yuv420P => y_size + y_size / 2,
        }
    }
}

/// Format and resolution descriptor for a video frame.
///
/// Construction validates the dimensions once; everything downstream
/// (buffer pools, streams, operations) trusts the descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoInfo {
    format: PixelFormat,
    width: u32,
    height: u32,
}

impl VideoInfo {
    /// Create a descriptor, validating the dimensions for the format.
    pub fn new(format: PixelFormat, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(FramebenchError::InvalidParameter(format!(
                "frame dimensions must be non-zero, got {}x{}",
                width, height
            )));
        }
        if format.is_subsampled() && (width % 2 != 0 || height % 2 != 0) {
            return Err(FramebenchError::InvalidParameter(format!(
                "{:?} requires even dimensions, got {}x{}",
                format, width, height
            )));
        }
        Ok(Self {
            format,
            width,
            height,
        })
    }

    /// Pixel format.
    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Frame width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total bytes for one frame.
    pub fn frame_size(&self) -> usize {
        self.format.frame_size(self.width, self.height)
    }

    /// Byte size of plane `index`.
    pub fn plane_size(&self, index: usize) -> Result<usize> {
        let y_size = (self.width as usize) * (self.height as usize);
        let size = match (self.format, index) {
            (PixelFormat::Gray8, 0) => y_size,
            (PixelFormat::Nv12, 0) => y_size,
            (PixelFormat::Nv12, 1) => y_size / 2,
            (PixelFormat::Yuv420P, 0) => y_size,
            (PixelFormat::Yuv420P, 1) | (PixelFormat::Yuv420P, 2) => y_size / 4,
            _ => {
                return Err(FramebenchError::InvalidParameter(format!(
                    "plane {} out of range for {:?}",
                    index, self.format
                )))
            }
        };
        Ok(size)
    }

    /// Byte offset of plane `index` within a contiguous frame.
    pub fn plane_offset(&self, index: usize) -> Result<usize> {
        let mut offset = 0usize;
        for i in 0..index {
            offset += self.plane_size(i)?;
        }
        // Validates `index` itself
        self.plane_size(index)?;
        Ok(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nv12_frame_size() {
        let info = VideoInfo::new(PixelFormat::Nv12, 1280, 800).unwrap();
        assert_eq!(info.frame_size(), 1280 * 800 * 3 / 2);
        assert_eq!(info.plane_offset(1).unwrap(), 1280 * 800);
        assert_eq!(info.plane_size(1).unwrap(), 1280 * 800 / 2);
    }

    #[test]
    fn yuv420p_planes() {
        let info = VideoInfo::new(PixelFormat::Yuv420P, 640, 480).unwrap();
        assert_eq!(info.format().plane_count(), 3);
        assert_eq!(info.plane_size(0).unwrap(), 640 * 480);
        assert_eq!(info.plane_size(1).unwrap(), 640 * 480 / 4);
        assert_eq!(info.plane_offset(2).unwrap(), 640 * 480 + 640 * 480 / 4);
    }

    #[test]
    fn zero_dimension_rejected() {
        assert!(VideoInfo::new(PixelFormat::Nv12, 0, 800).is_err());
        assert!(VideoInfo::new(PixelFormat::Nv12, 1280, 0).is_err());
    }

    #[test]
    fn odd_dimensions_rejected_for_subsampled() {
        assert!(VideoInfo::new(PixelFormat::Nv12, 1281, 800).is_err());
        assert!(VideoInfo::new(PixelFormat::Yuv420P, 640, 481).is_err());
        // Gray8 has no chroma, odd sizes are fine
        assert!(VideoInfo::new(PixelFormat::Gray8, 641, 481).is_ok());
    }

    #[test]
    fn plane_index_out_of_range() {
        let info = VideoInfo::new(PixelFormat::Nv12, 64, 64).unwrap();
        assert!(info.plane_size(2).is_err());
        assert!(info.plane_offset(2).is_err());
    }
}
