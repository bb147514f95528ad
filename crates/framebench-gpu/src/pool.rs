//! GPU frame buffers and the fixed-capacity frame pool.
//!
//! Each [`GpuFrame`] is one storage buffer holding a whole raw frame,
//! planes contiguous in on-disk order. A [`FramePool`] preallocates a
//! fixed number of frames for one format/resolution descriptor so the
//! benchmark loop never allocates GPU memory per iteration.

use crate::context::GpuContext;
use framebench_core::{FramebenchError, Result, VideoInfo};
use std::sync::Arc;
use tracing::debug;

/// Round a byte size up to the 4-byte granularity wgpu buffer copies
/// and storage arrays require.
fn padded_size(bytes: usize) -> u64 {
    ((bytes as u64) + 3) & !3
}

/// A GPU-resident frame buffer.
pub struct GpuFrame {
    buffer: wgpu::Buffer,
    info: VideoInfo,
}

impl GpuFrame {
    fn new(device: &wgpu::Device, info: VideoInfo, label: &str) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: padded_size(info.frame_size()),
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        Self { buffer, info }
    }

    /// The frame's format/resolution descriptor.
    #[inline]
    pub fn info(&self) -> &VideoInfo {
        &self.info
    }

    /// The underlying storage buffer.
    #[inline]
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Upload one frame of raw bytes into the buffer.
    ///
    /// `data` must be exactly one frame as described by the descriptor.
    pub fn upload(&self, ctx: &GpuContext, data: &[u8]) -> Result<()> {
        let frame_size = self.info.frame_size();
        if data.len() != frame_size {
            return Err(FramebenchError::InvalidParameter(format!(
                "upload size {} does not match frame size {}",
                data.len(),
                frame_size
            )));
        }

        let padded = padded_size(frame_size) as usize;
        if padded == frame_size {
            ctx.queue.write_buffer(&self.buffer, 0, data);
        } else {
            // wgpu requires write sizes in 4-byte units
            let mut scratch = vec![0u8; padded];
            scratch[..frame_size].copy_from_slice(data);
            ctx.queue.write_buffer(&self.buffer, 0, &scratch);
        }
        Ok(())
    }

    /// Read the frame back to CPU memory, blocking until the copy and
    /// all previously submitted work has completed.
    pub fn download(&self, ctx: &GpuContext) -> Result<Vec<u8>> {
        let frame_size = self.info.frame_size();
        let copy_size = padded_size(frame_size);

        let staging = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame readback staging"),
            size: copy_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame readback encoder"),
            });
        encoder.copy_buffer_to_buffer(&self.buffer, 0, &staging, 0, copy_size);
        ctx.queue.submit(Some(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        let _ = ctx.device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .map_err(|_| FramebenchError::Device("readback channel closed".to_string()))?
            .map_err(|e| FramebenchError::Device(format!("frame readback map failed: {:?}", e)))?;

        let mapped = slice.get_mapped_range();
        let mut data = mapped.to_vec();
        drop(mapped);
        staging.unmap();

        data.truncate(frame_size);
        Ok(data)
    }
}

/// Fixed-capacity reservoir of GPU frame buffers sharing one
/// format/resolution descriptor.
///
/// `reserve` must be called before any frame is acquired; all frames
/// drawn from one pool are identical in format and resolution.
pub struct FramePool {
    device: Arc<wgpu::Device>,
    info: VideoInfo,
    free: Vec<GpuFrame>,
    reserved: usize,
}

impl FramePool {
    /// Create an empty pool for the given descriptor.
    pub fn new(ctx: &GpuContext, info: VideoInfo) -> Self {
        Self {
            device: Arc::clone(&ctx.device),
            info,
            free: Vec::new(),
            reserved: 0,
        }
    }

    /// The pool's frame descriptor.
    #[inline]
    pub fn info(&self) -> &VideoInfo {
        &self.info
    }

    /// Preallocate exactly `count` frames.
    ///
    /// Replaces any previous reservation. Fails for a zero count; an
    /// allocation failure inside wgpu surfaces as a device loss on the
    /// next submit, which the harness treats as fatal anyway.
    pub fn reserve(&mut self, count: usize) -> Result<()> {
        if count == 0 {
            return Err(FramebenchError::InvalidParameter(
                "buffer pool reserve count must be non-zero".to_string(),
            ));
        }

        self.free.clear();
        for i in 0..count {
            let label = format!("pooled frame {}", i);
            self.free
                .push(GpuFrame::new(&self.device, self.info, &label));
        }
        self.reserved = count;

        debug!(
            count,
            frame_bytes = self.info.frame_size(),
            "reserved frame pool"
        );
        Ok(())
    }

    /// Number of frames reserved in the pool.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.reserved
    }

    /// Number of frames currently available.
    #[inline]
    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// Take a frame from the pool.
    ///
    /// Fails if `reserve` was never called or every frame is in use.
    pub fn acquire(&mut self) -> Result<GpuFrame> {
        if self.reserved == 0 {
            return Err(FramebenchError::OutOfMemory(
                "frame pool has no reservation, call reserve first".to_string(),
            ));
        }
        self.free.pop().ok_or_else(|| {
            FramebenchError::OutOfMemory(format!(
                "frame pool exhausted ({} frames all in use)",
                self.reserved
            ))
        })
    }

    /// Return a frame to the pool.
    ///
    /// Frames with a different descriptor are rejected; a pool never
    /// mixes formats or resolutions.
    pub fn release(&mut self, frame: GpuFrame) -> Result<()> {
        if *frame.info() != self.info {
            return Err(FramebenchError::InvalidParameter(
                "released frame does not match pool descriptor".to_string(),
            ));
        }
        self.free.push(frame);
        Ok(())
    }
}
