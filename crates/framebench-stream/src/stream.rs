use framebench_core::{FramebenchError, PixelFormat, Result, VideoInfo};
use framebench_gpu::{FramePool, GpuContext, GpuFrame};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Container kind inferred from a stream's file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    /// Headerless concatenated frames; the stream's resolution and
    /// pixel format fully describe the layout.
    RawFrames,
}

/// A video file bound to a GPU frame pool.
///
/// Configuration happens in stages: dimensions and device first, then
/// [`create_buf_pool`](Self::create_buf_pool), then the reader or
/// writer. The stream keeps at most one frame checked out of its pool
/// as the "current" frame, which is the unit `read_buf` fills and
/// `write_buf` drains.
pub struct VideoStream {
    path: PathBuf,
    width: u32,
    height: u32,
    ctx: Option<Arc<GpuContext>>,
    pool: Option<FramePool>,
    reader: Option<BufReader<File>>,
    writer: Option<BufWriter<File>>,
    current: Option<GpuFrame>,
    frames_read: u64,
    frames_written: u64,
}

impl VideoStream {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            width: 0,
            height: 0,
            ctx: None,
            pool: None,
            reader: None,
            writer: None,
            current: None,
            frames_read: 0,
            frames_written: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Frame resolution for every frame in the stream.
    pub fn set_dimensions(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Device the stream's pool allocates from.
    pub fn set_device(&mut self, ctx: Arc<GpuContext>) {
        self.ctx = Some(ctx);
    }

    /// Guess the container from the file extension.
    ///
    /// Only headerless raw-frame files are readable; anything needing
    /// a demuxer or codec is rejected.
    pub fn estimate_file_format(&self) -> Result<ContainerFormat> {
        let ext = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("nv12") | Some("yuv") | Some("raw") => Ok(ContainerFormat::RawFrames),
            other => Err(FramebenchError::UnsupportedFormat(format!(
                "cannot handle container of {} (extension {:?})",
                self.path.display(),
                other
            ))),
        }
    }

    /// Build and reserve the stream's frame pool.
    ///
    /// Dimensions and device are validated before anything is
    /// constructed; a prior pool is replaced wholesale.
    pub fn create_buf_pool(&mut self, reserve_count: usize, format: PixelFormat) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(FramebenchError::InvalidParameter(format!(
                "stream {} has unset dimensions ({}x{})",
                self.path.display(),
                self.width,
                self.height
            )));
        }
        let ctx = self.ctx.as_ref().ok_or_else(|| {
            FramebenchError::InvalidParameter(format!(
                "stream {} has no device bound",
                self.path.display()
            ))
        })?;

        let info = VideoInfo::new(format, self.width, self.height)?;
        let mut pool = FramePool::new(ctx, info);
        pool.reserve(reserve_count)?;

        debug!(
            path = %self.path.display(),
            reserve_count,
            ?format,
            "stream pool created"
        );
        self.current = None;
        self.pool = Some(pool);
        Ok(())
    }

    pub fn open_reader(&mut self) -> Result<()> {
        let file = File::open(&self.path)?;
        info!(path = %self.path.display(), "opened stream for reading");
        self.reader = Some(BufReader::new(file));
        Ok(())
    }

    /// Open the stream's file for writing, truncating any existing
    /// content.
    pub fn open_writer(&mut self) -> Result<()> {
        let file = File::create(&self.path)?;
        info!(path = %self.path.display(), "opened stream for writing");
        self.writer = Some(BufWriter::new(file));
        Ok(())
    }

    /// Read one frame from the file into the stream's current frame.
    ///
    /// A short read (end of file mid-frame) is an I/O error; callers
    /// are expected to know how many whole frames the file holds.
    pub fn read_buf(&mut self) -> Result<()> {
        let pool = self.pool.as_mut().ok_or_else(|| {
            FramebenchError::Operation(format!(
                "stream {} has no buffer pool",
                self.path.display()
            ))
        })?;
        let reader = self.reader.as_mut().ok_or_else(|| {
            FramebenchError::Operation(format!(
                "stream {} is not open for reading",
                self.path.display()
            ))
        })?;

        let frame_size = pool.info().frame_size();
        let mut data = vec![0u8; frame_size];
        reader.read_exact(&mut data)?;

        // Reuse the checked-out frame when there is one; the pool only
        // has to cover frames in flight.
        let frame = match self.current.take() {
            Some(frame) => frame,
            None => pool.acquire()?,
        };
        let ctx = self.ctx.as_ref().ok_or_else(|| {
            FramebenchError::Operation(format!(
                "stream {} has no device bound",
                self.path.display()
            ))
        })?;
        frame.upload(ctx, &data)?;
        self.current = Some(frame);
        self.frames_read += 1;
        Ok(())
    }

    /// Append the stream's current frame to the file.
    pub fn write_buf(&mut self) -> Result<()> {
        let frame = self.current.as_ref().ok_or_else(|| {
            FramebenchError::Operation(format!(
                "stream {} has no current frame to write",
                self.path.display()
            ))
        })?;
        let ctx = self.ctx.as_ref().ok_or_else(|| {
            FramebenchError::Operation(format!(
                "stream {} has no device bound",
                self.path.display()
            ))
        })?;
        let writer = self.writer.as_mut().ok_or_else(|| {
            FramebenchError::Operation(format!(
                "stream {} is not open for writing",
                self.path.display()
            ))
        })?;

        let data = frame.download(ctx)?;
        writer.write_all(&data)?;
        self.frames_written += 1;
        Ok(())
    }

    /// Check a frame out of the pool as the current frame if none is
    /// held yet. Output streams use this to get a destination frame
    /// before the first execute.
    pub fn ensure_frame(&mut self) -> Result<()> {
        if self.current.is_some() {
            return Ok(());
        }
        let pool = self.pool.as_mut().ok_or_else(|| {
            FramebenchError::Operation(format!(
                "stream {} has no buffer pool",
                self.path.display()
            ))
        })?;
        self.current = Some(pool.acquire()?);
        Ok(())
    }

    pub fn current_frame(&self) -> Option<&GpuFrame> {
        self.current.as_ref()
    }

    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Flush any buffered output to disk.
    pub fn close(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_format_accepts_raw_extensions() {
        for name in ["in.nv12", "in.yuv", "clip.RAW"] {
            let stream = VideoStream::new(name);
            assert_eq!(
                stream.estimate_file_format().unwrap(),
                ContainerFormat::RawFrames
            );
        }
    }

    #[test]
    fn estimate_format_rejects_containers() {
        for name in ["in.mp4", "in.mkv", "noextension"] {
            let stream = VideoStream::new(name);
            assert!(matches!(
                stream.estimate_file_format(),
                Err(FramebenchError::UnsupportedFormat(_))
            ));
        }
    }

    #[test]
    fn pool_creation_requires_dimensions() {
        let mut stream = VideoStream::new("in.nv12");
        let err = stream
            .create_buf_pool(4, PixelFormat::Nv12)
            .unwrap_err();
        assert!(matches!(err, FramebenchError::InvalidParameter(_)));
    }

    #[test]
    fn pool_creation_requires_device() {
        let mut stream = VideoStream::new("in.nv12");
        stream.set_dimensions(1280, 800);
        let err = stream
            .create_buf_pool(4, PixelFormat::Nv12)
            .unwrap_err();
        assert!(matches!(err, FramebenchError::InvalidParameter(_)));
    }

    #[test]
    fn open_reader_reports_missing_file() {
        let tmp = tempfile::tempdir().expect("failed to create tempdir");
        let mut stream = VideoStream::new(tmp.path().join("absent.nv12"));
        assert!(matches!(stream.open_reader(), Err(FramebenchError::Io(_))));
    }

    #[test]
    fn open_writer_truncates_existing_output() {
        let tmp = tempfile::tempdir().expect("failed to create tempdir");
        let path = tmp.path().join("out.nv12");
        std::fs::write(&path, b"stale frames").unwrap();

        let mut stream = VideoStream::new(&path);
        stream.open_writer().unwrap();
        stream.close().unwrap();

        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn read_without_pool_is_an_operation_error() {
        let mut stream = VideoStream::new("in.nv12");
        assert!(matches!(
            stream.read_buf(),
            Err(FramebenchError::Operation(_))
        ));
    }

    #[test]
    fn write_without_frame_is_an_operation_error() {
        let mut stream = VideoStream::new("out.nv12");
        assert!(matches!(
            stream.write_buf(),
            Err(FramebenchError::Operation(_))
        ));
    }
}
