//! The benchmark loop and its throughput counter.

use framebench_core::{defaults, FramebenchError, Result};
use framebench_gpu::{FrameOp, GpuFrame};
use framebench_stream::VideoStream;
use std::time::Instant;
use tracing::info;

/// Rolling frames-per-second counter.
///
/// Emits one reading per full window (30 frames) rather than per
/// frame, so the log stays readable at high iteration counts.
pub struct FpsCounter {
    name: String,
    window_frames: u64,
    total: u64,
    window_start: Instant,
}

impl FpsCounter {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            window_frames: defaults::FPS_WINDOW_FRAMES,
            total: 0,
            window_start: Instant::now(),
        }
    }

    /// Count one completed frame. Returns the window's FPS reading
    /// when a window just closed.
    pub fn tick(&mut self) -> Option<f64> {
        self.total += 1;
        if self.total % self.window_frames != 0 {
            return None;
        }
        let elapsed = self.window_start.elapsed().as_secs_f64();
        self.window_start = Instant::now();
        let fps = self.window_frames as f64 / elapsed;
        info!(
            "{}: frame {} fps {:.2}",
            self.name, self.total, fps
        );
        Some(fps)
    }

    pub fn total(&self) -> u64 {
        self.total
    }
}

/// Drive a configured operation for `loop_count` iterations.
///
/// Each input contributes exactly one frame, read once up front; the
/// loop re-executes against those same frames, writing the output
/// after every iteration when `save` is set. The first failure aborts
/// the run.
pub fn run_loop(
    op: &dyn FrameOp,
    inputs: &mut [VideoStream],
    output: &mut VideoStream,
    loop_count: u32,
    save: bool,
) -> Result<()> {
    if inputs.len() != op.input_count() {
        return Err(FramebenchError::Operation(format!(
            "{} takes {} input stream(s), got {}",
            op.name(),
            op.input_count(),
            inputs.len()
        )));
    }

    for stream in inputs.iter_mut() {
        stream.read_buf()?;
    }
    output.ensure_frame()?;

    let mut fps = FpsCounter::new(op.name());
    for _ in 0..loop_count {
        {
            let frames = inputs
                .iter()
                .map(|s| {
                    s.current_frame().ok_or_else(|| {
                        FramebenchError::Operation(format!(
                            "input stream {} lost its frame",
                            s.path().display()
                        ))
                    })
                })
                .collect::<Result<Vec<&GpuFrame>>>()?;
            let out_frame = output.current_frame().ok_or_else(|| {
                FramebenchError::Operation("output stream lost its frame".to_string())
            })?;
            op.execute(&frames, out_frame)?;
        }
        if save {
            output.write_buf()?;
        }
        fps.tick();
    }
    output.close()?;

    info!(
        iterations = loop_count,
        written = output.frames_written(),
        "benchmark loop finished"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fps_counter_emits_once_per_window() {
        let mut counter = FpsCounter::new("copy");
        for _ in 0..29 {
            assert!(counter.tick().is_none());
        }
        let reading = counter.tick();
        assert!(reading.is_some());
        assert!(reading.unwrap() > 0.0);
        assert_eq!(counter.total(), 30);
    }

    #[test]
    fn fps_counter_stays_quiet_between_windows() {
        let mut counter = FpsCounter::new("remap");
        for _ in 0..30 {
            counter.tick();
        }
        for _ in 0..29 {
            assert!(counter.tick().is_none());
        }
        assert!(counter.tick().is_some());
        assert_eq!(counter.total(), 60);
    }
}
