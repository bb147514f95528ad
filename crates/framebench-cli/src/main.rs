//! framebench - GPU frame-operation benchmark harness
//!
//! Reads one raw NV12 frame per input stream, drives a copy, remap,
//! or blend operation through GPU buffer pools for a configurable
//! number of iterations, reports throughput, and optionally writes
//! each iteration's output frame back to disk.

use anyhow::Result;
use clap::Parser;
use framebench_cli::bench;
use framebench_cli::config::{Cli, OpKind, RunConfig};
use framebench_cli::regions::MergeRegions;
use framebench_core::{defaults, DisplacementTable, FramebenchError, PixelFormat, Rect};
use framebench_gpu::{BlendOp, CopyOp, FrameOp, GpuContext, RemapOp};
use framebench_stream::VideoStream;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = RunConfig::from_cli(Cli::parse())?;
    config.log_summary();

    let ctx = Arc::new(GpuContext::new_blocking()?);
    info!(adapter = %ctx.adapter_info().name, "device acquired");

    let op = build_operation(&config, Arc::clone(&ctx))?;

    let mut inputs = Vec::with_capacity(config.inputs.len());
    for path in &config.inputs {
        let mut stream = VideoStream::new(path);
        stream.set_dimensions(config.in_width, config.in_height);
        stream.set_device(Arc::clone(&ctx));
        stream.create_buf_pool(defaults::POOL_RESERVE_COUNT, PixelFormat::Nv12)?;
        stream.open_reader()?;
        inputs.push(stream);
    }

    let mut output = VideoStream::new(&config.output);
    output.set_dimensions(config.out_width, config.out_height);
    output.set_device(Arc::clone(&ctx));
    output.create_buf_pool(defaults::POOL_RESERVE_COUNT, PixelFormat::Nv12)?;
    if config.save {
        output.estimate_file_format()?;
        output.open_writer()?;
    }

    bench::run_loop(
        op.as_ref(),
        &mut inputs,
        &mut output,
        config.loop_count,
        config.save,
    )?;

    Ok(())
}

/// Build and fully configure the selected operation.
///
/// Runs before any stream pool exists; a missing or unrecognized
/// `--type` fails here.
fn build_operation(
    config: &RunConfig,
    ctx: Arc<GpuContext>,
) -> framebench_core::Result<Box<dyn FrameOp>> {
    match config.op {
        Some(OpKind::Copy) => {
            let mut op = CopyOp::new(ctx, "copy");
            op.set_copy_area(
                Rect::full(config.in_width, config.in_height),
                Rect::full(config.out_width, config.out_height),
            )?;
            Ok(Box::new(op))
        }
        Some(OpKind::Remap) => {
            let mut op = RemapOp::new(ctx, "remap");
            op.set_output_size(config.out_width, config.out_height)?;
            let (grid_w, grid_h) =
                DisplacementTable::grid_size(config.out_width, config.out_height);
            let table = DisplacementTable::horizontal_flip(grid_w, grid_h);
            op.set_lookup_table(&table)?;
            Ok(Box::new(op))
        }
        Some(OpKind::Blend) => {
            let mut op = BlendOp::new(ctx, "blend");
            let sizes: Vec<(u32, u32)> = config
                .inputs
                .iter()
                .map(|_| (config.in_width, config.in_height))
                .collect();
            let regions = MergeRegions::new(config.out_width, config.out_height, &sizes);
            op.set_merge_window(regions.window)?;
            for (i, area) in regions.areas.iter().enumerate() {
                op.set_input_merge_area(*area, i)?;
            }
            Ok(Box::new(op))
        }
        None => Err(FramebenchError::Config(
            "unsupported operation type, expected copy, remap, or blend".to_string(),
        )),
    }
}
