//! GPU frame copy operation.

use super::{check_input_count, check_nv12, check_word_aligned, workgroups, FrameOp};
use crate::context::GpuContext;
use crate::pool::GpuFrame;
use framebench_core::{FramebenchError, Rect, Result};
use std::sync::Arc;
use tracing::debug;

const SHADER: &str = r#"
// Rectangular NV12 copy, one thread per 32-bit word.

struct Params {
    in_width: u32,
    in_height: u32,
    out_width: u32,
    out_height: u32,
    in_x: u32,
    in_y: u32,
    out_x: u32,
    out_y: u32,
    area_w: u32,
    area_h: u32,
    _pad0: u32,
    _pad1: u32,
}

@group(0) @binding(0) var<uniform> params: Params;
@group(0) @binding(1) var<storage, read> src: array<u32>;
@group(0) @binding(2) var<storage, read_write> dst: array<u32>;

@compute @workgroup_size(16, 16)
fn copy_y(@builtin(global_invocation_id) gid: vec3<u32>) {
    let words_per_row = params.area_w / 4u;
    if gid.x >= words_per_row || gid.y >= params.area_h {
        return;
    }
    let src_idx = ((params.in_y + gid.y) * params.in_width + params.in_x) / 4u + gid.x;
    let dst_idx = ((params.out_y + gid.y) * params.out_width + params.out_x) / 4u + gid.x;
    dst[dst_idx] = src[src_idx];
}

@compute @workgroup_size(16, 16)
fn copy_uv(@builtin(global_invocation_id) gid: vec3<u32>) {
    // UV plane: half the rows, same bytes per row as Y.
    let words_per_row = params.area_w / 4u;
    if gid.x >= words_per_row || gid.y >= params.area_h / 2u {
        return;
    }
    let src_base = params.in_width * params.in_height / 4u;
    let dst_base = params.out_width * params.out_height / 4u;
    let src_idx =
        src_base + ((params.in_y / 2u + gid.y) * params.in_width + params.in_x) / 4u + gid.x;
    let dst_idx =
        dst_base + ((params.out_y / 2u + gid.y) * params.out_width + params.out_x) / 4u + gid.x;
    dst[dst_idx] = src[src_idx];
}
"#;

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct CopyParams {
    in_width: u32,
    in_height: u32,
    out_width: u32,
    out_height: u32,
    in_x: u32,
    in_y: u32,
    out_x: u32,
    out_y: u32,
    area_w: u32,
    area_h: u32,
    _pad0: u32,
    _pad1: u32,
}

/// Copies a rectangular region from one NV12 frame into another.
///
/// The source and destination areas are configured once and must have
/// equal width and height: there is no implicit scaling.
pub struct CopyOp {
    ctx: Arc<GpuContext>,
    label: String,
    y_pipeline: wgpu::ComputePipeline,
    uv_pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    params_buffer: wgpu::Buffer,
    areas: Option<(Rect, Rect)>,
}

impl CopyOp {
    pub fn new(ctx: Arc<GpuContext>, label: &str) -> Self {
        let device = &ctx.device;
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("copy shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("copy bind layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("copy pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let make_pipeline = |entry: &str| {
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some("copy pipeline"),
                layout: Some(&pipeline_layout),
                module: &shader,
                entry_point: Some(entry),
                compilation_options: Default::default(),
                cache: None,
            })
        };
        let y_pipeline = make_pipeline("copy_y");
        let uv_pipeline = make_pipeline("copy_uv");

        let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("copy params"),
            size: std::mem::size_of::<CopyParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            ctx,
            label: label.to_string(),
            y_pipeline,
            uv_pipeline,
            bind_group_layout,
            params_buffer,
            areas: None,
        }
    }

    /// Configure the source and destination areas.
    ///
    /// Both rects must have identical width and height; the x offsets
    /// and the width must be word-aligned and the y offsets and height
    /// even (NV12 chroma rows cover two luma rows).
    pub fn set_copy_area(&mut self, in_area: Rect, out_area: Rect) -> Result<()> {
        if !in_area.same_size(&out_area) {
            return Err(FramebenchError::InvalidParameter(format!(
                "{}: copy areas must match in size, got {}x{} vs {}x{}",
                self.label, in_area.width, in_area.height, out_area.width, out_area.height
            )));
        }
        check_word_aligned(&self.label, "copy area width", in_area.width)?;
        check_word_aligned(&self.label, "input area x", in_area.x)?;
        check_word_aligned(&self.label, "output area x", out_area.x)?;
        if in_area.height % 2 != 0 || in_area.y % 2 != 0 || out_area.y % 2 != 0 {
            return Err(FramebenchError::InvalidParameter(format!(
                "{}: copy area y/height must be even for NV12",
                self.label
            )));
        }

        debug!(?in_area, ?out_area, "{}: copy area configured", self.label);
        self.areas = Some((in_area, out_area));
        Ok(())
    }
}

impl FrameOp for CopyOp {
    fn name(&self) -> &str {
        &self.label
    }

    fn input_count(&self) -> usize {
        1
    }

    fn execute(&self, inputs: &[&GpuFrame], output: &GpuFrame) -> Result<()> {
        check_input_count(&self.label, 1, inputs.len())?;
        let input = inputs[0];
        check_nv12(&self.label, input)?;
        check_nv12(&self.label, output)?;

        let (in_area, out_area) = self.areas.ok_or_else(|| {
            FramebenchError::Operation(format!("{}: copy area not configured", self.label))
        })?;

        let in_info = input.info();
        let out_info = output.info();
        if !in_area.fits_in(in_info.width(), in_info.height())
            || !out_area.fits_in(out_info.width(), out_info.height())
        {
            return Err(FramebenchError::InvalidParameter(format!(
                "{}: copy area exceeds frame bounds",
                self.label
            )));
        }
        check_word_aligned(&self.label, "input frame width", in_info.width())?;
        check_word_aligned(&self.label, "output frame width", out_info.width())?;

        let params = CopyParams {
            in_width: in_info.width(),
            in_height: in_info.height(),
            out_width: out_info.width(),
            out_height: out_info.height(),
            in_x: in_area.x,
            in_y: in_area.y,
            out_x: out_area.x,
            out_y: out_area.y,
            area_w: in_area.width,
            area_h: in_area.height,
            _pad0: 0,
            _pad1: 0,
        };
        self.ctx
            .queue
            .write_buffer(&self.params_buffer, 0, bytemuck::cast_slice(&[params]));

        let bind_group = self.ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("copy bind group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.params_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: input.buffer().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: output.buffer().as_entire_binding(),
                },
            ],
        });

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("copy encoder"),
            });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("copy pass"),
                timestamp_writes: None,
            });
            pass.set_bind_group(0, &bind_group, &[]);

            let words_per_row = in_area.width / 4;
            pass.set_pipeline(&self.y_pipeline);
            pass.dispatch_workgroups(workgroups(words_per_row), workgroups(in_area.height), 1);

            pass.set_pipeline(&self.uv_pipeline);
            pass.dispatch_workgroups(
                workgroups(words_per_row),
                workgroups(in_area.height / 2),
                1,
            );
        }
        self.ctx.queue.submit(Some(encoder.finish()));
        self.ctx.wait_idle();
        Ok(())
    }
}
