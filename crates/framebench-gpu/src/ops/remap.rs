//! GPU geometric remap operation.
//!
//! Warps an NV12 frame through a coarse displacement lookup table:
//! one source-position sample per 8x8 output cell, with the in-cell
//! pixel offset added back so cells stay contiguous.

use super::{check_input_count, check_nv12, check_word_aligned, workgroups, FrameOp};
use crate::context::GpuContext;
use crate::pool::GpuFrame;
use framebench_core::{DisplacementTable, FramebenchError, Result};
use std::sync::Arc;
use tracing::debug;
use wgpu::util::DeviceExt;

const SHADER: &str = r#"
// Coarse-grid remap for NV12, one thread per 32-bit output word.

struct Params {
    in_width: u32,
    in_height: u32,
    out_width: u32,
    out_height: u32,
    lut_width: u32,
    lut_height: u32,
    _pad0: u32,
    _pad1: u32,
}

@group(0) @binding(0) var<uniform> params: Params;
@group(0) @binding(1) var<storage, read> lut: array<vec2<f32>>;
@group(0) @binding(2) var<storage, read> src: array<u32>;
@group(0) @binding(3) var<storage, read_write> dst: array<u32>;

// Resolve an output pixel to its source position: the cell's lookup
// sample plus the in-cell offset, clamped to the input frame.
fn source_pos(x: u32, y: u32) -> vec2<u32> {
    let cx = min(x / 8u, params.lut_width - 1u);
    let cy = min(y / 8u, params.lut_height - 1u);
    let d = lut[cy * params.lut_width + cx];
    let sx = u32(max(d.x, 0.0)) + (x % 8u);
    let sy = u32(max(d.y, 0.0)) + (y % 8u);
    return vec2<u32>(min(sx, params.in_width - 1u), min(sy, params.in_height - 1u));
}

fn src_y_byte(x: u32, y: u32) -> u32 {
    let idx = y * params.in_width + x;
    return (src[idx / 4u] >> ((idx % 4u) * 8u)) & 0xFFu;
}

// Chroma byte at chroma coordinates (cx, cy); v = 0 for U, 1 for V.
fn src_uv_byte(cx: u32, cy: u32, v: u32) -> u32 {
    let base = params.in_width * params.in_height;
    let idx = base + cy * params.in_width + cx * 2u + v;
    return (src[idx / 4u] >> ((idx % 4u) * 8u)) & 0xFFu;
}

@compute @workgroup_size(16, 16)
fn remap_y(@builtin(global_invocation_id) gid: vec3<u32>) {
    let words_per_row = params.out_width / 4u;
    if gid.x >= words_per_row || gid.y >= params.out_height {
        return;
    }
    var word = 0u;
    for (var lane = 0u; lane < 4u; lane++) {
        let x = gid.x * 4u + lane;
        let s = source_pos(x, gid.y);
        word |= src_y_byte(s.x, s.y) << (lane * 8u);
    }
    dst[gid.y * words_per_row + gid.x] = word;
}

@compute @workgroup_size(16, 16)
fn remap_uv(@builtin(global_invocation_id) gid: vec3<u32>) {
    let words_per_row = params.out_width / 4u;
    if gid.x >= words_per_row || gid.y >= params.out_height / 2u {
        return;
    }
    let dst_base = params.out_width * params.out_height / 4u;
    var word = 0u;
    // Two UV pairs per word.
    for (var p = 0u; p < 2u; p++) {
        let luma_x = (gid.x * 2u + p) * 2u;
        let luma_y = gid.y * 2u;
        let s = source_pos(luma_x, luma_y);
        let scx = min(s.x / 2u, params.in_width / 2u - 1u);
        let scy = min(s.y / 2u, params.in_height / 2u - 1u);
        word |= src_uv_byte(scx, scy, 0u) << (p * 16u);
        word |= src_uv_byte(scx, scy, 1u) << (p * 16u + 8u);
    }
    dst[dst_base + gid.y * words_per_row + gid.x] = word;
}
"#;

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct RemapParams {
    in_width: u32,
    in_height: u32,
    out_width: u32,
    out_height: u32,
    lut_width: u32,
    lut_height: u32,
    _pad0: u32,
    _pad1: u32,
}

/// Remaps an NV12 frame through a displacement lookup table.
///
/// Configure with `set_output_size` then `set_lookup_table`; the op
/// keeps its own GPU copy of the table for repeated use across loop
/// iterations.
pub struct RemapOp {
    ctx: Arc<GpuContext>,
    label: String,
    y_pipeline: wgpu::ComputePipeline,
    uv_pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    params_buffer: wgpu::Buffer,
    output_size: Option<(u32, u32)>,
    lut: Option<(wgpu::Buffer, u32, u32)>,
}

impl RemapOp {
    pub fn new(ctx: Arc<GpuContext>, label: &str) -> Self {
        let device = &ctx.device;
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("remap shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER.into()),
        });

        let storage_entry = |binding: u32, read_only: bool| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("remap bind layout"),
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
                storage_entry(1, true),
                storage_entry(2, true),
                storage_entry(3, false),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("remap pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let make_pipeline = |entry: &str| {
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some("remap pipeline"),
                layout: Some(&pipeline_layout),
                module: &shader,
                entry_point: Some(entry),
                compilation_options: Default::default(),
                cache: None,
            })
        };
        let y_pipeline = make_pipeline("remap_y");
        let uv_pipeline = make_pipeline("remap_uv");

        let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("remap params"),
            size: std::mem::size_of::<RemapParams>() as u64,
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
            output_size: None,
            lut: None,
        }
    }

    /// Set the target output resolution.
    pub fn set_output_size(&mut self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(FramebenchError::InvalidParameter(format!(
                "{}: output size must be non-zero",
                self.label
            )));
        }
        check_word_aligned(&self.label, "output width", width)?;
        if height % 2 != 0 {
            return Err(FramebenchError::InvalidParameter(format!(
                "{}: output height must be even for NV12",
                self.label
            )));
        }
        self.output_size = Some((width, height));
        Ok(())
    }

    /// Hand over the displacement table.
    ///
    /// The grid must match the configured output size exactly, one
    /// sample per 8x8 cell; a mismatched grid would warp geometry
    /// silently, so it is rejected here. The op uploads its own copy.
    pub fn set_lookup_table(&mut self, table: &DisplacementTable) -> Result<()> {
        let (out_w, out_h) = self.output_size.ok_or_else(|| {
            FramebenchError::Operation(format!(
                "{}: set_output_size must precede set_lookup_table",
                self.label
            ))
        })?;

        let expected = DisplacementTable::grid_size(out_w, out_h);
        if (table.width(), table.height()) != expected {
            return Err(FramebenchError::InvalidParameter(format!(
                "{}: lookup table grid {}x{} does not cover output {}x{} (want {}x{})",
                self.label,
                table.width(),
                table.height(),
                out_w,
                out_h,
                expected.0,
                expected.1
            )));
        }

        let buffer = self
            .ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("remap lookup table"),
                contents: bytemuck::cast_slice(table.as_slice()),
                usage: wgpu::BufferUsages::STORAGE,
            });

        debug!(
            grid_w = table.width(),
            grid_h = table.height(),
            "{}: lookup table uploaded",
            self.label
        );
        self.lut = Some((buffer, table.width(), table.height()));
        Ok(())
    }
}

impl FrameOp for RemapOp {
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

        let (out_w, out_h) = self.output_size.ok_or_else(|| {
            FramebenchError::Operation(format!("{}: output size not configured", self.label))
        })?;
        let (lut_buffer, lut_w, lut_h) = self.lut.as_ref().ok_or_else(|| {
            FramebenchError::Operation(format!("{}: lookup table not configured", self.label))
        })?;

        let out_info = output.info();
        if (out_info.width(), out_info.height()) != (out_w, out_h) {
            return Err(FramebenchError::InvalidParameter(format!(
                "{}: output frame {}x{} does not match configured {}x{}",
                self.label,
                out_info.width(),
                out_info.height(),
                out_w,
                out_h
            )));
        }
        check_word_aligned(&self.label, "input frame width", input.info().width())?;

        let params = RemapParams {
            in_width: input.info().width(),
            in_height: input.info().height(),
            out_width: out_w,
            out_height: out_h,
            lut_width: *lut_w,
            lut_height: *lut_h,
            _pad0: 0,
            _pad1: 0,
        };
        self.ctx
            .queue
            .write_buffer(&self.params_buffer, 0, bytemuck::cast_slice(&[params]));

        let bind_group = self.ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("remap bind group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.params_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: lut_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: input.buffer().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: output.buffer().as_entire_binding(),
                },
            ],
        });

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("remap encoder"),
            });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("remap pass"),
                timestamp_writes: None,
            });
            pass.set_bind_group(0, &bind_group, &[]);

            let words_per_row = out_w / 4;
            pass.set_pipeline(&self.y_pipeline);
            pass.dispatch_workgroups(workgroups(words_per_row), workgroups(out_h), 1);

            pass.set_pipeline(&self.uv_pipeline);
            pass.dispatch_workgroups(workgroups(words_per_row), workgroups(out_h / 2), 1);
        }
        self.ctx.queue.submit(Some(encoder.finish()));
        self.ctx.wait_idle();
        Ok(())
    }
}
