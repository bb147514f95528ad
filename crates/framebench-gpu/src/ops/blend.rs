//! GPU two-input blend operation.
//!
//! Merges two NV12 inputs into the output's merge window. Each input
//! contributes the pixels of its configured merge area; inside the
//! window the two contributions are averaged, outside it the output
//! is cleared to black with neutral chroma.

use super::{check_input_count, check_nv12, check_word_aligned, workgroups, FrameOp};
use crate::context::GpuContext;
use crate::pool::GpuFrame;
use framebench_core::{FramebenchError, Rect, Result};
use std::sync::Arc;
use tracing::debug;

const SHADER: &str = r#"
// Two-input NV12 merge, one thread per 32-bit output word.

struct Params {
    out_width: u32,
    out_height: u32,
    in0_width: u32,
    in0_height: u32,
    in1_width: u32,
    in1_height: u32,
    _pad0: u32,
    _pad1: u32,
    win_x: u32,
    win_y: u32,
    win_w: u32,
    win_h: u32,
    a0_x: u32,
    a0_y: u32,
    a0_w: u32,
    a0_h: u32,
    a1_x: u32,
    a1_y: u32,
    a1_w: u32,
    a1_h: u32,
}

@group(0) @binding(0) var<uniform> params: Params;
@group(0) @binding(1) var<storage, read> src0: array<u32>;
@group(0) @binding(2) var<storage, read> src1: array<u32>;
@group(0) @binding(3) var<storage, read_write> dst: array<u32>;

fn in_window(x: u32, y: u32) -> bool {
    return x >= params.win_x && x < params.win_x + params.win_w
        && y >= params.win_y && y < params.win_y + params.win_h;
}

// Map a window-relative position into a merge area (nearest sample;
// identity when the area matches the window size).
fn area_pos(rx: u32, ry: u32, ax: u32, ay: u32, aw: u32, ah: u32) -> vec2<u32> {
    let x = ax + rx * aw / params.win_w;
    let y = ay + ry * ah / params.win_h;
    return vec2<u32>(min(x, ax + aw - 1u), min(y, ay + ah - 1u));
}

fn src0_y_byte(x: u32, y: u32) -> u32 {
    let idx = y * params.in0_width + x;
    return (src0[idx / 4u] >> ((idx % 4u) * 8u)) & 0xFFu;
}

fn src1_y_byte(x: u32, y: u32) -> u32 {
    let idx = y * params.in1_width + x;
    return (src1[idx / 4u] >> ((idx % 4u) * 8u)) & 0xFFu;
}

fn src0_uv_byte(cx: u32, cy: u32, v: u32) -> u32 {
    let idx = params.in0_width * params.in0_height + cy * params.in0_width + cx * 2u + v;
    return (src0[idx / 4u] >> ((idx % 4u) * 8u)) & 0xFFu;
}

fn src1_uv_byte(cx: u32, cy: u32, v: u32) -> u32 {
    let idx = params.in1_width * params.in1_height + cy * params.in1_width + cx * 2u + v;
    return (src1[idx / 4u] >> ((idx % 4u) * 8u)) & 0xFFu;
}

@compute @workgroup_size(16, 16)
fn blend_y(@builtin(global_invocation_id) gid: vec3<u32>) {
    let words_per_row = params.out_width / 4u;
    if gid.x >= words_per_row || gid.y >= params.out_height {
        return;
    }
    var word = 0u;
    for (var lane = 0u; lane < 4u; lane++) {
        let x = gid.x * 4u + lane;
        if in_window(x, gid.y) {
            let rx = x - params.win_x;
            let ry = gid.y - params.win_y;
            let p0 = area_pos(rx, ry, params.a0_x, params.a0_y, params.a0_w, params.a0_h);
            let p1 = area_pos(rx, ry, params.a1_x, params.a1_y, params.a1_w, params.a1_h);
            let b = (src0_y_byte(p0.x, p0.y) + src1_y_byte(p1.x, p1.y) + 1u) / 2u;
            word |= b << (lane * 8u);
        }
    }
    dst[gid.y * words_per_row + gid.x] = word;
}

@compute @workgroup_size(16, 16)
fn blend_uv(@builtin(global_invocation_id) gid: vec3<u32>) {
    let words_per_row = params.out_width / 4u;
    if gid.x >= words_per_row || gid.y >= params.out_height / 2u {
        return;
    }
    let dst_base = params.out_width * params.out_height / 4u;
    var word = 0u;
    for (var p = 0u; p < 2u; p++) {
        let luma_x = (gid.x * 2u + p) * 2u;
        let luma_y = gid.y * 2u;
        var u_val = 128u;
        var v_val = 128u;
        if in_window(luma_x, luma_y) {
            let rx = luma_x - params.win_x;
            let ry = luma_y - params.win_y;
            let p0 = area_pos(rx, ry, params.a0_x, params.a0_y, params.a0_w, params.a0_h);
            let p1 = area_pos(rx, ry, params.a1_x, params.a1_y, params.a1_w, params.a1_h);
            let c0 = vec2<u32>(min(p0.x / 2u, params.in0_width / 2u - 1u),
                               min(p0.y / 2u, params.in0_height / 2u - 1u));
            let c1 = vec2<u32>(min(p1.x / 2u, params.in1_width / 2u - 1u),
                               min(p1.y / 2u, params.in1_height / 2u - 1u));
            u_val = (src0_uv_byte(c0.x, c0.y, 0u) + src1_uv_byte(c1.x, c1.y, 0u) + 1u) / 2u;
            v_val = (src0_uv_byte(c0.x, c0.y, 1u) + src1_uv_byte(c1.x, c1.y, 1u) + 1u) / 2u;
        }
        word |= u_val << (p * 16u);
        word |= v_val << (p * 16u + 8u);
    }
    dst[dst_base + gid.y * words_per_row + gid.x] = word;
}
"#;

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct BlendParams {
    out_width: u32,
    out_height: u32,
    in0_width: u32,
    in0_height: u32,
    in1_width: u32,
    in1_height: u32,
    _pad0: u32,
    _pad1: u32,
    win: Rect,
    area0: Rect,
    area1: Rect,
}

/// Blends exactly two NV12 inputs into an output merge window.
pub struct BlendOp {
    ctx: Arc<GpuContext>,
    label: String,
    y_pipeline: wgpu::ComputePipeline,
    uv_pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    params_buffer: wgpu::Buffer,
    window: Option<Rect>,
    areas: [Option<Rect>; 2],
}

impl BlendOp {
    pub fn new(ctx: Arc<GpuContext>, label: &str) -> Self {
        let device = &ctx.device;
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("blend shader"),
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
            label: Some("blend bind layout"),
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
            label: Some("blend pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let make_pipeline = |entry: &str| {
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some("blend pipeline"),
                layout: Some(&pipeline_layout),
                module: &shader,
                entry_point: Some(entry),
                compilation_options: Default::default(),
                cache: None,
            })
        };
        let y_pipeline = make_pipeline("blend_y");
        let uv_pipeline = make_pipeline("blend_uv");

        let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("blend params"),
            size: std::mem::size_of::<BlendParams>() as u64,
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
            window: None,
            areas: [None, None],
        }
    }

    /// Configure the output merge window.
    pub fn set_merge_window(&mut self, window: Rect) -> Result<()> {
        if window.area() == 0 {
            return Err(FramebenchError::InvalidParameter(format!(
                "{}: merge window must be non-empty",
                self.label
            )));
        }
        debug!(?window, "{}: merge window configured", self.label);
        self.window = Some(window);
        Ok(())
    }

    /// Configure the merge area for input `index` (0 or 1).
    pub fn set_input_merge_area(&mut self, area: Rect, index: usize) -> Result<()> {
        if index >= 2 {
            return Err(FramebenchError::InvalidParameter(format!(
                "{}: input index {} out of range (blend takes inputs 0 and 1)",
                self.label, index
            )));
        }
        if area.area() == 0 {
            return Err(FramebenchError::InvalidParameter(format!(
                "{}: merge area must be non-empty",
                self.label
            )));
        }
        debug!(?area, index, "{}: merge area configured", self.label);
        self.areas[index] = Some(area);
        Ok(())
    }
}

impl FrameOp for BlendOp {
    fn name(&self) -> &str {
        &self.label
    }

    fn input_count(&self) -> usize {
        2
    }

    fn execute(&self, inputs: &[&GpuFrame], output: &GpuFrame) -> Result<()> {
        check_input_count(&self.label, 2, inputs.len())?;
        for frame in inputs {
            check_nv12(&self.label, frame)?;
        }
        check_nv12(&self.label, output)?;

        let window = self.window.ok_or_else(|| {
            FramebenchError::Operation(format!("{}: merge window not configured", self.label))
        })?;
        let area0 = self.areas[0].ok_or_else(|| {
            FramebenchError::Operation(format!("{}: merge area 0 not configured", self.label))
        })?;
        let area1 = self.areas[1].ok_or_else(|| {
            FramebenchError::Operation(format!("{}: merge area 1 not configured", self.label))
        })?;

        let out_info = output.info();
        check_word_aligned(&self.label, "output frame width", out_info.width())?;
        if !window.fits_in(out_info.width(), out_info.height()) {
            return Err(FramebenchError::InvalidParameter(format!(
                "{}: merge window exceeds output bounds",
                self.label
            )));
        }
        for (i, (frame, area)) in inputs.iter().zip([area0, area1]).enumerate() {
            if !area.fits_in(frame.info().width(), frame.info().height()) {
                return Err(FramebenchError::InvalidParameter(format!(
                    "{}: merge area {} exceeds input bounds",
                    self.label, i
                )));
            }
        }

        let params = BlendParams {
            out_width: out_info.width(),
            out_height: out_info.height(),
            in0_width: inputs[0].info().width(),
            in0_height: inputs[0].info().height(),
            in1_width: inputs[1].info().width(),
            in1_height: inputs[1].info().height(),
            _pad0: 0,
            _pad1: 0,
            win: window,
            area0,
            area1,
        };
        self.ctx
            .queue
            .write_buffer(&self.params_buffer, 0, bytemuck::cast_slice(&[params]));

        let bind_group = self.ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("blend bind group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.params_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: inputs[0].buffer().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: inputs[1].buffer().as_entire_binding(),
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
                label: Some("blend encoder"),
            });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("blend pass"),
                timestamp_writes: None,
            });
            pass.set_bind_group(0, &bind_group, &[]);

            let words_per_row = out_info.width() / 4;
            pass.set_pipeline(&self.y_pipeline);
            pass.dispatch_workgroups(workgroups(words_per_row), workgroups(out_info.height()), 1);

            pass.set_pipeline(&self.uv_pipeline);
            pass.dispatch_workgroups(
                workgroups(words_per_row),
                workgroups(out_info.height() / 2),
                1,
            );
        }
        self.ctx.queue.submit(Some(encoder.finish()));
        self.ctx.wait_idle();
        Ok(())
    }
}
