//! GPU context management.

use framebench_core::{FramebenchError, Result};
use std::sync::Arc;
use tracing::info;

/// GPU context holding device and queue.
///
/// Acquired once at startup and shared read-only across all streams
/// and operations for the rest of the run.
pub struct GpuContext {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
}

impl GpuContext {
    /// Acquire the default adapter and create a device.
    ///
    /// Fails the whole run if no suitable adapter is available.
    pub async fn new() -> Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| {
                FramebenchError::Device(
                    "no suitable GPU adapter found, check the graphics environment".to_string(),
                )
            })?;

        info!("Using GPU adapter: {:?}", adapter.get_info());

        // Frames travel as storage buffers, so raise the binding limits
        // enough for raw 4K NV12 frames with headroom.
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("framebench device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits {
                        max_buffer_size: 512 * 1024 * 1024,
                        max_storage_buffer_binding_size: 256 * 1024 * 1024,
                        ..wgpu::Limits::default()
                    },
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await
            .map_err(|e| FramebenchError::Device(format!("failed to create device: {}", e)))?;

        Ok(Self {
            instance,
            adapter,
            device: Arc::new(device),
            queue: Arc::new(queue),
        })
    }

    /// Acquire the default device (blocking version).
    pub fn new_blocking() -> Result<Self> {
        pollster::block_on(Self::new())
    }

    /// Get adapter info.
    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    /// Block until all submitted GPU work has completed.
    pub fn wait_idle(&self) {
        let _ = self.device.poll(wgpu::Maintain::Wait);
    }
}
