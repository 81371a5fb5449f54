//! WebGPU device and queue management

use crate::results::AdapterReport;
use crate::SampleError;
use wgpu::{Adapter, Device, Instance, Queue};

/// WebGPU context
pub struct GpuContext {
    pub instance: Instance,
    pub adapter: Adapter,
    pub device: Device,
    pub queue: Queue,
}

/// Which limits to request from the adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LimitsRequest {
    /// `wgpu::Limits::default()`
    #[default]
    Baseline,
    /// Everything the adapter supports (large storage buffers for compute)
    AdapterMax,
}

impl GpuContext {
    /// Create a new WebGPU context with default limits
    pub fn new() -> Result<Self, SampleError> {
        Self::with_limits(LimitsRequest::Baseline)
    }

    pub fn with_limits(limits: LimitsRequest) -> Result<Self, SampleError> {
        pollster::block_on(Self::new_async(limits))
    }

    async fn new_async(limits: LimitsRequest) -> Result<Self, SampleError> {
        let instance = Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(SampleError::NoAdapter)?;

        let required_limits = match limits {
            LimitsRequest::Baseline => wgpu::Limits::default(),
            LimitsRequest::AdapterMax => adapter.limits(),
        };

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Samples Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits,
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .map_err(|e| SampleError::NoDevice(e.to_string()))?;

        let info = adapter.get_info();
        log::info!("Using adapter {} ({})", info.name, info.backend.to_str());

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
        })
    }

    /// Get device name
    pub fn device_name(&self) -> String {
        let info = self.adapter.get_info();
        format!("{} ({})", info.name, info.backend.to_str())
    }

    pub fn backend_name(&self) -> &'static str {
        self.adapter.get_info().backend.to_str()
    }

    /// Capabilities of the selected adapter
    pub fn probe(&self) -> AdapterReport {
        adapter_report(&self.adapter)
    }
}

/// Probe the default adapter without creating a device
pub fn probe_adapter() -> Result<AdapterReport, SampleError> {
    let instance = Instance::new(wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });
    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::HighPerformance,
        compatible_surface: None,
        force_fallback_adapter: false,
    }))
    .ok_or(SampleError::NoAdapter)?;
    Ok(adapter_report(&adapter))
}

fn adapter_report(adapter: &Adapter) -> AdapterReport {
    let info = adapter.get_info();
    let features = adapter
        .features()
        .iter_names()
        .map(|(name, _)| name.to_string())
        .collect();

    AdapterReport {
        name: info.name,
        vendor: info.vendor,
        device: info.device,
        device_type: format!("{:?}", info.device_type),
        backend: info.backend.to_str().to_string(),
        driver: info.driver,
        driver_info: info.driver_info,
        features,
        limits: limit_table(&adapter.limits()),
    }
}

fn limit_table(limits: &wgpu::Limits) -> Vec<(String, u64)> {
    let entries: [(&str, u64); 24] = [
        ("max_texture_dimension_1d", limits.max_texture_dimension_1d as u64),
        ("max_texture_dimension_2d", limits.max_texture_dimension_2d as u64),
        ("max_texture_dimension_3d", limits.max_texture_dimension_3d as u64),
        ("max_texture_array_layers", limits.max_texture_array_layers as u64),
        ("max_bind_groups", limits.max_bind_groups as u64),
        ("max_bindings_per_bind_group", limits.max_bindings_per_bind_group as u64),
        (
            "max_dynamic_uniform_buffers_per_pipeline_layout",
            limits.max_dynamic_uniform_buffers_per_pipeline_layout as u64,
        ),
        (
            "max_dynamic_storage_buffers_per_pipeline_layout",
            limits.max_dynamic_storage_buffers_per_pipeline_layout as u64,
        ),
        (
            "max_sampled_textures_per_shader_stage",
            limits.max_sampled_textures_per_shader_stage as u64,
        ),
        ("max_samplers_per_shader_stage", limits.max_samplers_per_shader_stage as u64),
        (
            "max_storage_buffers_per_shader_stage",
            limits.max_storage_buffers_per_shader_stage as u64,
        ),
        (
            "max_uniform_buffers_per_shader_stage",
            limits.max_uniform_buffers_per_shader_stage as u64,
        ),
        ("max_uniform_buffer_binding_size", limits.max_uniform_buffer_binding_size as u64),
        ("max_storage_buffer_binding_size", limits.max_storage_buffer_binding_size as u64),
        ("max_vertex_buffers", limits.max_vertex_buffers as u64),
        ("max_buffer_size", limits.max_buffer_size),
        ("max_vertex_attributes", limits.max_vertex_attributes as u64),
        (
            "min_uniform_buffer_offset_alignment",
            limits.min_uniform_buffer_offset_alignment as u64,
        ),
        (
            "min_storage_buffer_offset_alignment",
            limits.min_storage_buffer_offset_alignment as u64,
        ),
        ("max_color_attachments", limits.max_color_attachments as u64),
        (
            "max_compute_workgroup_storage_size",
            limits.max_compute_workgroup_storage_size as u64,
        ),
        (
            "max_compute_invocations_per_workgroup",
            limits.max_compute_invocations_per_workgroup as u64,
        ),
        ("max_compute_workgroup_size_x", limits.max_compute_workgroup_size_x as u64),
        (
            "max_compute_workgroups_per_dimension",
            limits.max_compute_workgroups_per_dimension as u64,
        ),
    ];

    entries
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}
