//! Render and compute pipeline creation
//!
//! Every creation call runs inside a validation error scope so a bad WGSL
//! source or a layout mismatch comes back as a `SampleError` instead of
//! reaching the device's uncaptured-error handler.

use crate::SampleError;
use wgpu::{ComputePipeline, Device, RenderPipeline, ShaderModule};

fn pop_validation_error(device: &Device) -> Option<String> {
    pollster::block_on(device.pop_error_scope()).map(|e| e.to_string())
}

/// Compile a WGSL module
pub fn create_shader_module(
    device: &Device,
    label: &str,
    source: &str,
) -> Result<ShaderModule, SampleError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    match pop_validation_error(device) {
        Some(err) => Err(SampleError::ShaderCompilation(format!("{}: {}", label, err))),
        None => {
            log::debug!("Compiled shader module {}", label);
            Ok(module)
        }
    }
}

/// Builder for the render pipelines used by the samples
///
/// Vertex and fragment sources are compiled on `build`. Without an explicit
/// layout the pipeline layout is derived from the shaders and bind group
/// layouts are fetched with `get_bind_group_layout`.
pub struct RenderPipelineBuilder<'a> {
    label: &'a str,
    vertex_source: &'a str,
    fragment_source: Option<&'a str>,
    buffers: Vec<wgpu::VertexBufferLayout<'a>>,
    color_format: Option<wgpu::TextureFormat>,
    depth_format: Option<wgpu::TextureFormat>,
    cull_mode: Option<wgpu::Face>,
    sample_count: u32,
    layout: Option<&'a wgpu::PipelineLayout>,
}

impl<'a> RenderPipelineBuilder<'a> {
    pub fn new(label: &'a str, vertex_source: &'a str) -> Self {
        Self {
            label,
            vertex_source,
            fragment_source: None,
            buffers: Vec::new(),
            color_format: None,
            depth_format: None,
            cull_mode: None,
            sample_count: 1,
            layout: None,
        }
    }

    /// Fragment stage writing to one color target of `format`
    pub fn with_fragment(mut self, source: &'a str, format: wgpu::TextureFormat) -> Self {
        self.fragment_source = Some(source);
        self.color_format = Some(format);
        self
    }

    pub fn with_vertex_buffer(mut self, layout: wgpu::VertexBufferLayout<'a>) -> Self {
        self.buffers.push(layout);
        self
    }

    /// Depth test `Less` with depth writes on
    pub fn with_depth(mut self, format: wgpu::TextureFormat) -> Self {
        self.depth_format = Some(format);
        self
    }

    pub fn with_cull_mode(mut self, face: wgpu::Face) -> Self {
        self.cull_mode = Some(face);
        self
    }

    pub fn with_sample_count(mut self, count: u32) -> Self {
        self.sample_count = count.max(1);
        self
    }

    pub fn with_layout(mut self, layout: &'a wgpu::PipelineLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn build(self, device: &Device) -> Result<RenderPipeline, SampleError> {
        let vertex_module =
            create_shader_module(device, &format!("{} vertex", self.label), self.vertex_source)?;
        let fragment_module = match self.fragment_source {
            Some(source) => Some(create_shader_module(
                device,
                &format!("{} fragment", self.label),
                source,
            )?),
            None => None,
        };

        let targets = [self.color_format.map(|format| wgpu::ColorTargetState {
            format,
            blend: None,
            write_mask: wgpu::ColorWrites::ALL,
        })];

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(self.label),
            layout: self.layout,
            vertex: wgpu::VertexState {
                module: &vertex_module,
                entry_point: Some("main"),
                compilation_options: Default::default(),
                buffers: &self.buffers,
            },
            fragment: fragment_module.as_ref().map(|module| wgpu::FragmentState {
                module,
                entry_point: Some("main"),
                compilation_options: Default::default(),
                targets: &targets,
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: self.cull_mode,
                ..Default::default()
            },
            depth_stencil: self.depth_format.map(|format| wgpu::DepthStencilState {
                format,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: self.sample_count,
                ..Default::default()
            },
            multiview: None,
            cache: None,
        });

        match pop_validation_error(device) {
            Some(err) => Err(SampleError::PipelineCreation(format!("{}: {}", self.label, err))),
            None => {
                log::debug!(
                    "Created render pipeline {} ({} samples)",
                    self.label,
                    self.sample_count
                );
                Ok(pipeline)
            }
        }
    }
}

/// Create a compute pipeline with entry point `main`
///
/// `layout` of `None` derives the layout from the shader.
pub fn create_compute_pipeline(
    device: &Device,
    label: &str,
    source: &str,
    layout: Option<&wgpu::PipelineLayout>,
) -> Result<ComputePipeline, SampleError> {
    let module = create_shader_module(device, label, source)?;

    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some(label),
        layout,
        module: &module,
        entry_point: Some("main"),
        compilation_options: Default::default(),
        cache: None,
    });

    match pop_validation_error(device) {
        Some(err) => Err(SampleError::PipelineCreation(format!("{}: {}", label, err))),
        None => {
            log::debug!("Created compute pipeline {}", label);
            Ok(pipeline)
        }
    }
}

/// Bind group layout entry for a buffer visible to `visibility`
pub fn buffer_layout_entry(
    binding: u32,
    visibility: wgpu::ShaderStages,
    ty: wgpu::BufferBindingType,
    has_dynamic_offset: bool,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty,
            has_dynamic_offset,
            min_binding_size: None,
        },
        count: None,
    }
}
