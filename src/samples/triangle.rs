use super::{submit_pass, Sample};
use crate::config::SceneParams;
use crate::geometry::{self, PositionVertex};
use crate::webgpu::{shaders, GpuContext, RenderPipelineBuilder, RenderTarget};
use crate::{SampleError, SampleKind};
use wgpu::util::DeviceExt;

pub const MSAA_SAMPLE_COUNT: u32 = 4;

/// Red triangle from `vertex_index`, optionally through a 4x MSAA target
pub struct BasicTriangle {
    pipeline: wgpu::RenderPipeline,
    msaa: bool,
}

impl BasicTriangle {
    pub fn new(ctx: &GpuContext, target: &mut RenderTarget, msaa: bool) -> Result<Self, SampleError> {
        if msaa {
            target.enable_msaa(&ctx.device, MSAA_SAMPLE_COUNT);
        }

        let pipeline = RenderPipelineBuilder::new("Basic Triangle", shaders::TRIANGLE_VERT)
            .with_fragment(shaders::RED_FRAG, target.format())
            .with_sample_count(target.sample_count())
            .build(&ctx.device)?;

        Ok(Self { pipeline, msaa })
    }
}

impl Sample for BasicTriangle {
    fn kind(&self) -> SampleKind {
        if self.msaa {
            SampleKind::BasicTriangleMsaa
        } else {
            SampleKind::BasicTriangle
        }
    }

    fn update(&mut self, _ctx: &GpuContext, _target: &RenderTarget, _t: f32) {}

    fn render(&self, ctx: &GpuContext, target: &RenderTarget) {
        submit_pass(ctx, target, "Basic Triangle Pass", |pass| {
            pass.set_pipeline(&self.pipeline);
            pass.draw(0..3, 0..1);
        });
    }
}

/// Vertex-buffer triangle colored by a uniform
pub struct ColorTriangle {
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    color_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl ColorTriangle {
    pub fn new(ctx: &GpuContext, target: &mut RenderTarget) -> Result<Self, SampleError> {
        let device = &ctx.device;

        let pipeline = RenderPipelineBuilder::new("Color Triangle", shaders::POSITION_VERT)
            .with_vertex_buffer(PositionVertex::layout())
            .with_fragment(shaders::COLOR_FRAG, target.format())
            .build(device)?;

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Triangle Vertices"),
            contents: bytemuck::cast_slice(&geometry::triangle()),
            usage: wgpu::BufferUsages::VERTEX,
        });

        // initial color is written through a mapped range, later ones through the queue
        let color_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Triangle Color"),
            size: std::mem::size_of::<[f32; 4]>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: true,
        });
        color_buffer
            .slice(..)
            .get_mapped_range_mut()
            .copy_from_slice(bytemuck::cast_slice(&SceneParams::default().color));
        color_buffer.unmap();

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Color Triangle Bind Group"),
            layout: &pipeline.get_bind_group_layout(0),
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: color_buffer.as_entire_binding(),
            }],
        });

        Ok(Self {
            pipeline,
            vertex_buffer,
            color_buffer,
            bind_group,
        })
    }
}

impl Sample for ColorTriangle {
    fn kind(&self) -> SampleKind {
        SampleKind::ColorTriangle
    }

    fn update(&mut self, _ctx: &GpuContext, _target: &RenderTarget, _t: f32) {}

    fn render(&self, ctx: &GpuContext, target: &RenderTarget) {
        submit_pass(ctx, target, "Color Triangle Pass", |pass| {
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.bind_group, &[]);
            pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            pass.draw(0..3, 0..1);
        });
    }

    fn set_params(&mut self, ctx: &GpuContext, params: &SceneParams) {
        ctx.queue
            .write_buffer(&self.color_buffer, 0, bytemuck::cast_slice(&params.color));
    }
}
