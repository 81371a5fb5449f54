//! Cube samples: rotating, dynamic offsets, instanced and textured

use super::{submit_pass, Sample};
use crate::config::CUBES_INSTANCE_NUM;
use crate::geometry::{self, TexturedVertex};
use crate::math::{mvp_matrix, Transform};
use crate::simulation::{self, SceneObject};
use crate::webgpu::{
    buffer_layout_entry, shaders, GpuContext, RenderPipelineBuilder, RenderTarget, DEPTH_FORMAT,
};
use crate::{SampleError, SampleKind};
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

const MAT4_SIZE: u64 = std::mem::size_of::<Mat4>() as u64;

/// Uniform offsets must be multiples of `min_uniform_buffer_offset_alignment` (256)
pub const DYNAMIC_OFFSET: u32 = 256;

/// Second matrix sits at the aligned offset, so 256 + 64 bytes in total
pub const DYNAMIC_BUFFER_SIZE: u64 = DYNAMIC_OFFSET as u64 + MAT4_SIZE;

const TEXTURE_SIZE: u32 = 256;
const TEXTURE_CELLS: u32 = 8;

fn cube_vertex_buffer(device: &wgpu::Device) -> (wgpu::Buffer, u32) {
    let vertices = geometry::cube();
    let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Cube Vertices"),
        contents: bytemuck::cast_slice(&vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });
    (buffer, vertices.len() as u32)
}

fn cube_pipeline<'a>(
    label: &'a str,
    vertex_source: &'a str,
    fragment_source: &'a str,
    target: &RenderTarget,
) -> RenderPipelineBuilder<'a> {
    RenderPipelineBuilder::new(label, vertex_source)
        .with_vertex_buffer(TexturedVertex::layout())
        .with_fragment(fragment_source, target.format())
        .with_depth(DEPTH_FORMAT)
        .with_cull_mode(wgpu::Face::Back)
}

fn spinning(position: Vec3, t: f32) -> Transform {
    Transform {
        rotation: Vec3::new(t.sin(), t.cos(), 0.0),
        ..Transform::from_position(position)
    }
}

/// One cube with its MVP rewritten every frame
pub struct RotatingCube {
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
    mvp_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl RotatingCube {
    pub fn new(ctx: &GpuContext, target: &mut RenderTarget) -> Result<Self, SampleError> {
        let device = &ctx.device;
        target.enable_depth(device);

        let pipeline =
            cube_pipeline("Rotating Cube", shaders::BASIC_VERT, shaders::POSITION_FRAG, target)
                .build(device)?;
        let (vertex_buffer, vertex_count) = cube_vertex_buffer(device);

        let mvp_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("MVP Uniform"),
            size: MAT4_SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Rotating Cube Bind Group"),
            layout: &pipeline.get_bind_group_layout(0),
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: mvp_buffer.as_entire_binding(),
            }],
        });

        Ok(Self {
            pipeline,
            vertex_buffer,
            vertex_count,
            mvp_buffer,
            bind_group,
        })
    }
}

impl Sample for RotatingCube {
    fn kind(&self) -> SampleKind {
        SampleKind::RotatingCube
    }

    fn update(&mut self, ctx: &GpuContext, target: &RenderTarget, t: f32) {
        let transform = spinning(Vec3::new(0.0, 0.0, -5.0), t);
        let mvp = mvp_matrix(target.aspect(), &transform);
        ctx.queue
            .write_buffer(&self.mvp_buffer, 0, bytemuck::bytes_of(&mvp));
    }

    fn render(&self, ctx: &GpuContext, target: &RenderTarget) {
        submit_pass(ctx, target, "Rotating Cube Pass", |pass| {
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.bind_group, &[]);
            pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            pass.draw(0..self.vertex_count, 0..1);
        });
    }
}

/// Two cubes reading their MVP from one buffer at offsets 0 and 256
pub struct CubesDynamicOffsets {
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
    mvp_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl CubesDynamicOffsets {
    pub fn new(ctx: &GpuContext, target: &mut RenderTarget) -> Result<Self, SampleError> {
        let device = &ctx.device;
        target.enable_depth(device);

        // dynamic offsets need an explicit layout
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Dynamic Offset Layout"),
            entries: &[buffer_layout_entry(
                0,
                wgpu::ShaderStages::VERTEX,
                wgpu::BufferBindingType::Uniform,
                true,
            )],
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Dynamic Offset Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = cube_pipeline(
            "Cubes Dynamic Offsets",
            shaders::BASIC_VERT,
            shaders::POSITION_FRAG,
            target,
        )
        .with_layout(&pipeline_layout)
        .build(device)?;
        let (vertex_buffer, vertex_count) = cube_vertex_buffer(device);

        let mvp_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Dynamic MVP Uniform"),
            size: DYNAMIC_BUFFER_SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Dynamic Offset Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &mvp_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(MAT4_SIZE),
                }),
            }],
        });

        Ok(Self {
            pipeline,
            vertex_buffer,
            vertex_count,
            mvp_buffer,
            bind_group,
        })
    }
}

impl Sample for CubesDynamicOffsets {
    fn kind(&self) -> SampleKind {
        SampleKind::CubesDynamicOffsets
    }

    fn update(&mut self, ctx: &GpuContext, target: &RenderTarget, t: f32) {
        let aspect = target.aspect();
        let first = spinning(Vec3::new(2.0, 0.0, -7.0), t);
        let second = Transform {
            rotation: Vec3::new(t.cos(), t.sin(), 0.0),
            ..Transform::from_position(Vec3::new(-2.0, 0.0, -7.0))
        };

        ctx.queue.write_buffer(
            &self.mvp_buffer,
            0,
            bytemuck::bytes_of(&mvp_matrix(aspect, &first)),
        );
        ctx.queue.write_buffer(
            &self.mvp_buffer,
            DYNAMIC_OFFSET as u64,
            bytemuck::bytes_of(&mvp_matrix(aspect, &second)),
        );
    }

    fn render(&self, ctx: &GpuContext, target: &RenderTarget) {
        submit_pass(ctx, target, "Cubes Dynamic Offsets Pass", |pass| {
            pass.set_pipeline(&self.pipeline);
            pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            pass.set_bind_group(0, &self.bind_group, &[0]);
            pass.draw(0..self.vertex_count, 0..1);
            pass.set_bind_group(0, &self.bind_group, &[DYNAMIC_OFFSET]);
            pass.draw(0..self.vertex_count, 0..1);
        });
    }
}

/// Many cubes in one instanced draw, MVPs in a storage buffer
pub struct CubesInstance {
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
    mvp_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    objects: Vec<SceneObject>,
    mvps: Vec<Mat4>,
}

impl CubesInstance {
    pub fn new(ctx: &GpuContext, target: &mut RenderTarget, seed: u64) -> Result<Self, SampleError> {
        let device = &ctx.device;
        target.enable_depth(device);

        let pipeline = cube_pipeline(
            "Cubes Instance",
            shaders::BASIC_INSTANCED_VERT,
            shaders::POSITION_FRAG,
            target,
        )
        .build(device)?;
        let (vertex_buffer, vertex_count) = cube_vertex_buffer(device);

        let objects = simulation::instanced_cubes(&mut simulation::seeded_rng(seed), CUBES_INSTANCE_NUM);
        let mvp_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Instance MVP Storage"),
            size: MAT4_SIZE * objects.len() as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Cubes Instance Bind Group"),
            layout: &pipeline.get_bind_group_layout(0),
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: mvp_buffer.as_entire_binding(),
            }],
        });

        Ok(Self {
            pipeline,
            vertex_buffer,
            vertex_count,
            mvp_buffer,
            bind_group,
            mvps: vec![Mat4::IDENTITY; objects.len()],
            objects,
        })
    }
}

impl Sample for CubesInstance {
    fn kind(&self) -> SampleKind {
        SampleKind::CubesInstance
    }

    fn update(&mut self, ctx: &GpuContext, target: &RenderTarget, t: f32) {
        let aspect = target.aspect();
        for (i, (object, mvp)) in self.objects.iter_mut().zip(self.mvps.iter_mut()).enumerate() {
            object.transform.rotation = simulation::instanced_rotation(t, i);
            *mvp = mvp_matrix(aspect, &object.transform);
        }
        // instance i lives at byte offset 64 * i
        ctx.queue
            .write_buffer(&self.mvp_buffer, 0, bytemuck::cast_slice(&self.mvps));
    }

    fn render(&self, ctx: &GpuContext, target: &RenderTarget) {
        submit_pass(ctx, target, "Cubes Instance Pass", |pass| {
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.bind_group, &[]);
            pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            pass.draw(0..self.vertex_count, 0..self.objects.len() as u32);
        });
    }
}

/// Rotating cube sampling a generated checkerboard
pub struct TexturedCube {
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
    mvp_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl TexturedCube {
    pub fn new(ctx: &GpuContext, target: &mut RenderTarget) -> Result<Self, SampleError> {
        let device = &ctx.device;
        target.enable_depth(device);

        let pipeline =
            cube_pipeline("Textured Cube", shaders::BASIC_VERT, shaders::TEXTURED_FRAG, target)
                .build(device)?;
        let (vertex_buffer, vertex_count) = cube_vertex_buffer(device);

        let size = wgpu::Extent3d {
            width: TEXTURE_SIZE,
            height: TEXTURE_SIZE,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Checkerboard"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        ctx.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &geometry::checkerboard(TEXTURE_SIZE, TEXTURE_CELLS),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * TEXTURE_SIZE),
                rows_per_image: Some(TEXTURE_SIZE),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Checkerboard Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let mvp_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("MVP Uniform"),
            size: MAT4_SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Textured Cube Bind Group"),
            layout: &pipeline.get_bind_group_layout(0),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: mvp_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
            ],
        });

        Ok(Self {
            pipeline,
            vertex_buffer,
            vertex_count,
            mvp_buffer,
            bind_group,
        })
    }
}

impl Sample for TexturedCube {
    fn kind(&self) -> SampleKind {
        SampleKind::TexturedCube
    }

    fn update(&mut self, ctx: &GpuContext, target: &RenderTarget, t: f32) {
        let mvp = mvp_matrix(target.aspect(), &spinning(Vec3::new(0.0, 0.0, -5.0), t));
        ctx.queue
            .write_buffer(&self.mvp_buffer, 0, bytemuck::bytes_of(&mvp));
    }

    fn render(&self, ctx: &GpuContext, target: &RenderTarget) {
        submit_pass(ctx, target, "Textured Cube Pass", |pass| {
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.bind_group, &[]);
            pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            pass.draw(0..self.vertex_count, 0..1);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_cube_is_256_byte_aligned() {
        assert_eq!(DYNAMIC_BUFFER_SIZE, 320);
        assert_eq!(DYNAMIC_OFFSET as u64 % 256, 0);
        assert!(DYNAMIC_OFFSET as u64 >= MAT4_SIZE);
    }

    #[test]
    fn spinning_cube_keeps_its_position() {
        let transform = spinning(Vec3::new(0.0, 0.0, -5.0), 1.0);
        assert_eq!(transform.position, Vec3::new(0.0, 0.0, -5.0));
        assert_eq!(transform.rotation, Vec3::new(1.0f32.sin(), 1.0f32.cos(), 0.0));
        assert_eq!(transform.scale, Vec3::ONE);
    }
}
