//! Two-pass directional shadow mapping
//!
//! Pass one renders every caster from the light into a depth-only texture.
//! Pass two draws the scene from the camera and compares each fragment's
//! light-space depth against the map with a 3x3 PCF kernel.

use super::{sphere_mesh, MeshBuffers, Sample, CLEAR_COLOR};
use crate::config::SHADOW_MAPPING_NUM;
use crate::geometry::{self, MeshVertex};
use crate::lighting::{shadow_light_position, SHADOW_MAP_SIZE};
use crate::math::{light_space_matrix, projection_matrix};
use crate::simulation::{self, SceneObject};
use crate::webgpu::{shaders, GpuContext, RenderPipelineBuilder, RenderTarget, DEPTH_FORMAT};
use crate::{SampleError, SampleKind};
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

pub const SHADOW_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

const CAMERA_EYE: Vec3 = Vec3::new(0.0, 10.0, 20.0);
const CAMERA_NEAR: f32 = 0.1;
const CAMERA_FAR: f32 = 1000.0;

/// Center box and floor (instances 0 and 1), bouncing spheres after them
pub struct ShadowMapping {
    shadow_pipeline: wgpu::RenderPipeline,
    render_pipeline: wgpu::RenderPipeline,
    box_mesh: MeshBuffers,
    sphere_mesh: MeshBuffers,
    model_view_buffer: wgpu::Buffer,
    camera_buffer: wgpu::Buffer,
    light_projection_buffer: wgpu::Buffer,
    light_buffer: wgpu::Buffer,
    shadow_view: wgpu::TextureView,
    shadow_group: wgpu::BindGroup,
    vertex_group: wgpu::BindGroup,
    fragment_group: wgpu::BindGroup,
    objects: Vec<SceneObject>,
}

fn camera_projection(aspect: f32) -> Mat4 {
    projection_matrix(aspect, 60f32.to_radians(), CAMERA_NEAR, CAMERA_FAR, CAMERA_EYE)
}

fn uniform_buffer(device: &wgpu::Device, label: &str, contents: &[u8]) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

impl ShadowMapping {
    pub fn new(ctx: &GpuContext, target: &mut RenderTarget, seed: u64) -> Result<Self, SampleError> {
        let device = &ctx.device;
        target.enable_depth(device);

        let shadow_pipeline = RenderPipelineBuilder::new("Shadow Depth", shaders::SHADOW_DEPTH)
            .with_vertex_buffer(MeshVertex::layout())
            .with_depth(SHADOW_FORMAT)
            .with_cull_mode(wgpu::Face::Back)
            .build(device)?;
        let render_pipeline = RenderPipelineBuilder::new("Shadow Render", shaders::SHADOW_VERTEX)
            .with_vertex_buffer(MeshVertex::layout())
            .with_fragment(shaders::SHADOW_FRAG, target.format())
            .with_depth(DEPTH_FORMAT)
            .with_cull_mode(wgpu::Face::Back)
            .build(device)?;

        let shadow_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Shadow Map"),
            size: wgpu::Extent3d {
                width: SHADOW_MAP_SIZE,
                height: SHADOW_MAP_SIZE,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: SHADOW_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let shadow_view = shadow_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let shadow_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shadow Sampler"),
            compare: Some(wgpu::CompareFunction::Less),
            ..Default::default()
        });

        let box_mesh = MeshBuffers::new(device, "Box", &geometry::box_mesh());
        let sphere_mesh = MeshBuffers::new(device, "Sphere", &sphere_mesh());

        let objects = simulation::shadow_scene(&mut simulation::seeded_rng(seed), SHADOW_MAPPING_NUM);
        let model_view_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Model View Storage"),
            contents: bytemuck::cast_slice(&simulation::model_matrices(&objects)),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        });
        let color_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Color Storage"),
            contents: bytemuck::cast_slice(&simulation::colors(&objects)),
            usage: wgpu::BufferUsages::STORAGE,
        });

        let light_position = shadow_light_position(0.0);
        let camera_buffer = uniform_buffer(
            device,
            "Camera Projection",
            bytemuck::bytes_of(&camera_projection(target.aspect())),
        );
        let light_projection_buffer = uniform_buffer(
            device,
            "Light Projection",
            bytemuck::bytes_of(&light_space_matrix(light_position)),
        );
        let light_buffer = uniform_buffer(
            device,
            "Light Position",
            bytemuck::bytes_of(&light_position.extend(0.0)),
        );

        let shadow_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Shadow Pass Bind Group"),
            layout: &shadow_pipeline.get_bind_group_layout(0),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: model_view_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: light_projection_buffer.as_entire_binding(),
                },
            ],
        });
        let vertex_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Shadow Vertex Bind Group"),
            layout: &render_pipeline.get_bind_group_layout(0),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: model_view_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: light_projection_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: color_buffer.as_entire_binding(),
                },
            ],
        });
        let fragment_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Shadow Fragment Bind Group"),
            layout: &render_pipeline.get_bind_group_layout(1),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: light_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&shadow_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&shadow_sampler),
                },
            ],
        });

        Ok(Self {
            shadow_pipeline,
            render_pipeline,
            box_mesh,
            sphere_mesh,
            model_view_buffer,
            camera_buffer,
            light_projection_buffer,
            light_buffer,
            shadow_view,
            shadow_group,
            vertex_group,
            fragment_group,
            objects,
        })
    }

    fn draw_scene(&self, pass: &mut wgpu::RenderPass<'_>) {
        self.box_mesh.draw(pass, 0..2);
        self.sphere_mesh.draw(pass, 2..self.objects.len() as u32);
    }
}

impl Sample for ShadowMapping {
    fn kind(&self) -> SampleKind {
        SampleKind::ShadowMapping
    }

    fn update(&mut self, ctx: &GpuContext, _target: &RenderTarget, t: f32) {
        let light_position = shadow_light_position(t);
        ctx.queue.write_buffer(
            &self.light_projection_buffer,
            0,
            bytemuck::bytes_of(&light_space_matrix(light_position)),
        );
        ctx.queue.write_buffer(
            &self.light_buffer,
            0,
            bytemuck::bytes_of(&light_position.extend(0.0)),
        );

        simulation::bounce_spheres(&mut self.objects);
        ctx.queue.write_buffer(
            &self.model_view_buffer,
            0,
            bytemuck::cast_slice(&simulation::model_matrices(&self.objects)),
        );
    }

    fn render(&self, ctx: &GpuContext, target: &RenderTarget) {
        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Shadow Mapping Encoder"),
            });

        {
            let mut shadow_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.shadow_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            shadow_pass.set_pipeline(&self.shadow_pipeline);
            shadow_pass.set_bind_group(0, &self.shadow_group, &[]);
            self.draw_scene(&mut shadow_pass);
        }

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Render Pass"),
                color_attachments: &[Some(target.color_attachment(CLEAR_COLOR))],
                depth_stencil_attachment: target.depth_attachment(),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, &self.vertex_group, &[]);
            render_pass.set_bind_group(1, &self.fragment_group, &[]);
            self.draw_scene(&mut render_pass);
        }

        ctx.queue.submit(std::iter::once(encoder.finish()));
    }

    fn resize(&mut self, ctx: &GpuContext, target: &RenderTarget) {
        ctx.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::bytes_of(&camera_projection(target.aspect())),
        );
    }
}
