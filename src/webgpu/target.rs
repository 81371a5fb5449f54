//! Offscreen render target standing in for a canvas

use super::{readback, GpuContext};
use crate::SampleError;
use std::path::Path;

pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

/// Color texture plus the size-dependent depth and multisample attachments
pub struct RenderTarget {
    width: u32,
    height: u32,
    sample_count: u32,
    with_depth: bool,
    color: wgpu::Texture,
    color_view: wgpu::TextureView,
    depth_view: Option<wgpu::TextureView>,
    msaa_view: Option<wgpu::TextureView>,
}

fn create_texture(
    device: &wgpu::Device,
    label: &str,
    (width, height): (u32, u32),
    format: wgpu::TextureFormat,
    sample_count: u32,
    usage: wgpu::TextureUsages,
) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage,
        view_formats: &[],
    })
}

impl RenderTarget {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let (color, color_view) = Self::create_color(device, (width, height));
        Self {
            width,
            height,
            sample_count: 1,
            with_depth: false,
            color,
            color_view,
            depth_view: None,
            msaa_view: None,
        }
    }

    fn create_color(device: &wgpu::Device, size: (u32, u32)) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = create_texture(
            device,
            "Frame Color",
            size,
            COLOR_FORMAT,
            1,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }

    /// Attach a depth buffer, recreated on every resize
    pub fn enable_depth(&mut self, device: &wgpu::Device) {
        self.with_depth = true;
        self.rebuild_attachments(device);
    }

    /// Render into a multisampled texture resolved into the frame
    pub fn enable_msaa(&mut self, device: &wgpu::Device, sample_count: u32) {
        self.sample_count = sample_count.max(1);
        self.rebuild_attachments(device);
    }

    fn rebuild_attachments(&mut self, device: &wgpu::Device) {
        let size = (self.width, self.height);
        self.depth_view = self.with_depth.then(|| {
            create_texture(
                device,
                "Frame Depth",
                size,
                DEPTH_FORMAT,
                self.sample_count,
                wgpu::TextureUsages::RENDER_ATTACHMENT,
            )
            .create_view(&wgpu::TextureViewDescriptor::default())
        });
        self.msaa_view = (self.sample_count > 1).then(|| {
            create_texture(
                device,
                "Frame MSAA",
                size,
                COLOR_FORMAT,
                self.sample_count,
                wgpu::TextureUsages::RENDER_ATTACHMENT,
            )
            .create_view(&wgpu::TextureViewDescriptor::default())
        });
    }

    /// Recreate the frame and every size-dependent attachment
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if (width, height) == (self.width, self.height) || width == 0 || height == 0 {
            return;
        }
        log::debug!(
            "Resizing target {}x{} -> {}x{}",
            self.width,
            self.height,
            width,
            height
        );
        self.width = width;
        self.height = height;
        let (color, color_view) = Self::create_color(device, (width, height));
        self.color = color;
        self.color_view = color_view;
        self.rebuild_attachments(device);
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        COLOR_FORMAT
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Color attachment cleared to `clear`; resolves when multisampled
    pub fn color_attachment(&self, clear: wgpu::Color) -> wgpu::RenderPassColorAttachment<'_> {
        let (view, resolve_target) = match &self.msaa_view {
            Some(msaa) => (msaa, Some(&self.color_view)),
            None => (&self.color_view, None),
        };
        wgpu::RenderPassColorAttachment {
            view,
            resolve_target,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(clear),
                store: wgpu::StoreOp::Store,
            },
        }
    }

    /// Depth attachment cleared to 1.0, if depth is enabled
    pub fn depth_attachment(&self) -> Option<wgpu::RenderPassDepthStencilAttachment<'_>> {
        self.depth_view
            .as_ref()
            .map(|view| wgpu::RenderPassDepthStencilAttachment {
                view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            })
    }

    /// Tightly packed RGBA8 pixels of the last frame
    pub fn read_pixels(&self, ctx: &GpuContext) -> Result<Vec<u8>, SampleError> {
        readback::read_texture_rgba8(ctx, &self.color, self.size())
    }

    pub fn save_png(&self, ctx: &GpuContext, path: impl AsRef<Path>) -> Result<(), SampleError> {
        let pixels = self.read_pixels(ctx)?;
        let image = image::RgbaImage::from_raw(self.width, self.height, pixels)
            .ok_or_else(|| SampleError::Readback("pixel buffer does not match frame size".into()))?;
        image.save(path.as_ref())?;
        log::info!("Captured frame to {}", path.as_ref().display());
        Ok(())
    }
}
