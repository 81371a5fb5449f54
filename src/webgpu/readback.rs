//! Blocking GPU -> CPU copies

use super::GpuContext;
use crate::SampleError;

/// Round `value` up to the 256-byte row alignment required for texture copies
pub fn padded_bytes_per_row(value: u32) -> u32 {
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    value.div_ceil(align) * align
}

/// Map a `MAP_READ` buffer and copy out its first `size` bytes
pub fn map_buffer(ctx: &GpuContext, buffer: &wgpu::Buffer, size: u64) -> Result<Vec<u8>, SampleError> {
    let slice = buffer.slice(..size);
    let (sender, receiver) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = sender.send(result);
    });
    ctx.device.poll(wgpu::Maintain::Wait);

    receiver
        .recv()
        .map_err(|e| SampleError::Readback(e.to_string()))?
        .map_err(|e| SampleError::Readback(e.to_string()))?;

    let data = slice.get_mapped_range().to_vec();
    buffer.unmap();
    Ok(data)
}

/// Copy `size` bytes of `source` into a staging buffer and read them back
pub fn read_buffer(ctx: &GpuContext, source: &wgpu::Buffer, size: u64) -> Result<Vec<u8>, SampleError> {
    if size == 0 {
        return Ok(Vec::new());
    }
    let staging = ctx.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Readback Staging Buffer"),
        size,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = ctx
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Readback Encoder"),
        });
    encoder.copy_buffer_to_buffer(source, 0, &staging, 0, size);
    ctx.queue.submit(std::iter::once(encoder.finish()));

    map_buffer(ctx, &staging, size)
}

/// Read a single-sample RGBA8 texture into tightly packed rows
pub fn read_texture_rgba8(
    ctx: &GpuContext,
    texture: &wgpu::Texture,
    (width, height): (u32, u32),
) -> Result<Vec<u8>, SampleError> {
    if width == 0 || height == 0 {
        return Err(SampleError::Readback("texture size must be positive".into()));
    }

    let tight_bpr = 4 * width;
    let padded_bpr = padded_bytes_per_row(tight_bpr);
    let buffer_size = padded_bpr as u64 * height as u64;

    let staging = ctx.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Texture Readback Buffer"),
        size: buffer_size,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = ctx
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Texture Readback Encoder"),
        });
    encoder.copy_texture_to_buffer(
        wgpu::ImageCopyTexture {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::ImageCopyBuffer {
            buffer: &staging,
            layout: wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(padded_bpr),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    ctx.queue.submit(std::iter::once(encoder.finish()));

    let padded = map_buffer(ctx, &staging, buffer_size)?;
    Ok(strip_row_padding(&padded, tight_bpr as usize, padded_bpr as usize, height as usize))
}

fn strip_row_padding(data: &[u8], tight_bpr: usize, padded_bpr: usize, rows: usize) -> Vec<u8> {
    let mut tight = Vec::with_capacity(tight_bpr * rows);
    for row in data.chunks(padded_bpr).take(rows) {
        tight.extend_from_slice(&row[..tight_bpr]);
    }
    tight
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_pad_to_256_bytes() {
        assert_eq!(padded_bytes_per_row(4), 256);
        assert_eq!(padded_bytes_per_row(256), 256);
        assert_eq!(padded_bytes_per_row(4 * 800), 3328);
    }

    #[test]
    fn padding_is_removed_per_row() {
        let mut padded = vec![0u8; 2 * 8];
        padded[..3].copy_from_slice(&[1, 2, 3]);
        padded[8..11].copy_from_slice(&[4, 5, 6]);
        assert_eq!(strip_row_padding(&padded, 3, 8, 2), vec![1, 2, 3, 4, 5, 6]);
    }
}
