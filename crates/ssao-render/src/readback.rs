//! Copies render targets back to the CPU.

use crate::error::{RenderError, RenderResult};

/// Calculates bytes per row with proper alignment for wgpu buffer copies.
#[must_use]
pub fn aligned_bytes_per_row(width: u32, bytes_per_texel: u32) -> u32 {
    let unaligned = width * bytes_per_texel;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unaligned.div_ceil(align) * align
}

/// Reads a whole 2D texture, returning tightly packed rows.
pub fn read_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    bytes_per_texel: u32,
) -> RenderResult<Vec<u8>> {
    let (width, height) = (texture.width(), texture.height());
    let bytes_per_row = aligned_bytes_per_row(width, bytes_per_texel);

    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("readback buffer"),
        size: u64::from(bytes_per_row) * u64::from(height),
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("readback copy encoder"),
    });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    queue.submit(std::iter::once(encoder.finish()));

    let buffer_slice = buffer.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    let _ = device.poll(wgpu::PollType::wait_indefinitely());
    rx.recv()
        .map_err(|_| RenderError::BufferMapFailed)?
        .map_err(|_| RenderError::BufferMapFailed)?;

    // Copy data, removing row padding
    let data = buffer_slice.get_mapped_range();
    let row_bytes = (width * bytes_per_texel) as usize;
    let mut result = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height {
        let start = (row * bytes_per_row) as usize;
        result.extend_from_slice(&data[start..start + row_bytes]);
    }
    drop(data);
    buffer.unmap();

    Ok(result)
}

/// Reads an RGBA8 texture.
pub fn read_rgba8(device: &wgpu::Device, queue: &wgpu::Queue, texture: &wgpu::Texture) -> RenderResult<Vec<u8>> {
    read_texture(device, queue, texture, 4)
}

/// Reads an `R16Float` texture as `f32` values in row-major order.
pub fn read_r16float(device: &wgpu::Device, queue: &wgpu::Queue, texture: &wgpu::Texture) -> RenderResult<Vec<f32>> {
    let bytes = read_texture(device, queue, texture, 2)?;
    Ok(decode_r16float(&bytes))
}

/// Decodes little-endian half floats.
#[must_use]
pub fn decode_r16float(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|pair| half::f16::from_le_bytes([pair[0], pair[1]]).to_f32())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_aligned_bytes_per_row() {
        assert_eq!(aligned_bytes_per_row(1, 4), 256);
        assert_eq!(aligned_bytes_per_row(64, 4), 256);
        assert_eq!(aligned_bytes_per_row(65, 4), 512);
        assert_eq!(aligned_bytes_per_row(200, 2), 512);
    }

    #[test]
    fn test_decode_r16float() {
        let values = [0.0f32, 0.5, 1.0, 0.25];
        let bytes: Vec<u8> = values
            .iter()
            .flat_map(|&v| half::f16::from_f32(v).to_le_bytes())
            .collect();
        assert_eq!(decode_r16float(&bytes), values.to_vec());
    }

    proptest! {
        #[test]
        fn prop_aligned_rows_fit_and_align(width in 1u32..4096, bpt in 1u32..17) {
            let row = aligned_bytes_per_row(width, bpt);
            prop_assert_eq!(row % wgpu::COPY_BYTES_PER_ROW_ALIGNMENT, 0);
            prop_assert!(row >= width * bpt);
            prop_assert!(row < width * bpt + wgpu::COPY_BYTES_PER_ROW_ALIGNMENT);
        }
    }
}
