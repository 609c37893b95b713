//! Volume texture upload.

use slabview_core::Image;

use crate::context::GpuContext;
use crate::error::{RenderError, RenderResult};

/// Texel format of the volume: intensity duplicated into RGB, opaque alpha.
pub const VOLUME_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Texture extent of `image`: width, height and depth as texture axes.
#[must_use]
pub fn volume_extent(image: &Image) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: image.width(),
        height: image.height(),
        depth_or_array_layers: image.depth(),
    }
}

/// A 3D color texture holding one image, with its view and sampler.
pub struct VolumeTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl VolumeTexture {
    /// Creates the texture and uploads `image` into it.
    pub fn new(gpu: &GpuContext, image: &Image, label: &str) -> RenderResult<Self> {
        let limit = gpu.max_texture_dimension_3d();
        if image.size().iter().any(|&s| s > limit) {
            return Err(RenderError::TextureTooLarge {
                size: image.size(),
                limit,
            });
        }

        let size = volume_extent(image);
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&format!("{label} texture")),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D3,
            format: VOLUME_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        gpu.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.to_rgba8(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(size.width * 4),
                rows_per_image: Some(size.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            dimension: Some(wgpu::TextureViewDimension::D3),
            ..Default::default()
        });

        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{label} sampler")),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        log::debug!("uploaded {label} volume {:?}", image.size());
        Ok(Self {
            texture,
            view,
            sampler,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extent_axes() {
        let image = Image::new(vec![0; 2 * 3 * 5], [2, 3, 5]).unwrap();
        let extent = volume_extent(&image);
        assert_eq!(extent.width, 5);
        assert_eq!(extent.height, 3);
        assert_eq!(extent.depth_or_array_layers, 2);
    }
}
