//! Where a view's frames go: a window surface or an offscreen texture.

use crate::buffer::aligned_bytes_per_row;
use crate::context::GpuContext;
use crate::error::{RenderError, RenderResult};

/// A color target that hands out one texture view per frame.
pub trait RenderTarget {
    /// Current size in pixels.
    fn size(&self) -> (u32, u32);

    /// Color format of the frames.
    fn format(&self) -> wgpu::TextureFormat;

    /// Acquires the texture for the next frame.
    fn acquire(&mut self) -> RenderResult<TargetFrame>;

    /// Resizes the target. Zero sizes are clamped to one pixel.
    fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32);
}

/// One acquired frame. Call [`TargetFrame::present`] after submitting.
pub struct TargetFrame {
    view: wgpu::TextureView,
    surface_texture: Option<wgpu::SurfaceTexture>,
}

impl TargetFrame {
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Presents surface frames; offscreen frames need no presentation.
    pub fn present(self) {
        if let Some(texture) = self.surface_texture {
            texture.present();
        }
    }
}

/// A configured window surface.
pub struct SurfaceTarget {
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
}

impl SurfaceTarget {
    /// Wraps a surface and configures it with `config`.
    pub fn new(
        device: &wgpu::Device,
        surface: wgpu::Surface<'static>,
        config: wgpu::SurfaceConfiguration,
    ) -> Self {
        surface.configure(device, &config);
        Self { surface, config }
    }

    pub fn config(&self) -> &wgpu::SurfaceConfiguration {
        &self.config
    }
}

impl RenderTarget for SurfaceTarget {
    fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    fn acquire(&mut self) -> RenderResult<TargetFrame> {
        let texture = self.surface.get_current_texture()?;
        let view = texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        Ok(TargetFrame {
            view,
            surface_texture: Some(texture),
        })
    }

    fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(device, &self.config);
    }
}

/// Offscreen color texture for headless hosts and tests.
pub struct OffscreenTarget {
    texture: wgpu::Texture,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
}

impl OffscreenTarget {
    /// Default color format of offscreen targets.
    pub const DEFAULT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        Self::with_format(device, width, height, Self::DEFAULT_FORMAT)
    }

    /// `format` must be a four-byte color format for [`Self::read_pixels`].
    pub fn with_format(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    ) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        Self {
            texture: create_color_texture(device, width, height, format),
            format,
            width,
            height,
        }
    }

    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    /// Copies the target back to host memory as tightly packed RGBA rows.
    pub fn read_pixels(&self, gpu: &GpuContext) -> RenderResult<Vec<u8>> {
        let bytes_per_row = aligned_bytes_per_row(self.width, 4);
        let buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("offscreen readback buffer"),
            size: u64::from(bytes_per_row) * u64::from(self.height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("offscreen readback encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        gpu.queue.submit(std::iter::once(encoder.finish()));

        let slice = buffer.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        let _ = gpu.device.poll(wgpu::PollType::Wait);
        receiver
            .recv()
            .map_err(|_| RenderError::ReadbackFailed("channel closed".into()))?
            .map_err(|err| RenderError::ReadbackFailed(err.to_string()))?;

        let data = slice.get_mapped_range();
        let row_bytes = self.width as usize * 4;
        let mut pixels = Vec::with_capacity(row_bytes * self.height as usize);
        for row in data.chunks_exact(bytes_per_row as usize) {
            pixels.extend_from_slice(&row[..row_bytes]);
        }
        drop(data);
        buffer.unmap();
        Ok(pixels)
    }
}

impl RenderTarget for OffscreenTarget {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    fn acquire(&mut self) -> RenderResult<TargetFrame> {
        Ok(TargetFrame {
            view: self
                .texture
                .create_view(&wgpu::TextureViewDescriptor::default()),
            surface_texture: None,
        })
    }

    fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        if (width, height) != (self.width, self.height) {
            self.texture = create_color_texture(device, width, height, self.format);
            self.width = width;
            self.height = height;
        }
    }
}

fn create_color_texture(
    device: &wgpu::Device,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some("offscreen color texture"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    })
}
