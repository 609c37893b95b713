//! A view: one image layer, one mask layer and a render target driven by a
//! [`ViewController`].

use std::time::Instant;

use slabview_core::{
    FrameScheduler, FrameToken, Image, PointerEvent, ViewController, ViewMode, ViewOptions,
};

use crate::context::GpuContext;
use crate::error::{RenderError, RenderResult};
use crate::image_layer::{ImageLayer, DEPTH_CLEAR, DEPTH_FORMAT};
use crate::layer::Layer;
use crate::mask_layer::MaskLayer;
use crate::target::RenderTarget;

/// Depth attachment cached across frames, rebuilt when the target resizes.
struct DepthTarget {
    view: wgpu::TextureView,
    size: (u32, u32),
}

impl DepthTarget {
    fn new(device: &wgpu::Device, (width, height): (u32, u32)) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("view depth texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            view,
            size: (width, height),
        }
    }
}

/// An interactive 2D or 3D view of one volume.
pub struct View<T: RenderTarget, S: FrameScheduler> {
    id: String,
    gpu: GpuContext,
    target: T,
    scheduler: S,
    controller: ViewController,
    image_layer: ImageLayer,
    mask_layer: MaskLayer,
    depth: Option<DepthTarget>,
    background: wgpu::Color,
}

impl<T: RenderTarget, S: FrameScheduler> View<T, S> {
    /// Creates a view showing the placeholder image and draws it once.
    pub fn new(
        id: impl Into<String>,
        mode: ViewMode,
        gpu: GpuContext,
        target: T,
        scheduler: S,
        options: ViewOptions,
    ) -> RenderResult<Self> {
        let id = id.into();
        let now = Instant::now();
        let (width, height) = target.size();
        let controller = ViewController::new(mode, width, height, options, now)?;
        let image_layer = ImageLayer::new(
            &id,
            mode,
            &gpu,
            target.format(),
            None,
            controller.options(),
        )?;
        let [r, g, b, a] = controller.options().background_color;

        let mut view = Self {
            mask_layer: MaskLayer::new(&id),
            id,
            gpu,
            target,
            scheduler,
            controller,
            image_layer,
            depth: None,
            background: wgpu::Color {
                r: f64::from(r),
                g: f64::from(g),
                b: f64::from(b),
                a: f64::from(a),
            },
        };
        view.image_layer.update_scene(&mut view.controller, now);
        view.render()?;

        log::info!("created {mode} view '{}' ({width}x{height})", view.id);
        Ok(view)
    }

    /// Replaces the image layer with one built for `image`, then draws once.
    ///
    /// On failure the previous layer stays in place.
    pub fn update_image(&mut self, image: &Image) -> RenderResult<()> {
        let layer = ImageLayer::new(
            &self.id,
            self.controller.mode(),
            &self.gpu,
            self.target.format(),
            Some(image),
            self.controller.options(),
        )?;
        self.image_layer = layer;
        log::info!("view '{}' now shows {:?}", self.id, image.size());

        let now = Instant::now();
        self.controller.restart_clock(now);
        self.image_layer.update_scene(&mut self.controller, now);
        self.render()
    }

    /// Sets the contrast window in raw intensity units, then draws once.
    pub fn handle_contrast_change(&mut self, min: f32, max: f32) -> RenderResult<()> {
        self.image_layer.update_contrast(min, max);
        self.render()
    }

    /// Clamps and applies a zoom level, then draws once. Returns the stored zoom.
    pub fn handle_zoom_change(&mut self, zoom: f32) -> RenderResult<f32> {
        let zoom = self.controller.set_zoom(zoom);
        self.image_layer.upload_scene(&self.controller);
        self.render()?;
        Ok(zoom)
    }

    /// Selects the depth slice shown by a 2D view, then draws once.
    pub fn handle_slice_index_change(&mut self, index: f32) -> RenderResult<()> {
        self.image_layer.update_slice_index(index);
        self.render()
    }

    /// Feeds a pointer event to the controller. Press starts the frame loop,
    /// release stops it.
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        self.controller
            .handle_pointer(event, Instant::now(), &mut self.scheduler);
    }

    /// Runs one loop tick for a fired frame callback.
    ///
    /// Returns `Ok(false)` without drawing if `token` is not the outstanding
    /// callback, e.g. one cancelled by a release.
    pub fn on_frame(&mut self, token: FrameToken) -> RenderResult<bool> {
        if !self.controller.begin_tick(token) {
            return Ok(false);
        }
        self.image_layer
            .update_scene(&mut self.controller, Instant::now());
        let drawn = self.render();
        self.controller.finish_tick(&mut self.scheduler);
        drawn.map(|()| true)
    }

    /// Host entry point for presentation ticks.
    ///
    /// Runs a loop tick when `token` is the outstanding callback; otherwise
    /// redraws the current state without advancing the camera.
    pub fn handle_redraw(&mut self, token: Option<FrameToken>) -> RenderResult<()> {
        if let Some(token) = token {
            if self.on_frame(token)? {
                return Ok(());
            }
        }
        self.render()
    }

    /// Resizes the target and refits the projection. Does not draw.
    pub fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        self.controller.resize(width, height)?;
        self.target.resize(&self.gpu.device, width, height);
        self.image_layer.upload_scene(&self.controller);
        log::debug!("view '{}' resized to {width}x{height}", self.id);
        Ok(())
    }

    /// Records and submits one frame: clear, image layer, mask layer.
    pub fn render(&mut self) -> RenderResult<()> {
        let frame = match self.target.acquire() {
            Ok(frame) => frame,
            Err(err) if err.needs_reconfigure() => {
                log::warn!("view '{}': {err}, reconfiguring", self.id);
                let (width, height) = self.target.size();
                self.target.resize(&self.gpu.device, width, height);
                return Ok(());
            }
            Err(RenderError::Timeout) => {
                log::warn!("view '{}': frame acquire timed out, skipping", self.id);
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        if self.controller.mode().uses_depth() {
            let size = self.target.size();
            if self.depth.as_ref().is_none_or(|depth| depth.size != size) {
                self.depth = Some(DepthTarget::new(&self.gpu.device, size));
            }
        }

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some(&format!("{} encoder", self.id)),
            });
        {
            let depth_stencil_attachment = self
                .depth
                .as_ref()
                .map(|depth| wgpu::RenderPassDepthStencilAttachment {
                    view: &depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(DEPTH_CLEAR),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                });

            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(&format!("{} pass", self.id)),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: frame.view(),
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.background),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.image_layer.render(&mut pass);
            self.mask_layer.render(&mut pass);
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn mode(&self) -> ViewMode {
        self.controller.mode()
    }

    pub fn controller(&self) -> &ViewController {
        &self.controller
    }

    pub fn image_layer(&self) -> &ImageLayer {
        &self.image_layer
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// The outstanding frame callback, `None` while idle.
    pub fn frame_handle(&self) -> Option<FrameToken> {
        self.controller.frame_loop().handle()
    }
}
