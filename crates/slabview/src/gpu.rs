//! Device and surface negotiation for a winit window.

use std::sync::Arc;

use pollster::FutureExt;
use slabview_render::{GpuContext, RenderError, RenderResult, SurfaceTarget};
use winit::window::Window;

/// Requests an adapter and device able to present to `window` and returns
/// them with the window's configured surface.
///
/// Prefers an sRGB surface format and vsync presentation.
pub fn request_window_context(window: Arc<Window>) -> RenderResult<(GpuContext, SurfaceTarget)> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..wgpu::InstanceDescriptor::default()
    });

    let size = window.inner_size();
    let surface = instance.create_surface(window)?;

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        })
        .block_on()
        .map_err(|err| {
            log::error!("no compatible graphics adapter: {err}");
            RenderError::AdapterUnavailable
        })?;
    log::info!("using adapter {:?}", adapter.get_info().name);

    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("slabview device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default().using_resolution(adapter.limits()),
            memory_hints: wgpu::MemoryHints::default(),
            trace: wgpu::Trace::default(),
        })
        .block_on()?;

    let caps = surface.get_capabilities(&adapter);
    let Some(&fallback) = caps.formats.first() else {
        log::error!("surface reports no supported formats");
        return Err(RenderError::Surface("no supported surface formats".to_string()));
    };
    let format = caps
        .formats
        .iter()
        .copied()
        .find(wgpu::TextureFormat::is_srgb)
        .unwrap_or(fallback);

    let config = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width: size.width.max(1),
        height: size.height.max(1),
        present_mode: wgpu::PresentMode::AutoVsync,
        alpha_mode: caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto),
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    };
    log::debug!(
        "configuring {}x{} surface as {format:?}",
        config.width,
        config.height
    );

    let context = GpuContext::new(device, queue);
    let target = SurfaceTarget::new(&context.device, surface, config);
    Ok((context, target))
}
