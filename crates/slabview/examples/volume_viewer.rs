//! Opens a window showing a synthetic volume.
//!
//! Run with `cargo run --example volume_viewer -- 3D` (or `2D`).
//!
//! Controls:
//! - drag: rotate (3D) or pan (2D)
//! - `+` / `-`: zoom
//! - up / down: previous / next slice (2D)
//! - `[` / `]`: narrow / widen the contrast window

use std::sync::Arc;

use slabview::platform::{PointerTranslator, RedrawScheduler};
use slabview::{gpu, Image, SurfaceTarget, View, ViewMode, ViewOptions};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

const VOLUME_SIZE: u32 = 64;

/// A bright shell around a dimmer core, with a gradient along depth.
fn synthetic_volume() -> Image {
    let n = VOLUME_SIZE;
    let center = (n as f32 - 1.0) / 2.0;
    let mut data = Vec::with_capacity((n * n * n) as usize);
    for z in 0..n {
        for y in 0..n {
            for x in 0..n {
                let d = ((x as f32 - center).powi(2)
                    + (y as f32 - center).powi(2)
                    + (z as f32 - center).powi(2))
                .sqrt()
                    / center;
                let value = if (0.7..0.8).contains(&d) {
                    255.0
                } else if d < 0.7 {
                    60.0 + 120.0 * z as f32 / n as f32
                } else {
                    0.0
                };
                data.push(value as u8);
            }
        }
    }
    Image::new(data, [n, n, n]).expect("synthetic volume matches its size")
}

struct Viewer {
    mode: ViewMode,
    window: Option<Arc<Window>>,
    view: Option<View<SurfaceTarget, RedrawScheduler>>,
    pointer: PointerTranslator,
    zoom: f32,
    slice: f32,
    contrast_max: f32,
}

impl Viewer {
    fn new(mode: ViewMode) -> Self {
        let options = ViewOptions::default();
        Self {
            mode,
            window: None,
            view: None,
            pointer: PointerTranslator::new(1, 1),
            zoom: options.min_zoom,
            slice: options.slice_index,
            contrast_max: options.contrast_window[1],
        }
    }

    fn handle_key(&mut self, key: KeyCode) -> slabview::RenderResult<()> {
        let Some(view) = self.view.as_mut() else {
            return Ok(());
        };
        match key {
            KeyCode::Equal | KeyCode::NumpadAdd => {
                self.zoom = view.handle_zoom_change(self.zoom + 0.5)?;
            }
            KeyCode::Minus | KeyCode::NumpadSubtract => {
                self.zoom = view.handle_zoom_change(self.zoom - 0.5)?;
            }
            KeyCode::ArrowUp => {
                self.slice = (self.slice - 1.0).max(0.0);
                view.handle_slice_index_change(self.slice)?;
            }
            KeyCode::ArrowDown => {
                self.slice = (self.slice + 1.0).min(VOLUME_SIZE as f32 - 1.0);
                view.handle_slice_index_change(self.slice)?;
            }
            KeyCode::BracketLeft => {
                self.contrast_max = (self.contrast_max - 16.0).max(16.0);
                view.handle_contrast_change(0.0, self.contrast_max)?;
            }
            KeyCode::BracketRight => {
                self.contrast_max = (self.contrast_max + 16.0).min(512.0);
                view.handle_contrast_change(0.0, self.contrast_max)?;
            }
            _ => {}
        }
        Ok(())
    }
}

impl ApplicationHandler for Viewer {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_title(format!("slabview ({})", self.mode))
            .with_inner_size(LogicalSize::new(800, 600));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .expect("failed to create window"),
        );

        let (context, target) =
            gpu::request_window_context(window.clone()).expect("failed to set up the GPU");
        let size = window.inner_size();
        self.pointer.set_size(size.width, size.height);

        let mut view = View::new(
            "demo",
            self.mode,
            context,
            target,
            RedrawScheduler::new(window.clone()),
            ViewOptions::default(),
        )
        .expect("failed to create view");
        view.update_image(&synthetic_volume())
            .expect("failed to upload volume");

        self.window = Some(window);
        self.view = Some(view);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        for pointer_event in self.pointer.translate(&event) {
            if let Some(view) = self.view.as_mut() {
                view.handle_pointer(pointer_event);
            }
        }

        let result = match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
                Ok(())
            }
            WindowEvent::Resized(size) if size.width > 0 && size.height > 0 => {
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
                match self.view.as_mut() {
                    Some(view) => view.resize(size.width, size.height),
                    None => Ok(()),
                }
            }
            WindowEvent::RedrawRequested => match self.view.as_mut() {
                Some(view) => {
                    let token = view.scheduler_mut().fire();
                    view.handle_redraw(token)
                }
                None => Ok(()),
            },
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                match event.physical_key {
                    PhysicalKey::Code(code) => self.handle_key(code),
                    PhysicalKey::Unidentified(_) => Ok(()),
                }
            }
            _ => Ok(()),
        };

        if let Err(err) = result {
            log::error!("render failed: {err}");
            event_loop.exit();
        }
    }
}

fn main() {
    slabview::init_logging();

    let mode = match std::env::args().nth(1) {
        Some(arg) => match arg.parse::<ViewMode>() {
            Ok(mode) => mode,
            Err(err) => {
                eprintln!("{err}; expected 3D or 2D");
                std::process::exit(2);
            }
        },
        None => ViewMode::Volume,
    };
    log::info!("starting {mode} viewer");

    let event_loop = EventLoop::new().expect("failed to create event loop");
    let mut viewer = Viewer::new(mode);
    event_loop
        .run_app(&mut viewer)
        .expect("event loop terminated with an error");
}
