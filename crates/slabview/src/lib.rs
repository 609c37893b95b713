//! slabview: interactive GPU views of volumetric scalar images.
//!
//! A view shows one volume either as a rotating 3D rendering (arcball camera,
//! perspective projection) or as a pannable, zoomable 2D slice (ortho camera).
//! Views only animate while the pointer is dragged; every other change
//! (new image, contrast window, zoom, slice index) redraws exactly once.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use slabview::{gpu, platform::RedrawScheduler, Image, View, ViewMode, ViewOptions};
//! # fn run(window: Arc<winit::window::Window>) -> Result<(), slabview::RenderError> {
//! slabview::init_logging();
//!
//! let (context, target) = gpu::request_window_context(window.clone())?;
//! let mut view = View::new(
//!     "main",
//!     ViewMode::Volume,
//!     context,
//!     target,
//!     RedrawScheduler::new(window),
//!     ViewOptions::default(),
//! )?;
//! view.update_image(&Image::new(vec![128; 8 * 8 * 8], [8, 8, 8])?)?;
//! # Ok(())
//! # }
//! ```
//!
//! Hosts forward window events through [`platform::PointerTranslator`] and
//! call [`View::handle_redraw`] on every redraw with the token fired by the
//! [`platform::RedrawScheduler`].

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Accessors return plain values which don't need must_use
#![allow(clippy::must_use_candidate)]

pub mod gpu;
pub mod platform;

pub use slabview_core::{
    ArcballCamera, Camera, CameraFrame, FrameLoop, FrameScheduler, FrameToken, Image,
    InputTracker, LoopState, ManualScheduler, OrthoCamera, PointerEvent, PointerKind,
    SceneTransform, SurfaceBounds, ViewController, ViewError, ViewMode, ViewOptions,
};
pub use slabview_render::{
    GpuContext, ImageLayer, Layer, MaskLayer, OffscreenTarget, RenderError, RenderResult,
    RenderTarget, SurfaceTarget, View,
};

// Re-export glam types for convenience
pub use glam::{Mat4, Vec2, Vec3, Vec4};

/// Installs the `env_logger` backend for the `log` macros used throughout
/// slabview. Safe to call more than once; later calls do nothing.
pub fn init_logging() {
    let _ = env_logger::try_init();
}
