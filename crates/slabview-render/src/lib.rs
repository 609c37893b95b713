//! Rendering backend for slabview.
//!
//! This crate provides the wgpu side of a view:
//! - render targets (window surface, offscreen texture)
//! - volume texture upload and proxy geometry
//! - uniform blocks behind a write seam
//! - image and mask layers (WGSL shaders in `src/shaders/`)
//! - [`View`], which composes them with a [`slabview_core::ViewController`]

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Accessors return plain values which don't need must_use
#![allow(clippy::must_use_candidate)]

pub mod buffer;
pub mod context;
pub mod error;
pub mod geometry;
pub mod image_layer;
pub mod layer;
pub mod mask_layer;
pub mod shader;
pub mod target;
pub mod texture;
pub mod uniforms;
pub mod view;

pub use context::GpuContext;
pub use error::{RenderError, RenderResult};
pub use geometry::Geometry;
pub use image_layer::{ImageLayer, DEPTH_CLEAR, DEPTH_FORMAT};
pub use layer::Layer;
pub use mask_layer::MaskLayer;
pub use target::{OffscreenTarget, RenderTarget, SurfaceTarget, TargetFrame};
pub use texture::VolumeTexture;
pub use uniforms::{
    ContrastUniforms, GpuUniformBuffer, LayerUniforms, SceneUniforms, SliceUniforms, Uniform,
    UniformSink,
};
pub use view::View;
