//! Core types for slabview.
//!
//! This crate holds everything about a volume view that does not touch the GPU:
//! - [`Camera`] models for the 3D arcball and 2D ortho views
//! - [`projection`] builders and the pointer [`InputTracker`]
//! - the [`FrameLoop`] state machine and its [`FrameScheduler`] seam
//! - [`ViewController`], which ties them to a clock and a viewport
//! - [`ViewOptions`] configuration and the [`Image`] input type

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Accessors return plain values which don't need must_use
#![allow(clippy::must_use_candidate)]

pub mod camera;
pub mod controller;
pub mod error;
pub mod frame_loop;
pub mod image;
pub mod input;
pub mod mode;
pub mod options;
pub mod projection;

pub use camera::{ArcballCamera, Camera, CameraFrame, OrthoCamera};
pub use controller::{SceneTransform, ViewController};
pub use error::{Result, ViewError};
pub use frame_loop::{FrameLoop, FrameScheduler, FrameToken, LoopState, ManualScheduler};
pub use image::Image;
pub use input::{InputTracker, PointerEvent, PointerKind, SurfaceBounds};
pub use mode::ViewMode;
pub use options::ViewOptions;

// Re-export glam types for convenience
pub use glam::{Mat4, Vec2, Vec3, Vec4};
