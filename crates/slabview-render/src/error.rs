//! Rendering error types.

use slabview_core::ViewError;
use thiserror::Error;

/// Errors that can occur while creating or drawing a view.
#[derive(Error, Debug)]
pub enum RenderError {
    /// No adapter matched the request.
    #[error("failed to find a graphics adapter")]
    AdapterUnavailable,

    /// Failed to create wgpu device.
    #[error("failed to create graphics device: {0}")]
    DeviceRequestFailed(#[from] wgpu::RequestDeviceError),

    /// Failed to create surface.
    #[error("failed to create surface: {0}")]
    SurfaceCreationFailed(#[from] wgpu::CreateSurfaceError),

    /// A GPU object for a layer could not be created.
    #[error("failed to create {label}: {message}")]
    ResourceCreationFailed { label: String, message: String },

    /// Volume does not fit in a 3D texture on this device.
    #[error("volume {size:?} exceeds the 3D texture limit of {limit}")]
    TextureTooLarge { size: [u32; 3], limit: u32 },

    /// Surface lost.
    #[error("surface lost")]
    SurfaceLost,

    /// Surface outdated.
    #[error("surface outdated")]
    SurfaceOutdated,

    /// Out of memory.
    #[error("out of memory")]
    OutOfMemory,

    /// Timeout waiting for GPU.
    #[error("timeout waiting for GPU")]
    Timeout,

    /// Any other surface acquisition failure.
    #[error("surface error: {0}")]
    Surface(String),

    /// Copying an offscreen target back to the host failed.
    #[error("readback failed: {0}")]
    ReadbackFailed(String),

    /// Invalid view configuration or input data.
    #[error(transparent)]
    View(#[from] ViewError),
}

impl From<wgpu::SurfaceError> for RenderError {
    fn from(err: wgpu::SurfaceError) -> Self {
        match err {
            wgpu::SurfaceError::Lost => RenderError::SurfaceLost,
            wgpu::SurfaceError::Outdated => RenderError::SurfaceOutdated,
            wgpu::SurfaceError::OutOfMemory => RenderError::OutOfMemory,
            wgpu::SurfaceError::Timeout => RenderError::Timeout,
            other => RenderError::Surface(other.to_string()),
        }
    }
}

impl RenderError {
    /// Whether reconfiguring the surface is expected to fix this error.
    #[must_use]
    pub fn needs_reconfigure(&self) -> bool {
        matches!(self, RenderError::SurfaceLost | RenderError::SurfaceOutdated)
    }
}

/// A specialized Result type for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;
