//! Handle to the logical GPU device a view renders with.

use std::sync::Arc;

/// A ready device and its queue, supplied by the host.
///
/// slabview never negotiates adapters itself; hosts create the device (see
/// `slabview::gpu`) and hand it to each view.
#[derive(Debug, Clone)]
pub struct GpuContext {
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
}

impl GpuContext {
    #[must_use]
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self {
            device: Arc::new(device),
            queue: Arc::new(queue),
        }
    }

    /// Largest 3D texture edge the device accepts.
    #[must_use]
    pub fn max_texture_dimension_3d(&self) -> u32 {
        self.device.limits().max_texture_dimension_3d
    }
}
