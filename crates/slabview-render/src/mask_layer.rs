//! Segmentation mask overlay. Currently draws nothing.

use crate::layer::Layer;

/// Placeholder overlay that shares the [`Layer`] interface.
#[derive(Debug, Clone)]
pub struct MaskLayer {
    id: String,
}

impl MaskLayer {
    #[must_use]
    pub fn new(view_id: &str) -> Self {
        Self {
            id: format!("{view_id}-mask"),
        }
    }
}

impl Layer for MaskLayer {
    fn id(&self) -> &str {
        &self.id
    }

    fn render(&self, _pass: &mut wgpu::RenderPass<'_>) {}
}
