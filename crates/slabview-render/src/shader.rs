//! Shader management.

use slabview_core::ViewMode;

const IMAGE_3D: &str = include_str!("shaders/image_3d.wgsl");
const IMAGE_2D: &str = include_str!("shaders/image_2d.wgsl");

/// Vertex entry point of every image shader.
pub const VERTEX_ENTRY: &str = "vs_main";

/// Fragment entry point of every image shader.
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// WGSL source for the image shader of `mode`.
#[must_use]
pub fn image_source(mode: ViewMode) -> &'static str {
    match mode {
        ViewMode::Volume => IMAGE_3D,
        ViewMode::Slice => IMAGE_2D,
    }
}

/// Compiles the image shader of `mode`.
pub fn create_image_module(
    device: &wgpu::Device,
    mode: ViewMode,
    label: &str,
) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&format!("{label} shader ({mode})")),
        source: wgpu::ShaderSource::Wgsl(image_source(mode).into()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sources_declare_entry_points() {
        for mode in [ViewMode::Volume, ViewMode::Slice] {
            let source = image_source(mode);
            assert!(source.contains(&format!("fn {VERTEX_ENTRY}(")));
            assert!(source.contains(&format!("fn {FRAGMENT_ENTRY}(")));
        }
    }

    #[test]
    fn test_slice_binding_only_in_2d() {
        assert!(image_source(ViewMode::Slice).contains("@binding(4)"));
        assert!(!image_source(ViewMode::Volume).contains("@binding(4)"));
    }
}
