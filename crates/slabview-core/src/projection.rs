//! Projection matrices for each view mode.

use glam::Mat4;

use crate::mode::ViewMode;
use crate::options::ViewOptions;

/// Perspective projection for the 3D view (depth range `[0, 1]`).
#[must_use]
pub fn perspective(options: &ViewOptions, aspect_ratio: f32) -> Mat4 {
    Mat4::perspective_rh(options.fov, aspect_ratio, options.z_near, options.z_far)
}

/// Orthographic projection for the 2D view.
///
/// The frustum spans `±ortho_bound / zoom`, so larger zoom values show less
/// of the image. Bottom and top are swapped so image row 0 lands at the top
/// of the viewport.
#[must_use]
pub fn orthographic(options: &ViewOptions, zoom: f32) -> Mat4 {
    let bound = options.ortho_bound / zoom;
    Mat4::orthographic_rh(-bound, bound, bound, -bound, options.z_near, options.z_far)
}

/// Builds the projection for `mode`.
///
/// `zoom` only affects the 2D view; the 3D view zooms by moving its camera.
#[must_use]
pub fn build(mode: ViewMode, options: &ViewOptions, aspect_ratio: f32, zoom: f32) -> Mat4 {
    match mode {
        ViewMode::Volume => perspective(options, aspect_ratio),
        ViewMode::Slice => orthographic(options, zoom),
    }
}
