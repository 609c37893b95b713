//! Drawable layers of a view.

/// Something a view draws into its render pass.
pub trait Layer {
    /// Identifier used in GPU labels and logs.
    fn id(&self) -> &str;

    /// Records draw commands into `pass`.
    fn render(&self, pass: &mut wgpu::RenderPass<'_>);
}
