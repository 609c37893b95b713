//! Uniform blocks of an image layer and the seam they are written through.
//!
//! Every block keeps its last value in host memory and writes the same bytes
//! to its sink whenever it changes, so the GPU copy always mirrors the host
//! copy. Nothing is read back.

use std::sync::Arc;
use std::time::Instant;

use slabview_core::{SceneTransform, ViewController, ViewOptions};

/// Scene block: combined view-projection matrix and camera position.
/// Layout must match WGSL `Scene` exactly.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniforms {
    /// `projection * inverse(camera)`, column-major.
    pub view_proj: [[f32; 4]; 4],
    /// Camera position column.
    pub camera_position: [f32; 4],
}

impl Default for SceneUniforms {
    fn default() -> Self {
        Self {
            view_proj: glam::Mat4::IDENTITY.to_cols_array_2d(),
            camera_position: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl From<SceneTransform> for SceneUniforms {
    fn from(transform: SceneTransform) -> Self {
        Self {
            view_proj: transform.view_projection.to_cols_array_2d(),
            camera_position: transform.camera_position.to_array(),
        }
    }
}

/// Contrast window in raw intensity units.
/// Layout must match WGSL `Contrast` exactly.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[allow(clippy::pub_underscore_fields)]
pub struct ContrastUniforms {
    pub min: f32,
    pub max: f32,
    /// Padding to 16-byte alignment.
    pub _pad0: f32,
    pub _pad1: f32,
}

impl ContrastUniforms {
    #[must_use]
    pub fn new(min: f32, max: f32) -> Self {
        Self {
            min,
            max,
            _pad0: 0.0,
            _pad1: 0.0,
        }
    }
}

/// Depth slice sampled by the 2D shader.
/// Layout must match WGSL `Slice` exactly.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[allow(clippy::pub_underscore_fields)]
pub struct SliceUniforms {
    pub index: f32,
    /// Padding to 16-byte alignment.
    pub _pad0: f32,
    pub _pad1: f32,
    pub _pad2: f32,
}

impl SliceUniforms {
    #[must_use]
    pub fn new(index: f32) -> Self {
        Self {
            index,
            _pad0: 0.0,
            _pad1: 0.0,
            _pad2: 0.0,
        }
    }
}

/// Destination of uniform bytes.
pub trait UniformSink {
    /// Replaces the whole block with `bytes`.
    fn write(&self, bytes: &[u8]);
}

/// A uniform buffer written through the queue.
pub struct GpuUniformBuffer {
    queue: Arc<wgpu::Queue>,
    buffer: wgpu::Buffer,
}

impl GpuUniformBuffer {
    #[must_use]
    pub fn new(queue: Arc<wgpu::Queue>, buffer: wgpu::Buffer) -> Self {
        Self { queue, buffer }
    }
}

impl UniformSink for GpuUniformBuffer {
    fn write(&self, bytes: &[u8]) {
        self.queue.write_buffer(&self.buffer, 0, bytes);
    }
}

/// A uniform value and the sink that mirrors it.
pub struct Uniform<T: bytemuck::Pod> {
    value: T,
    sink: Box<dyn UniformSink>,
}

impl<T: bytemuck::Pod> Uniform<T> {
    /// Stores `value` and uploads it immediately.
    pub fn new(value: T, sink: Box<dyn UniformSink>) -> Self {
        let uniform = Self { value, sink };
        uniform.upload();
        uniform
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Stores and uploads a new value.
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.upload();
    }

    fn upload(&self) {
        self.sink.write(bytemuck::bytes_of(&self.value));
    }
}

/// The three uniform blocks of an image layer.
pub struct LayerUniforms {
    scene: Uniform<SceneUniforms>,
    contrast: Uniform<ContrastUniforms>,
    slice: Uniform<SliceUniforms>,
}

impl LayerUniforms {
    /// Creates the blocks with their initial values from `options`.
    pub fn new(
        options: &ViewOptions,
        scene: Box<dyn UniformSink>,
        contrast: Box<dyn UniformSink>,
        slice: Box<dyn UniformSink>,
    ) -> Self {
        let [min, max] = options.contrast_window;
        Self {
            scene: Uniform::new(SceneUniforms::default(), scene),
            contrast: Uniform::new(ContrastUniforms::new(min, max), contrast),
            slice: Uniform::new(SliceUniforms::new(options.slice_index), slice),
        }
    }

    /// Advances `controller` to `now` and uploads the resulting transform.
    ///
    /// This is the only place frame time is consumed.
    pub fn update_scene(&mut self, controller: &mut ViewController, now: Instant) {
        controller.step(now);
        self.upload_scene(controller);
    }

    /// Uploads the transform for the controller's current state.
    pub fn upload_scene(&mut self, controller: &ViewController) {
        self.scene
            .set(SceneUniforms::from(controller.scene_transform()));
    }

    pub fn update_contrast(&mut self, min: f32, max: f32) {
        self.contrast.set(ContrastUniforms::new(min, max));
    }

    pub fn update_slice_index(&mut self, index: f32) {
        self.slice.set(SliceUniforms::new(index));
    }

    pub fn scene(&self) -> &SceneUniforms {
        self.scene.get()
    }

    pub fn contrast(&self) -> &ContrastUniforms {
        self.contrast.get()
    }

    pub fn slice(&self) -> &SliceUniforms {
        self.slice.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use slabview_core::ViewMode;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    /// Captures every write for inspection.
    #[derive(Clone, Default)]
    struct RecordingSink(Rc<RefCell<Vec<Vec<u8>>>>);

    impl RecordingSink {
        fn last(&self) -> Vec<u8> {
            self.0.borrow().last().cloned().unwrap_or_default()
        }

        fn count(&self) -> usize {
            self.0.borrow().len()
        }
    }

    impl UniformSink for RecordingSink {
        fn write(&self, bytes: &[u8]) {
            self.0.borrow_mut().push(bytes.to_vec());
        }
    }

    fn uniforms() -> (LayerUniforms, [RecordingSink; 3]) {
        let sinks = [
            RecordingSink::default(),
            RecordingSink::default(),
            RecordingSink::default(),
        ];
        let uniforms = LayerUniforms::new(
            &ViewOptions::default(),
            Box::new(sinks[0].clone()),
            Box::new(sinks[1].clone()),
            Box::new(sinks[2].clone()),
        );
        (uniforms, sinks)
    }

    fn floats(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    #[test]
    fn test_uniform_sizes() {
        assert_eq!(std::mem::size_of::<SceneUniforms>(), 80);
        assert_eq!(std::mem::size_of::<ContrastUniforms>(), 16);
        assert_eq!(std::mem::size_of::<SliceUniforms>(), 16);
    }

    #[test]
    fn test_initial_values_are_uploaded() {
        let (_, [scene, contrast, slice]) = uniforms();
        assert_eq!(scene.count(), 1);
        assert_eq!(floats(&contrast.last())[..2], [0.0, 255.0]);
        assert_eq!(floats(&slice.last())[0], 0.0);
    }

    #[test]
    fn test_scene_upload_matches_camera() {
        let (mut uniforms, [scene, _, _]) = uniforms();
        let start = Instant::now();
        let mut controller =
            ViewController::new(ViewMode::Volume, 640, 480, ViewOptions::default(), start)
                .unwrap();

        uniforms.update_scene(&mut controller, start + Duration::from_millis(16));

        let frame = controller.camera().frame();
        let expected_matrix = controller.projection() * frame.matrix().inverse();
        let position = frame.position_column();

        let written = scene.last();
        assert_eq!(written.len(), 80);
        let values = floats(&written);
        assert_eq!(values[..16], expected_matrix.to_cols_array());
        assert_eq!(values[16..], position.to_array());
        assert_eq!(written, bytemuck::bytes_of(uniforms.scene()));
    }

    #[test]
    fn test_scene_update_consumes_input() {
        let (mut uniforms, _) = uniforms();
        let start = Instant::now();
        let mut controller =
            ViewController::new(ViewMode::Slice, 640, 480, ViewOptions::default(), start)
                .unwrap();
        let mut scheduler = slabview_core::ManualScheduler::new();
        controller.handle_pointer(slabview_core::PointerEvent::Down, start, &mut scheduler);
        controller.handle_pointer(
            slabview_core::PointerEvent::Move {
                kind: slabview_core::PointerKind::Mouse,
                primary_held: true,
                dx: 40.0,
                dy: 0.0,
            },
            start,
            &mut scheduler,
        );

        uniforms.update_scene(&mut controller, start);
        let panned = *uniforms.scene();
        uniforms.update_scene(&mut controller, start);
        assert_eq!(*uniforms.scene(), panned);
    }

    #[test]
    fn test_contrast_and_slice_mirror_host_values() {
        let (mut uniforms, [_, contrast, slice]) = uniforms();
        uniforms.update_contrast(20.0, 180.0);
        uniforms.update_slice_index(7.0);

        assert_eq!(contrast.last(), bytemuck::bytes_of(uniforms.contrast()));
        assert_eq!(floats(&contrast.last())[..2], [20.0, 180.0]);
        assert_eq!(slice.last(), bytemuck::bytes_of(uniforms.slice()));
        assert_eq!(uniforms.slice().index, 7.0);
    }

    proptest! {
        #[test]
        fn prop_contrast_and_slice_writes_mirror_host_copy(
            min in -1000.0f32..1000.0,
            max in -1000.0f32..1000.0,
            index in 0.0f32..512.0,
        ) {
            let (mut uniforms, [_, contrast, slice]) = uniforms();
            uniforms.update_contrast(min, max);
            uniforms.update_slice_index(index);

            prop_assert_eq!(contrast.last(), bytemuck::bytes_of(uniforms.contrast()).to_vec());
            prop_assert_eq!(slice.last(), bytemuck::bytes_of(uniforms.slice()).to_vec());
            prop_assert_eq!(floats(&contrast.last()), vec![min, max, 0.0, 0.0]);
            prop_assert_eq!(floats(&slice.last()), vec![index, 0.0, 0.0, 0.0]);
        }
    }
}
