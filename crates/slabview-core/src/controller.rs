//! GPU-free view state: camera, projection, input, clock and frame loop.

use std::time::Instant;

use glam::{Mat4, Vec4};

use crate::camera::Camera;
use crate::error::{Result, ViewError};
use crate::frame_loop::{FrameLoop, FrameScheduler, FrameToken};
use crate::input::{InputTracker, PointerEvent};
use crate::mode::ViewMode;
use crate::options::ViewOptions;
use crate::projection;

/// The per-frame transform uploaded to the scene uniform block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneTransform {
    /// `projection * inverse(camera)`.
    pub view_projection: Mat4,
    /// Camera position column, `w = 1`.
    pub camera_position: Vec4,
}

/// Drives one view's camera from pointer input and elapsed time.
#[derive(Debug, Clone)]
pub struct ViewController {
    mode: ViewMode,
    options: ViewOptions,
    camera: Camera,
    projection: Mat4,
    input: InputTracker,
    viewport: (u32, u32),
    last_frame: Instant,
    frame_loop: FrameLoop,
}

impl ViewController {
    /// Creates a controller for a `width` x `height` viewport.
    pub fn new(
        mode: ViewMode,
        width: u32,
        height: u32,
        options: ViewOptions,
        now: Instant,
    ) -> Result<Self> {
        options.validate()?;
        check_viewport(width, height)?;

        let camera = Camera::new(mode, &options);
        let input = InputTracker::new(options.min_zoom);
        let projection = projection::build(mode, &options, aspect(width, height), input.zoom());

        Ok(Self {
            mode,
            options,
            camera,
            projection,
            input,
            viewport: (width, height),
            last_frame: now,
            frame_loop: FrameLoop::new(),
        })
    }

    /// Applies a pointer event; press starts the frame loop and release stops it.
    pub fn handle_pointer(
        &mut self,
        event: PointerEvent,
        now: Instant,
        scheduler: &mut dyn FrameScheduler,
    ) {
        self.input.apply(event);
        match event {
            PointerEvent::Down => {
                if !self.frame_loop.is_active() {
                    // the idle gap before the press is not motion
                    self.restart_clock(now);
                    self.frame_loop.start(scheduler);
                }
            }
            PointerEvent::Up => self.frame_loop.stop(scheduler),
            PointerEvent::Move { .. } | PointerEvent::DoubleClick { .. } => {}
        }
    }

    /// Clamps and stores a zoom level, returning the stored value.
    ///
    /// The camera picks up the new zoom immediately; see [`Self::refresh`].
    pub fn set_zoom(&mut self, zoom: f32) -> f32 {
        let zoom = self.options.clamp_zoom(zoom);
        self.input.set_zoom(zoom);
        if self.mode == ViewMode::Slice {
            self.projection = projection::orthographic(&self.options, zoom);
        }
        self.refresh();
        zoom
    }

    /// Re-applies the zoom to the camera without advancing time or
    /// consuming pending input.
    pub fn refresh(&mut self) {
        let mut settled = self.input.clone();
        settled.reset();
        self.camera.update(0.0, &settled);
    }

    /// Makes `now` the start of the next frame interval.
    pub fn restart_clock(&mut self, now: Instant) {
        self.last_frame = now;
    }

    /// Advances the camera to `now` and clears the consumed input.
    /// Returns the elapsed seconds.
    pub fn step(&mut self, now: Instant) -> f32 {
        let dt = now.saturating_duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.camera.update(dt, &self.input);
        self.input.reset();
        dt
    }

    /// The transform for the current camera state.
    #[must_use]
    pub fn scene_transform(&self) -> SceneTransform {
        let frame = self.camera.frame();
        SceneTransform {
            view_projection: self.projection * frame.view_matrix(),
            camera_position: frame.position_column(),
        }
    }

    /// Stores a new viewport size and refits the 3D aspect ratio.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        check_viewport(width, height)?;
        self.viewport = (width, height);
        if self.mode == ViewMode::Volume {
            self.projection = projection::perspective(&self.options, aspect(width, height));
        }
        Ok(())
    }

    /// See [`FrameLoop::begin_tick`].
    pub fn begin_tick(&mut self, token: FrameToken) -> bool {
        self.frame_loop.begin_tick(token)
    }

    /// See [`FrameLoop::finish_tick`].
    pub fn finish_tick(&mut self, scheduler: &mut dyn FrameScheduler) {
        self.frame_loop.finish_tick(scheduler);
    }

    #[must_use]
    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    #[must_use]
    pub fn options(&self) -> &ViewOptions {
        &self.options
    }

    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    #[must_use]
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    #[must_use]
    pub fn input(&self) -> &InputTracker {
        &self.input
    }

    #[must_use]
    pub fn zoom(&self) -> f32 {
        self.input.zoom()
    }

    #[must_use]
    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    #[must_use]
    pub fn frame_loop(&self) -> &FrameLoop {
        &self.frame_loop
    }
}

fn check_viewport(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(ViewError::InvalidViewport { width, height });
    }
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn aspect(width: u32, height: u32) -> f32 {
    width as f32 / height as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame_loop::ManualScheduler;
    use crate::input::PointerKind;
    use proptest::prelude::*;
    use std::time::Duration;

    fn controller(mode: ViewMode) -> (ViewController, Instant) {
        let now = Instant::now();
        let controller = ViewController::new(mode, 800, 600, ViewOptions::default(), now)
            .expect("default options are valid");
        (controller, now)
    }

    fn held_move(dx: f32, dy: f32) -> PointerEvent {
        PointerEvent::Move {
            kind: PointerKind::Mouse,
            primary_held: true,
            dx,
            dy,
        }
    }

    #[test]
    fn test_rejects_empty_viewport() {
        let result = ViewController::new(
            ViewMode::Volume,
            0,
            600,
            ViewOptions::default(),
            Instant::now(),
        );
        assert!(matches!(
            result,
            Err(ViewError::InvalidViewport {
                width: 0,
                height: 600
            })
        ));
    }

    #[test]
    fn test_rejects_invalid_options() {
        let options = ViewOptions {
            min_zoom: 5.0,
            max_zoom: 2.0,
            ..ViewOptions::default()
        };
        let result = ViewController::new(ViewMode::Slice, 10, 10, options, Instant::now());
        assert!(matches!(result, Err(ViewError::InvalidOption { .. })));
    }

    #[test]
    fn test_zoom_out_of_range_is_clamped() {
        let (mut controller, _) = controller(ViewMode::Slice);
        assert_eq!(controller.set_zoom(999.0), 10.0);
        assert_eq!(controller.zoom(), 10.0);
        assert_eq!(controller.set_zoom(-5.0), 1.0);
        assert_eq!(controller.input().zoom(), 1.0);
    }

    #[test]
    fn test_zoom_rebuilds_slice_projection_only() {
        let (mut slice, _) = controller(ViewMode::Slice);
        slice.set_zoom(4.0);
        assert_eq!(
            slice.projection(),
            projection::orthographic(&ViewOptions::default(), 4.0)
        );

        let (mut volume, _) = controller(ViewMode::Volume);
        let before = volume.projection();
        volume.set_zoom(4.0);
        assert_eq!(volume.projection(), before);
    }

    #[test]
    fn test_zoom_moves_camera_immediately() {
        let (mut volume, _) = controller(ViewMode::Volume);
        volume.set_zoom(6.0);
        let distance = volume.camera().frame().position().length();
        assert!((distance - 4.0).abs() < 1e-4);

        let (mut slice, _) = controller(ViewMode::Slice);
        slice.set_zoom(2.0);
        // ortho pan bound shrinks to |2 - 2| = 0
        let position = slice.camera().frame().position();
        assert_eq!((position.x, position.y), (0.0, 0.0));
    }

    #[test]
    fn test_refresh_keeps_pending_input() {
        let (mut controller, now) = controller(ViewMode::Volume);
        let mut scheduler = ManualScheduler::new();
        controller.handle_pointer(PointerEvent::Down, now, &mut scheduler);
        controller.handle_pointer(held_move(3.0, 4.0), now, &mut scheduler);
        controller.set_zoom(5.0);
        assert_eq!(controller.input().move_x(), 3.0);
        assert_eq!(controller.input().move_y(), 4.0);
    }

    #[test]
    fn test_step_consumes_input_once() {
        let (mut controller, start) = controller(ViewMode::Volume);
        let mut scheduler = ManualScheduler::new();
        controller.handle_pointer(PointerEvent::Down, start, &mut scheduler);
        controller.handle_pointer(held_move(15.0, 5.0), start, &mut scheduler);

        let dt = controller.step(start + Duration::from_millis(16));
        assert!((dt - 0.016).abs() < 1e-6);
        assert_eq!(controller.input().move_x(), 0.0);
        assert_eq!(controller.input().move_y(), 0.0);
        assert!(controller.input().is_dragging());
    }

    #[test]
    fn test_press_rearms_clock() {
        let (mut controller, start) = controller(ViewMode::Volume);
        let mut scheduler = ManualScheduler::new();
        let press = start + Duration::from_secs(30);
        controller.handle_pointer(PointerEvent::Down, press, &mut scheduler);

        let dt = controller.step(press + Duration::from_millis(10));
        assert!((dt - 0.010).abs() < 1e-6);
    }

    #[test]
    fn test_down_up_leaves_no_pending_frame() {
        let (mut controller, now) = controller(ViewMode::Volume);
        let mut scheduler = ManualScheduler::new();
        controller.handle_pointer(PointerEvent::Down, now, &mut scheduler);
        assert!(controller.frame_loop().handle().is_some());
        controller.handle_pointer(PointerEvent::Up, now, &mut scheduler);

        assert_eq!(controller.frame_loop().handle(), None);
        assert!(scheduler.step().is_empty());
    }

    #[test]
    fn test_scene_transform_after_step() {
        let (mut controller, now) = controller(ViewMode::Volume);
        controller.step(now);
        let transform = controller.scene_transform();
        let frame = controller.camera().frame();
        let expected = controller.projection() * frame.matrix().inverse();
        assert!(transform.view_projection.abs_diff_eq(expected, 1e-6));
        assert_eq!(transform.camera_position, frame.position_column());
        // camera moved to the zoom distance during the step
        assert!((transform.camera_position.truncate().length() - 9.0).abs() < 1e-4);
    }

    #[test]
    fn test_resize_refits_volume_aspect() {
        let (mut controller, _) = controller(ViewMode::Volume);
        controller.resize(400, 400).expect("non-empty viewport");
        assert_eq!(controller.viewport(), (400, 400));
        assert_eq!(
            controller.projection(),
            projection::perspective(&ViewOptions::default(), 1.0)
        );
        assert!(controller.resize(400, 0).is_err());
        assert_eq!(controller.viewport(), (400, 400));
    }

    proptest! {
        #[test]
        fn prop_zoom_always_within_range(zoom in -1.0e6f32..1.0e6, slice in any::<bool>()) {
            let mode = if slice { ViewMode::Slice } else { ViewMode::Volume };
            let (mut controller, _) = controller(mode);
            let stored = controller.set_zoom(zoom);
            prop_assert!((1.0..=10.0).contains(&stored));
            prop_assert_eq!(stored, controller.zoom());
        }
    }
}
