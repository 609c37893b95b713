//! Camera models for the 3D arcball and 2D ortho views.
//!
//! Both cameras keep their state in a single camera-to-world matrix whose
//! columns are the right, up and back axes and the position. Every path that
//! changes the back axis re-derives right and up in the same call, so the
//! three axes stay orthonormal after any update.

use glam::{Mat3, Mat4, Vec3, Vec4};

use crate::input::InputTracker;
use crate::mode::ViewMode;
use crate::options::ViewOptions;

/// Squared length below which `up x back` has no reliable direction.
const DEGENERATE_CROSS: f32 = 1e-10;

/// Camera-to-world transform with named column accessors.
///
/// The inverse of this matrix is the view matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFrame {
    matrix: Mat4,
}

impl CameraFrame {
    /// Builds a frame at `position` whose back axis points from the origin
    /// towards the camera.
    #[must_use]
    pub fn looking_from(position: Vec3) -> Self {
        let mut frame = Self {
            matrix: Mat4::IDENTITY,
        };
        frame.set_position(position);
        frame.set_back(position);
        frame
    }

    /// The camera-to-world matrix.
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    /// World-to-camera matrix.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        self.matrix.inverse()
    }

    /// Column 0.
    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.matrix.x_axis.truncate()
    }

    /// Column 1.
    #[must_use]
    pub fn up(&self) -> Vec3 {
        self.matrix.y_axis.truncate()
    }

    /// Column 2, pointing away from the scene.
    #[must_use]
    pub fn back(&self) -> Vec3 {
        self.matrix.z_axis.truncate()
    }

    /// Column 3 as a point.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.matrix.w_axis.truncate()
    }

    /// Column 3 including its homogeneous `w`.
    #[must_use]
    pub fn position_column(&self) -> Vec4 {
        self.matrix.w_axis
    }

    /// Replaces the back axis and re-derives right and up from it.
    fn set_back(&mut self, back: Vec3) {
        let back = back.normalize();
        let mut candidate = self.up().cross(back);
        if candidate.length_squared() <= DEGENERATE_CROSS {
            // up parallel to back: keep the previous right
            candidate = self.right();
        }
        // project off back so rounding in a short cross product cannot tilt right
        let right = (candidate - back * candidate.dot(back)).normalize();
        let up = back.cross(right).normalize();
        self.matrix.x_axis = right.extend(0.0);
        self.matrix.y_axis = up.extend(0.0);
        self.matrix.z_axis = back.extend(0.0);
    }

    fn set_position(&mut self, position: Vec3) {
        self.matrix.w_axis = position.extend(1.0);
    }
}

/// Rotates around the origin in response to drags, with inertial spin.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcballCamera {
    frame: CameraFrame,
    /// Current angular velocity in radians per second.
    pub angular_velocity: f32,
    axis: Vec3,
    /// Speed multiplier for drag rotation.
    pub rotation_speed: f32,
    /// Fraction of angular velocity retained per second.
    pub friction_coefficient: f32,
    threshold: f32,
    max_zoom: f32,
}

impl ArcballCamera {
    #[must_use]
    pub fn new(options: &ViewOptions) -> Self {
        Self {
            frame: CameraFrame::looking_from(options.arcball_position),
            angular_velocity: 0.0,
            axis: Vec3::ZERO,
            rotation_speed: options.rotation_speed,
            friction_coefficient: options.friction_coefficient,
            threshold: options.input_threshold,
            max_zoom: options.max_zoom,
        }
    }

    /// The current rotation axis (zero until the first drag).
    #[must_use]
    pub fn axis(&self) -> Vec3 {
        self.axis
    }

    #[must_use]
    pub fn frame(&self) -> &CameraFrame {
        &self.frame
    }

    /// Advances the camera by `dt` seconds using the accumulated `input`.
    pub fn update(&mut self, dt: f32, input: &InputTracker) {
        // Continuous-time decay, independent of frame rate.
        self.angular_velocity *= self.friction_coefficient.powf(dt);

        let drag = self.frame.right() * input.move_x() - self.frame.up() * input.move_y();
        let cross = drag.cross(self.frame.back());
        let magnitude = cross.length();
        if magnitude > self.threshold {
            self.axis = cross / magnitude;
            // Also arms the fling that continues after release.
            self.angular_velocity = magnitude * self.rotation_speed;
        }

        let angle = self.angular_velocity * dt;
        if angle > self.threshold {
            // Rotate only the back axis with a fresh rotation; composing
            // rotations into the stored matrix accumulates drift.
            let rotation = Mat3::from_axis_angle(self.axis, angle);
            let back = rotation * self.frame.back();
            self.frame.set_back(back);
        }

        let distance = self.max_zoom - input.zoom();
        self.frame.set_position(self.frame.back() * distance);
    }
}

/// Pans in the image plane; never rotates.
#[derive(Debug, Clone, PartialEq)]
pub struct OrthoCamera {
    frame: CameraFrame,
    /// Speed multiplier for drag panning.
    pub pan_speed: f32,
    ortho_bound: f32,
}

impl OrthoCamera {
    #[must_use]
    pub fn new(options: &ViewOptions) -> Self {
        Self {
            frame: CameraFrame::looking_from(options.ortho_position),
            pan_speed: options.pan_speed,
            ortho_bound: options.ortho_bound,
        }
    }

    #[must_use]
    pub fn frame(&self) -> &CameraFrame {
        &self.frame
    }

    /// Pans by the accumulated `input`, keeping x and y within
    /// `±|zoom - ortho_bound|`.
    pub fn update(&mut self, input: &InputTracker) {
        let pan = self.frame.right() * (-input.move_x() * self.pan_speed)
            + self.frame.up() * (-input.move_y() * self.pan_speed);
        let bound = (input.zoom() - self.ortho_bound).abs();

        let mut position = self.frame.position() + pan;
        position.x = position.x.clamp(-bound, bound);
        position.y = position.y.clamp(-bound, bound);
        self.frame.set_position(position);
    }
}

/// The camera of one view.
#[derive(Debug, Clone, PartialEq)]
pub enum Camera {
    Arcball(ArcballCamera),
    Ortho(OrthoCamera),
}

impl Camera {
    /// Creates the camera kind that belongs to `mode`.
    #[must_use]
    pub fn new(mode: ViewMode, options: &ViewOptions) -> Self {
        match mode {
            ViewMode::Volume => Camera::Arcball(ArcballCamera::new(options)),
            ViewMode::Slice => Camera::Ortho(OrthoCamera::new(options)),
        }
    }

    /// Advances the camera by `dt` seconds using the accumulated `input`.
    pub fn update(&mut self, dt: f32, input: &InputTracker) {
        match self {
            Camera::Arcball(camera) => camera.update(dt, input),
            Camera::Ortho(camera) => camera.update(input),
        }
    }

    #[must_use]
    pub fn frame(&self) -> &CameraFrame {
        match self {
            Camera::Arcball(camera) => camera.frame(),
            Camera::Ortho(camera) => camera.frame(),
        }
    }

    /// The camera-to-world matrix.
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        self.frame().matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{PointerEvent, PointerKind};
    use proptest::prelude::*;

    const TOLERANCE: f32 = 1e-5;

    fn drag(dx: f32, dy: f32) -> InputTracker {
        let mut input = InputTracker::new(1.0);
        input.apply(PointerEvent::Down);
        input.apply(PointerEvent::Move {
            kind: PointerKind::Mouse,
            primary_held: true,
            dx,
            dy,
        });
        input
    }

    fn assert_orthonormal(frame: &CameraFrame) {
        let (r, u, b) = (frame.right(), frame.up(), frame.back());
        for axis in [r, u, b] {
            assert!((axis.length() - 1.0).abs() < TOLERANCE, "axis {axis} not unit");
        }
        assert!(r.dot(u).abs() < TOLERANCE);
        assert!(r.dot(b).abs() < TOLERANCE);
        assert!(u.dot(b).abs() < TOLERANCE);
        // right-handed: right x up = back
        assert!((r.cross(u) - b).length() < TOLERANCE);
    }

    fn arcball(camera: &Camera) -> &ArcballCamera {
        match camera {
            Camera::Arcball(arcball) => arcball,
            Camera::Ortho(_) => panic!("expected arcball camera"),
        }
    }

    #[test]
    fn test_new_arcball_faces_origin() {
        let options = ViewOptions::default();
        let camera = Camera::new(ViewMode::Volume, &options);
        let frame = camera.frame();
        let expected = Vec3::new(4.0, 2.0, 5.0).normalize();
        assert!((frame.back() - expected).length() < TOLERANCE);
        assert_eq!(frame.position(), Vec3::new(4.0, 2.0, 5.0));
        assert_eq!(frame.position_column().w, 1.0);
        assert_orthonormal(frame);
    }

    #[test]
    fn test_new_ortho_looks_straight_on() {
        let options = ViewOptions::default();
        let camera = Camera::new(ViewMode::Slice, &options);
        let frame = camera.frame();
        assert!((frame.back() - Vec3::Z).length() < TOLERANCE);
        assert!((frame.right() - Vec3::X).length() < TOLERANCE);
        assert!((frame.up() - Vec3::Y).length() < TOLERANCE);
    }

    #[test]
    fn test_frame_from_position_parallel_to_up() {
        let frame = CameraFrame::looking_from(Vec3::new(0.0, 3.0, 0.0));
        assert_orthonormal(&frame);
        assert!((frame.back() - Vec3::Y).length() < TOLERANCE);
    }

    #[test]
    fn test_view_matrix_is_inverse() {
        let frame = CameraFrame::looking_from(Vec3::new(1.0, 2.0, 3.0));
        let product = frame.view_matrix() * frame.matrix();
        assert!(product.abs_diff_eq(Mat4::IDENTITY, TOLERANCE));
    }

    #[test]
    fn test_zero_input_leaves_arcball_unchanged() {
        let options = ViewOptions::default();
        let mut camera = Camera::new(ViewMode::Volume, &options);
        let input = InputTracker::new(options.min_zoom);
        let initial_back = camera.frame().back();

        camera.update(0.016, &input);
        let settled = camera.matrix();
        assert_eq!(camera.frame().back(), initial_back);

        for _ in 0..100 {
            camera.update(0.016, &input);
        }
        assert_eq!(camera.matrix(), settled);
    }

    #[test]
    fn test_position_follows_zoom() {
        let options = ViewOptions::default();
        let mut camera = Camera::new(ViewMode::Volume, &options);
        let mut input = InputTracker::new(1.0);
        camera.update(0.0, &input);
        assert!((camera.frame().position().length() - 9.0).abs() < TOLERANCE);

        input.set_zoom(7.0);
        camera.update(0.0, &input);
        assert!((camera.frame().position().length() - 3.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_drag_rotates_and_arms_fling() {
        let options = ViewOptions::default();
        let mut camera = Camera::new(ViewMode::Volume, &options);
        let before = camera.frame().back();

        camera.update(0.016, &drag(20.0, 0.0));

        let state = arcball(&camera);
        assert!((state.angular_velocity - 20.0 * options.rotation_speed).abs() < 1e-3);
        assert!((state.axis().length() - 1.0).abs() < TOLERANCE);
        assert!((camera.frame().back() - before).length() > 1e-3);
        assert_orthonormal(camera.frame());
    }

    #[test]
    fn test_friction_decay_follows_power_law() {
        let options = ViewOptions {
            friction_coefficient: 0.5,
            ..ViewOptions::default()
        };
        let mut camera = Camera::new(ViewMode::Volume, &options);
        camera.update(0.0, &drag(10.0, 0.0));
        let v0 = arcball(&camera).angular_velocity;
        assert!(v0 > 0.0);

        let idle = InputTracker::new(1.0);
        let mut elapsed = 0.0;
        let mut previous = v0;
        for _ in 0..20 {
            camera.update(0.25, &idle);
            elapsed += 0.25;
            let v = arcball(&camera).angular_velocity;
            assert!(v < previous, "velocity must strictly decrease");
            let expected = v0 * 0.5_f32.powf(elapsed);
            assert!((v - expected).abs() < 1e-4 * v0.max(1.0));
            previous = v;
        }
        assert!(previous < v0 * 0.05);
        assert_orthonormal(camera.frame());
    }

    #[test]
    fn test_ortho_pan_is_clamped() {
        let options = ViewOptions::default();
        let mut camera = Camera::new(ViewMode::Slice, &options);
        camera.update(0.016, &drag(-1.0e6, 1.0e6));
        let position = camera.frame().position();
        assert_eq!(position.x, 1.0);
        assert_eq!(position.y, -1.0);
        assert_eq!(position.z, 5.0);
    }

    #[test]
    fn test_ortho_pan_direction() {
        let options = ViewOptions::default();
        let mut camera = Camera::new(ViewMode::Slice, &options);
        camera.update(0.016, &drag(10.0, 20.0));
        let position = camera.frame().position();
        assert!((position.x + 10.0 * options.pan_speed).abs() < TOLERANCE);
        assert!((position.y + 20.0 * options.pan_speed).abs() < TOLERANCE);
    }

    proptest! {
        #[test]
        fn prop_arcball_stays_orthonormal(
            steps in prop::collection::vec((-200.0f32..200.0, -200.0f32..200.0, 0.0f32..0.1), 1..40)
        ) {
            let options = ViewOptions::default();
            let mut camera = Camera::new(ViewMode::Volume, &options);
            for (dx, dy, dt) in steps {
                camera.update(dt, &drag(dx, dy));
                assert_orthonormal(camera.frame());
            }
        }

        #[test]
        fn prop_ortho_pan_within_bound(
            dx in -1.0e6f32..1.0e6,
            dy in -1.0e6f32..1.0e6,
        ) {
            let options = ViewOptions::default();
            let mut camera = Camera::new(ViewMode::Slice, &options);
            camera.update(0.016, &drag(dx, dy));
            let position = camera.frame().position();
            prop_assert!(position.x.abs() <= 1.0);
            prop_assert!(position.y.abs() <= 1.0);
        }
    }
}
