//! Pointer input accumulation between frames.

use glam::Vec2;

/// The device behind a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerKind {
    #[default]
    Mouse,
    Touch,
    Pen,
}

/// Screen-space rectangle of the drawable surface, in the same units as
/// pointer client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceBounds {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl SurfaceBounds {
    /// Bounds anchored at the origin.
    #[must_use]
    pub fn from_size(width: f32, height: f32) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width,
            height,
        }
    }

    /// Converts client coordinates to normalized device coordinates:
    /// `[-1, 1]` on both axes, origin at the center, y pointing up.
    #[must_use]
    pub fn to_ndc(&self, client_x: f32, client_y: f32) -> Vec2 {
        let x = client_x - self.left;
        let y = client_y - self.top;
        Vec2::new(
            (x / self.width) * 2.0 - 1.0,
            1.0 - (y / self.height) * 2.0,
        )
    }
}

/// A pointer event on a view's surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Primary button or contact pressed.
    Down,
    /// Primary button or contact released.
    Up,
    /// Pointer moved by `(dx, dy)` raw units since the previous move.
    Move {
        kind: PointerKind,
        /// Whether the primary mouse button is held. Ignored for touch and pen.
        primary_held: bool,
        dx: f32,
        dy: f32,
    },
    /// Double click at client coordinates within `bounds`.
    DoubleClick {
        client_x: f32,
        client_y: f32,
        bounds: SurfaceBounds,
    },
}

/// Accumulates pointer input between two consumed frames.
#[derive(Debug, Clone, PartialEq)]
pub struct InputTracker {
    dragging: bool,
    move_x: f32,
    move_y: f32,
    zoom: f32,
    clicked: bool,
    click: Vec2,
}

impl InputTracker {
    /// Creates an idle tracker at the given zoom level.
    #[must_use]
    pub fn new(zoom: f32) -> Self {
        Self {
            dragging: false,
            move_x: 0.0,
            move_y: 0.0,
            zoom,
            clicked: false,
            click: Vec2::ZERO,
        }
    }

    /// Applies one pointer event.
    pub fn apply(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down => self.dragging = true,
            PointerEvent::Up => self.dragging = false,
            PointerEvent::Move {
                kind,
                primary_held,
                dx,
                dy,
            } => self.pointer_move(kind, primary_held, dx, dy),
            PointerEvent::DoubleClick {
                client_x,
                client_y,
                bounds,
            } => {
                self.clicked = true;
                self.click = bounds.to_ndc(client_x, client_y);
            }
        }
    }

    fn pointer_move(&mut self, kind: PointerKind, primary_held: bool, dx: f32, dy: f32) {
        // Touch and pen contacts only report moves while in contact.
        let held = match kind {
            PointerKind::Mouse => primary_held,
            PointerKind::Touch | PointerKind::Pen => true,
        };
        if held {
            self.move_x += dx;
            self.move_y += dy;
        }
    }

    /// Clears per-frame accumulators. The drag flag and zoom are kept.
    pub fn reset(&mut self) {
        self.move_x = 0.0;
        self.move_y = 0.0;
        self.clicked = false;
        self.click = Vec2::ZERO;
    }

    /// Stores an already clamped zoom level.
    pub(crate) fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom;
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Horizontal movement accumulated since the last reset.
    #[must_use]
    pub fn move_x(&self) -> f32 {
        self.move_x
    }

    /// Vertical movement accumulated since the last reset (screen y, down positive).
    #[must_use]
    pub fn move_y(&self) -> f32 {
        self.move_y
    }

    #[must_use]
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// NDC coordinates of a double click received since the last reset.
    #[must_use]
    pub fn double_click(&self) -> Option<Vec2> {
        self.clicked.then_some(self.click)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mouse_move(primary_held: bool, dx: f32, dy: f32) -> PointerEvent {
        PointerEvent::Move {
            kind: PointerKind::Mouse,
            primary_held,
            dx,
            dy,
        }
    }

    #[test]
    fn test_mouse_moves_accumulate_only_while_held() {
        let mut input = InputTracker::new(1.0);
        input.apply(mouse_move(false, 5.0, 5.0));
        assert_eq!((input.move_x(), input.move_y()), (0.0, 0.0));

        input.apply(mouse_move(true, 3.0, -1.0));
        input.apply(mouse_move(true, 2.0, -4.0));
        assert_eq!((input.move_x(), input.move_y()), (5.0, -5.0));
    }

    #[test]
    fn test_touch_moves_always_accumulate() {
        let mut input = InputTracker::new(1.0);
        input.apply(PointerEvent::Move {
            kind: PointerKind::Touch,
            primary_held: false,
            dx: 4.0,
            dy: 2.0,
        });
        assert_eq!((input.move_x(), input.move_y()), (4.0, 2.0));
    }

    #[test]
    fn test_down_and_up_toggle_dragging() {
        let mut input = InputTracker::new(1.0);
        input.apply(PointerEvent::Down);
        assert!(input.is_dragging());
        input.apply(PointerEvent::Up);
        assert!(!input.is_dragging());
    }

    #[test]
    fn test_double_click_ndc() {
        let mut input = InputTracker::new(1.0);
        let bounds = SurfaceBounds {
            left: 100.0,
            top: 50.0,
            width: 200.0,
            height: 100.0,
        };
        input.apply(PointerEvent::DoubleClick {
            client_x: 150.0,
            client_y: 75.0,
            bounds,
        });
        let click = input.double_click().expect("click recorded");
        assert!((click.x + 0.5).abs() < 1e-6);
        assert!((click.y - 0.5).abs() < 1e-6);

        input.apply(PointerEvent::DoubleClick {
            client_x: 300.0,
            client_y: 150.0,
            bounds,
        });
        assert_eq!(input.double_click(), Some(Vec2::new(1.0, -1.0)));
    }

    #[test]
    fn test_reset_keeps_drag_and_zoom() {
        let mut input = InputTracker::new(3.0);
        input.apply(PointerEvent::Down);
        input.apply(mouse_move(true, 1.0, 1.0));
        input.apply(PointerEvent::DoubleClick {
            client_x: 0.0,
            client_y: 0.0,
            bounds: SurfaceBounds::from_size(10.0, 10.0),
        });

        input.reset();

        assert!(input.is_dragging());
        assert_eq!(input.zoom(), 3.0);
        assert_eq!((input.move_x(), input.move_y()), (0.0, 0.0));
        assert_eq!(input.double_click(), None);
    }
}
