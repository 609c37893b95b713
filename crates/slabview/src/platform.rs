//! winit glue: pointer translation and redraw-driven frame scheduling.

use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::Vec2;
use slabview_core::{FrameScheduler, FrameToken, PointerEvent, PointerKind, SurfaceBounds};
use winit::event::{ElementState, MouseButton, TouchPhase, WindowEvent};
use winit::window::Window;

/// Two presses closer than this in time form a double click.
pub const DOUBLE_CLICK_INTERVAL: Duration = Duration::from_millis(400);

/// Two presses closer than this in pixels form a double click.
pub const DOUBLE_CLICK_DISTANCE: f32 = 4.0;

/// Turns winit window events into [`PointerEvent`]s for one view.
///
/// Only the left mouse button and the first touch contact drive a view.
#[derive(Debug, Clone)]
pub struct PointerTranslator {
    bounds: SurfaceBounds,
    cursor: Option<Vec2>,
    left_held: bool,
    touch: Option<(u64, Vec2)>,
    last_press: Option<(Instant, Vec2)>,
}

impl PointerTranslator {
    /// Creates a translator for a surface of `width` x `height` pixels.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            bounds: bounds(width, height),
            cursor: None,
            left_held: false,
            touch: None,
            last_press: None,
        }
    }

    /// Updates the surface bounds used for double-click coordinates.
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.bounds = bounds(width, height);
    }

    pub fn bounds(&self) -> SurfaceBounds {
        self.bounds
    }

    /// Translates one window event received at the current instant.
    pub fn translate(&mut self, event: &WindowEvent) -> Vec<PointerEvent> {
        let now = Instant::now();
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                #[allow(clippy::cast_possible_truncation)]
                let moved = self.cursor_moved(position.x as f32, position.y as f32);
                moved.into_iter().collect()
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                Vec::new()
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => self.left_button(*state == ElementState::Pressed, now),
            WindowEvent::Touch(touch) => {
                #[allow(clippy::cast_possible_truncation)]
                let location = Vec2::new(touch.location.x as f32, touch.location.y as f32);
                self.touch_phase(touch.id, touch.phase, location, now)
            }
            WindowEvent::Resized(size) => {
                self.set_size(size.width, size.height);
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    /// Cursor moved to `(x, y)`. The first position after entering the
    /// surface only seeds the delta.
    pub fn cursor_moved(&mut self, x: f32, y: f32) -> Option<PointerEvent> {
        let position = Vec2::new(x, y);
        let previous = self.cursor.replace(position)?;
        let delta = position - previous;
        Some(PointerEvent::Move {
            kind: PointerKind::Mouse,
            primary_held: self.left_held,
            dx: delta.x,
            dy: delta.y,
        })
    }

    /// Left button pressed or released at the last known cursor position.
    pub fn left_button(&mut self, pressed: bool, now: Instant) -> Vec<PointerEvent> {
        if pressed {
            self.left_held = true;
            let position = self.cursor.unwrap_or(Vec2::ZERO);
            self.press(position, now)
        } else if self.left_held {
            self.left_held = false;
            vec![PointerEvent::Up]
        } else {
            Vec::new()
        }
    }

    /// One phase of a touch contact. Contacts other than the first active
    /// one are ignored.
    pub fn touch_phase(
        &mut self,
        id: u64,
        phase: TouchPhase,
        location: Vec2,
        now: Instant,
    ) -> Vec<PointerEvent> {
        match phase {
            TouchPhase::Started => {
                if self.touch.is_some() {
                    return Vec::new();
                }
                self.touch = Some((id, location));
                self.press(location, now)
            }
            TouchPhase::Moved => match self.touch {
                Some((active, previous)) if active == id => {
                    self.touch = Some((id, location));
                    let delta = location - previous;
                    vec![PointerEvent::Move {
                        kind: PointerKind::Touch,
                        primary_held: false,
                        dx: delta.x,
                        dy: delta.y,
                    }]
                }
                _ => Vec::new(),
            },
            TouchPhase::Ended | TouchPhase::Cancelled => match self.touch {
                Some((active, _)) if active == id => {
                    self.touch = None;
                    vec![PointerEvent::Up]
                }
                _ => Vec::new(),
            },
        }
    }

    fn press(&mut self, position: Vec2, now: Instant) -> Vec<PointerEvent> {
        let mut events = vec![PointerEvent::Down];
        let double = self.last_press.is_some_and(|(time, previous)| {
            now.saturating_duration_since(time) < DOUBLE_CLICK_INTERVAL
                && position.distance(previous) < DOUBLE_CLICK_DISTANCE
        });
        if double {
            // a third press starts a new pair
            self.last_press = None;
            events.push(PointerEvent::DoubleClick {
                client_x: position.x,
                client_y: position.y,
                bounds: self.bounds,
            });
        } else {
            self.last_press = Some((now, position));
        }
        events
    }
}

#[allow(clippy::cast_precision_loss)]
fn bounds(width: u32, height: u32) -> SurfaceBounds {
    SurfaceBounds::from_size(width.max(1) as f32, height.max(1) as f32)
}

/// [`FrameScheduler`] backed by `Window::request_redraw`.
///
/// winit cannot withdraw a redraw request, so cancelling only forgets the
/// token; the redraw still arrives and [`RedrawScheduler::fire`] returns
/// `None` for it.
#[derive(Debug)]
pub struct RedrawScheduler {
    window: Arc<Window>,
    next_id: u64,
    pending: Option<FrameToken>,
}

impl RedrawScheduler {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            next_id: 0,
            pending: None,
        }
    }

    /// Takes the token a `RedrawRequested` event answers, if any.
    pub fn fire(&mut self) -> Option<FrameToken> {
        self.pending.take()
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }
}

impl FrameScheduler for RedrawScheduler {
    fn request_frame(&mut self) -> FrameToken {
        self.next_id += 1;
        let token = FrameToken(self.next_id);
        self.pending = Some(token);
        self.window.request_redraw();
        token
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        if self.pending == Some(token) {
            self.pending = None;
        }
    }
}
