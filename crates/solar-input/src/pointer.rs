//! Frame-coherent pointer state for orbit dragging.
//!
//! [`PointerState`] accumulates winit cursor, button, and wheel events between
//! frames. The orbit controls read the drag delta and wheel steps once per
//! frame, then [`clear_transients`](PointerState::clear_transients) resets them.

use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta};

/// Pixels of a precise-scroll device treated as one wheel line.
const PIXELS_PER_LINE: f64 = 40.0;

/// The pointer buttons the viewer distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// Left button; drags orbit the camera.
    Primary,
    /// Right button.
    Secondary,
    /// Wheel button.
    Middle,
}

impl PointerButton {
    /// Maps a winit button. Back/forward/extra buttons are ignored.
    pub fn from_winit(button: MouseButton) -> Option<Self> {
        match button {
            MouseButton::Left => Some(Self::Primary),
            MouseButton::Right => Some(Self::Secondary),
            MouseButton::Middle => Some(Self::Middle),
            _ => None,
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Primary => 0,
            Self::Secondary => 1,
            Self::Middle => 2,
        }
    }
}

/// Pointer position, held buttons, and per-frame drag/wheel accumulators.
#[derive(Debug, Clone, Default)]
pub struct PointerState {
    position: Option<Vec2>,
    pressed: [bool; 3],
    drag: Vec2,
    scroll_lines: f32,
    inside: bool,
}

impl PointerState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a `CursorMoved` event (logical pixels).
    pub fn on_cursor_moved(&mut self, x: f64, y: f64) {
        let new_pos = Vec2::new(x as f32, y as f32);
        if self.is_dragging()
            && let Some(previous) = self.position
        {
            self.drag += new_pos - previous;
        }
        self.position = Some(new_pos);
    }

    /// Process a `MouseInput` event.
    pub fn on_button(&mut self, button: MouseButton, state: ElementState) {
        let Some(button) = PointerButton::from_winit(button) else {
            return;
        };
        self.pressed[button.index()] = state == ElementState::Pressed;
    }

    /// Process a `MouseWheel` event. Positive means the wheel moved up.
    pub fn on_scroll(&mut self, delta: MouseScrollDelta) {
        match delta {
            MouseScrollDelta::LineDelta(_x, y) => self.scroll_lines += y,
            MouseScrollDelta::PixelDelta(pos) => {
                self.scroll_lines += (pos.y / PIXELS_PER_LINE) as f32;
            }
        }
    }

    pub fn on_cursor_entered(&mut self) {
        self.inside = true;
    }

    /// The last known position is dropped so re-entry does not produce a jump.
    pub fn on_cursor_left(&mut self) {
        self.inside = false;
        self.position = None;
    }

    /// Clears the drag and wheel accumulators. Held buttons persist.
    pub fn clear_transients(&mut self) {
        self.drag = Vec2::ZERO;
        self.scroll_lines = 0.0;
    }

    /// Cursor position, if the cursor has been seen inside the window.
    #[must_use]
    pub fn position(&self) -> Option<Vec2> {
        self.position
    }

    /// Cursor travel while the primary button was held, since the last clear.
    #[must_use]
    pub fn drag_delta(&self) -> Vec2 {
        self.drag
    }

    /// Wheel steps since the last clear.
    #[must_use]
    pub fn scroll_lines(&self) -> f32 {
        self.scroll_lines
    }

    #[must_use]
    pub fn is_pressed(&self, button: PointerButton) -> bool {
        self.pressed[button.index()]
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.is_pressed(PointerButton::Primary)
    }

    #[must_use]
    pub fn is_inside(&self) -> bool {
        self.inside
    }
}
