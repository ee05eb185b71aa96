use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Identifier for a mouse button (left button is zero).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MouseButton(u8);

impl MouseButton {
    pub const LEFT: Self = Self(0);
    pub const RIGHT: Self = Self(1);
    pub const MIDDLE: Self = Self(2);

    pub fn new(index: u8) -> Self {
        Self(index)
    }

    pub fn index(self) -> u8 {
        self.0
    }
}

/// Pointer input in logical window coordinates, origin at the top left.
///
/// Touches are reported as the left button.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { button: MouseButton, position: Vec2 },
    Up { button: MouseButton, position: Vec2 },
    Move { position: Vec2 },
    /// Wheel movement in lines; positive values scroll away from the user.
    Wheel { delta: f32 },
}

/// Pressed buttons and last known pointer position.
#[derive(Debug, Default, Clone)]
pub struct PointerState {
    buttons: HashSet<MouseButton>,
    position: Vec2,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `event` and returns how far the pointer moved, if it did.
    pub fn apply(&mut self, event: &PointerEvent) -> Vec2 {
        match *event {
            PointerEvent::Down { button, position } => {
                self.buttons.insert(button);
                self.position = position;
                Vec2::ZERO
            }
            PointerEvent::Up { button, position } => {
                self.buttons.remove(&button);
                self.position = position;
                Vec2::ZERO
            }
            PointerEvent::Move { position } => {
                let delta = position - self.position;
                self.position = position;
                delta
            }
            PointerEvent::Wheel { .. } => Vec2::ZERO,
        }
    }

    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.buttons.contains(&button)
    }

    pub fn any_button_down(&self) -> bool {
        !self.buttons.is_empty()
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_buttons() {
        let mut state = PointerState::new();
        state.apply(&PointerEvent::Down {
            button: MouseButton::LEFT,
            position: Vec2::new(5.0, 5.0),
        });
        assert!(state.is_button_down(MouseButton::LEFT));
        assert!(!state.is_button_down(MouseButton::RIGHT));
        state.apply(&PointerEvent::Up {
            button: MouseButton::LEFT,
            position: Vec2::new(5.0, 5.0),
        });
        assert!(!state.any_button_down());
    }

    #[test]
    fn move_reports_delta_from_last_position() {
        let mut state = PointerState::new();
        state.apply(&PointerEvent::Down {
            button: MouseButton::LEFT,
            position: Vec2::new(10.0, 20.0),
        });
        let delta = state.apply(&PointerEvent::Move {
            position: Vec2::new(13.0, 16.0),
        });
        assert_eq!(delta, Vec2::new(3.0, -4.0));
        assert_eq!(state.position(), Vec2::new(13.0, 16.0));
    }
}
