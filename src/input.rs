use std::collections::HashSet;

use log::*;
use winit::event::{ElementState, KeyboardInput, MouseButton, VirtualKeyCode};

/// what happened to a key, as reported to the log
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    Pressed,
    Released,
    Repeated,
}

impl KeyAction {
    pub fn description(self) -> &'static str {
        match self {
            KeyAction::Pressed => "pressed",
            KeyAction::Released => "released",
            KeyAction::Repeated => "repeated",
        }
    }
}

/// winit reports auto-repeat as another press, so held keys are remembered
/// to tell the two apart
#[derive(Debug, Default)]
pub struct KeyTracker {
    held: HashSet<u32>,
}

impl KeyTracker {
    pub fn record(&mut self, scancode: u32, state: ElementState) -> KeyAction {
        match state {
            ElementState::Pressed if !self.held.insert(scancode) => KeyAction::Repeated,
            ElementState::Pressed => KeyAction::Pressed,
            ElementState::Released => {
                self.held.remove(&scancode);
                KeyAction::Released
            }
        }
    }

    /// forgets all held keys; releases aren't delivered while the window is
    /// unfocused, so this has to happen when focus is lost
    pub fn clear(&mut self) {
        self.held.clear();
    }

    /// logs the key event and returns true, if the window should close
    pub fn handle_keyboard(&mut self, input: &KeyboardInput) -> bool {
        let action = self.record(input.scancode, input.state);

        match input.virtual_keycode {
            Some(key) => trace!("Key {}: {:?}", action.description(), key),
            None => trace!("Key {}: {}", action.description(), input.scancode),
        }

        action == KeyAction::Pressed && input.virtual_keycode == Some(VirtualKeyCode::Escape)
    }
}

pub fn button_description(state: ElementState) -> &'static str {
    match state {
        ElementState::Pressed => "pressed",
        ElementState::Released => "released",
    }
}

pub fn handle_mouse_button(button: MouseButton, state: ElementState) {
    trace!("Mouse button {}: {:?}", button_description(state), button);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(deprecated)]
    fn keyboard_input(
        scancode: u32,
        state: ElementState,
        key: Option<VirtualKeyCode>,
    ) -> KeyboardInput {
        KeyboardInput {
            scancode,
            state,
            virtual_keycode: key,
            modifiers: Default::default(),
        }
    }

    #[test]
    fn second_press_without_release_is_a_repeat() {
        let mut tracker = KeyTracker::default();
        assert_eq!(tracker.record(30, ElementState::Pressed), KeyAction::Pressed);
        assert_eq!(tracker.record(30, ElementState::Pressed), KeyAction::Repeated);
        assert_eq!(tracker.record(30, ElementState::Pressed), KeyAction::Repeated);
        assert_eq!(tracker.record(30, ElementState::Released), KeyAction::Released);
        assert_eq!(tracker.record(30, ElementState::Pressed), KeyAction::Pressed);
    }

    #[test]
    fn keys_are_tracked_independently() {
        let mut tracker = KeyTracker::default();
        assert_eq!(tracker.record(1, ElementState::Pressed), KeyAction::Pressed);
        assert_eq!(tracker.record(2, ElementState::Pressed), KeyAction::Pressed);
        assert_eq!(tracker.record(1, ElementState::Released), KeyAction::Released);
        assert_eq!(tracker.record(2, ElementState::Pressed), KeyAction::Repeated);
    }

    #[test]
    fn release_of_unknown_key_is_still_a_release() {
        let mut tracker = KeyTracker::default();
        assert_eq!(tracker.record(7, ElementState::Released), KeyAction::Released);
    }

    #[test]
    fn press_after_focus_loss_is_not_a_repeat() {
        let mut tracker = KeyTracker::default();
        assert_eq!(tracker.record(30, ElementState::Pressed), KeyAction::Pressed);

        // released while another window had focus
        tracker.clear();
        assert_eq!(tracker.record(30, ElementState::Pressed), KeyAction::Pressed);
    }

    #[test]
    fn escape_press_requests_close() {
        let mut tracker = KeyTracker::default();
        let escape = keyboard_input(1, ElementState::Pressed, Some(VirtualKeyCode::Escape));
        assert!(tracker.handle_keyboard(&escape));
    }

    #[test]
    fn escape_repeat_and_release_do_not_request_close() {
        let mut tracker = KeyTracker::default();
        let press = keyboard_input(1, ElementState::Pressed, Some(VirtualKeyCode::Escape));
        let release = keyboard_input(1, ElementState::Released, Some(VirtualKeyCode::Escape));
        assert!(tracker.handle_keyboard(&press));
        assert!(!tracker.handle_keyboard(&press));
        assert!(!tracker.handle_keyboard(&release));
    }

    #[test]
    fn other_keys_do_not_request_close() {
        let mut tracker = KeyTracker::default();
        let a = keyboard_input(30, ElementState::Pressed, Some(VirtualKeyCode::A));
        let unknown = keyboard_input(999, ElementState::Pressed, None);
        assert!(!tracker.handle_keyboard(&a));
        assert!(!tracker.handle_keyboard(&unknown));
    }

    #[test]
    fn descriptions() {
        assert_eq!(KeyAction::Repeated.description(), "repeated");
        assert_eq!(button_description(ElementState::Pressed), "pressed");
        assert_eq!(button_description(ElementState::Released), "released");
    }
}
