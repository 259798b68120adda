use std::collections::HashSet;

use super::frame::InputFrame;
use super::types::{InputEvent, Key, KeyState, MouseButton};

/// What is currently held, plus the last pointer position.
#[derive(Debug, Default)]
pub struct InputState {
    pub focused: bool,

    /// Pointer position in physical pixels, top-left origin.
    pub pointer_pos: Option<(f32, f32)>,

    pub keys_down: HashSet<Key>,
    pub buttons_down: HashSet<MouseButton>,
}

/// Inserts on press, removes on release, and records only real transitions.
fn track<T: Copy + Eq + std::hash::Hash>(
    down: &mut HashSet<T>,
    pressed: &mut HashSet<T>,
    released: &mut HashSet<T>,
    item: T,
    state: KeyState,
) {
    match state {
        KeyState::Pressed => {
            if down.insert(item) {
                pressed.insert(item);
            }
        }
        KeyState::Released => {
            if down.remove(&item) {
                released.insert(item);
            }
        }
    }
}

impl InputState {
    /// Applies an event to the current state and records transitions in `frame`.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match &ev {
            InputEvent::Focused(f) => {
                self.focused = *f;
                if !*f {
                    // Releases are not delivered after focus loss.
                    frame.keys_released.extend(self.keys_down.drain());
                    frame.buttons_released.extend(self.buttons_down.drain());
                }
            }

            InputEvent::PointerMoved { x, y } => self.pointer_pos = Some((*x, *y)),

            InputEvent::PointerLeft => self.pointer_pos = None,

            InputEvent::Key { key, state, .. } => {
                track(&mut self.keys_down, &mut frame.keys_pressed, &mut frame.keys_released, *key, *state);
            }

            InputEvent::PointerButton { button, state } => {
                track(
                    &mut self.buttons_down,
                    &mut frame.buttons_pressed,
                    &mut frame.buttons_released,
                    *button,
                    *state,
                );
            }

            InputEvent::Text(t) => frame.text.push(t.clone()),
        }

        frame.events.push(ev);
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn button_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::TextEvent;

    fn key(key: Key, state: KeyState) -> InputEvent {
        InputEvent::Key { key, state, repeat: false }
    }

    #[test]
    fn repeated_press_is_reported_once() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(&mut frame, key(Key::ArrowUp, KeyState::Pressed));
        frame.clear();
        state.apply_event(&mut frame, key(Key::ArrowUp, KeyState::Pressed));
        assert!(frame.keys_pressed.is_empty());
        assert!(state.key_down(Key::ArrowUp));
    }

    #[test]
    fn focus_loss_releases_held_keys() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(&mut frame, key(Key::ArrowLeft, KeyState::Pressed));
        state.apply_event(&mut frame, InputEvent::PointerButton { button: MouseButton::Left, state: KeyState::Pressed });
        frame.clear();
        state.apply_event(&mut frame, InputEvent::Focused(false));
        assert!(!state.key_down(Key::ArrowLeft));
        assert!(!state.button_down(MouseButton::Left));
        assert!(frame.keys_released.contains(&Key::ArrowLeft));
        assert!(frame.buttons_released.contains(&MouseButton::Left));
    }

    #[test]
    fn release_without_press_is_ignored() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(&mut frame, InputEvent::PointerButton { button: MouseButton::Right, state: KeyState::Released });
        assert!(frame.buttons_released.is_empty());
    }

    #[test]
    fn pointer_tracks_moves_and_leaves() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(&mut frame, InputEvent::PointerMoved { x: 3.0, y: 4.0 });
        assert_eq!(state.pointer_pos, Some((3.0, 4.0)));
        state.apply_event(&mut frame, InputEvent::PointerLeft);
        assert_eq!(state.pointer_pos, None);
    }

    #[test]
    fn text_is_collected_in_order() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        for t in ["a", "`", "1"] {
            state.apply_event(&mut frame, InputEvent::Text(TextEvent { text: t.to_string() }));
        }
        assert_eq!(frame.chars().collect::<String>(), "a`1");
    }
}
