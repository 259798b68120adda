/// Physical keys the runtime reports as held/released.
///
/// Everything that types a character (demo letters, digits, `` ` ``) is
/// delivered as [`InputEvent::Text`] instead, so keyboard layouts map the
/// way the user expects.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Space,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    /// Any other physical key, by winit key code.
    Other(u32),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

/// Committed text, one event per key press that produced characters.
#[derive(Debug, Clone, PartialEq)]
pub struct TextEvent {
    pub text: String,
}

/// Platform-agnostic input events emitted by the runtime. Pointer
/// positions are physical pixels with a top-left origin.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key { key: Key, state: KeyState, repeat: bool },
    PointerMoved { x: f32, y: f32 },
    PointerButton { button: MouseButton, state: KeyState },
    Text(TextEvent),
    /// Pointer left the window surface.
    PointerLeft,
    Focused(bool),
}
