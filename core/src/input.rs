//! Windowing-independent input types.
//!
//! The winit glue in [`crate::winit_support`] converts into these, so the
//! event and operator code never names a windowing crate.

/// Element state (pressed or released)
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ElementState {
    Pressed,
    Released,
}

/// Mouse button identifier
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u16),
}

/// Mouse scroll delta
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MouseScrollDelta {
    /// Scroll delta in lines
    LineDelta(f32, f32),
    /// Scroll delta in pixels
    PixelDelta(f32, f32),
}

impl MouseScrollDelta {
    /// Vertical scroll in line units. Pixel deltas count 100 px as a line.
    pub fn lines_y(&self) -> f32 {
        match *self {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(_, y) => y / 100.0,
        }
    }
}

/// Keyboard logical key (with consideration for layout)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A named key
    Named(NamedKey),
    /// A character key
    Character(char),
    /// An unidentified key
    Unidentified,
}

/// The named keys the viewer reacts to. Everything else is `Key::Unidentified`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Escape,
    Enter,
    Space,
    Shift,
    Control,
    Alt,
}

/// Keyboard event
#[derive(Debug, Clone, PartialEq)]
pub struct KeyEvent {
    /// Logical key (with layout consideration)
    pub logical_key: Key,
    /// Whether the key is pressed or released
    pub state: ElementState,
    /// Whether this is a repeat event (key held down)
    pub repeat: bool,
}

impl KeyEvent {
    /// True for the initial press of `key`, ignoring auto-repeat.
    pub fn is_press_of(&self, key: NamedKey) -> bool {
        self.state == ElementState::Pressed && !self.repeat && self.logical_key == Key::Named(key)
    }
}
