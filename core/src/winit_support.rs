//! Conversions from winit types to the viewer's input and event types.
//!
//! Only compiled with the `winit-support` feature.

use crate::event::Event;
use crate::input::{ElementState, Key, KeyEvent, MouseButton, MouseScrollDelta, NamedKey};

pub fn convert_element_state(state: winit::event::ElementState) -> ElementState {
    match state {
        winit::event::ElementState::Pressed => ElementState::Pressed,
        winit::event::ElementState::Released => ElementState::Released,
    }
}

pub fn convert_mouse_button(button: winit::event::MouseButton) -> MouseButton {
    match button {
        winit::event::MouseButton::Left => MouseButton::Left,
        winit::event::MouseButton::Right => MouseButton::Right,
        winit::event::MouseButton::Middle => MouseButton::Middle,
        winit::event::MouseButton::Back => MouseButton::Back,
        winit::event::MouseButton::Forward => MouseButton::Forward,
        winit::event::MouseButton::Other(id) => MouseButton::Other(id),
    }
}

pub fn convert_mouse_scroll_delta(delta: winit::event::MouseScrollDelta) -> MouseScrollDelta {
    match delta {
        winit::event::MouseScrollDelta::LineDelta(x, y) => MouseScrollDelta::LineDelta(x, y),
        winit::event::MouseScrollDelta::PixelDelta(pos) => {
            MouseScrollDelta::PixelDelta(pos.x as f32, pos.y as f32)
        }
    }
}

fn convert_named_key(key: winit::keyboard::NamedKey) -> Key {
    use winit::keyboard::NamedKey as WK;
    let named = match key {
        WK::Escape => NamedKey::Escape,
        WK::Enter => NamedKey::Enter,
        WK::Space => NamedKey::Space,
        WK::Shift => NamedKey::Shift,
        WK::Control => NamedKey::Control,
        WK::Alt => NamedKey::Alt,
        _ => return Key::Unidentified,
    };
    Key::Named(named)
}

pub fn convert_key_event(event: &winit::event::KeyEvent) -> KeyEvent {
    let logical_key = match &event.logical_key {
        winit::keyboard::Key::Named(named) => convert_named_key(*named),
        winit::keyboard::Key::Character(s) => s.chars().next().map_or(Key::Unidentified, Key::Character),
        _ => Key::Unidentified,
    };

    KeyEvent {
        logical_key,
        state: convert_element_state(event.state),
        repeat: event.repeat,
    }
}

/// Converts the window events the viewer understands. Drags are synthesized
/// later from cursor movement, so no device events are needed.
pub fn convert_window_event(wevent: &winit::event::WindowEvent) -> Option<Event> {
    use winit::event::WindowEvent as WEvent;

    match wevent {
        WEvent::Resized(size) => Some(Event::Resized((size.width, size.height))),
        WEvent::KeyboardInput {
            event,
            is_synthetic,
            ..
        } => Some(Event::KeyboardInput {
            event: convert_key_event(event),
            is_synthetic: *is_synthetic,
        }),
        WEvent::CursorMoved { position, .. } => Some(Event::CursorMoved {
            position: (position.x, position.y),
        }),
        WEvent::MouseInput { state, button, .. } => Some(Event::MouseInput {
            state: convert_element_state(*state),
            button: convert_mouse_button(*button),
        }),
        WEvent::MouseWheel { delta, .. } => Some(Event::MouseWheel {
            delta: convert_mouse_scroll_delta(*delta),
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buttons_and_states() {
        assert_eq!(
            convert_mouse_button(winit::event::MouseButton::Other(7)),
            MouseButton::Other(7)
        );
        assert_eq!(
            convert_element_state(winit::event::ElementState::Released),
            ElementState::Released
        );
    }

    #[test]
    fn test_pixel_scroll_keeps_pixels() {
        let delta = winit::event::MouseScrollDelta::PixelDelta(
            winit::dpi::PhysicalPosition::new(0.0, 250.0),
        );
        assert_eq!(
            convert_mouse_scroll_delta(delta),
            MouseScrollDelta::PixelDelta(0.0, 250.0)
        );
    }

    #[test]
    fn test_resize_and_cursor() {
        let resized =
            convert_window_event(&winit::event::WindowEvent::Resized(winit::dpi::PhysicalSize::new(640, 480)));
        assert_eq!(resized, Some(Event::Resized((640, 480))));

        let unknown = convert_window_event(&winit::event::WindowEvent::Focused(true));
        assert_eq!(unknown, None);
    }

    #[test]
    fn test_unmapped_named_key_is_unidentified() {
        assert_eq!(convert_named_key(winit::keyboard::NamedKey::F5), Key::Unidentified);
        assert_eq!(
            convert_named_key(winit::keyboard::NamedKey::Escape),
            Key::Named(NamedKey::Escape)
        );
    }
}
