use glam::Vec2;
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseScrollDelta, WindowEvent},
    keyboard::{Key as WinitKey, NamedKey},
};

// A line of wheel scrolling in pixels, matching what browsers report per notch
const PIXELS_PER_LINE: f32 = 120.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    Space,
    Character(char),
}

/// Window input reduced to what the demos react to. Positions are in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown { position: Vec2, button: MouseButton },
    PointerUp { position: Vec2, button: MouseButton },
    PointerMoved(Vec2),
    PointerEntered,
    PointerLeft,
    /// Positive when scrolling up/away from the user.
    Wheel { delta_y: f32 },
    KeyDown(Key),
}

impl InputEvent {
    pub fn is_pointer(&self) -> bool {
        matches!(
            self,
            InputEvent::PointerDown { .. }
                | InputEvent::PointerUp { .. }
                | InputEvent::PointerMoved(_)
                | InputEvent::Wheel { .. }
        )
    }
}

/// Cursor position in logical points, the unit imgui lays windows out in.
pub fn logical_position(position: PhysicalPosition<f64>, scale_factor: f64) -> Vec2 {
    let position = position.to_logical::<f32>(scale_factor);
    Vec2::new(position.x, position.y)
}

pub fn translate(event: &WindowEvent, cursor: Vec2, scale_factor: f64) -> Option<InputEvent> {
    match event {
        WindowEvent::CursorMoved { position, .. } => Some(InputEvent::PointerMoved(
            logical_position(*position, scale_factor),
        )),
        WindowEvent::CursorEntered { .. } => Some(InputEvent::PointerEntered),
        WindowEvent::CursorLeft { .. } => Some(InputEvent::PointerLeft),
        WindowEvent::MouseInput { state, button, .. } => {
            let button = match button {
                winit::event::MouseButton::Left => MouseButton::Left,
                winit::event::MouseButton::Right => MouseButton::Right,
                winit::event::MouseButton::Middle => MouseButton::Middle,
                _ => MouseButton::Other,
            };

            Some(match state {
                ElementState::Pressed => InputEvent::PointerDown {
                    position: cursor,
                    button,
                },
                ElementState::Released => InputEvent::PointerUp {
                    position: cursor,
                    button,
                },
            })
        }
        WindowEvent::MouseWheel { delta, .. } => {
            let delta_y = match delta {
                MouseScrollDelta::LineDelta(_, y) => y * PIXELS_PER_LINE,
                MouseScrollDelta::PixelDelta(position) => (position.y / scale_factor) as f32,
            };
            Some(InputEvent::Wheel { delta_y })
        }
        WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
            let key = match &event.logical_key {
                WinitKey::Named(NamedKey::ArrowUp) => Key::ArrowUp,
                WinitKey::Named(NamedKey::ArrowDown) => Key::ArrowDown,
                WinitKey::Named(NamedKey::Space) => Key::Space,
                WinitKey::Character(text) => Key::Character(text.chars().next()?.to_ascii_lowercase()),
                _ => return None,
            };
            Some(InputEvent::KeyDown(key))
        }
        _ => None,
    }
}
