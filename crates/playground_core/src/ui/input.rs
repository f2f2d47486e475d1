//! GLFW event → imgui input translation

use ::glfw::{Action, Modifiers, WindowEvent};
use ::imgui::{Io, Key, MouseButton};

fn map_key(key: ::glfw::Key) -> Option<Key> {
    use ::glfw::Key as G;
    Some(match key {
        G::Tab => Key::Tab,
        G::Left => Key::LeftArrow,
        G::Right => Key::RightArrow,
        G::Up => Key::UpArrow,
        G::Down => Key::DownArrow,
        G::PageUp => Key::PageUp,
        G::PageDown => Key::PageDown,
        G::Home => Key::Home,
        G::End => Key::End,
        G::Insert => Key::Insert,
        G::Delete => Key::Delete,
        G::Backspace => Key::Backspace,
        G::Space => Key::Space,
        G::Enter => Key::Enter,
        G::KpEnter => Key::KeypadEnter,
        G::Escape => Key::Escape,
        G::LeftControl => Key::LeftCtrl,
        G::LeftShift => Key::LeftShift,
        G::LeftAlt => Key::LeftAlt,
        G::LeftSuper => Key::LeftSuper,
        G::RightControl => Key::RightCtrl,
        G::RightShift => Key::RightShift,
        G::RightAlt => Key::RightAlt,
        G::RightSuper => Key::RightSuper,
        // Clipboard and undo shortcuts
        G::A => Key::A,
        G::C => Key::C,
        G::V => Key::V,
        G::X => Key::X,
        G::Y => Key::Y,
        G::Z => Key::Z,
        _ => return None,
    })
}

fn map_mouse_button(button: ::glfw::MouseButton) -> Option<MouseButton> {
    use ::glfw::MouseButton as G;
    Some(match button {
        G::Button1 => MouseButton::Left,
        G::Button2 => MouseButton::Right,
        G::Button3 => MouseButton::Middle,
        G::Button4 => MouseButton::Extra1,
        G::Button5 => MouseButton::Extra2,
        _ => return None,
    })
}

fn update_modifiers(io: &mut Io, mods: Modifiers) {
    io.add_key_event(Key::ModCtrl, mods.contains(Modifiers::Control));
    io.add_key_event(Key::ModShift, mods.contains(Modifiers::Shift));
    io.add_key_event(Key::ModAlt, mods.contains(Modifiers::Alt));
    io.add_key_event(Key::ModSuper, mods.contains(Modifiers::Super));
}

/// Feed one window event into imgui's input queue
pub(crate) fn translate(io: &mut Io, event: &WindowEvent) {
    match *event {
        WindowEvent::CursorPos(x, y) => io.add_mouse_pos_event([x as f32, y as f32]),
        WindowEvent::CursorEnter(false) => io.add_mouse_pos_event([-f32::MAX, -f32::MAX]),
        WindowEvent::MouseButton(button, action, mods) => {
            update_modifiers(io, mods);
            if let Some(button) = map_mouse_button(button) {
                io.add_mouse_button_event(button, action != Action::Release);
            }
        }
        WindowEvent::Scroll(x, y) => io.add_mouse_wheel_event([x as f32, y as f32]),
        WindowEvent::Key(key, _, action, mods) => {
            update_modifiers(io, mods);
            if let Some(key) = map_key(key) {
                io.add_key_event(key, action != Action::Release);
            }
        }
        WindowEvent::Char(c) => io.add_input_character(c),
        // Held buttons and modifiers are never released to an unfocused window
        WindowEvent::Focus(false) => {
            for button in MouseButton::VARIANTS {
                io.add_mouse_button_event(button, false);
            }
            update_modifiers(io, Modifiers::empty());
        }
        _ => {}
    }
}
