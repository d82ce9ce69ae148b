//! Keyboard and mouse state
//!
//! Window and device events are translated into [`InputEvent`]s and folded
//! into an [`InputState`] that the frame loop reads once per frame.

use cgmath::Vector3;
use winit::{
    event::{DeviceEvent, ElementState, MouseButton, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

/// Input the simulator reacts to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Key { code: KeyCode, pressed: bool },
    MouseButton { left: bool, pressed: bool },
    MouseMotion { dx: f64, dy: f64 },
    Resized { width: u32, height: u32 },
}

impl InputEvent {
    /// Converts a window event, ignoring auto-repeated key presses
    pub fn from_window_event(event: &WindowEvent) -> Option<Self> {
        match event {
            WindowEvent::KeyboardInput { event, .. } if !event.repeat => match event.physical_key {
                PhysicalKey::Code(code) => Some(Self::Key {
                    code,
                    pressed: event.state == ElementState::Pressed,
                }),
                PhysicalKey::Unidentified(_) => None,
            },
            WindowEvent::MouseInput { state, button, .. } => Some(Self::MouseButton {
                left: *button == MouseButton::Left,
                pressed: *state == ElementState::Pressed,
            }),
            WindowEvent::Resized(size) => Some(Self::Resized {
                width: size.width,
                height: size.height,
            }),
            _ => None,
        }
    }

    /// True for key and button releases
    pub fn is_release(&self) -> bool {
        matches!(
            self,
            Self::Key { pressed: false, .. } | Self::MouseButton { pressed: false, .. }
        )
    }

    /// Converts raw mouse motion
    pub fn from_device_event(event: &DeviceEvent) -> Option<Self> {
        match event {
            DeviceEvent::MouseMotion { delta: (dx, dy) } => Some(Self::MouseMotion { dx: *dx, dy: *dy }),
            _ => None,
        }
    }
}

/// Which movement keys are currently held
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementKeys {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl MovementKeys {
    /// Updates the held state of `code`
    ///
    /// # Returns
    /// False if `code` is not a movement key
    pub fn set(&mut self, code: KeyCode, pressed: bool) -> bool {
        let slot = match code {
            KeyCode::KeyW => &mut self.forward,
            KeyCode::KeyS => &mut self.backward,
            KeyCode::KeyA => &mut self.left,
            KeyCode::KeyD => &mut self.right,
            KeyCode::KeyE => &mut self.up,
            KeyCode::KeyQ => &mut self.down,
            _ => return false,
        };
        *slot = pressed;
        true
    }

    /// Camera-local direction as (right, up, front)
    pub fn direction(&self) -> Vector3<f32> {
        let axis = |positive: bool, negative: bool| positive as i32 as f32 - negative as i32 as f32;
        Vector3::new(
            axis(self.right, self.left),
            axis(self.up, self.down),
            axis(self.forward, self.backward),
        )
    }
}

/// Everything the frame loop needs to know about the user's input
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub movement: MovementKeys,
    pub debug_normals: bool,
    pub wireframe: bool,
    pub cursor_captured: bool,
    pub quit_requested: bool,
    /// Set when the cursor grab should change; consumed by the window owner
    pub cursor_grab_changed: bool,
    pub resized: Option<(u32, u32)>,
    mouse_delta: (f64, f64),
}

impl InputState {
    pub fn handle(&mut self, event: InputEvent) {
        match event {
            InputEvent::Key { code, pressed } => {
                if self.movement.set(code, pressed) {
                    return;
                }
                match code {
                    KeyCode::Escape if pressed => self.quit_requested = true,
                    KeyCode::Tab if pressed => self.set_cursor_captured(false),
                    KeyCode::KeyN => self.debug_normals = pressed,
                    KeyCode::KeyZ => self.wireframe = pressed,
                    _ => {}
                }
            }
            InputEvent::MouseButton { left: true, pressed: true } => self.set_cursor_captured(true),
            InputEvent::MouseButton { .. } => {}
            InputEvent::MouseMotion { dx, dy } => {
                self.mouse_delta.0 += dx;
                self.mouse_delta.1 += dy;
            }
            InputEvent::Resized { width, height } => self.resized = Some((width, height)),
        }
    }

    fn set_cursor_captured(&mut self, captured: bool) {
        if self.cursor_captured != captured {
            self.cursor_captured = captured;
            self.cursor_grab_changed = true;
        }
        // Motion gathered while released must not jump the view on capture
        self.mouse_delta = (0.0, 0.0);
    }

    /// Returns and resets the mouse motion gathered since the last call
    pub fn take_mouse_delta(&mut self) -> (f64, f64) {
        std::mem::take(&mut self.mouse_delta)
    }

    pub fn move_direction(&self) -> Vector3<f32> {
        self.movement.direction()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, pressed: bool) -> InputEvent {
        InputEvent::Key { code, pressed }
    }

    #[test]
    fn test_move_direction_axes() {
        let mut input = InputState::default();
        input.handle(key(KeyCode::KeyW, true));
        input.handle(key(KeyCode::KeyA, true));
        input.handle(key(KeyCode::KeyE, true));
        assert_eq!(input.move_direction(), Vector3::new(-1.0, 1.0, 1.0));

        input.handle(key(KeyCode::KeyS, true));
        input.handle(key(KeyCode::KeyA, false));
        assert_eq!(input.move_direction(), Vector3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_hold_toggles() {
        let mut input = InputState::default();
        input.handle(key(KeyCode::KeyN, true));
        input.handle(key(KeyCode::KeyZ, true));
        assert!(input.debug_normals && input.wireframe);
        input.handle(key(KeyCode::KeyN, false));
        input.handle(key(KeyCode::KeyZ, false));
        assert!(!input.debug_normals && !input.wireframe);
    }

    #[test]
    fn test_cursor_capture_and_release() {
        let mut input = InputState::default();
        input.handle(InputEvent::MouseButton { left: true, pressed: true });
        assert!(input.cursor_captured && input.cursor_grab_changed);

        input.cursor_grab_changed = false;
        input.handle(InputEvent::MouseMotion { dx: 3.0, dy: -2.0 });
        input.handle(InputEvent::MouseMotion { dx: 1.0, dy: 0.5 });
        assert_eq!(input.take_mouse_delta(), (4.0, -1.5));
        assert_eq!(input.take_mouse_delta(), (0.0, 0.0));

        input.handle(key(KeyCode::Tab, true));
        assert!(!input.cursor_captured && input.cursor_grab_changed);
    }

    #[test]
    fn test_release_stops_held_movement() {
        let mut input = InputState::default();
        input.handle(key(KeyCode::KeyW, true));
        assert_eq!(input.move_direction(), Vector3::new(0.0, 0.0, 1.0));

        // The overlay may swallow the press of another key, never the release
        assert!(!key(KeyCode::KeyW, true).is_release());
        let release = key(KeyCode::KeyW, false);
        assert!(release.is_release());
        input.handle(release);
        assert_eq!(input.move_direction(), Vector3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_escape_requests_quit() {
        let mut input = InputState::default();
        input.handle(key(KeyCode::Escape, false));
        assert!(!input.quit_requested);
        input.handle(key(KeyCode::Escape, true));
        assert!(input.quit_requested);
    }
}
