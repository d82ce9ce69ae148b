use super::fly_camera::FlyCamera;
use crate::input::InputState;

/// Feeds accumulated input into a [`FlyCamera`] once per frame
pub struct CameraController {
    /// Degrees of rotation per pixel of mouse motion
    pub sensitivity: f32,
}

impl Default for CameraController {
    fn default() -> Self {
        Self { sensitivity: 0.05 }
    }
}

impl CameraController {
    pub fn new(sensitivity: f32) -> Self {
        Self { sensitivity }
    }

    /// Rotates by the mouse motion gathered since the last frame, then moves
    ///
    /// Mouse motion only counts while the cursor is captured. Screen y grows
    /// downwards so it is negated before becoming pitch.
    pub fn update_camera(&self, camera: &mut FlyCamera, input: &mut InputState, delta_time: f32) {
        let (dx, dy) = input.take_mouse_delta();
        if input.cursor_captured && (dx != 0.0 || dy != 0.0) {
            camera.update_rotation(dx as f32 * self.sensitivity, -dy as f32 * self.sensitivity);
        }
        camera.update_position(input.move_direction(), delta_time);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputEvent;
    use cgmath::{InnerSpace, Vector3};
    use winit::keyboard::KeyCode;

    #[test]
    fn test_mouse_ignored_until_captured() {
        let controller = CameraController::default();
        let mut camera = FlyCamera::new(Vector3::new(0.0, 0.0, 0.0), 640, 480);
        let mut input = InputState::default();

        input.handle(InputEvent::MouseMotion { dx: 100.0, dy: 0.0 });
        controller.update_camera(&mut camera, &mut input, 0.016);
        assert_eq!(camera.yaw, -90.0);

        input.handle(InputEvent::MouseButton { left: true, pressed: true });
        input.handle(InputEvent::MouseMotion { dx: 100.0, dy: 20.0 });
        controller.update_camera(&mut camera, &mut input, 0.016);
        assert!((camera.yaw - (-85.0)).abs() < 1e-5);
        assert!((camera.pitch - (-1.0)).abs() < 1e-5);
    }

    #[test]
    fn test_held_key_accelerates() {
        let controller = CameraController::default();
        let mut camera = FlyCamera::new(Vector3::new(0.0, 0.0, 0.0), 640, 480);
        let mut input = InputState::default();

        input.handle(InputEvent::Key { code: KeyCode::KeyW, pressed: true });
        controller.update_camera(&mut camera, &mut input, 0.016);
        controller.update_camera(&mut camera, &mut input, 0.016);
        assert!(camera.velocity.magnitude() > 0.25);
        assert!(camera.velocity.z < 0.0);
    }
}
