use super::camera_utils::{CameraUniform, OPENGL_TO_WGPU_MATRIX};
use cgmath::*;

/// Free-flying first-person camera with damped acceleration
///
/// Angles are in degrees. Yaw -90 looks down -Z.
#[derive(Debug, Clone, Copy)]
pub struct FlyCamera {
    pub position: Vector3<f32>,
    pub velocity: Vector3<f32>,
    pub yaw: f32,
    pub pitch: f32,
    front: Vector3<f32>,
    right: Vector3<f32>,
    up: Vector3<f32>,
    pub acceleration: f32,
    pub damping: f32,
    pub aspect: f32,
    pub fovy: Deg<f32>,
    pub znear: f32,
    pub zfar: f32,
    view: Matrix4<f32>,
    projection: Matrix4<f32>,
}

pub const MAX_PITCH: f32 = 89.0;

impl FlyCamera {
    pub fn new(position: Vector3<f32>, width: u32, height: u32) -> Self {
        let mut camera = Self {
            position,
            velocity: Vector3::zero(),
            yaw: -90.0,
            pitch: 0.0,
            front: -Vector3::unit_z(),
            right: Vector3::unit_x(),
            up: Vector3::unit_y(),
            acceleration: 0.25,
            damping: 0.95,
            aspect: 1.0,
            fovy: Deg(45.0),
            znear: 0.1,
            zfar: 100.0,
            view: Matrix4::identity(),
            projection: Matrix4::identity(),
        };
        camera.update_camera_vectors();
        camera.update_perspective(width, height);
        camera.update_view();
        camera
    }

    /// Accelerates along a camera-local direction and integrates one step
    ///
    /// `move_direction` is (right, up, front). Velocity is damped on every
    /// call, with or without input.
    pub fn update_position(&mut self, move_direction: Vector3<f32>, delta_time: f32) {
        if move_direction != Vector3::zero() {
            let world = self.right * move_direction.x
                + self.up * move_direction.y
                + self.front * move_direction.z;
            if world.magnitude2() > 0.0 {
                self.velocity += world.normalize() * self.acceleration;
            }
        }

        self.position += self.velocity * delta_time;
        self.velocity *= self.damping;
        self.update_view();
    }

    /// Adds yaw and pitch offsets in degrees, clamping pitch to ±89
    pub fn update_rotation(&mut self, x_offset: f32, y_offset: f32) {
        self.yaw += x_offset;
        self.pitch = (self.pitch + y_offset).clamp(-MAX_PITCH, MAX_PITCH);
        self.update_camera_vectors();
        self.update_view();
    }

    /// Rebuilds the projection for a new screen size
    pub fn update_perspective(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
        self.projection = perspective(self.fovy, self.aspect, self.znear, self.zfar);
    }

    fn update_camera_vectors(&mut self) {
        let (pitch, yaw) = (Rad::from(Deg(self.pitch)), Rad::from(Deg(self.yaw)));
        self.front = Vector3::new(
            pitch.0.cos() * yaw.0.cos(),
            pitch.0.sin(),
            pitch.0.cos() * yaw.0.sin(),
        )
        .normalize();
        self.right = self.front.cross(Vector3::unit_y()).normalize();
        self.up = self.right.cross(self.front);
    }

    fn update_view(&mut self) {
        let eye = Point3::from_vec(self.position);
        self.view = Matrix4::look_at_rh(eye, eye + self.front, self.up);
    }

    pub fn front(&self) -> Vector3<f32> {
        self.front
    }

    pub fn right(&self) -> Vector3<f32> {
        self.right
    }

    pub fn up(&self) -> Vector3<f32> {
        self.up
    }

    pub fn view(&self) -> Matrix4<f32> {
        self.view
    }

    pub fn projection(&self) -> Matrix4<f32> {
        self.projection
    }

    /// GPU image of the camera: wgpu-clip-space projection, then view
    pub fn uniform(&self) -> CameraUniform {
        CameraUniform {
            projection: (OPENGL_TO_WGPU_MATRIX * self.projection).into(),
            view: self.view.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> FlyCamera {
        FlyCamera::new(Vector3::new(0.0, 6.0, 20.0), 640, 480)
    }

    #[test]
    fn test_default_looks_down_negative_z() {
        let cam = camera();
        assert!((cam.front() - Vector3::new(0.0, 0.0, -1.0)).magnitude() < 1e-6);
        assert!((cam.right() - Vector3::unit_x()).magnitude() < 1e-6);
        assert!((cam.up() - Vector3::unit_y()).magnitude() < 1e-6);
    }

    #[test]
    fn test_pitch_clamps_exactly() {
        let mut cam = camera();
        for _ in 0..5 {
            cam.update_rotation(0.0, 1000.0);
            assert_eq!(cam.pitch, 89.0);
        }
        cam.update_rotation(0.0, -5000.0);
        assert_eq!(cam.pitch, -89.0);
    }

    #[test]
    fn test_velocity_decays_without_input() {
        let mut cam = camera();
        cam.update_position(Vector3::new(0.0, 0.0, 1.0), 0.016);
        let mut previous = cam.velocity.magnitude();
        assert!(previous > 0.0);
        for _ in 0..10 {
            cam.update_position(Vector3::zero(), 0.016);
            let current = cam.velocity.magnitude();
            assert!(current < previous);
            assert!((current - previous * 0.95).abs() < 1e-6);
            previous = current;
        }
    }

    #[test]
    fn test_forward_input_moves_along_front() {
        let mut cam = camera();
        let start = cam.position;
        cam.update_position(Vector3::new(0.0, 0.0, 1.0), 1.0);
        let moved = cam.position - start;
        assert!(moved.z < 0.0);
        assert!(moved.x.abs() < 1e-6 && moved.y.abs() < 1e-6);
    }

    #[test]
    fn test_basis_stays_orthonormal() {
        let mut cam = camera();
        cam.update_rotation(37.0, -15.0);
        assert!(cam.front().dot(cam.right()).abs() < 1e-5);
        assert!(cam.front().dot(cam.up()).abs() < 1e-5);
        assert!((cam.up().magnitude() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_uniform_layout() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 128);
        let cam = camera();
        let uniform = cam.uniform();
        let view: [[f32; 4]; 4] = cam.view().into();
        assert_eq!(uniform.view, view);
    }
}
