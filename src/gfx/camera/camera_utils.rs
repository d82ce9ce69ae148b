use cgmath::{Matrix4, SquareMatrix};

use super::{camera_controller::CameraController, fly_camera::FlyCamera};
use crate::input::InputState;
use crate::wgpu_utils::uniform_buffer::UniformBuffer;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

pub type CameraUBO = UniformBuffer<CameraUniform>;

pub struct CameraManager {
    pub camera: FlyCamera,
    pub controller: CameraController,
    matrices_ubo: Option<CameraUBO>,
}

impl CameraManager {
    pub fn new(camera: FlyCamera, controller: CameraController) -> Self {
        Self {
            camera,
            controller,
            matrices_ubo: None,
        }
    }

    /// Applies this frame's input to the camera
    pub fn update(&mut self, input: &mut InputState, delta_time: f32) {
        self.controller.update_camera(&mut self.camera, input, delta_time);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.update_perspective(width, height);
    }

    /// Allocates the matrices uniform buffer (binding 0 of the global group)
    pub fn setup_matrices_ubo(&mut self, device: &wgpu::Device) {
        if self.matrices_ubo.is_none() {
            self.matrices_ubo = Some(CameraUBO::new_with_data(device, &self.camera.uniform()));
        }
    }

    /// Uploads projection and view if they changed since the last upload
    ///
    /// # Returns
    /// True if a write was queued
    pub fn sync(&mut self, queue: &wgpu::Queue) -> bool {
        let uniform = self.camera.uniform();
        self.matrices_ubo
            .as_mut()
            .is_some_and(|ubo| ubo.update_content(queue, uniform))
    }

    pub fn matrices_ubo(&self) -> Option<&CameraUBO> {
        self.matrices_ubo.as_ref()
    }
}

/// Camera matrices as seen by shaders
///
/// Projection sits at offset 0 and view at offset 64.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug, PartialEq)]
pub struct CameraUniform {
    pub projection: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self {
            projection: Matrix4::identity().into(),
            view: Matrix4::identity().into(),
        }
    }
}
