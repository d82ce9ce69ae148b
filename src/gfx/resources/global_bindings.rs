//! Global uniform bindings shared by every pipeline (bind group 0)
//!
//! | binding | content |
//! |---------|---------|
//! | 0       | camera matrices ([`CameraUniform`](crate::gfx::camera::CameraUniform)) |
//! | 1       | wave field ([`WaveField`](crate::ocean::WaveField)) |
//! | 2       | per-frame data ([`FrameUniform`]) |

use cgmath::{InnerSpace, Vector3};

use crate::{
    gfx::camera::camera_utils::CameraUBO,
    ocean::{water::WaveUBO, WaveFunction},
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

/// Per-frame values shared by every shader
///
/// MUST match the `FrameUniform` struct in the shaders exactly.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniform {
    /// Direction the light travels, normalized
    pub light_direction: [f32; 4],
    pub camera_position: [f32; 4],
    /// Accumulated seconds
    pub time: f32,
    /// [`WaveFunction`] code
    pub wave_function: u32,
    pub debug_normals: u32,
    /// Non-zero when the water vertex shader should displace vertices
    pub displace_in_shader: u32,
}
// Total: 16 + 16 + 4 * 4 = 48 bytes

impl FrameUniform {
    pub fn new(
        light_direction: Vector3<f32>,
        camera_position: Vector3<f32>,
        time: f32,
        wave_function: WaveFunction,
    ) -> Self {
        let light = light_direction.normalize();
        Self {
            light_direction: [light.x, light.y, light.z, 0.0],
            camera_position: [camera_position.x, camera_position.y, camera_position.z, 1.0],
            time,
            wave_function: wave_function.code(),
            debug_normals: 0,
            displace_in_shader: 1,
        }
    }

    pub fn with_debug_normals(mut self, enabled: bool) -> Self {
        self.debug_normals = enabled as u32;
        self
    }

    pub fn with_shader_displacement(mut self, enabled: bool) -> Self {
        self.displace_in_shader = enabled as u32;
        self
    }
}

impl Default for FrameUniform {
    fn default() -> Self {
        Self::new(
            Vector3::new(0.0, -0.7, 1.0),
            Vector3::new(0.0, 0.0, 0.0),
            0.0,
            WaveFunction::default(),
        )
    }
}

/// Type alias for the frame uniform buffer
pub type FrameUBO = UniformBuffer<FrameUniform>;

/// Manages the layout and bind group of the global uniforms
///
/// The bind group is created once every buffer it references exists, and
/// stays valid for the lifetime of those buffers.
pub struct GlobalBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: Option<wgpu::BindGroup>,
}

impl GlobalBindings {
    /// Creates a new global bindings manager
    ///
    /// Sets up the bind group layout for global uniforms but doesn't
    /// create the actual bind group until `create_bind_group()` is called.
    pub fn new(device: &wgpu::Device) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform()) // Camera
            .next_binding_rendering(binding_types::uniform()) // Waves
            .next_binding_rendering(binding_types::uniform()) // Frame
            .create(device, "Globals Bind Group");

        GlobalBindings {
            bind_group_layout,
            bind_group: None,
        }
    }

    /// Creates the bind group from the three global buffers
    pub fn create_bind_group(
        &mut self,
        device: &wgpu::Device,
        camera: &CameraUBO,
        waves: &WaveUBO,
        frame: &FrameUBO,
    ) {
        self.bind_group = Some(
            BindGroupBuilder::new(&self.bind_group_layout)
                .resource(camera.binding_resource())
                .resource(waves.binding_resource())
                .resource(frame.binding_resource())
                .create(device, "Global Bind Group"),
        );
    }

    /// Returns the bind group layout
    ///
    /// Used when creating render pipelines that need access to global uniforms.
    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    /// Returns the bind group, `None` until `create_bind_group()` ran
    pub fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.bind_group.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_uniform_layout() {
        assert_eq!(std::mem::size_of::<FrameUniform>(), 48);
    }

    #[test]
    fn test_frame_uniform_normalizes_light() {
        let frame = FrameUniform::new(
            Vector3::new(0.0, -3.0, 4.0),
            Vector3::new(1.0, 2.0, 3.0),
            1.5,
            WaveFunction::SteepSine,
        )
        .with_debug_normals(true)
        .with_shader_displacement(false);

        let expected = [0.0, -0.6, 0.8, 0.0];
        for (got, want) in frame.light_direction.iter().zip(expected) {
            assert!((got - want).abs() < 1e-6);
        }
        assert_eq!(frame.camera_position, [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(frame.wave_function, 1);
        assert_eq!(frame.debug_normals, 1);
        assert_eq!(frame.displace_in_shader, 0);
    }
}
