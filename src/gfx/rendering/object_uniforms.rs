//! Per-draw model matrices (bind group 1)
//!
//! Every draw of a frame gets one [`ObjectUniform`] record in a single
//! dynamic uniform buffer. Draws select their record with a dynamic offset
//! so the bind group is shared by the whole frame.

use cgmath::{Matrix, Matrix4, SquareMatrix};

use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
    binding_types,
    uniform_buffer::DynamicUniformBuffer,
};

/// Model matrix and the matrix that carries normals to world space
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
}

impl ObjectUniform {
    /// Builds the record for `model`
    ///
    /// The normal matrix is the inverse transpose of the model matrix, or
    /// the model matrix itself when it is singular.
    pub fn new(model: Matrix4<f32>) -> Self {
        let normal = model
            .invert()
            .map(|inverse| inverse.transpose())
            .unwrap_or(model);
        Self {
            model: model.into(),
            normal: normal.into(),
        }
    }
}

pub struct ObjectBindings {
    layout: BindGroupLayoutWithDesc,
    buffer: DynamicUniformBuffer<ObjectUniform>,
    bind_group: wgpu::BindGroup,
}

impl ObjectBindings {
    pub fn new(device: &wgpu::Device, capacity: usize) -> Self {
        let element_size = DynamicUniformBuffer::<ObjectUniform>::element_size();
        let layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform_dynamic(element_size))
            .create(device, "Object Bind Group");
        let buffer = DynamicUniformBuffer::new(device, capacity);
        let bind_group = Self::create_bind_group(device, &layout, &buffer);

        Self {
            layout,
            buffer,
            bind_group,
        }
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &BindGroupLayoutWithDesc,
        buffer: &DynamicUniformBuffer<ObjectUniform>,
    ) -> wgpu::BindGroup {
        BindGroupBuilder::new(layout)
            .buffer_element(
                buffer.buffer(),
                DynamicUniformBuffer::<ObjectUniform>::element_size(),
            )
            .create(device, "Object Bind Group")
    }

    /// Uploads this frame's records, rebuilding the bind group on growth
    pub fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, records: &[ObjectUniform]) {
        if self.buffer.write(device, queue, records) {
            log::debug!("object uniforms grew to {} records", self.buffer.capacity());
            self.bind_group = Self::create_bind_group(device, &self.layout, &self.buffer);
        }
    }

    pub fn offset(&self, index: usize) -> wgpu::DynamicOffset {
        self.buffer.offset(index)
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    #[test]
    fn test_record_size() {
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 128);
    }

    #[test]
    fn test_normal_matrix_undoes_nonuniform_scale() {
        let model = Matrix4::from_nonuniform_scale(2.0, 4.0, 1.0);
        let uniform = ObjectUniform::new(model);
        assert_eq!(uniform.normal[0][0], 0.5);
        assert_eq!(uniform.normal[1][1], 0.25);
        assert_eq!(uniform.normal[2][2], 1.0);
    }

    #[test]
    fn test_translation_leaves_normals_alone() {
        let model = Matrix4::from_translation(Vector3::new(3.0, -2.0, 1.0));
        let uniform = ObjectUniform::new(model);
        let normal = Matrix4::from(uniform.normal);
        let n = normal * cgmath::Vector4::new(0.0, 1.0, 0.0, 0.0);
        // Shaders only read xyz; w picks up the inverted translation
        assert_eq!(n.truncate(), Vector3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_singular_model_falls_back() {
        let model = Matrix4::from_scale(0.0);
        assert_eq!(ObjectUniform::new(model).normal, ObjectUniform::new(model).model);
    }
}
