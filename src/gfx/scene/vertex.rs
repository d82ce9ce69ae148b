//! # Vertex Layouts
//!
//! Meshes store interleaved `f32` vertex data in one of two layouts, chosen
//! once from whether texture coordinates are present:
//!
//! | Layout                   | Location 0 | Location 1 | Location 2 | Stride |
//! |--------------------------|------------|------------|------------|--------|
//! | `PositionNormal`         | position   | normal     |            | 24     |
//! | `PositionNormalTexCoord` | position   | normal     | tex coord  | 32     |

use std::mem;

/// A 3D vertex with position and normal data.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3D {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// A 3D vertex with position, normal and texture coordinate.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TexturedVertex3D {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coord: [f32; 2],
}

const POSITION_NORMAL_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

const POSITION_NORMAL_TEX_ATTRIBUTES: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

/// Interleaved attribute layout of a mesh's vertex buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexLayout {
    PositionNormal,
    PositionNormalTexCoord,
}

impl VertexLayout {
    pub fn for_tex_coords(has_tex_coords: bool) -> Self {
        if has_tex_coords {
            Self::PositionNormalTexCoord
        } else {
            Self::PositionNormal
        }
    }

    /// Number of `f32` values per vertex
    pub fn floats_per_vertex(self) -> usize {
        match self {
            Self::PositionNormal => 6,
            Self::PositionNormalTexCoord => 8,
        }
    }

    /// Size in bytes of one vertex
    pub fn stride(self) -> wgpu::BufferAddress {
        match self {
            Self::PositionNormal => mem::size_of::<Vertex3D>() as wgpu::BufferAddress,
            Self::PositionNormalTexCoord => {
                mem::size_of::<TexturedVertex3D>() as wgpu::BufferAddress
            }
        }
    }

    pub fn has_tex_coords(self) -> bool {
        matches!(self, Self::PositionNormalTexCoord)
    }

    /// Returns the vertex buffer layout for wgpu rendering.
    ///
    /// # Returns
    ///
    /// A [`wgpu::VertexBufferLayout`] describing positions at location 0,
    /// normals at location 1 and, for textured meshes, texture coordinates
    /// at location 2.
    pub fn desc(self) -> wgpu::VertexBufferLayout<'static> {
        let attributes: &'static [wgpu::VertexAttribute] = match self {
            Self::PositionNormal => &POSITION_NORMAL_ATTRIBUTES,
            Self::PositionNormalTexCoord => &POSITION_NORMAL_TEX_ATTRIBUTES,
        };
        wgpu::VertexBufferLayout {
            array_stride: self.stride(),
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::PositionNormal => "pn",
            Self::PositionNormalTexCoord => "pnt",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strides_match_vertex_structs() {
        assert_eq!(VertexLayout::PositionNormal.stride(), 24);
        assert_eq!(VertexLayout::PositionNormalTexCoord.stride(), 32);
        for layout in [VertexLayout::PositionNormal, VertexLayout::PositionNormalTexCoord] {
            assert_eq!(layout.floats_per_vertex() * 4, layout.stride() as usize);
        }
    }

    #[test]
    fn test_attribute_offsets() {
        let desc = VertexLayout::PositionNormalTexCoord.desc();
        let offsets: Vec<_> = desc.attributes.iter().map(|a| a.offset).collect();
        let locations: Vec<_> = desc.attributes.iter().map(|a| a.shader_location).collect();
        assert_eq!(offsets, vec![0, 12, 24]);
        assert_eq!(locations, vec![0, 1, 2]);
        assert_eq!(VertexLayout::PositionNormal.desc().attributes.len(), 2);
    }
}
