//! # Procedural Geometry Generation
//!
//! CPU-side geometry produced without model files: the tessellated grid the
//! water surface is built from, and the cube used for the skybox when no
//! cube model is available.
//!
//! ## Usage
//!
//! ```rust
//! use oceansim::gfx::geometry::{generate_cube, generate_grid};
//!
//! let grid = generate_grid(4, 4.0);
//! assert_eq!(grid.vertex_count(), 25);
//!
//! let cube = generate_cube();
//! assert_eq!(cube.triangle_count(), 12);
//! ```

pub mod primitives;

pub use primitives::*;

/// Represents generated geometry data ready for GPU upload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub positions: Vec<[f32; 3]>,
    /// Texture coordinates (u, v)
    pub tex_coords: Vec<[f32; 2]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    /// Create a new empty geometry data structure
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of vertices in this geometry
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Get the number of triangles in this geometry
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}
