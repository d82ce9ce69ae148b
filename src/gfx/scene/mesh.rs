//! # Mesh
//!
//! Interleaved vertex data plus a triangle index list, mirrored into GPU
//! buffers on upload. The attribute layout and the static/dynamic usage hint
//! are fixed when the attributes are first set; dynamic meshes can later have
//! their positions and normals rewritten in place.

use cgmath::{Point3, Vector3};
use wgpu::util::DeviceExt;

use super::vertex::VertexLayout;

/// How often a mesh's vertex data changes after upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeshUsage {
    #[default]
    Static,
    /// Vertex buffer is writable after creation
    Dynamic,
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl BBox {
    /// Bounds of a point set, or a zero box at the origin when empty
    pub fn from_positions(positions: &[[f32; 3]]) -> Self {
        let Some(first) = positions.first() else {
            return Self {
                min: Point3::new(0.0, 0.0, 0.0),
                max: Point3::new(0.0, 0.0, 0.0),
            };
        };

        let mut min = *first;
        let mut max = *first;
        for p in positions {
            for axis in 0..3 {
                min[axis] = min[axis].min(p[axis]);
                max[axis] = max[axis].max(p[axis]);
            }
        }
        Self {
            min: min.into(),
            max: max.into(),
        }
    }

    pub fn center(&self) -> Point3<f32> {
        Point3::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
            (self.min.z + self.max.z) * 0.5,
        )
    }

    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }
}

/// Interleaves attributes into a flat `f32` array
///
/// With texture coordinates present, vertices past the end of `tex_coords`
/// get `[0, 0]`.
///
/// # Panics
/// Panics if `positions` and `normals` differ in length
pub fn interleave(
    positions: &[[f32; 3]],
    normals: &[[f32; 3]],
    tex_coords: Option<&[[f32; 2]]>,
) -> (VertexLayout, Vec<f32>) {
    assert_eq!(
        positions.len(),
        normals.len(),
        "every vertex needs exactly one normal"
    );

    let layout = VertexLayout::for_tex_coords(tex_coords.is_some());
    let mut data = Vec::with_capacity(positions.len() * layout.floats_per_vertex());

    for (i, (position, normal)) in positions.iter().zip(normals).enumerate() {
        data.extend_from_slice(position);
        data.extend_from_slice(normal);
        if let Some(tex_coords) = tex_coords {
            data.extend_from_slice(tex_coords.get(i).unwrap_or(&[0.0, 0.0]));
        }
    }

    (layout, data)
}

/// A drawable triangle mesh and its GPU buffers
pub struct Mesh {
    label: String,
    usage: MeshUsage,
    layout: VertexLayout,
    vertex_data: Vec<f32>,
    indices: Vec<u32>,
    bbox: BBox,
    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
    index_count: u32,
}

impl Mesh {
    pub fn new(label: &str, usage: MeshUsage) -> Self {
        Self {
            label: label.to_string(),
            usage,
            layout: VertexLayout::PositionNormal,
            vertex_data: Vec::new(),
            indices: Vec::new(),
            bbox: BBox::from_positions(&[]),
            vertex_buffer: None,
            index_buffer: None,
            index_count: 0,
        }
    }

    /// Stores interleaved attributes and indices on the CPU
    ///
    /// Replaces any previous contents and drops stale GPU buffers.
    ///
    /// # Arguments
    /// * `positions` - One position per vertex
    /// * `normals` - One normal per vertex, same length as `positions`
    /// * `tex_coords` - Optional texture coordinates; missing trailing entries
    ///   are zero-filled with a warning
    /// * `indices` - Triangle list indices
    pub fn set_attributes(
        &mut self,
        positions: &[[f32; 3]],
        normals: &[[f32; 3]],
        tex_coords: Option<&[[f32; 2]]>,
        indices: &[u32],
    ) {
        if let Some(tex_coords) = tex_coords {
            if tex_coords.len() < positions.len() {
                log::warn!(
                    "mesh '{}': {} texture coordinates for {} vertices, padding with zeros",
                    self.label,
                    tex_coords.len(),
                    positions.len()
                );
            }
        }

        let (layout, vertex_data) = interleave(positions, normals, tex_coords);
        self.layout = layout;
        self.vertex_data = vertex_data;
        self.indices = indices.to_vec();
        self.index_count = indices.len() as u32;
        self.bbox = Self::generate_bbox(positions);
        self.vertex_buffer = None;
        self.index_buffer = None;
    }

    /// Creates GPU buffers from the stored attributes
    pub fn upload(&mut self, device: &wgpu::Device) {
        let vertex_usage = match self.usage {
            MeshUsage::Static => wgpu::BufferUsages::VERTEX,
            MeshUsage::Dynamic => wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        };

        self.vertex_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", self.label)),
            contents: bytemuck::cast_slice(&self.vertex_data),
            usage: vertex_usage,
        }));
        self.index_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", self.label)),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        }));

        log::debug!(
            "uploaded mesh '{}': {} vertices, {} indices ({})",
            self.label,
            self.vertex_count(),
            self.index_count,
            self.layout.name()
        );
    }

    /// Sets the attributes and uploads them in one step
    pub fn setup_buffers(
        &mut self,
        device: &wgpu::Device,
        positions: &[[f32; 3]],
        normals: &[[f32; 3]],
        tex_coords: Option<&[[f32; 2]]>,
        indices: &[u32],
    ) {
        self.set_attributes(positions, normals, tex_coords, indices);
        self.upload(device);
    }

    /// Rewrites positions and normals of every vertex on the CPU
    ///
    /// Texture coordinates and indices are left untouched.
    ///
    /// # Panics
    /// Panics if the mesh is static or the vertex count would change
    pub fn write_positions_normals(&mut self, positions: &[[f32; 3]], normals: &[[f32; 3]]) {
        assert_eq!(
            self.usage,
            MeshUsage::Dynamic,
            "mesh '{}' is static",
            self.label
        );
        assert_eq!(positions.len(), self.vertex_count(), "vertex count changed");
        assert_eq!(normals.len(), self.vertex_count(), "vertex count changed");

        let stride = self.layout.floats_per_vertex();
        for ((vertex, position), normal) in self
            .vertex_data
            .chunks_exact_mut(stride)
            .zip(positions)
            .zip(normals)
        {
            vertex[0..3].copy_from_slice(position);
            vertex[3..6].copy_from_slice(normal);
        }
        self.bbox = Self::generate_bbox(positions);
    }

    /// Rewrites positions and normals and pushes them to the vertex buffer
    ///
    /// The index buffer is never touched. Before upload only the CPU copy
    /// changes.
    pub fn update_buffers(
        &mut self,
        queue: &wgpu::Queue,
        positions: &[[f32; 3]],
        normals: &[[f32; 3]],
    ) {
        self.write_positions_normals(positions, normals);
        if let Some(buffer) = &self.vertex_buffer {
            queue.write_buffer(buffer, 0, bytemuck::cast_slice(&self.vertex_data));
        }
    }

    pub fn generate_bbox(positions: &[[f32; 3]]) -> BBox {
        BBox::from_positions(positions)
    }

    pub fn bbox(&self) -> BBox {
        self.bbox
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn usage(&self) -> MeshUsage {
        self.usage
    }

    pub fn layout(&self) -> VertexLayout {
        self.layout
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_data.len() / self.layout.floats_per_vertex()
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn vertex_data(&self) -> &[f32] {
        &self.vertex_data
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn is_uploaded(&self) -> bool {
        self.vertex_buffer.is_some() && self.index_buffer.is_some()
    }

    /// True once uploaded with at least one triangle
    pub fn is_drawable(&self) -> bool {
        self.is_uploaded() && self.index_count > 0 && self.vertex_count() > 0
    }
}

/// Render pass extension for issuing indexed mesh draws
pub trait DrawMesh {
    /// Draws the whole index list of `mesh` as triangles
    ///
    /// Meshes that were never uploaded or have no triangles are skipped.
    fn draw_mesh(&mut self, mesh: &Mesh);
}

impl DrawMesh for wgpu::RenderPass<'_> {
    fn draw_mesh(&mut self, mesh: &Mesh) {
        let (Some(vertex_buffer), Some(index_buffer)) = (&mesh.vertex_buffer, &mesh.index_buffer)
        else {
            log::warn!("mesh '{}' drawn before upload, skipping", mesh.label);
            return;
        };
        if !mesh.is_drawable() {
            log::debug!("mesh '{}' has no triangles, skipping", mesh.label);
            return;
        }

        self.set_vertex_buffer(0, vertex_buffer.slice(..));
        self.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.index_count, 0, 0..1);
    }
}
