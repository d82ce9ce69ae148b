//! # Scene Management Module
//!
//! Meshes and game objects are owned by the [`Scene`] and referenced by
//! index. Objects are either drawn standalone or through a [`Hierarchy`],
//! which composes the transforms of its nodes from the root down.
//!
//! ## Key Components
//!
//! - [`Scene`] - Meshes, objects, hierarchies, water, camera and materials
//! - [`GameObject`] - A named transform with an optional mesh and material
//! - [`Hierarchy`] - Scene graph of objects and object-less joints
//! - [`Mesh`] - Interleaved vertex data and its GPU buffers
//! - [`obj_loader`] - OBJ files through `tobj`

pub mod hierarchy;
pub mod mesh;
pub mod obj_loader;
pub mod object;
pub mod scene;
pub mod vertex;

pub use hierarchy::{chain_indices, DrawCommand, Hierarchy, NodeId};
pub use mesh::{DrawMesh, Mesh, MeshUsage};
pub use object::{GameObject, Transform};
pub use scene::{MeshId, ObjectId, Scene, TextureId};
pub use vertex::VertexLayout;
