// src/gfx/resources/mod.rs
//! GPU resource management
//!
//! Handles textures, shader programs, materials and the global bind group.

pub mod global_bindings;
pub mod material;
pub mod shader;
pub mod texture_resource;

// Re-export main types
pub use global_bindings::{FrameUBO, FrameUniform, GlobalBindings};
pub use material::{Material, MaterialId, MaterialManager, ShadingModel};
pub use shader::ShaderProgram;
pub use texture_resource::TextureResource;
