//! # Graphics Module
//!
//! Everything between the ocean simulation and the screen.
//!
//! - **Camera** ([`camera`]) - Free-flying camera with damped movement
//! - **Geometry** ([`geometry`]) - Procedural cube and grid meshes
//! - **Rendering** ([`rendering`]) - Pipelines, per-object uniforms and the frame loop
//! - **Scene** ([`scene`]) - Meshes, game objects, hierarchies and floating objects
//! - **Resources** ([`resources`]) - Materials, textures, shaders and global uniforms
//!
//! ```no_run
//! use oceansim::gfx::{RenderEngine, scene::Scene};
//!
//! // The render engine is created by the app once the window exists
//! // let render_engine = RenderEngine::new(window, width, height, shader_dir, false).await?;
//! ```

pub mod camera;
pub mod geometry;
pub mod rendering;
pub mod resources;
pub mod scene;

pub use camera::FlyCamera;
pub use rendering::render_engine::RenderEngine;
