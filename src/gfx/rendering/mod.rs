//! Core rendering functionality
//!
//! Handles render pipelines, per-object uniforms and frame rendering.

pub mod object_uniforms;
pub mod pipeline_manager;
pub mod render_engine;

pub use object_uniforms::{ObjectBindings, ObjectUniform};
pub use pipeline_manager::{PipelineConfig, PipelineManager, PipelineStats};
pub use render_engine::RenderEngine;
