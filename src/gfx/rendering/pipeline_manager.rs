//! Render pipeline management for wgpu
//!
//! Pipelines are registered as configurations and created lazily the first
//! time they are requested. Shader programs are loaded from disk once and
//! shared by every pipeline that names them.

use std::{collections::HashMap, path::Path, sync::Arc};
use wgpu::*;

use crate::error::ShaderError;
use crate::gfx::resources::shader::ShaderProgram;
use crate::gfx::scene::vertex::VertexLayout;

/// Depth state of a pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthConfig {
    pub format: TextureFormat,
    pub write: bool,
    pub compare: CompareFunction,
}

/// Configuration for creating a render pipeline
///
/// Defines all parameters needed to create a wgpu render pipeline,
/// including shaders, bind group layouts, and render state.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub label: String,
    /// Name of the shader program
    pub shader: String,
    pub bind_group_layouts: Vec<BindGroupLayout>,
    pub vertex_layout: VertexLayout,
    pub primitive_topology: PrimitiveTopology,
    pub cull_mode: Option<Face>,
    pub polygon_mode: PolygonMode,
    pub depth: Option<DepthConfig>,
    pub color_targets: Vec<Option<ColorTargetState>>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            label: "Default Pipeline".to_string(),
            shader: "simple".to_string(),
            bind_group_layouts: Vec::new(),
            vertex_layout: VertexLayout::PositionNormal,
            primitive_topology: PrimitiveTopology::TriangleList,
            cull_mode: Some(Face::Back),
            polygon_mode: PolygonMode::Fill,
            depth: None,
            color_targets: vec![Some(ColorTargetState {
                format: TextureFormat::Bgra8Unorm,
                blend: Some(BlendState::REPLACE),
                write_mask: ColorWrites::ALL,
            })],
        }
    }
}

impl PipelineConfig {
    /// Creates a new config with a specific shader program
    pub fn default_with_shader(shader: &str) -> Self {
        Self {
            shader: shader.to_string(),
            ..Default::default()
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_owned();
        self
    }

    pub fn with_cull_mode(mut self, face: Option<Face>) -> Self {
        self.cull_mode = face;
        self
    }

    pub fn with_shader(mut self, shader: &str) -> Self {
        self.shader = shader.to_string();
        self
    }

    pub fn with_bind_group_layouts(mut self, layouts: Vec<BindGroupLayout>) -> Self {
        self.bind_group_layouts = layouts;
        self
    }

    pub fn with_vertex_layout(mut self, layout: VertexLayout) -> Self {
        self.vertex_layout = layout;
        self
    }

    /// Enables depth testing against a buffer of `format` (builder pattern)
    pub fn with_depth(mut self, format: TextureFormat, write: bool, compare: CompareFunction) -> Self {
        self.depth = Some(DepthConfig {
            format,
            write,
            compare,
        });
        self
    }

    pub fn with_color_targets(mut self, targets: Vec<Option<ColorTargetState>>) -> Self {
        self.color_targets = targets;
        self
    }

    pub fn with_primitive_topology(mut self, topology: PrimitiveTopology) -> Self {
        self.primitive_topology = topology;
        self
    }

    /// Rasterizes triangle edges only; needs `Features::POLYGON_MODE_LINE`
    pub fn with_wireframe(mut self) -> Self {
        self.polygon_mode = PolygonMode::Line;
        self
    }
}

/// Name under which the pipeline for a shader and vertex layout is registered
pub fn pipeline_key(shader: &str, layout: VertexLayout, wireframe: bool) -> String {
    if wireframe {
        format!("{}_{}_wire", shader, layout.name())
    } else {
        format!("{}_{}", shader, layout.name())
    }
}

/// Manages render pipelines with caching and lazy creation
///
/// - Lazy pipeline creation (only created when first requested)
/// - Shader programs loaded once from a directory
/// - Pipelines whose creation failed are remembered and not retried
pub struct PipelineManager {
    device: Arc<Device>,
    pipelines: HashMap<String, RenderPipeline>,
    pipeline_configs: HashMap<String, PipelineConfig>,
    programs: HashMap<String, ShaderProgram>,
    pending_pipelines: Vec<String>,
    failed_pipelines: Vec<String>,
}

impl PipelineManager {
    pub fn new(device: Arc<Device>) -> Self {
        Self {
            device,
            pipelines: HashMap::new(),
            pipeline_configs: HashMap::new(),
            programs: HashMap::new(),
            pending_pipelines: Vec::new(),
            failed_pipelines: Vec::new(),
        }
    }

    /// Registers a pipeline configuration without creating it
    ///
    /// Pipelines are created lazily when first requested via `get_pipeline()`.
    pub fn register_pipeline(&mut self, name: &str, config: PipelineConfig) {
        self.pipeline_configs.insert(name.to_string(), config);
        self.pending_pipelines.push(name.to_string());
    }

    /// Loads and compiles the program `name` from `dir`
    ///
    /// On failure the previous program of that name, if any, is kept.
    pub fn load_program(&mut self, dir: &Path, name: &str, verbose: bool) -> Result<(), ShaderError> {
        let program = ShaderProgram::load(&self.device, dir, name, verbose)?;
        self.programs.insert(name.to_string(), program);
        Ok(())
    }

    pub fn has_program(&self, name: &str) -> bool {
        self.programs.contains_key(name)
    }

    /// Gets or creates a pipeline (lazy loading)
    ///
    /// Returns `None` if the pipeline isn't registered or its creation failed.
    pub fn get_pipeline(&mut self, name: &str) -> Option<&RenderPipeline> {
        if self.pipelines.contains_key(name) {
            return self.pipelines.get(name);
        }
        if self.failed_pipelines.iter().any(|n| n == name) {
            return None;
        }

        let config = self.pipeline_configs.get(name)?.clone();
        self.pending_pipelines.retain(|n| n != name);
        match self.create_pipeline_from_config(name, &config) {
            Ok(pipeline) => {
                self.pipelines.insert(name.to_string(), pipeline);
                self.pipelines.get(name)
            }
            Err(e) => {
                log::error!("failed to create pipeline '{}': {}", name, e);
                self.failed_pipelines.push(name.to_string());
                None
            }
        }
    }

    /// Returns an already created pipeline
    pub fn pipeline(&self, name: &str) -> Option<&RenderPipeline> {
        self.pipelines.get(name)
    }

    /// Creates all pending pipelines immediately
    ///
    /// # Returns
    /// Result with the error messages of every pipeline that failed
    pub fn create_all_pipelines(&mut self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        let pending = std::mem::take(&mut self.pending_pipelines);

        for name in pending {
            let Some(config) = self.pipeline_configs.get(&name).cloned() else {
                continue;
            };
            match self.create_pipeline_from_config(&name, &config) {
                Ok(pipeline) => {
                    self.pipelines.insert(name, pipeline);
                }
                Err(e) => {
                    errors.push(format!("pipeline '{}': {}", name, e));
                    self.failed_pipelines.push(name);
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Creates a render pipeline from configuration
    ///
    /// Validation errors are caught with an error scope and returned.
    fn create_pipeline_from_config(
        &self,
        name: &str,
        config: &PipelineConfig,
    ) -> Result<RenderPipeline, String> {
        let program = self
            .programs
            .get(&config.shader)
            .ok_or_else(|| format!("shader program '{}' not loaded", config.shader))?;

        self.device.push_error_scope(ErrorFilter::Validation);

        let bind_group_layout_refs: Vec<&BindGroupLayout> =
            config.bind_group_layouts.iter().collect();
        let pipeline_layout = self
            .device
            .create_pipeline_layout(&PipelineLayoutDescriptor {
                label: Some(&format!("{} Layout", name)),
                bind_group_layouts: &bind_group_layout_refs,
                push_constant_ranges: &[],
            });

        let depth_stencil = config.depth.map(|depth| DepthStencilState {
            format: depth.format,
            depth_write_enabled: depth.write,
            depth_compare: depth.compare,
            stencil: StencilState::default(),
            bias: DepthBiasState::default(),
        });

        let pipeline = self
            .device
            .create_render_pipeline(&RenderPipelineDescriptor {
                label: Some(&config.label),
                layout: Some(&pipeline_layout),
                vertex: VertexState {
                    module: &program.vertex,
                    entry_point: Some("vs_main"),
                    buffers: &[config.vertex_layout.desc()],
                    compilation_options: PipelineCompilationOptions::default(),
                },
                fragment: Some(FragmentState {
                    module: &program.fragment,
                    entry_point: Some("fs_main"),
                    targets: &config.color_targets,
                    compilation_options: PipelineCompilationOptions::default(),
                }),
                primitive: PrimitiveState {
                    topology: config.primitive_topology,
                    strip_index_format: None,
                    front_face: FrontFace::Ccw,
                    cull_mode: config.cull_mode,
                    polygon_mode: config.polygon_mode,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil,
                multisample: MultisampleState::default(),
                multiview: None,
                cache: None,
            });

        match pollster::block_on(self.device.pop_error_scope()) {
            None => Ok(pipeline),
            Some(error) => Err(error.to_string()),
        }
    }

    /// Returns pipeline manager statistics
    pub fn get_stats(&self) -> PipelineStats {
        PipelineStats {
            total_pipelines: self.pipelines.len(),
            pending_pipelines: self.pending_pipelines.len(),
            failed_pipelines: self.failed_pipelines.len(),
            loaded_programs: self.programs.len(),
        }
    }

    /// Lists all registered pipeline names
    pub fn list_pipelines(&self) -> Vec<&String> {
        self.pipeline_configs.keys().collect()
    }

    /// True if a pipeline config exists (created or pending)
    pub fn has_pipeline(&self, name: &str) -> bool {
        self.pipeline_configs.contains_key(name)
    }
}

/// Statistics about pipeline manager state
#[derive(Debug)]
pub struct PipelineStats {
    pub total_pipelines: usize,
    pub pending_pipelines: usize,
    pub failed_pipelines: usize,
    pub loaded_programs: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_keys() {
        assert_eq!(pipeline_key("water", VertexLayout::PositionNormalTexCoord, false), "water_pnt");
        assert_eq!(pipeline_key("water", VertexLayout::PositionNormal, true), "water_pn_wire");
    }

    #[test]
    fn test_config_builder() {
        let config = PipelineConfig::default_with_shader("cubemap")
            .with_cull_mode(None)
            .with_depth(TextureFormat::Depth32Float, true, CompareFunction::LessEqual)
            .with_wireframe();
        assert_eq!(config.shader, "cubemap");
        assert_eq!(config.cull_mode, None);
        assert_eq!(config.polygon_mode, PolygonMode::Line);
        assert_eq!(
            config.depth.map(|d| d.compare),
            Some(CompareFunction::LessEqual)
        );
    }
}
