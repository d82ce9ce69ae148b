//! WGPU-based rendering engine for the ocean scene
//!
//! Owns the surface, device and every per-frame GPU resource. A frame is a
//! single depth-tested pass: scene objects first, then the water surface,
//! then the skybox, with an optional UI overlay on top.

use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use cgmath::{Matrix4, SquareMatrix};
use wgpu::{Device, TextureFormat};

use crate::gfx::{
    resources::{
        global_bindings::{FrameUBO, FrameUniform, GlobalBindings},
        material::{Material, MaterialLayouts, ShadingModel},
        texture_resource::TextureResource,
    },
    scene::{
        mesh::{DrawMesh, Mesh},
        scene::Scene,
        vertex::VertexLayout,
    },
};
use crate::ocean::water::WATER_MATERIAL;
use crate::time::FrameTime;

use super::object_uniforms::{ObjectBindings, ObjectUniform};
use super::pipeline_manager::{pipeline_key, PipelineConfig, PipelineManager};

/// Background color behind the skybox
pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.72,
    g: 0.84,
    b: 1.06,
    a: 1.0,
};

/// Initial capacity of the per-draw uniform buffer
const INITIAL_DRAW_CAPACITY: usize = 64;

/// One resolved draw of the current frame
struct DrawItem<'a> {
    mesh: &'a Mesh,
    material: &'a Material,
    pipeline: String,
    record: usize,
}

/// Core rendering engine managing GPU resources and draw calls
///
/// The RenderEngine handles all low-level graphics operations including:
/// - Surface and device management
/// - Pipeline creation for every shading model and vertex layout
/// - Depth buffer handling
/// - Frame and per-object uniform updates
/// - UI overlay rendering
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    format: TextureFormat,
    pub pipeline_manager: PipelineManager,
    frame_ubo: FrameUBO,
    global_bindings: GlobalBindings,
    material_layouts: MaterialLayouts,
    object_bindings: ObjectBindings,
    wireframe_supported: bool,
}

impl RenderEngine {
    /// Creates a new render engine for the given window
    ///
    /// Shader programs are read from `shader_dir`. A program that fails to
    /// load is logged and the objects using it are not drawn.
    ///
    /// # Errors
    /// Fails when no adapter or device is available or the surface can't be
    /// created.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        shader_dir: &Path,
        verbose_shaders: bool,
    ) -> anyhow::Result<RenderEngine> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .context("failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to request adapter")?;

        let wireframe_supported = adapter
            .features()
            .contains(wgpu::Features::POLYGON_MODE_LINE);
        if !wireframe_supported {
            log::warn!("adapter has no line polygon mode, wireframe disabled");
        }

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: if wireframe_supported {
                    wgpu::Features::POLYGON_MODE_LINE
                } else {
                    wgpu::Features::empty()
                },
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to request a device")?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or_else(|| anyhow!("surface reports no texture formats"))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");

        let frame_ubo = FrameUBO::new_with_data(&device, &FrameUniform::default());
        let global_bindings = GlobalBindings::new(&device);
        let material_layouts = MaterialLayouts::new(&device);
        let object_bindings = ObjectBindings::new(&device, INITIAL_DRAW_CAPACITY);

        let device_handle: Arc<Device> = device.into();
        let queue_handle: Arc<wgpu::Queue> = queue.into();
        let mut pipeline_manager = PipelineManager::new(device_handle.clone());

        for shading in ShadingModel::ALL {
            let name = shading.shader_name();
            if let Err(err) = pipeline_manager.load_program(shader_dir, name, verbose_shaders) {
                log::warn!("shader program '{}' unavailable, its objects won't be drawn: {}", name, err);
            }
        }

        Self::register_pipelines(
            &mut pipeline_manager,
            format,
            &global_bindings,
            &object_bindings,
            &material_layouts,
            wireframe_supported,
        );
        if let Err(errors) = pipeline_manager.create_all_pipelines() {
            for error in errors {
                log::warn!("{}", error);
            }
        }
        log::info!("render engine ready: {:?}", pipeline_manager.get_stats());

        Ok(RenderEngine {
            surface,
            device: device_handle,
            queue: queue_handle,
            config,
            depth_texture,
            format,
            pipeline_manager,
            frame_ubo,
            global_bindings,
            material_layouts,
            object_bindings,
            wireframe_supported,
        })
    }

    /// Registers one pipeline per shading model and vertex layout
    ///
    /// Textured shading needs texture coordinates so it only gets the
    /// position/normal/uv layout. Water also gets a wireframe variant when
    /// the device supports it.
    fn register_pipelines(
        pipeline_manager: &mut PipelineManager,
        format: TextureFormat,
        global_bindings: &GlobalBindings,
        object_bindings: &ObjectBindings,
        material_layouts: &MaterialLayouts,
        wireframe_supported: bool,
    ) {
        let color_targets = vec![Some(wgpu::ColorTargetState {
            format,
            blend: Some(wgpu::BlendState::REPLACE),
            write_mask: wgpu::ColorWrites::ALL,
        })];

        for shading in ShadingModel::ALL {
            if !pipeline_manager.has_program(shading.shader_name()) {
                continue;
            }

            let layouts = [VertexLayout::PositionNormal, VertexLayout::PositionNormalTexCoord];
            for vertex_layout in layouts {
                if shading == ShadingModel::TexturedPhong && !vertex_layout.has_tex_coords() {
                    continue;
                }

                let mut config = PipelineConfig::default_with_shader(shading.shader_name())
                    .with_vertex_layout(vertex_layout)
                    .with_color_targets(color_targets.clone())
                    .with_bind_group_layouts(vec![
                        global_bindings.bind_group_layout().clone(),
                        object_bindings.bind_group_layout().clone(),
                        material_layouts.for_shading(shading).clone(),
                    ]);
                config = match shading {
                    // Drawn at the far plane from the inside
                    ShadingModel::Skybox => config.with_cull_mode(None).with_depth(
                        TextureResource::DEPTH_FORMAT,
                        false,
                        wgpu::CompareFunction::LessEqual,
                    ),
                    ShadingModel::Water => config.with_cull_mode(None).with_depth(
                        TextureResource::DEPTH_FORMAT,
                        true,
                        wgpu::CompareFunction::Less,
                    ),
                    ShadingModel::Phong | ShadingModel::TexturedPhong => config.with_depth(
                        TextureResource::DEPTH_FORMAT,
                        true,
                        wgpu::CompareFunction::Less,
                    ),
                };

                let key = pipeline_key(shading.shader_name(), vertex_layout, false);
                pipeline_manager.register_pipeline(&key, config.clone().with_label(&key));

                if wireframe_supported && shading == ShadingModel::Water {
                    let key = pipeline_key(shading.shader_name(), vertex_layout, true);
                    pipeline_manager
                        .register_pipeline(&key, config.with_wireframe().with_label(&key));
                }
            }
        }
    }

    /// Creates the scene's GPU resources and the global bind group
    ///
    /// # Errors
    /// Fails if the scene did not create its camera or wave buffers.
    pub fn init_scene(&mut self, scene: &mut Scene) -> anyhow::Result<()> {
        scene.init_gpu_resources(&self.device, &self.queue, &self.material_layouts);

        let camera = scene
            .camera_manager
            .matrices_ubo()
            .ok_or_else(|| anyhow!("camera buffer missing after scene init"))?;
        let waves = scene
            .water
            .waves_ubo()
            .ok_or_else(|| anyhow!("wave buffer missing after scene init"))?;
        self.global_bindings
            .create_bind_group(&self.device, camera, waves, &self.frame_ubo);

        let stats = scene.get_statistics();
        log::info!(
            "scene ready: {} objects, {} meshes, {} materials, {} triangles",
            stats.object_count,
            stats.mesh_count,
            stats.material_count,
            stats.total_triangles
        );
        Ok(())
    }

    /// Writes this frame's uniforms and scene buffers
    pub fn update(&mut self, scene: &mut Scene, frame: FrameTime, debug_normals: bool) {
        let uniform = FrameUniform::new(
            scene.light_direction,
            scene.camera_manager.camera.position,
            frame.time,
            scene.water.wave_function(),
        )
        .with_debug_normals(debug_normals)
        .with_shader_displacement(scene.water.displaces_in_shader());
        self.frame_ubo.update_content(&self.queue, uniform);

        scene.sync_gpu(&self.queue, frame);
    }

    /// Resolves mesh, material and pipeline of everything drawn this frame
    ///
    /// Returns the draws and the matching per-object records, in draw order.
    fn collect_draws<'a>(
        &self,
        scene: &'a Scene,
        wireframe: bool,
    ) -> (Vec<DrawItem<'a>>, Vec<ObjectUniform>) {
        let wireframe = wireframe && self.wireframe_supported;
        let mut items = Vec::new();
        let mut records = Vec::new();

        let mut push = |mesh: &'a Mesh, material: &'a Material, model: Matrix4<f32>, wire: bool| {
            items.push(DrawItem {
                mesh,
                material,
                pipeline: pipeline_key(material.shading.shader_name(), mesh.layout(), wire),
                record: records.len(),
            });
            records.push(ObjectUniform::new(model));
        };

        for draw in scene.build_draw_list() {
            let Some(object) = scene.object(draw.object) else {
                continue;
            };
            let Some(mesh) = object.mesh.and_then(|id| scene.mesh(id)) else {
                continue;
            };
            let Some(material) = scene
                .material_manager
                .get_material_for_object(object.material.as_ref())
            else {
                continue;
            };
            push(mesh, material, draw.model, false);
        }

        let water_material = scene
            .material_manager
            .get_material(WATER_MATERIAL)
            .or_else(|| scene.material_manager.get_default_material());
        if let Some(material) = water_material {
            push(scene.water.mesh(), material, Matrix4::identity(), wireframe);
        }

        if let Some(skybox) = scene.skybox() {
            let object = scene.object(skybox.object);
            let mesh = scene.mesh(skybox.mesh);
            if let (Some(object), Some(mesh)) = (object, mesh) {
                if let Some(material) = scene
                    .material_manager
                    .get_material_for_object(object.material.as_ref())
                {
                    push(mesh, material, object.model_matrix(None), false);
                }
            }
        }

        (items, records)
    }

    /// Renders a frame with an optional UI overlay
    ///
    /// # Errors
    /// Returns the surface error when no frame could be acquired; the
    /// caller reconfigures on `Lost` or `Outdated`.
    pub fn render_frame<F>(
        &mut self,
        scene: &Scene,
        wireframe: bool,
        ui_callback: Option<F>,
    ) -> Result<(), wgpu::SurfaceError>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let surface_texture = self.surface.get_current_texture()?;
        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let (items, records) = self.collect_draws(scene, wireframe);
        self.object_bindings
            .write(&self.device, &self.queue, &records);
        for item in &items {
            self.pipeline_manager.get_pipeline(&item.pipeline);
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(global_bind_group) = self.global_bindings.bind_group() {
                render_pass.set_bind_group(0, global_bind_group, &[]);

                for item in &items {
                    let Some(pipeline) = self.pipeline_manager.pipeline(&item.pipeline) else {
                        continue;
                    };
                    let Some(material_bind_group) = item.material.get_bind_group() else {
                        log::debug!(
                            "skipping '{}': material '{}' has no GPU resources",
                            item.mesh.label(),
                            item.material.name
                        );
                        continue;
                    };

                    render_pass.set_pipeline(pipeline);
                    render_pass.set_bind_group(
                        1,
                        self.object_bindings.bind_group(),
                        &[self.object_bindings.offset(item.record)],
                    );
                    render_pass.set_bind_group(2, material_bind_group, &[]);
                    render_pass.draw_mesh(item.mesh);
                }
            } else {
                log::warn!("render_frame called before init_scene");
            }
        }

        if let Some(ui_callback) = ui_callback {
            ui_callback(
                &self.device,
                &self.queue,
                &mut encoder,
                &surface_texture_view,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    /// Convenience method for rendering with UI
    pub fn render_frame_with_ui<F>(
        &mut self,
        scene: &Scene,
        wireframe: bool,
        ui_callback: F,
    ) -> Result<(), wgpu::SurfaceError>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        self.render_frame(scene, wireframe, Some(ui_callback))
    }

    /// Resizes the surface and recreates the depth buffer
    ///
    /// Zero-sized requests (minimized windows) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    /// Reconfigures the surface at its current size, after it was lost
    pub fn reconfigure(&mut self) {
        self.resize(self.config.width, self.config.height);
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Returns the surface texture format
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn wireframe_supported(&self) -> bool {
        self.wireframe_supported
    }
}
