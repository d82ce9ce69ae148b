//! Material system for Phong-style shading
//!
//! Materials are stored in [`MaterialManager`] and objects reference them by
//! ID. Each material picks a [`ShadingModel`], which decides the shader
//! program, the bind group layout and the textures it samples.

use std::collections::HashMap;
use wgpu::Device;

use super::texture_resource::TextureResource;
use crate::gfx::scene::scene::TextureId;
use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
    binding_types,
    uniform_buffer::UniformBuffer,
};

/// Material ID for referencing materials
pub type MaterialId = String;

/// How a material is shaded, one shader program per model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShadingModel {
    /// Per-fragment Phong with constant colors
    Phong,
    /// Phong with diffuse and specular maps
    TexturedPhong,
    /// Wave-displaced surface reflecting the environment
    Water,
    /// Environment cube drawn behind everything
    Skybox,
}

impl ShadingModel {
    pub const ALL: [ShadingModel; 4] = [
        Self::Phong,
        Self::TexturedPhong,
        Self::Water,
        Self::Skybox,
    ];

    /// Stem of the shader files under `shaders/`
    pub fn shader_name(self) -> &'static str {
        match self {
            Self::Phong => "simple",
            Self::TexturedPhong => "texture",
            Self::Water => "water",
            Self::Skybox => "cubemap",
        }
    }
}

/// GPU uniform data for materials
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    /// Specular color, shininess in `w`
    pub specular: [f32; 4],
}

type MaterialUBO = UniformBuffer<MaterialUniform>;

/// Bind group layouts (group 2) for every shading model
pub struct MaterialLayouts {
    phong: BindGroupLayoutWithDesc,
    textured: BindGroupLayoutWithDesc,
    environment: BindGroupLayoutWithDesc,
}

impl MaterialLayouts {
    pub fn new(device: &Device) -> Self {
        let phong = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::uniform())
            .create(device, "Phong Material Bind Group");

        let textured = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::uniform())
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .create(device, "Textured Material Bind Group");

        let environment = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::uniform())
            .next_binding_fragment(binding_types::texture_cube())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .create(device, "Environment Material Bind Group");

        Self {
            phong,
            textured,
            environment,
        }
    }

    fn for_shading_desc(&self, shading: ShadingModel) -> &BindGroupLayoutWithDesc {
        match shading {
            ShadingModel::Phong => &self.phong,
            ShadingModel::TexturedPhong => &self.textured,
            ShadingModel::Water | ShadingModel::Skybox => &self.environment,
        }
    }

    pub fn for_shading(&self, shading: ShadingModel) -> &wgpu::BindGroupLayout {
        &self.for_shading_desc(shading).layout
    }
}

/// Textures a material may reference when its bind group is built
pub struct MaterialTextures<'a> {
    pub textures: &'a [TextureResource],
    /// Used for missing or unloaded 2D textures
    pub fallback: &'a TextureResource,
    /// Cubemap sampled by water and skybox materials
    pub environment: &'a TextureResource,
}

impl MaterialTextures<'_> {
    fn resolve(&self, id: Option<TextureId>) -> &TextureResource {
        id.and_then(|id| self.textures.get(id.0))
            .unwrap_or(self.fallback)
    }
}

/// Material definition with Phong properties
///
/// Contains material properties and GPU resources. Materials are stored
/// centrally in MaterialManager and shared between objects.
pub struct Material {
    pub name: String,
    pub shading: ShadingModel,
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub shininess: f32,
    pub diffuse_texture: Option<TextureId>,
    pub specular_texture: Option<TextureId>,

    // GPU resources - shared by all objects using this material
    material_ubo: Option<MaterialUBO>,
    bind_group: Option<wgpu::BindGroup>,
}

impl Default for Material {
    fn default() -> Self {
        Self::new("default", ShadingModel::Phong)
    }
}

impl Material {
    pub fn new(name: &str, shading: ShadingModel) -> Self {
        Self {
            name: name.to_string(),
            shading,
            ambient: [0.1, 0.1, 0.2],
            diffuse: [0.8, 0.8, 0.8],
            specular: [0.5, 0.5, 0.5],
            shininess: 32.0,
            diffuse_texture: None,
            specular_texture: None,
            material_ubo: None,
            bind_group: None,
        }
    }

    pub fn with_ambient(mut self, r: f32, g: f32, b: f32) -> Self {
        self.ambient = [r, g, b];
        self
    }

    pub fn with_diffuse(mut self, r: f32, g: f32, b: f32) -> Self {
        self.diffuse = [r, g, b];
        self
    }

    pub fn with_specular(mut self, r: f32, g: f32, b: f32) -> Self {
        self.specular = [r, g, b];
        self
    }

    /// Builder pattern: Set the specular exponent, at least 1
    pub fn with_shininess(mut self, shininess: f32) -> Self {
        self.shininess = shininess.max(1.0);
        self
    }

    pub fn with_diffuse_texture(mut self, texture: TextureId) -> Self {
        self.diffuse_texture = Some(texture);
        self
    }

    pub fn with_specular_texture(mut self, texture: TextureId) -> Self {
        self.specular_texture = Some(texture);
        self
    }

    pub fn uniform(&self) -> MaterialUniform {
        let [ar, ag, ab] = self.ambient;
        let [dr, dg, db] = self.diffuse;
        let [sr, sg, sb] = self.specular;
        MaterialUniform {
            ambient: [ar, ag, ab, 1.0],
            diffuse: [dr, dg, db, 1.0],
            specular: [sr, sg, sb, self.shininess],
        }
    }

    /// Creates or refreshes the GPU resources of this material
    ///
    /// The bind group is built once; the uniform is rewritten only when the
    /// material's colors changed.
    pub fn update_gpu_resources(
        &mut self,
        device: &Device,
        queue: &wgpu::Queue,
        layouts: &MaterialLayouts,
        textures: &MaterialTextures,
    ) {
        let uniform = self.uniform();
        let ubo = match &mut self.material_ubo {
            Some(ubo) => {
                ubo.update_content(queue, uniform);
                ubo
            }
            None => self
                .material_ubo
                .insert(MaterialUBO::new_with_data(device, &uniform)),
        };

        if self.bind_group.is_none() {
            let layout = layouts.for_shading_desc(self.shading);
            let label = format!("{} Material Bind Group", self.name);
            let builder = BindGroupBuilder::new(layout).resource(ubo.binding_resource());

            let bind_group = match self.shading {
                ShadingModel::Phong => builder.create(device, &label),
                ShadingModel::TexturedPhong => {
                    let diffuse = textures.resolve(self.diffuse_texture);
                    let specular = textures.resolve(self.specular_texture.or(self.diffuse_texture));
                    builder
                        .texture(&diffuse.view)
                        .texture(&specular.view)
                        .sampler(&diffuse.sampler)
                        .create(device, &label)
                }
                ShadingModel::Water | ShadingModel::Skybox => builder
                    .texture(&textures.environment.view)
                    .sampler(&textures.environment.sampler)
                    .create(device, &label),
            };
            self.bind_group = Some(bind_group);
        }
    }

    /// Gets the bind group for rendering
    pub fn get_bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.bind_group.as_ref()
    }
}

/// Manages all materials in the engine
///
/// Objects reference materials by ID rather than storing material data
/// directly, so GPU resources are shared between objects.
pub struct MaterialManager {
    materials: HashMap<MaterialId, Material>,
    default_material_id: MaterialId,
}

impl Default for MaterialManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MaterialManager {
    /// Creates a new material manager with a default material
    pub fn new() -> Self {
        let default_material = Material::default();
        let default_material_id = default_material.name.clone();
        let mut materials = HashMap::new();
        materials.insert(default_material_id.clone(), default_material);

        Self {
            materials,
            default_material_id,
        }
    }

    /// Adds a material, replacing any material with the same name
    pub fn add_material(&mut self, material: Material) {
        if self.materials.contains_key(&material.name) {
            log::warn!("material '{}' replaced", material.name);
        }
        self.materials.insert(material.name.clone(), material);
    }

    pub fn get_material(&self, id: &str) -> Option<&Material> {
        self.materials.get(id)
    }

    pub fn get_material_mut(&mut self, id: &str) -> Option<&mut Material> {
        self.materials.get_mut(id)
    }

    pub fn get_default_material(&self) -> Option<&Material> {
        self.materials.get(&self.default_material_id)
    }

    /// Gets material for an object with fallback to default
    ///
    /// Handles objects with no material assigned as well as references to
    /// materials that don't exist.
    pub fn get_material_for_object(&self, material_id: Option<&MaterialId>) -> Option<&Material> {
        material_id
            .and_then(|id| self.get_material(id))
            .or_else(|| self.get_default_material())
    }

    /// Lists all material IDs
    pub fn list_materials(&self) -> Vec<&MaterialId> {
        self.materials.keys().collect()
    }

    /// Updates GPU resources for all materials
    pub fn update_all_gpu_resources(
        &mut self,
        device: &Device,
        queue: &wgpu::Queue,
        layouts: &MaterialLayouts,
        textures: &MaterialTextures,
    ) {
        for material in self.materials.values_mut() {
            material.update_gpu_resources(device, queue, layouts, textures);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_packs_shininess() {
        let material = Material::new("cube", ShadingModel::Phong)
            .with_ambient(0.1, 0.1, 0.2)
            .with_diffuse(1.0, 1.0, 1.0)
            .with_specular(0.8, 0.9, 1.0)
            .with_shininess(32.0);
        let uniform = material.uniform();
        assert_eq!(uniform.ambient, [0.1, 0.1, 0.2, 1.0]);
        assert_eq!(uniform.specular, [0.8, 0.9, 1.0, 32.0]);
        assert_eq!(std::mem::size_of::<MaterialUniform>(), 48);
    }

    #[test]
    fn test_shininess_has_floor() {
        assert_eq!(Material::default().with_shininess(0.0).shininess, 1.0);
    }

    #[test]
    fn test_missing_material_falls_back_to_default() {
        let mut manager = MaterialManager::new();
        manager.add_material(Material::new("water", ShadingModel::Water));

        let water = "water".to_string();
        let missing = "missing".to_string();
        assert_eq!(
            manager.get_material_for_object(Some(&water)).map(|m| m.shading),
            Some(ShadingModel::Water)
        );
        assert_eq!(
            manager.get_material_for_object(Some(&missing)).map(|m| m.name.as_str()),
            Some("default")
        );
        assert_eq!(
            manager.get_material_for_object(None).map(|m| m.name.as_str()),
            Some("default")
        );
        assert_eq!(manager.list_materials().len(), 2);
    }

    #[test]
    fn test_shader_names() {
        let names: Vec<_> = ShadingModel::ALL.iter().map(|s| s.shader_name()).collect();
        assert_eq!(names, vec!["simple", "texture", "water", "cubemap"]);
    }
}
