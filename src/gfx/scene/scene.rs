use std::path::{Path, PathBuf};

use cgmath::Vector3;
use wgpu::Device;

use crate::{
    error::AssetError,
    gfx::{
        camera::camera_utils::CameraManager,
        geometry::generate_cube,
        resources::{
            material::{MaterialLayouts, MaterialManager, MaterialTextures},
            texture_resource::TextureResource,
        },
    },
    input::InputState,
    ocean::Water,
    time::FrameTime,
};

use super::{
    hierarchy::{DrawCommand, Hierarchy},
    mesh::{Mesh, MeshUsage},
    obj_loader::{load_obj_shapes, ObjShape},
    object::GameObject,
};

/// Index of a mesh owned by the [`Scene`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(pub usize);

/// Index of a game object owned by the [`Scene`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(pub usize);

/// Index of a 2D texture owned by the [`Scene`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub usize);

/// Sky color used when no cubemap face can be loaded
pub const FALLBACK_SKY: [u8; 4] = [184, 214, 255, 255];

/// An object that rides the water surface
///
/// Every frame the object is placed where the wave field carries `anchor`.
/// The rest position is kept so displacements never accumulate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatingObject {
    pub object: ObjectId,
    pub anchor: Vector3<f32>,
}

/// A hierarchy whose root bobs with a floating object's height
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rider {
    pub hierarchy: usize,
    pub follows: ObjectId,
}

/// Environment cube drawn behind everything and reflected by the water
pub struct Skybox {
    pub dir: PathBuf,
    pub extension: String,
    pub mesh: MeshId,
    pub object: ObjectId,
}

/// Main scene containing objects, materials, water and camera
pub struct Scene {
    pub camera_manager: CameraManager,
    pub water: Water,
    pub material_manager: MaterialManager,
    /// Direction the light travels
    pub light_direction: Vector3<f32>,
    meshes: Vec<Mesh>,
    objects: Vec<GameObject>,
    standalone: Vec<ObjectId>,
    hierarchies: Vec<Hierarchy>,
    floating: Vec<FloatingObject>,
    riders: Vec<Rider>,
    texture_paths: Vec<PathBuf>,
    textures: Vec<TextureResource>,
    fallback_texture: Option<TextureResource>,
    environment: Option<TextureResource>,
    skybox: Option<Skybox>,
}

impl Scene {
    /// Creates a new scene with the given camera manager and water surface
    pub fn new(camera_manager: CameraManager, water: Water) -> Self {
        Self {
            camera_manager,
            water,
            material_manager: MaterialManager::new(),
            light_direction: Vector3::new(0.0, -0.7, 1.0),
            meshes: Vec::new(),
            objects: Vec::new(),
            standalone: Vec::new(),
            hierarchies: Vec::new(),
            floating: Vec::new(),
            riders: Vec::new(),
            texture_paths: Vec::new(),
            textures: Vec::new(),
            fallback_texture: None,
            environment: None,
            skybox: None,
        }
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshId {
        self.meshes.push(mesh);
        MeshId(self.meshes.len() - 1)
    }

    /// Adds an object drawn on its own with its own transform
    pub fn add_object(&mut self, object: GameObject) -> ObjectId {
        let id = self.add_detached_object(object);
        self.standalone.push(id);
        id
    }

    /// Adds an object that is only drawn through a hierarchy
    pub fn add_detached_object(&mut self, object: GameObject) -> ObjectId {
        self.objects.push(object);
        ObjectId(self.objects.len() - 1)
    }

    pub fn add_hierarchy(&mut self, hierarchy: Hierarchy) -> usize {
        self.hierarchies.push(hierarchy);
        self.hierarchies.len() - 1
    }

    /// Registers an image to be loaded when GPU resources are created
    pub fn add_texture(&mut self, path: &Path) -> TextureId {
        self.texture_paths.push(path.to_path_buf());
        TextureId(self.texture_paths.len() - 1)
    }

    /// Makes `object` ride the water from its current translation
    pub fn add_floating(&mut self, object: ObjectId) {
        let anchor = self.objects[object.0].transform.translation;
        self.floating.push(FloatingObject { object, anchor });
    }

    /// Makes a hierarchy's root follow the height of a floating object
    pub fn add_rider(&mut self, hierarchy: usize, follows: ObjectId) {
        self.riders.push(Rider { hierarchy, follows });
    }

    /// Uses the cube at `mesh` with `object`'s material as the skybox
    pub fn set_skybox(&mut self, dir: &Path, extension: &str, mesh: MeshId, object: GameObject) {
        let object = self.add_detached_object(object.with_mesh(mesh));
        self.skybox = Some(Skybox {
            dir: dir.to_path_buf(),
            extension: extension.to_string(),
            mesh,
            object,
        });
    }

    fn mesh_from_shape(shape: &ObjShape, label: &str) -> Mesh {
        let mut mesh = Mesh::new(label, MeshUsage::Static);
        mesh.set_attributes(
            &shape.positions,
            &shape.normals,
            shape.tex_coords.as_deref(),
            &shape.indices,
        );
        mesh
    }

    /// Loads the first shape of an OBJ file as one mesh
    pub fn load_obj(&mut self, path: &Path) -> Result<MeshId, AssetError> {
        let shapes = load_obj_shapes(path)?;
        if shapes.len() > 1 {
            log::warn!(
                "'{}' has {} shapes, only the first is used",
                path.display(),
                shapes.len()
            );
        }
        let label = path.display().to_string();
        let mesh = Self::mesh_from_shape(&shapes[0], &label);
        log::info!("loaded '{}' ({} vertices)", label, mesh.vertex_count());
        Ok(self.add_mesh(mesh))
    }

    /// Loads every shape of an OBJ file, one mesh per shape, in file order
    pub fn load_multishape_obj(&mut self, path: &Path) -> Result<Vec<MeshId>, AssetError> {
        let shapes = load_obj_shapes(path)?;
        let ids = shapes
            .iter()
            .enumerate()
            .map(|(i, shape)| {
                let label = format!("{}[{}:{}]", path.display(), i, shape.name);
                self.add_mesh(Self::mesh_from_shape(shape, &label))
            })
            .collect::<Vec<_>>();
        log::info!("loaded '{}' ({} shapes)", path.display(), ids.len());
        Ok(ids)
    }

    /// Advances the camera and everything that moves with the water
    pub fn update(&mut self, frame: FrameTime, input: &mut InputState) {
        self.camera_manager.update(input, frame.delta);
        self.update_floating(frame.time);
    }

    /// Places floating objects and their riders at time `t`
    pub fn update_floating(&mut self, t: f32) {
        for floating in &self.floating {
            let displaced = self.water.get_displacement(floating.anchor, t);
            if let Some(object) = self.objects.get_mut(floating.object.0) {
                object.transform.translation = displaced;
            }
        }

        for rider in &self.riders {
            let Some(height) = self
                .objects
                .get(rider.follows.0)
                .map(|o| o.transform.translation.y)
            else {
                continue;
            };
            if let Some(hierarchy) = self.hierarchies.get(rider.hierarchy) {
                let root = hierarchy.root();
                match hierarchy.object(root) {
                    Some(root_object) => {
                        if let Some(object) = self.objects.get_mut(root_object.0) {
                            object.transform.translation.y = height;
                        }
                    }
                    None => {
                        if let Some(hierarchy) = self.hierarchies.get_mut(rider.hierarchy) {
                            hierarchy.joint_mut(root).translation.y = height;
                        }
                    }
                }
            }
        }
    }

    /// Every object to draw this frame with its model matrix
    ///
    /// Standalone objects come first in insertion order, then each
    /// hierarchy in pre-order. The water and the skybox are not included.
    pub fn build_draw_list(&self) -> Vec<DrawCommand> {
        let mut draws: Vec<DrawCommand> = self
            .standalone
            .iter()
            .filter_map(|&id| {
                let object = self.objects.get(id.0)?;
                object.is_drawable().then(|| DrawCommand {
                    object: id,
                    model: object.model_matrix(None),
                })
            })
            .collect();

        for hierarchy in &self.hierarchies {
            hierarchy.draw_hierarchy_from_root(&self.objects, &mut draws);
        }
        draws
    }

    /// Uploads meshes, loads textures and builds every GPU resource
    ///
    /// Textures that fail to load are replaced by a white texture; a skybox
    /// without any face falls back to a plain sky-colored cubemap.
    pub fn init_gpu_resources(
        &mut self,
        device: &Device,
        queue: &wgpu::Queue,
        layouts: &MaterialLayouts,
    ) {
        for mesh in &mut self.meshes {
            mesh.upload(device);
        }
        self.water.setup_buffers(device);
        self.water.setup_waves_ubo(device);
        self.camera_manager.setup_matrices_ubo(device);

        let fallback = TextureResource::solid_color(device, queue, [255; 4], "white");
        self.textures = self
            .texture_paths
            .iter()
            .map(|path| {
                TextureResource::from_file(device, queue, path).unwrap_or_else(|err| {
                    log::error!("{err}");
                    fallback.clone()
                })
            })
            .collect();

        let environment = match &self.skybox {
            Some(skybox) => TextureResource::cubemap_from_dir(
                device,
                queue,
                &skybox.dir,
                &skybox.extension,
                FALLBACK_SKY,
            )
            .unwrap_or_else(|err| {
                log::error!("{err}");
                TextureResource::solid_cubemap(device, queue, FALLBACK_SKY, "sky")
            }),
            None => TextureResource::solid_cubemap(device, queue, FALLBACK_SKY, "sky"),
        };

        self.material_manager.update_all_gpu_resources(
            device,
            queue,
            layouts,
            &MaterialTextures {
                textures: &self.textures,
                fallback: &fallback,
                environment: &environment,
            },
        );

        self.fallback_texture = Some(fallback);
        self.environment = Some(environment);
    }

    /// Pushes this frame's camera, wave and surface changes to the GPU
    pub fn sync_gpu(&mut self, queue: &wgpu::Queue, frame: FrameTime) {
        self.camera_manager.sync(queue);
        self.water.update_waves_ubo(queue);
        self.water.update_surface(queue, frame.time);
    }

    pub fn mesh(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(id.0)
    }

    pub fn object(&self, id: ObjectId) -> Option<&GameObject> {
        self.objects.get(id.0)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut GameObject> {
        self.objects.get_mut(id.0)
    }

    pub fn objects(&self) -> &[GameObject] {
        &self.objects
    }

    pub fn hierarchy_mut(&mut self, index: usize) -> Option<&mut Hierarchy> {
        self.hierarchies.get_mut(index)
    }

    pub fn skybox(&self) -> Option<&Skybox> {
        self.skybox.as_ref()
    }

    /// Removes every hierarchy's nodes below its root
    pub fn clear_hierarchies(&mut self) {
        for hierarchy in &mut self.hierarchies {
            hierarchy.clear_hierarchy();
        }
    }

    /// Gets statistics about the scene
    pub fn get_statistics(&self) -> SceneStatistics {
        SceneStatistics {
            object_count: self.objects.len(),
            mesh_count: self.meshes.len(),
            material_count: self.material_manager.list_materials().len(),
            total_triangles: self
                .meshes
                .iter()
                .chain(std::iter::once(self.water.mesh()))
                .map(|m| m.index_count() / 3)
                .sum(),
        }
    }
}

/// A unit cube mesh, used when no cube model could be loaded
pub fn fallback_cube_mesh() -> Mesh {
    let cube = generate_cube();
    let mut mesh = Mesh::new("cube", MeshUsage::Static);
    mesh.set_attributes(&cube.positions, &cube.normals, Some(&cube.tex_coords), &cube.indices);
    mesh
}

/// Scene statistics for debugging and UI display
#[derive(Debug)]
pub struct SceneStatistics {
    pub object_count: usize,
    pub mesh_count: usize,
    pub material_count: usize,
    pub total_triangles: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::{CameraController, FlyCamera};
    use crate::gfx::scene::object::Transform;
    use crate::ocean::{Wave, WaterConfig, WaveFunction};
    use cgmath::{Matrix4, Vector2};

    fn scene() -> Scene {
        let camera = FlyCamera::new(Vector3::new(0.0, 6.0, 20.0), 640, 480);
        let water = Water::new(WaterConfig {
            resolution: 4,
            length: 4.0,
            wave_function: WaveFunction::Sine,
            ripple_mesh: false,
        });
        Scene::new(CameraManager::new(camera, CameraController::default()), water)
    }

    fn cube_scene() -> (Scene, MeshId) {
        let mut scene = scene();
        let cube = scene.add_mesh(fallback_cube_mesh());
        (scene, cube)
    }

    #[test]
    fn test_floating_objects_follow_anchor() {
        let (mut scene, cube) = cube_scene();
        scene
            .water
            .set_waves(&[Wave::new(0.5, std::f32::consts::TAU, 1.0, 0.0, Vector2::new(1.0, 0.0))]);

        let board = scene.add_object(
            GameObject::new("board")
                .with_mesh(cube)
                .with_transform(Transform::from_translation(Vector3::new(0.0, 1.0, 0.0))),
        );
        scene.add_floating(board);

        scene.update_floating(0.5);
        let first = scene.object(board).map(|o| o.transform.translation);
        scene.update_floating(0.5);
        let second = scene.object(board).map(|o| o.transform.translation);
        assert_eq!(first, second);

        let expected = scene.water.get_displacement(Vector3::new(0.0, 1.0, 0.0), 0.5);
        assert_eq!(first, Some(expected));
    }

    #[test]
    fn test_rider_root_follows_board_height() {
        let (mut scene, cube) = cube_scene();
        scene
            .water
            .set_waves(&[Wave::new(0.5, std::f32::consts::TAU, 0.0, 0.0, Vector2::new(1.0, 0.0))]);

        let board = scene.add_object(
            GameObject::new("board")
                .with_mesh(cube)
                .with_transform(Transform::from_translation(Vector3::new(1.0, 0.0, 0.0))),
        );
        scene.add_floating(board);

        let root = scene.add_detached_object(GameObject::new("root"));
        let limb = scene.add_detached_object(GameObject::new("limb").with_mesh(cube));
        let mut rig = Hierarchy::new(root);
        rig.add_child(rig.root(), limb);
        let rig = scene.add_hierarchy(rig);
        scene.add_rider(rig, board);

        scene.update_floating(0.0);
        let height = (1.0f32).sin() * 0.5;
        let root_y = scene.object(root).map(|o| o.transform.translation.y);
        assert!(root_y.is_some_and(|y| (y - height).abs() < 1e-6));
    }

    #[test]
    fn test_draw_list_order_and_matrices() {
        let (mut scene, cube) = cube_scene();
        let a = scene.add_object(
            GameObject::new("a")
                .with_mesh(cube)
                .with_transform(Transform::from_translation(Vector3::new(2.0, 0.0, 0.0))),
        );
        scene.add_object(GameObject::new("joint"));

        let root = scene.add_detached_object(
            GameObject::new("root")
                .with_transform(Transform::from_translation(Vector3::new(0.0, 1.0, 0.0))),
        );
        let child = scene.add_detached_object(GameObject::new("child").with_mesh(cube));
        let mut rig = Hierarchy::new(root);
        rig.add_child(rig.root(), child);
        scene.add_hierarchy(rig);

        let draws = scene.build_draw_list();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].object, a);
        assert_eq!(draws[1].object, child);
        assert_eq!(
            draws[1].model,
            Matrix4::from_translation(Vector3::new(0.0, 1.0, 0.0))
        );
    }

    #[test]
    fn test_missing_obj_is_reported() {
        let mut scene = scene();
        assert!(scene.load_obj(Path::new("missing/cube.obj")).is_err());
        assert!(scene.load_multishape_obj(Path::new("missing/dummy.obj")).is_err());
        assert_eq!(scene.get_statistics().mesh_count, 0);
    }

    #[test]
    fn test_texture_ids_are_sequential() {
        let mut scene = scene();
        assert_eq!(scene.add_texture(Path::new("a.png")), TextureId(0));
        assert_eq!(scene.add_texture(Path::new("b.png")), TextureId(1));
    }
}
