//! The beach scene: water, three floating surfboards, a posed dummy riding
//! the first board, and a skybox

use cgmath::Vector3;

use crate::config::AppConfig;
use crate::gfx::{
    camera::{CameraController, CameraManager, FlyCamera},
    resources::material::{Material, ShadingModel},
    scene::{
        chain_indices,
        scene::{fallback_cube_mesh, ObjectId, Scene},
        GameObject, Hierarchy, NodeId, Transform,
    },
};
use crate::ocean::{water::WATER_MATERIAL, Water};

/// Anchors of the floating surfboards; the dummy rides the first one
pub const SURFBOARD_ANCHORS: [[f32; 3]; 3] = [[0.0, 1.0, 0.0], [6.0, 1.0, 3.0], [-6.0, 1.0, 3.0]];

/// Dummy shapes that form the spine, waist first
const SPINE: [usize; 3] = [12, 13, 14];

/// Limb chains as (start, end) shape indices, end excluded
const LEG_CHAINS: [(i64, i64); 2] = [(11, 5), (5, -1)];
const UPPER_BODY_CHAINS: [(i64, i64); 3] = [(21, 27), (15, 21), (27, 29)];

fn water_material() -> Material {
    Material::new(WATER_MATERIAL, ShadingModel::Water)
        .with_ambient(0.1, 0.1, 0.2)
        .with_diffuse(0.17, 0.45, 0.79)
        .with_specular(0.7, 0.8, 0.9)
        .with_shininess(100.0)
}

/// Builds the complete scene described by `config`
///
/// Models that fail to load are logged and left out; the skybox falls
/// back to a built-in cube.
pub fn build_scene(config: &AppConfig) -> Scene {
    let mut camera = FlyCamera::new(Vector3::new(0.0, 6.0, 20.0), config.width, config.height);
    camera.update_rotation(0.0, -15.0);
    let camera_manager = CameraManager::new(camera, CameraController::default());

    let mut water = Water::new(config.water);
    water.generate_waves(&config.spectrum);

    let mut scene = Scene::new(camera_manager, water);
    scene.light_direction = Vector3::new(0.0, -0.7, 1.0);
    scene.material_manager.add_material(water_material());

    add_skybox(&mut scene, config);
    let boards = add_surfboards(&mut scene, config);
    if let Some(&first) = boards.first() {
        add_dummy(&mut scene, config, first);
    }

    scene
}

fn add_skybox(scene: &mut Scene, config: &AppConfig) {
    let cube = scene
        .load_obj(&config.resource("cube.obj"))
        .unwrap_or_else(|err| {
            log::error!("{err}");
            log::warn!("using the built-in cube for the skybox");
            scene.add_mesh(fallback_cube_mesh())
        });

    scene
        .material_manager
        .add_material(Material::new("skybox", ShadingModel::Skybox));
    scene.set_skybox(
        &config.skybox_dir(),
        ".bmp",
        cube,
        GameObject::new("skybox")
            .with_transform(Transform::uniform(
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(0.0, 0.0, 0.0),
                50.0,
            ))
            .with_material("skybox"),
    );
}

fn add_surfboards(scene: &mut Scene, config: &AppConfig) -> Vec<ObjectId> {
    let mesh = match scene.load_obj(&config.resource("surfboard.obj")) {
        Ok(mesh) => mesh,
        Err(err) => {
            log::error!("{err}");
            return Vec::new();
        }
    };

    let texture = scene.add_texture(&config.resource("surfboard.png"));
    scene.material_manager.add_material(
        Material::new("surfboard", ShadingModel::TexturedPhong)
            .with_ambient(0.1, 0.1, 0.2)
            .with_diffuse(1.0, 1.0, 1.0)
            .with_specular(0.8, 0.9, 1.0)
            .with_shininess(32.0)
            .with_diffuse_texture(texture),
    );

    SURFBOARD_ANCHORS
        .iter()
        .enumerate()
        .map(|(i, &anchor)| {
            let board = scene.add_object(
                GameObject::new(&format!("surfboard{}", i + 1))
                    .with_mesh(mesh)
                    .with_material("surfboard")
                    .with_transform(Transform::new(
                        Vector3::from(anchor),
                        Vector3::new(0.0, 90.0, 0.0),
                        Vector3::new(1.0, 1.0, 1.0),
                    )),
            );
            scene.add_floating(board);
            board
        })
        .collect()
}

/// Attaches the shapes of `chain` below `parent` as one nested limb
fn add_limb(hierarchy: &mut Hierarchy, parent: NodeId, parts: &[ObjectId], chain: (i64, i64)) {
    let limb: Vec<ObjectId> = chain_indices(chain.0, chain.1)
        .into_iter()
        .filter_map(|i| parts.get(i).copied())
        .collect();
    hierarchy.add_chain(parent, &limb);
}

/// Builds the dummy's skeleton below `root_object` from its shape objects
fn rig_dummy(root_object: ObjectId, parts: &[ObjectId]) -> Hierarchy {
    let mut hierarchy = Hierarchy::new(root_object);
    let root = hierarchy.root();
    let spine: Vec<ObjectId> = SPINE.iter().filter_map(|&i| parts.get(i).copied()).collect();
    let torso = hierarchy.add_chain(root, &spine);

    // Legs hang from the root, the rest from the top of the spine
    for chain in LEG_CHAINS {
        add_limb(&mut hierarchy, root, parts, chain);
    }
    for chain in UPPER_BODY_CHAINS {
        add_limb(&mut hierarchy, torso, parts, chain);
    }
    hierarchy
}

fn add_dummy(scene: &mut Scene, config: &AppConfig, board: ObjectId) {
    let meshes = match scene.load_multishape_obj(&config.resource("dummy.obj")) {
        Ok(meshes) => meshes,
        Err(err) => {
            log::error!("{err}");
            return;
        }
    };
    if meshes.len() < 29 {
        log::warn!("dummy has {} shapes, expected at least 29; not posing it", meshes.len());
        return;
    }

    scene.material_manager.add_material(
        Material::new("dummy", ShadingModel::Phong)
            .with_ambient(0.3, 0.2, 0.1)
            .with_diffuse(0.9, 0.8, 0.6)
            .with_specular(0.2, 0.15, 0.1)
            .with_shininess(16.0),
    );

    let parts: Vec<ObjectId> = meshes
        .iter()
        .enumerate()
        .map(|(i, &mesh)| {
            let mut transform = Transform::identity();
            match i {
                11 => {
                    transform.rotation = Vector3::new(15.0, 0.0, 0.0);
                    transform.translation = Vector3::new(0.0, 25.0, 0.0);
                }
                5 => {
                    transform.rotation = Vector3::new(-10.0, 0.0, 0.0);
                    transform.translation = Vector3::new(0.0, -17.0, 0.0);
                }
                _ => {}
            }
            scene.add_detached_object(
                GameObject::new(&format!("dummy[{i}]"))
                    .with_mesh(mesh)
                    .with_material("dummy")
                    .with_transform(transform),
            )
        })
        .collect();

    let root = scene.add_detached_object(GameObject::new("dummy").with_transform(Transform::new(
        Vector3::new(0.0, 0.0, 0.33),
        Vector3::new(-90.0, 0.0, 0.0),
        Vector3::new(0.02, 0.02, 0.02),
    )));

    let hierarchy = rig_dummy(root, &parts);
    log::info!("dummy rigged with {} nodes", hierarchy.len());
    let index = scene.add_hierarchy(hierarchy);
    scene.add_rider(index, board);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn missing_assets() -> AppConfig {
        let mut config = AppConfig::default();
        config.resources = PathBuf::from("does/not/exist");
        config.water.resolution = 4;
        config.water.length = 4.0;
        config
    }

    #[test]
    fn test_missing_assets_still_build_a_scene() {
        let scene = build_scene(&missing_assets());
        let skybox = scene.skybox().expect("skybox uses the built-in cube");
        assert!(scene.mesh(skybox.mesh).is_some());
        assert!(scene.build_draw_list().is_empty());
        assert!(scene.material_manager.get_material(WATER_MATERIAL).is_some());
    }

    #[test]
    fn test_camera_starts_looking_down() {
        let scene = build_scene(&missing_assets());
        let camera = &scene.camera_manager.camera;
        assert_eq!(camera.position, Vector3::new(0.0, 6.0, 20.0));
        assert_eq!(camera.pitch, -15.0);
    }

    #[test]
    fn test_waves_follow_spectrum() {
        let config = missing_assets();
        let scene = build_scene(&config);
        assert_eq!(scene.water.waves(), &config.spectrum.generate());
    }

    #[test]
    fn test_dummy_legs_hang_from_root() {
        let parts: Vec<ObjectId> = (0..29).map(ObjectId).collect();
        let hierarchy = rig_dummy(ObjectId(100), &parts);
        let root = hierarchy.root();

        let first_children: Vec<Option<ObjectId>> = hierarchy
            .children(root)
            .iter()
            .map(|&node| hierarchy.object(node))
            .collect();
        // Waist, then the first shape of each leg chain
        assert_eq!(
            first_children,
            vec![Some(ObjectId(12)), Some(ObjectId(11)), Some(ObjectId(5))]
        );
        assert_eq!(hierarchy.len(), 30);
    }

    #[test]
    fn test_limb_skips_missing_parts() {
        let parts: Vec<ObjectId> = (0..3).map(ObjectId).collect();
        let mut hierarchy = Hierarchy::new(ObjectId(100));
        let root = hierarchy.root();
        add_limb(&mut hierarchy, root, &parts, (5, -1));
        // Only shapes 2, 1 and 0 exist
        assert_eq!(hierarchy.len(), 4);
    }
}
