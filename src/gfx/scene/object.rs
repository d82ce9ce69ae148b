//! # Scene Objects
//!
//! [`Transform`] composes translation, Euler rotation (degrees) and scale
//! into a model matrix. [`GameObject`] pairs a transform with optional mesh
//! and material handles owned by the [`Scene`](super::scene::Scene).

use cgmath::{Deg, Matrix4, Vector3};

use super::scene::MeshId;
use crate::gfx::resources::material::MaterialId;

/// Translation, rotation and scale of an object
///
/// The composite is `T * Rx * Ry * Rz * S`. With a pivot set, rotation and
/// scale happen about the pivot instead of the local origin:
/// `T * T(c) * Rx * Ry * Rz * S * T(-c)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vector3<f32>,
    /// Euler angles in degrees, applied Z first, then Y, then X
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
    pub pivot: Option<Vector3<f32>>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            translation: Vector3::new(0.0, 0.0, 0.0),
            rotation: Vector3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
            pivot: None,
        }
    }

    pub fn new(translation: Vector3<f32>, rotation: Vector3<f32>, scale: Vector3<f32>) -> Self {
        Self {
            translation,
            rotation,
            scale,
            pivot: None,
        }
    }

    /// Transform with the same scale factor on every axis
    pub fn uniform(translation: Vector3<f32>, rotation: Vector3<f32>, scale: f32) -> Self {
        Self::new(translation, rotation, Vector3::new(scale, scale, scale))
    }

    pub fn from_translation(translation: Vector3<f32>) -> Self {
        Self {
            translation,
            ..Self::identity()
        }
    }

    /// Rotates and scales about `center` instead of the local origin
    pub fn with_pivot(mut self, center: Vector3<f32>) -> Self {
        self.pivot = Some(center);
        self
    }

    /// `Rx * Ry * Rz`
    pub fn rotation_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_angle_x(Deg(self.rotation.x))
            * Matrix4::from_angle_y(Deg(self.rotation.y))
            * Matrix4::from_angle_z(Deg(self.rotation.z))
    }

    /// Composite model matrix
    pub fn matrix(&self) -> Matrix4<f32> {
        let scale = Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z);
        let rotate_scale = self.rotation_matrix() * scale;
        let translation = Matrix4::from_translation(self.translation);

        match self.pivot {
            None => translation * rotate_scale,
            Some(center) => {
                translation
                    * Matrix4::from_translation(center)
                    * rotate_scale
                    * Matrix4::from_translation(-center)
            }
        }
    }
}

/// A placed object referencing shared mesh and material resources
#[derive(Debug, Clone)]
pub struct GameObject {
    pub name: String,
    pub transform: Transform,
    pub mesh: Option<MeshId>,
    pub material: Option<MaterialId>,
    pub visible: bool,
}

impl GameObject {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            transform: Transform::identity(),
            mesh: None,
            material: None,
            visible: true,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_mesh(mut self, mesh: MeshId) -> Self {
        self.mesh = Some(mesh);
        self
    }

    pub fn with_material(mut self, material: &str) -> Self {
        self.material = Some(material.to_string());
        self
    }

    /// Model matrix used for drawing
    ///
    /// An explicit matrix (from a hierarchy walk) overrides the object's own
    /// transform.
    pub fn model_matrix(&self, explicit: Option<Matrix4<f32>>) -> Matrix4<f32> {
        explicit.unwrap_or_else(|| self.transform.matrix())
    }

    /// Whether drawing this object would emit anything
    pub fn is_drawable(&self) -> bool {
        self.visible && self.mesh.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Point3, SquareMatrix, Transform as _};

    fn assert_point_eq(a: Point3<f32>, b: Point3<f32>) {
        assert!(
            (a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4 && (a.z - b.z).abs() < 1e-4,
            "{:?} != {:?}",
            a,
            b
        );
    }

    #[test]
    fn test_identity() {
        assert_eq!(Transform::default().matrix(), Matrix4::identity());
    }

    #[test]
    fn test_scale_then_rotate_then_translate() {
        let t = Transform::new(
            Vector3::new(10.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 90.0),
            Vector3::new(2.0, 1.0, 1.0),
        );
        // (1,0,0) scaled to (2,0,0), rotated 90 about z to (0,2,0), moved by +10 x
        let p = t.matrix().transform_point(Point3::new(1.0, 0.0, 0.0));
        assert_point_eq(p, Point3::new(10.0, 2.0, 0.0));
    }

    #[test]
    fn test_rotation_order_is_x_y_z() {
        let t = Transform::new(
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(90.0, 90.0, 0.0),
            Vector3::new(1.0, 1.0, 1.0),
        );
        // Ry first takes +x to -z, then Rx takes -z to +y
        let p = t.matrix().transform_point(Point3::new(1.0, 0.0, 0.0));
        assert_point_eq(p, Point3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_pivot_keeps_center_fixed() {
        let center = Vector3::new(1.0, 2.0, 3.0);
        let t = Transform::uniform(Vector3::new(0.0, 0.0, 0.0), Vector3::new(30.0, 45.0, 60.0), 3.0)
            .with_pivot(center);
        let p = t.matrix().transform_point(Point3::new(1.0, 2.0, 3.0));
        assert_point_eq(p, Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_explicit_model_overrides_transform() {
        let object = GameObject::new("board")
            .with_transform(Transform::from_translation(Vector3::new(1.0, 0.0, 0.0)));
        let explicit = Matrix4::from_translation(Vector3::new(0.0, 5.0, 0.0));
        assert_eq!(object.model_matrix(Some(explicit)), explicit);
        assert_eq!(
            object.model_matrix(None),
            Matrix4::from_translation(Vector3::new(1.0, 0.0, 0.0))
        );
    }

    #[test]
    fn test_object_without_mesh_is_not_drawable() {
        let object = GameObject::new("joint");
        assert!(!object.is_drawable());
        assert!(GameObject::new("cube").with_mesh(MeshId(0)).is_drawable());
    }
}
