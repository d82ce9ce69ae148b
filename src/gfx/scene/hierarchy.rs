//! # Scene Hierarchy
//!
//! An arena-backed tree of scene objects. Every node's world matrix is its
//! parent's world matrix times its own local transform, recomputed top-down
//! on every walk. Nodes are only ever created under an existing parent, so
//! the tree cannot contain cycles.
//!
//! A node either references a [`GameObject`] (whose transform is the local
//! transform) or is a bare joint carrying its own [`Transform`]. Walking the
//! tree produces a flat list of [`DrawCommand`]s with explicit model
//! matrices; the root contributes its transform but is never drawn.

use cgmath::{Matrix4, SquareMatrix};

use super::object::{GameObject, Transform};
use super::scene::ObjectId;

/// Handle to a node inside a [`Hierarchy`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct Node {
    object: Option<ObjectId>,
    joint: Transform,
    children: Vec<NodeId>,
}

impl Node {
    fn new(object: Option<ObjectId>, joint: Transform) -> Self {
        Self {
            object,
            joint,
            children: Vec::new(),
        }
    }
}

/// One object to draw with the model matrix it should be drawn with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    pub object: ObjectId,
    pub model: Matrix4<f32>,
}

/// Tree of objects composing ancestor transforms
#[derive(Debug, Clone)]
pub struct Hierarchy {
    nodes: Vec<Node>,
}

impl Hierarchy {
    /// Creates a tree whose root is `root_object`
    pub fn new(root_object: ObjectId) -> Self {
        Self {
            nodes: vec![Node::new(Some(root_object), Transform::identity())],
        }
    }

    /// Creates a tree whose root is a bare joint
    pub fn with_root_transform(transform: Transform) -> Self {
        Self {
            nodes: vec![Node::new(None, transform)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Attaches a node for `object` under `parent`
    ///
    /// # Returns
    /// The new node, appended after any existing children of `parent`
    pub fn add_child(&mut self, parent: NodeId, object: ObjectId) -> NodeId {
        self.push_node(parent, Node::new(Some(object), Transform::identity()))
    }

    /// Attaches an object-less joint under `parent`
    pub fn add_joint(&mut self, parent: NodeId, transform: Transform) -> NodeId {
        self.push_node(parent, Node::new(None, transform))
    }

    fn push_node(&mut self, parent: NodeId, node: Node) -> NodeId {
        assert!(parent.0 < self.nodes.len(), "parent node does not exist");
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Attaches `objects` as a nested chain, each one the child of the previous
    ///
    /// # Returns
    /// The deepest node of the chain, or `parent` for an empty chain
    pub fn add_chain(&mut self, parent: NodeId, objects: &[ObjectId]) -> NodeId {
        objects
            .iter()
            .fold(parent, |node, &object| self.add_child(node, object))
    }

    pub fn object(&self, node: NodeId) -> Option<ObjectId> {
        self.nodes[node.0].object
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    pub fn joint_mut(&mut self, node: NodeId) -> &mut Transform {
        &mut self.nodes[node.0].joint
    }

    /// Number of nodes including the root
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Local transform of a node
    ///
    /// Nodes whose object no longer exists fall back to their joint.
    fn local_matrix(&self, node: &Node, objects: &[GameObject]) -> Matrix4<f32> {
        match node.object.and_then(|id| objects.get(id.0)) {
            Some(object) => object.transform.matrix(),
            None => node.joint.matrix(),
        }
    }

    /// Walks the whole tree, appending a draw for every drawable descendant
    ///
    /// The root's transform applies to every descendant but the root itself
    /// is not drawn.
    pub fn draw_hierarchy_from_root(&self, objects: &[GameObject], draws: &mut Vec<DrawCommand>) {
        let root = &self.nodes[0];
        let model = self.local_matrix(root, objects);
        for &child in &root.children {
            self.draw_hierarchy(child, model, objects, draws);
        }
    }

    /// Draws `node` with `parent_model * local` and recurses pre-order
    ///
    /// Joints and objects without a mesh emit nothing but still pass their
    /// transform on to their children.
    pub fn draw_hierarchy(
        &self,
        node: NodeId,
        parent_model: Matrix4<f32>,
        objects: &[GameObject],
        draws: &mut Vec<DrawCommand>,
    ) {
        let current = &self.nodes[node.0];
        let model = parent_model * self.local_matrix(current, objects);

        if let Some(object) = current.object {
            if objects.get(object.0).is_some_and(GameObject::is_drawable) {
                draws.push(DrawCommand { object, model });
            }
        }

        for &child in &current.children {
            self.draw_hierarchy(child, model, objects, draws);
        }
    }

    /// World matrix of a single node, composed from the root down
    pub fn world_matrix(&self, target: NodeId, objects: &[GameObject]) -> Option<Matrix4<f32>> {
        fn walk(
            tree: &Hierarchy,
            node: NodeId,
            parent: Matrix4<f32>,
            target: NodeId,
            objects: &[GameObject],
        ) -> Option<Matrix4<f32>> {
            let model = parent * tree.local_matrix(&tree.nodes[node.0], objects);
            if node == target {
                return Some(model);
            }
            tree.nodes[node.0]
                .children
                .iter()
                .find_map(|&child| walk(tree, child, model, target, objects))
        }

        walk(self, self.root(), Matrix4::identity(), target, objects)
    }

    /// Removes every node below the root
    ///
    /// Safe to call repeatedly; the root and its transform are kept.
    pub fn clear_hierarchy(&mut self) {
        self.nodes.truncate(1);
        self.nodes[0].children.clear();
    }
}

/// Object indices visited by a chain running from `start` towards `end`
///
/// Steps by one in whichever direction reaches `end`, which is excluded.
/// `chain_indices(11, 5)` is `11..=6` descending and `chain_indices(5, -1)`
/// is `5..=0`.
pub fn chain_indices(start: i64, end: i64) -> Vec<usize> {
    let step = if end >= start { 1 } else { -1 };
    let mut indices = Vec::new();
    let mut current = start;
    while current != end {
        if let Ok(index) = usize::try_from(current) {
            indices.push(index);
        }
        current += step;
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::scene::MeshId;
    use cgmath::Vector3;

    fn translated(name: &str, x: f32) -> GameObject {
        GameObject::new(name)
            .with_mesh(MeshId(0))
            .with_transform(Transform::from_translation(Vector3::new(x, 0.0, 0.0)))
    }

    #[test]
    fn test_translation_chain_composes() {
        let tx = 1.5;
        let objects = vec![translated("root", tx), translated("a", tx), translated("b", tx)];
        let mut tree = Hierarchy::new(ObjectId(0));
        let a = tree.add_child(tree.root(), ObjectId(1));
        tree.add_child(a, ObjectId(2));

        let mut draws = Vec::new();
        tree.draw_hierarchy_from_root(&objects, &mut draws);

        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].object, ObjectId(1));
        assert_eq!(
            draws[0].model,
            Matrix4::from_translation(Vector3::new(2.0 * tx, 0.0, 0.0))
        );
        assert_eq!(draws[1].object, ObjectId(2));
        assert_eq!(
            draws[1].model,
            Matrix4::from_translation(Vector3::new(3.0 * tx, 0.0, 0.0))
        );
    }

    #[test]
    fn test_children_drawn_in_insertion_order() {
        let objects: Vec<_> = (0..4).map(|i| translated(&i.to_string(), 0.0)).collect();
        let mut tree = Hierarchy::new(ObjectId(0));
        let first = tree.add_child(tree.root(), ObjectId(1));
        tree.add_child(tree.root(), ObjectId(3));
        tree.add_child(first, ObjectId(2));

        let mut draws = Vec::new();
        tree.draw_hierarchy_from_root(&objects, &mut draws);
        let order: Vec<_> = draws.iter().map(|d| d.object).collect();
        assert_eq!(order, vec![ObjectId(1), ObjectId(2), ObjectId(3)]);
    }

    #[test]
    fn test_meshless_nodes_pass_transform_through() {
        let mut objects = vec![translated("root", 0.0), translated("hidden", 2.0), translated("leaf", 1.0)];
        objects[1].mesh = None;

        let mut tree = Hierarchy::new(ObjectId(0));
        tree.add_chain(tree.root(), &[ObjectId(1), ObjectId(2)]);

        let mut draws = Vec::new();
        tree.draw_hierarchy_from_root(&objects, &mut draws);
        assert_eq!(draws.len(), 1);
        assert_eq!(
            draws[0].model,
            Matrix4::from_translation(Vector3::new(3.0, 0.0, 0.0))
        );
    }

    #[test]
    fn test_joint_root_and_joints() {
        let objects = vec![translated("leaf", 1.0)];
        let mut tree =
            Hierarchy::with_root_transform(Transform::from_translation(Vector3::new(0.0, 4.0, 0.0)));
        let joint = tree.add_joint(
            tree.root(),
            Transform::from_translation(Vector3::new(0.0, 0.0, -1.0)),
        );
        let leaf = tree.add_child(joint, ObjectId(0));

        let expected = Matrix4::from_translation(Vector3::new(1.0, 4.0, -1.0));
        let mut draws = Vec::new();
        tree.draw_hierarchy_from_root(&objects, &mut draws);
        assert_eq!(draws, vec![DrawCommand { object: ObjectId(0), model: expected }]);
        assert_eq!(tree.world_matrix(leaf, &objects), Some(expected));
    }

    #[test]
    fn test_add_chain_nests() {
        let mut tree = Hierarchy::new(ObjectId(0));
        let last = tree.add_chain(tree.root(), &[ObjectId(1), ObjectId(2), ObjectId(3)]);
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.object(last), Some(ObjectId(3)));
        assert_eq!(tree.children(tree.root()).len(), 1);
        assert_eq!(tree.add_chain(last, &[]), last);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut tree = Hierarchy::new(ObjectId(0));
        tree.add_chain(tree.root(), &[ObjectId(1), ObjectId(2)]);
        tree.clear_hierarchy();
        assert!(tree.is_empty());
        tree.clear_hierarchy();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.object(tree.root()), Some(ObjectId(0)));
    }

    #[test]
    fn test_chain_indices() {
        assert_eq!(chain_indices(11, 5), vec![11, 10, 9, 8, 7, 6]);
        assert_eq!(chain_indices(5, -1), vec![5, 4, 3, 2, 1, 0]);
        assert_eq!(chain_indices(27, 29), vec![27, 28]);
        assert!(chain_indices(3, 3).is_empty());
    }
}
