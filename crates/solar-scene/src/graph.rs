//! Arena-backed transform hierarchy.
//!
//! Nodes are addressed by [`NodeId`] and never removed. Each node carries a
//! local [`Transform`]; world matrices are composed on demand by walking the
//! parent chain, so reparenting never rewrites a local transform.

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::error::SceneError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Local translation, Euler rotation (radians, XYZ order), and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    /// `T * Rx * Ry * Rz * S`.
    pub fn matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_scale_rotation_translation(self.scale, rotation, self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Debug, Clone)]
struct Node {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    visible: bool,
    transform: Transform,
}

/// The scene tree. Owns every body, pivot, and light node.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Vec<Node>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a visible node at the top level.
    pub fn add_node(&mut self, name: impl Into<String>, transform: Transform) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            visible: true,
            transform,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    fn node(&self, id: NodeId) -> Result<&Node, SceneError> {
        self.nodes.get(id.0).ok_or(SceneError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, SceneError> {
        self.nodes.get_mut(id.0).ok_or(SceneError::UnknownNode(id))
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id.0).map(|n| n.name.as_str())
    }

    /// Make `child` a child of `parent`, detaching it from any previous parent.
    /// The child's local transform is kept, so its world placement now
    /// inherits from `parent`.
    pub fn attach(&mut self, child: NodeId, parent: NodeId) -> Result<(), SceneError> {
        self.node(child)?;
        self.node(parent)?;
        if child == parent || self.is_ancestor(child, parent) {
            return Err(SceneError::CycleDetected { child, parent });
        }

        if let Some(old) = self.nodes[child.0].parent {
            self.nodes[old.0].children.retain(|&c| c != child);
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    /// Children in attach order. Empty for unknown ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Parent chain of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            graph: self,
            next: self.parent(id),
        }
    }

    /// Whether `ancestor` appears anywhere on the parent chain of `node`.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).any(|a| a == ancestor)
    }

    /// Nodes without a parent, in insertion order.
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.parent.is_none())
            .map(|(i, _)| NodeId(i))
    }

    pub fn transform(&self, id: NodeId) -> Result<&Transform, SceneError> {
        self.node(id).map(|n| &n.transform)
    }

    pub fn transform_mut(&mut self, id: NodeId) -> Result<&mut Transform, SceneError> {
        self.node_mut(id).map(|n| &mut n.transform)
    }

    pub fn is_visible(&self, id: NodeId) -> bool {
        self.nodes.get(id.0).is_some_and(|n| n.visible)
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> Result<(), SceneError> {
        self.node_mut(id)?.visible = visible;
        Ok(())
    }

    pub fn local_matrix(&self, id: NodeId) -> Result<Mat4, SceneError> {
        self.node(id).map(|n| n.transform.matrix())
    }

    /// Local matrix composed with every ancestor's, root first.
    pub fn world_matrix(&self, id: NodeId) -> Result<Mat4, SceneError> {
        let mut world = self.local_matrix(id)?;
        for ancestor in self.ancestors(id) {
            world = self.nodes[ancestor.0].transform.matrix() * world;
        }
        Ok(world)
    }

    pub fn world_position(&self, id: NodeId) -> Result<Vec3, SceneError> {
        Ok(self.world_matrix(id)?.transform_point3(Vec3::ZERO))
    }
}

/// Iterator over a node's parent chain.
pub struct Ancestors<'a> {
    graph: &'a SceneGraph,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.graph.parent(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_add_node_is_top_level() {
        let mut graph = SceneGraph::new();
        let a = graph.add_node("a", Transform::IDENTITY);
        assert_eq!(graph.parent(a), None);
        assert_eq!(graph.roots().collect::<Vec<_>>(), vec![a]);
        assert_eq!(graph.name(a), Some("a"));
    }

    #[test]
    fn test_attach_keeps_local_transform() {
        let mut graph = SceneGraph::new();
        let parent = graph.add_node(
            "parent",
            Transform::from_translation(Vec3::new(10.0, 0.0, 0.0)),
        );
        let child = graph.add_node("child", Transform::from_translation(Vec3::new(0.0, 0.0, 5.0)));

        graph.attach(child, parent).unwrap();
        assert_eq!(
            graph.transform(child).unwrap().translation,
            Vec3::new(0.0, 0.0, 5.0)
        );
        assert!(approx(
            graph.world_position(child).unwrap(),
            Vec3::new(10.0, 0.0, 5.0)
        ));
    }

    #[test]
    fn test_reattach_moves_between_parents() {
        let mut graph = SceneGraph::new();
        let a = graph.add_node("a", Transform::IDENTITY);
        let b = graph.add_node("b", Transform::IDENTITY);
        let c = graph.add_node("c", Transform::IDENTITY);

        graph.attach(c, a).unwrap();
        graph.attach(c, b).unwrap();
        assert!(graph.children(a).is_empty());
        assert_eq!(graph.children(b), &[c]);
        assert_eq!(graph.parent(c), Some(b));
    }

    #[test]
    fn test_attach_rejects_self_and_cycles() {
        let mut graph = SceneGraph::new();
        let a = graph.add_node("a", Transform::IDENTITY);
        let b = graph.add_node("b", Transform::IDENTITY);
        graph.attach(b, a).unwrap();

        assert_eq!(
            graph.attach(a, a),
            Err(SceneError::CycleDetected { child: a, parent: a })
        );
        assert_eq!(
            graph.attach(a, b),
            Err(SceneError::CycleDetected { child: a, parent: b })
        );
    }

    #[test]
    fn test_attach_rejects_unknown_ids() {
        let mut graph = SceneGraph::new();
        let a = graph.add_node("a", Transform::IDENTITY);
        let ghost = NodeId(42);
        assert_eq!(graph.attach(ghost, a), Err(SceneError::UnknownNode(ghost)));
        assert_eq!(graph.attach(a, ghost), Err(SceneError::UnknownNode(ghost)));
    }

    #[test]
    fn test_ancestors_nearest_first() {
        let mut graph = SceneGraph::new();
        let root = graph.add_node("root", Transform::IDENTITY);
        let mid = graph.add_node("mid", Transform::IDENTITY);
        let leaf = graph.add_node("leaf", Transform::IDENTITY);
        graph.attach(mid, root).unwrap();
        graph.attach(leaf, mid).unwrap();

        assert_eq!(graph.ancestors(leaf).collect::<Vec<_>>(), vec![mid, root]);
        assert!(graph.is_ancestor(root, leaf));
        assert!(!graph.is_ancestor(leaf, root));
    }

    #[test]
    fn test_parent_rotation_sweeps_child() {
        let mut graph = SceneGraph::new();
        let pivot = graph.add_node("pivot", Transform::IDENTITY);
        let body = graph.add_node("body", Transform::from_translation(Vec3::new(4.0, 0.0, 4.0)));
        graph.attach(body, pivot).unwrap();

        graph.transform_mut(pivot).unwrap().rotation.y = FRAC_PI_2;
        // +90 degrees about Y takes +X to -Z and +Z to +X.
        assert!(approx(
            graph.world_position(body).unwrap(),
            Vec3::new(4.0, 0.0, -4.0)
        ));
    }

    #[test]
    fn test_euler_order_is_xyz() {
        let transform = Transform {
            rotation: Vec3::new(0.3, 0.5, 0.7),
            ..Transform::IDENTITY
        };
        let expected =
            Mat4::from_rotation_x(0.3) * Mat4::from_rotation_y(0.5) * Mat4::from_rotation_z(0.7);
        assert!(transform.matrix().abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn test_visibility_flag() {
        let mut graph = SceneGraph::new();
        let a = graph.add_node("a", Transform::IDENTITY);
        assert!(graph.is_visible(a));
        graph.set_visible(a, false).unwrap();
        assert!(!graph.is_visible(a));
    }
}
