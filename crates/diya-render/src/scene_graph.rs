//! Retained scene graph: named nodes with transforms, parents, and a payload

use crate::primitives::Mesh;
use diya_core::{mat4_mul, Color, NodeId, PointCloudHost, PointStyle, Transform, Vec3};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Surface appearance of a mesh node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Color,
    pub emissive: Color,
    pub emissive_intensity: f32,
    pub opacity: f32,
    /// Skip lighting and output `color` directly (fog still applies)
    pub unlit: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            emissive: Color::BLACK,
            emissive_intensity: 1.0,
            opacity: 1.0,
            unlit: false,
        }
    }
}

impl Material {
    pub fn lit(color: Color) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }

    pub fn unlit(color: Color) -> Self {
        Self {
            color,
            unlit: true,
            ..Default::default()
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.opacity < 1.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    Ambient {
        color: Color,
        intensity: f32,
    },
    Hemisphere {
        sky: Color,
        ground: Color,
        intensity: f32,
    },
    Point {
        color: Color,
        intensity: f32,
        /// Cutoff distance; zero means unbounded
        distance: f32,
        decay: f32,
    },
}

/// A set of points drawn as camera-facing quads
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    pub positions: Vec<Vec3>,
    pub style: PointStyle,
    /// Bumped on every position upload so renderers can skip unchanged clouds
    pub revision: u64,
}

impl PointCloud {
    pub fn new(positions: Vec<Vec3>, style: PointStyle) -> Self {
        Self {
            positions,
            style,
            revision: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Group,
    Mesh { mesh: Arc<Mesh>, material: Material },
    Points(PointCloud),
    Light(Light),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub kind: NodeKind,
    parent: Option<NodeId>,
}

impl Node {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            transform: Transform::IDENTITY,
            kind,
            parent: None,
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Group)
    }

    pub fn mesh(name: impl Into<String>, mesh: Mesh, material: Material) -> Self {
        Self::new(
            name,
            NodeKind::Mesh {
                mesh: Arc::new(mesh),
                material,
            },
        )
    }

    pub fn light(name: impl Into<String>, light: Light) -> Self {
        Self::new(name, NodeKind::Light(light))
    }

    pub fn points(name: impl Into<String>, cloud: PointCloud) -> Self {
        Self::new(name, NodeKind::Points(cloud))
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn as_points(&self) -> Option<&PointCloud> {
        match &self.kind {
            NodeKind::Points(cloud) => Some(cloud),
            _ => None,
        }
    }
}

/// Exponential-squared distance fog
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    pub color: Color,
    pub density: f32,
}

/// The scene graph. Ids are never reused within one graph.
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: BTreeMap<NodeId, Node>,
    next_id: u64,
    pub fog: Option<Fog>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> NodeId {
        self.next_id += 1;
        NodeId::from_raw(self.next_id)
    }

    /// Add a node at the root
    pub fn add(&mut self, mut node: Node) -> NodeId {
        let id = self.allocate_id();
        node.parent = None;
        self.nodes.insert(id, node);
        id
    }

    /// Add a node under `parent`. Returns `None` if the parent is not in the graph.
    pub fn add_child(&mut self, parent: NodeId, mut node: Node) -> Option<NodeId> {
        if !self.nodes.contains_key(&parent) {
            return None;
        }
        let id = self.allocate_id();
        node.parent = Some(parent);
        self.nodes.insert(id, node);
        Some(id)
    }

    /// Remove a node and all of its descendants. Returns how many nodes went away.
    pub fn remove(&mut self, id: NodeId) -> usize {
        if !self.nodes.contains_key(&id) {
            return 0;
        }

        let mut doomed = vec![id];
        let mut cursor = 0;
        while cursor < doomed.len() {
            let current = doomed[cursor];
            doomed.extend(
                self.nodes
                    .iter()
                    .filter(|(_, n)| n.parent == Some(current))
                    .map(|(child, _)| *child),
            );
            cursor += 1;
        }

        for node in &doomed {
            self.nodes.remove(node);
        }
        doomed.len()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.fog = None;
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, n)| n.name == name)
            .map(|(id, _)| *id)
    }

    pub fn children(&self, parent: NodeId) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, n)| n.parent == Some(parent))
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().map(|(id, n)| (*id, n))
    }

    /// Number of point-cloud nodes currently in the graph
    pub fn point_cloud_count(&self) -> usize {
        self.nodes.values().filter(|n| n.as_points().is_some()).count()
    }

    /// World-space matrix for a node, walking the parent chain
    pub fn world_matrix(&self, id: NodeId) -> Option<[[f32; 4]; 4]> {
        let node = self.nodes.get(&id)?;
        let local = node.transform.to_matrix();
        match node.parent {
            Some(parent) => {
                let parent_mat = self.world_matrix(parent)?;
                Some(mat4_mul(&parent_mat, &local))
            }
            None => Some(local),
        }
    }

    /// World-space origin of a node
    pub fn world_position(&self, id: NodeId) -> Option<Vec3> {
        self.world_matrix(id)
            .map(|m| Vec3::new(m[3][0], m[3][1], m[3][2]))
    }
}

impl PointCloudHost for SceneGraph {
    fn attach_points(&mut self, positions: &[Vec3], style: PointStyle) -> NodeId {
        self.add(Node::points("burst", PointCloud::new(positions.to_vec(), style)))
    }

    fn update_points(&mut self, node: NodeId, positions: &[Vec3], opacity: f32) {
        if let Some(Node {
            kind: NodeKind::Points(cloud),
            ..
        }) = self.nodes.get_mut(&node)
        {
            cloud.positions.clear();
            cloud.positions.extend_from_slice(positions);
            cloud.style.opacity = opacity;
            cloud.revision += 1;
        }
    }

    fn release_points(&mut self, node: NodeId) {
        self.remove(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_get() {
        let mut graph = SceneGraph::new();
        let id = graph.add(Node::group("lamp"));
        assert!(graph.contains(id));
        assert_eq!(graph.get(id).map(|n| n.name.as_str()), Some("lamp"));
        assert_eq!(graph.find_by_name("lamp"), Some(id));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_add_child_requires_parent() {
        let mut graph = SceneGraph::new();
        assert!(graph.add_child(NodeId::from_raw(99), Node::group("orphan")).is_none());
        assert!(graph.is_empty());
    }

    #[test]
    fn test_remove_takes_descendants() {
        let mut graph = SceneGraph::new();
        let root = graph.add(Node::group("root"));
        let child = graph.add_child(root, Node::group("child")).unwrap();
        let grandchild = graph.add_child(child, Node::group("grandchild")).unwrap();
        let other = graph.add(Node::group("other"));

        assert_eq!(graph.remove(root), 3);
        assert!(!graph.contains(grandchild));
        assert!(graph.contains(other));
        assert_eq!(graph.remove(root), 0);
    }

    #[test]
    fn test_ids_not_reused() {
        let mut graph = SceneGraph::new();
        let a = graph.add(Node::group("a"));
        graph.remove(a);
        let b = graph.add(Node::group("b"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_world_matrix_walks_parents() {
        let mut graph = SceneGraph::new();
        let parent = graph.add(
            Node::group("parent").with_transform(Transform::from_position(Vec3::new(1.0, 2.0, 3.0))),
        );
        let child = graph
            .add_child(
                parent,
                Node::group("child").with_transform(Transform::from_position(Vec3::new(0.0, 0.5, 0.0))),
            )
            .unwrap();

        let p = graph.world_position(child).unwrap();
        assert!((p.x - 1.0).abs() < 1e-6);
        assert!((p.y - 2.5).abs() < 1e-6);
        assert!((p.z - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_point_cloud_host() {
        let mut graph = SceneGraph::new();
        let node = graph.attach_points(&[Vec3::ZERO; 4], PointStyle::default());
        assert_eq!(graph.point_cloud_count(), 1);

        graph.update_points(node, &[Vec3::ONE; 4], 0.25);
        let cloud = graph.get(node).and_then(Node::as_points).unwrap();
        assert_eq!(cloud.positions, vec![Vec3::ONE; 4]);
        assert_eq!(cloud.style.opacity, 0.25);
        assert_eq!(cloud.revision, 1);

        graph.release_points(node);
        assert_eq!(graph.point_cloud_count(), 0);
        // Second release is harmless
        graph.release_points(node);
        graph.update_points(node, &[Vec3::ZERO], 1.0);
        assert!(graph.is_empty());
    }
}
