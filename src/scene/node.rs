use glam::Affine3A;

use crate::scene::mesh::Mesh;
use crate::scene::transform::Transform;
use crate::scene::{CameraKey, LightKey, NodeHandle};

/// A scene node.
///
/// # Hierarchy
///
/// Nodes form a tree through parent-child links:
/// - `parent`: handle to the parent node (`None` for root nodes)
/// - `children`: handles of child nodes
///
/// Only [`Scene`](crate::scene::Scene) edits these links so both sides stay
/// in agreement.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,

    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,

    pub transform: Transform,

    /// Visibility flag; invisible nodes and their subtrees are not drawn
    pub visible: bool,

    pub mesh: Option<Mesh>,
    pub camera: Option<CameraKey>,
    pub light: Option<LightKey>,
}

impl Node {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parent: None,
            children: Vec::new(),
            transform: Transform::new(),
            visible: true,
            mesh: None,
            camera: None,
            light: None,
        }
    }

    #[must_use]
    pub fn with_mesh(name: &str, mesh: Mesh) -> Self {
        Self {
            mesh: Some(mesh),
            ..Self::new(name)
        }
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    /// World transformation matrix, refreshed by the transform system each tick.
    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.transform.world_matrix
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new("Node")
    }
}
