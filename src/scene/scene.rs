use glam::{Vec3, Vec4};
use slotmap::SlotMap;

use crate::assets::prefab::Prefab;
use crate::scene::camera::Camera;
use crate::scene::light::Light;
use crate::scene::mesh::Mesh;
use crate::scene::node::Node;
use crate::scene::transform_system;
use crate::scene::{CameraKey, LightKey, NodeHandle};

/// Scene graph container.
///
/// `Scene` is pure data: the node hierarchy plus its components. Nothing
/// here talks to a GPU; a [`FrameSurface`](crate::surface::FrameSurface)
/// reads the scene when the scheduler asks it to draw.
pub struct Scene {
    pub nodes: SlotMap<NodeHandle, Node>,
    pub root_nodes: Vec<NodeHandle>,

    pub cameras: SlotMap<CameraKey, Camera>,
    pub active_camera: Option<NodeHandle>,

    pub lights: SlotMap<LightKey, Light>,

    pub background: Option<Vec4>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            root_nodes: Vec::new(),
            cameras: SlotMap::with_key(),
            active_camera: None,
            lights: SlotMap::with_key(),
            background: Some(Vec4::new(0.0, 0.0, 0.0, 1.0)),
        }
    }

    pub fn build_node(&'_ mut self, name: &str) -> NodeBuilder<'_> {
        NodeBuilder::new(self, name)
    }

    /// Adds a node at the root of the scene.
    pub fn add_node(&mut self, node: Node) -> NodeHandle {
        let handle = self.nodes.insert(node);
        self.root_nodes.push(handle);
        handle
    }

    pub fn add_to_parent(&mut self, mut child: Node, parent: NodeHandle) -> NodeHandle {
        if !self.nodes.contains_key(parent) {
            log::warn!("Parent node not found, adding '{}' at the root", child.name);
            return self.add_node(child);
        }
        child.parent = Some(parent);
        let handle = self.nodes.insert(child);
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(handle);
        }
        handle
    }

    /// Adds a mesh node at `position`.
    pub fn add_mesh(&mut self, name: &str, mesh: Mesh, position: Vec3) -> NodeHandle {
        let mut node = Node::with_mesh(name, mesh);
        node.transform.position = position;
        self.add_node(node)
    }

    /// Adds a camera node. The first camera added becomes the active one.
    pub fn add_camera(&mut self, camera: Camera) -> NodeHandle {
        let mut node = Node::new(&camera.name);
        node.camera = Some(self.cameras.insert(camera));
        let handle = self.add_node(node);
        if self.active_camera.is_none() {
            self.active_camera = Some(handle);
        }
        handle
    }

    /// Adds a light node at `position`. Directional and spot lights are aimed
    /// at the origin; re-aim them through the node's transform.
    pub fn add_light(&mut self, light: Light, position: Vec3) -> NodeHandle {
        let mut node = Node::new("Light");
        node.transform.position = position;
        if light.is_aimed() {
            node.transform.look_at(Vec3::ZERO, Vec3::Y);
        }
        node.light = Some(self.lights.insert(light));
        self.add_node(node)
    }

    /// Removes a node and, recursively, all of its children.
    ///
    /// Returns the number of nodes removed (0 if `handle` was stale).
    pub fn remove_node(&mut self, handle: NodeHandle) -> usize {
        let Some(node) = self.nodes.get(handle) else {
            return 0;
        };

        match node.parent {
            Some(parent) => {
                if let Some(p) = self.nodes.get_mut(parent) {
                    p.children.retain(|&c| c != handle);
                }
            }
            None => self.root_nodes.retain(|&r| r != handle),
        }

        let mut removed = 0;
        let mut stack = vec![handle];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.remove(current) else {
                continue;
            };
            if let Some(camera_key) = node.camera {
                self.cameras.remove(camera_key);
            }
            if let Some(light_key) = node.light {
                self.lights.remove(light_key);
            }
            if self.active_camera == Some(current) {
                self.active_camera = None;
            }
            stack.extend(node.children);
            removed += 1;
        }
        removed
    }

    /// Re-parents `child` under `parent`.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) {
        if child == parent {
            log::warn!("Cannot attach node to itself!");
            return;
        }
        if !self.nodes.contains_key(child) || !self.nodes.contains_key(parent) {
            log::error!("Attach failed: node not found");
            return;
        }
        if self.is_ancestor(child, parent) {
            log::warn!("Cannot attach a node below its own descendant");
            return;
        }

        let old_parent = self.nodes.get(child).and_then(|n| n.parent);
        match old_parent {
            Some(p) => {
                if let Some(n) = self.nodes.get_mut(p) {
                    n.children.retain(|&c| c != child);
                }
            }
            None => self.root_nodes.retain(|&r| r != child),
        }

        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(parent);
            c.transform.mark_dirty();
        }
    }

    fn is_ancestor(&self, ancestor: NodeHandle, node: NodeHandle) -> bool {
        let mut current = self.nodes.get(node).and_then(|n| n.parent);
        while let Some(handle) = current {
            if handle == ancestor {
                return true;
            }
            current = self.nodes.get(handle).and_then(|n| n.parent);
        }
        false
    }

    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    #[must_use]
    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.nodes.contains_key(handle)
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<NodeHandle> {
        self.nodes
            .iter()
            .find_map(|(handle, node)| (node.name == name).then_some(handle))
    }

    /// Iterates nodes carrying a mesh.
    pub fn mesh_nodes(&self) -> impl Iterator<Item = (NodeHandle, &Node, &Mesh)> {
        self.nodes
            .iter()
            .filter_map(|(handle, node)| node.mesh.as_ref().map(|mesh| (handle, node, mesh)))
    }

    /// Iterates nodes carrying a light.
    pub fn light_nodes(&self) -> impl Iterator<Item = (NodeHandle, &Node, &Light)> {
        self.nodes.iter().filter_map(|(handle, node)| {
            let light = self.lights.get(node.light?)?;
            Some((handle, node, light))
        })
    }

    #[must_use]
    pub fn get_light(&self, handle: NodeHandle) -> Option<&Light> {
        self.lights.get(self.nodes.get(handle)?.light?)
    }

    pub fn get_light_mut(&mut self, handle: NodeHandle) -> Option<&mut Light> {
        self.lights.get_mut(self.nodes.get(handle)?.light?)
    }

    /// Returns the active camera together with its node.
    #[must_use]
    pub fn active_camera(&self) -> Option<(NodeHandle, &Camera)> {
        let handle = self.active_camera?;
        let key = self.nodes.get(handle)?.camera?;
        Some((handle, self.cameras.get(key)?))
    }

    pub fn active_camera_mut(&mut self) -> Option<&mut Camera> {
        let key = self.nodes.get(self.active_camera?)?.camera?;
        self.cameras.get_mut(key)
    }

    /// Whether a node and all of its ancestors are visible.
    #[must_use]
    pub fn is_visible(&self, handle: NodeHandle) -> bool {
        let mut current = Some(handle);
        while let Some(h) = current {
            let Some(node) = self.nodes.get(h) else {
                return false;
            };
            if !node.visible {
                return false;
            }
            current = node.parent;
        }
        true
    }

    /// Refreshes world matrices for the whole scene. Called once per tick before drawing.
    pub fn update_matrix_world(&mut self) {
        transform_system::update_hierarchy_iterative(
            &mut self.nodes,
            &mut self.cameras,
            &self.root_nodes,
        );
    }

    pub fn update_subtree(&mut self, root: NodeHandle) {
        transform_system::update_subtree(&mut self.nodes, &mut self.cameras, root);
    }

    /// Instantiates a prefab under a new group node at the scene root.
    ///
    /// Returns the group handle; moving or scaling it moves the whole model.
    pub fn instantiate(&mut self, prefab: &Prefab, name: &str) -> NodeHandle {
        let group = self.add_node(Node::new(name));

        let mut handles: Vec<Option<NodeHandle>> = vec![None; prefab.nodes.len()];
        let mut stack: Vec<(usize, NodeHandle)> =
            prefab.root_indices.iter().rev().map(|&i| (i, group)).collect();

        while let Some((index, parent)) = stack.pop() {
            let Some(source) = prefab.nodes.get(index) else {
                log::warn!("Prefab references missing node {index}");
                continue;
            };
            if handles[index].is_some() {
                log::warn!("Prefab node {index} is referenced twice, skipping");
                continue;
            }
            let mut node = Node::new(source.name.as_deref().unwrap_or("Node"));
            node.transform = source.transform.clone();
            node.transform.mark_dirty();
            node.mesh.clone_from(&source.mesh);

            let handle = self.add_to_parent(node, parent);
            handles[index] = Some(handle);
            for &child in source.children_indices.iter().rev() {
                stack.push((child, handle));
            }
        }

        group
    }
}

pub struct NodeBuilder<'a> {
    scene: &'a mut Scene,
    node: Node,
    parent: Option<NodeHandle>,
}

impl<'a> NodeBuilder<'a> {
    pub fn new(scene: &'a mut Scene, name: &str) -> Self {
        Self {
            scene,
            node: Node::new(name),
            parent: None,
        }
    }

    #[must_use]
    pub fn with_position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.node.transform.position = Vec3::new(x, y, z);
        self
    }

    #[must_use]
    pub fn with_scale(mut self, s: f32) -> Self {
        self.node.transform.scale = Vec3::splat(s);
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent: NodeHandle) -> Self {
        self.parent = Some(parent);
        self
    }

    #[must_use]
    pub fn with_mesh(mut self, mesh: Mesh) -> Self {
        self.node.mesh = Some(mesh);
        self
    }

    pub fn build(self) -> NodeHandle {
        match self.parent {
            Some(parent) => self.scene.add_to_parent(self.node, parent),
            None => self.scene.add_node(self.node),
        }
    }
}
