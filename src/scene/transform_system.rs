//! Transform System
//!
//! World-matrix propagation over the node and camera maps. Works on the
//! maps directly so callers can hold other parts of the
//! [`Scene`](crate::scene::Scene) borrowed.

use glam::Affine3A;
use slotmap::SlotMap;

use crate::scene::camera::Camera;
use crate::scene::node::Node;
use crate::scene::{CameraKey, NodeHandle};

/// Pending visit: node, its parent's world matrix, whether an ancestor moved.
type Visit = (NodeHandle, Affine3A, bool);

fn propagate(nodes: &mut SlotMap<NodeHandle, Node>, cameras: &mut SlotMap<CameraKey, Camera>, mut pending: Vec<Visit>) {
    while let Some((handle, parent_world, ancestor_moved)) = pending.pop() {
        let Some(node) = nodes.get_mut(handle) else {
            continue;
        };

        let moved = node.transform.update_local_matrix() || ancestor_moved;
        if moved {
            let world = parent_world * node.transform.local_matrix;
            node.transform.set_world_matrix(world);
            if let Some(camera) = node.camera.and_then(|key| cameras.get_mut(key)) {
                camera.update_view_projection(&world);
            }
        }

        let world = node.transform.world_matrix;
        pending.extend(node.children.iter().rev().map(|&child| (child, world, moved)));
    }
}

/// Updates world matrices for every tree rooted at `roots`.
///
/// Walks with an explicit stack, so hierarchy depth is bounded by memory
/// rather than the call stack. Untouched branches keep their cached matrices.
pub fn update_hierarchy_iterative(
    nodes: &mut SlotMap<NodeHandle, Node>,
    cameras: &mut SlotMap<CameraKey, Camera>,
    roots: &[NodeHandle],
) {
    let mut pending = Vec::with_capacity(roots.len().max(64));
    pending.extend(roots.iter().rev().map(|&root| (root, Affine3A::IDENTITY, false)));
    propagate(nodes, cameras, pending);
}

/// Recomputes `root` and everything below it, starting from its parent's
/// current world matrix.
pub fn update_subtree(
    nodes: &mut SlotMap<NodeHandle, Node>,
    cameras: &mut SlotMap<CameraKey, Camera>,
    root: NodeHandle,
) {
    let Some(parent) = nodes.get(root).map(|n| n.parent) else {
        return;
    };
    let parent_world = parent
        .and_then(|p| nodes.get(p))
        .map_or(Affine3A::IDENTITY, |p| p.transform.world_matrix);
    propagate(nodes, cameras, vec![(root, parent_world, true)]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_hierarchy_update() {
        let mut nodes: SlotMap<NodeHandle, Node> = SlotMap::with_key();
        let mut cameras: SlotMap<CameraKey, Camera> = SlotMap::with_key();

        let mut parent = Node::default();
        parent.transform.position = Vec3::new(1.0, 0.0, 0.0);
        let parent_handle = nodes.insert(parent);

        let mut child = Node::default();
        child.transform.position = Vec3::new(0.0, 1.0, 0.0);
        child.parent = Some(parent_handle);
        let child_handle = nodes.insert(child);

        nodes.get_mut(parent_handle).unwrap().children.push(child_handle);

        update_hierarchy_iterative(&mut nodes, &mut cameras, &[parent_handle]);

        let child_world_pos = nodes.get(child_handle).unwrap().transform.world_matrix.translation;
        assert!((child_world_pos.x - 1.0).abs() < 1e-5);
        assert!((child_world_pos.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn moving_parent_moves_child() {
        let mut nodes: SlotMap<NodeHandle, Node> = SlotMap::with_key();
        let mut cameras: SlotMap<CameraKey, Camera> = SlotMap::with_key();

        let parent_handle = nodes.insert(Node::default());
        let mut child = Node::default();
        child.parent = Some(parent_handle);
        let child_handle = nodes.insert(child);
        nodes.get_mut(parent_handle).unwrap().children.push(child_handle);

        update_hierarchy_iterative(&mut nodes, &mut cameras, &[parent_handle]);
        nodes.get_mut(parent_handle).unwrap().transform.position = Vec3::new(0.0, 5.0, 0.0);
        update_hierarchy_iterative(&mut nodes, &mut cameras, &[parent_handle]);

        let y = nodes.get(child_handle).unwrap().transform.world_matrix.translation.y;
        assert!((y - 5.0).abs() < 1e-5);
    }
}
