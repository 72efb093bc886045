//! Drawing surfaces.
//!
//! The scheduler finishes every tick by handing the scene and the active
//! camera to a [`FrameSurface`]. A GPU renderer would implement the trait;
//! the two surfaces here serve headless runs.

use glam::Vec3;

use crate::scene::{Camera, NodeHandle, Scene};

pub trait FrameSurface {
    /// Draws one frame. World matrices are current when this is called.
    fn draw(&mut self, scene: &Scene, camera: &Camera);
}

/// What one draw saw.
#[derive(Debug, Clone, Default)]
pub struct DrawRecord {
    pub camera_position: Vec3,
    /// World position of every visible mesh node
    pub meshes: Vec<(NodeHandle, Vec3)>,
    /// Visible light nodes and whether each casts a shadow
    pub lights: Vec<(NodeHandle, bool)>,
}

impl DrawRecord {
    #[must_use]
    pub fn position_of(&self, node: NodeHandle) -> Option<Vec3> {
        self.meshes.iter().find(|(h, _)| *h == node).map(|(_, p)| *p)
    }

    #[must_use]
    pub fn contains(&self, node: NodeHandle) -> bool {
        self.meshes.iter().any(|(h, _)| *h == node)
    }
}

/// Keeps a record of every draw.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub draws: Vec<DrawRecord>,
}

impl RecordingSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn draw_count(&self) -> usize {
        self.draws.len()
    }

    #[must_use]
    pub fn last(&self) -> Option<&DrawRecord> {
        self.draws.last()
    }
}

impl FrameSurface for RecordingSurface {
    fn draw(&mut self, scene: &Scene, camera: &Camera) {
        let meshes = scene
            .mesh_nodes()
            .filter(|(handle, _, _)| scene.is_visible(*handle))
            .map(|(handle, node, _)| (handle, node.transform.world_position()))
            .collect();
        let lights = scene
            .light_nodes()
            .filter(|(handle, _, _)| scene.is_visible(*handle))
            .map(|(handle, _, light)| (handle, light.casts_shadow()))
            .collect();
        self.draws.push(DrawRecord {
            camera_position: camera.position(),
            meshes,
            lights,
        });
    }
}

/// Logs a one-line summary per draw at trace level.
#[derive(Debug, Default)]
pub struct LogSurface {
    frames: u64,
}

impl LogSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl FrameSurface for LogSurface {
    fn draw(&mut self, scene: &Scene, camera: &Camera) {
        self.frames += 1;
        log::trace!(
            "Frame {}: {} nodes, {} meshes, {} lights, camera at {:?}",
            self.frames,
            scene.node_count(),
            scene.mesh_nodes().count(),
            scene.lights.len(),
            camera.position()
        );
    }
}
