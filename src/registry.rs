//! Entity Registry
//!
//! Pairs a scene node with a physics body. The pair is the unit the frame
//! loop keeps in agreement: once per tick, after the physics step, the
//! body's pose is copied onto the node. Nothing ever flows the other way.
//!
//! Removal always takes both halves out together so the world never keeps
//! an invisible collider and the scene never keeps a frozen mesh.

use slotmap::{SlotMap, new_key_type};

use crate::physics::{BodyHandle, PhysicsWorld};
use crate::scene::{NodeHandle, Scene};

new_key_type! {
    pub struct EntityKey;
}

/// A node/body pair kept in sync every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdatableEntity {
    pub node: NodeHandle,
    pub body: BodyHandle,
    /// Copy orientation as well as position.
    pub sync_rotation: bool,
}

#[derive(Default)]
pub struct EntityRegistry {
    entities: SlotMap<EntityKey, UpdatableEntity>,
}

impl EntityRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an existing node/body pair.
    pub fn spawn(&mut self, node: NodeHandle, body: BodyHandle, sync_rotation: bool) -> EntityKey {
        self.entities.insert(UpdatableEntity {
            node,
            body,
            sync_rotation,
        })
    }

    /// Removes an entity from the registry, the scene and the world.
    ///
    /// Returns false if `key` was not registered.
    pub fn despawn(&mut self, key: EntityKey, scene: &mut Scene, world: &mut PhysicsWorld) -> bool {
        let Some(entity) = self.entities.remove(key) else {
            return false;
        };
        scene.remove_node(entity.node);
        world.remove_body(entity.body);
        true
    }

    /// Drains every entity from the registry, the scene and the world.
    ///
    /// Returns the number of entities removed.
    pub fn reset(&mut self, scene: &mut Scene, world: &mut PhysicsWorld) -> usize {
        let drained: Vec<UpdatableEntity> = self.entities.drain().map(|(_, e)| e).collect();
        for entity in &drained {
            scene.remove_node(entity.node);
            world.remove_body(entity.body);
        }
        log::info!("Registry reset, removed {} entities", drained.len());
        drained.len()
    }

    /// Copies each body's pose onto its node. Returns how many pairs were synced.
    ///
    /// Pairs whose node or body has disappeared are skipped with a warning.
    pub fn sync(&self, scene: &mut Scene, world: &PhysicsWorld) -> usize {
        let mut synced = 0;
        for (key, entity) in &self.entities {
            let (Some(body), Some(node)) = (world.body(entity.body), scene.get_node_mut(entity.node))
            else {
                log::warn!("Entity {key:?} has a missing node or body, skipping sync");
                continue;
            };
            node.transform
                .set_pose(body.position, entity.sync_rotation.then_some(body.orientation));
            synced += 1;
        }
        synced
    }

    #[must_use]
    pub fn get(&self, key: EntityKey) -> Option<&UpdatableEntity> {
        self.entities.get(key)
    }

    /// Looks up the entity owning `body`.
    #[must_use]
    pub fn find_by_body(&self, body: BodyHandle) -> Option<(EntityKey, &UpdatableEntity)> {
        self.entities.iter().find(|(_, e)| e.body == body)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityKey, &UpdatableEntity)> {
        self.entities.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
