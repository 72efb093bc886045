//! Simulation Context
//!
//! [`SimulationContext`] owns everything a frame touches: the scene, the
//! camera node, the physics world, the entity registry, the asset server
//! and the orbit controls. The scheduler borrows it for the length of a
//! tick; nothing lives in globals.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut ctx = SimulationContext::new(&SimulationConfig::default())?;
//! ctx.add_ground(10.0);
//! let ball = ctx.spawn_sphere(0.5, Vec3::new(0.0, 3.0, 0.0));
//! // ... tick ...
//! ctx.shutdown();
//! ```

use std::f32::consts::FRAC_PI_2;

use glam::{Quat, Vec3};

use crate::assets::AssetServer;
use crate::config::SimulationConfig;
use crate::errors::Result;
use crate::physics::{Body, BodyHandle, ContactMaterial, MaterialKey, PhysicsMaterial, PhysicsWorld, Shape};
use crate::registry::{EntityKey, EntityRegistry};
use crate::scene::{Camera, Geometry, Light, Material, Mesh, NodeHandle, Scene, ShadowConfig};
use crate::utils::OrbitControls;

pub struct SimulationContext {
    pub scene: Scene,
    /// The active camera's node
    pub camera: NodeHandle,
    pub world: PhysicsWorld,
    pub entities: EntityRegistry,
    pub assets: AssetServer,
    pub controls: Option<OrbitControls>,

    /// Physics material shared by everything spawned through the context
    pub default_material: MaterialKey,
    /// Look of spawned meshes
    pub mesh_material: Material,
}

impl SimulationContext {
    /// Validates `config` and builds an empty world with a camera looking at
    /// the configured target.
    pub fn new(config: &SimulationConfig) -> Result<Self> {
        config.validate()?;

        let mut scene = Scene::new();
        let cam = &config.camera;
        let position = Vec3::from_array(cam.position);
        let target = Vec3::from_array(cam.target);
        let camera = scene.add_camera(Camera::new_perspective(cam.fov, cam.aspect, cam.near, cam.far));
        if let Some(node) = scene.get_node_mut(camera) {
            node.transform.position = position;
            node.transform.look_at(target, Vec3::Y);
        }

        let mut world = PhysicsWorld::from_config(config);
        let default_material = world.add_material(PhysicsMaterial::new("default"));
        world.add_contact_material(ContactMaterial::new(
            default_material,
            default_material,
            config.default_contact.friction,
            config.default_contact.restitution,
        ));

        let assets = AssetServer::new(config.asset_worker_threads)?;

        log::info!(
            "Simulation context ready: step {:.4}s, max {} sub-steps",
            config.fixed_time_step,
            config.max_sub_steps
        );

        Ok(Self {
            scene,
            camera,
            world,
            entities: EntityRegistry::new(),
            assets,
            controls: Some(OrbitControls::looking_from(position, target)),
            default_material,
            mesh_material: Material::standard(0.3, 0.4),
        })
    }

    /// Adds a static floor: a `size` x `size` plane mesh and an infinite
    /// plane body, both facing +Y. The floor is not a registered entity, so
    /// [`SimulationContext::reset`] leaves it alone.
    pub fn add_ground(&mut self, size: f32) -> (NodeHandle, BodyHandle) {
        let rotation = Quat::from_rotation_x(-FRAC_PI_2);

        let mut material = self.mesh_material.clone();
        material.color = Vec3::splat(0.5);
        let mesh = Mesh::new(Geometry::plane(size, size), material).receiving_shadow();
        let node = self.scene.add_mesh("Floor", mesh, Vec3::ZERO);
        if let Some(n) = self.scene.get_node_mut(node) {
            n.transform.rotation = rotation;
        }

        let body = self.world.add_body(
            Body::new(0.0, Shape::Plane)
                .with_orientation(rotation)
                .with_material(self.default_material),
        );
        (node, body)
    }

    /// Adds a soft white ambient light and a weak shadow-casting directional
    /// light at (5, 5, 5) whose shadow box covers a 14 x 14 floor.
    pub fn add_default_lights(&mut self) -> (NodeHandle, NodeHandle) {
        let ambient = self.scene.add_light(Light::new_ambient(Vec3::ONE, 0.7), Vec3::ZERO);
        let sun = Light::new_directional(Vec3::ONE, 0.2).with_shadow(ShadowConfig {
            map_size: 1024,
            far: 15.0,
            extent: 7.0,
            ..ShadowConfig::default()
        });
        let sun = self.scene.add_light(sun, Vec3::splat(5.0));
        (ambient, sun)
    }

    /// Spawns a unit-mass sphere entity.
    pub fn spawn_sphere(&mut self, radius: f32, position: Vec3) -> EntityKey {
        let mesh = Mesh::new(Geometry::sphere(radius), self.mesh_material.clone()).casting_shadow();
        let body = Body::new(1.0, Shape::Sphere { radius });
        self.spawn("Sphere", mesh, body, position)
    }

    /// Spawns a unit-mass box entity of the given full dimensions.
    pub fn spawn_box(&mut self, width: f32, height: f32, depth: f32, position: Vec3) -> EntityKey {
        let mesh = Mesh::new(Geometry::cuboid(width, height, depth), self.mesh_material.clone()).casting_shadow();
        let body = Body::new(
            1.0,
            Shape::Cuboid {
                half_extents: Vec3::new(width, height, depth) * 0.5,
            },
        );
        self.spawn("Box", mesh, body, position)
    }

    /// Adds a mesh node and a body at `position` and registers them as one entity.
    pub fn spawn(&mut self, name: &str, mesh: Mesh, body: Body, position: Vec3) -> EntityKey {
        let node = self.scene.add_mesh(name, mesh, position);
        let body = body.with_position(position).with_material(self.default_material);
        let body = self.world.add_body(body);
        self.entities.spawn(node, body, true)
    }

    /// Removes one entity from the scene and the world.
    pub fn despawn(&mut self, key: EntityKey) -> bool {
        self.entities.despawn(key, &mut self.scene, &mut self.world)
    }

    /// Removes every spawned entity. Returns how many were removed.
    pub fn reset(&mut self) -> usize {
        self.entities.reset(&mut self.scene, &mut self.world)
    }

    /// Body of a spawned entity.
    #[must_use]
    pub fn body_of(&self, key: EntityKey) -> Option<&Body> {
        self.world.body(self.entities.get(key)?.body)
    }

    /// Node position of a spawned entity.
    #[must_use]
    pub fn node_position(&self, key: EntityKey) -> Option<Vec3> {
        let node = self.scene.get_node(self.entities.get(key)?.node)?;
        Some(node.transform.position)
    }

    /// Applies orbit input to the camera node. Called by the scheduler each tick.
    pub fn update_controls(&mut self, dt: f32) {
        if let Some(controls) = self.controls.as_mut()
            && let Some(node) = self.scene.get_node_mut(self.camera)
        {
            controls.update(&mut node.transform, dt.max(0.0));
        }
    }

    /// Resize handler for the active camera.
    pub fn resize(&mut self, width: u32, height: u32) {
        if height == 0 {
            return;
        }
        if let Some(camera) = self.scene.active_camera_mut() {
            camera.set_aspect(width as f32 / height as f32);
        }
    }

    /// Stops the asset workers and drops the scene and world.
    pub fn shutdown(mut self) {
        let entities = self.entities.len();
        self.assets.shutdown();
        log::info!(
            "Simulation context shut down ({} entities, {} bodies, {} nodes)",
            entities,
            self.world.body_count(),
            self.scene.node_count()
        );
    }
}
