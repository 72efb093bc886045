//! Rigid-Body Physics
//!
//! Fixed-step rigid-body world for the spheres, boxes and ground planes the
//! frame loop drives. Collision detection and the contact solver are rapier's.
//!
//! - [`Body`] / [`Shape`]: mass, shape, pose and velocities of one body
//! - [`PhysicsMaterial`] / [`ContactMaterial`]: friction and restitution,
//!   resolved per pair and handed to rapier's solver contacts
//! - [`EventBus`]: collision events fanned out over flume channels
//! - [`PhysicsWorld`]: owns the rapier pipeline, body mirrors and the
//!   fixed-step accumulator
//!
//! # Stepping
//!
//! [`PhysicsWorld::step`] accumulates real time and runs whole
//! `fixed_time_step` steps, at most `max_sub_steps` per call. Time beyond
//! that cap is dropped so a long stall never turns into a catch-up spiral.
//!
//! ```rust,ignore
//! let mut world = PhysicsWorld::new();
//! let ball = world.add_body(Body::new(1.0, Shape::Sphere { radius: 0.5 })
//!     .with_position(Vec3::new(0.0, 3.0, 0.0)));
//! world.step(1.0 / 60.0, delta, 3);
//! ```

pub mod body;
mod convert;
pub mod events;
pub mod material;
pub mod world;

pub use body::{Body, BodyType, CollisionGroups, Shape, SleepState};
pub use events::{CollisionEvent, EventBus};
pub use material::{ContactMaterial, PhysicsMaterial};
pub use world::{PhysicsWorld, StepReport};

use slotmap::new_key_type;

new_key_type! {
    pub struct BodyHandle;
    pub struct MaterialKey;
}
