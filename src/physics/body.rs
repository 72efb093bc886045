use bitflags::bitflags;
use glam::{Quat, Vec3};
use rapier3d::prelude::{
    ActiveHooks, ColliderBuilder, Group, InteractionGroups, RigidBodyBuilder, RigidBodyType, Vector,
};

use crate::physics::{MaterialKey, convert};

/// Collision shape, centered on the body's position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Sphere { radius: f32 },
    Cuboid { half_extents: Vec3 },
    /// Infinite plane through the body's position. Its normal is the body's local +Z.
    Plane,
}

/// How a body takes part in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyType {
    /// Moved by forces, gravity and contacts.
    Dynamic,
    /// Never moves.
    Static,
    /// Moves only by its velocity; pushes dynamic bodies but is never pushed.
    Kinematic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SleepState {
    #[default]
    Awake,
    Sleeping,
}

bitflags! {
    /// Collision filter bits. Two bodies collide when each one's group is in the other's mask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CollisionGroups: u32 {
        const GROUP_1 = 1 << 0;
        const GROUP_2 = 1 << 1;
        const GROUP_3 = 1 << 2;
        const GROUP_4 = 1 << 3;
        const GROUP_5 = 1 << 4;
        const GROUP_6 = 1 << 5;
        const GROUP_7 = 1 << 6;
        const GROUP_8 = 1 << 7;
        const ALL = u32::MAX;
    }
}

/// A rigid body as the rest of the engine sees it.
///
/// Before insertion this is the description the world builds its rapier
/// body and collider from. Once inserted, the world refreshes the pose,
/// velocities and sleep state after every internal step. Edits made through
/// [`PhysicsWorld::body_mut`](crate::physics::PhysicsWorld::body_mut) are
/// pushed back before the next step.
#[derive(Debug, Clone)]
pub struct Body {
    pub shape: Shape,
    pub position: Vec3,
    pub orientation: Quat,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,

    pub linear_damping: f32,
    pub angular_damping: f32,
    /// Keep the orientation fixed regardless of torques and contacts.
    pub fixed_rotation: bool,

    pub material: Option<MaterialKey>,
    pub collision_group: CollisionGroups,
    pub collision_mask: CollisionGroups,

    pub allow_sleep: bool,
    /// Speed under which the body counts as resting.
    pub sleep_speed_limit: f32,
    /// Seconds the body must rest before it falls asleep.
    pub sleep_time_limit: f32,

    mass: f32,
    kinematic: bool,
    pub(crate) sleep_state: SleepState,
}

impl Body {
    /// A body of `mass` kilograms. Zero (or negative) mass makes it static,
    /// and planes are always static.
    #[must_use]
    pub fn new(mass: f32, shape: Shape) -> Self {
        Self {
            shape,
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,

            linear_damping: 0.01,
            angular_damping: 0.01,
            fixed_rotation: false,

            material: None,
            collision_group: CollisionGroups::GROUP_1,
            collision_mask: CollisionGroups::ALL,

            allow_sleep: true,
            sleep_speed_limit: 0.1,
            sleep_time_limit: 1.0,

            mass: mass.max(0.0),
            kinematic: false,
            sleep_state: SleepState::Awake,
        }
    }

    /// A massless body that moves only by the velocity it is given.
    #[must_use]
    pub fn kinematic(shape: Shape) -> Self {
        Self {
            kinematic: true,
            ..Self::new(0.0, shape)
        }
    }

    #[must_use]
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    #[must_use]
    pub fn with_orientation(mut self, orientation: Quat) -> Self {
        self.orientation = orientation.normalize();
        self
    }

    #[must_use]
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    #[must_use]
    pub fn with_material(mut self, material: MaterialKey) -> Self {
        self.material = Some(material);
        self
    }

    #[must_use]
    pub fn with_damping(mut self, linear: f32, angular: f32) -> Self {
        self.linear_damping = linear;
        self.angular_damping = angular;
        self
    }

    #[must_use]
    pub fn with_fixed_rotation(mut self) -> Self {
        self.fixed_rotation = true;
        self
    }

    #[must_use]
    pub fn with_collision_filter(mut self, group: CollisionGroups, mask: CollisionGroups) -> Self {
        self.collision_group = group;
        self.collision_mask = mask;
        self
    }

    #[inline]
    #[must_use]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    #[must_use]
    pub fn body_type(&self) -> BodyType {
        if self.kinematic {
            BodyType::Kinematic
        } else if self.mass > 0.0 && self.shape != Shape::Plane {
            BodyType::Dynamic
        } else {
            BodyType::Static
        }
    }

    #[inline]
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        self.body_type() == BodyType::Dynamic
    }

    /// Velocity of the material point at `world_point`.
    #[must_use]
    pub fn velocity_at(&self, world_point: Vec3) -> Vec3 {
        self.velocity + self.angular_velocity.cross(world_point - self.position)
    }

    /// Outward normal of a plane body.
    #[must_use]
    pub fn plane_normal(&self) -> Vec3 {
        self.orientation * Vec3::Z
    }

    #[inline]
    #[must_use]
    pub fn sleep_state(&self) -> SleepState {
        self.sleep_state
    }

    #[inline]
    #[must_use]
    pub fn is_sleeping(&self) -> bool {
        self.sleep_state == SleepState::Sleeping
    }

    /// Asks the world to wake the body at the next step.
    pub fn wake_up(&mut self) {
        self.sleep_state = SleepState::Awake;
    }

    /// Asks the world to put the body to sleep at the next step.
    pub fn sleep(&mut self) {
        self.sleep_state = SleepState::Sleeping;
    }

    pub(crate) fn rigid_body_type(&self) -> RigidBodyType {
        match self.body_type() {
            BodyType::Dynamic => RigidBodyType::Dynamic,
            BodyType::Static => RigidBodyType::Fixed,
            BodyType::Kinematic => RigidBodyType::KinematicVelocityBased,
        }
    }

    pub(crate) fn interaction_groups(&self) -> InteractionGroups {
        InteractionGroups::new(
            Group::from_bits_truncate(self.collision_group.bits()),
            Group::from_bits_truncate(self.collision_mask.bits()),
        )
    }

    pub(crate) fn rigid_body_builder(&self, user_data: u128) -> RigidBodyBuilder {
        let mut builder = RigidBodyBuilder::new(self.rigid_body_type())
            .position(convert::isometry(self.position, self.orientation))
            .linvel(convert::vector(self.velocity))
            .angvel(convert::vector(self.angular_velocity))
            .linear_damping(self.linear_damping)
            .angular_damping(self.angular_damping)
            .user_data(user_data);
        if self.fixed_rotation {
            builder = builder.lock_rotations();
        }
        builder
    }

    pub(crate) fn collider_builder(&self) -> ColliderBuilder {
        let builder = match self.shape {
            Shape::Sphere { radius } => ColliderBuilder::ball(radius),
            Shape::Cuboid { half_extents: h } => ColliderBuilder::cuboid(h.x, h.y, h.z),
            Shape::Plane => ColliderBuilder::halfspace(Vector::z_axis()),
        };
        let builder = builder
            .collision_groups(self.interaction_groups())
            .active_hooks(ActiveHooks::MODIFY_SOLVER_CONTACTS)
            .user_data(convert::material_data(self.material));
        if self.is_dynamic() {
            builder.mass(self.mass)
        } else {
            builder
        }
    }
}
