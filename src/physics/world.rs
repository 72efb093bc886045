use std::num::NonZeroUsize;

use flume::Receiver;
use glam::Vec3;
use rapier3d::prelude::{
    CCDSolver, ColliderHandle, ColliderSet, DefaultBroadPhase, ImpulseJointSet, IntegrationParameters,
    IslandManager, MultibodyJointSet, NarrowPhase, PhysicsPipeline, RigidBody, RigidBodyHandle,
    RigidBodySet,
};
use rustc_hash::FxHashSet;
use slotmap::{SecondaryMap, SlotMap};

use crate::config::SimulationConfig;
use crate::physics::body::{Body, BodyType, SleepState};
use crate::physics::events::{CollisionEvent, EventBus};
use crate::physics::material::{ContactMaterial, ContactResolver, PhysicsMaterial};
use crate::physics::{BodyHandle, MaterialKey, convert};

/// Tolerance on the accumulator comparison, so a real delta of exactly
/// one fixed step is never lost to rounding.
const ACCUMULATOR_EPSILON: f64 = 1e-9;

/// What a call to [`PhysicsWorld::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StepReport {
    /// Internal steps run.
    pub sub_steps: u32,
    /// Accumulated time carried into the next call, in seconds.
    pub remainder: f64,
    /// Whether the sub-step cap was hit and surplus time discarded.
    pub capped: bool,
}

/// Where a [`Body`] lives inside rapier.
struct Link {
    rigid_body: RigidBodyHandle,
    collider: ColliderHandle,
    /// The body was handed out mutably and must be pushed back before stepping.
    dirty: bool,
    /// Forces were added and must be cleared after the next step.
    forced: bool,
}

/// The rapier pipeline and the sets it steps.
struct Rapier {
    pipeline: PhysicsPipeline,
    params: IntegrationParameters,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
}

impl Rapier {
    fn new() -> Self {
        Self {
            pipeline: PhysicsPipeline::new(),
            params: IntegrationParameters::default(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
        }
    }

    fn remove(&mut self, handle: RigidBodyHandle) {
        self.bodies.remove(
            handle,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    /// The engine handle stored on the rigid body owning `collider`.
    fn owner(&self, collider: ColliderHandle) -> Option<BodyHandle> {
        let parent = self.colliders.get(collider)?.parent()?;
        convert::handle_from_data(self.bodies.get(parent)?.user_data)
    }
}

/// The simulation world: bodies, materials and the fixed-step accumulator.
///
/// Rigid-body dynamics run in rapier. Each [`Body`] is mirrored: reads see
/// the state at the end of the last internal step, and edits made through
/// [`body_mut`](Self::body_mut) are pushed to rapier before the next one.
pub struct PhysicsWorld {
    pub gravity: Vec3,
    pub solver_iterations: u32,
    /// Master switch for body sleeping.
    pub allow_sleep: bool,
    pub default_contact_material: ContactMaterial,

    bodies: SlotMap<BodyHandle, Body>,
    links: SecondaryMap<BodyHandle, Link>,
    materials: SlotMap<MaterialKey, PhysicsMaterial>,
    contact_materials: Vec<ContactMaterial>,
    rapier: Rapier,
    /// `allow_sleep` as last pushed to rapier.
    sleep_policy: Option<bool>,

    accumulator: f64,
    time: f64,
    step_count: u64,

    events: EventBus<CollisionEvent>,
    touching: FxHashSet<(BodyHandle, BodyHandle)>,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    /// A world with default gravity and contact material.
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(&SimulationConfig::default())
    }

    #[must_use]
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            gravity: config.gravity(),
            solver_iterations: config.solver_iterations,
            allow_sleep: config.allow_sleep,
            default_contact_material: config.default_contact.into(),

            bodies: SlotMap::with_key(),
            links: SecondaryMap::new(),
            materials: SlotMap::with_key(),
            contact_materials: Vec::new(),
            rapier: Rapier::new(),
            sleep_policy: None,

            accumulator: 0.0,
            time: 0.0,
            step_count: 0,

            events: EventBus::new(),
            touching: FxHashSet::default(),
        }
    }

    // ========================================================================
    // Bodies
    // ========================================================================

    pub fn add_body(&mut self, body: Body) -> BodyHandle {
        let handle = self.bodies.insert(body);
        let body = &self.bodies[handle];

        let mut rigid_body = body.rigid_body_builder(convert::handle_data(handle)).build();
        configure_sleep(&mut rigid_body, body, self.allow_sleep);
        let rigid_body = self.rapier.bodies.insert(rigid_body);
        let collider = self.rapier.colliders.insert_with_parent(
            body.collider_builder().build(),
            rigid_body,
            &mut self.rapier.bodies,
        );

        self.links.insert(
            handle,
            Link {
                rigid_body,
                collider,
                dirty: body.is_sleeping(),
                forced: false,
            },
        );
        handle
    }

    /// Removes a body. Later steps never see it again, and no event will name it.
    pub fn remove_body(&mut self, handle: BodyHandle) -> Option<Body> {
        let body = self.bodies.remove(handle)?;
        if let Some(link) = self.links.remove(handle) {
            self.rapier.remove(link.rigid_body);
        }
        self.touching.retain(|&(a, b)| a != handle && b != handle);
        Some(body)
    }

    #[must_use]
    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(handle)
    }

    /// Mutable access to a body. Changes take effect at the next internal step.
    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        let body = self.bodies.get_mut(handle)?;
        if let Some(link) = self.links.get_mut(handle) {
            link.dirty = true;
        }
        Some(body)
    }

    #[must_use]
    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains_key(handle)
    }

    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &Body)> {
        self.bodies.iter()
    }

    #[must_use]
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Removes every body. Materials and subscribers are kept.
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.links.clear();
        self.rapier = Rapier::new();
        self.sleep_policy = None;
        self.touching.clear();
        self.accumulator = 0.0;
    }

    /// Adds a force at `world_point` for the next internal step. Wakes the body.
    /// Returns false for a stale handle.
    pub fn apply_force(&mut self, handle: BodyHandle, force: Vec3, world_point: Vec3) -> bool {
        let Some(rigid_body) = self.prepare_for_input(handle) else {
            return false;
        };
        rigid_body.add_force_at_point(convert::vector(force), convert::point(world_point), true);
        if let Some(link) = self.links.get_mut(handle) {
            link.forced = true;
        }
        self.refresh_mirror(handle);
        true
    }

    /// Like [`apply_force`](Self::apply_force), with force and point in the body's frame.
    pub fn apply_local_force(&mut self, handle: BodyHandle, local_force: Vec3, local_point: Vec3) -> bool {
        let Some(body) = self.bodies.get(handle) else {
            return false;
        };
        let force = body.orientation * local_force;
        let point = body.position + body.orientation * local_point;
        self.apply_force(handle, force, point)
    }

    /// Changes the body's velocity at once. Wakes the body.
    pub fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec3, world_point: Vec3) -> bool {
        let Some(rigid_body) = self.prepare_for_input(handle) else {
            return false;
        };
        rigid_body.apply_impulse_at_point(convert::vector(impulse), convert::point(world_point), true);
        self.refresh_mirror(handle);
        true
    }

    /// Pushes pending edits of one body so rapier input lands on current state.
    fn prepare_for_input(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        let body = self.bodies.get(handle)?;
        let link = self.links.get_mut(handle)?;
        let rigid_body = self.rapier.bodies.get_mut(link.rigid_body)?;
        if link.dirty {
            push_body(rigid_body, body, self.allow_sleep);
            if let Some(collider) = self.rapier.colliders.get_mut(link.collider) {
                collider.set_collision_groups(body.interaction_groups());
                collider.user_data = convert::material_data(body.material);
            }
            link.dirty = false;
        }
        Some(rigid_body)
    }

    // ========================================================================
    // Materials
    // ========================================================================

    pub fn add_material(&mut self, material: PhysicsMaterial) -> MaterialKey {
        self.materials.insert(material)
    }

    #[must_use]
    pub fn material(&self, key: MaterialKey) -> Option<&PhysicsMaterial> {
        self.materials.get(key)
    }

    /// Registers friction/restitution for a material pair, replacing an earlier entry for it.
    pub fn add_contact_material(&mut self, contact: ContactMaterial) {
        if let Some((a, b)) = contact.materials {
            self.contact_materials.retain(|c| !c.matches(a, b));
        }
        self.contact_materials.push(contact);
    }

    /// Friction and restitution used when `a` and `b` touch.
    #[must_use]
    pub fn contact_properties(&self, a: &Body, b: &Body) -> (f32, f32) {
        self.resolver().resolve(a.material, b.material)
    }

    fn resolver(&self) -> ContactResolver<'_> {
        ContactResolver {
            materials: &self.materials,
            contacts: &self.contact_materials,
            fallback: self.default_contact_material,
        }
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Subscribes to collision events. Dropping the receiver unsubscribes.
    pub fn subscribe(&mut self) -> Receiver<CollisionEvent> {
        self.events.subscribe()
    }

    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    #[must_use]
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    #[must_use]
    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    // ========================================================================
    // Stepping
    // ========================================================================

    /// Advances by whole steps of `fixed_time_step` covering `time_since_last_called`.
    ///
    /// At most `max_sub_steps` internal steps run; surplus time is dropped.
    /// A zero, negative or non-finite delta runs nothing.
    pub fn step(&mut self, fixed_time_step: f64, time_since_last_called: f64, max_sub_steps: u32) -> StepReport {
        if !(fixed_time_step.is_finite() && fixed_time_step > 0.0) {
            log::warn!("Ignoring physics step with invalid fixed step {fixed_time_step}");
            return StepReport::default();
        }
        if !(time_since_last_called.is_finite() && time_since_last_called > 0.0) {
            return StepReport {
                sub_steps: 0,
                remainder: self.accumulator,
                capped: false,
            };
        }
        self.accumulator += time_since_last_called;

        let mut sub_steps = 0;
        while self.accumulator + ACCUMULATOR_EPSILON >= fixed_time_step && sub_steps < max_sub_steps {
            self.internal_step(fixed_time_step);
            self.accumulator = (self.accumulator - fixed_time_step).max(0.0);
            sub_steps += 1;
        }

        let capped = self.accumulator + ACCUMULATOR_EPSILON >= fixed_time_step;
        if capped {
            log::debug!(
                "Physics catch-up capped at {max_sub_steps} steps, dropping {:.3}s",
                self.accumulator - self.accumulator % fixed_time_step
            );
            // Whatever the cap left behind is dropped whole, so the
            // remainder can never sit a rounding error short of a step.
            self.accumulator = 0.0;
        } else {
            self.accumulator %= fixed_time_step;
        }

        StepReport {
            sub_steps,
            remainder: self.accumulator,
            capped,
        }
    }

    /// Runs exactly one step of `dt` seconds.
    pub fn internal_step(&mut self, dt: f64) {
        self.apply_sleep_policy();
        self.flush_edits();

        let rapier = &mut self.rapier;
        rapier.params.dt = dt as f32;
        rapier.params.num_solver_iterations =
            NonZeroUsize::new(self.solver_iterations as usize).unwrap_or(NonZeroUsize::MIN);

        let hooks = ContactResolver {
            materials: &self.materials,
            contacts: &self.contact_materials,
            fallback: self.default_contact_material,
        };
        rapier.pipeline.step(
            &convert::vector(self.gravity),
            &rapier.params,
            &mut rapier.islands,
            &mut rapier.broad_phase,
            &mut rapier.narrow_phase,
            &mut rapier.bodies,
            &mut rapier.colliders,
            &mut rapier.impulse_joints,
            &mut rapier.multibody_joints,
            &mut rapier.ccd_solver,
            None,
            &hooks,
            &(),
        );

        // Mirrors still hold pre-step velocities here, which is what impact speed is measured from.
        let events = self.collect_contacts(dt);

        for (handle, link) in &mut self.links {
            if std::mem::take(&mut link.forced)
                && let Some(rigid_body) = self.rapier.bodies.get_mut(link.rigid_body)
            {
                rigid_body.reset_forces(false);
                rigid_body.reset_torques(false);
            }
            if let (Some(body), Some(rigid_body)) = (self.bodies.get_mut(handle), self.rapier.bodies.get(link.rigid_body)) {
                pull_body(body, rigid_body);
            }
        }

        self.time += dt;
        self.step_count += 1;

        if self.events.has_subscribers() {
            for event in &events {
                self.events.publish(event);
            }
        }
        log::trace!(
            "Physics step {} ({} bodies, {} touching pairs)",
            self.step_count,
            self.bodies.len(),
            self.touching.len()
        );
    }

    /// One event per touching pair, from the deepest point of its manifolds.
    fn collect_contacts(&mut self, dt: f64) -> Vec<CollisionEvent> {
        let mut events = Vec::new();
        let mut now_touching = FxHashSet::default();

        for pair in self.rapier.narrow_phase.contact_pairs() {
            if !pair.has_any_active_contact {
                continue;
            }
            let (Some(ha), Some(hb)) = (self.rapier.owner(pair.collider1), self.rapier.owner(pair.collider2)) else {
                continue;
            };
            let (Some(a), Some(b)) = (self.bodies.get(ha), self.bodies.get(hb)) else {
                continue;
            };
            let Some(frame) = self.rapier.colliders.get(pair.collider1).map(|c| *c.position()) else {
                continue;
            };

            let mut deepest: Option<(f32, Vec3, Vec3)> = None;
            for manifold in &pair.manifolds {
                let normal = convert::vec3(&manifold.data.normal);
                for contact in &manifold.points {
                    if deepest.is_none_or(|(dist, _, _)| contact.dist < dist) {
                        let point = convert::point_vec3(&(frame * contact.local_p1));
                        deepest = Some((contact.dist, point, normal));
                    }
                }
            }
            let Some((_, point, normal)) = deepest else {
                continue;
            };

            let approach = -(b.velocity_at(point) - a.velocity_at(point)).dot(normal);
            let key = ordered(ha, hb);
            now_touching.insert(key);
            events.push(CollisionEvent {
                body_a: ha,
                body_b: hb,
                point,
                normal,
                impact_velocity: approach.max(0.0),
                first_contact: !self.touching.contains(&key),
                time: self.time + dt,
            });
        }

        self.touching = now_touching;
        events
    }

    /// Pushes every edited body back into rapier.
    fn flush_edits(&mut self) {
        for (handle, link) in &mut self.links {
            if !std::mem::take(&mut link.dirty) {
                continue;
            }
            let Some(body) = self.bodies.get(handle) else {
                continue;
            };
            if let Some(rigid_body) = self.rapier.bodies.get_mut(link.rigid_body) {
                push_body(rigid_body, body, self.allow_sleep);
            }
            if let Some(collider) = self.rapier.colliders.get_mut(link.collider) {
                collider.set_collision_groups(body.interaction_groups());
                collider.user_data = convert::material_data(body.material);
            }
        }
    }

    /// Re-applies sleep thresholds after the `allow_sleep` switch changed.
    fn apply_sleep_policy(&mut self) {
        if self.sleep_policy == Some(self.allow_sleep) {
            return;
        }
        for (handle, link) in &self.links {
            let (Some(body), Some(rigid_body)) = (self.bodies.get(handle), self.rapier.bodies.get_mut(link.rigid_body))
            else {
                continue;
            };
            configure_sleep(rigid_body, body, self.allow_sleep);
            if !self.allow_sleep && rigid_body.is_sleeping() {
                rigid_body.wake_up(true);
            }
        }
        self.sleep_policy = Some(self.allow_sleep);
    }

    /// Copies one body's rapier state into its mirror.
    fn refresh_mirror(&mut self, handle: BodyHandle) {
        let Some(link) = self.links.get(handle) else {
            return;
        };
        if let (Some(body), Some(rigid_body)) = (self.bodies.get_mut(handle), self.rapier.bodies.get(link.rigid_body)) {
            pull_body(body, rigid_body);
        }
    }
}

fn configure_sleep(rigid_body: &mut RigidBody, body: &Body, allow_sleep: bool) {
    let activation = rigid_body.activation_mut();
    if allow_sleep && body.allow_sleep {
        activation.normalized_linear_threshold = body.sleep_speed_limit;
        activation.angular_threshold = body.sleep_speed_limit;
        activation.time_until_sleep = body.sleep_time_limit;
    } else {
        // Negative thresholds can never be undercut.
        activation.normalized_linear_threshold = -1.0;
        activation.angular_threshold = -1.0;
    }
}

/// Writes a mirror's pose, velocities and sleep request into rapier.
fn push_body(rigid_body: &mut RigidBody, body: &Body, allow_sleep: bool) {
    let wake = body.sleep_state == SleepState::Awake || body.body_type() == BodyType::Kinematic;
    rigid_body.set_translation(convert::vector(body.position), wake);
    rigid_body.set_rotation(convert::rotation(body.orientation), wake);
    rigid_body.set_linvel(convert::vector(body.velocity), wake);
    rigid_body.set_angvel(convert::vector(body.angular_velocity), wake);
    rigid_body.set_linear_damping(body.linear_damping);
    rigid_body.set_angular_damping(body.angular_damping);
    rigid_body.lock_rotations(body.fixed_rotation, wake);
    configure_sleep(rigid_body, body, allow_sleep);

    match (wake, rigid_body.is_sleeping()) {
        (true, true) => rigid_body.wake_up(true),
        (false, false) => rigid_body.sleep(),
        _ => {}
    }
}

/// Reads pose, velocities and sleep state back from rapier.
fn pull_body(body: &mut Body, rigid_body: &RigidBody) {
    body.position = convert::vec3(rigid_body.translation());
    body.orientation = convert::quat(rigid_body.rotation());
    body.velocity = convert::vec3(rigid_body.linvel());
    body.angular_velocity = convert::vec3(rigid_body.angvel());
    body.sleep_state = if rigid_body.is_sleeping() {
        SleepState::Sleeping
    } else {
        SleepState::Awake
    };
}

fn ordered(a: BodyHandle, b: BodyHandle) -> (BodyHandle, BodyHandle) {
    if a < b { (a, b) } else { (b, a) }
}
