use rapier3d::prelude::{ContactModificationContext, PhysicsHooks};
use slotmap::SlotMap;

use crate::config::ContactConfig;
use crate::physics::{MaterialKey, convert};

/// Surface properties of a body.
///
/// Unset values defer to the world's default contact material.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsMaterial {
    pub name: String,
    pub friction: Option<f32>,
    pub restitution: Option<f32>,
}

impl PhysicsMaterial {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            friction: None,
            restitution: None,
        }
    }

    #[must_use]
    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = Some(friction);
        self
    }

    #[must_use]
    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = Some(restitution);
        self
    }
}

/// Friction and restitution used when two particular materials touch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactMaterial {
    pub materials: Option<(MaterialKey, MaterialKey)>,
    pub friction: f32,
    pub restitution: f32,
}

impl ContactMaterial {
    #[must_use]
    pub fn new(a: MaterialKey, b: MaterialKey, friction: f32, restitution: f32) -> Self {
        Self {
            materials: Some((a, b)),
            friction,
            restitution,
        }
    }

    /// The fallback used for pairs without a registered contact material.
    #[must_use]
    pub fn fallback(friction: f32, restitution: f32) -> Self {
        Self {
            materials: None,
            friction,
            restitution,
        }
    }

    /// Whether this contact material applies to the unordered pair `(a, b)`.
    #[must_use]
    pub fn matches(&self, a: MaterialKey, b: MaterialKey) -> bool {
        self.materials
            .is_some_and(|(x, y)| (x == a && y == b) || (x == b && y == a))
    }
}

impl From<ContactConfig> for ContactMaterial {
    fn from(config: ContactConfig) -> Self {
        Self::fallback(config.friction, config.restitution)
    }
}

impl Default for ContactMaterial {
    fn default() -> Self {
        ContactConfig::default().into()
    }
}

/// Resolves friction and restitution for a pair of materials, and feeds the
/// result to rapier's solver contacts.
///
/// A registered contact material wins. Otherwise values both materials
/// define are multiplied together, and anything else comes from `fallback`.
/// A body without a material always gets `fallback`.
pub(crate) struct ContactResolver<'a> {
    pub materials: &'a SlotMap<MaterialKey, PhysicsMaterial>,
    pub contacts: &'a [ContactMaterial],
    pub fallback: ContactMaterial,
}

impl ContactResolver<'_> {
    pub fn resolve(&self, a: Option<MaterialKey>, b: Option<MaterialKey>) -> (f32, f32) {
        let fallback = (self.fallback.friction, self.fallback.restitution);
        let (Some(ka), Some(kb)) = (a, b) else {
            return fallback;
        };
        if let Some(contact) = self.contacts.iter().find(|c| c.matches(ka, kb)) {
            return (contact.friction, contact.restitution);
        }
        let (Some(ma), Some(mb)) = (self.materials.get(ka), self.materials.get(kb)) else {
            return fallback;
        };
        let combine = |x: Option<f32>, y: Option<f32>, default: f32| match (x, y) {
            (Some(x), Some(y)) => x * y,
            _ => default,
        };
        (
            combine(ma.friction, mb.friction, fallback.0),
            combine(ma.restitution, mb.restitution, fallback.1),
        )
    }
}

impl PhysicsHooks for ContactResolver<'_> {
    fn modify_solver_contacts(&self, context: &mut ContactModificationContext) {
        let material_of = |collider| {
            context
                .colliders
                .get(collider)
                .and_then(|c| convert::material_from_data(c.user_data))
        };
        let (friction, restitution) = self.resolve(material_of(context.collider1), material_of(context.collider2));
        for contact in context.solver_contacts.iter_mut() {
            contact.friction = friction;
            contact.restitution = restitution;
        }
    }
}
