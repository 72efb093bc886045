//! Impact feedback.
//!
//! Turns the physics world's collision events into cues a sound or
//! particle system can play. The world knows nothing about the consumer;
//! the feedback side simply holds a receiver.

use flume::Receiver;
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

use crate::physics::{BodyHandle, CollisionEvent, PhysicsWorld};

/// A collision hard enough to be heard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactCue {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    pub point: Vec3,
    pub impact_velocity: f32,
    /// Playback volume in `0..1`
    pub volume: f32,
}

pub struct ImpactFeedback {
    events: Receiver<CollisionEvent>,
    /// Impacts at or below this speed (m/s) are ignored
    pub threshold: f32,
    /// Ignore contacts that were already touching on the previous step
    pub first_contact_only: bool,
    rng: StdRng,
}

impl ImpactFeedback {
    /// Subscribes to `world`'s collision events.
    pub fn new(world: &mut PhysicsWorld, threshold: f32) -> Self {
        Self::with_seed(world, threshold, rand::random())
    }

    /// Like [`ImpactFeedback::new`], with reproducible volumes.
    pub fn with_seed(world: &mut PhysicsWorld, threshold: f32, seed: u64) -> Self {
        Self {
            events: world.subscribe(),
            threshold,
            first_contact_only: false,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Drains pending collision events and returns a cue for each impact
    /// above the threshold. Each cue gets a random volume.
    pub fn poll(&mut self) -> Vec<ImpactCue> {
        let mut cues = Vec::new();
        for event in self.events.try_iter() {
            if event.impact_velocity <= self.threshold {
                continue;
            }
            if self.first_contact_only && !event.first_contact {
                continue;
            }
            let volume = self.rng.random::<f32>();
            log::trace!(
                "Impact {:.2} m/s between {:?} and {:?}",
                event.impact_velocity,
                event.body_a,
                event.body_b
            );
            cues.push(ImpactCue {
                body_a: event.body_a,
                body_b: event.body_b,
                point: event.point,
                impact_velocity: event.impact_velocity,
                volume,
            });
        }
        cues
    }
}
