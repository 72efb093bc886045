use flume::{Receiver, Sender};
use glam::Vec3;

use crate::physics::BodyHandle;

/// Two bodies touched during an internal step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    /// Deepest contact point of the pair.
    pub point: Vec3,
    /// Unit normal from A to B.
    pub normal: Vec3,
    /// Approach speed along the normal before the solver ran, m/s. Zero when separating.
    pub impact_velocity: f32,
    /// True on the first step of an uninterrupted run of contact.
    pub first_contact: bool,
    /// World time at the end of the step that produced the event.
    pub time: f64,
}

impl CollisionEvent {
    /// Whether `body` is one of the two bodies involved.
    #[must_use]
    pub fn involves(&self, body: BodyHandle) -> bool {
        self.body_a == body || self.body_b == body
    }

    /// The other body of the pair, if `body` is involved.
    #[must_use]
    pub fn other(&self, body: BodyHandle) -> Option<BodyHandle> {
        if self.body_a == body {
            Some(self.body_b)
        } else if self.body_b == body {
            Some(self.body_a)
        } else {
            None
        }
    }
}

/// Fan-out channel: every subscriber receives every published event.
///
/// Subscribers whose receiver has been dropped are pruned on the next publish.
pub struct EventBus<T: Clone> {
    subscribers: Vec<Sender<T>>,
}

impl<T: Clone> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> EventBus<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self) -> Receiver<T> {
        let (tx, rx) = flume::unbounded();
        self.subscribers.push(tx);
        rx
    }

    pub fn publish(&mut self, event: &T) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    #[must_use]
    pub fn has_subscribers(&self) -> bool {
        !self.subscribers.is_empty()
    }
}
