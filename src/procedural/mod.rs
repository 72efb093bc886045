//! Procedural point clouds: spiral galaxies and particle fields.
//!
//! Generators are seeded so the same parameters always give the same cloud.

pub mod galaxy;
pub mod particles;

pub use galaxy::{Galaxy, GalaxyParameters};
pub use particles::{ParticleField, ParticleFieldOptions};
