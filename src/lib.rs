#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

//! # Orrery
//!
//! A fixed-step frame loop that keeps a scene graph in lockstep with a
//! rigid-body world.
//!
//! Each tick applies finished asset loads, steps physics in fixed
//! increments, copies body poses onto their scene nodes, runs user code and
//! draws. See [`scheduler`] for the exact order.
//!
//! - [`context::SimulationContext`]: owns scene, world, registry and assets
//! - [`scheduler::FrameScheduler`]: runs ticks
//! - [`app::App`]: drives the scheduler at a display refresh rate
//! - [`physics`]: spheres, boxes and planes simulated by rapier
//! - [`assets`]: asynchronous texture, font and glTF loading

pub mod app;
pub mod assets;
pub mod config;
pub mod context;
pub mod errors;
pub mod feedback;
pub mod physics;
pub mod procedural;
pub mod raycast;
pub mod registry;
pub mod scene;
pub mod scheduler;
pub mod surface;
pub mod utils;

pub use app::{App, DisplayLink, FrameRequester, RunSummary};
pub use assets::{AssetEvent, AssetServer, ColorSpace, PendingAsset};
pub use config::SimulationConfig;
pub use context::SimulationContext;
pub use errors::{AssetError, Error, Result};
pub use feedback::{ImpactCue, ImpactFeedback};
pub use physics::{Body, BodyHandle, CollisionEvent, PhysicsWorld, Shape};
pub use raycast::{Intersection, Raycaster};
pub use registry::{EntityKey, EntityRegistry, UpdatableEntity};
pub use scene::{Camera, Geometry, Light, LightKind, Material, Mesh, Node, NodeHandle, Scene};
pub use scheduler::{FrameReport, FrameScheduler, FrameState, SchedulerState};
pub use surface::{FrameSurface, LogSurface, RecordingSurface};
pub use utils::OrbitControls;
pub use utils::time::{ManualTime, SimulationClock, TimeSource};
