//! Scene Graph Module
//!
//! Manages the scene hierarchy and the components hung off its nodes:
//! - [`Node`]: scene node (parent/child links plus a transform)
//! - [`Transform`]: position, rotation, scale with cached matrices
//! - [`Scene`]: the node container
//! - [`Camera`]: perspective camera component
//! - [`Light`]: ambient, directional, point and spot lights
//! - [`Mesh`]: geometry + material pairing drawn by a surface
//! - `transform_system`: hierarchy matrix propagation, decoupled from `Scene`

pub mod camera;
pub mod geometry;
pub mod light;
pub mod material;
pub mod mesh;
pub mod node;
pub mod scene;
pub mod transform;
pub mod transform_system;

pub use camera::Camera;
pub use geometry::{BoundingBox, Geometry, PointCloud};
pub use light::{Light, LightKind, ShadowConfig};
pub use material::{Blending, Material, MaterialKind};
pub use mesh::Mesh;
pub use node::Node;
pub use scene::Scene;
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeHandle;
    pub struct CameraKey;
    pub struct LightKey;
}
