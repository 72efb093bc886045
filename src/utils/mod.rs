//! Utility Module
//!
//! - [`OrbitControls`]: camera orbit controller
//! - [`FpsCounter`]: frame rate measurement
//! - [`time`]: time sources and the simulation clock
//! - [`color`]: hex color parsing

pub mod color;
pub mod fps_counter;
pub mod orbit_control;
pub mod time;

pub use fps_counter::FpsCounter;
pub use orbit_control::OrbitControls;
