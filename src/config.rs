//! Simulation Configuration
//!
//! [`SimulationConfig`] gathers every tunable the frame loop, the physics
//! world and the asset workers read at startup. It deserializes from JSON;
//! any field that is missing takes its default, so a config file only needs
//! to name what it changes:
//!
//! ```json
//! { "max_sub_steps": 5, "gravity": [0.0, -1.62, 0.0] }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Friction and bounciness used for pairs without a registered contact material.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    pub friction: f32,
    pub restitution: f32,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            friction: 0.1,
            restitution: 0.7,
        }
    }
}

/// Default perspective camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    pub target: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 75.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 100.0,
            position: [-3.0, 3.0, 3.0],
            target: [0.0, 0.0, 0.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Size of one physics step, in seconds.
    pub fixed_time_step: f64,
    /// Upper bound on physics steps run by a single tick.
    pub max_sub_steps: u32,
    pub gravity: [f32; 3],
    /// Velocity solver iterations per physics step.
    pub solver_iterations: u32,
    pub allow_sleep: bool,
    pub default_contact: ContactConfig,
    pub camera: CameraConfig,
    /// Impact velocity (m/s) above which a collision produces a feedback cue.
    pub impact_threshold: f32,
    pub asset_worker_threads: usize,
    /// Display refresh rate the host driver paces ticks to, in Hz.
    pub refresh_rate: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            fixed_time_step: 1.0 / 60.0,
            max_sub_steps: 3,
            gravity: [0.0, -9.82, 0.0],
            solver_iterations: 10,
            allow_sleep: false,
            default_contact: ContactConfig::default(),
            camera: CameraConfig::default(),
            impact_threshold: 1.5,
            asset_worker_threads: 2,
            refresh_rate: 60.0,
        }
    }
}

impl SimulationConfig {
    /// Parses a config from a JSON string and validates it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        log::info!("Loaded simulation config from {}", path.display());
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[must_use]
    pub fn gravity(&self) -> glam::Vec3 {
        glam::Vec3::from_array(self.gravity)
    }

    pub fn validate(&self) -> Result<()> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> Error {
            Error::InvalidConfig {
                field,
                reason: reason.into(),
            }
        }

        if !(self.fixed_time_step.is_finite() && self.fixed_time_step > 0.0) {
            return Err(invalid("fixed_time_step", "must be a positive number of seconds"));
        }
        if self.max_sub_steps == 0 {
            return Err(invalid("max_sub_steps", "must be at least 1"));
        }
        if self.solver_iterations == 0 {
            return Err(invalid("solver_iterations", "must be at least 1"));
        }
        if self.gravity.iter().any(|g| !g.is_finite()) {
            return Err(invalid("gravity", "components must be finite"));
        }
        if self.default_contact.friction < 0.0 {
            return Err(invalid("default_contact.friction", "must not be negative"));
        }
        if !(0.0..=1.0).contains(&self.default_contact.restitution) {
            return Err(invalid("default_contact.restitution", "must lie in [0, 1]"));
        }
        let cam = &self.camera;
        if !(cam.fov > 0.0 && cam.fov < 180.0) {
            return Err(invalid("camera.fov", "must lie in (0, 180) degrees"));
        }
        if !(cam.near > 0.0 && cam.far > cam.near) {
            return Err(invalid("camera.near", "need 0 < near < far"));
        }
        if cam.aspect <= 0.0 {
            return Err(invalid("camera.aspect", "must be positive"));
        }
        if self.asset_worker_threads == 0 {
            return Err(invalid("asset_worker_threads", "must be at least 1"));
        }
        if !(self.refresh_rate.is_finite() && self.refresh_rate > 0.0) {
            return Err(invalid("refresh_rate", "must be positive"));
        }
        Ok(())
    }
}
