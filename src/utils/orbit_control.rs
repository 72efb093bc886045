use glam::{Vec2, Vec3};

use crate::scene::transform::Transform;

/// Orbit camera: rotates around, zooms towards and pans a target point.
///
/// Pointer input is fed in pixels through [`OrbitControls::rotate`],
/// [`OrbitControls::zoom`] and [`OrbitControls::pan`]; [`OrbitControls::update`]
/// then applies it to the camera node's transform once per tick.
pub struct OrbitControls {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub damping_factor: f32,
    pub enable_damping: bool,
    pub min_distance: f32,
    pub max_distance: f32,

    pub center: Vec3,
    pub radius: f32,
    /// Azimuth around +Y, measured from +Z
    pub theta: f32,
    /// Polar angle from +Y
    pub phi: f32,

    rotate_delta: Vec2,
    pan_delta: Vec3,
}

impl OrbitControls {
    #[must_use]
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            rotate_speed: 1.0,
            zoom_speed: 0.05,
            pan_speed: 1.0,
            damping_factor: 0.05,
            enable_damping: true,
            min_distance: 1.0,
            max_distance: 1000.0,

            center,
            radius,
            theta: 0.0,
            phi: std::f32::consts::FRAC_PI_2,

            rotate_delta: Vec2::ZERO,
            pan_delta: Vec3::ZERO,
        }
    }

    /// Controls that start from an existing camera position looking at `center`.
    #[must_use]
    pub fn looking_from(position: Vec3, center: Vec3) -> Self {
        let offset = position - center;
        let radius = offset.length();
        let mut controls = Self::new(center, radius);
        if radius > f32::EPSILON {
            controls.theta = offset.x.atan2(offset.z);
            controls.phi = (offset.y / radius).clamp(-1.0, 1.0).acos();
        }
        controls.min_distance = controls.min_distance.min(radius);
        controls
    }

    /// Queues a rotation from a pointer drag of `drag` pixels.
    pub fn rotate(&mut self, drag: Vec2, viewport_height: f32) {
        let rotate_per_pixel = 2.0 * std::f32::consts::PI / viewport_height.max(1.0);
        self.rotate_delta -= drag * rotate_per_pixel * self.rotate_speed;
    }

    /// Zooms by `steps` wheel notches; positive moves closer.
    pub fn zoom(&mut self, steps: f32) {
        if steps == 0.0 {
            return;
        }
        let scale = (1.0 - self.zoom_speed).powf(steps.abs());
        if steps > 0.0 {
            self.radius *= scale;
        } else {
            self.radius /= scale;
        }
        self.radius = self.radius.clamp(self.min_distance, self.max_distance);
    }

    /// Queues a pan so the point under the pointer follows a drag of `drag` pixels.
    pub fn pan(&mut self, drag: Vec2, viewport_height: f32, fov_degrees: f32) {
        let half_fov = fov_degrees.to_radians() / 2.0;
        let world_height = 2.0 * self.radius * half_fov.tan();
        let pixels_to_world = world_height / viewport_height.max(1.0);

        let forward = -self.direction();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward).normalize_or_zero();

        self.pan_delta += (right * -drag.x + up * drag.y) * pixels_to_world * self.pan_speed;
    }

    /// Unit vector from the center to the camera.
    #[must_use]
    pub fn direction(&self) -> Vec3 {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        Vec3::new(sin_phi * sin_theta, cos_phi, sin_phi * cos_theta)
    }

    /// Applies queued input (damped, if enabled) and places the camera.
    pub fn update(&mut self, transform: &mut Transform, dt: f32) {
        if self.enable_damping {
            let target_fps = 60.0;
            let retention = (1.0 - self.damping_factor).powf(dt * target_fps);
            let taken = 1.0 - retention;

            self.theta += self.rotate_delta.x * taken;
            self.phi += self.rotate_delta.y * taken;
            self.center += self.pan_delta * taken;

            self.rotate_delta *= retention;
            self.pan_delta *= retention;
        } else {
            self.theta += self.rotate_delta.x;
            self.phi += self.rotate_delta.y;
            self.center += self.pan_delta;
            self.rotate_delta = Vec2::ZERO;
            self.pan_delta = Vec3::ZERO;
        }

        const EPS: f32 = 0.0001;
        self.phi = self.phi.clamp(EPS, std::f32::consts::PI - EPS);

        transform.position = self.center + self.direction() * self.radius;
        transform.look_at(self.center, Vec3::Y);
    }
}
