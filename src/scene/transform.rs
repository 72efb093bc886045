use glam::{Affine3A, EulerRot, Mat3, Quat, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Trs {
    position: Vec3,
    rotation: Quat,
    scale: Vec3,
}

/// Position, rotation and scale of a node plus its cached matrices.
///
/// Fields are public so entity sync and user code can write them directly.
/// [`update_local_matrix`](Self::update_local_matrix) compares against the
/// values it last baked and only rebuilds when something moved.
#[derive(Debug, Clone)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,

    pub(crate) local_matrix: Affine3A,
    pub(crate) world_matrix: Affine3A,

    /// TRS the local matrix was built from, `None` until the first build
    baked: Option<Trs>,
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            local_matrix: Affine3A::IDENTITY,
            world_matrix: Affine3A::IDENTITY,
            baked: None,
        }
    }

    fn trs(&self) -> Trs {
        Trs {
            position: self.position,
            rotation: self.rotation,
            scale: self.scale,
        }
    }

    /// Rebuilds the local matrix when TRS changed. Returns whether it did.
    pub fn update_local_matrix(&mut self) -> bool {
        let current = self.trs();
        if self.baked == Some(current) {
            return false;
        }
        self.local_matrix = Affine3A::from_scale_rotation_translation(current.scale, current.rotation, current.position);
        self.baked = Some(current);
        true
    }

    /// Copies a simulated pose. Rotation is left alone when `rotation` is `None`.
    pub fn set_pose(&mut self, position: Vec3, rotation: Option<Quat>) {
        self.position = position;
        if let Some(rotation) = rotation {
            self.rotation = rotation;
        }
    }

    /// XYZ Euler angles in radians.
    pub fn set_rotation_euler(&mut self, x: f32, y: f32, z: f32) {
        self.rotation = Quat::from_euler(EulerRot::XYZ, x, y, z);
    }

    #[must_use]
    pub fn rotation_euler(&self) -> Vec3 {
        let (x, y, z) = self.rotation.to_euler(EulerRot::XYZ);
        Vec3::new(x, y, z)
    }

    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> &Affine3A {
        &self.local_matrix
    }

    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.world_matrix
    }

    #[inline]
    #[must_use]
    pub fn world_position(&self) -> Vec3 {
        self.world_matrix.translation.into()
    }

    pub(crate) fn set_world_matrix(&mut self, world: Affine3A) {
        self.world_matrix = world;
    }

    /// Turns -Z towards `target`. Both points are in parent space.
    ///
    /// Does nothing when `target` is the current position or lies straight
    /// along `up`.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let forward = (target - self.position).normalize_or_zero();
        let right = forward.cross(up);
        if right.length_squared() < 1e-8 {
            return;
        }
        let right = right.normalize();
        let true_up = right.cross(forward);
        self.rotation = Quat::from_mat3(&Mat3::from_cols(right, true_up, -forward));
    }

    /// Forces the next [`update_local_matrix`](Self::update_local_matrix) to rebuild.
    pub fn mark_dirty(&mut self) {
        self.baked = None;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}
