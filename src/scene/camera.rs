use glam::{Affine3A, Mat4, Vec2, Vec3};

/// Perspective camera component.
///
/// The camera holds projection state only. Its placement comes from the
/// node it is attached to; the transform system pushes the node's world
/// matrix in through [`Camera::update_view_projection`].
#[derive(Debug, Clone)]
pub struct Camera {
    pub name: String,

    /// Vertical field of view, radians
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,

    pub(crate) world_matrix: Affine3A,
    pub(crate) view_matrix: Mat4,
    pub(crate) projection_matrix: Mat4,
    pub(crate) view_projection_matrix: Mat4,
}

impl Camera {
    /// `fov` is given in degrees, matching how the lessons configure cameras.
    #[must_use]
    pub fn new_perspective(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut cam = Self {
            name: "Camera".to_string(),
            fov: fov.to_radians(),
            aspect,
            near,
            far,

            world_matrix: Affine3A::IDENTITY,
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
            view_projection_matrix: Mat4::IDENTITY,
        };

        cam.update_projection_matrix();
        cam
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection_matrix = Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far);
        self.view_projection_matrix = self.projection_matrix * self.view_matrix;
    }

    /// Resize handler: a zero or negative aspect is ignored.
    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect > 0.0 && aspect.is_finite() {
            self.aspect = aspect;
            self.update_projection_matrix();
        }
    }

    pub fn update_view_projection(&mut self, world_transform: &Affine3A) {
        self.world_matrix = *world_transform;
        self.view_matrix = Mat4::from(*world_transform).inverse();
        self.view_projection_matrix = self.projection_matrix * self.view_matrix;
    }

    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.world_matrix.translation.into()
    }

    #[must_use]
    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection_matrix
    }

    #[must_use]
    pub fn view_matrix(&self) -> &Mat4 {
        &self.view_matrix
    }

    #[must_use]
    pub fn view_projection_matrix(&self) -> &Mat4 {
        &self.view_projection_matrix
    }

    /// Builds a world-space ray through a point in normalized device
    /// coordinates (x and y in -1..1, y up).
    ///
    /// Returns `(origin, direction)` with a unit direction.
    #[must_use]
    pub fn ray_from_ndc(&self, ndc: Vec2) -> (Vec3, Vec3) {
        let inverse = self.view_projection_matrix.inverse();
        // perspective_rh maps the near plane to z = 0 and the far plane to z = 1.
        let near = inverse.project_point3(Vec3::new(ndc.x, ndc.y, 0.0));
        let far = inverse.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));
        let origin = self.position();
        let direction = (far - near).normalize_or_zero();
        (origin, direction)
    }
}
