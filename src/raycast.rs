//! Ray picking against scene meshes.
//!
//! Spheres are tested exactly. Everything else is tested against its
//! geometry's bounding box in the mesh's local space, which is exact for
//! boxes and planes and a conservative hull for the rest.

use glam::{Vec2, Vec3};

use crate::scene::{BoundingBox, Geometry, NodeHandle, Scene};

/// One ray hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub node: NodeHandle,
    /// Distance from the ray origin, in world units
    pub distance: f32,
    pub point: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Raycaster {
    pub origin: Vec3,
    /// Unit direction
    pub direction: Vec3,
    pub near: f32,
    pub far: f32,
}

impl Default for Raycaster {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::NEG_Z)
    }
}

impl Raycaster {
    #[must_use]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
            near: 0.0,
            far: f32::INFINITY,
        }
    }

    pub fn set(&mut self, origin: Vec3, direction: Vec3) {
        self.origin = origin;
        self.direction = direction.normalize_or_zero();
    }

    /// Aims the ray from the scene's active camera through `ndc`
    /// (x and y in -1..1, y up). Returns false if there is no active camera.
    pub fn set_from_camera(&mut self, scene: &Scene, ndc: Vec2) -> bool {
        let Some((_, camera)) = scene.active_camera() else {
            return false;
        };
        let (origin, direction) = camera.ray_from_ndc(ndc);
        self.origin = origin;
        self.direction = direction;
        self.near = 0.0;
        self.far = camera.far;
        true
    }

    #[must_use]
    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }

    /// Tests `objects` and returns the hits nearest first.
    ///
    /// Handles without a mesh, and invisible nodes, never hit. World
    /// matrices must be current.
    #[must_use]
    pub fn intersect_objects(&self, scene: &Scene, objects: &[NodeHandle]) -> Vec<Intersection> {
        let mut hits: Vec<Intersection> = objects
            .iter()
            .filter_map(|&handle| self.intersect_node(scene, handle))
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    /// Tests every visible mesh in the scene.
    #[must_use]
    pub fn intersect_scene(&self, scene: &Scene) -> Vec<Intersection> {
        let handles: Vec<NodeHandle> = scene.mesh_nodes().map(|(h, _, _)| h).collect();
        self.intersect_objects(scene, &handles)
    }

    fn intersect_node(&self, scene: &Scene, handle: NodeHandle) -> Option<Intersection> {
        if self.direction == Vec3::ZERO || !scene.is_visible(handle) {
            return None;
        }
        let node = scene.get_node(handle)?;
        let mesh = node.mesh.as_ref()?;
        let world = node.world_matrix();

        let distance = if let Geometry::Sphere { radius, .. } = mesh.geometry {
            let scale = world.matrix3.x_axis.length()
                .max(world.matrix3.y_axis.length())
                .max(world.matrix3.z_axis.length());
            self.hit_sphere(world.translation.into(), radius * scale)?
        } else {
            let inverse = world.inverse();
            let local_origin = inverse.transform_point3(self.origin);
            let local_dir = inverse.transform_vector3(self.direction);
            let t = hit_box(local_origin, local_dir, &mesh.geometry.bounding_box())?;
            let world_point = world.transform_point3(local_origin + local_dir * t);
            world_point.distance(self.origin)
        };

        if distance < self.near || distance > self.far {
            return None;
        }
        Some(Intersection {
            node: handle,
            distance,
            point: self.at(distance),
        })
    }

    fn hit_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let to_center = center - self.origin;
        let along = to_center.dot(self.direction);
        let d2 = to_center.length_squared() - along * along;
        let r2 = radius * radius;
        if d2 > r2 {
            return None;
        }
        let half_chord = (r2 - d2).sqrt();
        let t0 = along - half_chord;
        let t1 = along + half_chord;
        if t1 < 0.0 {
            return None;
        }
        Some(if t0 >= 0.0 { t0 } else { t1 })
    }
}

/// Slab test. Returns the entry parameter along `dir`, or the exit one if
/// the origin is inside.
fn hit_box(origin: Vec3, dir: Vec3, bounds: &BoundingBox) -> Option<f32> {
    if bounds.is_empty() {
        return None;
    }
    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;
    for axis in 0..3 {
        let (o, d) = (origin[axis], dir[axis]);
        let (lo, hi) = (bounds.min[axis], bounds.max[axis]);
        if d.abs() < f32::EPSILON {
            if o < lo || o > hi {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d;
        let (mut t0, mut t1) = ((lo - o) * inv, (hi - o) * inv);
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_min = t_min.max(t0);
        t_max = t_max.min(t1);
        if t_min > t_max {
            return None;
        }
    }
    if t_max < 0.0 {
        return None;
    }
    Some(if t_min >= 0.0 { t_min } else { t_max })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slab_test_hits_flat_box() {
        let bounds = BoundingBox::new(Vec3::new(-1.0, -1.0, 0.0), Vec3::new(1.0, 1.0, 0.0));
        let t = hit_box(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z, &bounds);
        assert_eq!(t, Some(5.0));
    }

    #[test]
    fn slab_test_misses_behind_origin() {
        let bounds = BoundingBox::from_half_extents(Vec3::ONE);
        assert!(hit_box(Vec3::new(0.0, 0.0, 5.0), Vec3::Z, &bounds).is_none());
    }
}
