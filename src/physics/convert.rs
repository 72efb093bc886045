//! glam <-> nalgebra conversions at the rapier boundary, plus the packing of
//! slotmap keys into rapier's `u128` user data.

use glam::{Quat, Vec3};
use rapier3d::na::{Quaternion, Translation3};
use rapier3d::prelude::{Isometry, Point, Real, Rotation, Vector};
use slotmap::{Key, KeyData};

use crate::physics::{BodyHandle, MaterialKey};

#[inline]
pub(crate) fn vector(v: Vec3) -> Vector<Real> {
    Vector::new(v.x, v.y, v.z)
}

#[inline]
pub(crate) fn point(v: Vec3) -> Point<Real> {
    Point::new(v.x, v.y, v.z)
}

#[inline]
pub(crate) fn vec3(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

#[inline]
pub(crate) fn point_vec3(p: &Point<Real>) -> Vec3 {
    Vec3::new(p.x, p.y, p.z)
}

pub(crate) fn rotation(q: Quat) -> Rotation<Real> {
    Rotation::from_quaternion(Quaternion::new(q.w, q.x, q.y, q.z))
}

#[inline]
pub(crate) fn quat(r: &Rotation<Real>) -> Quat {
    Quat::from_xyzw(r.i, r.j, r.k, r.w)
}

pub(crate) fn isometry(position: Vec3, orientation: Quat) -> Isometry<Real> {
    Isometry::from_parts(Translation3::new(position.x, position.y, position.z), rotation(orientation))
}

// Zero is never a valid ffi value for a slotmap key, so it stands for "none".

pub(crate) fn handle_data(handle: BodyHandle) -> u128 {
    u128::from(handle.data().as_ffi())
}

pub(crate) fn handle_from_data(data: u128) -> Option<BodyHandle> {
    (data != 0).then(|| BodyHandle::from(KeyData::from_ffi(data as u64)))
}

pub(crate) fn material_data(material: Option<MaterialKey>) -> u128 {
    material.map_or(0, |key| u128::from(key.data().as_ffi()))
}

pub(crate) fn material_from_data(data: u128) -> Option<MaterialKey> {
    (data != 0).then(|| MaterialKey::from(KeyData::from_ffi(data as u64)))
}
