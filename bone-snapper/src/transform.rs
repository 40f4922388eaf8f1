//! Rigid transform with non-uniform scale (TRS)
//!
//! Composition follows the "child then parent" convention used throughout the
//! crate: `child.then(&parent)` applies `child` first and `parent` second, so a
//! bone's global transform is `local.then(&parent_global)`.

use glam::{Quat, Vec3};

/// Scale components at or below this magnitude have no usable reciprocal.
pub const SMALL_NUMBER: f32 = 1e-8;

/// Bone transform: translation, rotation and per-axis scale
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    /// Unit quaternion
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// Identity transform (no rotation, no translation, unit scale)
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub const fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    pub const fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    pub const fn from_rotation(rotation: Quat) -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation,
            scale: Vec3::ONE,
        }
    }

    /// Compose `self` with `parent`: `self` is applied first, then `parent`.
    ///
    /// Not commutative. With non-uniform scale on a rotated parent the result
    /// is the usual TRS approximation (no shear is represented).
    pub fn then(&self, parent: &Transform) -> Transform {
        Transform {
            translation: parent.rotation * (parent.scale * self.translation) + parent.translation,
            rotation: parent.rotation * self.rotation,
            scale: self.scale * parent.scale,
        }
    }

    /// Express `self` in the coordinate frame of `other`.
    ///
    /// This is `self` composed with the inverse of `other`, so that
    /// `self.relative_to(&other).then(&other)` reproduces `self`.
    pub fn relative_to(&self, other: &Transform) -> Transform {
        let recip_scale = safe_scale_reciprocal(other.scale);
        let inverse_rotation = other.rotation.inverse();

        Transform {
            translation: (inverse_rotation * (self.translation - other.translation)) * recip_scale,
            rotation: inverse_rotation * self.rotation,
            scale: self.scale * recip_scale,
        }
    }

    /// Inverse transform. Degenerate scale axes invert to zero.
    pub fn inverse(&self) -> Transform {
        let inverse_rotation = self.rotation.inverse();
        let inverse_scale = safe_scale_reciprocal(self.scale);

        Transform {
            translation: inverse_rotation * (inverse_scale * -self.translation),
            rotation: inverse_rotation,
            scale: inverse_scale,
        }
    }

    /// Renormalize the rotation to unit length.
    ///
    /// A rotation too small to normalize collapses to identity.
    pub fn normalize_rotation(&mut self) {
        let length_squared = self.rotation.length_squared();
        self.rotation = if length_squared > SMALL_NUMBER {
            self.rotation * length_squared.sqrt().recip()
        } else {
            Quat::IDENTITY
        };
    }

    /// Same as [`Transform::normalize_rotation`], by value
    pub fn normalized(mut self) -> Transform {
        self.normalize_rotation();
        self
    }

    /// Component-wise comparison within `max_abs_diff`
    ///
    /// Rotations compare as rotations, so `q` and `-q` are equal.
    pub fn abs_diff_eq(&self, other: &Transform, max_abs_diff: f32) -> bool {
        let rotation_matches = self.rotation.abs_diff_eq(other.rotation, max_abs_diff)
            || self.rotation.abs_diff_eq(-other.rotation, max_abs_diff);

        self.translation.abs_diff_eq(other.translation, max_abs_diff)
            && rotation_matches
            && self.scale.abs_diff_eq(other.scale, max_abs_diff)
    }
}

/// Per-axis reciprocal, mapping near-zero axes to zero instead of infinity
pub fn safe_scale_reciprocal(scale: Vec3) -> Vec3 {
    let recip = |s: f32| if s.abs() <= SMALL_NUMBER { 0.0 } else { s.recip() };
    Vec3::new(recip(scale.x), recip(scale.y), recip(scale.z))
}
