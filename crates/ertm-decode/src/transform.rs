//! Spatial transform records.

use glam::{Mat4, Quat, Vec3};

/// Position, rotation and scale of a scene object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    /// Rotation as stored on disk; not guaranteed to be normalized.
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Whether this is the identity transform.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// The stored rotation normalized, or identity when it has no length.
    #[must_use]
    pub fn normalized_rotation(&self) -> Quat {
        let len_sq = self.rotation.length_squared();
        if len_sq.is_finite() && len_sq > f32::EPSILON {
            self.rotation.normalize()
        } else {
            Quat::IDENTITY
        }
    }

    /// Compose translate ∘ rotate ∘ scale into one affine matrix.
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position)
            * Mat4::from_quat(self.normalized_rotation())
            * Mat4::from_scale(self.scale)
    }
}
