//! Position/rotation/scale and the model matrix built from them.

use glam::{Mat4, Vec3};

/// Object placement in world space.
///
/// Fields are public and mutated directly; [`model`](Self::model) is
/// recomputed from them on every call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// Translation.
    pub position: Vec3,
    /// Per-axis rotation in radians. Applied X first, then Y, then Z.
    pub rotation: Vec3,
    /// Per-axis scale.
    pub scale: Vec3,
}

impl Transform {
    /// The identity transform: origin, no rotation, unit scale.
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    /// Build from explicit position, rotation and scale.
    #[must_use]
    pub const fn new(position: Vec3, rotation: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Model matrix `T * Rz * Ry * Rx * S` (column-major, right-handed).
    ///
    /// Scale is applied first, then the X, Y and Z rotations in that order,
    /// then the translation.
    #[must_use]
    pub fn model(&self) -> Mat4 {
        let rotation = Mat4::from_rotation_z(self.rotation.z)
            * Mat4::from_rotation_y(self.rotation.y)
            * Mat4::from_rotation_x(self.rotation.x);
        Mat4::from_translation(self.position) * rotation * Mat4::from_scale(self.scale)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
