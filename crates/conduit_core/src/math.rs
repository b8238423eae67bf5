//! Transform data and direction helpers
//!
//! Rotations are Euler angles in degrees, `x` = pitch, `y` = yaw,
//! `z` = roll, composed yaw -> pitch -> roll.

use crate::marshal::Marshal;
use bytemuck::{Pod, Zeroable};
use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Canonical axes of an unrotated transform.
pub const CANONICAL_UP: Vec3 = Vec3::Y;
pub const CANONICAL_FRONT: Vec3 = Vec3::NEG_Z;
pub const CANONICAL_RIGHT: Vec3 = Vec3::X;

/// Position, rotation (Euler degrees) and scale, exchanged in one round trip.
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
#[repr(C)]
pub struct TransformData {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl TransformData {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn quat(&self) -> Quat {
        euler_quat(self.rotation)
    }

    pub fn directions(&self) -> Directions {
        euler_directions(self.rotation)
    }
}

impl Default for TransformData {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Marshal for TransformData {
    const SIZE: usize = std::mem::size_of::<TransformData>();

    fn write_bytes(&self, out: &mut [u8]) {
        out[..Self::SIZE].copy_from_slice(bytemuck::bytes_of(self));
    }

    fn read_bytes(bytes: &[u8]) -> Self {
        bytemuck::pod_read_unaligned(&bytes[..Self::SIZE])
    }
}

/// One of the derived direction vectors of a transform.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Direction {
    Front,
    Up,
    Right,
}

impl Direction {
    pub const fn canonical(self) -> Vec3 {
        match self {
            Direction::Front => CANONICAL_FRONT,
            Direction::Up => CANONICAL_UP,
            Direction::Right => CANONICAL_RIGHT,
        }
    }
}

/// The three derived unit vectors of a rotation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Directions {
    pub front: Vec3,
    pub up: Vec3,
    pub right: Vec3,
}

impl Directions {
    pub fn get(&self, direction: Direction) -> Vec3 {
        match direction {
            Direction::Front => self.front,
            Direction::Up => self.up,
            Direction::Right => self.right,
        }
    }
}

/// Quaternion for Euler degrees composed yaw (Y), then pitch (X), then roll (Z).
pub fn euler_quat(rotation_degrees: Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::YXZ,
        rotation_degrees.y.to_radians(),
        rotation_degrees.x.to_radians(),
        rotation_degrees.z.to_radians(),
    )
}

/// Rotate the canonical axes through `rotation_degrees`.
pub fn euler_directions(rotation_degrees: Vec3) -> Directions {
    let q = euler_quat(rotation_degrees);
    Directions {
        front: (q * CANONICAL_FRONT).normalize(),
        up: (q * CANONICAL_UP).normalize(),
        right: (q * CANONICAL_RIGHT).normalize(),
    }
}

/// Euler degrees that make the canonical front face `front`, with zero roll.
///
/// Returns `None` for a zero-length direction.
pub fn look_rotation(front: Vec3) -> Option<Vec3> {
    let front = front.try_normalize()?;
    let yaw = (-front.x).atan2(-front.z);
    let pitch = front.y.clamp(-1.0, 1.0).asin();
    Some(Vec3::new(pitch.to_degrees(), yaw.to_degrees(), 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn identity_uses_canonical_axes() {
        let dirs = euler_directions(Vec3::ZERO);
        assert!(dirs.up.abs_diff_eq(Vec3::Y, EPS));
        assert!(dirs.front.abs_diff_eq(Vec3::NEG_Z, EPS));
        assert!(dirs.right.abs_diff_eq(Vec3::X, EPS));
    }

    #[test]
    fn directions_are_unit_length() {
        let samples = [
            Vec3::new(12.0, 45.0, -30.0),
            Vec3::new(-89.0, 179.0, 90.0),
            Vec3::new(720.0, -360.5, 33.3),
            Vec3::new(1e4, 3.0, -7.0),
        ];
        for rotation in samples {
            let dirs = euler_directions(rotation);
            for v in [dirs.front, dirs.up, dirs.right] {
                assert!((v.length() - 1.0).abs() < EPS, "{rotation:?} -> {v:?}");
            }
        }
    }

    #[test]
    fn yaw_turns_front_towards_negative_x() {
        let dirs = euler_directions(Vec3::new(0.0, 90.0, 0.0));
        assert!(dirs.front.abs_diff_eq(Vec3::NEG_X, EPS));
        assert!(dirs.up.abs_diff_eq(Vec3::Y, EPS));
    }

    #[test]
    fn look_rotation_inverts_front() {
        let target = Vec3::new(1.0, 0.5, -2.0).normalize();
        let rotation = look_rotation(target).unwrap();
        assert!(euler_directions(rotation).front.abs_diff_eq(target, 1e-4));
        assert!(look_rotation(Vec3::ZERO).is_none());
    }

    #[test]
    fn transform_data_is_three_vec3s() {
        assert_eq!(<TransformData as Marshal>::SIZE, 36);
        assert_eq!(TransformData::default().scale, Vec3::ONE);
    }
}
