//! Small enums and structs shared by both sides of the boundary

use crate::marshal::Marshal;
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Light shadow mode. Crosses the boundary as one byte.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ShadowType {
    #[default]
    NoShadows = 0,
    HardShadows = 1,
    SoftShadows = 2,
}

impl ShadowType {
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(ShadowType::NoShadows),
            1 => Some(ShadowType::HardShadows),
            2 => Some(ShadowType::SoftShadows),
            _ => None,
        }
    }
}

impl Marshal for ShadowType {
    const SIZE: usize = 1;

    fn write_bytes(&self, out: &mut [u8]) {
        out[0] = *self as u8;
    }

    // Unknown bytes from the native side read back as no shadows.
    fn read_bytes(bytes: &[u8]) -> Self {
        Self::from_raw(bytes[0]).unwrap_or_default()
    }
}

/// Surface response of a collider.
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
#[repr(C)]
pub struct PhysicsMaterial {
    pub dynamic_friction: f32,
    pub static_friction: f32,
    pub bounciness: f32,
}

impl Default for PhysicsMaterial {
    fn default() -> Self {
        Self {
            dynamic_friction: 0.6,
            static_friction: 0.6,
            bounciness: 0.0,
        }
    }
}

impl Marshal for PhysicsMaterial {
    const SIZE: usize = std::mem::size_of::<PhysicsMaterial>();

    fn write_bytes(&self, out: &mut [u8]) {
        out[..Self::SIZE].copy_from_slice(bytemuck::bytes_of(self));
    }

    fn read_bytes(bytes: &[u8]) -> Self {
        bytemuck::pod_read_unaligned(&bytes[..Self::SIZE])
    }
}

/// How a force applied to a rigidbody is interpreted.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[repr(u32)]
pub enum ForceMode {
    #[default]
    Force = 0,
    Impulse = 1,
    VelocityChange = 2,
    Acceleration = 3,
}

/// Pixel layout of texture data.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TextureFormat {
    R8 = 0,
    Rgb8 = 1,
    #[default]
    Rgba8 = 2,
}

impl TextureFormat {
    pub const fn channels(self) -> usize {
        match self {
            TextureFormat::R8 => 1,
            TextureFormat::Rgb8 => 3,
            TextureFormat::Rgba8 => 4,
        }
    }
}

/// Log severity accepted by the native log sink.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Severity {
    Info = 0,
    Warning = 1,
    Error = 2,
    Critical = 3,
}

/// Which edge of a button state a query asks about.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ButtonQuery {
    /// Held this frame.
    Held,
    /// Went down this frame.
    Pressed,
    /// Went up this frame.
    Released,
}

/// Keyboard keys, numbered like the native window layer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum KeyCode {
    Space = 32,
    Num0 = 48,
    Num1 = 49,
    Num2 = 50,
    Num3 = 51,
    Num4 = 52,
    Num5 = 53,
    Num6 = 54,
    Num7 = 55,
    Num8 = 56,
    Num9 = 57,
    A = 65,
    B = 66,
    C = 67,
    D = 68,
    E = 69,
    F = 70,
    G = 71,
    H = 72,
    I = 73,
    J = 74,
    K = 75,
    L = 76,
    M = 77,
    N = 78,
    O = 79,
    P = 80,
    Q = 81,
    R = 82,
    S = 83,
    T = 84,
    U = 85,
    V = 86,
    W = 87,
    X = 88,
    Y = 89,
    Z = 90,
    Escape = 256,
    Enter = 257,
    Tab = 258,
    Backspace = 259,
    Right = 262,
    Left = 263,
    Down = 264,
    Up = 265,
    LeftShift = 340,
    LeftControl = 341,
    LeftAlt = 342,
    RightShift = 344,
    RightControl = 345,
    RightAlt = 346,
}

impl KeyCode {
    pub const fn code(self) -> u16 {
        self as u16
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum MouseButton {
    Left = 0,
    Right = 1,
    Middle = 2,
}

/// Shape of a collider reported to collision hooks.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ColliderKind {
    Box = 0,
    Sphere = 1,
}

/// Per-vertex float streams a mesh exposes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MeshAttribute {
    Vertices,
    Normals,
    TextureCoords,
    Tangents,
    Bitangents,
}

impl MeshAttribute {
    pub const ALL: [MeshAttribute; 5] = [
        MeshAttribute::Vertices,
        MeshAttribute::Normals,
        MeshAttribute::TextureCoords,
        MeshAttribute::Tangents,
        MeshAttribute::Bitangents,
    ];

    /// Floats per vertex.
    pub const fn components(self) -> usize {
        match self {
            MeshAttribute::TextureCoords => 2,
            _ => 3,
        }
    }
}

/// Material properties a uniform block can override without touching the
/// shared material.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MaterialOverride {
    AlbedoMap(crate::handle::AssetHandle),
    MetallicMap(crate::handle::AssetHandle),
    NormalMap(crate::handle::AssetHandle),
    AlbedoTint(glam::Vec4),
    Metallic(f32),
    Roughness(f32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shadow_type_reads_unknown_as_none() {
        assert_eq!(ShadowType::read_bytes(&[2]), ShadowType::SoftShadows);
        assert_eq!(ShadowType::read_bytes(&[9]), ShadowType::NoShadows);
        assert_eq!(ShadowType::HardShadows.to_bytes(), vec![1]);
    }

    #[test]
    fn physics_material_is_three_floats() {
        assert_eq!(<PhysicsMaterial as Marshal>::SIZE, 12);
        let material = PhysicsMaterial {
            dynamic_friction: 0.1,
            static_friction: 0.2,
            bounciness: 0.9,
        };
        assert_eq!(PhysicsMaterial::read_bytes(&material.to_bytes()), material);
    }

    #[test]
    fn texture_channels() {
        assert_eq!(TextureFormat::R8.channels(), 1);
        assert_eq!(TextureFormat::Rgba8.channels(), 4);
    }
}
