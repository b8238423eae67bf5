//! Tagged uniform values
//!
//! Material uniform blocks accept "set uniform `name` of kind K" through one
//! untyped native entry point. The native side trusts the payload size, so
//! a `TaggedValue` can only be built with a payload that matches its kind.

use crate::error::{BridgeError, Result};
use crate::handle::AssetHandle;
use crate::marshal::Marshal;
use glam::{
    BVec2, BVec3, BVec4, DVec2, DVec3, DVec4, IVec2, IVec3, IVec4, Mat2, Mat3, Mat4, UVec2,
    UVec3, UVec4, Vec2, Vec3, Vec4,
};

/// Closed set of uniform kinds understood by the native material system.
///
/// Discriminants are the boundary codes; `0` is reserved for "unknown".
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum UniformKind {
    Bool = 1,
    BVec2 = 2,
    BVec3 = 3,
    BVec4 = 4,
    Int = 5,
    IVec2 = 6,
    IVec3 = 7,
    IVec4 = 8,
    Uint = 9,
    UVec2 = 10,
    UVec3 = 11,
    UVec4 = 12,
    Float = 13,
    Vec2 = 14,
    Vec3 = 15,
    Vec4 = 16,
    Double = 17,
    DVec2 = 18,
    DVec3 = 19,
    DVec4 = 20,
    Mat2 = 21,
    Mat3 = 22,
    Mat4 = 23,
    Sampler1D = 24,
    Sampler1DArray = 25,
    Sampler1DShadow = 26,
    Sampler1DArrayShadow = 27,
    Sampler2D = 28,
    Sampler2DArray = 29,
    Sampler2DShadow = 30,
    Sampler2DArrayShadow = 31,
    Sampler3D = 32,
    SamplerCube = 33,
    SamplerCubeArray = 34,
    SamplerCubeShadow = 35,
    SamplerCubeArrayShadow = 36,
}

impl UniformKind {
    pub const ALL: [UniformKind; 36] = [
        UniformKind::Bool,
        UniformKind::BVec2,
        UniformKind::BVec3,
        UniformKind::BVec4,
        UniformKind::Int,
        UniformKind::IVec2,
        UniformKind::IVec3,
        UniformKind::IVec4,
        UniformKind::Uint,
        UniformKind::UVec2,
        UniformKind::UVec3,
        UniformKind::UVec4,
        UniformKind::Float,
        UniformKind::Vec2,
        UniformKind::Vec3,
        UniformKind::Vec4,
        UniformKind::Double,
        UniformKind::DVec2,
        UniformKind::DVec3,
        UniformKind::DVec4,
        UniformKind::Mat2,
        UniformKind::Mat3,
        UniformKind::Mat4,
        UniformKind::Sampler1D,
        UniformKind::Sampler1DArray,
        UniformKind::Sampler1DShadow,
        UniformKind::Sampler1DArrayShadow,
        UniformKind::Sampler2D,
        UniformKind::Sampler2DArray,
        UniformKind::Sampler2DShadow,
        UniformKind::Sampler2DArrayShadow,
        UniformKind::Sampler3D,
        UniformKind::SamplerCube,
        UniformKind::SamplerCubeArray,
        UniformKind::SamplerCubeShadow,
        UniformKind::SamplerCubeArrayShadow,
    ];

    pub const fn code(self) -> u32 {
        self as u32
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.code() == code)
    }

    pub const fn is_sampler(self) -> bool {
        self.code() >= UniformKind::Sampler1D.code()
    }

    /// Payload size in bytes.
    pub const fn size(self) -> usize {
        use UniformKind::*;
        match self {
            Bool => 1,
            BVec2 => 2,
            BVec3 => 3,
            BVec4 => 4,
            Int | Uint | Float => 4,
            IVec2 | UVec2 | Vec2 => 8,
            IVec3 | UVec3 | Vec3 => 12,
            IVec4 | UVec4 | Vec4 => 16,
            Double => 8,
            DVec2 => 16,
            DVec3 => 24,
            DVec4 => 32,
            Mat2 => 16,
            Mat3 => 36,
            Mat4 => 64,
            // samplers carry the texture's asset handle
            _ => 4,
        }
    }
}

/// Texture sampler flavours a uniform may bind.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SamplerKind {
    Sampler1D,
    Sampler1DArray,
    Sampler1DShadow,
    Sampler1DArrayShadow,
    Sampler2D,
    Sampler2DArray,
    Sampler2DShadow,
    Sampler2DArrayShadow,
    Sampler3D,
    Cube,
    CubeArray,
    CubeShadow,
    CubeArrayShadow,
}

impl SamplerKind {
    pub const fn uniform_kind(self) -> UniformKind {
        match self {
            SamplerKind::Sampler1D => UniformKind::Sampler1D,
            SamplerKind::Sampler1DArray => UniformKind::Sampler1DArray,
            SamplerKind::Sampler1DShadow => UniformKind::Sampler1DShadow,
            SamplerKind::Sampler1DArrayShadow => UniformKind::Sampler1DArrayShadow,
            SamplerKind::Sampler2D => UniformKind::Sampler2D,
            SamplerKind::Sampler2DArray => UniformKind::Sampler2DArray,
            SamplerKind::Sampler2DShadow => UniformKind::Sampler2DShadow,
            SamplerKind::Sampler2DArrayShadow => UniformKind::Sampler2DArrayShadow,
            SamplerKind::Sampler3D => UniformKind::Sampler3D,
            SamplerKind::Cube => UniformKind::SamplerCube,
            SamplerKind::CubeArray => UniformKind::SamplerCubeArray,
            SamplerKind::CubeShadow => UniformKind::SamplerCubeShadow,
            SamplerKind::CubeArrayShadow => UniformKind::SamplerCubeArrayShadow,
        }
    }
}

/// A Rust type with exactly one matching uniform kind.
pub trait UniformValue: Marshal {
    const KIND: UniformKind;
}

macro_rules! uniform_value {
    ($($ty:ty => $kind:ident),+ $(,)?) => {
        $(
            impl UniformValue for $ty {
                const KIND: UniformKind = UniformKind::$kind;
            }
        )+
    };
}

uniform_value!(
    bool => Bool,
    BVec2 => BVec2,
    BVec3 => BVec3,
    BVec4 => BVec4,
    i32 => Int,
    IVec2 => IVec2,
    IVec3 => IVec3,
    IVec4 => IVec4,
    u32 => Uint,
    UVec2 => UVec2,
    UVec3 => UVec3,
    UVec4 => UVec4,
    f32 => Float,
    Vec2 => Vec2,
    Vec3 => Vec3,
    Vec4 => Vec4,
    f64 => Double,
    DVec2 => DVec2,
    DVec3 => DVec3,
    DVec4 => DVec4,
    Mat2 => Mat2,
    Mat3 => Mat3,
    Mat4 => Mat4,
);

/// A (kind, payload) pair whose payload size always equals `kind.size()`.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedValue {
    kind: UniformKind,
    payload: Vec<u8>,
}

impl TaggedValue {
    /// Wrap raw payload bytes, rejecting any size that disagrees with `kind`.
    pub fn new(kind: UniformKind, payload: &[u8]) -> Result<Self> {
        if payload.len() != kind.size() {
            return Err(BridgeError::PayloadSize {
                kind,
                expected: kind.size(),
                actual: payload.len(),
            });
        }
        Ok(Self {
            kind,
            payload: payload.to_vec(),
        })
    }

    /// Encode a statically typed value.
    pub fn of<T: UniformValue>(value: &T) -> Self {
        debug_assert_eq!(T::SIZE, T::KIND.size());
        Self {
            kind: T::KIND,
            payload: value.to_bytes(),
        }
    }

    /// Bind a texture asset to a sampler uniform.
    pub fn sampler(kind: SamplerKind, texture: AssetHandle) -> Self {
        Self {
            kind: kind.uniform_kind(),
            payload: texture.raw().to_bytes(),
        }
    }

    pub fn kind(&self) -> UniformKind {
        self.kind
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Decode the payload as `T` if `T` is the type bound to this kind.
    pub fn decode<T: UniformValue>(&self) -> Option<T> {
        (T::KIND == self.kind).then(|| T::read_bytes(&self.payload))
    }
}
