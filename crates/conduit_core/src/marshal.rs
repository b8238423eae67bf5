//! Fixed-layout value encoding for boundary calls
//!
//! Every scalar or small vector crosses the boundary by value as an
//! exactly-sized byte block. `Marshal` is the single place that knows the
//! byte layout of each Rust type.

use glam::{
    BVec2, BVec3, BVec4, DVec2, DVec3, DVec4, IVec2, IVec3, IVec4, Mat2, Mat3, Mat4, UVec2,
    UVec3, UVec4, Vec2, Vec3, Vec4,
};

/// A value with a fixed boundary size and layout.
pub trait Marshal: Sized {
    /// Encoded size in bytes.
    const SIZE: usize;

    /// Write exactly `SIZE` bytes into the front of `out`.
    ///
    /// # Panics
    /// If `out` is shorter than `SIZE`.
    fn write_bytes(&self, out: &mut [u8]);

    /// Decode from the front of `bytes`.
    ///
    /// # Panics
    /// If `bytes` is shorter than `SIZE`.
    fn read_bytes(bytes: &[u8]) -> Self;

    fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![0u8; Self::SIZE];
        self.write_bytes(&mut out);
        out
    }
}

/// Implement `Marshal` for plain-old-data types by reinterpreting their bytes.
macro_rules! marshal_pod {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Marshal for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                #[inline]
                fn write_bytes(&self, out: &mut [u8]) {
                    out[..Self::SIZE].copy_from_slice(bytemuck::bytes_of(self));
                }

                #[inline]
                fn read_bytes(bytes: &[u8]) -> Self {
                    bytemuck::pod_read_unaligned(&bytes[..Self::SIZE])
                }
            }
        )+
    };
}

marshal_pod!(
    u8, i32, u32, f32, f64, Vec2, Vec3, Vec4, IVec2, IVec3, IVec4, UVec2, UVec3, UVec4, DVec2,
    DVec3, DVec4, Mat2, Mat3, Mat4,
);

// Booleans travel as one byte per lane; any non-zero byte reads back as true.
impl Marshal for bool {
    const SIZE: usize = 1;

    fn write_bytes(&self, out: &mut [u8]) {
        out[0] = u8::from(*self);
    }

    fn read_bytes(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }
}

macro_rules! marshal_bvec {
    ($ty:ident, $lanes:expr, [$($field:ident),+]) => {
        impl Marshal for $ty {
            const SIZE: usize = $lanes;

            fn write_bytes(&self, out: &mut [u8]) {
                let lanes = [$(self.$field),+];
                for (slot, lane) in out[..$lanes].iter_mut().zip(lanes) {
                    *slot = u8::from(lane);
                }
            }

            fn read_bytes(bytes: &[u8]) -> Self {
                let mut lanes = bytes[..$lanes].iter().map(|byte| *byte != 0);
                $ty {
                    $($field: lanes.next().unwrap_or(false)),+
                }
            }
        }
    };
}

marshal_bvec!(BVec2, 2, [x, y]);
marshal_bvec!(BVec3, 3, [x, y, z]);
marshal_bvec!(BVec4, 4, [x, y, z, w]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_match_the_native_layout() {
        assert_eq!(<bool as Marshal>::SIZE, 1);
        assert_eq!(<BVec3 as Marshal>::SIZE, 3);
        assert_eq!(<i32 as Marshal>::SIZE, 4);
        assert_eq!(<Vec3 as Marshal>::SIZE, 12);
        assert_eq!(<DVec4 as Marshal>::SIZE, 32);
        assert_eq!(<Mat3 as Marshal>::SIZE, 36);
        assert_eq!(<Mat4 as Marshal>::SIZE, 64);
    }

    #[test]
    fn vec3_bytes_are_little_endian_floats() {
        let bytes = Vec3::new(1.0, 2.0, 3.0).to_bytes();
        assert_eq!(&bytes[0..4], &1.0f32.to_le_bytes());
        assert_eq!(&bytes[8..12], &3.0f32.to_le_bytes());
        assert_eq!(Vec3::read_bytes(&bytes), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn bool_lanes_use_one_byte_each() {
        let bytes = BVec3::new(true, false, true).to_bytes();
        assert_eq!(bytes, vec![1, 0, 1]);
        assert_eq!(BVec3::read_bytes(&[0, 7, 0]), BVec3::new(false, true, false));
        assert!(bool::read_bytes(&[2]));
    }

    #[test]
    fn write_leaves_trailing_bytes_untouched() {
        let mut out = [0xAAu8; 6];
        7u32.write_bytes(&mut out);
        assert_eq!(out, [7, 0, 0, 0, 0xAA, 0xAA]);
    }
}
