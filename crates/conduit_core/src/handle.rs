//! Opaque identifiers exchanged across the script/native boundary
//!
//! None of these types own anything. Validity is the native runtime's
//! business; the client only recognises the null sentinels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Native game object identifier.
///
/// Format: plain 32-bit value assigned by the native scene.
/// - `0` means "never initialised"
/// - `u32::MAX` is the placeholder id a component proxy carries before it is
///   bound to an entity
///
/// Both count as null. Entity ids are freely copyable and carry no
/// reference count.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    pub const NULL: Self = Self(0);
    pub const INVALID: Self = Self(u32::MAX);

    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn is_null(self) -> bool {
        self.0 == Self::NULL.0 || self.0 == Self::INVALID.0
    }

    /// Encode for the boundary (little-endian, 4 bytes).
    pub fn to_bits(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }

    /// Decode from the boundary encoding.
    pub fn from_bits(bits: [u8; 4]) -> Self {
        Self(u32::from_le_bytes(bits))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "entity(null)")
        } else {
            write!(f, "entity({})", self.0)
        }
    }
}

/// Identifier into the native asset table (materials, meshes, textures,
/// compute shaders, prefabs).
///
/// Whether the holder may release it is tracked by [`Ownership`] on the
/// wrapper, never by the handle itself.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetHandle(u32);

impl AssetHandle {
    /// Returned by native creation calls that failed.
    pub const NULL: Self = Self(0);

    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl Default for AssetHandle {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for AssetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "asset({})", self.0)
    }
}

/// Pointer-sized handle to a block of native memory (compute buffers,
/// uniform blocks).
///
/// Exactly one release per successful create. After release the value must
/// not be passed anywhere again.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct NativePtr(usize);

impl NativePtr {
    pub const NULL: Self = Self(0);

    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> usize {
        self.0
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for NativePtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Who is responsible for releasing a native resource.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Ownership {
    /// Created through a constructor; the holder releases it exactly once.
    Owned,
    /// Looked up from a component or the asset table; never released by the
    /// holder.
    Borrowed,
}

impl Ownership {
    pub const fn is_owned(self) -> bool {
        matches!(self, Ownership::Owned)
    }
}

/// An instantiable template living in the native asset table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Prefab(AssetHandle);

impl Prefab {
    pub const fn new(handle: AssetHandle) -> Self {
        Self(handle)
    }

    pub const fn handle(self) -> AssetHandle {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_entity_sentinels_are_null() {
        assert!(EntityId::NULL.is_null());
        assert!(EntityId::INVALID.is_null());
        assert!(EntityId::new(u32::MAX).is_null());
        assert!(!EntityId::new(7).is_null());
    }

    #[test]
    fn entity_bits_round_trip() {
        let id = EntityId::new(0xDEAD_BEEF);
        assert_eq!(EntityId::from_bits(id.to_bits()), id);
    }

    #[test]
    fn null_asset_and_pointer() {
        assert!(AssetHandle::NULL.is_null());
        assert!(!AssetHandle::new(3).is_null());
        assert!(NativePtr::NULL.is_null());
        assert!(!NativePtr::from_raw(0x1000).is_null());
    }

    #[test]
    fn default_asset_handle_is_null() {
        assert_eq!(AssetHandle::default(), AssetHandle::NULL);
    }
}
