//! Conduit Core
//!
//! Shared vocabulary of the script/native boundary:
//! - Opaque handles (entities, assets, native pointers)
//! - Component kinds and their fixed-size fields
//! - Byte-level value marshaling and tagged uniform values
//! - Transform math and the error taxonomy
//! - The native entry point catalogue (`NativeApi`)

pub mod component;
pub mod error;
pub mod handle;
pub mod marshal;
pub mod math;
pub mod native;
pub mod types;
pub mod uniform;

pub use bytemuck;
pub use glam;

pub use component::{Component, ComponentKind, ComponentToken, Field, FieldId};
pub use error::{BridgeError, ResourceKind, Result};
pub use handle::{AssetHandle, EntityId, NativePtr, Ownership, Prefab};
pub use marshal::Marshal;
pub use math::{Direction, Directions, TransformData};
pub use native::NativeApi;
pub use uniform::{SamplerKind, TaggedValue, UniformKind, UniformValue};

/// Boundary protocol version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
