use crate::uniform::UniformKind;
use std::fmt;
use thiserror::Error;

/// Which kind of native object an error refers to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ResourceKind {
    Entity,
    ComputeBuffer,
    ComputeShader,
    Texture,
    Mesh,
    Material,
    UniformBlock,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Entity => "entity",
            ResourceKind::ComputeBuffer => "compute buffer",
            ResourceKind::ComputeShader => "compute shader",
            ResourceKind::Texture => "texture",
            ResourceKind::Mesh => "mesh",
            ResourceKind::Material => "material",
            ResourceKind::UniformBlock => "uniform block",
        };
        f.write_str(name)
    }
}

/// Errors the client side of the boundary detects before issuing a native call.
///
/// Anything only the native runtime can notice is its own contract and never
/// shows up here. Nothing in this layer retries.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BridgeError {
    #[error("{resource} handle is invalid or has already been released")]
    InvalidHandle { resource: ResourceKind },

    #[error(
        "{resource} transfer expects {expected_count} elements of {expected_size} bytes \
         but received {actual_count} elements of {actual_size} bytes"
    )]
    ShapeMismatch {
        resource: ResourceKind,
        expected_count: usize,
        expected_size: usize,
        actual_count: usize,
        actual_size: usize,
    },

    #[error("uniform kind {kind:?} expects {expected} payload bytes but received {actual}")]
    PayloadSize {
        kind: UniformKind,
        expected: usize,
        actual: usize,
    },

    #[error("native runtime could not create {resource}")]
    Exhausted { resource: ResourceKind },

    #[error("operation requires a live entity but the id is the null sentinel")]
    NullEntity,
}

pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_resource() {
        let err = BridgeError::InvalidHandle {
            resource: ResourceKind::ComputeBuffer,
        };
        assert_eq!(
            err.to_string(),
            "compute buffer handle is invalid or has already been released"
        );

        let err = BridgeError::Exhausted {
            resource: ResourceKind::Texture,
        };
        assert_eq!(err.to_string(), "native runtime could not create texture");
    }
}
