//! Conduit Host - an in-process native runtime
//!
//! Everything behind the `NativeApi` boundary that a script side talks to:
//! - Scene storage for entities and their components
//! - Asset tables for prefabs, meshes, textures, materials and shaders
//! - Native memory for compute buffers and material uniform blocks
//! - Frame input, time and the script log sink
//!
//! The embedding application drives input and time through `HostEngine`
//! and inspects the results through its accessors.

pub mod assets;
pub mod config;
pub mod engine;
pub mod input;
pub mod memory;
pub mod scene;

pub use assets::MeshBuffers;
pub use config::HostConfig;
pub use engine::{HostEngine, LogEntry};
pub use scene::AppliedForce;
