//! Conduit Script - the gameplay-facing side of the boundary
//!
//! Gameplay code holds a `ScriptContext` and works with lightweight values
//! that stand in for native-owned objects:
//!
//! - **Entities and component proxies:** non-owning views rebuilt from
//!   (entity id, component kind) at any time
//! - **Transform mirror:** fetch-on-demand reads, write-through setters
//! - **Resources:** compute buffers, textures, meshes and materials with one
//!   idempotent release path shared by `release()` and `Drop`
//! - **Uniform blocks:** one typed setter per uniform kind, all funnelling into
//!   a single tagged native call
//!
//! Nothing here is transactional. The native side may change anything between
//! two calls, so every call re-reads what it needs.

pub mod behaviour;
pub mod buffer;
pub mod component;
pub mod context;
pub mod debug;
pub mod entity;
pub mod input;
pub mod material;
pub mod mesh;
mod resource;
pub mod shader;
pub mod texture;
pub mod time;
pub mod transform;

pub use behaviour::{Behaviour, Collider};
pub use buffer::ComputeBuffer;
pub use component::{ComponentProxy, MaterialSlot};
pub use context::ScriptContext;
pub use debug::Debug;
pub use entity::Entity;
pub use input::Input;
pub use material::{Material, MaterialUniformBlock};
pub use mesh::Mesh;
pub use shader::ComputeShader;
pub use texture::Texture2D;
pub use time::Time;
pub use transform::{DirectionSource, Transform};

pub use conduit_core::component::{
    BoxCollider, DirectionalLight, MeshFilter, MeshRenderer, PointLight, Rigidbody,
    ScriptComponent, SphereCollider, SpotLight, TagComponent, TransformComponent,
};
pub use conduit_core::{BridgeError, Result};
