//! Materials and per-instance uniform blocks

use crate::context::ScriptContext;
use crate::resource::HandleSlot;
use crate::texture::Texture2D;
use conduit_core::types::MaterialOverride;
use conduit_core::{
    AssetHandle, BridgeError, NativePtr, Ownership, ResourceKind, Result, SamplerKind,
    TaggedValue, UniformKind, UniformValue,
};
use glam::{
    BVec2, BVec3, BVec4, DVec2, DVec3, DVec4, IVec2, IVec3, IVec4, Mat2, Mat3, Mat4, UVec2,
    UVec3, UVec4, Vec2, Vec3, Vec4,
};

pub struct Material {
    ctx: ScriptContext,
    slot: HandleSlot<AssetHandle>,
}

impl Material {
    /// Create a material owned by the caller.
    pub fn new(ctx: &ScriptContext, name: &str) -> Result<Self> {
        let handle = ctx.api().material_create(name);
        if handle.is_null() {
            return Err(BridgeError::Exhausted {
                resource: ResourceKind::Material,
            });
        }
        Ok(Self {
            ctx: ctx.clone(),
            slot: HandleSlot::owned(handle, ResourceKind::Material),
        })
    }

    pub(crate) fn borrowed(ctx: &ScriptContext, handle: AssetHandle) -> Self {
        Self {
            ctx: ctx.clone(),
            slot: HandleSlot::borrowed(handle, ResourceKind::Material),
        }
    }

    pub fn handle(&self) -> Result<AssetHandle> {
        self.slot.get()
    }

    pub fn ownership(&self) -> Ownership {
        self.slot.ownership()
    }

    pub fn set_shader(&self, shader: AssetHandle) -> Result<()> {
        let handle = self.slot.get()?;
        self.ctx.api().material_set_shader(handle, shader);
        Ok(())
    }

    /// Destroy an owned material, or detach a borrowed view. Safe to call
    /// more than once.
    pub fn release(&mut self) {
        if let Some(handle) = self.slot.release() {
            self.ctx.api().material_destroy(handle);
        }
    }
}

impl Drop for Material {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Material")
            .field("handle", &self.slot.get().ok())
            .field("ownership", &self.slot.ownership())
            .finish()
    }
}

/// Generates one setter per uniform kind, each funnelling into `set_uniform`.
macro_rules! typed_setters {
    ($($name:ident => $ty:ty),+ $(,)?) => {
        $(
            pub fn $name(&self, name: &str, value: $ty) {
                self.set_uniform(name, &value);
            }
        )+
    };
}

/// Per-instance uniform storage for one material slot of a mesh renderer.
///
/// Borrowed from the renderer; disabling the block on the renderer leaves
/// this view dangling.
#[derive(Clone)]
pub struct MaterialUniformBlock {
    ctx: ScriptContext,
    block: NativePtr,
}

impl MaterialUniformBlock {
    pub(crate) fn from_ptr(ctx: &ScriptContext, block: NativePtr) -> Result<Self> {
        if block.is_null() {
            return Err(BridgeError::InvalidHandle {
                resource: ResourceKind::UniformBlock,
            });
        }
        Ok(Self {
            ctx: ctx.clone(),
            block,
        })
    }

    pub fn ptr(&self) -> NativePtr {
        self.block
    }

    /// The single native entry every setter ends up in.
    fn submit(&self, name: &str, value: &TaggedValue) {
        self.ctx
            .api()
            .uniform_block_set(self.block, name, value.kind().code(), value.payload());
    }

    pub fn set_uniform<T: UniformValue>(&self, name: &str, value: &T) {
        self.submit(name, &TaggedValue::of(value));
    }

    /// Set a uniform from raw bytes. The byte count must match `kind`.
    pub fn set_raw(&self, name: &str, kind: UniformKind, bytes: &[u8]) -> Result<()> {
        let value = TaggedValue::new(kind, bytes)?;
        self.submit(name, &value);
        Ok(())
    }

    /// Bind `texture` to a sampler uniform.
    pub fn set_sampler(&self, name: &str, kind: SamplerKind, texture: &Texture2D) -> Result<()> {
        let handle = texture.handle()?;
        self.submit(name, &TaggedValue::sampler(kind, handle));
        Ok(())
    }

    typed_setters!(
        set_bool => bool,
        set_bvec2 => BVec2,
        set_bvec3 => BVec3,
        set_bvec4 => BVec4,
        set_int => i32,
        set_ivec2 => IVec2,
        set_ivec3 => IVec3,
        set_ivec4 => IVec4,
        set_uint => u32,
        set_uvec2 => UVec2,
        set_uvec3 => UVec3,
        set_uvec4 => UVec4,
        set_float => f32,
        set_vec2 => Vec2,
        set_vec3 => Vec3,
        set_vec4 => Vec4,
        set_double => f64,
        set_dvec2 => DVec2,
        set_dvec3 => DVec3,
        set_dvec4 => DVec4,
        set_mat2 => Mat2,
        set_mat3 => Mat3,
        set_mat4 => Mat4,
    );

    fn push_override(&self, value: MaterialOverride) {
        self.ctx.api().uniform_block_override(self.block, value);
    }

    pub fn set_albedo_map(&self, texture: &Texture2D) -> Result<()> {
        self.push_override(MaterialOverride::AlbedoMap(texture.handle()?));
        Ok(())
    }

    pub fn set_metallic_map(&self, texture: &Texture2D) -> Result<()> {
        self.push_override(MaterialOverride::MetallicMap(texture.handle()?));
        Ok(())
    }

    pub fn set_normal_map(&self, texture: &Texture2D) -> Result<()> {
        self.push_override(MaterialOverride::NormalMap(texture.handle()?));
        Ok(())
    }

    pub fn set_albedo_tint(&self, tint: Vec4) {
        self.push_override(MaterialOverride::AlbedoTint(tint));
    }

    pub fn set_metallic(&self, metallic: f32) {
        self.push_override(MaterialOverride::Metallic(metallic));
    }

    pub fn set_roughness(&self, roughness: f32) {
        self.push_override(MaterialOverride::Roughness(roughness));
    }
}

impl std::fmt::Debug for MaterialUniformBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("MaterialUniformBlock").field(&self.block).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conduit_host::HostEngine;
    use std::rc::Rc;

    #[test]
    fn owned_material_is_destroyed_once() {
        let host = Rc::new(HostEngine::default());
        let ctx = ScriptContext::new(host.clone());
        let mut material = Material::new(&ctx, "glass").unwrap();
        let handle = material.handle().unwrap();

        material.set_shader(AssetHandle::new(42)).unwrap();
        assert_eq!(host.material_shader(handle), AssetHandle::new(42));

        material.release();
        material.release();
        drop(material);
        assert!(!host.asset_exists(handle));
        assert_eq!(host.call_count("material_destroy"), 1);
    }

    #[test]
    fn null_block_is_an_invalid_handle() {
        let host = Rc::new(HostEngine::default());
        let ctx = ScriptContext::new(host);
        assert_eq!(
            MaterialUniformBlock::from_ptr(&ctx, NativePtr::NULL).unwrap_err(),
            BridgeError::InvalidHandle {
                resource: ResourceKind::UniformBlock
            }
        );
    }
}
