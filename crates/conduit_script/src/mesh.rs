//! Meshes
//!
//! A mesh keeps a CPU copy of its vertex streams and an uploaded copy.
//! Attribute setters touch the CPU copy only; `submit_changes` uploads it.

use crate::context::ScriptContext;
use crate::resource::HandleSlot;
use conduit_core::types::MeshAttribute;
use conduit_core::{AssetHandle, BridgeError, Ownership, ResourceKind, Result};
use glam::{Vec2, Vec3};

pub struct Mesh {
    ctx: ScriptContext,
    slot: HandleSlot<AssetHandle>,
}

impl Mesh {
    /// Create an empty mesh owned by the caller.
    pub fn new(ctx: &ScriptContext) -> Result<Self> {
        let handle = ctx.api().mesh_create();
        Self::owned(ctx, handle)
    }

    pub(crate) fn owned(ctx: &ScriptContext, handle: AssetHandle) -> Result<Self> {
        if handle.is_null() {
            return Err(BridgeError::Exhausted {
                resource: ResourceKind::Mesh,
            });
        }
        Ok(Self {
            ctx: ctx.clone(),
            slot: HandleSlot::owned(handle, ResourceKind::Mesh),
        })
    }

    /// View a mesh someone else owns. Releasing the view never destroys it.
    pub(crate) fn borrowed(ctx: &ScriptContext, handle: AssetHandle) -> Self {
        Self {
            ctx: ctx.clone(),
            slot: HandleSlot::borrowed(handle, ResourceKind::Mesh),
        }
    }

    pub fn handle(&self) -> Result<AssetHandle> {
        self.slot.get()
    }

    pub fn ownership(&self) -> Ownership {
        self.slot.ownership()
    }

    fn attribute(&self, attribute: MeshAttribute) -> Result<Vec<f32>> {
        let handle = self.slot.get()?;
        Ok(self.ctx.api().mesh_attribute(handle, attribute))
    }

    fn set_attribute(&self, attribute: MeshAttribute, data: &[f32]) -> Result<()> {
        let handle = self.slot.get()?;
        self.ctx.api().mesh_set_attribute(handle, attribute, data);
        Ok(())
    }

    fn vec3_attribute(&self, attribute: MeshAttribute) -> Result<Vec<Vec3>> {
        let flat = self.attribute(attribute)?;
        Ok(flat.chunks_exact(3).map(Vec3::from_slice).collect())
    }

    pub fn vertices(&self) -> Result<Vec<Vec3>> {
        self.vec3_attribute(MeshAttribute::Vertices)
    }

    pub fn set_vertices(&self, vertices: &[Vec3]) -> Result<()> {
        self.set_attribute(MeshAttribute::Vertices, bytemuck::cast_slice(vertices))
    }

    pub fn normals(&self) -> Result<Vec<Vec3>> {
        self.vec3_attribute(MeshAttribute::Normals)
    }

    pub fn set_normals(&self, normals: &[Vec3]) -> Result<()> {
        self.set_attribute(MeshAttribute::Normals, bytemuck::cast_slice(normals))
    }

    pub fn texture_coords(&self) -> Result<Vec<Vec2>> {
        let flat = self.attribute(MeshAttribute::TextureCoords)?;
        Ok(flat.chunks_exact(2).map(Vec2::from_slice).collect())
    }

    pub fn set_texture_coords(&self, coords: &[Vec2]) -> Result<()> {
        self.set_attribute(MeshAttribute::TextureCoords, bytemuck::cast_slice(coords))
    }

    pub fn tangents(&self) -> Result<Vec<Vec3>> {
        self.vec3_attribute(MeshAttribute::Tangents)
    }

    pub fn set_tangents(&self, tangents: &[Vec3]) -> Result<()> {
        self.set_attribute(MeshAttribute::Tangents, bytemuck::cast_slice(tangents))
    }

    pub fn bitangents(&self) -> Result<Vec<Vec3>> {
        self.vec3_attribute(MeshAttribute::Bitangents)
    }

    pub fn set_bitangents(&self, bitangents: &[Vec3]) -> Result<()> {
        self.set_attribute(MeshAttribute::Bitangents, bytemuck::cast_slice(bitangents))
    }

    pub fn triangles(&self) -> Result<Vec<u32>> {
        let handle = self.slot.get()?;
        Ok(self.ctx.api().mesh_triangles(handle))
    }

    pub fn set_triangles(&self, indices: &[u32]) -> Result<()> {
        let handle = self.slot.get()?;
        self.ctx.api().mesh_set_triangles(handle, indices);
        Ok(())
    }

    pub fn recalculate_normals(&self) -> Result<()> {
        let handle = self.slot.get()?;
        self.ctx.api().mesh_recalculate_normals(handle);
        Ok(())
    }

    /// Upload the CPU copy, dropping it afterwards when `clear_cpu` is set.
    pub fn submit_changes(&self, clear_cpu: bool) -> Result<()> {
        let handle = self.slot.get()?;
        self.ctx.api().mesh_submit(handle, clear_cpu);
        Ok(())
    }

    /// Pull the uploaded streams back into the CPU copy.
    pub fn copy_buffers_to_cpu(&self) -> Result<()> {
        let handle = self.slot.get()?;
        self.ctx.api().mesh_copy_to_cpu(handle);
        Ok(())
    }

    pub fn clear_cpu_buffers(&self) -> Result<()> {
        let handle = self.slot.get()?;
        self.ctx.api().mesh_clear_cpu(handle);
        Ok(())
    }

    /// Destroy an owned mesh, or detach a borrowed view. Safe to call more
    /// than once.
    pub fn release(&mut self) {
        if let Some(handle) = self.slot.release() {
            self.ctx.api().mesh_destroy(handle);
        }
    }
}

impl Drop for Mesh {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Mesh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mesh")
            .field("handle", &self.slot.get().ok())
            .field("ownership", &self.slot.ownership())
            .finish()
    }
}
