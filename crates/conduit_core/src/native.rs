//! The native entry point catalogue
//!
//! Every call the script side can make into the engine goes through this
//! trait. Calls are synchronous and complete before returning; nothing here
//! retries or batches. Implementations decide what an unknown id means
//! (usually a no-op or a default value); the script side never relies on it.

use crate::component::{ComponentToken, FieldId};
use crate::handle::{AssetHandle, EntityId, NativePtr};
use crate::math::{Direction, TransformData};
use crate::types::{
    ButtonQuery, ForceMode, KeyCode, MaterialOverride, MeshAttribute, MouseButton, Severity,
    TextureFormat,
};
use glam::{IVec2, Vec2, Vec3, Vec4};

/// Boundary into the native engine runtime.
///
/// Byte-slice parameters are borrowed for the duration of the call only.
pub trait NativeApi {
    // Entity lifecycle
    fn entity_destroy(&self, entity: EntityId);
    fn entity_instantiate(&self, prefab: AssetHandle) -> EntityId;
    fn entity_parent(&self, entity: EntityId) -> EntityId;
    fn entity_set_parent(&self, entity: EntityId, parent: EntityId);

    // Component structure
    fn component_has(&self, entity: EntityId, component: ComponentToken) -> bool;
    fn component_add(&self, entity: EntityId, component: ComponentToken);
    fn component_remove(&self, entity: EntityId, component: ComponentToken);

    // Per-component fields; `out` and `value` are exactly `field.size()` bytes
    fn field_get(&self, entity: EntityId, field: FieldId, out: &mut [u8]);
    fn field_set(&self, entity: EntityId, field: FieldId, value: &[u8]);
    fn tag_get(&self, entity: EntityId) -> String;
    fn tag_set(&self, entity: EntityId, tag: &str);
    fn script_name_get(&self, entity: EntityId) -> String;
    fn script_name_set(&self, entity: EntityId, name: &str);
    fn rigidbody_apply_force(&self, entity: EntityId, force: Vec3, mode: ForceMode);
    fn rigidbody_apply_torque(&self, entity: EntityId, torque: Vec3);

    // Transform
    fn transform_get(&self, entity: EntityId) -> TransformData;
    fn transform_set(&self, entity: EntityId, transform: &TransformData);
    fn transform_set_position(&self, entity: EntityId, position: Vec3);
    fn transform_set_rotation(&self, entity: EntityId, rotation: Vec3);
    fn transform_set_scale(&self, entity: EntityId, scale: Vec3);
    fn transform_direction(&self, entity: EntityId, direction: Direction) -> Vec3;
    fn transform_set_front(&self, entity: EntityId, front: Vec3);

    // Mesh filter and renderer
    fn mesh_filter_copy_mesh(&self, entity: EntityId) -> AssetHandle;
    fn mesh_filter_shared_mesh(&self, entity: EntityId) -> AssetHandle;
    fn mesh_filter_set_mesh(&self, entity: EntityId, mesh: AssetHandle);
    fn mesh_renderer_material(&self, entity: EntityId) -> AssetHandle;
    fn mesh_renderer_set_material(&self, entity: EntityId, material: AssetHandle);
    fn mesh_renderer_materials(&self, entity: EntityId) -> Vec<AssetHandle>;
    fn mesh_renderer_set_materials(&self, entity: EntityId, materials: &[AssetHandle]);
    /// `index == u32::MAX` addresses the last material slot.
    fn mesh_renderer_enable_uniform_block(&self, entity: EntityId, index: u32);
    fn mesh_renderer_disable_uniform_block(&self, entity: EntityId, index: u32);
    fn mesh_renderer_enable_all_uniform_blocks(&self, entity: EntityId);
    fn mesh_renderer_disable_all_uniform_blocks(&self, entity: EntityId);
    /// Null when the slot has no enabled block.
    fn mesh_renderer_uniform_block(&self, entity: EntityId, index: u32) -> NativePtr;

    // Material uniform blocks
    /// `payload` must be exactly the size of the uniform kind named by
    /// `kind_code`; the native side does not check.
    fn uniform_block_set(&self, block: NativePtr, name: &str, kind_code: u32, payload: &[u8]);
    fn uniform_block_override(&self, block: NativePtr, value: MaterialOverride);

    // Compute buffers
    /// Null when the allocation cannot be made.
    fn compute_buffer_create(&self, count: usize, element_size: usize) -> NativePtr;
    fn compute_buffer_set_data(
        &self,
        buffer: NativePtr,
        data: &[u8],
        count: usize,
        element_size: usize,
    );
    fn compute_buffer_get_data(
        &self,
        buffer: NativePtr,
        out: &mut [u8],
        count: usize,
        element_size: usize,
    );
    fn compute_buffer_release(&self, buffer: NativePtr);

    // Compute shaders
    fn compute_shader_set_buffer(&self, shader: AssetHandle, buffer: NativePtr, binding: u32);
    fn compute_shader_dispatch(&self, shader: AssetHandle, x: u32, y: u32, z: u32);
    fn compute_shader_set_uniform(
        &self,
        shader: AssetHandle,
        name: &str,
        kind_code: u32,
        payload: &[u8],
    );

    // Textures
    /// Null when the texture cannot be created.
    fn texture_create(&self, width: u32, height: u32, format: TextureFormat) -> AssetHandle;
    fn texture_create_with_data(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        internal_format: TextureFormat,
        data_format: TextureFormat,
    ) -> AssetHandle;
    fn texture_set_pixel(&self, texture: AssetHandle, colour: Vec4, coord: IVec2);
    fn texture_set_pixel_data(&self, texture: AssetHandle, data: &[u8], format: TextureFormat);
    fn texture_submit(&self, texture: AssetHandle);
    fn texture_destroy(&self, texture: AssetHandle);

    // Meshes
    /// Null when the mesh cannot be created.
    fn mesh_create(&self) -> AssetHandle;
    fn mesh_destroy(&self, mesh: AssetHandle);
    fn mesh_attribute(&self, mesh: AssetHandle, attribute: MeshAttribute) -> Vec<f32>;
    fn mesh_set_attribute(&self, mesh: AssetHandle, attribute: MeshAttribute, data: &[f32]);
    fn mesh_triangles(&self, mesh: AssetHandle) -> Vec<u32>;
    fn mesh_set_triangles(&self, mesh: AssetHandle, indices: &[u32]);
    fn mesh_recalculate_normals(&self, mesh: AssetHandle);
    fn mesh_submit(&self, mesh: AssetHandle, clear_cpu: bool);
    fn mesh_copy_to_cpu(&self, mesh: AssetHandle);
    fn mesh_clear_cpu(&self, mesh: AssetHandle);

    // Materials
    /// Null when the material cannot be created.
    fn material_create(&self, name: &str) -> AssetHandle;
    fn material_set_shader(&self, material: AssetHandle, shader: AssetHandle);
    fn material_destroy(&self, material: AssetHandle);

    // Input
    fn input_key(&self, key: KeyCode, query: ButtonQuery) -> bool;
    fn input_mouse_button(&self, button: MouseButton, query: ButtonQuery) -> bool;
    fn input_mouse_position(&self) -> Vec2;

    // Time
    fn time_delta(&self) -> f32;
    fn time_current(&self) -> f32;

    // Logging
    fn log(&self, severity: Severity, message: &str);
}
