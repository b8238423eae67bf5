//! `HostEngine`: an in-process native runtime
//!
//! Implements every `NativeApi` entry point against in-memory state. Calls
//! naming an unknown entity, asset or pointer are logged and ignored, and
//! getters return a default, which is what the native engine does too.

use crate::assets::{
    Asset, AssetTable, ComputeShaderState, MaterialState, MeshBuffers, MeshState, PrefabTemplate,
    TextureState,
};
use crate::config::HostConfig;
use crate::input::InputState;
use crate::memory::NativeHeap;
use crate::scene::{AppliedForce, Refusal, Scene};
use conduit_core::math::{euler_directions, look_rotation};
use conduit_core::types::{
    ButtonQuery, ForceMode, KeyCode, MaterialOverride, MeshAttribute, MouseButton, Severity,
    TextureFormat,
};
use conduit_core::{
    AssetHandle, ComponentKind, ComponentToken, Direction, EntityId, FieldId, NativeApi,
    NativePtr, Prefab, TaggedValue, TransformData, UniformKind,
};
use conduit_metrics::CallCounter;
use glam::{IVec2, Vec2, Vec3, Vec4};
use std::cell::RefCell;

/// A message the script side sent to the log sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub severity: Severity,
    pub message: String,
}

struct HostState {
    scene: Scene,
    assets: AssetTable,
    heap: NativeHeap,
    input: InputState,
    delta_time: f32,
    current_time: f32,
    logs: Vec<LogEntry>,
    default_material: AssetHandle,
}

pub struct HostEngine {
    config: HostConfig,
    state: RefCell<HostState>,
    calls: RefCell<CallCounter>,
}

impl HostEngine {
    pub fn new(config: HostConfig) -> Self {
        let mut assets = AssetTable::new(config.max_assets);
        let default_material = assets.insert(Asset::Material(MaterialState {
            name: "Default Material".to_owned(),
            shader: AssetHandle::NULL,
        }));
        let state = HostState {
            scene: Scene::new(),
            assets,
            heap: NativeHeap::new(config.max_buffer_bytes),
            input: InputState::new(),
            delta_time: 0.0,
            current_time: 0.0,
            logs: Vec::new(),
            default_material,
        };

        tracing::debug!(
            "Host engine created (buffer budget {} bytes, {} assets)",
            config.max_buffer_bytes,
            config.max_assets
        );

        Self {
            config,
            state: RefCell::new(state),
            calls: RefCell::new(CallCounter::new()),
        }
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    fn record(&self, entry: &'static str) {
        self.calls.borrow_mut().record(entry);
    }

    // ------------------------------------------------------------------
    // Scene setup
    // ------------------------------------------------------------------

    pub fn spawn(&self, tag: &str) -> EntityId {
        self.state.borrow_mut().scene.spawn(tag)
    }

    /// Spawn under a fixed id. Returns false if the id is a sentinel or taken.
    pub fn spawn_with_id(&self, id: EntityId, tag: &str) -> bool {
        self.state.borrow_mut().scene.spawn_with_id(id, tag)
    }

    pub fn register_prefab(
        &self,
        name: &str,
        components: &[ComponentKind],
        transform: TransformData,
    ) -> Prefab {
        let handle = self.state.borrow_mut().assets.insert(Asset::Prefab(PrefabTemplate {
            name: name.to_owned(),
            components: components.to_vec(),
            transform,
        }));
        Prefab::new(handle)
    }

    pub fn register_compute_shader(&self, name: &str) -> AssetHandle {
        self.state
            .borrow_mut()
            .assets
            .insert(Asset::ComputeShader(ComputeShaderState {
                name: name.to_owned(),
                ..ComputeShaderState::default()
            }))
    }

    /// Register a mesh asset from positions and triangle indices.
    pub fn register_mesh(&self, vertices: &[Vec3], triangles: &[u32]) -> AssetHandle {
        let mut buffers = MeshBuffers::default();
        buffers.attributes.insert(
            MeshAttribute::Vertices,
            vertices.iter().flat_map(|v| v.to_array()).collect(),
        );
        buffers.triangles = triangles.to_vec();
        self.state
            .borrow_mut()
            .assets
            .insert(Asset::Mesh(MeshState::with_buffers(buffers)))
    }

    pub fn register_material(&self, name: &str) -> AssetHandle {
        self.state.borrow_mut().assets.insert(Asset::Material(MaterialState {
            name: name.to_owned(),
            shader: AssetHandle::NULL,
        }))
    }

    /// Material every new mesh renderer starts with.
    pub fn default_material(&self) -> AssetHandle {
        self.state.borrow().default_material
    }

    // ------------------------------------------------------------------
    // Drivers (the embedding application's side)
    // ------------------------------------------------------------------

    pub fn press_key(&self, key: KeyCode) {
        self.state.borrow_mut().input.press_key(key);
    }

    pub fn release_key(&self, key: KeyCode) {
        self.state.borrow_mut().input.release_key(key);
    }

    pub fn press_mouse(&self, button: MouseButton) {
        self.state.borrow_mut().input.press_mouse(button);
    }

    pub fn release_mouse(&self, button: MouseButton) {
        self.state.borrow_mut().input.release_mouse(button);
    }

    pub fn set_mouse_position(&self, position: Vec2) {
        self.state.borrow_mut().input.set_mouse_position(position);
    }

    /// Close the input frame: pressed/released edges are cleared.
    pub fn end_frame(&self) {
        self.state.borrow_mut().input.end_frame();
    }

    pub fn advance_time(&self, delta: f32) {
        let mut state = self.state.borrow_mut();
        state.delta_time = delta;
        state.current_time += delta;
    }

    /// Move an entity from the native side, as physics would.
    pub fn place(&self, entity: EntityId, position: Vec3) -> bool {
        match self.state.borrow_mut().scene.get_mut(entity) {
            Some(record) => {
                record.transform.position = position;
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    pub fn logs(&self) -> Vec<LogEntry> {
        self.state.borrow().logs.clone()
    }

    /// Times `entry` was called since creation or the last `reset_calls`.
    /// Always zero without the `metrics` feature.
    pub fn call_count(&self, entry: &str) -> usize {
        self.calls.borrow().get(entry)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.borrow().total()
    }

    pub fn reset_calls(&self) {
        self.calls.borrow_mut().reset();
    }

    pub fn call_summary(&self) -> Vec<(&'static str, usize)> {
        self.calls.borrow().iter().collect()
    }

    pub fn entity_exists(&self, entity: EntityId) -> bool {
        self.state.borrow().scene.contains(entity)
    }

    pub fn entity_count(&self) -> usize {
        self.state.borrow().scene.len()
    }

    pub fn entities(&self) -> Vec<EntityId> {
        self.state.borrow().scene.ids().collect()
    }

    pub fn components(&self, entity: EntityId) -> Vec<ComponentKind> {
        self.state
            .borrow()
            .scene
            .get(entity)
            .map(|record| record.components.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn applied_forces(&self, entity: EntityId) -> Vec<AppliedForce> {
        self.state
            .borrow()
            .scene
            .get(entity)
            .map(|record| record.forces.clone())
            .unwrap_or_default()
    }

    pub fn live_buffers(&self) -> usize {
        self.state.borrow().heap.live_buffers()
    }

    pub fn buffer_bytes(&self) -> usize {
        self.state.borrow().heap.buffer_bytes()
    }

    pub fn live_uniform_blocks(&self) -> usize {
        self.state.borrow().heap.live_blocks()
    }

    pub fn asset_exists(&self, handle: AssetHandle) -> bool {
        self.state.borrow().assets.contains(handle)
    }

    pub fn asset_count(&self) -> usize {
        self.state.borrow().assets.len()
    }

    /// Last value written to uniform `name` of `block`.
    pub fn uniform_value(&self, block: NativePtr, name: &str) -> Option<TaggedValue> {
        let state = self.state.borrow();
        let (kind, payload) = state.heap.block(block)?.uniforms.get(name)?;
        TaggedValue::new(*kind, payload).ok()
    }

    pub fn overrides(&self, block: NativePtr) -> Vec<MaterialOverride> {
        self.state
            .borrow()
            .heap
            .block(block)
            .map(|b| b.overrides.clone())
            .unwrap_or_default()
    }

    pub fn dispatches(&self, shader: AssetHandle) -> Vec<[u32; 3]> {
        self.state
            .borrow()
            .assets
            .compute_shader(shader)
            .map(|s| s.dispatches.clone())
            .unwrap_or_default()
    }

    pub fn shader_buffer(&self, shader: AssetHandle, binding: u32) -> Option<NativePtr> {
        self.state
            .borrow()
            .assets
            .compute_shader(shader)?
            .buffers
            .get(&binding)
            .copied()
    }

    pub fn shader_uniform(&self, shader: AssetHandle, name: &str) -> Option<TaggedValue> {
        let state = self.state.borrow();
        let (kind, payload) = state.assets.compute_shader(shader)?.uniforms.get(name)?;
        TaggedValue::new(*kind, payload).ok()
    }

    pub fn texture_pixels(&self, texture: AssetHandle) -> Option<Vec<u8>> {
        Some(self.state.borrow().assets.texture(texture)?.pixels.clone())
    }

    pub fn texture_submissions(&self, texture: AssetHandle) -> u32 {
        self.state
            .borrow()
            .assets
            .texture(texture)
            .map_or(0, |t| t.submissions)
    }

    /// The uploaded copy of a mesh, if it was ever submitted.
    pub fn mesh_gpu(&self, mesh: AssetHandle) -> Option<MeshBuffers> {
        self.state.borrow().assets.mesh(mesh)?.gpu.clone()
    }

    pub fn material_shader(&self, material: AssetHandle) -> AssetHandle {
        self.state
            .borrow()
            .assets
            .material(material)
            .map_or(AssetHandle::NULL, |m| m.shader)
    }
}

impl Default for HostEngine {
    fn default() -> Self {
        Self::new(HostConfig::default())
    }
}

/// Store a tagged uniform after checking the kind code and payload size.
fn store_uniform(
    uniforms: &mut std::collections::HashMap<String, (UniformKind, Vec<u8>)>,
    name: &str,
    kind_code: u32,
    payload: &[u8],
) -> bool {
    match UniformKind::from_code(kind_code) {
        Some(kind) if kind.size() == payload.len() => {
            uniforms.insert(name.to_owned(), (kind, payload.to_vec()));
            true
        }
        _ => false,
    }
}

impl NativeApi for HostEngine {
    // ------------------------------------------------------------------
    // Entity lifecycle
    // ------------------------------------------------------------------

    fn entity_destroy(&self, entity: EntityId) {
        self.record("entity_destroy");
        let mut state = self.state.borrow_mut();
        let Some(record) = state.scene.despawn(entity) else {
            tracing::warn!("destroy ignored: {} does not exist", entity);
            return;
        };
        for block in record.blocks() {
            state.heap.free_block(block);
        }
        tracing::debug!("Destroyed {} ({})", entity, record.tag);
    }

    fn entity_instantiate(&self, prefab: AssetHandle) -> EntityId {
        self.record("entity_instantiate");
        let mut state = self.state.borrow_mut();
        let Some(template) = state.assets.prefab(prefab).cloned() else {
            tracing::warn!("instantiate ignored: {} is not a prefab", prefab);
            return EntityId::NULL;
        };

        let default_material = state.default_material;
        let id = state.scene.spawn(&template.name);
        for kind in &template.components {
            match state.scene.add_component(id, *kind, default_material) {
                // intrinsic kinds and repeats in the template
                Ok(()) | Err(Refusal::AlreadyPresent) => {}
                Err(refusal) => {
                    tracing::warn!("instantiate could not add {} to {}: {:?}", kind, id, refusal);
                }
            }
        }
        if let Some(record) = state.scene.get_mut(id) {
            record.transform = template.transform;
        }
        tracing::debug!("Instantiated {} from {}", id, prefab);
        id
    }

    fn entity_parent(&self, entity: EntityId) -> EntityId {
        self.record("entity_parent");
        self.state
            .borrow()
            .scene
            .get(entity)
            .map_or(EntityId::NULL, |record| record.parent)
    }

    fn entity_set_parent(&self, entity: EntityId, parent: EntityId) {
        self.record("entity_set_parent");
        let mut state = self.state.borrow_mut();
        let cyclic = state.scene.is_ancestor(entity, parent);
        if !parent.is_null() && (!state.scene.contains(parent) || cyclic) {
            tracing::warn!("set_parent ignored: {} cannot parent {}", parent, entity);
            return;
        }
        match state.scene.get_mut(entity) {
            Some(record) => record.parent = parent,
            None => tracing::warn!("set_parent ignored: {} does not exist", entity),
        }
    }

    // ------------------------------------------------------------------
    // Component structure
    // ------------------------------------------------------------------

    fn component_has(&self, entity: EntityId, component: ComponentToken) -> bool {
        self.record("component_has");
        let Some(kind) = ComponentKind::from_token(component) else {
            return false;
        };
        self.state
            .borrow()
            .scene
            .get(entity)
            .is_some_and(|record| record.has(kind))
    }

    fn component_add(&self, entity: EntityId, component: ComponentToken) {
        self.record("component_add");
        let Some(kind) = ComponentKind::from_token(component) else {
            tracing::warn!("add ignored: unknown component token {}", component.raw());
            return;
        };
        let mut state = self.state.borrow_mut();
        let default_material = state.default_material;
        match state.scene.add_component(entity, kind, default_material) {
            Ok(()) => tracing::debug!("Added {} to {}", kind, entity),
            Err(Refusal::AlreadyPresent) => {}
            Err(refusal) => tracing::warn!("add {} to {} ignored: {:?}", kind, entity, refusal),
        }
    }

    fn component_remove(&self, entity: EntityId, component: ComponentToken) {
        self.record("component_remove");
        let Some(kind) = ComponentKind::from_token(component) else {
            tracing::warn!("remove ignored: unknown component token {}", component.raw());
            return;
        };
        let mut state = self.state.borrow_mut();
        match state.scene.remove_component(entity, kind) {
            Ok(freed) => {
                for block in freed {
                    state.heap.free_block(block);
                }
                tracing::debug!("Removed {} from {}", kind, entity);
            }
            Err(Refusal::Absent) => {}
            Err(refusal) => {
                tracing::warn!("remove {} from {} ignored: {:?}", kind, entity, refusal)
            }
        }
    }

    // ------------------------------------------------------------------
    // Fields
    // ------------------------------------------------------------------

    fn field_get(&self, entity: EntityId, field: FieldId, out: &mut [u8]) {
        self.record("field_get");
        let state = self.state.borrow();
        let stored = state
            .scene
            .get(entity)
            .and_then(|record| record.fields.get(&field));
        match stored {
            Some(bytes) if bytes.len() == out.len() => out.copy_from_slice(bytes),
            _ => tracing::warn!("field {:?} of {} unavailable", field, entity),
        }
    }

    fn field_set(&self, entity: EntityId, field: FieldId, value: &[u8]) {
        self.record("field_set");
        let mut state = self.state.borrow_mut();
        let slot = state
            .scene
            .get_mut(entity)
            .and_then(|record| record.fields.get_mut(&field));
        match slot {
            Some(bytes) if bytes.len() == value.len() => bytes.copy_from_slice(value),
            _ => tracing::warn!("field {:?} of {} not written", field, entity),
        }
    }

    fn tag_get(&self, entity: EntityId) -> String {
        self.record("tag_get");
        self.state
            .borrow()
            .scene
            .get(entity)
            .map(|record| record.tag.clone())
            .unwrap_or_default()
    }

    fn tag_set(&self, entity: EntityId, tag: &str) {
        self.record("tag_set");
        if let Some(record) = self.state.borrow_mut().scene.get_mut(entity) {
            record.tag = tag.to_owned();
        }
    }

    fn script_name_get(&self, entity: EntityId) -> String {
        self.record("script_name_get");
        self.state
            .borrow()
            .scene
            .get(entity)
            .filter(|record| record.has(ComponentKind::Script))
            .map(|record| record.script_name.clone())
            .unwrap_or_default()
    }

    fn script_name_set(&self, entity: EntityId, name: &str) {
        self.record("script_name_set");
        let mut state = self.state.borrow_mut();
        match state.scene.get_mut(entity) {
            Some(record) if record.has(ComponentKind::Script) => {
                record.script_name = name.to_owned();
            }
            _ => tracing::warn!("script name of {} not written", entity),
        }
    }

    fn rigidbody_apply_force(&self, entity: EntityId, force: Vec3, mode: ForceMode) {
        self.record("rigidbody_apply_force");
        let mut state = self.state.borrow_mut();
        match state.scene.get_mut(entity) {
            Some(record) if record.has(ComponentKind::Rigidbody) => {
                record.forces.push(AppliedForce::Force { value: force, mode });
            }
            _ => tracing::warn!("force on {} ignored: no rigidbody", entity),
        }
    }

    fn rigidbody_apply_torque(&self, entity: EntityId, torque: Vec3) {
        self.record("rigidbody_apply_torque");
        let mut state = self.state.borrow_mut();
        match state.scene.get_mut(entity) {
            Some(record) if record.has(ComponentKind::Rigidbody) => {
                record.forces.push(AppliedForce::Torque { value: torque });
            }
            _ => tracing::warn!("torque on {} ignored: no rigidbody", entity),
        }
    }

    // ------------------------------------------------------------------
    // Transform
    // ------------------------------------------------------------------

    fn transform_get(&self, entity: EntityId) -> TransformData {
        self.record("transform_get");
        self.state
            .borrow()
            .scene
            .get(entity)
            .map_or(TransformData::IDENTITY, |record| record.transform)
    }

    fn transform_set(&self, entity: EntityId, transform: &TransformData) {
        self.record("transform_set");
        if let Some(record) = self.state.borrow_mut().scene.get_mut(entity) {
            record.transform = *transform;
        }
    }

    fn transform_set_position(&self, entity: EntityId, position: Vec3) {
        self.record("transform_set_position");
        if let Some(record) = self.state.borrow_mut().scene.get_mut(entity) {
            record.transform.position = position;
        }
    }

    fn transform_set_rotation(&self, entity: EntityId, rotation: Vec3) {
        self.record("transform_set_rotation");
        if let Some(record) = self.state.borrow_mut().scene.get_mut(entity) {
            record.transform.rotation = rotation;
        }
    }

    fn transform_set_scale(&self, entity: EntityId, scale: Vec3) {
        self.record("transform_set_scale");
        if let Some(record) = self.state.borrow_mut().scene.get_mut(entity) {
            record.transform.scale = scale;
        }
    }

    fn transform_direction(&self, entity: EntityId, direction: Direction) -> Vec3 {
        self.record("transform_direction");
        match self.state.borrow().scene.get(entity) {
            Some(record) => euler_directions(record.transform.rotation).get(direction),
            None => direction.canonical(),
        }
    }

    fn transform_set_front(&self, entity: EntityId, front: Vec3) {
        self.record("transform_set_front");
        let Some(rotation) = look_rotation(front) else {
            tracing::warn!("set_front on {} ignored: zero direction", entity);
            return;
        };
        if let Some(record) = self.state.borrow_mut().scene.get_mut(entity) {
            record.transform.rotation = rotation;
        }
    }

    // ------------------------------------------------------------------
    // Mesh filter and renderer
    // ------------------------------------------------------------------

    fn mesh_filter_copy_mesh(&self, entity: EntityId) -> AssetHandle {
        self.record("mesh_filter_copy_mesh");
        let mut state = self.state.borrow_mut();
        let source = match state.scene.get(entity) {
            Some(record) if record.has(ComponentKind::MeshFilter) => record.mesh,
            _ => return AssetHandle::NULL,
        };
        // a filter without a mesh hands out a fresh empty one
        let copy = state.assets.mesh(source).cloned().unwrap_or_default();
        state.assets.insert(Asset::Mesh(copy))
    }

    fn mesh_filter_shared_mesh(&self, entity: EntityId) -> AssetHandle {
        self.record("mesh_filter_shared_mesh");
        match self.state.borrow().scene.get(entity) {
            Some(record) if record.has(ComponentKind::MeshFilter) => record.mesh,
            _ => AssetHandle::NULL,
        }
    }

    fn mesh_filter_set_mesh(&self, entity: EntityId, mesh: AssetHandle) {
        self.record("mesh_filter_set_mesh");
        let mut state = self.state.borrow_mut();
        if state.assets.mesh(mesh).is_none() {
            tracing::warn!("set_mesh on {} ignored: {} is not a mesh", entity, mesh);
            return;
        }
        match state.scene.get_mut(entity) {
            Some(record) if record.has(ComponentKind::MeshFilter) => record.mesh = mesh,
            _ => tracing::warn!("set_mesh ignored: {} has no mesh filter", entity),
        }
    }

    fn mesh_renderer_material(&self, entity: EntityId) -> AssetHandle {
        self.record("mesh_renderer_material");
        self.state
            .borrow()
            .scene
            .get(entity)
            .and_then(|record| record.materials.last())
            .map_or(AssetHandle::NULL, |slot| slot.material)
    }

    fn mesh_renderer_set_material(&self, entity: EntityId, material: AssetHandle) {
        self.record("mesh_renderer_set_material");
        let mut state = self.state.borrow_mut();
        if state.assets.material(material).is_none() {
            tracing::warn!("set_material on {} ignored: {} is not a material", entity, material);
            return;
        }
        let HostState { scene, heap, .. } = &mut *state;
        let Some(slot) = scene
            .get_mut(entity)
            .filter(|record| record.has(ComponentKind::MeshRenderer))
            .and_then(|record| record.materials.last_mut())
        else {
            return;
        };
        if slot.material != material {
            slot.material = material;
            if let Some(block) = heap.block_mut(slot.block) {
                block.material = material;
            }
        }
    }

    fn mesh_renderer_materials(&self, entity: EntityId) -> Vec<AssetHandle> {
        self.record("mesh_renderer_materials");
        self.state
            .borrow()
            .scene
            .get(entity)
            .map(|record| record.materials.iter().map(|slot| slot.material).collect())
            .unwrap_or_default()
    }

    fn mesh_renderer_set_materials(&self, entity: EntityId, materials: &[AssetHandle]) {
        self.record("mesh_renderer_set_materials");
        let mut state = self.state.borrow_mut();
        if let Some(bad) = materials.iter().find(|m| state.assets.material(**m).is_none()) {
            tracing::warn!("set_materials on {} ignored: {} is not a material", entity, bad);
            return;
        }
        let HostState { scene, heap, .. } = &mut *state;
        let Some(record) = scene
            .get_mut(entity)
            .filter(|record| record.has(ComponentKind::MeshRenderer))
        else {
            return;
        };

        // slots past the new length lose their blocks
        for slot in record.materials.iter().skip(materials.len()) {
            heap.free_block(slot.block);
        }
        record.materials.truncate(materials.len());
        for (index, material) in materials.iter().enumerate() {
            match record.materials.get_mut(index) {
                Some(slot) => {
                    slot.material = *material;
                    if let Some(block) = heap.block_mut(slot.block) {
                        block.material = *material;
                    }
                }
                None => record.materials.push(crate::scene::MaterialSlot::new(*material)),
            }
        }
    }

    fn mesh_renderer_enable_uniform_block(&self, entity: EntityId, index: u32) {
        self.record("mesh_renderer_enable_uniform_block");
        let mut state = self.state.borrow_mut();
        let HostState { scene, heap, .. } = &mut *state;
        let Some(record) = scene.get_mut(entity) else {
            return;
        };
        let Some(slot) = record.slot_index(index).map(|i| &mut record.materials[i]) else {
            tracing::warn!("enable_uniform_block on {} ignored: no slot {}", entity, index);
            return;
        };
        if slot.block.is_null() {
            slot.block = heap.alloc_block(slot.material);
        }
    }

    fn mesh_renderer_disable_uniform_block(&self, entity: EntityId, index: u32) {
        self.record("mesh_renderer_disable_uniform_block");
        let mut state = self.state.borrow_mut();
        let HostState { scene, heap, .. } = &mut *state;
        let Some(record) = scene.get_mut(entity) else {
            return;
        };
        if let Some(slot) = record.slot_index(index).map(|i| &mut record.materials[i]) {
            heap.free_block(slot.block);
            slot.block = NativePtr::NULL;
        }
    }

    fn mesh_renderer_enable_all_uniform_blocks(&self, entity: EntityId) {
        self.record("mesh_renderer_enable_all_uniform_blocks");
        let mut state = self.state.borrow_mut();
        let HostState { scene, heap, .. } = &mut *state;
        if let Some(record) = scene.get_mut(entity) {
            for slot in record.materials.iter_mut().filter(|slot| slot.block.is_null()) {
                slot.block = heap.alloc_block(slot.material);
            }
        }
    }

    fn mesh_renderer_disable_all_uniform_blocks(&self, entity: EntityId) {
        self.record("mesh_renderer_disable_all_uniform_blocks");
        let mut state = self.state.borrow_mut();
        let HostState { scene, heap, .. } = &mut *state;
        if let Some(record) = scene.get_mut(entity) {
            for slot in record.materials.iter_mut() {
                heap.free_block(slot.block);
                slot.block = NativePtr::NULL;
            }
        }
    }

    fn mesh_renderer_uniform_block(&self, entity: EntityId, index: u32) -> NativePtr {
        self.record("mesh_renderer_uniform_block");
        let state = self.state.borrow();
        state
            .scene
            .get(entity)
            .filter(|record| record.has(ComponentKind::MeshRenderer))
            .and_then(|record| record.slot_index(index).map(|i| record.materials[i].block))
            .unwrap_or(NativePtr::NULL)
    }

    // ------------------------------------------------------------------
    // Uniform blocks
    // ------------------------------------------------------------------

    fn uniform_block_set(&self, block: NativePtr, name: &str, kind_code: u32, payload: &[u8]) {
        self.record("uniform_block_set");
        let mut state = self.state.borrow_mut();
        let Some(target) = state.heap.block_mut(block) else {
            tracing::warn!("uniform {} ignored: {} is not a uniform block", name, block);
            return;
        };
        if !store_uniform(&mut target.uniforms, name, kind_code, payload) {
            tracing::warn!("uniform {} ignored: kind {} with {} bytes", name, kind_code, payload.len());
        }
    }

    fn uniform_block_override(&self, block: NativePtr, value: MaterialOverride) {
        self.record("uniform_block_override");
        match self.state.borrow_mut().heap.block_mut(block) {
            Some(target) => target.push_override(value),
            None => tracing::warn!("override ignored: {} is not a uniform block", block),
        }
    }

    // ------------------------------------------------------------------
    // Compute buffers
    // ------------------------------------------------------------------

    fn compute_buffer_create(&self, count: usize, element_size: usize) -> NativePtr {
        self.record("compute_buffer_create");
        let ptr = self.state.borrow_mut().heap.alloc_buffer(count, element_size);
        if ptr.is_null() {
            tracing::warn!("compute buffer of {} x {} bytes refused", count, element_size);
        } else {
            tracing::debug!("Compute buffer {} ({} x {} bytes)", ptr, count, element_size);
        }
        ptr
    }

    fn compute_buffer_set_data(
        &self,
        buffer: NativePtr,
        data: &[u8],
        count: usize,
        element_size: usize,
    ) {
        self.record("compute_buffer_set_data");
        let mut state = self.state.borrow_mut();
        match state.heap.buffer_mut(buffer) {
            Some(block)
                if block.count == count
                    && block.element_size == element_size
                    && block.bytes.len() == data.len() =>
            {
                block.bytes.copy_from_slice(data);
            }
            Some(_) => tracing::warn!("set_data on {} ignored: shape mismatch", buffer),
            None => tracing::warn!("set_data ignored: {} is not a live buffer", buffer),
        }
    }

    fn compute_buffer_get_data(
        &self,
        buffer: NativePtr,
        out: &mut [u8],
        count: usize,
        element_size: usize,
    ) {
        self.record("compute_buffer_get_data");
        let state = self.state.borrow();
        match state.heap.buffer(buffer) {
            Some(block)
                if block.count == count
                    && block.element_size == element_size
                    && block.bytes.len() == out.len() =>
            {
                out.copy_from_slice(&block.bytes);
            }
            Some(_) => tracing::warn!("get_data on {} ignored: shape mismatch", buffer),
            None => tracing::warn!("get_data ignored: {} is not a live buffer", buffer),
        }
    }

    fn compute_buffer_release(&self, buffer: NativePtr) {
        self.record("compute_buffer_release");
        if !self.state.borrow_mut().heap.free_buffer(buffer) {
            tracing::warn!("release ignored: {} is not a live buffer", buffer);
        }
    }

    // ------------------------------------------------------------------
    // Compute shaders
    // ------------------------------------------------------------------

    fn compute_shader_set_buffer(&self, shader: AssetHandle, buffer: NativePtr, binding: u32) {
        self.record("compute_shader_set_buffer");
        let mut state = self.state.borrow_mut();
        if state.heap.buffer(buffer).is_none() {
            tracing::warn!("set_buffer ignored: {} is not a live buffer", buffer);
            return;
        }
        match state.assets.compute_shader_mut(shader) {
            Some(target) => {
                target.buffers.insert(binding, buffer);
            }
            None => tracing::warn!("set_buffer ignored: {} is not a compute shader", shader),
        }
    }

    fn compute_shader_dispatch(&self, shader: AssetHandle, x: u32, y: u32, z: u32) {
        self.record("compute_shader_dispatch");
        match self.state.borrow_mut().assets.compute_shader_mut(shader) {
            Some(target) => {
                target.dispatches.push([x, y, z]);
                tracing::debug!("Dispatched {} ({}, {}, {})", target.name, x, y, z);
            }
            None => tracing::warn!("dispatch ignored: {} is not a compute shader", shader),
        }
    }

    fn compute_shader_set_uniform(
        &self,
        shader: AssetHandle,
        name: &str,
        kind_code: u32,
        payload: &[u8],
    ) {
        self.record("compute_shader_set_uniform");
        let mut state = self.state.borrow_mut();
        let Some(target) = state.assets.compute_shader_mut(shader) else {
            tracing::warn!("uniform {} ignored: {} is not a compute shader", name, shader);
            return;
        };
        if !store_uniform(&mut target.uniforms, name, kind_code, payload) {
            tracing::warn!("uniform {} ignored: kind {} with {} bytes", name, kind_code, payload.len());
        }
    }

    // ------------------------------------------------------------------
    // Textures
    // ------------------------------------------------------------------

    fn texture_create(&self, width: u32, height: u32, format: TextureFormat) -> AssetHandle {
        self.record("texture_create");
        if width == 0 || height == 0 {
            return AssetHandle::NULL;
        }
        self.state
            .borrow_mut()
            .assets
            .insert(Asset::Texture(TextureState::new(width, height, format)))
    }

    fn texture_create_with_data(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        internal_format: TextureFormat,
        data_format: TextureFormat,
    ) -> AssetHandle {
        self.record("texture_create_with_data");
        if width == 0 || height == 0 {
            return AssetHandle::NULL;
        }
        let mut texture = TextureState::new(width, height, internal_format);
        if !texture.set_pixel_data(data, data_format) {
            tracing::warn!("texture data does not cover {}x{}", width, height);
            return AssetHandle::NULL;
        }
        texture.submit();
        self.state.borrow_mut().assets.insert(Asset::Texture(texture))
    }

    fn texture_set_pixel(&self, texture: AssetHandle, colour: Vec4, coord: IVec2) {
        self.record("texture_set_pixel");
        match self.state.borrow_mut().assets.texture_mut(texture) {
            Some(target) => {
                if !target.set_pixel(colour, coord) {
                    tracing::warn!("pixel {} outside {}", coord, texture);
                }
            }
            None => tracing::warn!("set_pixel ignored: {} is not a texture", texture),
        }
    }

    fn texture_set_pixel_data(&self, texture: AssetHandle, data: &[u8], format: TextureFormat) {
        self.record("texture_set_pixel_data");
        match self.state.borrow_mut().assets.texture_mut(texture) {
            Some(target) => {
                if !target.set_pixel_data(data, format) {
                    tracing::warn!("pixel data does not cover {}", texture);
                }
            }
            None => tracing::warn!("set_pixel_data ignored: {} is not a texture", texture),
        }
    }

    fn texture_submit(&self, texture: AssetHandle) {
        self.record("texture_submit");
        if let Some(target) = self.state.borrow_mut().assets.texture_mut(texture) {
            target.submit();
        }
    }

    fn texture_destroy(&self, texture: AssetHandle) {
        self.record("texture_destroy");
        let mut state = self.state.borrow_mut();
        if state.assets.texture(texture).is_some() {
            state.assets.remove(texture);
        } else {
            tracing::warn!("destroy ignored: {} is not a texture", texture);
        }
    }

    // ------------------------------------------------------------------
    // Meshes
    // ------------------------------------------------------------------

    fn mesh_create(&self) -> AssetHandle {
        self.record("mesh_create");
        self.state
            .borrow_mut()
            .assets
            .insert(Asset::Mesh(MeshState::default()))
    }

    fn mesh_destroy(&self, mesh: AssetHandle) {
        self.record("mesh_destroy");
        let mut state = self.state.borrow_mut();
        if state.assets.mesh(mesh).is_some() {
            state.assets.remove(mesh);
        } else {
            tracing::warn!("destroy ignored: {} is not a mesh", mesh);
        }
    }

    fn mesh_attribute(&self, mesh: AssetHandle, attribute: MeshAttribute) -> Vec<f32> {
        self.record("mesh_attribute");
        self.state
            .borrow()
            .assets
            .mesh(mesh)
            .map(|m| m.cpu.attribute(attribute).to_vec())
            .unwrap_or_default()
    }

    fn mesh_set_attribute(&self, mesh: AssetHandle, attribute: MeshAttribute, data: &[f32]) {
        self.record("mesh_set_attribute");
        match self.state.borrow_mut().assets.mesh_mut(mesh) {
            Some(target) => {
                target.cpu.attributes.insert(attribute, data.to_vec());
            }
            None => tracing::warn!("set {:?} ignored: {} is not a mesh", attribute, mesh),
        }
    }

    fn mesh_triangles(&self, mesh: AssetHandle) -> Vec<u32> {
        self.record("mesh_triangles");
        self.state
            .borrow()
            .assets
            .mesh(mesh)
            .map(|m| m.cpu.triangles.clone())
            .unwrap_or_default()
    }

    fn mesh_set_triangles(&self, mesh: AssetHandle, indices: &[u32]) {
        self.record("mesh_set_triangles");
        match self.state.borrow_mut().assets.mesh_mut(mesh) {
            Some(target) => target.cpu.triangles = indices.to_vec(),
            None => tracing::warn!("set triangles ignored: {} is not a mesh", mesh),
        }
    }

    fn mesh_recalculate_normals(&self, mesh: AssetHandle) {
        self.record("mesh_recalculate_normals");
        if let Some(target) = self.state.borrow_mut().assets.mesh_mut(mesh) {
            target.cpu.recalculate_normals();
        }
    }

    fn mesh_submit(&self, mesh: AssetHandle, clear_cpu: bool) {
        self.record("mesh_submit");
        if let Some(target) = self.state.borrow_mut().assets.mesh_mut(mesh) {
            target.submit(clear_cpu);
        }
    }

    fn mesh_copy_to_cpu(&self, mesh: AssetHandle) {
        self.record("mesh_copy_to_cpu");
        if let Some(target) = self.state.borrow_mut().assets.mesh_mut(mesh) {
            target.copy_to_cpu();
        }
    }

    fn mesh_clear_cpu(&self, mesh: AssetHandle) {
        self.record("mesh_clear_cpu");
        if let Some(target) = self.state.borrow_mut().assets.mesh_mut(mesh) {
            target.cpu = MeshBuffers::default();
        }
    }

    // ------------------------------------------------------------------
    // Materials
    // ------------------------------------------------------------------

    fn material_create(&self, name: &str) -> AssetHandle {
        self.record("material_create");
        self.state.borrow_mut().assets.insert(Asset::Material(MaterialState {
            name: name.to_owned(),
            shader: AssetHandle::NULL,
        }))
    }

    fn material_set_shader(&self, material: AssetHandle, shader: AssetHandle) {
        self.record("material_set_shader");
        match self.state.borrow_mut().assets.material_mut(material) {
            Some(target) => target.shader = shader,
            None => tracing::warn!("set_shader ignored: {} is not a material", material),
        }
    }

    fn material_destroy(&self, material: AssetHandle) {
        self.record("material_destroy");
        let mut state = self.state.borrow_mut();
        if material == state.default_material {
            tracing::warn!("destroy ignored: {} is the default material", material);
            return;
        }
        if state.assets.material(material).is_some() {
            state.assets.remove(material);
        } else {
            tracing::warn!("destroy ignored: {} is not a material", material);
        }
    }

    // ------------------------------------------------------------------
    // Input, time, log
    // ------------------------------------------------------------------

    fn input_key(&self, key: KeyCode, query: ButtonQuery) -> bool {
        self.record("input_key");
        self.state.borrow().input.key(key, query)
    }

    fn input_mouse_button(&self, button: MouseButton, query: ButtonQuery) -> bool {
        self.record("input_mouse_button");
        self.state.borrow().input.mouse_button(button, query)
    }

    fn input_mouse_position(&self) -> Vec2 {
        self.record("input_mouse_position");
        self.state.borrow().input.mouse_position()
    }

    fn time_delta(&self) -> f32 {
        self.record("time_delta");
        self.state.borrow().delta_time
    }

    fn time_current(&self) -> f32 {
        self.record("time_current");
        self.state.borrow().current_time
    }

    fn log(&self, severity: Severity, message: &str) {
        self.record("log");
        if self.config.echo_logs {
            match severity {
                Severity::Info => tracing::info!(target: "script", "{}", message),
                Severity::Warning => tracing::warn!(target: "script", "{}", message),
                Severity::Error | Severity::Critical => {
                    tracing::error!(target: "script", "[{:?}] {}", severity, message)
                }
            }
        }
        self.state.borrow_mut().logs.push(LogEntry {
            severity,
            message: message.to_owned(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conduit_core::Marshal;

    fn engine() -> HostEngine {
        HostEngine::new(HostConfig {
            echo_logs: false,
            ..HostConfig::default()
        })
    }

    #[test]
    fn add_seeds_native_defaults() {
        let host = engine();
        let id = host.spawn("light");
        host.component_add(id, ComponentKind::PointLight.token());

        let mut radius = [0u8; 4];
        host.field_get(id, FieldId::PointLightRadius, &mut radius);
        assert_eq!(f32::read_bytes(&radius), 10.0);
        assert!(host.component_has(id, ComponentKind::PointLight.token()));
    }

    #[test]
    fn removing_a_renderer_frees_its_blocks() {
        let host = engine();
        let id = host.spawn("cube");
        host.component_add(id, ComponentKind::MeshRenderer.token());
        host.mesh_renderer_enable_all_uniform_blocks(id);
        assert_eq!(host.live_uniform_blocks(), 1);

        host.component_remove(id, ComponentKind::MeshRenderer.token());
        assert_eq!(host.live_uniform_blocks(), 0);
        assert!(host.mesh_renderer_uniform_block(id, u32::MAX).is_null());
    }

    #[test]
    fn set_parent_rejects_cycles() {
        let host = engine();
        let a = host.spawn("a");
        let b = host.spawn("b");
        host.entity_set_parent(b, a);
        host.entity_set_parent(a, b);
        assert_eq!(host.entity_parent(b), a);
        assert_eq!(host.entity_parent(a), EntityId::NULL);

        host.entity_set_parent(b, EntityId::NULL);
        assert_eq!(host.entity_parent(b), EntityId::NULL);
    }

    #[test]
    fn instantiate_copies_the_template() {
        let host = engine();
        let transform = TransformData::from_position(Vec3::new(1.0, 2.0, 3.0));
        let prefab = host.register_prefab(
            "crate",
            &[ComponentKind::Transform, ComponentKind::Rigidbody, ComponentKind::Rigidbody],
            transform,
        );

        let id = host.entity_instantiate(prefab.handle());
        assert!(!id.is_null());
        assert_eq!(host.tag_get(id), "crate");
        assert_eq!(host.transform_get(id), transform);
        let components = host.components(id);
        assert!(components.contains(&ComponentKind::Rigidbody));
        assert_eq!(
            components.iter().filter(|kind| **kind == ComponentKind::Rigidbody).count(),
            1
        );

        assert!(host.entity_instantiate(AssetHandle::new(999)).is_null());
    }

    #[test]
    fn uniform_payloads_are_checked_against_their_kind() {
        let host = engine();
        let id = host.spawn("cube");
        host.component_add(id, ComponentKind::MeshRenderer.token());
        host.mesh_renderer_enable_uniform_block(id, u32::MAX);
        let block = host.mesh_renderer_uniform_block(id, u32::MAX);

        host.uniform_block_set(block, "u_tint", UniformKind::Vec3.code(), &[0; 8]);
        assert!(host.uniform_value(block, "u_tint").is_none());

        let tint = Vec3::new(0.1, 0.2, 0.3);
        host.uniform_block_set(block, "u_tint", UniformKind::Vec3.code(), &tint.to_bytes());
        let stored = host.uniform_value(block, "u_tint").unwrap();
        assert_eq!(stored.decode::<Vec3>(), Some(tint));
    }

    #[test]
    fn buffer_shape_must_match() {
        let host = engine();
        let buffer = host.compute_buffer_create(2, 4);
        host.compute_buffer_set_data(buffer, &[1, 0, 0, 0, 2, 0, 0, 0], 2, 4);
        host.compute_buffer_set_data(buffer, &[9; 12], 3, 4);

        let mut out = [0u8; 8];
        host.compute_buffer_get_data(buffer, &mut out, 2, 4);
        assert_eq!(out, [1, 0, 0, 0, 2, 0, 0, 0]);

        host.compute_buffer_release(buffer);
        assert_eq!(host.live_buffers(), 0);
    }

    #[test]
    fn copy_mesh_leaves_the_filter_alone() {
        let host = engine();
        let shared = host.register_mesh(&[Vec3::ZERO, Vec3::X, Vec3::Y], &[0, 1, 2]);
        let id = host.spawn("m");
        host.component_add(id, ComponentKind::MeshFilter.token());
        host.mesh_filter_set_mesh(id, shared);

        let copy = host.mesh_filter_copy_mesh(id);
        assert_ne!(copy, shared);
        assert_eq!(host.mesh_filter_shared_mesh(id), shared);
        assert_eq!(host.mesh_triangles(copy), vec![0, 1, 2]);
    }

    #[test]
    fn last_material_is_the_primary_one() {
        let host = engine();
        let id = host.spawn("m");
        host.component_add(id, ComponentKind::MeshRenderer.token());
        assert_eq!(host.mesh_renderer_material(id), host.default_material());

        let a = host.material_create("a");
        let b = host.material_create("b");
        host.mesh_renderer_set_materials(id, &[a, b]);
        assert_eq!(host.mesh_renderer_material(id), b);
        assert_eq!(host.mesh_renderer_materials(id), vec![a, b]);
    }

    #[test]
    fn logs_are_kept_in_order() {
        let host = engine();
        host.log(Severity::Info, "one");
        host.log(Severity::Critical, "two");
        let logs = host.logs();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[1].severity, Severity::Critical);
        assert_eq!(logs[1].message, "two");
    }

    #[test]
    #[cfg(feature = "metrics")]
    fn calls_are_counted_per_entry_point() {
        assert!(conduit_metrics::ENABLED);
        let host = engine();
        let id = host.spawn("e");
        host.transform_get(id);
        host.transform_get(id);
        host.time_delta();
        assert_eq!(host.call_count("transform_get"), 2);
        assert_eq!(host.total_calls(), 3);

        host.reset_calls();
        assert_eq!(host.total_calls(), 0);
    }
}
