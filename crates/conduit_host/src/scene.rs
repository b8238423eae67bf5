//! Entities and their components
//!
//! Component fields are stored as raw byte blocks keyed by `FieldId`, the
//! same encoding they cross the boundary in.

use conduit_core::types::{ForceMode, PhysicsMaterial, ShadowType};
use conduit_core::{
    AssetHandle, ComponentKind, EntityId, FieldId, Marshal, NativePtr, TransformData,
};
use glam::{BVec3, Vec3, Vec4};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Native default for a freshly added component field.
pub fn default_field(field: FieldId) -> Vec<u8> {
    use FieldId::*;
    match field {
        PointLightActive | SpotLightActive | DirectionalLightActive => true.to_bytes(),
        PointLightColour | SpotLightColour | DirectionalLightColour => Vec4::ONE.to_bytes(),
        PointLightRadius => 10.0f32.to_bytes(),
        SpotLightRange => 10.0f32.to_bytes(),
        SpotLightAngle => 45.0f32.to_bytes(),
        PointLightIntensity | SpotLightIntensity | DirectionalLightIntensity => 1.0f32.to_bytes(),
        PointLightShadowType | SpotLightShadowType | DirectionalLightShadowType => {
            ShadowType::HardShadows.to_bytes()
        }
        RigidbodyMass => 1.0f32.to_bytes(),
        RigidbodyDrag => 0.0f32.to_bytes(),
        RigidbodyAngularDrag => 0.05f32.to_bytes(),
        RigidbodyAutomaticCentreOfMass | RigidbodyUseGravity => true.to_bytes(),
        RigidbodyIsKinematic | BoxColliderIsTrigger | SphereColliderIsTrigger => {
            false.to_bytes()
        }
        RigidbodyPositionConstraints | RigidbodyRotationConstraints => BVec3::FALSE.to_bytes(),
        BoxColliderCentre | SphereColliderCentre => Vec3::ZERO.to_bytes(),
        BoxColliderSize => Vec3::ONE.to_bytes(),
        SphereColliderRadius => 0.5f32.to_bytes(),
        BoxColliderMaterial | SphereColliderMaterial => PhysicsMaterial::default().to_bytes(),
    }
}

/// A force or torque a script asked the physics system to apply.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum AppliedForce {
    Force { value: Vec3, mode: ForceMode },
    Torque { value: Vec3 },
}

/// One material slot of a mesh renderer and its optional uniform block.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MaterialSlot {
    pub material: AssetHandle,
    pub block: NativePtr,
}

impl MaterialSlot {
    pub fn new(material: AssetHandle) -> Self {
        Self {
            material,
            block: NativePtr::NULL,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EntityRecord {
    pub tag: String,
    pub parent: EntityId,
    pub transform: TransformData,
    pub components: BTreeSet<ComponentKind>,
    pub fields: HashMap<FieldId, Vec<u8>>,
    pub script_name: String,
    pub mesh: AssetHandle,
    pub materials: Vec<MaterialSlot>,
    pub forces: Vec<AppliedForce>,
}

impl EntityRecord {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_owned(),
            parent: EntityId::NULL,
            transform: TransformData::IDENTITY,
            components: [ComponentKind::Transform, ComponentKind::Tag].into(),
            fields: HashMap::new(),
            script_name: String::new(),
            mesh: AssetHandle::NULL,
            materials: Vec::new(),
            forces: Vec::new(),
        }
    }

    pub fn has(&self, kind: ComponentKind) -> bool {
        self.components.contains(&kind)
    }

    /// Resolve the boundary's "last slot" index convention.
    pub fn slot_index(&self, index: u32) -> Option<usize> {
        let index = if index == u32::MAX {
            self.materials.len().checked_sub(1)?
        } else {
            index as usize
        };
        (index < self.materials.len()).then_some(index)
    }

    /// Every uniform block owned by this entity.
    pub fn blocks(&self) -> impl Iterator<Item = NativePtr> + '_ {
        self.materials
            .iter()
            .map(|slot| slot.block)
            .filter(|block| !block.is_null())
    }
}

/// Why a structural change did not happen.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Refusal {
    MissingEntity,
    AlreadyPresent,
    Absent,
    Intrinsic,
}

pub struct Scene {
    entities: BTreeMap<EntityId, EntityRecord>,
    next_id: u32,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            entities: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Spawn with the next free id.
    pub fn spawn(&mut self, tag: &str) -> EntityId {
        loop {
            let id = EntityId::new(self.next_id);
            self.next_id = self.next_id.wrapping_add(1);
            if !id.is_null() && !self.entities.contains_key(&id) {
                self.entities.insert(id, EntityRecord::new(tag));
                return id;
            }
        }
    }

    /// Spawn with a caller-chosen id. Returns false for sentinels and ids
    /// already in use.
    pub fn spawn_with_id(&mut self, id: EntityId, tag: &str) -> bool {
        if id.is_null() || self.entities.contains_key(&id) {
            return false;
        }
        self.entities.insert(id, EntityRecord::new(tag));
        true
    }

    /// Remove an entity and orphan its children.
    pub fn despawn(&mut self, id: EntityId) -> Option<EntityRecord> {
        let record = self.entities.remove(&id)?;
        for child in self.entities.values_mut() {
            if child.parent == id {
                child.parent = EntityId::NULL;
            }
        }
        Some(record)
    }

    pub fn get(&self, id: EntityId) -> Option<&EntityRecord> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut EntityRecord> {
        self.entities.get_mut(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    /// Attach a default-initialised component. A mesh renderer starts with
    /// one slot holding `default_material`.
    pub fn add_component(
        &mut self,
        id: EntityId,
        kind: ComponentKind,
        default_material: AssetHandle,
    ) -> Result<(), Refusal> {
        let record = self.entities.get_mut(&id).ok_or(Refusal::MissingEntity)?;
        if !record.components.insert(kind) {
            return Err(Refusal::AlreadyPresent);
        }

        for field in FieldId::of_component(kind) {
            record.fields.insert(field, default_field(field));
        }
        match kind {
            ComponentKind::MeshRenderer => {
                record.materials = vec![MaterialSlot::new(default_material)];
            }
            ComponentKind::MeshFilter => record.mesh = AssetHandle::NULL,
            ComponentKind::Script => record.script_name.clear(),
            _ => {}
        }
        Ok(())
    }

    /// Detach a component and drop its state. Returns the uniform blocks the
    /// caller must free.
    pub fn remove_component(
        &mut self,
        id: EntityId,
        kind: ComponentKind,
    ) -> Result<Vec<NativePtr>, Refusal> {
        let record = self.entities.get_mut(&id).ok_or(Refusal::MissingEntity)?;
        if kind.is_intrinsic() {
            return Err(Refusal::Intrinsic);
        }
        if !record.components.remove(&kind) {
            return Err(Refusal::Absent);
        }

        for field in FieldId::of_component(kind) {
            record.fields.remove(&field);
        }
        let freed = match kind {
            ComponentKind::MeshRenderer => {
                let blocks = record.blocks().collect();
                record.materials.clear();
                blocks
            }
            ComponentKind::MeshFilter => {
                record.mesh = AssetHandle::NULL;
                Vec::new()
            }
            ComponentKind::Rigidbody => {
                record.forces.clear();
                Vec::new()
            }
            _ => Vec::new(),
        };
        Ok(freed)
    }

    /// Whether `ancestor` appears on the parent chain of `id` (or is `id`).
    pub fn is_ancestor(&self, ancestor: EntityId, id: EntityId) -> bool {
        let mut current = id;
        for _ in 0..=self.entities.len() {
            if current == ancestor {
                return true;
            }
            match self.entities.get(&current) {
                Some(record) if !record.parent.is_null() => current = record.parent,
                _ => return false,
            }
        }
        false
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
