//! Typed component proxies
//!
//! A `ComponentProxy<C>` is (entity id, component kind) and nothing else. It
//! owns no native state and can be rebuilt at any time. Once its component is
//! removed the proxy dangles: calls still go through, and what the native side
//! does with them is its own business.

use crate::context::ScriptContext;
use crate::material::{Material, MaterialUniformBlock};
use crate::mesh::Mesh;
use crate::transform::Transform;
use conduit_core::component::{
    fields, BoxCollider, DirectionalLight, MeshFilter, MeshRenderer, PointLight, Rigidbody,
    ScriptComponent, SphereCollider, SpotLight, TagComponent, TransformComponent,
};
use conduit_core::types::{ForceMode, PhysicsMaterial, ShadowType};
use conduit_core::{Component, EntityId, Field, Marshal, Result};
use glam::{BVec3, Vec3, Vec4};
use std::marker::PhantomData;

/// Which material slot of a mesh renderer to address.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum MaterialSlot {
    Index(u32),
    /// The last slot, which is also the renderer's primary material.
    #[default]
    Last,
}

impl MaterialSlot {
    pub const fn raw(self) -> u32 {
        match self {
            MaterialSlot::Index(index) => index,
            MaterialSlot::Last => u32::MAX,
        }
    }
}

pub struct ComponentProxy<C: Component> {
    ctx: ScriptContext,
    entity: EntityId,
    _marker: PhantomData<C>,
}

impl<C: Component> ComponentProxy<C> {
    pub(crate) fn new(ctx: ScriptContext, entity: EntityId) -> Self {
        Self {
            ctx,
            entity,
            _marker: PhantomData,
        }
    }

    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub fn get_field<T: Marshal>(&self, field: Field<C, T>) -> T {
        let mut bytes = vec![0u8; T::SIZE];
        self.ctx.api().field_get(self.entity, field.id(), &mut bytes);
        T::read_bytes(&bytes)
    }

    pub fn set_field<T: Marshal>(&self, field: Field<C, T>, value: T) {
        self.ctx
            .api()
            .field_set(self.entity, field.id(), &value.to_bytes());
    }
}

impl<C: Component> Clone for ComponentProxy<C> {
    fn clone(&self) -> Self {
        Self::new(self.ctx.clone(), self.entity)
    }
}

impl<C: Component> std::fmt::Debug for ComponentProxy<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentProxy")
            .field("kind", &C::KIND)
            .field("entity", &self.entity)
            .finish()
    }
}

/// Named getter/setter pairs over typed field descriptors.
macro_rules! field_accessors {
    ($component:ty { $($get:ident, $set:ident => $field:ident: $ty:ty),+ $(,)? }) => {
        impl ComponentProxy<$component> {
            $(
                pub fn $get(&self) -> $ty {
                    self.get_field(fields::$field)
                }

                pub fn $set(&self, value: $ty) {
                    self.set_field(fields::$field, value)
                }
            )+
        }
    };
}

field_accessors!(PointLight {
    active, set_active => POINT_LIGHT_ACTIVE: bool,
    colour, set_colour => POINT_LIGHT_COLOUR: Vec4,
    radius, set_radius => POINT_LIGHT_RADIUS: f32,
    intensity, set_intensity => POINT_LIGHT_INTENSITY: f32,
    shadow_type, set_shadow_type => POINT_LIGHT_SHADOW_TYPE: ShadowType,
});

field_accessors!(SpotLight {
    active, set_active => SPOT_LIGHT_ACTIVE: bool,
    colour, set_colour => SPOT_LIGHT_COLOUR: Vec4,
    range, set_range => SPOT_LIGHT_RANGE: f32,
    angle, set_angle => SPOT_LIGHT_ANGLE: f32,
    intensity, set_intensity => SPOT_LIGHT_INTENSITY: f32,
    shadow_type, set_shadow_type => SPOT_LIGHT_SHADOW_TYPE: ShadowType,
});

field_accessors!(DirectionalLight {
    active, set_active => DIRECTIONAL_LIGHT_ACTIVE: bool,
    colour, set_colour => DIRECTIONAL_LIGHT_COLOUR: Vec4,
    intensity, set_intensity => DIRECTIONAL_LIGHT_INTENSITY: f32,
    shadow_type, set_shadow_type => DIRECTIONAL_LIGHT_SHADOW_TYPE: ShadowType,
});

field_accessors!(Rigidbody {
    mass, set_mass => RIGIDBODY_MASS: f32,
    drag, set_drag => RIGIDBODY_DRAG: f32,
    angular_drag, set_angular_drag => RIGIDBODY_ANGULAR_DRAG: f32,
    automatic_centre_of_mass, set_automatic_centre_of_mass => RIGIDBODY_AUTOMATIC_CENTRE_OF_MASS: bool,
    use_gravity, set_use_gravity => RIGIDBODY_USE_GRAVITY: bool,
    is_kinematic, set_is_kinematic => RIGIDBODY_IS_KINEMATIC: bool,
    position_constraints, set_position_constraints => RIGIDBODY_POSITION_CONSTRAINTS: BVec3,
    rotation_constraints, set_rotation_constraints => RIGIDBODY_ROTATION_CONSTRAINTS: BVec3,
});

field_accessors!(BoxCollider {
    is_trigger, set_is_trigger => BOX_COLLIDER_IS_TRIGGER: bool,
    centre, set_centre => BOX_COLLIDER_CENTRE: Vec3,
    size, set_size => BOX_COLLIDER_SIZE: Vec3,
    material, set_material => BOX_COLLIDER_MATERIAL: PhysicsMaterial,
});

field_accessors!(SphereCollider {
    is_trigger, set_is_trigger => SPHERE_COLLIDER_IS_TRIGGER: bool,
    centre, set_centre => SPHERE_COLLIDER_CENTRE: Vec3,
    radius, set_radius => SPHERE_COLLIDER_RADIUS: f32,
    material, set_material => SPHERE_COLLIDER_MATERIAL: PhysicsMaterial,
});

impl ComponentProxy<TransformComponent> {
    pub fn transform(&self) -> Transform {
        Transform::new(self.ctx.clone(), self.entity)
    }
}

impl ComponentProxy<TagComponent> {
    pub fn tag(&self) -> String {
        self.ctx.api().tag_get(self.entity)
    }

    pub fn set_tag(&self, tag: &str) {
        self.ctx.api().tag_set(self.entity, tag);
    }
}

impl ComponentProxy<ScriptComponent> {
    pub fn script_name(&self) -> String {
        self.ctx.api().script_name_get(self.entity)
    }

    pub fn set_script_name(&self, name: &str) {
        self.ctx.api().script_name_set(self.entity, name);
    }
}

impl ComponentProxy<Rigidbody> {
    pub fn apply_force(&self, force: Vec3, mode: ForceMode) {
        self.ctx.api().rigidbody_apply_force(self.entity, force, mode);
    }

    pub fn apply_torque(&self, torque: Vec3) {
        self.ctx.api().rigidbody_apply_torque(self.entity, torque);
    }
}

impl ComponentProxy<MeshFilter> {
    /// A fresh copy of the filter's mesh, owned by the caller. The filter
    /// keeps its shared mesh.
    pub fn mesh(&self) -> Result<Mesh> {
        let handle = self.ctx.api().mesh_filter_copy_mesh(self.entity);
        Mesh::owned(&self.ctx, handle)
    }

    /// The mesh the filter renders, borrowed from the asset table.
    pub fn shared_mesh(&self) -> Option<Mesh> {
        let handle = self.ctx.api().mesh_filter_shared_mesh(self.entity);
        (!handle.is_null()).then(|| Mesh::borrowed(&self.ctx, handle))
    }

    pub fn set_mesh(&self, mesh: &Mesh) -> Result<()> {
        let handle = mesh.handle()?;
        self.ctx.api().mesh_filter_set_mesh(self.entity, handle);
        Ok(())
    }
}

impl ComponentProxy<MeshRenderer> {
    /// The primary (last) material.
    pub fn material(&self) -> Option<Material> {
        let handle = self.ctx.api().mesh_renderer_material(self.entity);
        (!handle.is_null()).then(|| Material::borrowed(&self.ctx, handle))
    }

    pub fn set_material(&self, material: &Material) -> Result<()> {
        let handle = material.handle()?;
        self.ctx.api().mesh_renderer_set_material(self.entity, handle);
        Ok(())
    }

    pub fn materials(&self) -> Vec<Material> {
        self.ctx
            .api()
            .mesh_renderer_materials(self.entity)
            .into_iter()
            .map(|handle| Material::borrowed(&self.ctx, handle))
            .collect()
    }

    pub fn set_materials(&self, materials: &[&Material]) -> Result<()> {
        let handles = materials
            .iter()
            .map(|material| material.handle())
            .collect::<Result<Vec<_>>>()?;
        self.ctx
            .api()
            .mesh_renderer_set_materials(self.entity, &handles);
        Ok(())
    }

    /// Give `slot` its own uniform block and return it.
    pub fn enable_uniform_block(&self, slot: MaterialSlot) -> Result<MaterialUniformBlock> {
        self.ctx
            .api()
            .mesh_renderer_enable_uniform_block(self.entity, slot.raw());
        let ptr = self
            .ctx
            .api()
            .mesh_renderer_uniform_block(self.entity, slot.raw());
        MaterialUniformBlock::from_ptr(&self.ctx, ptr)
    }

    /// The slot's uniform block, if one is enabled.
    pub fn uniform_block(&self, slot: MaterialSlot) -> Option<MaterialUniformBlock> {
        let ptr = self
            .ctx
            .api()
            .mesh_renderer_uniform_block(self.entity, slot.raw());
        MaterialUniformBlock::from_ptr(&self.ctx, ptr).ok()
    }

    pub fn disable_uniform_block(&self, slot: MaterialSlot) {
        self.ctx
            .api()
            .mesh_renderer_disable_uniform_block(self.entity, slot.raw());
    }

    pub fn enable_all_uniform_blocks(&self) {
        self.ctx
            .api()
            .mesh_renderer_enable_all_uniform_blocks(self.entity);
    }

    pub fn disable_all_uniform_blocks(&self) {
        self.ctx
            .api()
            .mesh_renderer_disable_all_uniform_blocks(self.entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use conduit_host::HostEngine;
    use std::rc::Rc;

    fn setup() -> (Rc<HostEngine>, Entity) {
        let host = Rc::new(HostEngine::default());
        let id = host.spawn("thing");
        let ctx = ScriptContext::new(host.clone());
        (host, ctx.entity(id).unwrap())
    }

    #[test]
    fn field_reads_are_one_exactly_sized_call() {
        let (host, entity) = setup();
        let light = entity.add::<SpotLight>();
        host.reset_calls();

        assert_eq!(light.angle(), 45.0);
        light.set_shadow_type(ShadowType::SoftShadows);
        assert_eq!(light.shadow_type(), ShadowType::SoftShadows);
        assert_eq!(host.call_count("field_get"), 2);
        assert_eq!(host.call_count("field_set"), 1);
    }

    #[test]
    fn collider_material_crosses_as_one_block() {
        let (_host, entity) = setup();
        let collider = entity.add::<BoxCollider>();
        let bouncy = PhysicsMaterial {
            dynamic_friction: 0.1,
            static_friction: 0.2,
            bounciness: 0.95,
        };
        collider.set_material(bouncy);
        assert_eq!(collider.material(), bouncy);
        assert_eq!(collider.size(), Vec3::ONE);
    }

    #[test]
    fn forces_reach_the_rigidbody() {
        let (host, entity) = setup();
        let body = entity.add::<Rigidbody>();
        body.apply_force(Vec3::Y * 10.0, ForceMode::Impulse);
        body.apply_torque(Vec3::X);
        assert_eq!(host.applied_forces(entity.id()).len(), 2);
    }

    #[test]
    fn shared_mesh_is_borrowed_and_mesh_is_a_copy() {
        let (host, entity) = setup();
        let filter = entity.add::<MeshFilter>();
        assert!(filter.shared_mesh().is_none());

        let shared = host.register_mesh(&[Vec3::ZERO, Vec3::X, Vec3::Y], &[0, 1, 2]);
        filter.set_mesh(&Mesh::borrowed(entity.context(), shared)).unwrap();

        let view = filter.shared_mesh().unwrap();
        assert_eq!(view.handle().unwrap(), shared);
        assert_eq!(view.ownership(), conduit_core::Ownership::Borrowed);

        let copy = filter.mesh().unwrap();
        let copy_handle = copy.handle().unwrap();
        assert_ne!(copy_handle, shared);
        assert_eq!(copy.triangles().unwrap(), vec![0, 1, 2]);
        drop(copy);
        drop(view);

        assert!(!host.asset_exists(copy_handle));
        assert!(host.asset_exists(shared));
    }

    #[test]
    fn renderer_starts_with_the_default_material() {
        let (host, entity) = setup();
        let renderer = entity.add::<MeshRenderer>();
        let material = renderer.material().unwrap();
        assert_eq!(material.handle().unwrap(), host.default_material());
        drop(material);
        assert!(host.asset_exists(host.default_material()));
    }

    #[test]
    fn uniform_blocks_follow_the_last_slot() {
        let (host, entity) = setup();
        let renderer = entity.add::<MeshRenderer>();
        assert!(renderer.uniform_block(MaterialSlot::Last).is_none());

        let block = renderer.enable_uniform_block(MaterialSlot::Last).unwrap();
        let again = renderer.uniform_block(MaterialSlot::Index(0)).unwrap();
        assert_eq!(block.ptr(), again.ptr());
        assert_eq!(host.live_uniform_blocks(), 1);

        renderer.disable_all_uniform_blocks();
        assert_eq!(host.live_uniform_blocks(), 0);
        assert!(renderer.enable_uniform_block(MaterialSlot::Index(4)).is_err());
    }

    #[test]
    fn tag_and_script_name() {
        let (_host, entity) = setup();
        let tag = entity.get::<TagComponent>().unwrap();
        assert_eq!(tag.tag(), "thing");
        tag.set_tag("renamed");
        assert_eq!(entity.tag(), "renamed");

        let script = entity.add::<ScriptComponent>();
        script.set_script_name("PlayerController");
        assert_eq!(script.script_name(), "PlayerController");
    }
}
