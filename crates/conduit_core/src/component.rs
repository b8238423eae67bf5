//! Component kinds and their boundary fields
//!
//! Components are identified by a closed `ComponentKind` enum. Each Rust
//! marker type is bound to its kind at compile time through
//! [`Component::KIND`], so no call site ever looks a type up at runtime.

use crate::types::{PhysicsMaterial, ShadowType};
use glam::{BVec3, Vec3, Vec4};
use std::fmt;
use std::marker::PhantomData;

/// Stable numeric token the native side uses for a component kind.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentToken(u32);

impl ComponentToken {
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Every component kind the boundary knows about.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum ComponentKind {
    Transform = 1,
    Tag = 2,
    Script = 3,
    PointLight = 4,
    SpotLight = 5,
    DirectionalLight = 6,
    Rigidbody = 7,
    BoxCollider = 8,
    SphereCollider = 9,
    MeshFilter = 10,
    MeshRenderer = 11,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 11] = [
        ComponentKind::Transform,
        ComponentKind::Tag,
        ComponentKind::Script,
        ComponentKind::PointLight,
        ComponentKind::SpotLight,
        ComponentKind::DirectionalLight,
        ComponentKind::Rigidbody,
        ComponentKind::BoxCollider,
        ComponentKind::SphereCollider,
        ComponentKind::MeshFilter,
        ComponentKind::MeshRenderer,
    ];

    pub const fn token(self) -> ComponentToken {
        ComponentToken(self as u32)
    }

    pub fn from_token(token: ComponentToken) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.token() == token)
    }

    pub const fn name(self) -> &'static str {
        match self {
            ComponentKind::Transform => "Transform",
            ComponentKind::Tag => "Tag",
            ComponentKind::Script => "Script",
            ComponentKind::PointLight => "PointLight",
            ComponentKind::SpotLight => "SpotLight",
            ComponentKind::DirectionalLight => "DirectionalLight",
            ComponentKind::Rigidbody => "Rigidbody",
            ComponentKind::BoxCollider => "BoxCollider",
            ComponentKind::SphereCollider => "SphereCollider",
            ComponentKind::MeshFilter => "MeshFilter",
            ComponentKind::MeshRenderer => "MeshRenderer",
        }
    }

    /// Kinds every entity is created with and cannot lose.
    pub const fn is_intrinsic(self) -> bool {
        matches!(self, ComponentKind::Transform | ComponentKind::Tag)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A Rust marker type standing for one component kind.
pub trait Component: 'static {
    const KIND: ComponentKind;
}

/// Bind marker types to their component kind.
///
/// # Example
/// ```ignore
/// pub struct Rigidbody;
/// define_component!(Rigidbody => Rigidbody);
/// ```
#[macro_export]
macro_rules! define_component {
    ($($ty:ident => $kind:ident),+ $(,)?) => {
        $(
            #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
            pub struct $ty;

            impl $crate::component::Component for $ty {
                const KIND: $crate::component::ComponentKind =
                    $crate::component::ComponentKind::$kind;
            }
        )+
    };
}

define_component!(
    TransformComponent => Transform,
    TagComponent => Tag,
    ScriptComponent => Script,
    PointLight => PointLight,
    SpotLight => SpotLight,
    DirectionalLight => DirectionalLight,
    Rigidbody => Rigidbody,
    BoxCollider => BoxCollider,
    SphereCollider => SphereCollider,
    MeshFilter => MeshFilter,
    MeshRenderer => MeshRenderer,
);

/// Every fixed-size field reachable through a per-component getter/setter
/// pair.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldId {
    PointLightActive,
    PointLightColour,
    PointLightRadius,
    PointLightIntensity,
    PointLightShadowType,

    SpotLightActive,
    SpotLightColour,
    SpotLightRange,
    SpotLightAngle,
    SpotLightIntensity,
    SpotLightShadowType,

    DirectionalLightActive,
    DirectionalLightColour,
    DirectionalLightIntensity,
    DirectionalLightShadowType,

    RigidbodyMass,
    RigidbodyDrag,
    RigidbodyAngularDrag,
    RigidbodyAutomaticCentreOfMass,
    RigidbodyUseGravity,
    RigidbodyIsKinematic,
    RigidbodyPositionConstraints,
    RigidbodyRotationConstraints,

    BoxColliderIsTrigger,
    BoxColliderCentre,
    BoxColliderSize,
    BoxColliderMaterial,

    SphereColliderIsTrigger,
    SphereColliderCentre,
    SphereColliderRadius,
    SphereColliderMaterial,
}

impl FieldId {
    pub const ALL: [FieldId; 31] = {
        use FieldId::*;
        [
            PointLightActive,
            PointLightColour,
            PointLightRadius,
            PointLightIntensity,
            PointLightShadowType,
            SpotLightActive,
            SpotLightColour,
            SpotLightRange,
            SpotLightAngle,
            SpotLightIntensity,
            SpotLightShadowType,
            DirectionalLightActive,
            DirectionalLightColour,
            DirectionalLightIntensity,
            DirectionalLightShadowType,
            RigidbodyMass,
            RigidbodyDrag,
            RigidbodyAngularDrag,
            RigidbodyAutomaticCentreOfMass,
            RigidbodyUseGravity,
            RigidbodyIsKinematic,
            RigidbodyPositionConstraints,
            RigidbodyRotationConstraints,
            BoxColliderIsTrigger,
            BoxColliderCentre,
            BoxColliderSize,
            BoxColliderMaterial,
            SphereColliderIsTrigger,
            SphereColliderCentre,
            SphereColliderRadius,
            SphereColliderMaterial,
        ]
    };

    /// Fields stored on components of `kind`.
    pub fn of_component(kind: ComponentKind) -> impl Iterator<Item = FieldId> {
        Self::ALL
            .into_iter()
            .filter(move |field| field.component() == kind)
    }

    pub const fn component(self) -> ComponentKind {
        use FieldId::*;
        match self {
            PointLightActive | PointLightColour | PointLightRadius | PointLightIntensity
            | PointLightShadowType => ComponentKind::PointLight,
            SpotLightActive | SpotLightColour | SpotLightRange | SpotLightAngle
            | SpotLightIntensity | SpotLightShadowType => ComponentKind::SpotLight,
            DirectionalLightActive
            | DirectionalLightColour
            | DirectionalLightIntensity
            | DirectionalLightShadowType => ComponentKind::DirectionalLight,
            RigidbodyMass
            | RigidbodyDrag
            | RigidbodyAngularDrag
            | RigidbodyAutomaticCentreOfMass
            | RigidbodyUseGravity
            | RigidbodyIsKinematic
            | RigidbodyPositionConstraints
            | RigidbodyRotationConstraints => ComponentKind::Rigidbody,
            BoxColliderIsTrigger | BoxColliderCentre | BoxColliderSize | BoxColliderMaterial => {
                ComponentKind::BoxCollider
            }
            SphereColliderIsTrigger
            | SphereColliderCentre
            | SphereColliderRadius
            | SphereColliderMaterial => ComponentKind::SphereCollider,
        }
    }

    /// Payload size in bytes.
    pub const fn size(self) -> usize {
        use FieldId::*;
        match self {
            PointLightActive
            | SpotLightActive
            | DirectionalLightActive
            | RigidbodyAutomaticCentreOfMass
            | RigidbodyUseGravity
            | RigidbodyIsKinematic
            | BoxColliderIsTrigger
            | SphereColliderIsTrigger => 1,
            PointLightShadowType | SpotLightShadowType | DirectionalLightShadowType => 1,
            RigidbodyPositionConstraints | RigidbodyRotationConstraints => 3,
            PointLightColour | SpotLightColour | DirectionalLightColour => 16,
            BoxColliderCentre | BoxColliderSize | SphereColliderCentre => 12,
            BoxColliderMaterial | SphereColliderMaterial => 12,
            PointLightRadius
            | PointLightIntensity
            | SpotLightRange
            | SpotLightAngle
            | SpotLightIntensity
            | DirectionalLightIntensity
            | RigidbodyMass
            | RigidbodyDrag
            | RigidbodyAngularDrag
            | SphereColliderRadius => 4,
        }
    }
}

/// A typed field descriptor: component `C` exposes a value of type `T`.
pub struct Field<C, T> {
    id: FieldId,
    _marker: PhantomData<fn() -> (C, T)>,
}

impl<C, T> Field<C, T> {
    const fn new(id: FieldId) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    pub const fn id(&self) -> FieldId {
        self.id
    }
}

impl<C, T> Clone for Field<C, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C, T> Copy for Field<C, T> {}

impl<C, T> fmt::Debug for Field<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Field").field(&self.id).finish()
    }
}

pub mod fields {
    //! Descriptors for every per-component field.

    use super::*;

    pub const POINT_LIGHT_ACTIVE: Field<PointLight, bool> = Field::new(FieldId::PointLightActive);
    pub const POINT_LIGHT_COLOUR: Field<PointLight, Vec4> = Field::new(FieldId::PointLightColour);
    pub const POINT_LIGHT_RADIUS: Field<PointLight, f32> = Field::new(FieldId::PointLightRadius);
    pub const POINT_LIGHT_INTENSITY: Field<PointLight, f32> =
        Field::new(FieldId::PointLightIntensity);
    pub const POINT_LIGHT_SHADOW_TYPE: Field<PointLight, ShadowType> =
        Field::new(FieldId::PointLightShadowType);

    pub const SPOT_LIGHT_ACTIVE: Field<SpotLight, bool> = Field::new(FieldId::SpotLightActive);
    pub const SPOT_LIGHT_COLOUR: Field<SpotLight, Vec4> = Field::new(FieldId::SpotLightColour);
    pub const SPOT_LIGHT_RANGE: Field<SpotLight, f32> = Field::new(FieldId::SpotLightRange);
    pub const SPOT_LIGHT_ANGLE: Field<SpotLight, f32> = Field::new(FieldId::SpotLightAngle);
    pub const SPOT_LIGHT_INTENSITY: Field<SpotLight, f32> = Field::new(FieldId::SpotLightIntensity);
    pub const SPOT_LIGHT_SHADOW_TYPE: Field<SpotLight, ShadowType> =
        Field::new(FieldId::SpotLightShadowType);

    pub const DIRECTIONAL_LIGHT_ACTIVE: Field<DirectionalLight, bool> =
        Field::new(FieldId::DirectionalLightActive);
    pub const DIRECTIONAL_LIGHT_COLOUR: Field<DirectionalLight, Vec4> =
        Field::new(FieldId::DirectionalLightColour);
    pub const DIRECTIONAL_LIGHT_INTENSITY: Field<DirectionalLight, f32> =
        Field::new(FieldId::DirectionalLightIntensity);
    pub const DIRECTIONAL_LIGHT_SHADOW_TYPE: Field<DirectionalLight, ShadowType> =
        Field::new(FieldId::DirectionalLightShadowType);

    pub const RIGIDBODY_MASS: Field<Rigidbody, f32> = Field::new(FieldId::RigidbodyMass);
    pub const RIGIDBODY_DRAG: Field<Rigidbody, f32> = Field::new(FieldId::RigidbodyDrag);
    pub const RIGIDBODY_ANGULAR_DRAG: Field<Rigidbody, f32> =
        Field::new(FieldId::RigidbodyAngularDrag);
    pub const RIGIDBODY_AUTOMATIC_CENTRE_OF_MASS: Field<Rigidbody, bool> =
        Field::new(FieldId::RigidbodyAutomaticCentreOfMass);
    pub const RIGIDBODY_USE_GRAVITY: Field<Rigidbody, bool> =
        Field::new(FieldId::RigidbodyUseGravity);
    pub const RIGIDBODY_IS_KINEMATIC: Field<Rigidbody, bool> =
        Field::new(FieldId::RigidbodyIsKinematic);
    pub const RIGIDBODY_POSITION_CONSTRAINTS: Field<Rigidbody, BVec3> =
        Field::new(FieldId::RigidbodyPositionConstraints);
    pub const RIGIDBODY_ROTATION_CONSTRAINTS: Field<Rigidbody, BVec3> =
        Field::new(FieldId::RigidbodyRotationConstraints);

    pub const BOX_COLLIDER_IS_TRIGGER: Field<BoxCollider, bool> =
        Field::new(FieldId::BoxColliderIsTrigger);
    pub const BOX_COLLIDER_CENTRE: Field<BoxCollider, Vec3> =
        Field::new(FieldId::BoxColliderCentre);
    pub const BOX_COLLIDER_SIZE: Field<BoxCollider, Vec3> = Field::new(FieldId::BoxColliderSize);
    pub const BOX_COLLIDER_MATERIAL: Field<BoxCollider, PhysicsMaterial> =
        Field::new(FieldId::BoxColliderMaterial);

    pub const SPHERE_COLLIDER_IS_TRIGGER: Field<SphereCollider, bool> =
        Field::new(FieldId::SphereColliderIsTrigger);
    pub const SPHERE_COLLIDER_CENTRE: Field<SphereCollider, Vec3> =
        Field::new(FieldId::SphereColliderCentre);
    pub const SPHERE_COLLIDER_RADIUS: Field<SphereCollider, f32> =
        Field::new(FieldId::SphereColliderRadius);
    pub const SPHERE_COLLIDER_MATERIAL: Field<SphereCollider, PhysicsMaterial> =
        Field::new(FieldId::SphereColliderMaterial);
}

#[cfg(test)]
mod tests {
    use super::fields::*;
    use super::*;
    use crate::marshal::Marshal;

    fn check<C: Component, T: Marshal>(field: Field<C, T>) {
        assert_eq!(field.id().component(), C::KIND, "{:?}", field.id());
        assert_eq!(field.id().size(), T::SIZE, "{:?}", field.id());
    }

    #[test]
    fn descriptors_agree_with_field_ids() {
        check(POINT_LIGHT_ACTIVE);
        check(POINT_LIGHT_COLOUR);
        check(POINT_LIGHT_RADIUS);
        check(POINT_LIGHT_INTENSITY);
        check(POINT_LIGHT_SHADOW_TYPE);
        check(SPOT_LIGHT_ACTIVE);
        check(SPOT_LIGHT_COLOUR);
        check(SPOT_LIGHT_RANGE);
        check(SPOT_LIGHT_ANGLE);
        check(SPOT_LIGHT_INTENSITY);
        check(SPOT_LIGHT_SHADOW_TYPE);
        check(DIRECTIONAL_LIGHT_ACTIVE);
        check(DIRECTIONAL_LIGHT_COLOUR);
        check(DIRECTIONAL_LIGHT_INTENSITY);
        check(DIRECTIONAL_LIGHT_SHADOW_TYPE);
        check(RIGIDBODY_MASS);
        check(RIGIDBODY_DRAG);
        check(RIGIDBODY_ANGULAR_DRAG);
        check(RIGIDBODY_AUTOMATIC_CENTRE_OF_MASS);
        check(RIGIDBODY_USE_GRAVITY);
        check(RIGIDBODY_IS_KINEMATIC);
        check(RIGIDBODY_POSITION_CONSTRAINTS);
        check(RIGIDBODY_ROTATION_CONSTRAINTS);
        check(BOX_COLLIDER_IS_TRIGGER);
        check(BOX_COLLIDER_CENTRE);
        check(BOX_COLLIDER_SIZE);
        check(BOX_COLLIDER_MATERIAL);
        check(SPHERE_COLLIDER_IS_TRIGGER);
        check(SPHERE_COLLIDER_CENTRE);
        check(SPHERE_COLLIDER_RADIUS);
        check(SPHERE_COLLIDER_MATERIAL);
    }

    #[test]
    fn rigidbody_has_eight_fields() {
        assert_eq!(FieldId::of_component(ComponentKind::Rigidbody).count(), 8);
        assert_eq!(FieldId::of_component(ComponentKind::MeshFilter).count(), 0);
    }

    #[test]
    fn tokens_round_trip() {
        for kind in ComponentKind::ALL {
            assert_eq!(ComponentKind::from_token(kind.token()), Some(kind));
        }
        assert_eq!(Rigidbody::KIND, ComponentKind::Rigidbody);
        assert_eq!(Rigidbody::KIND.token().raw(), 7);
    }

    #[test]
    fn only_transform_and_tag_are_intrinsic() {
        let intrinsic: Vec<_> = ComponentKind::ALL
            .into_iter()
            .filter(|kind| kind.is_intrinsic())
            .collect();
        assert_eq!(intrinsic, vec![ComponentKind::Transform, ComponentKind::Tag]);
    }
}
