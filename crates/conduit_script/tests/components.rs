//! Structural component operations against the in-process host

use conduit_core::EntityId;
use conduit_host::HostEngine;
use conduit_script::{
    BoxCollider, Entity, MeshRenderer, PointLight, Rigidbody, ScriptContext, SphereCollider,
    TransformComponent,
};
use glam::{BVec3, Vec3};
use std::rc::Rc;

fn world() -> (Rc<HostEngine>, ScriptContext) {
    let host = Rc::new(HostEngine::default());
    let ctx = ScriptContext::new(host.clone());
    (host, ctx)
}

fn spawn(host: &HostEngine, ctx: &ScriptContext, tag: &str) -> Entity {
    ctx.entity(host.spawn(tag)).unwrap()
}

#[test]
fn has_follows_add_and_remove_for_every_kind() {
    let (host, ctx) = world();
    let entity = spawn(&host, &ctx, "e");

    macro_rules! cycle {
        ($($ty:ty),+) => {
            $(
                entity.add::<$ty>();
                assert!(entity.has::<$ty>(), "{}", stringify!($ty));
                entity.remove::<$ty>();
                assert!(!entity.has::<$ty>(), "{}", stringify!($ty));
            )+
        };
    }
    cycle!(PointLight, Rigidbody, BoxCollider, SphereCollider, MeshRenderer);
}

#[test]
fn add_twice_shares_component_state() {
    let (host, ctx) = world();
    let entity = spawn(&host, &ctx, "e");

    let first = entity.add::<PointLight>();
    let second = entity.add::<PointLight>();
    first.set_radius(42.0);
    assert_eq!(second.radius(), 42.0);
    assert_eq!(host.call_count("component_add"), 1);
}

#[test]
fn get_is_absent_until_added() {
    let (host, ctx) = world();
    let entity = spawn(&host, &ctx, "e");
    assert!(entity.get::<Rigidbody>().is_none());
    entity.add::<Rigidbody>();
    assert!(entity.get::<Rigidbody>().is_some());
}

#[test]
fn transform_is_intrinsic() {
    let (host, ctx) = world();
    let entity = spawn(&host, &ctx, "e");
    assert!(entity.has::<TransformComponent>());
    entity.remove::<TransformComponent>();
    assert!(entity.has::<TransformComponent>());
}

#[test]
fn rigidbody_is_reset_after_remove_and_re_add() {
    let (host, ctx) = world();
    assert!(host.spawn_with_id(EntityId::new(7), "seven"));
    let entity = ctx.entity(EntityId::new(7)).unwrap();
    assert!(!entity.has::<Rigidbody>());

    let body = entity.add::<Rigidbody>();
    assert!(entity.has::<Rigidbody>());
    body.set_mass(80.0);
    body.set_drag(0.5);
    body.set_position_constraints(BVec3::TRUE);

    entity.remove::<Rigidbody>();
    assert!(!entity.has::<Rigidbody>());

    let body = entity.add::<Rigidbody>();
    assert!(entity.has::<Rigidbody>());
    assert_eq!(body.mass(), 1.0);
    assert_eq!(body.drag(), 0.0);
    assert_eq!(body.angular_drag(), 0.05);
    assert!(body.use_gravity());
    assert!(body.automatic_centre_of_mass());
    assert!(!body.is_kinematic());
    assert_eq!(body.position_constraints(), BVec3::FALSE);
}

#[test]
fn null_ids_are_refused_locally() {
    let (_host, ctx) = world();
    assert!(ctx.entity(EntityId::NULL).is_err());
    assert!(ctx.entity(EntityId::INVALID).is_err());
}

#[test]
fn instantiate_spawns_a_configured_copy() {
    let (host, ctx) = world();
    let prefab = host.register_prefab(
        "barrel",
        &[conduit_core::ComponentKind::SphereCollider],
        conduit_core::TransformData::from_position(Vec3::new(0.0, 5.0, 0.0)),
    );
    let barrel = ctx.instantiate(&prefab).unwrap();
    assert!(barrel.has::<SphereCollider>());
    assert_eq!(barrel.tag(), "barrel");
    assert_eq!(barrel.transform().position(), Vec3::new(0.0, 5.0, 0.0));

    let missing = conduit_core::Prefab::new(conduit_core::AssetHandle::new(9999));
    assert!(ctx.instantiate(&missing).is_err());
}
