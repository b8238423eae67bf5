//! Resource lifecycle, bulk transfer and uniform tagging

use conduit_core::types::TextureFormat;
use conduit_core::{BridgeError, ResourceKind, SamplerKind, UniformKind};
use conduit_host::HostEngine;
use conduit_script::{
    ComputeBuffer, Material, MaterialSlot, Mesh, MeshRenderer, ScriptContext, Texture2D,
};
use glam::{Vec3, Vec4};
use std::rc::Rc;

fn world() -> (Rc<HostEngine>, ScriptContext) {
    let host = Rc::new(HostEngine::default());
    let ctx = ScriptContext::new(host.clone());
    (host, ctx)
}

#[test]
fn buffer_contents_survive_a_round_trip() {
    let (_host, ctx) = world();
    for n in [0usize, 1, 1000] {
        let buffer = ComputeBuffer::of::<u32>(&ctx, n).unwrap();
        let data: Vec<u32> = (0..n as u32).map(|i| i.wrapping_mul(2_654_435_761)).collect();
        buffer.set_data(&data).unwrap();

        let mut out = vec![0u32; n];
        buffer.get_data(&mut out).unwrap();
        assert_eq!(out, data, "n = {n}");
    }
}

#[test]
fn struct_elements_round_trip() {
    let (_host, ctx) = world();
    let particles = [Vec4::new(1.0, 2.0, 3.0, 4.0), Vec4::splat(-1.0)];
    let buffer = ComputeBuffer::of::<Vec4>(&ctx, particles.len()).unwrap();
    buffer.set_data(&particles).unwrap();

    let mut out = [Vec4::ZERO; 2];
    buffer.get_data(&mut out).unwrap();
    assert_eq!(out, particles);
}

#[test]
fn release_is_idempotent_and_isolated() {
    let (host, ctx) = world();
    let mut a = ComputeBuffer::of::<f32>(&ctx, 4).unwrap();
    let b = ComputeBuffer::of::<f32>(&ctx, 4).unwrap();
    b.set_data(&[1.0f32, 2.0, 3.0, 4.0]).unwrap();

    a.release();
    a.release();
    assert_eq!(host.call_count("compute_buffer_release"), 1);

    let mut out = [0.0f32; 4];
    b.get_data(&mut out).unwrap();
    assert_eq!(out, [1.0, 2.0, 3.0, 4.0]);
    assert_eq!(host.live_buffers(), 1);

    let mut texture = Texture2D::new(&ctx, 4, 4, TextureFormat::Rgba8).unwrap();
    texture.release();
    texture.release();
    assert_eq!(host.call_count("texture_destroy"), 1);

    let mut mesh = Mesh::new(&ctx).unwrap();
    mesh.release();
    mesh.release();
    assert_eq!(host.call_count("mesh_destroy"), 1);
}

#[test]
fn released_resources_reject_further_use() {
    let (_host, ctx) = world();
    let mut texture = Texture2D::new(&ctx, 1, 1, TextureFormat::R8).unwrap();
    texture.release();
    assert_eq!(
        texture.submit(),
        Err(BridgeError::InvalidHandle {
            resource: ResourceKind::Texture
        })
    );

    let mut mesh = Mesh::new(&ctx).unwrap();
    mesh.release();
    assert!(mesh.set_vertices(&[Vec3::ZERO]).is_err());
}

#[test]
fn mis_sized_uniform_never_reaches_the_host() {
    let (host, ctx) = world();
    let entity = ctx.entity(host.spawn("cube")).unwrap();
    let renderer = entity.add::<MeshRenderer>();
    let block = renderer.enable_uniform_block(MaterialSlot::Last).unwrap();
    host.reset_calls();

    let err = block.set_raw("u_colour", UniformKind::Vec4, &[0; 12]).unwrap_err();
    assert_eq!(
        err,
        BridgeError::PayloadSize {
            kind: UniformKind::Vec4,
            expected: 16,
            actual: 12,
        }
    );
    assert_eq!(host.call_count("uniform_block_set"), 0);

    block.set_raw("u_colour", UniformKind::Vec4, &[0; 16]).unwrap();
    assert_eq!(host.call_count("uniform_block_set"), 1);
}

#[test]
fn typed_setters_tag_their_kind() {
    let (host, ctx) = world();
    let entity = ctx.entity(host.spawn("cube")).unwrap();
    let renderer = entity.add::<MeshRenderer>();
    let block = renderer.enable_uniform_block(MaterialSlot::Last).unwrap();

    block.set_int("u_count", -3);
    block.set_vec3("u_offset", Vec3::new(1.0, 2.0, 3.0));
    block.set_mat3("u_basis", glam::Mat3::IDENTITY);
    block.set_bvec2("u_flags", glam::BVec2::new(true, false));

    let count = host.uniform_value(block.ptr(), "u_count").unwrap();
    assert_eq!(count.kind(), UniformKind::Int);
    assert_eq!(count.decode::<i32>(), Some(-3));

    let offset = host.uniform_value(block.ptr(), "u_offset").unwrap();
    assert_eq!(offset.decode::<Vec3>(), Some(Vec3::new(1.0, 2.0, 3.0)));

    let basis = host.uniform_value(block.ptr(), "u_basis").unwrap();
    assert_eq!(basis.payload().len(), 36);

    let flags = host.uniform_value(block.ptr(), "u_flags").unwrap();
    assert_eq!(flags.payload(), &[1, 0]);
}

#[test]
fn samplers_and_overrides_use_texture_handles() {
    let (host, ctx) = world();
    let entity = ctx.entity(host.spawn("cube")).unwrap();
    let renderer = entity.add::<MeshRenderer>();
    let block = renderer.enable_uniform_block(MaterialSlot::Last).unwrap();
    let texture = Texture2D::new(&ctx, 2, 2, TextureFormat::Rgba8).unwrap();

    block.set_sampler("u_albedo", SamplerKind::Sampler2D, &texture).unwrap();
    block.set_albedo_map(&texture).unwrap();
    block.set_roughness(0.25);

    let sampler = host.uniform_value(block.ptr(), "u_albedo").unwrap();
    assert_eq!(sampler.kind(), UniformKind::Sampler2D);
    assert_eq!(sampler.payload(), &texture.handle().unwrap().raw().to_ne_bytes());
    assert_eq!(host.overrides(block.ptr()).len(), 2);
}

#[test]
fn borrowed_material_views_never_destroy() {
    let (host, ctx) = world();
    let entity = ctx.entity(host.spawn("cube")).unwrap();
    let renderer = entity.add::<MeshRenderer>();

    let owned = Material::new(&ctx, "metal").unwrap();
    renderer.set_material(&owned).unwrap();

    let mut view = renderer.material().unwrap();
    assert_eq!(view.handle().unwrap(), owned.handle().unwrap());
    view.release();
    drop(view);
    assert!(host.asset_exists(owned.handle().unwrap()));
    assert_eq!(host.call_count("material_destroy"), 0);
}

#[test]
fn destroying_an_entity_frees_its_uniform_blocks() {
    let (host, ctx) = world();
    let entity = ctx.entity(host.spawn("cube")).unwrap();
    let renderer = entity.add::<MeshRenderer>();
    renderer.enable_all_uniform_blocks();
    assert_eq!(host.live_uniform_blocks(), 1);

    entity.destroy();
    assert_eq!(host.live_uniform_blocks(), 0);
}
