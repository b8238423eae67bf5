//! Demonstration behaviours and the scene they run in

mod camera_move;
mod compute_test;
mod generate_mesh;
mod light_flicker;
mod material_uniforms;

pub use camera_move::CameraMove;
pub use compute_test::ComputeTest;
pub use generate_mesh::GenerateMesh;
pub use light_flicker::LightFlicker;
pub use material_uniforms::MaterialUniforms;

use conduit_host::HostEngine;
use conduit_script::{Behaviour, ComputeShader, Entity, MeshRenderer, PointLight, ScriptContext};
use glam::Vec3;

/// A behaviour and the entity it drives.
pub struct Attached {
    pub entity: Entity,
    pub behaviour: Box<dyn Behaviour>,
}

impl Attached {
    fn new(entity: Entity, behaviour: impl Behaviour + 'static) -> Self {
        Self {
            entity,
            behaviour: Box::new(behaviour),
        }
    }
}

/// Spawn the demo scene on the host and attach one behaviour per entity.
pub fn build_scene(host: &HostEngine, ctx: &ScriptContext) -> conduit_core::Result<Vec<Attached>> {
    let camera = ctx.entity(host.spawn("Main Camera"))?;
    camera.transform().set_position(Vec3::new(0.0, 2.0, 10.0));

    let terrain = ctx.entity(host.spawn("Terrain"))?;

    let glow = ctx.entity(host.spawn("Glow Cube"))?;
    glow.add::<MeshRenderer>();

    let lamp = ctx.entity(host.spawn("Lamp"))?;
    lamp.add::<PointLight>().set_radius(15.0);
    lamp.set_parent(Some(&glow));

    let compute = ctx.entity(host.spawn("Compute"))?;
    let shader = ComputeShader::from_handle(ctx, host.register_compute_shader("particles"))?;

    Ok(vec![
        Attached::new(camera, CameraMove::default()),
        Attached::new(terrain, GenerateMesh::default()),
        Attached::new(glow, MaterialUniforms::default()),
        Attached::new(lamp, LightFlicker::default()),
        Attached::new(compute, ComputeTest::new(shader)),
    ])
}
