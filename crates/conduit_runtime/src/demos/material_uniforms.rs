//! Pulse a per-instance glow through the renderer's uniform block

use conduit_core::types::TextureFormat;
use conduit_core::{Result, SamplerKind};
use conduit_script::{
    Behaviour, Entity, MaterialSlot, MaterialUniformBlock, MeshRenderer, Texture2D,
};
use glam::{Vec3, Vec4};

pub struct MaterialUniforms {
    pub speed: f32,
    pub colour: Vec3,
    time: f32,
    block: Option<MaterialUniformBlock>,
    pattern: Option<Texture2D>,
}

impl Default for MaterialUniforms {
    fn default() -> Self {
        Self {
            speed: 1.0,
            colour: Vec3::new(1.0, 0.0, 0.0),
            time: 0.0,
            block: None,
            pattern: None,
        }
    }
}

/// Bounce `t` back and forth across `[0, length]`.
fn ping_pong(t: f32, length: f32) -> f32 {
    let t = t.rem_euclid(length * 2.0);
    length - (t - length).abs()
}

fn checkerboard(size: u32) -> Vec<u8> {
    (0..size * size)
        .flat_map(|i| {
            let on = ((i % size) + (i / size)) % 2 == 0;
            let v = if on { 255 } else { 32 };
            [v, v, v]
        })
        .collect()
}

impl Behaviour for MaterialUniforms {
    fn on_start(&mut self, entity: &Entity) -> Result<()> {
        let Some(renderer) = entity.get::<MeshRenderer>() else {
            return Ok(());
        };
        let block = renderer.enable_uniform_block(MaterialSlot::Last)?;

        let pattern = Texture2D::with_data(
            entity.context(),
            &checkerboard(8),
            8,
            8,
            TextureFormat::Rgba8,
            TextureFormat::Rgb8,
        )?;
        block.set_sampler("Pattern", SamplerKind::Sampler2D, &pattern)?;
        block.set_albedo_tint(Vec4::new(0.9, 0.9, 1.0, 1.0));

        self.block = Some(block);
        self.pattern = Some(pattern);
        Ok(())
    }

    fn on_update(&mut self, entity: &Entity) -> Result<()> {
        let Some(block) = &self.block else {
            return Ok(());
        };
        self.time += entity.context().time().delta_time() * self.speed;
        block.set_float("Time", ping_pong(self.time, 1.5) - 0.5);
        block.set_vec3("GlowColour", self.colour);
        Ok(())
    }

    fn on_destroy(&mut self, _entity: &Entity) -> Result<()> {
        self.block = None;
        if let Some(mut pattern) = self.pattern.take() {
            pattern.release();
        }
        Ok(())
    }
}
