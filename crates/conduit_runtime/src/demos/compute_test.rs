//! Upload particle data, dispatch a compute pass and read the results back

use bytemuck::{Pod, Zeroable};
use conduit_core::types::KeyCode;
use conduit_core::Result;
use conduit_script::{Behaviour, ComputeBuffer, ComputeShader, Entity};
use glam::Vec2;

const GROUP_SIZE: u32 = 1024;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Pod, Zeroable)]
struct Particle {
    value: f32,
    flag: u32,
    velocity: Vec2,
}

pub struct ComputeTest {
    shader: ComputeShader,
    pub particles: usize,
    pub iterations: i32,
    pub addition: Vec2,
    runs: u32,
}

impl ComputeTest {
    pub fn new(shader: ComputeShader) -> Self {
        Self {
            shader,
            particles: 1000,
            iterations: 1,
            addition: Vec2::ONE,
            runs: 0,
        }
    }

    fn seed(&self) -> Vec<Particle> {
        (0..self.particles)
            .map(|i| {
                let h = (i as u32).wrapping_add(self.runs).wrapping_mul(2_654_435_761);
                let unit = |bits: u32| (bits >> 8) as f32 / (1u32 << 24) as f32;
                Particle {
                    value: unit(h),
                    flag: h & 1,
                    velocity: Vec2::new(unit(h.rotate_left(11)), unit(h.rotate_left(22))),
                }
            })
            .collect()
    }
}

impl Behaviour for ComputeTest {
    fn on_update(&mut self, entity: &Entity) -> Result<()> {
        let ctx = entity.context();
        if !ctx.input().key_down(KeyCode::Enter) {
            return Ok(());
        }

        let mut particles = self.seed();
        let mut buffer = ComputeBuffer::of::<Particle>(ctx, particles.len())?;
        buffer.set_data(&particles)?;

        self.shader.set_buffer(&buffer, 0)?;
        self.shader.set_int("u_Iterations", self.iterations);
        self.shader.set_vec2("u_Addition", self.addition);
        let groups = (particles.len() as u32).div_ceil(GROUP_SIZE).max(1);
        self.shader.dispatch(groups, 1, 1);

        buffer.get_data(&mut particles)?;
        buffer.release();
        self.runs += 1;

        let mean = particles.iter().map(|p| p.value).sum::<f32>() / particles.len().max(1) as f32;
        ctx.debug()
            .info(&format!("compute pass {}: {} particles, mean value {mean:.3}", self.runs, particles.len()));
        Ok(())
    }
}
