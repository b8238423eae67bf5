//! Point light intensity flicker

use conduit_core::Result;
use conduit_script::{Behaviour, Entity, PointLight};

pub struct LightFlicker {
    pub min_intensity: f32,
    pub max_intensity: f32,
    pub speed: f32,
    time: f32,
}

impl Default for LightFlicker {
    fn default() -> Self {
        Self {
            min_intensity: 25.0,
            max_intensity: 30.0,
            speed: 5.0,
            time: 0.0,
        }
    }
}

impl Behaviour for LightFlicker {
    fn on_update(&mut self, entity: &Entity) -> Result<()> {
        let Some(light) = entity.get::<PointLight>() else {
            return Ok(());
        };
        self.time += entity.context().time().delta_time() * self.speed;

        // smooth pseudo-noise in [0, 1]
        let t = self.time;
        let noise = 0.5 + 0.5 * (t.sin() * (t * 1.73).cos());
        let intensity = self.min_intensity + (self.max_intensity - self.min_intensity) * noise;
        light.set_intensity(intensity.clamp(self.min_intensity, self.max_intensity));
        Ok(())
    }
}
