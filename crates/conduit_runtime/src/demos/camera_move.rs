//! Free-fly camera: WASD plus shift/space to move, mouse to look

use conduit_core::types::KeyCode;
use conduit_core::Result;
use conduit_script::{Behaviour, Entity};
use glam::{Vec2, Vec3};

pub struct CameraMove {
    pub speed: f32,
    pub sensitivity: f32,
    pitch: f32,
    yaw: f32,
    last_mouse: Option<Vec2>,
}

impl Default for CameraMove {
    fn default() -> Self {
        Self {
            speed: 10.0,
            sensitivity: 0.1,
            pitch: 0.0,
            yaw: 0.0,
            last_mouse: None,
        }
    }
}

impl Behaviour for CameraMove {
    fn on_update(&mut self, entity: &Entity) -> Result<()> {
        let ctx = entity.context();
        let input = ctx.input();
        let transform = entity.transform();
        let step = self.speed * ctx.time().delta_time();

        let mut offset = Vec3::ZERO;
        if input.key(KeyCode::W) {
            offset += transform.front() * step;
        }
        if input.key(KeyCode::S) {
            offset -= transform.front() * step;
        }
        if input.key(KeyCode::A) {
            offset -= transform.right() * step;
        }
        if input.key(KeyCode::D) {
            offset += transform.right() * step;
        }
        if input.key(KeyCode::LeftShift) {
            offset -= transform.up() * step;
        }
        if input.key(KeyCode::Space) {
            offset += transform.up() * step;
        }
        if offset != Vec3::ZERO {
            transform.translate(offset);
        }

        let mouse = input.mouse_position();
        let last = self.last_mouse.replace(mouse).unwrap_or(mouse);
        let delta = (mouse - last) * self.sensitivity;

        self.yaw -= delta.x;
        self.pitch = (self.pitch - delta.y).clamp(-89.0, 89.0);
        transform.set_rotation(Vec3::new(self.pitch, self.yaw, 0.0));
        Ok(())
    }
}
