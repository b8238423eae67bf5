//! Compute shaders

use crate::buffer::ComputeBuffer;
use crate::context::ScriptContext;
use conduit_core::{AssetHandle, BridgeError, ResourceKind, Result, TaggedValue, UniformValue};
use glam::{Vec2, Vec3, Vec4};

/// A compute shader asset. Always borrowed: shaders belong to the native
/// asset table.
#[derive(Clone)]
pub struct ComputeShader {
    ctx: ScriptContext,
    handle: AssetHandle,
}

impl ComputeShader {
    pub fn from_handle(ctx: &ScriptContext, handle: AssetHandle) -> Result<Self> {
        if handle.is_null() {
            return Err(BridgeError::InvalidHandle {
                resource: ResourceKind::ComputeShader,
            });
        }
        Ok(Self {
            ctx: ctx.clone(),
            handle,
        })
    }

    pub fn handle(&self) -> AssetHandle {
        self.handle
    }

    pub fn set_buffer(&self, buffer: &ComputeBuffer, binding: u32) -> Result<()> {
        let ptr = buffer.handle()?;
        self.ctx
            .api()
            .compute_shader_set_buffer(self.handle, ptr, binding);
        Ok(())
    }

    pub fn dispatch(&self, x: u32, y: u32, z: u32) {
        self.ctx.api().compute_shader_dispatch(self.handle, x, y, z);
    }

    pub fn set_uniform<T: UniformValue>(&self, name: &str, value: &T) {
        self.set_tagged(name, &TaggedValue::of(value));
    }

    pub fn set_tagged(&self, name: &str, value: &TaggedValue) {
        self.ctx.api().compute_shader_set_uniform(
            self.handle,
            name,
            value.kind().code(),
            value.payload(),
        );
    }

    pub fn set_bool(&self, name: &str, value: bool) {
        self.set_uniform(name, &value);
    }

    pub fn set_int(&self, name: &str, value: i32) {
        self.set_uniform(name, &value);
    }

    pub fn set_uint(&self, name: &str, value: u32) {
        self.set_uniform(name, &value);
    }

    pub fn set_float(&self, name: &str, value: f32) {
        self.set_uniform(name, &value);
    }

    pub fn set_vec2(&self, name: &str, value: Vec2) {
        self.set_uniform(name, &value);
    }

    pub fn set_vec3(&self, name: &str, value: Vec3) {
        self.set_uniform(name, &value);
    }

    pub fn set_vec4(&self, name: &str, value: Vec4) {
        self.set_uniform(name, &value);
    }
}

impl std::fmt::Debug for ComputeShader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ComputeShader").field(&self.handle).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conduit_core::UniformKind;
    use conduit_host::HostEngine;
    use std::rc::Rc;

    #[test]
    fn uniforms_and_bindings_reach_the_shader() {
        let host = Rc::new(HostEngine::default());
        let ctx = ScriptContext::new(host.clone());
        let shader = ComputeShader::from_handle(&ctx, host.register_compute_shader("blur")).unwrap();
        let buffer = ComputeBuffer::of::<f32>(&ctx, 8).unwrap();

        shader.set_buffer(&buffer, 3).unwrap();
        shader.set_float("u_radius", 2.5);
        shader.dispatch(8, 1, 1);

        assert_eq!(host.shader_buffer(shader.handle(), 3), Some(buffer.handle().unwrap()));
        let radius = host.shader_uniform(shader.handle(), "u_radius").unwrap();
        assert_eq!(radius.kind(), UniformKind::Float);
        assert_eq!(radius.decode::<f32>(), Some(2.5));
        assert_eq!(host.dispatches(shader.handle()), vec![[8, 1, 1]]);
    }

    #[test]
    fn null_shader_is_rejected() {
        let host = Rc::new(HostEngine::default());
        let ctx = ScriptContext::new(host);
        assert!(ComputeShader::from_handle(&ctx, AssetHandle::NULL).is_err());
    }
}
