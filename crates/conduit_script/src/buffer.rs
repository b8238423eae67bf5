//! Compute buffers
//!
//! A buffer's shape (element count and element size) is fixed at creation.
//! Every transfer is checked against it before the native call is issued.

use crate::context::ScriptContext;
use crate::resource::HandleSlot;
use bytemuck::Pod;
use conduit_core::{BridgeError, NativePtr, ResourceKind, Result};

pub struct ComputeBuffer {
    ctx: ScriptContext,
    slot: HandleSlot<NativePtr>,
    count: usize,
    element_size: usize,
}

impl ComputeBuffer {
    /// Allocate native storage for `count` elements of `element_size` bytes.
    pub fn new(ctx: &ScriptContext, count: usize, element_size: usize) -> Result<Self> {
        let ptr = ctx.api().compute_buffer_create(count, element_size);
        if ptr.is_null() {
            return Err(BridgeError::Exhausted {
                resource: ResourceKind::ComputeBuffer,
            });
        }
        Ok(Self {
            ctx: ctx.clone(),
            slot: HandleSlot::owned(ptr, ResourceKind::ComputeBuffer),
            count,
            element_size,
        })
    }

    /// Allocate a buffer shaped for `count` values of `T`.
    pub fn of<T: Pod>(ctx: &ScriptContext, count: usize) -> Result<Self> {
        Self::new(ctx, count, std::mem::size_of::<T>())
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn element_size(&self) -> usize {
        self.element_size
    }

    pub fn handle(&self) -> Result<NativePtr> {
        self.slot.get()
    }

    pub fn is_released(&self) -> bool {
        self.slot.is_released()
    }

    fn check_shape<T>(&self, len: usize) -> Result<()> {
        let size = std::mem::size_of::<T>();
        if len != self.count || size != self.element_size {
            return Err(BridgeError::ShapeMismatch {
                resource: ResourceKind::ComputeBuffer,
                expected_count: self.count,
                expected_size: self.element_size,
                actual_count: len,
                actual_size: size,
            });
        }
        Ok(())
    }

    /// Copy `data` into the buffer. `data` is only borrowed for the call.
    pub fn set_data<T: Pod>(&self, data: &[T]) -> Result<()> {
        let ptr = self.slot.get()?;
        self.check_shape::<T>(data.len())?;
        self.ctx.api().compute_buffer_set_data(
            ptr,
            bytemuck::cast_slice(data),
            self.count,
            self.element_size,
        );
        Ok(())
    }

    /// Copy the buffer's contents into `out`.
    pub fn get_data<T: Pod>(&self, out: &mut [T]) -> Result<()> {
        let ptr = self.slot.get()?;
        self.check_shape::<T>(out.len())?;
        self.ctx.api().compute_buffer_get_data(
            ptr,
            bytemuck::cast_slice_mut(out),
            self.count,
            self.element_size,
        );
        Ok(())
    }

    /// Free the native storage. Safe to call more than once.
    pub fn release(&mut self) {
        if let Some(ptr) = self.slot.release() {
            self.ctx.api().compute_buffer_release(ptr);
        }
    }
}

impl Drop for ComputeBuffer {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for ComputeBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComputeBuffer")
            .field("handle", &self.slot.get().ok())
            .field("count", &self.count)
            .field("element_size", &self.element_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conduit_host::HostEngine;
    use std::rc::Rc;

    fn setup() -> (Rc<HostEngine>, ScriptContext) {
        let host = Rc::new(HostEngine::default());
        let ctx = ScriptContext::new(host.clone());
        (host, ctx)
    }

    #[test]
    fn wrong_element_type_is_rejected_locally() {
        let (host, ctx) = setup();
        let buffer = ComputeBuffer::of::<f32>(&ctx, 4).unwrap();
        let err = buffer.set_data(&[0u64; 4]).unwrap_err();
        assert_eq!(
            err,
            BridgeError::ShapeMismatch {
                resource: ResourceKind::ComputeBuffer,
                expected_count: 4,
                expected_size: 4,
                actual_count: 4,
                actual_size: 8,
            }
        );
        assert!(buffer.set_data(&[0.0f32; 3]).is_err());
        assert_eq!(host.call_count("compute_buffer_set_data"), 0);
    }

    #[test]
    fn drop_releases_the_native_block() {
        let (host, ctx) = setup();
        {
            let _buffer = ComputeBuffer::of::<u32>(&ctx, 16).unwrap();
            assert_eq!(host.live_buffers(), 1);
        }
        assert_eq!(host.live_buffers(), 0);
        assert_eq!(host.call_count("compute_buffer_release"), 1);
    }

    #[test]
    fn released_buffers_refuse_transfers() {
        let (host, ctx) = setup();
        let mut buffer = ComputeBuffer::of::<u32>(&ctx, 2).unwrap();
        buffer.release();
        let mut out = [0u32; 2];
        assert_eq!(
            buffer.get_data(&mut out),
            Err(BridgeError::InvalidHandle {
                resource: ResourceKind::ComputeBuffer
            })
        );
        assert_eq!(host.call_count("compute_buffer_get_data"), 0);
    }

    #[test]
    fn exhaustion_surfaces_as_an_error() {
        let host = Rc::new(HostEngine::new(conduit_host::HostConfig {
            max_buffer_bytes: 64,
            ..Default::default()
        }));
        let ctx = ScriptContext::new(host);
        assert_eq!(
            ComputeBuffer::of::<f32>(&ctx, 17).unwrap_err(),
            BridgeError::Exhausted {
                resource: ResourceKind::ComputeBuffer
            }
        );
    }
}
