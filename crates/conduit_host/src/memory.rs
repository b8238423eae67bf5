//! Native memory blocks addressed by `NativePtr`
//!
//! Compute buffers and material uniform blocks live here. Pointers are
//! never reused, so a stale pointer can only ever miss.

use conduit_core::types::MaterialOverride;
use conduit_core::{AssetHandle, NativePtr, UniformKind};
use std::collections::HashMap;

const BASE_ADDRESS: usize = 0x1_0000;
const ALIGNMENT: usize = 0x100;

/// Storage behind one compute buffer.
#[derive(Debug, Clone)]
pub struct BufferBlock {
    pub count: usize,
    pub element_size: usize,
    pub bytes: Vec<u8>,
}

/// Per-instance uniform overrides for one material slot of a mesh renderer.
#[derive(Debug, Clone, Default)]
pub struct UniformBlock {
    pub material: AssetHandle,
    pub uniforms: HashMap<String, (UniformKind, Vec<u8>)>,
    pub overrides: Vec<MaterialOverride>,
}

impl UniformBlock {
    pub fn new(material: AssetHandle) -> Self {
        Self {
            material,
            ..Self::default()
        }
    }

    /// Replace any earlier override of the same property.
    pub fn push_override(&mut self, value: MaterialOverride) {
        self.overrides
            .retain(|existing| std::mem::discriminant(existing) != std::mem::discriminant(&value));
        self.overrides.push(value);
    }
}

/// Allocator for native pointers with a byte budget on compute buffers.
pub struct NativeHeap {
    next_address: usize,
    buffers: HashMap<NativePtr, BufferBlock>,
    blocks: HashMap<NativePtr, UniformBlock>,
    buffer_bytes: usize,
    byte_limit: usize,
}

impl NativeHeap {
    pub fn new(byte_limit: usize) -> Self {
        Self {
            next_address: BASE_ADDRESS,
            buffers: HashMap::new(),
            blocks: HashMap::new(),
            buffer_bytes: 0,
            byte_limit,
        }
    }

    fn next_ptr(&mut self, bytes: usize) -> NativePtr {
        let ptr = NativePtr::from_raw(self.next_address);
        let span = bytes.div_ceil(ALIGNMENT).max(1) * ALIGNMENT;
        self.next_address += span;
        ptr
    }

    /// Allocate `count * element_size` zeroed bytes, or null if the budget
    /// would be exceeded.
    pub fn alloc_buffer(&mut self, count: usize, element_size: usize) -> NativePtr {
        let Some(bytes) = count.checked_mul(element_size) else {
            return NativePtr::NULL;
        };
        let over_budget = self
            .buffer_bytes
            .checked_add(bytes)
            .map_or(true, |total| total > self.byte_limit);
        if element_size == 0 || over_budget {
            return NativePtr::NULL;
        }

        let ptr = self.next_ptr(bytes);
        self.buffers.insert(
            ptr,
            BufferBlock {
                count,
                element_size,
                bytes: vec![0; bytes],
            },
        );
        self.buffer_bytes += bytes;
        ptr
    }

    /// Returns false when `ptr` is not a live buffer.
    pub fn free_buffer(&mut self, ptr: NativePtr) -> bool {
        match self.buffers.remove(&ptr) {
            Some(block) => {
                self.buffer_bytes -= block.bytes.len();
                true
            }
            None => false,
        }
    }

    pub fn buffer(&self, ptr: NativePtr) -> Option<&BufferBlock> {
        self.buffers.get(&ptr)
    }

    pub fn buffer_mut(&mut self, ptr: NativePtr) -> Option<&mut BufferBlock> {
        self.buffers.get_mut(&ptr)
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    pub fn buffer_bytes(&self) -> usize {
        self.buffer_bytes
    }

    pub fn alloc_block(&mut self, material: AssetHandle) -> NativePtr {
        let ptr = self.next_ptr(ALIGNMENT);
        self.blocks.insert(ptr, UniformBlock::new(material));
        ptr
    }

    pub fn free_block(&mut self, ptr: NativePtr) -> bool {
        self.blocks.remove(&ptr).is_some()
    }

    pub fn block(&self, ptr: NativePtr) -> Option<&UniformBlock> {
        self.blocks.get(&ptr)
    }

    pub fn block_mut(&mut self, ptr: NativePtr) -> Option<&mut UniformBlock> {
        self.blocks.get_mut(&ptr)
    }

    pub fn live_blocks(&self) -> usize {
        self.blocks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffers_respect_the_byte_budget() {
        let mut heap = NativeHeap::new(1024);
        let a = heap.alloc_buffer(128, 4);
        assert!(!a.is_null());
        assert_eq!(heap.buffer_bytes(), 512);

        assert!(heap.alloc_buffer(129, 4).is_null());

        assert!(heap.free_buffer(a));
        assert!(!heap.free_buffer(a));
        assert_eq!(heap.buffer_bytes(), 0);
        assert!(!heap.alloc_buffer(256, 4).is_null());
    }

    #[test]
    fn empty_buffers_still_get_distinct_pointers() {
        let mut heap = NativeHeap::new(16);
        let a = heap.alloc_buffer(0, 4);
        let b = heap.alloc_buffer(0, 4);
        assert!(!a.is_null() && !b.is_null());
        assert_ne!(a, b);
        assert!(heap.alloc_buffer(4, 0).is_null());
        assert!(heap.alloc_buffer(usize::MAX, 2).is_null());
    }

    #[test]
    fn default_block_has_no_material() {
        let block = UniformBlock::default();
        assert!(block.material.is_null());
        assert!(block.uniforms.is_empty() && block.overrides.is_empty());
    }

    #[test]
    fn overrides_replace_the_same_property() {
        let mut block = UniformBlock::new(AssetHandle::new(1));
        block.push_override(MaterialOverride::Metallic(0.2));
        block.push_override(MaterialOverride::Roughness(0.5));
        block.push_override(MaterialOverride::Metallic(0.9));
        assert_eq!(
            block.overrides,
            vec![
                MaterialOverride::Roughness(0.5),
                MaterialOverride::Metallic(0.9)
            ]
        );
    }
}
