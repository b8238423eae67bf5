//! Script-created 2D textures

use crate::context::ScriptContext;
use crate::resource::HandleSlot;
use conduit_core::types::TextureFormat;
use conduit_core::{AssetHandle, BridgeError, Ownership, ResourceKind, Result};
use glam::{IVec2, Vec4};

pub struct Texture2D {
    ctx: ScriptContext,
    slot: HandleSlot<AssetHandle>,
    width: u32,
    height: u32,
    format: TextureFormat,
}

impl Texture2D {
    pub fn new(ctx: &ScriptContext, width: u32, height: u32, format: TextureFormat) -> Result<Self> {
        let handle = ctx.api().texture_create(width, height, format);
        Self::owned(ctx, handle, width, height, format)
    }

    /// Create a texture from `data` laid out as `data_format`, stored as
    /// `internal_format`. `data` must cover every pixel exactly.
    pub fn with_data(
        ctx: &ScriptContext,
        data: &[u8],
        width: u32,
        height: u32,
        internal_format: TextureFormat,
        data_format: TextureFormat,
    ) -> Result<Self> {
        check_pixels(data, width, height, data_format)?;
        let handle =
            ctx.api()
                .texture_create_with_data(data, width, height, internal_format, data_format);
        Self::owned(ctx, handle, width, height, internal_format)
    }

    fn owned(
        ctx: &ScriptContext,
        handle: AssetHandle,
        width: u32,
        height: u32,
        format: TextureFormat,
    ) -> Result<Self> {
        if handle.is_null() {
            return Err(BridgeError::Exhausted {
                resource: ResourceKind::Texture,
            });
        }
        Ok(Self {
            ctx: ctx.clone(),
            slot: HandleSlot::owned(handle, ResourceKind::Texture),
            width,
            height,
            format,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> TextureFormat {
        self.format
    }

    pub fn handle(&self) -> Result<AssetHandle> {
        self.slot.get()
    }

    pub fn ownership(&self) -> Ownership {
        self.slot.ownership()
    }

    /// Write one pixel. Changes stay CPU-side until `submit`.
    pub fn set_pixel(&self, colour: Vec4, coord: IVec2) -> Result<()> {
        let handle = self.slot.get()?;
        self.ctx.api().texture_set_pixel(handle, colour, coord);
        Ok(())
    }

    /// Replace every pixel with `data` laid out as `format`.
    pub fn set_pixel_data(&self, data: &[u8], format: TextureFormat) -> Result<()> {
        let handle = self.slot.get()?;
        check_pixels(data, self.width, self.height, format)?;
        self.ctx.api().texture_set_pixel_data(handle, data, format);
        Ok(())
    }

    /// Upload pending pixel changes.
    pub fn submit(&self) -> Result<()> {
        let handle = self.slot.get()?;
        self.ctx.api().texture_submit(handle);
        Ok(())
    }

    /// Destroy the native texture. Safe to call more than once.
    pub fn release(&mut self) {
        if let Some(handle) = self.slot.release() {
            self.ctx.api().texture_destroy(handle);
        }
    }
}

impl Drop for Texture2D {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Texture2D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture2D")
            .field("handle", &self.slot.get().ok())
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .finish()
    }
}

fn check_pixels(data: &[u8], width: u32, height: u32, format: TextureFormat) -> Result<()> {
    // sizes in bytes
    let expected = width as usize * height as usize * format.channels();
    if data.len() != expected {
        return Err(BridgeError::ShapeMismatch {
            resource: ResourceKind::Texture,
            expected_count: expected,
            expected_size: 1,
            actual_count: data.len(),
            actual_size: 1,
        });
    }
    Ok(())
}
