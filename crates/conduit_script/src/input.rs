//! Keyboard and mouse queries
//!
//! Every query is a fresh native call with no side effects.

use conduit_core::types::{ButtonQuery, KeyCode, MouseButton};
use conduit_core::NativeApi;
use glam::Vec2;

#[derive(Clone, Copy)]
pub struct Input<'a> {
    api: &'a dyn NativeApi,
}

impl<'a> Input<'a> {
    pub(crate) fn new(api: &'a dyn NativeApi) -> Self {
        Self { api }
    }

    /// Held this frame.
    pub fn key(&self, key: KeyCode) -> bool {
        self.api.input_key(key, ButtonQuery::Held)
    }

    /// Went down this frame.
    pub fn key_down(&self, key: KeyCode) -> bool {
        self.api.input_key(key, ButtonQuery::Pressed)
    }

    /// Went up this frame.
    pub fn key_up(&self, key: KeyCode) -> bool {
        self.api.input_key(key, ButtonQuery::Released)
    }

    pub fn mouse_button(&self, button: MouseButton) -> bool {
        self.api.input_mouse_button(button, ButtonQuery::Held)
    }

    pub fn mouse_button_down(&self, button: MouseButton) -> bool {
        self.api.input_mouse_button(button, ButtonQuery::Pressed)
    }

    pub fn mouse_button_up(&self, button: MouseButton) -> bool {
        self.api.input_mouse_button(button, ButtonQuery::Released)
    }

    pub fn mouse_position(&self) -> Vec2 {
        self.api.input_mouse_position()
    }

    pub fn mouse_x(&self) -> f32 {
        self.mouse_position().x
    }

    pub fn mouse_y(&self) -> f32 {
        self.mouse_position().y
    }
}
