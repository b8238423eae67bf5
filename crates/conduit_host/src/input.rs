//! Keyboard and mouse state driven by the embedding application

use conduit_core::types::{ButtonQuery, KeyCode, MouseButton};
use glam::Vec2;
use std::collections::HashSet;
use std::hash::Hash;

/// Held/pressed/released tracking for one kind of button.
#[derive(Debug)]
struct Buttons<T> {
    held: HashSet<T>,
    pressed: HashSet<T>,
    released: HashSet<T>,
}

impl<T: Copy + Eq + Hash> Buttons<T> {
    fn new() -> Self {
        Self {
            held: HashSet::new(),
            pressed: HashSet::new(),
            released: HashSet::new(),
        }
    }

    fn press(&mut self, button: T) {
        if self.held.insert(button) {
            self.pressed.insert(button);
        }
    }

    fn release(&mut self, button: T) {
        if self.held.remove(&button) {
            self.released.insert(button);
        }
    }

    fn query(&self, button: T, query: ButtonQuery) -> bool {
        match query {
            ButtonQuery::Held => self.held.contains(&button),
            ButtonQuery::Pressed => self.pressed.contains(&button),
            ButtonQuery::Released => self.released.contains(&button),
        }
    }

    fn end_frame(&mut self) {
        self.pressed.clear();
        self.released.clear();
    }
}

#[derive(Debug)]
pub struct InputState {
    keys: Buttons<KeyCode>,
    mouse: Buttons<MouseButton>,
    mouse_position: Vec2,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            keys: Buttons::new(),
            mouse: Buttons::new(),
            mouse_position: Vec2::ZERO,
        }
    }

    pub fn press_key(&mut self, key: KeyCode) {
        self.keys.press(key);
    }

    pub fn release_key(&mut self, key: KeyCode) {
        self.keys.release(key);
    }

    pub fn press_mouse(&mut self, button: MouseButton) {
        self.mouse.press(button);
    }

    pub fn release_mouse(&mut self, button: MouseButton) {
        self.mouse.release(button);
    }

    pub fn set_mouse_position(&mut self, position: Vec2) {
        self.mouse_position = position;
    }

    pub fn key(&self, key: KeyCode, query: ButtonQuery) -> bool {
        self.keys.query(key, query)
    }

    pub fn mouse_button(&self, button: MouseButton, query: ButtonQuery) -> bool {
        self.mouse.query(button, query)
    }

    pub fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }

    /// Forget this frame's edges; held state carries over.
    pub fn end_frame(&mut self) {
        self.keys.end_frame();
        self.mouse.end_frame();
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_last_one_frame() {
        let mut input = InputState::new();
        input.press_key(KeyCode::W);
        assert!(input.key(KeyCode::W, ButtonQuery::Pressed));
        assert!(input.key(KeyCode::W, ButtonQuery::Held));

        input.end_frame();
        assert!(!input.key(KeyCode::W, ButtonQuery::Pressed));
        assert!(input.key(KeyCode::W, ButtonQuery::Held));

        input.release_key(KeyCode::W);
        assert!(input.key(KeyCode::W, ButtonQuery::Released));
        assert!(!input.key(KeyCode::W, ButtonQuery::Held));
    }

    #[test]
    fn repeated_press_is_not_a_new_edge() {
        let mut input = InputState::new();
        input.press_mouse(MouseButton::Left);
        input.end_frame();
        input.press_mouse(MouseButton::Left);
        assert!(!input.mouse_button(MouseButton::Left, ButtonQuery::Pressed));
    }
}
