//! Keyboard and mouse state tracking for the fly camera.

use glam::Vec2;
use std::collections::HashSet;

/// Manages input state for the current frame.
#[derive(Debug, Default)]
pub struct InputState {
    /// Keys currently held down.
    keys_held: HashSet<KeyCode>,
    /// Keys pressed this frame.
    keys_pressed: HashSet<KeyCode>,

    /// Mouse movement delta this frame.
    mouse_delta: Vec2,
    /// Accumulated mouse delta (for when cursor is locked).
    accumulated_delta: Vec2,

    /// Whether the cursor is captured/locked.
    cursor_locked: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear per-frame state. Call at the start of each frame.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.mouse_delta = self.accumulated_delta;
        self.accumulated_delta = Vec2::ZERO;
    }

    /// Process a keyboard event.
    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.keys_held.contains(&key) {
                    self.keys_pressed.insert(key);
                }
                self.keys_held.insert(key);
            }
            ElementState::Released => {
                self.keys_held.remove(&key);
            }
        }
    }

    /// Process raw mouse movement. Deltas accumulate until the next
    /// `begin_frame` so several device events within one frame are not
    /// lost.
    pub fn process_mouse_motion(&mut self, delta: (f64, f64)) {
        self.accumulated_delta.x += delta.0 as f32;
        self.accumulated_delta.y += delta.1 as f32;
    }

    /// Drop any motion gathered so far, without affecting keys. Used
    /// when the window loses focus so the camera does not snap on
    /// refocus.
    pub fn clear_mouse_motion(&mut self) {
        self.accumulated_delta = Vec2::ZERO;
        self.mouse_delta = Vec2::ZERO;
    }

    /// Check if a key is currently held.
    pub fn is_key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    /// Check if a key was pressed this frame.
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Get the mouse movement delta for this frame.
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    /// Check if the cursor is locked.
    pub fn is_cursor_locked(&self) -> bool {
        self.cursor_locked
    }

    /// Set cursor lock state.
    pub fn set_cursor_locked(&mut self, locked: bool) {
        self.cursor_locked = locked;
    }

    /// Get movement input as a normalized vector (WASD).
    pub fn get_movement_input(&self) -> Vec2 {
        let mut movement = Vec2::ZERO;

        if self.is_key_held(KeyCode::KeyW) {
            movement.y += 1.0;
        }
        if self.is_key_held(KeyCode::KeyS) {
            movement.y -= 1.0;
        }
        if self.is_key_held(KeyCode::KeyA) {
            movement.x -= 1.0;
        }
        if self.is_key_held(KeyCode::KeyD) {
            movement.x += 1.0;
        }

        if movement.length_squared() > 0.0 {
            movement = movement.normalize();
        }

        movement
    }

    /// Get vertical movement input (E rises, Q descends).
    pub fn get_vertical_input(&self) -> f32 {
        let mut vertical = 0.0;
        if self.is_key_held(KeyCode::KeyE) {
            vertical += 1.0;
        }
        if self.is_key_held(KeyCode::KeyQ) {
            vertical -= 1.0;
        }
        vertical
    }

    /// Check if quit was requested (Escape).
    pub fn is_quit_pressed(&self) -> bool {
        self.is_key_pressed(KeyCode::Escape)
    }
}

// Re-export for convenience
pub use winit::event::ElementState;
pub use winit::keyboard::KeyCode;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pressed_is_one_shot_but_held_persists() {
        let mut input = InputState::new();
        input.process_keyboard(KeyCode::KeyW, ElementState::Pressed);
        assert!(input.is_key_pressed(KeyCode::KeyW));
        assert!(input.is_key_held(KeyCode::KeyW));

        input.begin_frame();
        assert!(!input.is_key_pressed(KeyCode::KeyW));
        assert!(input.is_key_held(KeyCode::KeyW));

        input.process_keyboard(KeyCode::KeyW, ElementState::Released);
        assert!(!input.is_key_held(KeyCode::KeyW));
    }

    #[test]
    fn key_repeat_does_not_retrigger_pressed() {
        let mut input = InputState::new();
        input.process_keyboard(KeyCode::KeyE, ElementState::Pressed);
        input.begin_frame();
        // OS key repeat delivers another Pressed while still held.
        input.process_keyboard(KeyCode::KeyE, ElementState::Pressed);
        assert!(!input.is_key_pressed(KeyCode::KeyE));
    }

    #[test]
    fn diagonal_movement_is_normalized() {
        let mut input = InputState::new();
        input.process_keyboard(KeyCode::KeyW, ElementState::Pressed);
        input.process_keyboard(KeyCode::KeyD, ElementState::Pressed);
        let movement = input.get_movement_input();
        assert!((movement.length() - 1.0).abs() < 1e-6);
        assert!(movement.x > 0.0 && movement.y > 0.0);
    }

    #[test]
    fn opposing_vertical_keys_cancel() {
        let mut input = InputState::new();
        input.process_keyboard(KeyCode::KeyE, ElementState::Pressed);
        input.process_keyboard(KeyCode::KeyQ, ElementState::Pressed);
        assert_eq!(input.get_vertical_input(), 0.0);
    }

    #[test]
    fn mouse_motion_accumulates_until_begin_frame() {
        let mut input = InputState::new();
        input.process_mouse_motion((3.0, -1.0));
        input.process_mouse_motion((2.0, 4.0));
        assert_eq!(input.mouse_delta(), Vec2::ZERO);

        input.begin_frame();
        assert_eq!(input.mouse_delta(), Vec2::new(5.0, 3.0));

        input.begin_frame();
        assert_eq!(input.mouse_delta(), Vec2::ZERO);
    }

    #[test]
    fn clear_mouse_motion_discards_pending_delta() {
        let mut input = InputState::new();
        input.process_mouse_motion((10.0, 10.0));
        input.clear_mouse_motion();
        input.begin_frame();
        assert_eq!(input.mouse_delta(), Vec2::ZERO);
    }
}
