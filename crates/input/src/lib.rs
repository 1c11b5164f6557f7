//! Keyboard input state and climbing key bindings.

use glam::Vec2;
use std::collections::HashSet;

/// Manages keyboard state for the current frame.
#[derive(Debug, Default)]
pub struct InputState {
    /// Keys currently held down.
    keys_held: HashSet<KeyCode>,
    /// Keys pressed this frame.
    keys_pressed: HashSet<KeyCode>,
    /// Keys released this frame.
    keys_released: HashSet<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear per-frame state. Call at the start of each frame.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
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
                self.keys_released.insert(key);
            }
        }
    }

    /// Check if a key is currently held.
    pub fn is_key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    /// Check if a key was pressed this frame.
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Check if a key was released this frame.
    pub fn is_key_released(&self, key: KeyCode) -> bool {
        self.keys_released.contains(&key)
    }

    /// Get movement input as a normalized vector (x = right, y = forward).
    pub fn get_movement_input(&self, bindings: &ClimbBindings) -> Vec2 {
        let mut movement = Vec2::ZERO;

        if self.is_key_held(bindings.forward) {
            movement.y += 1.0;
        }
        if self.is_key_held(bindings.back) {
            movement.y -= 1.0;
        }
        if self.is_key_held(bindings.left) {
            movement.x -= 1.0;
        }
        if self.is_key_held(bindings.right) {
            movement.x += 1.0;
        }

        if movement.length_squared() > 0.0 {
            movement = movement.normalize();
        }

        movement
    }

    /// Collect this frame's climbing commands.
    pub fn climb_commands(&self, bindings: &ClimbBindings) -> ClimbCommands {
        ClimbCommands {
            movement: self.get_movement_input(bindings),
            climb: self.is_key_pressed(bindings.climb),
            cancel: self.is_key_pressed(bindings.cancel),
            dash: self.is_key_pressed(bindings.dash),
        }
    }
}

/// Key assignments for a climbing character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClimbBindings {
    pub forward: KeyCode,
    pub back: KeyCode,
    pub left: KeyCode,
    pub right: KeyCode,
    pub climb: KeyCode,
    pub cancel: KeyCode,
    pub dash: KeyCode,
}

impl Default for ClimbBindings {
    fn default() -> Self {
        Self {
            forward: KeyCode::KeyW,
            back: KeyCode::KeyS,
            left: KeyCode::KeyA,
            right: KeyCode::KeyD,
            climb: KeyCode::Space,
            cancel: KeyCode::KeyC,
            dash: KeyCode::ShiftLeft,
        }
    }
}

/// One frame worth of character intents.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClimbCommands {
    /// Movement input (x = right, y = forward / surface up).
    pub movement: Vec2,
    /// Climb was pressed this frame.
    pub climb: bool,
    /// Cancel-climb was pressed this frame.
    pub cancel: bool,
    /// Dash was pressed this frame.
    pub dash: bool,
}

// Re-export for convenience
pub use winit::event::ElementState;
pub use winit::keyboard::KeyCode;
