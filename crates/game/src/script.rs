//! Timed key events that stand in for a player at the keyboard.

use input::{ClimbBindings, ElementState, InputState, KeyCode};
use serde::{Deserialize, Serialize};

/// A bound action, resolved to a key through [`ClimbBindings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptAction {
    Forward,
    Back,
    Left,
    Right,
    Climb,
    Cancel,
    Dash,
}

impl ScriptAction {
    pub fn key(self, bindings: &ClimbBindings) -> KeyCode {
        match self {
            ScriptAction::Forward => bindings.forward,
            ScriptAction::Back => bindings.back,
            ScriptAction::Left => bindings.left,
            ScriptAction::Right => bindings.right,
            ScriptAction::Climb => bindings.climb,
            ScriptAction::Cancel => bindings.cancel,
            ScriptAction::Dash => bindings.dash,
        }
    }
}

/// Press or release of an action at a point in sandbox time (seconds).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScriptEvent {
    pub at: f32,
    pub action: ScriptAction,
    #[serde(default = "default_pressed")]
    pub pressed: bool,
}

fn default_pressed() -> bool {
    true
}

impl ScriptEvent {
    pub fn press(at: f32, action: ScriptAction) -> Self {
        Self {
            at,
            action,
            pressed: true,
        }
    }

    pub fn release(at: f32, action: ScriptAction) -> Self {
        Self {
            at,
            action,
            pressed: false,
        }
    }

    /// Press and release in the same frame.
    pub fn tap(at: f32, action: ScriptAction) -> [Self; 2] {
        [Self::press(at, action), Self::release(at, action)]
    }

    /// Hold from `from` until `until`.
    pub fn hold(from: f32, until: f32, action: ScriptAction) -> [Self; 2] {
        [Self::press(from, action), Self::release(until, action)]
    }
}

/// Replays a list of events into an [`InputState`] as time passes.
#[derive(Debug, Clone, Default)]
pub struct InputScript {
    events: Vec<ScriptEvent>,
    next: usize,
}

impl InputScript {
    pub fn new(mut events: Vec<ScriptEvent>) -> Self {
        // Stable sort keeps a tap's press ahead of its release.
        events.sort_by(|a, b| a.at.total_cmp(&b.at));
        Self { events, next: 0 }
    }

    pub fn is_finished(&self) -> bool {
        self.next >= self.events.len()
    }

    /// Feed every event due by `time` and return how many were fed.
    pub fn feed(&mut self, time: f32, input: &mut InputState, bindings: &ClimbBindings) -> usize {
        let start = self.next;
        while let Some(event) = self.events.get(self.next).filter(|event| event.at <= time) {
            let state = if event.pressed {
                ElementState::Pressed
            } else {
                ElementState::Released
            };
            input.process_keyboard(event.action.key(bindings), state);
            self.next += 1;
        }
        self.next - start
    }
}
