use std::collections::HashSet;

use super::types::{InputEvent, Key, KeyState};

/// Keys currently held on the window.
///
/// Answers "is this key held right now"; press edges are derived from these
/// levels by `KeyEdgeTracker`.
#[derive(Debug, Default)]
pub struct InputState {
    keys_down: HashSet<Key>,
}

impl InputState {
    /// Applies a platform-agnostic input event.
    pub fn apply_event(&mut self, ev: InputEvent) {
        match ev {
            // Release events are not delivered while unfocused; forget held
            // keys so none stay stuck down.
            InputEvent::Focused(false) => self.keys_down.clear(),
            InputEvent::Focused(true) => {}

            InputEvent::Key { key, state: KeyState::Pressed } => {
                self.keys_down.insert(key);
            }
            InputEvent::Key { key, state: KeyState::Released } => {
                self.keys_down.remove(&key);
            }
        }
    }

    /// Level query: is `key` held at this moment.
    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }
}
