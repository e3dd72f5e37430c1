//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! The runtime translates platform events into `InputEvent`s (see `platform`)
//! and `InputState` tracks held keys. `KeyEdgeTracker` turns sampled key
//! levels into one-shot presses.

mod edge;
pub(crate) mod platform;
mod state;
mod types;

pub use edge::KeyEdgeTracker;
pub use state::InputState;
pub use types::{InputEvent, Key, KeyState};
