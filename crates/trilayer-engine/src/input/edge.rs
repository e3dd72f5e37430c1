/// Press-edge detector for one key.
///
/// Feed it the key's sampled level exactly once per frame. It reports `true`
/// only on the frame the key goes from released to pressed, so holding a key
/// for any number of frames fires once.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct KeyEdgeTracker {
    previous_pressed: bool,
}

impl KeyEdgeTracker {
    pub const fn new() -> Self {
        Self { previous_pressed: false }
    }

    /// Records this frame's level and returns whether a press edge occurred.
    #[inline]
    pub fn observe(&mut self, currently_pressed: bool) -> bool {
        let fired = currently_pressed && !self.previous_pressed;
        self.previous_pressed = currently_pressed;
        fired
    }
}
