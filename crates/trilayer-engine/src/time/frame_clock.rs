use std::time::Instant;

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the clock was created.
    ///
    /// The runtime creates its clock when `Runtime::run` starts, so this is
    /// time since program start. Drives closed-form animation, so trajectories
    /// depend only on wall-clock time and not on frame pacing.
    pub elapsed: f32,
}

/// Monotonic clock producing `FrameTime` snapshots.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
}

impl FrameClock {
    /// Starts the clock now.
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }

    /// Samples the clock for the frame about to be drawn.
    pub fn tick(&self) -> FrameTime {
        FrameTime {
            elapsed: self.start.elapsed().as_secs_f32(),
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
