/// Turns host frame timestamps into clamped deltas.
///
/// The first timestamp seen only primes the clock. Going backwards in time
/// yields a zero delta.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_ms: Option<f64>,
    max_delta_ms: f64,
}

impl FrameClock {
    pub fn new(max_delta_ms: f64) -> Self {
        Self {
            last_ms: None,
            max_delta_ms: max_delta_ms.max(0.0),
        }
    }

    /// Record `now_ms` and return the elapsed milliseconds since the last
    /// call, clamped to `[0, max_delta_ms]`.
    pub fn tick(&mut self, now_ms: f64) -> f64 {
        let delta = match self.last_ms {
            Some(last) => now_ms - last,
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        if delta.is_finite() {
            delta.clamp(0.0, self.max_delta_ms)
        } else {
            0.0
        }
    }

    /// Timestamp of the previous tick.
    pub fn last(&self) -> Option<f64> {
        self.last_ms
    }

}

/// Fixed timestep accumulator.
/// Keeps the physics step length constant whatever the frame time.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    /// Seconds per step.
    dt: f32,
    /// Seconds not yet consumed by a step.
    accumulator: f32,
}

impl FixedTimestep {
    /// Most steps a single frame may run.
    pub const MAX_STEPS: u32 = 10;

    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            accumulator: 0.0,
        }
    }

    /// Add frame time in seconds. Returns the number of steps to run now.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.max(0.0);
        self.accumulator = self.accumulator.min(self.dt * Self::MAX_STEPS as f32);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f32 * self.dt;
        steps
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
