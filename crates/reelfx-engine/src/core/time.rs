/// Fixed-step preview clock.
/// Frame deltas from the host are chopped into equal steps so effect timing
/// (stagger offsets, deadlines, shake cadence) does not depend on frame rate.
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// The fixed delta time per step.
    dt: f32,
    /// Frame time not yet consumed by a whole step.
    accumulator: f32,
    /// Simulated seconds since the clock started.
    now: f32,
    /// Steps taken since `origin`.
    steps: u64,
    /// Time at which the current step size took effect.
    origin: f32,
}

impl FrameClock {
    /// Frames longer than this many steps are truncated (e.g. a hidden tab
    /// resuming after seconds of inactivity).
    pub const MAX_STEPS_PER_FRAME: u32 = 10;

    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            accumulator: 0.0,
            now: 0.0,
            steps: 0,
            origin: 0.0,
        }
    }

    /// Switch to a new step size without moving `now`. Pending frame time
    /// is dropped.
    pub fn retime(&mut self, dt: f32) {
        self.origin = self.now;
        self.steps = 0;
        self.accumulator = 0.0;
        self.dt = dt;
    }

    /// Add frame time. Returns the number of fixed steps to run; `now`
    /// advances by one `dt` per step when [`FrameClock::step`] is called.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        if !frame_dt.is_finite() || frame_dt <= 0.0 {
            return 0;
        }
        self.accumulator += frame_dt;
        self.accumulator = self.accumulator.min(self.dt * Self::MAX_STEPS_PER_FRAME as f32);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f32 * self.dt;
        steps
    }

    /// Advance `now` by one fixed step and return the new time.
    pub fn step(&mut self) -> f32 {
        self.steps += 1;
        // Derived from the step count so long sessions do not accumulate error.
        self.now = self.origin + self.steps as f32 * self.dt;
        self.now
    }

    /// The fixed delta time.
    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Simulated seconds elapsed.
    pub fn now(&self) -> f32 {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_step_exact() {
        let mut clock = FrameClock::new(1.0 / 60.0);
        assert_eq!(clock.accumulate(1.0 / 60.0), 1);
    }

    #[test]
    fn accumulates_partial() {
        let mut clock = FrameClock::new(1.0 / 60.0);
        assert_eq!(clock.accumulate(0.008), 0);
        assert_eq!(clock.accumulate(0.010), 1);
    }

    #[test]
    fn caps_long_frames() {
        let mut clock = FrameClock::new(1.0 / 60.0);
        assert_eq!(clock.accumulate(1.0), FrameClock::MAX_STEPS_PER_FRAME);
    }

    #[test]
    fn ignores_bad_deltas() {
        let mut clock = FrameClock::new(0.01);
        assert_eq!(clock.accumulate(-1.0), 0);
        assert_eq!(clock.accumulate(f32::NAN), 0);
    }

    #[test]
    fn now_tracks_steps() {
        let mut clock = FrameClock::new(0.25);
        for _ in 0..8 {
            clock.step();
        }
        assert_eq!(clock.now(), 2.0);
    }

    #[test]
    fn retime_keeps_now() {
        let mut clock = FrameClock::new(0.5);
        let steps = clock.accumulate(1.0);
        for _ in 0..steps {
            clock.step();
        }
        assert_eq!(clock.now(), 1.0);
        clock.retime(0.25);
        assert_eq!(clock.now(), 1.0);
        assert_eq!(clock.accumulate(0.5), 2);
        clock.step();
        assert_eq!(clock.step(), 1.5);
    }
}
