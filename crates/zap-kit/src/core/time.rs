/// Default cap on fixed steps run for a single frame.
pub const DEFAULT_MAX_STEPS: u32 = 10;

/// Default seconds per fixed tick.
pub const DEFAULT_DT: f32 = 1.0 / 60.0;

/// Shortest accepted fixed tick, in seconds.
pub const MIN_DT: f32 = 1.0e-4;

/// Turns variable frame time into a whole number of fixed ticks.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    /// Seconds per fixed tick.
    dt: f32,
    /// Frame time not yet consumed by a tick.
    accumulator: f32,
    max_steps: u32,
    /// Ticks handed out since creation.
    ticks: u64,
}

impl FixedTimestep {
    pub fn new(dt: f32) -> Self {
        Self::with_max_steps(dt, DEFAULT_MAX_STEPS)
    }

    /// Non-finite `dt` falls back to `DEFAULT_DT`; anything shorter than `MIN_DT` is raised to it.
    pub fn with_max_steps(dt: f32, max_steps: u32) -> Self {
        let clamped = if dt.is_finite() { dt.max(MIN_DT) } else { DEFAULT_DT };
        if clamped != dt {
            log::warn!("fixed dt {} out of range, using {}", dt, clamped);
        }
        Self {
            dt: clamped,
            accumulator: 0.0,
            max_steps: max_steps.max(1),
            ticks: 0,
        }
    }

    /// Feed one frame's elapsed time. Returns how many fixed ticks to run now.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        if frame_dt.is_finite() && frame_dt > 0.0 {
            self.accumulator += frame_dt;
        }
        // Drop the backlog past the cap instead of trying to catch up
        let cap = self.dt * self.max_steps as f32;
        if self.accumulator > cap {
            log::warn!(
                "frame backlog {:.3}s exceeds {} fixed steps, dropping excess",
                self.accumulator,
                self.max_steps
            );
            self.accumulator = cap;
        }
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f32 * self.dt;
        self.ticks += steps as u64;
        steps
    }

    /// How far the accumulator is into the next tick, in [0, 1).
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.dt
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_frame_is_one_tick() {
        let mut ts = FixedTimestep::new(1.0 / 50.0);
        assert_eq!(ts.accumulate(1.0 / 50.0), 1);
        assert_eq!(ts.ticks(), 1);
    }

    #[test]
    fn partial_frames_carry_over() {
        let mut ts = FixedTimestep::new(1.0 / 60.0);
        assert_eq!(ts.accumulate(0.008), 0);
        assert_eq!(ts.accumulate(0.010), 1);
        let a = ts.alpha();
        assert!(a >= 0.0 && a < 1.0, "alpha was {}", a);
    }

    #[test]
    fn long_frame_is_capped() {
        let mut ts = FixedTimestep::with_max_steps(1.0 / 60.0, 4);
        assert_eq!(ts.accumulate(1.0), 4);
        assert_eq!(ts.accumulate(0.0), 0);
    }

    #[test]
    fn degenerate_dt_is_clamped() {
        let mut negative = FixedTimestep::new(-0.02);
        assert_eq!(negative.dt(), MIN_DT);
        assert_eq!(negative.accumulate(0.0), 0);

        let zero = FixedTimestep::new(0.0);
        assert_eq!(zero.alpha(), 0.0);

        let nan = FixedTimestep::new(f32::NAN);
        assert_eq!(nan.dt(), DEFAULT_DT);
        let inf = FixedTimestep::new(f32::INFINITY);
        assert_eq!(inf.dt(), DEFAULT_DT);
    }

    #[test]
    fn negative_and_nan_frames_are_ignored() {
        let mut ts = FixedTimestep::new(0.02);
        assert_eq!(ts.accumulate(-1.0), 0);
        assert_eq!(ts.accumulate(f32::NAN), 0);
        assert_eq!(ts.alpha(), 0.0);
    }
}
