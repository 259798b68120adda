/// Largest wall-clock delta fed into the accumulator in one frame, in seconds.
pub const MAX_FRAME_DELTA: f64 = 0.2;

/// Fixed-timestep accumulator.
///
/// Each frame the wall-clock delta (clamped to [`MAX_FRAME_DELTA`]) is added
/// to the accumulator and whole timesteps are drained from it. Every tick
/// advances the simulation by exactly `timestep`; leftover time carries over
/// to the next frame.
#[derive(Debug, Clone)]
pub struct FixedStepper {
    timestep: f64,
    accumulator: f64,
}

impl FixedStepper {
    pub fn new(timestep: f64) -> Self {
        debug_assert!(timestep > 0.0, "timestep must be positive");
        Self {
            timestep,
            accumulator: 0.0,
        }
    }

    #[inline]
    pub fn timestep(&self) -> f64 {
        self.timestep
    }

    #[inline]
    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    /// Switches to a new timestep and drops any accumulated time.
    pub fn reset(&mut self, timestep: f64) {
        debug_assert!(timestep > 0.0, "timestep must be positive");
        self.timestep = timestep;
        self.accumulator = 0.0;
    }

    /// Feeds `dt` seconds of wall time and calls `tick(timestep)` once per
    /// whole step. Returns the number of ticks run.
    pub fn advance<F>(&mut self, dt: f64, mut tick: F) -> u32
    where
        F: FnMut(f64),
    {
        let dt = dt.clamp(0.0, MAX_FRAME_DELTA);
        let mut ticks = 0;

        self.accumulator += dt;
        while self.accumulator > self.timestep {
            tick(self.timestep);
            self.accumulator -= self.timestep;
            ticks += 1;
        }

        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // ── tick size ─────────────────────────────────────────────────────────

    #[test]
    fn every_tick_is_exactly_one_timestep() {
        let mut stepper = FixedStepper::new(1.0 / 60.0);
        let mut seen = Vec::new();
        for dt in [0.001, 0.05, 0.016, 0.19, 0.0] {
            stepper.advance(dt, |step| seen.push(step));
        }
        assert!(!seen.is_empty());
        assert!(seen.iter().all(|&s| s == 1.0 / 60.0));
    }

    #[test]
    fn accumulator_stays_below_one_step_after_advance() {
        let mut stepper = FixedStepper::new(1.0 / 120.0);
        for _ in 0..50 {
            stepper.advance(0.037, |_| {});
            assert!(stepper.accumulator() <= stepper.timestep());
            assert!(stepper.accumulator() >= 0.0);
        }
    }

    // ── clamping ──────────────────────────────────────────────────────────

    #[test]
    fn long_stall_is_clamped_to_max_frame_delta() {
        let mut stepper = FixedStepper::new(0.01);
        let mut simulated = 0.0;
        stepper.advance(5.0, |step| simulated += step);
        // 0.2s of wall time at most, so at most 20 ticks of 0.01s.
        assert!(simulated <= MAX_FRAME_DELTA + 1e-9);
        assert_relative_eq!(simulated + stepper.accumulator(), MAX_FRAME_DELTA, epsilon = 1e-9);
    }

    #[test]
    fn negative_delta_runs_no_ticks() {
        let mut stepper = FixedStepper::new(0.01);
        assert_eq!(stepper.advance(-1.0, |_| panic!("no tick expected")), 0);
    }

    #[test]
    fn exact_multiple_keeps_one_step_pending() {
        // The loop runs while the accumulator is strictly greater than a step.
        let mut stepper = FixedStepper::new(0.25);
        assert_eq!(stepper.advance(0.125, |_| {}), 0);
        assert_eq!(stepper.advance(0.125, |_| {}), 0);
        assert_eq!(stepper.advance(0.125, |_| {}), 1);
    }

    #[test]
    fn reset_drops_accumulated_time() {
        let mut stepper = FixedStepper::new(0.1);
        stepper.advance(0.05, |_| {});
        stepper.reset(0.02);
        assert_eq!(stepper.accumulator(), 0.0);
        assert_eq!(stepper.timestep(), 0.02);
    }
}
