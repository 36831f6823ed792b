//! Fixed-step simulation clock.
//!
//! Converts an irregular stream of real elapsed seconds into discrete logical
//! iterations. Real deltas are scaled by the time multiplier and added to an
//! accumulator; every time the accumulator holds a full iteration's worth of
//! simulated seconds one tick fires and exactly that amount is subtracted, so
//! leftover progress is carried forward without loss.

use crate::config::defaults;

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationClock {
    seconds_per_iteration: f64,
    time_multiplier: f64,
    accumulator_seconds: f64,
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new(defaults::SECONDS_PER_ITERATION)
    }
}

impl SimulationClock {
    /// Clock with the given iteration length. Non-positive or non-finite
    /// lengths fall back to the design value.
    pub fn new(seconds_per_iteration: f64) -> Self {
        let seconds_per_iteration = if seconds_per_iteration.is_finite() && seconds_per_iteration > 0.0 {
            seconds_per_iteration
        } else {
            defaults::SECONDS_PER_ITERATION
        };
        Self {
            seconds_per_iteration,
            time_multiplier: defaults::DEFAULT_TIME_MULTIPLIER,
            accumulator_seconds: 0.0,
        }
    }

    /// Accumulate `real_delta_seconds × multiplier` and report whether one
    /// iteration is due.
    ///
    /// At most one tick fires per call. A delta worth several iterations
    /// leaves the surplus in the accumulator, where subsequent calls (even
    /// with a zero delta) pick it up. Negative deltas, and deltas whose scaled
    /// value is not finite, count as 0.
    pub fn should_tick(&mut self, real_delta_seconds: f64) -> bool {
        self.accumulate(real_delta_seconds);
        self.consume_tick()
    }

    /// Add scaled real time without consuming a tick.
    pub fn accumulate(&mut self, real_delta_seconds: f64) {
        let scaled = real_delta_seconds * self.time_multiplier;
        if real_delta_seconds > 0.0 && scaled.is_finite() {
            self.accumulator_seconds += scaled;
        }
    }

    /// Consume one iteration from the accumulator if available.
    pub fn consume_tick(&mut self) -> bool {
        if self.accumulator_seconds >= self.seconds_per_iteration {
            self.accumulator_seconds -= self.seconds_per_iteration;
            true
        } else {
            false
        }
    }

    /// Fraction of the next iteration accumulated so far. Exceeds 1.0 while
    /// a backlog is pending.
    pub fn progress_to_next_tick(&self) -> f64 {
        self.accumulator_seconds / self.seconds_per_iteration
    }

    pub const fn accumulated_seconds(&self) -> f64 {
        self.accumulator_seconds
    }

    pub const fn time_multiplier(&self) -> f64 {
        self.time_multiplier
    }

    pub const fn seconds_per_iteration(&self) -> f64 {
        self.seconds_per_iteration
    }

    /// Set the multiplier, clamped to >= 0. NaN becomes 0.
    pub fn set_time_multiplier(&mut self, multiplier: f64) {
        self.time_multiplier = if multiplier.is_nan() { 0.0 } else { multiplier.max(0.0) };
    }

    /// Back to an empty accumulator and the default multiplier.
    pub fn reset(&mut self) {
        self.accumulator_seconds = 0.0;
        self.time_multiplier = defaults::DEFAULT_TIME_MULTIPLIER;
    }
}
