//! A bearing mounted in a machine.

use rand::Rng;

use super::sampler::BoundedRandomVector;
use crate::config::HealthThresholds;
use crate::types::{BearingPosition, BearingState, HealthStatus};

/// Stateful wrapper around the current [`BearingState`] of one mounting
/// position. The index (and so the position) never changes; the state is
/// only ever replaced whole.
#[derive(Debug, Clone, PartialEq)]
pub struct Bearing {
    index: usize,
    state: BearingState,
}

impl Bearing {
    pub const fn new(index: usize, state: BearingState) -> Self {
        Self { index, state }
    }

    /// New bearing with a freshly sampled healthy state.
    pub fn install<R: Rng + ?Sized>(index: usize, sampler: &BoundedRandomVector, rng: &mut R) -> Self {
        Self::new(index, sampler.sample(rng))
    }

    pub const fn index(&self) -> usize {
        self.index
    }

    pub const fn position(&self) -> BearingPosition {
        BearingPosition::from_index(self.index)
    }

    pub const fn state(&self) -> &BearingState {
        &self.state
    }

    pub const fn rul(&self) -> f64 {
        self.state.rul()
    }

    /// `1 − rul`. Negative once RUL exceeds 1.
    pub fn health_fraction(&self) -> f64 {
        1.0 - self.rul()
    }

    /// `(1 − rul) × 100`, floored at 0.
    pub fn health_percentage(&self) -> f64 {
        (self.health_fraction() * 100.0).max(0.0)
    }

    /// Band of the current RUL under the floor's thresholds.
    pub fn classify(&self, thresholds: &HealthThresholds) -> HealthStatus {
        HealthStatus::classify(self.rul(), thresholds)
    }

    /// Replace the whole state, RUL included.
    pub fn update(&mut self, next: BearingState) {
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NUM_FEATURES;

    fn with_rul(rul: f64) -> Bearing {
        Bearing::new(1, BearingState::fresh([0.1; NUM_FEATURES]).with_rul(rul))
    }

    #[test]
    fn health_percentage_clamps_at_zero() {
        assert!((with_rul(0.25).health_percentage() - 75.0).abs() < 1e-9);
        assert_eq!(with_rul(1.3).health_percentage(), 0.0);
        assert!(with_rul(1.3).health_fraction() < 0.0);
        assert_eq!(with_rul(0.0).health_percentage(), 100.0);
    }

    #[test]
    fn update_replaces_state_and_keeps_index() {
        let mut bearing = with_rul(0.1);
        let next = BearingState::new([0.2; NUM_FEATURES], 15_000.0, 0.75);
        bearing.update(next.clone());
        assert_eq!(bearing.state(), &next);
        assert_eq!(bearing.index(), 1);
        assert_eq!(bearing.position(), BearingPosition::SpindleRear);
        assert_eq!(bearing.classify(&HealthThresholds::default()), HealthStatus::Warning);
    }

    #[test]
    fn classify_honours_custom_thresholds() {
        let thresholds = HealthThresholds {
            failure_rul: 0.8,
            critical_rul: 0.75,
            ..HealthThresholds::default()
        };
        assert_eq!(with_rul(0.8).classify(&thresholds), HealthStatus::Failed);
        assert_eq!(with_rul(0.8).classify(&HealthThresholds::default()), HealthStatus::Warning);
    }
}
