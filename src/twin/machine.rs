//! CNC Machine
//!
//! A machine owns 2 or 4 bearings and a small power/failure state machine:
//!
//! ```text
//!   Off ──turn_on──▶ Running ──bearing RUL ≥ failure──▶ Failed (forced off)
//!    ▲                  │                                  │
//!    └────turn_off──────┘          replace failed bearing  │
//!    ◀─────────────────────────────────────────────────────┘
//! ```
//!
//! A failed machine refuses power-on until the failed bearing is replaced.
//! Replacing it clears the failure but leaves the machine off.

use rand::seq::SliceRandom;
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

use super::bearing::Bearing;
use super::error::TwinError;
use super::sampler::BoundedRandomVector;
use crate::config::defaults;
use crate::predictors::{DegradationPredictor, RulPredictor};
use crate::types::{BearingState, MachineStatus};

static NEXT_MACHINE_ID: AtomicU64 = AtomicU64::new(1);

// ============================================================================
// Identity
// ============================================================================

/// Unique machine identifier. Never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MachineId(u64);

impl MachineId {
    fn next() -> Self {
        Self(NEXT_MACHINE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Parse the `CNC-0007` display form or a bare number.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let digits = text
            .strip_prefix("CNC-")
            .or_else(|| text.strip_prefix("cnc-"))
            .unwrap_or(text);
        digits.parse().ok().map(Self)
    }
}

impl std::fmt::Display for MachineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CNC-{:04}", self.0)
    }
}

// ============================================================================
// Tick Parameters
// ============================================================================

/// Per-iteration inputs shared by every machine in a sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickParams {
    pub revolutions_step: f64,
    pub failure_rul: f64,
}

impl Default for TickParams {
    fn default() -> Self {
        Self {
            revolutions_step: defaults::REVOLUTIONS_PER_ITERATION,
            failure_rul: defaults::FAILURE_RUL,
        }
    }
}

// ============================================================================
// Machine
// ============================================================================

#[derive(Debug, Clone)]
pub struct Machine {
    id: MachineId,
    model: String,
    bearings: Vec<Bearing>,
    is_on: bool,
    /// `Some` exactly while the machine is failed.
    failed_bearing: Option<usize>,
}

impl Machine {
    /// New machine, off and healthy. A missing model name picks one from the
    /// catalogue; the bearing count is 2 or 4 at random.
    pub fn new<R: Rng + ?Sized>(model: Option<&str>, sampler: &BoundedRandomVector, rng: &mut R) -> Self {
        let model = match model {
            Some(name) => name.to_string(),
            None => Self::random_model(rng),
        };
        let count = defaults::BEARING_COUNTS
            .choose(rng)
            .copied()
            .unwrap_or(defaults::BEARING_COUNTS[0]);
        Self::build(model, count, sampler, rng)
    }

    /// A catalogue model name.
    pub fn random_model<R: Rng + ?Sized>(rng: &mut R) -> String {
        defaults::MACHINE_MODELS
            .choose(rng)
            .copied()
            .unwrap_or(defaults::MACHINE_MODELS[0])
            .to_string()
    }

    /// New machine with an explicit bearing count (2 or 4).
    pub fn with_bearing_count<R: Rng + ?Sized>(
        model: impl Into<String>,
        count: usize,
        sampler: &BoundedRandomVector,
        rng: &mut R,
    ) -> Result<Self, TwinError> {
        Self::check_count(count)?;
        Ok(Self::build(model.into(), count, sampler, rng))
    }

    /// Machine from explicit bearing states, index order.
    pub fn from_states(model: impl Into<String>, states: Vec<BearingState>) -> Result<Self, TwinError> {
        Self::check_count(states.len())?;
        let bearings = states
            .into_iter()
            .enumerate()
            .map(|(index, state)| Bearing::new(index, state))
            .collect();
        Ok(Self::assemble(model.into(), bearings))
    }

    fn check_count(count: usize) -> Result<(), TwinError> {
        if defaults::BEARING_COUNTS.contains(&count) {
            Ok(())
        } else {
            Err(TwinError::InvalidBearingCount(count))
        }
    }

    fn build<R: Rng + ?Sized>(model: String, count: usize, sampler: &BoundedRandomVector, rng: &mut R) -> Self {
        let bearings = (0..count).map(|index| Bearing::install(index, sampler, rng)).collect();
        Self::assemble(model, bearings)
    }

    fn assemble(model: String, bearings: Vec<Bearing>) -> Self {
        let machine = Self {
            id: MachineId::next(),
            model,
            bearings,
            is_on: false,
            failed_bearing: None,
        };
        debug!(machine = %machine.id, model = %machine.model, bearings = machine.bearings.len(), "Machine created");
        machine
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub const fn id(&self) -> MachineId {
        self.id
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn bearings(&self) -> &[Bearing] {
        &self.bearings
    }

    pub fn bearing(&self, index: usize) -> Option<&Bearing> {
        self.bearings.get(index)
    }

    pub fn bearing_count(&self) -> usize {
        self.bearings.len()
    }

    pub const fn is_on(&self) -> bool {
        self.is_on
    }

    pub const fn has_failed(&self) -> bool {
        self.failed_bearing.is_some()
    }

    pub const fn failed_bearing_index(&self) -> Option<usize> {
        self.failed_bearing
    }

    /// On and not failed: eligible for ticking.
    pub const fn is_operational(&self) -> bool {
        self.is_on && !self.has_failed()
    }

    pub const fn status(&self) -> MachineStatus {
        if self.has_failed() {
            MachineStatus::Failed
        } else if self.is_on {
            MachineStatus::Running
        } else {
            MachineStatus::Off
        }
    }

    /// `1 − rul` of the most degraded bearing.
    pub fn lowest_health_fraction(&self) -> f64 {
        self.most_degraded_bearing()
            .map_or(1.0, Bearing::health_fraction)
    }

    /// Health percentage of the most degraded bearing.
    pub fn lowest_health_percentage(&self) -> f64 {
        self.most_degraded_bearing()
            .map_or(100.0, Bearing::health_percentage)
    }

    /// Bearing with the highest RUL; the first one wins ties.
    pub fn most_degraded_bearing(&self) -> Option<&Bearing> {
        self.bearings.iter().fold(None, |worst: Option<&Bearing>, bearing| match worst {
            Some(w) if w.rul() >= bearing.rul() => Some(w),
            _ => Some(bearing),
        })
    }

    // ------------------------------------------------------------------------
    // Power
    // ------------------------------------------------------------------------

    /// Power on. Refused (returns false) while failed.
    pub fn turn_on(&mut self) -> bool {
        if self.has_failed() {
            warn!(machine = %self.id, "Power-on refused: machine has a failed bearing");
            return false;
        }
        self.is_on = true;
        true
    }

    pub fn turn_off(&mut self) {
        self.is_on = false;
    }

    /// Flip power. Returns the resulting on/off state.
    pub fn toggle_power(&mut self) -> bool {
        if self.is_on {
            self.turn_off();
        } else {
            self.turn_on();
        }
        self.is_on
    }

    // ------------------------------------------------------------------------
    // Ticking
    // ------------------------------------------------------------------------

    /// Advance every bearing one iteration, in index order.
    ///
    /// Stops at the first bearing whose new RUL reaches `failure_rul`: that
    /// bearing keeps its new state, the machine fails and powers off, and
    /// later bearings are left untouched. Returns the failed index, if any.
    ///
    /// Non-operational machines are not advanced. A predictor error aborts
    /// the tick; bearings already advanced keep their new state.
    pub fn tick(
        &mut self,
        degradation: &dyn DegradationPredictor,
        rul: &dyn RulPredictor,
        params: TickParams,
    ) -> Result<Option<usize>, TwinError> {
        if !self.is_operational() {
            return Ok(None);
        }
        for index in 0..self.bearings.len() {
            let next = self.predict_bearing(index, degradation, rul, params)?;
            if let Some(failed) = self.apply(index, next, params.failure_rul) {
                return Ok(Some(failed));
            }
        }
        Ok(None)
    }

    /// Every bearing's next state, computed on the rayon pool without
    /// touching the machine. Empty for a non-operational machine.
    pub(crate) fn predict_tick(
        &self,
        degradation: &dyn DegradationPredictor,
        rul: &dyn RulPredictor,
        params: TickParams,
    ) -> Vec<Result<BearingState, TwinError>> {
        if !self.is_operational() {
            return Vec::new();
        }
        (0..self.bearings.len())
            .into_par_iter()
            .map(|index| self.predict_bearing(index, degradation, rul, params))
            .collect()
    }

    /// Apply predictions from [`Machine::predict_tick`] in index order,
    /// stopping at the first failure or error exactly as [`Machine::tick`]
    /// would.
    pub(crate) fn apply_tick(
        &mut self,
        predictions: Vec<Result<BearingState, TwinError>>,
        failure_rul: f64,
    ) -> Result<Option<usize>, TwinError> {
        for (index, prediction) in predictions.into_iter().enumerate() {
            if let Some(failed) = self.apply(index, prediction?, failure_rul) {
                return Ok(Some(failed));
            }
        }
        Ok(None)
    }

    fn predict_bearing(
        &self,
        index: usize,
        degradation: &dyn DegradationPredictor,
        rul: &dyn RulPredictor,
        params: TickParams,
    ) -> Result<BearingState, TwinError> {
        let prediction_error = |source| TwinError::Prediction {
            machine: self.id,
            bearing: index,
            source,
        };
        let current = self.bearings[index].state();
        let expected = current.revolutions() + params.revolutions_step;

        let mut next = degradation
            .predict_next(current, params.revolutions_step)
            .map_err(prediction_error)?;
        if (next.revolutions() - expected).abs() > 1e-9 * expected.max(1.0) {
            warn!(
                machine = %self.id,
                bearing = index,
                predicted = next.revolutions(),
                expected,
                "Degradation predictor returned unexpected revolutions, correcting"
            );
            next = next.with_revolutions(expected);
        }

        let estimate = rul.predict_rul(&next).map_err(prediction_error)?;
        Ok(next.with_rul(estimate))
    }

    /// Store a prediction; fail the machine if it crossed the threshold.
    fn apply(&mut self, index: usize, next: BearingState, failure_rul: f64) -> Option<usize> {
        let rul = next.rul();
        self.bearings[index].update(next);
        if rul >= failure_rul {
            self.failed_bearing = Some(index);
            self.is_on = false;
            warn!(
                machine = %self.id,
                model = %self.model,
                bearing = index,
                position = %self.bearings[index].position(),
                rul,
                "Bearing failure, machine stopped"
            );
            Some(index)
        } else {
            None
        }
    }

    // ------------------------------------------------------------------------
    // Maintenance
    // ------------------------------------------------------------------------

    /// Swap in a freshly sampled bearing at `index`.
    ///
    /// Replacing the failed bearing clears the failure. The machine stays off
    /// either way.
    pub fn replace_bearing<R: Rng + ?Sized>(
        &mut self,
        index: usize,
        sampler: &BoundedRandomVector,
        rng: &mut R,
    ) -> Result<(), TwinError> {
        if index >= self.bearings.len() {
            return Err(TwinError::BearingIndexOutOfRange {
                index,
                count: self.bearings.len(),
            });
        }
        self.bearings[index] = Bearing::install(index, sampler, rng);
        if self.failed_bearing == Some(index) {
            self.failed_bearing = None;
            info!(machine = %self.id, bearing = index, "Failed bearing replaced, machine ready for power-on");
        } else {
            info!(machine = %self.id, bearing = index, "Bearing replaced");
        }
        Ok(())
    }

    /// Replace every bearing. Always clears a failure.
    pub fn replace_all_bearings<R: Rng + ?Sized>(&mut self, sampler: &BoundedRandomVector, rng: &mut R) {
        for bearing in &mut self.bearings {
            *bearing = Bearing::install(bearing.index(), sampler, rng);
        }
        self.failed_bearing = None;
        info!(machine = %self.id, bearings = self.bearings.len(), "All bearings replaced");
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::predictors::PredictorError;
    use crate::types::NUM_FEATURES;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Degradation that only advances revolutions.
    pub struct Hold;

    impl DegradationPredictor for Hold {
        fn predict_next(&self, current: &BearingState, step: f64) -> Result<BearingState, PredictorError> {
            Ok(current.with_revolutions(current.revolutions() + step))
        }
    }

    /// RUL read straight from the first feature slot.
    pub struct FirstFeature;

    impl RulPredictor for FirstFeature {
        fn predict_rul(&self, state: &BearingState) -> Result<f64, PredictorError> {
            Ok(state.features()[0])
        }
    }

    /// Degradation that fails on a chosen feature value.
    struct FailOn(f64);

    impl DegradationPredictor for FailOn {
        fn predict_next(&self, current: &BearingState, step: f64) -> Result<BearingState, PredictorError> {
            if current.features()[0] == self.0 {
                Err(PredictorError::NonFinite("RMS"))
            } else {
                Hold.predict_next(current, step)
            }
        }
    }

    /// Forgets to advance revolutions.
    struct Stuck;

    impl DegradationPredictor for Stuck {
        fn predict_next(&self, current: &BearingState, _step: f64) -> Result<BearingState, PredictorError> {
            Ok(current.clone())
        }
    }

    pub fn state(first: f64) -> BearingState {
        let mut features = [0.1; NUM_FEATURES];
        features[0] = first;
        BearingState::fresh(features)
    }

    fn running(firsts: &[f64]) -> Machine {
        let mut machine = Machine::from_states("Haas VF-2", firsts.iter().map(|&f| state(f)).collect())
            .expect("valid count");
        assert!(machine.turn_on());
        machine
    }

    #[test]
    fn random_machine_uses_catalogue() {
        let mut rng = StdRng::seed_from_u64(5);
        let sampler = BoundedRandomVector::default();
        for _ in 0..20 {
            let machine = Machine::new(None, &sampler, &mut rng);
            assert!(defaults::MACHINE_MODELS.contains(&machine.model()));
            assert!(defaults::BEARING_COUNTS.contains(&machine.bearing_count()));
            assert_eq!(machine.status(), MachineStatus::Off);
            assert!(machine.bearings().iter().all(|b| b.state().revolutions() == 0.0));
        }
        let named = Machine::new(Some("Custom Mill"), &sampler, &mut rng);
        assert_eq!(named.model(), "Custom Mill");
    }

    #[test]
    fn ids_are_unique() {
        let mut rng = StdRng::seed_from_u64(5);
        let sampler = BoundedRandomVector::default();
        let a = Machine::new(None, &sampler, &mut rng);
        let b = Machine::new(None, &sampler, &mut rng);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn machine_id_display_and_parse() {
        let id = MachineId(7);
        assert_eq!(id.to_string(), "CNC-0007");
        assert_eq!(MachineId::parse("CNC-0007"), Some(id));
        assert_eq!(MachineId::parse("7"), Some(id));
        assert_eq!(MachineId::parse("lathe"), None);
    }

    #[test]
    fn invalid_bearing_count_is_rejected() {
        let mut rng = StdRng::seed_from_u64(5);
        let sampler = BoundedRandomVector::default();
        assert!(matches!(
            Machine::with_bearing_count("X", 3, &sampler, &mut rng),
            Err(TwinError::InvalidBearingCount(3))
        ));
        assert!(Machine::with_bearing_count("X", 4, &sampler, &mut rng).is_ok());
    }

    #[test]
    fn tick_advances_every_bearing() {
        let mut machine = running(&[0.1, 0.2, 0.3, 0.4]);
        let failed = machine.tick(&Hold, &FirstFeature, TickParams::default()).expect("tick");
        assert_eq!(failed, None);
        for bearing in machine.bearings() {
            assert_eq!(bearing.state().revolutions(), 15_000.0);
            assert_eq!(bearing.rul(), bearing.state().features()[0]);
        }
    }

    #[test]
    fn first_failure_stops_the_sweep() {
        let mut machine = running(&[0.1, 0.95, 0.97, 0.2]);
        let failed = machine.tick(&Hold, &FirstFeature, TickParams::default()).expect("tick");

        assert_eq!(failed, Some(1));
        assert!(machine.has_failed());
        assert!(!machine.is_on());
        assert_eq!(machine.status(), MachineStatus::Failed);
        assert_eq!(machine.bearings()[0].state().revolutions(), 15_000.0);
        assert_eq!(machine.bearings()[1].state().revolutions(), 15_000.0);
        // Later bearings untouched
        assert_eq!(machine.bearings()[2].state().revolutions(), 0.0);
        assert_eq!(machine.bearings()[2].rul(), 0.0);
        assert_eq!(machine.bearings()[3].state().revolutions(), 0.0);
    }

    #[test]
    fn failure_threshold_is_inclusive() {
        let mut machine = running(&[0.92, 0.1]);
        let failed = machine.tick(&Hold, &FirstFeature, TickParams::default()).expect("tick");
        assert_eq!(failed, Some(0));
    }

    #[test]
    fn failed_machine_is_frozen() {
        let mut machine = running(&[0.95, 0.1]);
        machine.tick(&Hold, &FirstFeature, TickParams::default()).expect("tick");
        let before: Vec<_> = machine.bearings().to_vec();

        assert!(!machine.turn_on());
        assert_eq!(machine.tick(&Hold, &FirstFeature, TickParams::default()).expect("tick"), None);
        assert_eq!(machine.bearings(), before.as_slice());
    }

    #[test]
    fn off_machine_does_not_advance() {
        let mut machine = running(&[0.1, 0.1]);
        machine.turn_off();
        machine.tick(&Hold, &FirstFeature, TickParams::default()).expect("tick");
        assert_eq!(machine.bearings()[0].state().revolutions(), 0.0);
    }

    #[test]
    fn parallel_tick_matches_sequential() {
        let firsts = [0.3, 0.5, 0.93, 0.99];
        let mut sequential = running(&firsts);
        let mut parallel = running(&firsts);
        let params = TickParams::default();

        let a = sequential.tick(&Hold, &FirstFeature, params).expect("tick");
        let predictions = parallel.predict_tick(&Hold, &FirstFeature, params);
        let b = parallel.apply_tick(predictions, params.failure_rul).expect("tick");

        assert_eq!(a, Some(2));
        assert_eq!(a, b);
        assert_eq!(sequential.bearings(), parallel.bearings());
        assert_eq!(sequential.status(), parallel.status());
    }

    #[test]
    fn predictor_error_names_machine_and_bearing() {
        let mut machine = running(&[0.1, 0.5]);
        let err = machine
            .tick(&FailOn(0.5), &FirstFeature, TickParams::default())
            .expect_err("predictor should fail");
        match err {
            TwinError::Prediction { machine: id, bearing, .. } => {
                assert_eq!(id, machine.id());
                assert_eq!(bearing, 1);
            }
            other => panic!("unexpected error {other}"),
        }
        // Bearing 0 was already advanced
        assert_eq!(machine.bearings()[0].state().revolutions(), 15_000.0);
        assert!(!machine.has_failed());
    }

    #[test]
    fn parallel_error_after_failure_is_not_reported() {
        let mut machine = running(&[0.95, 0.5]);
        let params = TickParams::default();
        let predictions = machine.predict_tick(&FailOn(0.5), &FirstFeature, params);
        assert!(predictions[1].is_err());
        let failed = machine
            .apply_tick(predictions, params.failure_rul)
            .expect("failure precedes the error");
        assert_eq!(failed, Some(0));
    }

    #[test]
    fn predictions_leave_machine_untouched_until_applied() {
        let mut machine = running(&[0.5, 0.1]);
        let before: Vec<_> = machine.bearings().to_vec();
        let params = TickParams::default();

        let predictions = machine.predict_tick(&FailOn(0.5), &FirstFeature, params);
        assert_eq!(machine.bearings(), before.as_slice());

        assert!(machine.apply_tick(predictions, params.failure_rul).is_err());
        // Error on bearing 0: nothing applied
        assert_eq!(machine.bearings(), before.as_slice());

        machine.turn_off();
        assert!(machine.predict_tick(&Hold, &FirstFeature, params).is_empty());
    }

    #[test]
    fn revolutions_are_stamped_when_predictor_disagrees() {
        let mut machine = running(&[0.1, 0.1]);
        machine.tick(&Stuck, &FirstFeature, TickParams::default()).expect("tick");
        assert_eq!(machine.bearings()[0].state().revolutions(), 15_000.0);
    }

    #[test]
    fn replacing_failed_bearing_clears_failure_but_stays_off() {
        let mut rng = StdRng::seed_from_u64(8);
        let sampler = BoundedRandomVector::default();
        let mut machine = running(&[0.1, 0.95]);
        machine.tick(&Hold, &FirstFeature, TickParams::default()).expect("tick");
        assert_eq!(machine.failed_bearing_index(), Some(1));

        machine.replace_bearing(0, &sampler, &mut rng).expect("replace");
        assert!(machine.has_failed());

        machine.replace_bearing(1, &sampler, &mut rng).expect("replace");
        assert!(!machine.has_failed());
        assert!(!machine.is_on());
        assert_eq!(machine.bearings()[1].rul(), 0.0);
        assert_eq!(machine.bearings()[1].state().revolutions(), 0.0);
        assert!(machine.turn_on());
    }

    #[test]
    fn replace_out_of_range_is_rejected() {
        let mut rng = StdRng::seed_from_u64(8);
        let sampler = BoundedRandomVector::default();
        let mut machine = running(&[0.1, 0.1]);
        let before: Vec<_> = machine.bearings().to_vec();
        assert!(matches!(
            machine.replace_bearing(2, &sampler, &mut rng),
            Err(TwinError::BearingIndexOutOfRange { index: 2, count: 2 })
        ));
        assert_eq!(machine.bearings(), before.as_slice());
    }

    #[test]
    fn most_degraded_prefers_first_on_ties() {
        let mut machine = running(&[0.1, 0.6, 0.6, 0.2]);
        machine.tick(&Hold, &FirstFeature, TickParams::default()).expect("tick");
        let worst = machine.most_degraded_bearing().expect("has bearings");
        assert_eq!(worst.index(), 1);
        assert!((machine.lowest_health_fraction() - 0.4).abs() < 1e-12);
        assert!((machine.lowest_health_percentage() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn toggle_power_reports_state() {
        let mut machine = running(&[0.1, 0.1]);
        assert!(!machine.toggle_power());
        assert!(machine.toggle_power());
    }
}
