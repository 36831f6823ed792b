//! Linear degradation and RUL models.
//!
//! Every model is `bias + Σ w_j · x_j + w_rev · revolutions` over the 26
//! features of the current state. The degradation predictor holds one such
//! model per feature; the RUL predictor holds one.
//!
//! ## Model files
//!
//! ```text
//! <model_dir>/
//!   degradation/RMS.toml
//!   degradation/Peak.toml
//!   ...                      (one file per feature, all 26 required)
//!   bearing_rul.toml
//! ```
//!
//! Each file:
//!
//! ```toml
//! bias = 0.0
//! revolutions = 0.0
//!
//! [weights]
//! RMS = 1.004
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{DegradationPredictor, PredictorError, RulPredictor};
use crate::types::{BearingState, Feature, NUM_FEATURES};

/// Subdirectory holding the per-feature degradation models.
pub const DEGRADATION_DIR: &str = "degradation";

/// File name of the RUL model.
pub const RUL_MODEL_FILE: &str = "bearing_rul.toml";

/// Per-iteration multiplicative drift of the baseline degradation model,
/// in `Feature::ALL` order.
const BASELINE_DRIFT: [f64; NUM_FEATURES] = [
    0.004, 0.004, 0.001, 0.005, 0.002, 0.004, 0.004, 0.001, 0.008, // time domain
    0.0, 0.003, // dominant frequency
    0.002, 0.002, 0.003, 0.003, 0.004, 0.004, 0.005, // bands
    0.006, 0.006, 0.004, 0.003, 0.005, 0.005, 0.004, 0.004, // fault frequencies
];

// ============================================================================
// Model File Format
// ============================================================================

/// On-disk form of one linear model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearModelSpec {
    #[serde(default)]
    pub bias: f64,

    /// Weight on the cumulative revolutions of the current state.
    #[serde(default)]
    pub revolutions: f64,

    /// Weight per feature name. Absent features weigh 0.
    #[serde(default)]
    pub weights: BTreeMap<String, f64>,
}

impl LinearModelSpec {
    pub fn from_file(path: &Path) -> Result<Self, PredictorError> {
        if !path.exists() {
            return Err(PredictorError::ModelNotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| PredictorError::Io(path.to_path_buf(), e))?;
        toml::from_str(&contents).map_err(|e| PredictorError::Parse(path.to_path_buf(), e))
    }

    fn compile(&self, origin: &Path) -> Result<LinearTerm, PredictorError> {
        let mut weights = [0.0; NUM_FEATURES];
        for (name, &weight) in &self.weights {
            let feature = Feature::from_name(name).ok_or_else(|| PredictorError::UnknownFeature {
                path: origin.to_path_buf(),
                feature: name.clone(),
            })?;
            weights[feature.index()] = weight;
        }
        Ok(LinearTerm {
            bias: self.bias,
            weights,
            revolutions: self.revolutions,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct LinearTerm {
    bias: f64,
    weights: [f64; NUM_FEATURES],
    revolutions: f64,
}

impl LinearTerm {
    fn eval(&self, state: &BearingState) -> f64 {
        let dot: f64 = self
            .weights
            .iter()
            .zip(state.features())
            .map(|(w, x)| w * x)
            .sum();
        self.bias + dot + self.revolutions * state.revolutions()
    }
}

// ============================================================================
// Degradation
// ============================================================================

/// One linear model per feature.
#[derive(Debug, Clone)]
pub struct LinearDegradationModel {
    terms: Vec<LinearTerm>,
}

impl LinearDegradationModel {
    /// Built-in calibration: every feature drifts by a fixed fraction of
    /// itself per iteration, fault-frequency energies fastest.
    pub fn baseline() -> Self {
        let terms = Feature::ALL
            .into_iter()
            .map(|feature| {
                let mut weights = [0.0; NUM_FEATURES];
                weights[feature.index()] = 1.0 + BASELINE_DRIFT[feature.index()];
                LinearTerm {
                    bias: 0.0,
                    weights,
                    revolutions: 0.0,
                }
            })
            .collect();
        Self { terms }
    }

    /// Features that have a model file under `model_dir`.
    pub fn available_models(model_dir: &Path) -> Vec<Feature> {
        Feature::ALL
            .into_iter()
            .filter(|f| Self::model_path(model_dir, *f).exists())
            .collect()
    }

    /// Load all 26 feature models. Fails listing every missing feature.
    pub fn load_dir(model_dir: &Path) -> Result<Self, PredictorError> {
        let available = Self::available_models(model_dir);
        let missing: Vec<&str> = Feature::ALL
            .into_iter()
            .filter(|f| !available.contains(f))
            .map(Feature::name)
            .collect();
        if !missing.is_empty() {
            return Err(PredictorError::MissingModels(missing.join(", ")));
        }

        let terms = Feature::ALL
            .into_iter()
            .map(|feature| {
                let path = Self::model_path(model_dir, feature);
                debug!(feature = %feature, path = %path.display(), "Loading degradation model");
                LinearModelSpec::from_file(&path)?.compile(&path)
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!(dir = %model_dir.display(), "Loaded {} degradation models", terms.len());
        Ok(Self { terms })
    }

    fn model_path(model_dir: &Path, feature: Feature) -> PathBuf {
        model_dir
            .join(DEGRADATION_DIR)
            .join(format!("{}.toml", feature.name()))
    }
}

impl DegradationPredictor for LinearDegradationModel {
    fn predict_next(
        &self,
        current: &BearingState,
        revolutions_step: f64,
    ) -> Result<BearingState, PredictorError> {
        let mut next = [0.0; NUM_FEATURES];
        for (value, term) in next.iter_mut().zip(&self.terms) {
            *value = term.eval(current);
        }
        let next = BearingState::new(next, current.revolutions() + revolutions_step, 0.0);
        match next.first_non_finite() {
            Some(name) => Err(PredictorError::NonFinite(name)),
            None => Ok(next),
        }
    }
}

// ============================================================================
// RUL
// ============================================================================

/// Single linear RUL model.
#[derive(Debug, Clone)]
pub struct LinearRulModel {
    term: LinearTerm,
}

impl LinearRulModel {
    /// Built-in calibration over RMS, kurtosis and the BPFO/BPFI energies.
    /// A freshly sampled bearing scores around 0.1.
    pub fn baseline() -> Self {
        let mut weights = [0.0; NUM_FEATURES];
        weights[Feature::Rms.index()] = 2.5;
        weights[Feature::Kurtosis.index()] = 0.08;
        weights[Feature::EnergyBpfo.index()] = 8.0;
        weights[Feature::EnergyBpfi.index()] = 15.0;
        Self {
            term: LinearTerm {
                bias: -0.35,
                weights,
                revolutions: 0.0,
            },
        }
    }

    pub fn load_dir(model_dir: &Path) -> Result<Self, PredictorError> {
        let path = model_dir.join(RUL_MODEL_FILE);
        let term = LinearModelSpec::from_file(&path)?.compile(&path)?;
        info!(path = %path.display(), "Loaded RUL model");
        Ok(Self { term })
    }
}

impl RulPredictor for LinearRulModel {
    fn predict_rul(&self, state: &BearingState) -> Result<f64, PredictorError> {
        let rul = self.term.eval(state);
        if rul.is_finite() {
            Ok(rul)
        } else {
            Err(PredictorError::NonFinite("RUL"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::CALIBRATION_BOUNDS;

    fn midpoint_state() -> BearingState {
        let mut features = [0.0; NUM_FEATURES];
        for (v, (min, max)) in features.iter_mut().zip(CALIBRATION_BOUNDS) {
            *v = (min + max) / 2.0;
        }
        BearingState::fresh(features)
    }

    fn write_model(dir: &Path, relative: &str, body: &str) {
        let path = dir.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, body).unwrap();
    }

    #[test]
    fn baseline_degradation_advances_revolutions_and_drifts() {
        let model = LinearDegradationModel::baseline();
        let current = midpoint_state().with_rul(0.4);
        let next = model.predict_next(&current, 15_000.0).unwrap();

        assert_eq!(next.revolutions(), 15_000.0);
        assert_eq!(next.rul(), 0.0);
        assert!(next.feature(Feature::Rms) > current.feature(Feature::Rms));
        assert!(next.feature(Feature::EnergyBpfo) > current.feature(Feature::EnergyBpfo));
        assert_eq!(
            next.feature(Feature::DominantFrequencyHz),
            current.feature(Feature::DominantFrequencyHz)
        );
    }

    #[test]
    fn baseline_rul_is_low_for_healthy_bearing_and_rises() {
        let degradation = LinearDegradationModel::baseline();
        let rul = LinearRulModel::baseline();

        let mut state = midpoint_state();
        let initial = rul.predict_rul(&state).unwrap();
        assert!(initial > 0.0 && initial < 0.3, "initial rul {initial}");

        for _ in 0..400 {
            state = degradation.predict_next(&state, 15_000.0).unwrap();
        }
        let worn = rul.predict_rul(&state).unwrap();
        assert!(worn > 0.92, "rul after 400 iterations {worn}");
    }

    #[test]
    fn loads_models_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        for feature in Feature::ALL {
            write_model(
                dir.path(),
                &format!("degradation/{}.toml", feature.name()),
                &format!("bias = 0.5\n[weights]\n{} = 2.0\n", feature.name()),
            );
        }
        write_model(
            dir.path(),
            RUL_MODEL_FILE,
            "bias = 0.1\nrevolutions = 0.00001\n[weights]\nRMS = 1.0\n",
        );

        let degradation = LinearDegradationModel::load_dir(dir.path()).unwrap();
        let rul = LinearRulModel::load_dir(dir.path()).unwrap();

        let state = BearingState::new([1.0; NUM_FEATURES], 10_000.0, 0.0);
        let next = degradation.predict_next(&state, 500.0).unwrap();
        assert_eq!(next.feature(Feature::Kurtosis), 2.5);
        assert_eq!(next.revolutions(), 10_500.0);

        let value = rul.predict_rul(&state).unwrap();
        assert!((value - 1.2).abs() < 1e-9, "rul {value}");
    }

    #[test]
    fn missing_feature_models_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        write_model(dir.path(), "degradation/RMS.toml", "bias = 0.0\n");

        assert_eq!(
            LinearDegradationModel::available_models(dir.path()),
            vec![Feature::Rms]
        );
        match LinearDegradationModel::load_dir(dir.path()) {
            Err(PredictorError::MissingModels(list)) => {
                assert!(list.contains("Peak"));
                assert!(list.contains("Energy_BPFI_3x"));
                assert!(!list.contains("RMS,"));
            }
            other => panic!("expected MissingModels, got {other:?}"),
        }
    }

    #[test]
    fn missing_rul_model_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            LinearRulModel::load_dir(dir.path()),
            Err(PredictorError::ModelNotFound(_))
        ));
    }

    #[test]
    fn unknown_feature_weight_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_model(dir.path(), RUL_MODEL_FILE, "[weights]\nTemperature = 1.0\n");
        assert!(matches!(
            LinearRulModel::load_dir(dir.path()),
            Err(PredictorError::UnknownFeature { .. })
        ));
    }

    #[test]
    fn non_finite_degradation_names_the_feature() {
        let model = LinearDegradationModel::baseline();
        let mut features = [1.0; NUM_FEATURES];
        features[Feature::Kurtosis.index()] = f64::INFINITY;
        assert!(matches!(
            model.predict_next(&BearingState::fresh(features), 15_000.0),
            Err(PredictorError::NonFinite("Kurtosis"))
        ));
    }

    #[test]
    fn non_finite_prediction_is_an_error() {
        let model = LinearRulModel::baseline();
        let mut features = [0.0; NUM_FEATURES];
        features[Feature::Rms.index()] = f64::INFINITY;
        assert!(matches!(
            model.predict_rul(&BearingState::fresh(features)),
            Err(PredictorError::NonFinite("RUL"))
        ));
    }
}
