//! Predictor Contracts
//!
//! The floor never computes degradation or RUL itself. It consumes two pure
//! functions behind these traits:
//!
//! - [`DegradationPredictor`]: next feature vector after `revolutions_step`
//!   more revolutions. Must set `revolutions = current + step`; the RUL field
//!   of its result is ignored.
//! - [`RulPredictor`]: RUL estimate for a feature vector, roughly `[0, 1]`
//!   but not bounded.
//!
//! Both are `Send + Sync` so a parallel sweep can share them across the
//! rayon pool. Implementations hold only fixed, pre-loaded parameters.

pub mod linear;

pub use linear::{LinearDegradationModel, LinearModelSpec, LinearRulModel};

use std::path::PathBuf;
use thiserror::Error;

use crate::types::BearingState;

/// Errors from loading or evaluating a predictor.
#[derive(Debug, Error)]
pub enum PredictorError {
    #[error("Model file not found: {0}")]
    ModelNotFound(PathBuf),

    #[error("Missing degradation models for: {0}")]
    MissingModels(String),

    #[error("Model {path}: unknown feature '{feature}'")]
    UnknownFeature { path: PathBuf, feature: String },

    #[error("Failed to read model {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse model {0}: {1}")]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("Prediction produced a non-finite value for {0}")]
    NonFinite(&'static str),
}

/// Advances a bearing's feature vector by one step.
pub trait DegradationPredictor: Send + Sync {
    fn predict_next(
        &self,
        current: &BearingState,
        revolutions_step: f64,
    ) -> Result<BearingState, PredictorError>;
}

/// Estimates remaining useful life from a feature vector.
pub trait RulPredictor: Send + Sync {
    fn predict_rul(&self, state: &BearingState) -> Result<f64, PredictorError>;
}

impl<T: DegradationPredictor + ?Sized> DegradationPredictor for Box<T> {
    fn predict_next(
        &self,
        current: &BearingState,
        revolutions_step: f64,
    ) -> Result<BearingState, PredictorError> {
        (**self).predict_next(current, revolutions_step)
    }
}

impl<T: RulPredictor + ?Sized> RulPredictor for Box<T> {
    fn predict_rul(&self, state: &BearingState) -> Result<f64, PredictorError> {
        (**self).predict_rul(state)
    }
}

/// The pair of predictors a floor runs with.
pub struct PredictorSet {
    pub degradation: Box<dyn DegradationPredictor>,
    pub rul: Box<dyn RulPredictor>,
}

impl PredictorSet {
    pub fn new(
        degradation: impl DegradationPredictor + 'static,
        rul: impl RulPredictor + 'static,
    ) -> Self {
        Self {
            degradation: Box::new(degradation),
            rul: Box::new(rul),
        }
    }

    /// Built-in baseline linear models.
    pub fn baseline() -> Self {
        Self::new(LinearDegradationModel::baseline(), LinearRulModel::baseline())
    }

    /// Load linear models from `model_dir`, or the baselines when `None`.
    pub fn load(model_dir: Option<&std::path::Path>) -> Result<Self, PredictorError> {
        match model_dir {
            Some(dir) => Ok(Self::new(
                LinearDegradationModel::load_dir(dir)?,
                LinearRulModel::load_dir(dir)?,
            )),
            None => Ok(Self::baseline()),
        }
    }
}

impl std::fmt::Debug for PredictorSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictorSet").finish_non_exhaustive()
    }
}
