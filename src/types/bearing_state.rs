//! Immutable bearing snapshot.

use serde::{Deserialize, Serialize};

use super::features::{Feature, NUM_FEATURES};

/// Feature vector, cumulative revolutions and RUL estimate of one bearing at
/// one point in simulated time.
///
/// A `BearingState` is never mutated: every `with_*` builder returns a new
/// value, and a `Bearing` swaps its whole state on update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BearingState {
    features: [f64; NUM_FEATURES],
    revolutions: f64,
    rul: f64,
}

impl BearingState {
    /// Build a state. Negative or non-finite revolutions are clamped to 0.
    pub fn new(features: [f64; NUM_FEATURES], revolutions: f64, rul: f64) -> Self {
        let revolutions = if revolutions.is_finite() { revolutions.max(0.0) } else { 0.0 };
        Self {
            features,
            revolutions,
            rul,
        }
    }

    /// Fresh state with zero revolutions and zero RUL.
    pub fn fresh(features: [f64; NUM_FEATURES]) -> Self {
        Self::new(features, 0.0, 0.0)
    }

    pub fn feature(&self, feature: Feature) -> f64 {
        self.features[feature.index()]
    }

    pub const fn features(&self) -> &[f64; NUM_FEATURES] {
        &self.features
    }

    pub const fn revolutions(&self) -> f64 {
        self.revolutions
    }

    /// Remaining-useful-life estimate. Higher means more degraded; not bounded above.
    pub const fn rul(&self) -> f64 {
        self.rul
    }

    /// `(feature, value)` pairs in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        Feature::ALL.into_iter().zip(self.features.iter().copied())
    }

    #[must_use]
    pub fn with_rul(&self, rul: f64) -> Self {
        Self { rul, ..self.clone() }
    }

    #[must_use]
    pub fn with_revolutions(&self, revolutions: f64) -> Self {
        Self::new(self.features, revolutions, self.rul)
    }

    /// Name of the first non-finite feature, if any.
    pub fn first_non_finite(&self) -> Option<&'static str> {
        self.iter()
            .find(|(_, v)| !v.is_finite())
            .map(|(f, _)| f.name())
            .or_else(|| (!self.rul.is_finite()).then_some("RUL"))
    }
}

impl std::fmt::Display for BearingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BearingState [")?;
        for (feature, value) in self.iter() {
            write!(f, "{feature}={value:.6}, ")?;
        }
        write!(f, "Revolutions={:.0}, RUL={:.4}]", self.revolutions, self.rul)
    }
}
