//! Twin Configuration - simulation constants as operator-tunable TOML values
//!
//! Each struct implements `Default` with the design values from
//! `config::defaults`, so a missing file or a missing section behaves exactly
//! like the built-in constants.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use super::defaults;
use crate::twin::CalibrationBounds;
use crate::types::Feature;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration of a production floor.
///
/// Load with `TwinConfig::load()` which searches:
/// 1. `$CNC_TWIN_CONFIG` env var
/// 2. `./twin_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TwinConfig {
    /// Clock and sweep settings
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// RUL health bands and failure threshold
    #[serde(default)]
    pub health: HealthThresholds,

    /// Initial-state sampling intervals, keyed by feature name
    #[serde(default)]
    pub calibration: CalibrationConfig,

    /// Degradation / RUL model source
    #[serde(default)]
    pub predictors: PredictorConfig,
}

impl TwinConfig {
    /// Load configuration from the first usable source, see [`TwinConfig::resolve`].
    pub fn load() -> Self {
        let env_path = std::env::var_os(defaults::CONFIG_ENV_VAR).map(PathBuf::from);
        let (config, _) = Self::resolve(env_path, Path::new(defaults::LOCAL_CONFIG_FILE));
        config
    }

    /// Walk the candidate files in order (`env_path` first, then `local`) and
    /// keep the first one that exists and validates. A candidate that is
    /// missing or rejected is logged and skipped.
    pub fn resolve(env_path: Option<PathBuf>, local: &Path) -> (Self, ConfigSource) {
        let candidates = env_path
            .map(ConfigSource::EnvVar)
            .into_iter()
            .chain(std::iter::once(ConfigSource::LocalFile(local.to_path_buf())));

        for source in candidates {
            let Some(path) = source.path() else { continue };
            if !path.exists() {
                if matches!(source, ConfigSource::EnvVar(_)) {
                    warn!(%source, "Config file named by environment does not exist");
                }
                continue;
            }
            match Self::load_from_file(path) {
                Ok(config) => {
                    info!(%source, "Twin config loaded");
                    return (config, source);
                }
                Err(e) => warn!(%source, error = %e, "Twin config rejected, trying next source"),
            }
        }

        info!(source = %ConfigSource::Defaults, "No usable twin config file");
        (Self::default(), ConfigSource::Defaults)
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config = Self::from_toml_str(&contents)
            .map_err(|e| match e {
                ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
                other => other,
            })?;
        Ok(config)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Validate all values for internal consistency.
    ///
    /// Rules:
    /// - Health bands must be finite and ordered fair < warning < critical <= failure
    /// - Alert thresholds must be ordered warning <= critical
    /// - Iteration length must be positive, revolutions per iteration non-negative
    /// - Every calibration interval must be finite with min <= max
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        let s = &self.simulation;
        if !(s.seconds_per_iteration.is_finite() && s.seconds_per_iteration > 0.0) {
            errors.push(format!(
                "simulation.seconds_per_iteration must be a positive number (got {})",
                s.seconds_per_iteration
            ));
        }
        if !(s.revolutions_per_iteration.is_finite() && s.revolutions_per_iteration >= 0.0) {
            errors.push(format!(
                "simulation.revolutions_per_iteration must be >= 0 (got {})",
                s.revolutions_per_iteration
            ));
        }
        if s.tick_interval_ms == 0 {
            errors.push("simulation.tick_interval_ms must be > 0".to_string());
        }

        let h = &self.health;
        Self::check_order(h.fair_rul, h.warning_rul, "health.fair_rul", "warning_rul", true, &mut errors);
        Self::check_order(h.warning_rul, h.critical_rul, "health.warning_rul", "critical_rul", true, &mut errors);
        Self::check_order(h.critical_rul, h.failure_rul, "health.critical_rul", "failure_rul", false, &mut errors);
        Self::check_order(
            h.alert_warning_rul,
            h.alert_critical_rul,
            "health.alert_warning_rul",
            "alert_critical_rul",
            false,
            &mut errors,
        );
        if !h.attention_rul.is_finite() {
            errors.push(format!("health.attention_rul must be finite (got {})", h.attention_rul));
        }

        if let Err(calibration_errors) = self.calibration.resolve() {
            errors.extend(calibration_errors);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_order(
        lower: f64,
        upper: f64,
        lower_name: &str,
        upper_name: &str,
        strict: bool,
        errors: &mut Vec<String>,
    ) {
        // NaN comparisons silently pass, catch them explicitly
        if !lower.is_finite() || !upper.is_finite() {
            errors.push(format!(
                "{lower_name}/{upper_name}: values must be finite (got {lower}, {upper})"
            ));
            return;
        }
        let ordered = if strict { lower < upper } else { lower <= upper };
        if !ordered {
            let op = if strict { "<" } else { "<=" };
            errors.push(format!(
                "{lower_name} ({lower:.3}) must be {op} {upper_name} ({upper:.3})"
            ));
        }
    }
}

// ============================================================================
// Sources and Errors
// ============================================================================

/// Where an effective configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// File named by `$CNC_TWIN_CONFIG`.
    EnvVar(PathBuf),
    /// `twin_config.toml` in the working directory.
    LocalFile(PathBuf),
    Defaults,
}

impl ConfigSource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::EnvVar(path) | Self::LocalFile(path) => Some(path),
            Self::Defaults => None,
        }
    }
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EnvVar(path) => write!(f, "${} ({})", defaults::CONFIG_ENV_VAR, path.display()),
            Self::LocalFile(path) => write!(f, "{}", path.display()),
            Self::Defaults => write!(f, "built-in defaults"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read twin config {}: {1}", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("twin config {} is not valid TOML: {1}", .0.display())]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("cannot render twin config as TOML: {0}")]
    Serialize(#[source] toml::ser::Error),

    #[error("{} invalid twin config value(s): {}", .0.len(), .0.join("; "))]
    Validation(Vec<String>),
}

// ============================================================================
// Simulation
// ============================================================================

/// How the floor evaluates machines within one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SweepMode {
    /// One machine, one bearing at a time.
    #[default]
    Sequential,
    /// Machines and their bearings evaluated on the rayon pool.
    Parallel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Simulated seconds per logical iteration.
    #[serde(default = "default_seconds_per_iteration")]
    pub seconds_per_iteration: f64,

    /// Revolutions added to every bearing per iteration.
    #[serde(default = "default_revolutions_per_iteration")]
    pub revolutions_per_iteration: f64,

    /// RNG seed for bearing sampling and machine creation. Entropy when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    #[serde(default)]
    pub sweep: SweepMode,

    /// Polling period of the real-time driver (ms).
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

fn default_seconds_per_iteration() -> f64 {
    defaults::SECONDS_PER_ITERATION
}

fn default_revolutions_per_iteration() -> f64 {
    defaults::REVOLUTIONS_PER_ITERATION
}

fn default_tick_interval_ms() -> u64 {
    defaults::DRIVER_TICK_INTERVAL_MS
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seconds_per_iteration: default_seconds_per_iteration(),
            revolutions_per_iteration: default_revolutions_per_iteration(),
            seed: None,
            sweep: SweepMode::default(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

// ============================================================================
// Health Thresholds
// ============================================================================

/// RUL band boundaries. Each is the inclusive lower bound of its band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthThresholds {
    pub failure_rul: f64,
    pub critical_rul: f64,
    pub warning_rul: f64,
    pub fair_rul: f64,
    /// Default cut-off for the attention query.
    pub attention_rul: f64,
    pub alert_warning_rul: f64,
    pub alert_critical_rul: f64,
}

/// The two adjustable maintenance alert cut-offs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Warning,
    Critical,
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

impl HealthThresholds {
    pub fn alert(&self, level: AlertLevel) -> f64 {
        match level {
            AlertLevel::Warning => self.alert_warning_rul,
            AlertLevel::Critical => self.alert_critical_rul,
        }
    }

    pub fn set_alert(&mut self, level: AlertLevel, rul: f64) {
        match level {
            AlertLevel::Warning => self.alert_warning_rul = rul,
            AlertLevel::Critical => self.alert_critical_rul = rul,
        }
    }
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            failure_rul: defaults::FAILURE_RUL,
            critical_rul: defaults::CRITICAL_RUL,
            warning_rul: defaults::WARNING_RUL,
            fair_rul: defaults::FAIR_RUL,
            attention_rul: defaults::ATTENTION_RUL,
            alert_warning_rul: defaults::ALERT_WARNING_RUL,
            alert_critical_rul: defaults::ALERT_CRITICAL_RUL,
        }
    }
}

// ============================================================================
// Calibration
// ============================================================================

/// Sampling interval per feature name, e.g. `RMS = [0.0541, 0.1318]`.
///
/// Features missing from the file keep their default interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalibrationConfig {
    pub bounds: BTreeMap<String, [f64; 2]>,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        let bounds = Feature::ALL
            .into_iter()
            .zip(defaults::CALIBRATION_BOUNDS)
            .map(|(feature, (min, max))| (feature.name().to_string(), [min, max]))
            .collect();
        Self { bounds }
    }
}

impl CalibrationConfig {
    /// Merge the configured intervals over the defaults.
    pub fn resolve(&self) -> Result<CalibrationBounds, Vec<String>> {
        let mut errors = Vec::new();

        for name in self.bounds.keys() {
            if Feature::from_name(name).is_none() {
                errors.push(format!("calibration.{name}: unknown feature"));
            }
        }

        let mut resolved = defaults::CALIBRATION_BOUNDS;
        for feature in Feature::ALL {
            if let Some(&[min, max]) = self.bounds.get(feature.name()) {
                if !min.is_finite() || !max.is_finite() {
                    errors.push(format!(
                        "calibration.{feature}: bounds must be finite (got [{min}, {max}])"
                    ));
                } else if min > max {
                    errors.push(format!(
                        "calibration.{feature}: min ({min}) must be <= max ({max})"
                    ));
                } else {
                    resolved[feature.index()] = (min, max);
                }
            }
        }

        if errors.is_empty() {
            Ok(CalibrationBounds::new(resolved))
        } else {
            Err(errors)
        }
    }
}

// ============================================================================
// Predictors
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictorConfig {
    /// Directory holding `degradation/<Feature>.toml` and `bearing_rul.toml`.
    /// Built-in baseline models are used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = TwinConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.simulation.seconds_per_iteration, 450.0);
        assert_eq!(config.health.failure_rul, 0.92);
        assert_eq!(config.calibration.bounds.len(), 26);
    }

    #[test]
    fn empty_document_uses_defaults() {
        let config = TwinConfig::from_toml_str("").unwrap();
        assert_eq!(config.simulation.revolutions_per_iteration, 15_000.0);
        assert_eq!(config.simulation.sweep, SweepMode::Sequential);
        assert!(config.predictors.model_dir.is_none());
    }

    #[test]
    fn partial_calibration_keeps_other_defaults() {
        let config = TwinConfig::from_toml_str(
            r#"
            [calibration]
            RMS = [0.1, 0.2]
            "#,
        )
        .unwrap();
        let bounds = config.calibration.resolve().unwrap();
        assert_eq!(bounds.get(Feature::Rms), (0.1, 0.2));
        assert_eq!(bounds.get(Feature::Peak), (0.264, 1.023));
    }

    #[test]
    fn rejects_unordered_health_bands() {
        let result = TwinConfig::from_toml_str(
            r#"
            [health]
            warning_rul = 0.95
            "#,
        );
        match result {
            Err(ConfigError::Validation(errors)) => {
                assert!(errors.iter().any(|e| e.contains("warning_rul")), "{errors:?}");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_calibration_and_simulation_values() {
        let result = TwinConfig::from_toml_str(
            r#"
            [simulation]
            seconds_per_iteration = 0.0

            [calibration]
            Peak = [2.0, 1.0]
            Bogus = [0.0, 1.0]
            "#,
        );
        let Err(ConfigError::Validation(errors)) = result else {
            panic!("expected validation error");
        };
        assert_eq!(errors.len(), 3, "{errors:?}");
    }

    #[test]
    fn parses_parallel_sweep() {
        let config = TwinConfig::from_toml_str(
            r#"
            [simulation]
            sweep = "parallel"
            seed = 42
            "#,
        )
        .unwrap();
        assert_eq!(config.simulation.sweep, SweepMode::Parallel);
        assert_eq!(config.simulation.seed, Some(42));
    }

    #[test]
    fn toml_round_trip_preserves_values() {
        let mut config = TwinConfig::default();
        config.simulation.seed = Some(7);
        config.health.attention_rul = 0.6;
        let text = config.to_toml().unwrap();
        let parsed = TwinConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed.simulation.seed, Some(7));
        assert_eq!(parsed.health, config.health);
        assert_eq!(parsed.calibration, config.calibration);
    }
}
