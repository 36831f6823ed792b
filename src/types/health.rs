//! Health classification enums: bearing bands, bearing positions, machine status.

use serde::{Deserialize, Serialize};

use crate::config::HealthThresholds;

// ============================================================================
// Health Status
// ============================================================================

/// RUL band of a bearing, ordered from healthiest to failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HealthStatus {
    Good,
    Fair,
    Warning,
    Critical,
    Failed,
}

impl HealthStatus {
    /// Classify a RUL value, evaluating the bands top-down.
    ///
    /// Each threshold is the inclusive lower bound of its band:
    /// - `rul >= failure_rul` → Failed
    /// - `rul >= critical_rul` → Critical
    /// - `rul >= warning_rul` → Warning
    /// - `rul >= fair_rul` → Fair
    /// - otherwise → Good
    pub fn classify(rul: f64, thresholds: &HealthThresholds) -> Self {
        match rul {
            r if r >= thresholds.failure_rul => Self::Failed,
            r if r >= thresholds.critical_rul => Self::Critical,
            r if r >= thresholds.warning_rul => Self::Warning,
            r if r >= thresholds.fair_rul => Self::Fair,
            _ => Self::Good,
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Good => write!(f, "GOOD"),
            HealthStatus::Fair => write!(f, "FAIR"),
            HealthStatus::Warning => write!(f, "WARNING"),
            HealthStatus::Critical => write!(f, "CRITICAL"),
            HealthStatus::Failed => write!(f, "FAILED"),
        }
    }
}

// ============================================================================
// Bearing Position
// ============================================================================

/// Physical mounting position of a bearing, derived from its index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BearingPosition {
    SpindleFront,
    SpindleRear,
    MotorDriveEnd,
    MotorNonDriveEnd,
    /// Any index past the named positions.
    Auxiliary(usize),
}

impl BearingPosition {
    pub const fn from_index(index: usize) -> Self {
        match index {
            0 => Self::SpindleFront,
            1 => Self::SpindleRear,
            2 => Self::MotorDriveEnd,
            3 => Self::MotorNonDriveEnd,
            n => Self::Auxiliary(n),
        }
    }
}

impl std::fmt::Display for BearingPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BearingPosition::SpindleFront => write!(f, "Spindle-F"),
            BearingPosition::SpindleRear => write!(f, "Spindle-R"),
            BearingPosition::MotorDriveEnd => write!(f, "Motor-DE"),
            BearingPosition::MotorNonDriveEnd => write!(f, "Motor-NDE"),
            BearingPosition::Auxiliary(n) => write!(f, "Bearing {n}"),
        }
    }
}

// ============================================================================
// Machine Status
// ============================================================================

/// Power/failure state of a machine.
///
/// `Off → Running → Failed`, `Running → Off`, `Off → Running`, and
/// `Failed → Off` only through repair of the failed bearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MachineStatus {
    Off,
    Running,
    Failed,
}

impl std::fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MachineStatus::Off => write!(f, "OFF"),
            MachineStatus::Running => write!(f, "RUNNING"),
            MachineStatus::Failed => write!(f, "FAILED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band(rul: f64) -> HealthStatus {
        HealthStatus::classify(rul, &HealthThresholds::default())
    }

    #[test]
    fn band_lower_bounds_are_inclusive() {
        assert_eq!(band(0.0), HealthStatus::Good);
        assert_eq!(band(0.499), HealthStatus::Good);
        assert_eq!(band(0.5), HealthStatus::Fair);
        assert_eq!(band(0.7), HealthStatus::Warning);
        assert_eq!(band(0.9), HealthStatus::Critical);
        assert_eq!(band(0.919), HealthStatus::Critical);
        assert_eq!(band(0.92), HealthStatus::Failed);
        assert_eq!(band(1.4), HealthStatus::Failed);
    }

    #[test]
    fn negative_rul_is_good() {
        assert_eq!(band(-0.3), HealthStatus::Good);
    }

    #[test]
    fn statuses_are_ordered_by_severity() {
        assert!(HealthStatus::Good < HealthStatus::Fair);
        assert!(HealthStatus::Critical < HealthStatus::Failed);
    }

    #[test]
    fn positions_fall_back_to_generic_label() {
        assert_eq!(BearingPosition::from_index(0).to_string(), "Spindle-F");
        assert_eq!(BearingPosition::from_index(3).to_string(), "Motor-NDE");
        assert_eq!(BearingPosition::from_index(5), BearingPosition::Auxiliary(5));
        assert_eq!(BearingPosition::from_index(5).to_string(), "Bearing 5");
    }
}
