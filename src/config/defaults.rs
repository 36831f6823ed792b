//! System-wide default constants.
//!
//! Centralises the design values of the simulation. Every value here is also
//! the `Default` of the matching `TwinConfig` field.

use crate::types::NUM_FEATURES;

// ============================================================================
// Simulation Clock
// ============================================================================

/// Simulated seconds represented by one logical iteration (7.5 minutes).
pub const SECONDS_PER_ITERATION: f64 = 7.5 * 60.0;

/// Bearing revolutions accumulated per logical iteration.
pub const REVOLUTIONS_PER_ITERATION: f64 = 15_000.0;

/// Time multiplier of a fresh or reset clock.
pub const DEFAULT_TIME_MULTIPLIER: f64 = 1.0;

/// Polling period of the real-time driver loop (ms). ~60 Hz.
pub const DRIVER_TICK_INTERVAL_MS: u64 = 16;

// ============================================================================
// Health Bands (RUL, higher = more degraded)
// ============================================================================

/// A bearing at or above this RUL has failed and takes its machine offline.
pub const FAILURE_RUL: f64 = 0.92;

/// Lower bound of the CRITICAL band.
pub const CRITICAL_RUL: f64 = 0.9;

/// Lower bound of the WARNING band.
pub const WARNING_RUL: f64 = 0.7;

/// Lower bound of the FAIR band.
pub const FAIR_RUL: f64 = 0.5;

/// Default threshold for `ProductionFloor::bearings_needing_attention`.
pub const ATTENTION_RUL: f64 = 0.7;

/// Driver alert report: warning level.
pub const ALERT_WARNING_RUL: f64 = 0.8;

/// Driver alert report: critical level.
pub const ALERT_CRITICAL_RUL: f64 = 0.9;

/// Maximum entries kept in the console alert log.
pub const MAX_ALERT_LOG: usize = 50;

// ============================================================================
// Machines
// ============================================================================

/// Catalogue of CNC models used when a machine is added without a name.
pub const MACHINE_MODELS: [&str; 5] = [
    "Haas VF-2",
    "DMG MORI DMU 50",
    "Mazak Integrex i-200",
    "Okuma GENOS M560-V",
    "Fanuc RoboDrill",
];

/// Bearing counts a machine may be built with.
pub const BEARING_COUNTS: [usize; 2] = [2, 4];

// ============================================================================
// Initial-State Calibration
// ============================================================================

/// `(min, max)` sampling interval per feature, in `Feature::ALL` order.
///
/// Ranges observed on healthy bearings at the start of the run-to-failure
/// recordings.
pub const CALIBRATION_BOUNDS: [(f64, f64); NUM_FEATURES] = [
    (0.0541, 0.1318),   // RMS
    (0.264, 1.023),     // Peak
    (3.788, 9.361),     // CrestFactor
    (0.0659, 3.2130),   // Kurtosis
    (-0.920, 0.2048),   // Skewness
    (0.052, 0.109),     // StdDev
    (0.457, 1.934),     // PeakToPeak
    (-0.0940, -0.0039), // Mean
    (0.003, 0.012),     // Variance
    (0.625, 1008.75),   // DominantFreq_Hz
    (0.00862, 0.0725),  // DominantFreq_Mag
    (0.0208, 0.0940),   // Energy_0_500Hz
    (0.0147, 0.0322),   // Energy_500_1000Hz
    (0.020, 0.0623),    // Energy_1000_2000Hz
    (0.0248, 0.0494),   // Energy_2000_4000Hz
    (0.0234, 0.0709),   // Energy_4000_6000Hz
    (0.0123, 0.0521),   // Energy_6000_8000Hz
    (0.01086, 0.0536),  // Energy_8000_10240Hz
    (0.0025, 0.01596),  // Energy_BPFO
    (0.00137, 0.0041),  // Energy_BPFI
    (0.0012, 0.0039),   // Energy_BSF
    (0.0011, 0.0046),   // Energy_FTF
    (0.0026, 0.009),    // Energy_BPFO_2x
    (0.0017, 0.0048),   // Energy_BPFI_2x
    (0.0012, 0.0044),   // Energy_BPFO_3x
    (0.0019, 0.0049),   // Energy_BPFI_3x
];

// ============================================================================
// Configuration Files
// ============================================================================

/// Environment variable pointing at a TOML config file.
pub const CONFIG_ENV_VAR: &str = "CNC_TWIN_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "twin_config.toml";
