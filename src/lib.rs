//! CNC Twin: Predictive-Maintenance Digital Twin
//!
//! Fixed-step simulation of a CNC production floor whose bearings degrade
//! under external degradation and remaining-useful-life predictors.
//!
//! ## Architecture
//!
//! - **Twin core**: simulation clock, bearing sampler, machines, floor sweep
//! - **Predictors**: degradation / RUL contracts and linear-model adapters
//! - **Config**: TOML configuration with validation and design defaults
//! - **Console**: text command set for headless operation

pub mod config;
pub mod console;
pub mod predictors;
pub mod twin;
pub mod types;

// Re-export configuration
pub use config::TwinConfig;

// Re-export commonly used types
pub use types::{BearingPosition, BearingState, Feature, HealthStatus, MachineStatus, NUM_FEATURES};

// Re-export the twin core
pub use twin::{
    Bearing, BoundedRandomVector, FloorEvent, FloorSnapshot, Machine, MachineId, ProductionFloor,
    SimulationClock, TwinError,
};

// Re-export predictor contracts
pub use predictors::{DegradationPredictor, PredictorError, PredictorSet, RulPredictor};
