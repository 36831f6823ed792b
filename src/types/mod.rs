//! Shared value types: feature catalogue, bearing snapshots, health enums.

pub mod bearing_state;
pub mod features;
pub mod health;

pub use bearing_state::BearingState;
pub use features::{Feature, FeatureGroup, NUM_FEATURES};
pub use health::{BearingPosition, HealthStatus, MachineStatus};
