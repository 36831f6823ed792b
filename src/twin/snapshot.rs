//! Read-only, serializable view of the floor for display and JSON output.

use serde::{Deserialize, Serialize};

use super::bearing::Bearing;
use super::floor::ProductionFloor;
use super::machine::{Machine, MachineId};
use crate::config::HealthThresholds;
use crate::types::{BearingPosition, HealthStatus, MachineStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BearingSnapshot {
    pub index: usize,
    pub position: BearingPosition,
    pub rul: f64,
    pub revolutions: f64,
    pub health_percentage: f64,
    pub status: HealthStatus,
}

impl BearingSnapshot {
    fn capture(bearing: &Bearing, thresholds: &HealthThresholds) -> Self {
        Self {
            index: bearing.index(),
            position: bearing.position(),
            rul: bearing.rul(),
            revolutions: bearing.state().revolutions(),
            health_percentage: bearing.health_percentage(),
            status: bearing.classify(thresholds),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineSnapshot {
    pub id: MachineId,
    pub model: String,
    pub status: MachineStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_bearing_index: Option<usize>,
    pub lowest_health_percentage: f64,
    pub bearings: Vec<BearingSnapshot>,
}

impl MachineSnapshot {
    pub fn capture(machine: &Machine, thresholds: &HealthThresholds) -> Self {
        Self {
            id: machine.id(),
            model: machine.model().to_string(),
            status: machine.status(),
            failed_bearing_index: machine.failed_bearing_index(),
            lowest_health_percentage: machine.lowest_health_percentage(),
            bearings: machine
                .bearings()
                .iter()
                .map(|b| BearingSnapshot::capture(b, thresholds))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorSnapshot {
    pub total_iterations: u64,
    /// Simulated hours elapsed (`iterations × seconds_per_iteration / 3600`).
    pub simulated_hours: f64,
    pub time_multiplier: f64,
    pub progress_to_next_tick: f64,
    pub paused: bool,
    pub running: usize,
    pub failed: usize,
    pub machines: Vec<MachineSnapshot>,
}

impl FloorSnapshot {
    pub fn capture(floor: &ProductionFloor) -> Self {
        let thresholds = floor.health_thresholds();
        let clock = floor.clock();
        #[allow(clippy::cast_precision_loss)]
        let iterations = floor.total_iterations() as f64;
        Self {
            total_iterations: floor.total_iterations(),
            simulated_hours: iterations * clock.seconds_per_iteration() / 3600.0,
            time_multiplier: clock.time_multiplier(),
            progress_to_next_tick: clock.progress_to_next_tick(),
            paused: floor.is_paused(),
            running: floor.active_machine_count(),
            failed: floor.failed_machine_count(),
            machines: floor
                .machines()
                .iter()
                .map(|m| MachineSnapshot::capture(m, thresholds))
                .collect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
