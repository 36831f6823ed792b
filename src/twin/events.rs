//! Notifications produced by a floor iteration.
//!
//! Returned from the tick operations in emission order: every failure of the
//! iteration (machine order) followed by one `IterationComplete`.

use serde::{Deserialize, Serialize};

use super::machine::MachineId;
use crate::types::BearingPosition;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FloorEvent {
    BearingFailed {
        machine: MachineId,
        model: String,
        bearing_index: usize,
        position: BearingPosition,
        rul: f64,
        iteration: u64,
    },
    IterationComplete {
        iteration: u64,
    },
}

impl FloorEvent {
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::BearingFailed { .. })
    }
}

impl std::fmt::Display for FloorEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BearingFailed {
                machine,
                model,
                bearing_index,
                position,
                rul,
                iteration,
            } => write!(
                f,
                "[iter {iteration}] {machine} ({model}) bearing {bearing_index} ({position}) FAILED, RUL {rul:.3}"
            ),
            Self::IterationComplete { iteration } => write!(f, "[iter {iteration}] iteration complete"),
        }
    }
}
