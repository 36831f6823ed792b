//! Error taxonomy of the floor core.

use thiserror::Error;

use super::events::FloorEvent;
use super::machine::MachineId;
use crate::config::ConfigError;
use crate::predictors::PredictorError;

#[derive(Debug, Error)]
pub enum TwinError {
    #[error("Bearing index {index} out of range: machine has {count} bearings")]
    BearingIndexOutOfRange { index: usize, count: usize },

    #[error("Invalid bearing count {0}: machines carry 2 or 4 bearings")]
    InvalidBearingCount(usize),

    #[error("Machine not found: {0}")]
    MachineNotFound(MachineId),

    /// A predictor could not be constructed. Startup-time only.
    #[error("Predictor unavailable: {0}")]
    PredictorUnavailable(#[source] PredictorError),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),

    /// A predictor failed during a sweep. The sweep is aborted.
    #[error("Prediction failed on {machine} bearing {bearing}: {source}")]
    Prediction {
        machine: MachineId,
        bearing: usize,
        #[source]
        source: PredictorError,
    },

    /// An iteration stopped part way. Machines that failed before the error
    /// keep their failure, and their `BearingFailed` events ride along here.
    #[error("Iteration {iteration} aborted: {source}")]
    SweepAborted {
        iteration: u64,
        events: Vec<FloorEvent>,
        #[source]
        source: Box<TwinError>,
    },
}

impl TwinError {
    /// Events committed before a sweep was aborted: failures of the aborted
    /// iteration, preceded by anything earlier iterations of the same call
    /// produced. Empty for every other error.
    pub fn committed_events(&self) -> &[FloorEvent] {
        match self {
            Self::SweepAborted { events, .. } => events,
            _ => &[],
        }
    }

    /// Put `earlier` events in front of an aborted sweep's committed events.
    #[must_use]
    pub(crate) fn after(self, mut earlier: Vec<FloorEvent>) -> Self {
        match self {
            Self::SweepAborted {
                iteration,
                events,
                source,
            } => {
                earlier.extend(events);
                Self::SweepAborted {
                    iteration,
                    events: earlier,
                    source,
                }
            }
            other => other,
        }
    }
}
